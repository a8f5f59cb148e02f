//! Placeholder substitution for emailed reports.
//!
//! Templates are plain text with `{{KEY}}` markers. Substitution is a
//! literal replace over a flat key/value context; there is no escaping or
//! conditional syntax.

use chrono::Local;

/// Body used when no template document is stored.
pub const FALLBACK_BODY: &str = r#"<html><body>
<p><strong>Report Date:</strong> {{DATE}}</p>
<p><strong>Runtime:</strong> {{RUNTIME}} min</p>
<div style="background-color:#eee;padding:10px;">{{COMMENT}}</div>
<pre>{{STATUS_LIST}}</pre>
</body></html>"#;

pub fn render(template: &str, vars: &[(&str, String)]) -> String {
    let mut rendered = template.to_string();
    for (key, value) in vars {
        rendered = rendered.replace(&format!("{{{{{key}}}}}"), value);
    }
    rendered
}

/// Convert newlines to `<br>` for values substituted into an HTML body.
pub fn html_breaks(value: &str) -> String {
    value.replace('\n', "<br>")
}

/// Default subject line for a report email sent today.
pub fn default_subject(student_name: &str) -> String {
    let today = Local::now().format("%Y-%m-%d");
    format!("[{today}] {student_name} - Report")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_every_occurrence() {
        let rendered = render(
            "{{NAME}} and {{NAME}} met on {{DATE}}",
            &[
                ("NAME", "Ana".to_string()),
                ("DATE", "2025-01-01".to_string()),
            ],
        );
        assert_eq!(rendered, "Ana and Ana met on 2025-01-01");
    }

    #[test]
    fn unknown_placeholders_stay_verbatim() {
        let rendered = render("{{KNOWN}} {{UNKNOWN}}", &[("KNOWN", "x".to_string())]);
        assert_eq!(rendered, "x {{UNKNOWN}}");
    }

    #[test]
    fn fallback_body_renders_cleanly() {
        let rendered = render(
            FALLBACK_BODY,
            &[
                ("DATE", "01/08/25".to_string()),
                ("RUNTIME", "90".to_string()),
                ("COMMENT", "Scribes are attached...".to_string()),
                ("STATUS_LIST", "line one<br>line two".to_string()),
            ],
        );
        assert!(!rendered.contains("{{"));
        assert!(rendered.contains("<pre>line one<br>line two</pre>"));
    }

    #[test]
    fn converts_newlines_to_breaks() {
        assert_eq!(html_breaks("a\nb\nc"), "a<br>b<br>c");
        assert_eq!(html_breaks("no breaks"), "no breaks");
    }

    #[test]
    fn default_subject_carries_the_student_name() {
        let subject = default_subject("Ana");
        assert!(subject.starts_with('['));
        assert!(subject.ends_with("Ana - Report"));
    }
}
