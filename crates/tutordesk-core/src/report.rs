//! Per-student status reports feeding the email template.

use crate::model::lesson::compare_times;
use crate::model::{Lesson, Student};
use crate::template;
use crate::utils::time;

/// Headline fields and the status-line block for one student.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContext {
    /// Date of the most recent entry, `%m/%d/%y`, or `N/A` when nothing
    /// parseable exists.
    pub date: String,
    /// Duration of the most recent entry in minutes, `0` when there are no
    /// entries.
    pub runtime: String,
    pub student_name: String,
    /// One line per lesson: `date,time,label,duration glyph`.
    pub status_list: String,
}

impl ReportContext {
    /// Flat substitution context for the email body. The comment and the
    /// status list have their newlines converted for HTML.
    pub fn template_vars(&self, comment: &str) -> Vec<(&'static str, String)> {
        vec![
            ("DATE", self.date.clone()),
            ("RUNTIME", self.runtime.clone()),
            ("STUDENT_NAME", self.student_name.clone()),
            ("COMMENT", template::html_breaks(comment)),
            ("STATUS_LIST", template::html_breaks(&self.status_list)),
        ]
    }
}

/// Build the report for one student from the full lesson collection.
///
/// Lessons are filtered to the student, ordered by time, and labeled with a
/// 1-based ordinal recomputed from that order, `{name}{NN}({username})`
/// with the parenthetical dropped when the username is empty.
pub fn build_student_report(student: &Student, lessons: &[Lesson]) -> ReportContext {
    let mut own: Vec<&Lesson> = lessons
        .iter()
        .filter(|lesson| lesson.student_id == Some(student.id))
        .collect();
    own.sort_by(|a, b| compare_times(&a.time, &b.time));

    let mut lines = Vec::with_capacity(own.len());
    let mut latest_date = "N/A".to_string();
    let mut latest_runtime = "0".to_string();

    for (index, lesson) in own.iter().enumerate() {
        let (date_part, time_part, headline_date) = match time::parse_wall_clock(&lesson.time) {
            Ok(parsed) => (
                parsed.format("%Y-%m-%d").to_string(),
                parsed.format("%H:%M").to_string(),
                Some(parsed.format("%m/%d/%y").to_string()),
            ),
            Err(_) => (lesson.time.clone(), String::new(), None),
        };

        let ordinal = format!("{}{:02}", student.name, index + 1);
        let label = if student.username.is_empty() {
            ordinal
        } else {
            format!("{}({})", ordinal, student.username)
        };

        lines.push(format!(
            "{},{},{},{} {}",
            date_part,
            time_part,
            label,
            lesson.duration,
            lesson.glyph()
        ));

        if let Some(date) = headline_date {
            latest_date = date;
        }
        latest_runtime = lesson.duration.to_string();
    }

    ReportContext {
        date: latest_date,
        runtime: latest_runtime,
        student_name: student.name.clone(),
        status_list: lines.join("\n"),
    }
}
