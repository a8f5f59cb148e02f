use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::status::StatusGlyph;
use crate::model::student::Student;
use crate::utils::time;

/// Duration given to lessons synthesized for students that have none.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Stored shape of a lesson, tolerant of every historical variant: records
/// without ids, records carrying the deprecated single `status` field, and
/// records missing the paid/done flags or the note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<Uuid>,
    pub name: String,
    pub time: String,
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_paid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_done: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl LessonRecord {
    /// Apply the legacy-status migration in place.
    ///
    /// A `status` of `"done"` collapses into `isPaid = isDone = true`,
    /// anything else into `false`/`false`, and the field is dropped. Flags
    /// already present win over `status`. Missing flags and a missing note
    /// gain defaults. Returns whether the record changed; running it again
    /// on the result is a no-op.
    pub fn migrate(&mut self) -> bool {
        let mut changed = false;
        if let Some(status) = self.status.take() {
            if self.is_paid.is_none() {
                let done = status == "done";
                self.is_paid = Some(done);
                self.is_done = Some(done);
            }
            changed = true;
        }
        if self.is_paid.is_none() {
            self.is_paid = Some(false);
            changed = true;
        }
        if self.is_done.is_none() {
            self.is_done = Some(false);
            changed = true;
        }
        if self.note.is_none() {
            self.note = Some(String::new());
            changed = true;
        }
        changed
    }
}

/// One scheduled session tied to a student.
///
/// `student_id` is resolved from the student roster at load time and is
/// `None` for orphaned lessons whose student has been removed. The name is
/// kept both as the display attribute and as the join key legacy files use.
#[derive(Debug, Clone, PartialEq)]
pub struct Lesson {
    pub id: Uuid,
    pub student_id: Option<Uuid>,
    pub student_name: String,
    pub time: String,
    pub duration: u32,
    pub is_paid: bool,
    pub is_done: bool,
    pub note: String,
}

impl Lesson {
    /// Promote a migrated record to a [`Lesson`], minting a missing id and
    /// resolving the owning student by name. Returns whether the stored
    /// form changed.
    pub fn from_record(record: LessonRecord, students: &[Student]) -> (Lesson, bool) {
        let resolved = students
            .iter()
            .find(|student| student.name == record.name)
            .map(|student| student.id);
        let changed = record.id.is_none() || record.student_id != resolved;
        let lesson = Lesson {
            id: record.id.unwrap_or_else(Uuid::new_v4),
            student_id: resolved,
            student_name: record.name,
            time: record.time,
            duration: record.duration,
            is_paid: record.is_paid.unwrap_or(false),
            is_done: record.is_done.unwrap_or(false),
            note: record.note.unwrap_or_default(),
        };
        (lesson, changed)
    }

    /// The lesson synthesized for a student that has none: starts now, runs
    /// an hour, unpaid and not held.
    pub fn default_for(student: &Student) -> Lesson {
        Lesson {
            id: Uuid::new_v4(),
            student_id: Some(student.id),
            student_name: student.name.clone(),
            time: time::now_wall_clock(),
            duration: DEFAULT_DURATION_MINUTES,
            is_paid: false,
            is_done: false,
            note: String::new(),
        }
    }

    pub fn glyph(&self) -> StatusGlyph {
        StatusGlyph::from_flags(self.is_paid, self.is_done)
    }
}

impl From<&Lesson> for LessonRecord {
    fn from(lesson: &Lesson) -> Self {
        LessonRecord {
            id: Some(lesson.id),
            student_id: lesson.student_id,
            name: lesson.student_name.clone(),
            time: lesson.time.clone(),
            duration: lesson.duration,
            is_paid: Some(lesson.is_paid),
            is_done: Some(lesson.is_done),
            note: Some(lesson.note.clone()),
            status: None,
        }
    }
}

/// Restore the canonical order: student name ascending, then time ascending
/// as a parsed timestamp. Lessons whose time fails to parse sort after the
/// parseable ones for the same student, by the raw string.
pub fn sort_lessons(lessons: &mut [Lesson]) {
    lessons.sort_by(|a, b| {
        a.student_name
            .cmp(&b.student_name)
            .then_with(|| compare_times(&a.time, &b.time))
    });
}

pub(crate) fn compare_times(a: &str, b: &str) -> Ordering {
    match (time::parse_wall_clock(a), time::parse_wall_clock(b)) {
        (Ok(ta), Ok(tb)) => ta.cmp(&tb),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(name: &str, time: &str) -> LessonRecord {
        LessonRecord {
            id: None,
            student_id: None,
            name: name.to_string(),
            time: time.to_string(),
            duration: 60,
            is_paid: None,
            is_done: None,
            note: None,
            status: None,
        }
    }

    fn lesson(name: &str, time: &str) -> Lesson {
        Lesson {
            id: Uuid::new_v4(),
            student_id: None,
            student_name: name.to_string(),
            time: time.to_string(),
            duration: 60,
            is_paid: false,
            is_done: false,
            note: String::new(),
        }
    }

    #[rstest]
    #[case("done", true, true)]
    #[case("pending", false, false)]
    #[case("anything-else", false, false)]
    fn migrates_legacy_status(#[case] status: &str, #[case] paid: bool, #[case] done: bool) {
        let mut rec = record("Ana", "2025-01-01 10:00");
        rec.status = Some(status.to_string());

        assert!(rec.migrate());
        assert_eq!(rec.status, None);
        assert_eq!(rec.is_paid, Some(paid));
        assert_eq!(rec.is_done, Some(done));
        assert_eq!(rec.note, Some(String::new()));
    }

    #[test]
    fn migration_is_idempotent() {
        let mut rec = record("Ana", "2025-01-01 10:00");
        rec.status = Some("done".to_string());

        assert!(rec.migrate());
        let after_first = rec.clone();
        assert!(!rec.migrate());
        assert_eq!(rec, after_first);
    }

    #[test]
    fn explicit_flags_win_over_stray_status() {
        let mut rec = record("Ana", "2025-01-01 10:00");
        rec.is_paid = Some(true);
        rec.is_done = Some(false);
        rec.status = Some("pending".to_string());

        assert!(rec.migrate());
        assert_eq!(rec.status, None);
        assert_eq!(rec.is_paid, Some(true));
        assert_eq!(rec.is_done, Some(false));
    }

    #[test]
    fn legacy_json_parses_and_saves_without_status() {
        let mut rec: LessonRecord = serde_json::from_str(
            r#"{"name": "Ana", "time": "2025-01-01 10:00", "duration": 90, "status": "done"}"#,
        )
        .expect("parse");
        rec.migrate();

        let json = serde_json::to_value(&rec).expect("serialize");
        assert!(json.get("status").is_none());
        assert_eq!(json["isPaid"], serde_json::json!(true));
        assert_eq!(json["isDone"], serde_json::json!(true));
        assert_eq!(json["note"], serde_json::json!(""));
    }

    #[test]
    fn from_record_resolves_student_and_mints_id() {
        let ana = Student::new("Ana", "", vec![]);
        let mut rec = record("Ana", "2025-01-01 10:00");
        rec.migrate();

        let (lesson, changed) = Lesson::from_record(rec, std::slice::from_ref(&ana));
        assert!(changed);
        assert_eq!(lesson.student_id, Some(ana.id));
        assert_eq!(lesson.student_name, "Ana");
    }

    #[test]
    fn from_record_leaves_orphans_unlinked() {
        let ben = Student::new("Ben", "", vec![]);
        let mut rec = record("Ana", "2025-01-01 10:00");
        rec.migrate();
        rec.id = Some(Uuid::new_v4());

        let (lesson, changed) = Lesson::from_record(rec, std::slice::from_ref(&ben));
        assert!(lesson.student_id.is_none());
        // Nothing to backfill on an orphan that already has an id.
        assert!(!changed);
    }

    #[test]
    fn from_record_is_stable_once_healed() {
        let ana = Student::new("Ana", "", vec![]);
        let mut rec = record("Ana", "2025-01-01 10:00");
        rec.migrate();
        let (lesson, _) = Lesson::from_record(rec, std::slice::from_ref(&ana));

        let round_trip = LessonRecord::from(&lesson);
        let (again, changed) = Lesson::from_record(round_trip, std::slice::from_ref(&ana));
        assert!(!changed);
        assert_eq!(again, lesson);
    }

    #[test]
    fn sorts_by_name_then_parsed_time() {
        let mut lessons = vec![
            lesson("Ben", "2025-01-01 10:00"),
            lesson("Ana", "2025-03-01 09:00"),
            lesson("Ben", "2025-01-01 09:00"),
            lesson("Ana", "2025-01-01 12:00"),
        ];
        sort_lessons(&mut lessons);

        let order: Vec<(&str, &str)> = lessons
            .iter()
            .map(|l| (l.student_name.as_str(), l.time.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Ana", "2025-01-01 12:00"),
                ("Ana", "2025-03-01 09:00"),
                ("Ben", "2025-01-01 09:00"),
                ("Ben", "2025-01-01 10:00"),
            ]
        );
    }

    #[test]
    fn unparsable_times_sort_last_for_a_student() {
        let mut lessons = vec![
            lesson("Ana", "someday"),
            lesson("Ana", "2025-01-01 10:00"),
            lesson("Ana", "later"),
        ];
        sort_lessons(&mut lessons);

        let times: Vec<&str> = lessons.iter().map(|l| l.time.as_str()).collect();
        assert_eq!(times, vec!["2025-01-01 10:00", "later", "someday"]);
    }

    #[test]
    fn record_round_trip_uses_camel_case_keys() {
        let ana = Student::new("Ana", "", vec![]);
        let lesson = Lesson::default_for(&ana);
        let json = serde_json::to_value(LessonRecord::from(&lesson)).expect("serialize");

        assert!(json.get("isPaid").is_some());
        assert!(json.get("isDone").is_some());
        assert!(json.get("studentId").is_some());
        assert!(json.get("is_paid").is_none());
        assert_eq!(json["name"], serde_json::json!("Ana"));
    }
}
