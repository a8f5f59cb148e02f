//! The scheduling engine.
//!
//! Owns the load-and-heal cycle over stored students and lessons, the
//! single-lesson edit operations, the batch meeting run with calendar
//! export, and the emailed per-student report.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use icalendar::Event;
use uuid::Uuid;

use crate::cancel::CancelToken;
use crate::error::{CoreError, CoreResult};
use crate::ics;
use crate::model::{sort_lessons, Lesson, LessonRecord, Student, StudentRecord};
use crate::report;
use crate::services::{MailService, MeetingService};
use crate::store::ScheduleStore;
use crate::template;
use crate::utils::time;

const TEMPLATE_NAME: &str = "gmail.html";
const MIN_DURATION_MINUTES: u32 = 1;
const MAX_DURATION_MINUTES: u32 = 480;

/// Outcome of a single externally-visible step, batch item or mail send.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub label: String,
    pub success: bool,
    pub message: String,
}

impl StepOutcome {
    pub fn ok(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            success: true,
            message: message.into(),
        }
    }

    pub fn error(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            success: false,
            message: message.into(),
        }
    }
}

/// Aggregate result of a batch scheduling run. Always complete, even
/// under partial failure or cancellation.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub items: Vec<StepOutcome>,
    /// Present only when an export was attempted. Carries the file path
    /// on success, the failure message otherwise.
    pub export: Option<StepOutcome>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.export.is_none()
    }

    /// Human-readable multi-line summary: one `label: OK` or
    /// `label: Err: message` line per item, then the export line set off
    /// by a blank line.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self
            .items
            .iter()
            .map(|item| {
                if item.success {
                    format!("{}: OK", item.label)
                } else {
                    format!("{}: Err: {}", item.label, item.message)
                }
            })
            .collect();
        if let Some(export) = &self.export {
            if export.success {
                lines.push(format!("\nICS File exported to: {}", export.message));
            } else {
                lines.push(format!("\nICS Export Failed: {}", export.message));
            }
        }
        lines.join("\n")
    }
}

/// The orchestrating core. Holds the persistence gateway and the external
/// collaborators behind their capability traits; one instance per process.
pub struct Scheduler {
    store: Arc<dyn ScheduleStore>,
    meetings: Arc<dyn MeetingService>,
    mail: Arc<dyn MailService>,
    export_dir: PathBuf,
}

impl Scheduler {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        meetings: Arc<dyn MeetingService>,
        mail: Arc<dyn MailService>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            meetings,
            mail,
            export_dir,
        }
    }

    /// Load both collections and heal them: mint missing ids, collapse the
    /// deprecated lesson `status` field, resolve student links by name,
    /// synthesize a default lesson for every student that has none, and
    /// restore canonical order. Changes are persisted, so a second call
    /// with no mutation in between returns identical data.
    pub fn load_all(&self) -> CoreResult<(Vec<Student>, Vec<Lesson>)> {
        let mut students_changed = false;
        let mut students = Vec::new();
        for record in self.store.load_students()? {
            let (student, changed) = record.into_student();
            students_changed |= changed;
            students.push(student);
        }

        let mut migrated = 0usize;
        let mut lessons_changed = false;
        let mut lessons = Vec::new();
        for mut record in self.store.load_lessons()? {
            if record.migrate() {
                migrated += 1;
            }
            let (lesson, changed) = Lesson::from_record(record, &students);
            lessons_changed |= changed;
            lessons.push(lesson);
        }
        if migrated > 0 {
            lessons_changed = true;
            tracing::info!("migrated {migrated} lesson record(s) to the current shape");
        }

        let mut synthesized = 0usize;
        for student in &students {
            let has_lesson = lessons
                .iter()
                .any(|lesson| lesson.student_id == Some(student.id));
            if !has_lesson {
                lessons.push(Lesson::default_for(student));
                synthesized += 1;
            }
        }
        if synthesized > 0 {
            lessons_changed = true;
            tracing::info!("synthesized {synthesized} default lesson(s) for students without one");
        }

        sort_lessons(&mut lessons);

        if students_changed {
            self.save_students(&students)?;
        }
        if lessons_changed {
            self.save_lessons(&lessons)?;
        }
        Ok((students, lessons))
    }

    /// Register a student. The name must be non-blank and not already
    /// taken; emails are trimmed and blanks dropped. The student's first
    /// lesson is synthesized on the next load.
    pub fn add_student(
        &self,
        name: &str,
        username: &str,
        emails: &[String],
    ) -> CoreResult<Student> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidInput(
                "student name is required".to_string(),
            ));
        }
        let (mut students, _) = self.load_all()?;
        if students.iter().any(|student| student.name == name) {
            return Err(CoreError::InvalidInput(format!(
                "a student named {name} already exists"
            )));
        }

        let emails: Vec<String> = emails
            .iter()
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
            .collect();
        let student = Student::new(name, username.trim(), emails);
        students.push(student.clone());
        self.save_students(&students)?;
        tracing::info!("added student {}", student.name);
        Ok(student)
    }

    /// Remove a student from the roster. Their lessons stay behind as
    /// orphans; the link is cleared on the next load.
    pub fn remove_student(&self, id: Uuid) -> CoreResult<Student> {
        let (mut students, _) = self.load_all()?;
        let index = students
            .iter()
            .position(|student| student.id == id)
            .ok_or_else(|| CoreError::NotFound(format!("student {id}")))?;
        let removed = students.remove(index);
        self.save_students(&students)?;
        tracing::info!("removed student {}", removed.name);
        Ok(removed)
    }

    /// Append a lesson for an existing student, unpaid and not held.
    pub fn add_lesson(
        &self,
        student_id: Uuid,
        lesson_time: &str,
        duration: u32,
        note: &str,
    ) -> CoreResult<Lesson> {
        validate_time(lesson_time)?;
        validate_duration(duration)?;
        let (students, mut lessons) = self.load_all()?;
        let student = students
            .iter()
            .find(|student| student.id == student_id)
            .ok_or_else(|| CoreError::NotFound(format!("student {student_id}")))?;

        let lesson = Lesson {
            id: Uuid::new_v4(),
            student_id: Some(student.id),
            student_name: student.name.clone(),
            time: lesson_time.to_string(),
            duration,
            is_paid: false,
            is_done: false,
            note: note.to_string(),
        };
        lessons.push(lesson.clone());
        sort_lessons(&mut lessons);
        self.save_lessons(&lessons)?;
        Ok(lesson)
    }

    /// Copy a lesson one week forward as a fresh slot: flags cleared, note
    /// kept. A time that does not parse is kept unchanged rather than
    /// failing the copy.
    pub fn duplicate_lesson(&self, id: Uuid) -> CoreResult<Lesson> {
        let (_, mut lessons) = self.load_all()?;
        let source = lessons
            .iter()
            .find(|lesson| lesson.id == id)
            .ok_or_else(|| CoreError::NotFound(format!("lesson {id}")))?
            .clone();

        let mut copy = source.clone();
        copy.id = Uuid::new_v4();
        copy.is_paid = false;
        copy.is_done = false;
        match time::shift_days(&source.time, 7) {
            Ok(shifted) => copy.time = shifted,
            Err(error) => {
                tracing::warn!(
                    "keeping time of duplicated lesson, {} does not parse: {error}",
                    source.time
                );
            }
        }

        lessons.push(copy.clone());
        sort_lessons(&mut lessons);
        self.save_lessons(&lessons)?;
        Ok(copy)
    }

    pub fn edit_time(&self, id: Uuid, new_time: &str) -> CoreResult<Lesson> {
        validate_time(new_time)?;
        let new_time = new_time.to_string();
        self.update_lesson(id, true, move |lesson| lesson.time = new_time)
    }

    pub fn edit_duration(&self, id: Uuid, duration: u32) -> CoreResult<Lesson> {
        validate_duration(duration)?;
        self.update_lesson(id, false, move |lesson| lesson.duration = duration)
    }

    pub fn edit_note(&self, id: Uuid, note: &str) -> CoreResult<Lesson> {
        let note = note.to_string();
        self.update_lesson(id, false, move |lesson| lesson.note = note)
    }

    pub fn set_paid(&self, id: Uuid, paid: bool) -> CoreResult<Lesson> {
        self.update_lesson(id, false, move |lesson| lesson.is_paid = paid)
    }

    pub fn set_done(&self, id: Uuid, done: bool) -> CoreResult<Lesson> {
        self.update_lesson(id, false, move |lesson| lesson.is_done = done)
    }

    pub fn delete_lesson(&self, id: Uuid) -> CoreResult<Lesson> {
        let (_, mut lessons) = self.load_all()?;
        let index = lessons
            .iter()
            .position(|lesson| lesson.id == id)
            .ok_or_else(|| CoreError::NotFound(format!("lesson {id}")))?;
        let removed = lessons.remove(index);
        self.save_lessons(&lessons)?;
        Ok(removed)
    }

    /// Run the batch: one remote meeting per lesson in canonical order and
    /// one exported calendar document at the end.
    ///
    /// Missing credentials short-circuit the whole run with a single error
    /// item. A failed remote call is recorded and the batch moves on; the
    /// lesson's event still goes into the export, with a notice in place
    /// of the link. Cancellation is honored between items and preserves
    /// partial results, including the export of events gathered so far.
    pub fn schedule_all(&self, lessons: &[Lesson], cancel: &CancelToken) -> BatchReport {
        let mut batch = BatchReport::default();

        if !self.meetings.is_configured() {
            batch.items.push(StepOutcome::error(
                "zoom",
                "Missing ZOOM credentials in .env file.",
            ));
            return batch;
        }

        let mut ordered = lessons.to_vec();
        sort_lessons(&mut ordered);

        let mut ordinals: HashMap<String, u32> = HashMap::new();
        let mut events: Vec<Event> = Vec::new();

        for lesson in &ordered {
            if cancel.is_cancelled() {
                tracing::info!("batch cancelled after {} item(s)", batch.items.len());
                batch.cancelled = true;
                break;
            }

            let ordinal = {
                let slot = ordinals.entry(lesson.student_name.clone()).or_insert(0);
                *slot += 1;
                *slot
            };
            let topic = format!("{}{ordinal:02}", lesson.student_name);

            let outcome = self
                .meetings
                .create_meeting(&topic, &lesson.time, lesson.duration);
            let join_url = outcome.as_deref().ok();

            match ics::build_event(&topic, &lesson.time, lesson.duration, join_url) {
                Ok(event) => events.push(event),
                Err(error) => {
                    tracing::warn!("no calendar event for {topic}: {error}");
                }
            }

            batch.items.push(match outcome {
                Ok(url) => StepOutcome::ok(topic, url),
                Err(message) => StepOutcome::error(topic, message),
            });
        }

        if !events.is_empty() {
            let path = self.export_dir.join(ics::EXPORT_FILENAME);
            batch.export = Some(match ics::write_calendar(events, &path) {
                Ok(()) => StepOutcome::ok("ics", path.display().to_string()),
                Err(error) => StepOutcome::error("ics", error.to_string()),
            });
        }

        batch
    }

    /// Build and email the status report for one student.
    ///
    /// The body template comes from the store when present, the built-in
    /// fallback otherwise. A delivery failure comes back as an error
    /// outcome, not as a fault.
    pub fn send_report(
        &self,
        student_id: Uuid,
        subject: Option<&str>,
        comment: &str,
        attachments: &[PathBuf],
    ) -> CoreResult<StepOutcome> {
        let (students, lessons) = self.load_all()?;
        let student = students
            .iter()
            .find(|student| student.id == student_id)
            .ok_or_else(|| CoreError::NotFound(format!("student {student_id}")))?;
        if student.email_recipients.is_empty() {
            return Err(CoreError::InvalidInput(format!(
                "no email recipients configured for {}",
                student.name
            )));
        }

        let context = report::build_student_report(student, &lessons);
        let stored = self.store.load_template(TEMPLATE_NAME)?;
        let body_template = if stored.is_empty() {
            tracing::warn!("no stored template {TEMPLATE_NAME}, using the built-in body");
            template::FALLBACK_BODY.to_string()
        } else {
            stored
        };
        let body = template::render(&body_template, &context.template_vars(comment));
        let subject = match subject {
            Some(subject) => subject.to_string(),
            None => template::default_subject(&student.name),
        };

        let outcome = match self
            .mail
            .send(&student.email_recipients, &subject, &body, attachments)
        {
            Ok(()) => StepOutcome::ok(student.name.clone(), "Email sent successfully."),
            Err(message) => StepOutcome::error(student.name.clone(), message),
        };
        Ok(outcome)
    }

    fn update_lesson<F>(&self, id: Uuid, resort: bool, apply: F) -> CoreResult<Lesson>
    where
        F: FnOnce(&mut Lesson),
    {
        let (_, mut lessons) = self.load_all()?;
        let index = lessons
            .iter()
            .position(|lesson| lesson.id == id)
            .ok_or_else(|| CoreError::NotFound(format!("lesson {id}")))?;
        apply(&mut lessons[index]);
        let updated = lessons[index].clone();
        if resort {
            sort_lessons(&mut lessons);
        }
        self.save_lessons(&lessons)?;
        Ok(updated)
    }

    fn save_students(&self, students: &[Student]) -> CoreResult<()> {
        let records: Vec<StudentRecord> = students.iter().map(StudentRecord::from).collect();
        self.store.save_students(&records)
    }

    fn save_lessons(&self, lessons: &[Lesson]) -> CoreResult<()> {
        let records: Vec<LessonRecord> = lessons.iter().map(LessonRecord::from).collect();
        self.store.save_lessons(&records)
    }
}

fn validate_time(value: &str) -> CoreResult<()> {
    time::parse_wall_clock(value)
        .map(|_| ())
        .map_err(|error| CoreError::InvalidInput(format!("unparsable time {value}: {error}")))
}

fn validate_duration(duration: u32) -> CoreResult<()> {
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration) {
        return Err(CoreError::InvalidInput(format!(
            "duration must be between {MIN_DURATION_MINUTES} and {MAX_DURATION_MINUTES} minutes, got {duration}"
        )));
    }
    Ok(())
}
