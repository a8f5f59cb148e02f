//! Command-line shell over the scheduling core.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use tutordesk_core::config::{SmtpConfig, StoragePaths, ZoomConfig};
use tutordesk_core::model::{Lesson, Student};
use tutordesk_core::services::{SmtpMailService, ZoomMeetingService};
use tutordesk_core::store::FileStore;
use tutordesk_core::{CancelToken, CoreResult, Scheduler};

/// Tutoring scheduler: lessons on disk, meetings on Zoom, reports by mail.
#[derive(Parser, Debug)]
#[clap(name = "tutordesk", version)]
struct Cli {
    /// Root directory holding resources/ and downloads/
    #[clap(short, long, default_value = ".")]
    root: PathBuf,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show all students and lessons
    List,
    /// Register a student
    AddStudent {
        name: String,
        /// Short handle shown in report labels
        #[clap(short, long, default_value = "")]
        username: String,
        /// Report recipient, repeatable
        #[clap(short, long = "email")]
        emails: Vec<String>,
    },
    /// Remove a student; their lessons stay behind as orphans
    RemoveStudent { id: Uuid },
    /// Add a lesson for a student
    AddLesson {
        student_id: Uuid,
        /// Wall-clock time, e.g. "2025-01-01 10:00"
        time: String,
        /// Length in minutes
        #[clap(short, long, default_value_t = 60)]
        duration: u32,
        #[clap(short, long, default_value = "")]
        note: String,
    },
    /// Copy a lesson one week forward with cleared paid/done flags
    Duplicate { id: Uuid },
    /// Change a lesson's time
    EditTime { id: Uuid, time: String },
    /// Change a lesson's duration in minutes
    EditDuration { id: Uuid, duration: u32 },
    /// Change a lesson's note
    EditNote { id: Uuid, note: String },
    /// Mark a lesson paid or unpaid
    Paid {
        id: Uuid,
        #[clap(action = clap::ArgAction::Set, default_value_t = true)]
        value: bool,
    },
    /// Mark a lesson held or not held
    Done {
        id: Uuid,
        #[clap(action = clap::ArgAction::Set, default_value_t = true)]
        value: bool,
    },
    /// Delete a lesson
    Delete { id: Uuid },
    /// Create a Zoom meeting per lesson and export the calendar file
    ScheduleAll,
    /// Email a student their status report
    SendReport {
        student_id: Uuid,
        /// Subject line; defaults to a dated one
        #[clap(short, long)]
        subject: Option<String>,
        /// Free-text comment substituted into the body
        #[clap(short, long, default_value = "")]
        comment: String,
        /// File attachment, repeatable
        #[clap(short, long = "attach")]
        attachments: Vec<PathBuf>,
    },
}

fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CoreResult<()> {
    let paths = StoragePaths::new(&cli.root);
    let store = Arc::new(FileStore::new(paths.resources_dir));
    let meetings = Arc::new(ZoomMeetingService::new(ZoomConfig::from_env()));
    let mail = Arc::new(SmtpMailService::new(SmtpConfig::from_env()));
    let scheduler = Scheduler::new(store, meetings, mail, paths.export_dir);

    match cli.command {
        Command::List => {
            let (students, lessons) = scheduler.load_all()?;
            println!("Students ({}):", students.len());
            for student in &students {
                println!("  {}", student_line(student));
            }
            println!("Lessons ({}):", lessons.len());
            for lesson in &lessons {
                println!("  {}", lesson_line(lesson));
            }
        }
        Command::AddStudent {
            name,
            username,
            emails,
        } => {
            let student = scheduler.add_student(&name, &username, &emails)?;
            println!("Added student {}", student_line(&student));
        }
        Command::RemoveStudent { id } => {
            let student = scheduler.remove_student(id)?;
            println!("Removed student {}", student.name);
        }
        Command::AddLesson {
            student_id,
            time,
            duration,
            note,
        } => {
            let lesson = scheduler.add_lesson(student_id, &time, duration, &note)?;
            println!("Added lesson {}", lesson_line(&lesson));
        }
        Command::Duplicate { id } => {
            let lesson = scheduler.duplicate_lesson(id)?;
            println!("Duplicated to {}", lesson_line(&lesson));
        }
        Command::EditTime { id, time } => {
            let lesson = scheduler.edit_time(id, &time)?;
            println!("Updated {}", lesson_line(&lesson));
        }
        Command::EditDuration { id, duration } => {
            let lesson = scheduler.edit_duration(id, duration)?;
            println!("Updated {}", lesson_line(&lesson));
        }
        Command::EditNote { id, note } => {
            let lesson = scheduler.edit_note(id, &note)?;
            println!("Updated {}", lesson_line(&lesson));
        }
        Command::Paid { id, value } => {
            let lesson = scheduler.set_paid(id, value)?;
            println!("Updated {}", lesson_line(&lesson));
        }
        Command::Done { id, value } => {
            let lesson = scheduler.set_done(id, value)?;
            println!("Updated {}", lesson_line(&lesson));
        }
        Command::Delete { id } => {
            let lesson = scheduler.delete_lesson(id)?;
            println!("Deleted lesson {} at {}", lesson.student_name, lesson.time);
        }
        Command::ScheduleAll => {
            let (_, lessons) = scheduler.load_all()?;
            if lessons.is_empty() {
                println!("No schedules to process.");
                return Ok(());
            }
            let batch = scheduler.schedule_all(&lessons, &CancelToken::noop());
            println!("{}", batch.render());
        }
        Command::SendReport {
            student_id,
            subject,
            comment,
            attachments,
        } => {
            let outcome =
                scheduler.send_report(student_id, subject.as_deref(), &comment, &attachments)?;
            println!("{}: {}", outcome.label, outcome.message);
            if !outcome.success {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

fn student_line(student: &Student) -> String {
    let username = if student.username.is_empty() {
        String::new()
    } else {
        format!(" ({})", student.username)
    };
    let emails = if student.email_recipients.is_empty() {
        String::new()
    } else {
        format!("  <{}>", student.email_recipients.join(", "))
    };
    format!("{}  {}{}{}", student.id, student.name, username, emails)
}

fn lesson_line(lesson: &Lesson) -> String {
    let note = if lesson.note.is_empty() {
        String::new()
    } else {
        format!("  # {}", lesson.note)
    };
    format!(
        "{}  {} {}  {}min  {}{}",
        lesson.id,
        lesson.glyph().as_str(),
        lesson.time,
        lesson.duration,
        lesson.student_name,
        note
    )
}
