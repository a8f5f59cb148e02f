//! Calendar-exchange export for scheduled lessons.
//!
//! Event construction happens here; the ICS line structure itself is
//! produced by the `icalendar` crate.

use std::path::Path;

use chrono::{Duration, Utc};
use icalendar::{Calendar, Component, Event, EventLike};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::utils::time;

/// File name of the exported document inside the export directory.
pub const EXPORT_FILENAME: &str = "tutor_schedule.ics";

/// Build one calendar event for a lesson slot.
///
/// The start interprets the stored wall-clock string with the offset in
/// effect right now, not the offset at the event's own date. The
/// description carries the meeting link when one exists, otherwise a
/// notice that there is none.
pub fn build_event(
    topic: &str,
    local_time: &str,
    duration_minutes: u32,
    join_url: Option<&str>,
) -> CoreResult<Event> {
    let naive = time::parse_wall_clock(local_time).map_err(|error| {
        CoreError::InvalidInput(format!("unparsable time {local_time}: {error}"))
    })?;
    let start = time::local_to_utc(naive);
    let end = start
        .checked_add_signed(Duration::minutes(i64::from(duration_minutes)))
        .ok_or_else(|| {
            CoreError::InvalidInput(format!(
                "event at {local_time} does not fit the calendar range"
            ))
        })?;
    let description = match join_url {
        Some(url) => format!("Zoom Link: {url}"),
        None => "No meeting link".to_string(),
    };

    Ok(Event::new()
        .uid(&Uuid::new_v4().to_string())
        .summary(topic)
        .description(&description)
        .starts(start)
        .ends(end)
        .timestamp(Utc::now())
        .done())
}

/// Serialize events into a single calendar document at `path`, creating
/// the parent directory when needed.
pub fn write_calendar(events: Vec<Event>, path: &Path) -> CoreResult<()> {
    let mut calendar = Calendar::new();
    for event in events {
        calendar.push(event);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|error| {
            CoreError::Storage(format!(
                "failed to create directory {}: {error}",
                parent.display()
            ))
        })?;
    }
    std::fs::write(path, calendar.to_string()).map_err(|error| {
        CoreError::Storage(format!("failed to write {}: {error}", path.display()))
    })?;
    Ok(())
}
