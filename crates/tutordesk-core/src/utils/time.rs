use chrono::{DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDateTime, TimeZone, Utc};

/// Wall-clock format used for lesson times in storage and display.
pub const WALL_CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn parse_wall_clock(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, WALL_CLOCK_FORMAT)
}

pub fn format_wall_clock(value: NaiveDateTime) -> String {
    value.format(WALL_CLOCK_FORMAT).to_string()
}

pub fn now_wall_clock() -> String {
    format_wall_clock(Local::now().naive_local())
}

/// Interpret a naive wall-clock value in the local timezone and convert it
/// to UTC. The offset in effect right now is attached to every value, even
/// for dates that fall on the other side of a daylight-saving switch.
pub fn local_to_utc(value: NaiveDateTime) -> DateTime<Utc> {
    let offset: FixedOffset = *Local::now().offset();
    match offset.from_local_datetime(&value) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        // Only reachable at the very edge of the calendar range, where
        // applying the offset overflows; treat the value as already UTC.
        LocalResult::None => Utc.from_utc_datetime(&value),
    }
}

/// Shift a stored wall-clock string by the given number of days, preserving
/// the time of day. Fails when the input does not parse; a shift with no
/// room left in the calendar range keeps the value unchanged.
pub fn shift_days(value: &str, days: i64) -> Result<String, chrono::ParseError> {
    let parsed = parse_wall_clock(value)?;
    match parsed.checked_add_signed(Duration::days(days)) {
        Some(shifted) => Ok(format_wall_clock(shifted)),
        None => {
            tracing::warn!("keeping {value}, a {days} day shift leaves the calendar range");
            Ok(value.to_string())
        }
    }
}
