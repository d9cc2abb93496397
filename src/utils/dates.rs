//! Date formatting with `time` format descriptions, e.g.
//! `"[year]-[month]-[day]"`.

use time::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Today (UTC) shifted by `days_from_today`, rendered with `format`.
pub fn date_from_today(days_from_today: i64, format: &str) -> Result<String, String> {
    let description =
        format_description::parse(format).map_err(|e| format!("Invalid date format `{format}`: {e}"))?;
    let date = OffsetDateTime::now_utc() + Duration::days(days_from_today);
    date.format(&description)
        .map_err(|e| format!("Failed to format date with `{format}`: {e}"))
}

/// Re-render `input`, written in `actual_format`, using `expected_format`.
pub fn convert_date_format(
    input: &str,
    actual_format: &str,
    expected_format: &str,
) -> Result<String, String> {
    log::info!("Converting date - {input} - to format: {expected_format}");
    let from = format_description::parse(actual_format)
        .map_err(|e| format!("Invalid date format `{actual_format}`: {e}"))?;
    let to = format_description::parse(expected_format)
        .map_err(|e| format!("Invalid date format `{expected_format}`: {e}"))?;
    let date = Date::parse(input, &from)
        .map_err(|e| format!("Date `{input}` does not match `{actual_format}`: {e}"))?;
    date.format(&to)
        .map_err(|e| format!("Failed to format date with `{expected_format}`: {e}"))
}

/// Re-render `input`, a local date-time in `from_offset`, as the same instant
/// in `to_offset`. Both use `format`. Offsets are `UTC`, `Z`, `GMT` or
/// `+hh:mm` / `-hh:mm`.
pub fn convert_date_time_zone(
    input: &str,
    format: &str,
    from_offset: &str,
    to_offset: &str,
) -> Result<String, String> {
    let description =
        format_description::parse(format).map_err(|e| format!("Invalid date format `{format}`: {e}"))?;
    let from = parse_offset(from_offset)?;
    let to = parse_offset(to_offset)?;
    let local = PrimitiveDateTime::parse(input, &description)
        .map_err(|e| format!("Cannot parse the date `{input}` with `{format}`: {e}"))?;
    local
        .assume_offset(from)
        .to_offset(to)
        .format(&description)
        .map_err(|e| format!("Failed to format date with `{format}`: {e}"))
}

fn parse_offset(offset: &str) -> Result<UtcOffset, String> {
    let offset = offset.trim();
    if ["UTC", "Z", "GMT"].iter().any(|utc| offset.eq_ignore_ascii_case(utc)) {
        return Ok(UtcOffset::UTC);
    }
    let description = format_description::parse("[offset_hour sign:mandatory]:[offset_minute]")
        .map_err(|e| e.to_string())?;
    UtcOffset::parse(offset, &description).map_err(|e| format!("Invalid UTC offset `{offset}`: {e}"))
}
