//! Date parsing for the `--before` cutoff and upstream `publishTime` values.
//!
//! Both sides go through [`parse_datetime`] so they are compared on the same
//! footing: offset-bearing strings are converted to UTC, naive strings are
//! taken to already be UTC, and bare dates mean midnight UTC.

use crate::error::ScrapeError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

/// Parse an ISO-8601 timestamp or date into UTC.
///
/// Accepted shapes, with `T` or a space between date and time:
/// - dates: `2026-01-01`, `20260101`
/// - times: `10`, `10:30`, `10:30:15`, `1030`, `103015`, each with an optional `.fff` / `,fff` fraction
/// - offsets: `Z`, `+07`, `+0700`, `+07:00` (optionally preceded by a space)
///
/// # Arguments
///
/// * `raw` - The string to parse; surrounding whitespace is ignored
///
/// # Returns
///
/// The instant in UTC, or `None` when the string is not one of the shapes above.
/// A missing offset means UTC, a missing time means midnight.
///
/// # Examples
///
/// ```ignore
/// assert!(parse_datetime("2026-01-01").is_some());
/// assert!(parse_datetime("2026-01-01T07:00+07:00").is_some());
/// assert!(parse_datetime("yesterday").is_none());
/// ```
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let (date_part, rest) = match s.find(['T', 't', ' ']) {
        Some(i) => (&s[..i], Some(s[i + 1..].trim())),
        None => (s, None),
    };
    let date = parse_date(date_part)?;
    let Some(rest) = rest else {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    };

    let (time_part, offset) = split_offset(rest)?;
    let naive = date.and_time(parse_time(time_part.trim_end())?);
    match offset {
        None => Some(naive.and_utc()),
        Some(offset) => offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

fn parse_date(d: &str) -> Option<NaiveDate> {
    if d.len() == 8 && d.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::from_ymd_opt(
            d[..4].parse().ok()?,
            d[4..6].parse().ok()?,
            d[6..].parse().ok()?,
        );
    }
    NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()
}

/// Split a trailing UTC offset off the time portion.
fn split_offset(rest: &str) -> Option<(&str, Option<FixedOffset>)> {
    if let Some(time) = rest.strip_suffix(['Z', 'z']) {
        return Some((time, FixedOffset::east_opt(0)));
    }
    match rest.rfind(['+', '-']) {
        None => Some((rest, None)),
        Some(i) => Some((&rest[..i], Some(parse_offset(&rest[i..])?))),
    }
}

/// `+07`, `+0700` or `+07:00` (and the `-` forms).
fn parse_offset(o: &str) -> Option<FixedOffset> {
    let sign = match o.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let digits: String = o[1..].chars().filter(|c| *c != ':').collect();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes): (i32, i32) = match digits.len() {
        2 => (digits.parse().ok()?, 0),
        4 => (digits[..2].parse().ok()?, digits[2..].parse().ok()?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn parse_time(t: &str) -> Option<NaiveTime> {
    if t.is_empty() || !t.is_ascii() {
        return None;
    }
    let (clock, fraction) = match t.find(['.', ',']) {
        Some(i) => (&t[..i], Some(&t[i + 1..])),
        None => (t, None),
    };

    let fields: Vec<&str> = if clock.contains(':') {
        clock.split(':').collect()
    } else if clock.len() % 2 == 0 {
        (0..clock.len()).step_by(2).map(|i| &clock[i..i + 2]).collect()
    } else {
        return None;
    };
    let well_formed = fields
        .iter()
        .all(|f| (1..=2).contains(&f.len()) && f.bytes().all(|b| b.is_ascii_digit()));
    if fields.is_empty() || fields.len() > 3 || !well_formed {
        return None;
    }

    let field = |i: usize| fields.get(i).map_or(Some(0), |f| f.parse::<u32>().ok());
    let nanos = match fraction {
        None => 0,
        Some(frac) if !frac.is_empty() && frac.bytes().all(|b| b.is_ascii_digit()) => {
            format!("{:0<9}", &frac[..frac.len().min(9)]).parse().ok()?
        }
        Some(_) => return None,
    };
    NaiveTime::from_hms_nano_opt(field(0)?, field(1)?, field(2)?, nanos)
}

/// `clap` value parser for `--before`.
pub fn parse_cutoff(raw: &str) -> Result<DateTime<Utc>, ScrapeError> {
    parse_datetime(raw).ok_or_else(|| {
        ScrapeError::InvalidDate(format!(
            "{raw:?} (expected ISO 8601 such as 2026-01-01T00:00:00+07:00, or YYYY-MM-DD)"
        ))
    })
}
