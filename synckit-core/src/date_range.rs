//! Date range for filtering event fetches.

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Number of days fetched in each direction when no range is given
pub const DEFAULT_SYNC_DAYS: i64 = 365;

/// Date range for filtering events.
/// None values mean unbounded in that direction.
#[derive(Debug, Clone, PartialEq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl Default for DateRange {
    /// Default range: ±DEFAULT_SYNC_DAYS from now
    fn default() -> Self {
        DateRange::around(Utc::now(), DEFAULT_SYNC_DAYS)
    }
}

impl DateRange {
    /// `days` on either side of `now`.
    pub fn around(now: DateTime<Utc>, days: i64) -> Self {
        DateRange {
            from: Some(now - Duration::days(days)),
            to: Some(now + Duration::days(days)),
        }
    }

    /// Parse a date string into a DateRange.
    /// - `from`: "start" for unbounded, or YYYY-MM-DD
    /// - `to`: YYYY-MM-DD, defaults to +`days` if not specified
    pub fn from_args(from: Option<&str>, to: Option<&str>, days: i64) -> Result<Self, String> {
        let now = Utc::now();

        let from_dt = match from {
            Some("start") => None, // Unbounded past
            Some(s) => Some(parse_date_start(s)?),
            None => Some(now - Duration::days(days)),
        };

        let to_dt = match to {
            Some(s) => Some(parse_date_end(s)?),
            None => Some(now + Duration::days(days)),
        };

        if let (Some(from), Some(to)) = (from_dt, to_dt) {
            if from > to {
                return Err(format!("Range start {} is after range end {}", from, to));
            }
        }

        Ok(DateRange {
            from: from_dt,
            to: to_dt,
        })
    }

    /// Whether an occurrence spanning `start..end` overlaps this range.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        let after_from = self.from.is_none_or(|from| end >= from);
        let before_to = self.to.is_none_or(|to| start <= to);
        after_from && before_to
    }
}

/// Parse YYYY-MM-DD as start of day in UTC
fn parse_date_start(s: &str) -> Result<DateTime<Utc>, String> {
    let date = parse_date(s)?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc())
}

/// Parse YYYY-MM-DD as end of day in UTC
fn parse_date_end(s: &str) -> Result<DateTime<Utc>, String> {
    let date = parse_date(s)?;
    date.and_hms_opt(23, 59, 59)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("Invalid end of day for '{}'", s))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
}
