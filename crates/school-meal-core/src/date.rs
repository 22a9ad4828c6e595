//! Date expression normalization.
//!
//! Meal queries accept either a relative token or an 8-digit `YYYYMMDD`
//! date. [`normalize_date`] is total: any input it cannot use falls back to
//! today (with a logged diagnostic), so callers always receive a valid
//! calendar date.
//!
//! | Input | Result |
//! |-------|--------|
//! | absent, `오늘`, `today` | today |
//! | `내일`, `tomorrow` | today + 1 day |
//! | `어제`, `yesterday` | today − 1 day |
//! | `모레`, `day-after-tomorrow` | today + 2 days |
//! | `YYYYMMDD` naming a real date, year 0100 or later | that date |
//! | anything else | today |

use std::fmt;

use chrono::{Days, FixedOffset, Local, NaiveDate, Utc};
use serde::{Serialize, Serializer};

/// Earliest year accepted from an explicit `YYYYMMDD` input.
const MIN_YEAR: i32 = 100;

/// A calendar date rendered as `YYYYMMDD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MealDate(NaiveDate);

impl MealDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse an exact `YYYYMMDD` string naming a real calendar date.
    ///
    /// The components are rebuilt into a date and accepted only if that
    /// date exists, so `20250230` or `20251301` return `None`. Two-digit
    /// years (`0000`-`0099`) are rejected as well.
    pub fn parse_compact(input: &str) -> Option<Self> {
        if input.len() != 8 || !input.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year: i32 = input[0..4].parse().ok()?;
        if year < MIN_YEAR {
            return None;
        }
        let month: u32 = input[4..6].parse().ok()?;
        let day: u32 = input[6..8].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    /// `YYYY-MM-DD`, used in report headers.
    pub fn dashed(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for MealDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d"))
    }
}

impl Serialize for MealDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Source of "today" for relative date tokens.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    /// The host's local time zone.
    #[default]
    Local,
    /// A fixed UTC offset (e.g. `+09:00` for KST regardless of host zone).
    Offset(FixedOffset),
    /// A pinned date.
    Fixed(NaiveDate),
}

impl Clock {
    /// Clock for a whole-hour UTC offset, or `None` if out of range.
    pub fn utc_offset_hours(hours: i32) -> Option<Self> {
        FixedOffset::east_opt(hours * 3600).map(Clock::Offset)
    }

    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::Local => Local::now().date_naive(),
            Clock::Offset(offset) => Utc::now().with_timezone(offset).date_naive(),
            Clock::Fixed(date) => *date,
        }
    }
}

/// Normalize a date expression against `today`.
pub fn normalize_date(input: Option<&str>, today: NaiveDate) -> MealDate {
    let Some(raw) = input else {
        return MealDate(today);
    };
    let expr = raw.trim();

    let shifted = match expr {
        "" | "오늘" | "today" => Some(today),
        "내일" | "tomorrow" => today.checked_add_days(Days::new(1)),
        "어제" | "yesterday" => today.checked_sub_days(Days::new(1)),
        "모레" | "day-after-tomorrow" => today.checked_add_days(Days::new(2)),
        _ => None,
    };
    if let Some(date) = shifted {
        return MealDate(date);
    }

    if expr.len() == 8 && expr.bytes().all(|b| b.is_ascii_digit()) {
        if let Some(date) = MealDate::parse_compact(expr) {
            return date;
        }
        tracing::warn!(input = %raw, "not a valid calendar date; using today");
        return MealDate(today);
    }

    tracing::warn!(input = %raw, "unrecognized date expression; using today");
    MealDate(today)
}
