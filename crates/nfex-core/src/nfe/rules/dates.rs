//! Issue timestamp parsing (`dhEmi` in layout 3.10+/4.00, `dEmi` in 2.00).

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::patterns::BR_DATE;

/// A parsed issue timestamp. Legacy layouts only carry the date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IssueTimestamp {
    /// Full timestamp with the issuer's UTC offset.
    DateTime(DateTime<FixedOffset>),
    /// Timestamp without offset.
    Local(NaiveDateTime),
    /// Date only.
    Date(NaiveDate),
}

impl IssueTimestamp {
    /// Calendar date of issue, in the issuer's local time.
    pub fn date(&self) -> NaiveDate {
        match self {
            IssueTimestamp::DateTime(dt) => dt.date_naive(),
            IssueTimestamp::Local(dt) => dt.date(),
            IssueTimestamp::Date(d) => *d,
        }
    }

    /// Brazilian display form (15/06/2023).
    pub fn format_br(&self) -> String {
        self.date().format("%d/%m/%Y").to_string()
    }
}

/// Parse `dhEmi`/`dEmi` text. Returns `None` for empty or unknown formats.
pub fn parse_issue_timestamp(s: &str) -> Option<IssueTimestamp> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(IssueTimestamp::DateTime(dt));
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(IssueTimestamp::Local(dt));
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(IssueTimestamp::Date(d));
    }

    let caps = BR_DATE.captures(s)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).map(IssueTimestamp::Date)
}
