//! Calendar window a briefing reports on

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Display format used in prompts and subject lines, e.g. "March 02, 2026"
pub const WINDOW_DATE_FORMAT: &str = "%B %d, %Y";

/// Inclusive date range covered by one briefing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl ReportWindow {
    /// Create a window, rejecting ranges that end before they start
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvalidWindow(format!(
                "ends ({end}) before it starts ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Monday through Sunday of the week before the one containing `today`
    ///
    /// Run on a Monday, this is the full week that just ended.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use domain::ReportWindow;
    ///
    /// let monday = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
    /// let window = ReportWindow::previous_week(monday);
    /// assert_eq!(window.to_string(), "March 02, 2026 to March 08, 2026");
    /// ```
    pub fn previous_week(today: NaiveDate) -> Self {
        let days_back = i64::from(today.weekday().num_days_from_monday()) + 7;
        let start = today - Duration::days(days_back);
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    /// A single-day window
    pub const fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn start_label(&self) -> String {
        self.start.format(WINDOW_DATE_FORMAT).to_string()
    }

    pub fn end_label(&self) -> String {
        self.end.format(WINDOW_DATE_FORMAT).to_string()
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

impl fmt::Display for ReportWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start_label(), self.end_label())
    }
}
