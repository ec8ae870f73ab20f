//! # Default Issuance Date
//!
//! `D*` defaults to the current local calendar date as `YYYYMMDD` when a
//! caller does not choose one. There is no timezone or time-of-day concept
//! in the code itself; only the local date is taken.

use chrono::{Datelike, Local, NaiveDate};

use crate::error::DateError;
use crate::fields::IssueDate;

/// Today's local date as an 8-digit [`IssueDate`].
pub fn today() -> IssueDate {
    let now = Local::now().date_naive();
    // chrono's local clock never reports a year before 1.
    IssueDate::from_trusted(format_date(now))
}

/// Convert a calendar date into an [`IssueDate`].
///
/// # Errors
///
/// [`DateError::YearZero`] for years before 1 (proleptic year 0 and BCE).
pub fn issue_date_from(date: NaiveDate) -> Result<IssueDate, DateError> {
    if date.year() < 1 {
        return Err(DateError::YearZero);
    }
    Ok(IssueDate::from_trusted(format_date(date)))
}

fn format_date(date: NaiveDate) -> String {
    format!("{:04}{:02}{:02}", date.year(), date.month(), date.day())
}
