//! # Calendar Validator
//!
//! Validates the variable-length `D*` field, `Y...YMMDD`, against the
//! proleptic Gregorian calendar. The year may have any number of digits, so
//! it is never converted to a fixed-width integer: leap-year arithmetic only
//! needs the year modulo 400, which is folded digit by digit.

use crate::error::DateError;

const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Validate a `Y...YMMDD` date string.
///
/// The trailing four digits are month and day; everything before them is
/// the year. February has 29 days when the year is divisible by 4 and
/// either not divisible by 100 or divisible by 400.
///
/// # Errors
///
/// Returns a [`DateError`] naming the first rule the date violates.
///
/// ```
/// use sfid_core::calendar::validate_date;
///
/// assert!(validate_date("20240229").is_ok());
/// assert!(validate_date("19000229").is_err());
/// ```
pub fn validate_date(d: &str) -> Result<(), DateError> {
    if !d.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateError::NotDigits(d.to_string()));
    }
    if d.len() < 5 {
        return Err(DateError::TooShort(d.to_string()));
    }

    let (year, month_day) = d.split_at(d.len() - 4);
    if year.bytes().all(|b| b == b'0') {
        return Err(DateError::YearZero);
    }

    let month = two_digits(&month_day[..2]);
    let day = two_digits(&month_day[2..]);
    if !(1..=12).contains(&month) {
        return Err(DateError::MonthOutOfRange(month));
    }

    let max = days_in_month(year, month);
    if day < 1 || day > max {
        return Err(DateError::DayOutOfRange { month, day, max });
    }
    Ok(())
}

/// Leap-year rule over a decimal year string of any length.
pub fn is_leap_year(year_digits: &str) -> bool {
    let rem = decimal_mod(year_digits, 400);
    rem % 4 == 0 && (rem % 100 != 0 || rem == 0)
}

fn days_in_month(year_digits: &str, month: u32) -> u32 {
    if month == 2 && is_leap_year(year_digits) {
        29
    } else {
        DAYS_IN_MONTH[(month - 1) as usize]
    }
}

// Caller guarantees ASCII digits.
fn decimal_mod(digits: &str, modulus: u32) -> u32 {
    digits
        .bytes()
        .fold(0, |acc, b| (acc * 10 + u32::from(b - b'0')) % modulus)
}

fn two_digits(s: &str) -> u32 {
    decimal_mod(s, 100)
}
