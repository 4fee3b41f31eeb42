//! Date serial numbers
//!
//! Spreadsheets store dates as day counts from a base date. The 1900 system
//! counts 1900-01-01 as serial 1 and keeps the historical 1900 leap-year bug:
//! serial 60 is the non-existent 1900-02-29. The 1904 system counts
//! 1904-01-01 as serial 0 and has no such quirk.

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::{Error, Result};

/// Largest serial that still maps to a date (9999-12-31 in the 1900 system)
pub const MAX_DATE_SERIAL: f64 = 2_958_465.0;

/// Calendar date as stored in a serial
///
/// Kept separate from [`NaiveDate`] because the 1900 system has a day
/// (1900-02-29) that the Gregorian calendar does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl SerialDate {
    /// Format as `M/D/YY` without leading zeros on month and day
    pub fn to_short_string(&self) -> String {
        format!("{}/{}/{:02}", self.month, self.day, self.year.rem_euclid(100))
    }
}

impl From<NaiveDate> for SerialDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

/// Day zero of a date system; 1900 serials count from 1899-12-31
fn epoch(date_1904: bool) -> Result<NaiveDate> {
    let (y, m, d) = if date_1904 { (1904, 1, 1) } else { (1899, 12, 31) };
    NaiveDate::from_ymd_opt(y, m, d).ok_or(Error::InvalidDate(y, m, d))
}

/// Convert a serial to a calendar date. The time-of-day fraction is dropped.
pub fn serial_to_date(serial: f64, date_1904: bool) -> Result<SerialDate> {
    if !serial.is_finite() || serial < 0.0 || serial > MAX_DATE_SERIAL {
        return Err(Error::InvalidDateSerial(serial));
    }
    let days = serial.floor() as i64;

    if date_1904 {
        return epoch(true)?
            .checked_add_signed(Duration::days(days))
            .map(SerialDate::from)
            .ok_or(Error::InvalidDateSerial(serial));
    }

    if days == 60 {
        return Ok(SerialDate {
            year: 1900,
            month: 2,
            day: 29,
        });
    }
    let adjusted = if days > 60 { days - 1 } else { days };
    epoch(false)?
        .checked_add_signed(Duration::days(adjusted))
        .map(SerialDate::from)
        .ok_or(Error::InvalidDateSerial(serial))
}

/// Convert a calendar date to its serial
pub fn date_to_serial(date: NaiveDate, date_1904: bool) -> Result<f64> {
    let serial = if date_1904 {
        (date - epoch(true)?).num_days()
    } else {
        let days = (date - epoch(false)?).num_days();
        // Everything from 1900-03-01 on sits one past the phantom leap day
        if days >= 60 {
            days + 1
        } else {
            days
        }
    };

    if serial < 0 {
        return Err(Error::InvalidDateSerial(serial as f64));
    }
    Ok(serial as f64)
}
