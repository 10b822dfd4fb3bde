use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Display format for spreadsheet date-time cells.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Excel's 1900 date system counts days from 1899-12-30 (this offset
/// absorbs the fictitious 1900-02-29).
fn excel_epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)
}

/// Convert an Excel serial day number to a naive date-time, rounded to the
/// nearest second.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let seconds = (serial * 86_400.0).round();
    if seconds.abs() > 1e15 {
        return None;
    }
    excel_epoch()?.checked_add_signed(Duration::try_seconds(seconds as i64)?)
}

/// Render an Excel serial as text, falling back to the raw number.
pub fn format_excel_serial(serial: f64) -> String {
    excel_serial_to_datetime(serial)
        .map(|dt| dt.format(DATETIME_FORMAT).to_string())
        .unwrap_or_else(|| serial.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_days() {
        assert_eq!(format_excel_serial(45_000.0), "2023-03-15 00:00:00");
        assert_eq!(format_excel_serial(1.0), "1899-12-31 00:00:00");
    }

    #[test]
    fn fractional_day_is_time_of_day() {
        assert_eq!(format_excel_serial(45_000.5), "2023-03-15 12:00:00");
    }

    #[test]
    fn non_finite_falls_back() {
        assert_eq!(format_excel_serial(f64::INFINITY), "inf");
    }
}
