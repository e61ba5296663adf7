use chrono::{DateTime, Datelike, Timelike, Utc};

/// Julian date of a calendar date (proleptic Gregorian), `day` fractional.
pub fn julian_day(year: i32, month: u32, day: f64) -> f64 {
    let (y, m) = if month <= 2 {
        (year - 1, month + 12)
    } else {
        (year, month)
    };
    let a = (y as f64 / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    (365.25 * (y as f64 + 4716.0)).floor() + (30.6001 * (m as f64 + 1.0)).floor() + day + b
        - 1524.5
}

/// Julian date of a UTC timestamp, sub-second precision preserved.
pub fn julian_day_utc(t: &DateTime<Utc>) -> f64 {
    let seconds = t.hour() as f64 * 3600.0
        + t.minute() as f64 * 60.0
        + t.second() as f64
        + t.nanosecond() as f64 * 1e-9;
    julian_day(t.year(), t.month(), t.day() as f64 + seconds / 86_400.0)
}

/// Greenwich mean sidereal time in radians at a Julian date.
pub fn gmst_rad(jd: f64) -> f64 {
    let d = jd - 2_451_545.0;
    let gmst_hours = 18.697_374_558 + 24.065_709_824_419_08 * d;
    let wrapped = gmst_hours.rem_euclid(24.0);
    wrapped * std::f64::consts::PI / 12.0
}
