//! Conversions between the company timezone and UTC.
//!
//! Offsets are always resolved for the instant being converted, never taken
//! from "now", so windows and buckets stay correct across DST transitions.

use std::fmt;

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone,
    Timelike, Utc,
};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;

use crate::shared::constants::REPORT_SLOT_MINUTES;

lazy_static! {
    /// Fixed UTC offset: `+03:00`, `-0530`
    static ref OFFSET_REGEX: Regex = Regex::new(r"^([+-])(\d{2}):?(\d{2})$").unwrap();
}

/// Company timezone: an IANA zone or a fixed UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyTz {
    Named(Tz),
    Fixed(FixedOffset),
}

impl CompanyTz {
    pub const UTC: CompanyTz = CompanyTz::Named(Tz::UTC);

    /// Name as stored in settings (`Europe/Berlin`, `+03:00`)
    pub fn name(&self) -> String {
        match self {
            CompanyTz::Named(tz) => tz.name().to_string(),
            CompanyTz::Fixed(offset) => offset.to_string(),
        }
    }
}

impl From<Tz> for CompanyTz {
    fn from(tz: Tz) -> Self {
        CompanyTz::Named(tz)
    }
}

impl fmt::Display for CompanyTz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Parse an IANA timezone name (`Europe/Berlin`, `UTC`, ...) or a fixed
/// offset (`+03:00`). Offsets must be a whole number of report slots so
/// local midnights stay on slot boundaries.
pub fn parse_timezone(name: &str) -> Option<CompanyTz> {
    let name = name.trim();
    if let Ok(tz) = name.parse::<Tz>() {
        return Some(CompanyTz::Named(tz));
    }

    let caps = OFFSET_REGEX.captures(name)?;
    let hours: i32 = caps[2].parse().ok()?;
    let minutes: i32 = caps[3].parse().ok()?;
    let total = hours * 60 + minutes;
    if total > 14 * 60 || minutes >= 60 || i64::from(minutes) % REPORT_SLOT_MINUTES != 0 {
        return None;
    }

    let seconds = total * 60;
    let seconds = if &caps[1] == "-" { -seconds } else { seconds };
    FixedOffset::east_opt(seconds).map(CompanyTz::Fixed)
}

fn zone_to_utc<Z: TimeZone>(tz: &Z, local: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            let before = tz
                .offset_from_utc_datetime(&(local - Duration::days(1)))
                .fix();
            let utc = local - Duration::seconds(i64::from(before.local_minus_utc()));
            Utc.from_utc_datetime(&utc)
        }
    }
}

/// Convert a wall-clock time in `tz` to UTC.
///
/// Ambiguous times (clocks going back) resolve to the earlier instant. Times
/// inside a gap (clocks going forward) are read with the offset in force
/// before the gap, so `02:30` on a spring-forward night lands on `03:30`.
pub fn local_to_utc(tz: CompanyTz, local: NaiveDateTime) -> DateTime<Utc> {
    match tz {
        CompanyTz::Named(zone) => zone_to_utc(&zone, local),
        CompanyTz::Fixed(offset) => zone_to_utc(&offset, local),
    }
}

/// UTC instant of local midnight starting `date`
pub fn local_midnight(tz: CompanyTz, date: NaiveDate) -> DateTime<Utc> {
    local_to_utc(tz, date.and_time(chrono::NaiveTime::MIN))
}

/// Local calendar day of a UTC instant
pub fn local_date(tz: CompanyTz, at: DateTime<Utc>) -> NaiveDate {
    match tz {
        CompanyTz::Named(zone) => at.with_timezone(&zone).date_naive(),
        CompanyTz::Fixed(offset) => at.with_timezone(&offset).date_naive(),
    }
}

/// Local hour bucket label (`HH:00`, 24h) of a UTC instant
pub fn local_hour_label(tz: CompanyTz, at: DateTime<Utc>) -> String {
    let hour = match tz {
        CompanyTz::Named(zone) => at.with_timezone(&zone).hour(),
        CompanyTz::Fixed(offset) => at.with_timezone(&offset).hour(),
    };
    format!("{:02}:00", hour)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn naive(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("UTC"), Some(CompanyTz::UTC));
        assert_eq!(
            parse_timezone("Europe/Moscow"),
            Some(CompanyTz::Named(Tz::Europe__Moscow))
        );
        assert_eq!(parse_timezone("Mars/Olympus"), None);
    }

    #[test]
    fn test_parse_fixed_offsets() {
        assert_eq!(
            parse_timezone("+03:00"),
            Some(CompanyTz::Fixed(FixedOffset::east_opt(3 * 3600).unwrap()))
        );
        assert_eq!(
            parse_timezone("-0530"),
            Some(CompanyTz::Fixed(FixedOffset::west_opt(5 * 3600 + 1800).unwrap()))
        );
        assert_eq!(parse_timezone("+05:45").map(|tz| tz.name()), Some("+05:45".to_string()));
        // Not a whole number of slots
        assert_eq!(parse_timezone("+03:07"), None);
        assert_eq!(parse_timezone("+25:00"), None);
        assert_eq!(parse_timezone("03:00"), None);
    }

    #[test]
    fn test_fixed_offset_buckets_into_next_local_day() {
        let tz = parse_timezone("+03:00").unwrap();
        assert_eq!(
            local_date(tz, utc("2019-06-30T22:00:00Z")),
            NaiveDate::from_ymd_opt(2019, 7, 1).unwrap()
        );
        assert_eq!(
            local_midnight(tz, NaiveDate::from_ymd_opt(2019, 7, 1).unwrap()),
            utc("2019-06-30T21:00:00Z")
        );
        assert_eq!(local_hour_label(tz, utc("2019-06-30T22:05:00Z")), "01:00");
    }

    #[test]
    fn test_late_utc_evening_is_next_local_day() {
        // +02:00 in winter
        let tz = parse_timezone("Africa/Cairo").unwrap();
        let date = local_date(tz, utc("2019-01-01T23:30:00Z"));
        assert_eq!(date, NaiveDate::from_ymd_opt(2019, 1, 2).unwrap());
    }

    #[test]
    fn test_plus_three_offset_crosses_month() {
        let tz = parse_timezone("Europe/Moscow").unwrap();
        let date = local_date(tz, utc("2019-06-30T22:00:00Z"));
        assert_eq!(date, NaiveDate::from_ymd_opt(2019, 7, 1).unwrap());
    }

    #[test]
    fn test_local_to_utc_uses_offset_of_that_instant() {
        let tz = parse_timezone("Europe/Berlin").unwrap();
        // Winter: +01:00
        assert_eq!(
            local_to_utc(tz, naive("2019-01-15 00:00:00")),
            utc("2019-01-14T23:00:00Z")
        );
        // Summer: +02:00
        assert_eq!(
            local_to_utc(tz, naive("2019-07-15 00:00:00")),
            utc("2019-07-14T22:00:00Z")
        );
    }

    #[test]
    fn test_local_to_utc_in_spring_forward_gap() {
        let tz = parse_timezone("Europe/Berlin").unwrap();
        // 2019-03-31 02:30 does not exist in Berlin
        assert_eq!(
            local_to_utc(tz, naive("2019-03-31 02:30:00")),
            utc("2019-03-31T01:30:00Z")
        );
    }

    #[test]
    fn test_local_to_utc_in_fall_back_overlap_takes_earliest() {
        let tz = parse_timezone("Europe/Berlin").unwrap();
        // 02:30 happens twice on 2019-10-27; the first is still +02:00
        assert_eq!(
            local_to_utc(tz, naive("2019-10-27 02:30:00")),
            utc("2019-10-27T00:30:00Z")
        );
    }

    #[test]
    fn test_local_midnight_on_dst_day() {
        let tz = parse_timezone("America/Sao_Paulo").unwrap();
        // Brazil used to spring forward at midnight: 2018-11-04 00:00 did not exist
        assert_eq!(
            local_midnight(tz, NaiveDate::from_ymd_opt(2018, 11, 4).unwrap()),
            utc("2018-11-04T03:00:00Z")
        );
    }

    #[test]
    fn test_local_hour_label() {
        let tz = parse_timezone("Asia/Kolkata").unwrap();
        assert_eq!(local_hour_label(tz, utc("2019-01-01T03:45:00Z")), "09:00");
        assert_eq!(local_hour_label(CompanyTz::UTC, utc("2019-01-01T15:10:00Z")), "15:00");
    }
}
