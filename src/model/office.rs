use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::{geo::GeoPoint, hhmm};

/// Minutes in a day, used for overnight shift arithmetic.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = 3)]
    pub office_id: u64,
    #[schema(example = "Day shift")]
    pub name: String,
    #[serde(with = "hhmm")]
    #[schema(example = "09:00", value_type = String)]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    #[schema(example = "18:00", value_type = String)]
    pub end_time: NaiveTime,
}

impl Shift {
    fn start_minute(&self) -> i64 {
        minute_of_day(self.start_time)
    }

    /// A shift whose end is not after its start runs past midnight.
    pub fn is_overnight(&self) -> bool {
        self.end_time <= self.start_time
    }

    /// Nominal shift length in whole minutes.
    pub fn length_minutes(&self) -> i64 {
        let diff = minute_of_day(self.end_time) - self.start_minute();
        if self.is_overnight() {
            diff + MINUTES_PER_DAY
        } else {
            diff
        }
    }

    /// Signed minutes from the shift start to `time`, negative when early.
    ///
    /// For overnight shifts a time after midnight that still falls inside the
    /// shift window is counted from the previous day's start.
    pub fn minutes_since_start(&self, time: NaiveTime) -> i64 {
        let diff = minute_of_day(time) - self.start_minute();
        if diff < 0 && self.is_overnight() && diff + MINUTES_PER_DAY <= self.length_minutes() {
            diff + MINUTES_PER_DAY
        } else {
            diff
        }
    }

    /// Start of the shift occurrence a punch-in at `check_in` belongs to.
    pub fn anchored_start(&self, check_in: NaiveDateTime) -> NaiveDateTime {
        floor_minute(check_in) - Duration::minutes(self.minutes_since_start(check_in.time()))
    }

    /// Signed minutes from the anchored shift start to `instant`, across any
    /// number of midnights.
    pub fn minutes_elapsed(&self, check_in: NaiveDateTime, instant: NaiveDateTime) -> i64 {
        (floor_minute(instant) - self.anchored_start(check_in)).num_minutes()
    }
}

/// Whole minutes since midnight; seconds are dropped.
pub fn minute_of_day(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

fn floor_minute(instant: NaiveDateTime) -> NaiveDateTime {
    instant
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(instant)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Office {
    #[schema(example = 3)]
    pub id: u64,
    #[schema(example = 1)]
    pub company_id: u64,
    #[schema(example = "Hanoi HQ")]
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    #[serde(with = "hhmm::option")]
    #[schema(example = "08:00", value_type = Option<String>)]
    pub shift_window_start: Option<NaiveTime>,
    #[serde(with = "hhmm::option")]
    #[schema(example = "22:00", value_type = Option<String>)]
    pub shift_window_end: Option<NaiveTime>,
    pub location: GeoPoint,
    #[schema(example = "Asia/Ho_Chi_Minh")]
    pub time_zone_name: Option<String>,
    pub shifts: Vec<Shift>,
}

impl Office {
    pub fn shift(&self, shift_id: u64) -> Option<&Shift> {
        self.shifts.iter().find(|s| s.id == shift_id)
    }
}

/// Shift definition before the store assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShift {
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOffice {
    pub company_id: u64,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub shift_window_start: Option<NaiveTime>,
    pub shift_window_end: Option<NaiveTime>,
    pub location: GeoPoint,
    pub time_zone_name: Option<String>,
    pub shifts: Vec<NewShift>,
}

/// Partial office edit; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfficePatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub shift_window_start: Option<NaiveTime>,
    pub shift_window_end: Option<NaiveTime>,
    pub location: Option<GeoPoint>,
    pub time_zone_name: Option<String>,
}

impl OfficePatch {
    pub fn is_empty(&self) -> bool {
        self == &OfficePatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shift(start: (u32, u32), end: (u32, u32)) -> Shift {
        Shift {
            id: 1,
            office_id: 1,
            name: "s".into(),
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        }
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn on(day: u32, h: u32, m: u32, sec: u32) -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(h, m, sec)
            .unwrap()
    }

    #[test]
    fn day_shift_length() {
        assert_eq!(shift((9, 0), (18, 0)).length_minutes(), 540);
    }

    #[test]
    fn overnight_shift_length_wraps_midnight() {
        let night = shift((22, 0), (6, 0));
        assert!(night.is_overnight());
        assert_eq!(night.length_minutes(), 480);
    }

    #[test]
    fn minutes_since_start_for_day_shift() {
        let day = shift((9, 0), (18, 0));
        assert_eq!(day.minutes_since_start(at(9, 15)), 15);
        assert_eq!(day.minutes_since_start(at(8, 50)), -10);
    }

    #[test]
    fn minutes_since_start_after_midnight_counts_from_previous_start() {
        let night = shift((22, 0), (6, 0));
        assert_eq!(night.minutes_since_start(at(1, 0)), 180);
        // early arrival before the start is not mistaken for a late one
        assert_eq!(night.minutes_since_start(at(21, 50)), -10);
    }

    #[test]
    fn anchored_start_follows_the_check_in_occurrence() {
        let day = shift((9, 0), (18, 0));
        assert_eq!(day.anchored_start(on(2, 9, 15, 40)), on(2, 9, 0, 0));
        assert_eq!(day.anchored_start(on(2, 8, 45, 0)), on(2, 9, 0, 0));

        let night = shift((22, 0), (6, 0));
        assert_eq!(night.anchored_start(on(2, 22, 30, 0)), on(2, 22, 0, 0));
        assert_eq!(night.anchored_start(on(3, 0, 30, 0)), on(2, 22, 0, 0));
    }

    #[test]
    fn minutes_elapsed_crosses_midnight() {
        let day = shift((9, 0), (18, 0));
        assert_eq!(day.minutes_elapsed(on(2, 9, 0, 0), on(3, 1, 0, 0)), 16 * 60);

        let night = shift((22, 0), (6, 0));
        assert_eq!(night.minutes_elapsed(on(2, 22, 0, 0), on(3, 6, 1, 0)), 481);
        assert_eq!(night.minutes_elapsed(on(3, 1, 0, 0), on(3, 7, 30, 0)), 570);
    }

    #[test]
    fn seconds_are_dropped() {
        let t = NaiveTime::from_hms_opt(9, 15, 59).unwrap();
        assert_eq!(minute_of_day(t), 9 * 60 + 15);
    }
}
