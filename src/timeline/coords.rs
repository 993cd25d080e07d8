//! Calendar ⇄ pixel coordinate system.
//!
//! All arithmetic happens on whole calendar days. Date-like inputs are first
//! reduced to the calendar day they denote in their own time zone, so a date
//! serialized as UTC midnight and the same day built in local time land on the
//! same pixel.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::config::ZoomConfig;

/// Anything that denotes a calendar day.
pub trait CalendarDay {
    fn calendar_day(&self) -> NaiveDate;
}

impl CalendarDay for NaiveDate {
    fn calendar_day(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDay for NaiveDateTime {
    fn calendar_day(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> CalendarDay for DateTime<Tz> {
    fn calendar_day(&self) -> NaiveDate {
        self.date_naive()
    }
}

/// Whole days from `origin` to `date` (negative when `date` is earlier).
pub fn days_between(date: impl CalendarDay, origin: impl CalendarDay) -> i64 {
    (date.calendar_day() - origin.calendar_day()).num_days()
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    /// Build a span; an `end` before `start` collapses onto `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Number of days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    pub fn shifted(&self, days: i64) -> Self {
        Self {
            start: self.start + Duration::days(days),
            end: self.end + Duration::days(days),
        }
    }
}

/// The `[start, end)` window the chart is laid out over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimelineRange {
    /// Build a range; an empty or inverted window is widened to one day.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        let end = if end > start { end } else { start + Duration::days(1) };
        Self { start, end }
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// The last calendar day inside the range.
    pub fn last_day(&self) -> NaiveDate {
        self.end - Duration::days(1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        date.clamp(self.start, self.last_day())
    }
}

/// Granularity of the timeline: what one header cell represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    /// Day cells grouped by month.
    Week,
    /// Week cells grouped by month.
    Month,
    /// Month cells grouped by quarter.
    Quarter,
    /// Quarter cells grouped by year.
    Year,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Week, Period::Month, Period::Quarter, Period::Year];

    /// Calendar days represented by one cell.
    pub fn days_per_cell(self) -> f32 {
        match self {
            Period::Week => 1.0,
            Period::Month => 7.0,
            Period::Quarter => 30.0,
            Period::Year => 91.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Week => "Week",
            Period::Month => "Month",
            Period::Quarter => "Quarter",
            Period::Year => "Year",
        }
    }
}

/// Pixels per calendar day for a period at a zoom level.
///
/// The cell width is interpolated linearly across the zoom range and divided
/// by the number of days one cell spans. Levels outside the range are clamped.
pub fn day_width(period: Period, level: i32, zoom: &ZoomConfig) -> f32 {
    let cell = zoom.cell_width(period);
    let span = (zoom.max_level - zoom.min_level) as f32;
    let t = if span > 0.0 {
        ((level - zoom.min_level) as f32 / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (cell.min + (cell.max - cell.min) * t) / period.days_per_cell()
}

/// Maps calendar days onto the horizontal pixel axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    pub range: TimelineRange,
    /// Pixels per day; always positive once it comes out of the zoom controller.
    pub day_width: f32,
}

impl TimeAxis {
    pub fn new(range: TimelineRange, day_width: f32) -> Self {
        Self { range, day_width }
    }

    /// X offset of the left edge of `date`'s column.
    pub fn date_to_offset(&self, date: impl CalendarDay) -> f32 {
        days_between(date, self.range.start) as f32 * self.day_width
    }

    /// The day whose left edge is nearest to `offset`.
    pub fn offset_to_date(&self, offset: f32) -> NaiveDate {
        let days = (offset / self.day_width).round() as i64;
        self.range.start + Duration::days(days)
    }

    /// The day whose column contains `offset`.
    pub fn day_at(&self, offset: f32) -> NaiveDate {
        let days = (offset / self.day_width).floor() as i64;
        self.range.start + Duration::days(days)
    }

    /// Days (with fraction) from the range start to `offset`.
    pub fn fractional_days(&self, offset: f32) -> f32 {
        offset / self.day_width
    }

    pub fn total_width(&self) -> f32 {
        self.range.days() as f32 * self.day_width
    }
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month after the one containing `date`.
pub fn next_month_start(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date + Duration::days(31))
}

/// First day of the quarter containing `date`.
pub fn quarter_start(date: NaiveDate) -> NaiveDate {
    let month = (date.month0() / 3) * 3 + 1;
    NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
}

/// First day of the year containing `date`.
pub fn year_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date)
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Local, TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn axis_2024(day_width: f32) -> TimeAxis {
        TimeAxis::new(TimelineRange::new(date(2024, 1, 1), date(2024, 12, 31)), day_width)
    }

    #[test]
    fn test_date_to_offset() {
        let axis = axis_2024(10.0);
        assert_eq!(axis.date_to_offset(date(2024, 1, 1)), 0.0);
        assert_eq!(axis.date_to_offset(date(2024, 3, 1)), 600.0);
        assert_eq!(axis.date_to_offset(date(2023, 12, 31)), -10.0);
    }

    #[test]
    fn test_round_trip_at_every_zoom() {
        let zoom = ZoomConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        for period in Period::ALL {
            for level in zoom.min_level..=zoom.max_level {
                let axis = axis_2024(day_width(period, level, &zoom));
                for _ in 0..50 {
                    let d = axis.range.start + Duration::days(rng.gen_range(0..axis.range.days()));
                    assert_eq!(axis.offset_to_date(axis.date_to_offset(d)), d);
                }
            }
        }
    }

    #[test]
    fn test_utc_and_local_midnight_map_to_same_offset() {
        let axis = axis_2024(12.5);
        let utc = Utc.with_ymd_and_hms(2024, 7, 4, 0, 0, 0).unwrap();
        let local = Local.with_ymd_and_hms(2024, 7, 4, 0, 0, 0).unwrap();
        let pacific = FixedOffset::west_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 7, 4, 0, 0, 0)
            .unwrap();
        let expected = axis.date_to_offset(date(2024, 7, 4));
        assert_eq!(axis.date_to_offset(utc), expected);
        assert_eq!(axis.date_to_offset(local), expected);
        assert_eq!(axis.date_to_offset(pacific), expected);
        assert_eq!(axis.date_to_offset(date(2024, 7, 4).and_hms_opt(23, 59, 0).unwrap()), expected);
    }

    #[test]
    fn test_day_width_interpolates_per_period() {
        let zoom = ZoomConfig::default();
        assert_eq!(day_width(Period::Week, 1, &zoom), 6.0);
        assert_eq!(day_width(Period::Week, 5, &zoom), 10.0);
        assert_eq!(day_width(Period::Week, 9, &zoom), 14.0);
        assert_eq!(day_width(Period::Month, 9, &zoom), 12.0);
        // Clamped outside the range.
        assert_eq!(day_width(Period::Week, 42, &zoom), 14.0);
    }

    #[test]
    fn test_day_width_with_single_level_range() {
        let zoom = ZoomConfig {
            min_level: 3,
            max_level: 3,
            default_level: 3,
            ..ZoomConfig::default()
        };
        assert_eq!(day_width(Period::Month, 3, &zoom), 4.0);
    }

    #[test]
    fn test_date_span_counts_inclusive_days() {
        let span = DateSpan::new(date(2024, 3, 1), date(2024, 3, 5));
        assert_eq!(span.days(), 5);
        assert!(DateSpan::new(date(2024, 3, 1), date(2024, 3, 1)).is_single_day());
        assert_eq!(DateSpan::new(date(2024, 3, 5), date(2024, 3, 1)).days(), 1);
    }

    #[test]
    fn test_timeline_range_clamp() {
        let range = TimelineRange::new(date(2024, 1, 1), date(2024, 12, 31));
        assert_eq!(range.last_day(), date(2024, 12, 30));
        assert_eq!(range.clamp(date(2023, 5, 5)), date(2024, 1, 1));
        assert_eq!(range.clamp(date(2025, 5, 5)), date(2024, 12, 30));
        assert_eq!(TimelineRange::new(date(2024, 1, 1), date(2024, 1, 1)).days(), 1);
    }

    #[test]
    fn test_period_boundaries() {
        assert_eq!(quarter_start(date(2024, 8, 19)), date(2024, 7, 1));
        assert_eq!(next_month_start(date(2024, 12, 19)), date(2025, 1, 1));
        assert_eq!(week_start(date(2024, 3, 3)), date(2024, 2, 26));
        assert_eq!(year_start(date(2024, 8, 19)), date(2024, 1, 1));
        assert_eq!(month_start(date(2024, 8, 19)), date(2024, 8, 1));
    }
}
