//! Two-tier timeline header: coarse group cells above fine sub-columns.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use super::coords::{
    month_start, next_month_start, quarter_start, week_start, year_start, Period, TimeAxis,
};
use crate::config::LabelConfig;

/// A horizontal pixel interval in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelWindow {
    pub left: f32,
    pub right: f32,
}

impl PixelWindow {
    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }
}

/// One header cell. `start` and `end` are inclusive and clamped to the range.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleCell {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub left: f32,
    pub width: f32,
    pub label: String,
    pub is_today: bool,
    pub is_weekend: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scale {
    pub groups: Vec<ScaleCell>,
    pub columns: Vec<ScaleCell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Unit {
    fn floor(self, date: NaiveDate) -> NaiveDate {
        match self {
            Unit::Day => date,
            Unit::Week => week_start(date),
            Unit::Month => month_start(date),
            Unit::Quarter => quarter_start(date),
            Unit::Year => year_start(date),
        }
    }

    fn next(self, date: NaiveDate) -> NaiveDate {
        match self {
            Unit::Day => date + Duration::days(1),
            Unit::Week => date + Duration::days(7),
            Unit::Month => next_month_start(date),
            Unit::Quarter => next_month_start(next_month_start(next_month_start(date))),
            Unit::Year => NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
                .unwrap_or(date + Duration::days(365)),
        }
    }
}

fn units(period: Period) -> (Unit, Unit) {
    match period {
        Period::Week => (Unit::Month, Unit::Day),
        Period::Month => (Unit::Month, Unit::Week),
        Period::Quarter => (Unit::Quarter, Unit::Month),
        Period::Year => (Unit::Year, Unit::Quarter),
    }
}

fn quarter_of(date: NaiveDate) -> u32 {
    date.month0() / 3 + 1
}

fn weekday_letter(weekday: Weekday) -> char {
    match weekday {
        Weekday::Mon => 'M',
        Weekday::Tue | Weekday::Thu => 'T',
        Weekday::Wed => 'W',
        Weekday::Fri => 'F',
        Weekday::Sat | Weekday::Sun => 'S',
    }
}

fn column_label(unit: Unit, start: NaiveDate, width: f32, labels: &LabelConfig) -> String {
    match unit {
        Unit::Day if width >= labels.day_weekday_min_width => {
            format!("{} {}", weekday_letter(start.weekday()), start.day())
        }
        Unit::Day => start.day().to_string(),
        Unit::Week if width >= labels.week_date_min_width => {
            format!("W{} · {}", start.iso_week().week(), start.format("%d %b"))
        }
        Unit::Week => format!("W{}", start.iso_week().week()),
        Unit::Month if width >= labels.month_full_name_min_width => start.format("%B").to_string(),
        Unit::Month => start.format("%b").to_string(),
        Unit::Quarter => format!("Q{}", quarter_of(start)),
        Unit::Year => start.year().to_string(),
    }
}

fn group_label(unit: Unit, start: NaiveDate, width: f32, labels: &LabelConfig) -> String {
    let wide = width >= labels.group_year_min_width;
    match unit {
        Unit::Month if width >= labels.group_year_min_width * 2.0 => {
            start.format("%B %Y").to_string()
        }
        Unit::Month if wide => start.format("%b %Y").to_string(),
        Unit::Month => start.format("%b").to_string(),
        Unit::Quarter if wide => format!("Q{} {}", quarter_of(start), start.year()),
        Unit::Quarter => format!("Q{}", quarter_of(start)),
        Unit::Year => start.year().to_string(),
        Unit::Day | Unit::Week => column_label(unit, start, width, labels),
    }
}

/// Walk `unit` cells covering `[first, last]`, clamped to the axis range.
fn cells(
    axis: &TimeAxis,
    unit: Unit,
    first: NaiveDate,
    last: NaiveDate,
    today: NaiveDate,
    label: impl Fn(Unit, NaiveDate, f32) -> String,
) -> Vec<ScaleCell> {
    let range = axis.range;
    let mut out = Vec::new();
    let mut cursor = unit.floor(first);
    while cursor <= last {
        let next = unit.next(cursor);
        let start = cursor.max(range.start);
        let end = (next - Duration::days(1)).min(range.last_day());
        if start <= end {
            let left = axis.date_to_offset(start);
            let width = axis.date_to_offset(end) + axis.day_width - left;
            out.push(ScaleCell {
                start,
                end,
                left,
                width,
                label: label(unit, cursor, width),
                is_today: start <= today && today <= end,
                is_weekend: unit == Unit::Day
                    && matches!(start.weekday(), Weekday::Sat | Weekday::Sun),
            });
        }
        cursor = next;
    }
    out
}

/// Build the header cells intersecting `window` widened by `buffer` pixels on
/// each side.
///
/// The result depends only on its arguments, so repeated calls with the same
/// input produce identical cells.
pub fn generate_scale(
    axis: &TimeAxis,
    period: Period,
    window: PixelWindow,
    buffer: f32,
    labels: &LabelConfig,
    today: NaiveDate,
) -> Scale {
    let left = (window.left - buffer).max(0.0);
    let right = (window.right + buffer).min(axis.total_width());
    if right <= left || axis.day_width <= 0.0 {
        return Scale::default();
    }

    let first = axis.range.clamp(axis.day_at(left));
    // Step back a hair so a window ending on a column boundary doesn't pull in
    // the next column.
    let last = axis.range.clamp(axis.day_at((right - 0.01).max(left)));

    let (group_unit, column_unit) = units(period);
    Scale {
        groups: cells(axis, group_unit, first, last, today, |unit, start, width| {
            group_label(unit, start, width, labels)
        }),
        columns: cells(axis, column_unit, first, last, today, |unit, start, width| {
            column_label(unit, start, width, labels)
        }),
    }
}
