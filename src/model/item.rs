use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timeline::{CalendarDay, DateSpan};

/// Identifier of a roadmap item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub Uuid);

impl EdgeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display attributes the timeline passes through without interpreting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAttributes {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub team: Option<String>,
}

/// A milestone or feature scheduled on the roadmap.
///
/// `end` is inclusive: an item starting and ending on the same day lasts one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub attributes: ItemAttributes,
}

impl Item {
    /// Create an item from any date-like values; both ends are reduced to
    /// their calendar day and an inverted range collapses onto `start`.
    pub fn new(title: impl Into<String>, start: impl CalendarDay, end: impl CalendarDay) -> Self {
        let span = DateSpan::new(start.calendar_day(), end.calendar_day());
        Self {
            id: ItemId::new(),
            title: title.into(),
            start: span.start,
            end: span.end,
            attributes: ItemAttributes::default(),
        }
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.attributes.team = Some(team.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.attributes.status = Some(status.into());
        self
    }

    /// Stored dates as a normalized span.
    pub fn span(&self) -> DateSpan {
        DateSpan::new(self.start, self.end)
    }
}

/// A directed "predecessor must precede successor" relation.
///
/// The edge set may contain cycles and self-loops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub id: EdgeId,
    pub predecessor: ItemId,
    pub successor: ItemId,
}

impl Dependency {
    pub fn new(predecessor: ItemId, successor: ItemId) -> Self {
        Self {
            id: EdgeId::new(),
            predecessor,
            successor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_item_new_normalizes_inverted_range() {
        let item = Item::new("Backwards", date(2024, 3, 10), date(2024, 3, 1));
        assert_eq!(item.start, date(2024, 3, 10));
        assert_eq!(item.end, date(2024, 3, 10));
    }

    #[test]
    fn test_item_new_accepts_utc_midnight() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let item = Item::new("Launch", start, date(2024, 3, 5));
        assert_eq!(item.start, date(2024, 3, 1));
        assert_eq!(item.span().days(), 5);
    }
}
