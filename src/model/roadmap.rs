use chrono::{DateTime, Duration, NaiveDate, Utc};

use super::item::{Dependency, EdgeId, Item, ItemId};
use crate::timeline::{DateSpan, TimelineRange};

/// Days of empty timeline kept before the earliest item.
const LEAD_DAYS: i64 = 14;
/// Days of empty timeline kept after the latest item.
const TRAIL_DAYS: i64 = 60;

/// A roadmap: the ordered items shown as timeline rows plus their dependencies.
#[derive(Debug, Clone)]
pub struct Roadmap {
    pub name: String,
    pub items: Vec<Item>,
    pub dependencies: Vec<Dependency>,
    pub modified: DateTime<Utc>,
}

impl Default for Roadmap {
    fn default() -> Self {
        Self {
            name: "Untitled Roadmap".to_string(),
            items: Vec::new(),
            dependencies: Vec::new(),
            modified: Utc::now(),
        }
    }
}

impl Roadmap {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Touch the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// The calendar window the chart is laid out over, padded around the items.
    pub fn timeline_range(&self, today: NaiveDate) -> TimelineRange {
        let start = self.items.iter().map(|i| i.start).min().unwrap_or(today).min(today);
        let end = self.items.iter().map(|i| i.end).max().unwrap_or(today).max(today);
        TimelineRange::new(
            start - Duration::days(LEAD_DAYS),
            end + Duration::days(TRAIL_DAYS),
        )
    }

    /// Store new dates for an item. Returns false if the item is unknown.
    pub fn apply_dates(&mut self, id: ItemId, span: DateSpan) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.start = span.start;
                item.end = span.end;
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Add a dependency unless it would link an item to itself, references an
    /// unknown item, or duplicates an existing edge.
    pub fn add_dependency(&mut self, predecessor: ItemId, successor: ItemId) -> Option<EdgeId> {
        if predecessor == successor
            || self.item(predecessor).is_none()
            || self.item(successor).is_none()
        {
            return None;
        }
        let exists = self
            .dependencies
            .iter()
            .any(|d| d.predecessor == predecessor && d.successor == successor);
        if exists {
            return None;
        }
        let dependency = Dependency::new(predecessor, successor);
        let id = dependency.id;
        self.dependencies.push(dependency);
        self.touch();
        Some(id)
    }

    pub fn remove_dependency(&mut self, id: EdgeId) -> Option<Dependency> {
        let index = self.dependencies.iter().position(|d| d.id == id)?;
        self.touch();
        Some(self.dependencies.remove(index))
    }

    /// A demonstration roadmap laid out around `today`.
    pub fn sample(today: NaiveDate) -> Self {
        let day = |offset: i64| today + Duration::days(offset);
        let mut roadmap = Roadmap::new("Product Roadmap");

        let discovery = Item::new("Customer discovery", day(-30), day(-10))
            .with_team("Product")
            .with_status("Done");
        let platform_spec = Item::new("Platform spec", day(-12), day(2))
            .with_team("Platform")
            .with_status("In progress");
        let design = Item::new("Design system refresh", day(-4), day(20)).with_team("Design");
        let api = Item::new("Public API v2", day(3), day(40)).with_team("Platform");
        let billing = Item::new("Usage-based billing", day(25), day(70)).with_team("Growth");
        let beta = Item::new("Beta launch", day(45), day(45)).with_team("Product");
        let mobile = Item::new("Mobile companion app", day(30), day(110)).with_team("Mobile");
        let ga = Item::new("General availability", day(120), day(120)).with_team("Product");
        // Scheduled before its predecessor finishes, so its link loops back.
        let docs = Item::new("Developer docs", day(35), day(60)).with_team("Platform");

        let links = [
            (discovery.id, platform_spec.id),
            (platform_spec.id, api.id),
            (design.id, mobile.id),
            (api.id, billing.id),
            (api.id, docs.id),
            (billing.id, beta.id),
            (beta.id, ga.id),
            (mobile.id, ga.id),
        ];

        roadmap.items = vec![discovery, platform_spec, design, api, docs, billing, beta, mobile, ga];
        for (predecessor, successor) in links {
            roadmap.add_dependency(predecessor, successor);
        }

        // Pad with a long tail of features so the chart has something to virtualize.
        let teams = ["Platform", "Growth", "Design", "Mobile", "Data"];
        for n in 0..400_i64 {
            let start = day(-60 + n * 3);
            let length = 5 + (n * 7) % 40;
            let item = Item::new(format!("Feature {:03}", n + 1), start, start + Duration::days(length))
                .with_team(teams[(n as usize) % teams.len()]);
            roadmap.items.push(item);
        }
        roadmap
    }
}
