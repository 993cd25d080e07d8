use chrono::NaiveDate;

use crate::model::{EdgeId, ItemId};

/// Receives the outcome of pointer gestures.
///
/// Every method defaults to a no-op so hosts only implement what they use.
pub trait TimelineCallbacks {
    /// A bar was clicked without being dragged.
    fn on_edit(&mut self, _item: ItemId) {}

    /// A move or resize drag finished with these (inclusive) dates.
    fn on_commit_dates(&mut self, _item: ItemId, _start: NaiveDate, _end: NaiveDate) {}

    /// A link was dragged from one item's handle onto another's.
    fn on_create_dependency(&mut self, _predecessor: ItemId, _successor: ItemId) {}

    /// An existing link was clicked. The caller decides whether to delete it.
    fn on_delete_dependency_request(&mut self, _edge: EdgeId) {}
}

/// A recorded callback, for hosts that apply changes after the frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineEvent {
    Edit(ItemId),
    CommitDates {
        item: ItemId,
        start: NaiveDate,
        end: NaiveDate,
    },
    CreateDependency {
        predecessor: ItemId,
        successor: ItemId,
    },
    DeleteDependencyRequest(EdgeId),
}

impl TimelineCallbacks for Vec<TimelineEvent> {
    fn on_edit(&mut self, item: ItemId) {
        self.push(TimelineEvent::Edit(item));
    }

    fn on_commit_dates(&mut self, item: ItemId, start: NaiveDate, end: NaiveDate) {
        self.push(TimelineEvent::CommitDates { item, start, end });
    }

    fn on_create_dependency(&mut self, predecessor: ItemId, successor: ItemId) {
        self.push(TimelineEvent::CreateDependency {
            predecessor,
            successor,
        });
    }

    fn on_delete_dependency_request(&mut self, edge: EdgeId) {
        self.push(TimelineEvent::DeleteDependencyRequest(edge));
    }
}
