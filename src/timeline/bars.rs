//! On-screen geometry of item bars.

use std::collections::HashMap;

use egui::{Pos2, Rect, Vec2};

use super::coords::{DateSpan, TimeAxis};
use crate::config::LayoutConfig;
use crate::model::{Item, ItemId};

/// Candidate dates shown in place of an item's stored dates during a drag.
pub type PreviewOverrides = HashMap<ItemId, DateSpan>;

/// Which end of a bar a connection point or handle sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorSide {
    Start,
    End,
}

impl AnchorSide {
    pub fn opposite(self) -> Self {
        match self {
            AnchorSide::Start => AnchorSide::End,
            AnchorSide::End => AnchorSide::Start,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarShape {
    Bar,
    /// One-day items render as a diamond centred in their day column.
    Diamond { center_x: f32 },
}

/// Horizontal geometry of one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarGeometry {
    pub left: f32,
    pub width: f32,
    pub shape: BarShape,
    /// The dates the geometry was computed from.
    pub span: DateSpan,
    /// True when `span` came from a drag preview.
    pub previewing: bool,
}

impl BarGeometry {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn is_diamond(&self) -> bool {
        matches!(self.shape, BarShape::Diamond { .. })
    }
}

/// Compute an item's bar, preferring its preview override when one exists.
///
/// The end date is inclusive, so one extra day width is added; the width
/// never drops below `min_bar_width`.
pub fn resolve_bar(
    item: &Item,
    axis: &TimeAxis,
    overrides: &PreviewOverrides,
    min_bar_width: f32,
) -> BarGeometry {
    let (span, previewing) = match overrides.get(&item.id) {
        Some(span) => (*span, true),
        None => (item.span(), false),
    };
    let left = axis.date_to_offset(span.start);
    let width = (axis.date_to_offset(span.end) - left + axis.day_width).max(min_bar_width);
    let shape = if span.is_single_day() {
        BarShape::Diamond {
            center_x: left + axis.day_width / 2.0,
        }
    } else {
        BarShape::Bar
    };
    BarGeometry {
        left,
        width,
        shape,
        span,
        previewing,
    }
}

/// Part of a bar under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarHit {
    Body,
    ResizeStart,
    ResizeEnd,
    Connector(AnchorSide),
}

/// Vertical placement of bars within rows, in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowLayout {
    pub row_height: f32,
    pub bar_inset: f32,
    pub handle_width: f32,
    pub connector_radius: f32,
}

impl RowLayout {
    pub fn from_config(layout: &LayoutConfig) -> Self {
        Self {
            row_height: layout.row_height,
            bar_inset: layout.bar_inset,
            handle_width: layout.handle_width,
            connector_radius: layout.connector_radius,
        }
    }

    pub fn row_top(&self, row: usize) -> f32 {
        row as f32 * self.row_height
    }

    pub fn row_center(&self, row: usize) -> f32 {
        self.row_top(row) + self.row_height / 2.0
    }

    fn diamond_half(&self) -> f32 {
        (self.row_height / 2.0 - self.bar_inset).max(4.0)
    }

    /// Bounding rectangle of the bar (or diamond) in row `row`.
    pub fn bar_rect(&self, row: usize, geometry: &BarGeometry) -> Rect {
        match geometry.shape {
            BarShape::Bar => Rect::from_min_size(
                Pos2::new(geometry.left, self.row_top(row) + self.bar_inset),
                Vec2::new(geometry.width, (self.row_height - self.bar_inset * 2.0).max(1.0)),
            ),
            BarShape::Diamond { center_x } => Rect::from_center_size(
                Pos2::new(center_x, self.row_center(row)),
                Vec2::splat(self.diamond_half() * 2.0),
            ),
        }
    }

    /// Connection point on one side of the bar.
    pub fn anchor(&self, row: usize, geometry: &BarGeometry, side: AnchorSide) -> Pos2 {
        let rect = self.bar_rect(row, geometry);
        match side {
            AnchorSide::Start => Pos2::new(rect.left(), rect.center().y),
            AnchorSide::End => Pos2::new(rect.right(), rect.center().y),
        }
    }

    /// Centre of the drag-to-link handle drawn just outside the bar.
    pub fn connector_center(&self, row: usize, geometry: &BarGeometry, side: AnchorSide) -> Pos2 {
        let gap = self.connector_radius + 2.0;
        let anchor = self.anchor(row, geometry, side);
        match side {
            AnchorSide::Start => anchor - Vec2::new(gap, 0.0),
            AnchorSide::End => anchor + Vec2::new(gap, 0.0),
        }
    }

    /// Classify a content-space point against the bar in row `row`.
    ///
    /// Inside the bar, resize handles win over the body. Outside it,
    /// connectors win over the outer half of the resize handles. One-day
    /// diamonds have no resize handles.
    pub fn hit_test(&self, row: usize, geometry: &BarGeometry, pos: Pos2) -> Option<BarHit> {
        let rect = self.bar_rect(row, geometry);
        if !rect.contains(pos) {
            let grab = self.connector_radius + 2.0;
            for side in [AnchorSide::Start, AnchorSide::End] {
                if self.connector_center(row, geometry, side).distance(pos) <= grab {
                    return Some(BarHit::Connector(side));
                }
            }
        }

        if geometry.is_diamond() {
            return rect.contains(pos).then_some(BarHit::Body);
        }

        let half = self.handle_width / 2.0;
        let y_ok = pos.y >= rect.top() && pos.y <= rect.bottom();
        if !y_ok || pos.x < rect.left() - half || pos.x > rect.right() + half {
            return None;
        }
        // Narrow bars keep a body region between the two handles.
        let handle = half.min(rect.width() / 4.0);
        if pos.x <= rect.left() + handle {
            Some(BarHit::ResizeStart)
        } else if pos.x >= rect.right() - handle {
            Some(BarHit::ResizeEnd)
        } else {
            Some(BarHit::Body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::coords::TimelineRange;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn axis() -> TimeAxis {
        TimeAxis::new(TimelineRange::new(date(2024, 1, 1), date(2024, 12, 31)), 10.0)
    }

    fn rows() -> RowLayout {
        RowLayout::from_config(&LayoutConfig::default())
    }

    #[test]
    fn test_bar_geometry_inclusive_end() {
        let item = Item::new("A", date(2024, 3, 1), date(2024, 3, 5));
        let bar = resolve_bar(&item, &axis(), &PreviewOverrides::new(), 6.0);
        // 60 days after the range start.
        assert_eq!(bar.left, 600.0);
        // Five inclusive days.
        assert_eq!(bar.width, 50.0);
        assert_eq!(bar.shape, BarShape::Bar);
        assert!(!bar.previewing);
    }

    #[test]
    fn test_one_day_item_is_diamond() {
        let item = Item::new("Launch", date(2024, 3, 1), date(2024, 3, 1));
        let bar = resolve_bar(&item, &axis(), &PreviewOverrides::new(), 6.0);
        assert_eq!(bar.shape, BarShape::Diamond { center_x: 605.0 });
        assert_eq!(bar.width, 10.0);
    }

    #[test]
    fn test_min_bar_width() {
        let narrow = TimeAxis::new(axis().range, 1.0);
        let item = Item::new("A", date(2024, 3, 1), date(2024, 3, 2));
        let bar = resolve_bar(&item, &narrow, &PreviewOverrides::new(), 6.0);
        assert_eq!(bar.width, 6.0);
    }

    #[test]
    fn test_preview_override_replaces_stored_dates() {
        let item = Item::new("A", date(2024, 3, 1), date(2024, 3, 5));
        let mut overrides = PreviewOverrides::new();
        overrides.insert(item.id, DateSpan::new(date(2024, 3, 11), date(2024, 3, 20)));
        let bar = resolve_bar(&item, &axis(), &overrides, 6.0);
        assert_eq!(bar.left, 700.0);
        assert_eq!(bar.width, 100.0);
        assert!(bar.previewing);
    }

    #[test]
    fn test_hit_test_regions() {
        let rows = rows();
        let item = Item::new("A", date(2024, 3, 1), date(2024, 3, 10));
        let bar = resolve_bar(&item, &axis(), &PreviewOverrides::new(), 6.0);
        let y = rows.row_center(2);
        assert_eq!(rows.hit_test(2, &bar, Pos2::new(650.0, y)), Some(BarHit::Body));
        assert_eq!(rows.hit_test(2, &bar, Pos2::new(601.0, y)), Some(BarHit::ResizeStart));
        assert_eq!(rows.hit_test(2, &bar, Pos2::new(699.0, y)), Some(BarHit::ResizeEnd));
        let end = rows.connector_center(2, &bar, AnchorSide::End);
        assert_eq!(rows.hit_test(2, &bar, end), Some(BarHit::Connector(AnchorSide::End)));
        assert_eq!(rows.hit_test(2, &bar, Pos2::new(650.0, rows.row_center(3))), None);
    }

    #[test]
    fn test_bar_edges_resize_rather_than_link() {
        let rows = rows();
        let item = Item::new("A", date(2024, 3, 1), date(2024, 3, 10));
        let bar = resolve_bar(&item, &axis(), &PreviewOverrides::new(), 6.0);
        let rect = rows.bar_rect(2, &bar);
        let y = rect.center().y;
        assert_eq!(rows.hit_test(2, &bar, Pos2::new(rect.left(), y)), Some(BarHit::ResizeStart));
        assert_eq!(rows.hit_test(2, &bar, Pos2::new(rect.right(), y)), Some(BarHit::ResizeEnd));
        assert_eq!(
            rows.hit_test(2, &bar, Pos2::new(rect.right() + 1.0, y)),
            Some(BarHit::Connector(AnchorSide::End))
        );
    }

    #[test]
    fn test_anchors_sit_on_bar_edges() {
        let rows = rows();
        let item = Item::new("A", date(2024, 3, 1), date(2024, 3, 5));
        let bar = resolve_bar(&item, &axis(), &PreviewOverrides::new(), 6.0);
        assert_eq!(rows.anchor(1, &bar, AnchorSide::Start), Pos2::new(600.0, 48.0));
        assert_eq!(rows.anchor(1, &bar, AnchorSide::End), Pos2::new(650.0, 48.0));
    }
}
