//! Per-frame layout and pointer routing over the timeline components.
//!
//! [`TimelineEngine`] owns the zoom state, viewport and both gesture
//! controllers. Each frame the host calls [`TimelineEngine::layout`] with the
//! current items and edges, paints the returned [`TimelineFrame`], and feeds
//! pointer input back through `pointer_down` / `pointer_move` / `pointer_up`.

use std::collections::HashMap;
use std::ops::Range;

use chrono::NaiveDate;
use egui::{Pos2, Rect, Vec2};

use super::bars::{resolve_bar, AnchorSide, BarGeometry, BarHit, RowLayout};
use super::coords::{days_between, Period, TimeAxis, TimelineRange};
use super::drag::{DragController, GestureKind};
use super::events::TimelineCallbacks;
use super::links::{DependencyRouter, ItemAnchors, LinkPath, RoutedLink};
use super::scale::{generate_scale, Scale};
use super::virtualize::{spacer_padding, Viewport};
use super::zoom::{ZoomAnchor, ZoomChange, ZoomController};
use crate::config::TimelineConfig;
use crate::error::ConfigError;
use crate::model::{Dependency, EdgeId, Item, ItemId};

/// A laid-out bar in a rendered row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarLayout {
    pub item: ItemId,
    pub row: usize,
    pub geometry: BarGeometry,
    pub rect: Rect,
}

/// Everything the painter needs for one frame, in content coordinates.
#[derive(Debug, Clone)]
pub struct TimelineFrame {
    pub axis: TimeAxis,
    pub period: Period,
    /// Rows that are rendered, buffer included.
    pub rows: Range<usize>,
    /// Day columns intersecting the viewport, buffer included.
    pub days: Range<usize>,
    /// One entry per row in `rows`, in row order.
    pub bars: Vec<BarLayout>,
    pub links: Vec<RoutedLink>,
    /// The link being dragged out of a connection handle.
    pub preview_link: Option<LinkPath>,
    pub scale: Scale,
    pub content_size: Vec2,
    /// Heights standing in for the rows above and below `rows`.
    pub padding: (f32, f32),
}

impl TimelineFrame {
    pub fn bar_in_row(&self, row: usize) -> Option<&BarLayout> {
        row.checked_sub(self.rows.start)
            .and_then(|index| self.bars.get(index))
    }
}

/// What a pointer press started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    Ignored,
    DragArmed(ItemId),
    LinkStarted(ItemId),
    LinkPressed(EdgeId),
}

#[derive(Debug, Clone)]
pub struct TimelineEngine {
    config: TimelineConfig,
    range: TimelineRange,
    rows: RowLayout,
    zoom: ZoomController,
    viewport: Viewport,
    drag: DragController,
    router: DependencyRouter,
}

impl TimelineEngine {
    pub fn new(config: TimelineConfig, range: TimelineRange) -> Result<Self, ConfigError> {
        config.validate()?;
        let zoom = ZoomController::new(config.zoom.clone(), Period::Week)?;
        Ok(Self {
            rows: RowLayout::from_config(&config.layout),
            drag: DragController::new(config.drag.click_threshold),
            router: DependencyRouter::new(config.links.clone()),
            zoom,
            range,
            viewport: Viewport::default(),
            config,
        })
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn range(&self) -> TimelineRange {
        self.range
    }

    pub fn zoom(&self) -> &ZoomController {
        &self.zoom
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn row_layout(&self) -> &RowLayout {
        &self.rows
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn router(&self) -> &DependencyRouter {
        &self.router
    }

    pub fn axis(&self) -> TimeAxis {
        self.zoom.axis(self.range)
    }

    /// True while a bar drag, a link drag or a press on a link holds the
    /// pointer.
    pub fn gesture_active(&self) -> bool {
        self.drag.is_active() || self.router.is_linking() || self.router.is_pressing_link()
    }

    /// Replace the timeline window. The range is held fixed while a gesture
    /// is in flight; returns false when the update was refused.
    ///
    /// When the start moves, the horizontal scroll moves with it so the
    /// dates on screen stay put.
    pub fn set_range(&mut self, range: TimelineRange) -> bool {
        if range == self.range {
            return true;
        }
        if self.gesture_active() {
            return false;
        }
        let shift = days_between(self.range.start, range.start) as f32 * self.axis().day_width;
        tracing::debug!(start = %range.start, end = %range.end, shift, "timeline range changed");
        self.range = range;
        self.viewport.scroll.x = (self.viewport.scroll.x + shift).max(0.0);
        true
    }

    /// Record the scroll offset and visible size of the chart body.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.router.scroll_to(viewport.scroll);
    }

    pub fn content_size(&self, row_count: usize) -> Vec2 {
        Vec2::new(
            self.axis().total_width(),
            row_count as f32 * self.rows.row_height,
        )
    }

    // ── Layout ──────────────────────────────────────────────────────

    /// Lay out the rows intersecting the viewport, the links that cross them
    /// and the header cells over the visible window.
    pub fn layout(&self, items: &[Item], dependencies: &[Dependency], today: NaiveDate) -> TimelineFrame {
        let axis = self.axis();
        let rows = self.viewport.visible_rows(
            self.rows.row_height,
            items.len(),
            self.config.virtualization.row_buffer,
        );
        let bars = items[rows.clone()]
            .iter()
            .zip(rows.clone())
            .map(|(item, row)| {
                let geometry = self.resolve(item, &axis);
                BarLayout {
                    item: item.id,
                    row,
                    geometry,
                    rect: self.rows.bar_rect(row, &geometry),
                }
            })
            .collect();
        let days = self.viewport.visible_columns(
            axis.day_width,
            usize::try_from(axis.range.days()).unwrap_or(0),
            self.config.virtualization.column_buffer,
        );
        let links = self.route_links(items, dependencies, &axis, &rows);
        let scale = generate_scale(
            &axis,
            self.zoom.period(),
            self.viewport.pixel_window(),
            self.config.virtualization.scale_buffer,
            &self.config.labels,
            today,
        );

        TimelineFrame {
            axis,
            period: self.zoom.period(),
            padding: spacer_padding(&rows, items.len(), self.rows.row_height),
            content_size: self.content_size(items.len()),
            rows,
            days,
            bars,
            links,
            preview_link: self.router.preview_path(),
            scale,
        }
    }

    fn resolve(&self, item: &Item, axis: &TimeAxis) -> BarGeometry {
        resolve_bar(item, axis, self.drag.overrides(), self.config.layout.min_bar_width)
    }

    /// Route edges with at least part of their span inside `rows`. Anchors
    /// are resolved only for the endpoints of those edges.
    fn route_links(
        &self,
        items: &[Item],
        dependencies: &[Dependency],
        axis: &TimeAxis,
        rows: &Range<usize>,
    ) -> Vec<RoutedLink> {
        if dependencies.is_empty() || rows.is_empty() {
            return Vec::new();
        }
        let index: HashMap<ItemId, usize> = items
            .iter()
            .enumerate()
            .map(|(row, item)| (item.id, row))
            .collect();

        let mut anchors = HashMap::new();
        let mut crossing = Vec::new();
        for edge in dependencies {
            let (Some(&from), Some(&to)) =
                (index.get(&edge.predecessor), index.get(&edge.successor))
            else {
                tracing::trace!(edge = %edge.id, "skipping link with missing endpoint");
                continue;
            };
            if from.max(to) < rows.start || from.min(to) >= rows.end {
                continue;
            }
            for row in [from, to] {
                let item = &items[row];
                anchors.entry(item.id).or_insert_with(|| {
                    let geometry = self.resolve(item, axis);
                    ItemAnchors {
                        start: self.rows.anchor(row, &geometry, AnchorSide::Start),
                        end: self.rows.anchor(row, &geometry, AnchorSide::End),
                    }
                });
            }
            crossing.push(edge.clone());
        }
        self.router.route_all(&crossing, &anchors)
    }

    // ── Pointer input ───────────────────────────────────────────────

    fn bar_hit(&self, frame: &TimelineFrame, pos: Pos2) -> Option<(BarLayout, BarHit)> {
        if pos.y.is_nan() || pos.y < 0.0 {
            return None;
        }
        let row = (pos.y / self.rows.row_height).floor() as usize;
        let bar = *frame.bar_in_row(row)?;
        self.rows
            .hit_test(row, &bar.geometry, pos)
            .map(|hit| (bar, hit))
    }

    /// Classify a content-space point without starting anything.
    pub fn hover(&self, frame: &TimelineFrame, pos: Pos2) -> Option<(ItemId, BarHit)> {
        self.bar_hit(frame, pos).map(|(bar, hit)| (bar.item, hit))
    }

    /// Handle a press at content position `pos`.
    ///
    /// Only one gesture runs at a time: a press while a drag or link session
    /// is active is ignored.
    pub fn pointer_down(
        &mut self,
        frame: &TimelineFrame,
        pos: Pos2,
        callbacks: &mut impl TimelineCallbacks,
    ) -> PointerOutcome {
        if self.gesture_active() {
            return PointerOutcome::Ignored;
        }
        if let Some((bar, hit)) = self.bar_hit(frame, pos) {
            let kind = match hit {
                BarHit::Connector(side) => {
                    let anchor = self.rows.anchor(bar.row, &bar.geometry, side);
                    let scroll = self.viewport.scroll;
                    self.router
                        .begin_link(bar.item, side, anchor, pos - scroll, scroll);
                    return PointerOutcome::LinkStarted(bar.item);
                }
                BarHit::Body => GestureKind::Move,
                BarHit::ResizeStart => GestureKind::ResizeStart,
                BarHit::ResizeEnd => GestureKind::ResizeEnd,
            };
            self.drag.pointer_down(bar.item, kind, pos, bar.geometry);
            return PointerOutcome::DragArmed(bar.item);
        }
        match self.router.hit_test(&frame.links, pos) {
            Some(edge) => {
                self.router.press_link(edge, pos);
                PointerOutcome::LinkPressed(edge)
            }
            None => PointerOutcome::Ignored,
        }
    }

    /// Track the pointer at content position `pos`.
    pub fn pointer_move(&mut self, pos: Pos2) {
        if self.drag.is_active() {
            let axis = self.axis();
            self.drag.pointer_move(pos, &axis);
        } else if self.router.is_linking() {
            self.router.pointer_move(pos - self.viewport.scroll);
        } else if self.router.is_pressing_link() {
            self.router.track_press(pos, self.config.drag.click_threshold);
        }
    }

    /// End the active gesture. `pos` is the release position when the
    /// pointer is still known; a release outside the window passes `None`.
    pub fn pointer_up(
        &mut self,
        frame: &TimelineFrame,
        pos: Option<Pos2>,
        callbacks: &mut impl TimelineCallbacks,
    ) {
        if self.drag.is_active() {
            let axis = self.axis();
            self.drag.pointer_up(pos, &axis, callbacks);
        } else if self.router.is_linking() {
            let target = pos
                .and_then(|pos| self.bar_hit(frame, pos))
                .and_then(|(bar, hit)| match hit {
                    BarHit::Connector(side) => Some((bar.item, side)),
                    _ => None,
                });
            self.router.finish_link(target, callbacks);
        } else if self.router.is_pressing_link() {
            self.router
                .release_link(pos, self.config.drag.click_threshold, callbacks);
        }
    }

    /// Drop any gesture in flight without reporting it.
    pub fn cancel_gestures(&mut self) {
        self.drag.cancel();
        self.router.cancel_link();
    }

    // ── Zoom & scroll ───────────────────────────────────────────────

    /// Anchor at `cursor_x` (viewport-relative) or the viewport centre.
    fn zoom_anchor(&self, cursor_x: Option<f32>) -> ZoomAnchor {
        ZoomAnchor {
            cursor_x: cursor_x.unwrap_or(self.viewport.size.x / 2.0),
            scroll_left: self.viewport.scroll.x,
        }
    }

    fn apply_zoom(&mut self, change: Option<ZoomChange>) -> Option<ZoomChange> {
        let change = change?;
        if let Some(scroll_left) = change.scroll_left {
            self.viewport.scroll.x = scroll_left;
        }
        Some(change)
    }

    pub fn zoom_in(&mut self, cursor_x: Option<f32>) -> Option<ZoomChange> {
        self.zoom_by(1, cursor_x)
    }

    pub fn zoom_out(&mut self, cursor_x: Option<f32>) -> Option<ZoomChange> {
        self.zoom_by(-1, cursor_x)
    }

    /// Zoom requests are ignored while a gesture is in flight, since both
    /// sessions hold positions measured at the current day width.
    pub fn zoom_by(&mut self, steps: i32, cursor_x: Option<f32>) -> Option<ZoomChange> {
        if self.gesture_active() {
            return None;
        }
        let anchor = self.zoom_anchor(cursor_x);
        let change = self.zoom.zoom_by(steps, Some(anchor));
        self.apply_zoom(change)
    }

    pub fn set_period(&mut self, period: Period) -> Option<ZoomChange> {
        if self.gesture_active() {
            return None;
        }
        let anchor = self.zoom_anchor(None);
        let change = self.zoom.set_period(period, Some(anchor));
        self.apply_zoom(change)
    }

    /// Feed a zoom wheel delta at `time` seconds, anchored at `cursor_x`.
    pub fn wheel_zoom(&mut self, delta: f32, time: f64, cursor_x: f32) -> Option<ZoomChange> {
        if self.gesture_active() {
            return None;
        }
        let anchor = self.zoom_anchor(Some(cursor_x));
        let change = self.zoom.wheel(delta, time, Some(anchor));
        self.apply_zoom(change)
    }

    /// Horizontal scroll offset that centres `date` in the viewport.
    pub fn scroll_to_date(&mut self, date: NaiveDate) -> f32 {
        let axis = self.axis();
        let target = axis.date_to_offset(axis.range.clamp(date)) + axis.day_width / 2.0;
        let scroll_left = (target - self.viewport.size.x / 2.0).max(0.0);
        self.viewport.scroll.x = scroll_left;
        scroll_left
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::events::TimelineEvent;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn engine() -> TimelineEngine {
        let mut engine = TimelineEngine::new(
            TimelineConfig::default(),
            TimelineRange::new(date(2024, 1, 1), date(2025, 1, 1)),
        )
        .unwrap();
        engine.set_viewport(Viewport::new(Vec2::ZERO, Vec2::new(1000.0, 320.0)));
        engine
    }

    /// A: 2024-03-01..05 in row 0, B: 2024-03-10..12 in row 1.
    fn two_items() -> Vec<Item> {
        vec![
            Item::new("Alpha", date(2024, 3, 1), date(2024, 3, 5)),
            Item::new("Beta", date(2024, 3, 10), date(2024, 3, 12)),
        ]
    }

    fn many_items(count: usize) -> Vec<Item> {
        (0..count)
            .map(|i| {
                let start = date(2024, 1, 1) + Duration::days((i % 300) as i64);
                Item::new(format!("Feature {i:03}"), start, start + Duration::days(4))
            })
            .collect()
    }

    #[test]
    fn test_bar_geometry_at_ten_pixels_per_day() {
        let engine = engine();
        let items = two_items();
        let frame = engine.layout(&items, &[], date(2024, 3, 2));
        let bar = frame.bars[0];
        assert_eq!(engine.axis().day_width, 10.0);
        assert_eq!(bar.geometry.left, 600.0);
        assert_eq!(bar.geometry.width, 50.0);
        assert_eq!(bar.rect.top(), 6.0);
        assert_eq!(bar.rect.bottom(), 26.0);
        assert_eq!(frame.content_size, Vec2::new(3660.0, 64.0));
        // 1000px on screen plus the 300px column buffer on the right.
        assert_eq!(frame.days, 0..130);
    }

    #[test]
    fn test_invalid_config_fails_construction() {
        let mut config = TimelineConfig::default();
        config.zoom.week.min = f32::NAN;
        let range = TimelineRange::new(date(2024, 1, 1), date(2025, 1, 1));
        assert!(TimelineEngine::new(config, range).is_err());
    }

    #[test]
    fn test_layout_renders_only_visible_rows() {
        let mut engine = engine();
        engine.set_viewport(Viewport::new(
            Vec2::new(0.0, 3200.0),
            Vec2::new(1000.0, 320.0),
        ));
        let items = many_items(1000);
        let frame = engine.layout(&items, &[], date(2024, 3, 1));
        assert_eq!(frame.rows, 90..120);
        assert_eq!(frame.bars.len(), 30);
        assert_eq!(frame.bars[0].row, 90);
        assert_eq!(frame.bars[0].item, items[90].id);
        assert_eq!(frame.padding, (90.0 * 32.0, 880.0 * 32.0));
        assert_eq!(frame.content_size.y, 32_000.0);
    }

    #[test]
    fn test_links_crossing_the_viewport_are_routed() {
        let mut engine = engine();
        engine.set_viewport(Viewport::new(
            Vec2::new(0.0, 3200.0),
            Vec2::new(1000.0, 320.0),
        ));
        let items = many_items(1000);
        let spanning = Dependency::new(items[0].id, items[999].id);
        let above = Dependency::new(items[1].id, items[2].id);
        let dangling = Dependency::new(items[100].id, ItemId::new());
        let frame = engine.layout(
            &items,
            &[spanning.clone(), above, dangling],
            date(2024, 3, 1),
        );
        assert_eq!(frame.links.len(), 1);
        assert_eq!(frame.links[0].edge, spanning.id);
    }

    #[test]
    fn test_short_press_on_bar_is_a_click() {
        let mut engine = engine();
        let items = two_items();
        let frame = engine.layout(&items, &[], date(2024, 3, 1));
        let mut events = Vec::new();

        let outcome = engine.pointer_down(&frame, Pos2::new(620.0, 16.0), &mut events);
        assert_eq!(outcome, PointerOutcome::DragArmed(items[0].id));
        engine.pointer_move(Pos2::new(622.0, 17.0));
        engine.pointer_up(&frame, Some(Pos2::new(622.0, 17.0)), &mut events);

        assert_eq!(events, vec![TimelineEvent::Edit(items[0].id)]);
        assert!(!engine.gesture_active());
    }

    #[test]
    fn test_drag_previews_then_commits_once() {
        let mut engine = engine();
        let items = two_items();
        let frame = engine.layout(&items, &[], date(2024, 3, 1));
        let mut events = Vec::new();

        engine.pointer_down(&frame, Pos2::new(620.0, 16.0), &mut events);
        engine.pointer_move(Pos2::new(651.0, 16.0));

        let preview = engine.layout(&items, &[], date(2024, 3, 1));
        assert!(preview.bars[0].geometry.previewing);
        assert_eq!(preview.bars[0].geometry.left, 630.0);
        assert!(events.is_empty());

        engine.pointer_up(&preview, Some(Pos2::new(651.0, 16.0)), &mut events);
        assert_eq!(
            events,
            vec![TimelineEvent::CommitDates {
                item: items[0].id,
                start: date(2024, 3, 4),
                end: date(2024, 3, 8),
            }]
        );
        let after = engine.layout(&items, &[], date(2024, 3, 1));
        assert!(!after.bars[0].geometry.previewing);
    }

    #[test]
    fn test_resize_handle_starts_resize() {
        let mut engine = engine();
        let items = two_items();
        let frame = engine.layout(&items, &[], date(2024, 3, 1));
        let mut events = Vec::new();

        // Right edge of Alpha is at x = 650.
        engine.pointer_down(&frame, Pos2::new(649.0, 16.0), &mut events);
        engine.pointer_move(Pos2::new(679.0, 16.0));
        engine.pointer_up(&frame, None, &mut events);
        assert_eq!(
            events,
            vec![TimelineEvent::CommitDates {
                item: items[0].id,
                start: date(2024, 3, 1),
                end: date(2024, 3, 8),
            }]
        );
    }

    #[test]
    fn test_link_drag_between_opposing_handles_creates_dependency() {
        let mut engine = engine();
        let items = two_items();
        let frame = engine.layout(&items, &[], date(2024, 3, 1));
        let mut events = Vec::new();

        // Alpha's end handle sits at 650 + 7, Beta's start handle at 690 - 7.
        let outcome = engine.pointer_down(&frame, Pos2::new(657.0, 16.0), &mut events);
        assert_eq!(outcome, PointerOutcome::LinkStarted(items[0].id));
        engine.pointer_move(Pos2::new(683.0, 48.0));

        let preview = engine.layout(&items, &[], date(2024, 3, 1));
        let path = preview.preview_link.unwrap();
        assert_eq!(path.from(), Pos2::new(650.0, 16.0));
        assert_eq!(path.to(), Pos2::new(683.0, 48.0));

        engine.pointer_up(&preview, Some(Pos2::new(683.0, 48.0)), &mut events);
        assert_eq!(
            events,
            vec![TimelineEvent::CreateDependency {
                predecessor: items[0].id,
                successor: items[1].id,
            }]
        );
        assert!(!engine.router().is_linking());
    }

    #[test]
    fn test_link_cursor_follows_scroll() {
        let mut engine = engine();
        let items = two_items();
        let frame = engine.layout(&items, &[], date(2024, 3, 1));
        let mut events = Vec::new();

        engine.pointer_down(&frame, Pos2::new(657.0, 16.0), &mut events);
        engine.set_viewport(Viewport::new(Vec2::new(40.0, 0.0), Vec2::new(1000.0, 320.0)));
        let preview = engine.layout(&items, &[], date(2024, 3, 1));
        assert_eq!(preview.preview_link.unwrap().to(), Pos2::new(697.0, 16.0));
    }

    #[test]
    fn test_link_dropped_on_empty_space_is_discarded() {
        let mut engine = engine();
        let items = two_items();
        let frame = engine.layout(&items, &[], date(2024, 3, 1));
        let mut events = Vec::new();

        engine.pointer_down(&frame, Pos2::new(657.0, 16.0), &mut events);
        engine.pointer_up(&frame, Some(Pos2::new(900.0, 200.0)), &mut events);
        assert!(events.is_empty());
        assert!(!engine.gesture_active());
    }

    #[test]
    fn test_gestures_are_mutually_exclusive() {
        let mut engine = engine();
        let items = two_items();
        let frame = engine.layout(&items, &[], date(2024, 3, 1));
        let mut events = Vec::new();

        engine.pointer_down(&frame, Pos2::new(657.0, 16.0), &mut events);
        let second = engine.pointer_down(&frame, Pos2::new(705.0, 48.0), &mut events);
        assert_eq!(second, PointerOutcome::Ignored);
        assert!(!engine.drag().is_active());

        engine.cancel_gestures();
        engine.pointer_down(&frame, Pos2::new(705.0, 48.0), &mut events);
        let third = engine.pointer_down(&frame, Pos2::new(657.0, 16.0), &mut events);
        assert_eq!(third, PointerOutcome::Ignored);
        assert!(!engine.router().is_linking());
        assert!(events.is_empty());
    }

    #[test]
    fn test_clicking_a_link_requests_deletion() {
        let mut engine = engine();
        let items = two_items();
        let edge = Dependency::new(items[0].id, items[1].id);
        let frame = engine.layout(&items, std::slice::from_ref(&edge), date(2024, 3, 1));
        assert_eq!(frame.links.len(), 1);
        let mut events = Vec::new();

        let midpoint = frame.links[0].path.point_at(0.5);
        let outcome = engine.pointer_down(&frame, midpoint, &mut events);
        assert_eq!(outcome, PointerOutcome::LinkPressed(edge.id));
        assert!(events.is_empty());
        assert!(engine.gesture_active());
        assert!(engine.zoom_in(None).is_none());

        engine.pointer_up(&frame, Some(midpoint), &mut events);
        assert_eq!(events, vec![TimelineEvent::DeleteDependencyRequest(edge.id)]);
        assert!(!engine.gesture_active());
    }

    #[test]
    fn test_dragging_off_a_link_does_not_request_deletion() {
        let mut engine = engine();
        let items = two_items();
        let edge = Dependency::new(items[0].id, items[1].id);
        let frame = engine.layout(&items, std::slice::from_ref(&edge), date(2024, 3, 1));
        let mut events = Vec::new();

        let midpoint = frame.links[0].path.point_at(0.5);
        engine.pointer_down(&frame, midpoint, &mut events);
        let away = midpoint + Vec2::new(200.0, 150.0);
        engine.pointer_move(away);
        engine.pointer_up(&frame, Some(away), &mut events);
        assert!(events.is_empty());
        assert!(!engine.gesture_active());
    }

    #[test]
    fn test_wheel_zoom_is_anchored_at_cursor() {
        let mut engine = engine();
        let change = engine.wheel_zoom(100.0, 0.0, 300.0).unwrap();
        assert_eq!(change.new_day_width, 11.0);
        assert!((engine.viewport().scroll.x - 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_and_range_wait_for_gesture_end() {
        let mut engine = engine();
        let items = two_items();
        let frame = engine.layout(&items, &[], date(2024, 3, 1));
        let mut events = Vec::new();
        engine.pointer_down(&frame, Pos2::new(620.0, 16.0), &mut events);

        assert!(engine.zoom_in(None).is_none());
        assert!(engine.wheel_zoom(500.0, 0.0, 100.0).is_none());
        let wider = TimelineRange::new(date(2023, 1, 1), date(2025, 1, 1));
        assert!(!engine.set_range(wider));
        assert_eq!(engine.zoom().level(), 5);

        engine.pointer_up(&frame, None, &mut events);
        assert!(engine.set_range(wider));
        assert!(engine.zoom_in(None).is_some());
    }

    #[test]
    fn test_range_start_change_keeps_dates_in_place() {
        let mut engine = engine();
        engine.set_viewport(Viewport::new(Vec2::new(500.0, 0.0), Vec2::new(1000.0, 320.0)));
        let items = two_items();
        let before = engine.layout(&items, &[], date(2024, 3, 1));
        let screen_x = before.bars[0].geometry.left - engine.viewport().scroll.x;

        // Pulling an item a week earlier widens the range at the front.
        assert!(engine.set_range(TimelineRange::new(date(2023, 12, 25), date(2025, 1, 1))));
        assert_eq!(engine.viewport().scroll.x, 570.0);
        let after = engine.layout(&items, &[], date(2024, 3, 1));
        assert_eq!(after.bars[0].geometry.left - engine.viewport().scroll.x, screen_x);

        // Trimming the front never scrolls past the left edge.
        assert!(engine.set_range(TimelineRange::new(date(2024, 3, 1), date(2025, 1, 1))));
        assert_eq!(engine.viewport().scroll.x, 0.0);
    }

    #[test]
    fn test_scroll_to_date_centres_day() {
        let mut engine = engine();
        assert_eq!(engine.scroll_to_date(date(2024, 3, 1)), 105.0);
        assert_eq!(engine.scroll_to_date(date(2024, 1, 2)), 0.0);
    }

    #[test]
    fn test_header_follows_period() {
        let mut engine = engine();
        engine.set_period(Period::Quarter);
        let frame = engine.layout(&[], &[], date(2024, 3, 1));
        assert_eq!(frame.period, Period::Quarter);
        assert!(!frame.scale.columns.is_empty());
        assert!(frame.bars.is_empty());
        assert!(frame.links.is_empty());
    }
}
