//! Pointer state machine for moving and resizing bars.
//!
//! `Idle → Armed → Dragging → Idle`. A press arms a session without touching
//! anything visible; travelling past the click threshold turns it into a
//! drag whose candidate dates are published as a preview override. Release
//! either reports a click (`on_edit`) or commits the last preview.

use chrono::Duration;
use egui::Pos2;

use super::bars::{BarGeometry, PreviewOverrides};
use super::coords::{DateSpan, TimeAxis, TimelineRange};
use super::events::TimelineCallbacks;
use crate::model::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    ResizeStart,
    ResizeEnd,
}

/// The single in-flight bar gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub item: ItemId,
    pub kind: GestureKind,
    pub origin_pointer: Pos2,
    pub origin_geometry: BarGeometry,
    pub origin_span: DateSpan,
    /// Set once the pointer has travelled past the click threshold.
    pub moved: bool,
    pub preview: DateSpan,
}

#[derive(Debug, Clone, Default, PartialEq)]
enum DragState {
    #[default]
    Idle,
    Armed(DragSession),
    Dragging(DragSession),
}

/// Owns the drag session and the preview overrides it produces.
#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
    overrides: PreviewOverrides,
    click_threshold: f32,
}

impl DragController {
    pub fn new(click_threshold: f32) -> Self {
        Self {
            state: DragState::Idle,
            overrides: PreviewOverrides::new(),
            click_threshold,
        }
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Idle => None,
            DragState::Armed(session) | DragState::Dragging(session) => Some(session),
        }
    }

    /// True while a session holds the pointer; the host must route global
    /// pointer events here until it ends.
    pub fn is_active(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn overrides(&self) -> &PreviewOverrides {
        &self.overrides
    }

    /// Arm a gesture on a bar. Ignored unless idle.
    pub fn pointer_down(
        &mut self,
        item: ItemId,
        kind: GestureKind,
        pointer: Pos2,
        geometry: BarGeometry,
    ) -> bool {
        if self.is_active() {
            return false;
        }
        self.state = DragState::Armed(DragSession {
            item,
            kind,
            origin_pointer: pointer,
            origin_geometry: geometry,
            origin_span: geometry.span,
            moved: false,
            preview: geometry.span,
        });
        true
    }

    pub fn pointer_move(&mut self, pointer: Pos2, axis: &TimeAxis) {
        let threshold = self.click_threshold;
        let state = std::mem::take(&mut self.state);
        self.state = match state {
            DragState::Idle => DragState::Idle,
            DragState::Armed(mut session) => {
                if session.origin_pointer.distance(pointer) < threshold {
                    DragState::Armed(session)
                } else {
                    session.moved = true;
                    self.update_preview(&mut session, pointer, axis);
                    DragState::Dragging(session)
                }
            }
            DragState::Dragging(mut session) => {
                self.update_preview(&mut session, pointer, axis);
                DragState::Dragging(session)
            }
        };
    }

    /// Finish the gesture. `pointer` is the release position when known.
    pub fn pointer_up(
        &mut self,
        pointer: Option<Pos2>,
        axis: &TimeAxis,
        callbacks: &mut impl TimelineCallbacks,
    ) {
        if let Some(pointer) = pointer {
            self.pointer_move(pointer, axis);
        }
        match std::mem::take(&mut self.state) {
            DragState::Idle => {}
            DragState::Armed(session) => {
                tracing::debug!(item = %session.item, "bar clicked");
                callbacks.on_edit(session.item);
            }
            DragState::Dragging(session) => {
                tracing::debug!(
                    item = %session.item,
                    kind = ?session.kind,
                    start = %session.preview.start,
                    end = %session.preview.end,
                    "drag committed"
                );
                callbacks.on_commit_dates(session.item, session.preview.start, session.preview.end);
            }
        }
        self.overrides.clear();
    }

    /// Abandon the gesture without reporting anything.
    pub fn cancel(&mut self) {
        if let Some(session) = self.session() {
            tracing::debug!(item = %session.item, "drag cancelled");
        }
        self.state = DragState::Idle;
        self.overrides.clear();
    }

    fn update_preview(&mut self, session: &mut DragSession, pointer: Pos2, axis: &TimeAxis) {
        let days = ((pointer.x - session.origin_pointer.x) / axis.day_width).round() as i64;
        session.preview = candidate_span(session.kind, session.origin_span, days, &axis.range);
        self.overrides.insert(session.item, session.preview);
    }
}

/// Dates produced by shifting `origin` by `days` under `kind`, clamped so the
/// result is never inverted and stays inside `range`.
///
/// A move keeps its duration: when one end would leave the range the whole
/// span slides back in. A span longer than the range cannot fit, so both of
/// its ends are clamped instead.
pub fn candidate_span(kind: GestureKind, origin: DateSpan, days: i64, range: &TimelineRange) -> DateSpan {
    let shift = Duration::days(days);
    let last = range.last_day();
    match kind {
        GestureKind::Move => {
            let mut span = origin.shifted(days);
            if origin.days() > range.days() {
                return DateSpan::new(range.clamp(span.start), range.clamp(span.end));
            }
            if span.end > last {
                span = span.shifted(-(span.end - last).num_days());
            }
            if span.start < range.start {
                span = span.shifted((range.start - span.start).num_days());
            }
            span
        }
        GestureKind::ResizeStart => {
            let end = range.clamp(origin.end);
            let start = range.clamp(origin.start + shift).min(end);
            DateSpan { start, end }
        }
        GestureKind::ResizeEnd => {
            let start = range.clamp(origin.start);
            let end = range.clamp(origin.end + shift).max(start);
            DateSpan { start, end }
        }
    }
}
