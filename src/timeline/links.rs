//! Dependency link routing and the drag-to-link gesture.
//!
//! Links run from the predecessor's end edge to the successor's start edge.
//! Each edge is routed on its own; the edge list may contain cycles and
//! self-loops, and nothing here walks the graph.

use std::collections::HashMap;

use egui::{Pos2, Rect, Vec2};

use super::bars::AnchorSide;
use super::events::TimelineCallbacks;
use crate::config::LinkConfig;
use crate::model::{Dependency, EdgeId, ItemId};

/// Segments used to approximate a curve for hit testing.
const FLATTEN_SEGMENTS: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LinkPath {
    Straight {
        from: Pos2,
        to: Pos2,
    },
    /// Cubic bezier. `offset` is the horizontal control-point distance;
    /// `looped` marks links that point backward in time.
    Curve {
        from: Pos2,
        ctrl1: Pos2,
        ctrl2: Pos2,
        to: Pos2,
        offset: f32,
        looped: bool,
    },
}

impl LinkPath {
    pub fn from(&self) -> Pos2 {
        match *self {
            LinkPath::Straight { from, .. } | LinkPath::Curve { from, .. } => from,
        }
    }

    pub fn to(&self) -> Pos2 {
        match *self {
            LinkPath::Straight { to, .. } | LinkPath::Curve { to, .. } => to,
        }
    }

    pub fn is_looped(&self) -> bool {
        matches!(self, LinkPath::Curve { looped: true, .. })
    }

    /// The four bezier points; a straight path degenerates to its endpoints.
    pub fn control_points(&self) -> [Pos2; 4] {
        match *self {
            LinkPath::Straight { from, to } => [from, from, to, to],
            LinkPath::Curve {
                from,
                ctrl1,
                ctrl2,
                to,
                ..
            } => [from, ctrl1, ctrl2, to],
        }
    }

    pub fn point_at(&self, t: f32) -> Pos2 {
        let [p0, p1, p2, p3] = self.control_points();
        let u = 1.0 - t;
        let v = p0.to_vec2() * (u * u * u)
            + p1.to_vec2() * (3.0 * u * u * t)
            + p2.to_vec2() * (3.0 * u * t * t)
            + p3.to_vec2() * (t * t * t);
        v.to_pos2()
    }

    /// Unit direction the path arrives with, for drawing an arrowhead.
    pub fn end_direction(&self) -> Vec2 {
        let [_, _, p2, p3] = self.control_points();
        let mut dir = p3 - p2;
        if dir.length_sq() < 1e-6 {
            dir = p3 - self.point_at(0.95);
        }
        if dir.length_sq() < 1e-6 {
            Vec2::X
        } else {
            dir.normalized()
        }
    }

    pub fn flatten(&self) -> Vec<Pos2> {
        match *self {
            LinkPath::Straight { from, to } => vec![from, to],
            LinkPath::Curve { .. } => (0..=FLATTEN_SEGMENTS)
                .map(|i| self.point_at(i as f32 / FLATTEN_SEGMENTS as f32))
                .collect(),
        }
    }

    /// Shortest distance from `pos` to the (flattened) path.
    pub fn distance_to(&self, pos: Pos2) -> f32 {
        self.flatten()
            .windows(2)
            .map(|seg| segment_distance(pos, seg[0], seg[1]))
            .fold(f32::INFINITY, f32::min)
    }

    /// Bounding box of the control polygon, which contains the curve.
    pub fn bounds(&self) -> Rect {
        Rect::from_points(&self.control_points())
    }
}

fn segment_distance(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Connection points of one item, in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemAnchors {
    pub start: Pos2,
    pub end: Pos2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutedLink {
    pub edge: EdgeId,
    pub predecessor: ItemId,
    pub successor: ItemId,
    pub path: LinkPath,
}

/// An in-progress drag from a connection handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkSession {
    pub source: ItemId,
    pub side: AnchorSide,
    /// The source connection point in content coordinates.
    pub anchor: Pos2,
    /// Last pointer position relative to the viewport.
    pub pointer: Pos2,
    /// Scroll offset of the content when `pointer` was recorded or last
    /// re-anchored.
    pub scroll: Vec2,
}

impl LinkSession {
    /// The cursor in content coordinates.
    pub fn cursor(&self) -> Pos2 {
        self.pointer + self.scroll
    }
}

/// A press on an existing link. It becomes a delete request only if the
/// button comes back up before the pointer travels past the click threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkPress {
    pub edge: EdgeId,
    /// Press position in content coordinates.
    pub origin: Pos2,
    pub moved: bool,
}

/// Routes dependency curves and runs the link-creation gesture.
#[derive(Debug, Clone)]
pub struct DependencyRouter {
    config: LinkConfig,
    session: Option<LinkSession>,
    press: Option<LinkPress>,
}

impl DependencyRouter {
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            session: None,
            press: None,
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Control offset for a link pointing forward in time.
    pub fn forward_offset(&self, dx: f32) -> f32 {
        (dx.abs() * 0.5).max(self.config.min_offset)
    }

    /// Control offset for a link pointing backward; large enough that the
    /// curve bows out past both endpoints instead of crossing itself.
    pub fn loop_offset(&self, dx: f32) -> f32 {
        self.config.loop_min_offset.max(dx.abs() + self.config.loop_padding)
    }

    /// Path from a predecessor's end anchor to a successor's start anchor.
    pub fn route(&self, from: Pos2, to: Pos2) -> LinkPath {
        let dx = to.x - from.x;
        let same_row = (to.y - from.y).abs() <= self.config.same_row_tolerance;

        if dx >= 0.0 {
            if same_row {
                return LinkPath::Straight { from, to };
            }
            let offset = self.forward_offset(dx);
            return LinkPath::Curve {
                from,
                ctrl1: from + Vec2::new(offset, 0.0),
                ctrl2: to - Vec2::new(offset, 0.0),
                to,
                offset,
                looped: false,
            };
        }

        let offset = self.loop_offset(dx);
        // On a single row the horizontal controls would fold the loop flat
        // onto the bar, so bow it below the row.
        let bow = if same_row {
            Vec2::new(0.0, self.config.loop_min_offset)
        } else {
            Vec2::ZERO
        };
        LinkPath::Curve {
            from,
            ctrl1: from + Vec2::new(offset, 0.0) + bow,
            ctrl2: to - Vec2::new(offset, 0.0) + bow,
            to,
            offset,
            looped: true,
        }
    }

    /// Route every edge whose endpoints both have anchors. Edges referencing
    /// items that aren't laid out (filtered or culled) are skipped.
    pub fn route_all(
        &self,
        edges: &[Dependency],
        anchors: &HashMap<ItemId, ItemAnchors>,
    ) -> Vec<RoutedLink> {
        edges
            .iter()
            .filter_map(|edge| {
                let (Some(pred), Some(succ)) =
                    (anchors.get(&edge.predecessor), anchors.get(&edge.successor))
                else {
                    tracing::trace!(edge = %edge.id, "skipping link with missing endpoint");
                    return None;
                };
                Some(RoutedLink {
                    edge: edge.id,
                    predecessor: edge.predecessor,
                    successor: edge.successor,
                    path: self.route(pred.end, succ.start),
                })
            })
            .collect()
    }

    /// The link whose hit stroke contains `pos`, nearest first.
    pub fn hit_test(&self, links: &[RoutedLink], pos: Pos2) -> Option<EdgeId> {
        let reach = self.config.hit_width / 2.0;
        links
            .iter()
            .filter(|link| link.path.bounds().expand(reach).contains(pos))
            .map(|link| (link.edge, link.path.distance_to(pos)))
            .filter(|(_, distance)| *distance <= reach)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(edge, _)| edge)
    }

    // ── Link clicks ─────────────────────────────────────────────────

    pub fn is_pressing_link(&self) -> bool {
        self.press.is_some()
    }

    /// Hold a press on `edge` at content position `pos`. Ignored while any
    /// link gesture is active.
    pub fn press_link(&mut self, edge: EdgeId, pos: Pos2) -> bool {
        if self.session.is_some() || self.press.is_some() {
            return false;
        }
        self.press = Some(LinkPress {
            edge,
            origin: pos,
            moved: false,
        });
        true
    }

    /// Track a held press; once it travels `threshold` pixels it can no
    /// longer become a click.
    pub fn track_press(&mut self, pos: Pos2, threshold: f32) {
        if let Some(press) = &mut self.press {
            if press.origin.distance(pos) >= threshold {
                press.moved = true;
            }
        }
    }

    /// Release a held press. A release that stayed within the threshold
    /// reports a delete request; the edge is not removed here.
    pub fn release_link(
        &mut self,
        pos: Option<Pos2>,
        threshold: f32,
        callbacks: &mut impl TimelineCallbacks,
    ) {
        let Some(pos) = pos else {
            self.press = None;
            return;
        };
        self.track_press(pos, threshold);
        let Some(press) = self.press.take() else {
            return;
        };
        if press.moved {
            tracing::debug!(edge = %press.edge, "link press dragged away");
            return;
        }
        tracing::debug!(edge = %press.edge, "link delete requested");
        callbacks.on_delete_dependency_request(press.edge);
    }

    // ── Link creation ───────────────────────────────────────────────

    pub fn session(&self) -> Option<&LinkSession> {
        self.session.as_ref()
    }

    pub fn is_linking(&self) -> bool {
        self.session.is_some()
    }

    /// Start dragging a link out of `source`'s connection handle. Ignored
    /// while another link gesture is active.
    pub fn begin_link(
        &mut self,
        source: ItemId,
        side: AnchorSide,
        anchor: Pos2,
        pointer: Pos2,
        scroll: Vec2,
    ) -> bool {
        if self.session.is_some() || self.press.is_some() {
            return false;
        }
        self.session = Some(LinkSession {
            source,
            side,
            anchor,
            pointer,
            scroll,
        });
        true
    }

    /// Track the pointer, given relative to the viewport.
    pub fn pointer_move(&mut self, pointer: Pos2) {
        if let Some(session) = &mut self.session {
            session.pointer = pointer;
        }
    }

    /// Re-anchor the cursor after the content scrolled under a still pointer.
    pub fn scroll_to(&mut self, scroll: Vec2) {
        if let Some(session) = &mut self.session {
            session.scroll = scroll;
        }
    }

    /// Preview of the link being dragged, from the source handle to the cursor.
    pub fn preview_path(&self) -> Option<LinkPath> {
        let session = self.session.as_ref()?;
        let cursor = session.cursor();
        Some(match session.side {
            AnchorSide::End => self.route(session.anchor, cursor),
            AnchorSide::Start => self.route(cursor, session.anchor),
        })
    }

    /// Release the link gesture over `target` (an item and the handle side
    /// under the pointer), creating a dependency when the handles oppose.
    pub fn finish_link(
        &mut self,
        target: Option<(ItemId, AnchorSide)>,
        callbacks: &mut impl TimelineCallbacks,
    ) {
        let Some(session) = self.session.take() else {
            return;
        };
        let Some((target, target_side)) = target else {
            tracing::debug!(source = %session.source, "link dropped on empty space");
            return;
        };
        if target_side != session.side.opposite() {
            tracing::debug!(source = %session.source, "link dropped on a non-opposing handle");
            return;
        }
        let (predecessor, successor) = match session.side {
            AnchorSide::End => (session.source, target),
            AnchorSide::Start => (target, session.source),
        };
        if predecessor == successor {
            tracing::debug!(item = %predecessor, "discarding self-link");
            return;
        }
        tracing::debug!(%predecessor, %successor, "link created");
        callbacks.on_create_dependency(predecessor, successor);
    }

    /// Drop the link drag and any held link press.
    pub fn cancel_link(&mut self) {
        self.session = None;
        self.press = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::events::TimelineEvent;

    fn router() -> DependencyRouter {
        DependencyRouter::new(LinkConfig::default())
    }

    fn anchors(start: (f32, f32), end: (f32, f32)) -> ItemAnchors {
        ItemAnchors {
            start: Pos2::new(start.0, start.1),
            end: Pos2::new(end.0, end.1),
        }
    }

    #[test]
    fn test_same_row_forward_is_straight() {
        let path = router().route(Pos2::new(100.0, 48.0), Pos2::new(180.0, 50.0));
        assert!(matches!(path, LinkPath::Straight { .. }));
        assert_eq!(path.flatten().len(), 2);
    }

    #[test]
    fn test_forward_curve_offset() {
        let router = router();
        let path = router.route(Pos2::new(100.0, 16.0), Pos2::new(300.0, 80.0));
        match path {
            LinkPath::Curve {
                ctrl1,
                ctrl2,
                offset,
                looped,
                ..
            } => {
                assert_eq!(offset, 100.0);
                assert!(!looped);
                assert_eq!(ctrl1, Pos2::new(200.0, 16.0));
                assert_eq!(ctrl2, Pos2::new(200.0, 80.0));
            }
            LinkPath::Straight { .. } => panic!("expected a curve"),
        }
        assert_eq!(router.forward_offset(10.0), 20.0);
    }

    #[test]
    fn test_loop_offset_exceeds_forward_offset() {
        let router = router();
        for dx in [0.5_f32, 1.0, 10.0, 40.0, 100.0, 1_000.0, 50_000.0] {
            assert!(router.loop_offset(-dx) > router.forward_offset(dx), "dx = {dx}");
        }
    }

    #[test]
    fn test_backward_overlap_uses_loop_branch() {
        // At 10px/day, B starts three days before A ends.
        let router = router();
        let a_end = Pos2::new(650.0, 16.0);
        let b_start = Pos2::new(620.0, 48.0);
        match router.route(a_end, b_start) {
            LinkPath::Curve {
                ctrl1,
                ctrl2,
                offset,
                looped,
                ..
            } => {
                assert!(looped);
                assert_eq!(offset, (30.0_f32 + 30.0).max(40.0));
                assert_eq!(ctrl1.x, 710.0);
                assert_eq!(ctrl2.x, 560.0);
            }
            LinkPath::Straight { .. } => panic!("expected a loop"),
        }
    }

    #[test]
    fn test_same_row_backward_loops_below_row() {
        let path = router().route(Pos2::new(200.0, 48.0), Pos2::new(100.0, 48.0));
        assert!(path.is_looped());
        let [_, c1, c2, _] = path.control_points();
        assert!(c1.y > 48.0 && c2.y > 48.0);
    }

    #[test]
    fn test_route_all_skips_missing_endpoints_and_allows_cycles() {
        let (a, b, hidden) = (ItemId::new(), ItemId::new(), ItemId::new());
        let mut map = HashMap::new();
        map.insert(a, anchors((0.0, 16.0), (50.0, 16.0)));
        map.insert(b, anchors((80.0, 48.0), (120.0, 48.0)));
        let edges = vec![
            Dependency::new(a, b),
            Dependency::new(b, a),
            Dependency::new(a, a),
            Dependency::new(a, hidden),
        ];
        let links = router().route_all(&edges, &map);
        assert_eq!(links.len(), 3);
        assert!(!links[0].path.is_looped());
        assert!(links[1].path.is_looped());
        assert!(links[2].path.is_looped());
    }

    #[test]
    fn test_hit_test_finds_nearest_link() {
        let router = router();
        let edge = Dependency::new(ItemId::new(), ItemId::new());
        let path = router.route(Pos2::new(100.0, 16.0), Pos2::new(300.0, 80.0));
        let links = vec![RoutedLink {
            edge: edge.id,
            predecessor: edge.predecessor,
            successor: edge.successor,
            path,
        }];
        let on_curve = path.point_at(0.5);
        assert_eq!(router.hit_test(&links, on_curve + Vec2::new(0.0, 6.0)), Some(edge.id));
        assert_eq!(router.hit_test(&links, on_curve + Vec2::new(0.0, 30.0)), None);
    }

    #[test]
    fn test_link_click_requests_delete_on_release() {
        let mut router = router();
        let edge = EdgeId::new();
        let mut events = Vec::new();
        assert!(router.press_link(edge, Pos2::new(200.0, 40.0)));
        assert!(events.is_empty());

        router.track_press(Pos2::new(202.0, 41.0), 5.0);
        router.release_link(Some(Pos2::new(202.0, 41.0)), 5.0, &mut events);
        assert_eq!(events, vec![TimelineEvent::DeleteDependencyRequest(edge)]);
        assert!(!router.is_pressing_link());
    }

    #[test]
    fn test_link_press_dragged_away_is_not_a_click() {
        let mut router = router();
        let edge = EdgeId::new();
        let mut events = Vec::new();
        router.press_link(edge, Pos2::new(200.0, 40.0));
        router.track_press(Pos2::new(260.0, 90.0), 5.0);
        // Coming back over the press point does not turn it into a click.
        router.release_link(Some(Pos2::new(200.0, 40.0)), 5.0, &mut events);
        assert!(events.is_empty());

        router.press_link(edge, Pos2::new(200.0, 40.0));
        assert!(!router.begin_link(ItemId::new(), AnchorSide::End, Pos2::ZERO, Pos2::ZERO, Vec2::ZERO));
        router.release_link(None, 5.0, &mut events);
        assert!(events.is_empty());
        assert!(!router.is_pressing_link());
    }

    #[test]
    fn test_link_from_end_to_start_creates_dependency() {
        let mut router = router();
        let (a, b) = (ItemId::new(), ItemId::new());
        let mut events = Vec::new();
        assert!(router.begin_link(a, AnchorSide::End, Pos2::new(50.0, 16.0), Pos2::new(50.0, 16.0), Vec2::ZERO));
        assert!(!router.begin_link(b, AnchorSide::End, Pos2::ZERO, Pos2::ZERO, Vec2::ZERO));
        router.finish_link(Some((b, AnchorSide::Start)), &mut events);
        assert_eq!(
            events,
            vec![TimelineEvent::CreateDependency {
                predecessor: a,
                successor: b
            }]
        );
        assert!(!router.is_linking());
    }

    #[test]
    fn test_link_from_start_handle_is_reversed() {
        let mut router = router();
        let (a, b) = (ItemId::new(), ItemId::new());
        let mut events = Vec::new();
        router.begin_link(a, AnchorSide::Start, Pos2::ZERO, Pos2::ZERO, Vec2::ZERO);
        router.finish_link(Some((b, AnchorSide::End)), &mut events);
        assert_eq!(
            events,
            vec![TimelineEvent::CreateDependency {
                predecessor: b,
                successor: a
            }]
        );
    }

    #[test]
    fn test_invalid_link_drops_are_discarded() {
        let mut router = router();
        let (a, b) = (ItemId::new(), ItemId::new());
        let mut events = Vec::new();

        router.begin_link(a, AnchorSide::End, Pos2::ZERO, Pos2::ZERO, Vec2::ZERO);
        router.finish_link(Some((a, AnchorSide::Start)), &mut events);

        router.begin_link(a, AnchorSide::End, Pos2::ZERO, Pos2::ZERO, Vec2::ZERO);
        router.finish_link(Some((b, AnchorSide::End)), &mut events);

        router.begin_link(a, AnchorSide::End, Pos2::ZERO, Pos2::ZERO, Vec2::ZERO);
        router.finish_link(None, &mut events);

        assert!(events.is_empty());
        assert!(!router.is_linking());
    }

    #[test]
    fn test_link_cursor_follows_scroll() {
        let mut router = router();
        let anchor = Pos2::new(150.0, 40.0);
        router.begin_link(ItemId::new(), AnchorSide::End, anchor, Pos2::new(150.0, 40.0), Vec2::ZERO);
        router.pointer_move(Pos2::new(200.0, 100.0));
        assert_eq!(router.session().unwrap().cursor(), Pos2::new(200.0, 100.0));
        router.scroll_to(Vec2::new(300.0, 64.0));
        assert_eq!(router.session().unwrap().cursor(), Pos2::new(500.0, 164.0));
        let preview = router.preview_path().unwrap();
        assert_eq!(preview.from(), anchor);
        assert_eq!(preview.to(), Pos2::new(500.0, 164.0));
        router.cancel_link();
        assert!(router.preview_path().is_none());
    }
}
