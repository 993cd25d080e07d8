use chrono::NaiveDate;
use egui::epaint::CubicBezierShape;
use egui::{Align2, Color32, CursorIcon, Painter, Pos2, Rect, Rounding, Sense, Shape, Stroke, Ui, Vec2};

use crate::model::{Dependency, EdgeId, Item, ItemId};
use crate::timeline::{
    AnchorSide, BarHit, BarLayout, BarShape, LinkPath, Period, PointerOutcome, TimelineEngine,
    TimelineEvent, TimelineFrame, Viewport,
};
use crate::ui::theme;

/// egui folds Ctrl+wheel into a multiplicative zoom of `exp(points / 200)`.
const SCROLL_POINTS_PER_ZOOM_LN: f32 = 200.0;

/// Scroll points egui reports for one mouse wheel line.
const POINTS_PER_WHEEL_LINE: f32 = 50.0;

/// Wheel units the zoom controller expects for one wheel line.
const UNITS_PER_WHEEL_LINE: f32 = 100.0;

/// Convert egui's Ctrl+wheel zoom factor back into zoom-controller wheel
/// units, one line notch giving one threshold's worth.
fn wheel_units(zoom_delta: f32) -> f32 {
    zoom_delta.ln() * SCROLL_POINTS_PER_ZOOM_LN * (UNITS_PER_WHEEL_LINE / POINTS_PER_WHEEL_LINE)
}

/// Scroll requests that have to wait for the next frame's scroll area.
#[derive(Debug, Clone)]
pub struct ChartState {
    pending_scroll: Option<Vec2>,
    scroll_to_today: bool,
}

impl Default for ChartState {
    fn default() -> Self {
        Self {
            pending_scroll: None,
            scroll_to_today: true,
        }
    }
}

impl ChartState {
    pub fn request_scroll(&mut self, scroll: Vec2) {
        self.pending_scroll = Some(scroll);
    }

    pub fn pending_scroll(&self) -> Option<Vec2> {
        self.pending_scroll
    }

    /// Centre today once the viewport has been measured.
    pub fn request_scroll_to_today(&mut self) {
        self.scroll_to_today = true;
    }
}

/// Screen placement of the chart body for one frame.
#[derive(Debug, Clone, Copy)]
struct BodyArea {
    /// Screen position of content (0, 0): the top-left of row 0.
    origin: Pos2,
    /// Visible part of the body, below the sticky header.
    clip: Rect,
}

impl BodyArea {
    fn to_content(self, screen: Pos2) -> Pos2 {
        screen - self.origin.to_vec2()
    }

    fn to_screen(self, content: Pos2) -> Pos2 {
        content + self.origin.to_vec2()
    }

    fn rect_to_screen(self, content: Rect) -> Rect {
        content.translate(self.origin.to_vec2())
    }
}

/// Render the Gantt chart and feed pointer input to the engine. Gesture
/// outcomes are appended to `events` for the caller to apply.
pub fn show_gantt_chart(
    ui: &mut Ui,
    engine: &mut TimelineEngine,
    state: &mut ChartState,
    items: &[Item],
    dependencies: &[Dependency],
    today: NaiveDate,
    events: &mut Vec<TimelineEvent>,
) {
    let header_height = engine.config().layout.header_height();

    let mut scroll_area = egui::ScrollArea::both()
        .id_salt("gantt-chart")
        .auto_shrink([false, false])
        .drag_to_scroll(false);
    if let Some(offset) = state.pending_scroll.take() {
        scroll_area = scroll_area.scroll_offset(offset);
    }

    scroll_area.show_viewport(ui, |ui, visible| {
        engine.set_viewport(Viewport::new(
            visible.min.to_vec2(),
            Vec2::new(visible.width(), (visible.height() - header_height).max(0.0)),
        ));

        if state.scroll_to_today && visible.width() > 0.0 {
            state.scroll_to_today = false;
            let scroll_left = engine.scroll_to_date(today);
            state.pending_scroll = Some(Vec2::new(scroll_left, visible.min.y));
            ui.ctx().request_repaint();
        }

        let content = engine.content_size(items.len());
        let origin = ui.max_rect().min;
        let _ = ui.allocate_rect(
            Rect::from_min_size(origin, content + Vec2::new(0.0, header_height)),
            Sense::click_and_drag(),
        );

        let clip = ui.clip_rect();
        let body = BodyArea {
            origin: origin + Vec2::new(0.0, header_height),
            clip: Rect::from_min_max(Pos2::new(clip.left(), clip.top() + header_height), clip.max),
        };

        handle_zoom(ui, engine, state, body);

        let mut frame = engine.layout(items, dependencies, today);
        if handle_pointer(ui, engine, &frame, body, events) {
            frame = engine.layout(items, dependencies, today);
        }

        let hover_pos = ui
            .input(|i| i.pointer.hover_pos())
            .filter(|_| ui.rect_contains_pointer(body.clip))
            .map(|pos| body.to_content(pos));
        let hovered_bar = hover_pos.and_then(|pos| engine.hover(&frame, pos));
        let hovered_link = match (hover_pos, hovered_bar) {
            (Some(pos), None) if !engine.gesture_active() => {
                engine.router().hit_test(&frame.links, pos)
            }
            _ => None,
        };
        update_cursor(ui, engine, hovered_bar, hovered_link);

        let painter = ui.painter().with_clip_rect(body.clip);
        painter.rect_filled(body.clip, 0.0, theme::BG_DARK);
        draw_rows(&painter, engine, &frame, body);
        draw_columns(&painter, &frame, body);
        draw_today_line(&painter, &frame, body, today);
        draw_links(&painter, engine, &frame, body, hovered_link);
        draw_bars(&painter, engine, &frame, items, body, hovered_bar);
        if let Some(path) = &frame.preview_link {
            draw_link_path(&painter, path, body, Stroke::new(1.5, theme::ACCENT));
        }

        draw_header(&ui.painter().with_clip_rect(clip), engine, &frame, origin, clip);

        if !engine.gesture_active() {
            if let Some((item, BarHit::Body)) = hovered_bar {
                show_item_tooltip(ui, items, &frame, item);
            }
        }
    });
}

/// Ctrl+wheel zoom, anchored at the pointer.
fn handle_zoom(ui: &Ui, engine: &mut TimelineEngine, state: &mut ChartState, body: BodyArea) {
    let (zoom, time, pos) = ui.input(|i| (i.zoom_delta(), i.time, i.pointer.hover_pos()));
    if (zoom - 1.0).abs() < f32::EPSILON || !ui.rect_contains_pointer(body.clip) {
        return;
    }
    let Some(pos) = pos else {
        return;
    };
    let delta = wheel_units(zoom);
    if engine.wheel_zoom(delta, time, pos.x - body.clip.left()).is_some() {
        state.request_scroll(engine.viewport().scroll);
        ui.ctx().request_repaint();
    }
}

/// Route the primary button to the engine. Presses only count inside the
/// body; once a gesture is active every move and the release are forwarded
/// wherever the pointer is. Returns true when the frame needs re-laying out.
fn handle_pointer(
    ui: &Ui,
    engine: &mut TimelineEngine,
    frame: &TimelineFrame,
    body: BodyArea,
    events: &mut Vec<TimelineEvent>,
) -> bool {
    let (pressed, released, down, pos) = ui.input(|i| {
        (
            i.pointer.primary_pressed(),
            i.pointer.primary_released(),
            i.pointer.primary_down(),
            i.pointer.latest_pos(),
        )
    });
    let pos = pos.map(|pos| body.to_content(pos));

    let mut changed = false;
    if pressed && ui.rect_contains_pointer(body.clip) {
        if let Some(pos) = pos {
            changed = engine.pointer_down(frame, pos, events) != PointerOutcome::Ignored;
        }
    }
    if engine.gesture_active() {
        if let Some(pos) = pos {
            engine.pointer_move(pos);
        }
        // A release outside the window never arrives; a button that is no
        // longer down ends the gesture all the same.
        if released || !down {
            engine.pointer_up(frame, pos, events);
        }
        changed = true;
    }
    changed
}

fn update_cursor(
    ui: &Ui,
    engine: &TimelineEngine,
    hovered_bar: Option<(ItemId, BarHit)>,
    hovered_link: Option<EdgeId>,
) {
    let icon = if engine.drag().is_dragging() {
        CursorIcon::Grabbing
    } else if engine.router().is_linking() {
        CursorIcon::Crosshair
    } else {
        match hovered_bar {
            Some((_, BarHit::ResizeStart | BarHit::ResizeEnd)) => CursorIcon::ResizeHorizontal,
            Some((_, BarHit::Connector(_))) => CursorIcon::Crosshair,
            Some((_, BarHit::Body)) => CursorIcon::Grab,
            None if hovered_link.is_some() => CursorIcon::PointingHand,
            None => return,
        }
    };
    ui.ctx().set_cursor_icon(icon);
}

// ── Body ────────────────────────────────────────────────────────────────────

fn draw_rows(painter: &Painter, engine: &TimelineEngine, frame: &TimelineFrame, body: BodyArea) {
    let rows = engine.row_layout();
    for row in frame.rows.clone() {
        let top = body.to_screen(Pos2::new(0.0, rows.row_top(row))).y;
        let rect = Rect::from_min_max(
            Pos2::new(body.clip.left(), top),
            Pos2::new(body.clip.right(), top + rows.row_height),
        );
        if row % 2 == 1 {
            painter.rect_filled(rect, 0.0, theme::BG_ROW_ODD);
        }
        painter.line_segment(
            [rect.left_bottom(), rect.right_bottom()],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
    }
}

/// Day lines are only worth drawing once a day is this wide.
const DAY_GRID_MIN_WIDTH: f32 = 8.0;

fn draw_columns(painter: &Painter, frame: &TimelineFrame, body: BodyArea) {
    let bottom = body.origin.y + frame.content_size.y;
    if frame.period != Period::Week && frame.axis.day_width >= DAY_GRID_MIN_WIDTH {
        for day in frame.days.clone() {
            let x = body.origin.x + day as f32 * frame.axis.day_width;
            painter.line_segment(
                [Pos2::new(x, body.clip.top()), Pos2::new(x, bottom.min(body.clip.bottom()))],
                Stroke::new(0.5, theme::GRID_LINE.gamma_multiply(0.5)),
            );
        }
    }
    for cell in &frame.scale.columns {
        let left = body.origin.x + cell.left;
        let rect = Rect::from_min_max(
            Pos2::new(left, body.clip.top()),
            Pos2::new(left + cell.width, bottom.min(body.clip.bottom())),
        );
        if cell.is_weekend {
            painter.rect_filled(rect, 0.0, theme::BG_WEEKEND);
        }
        painter.line_segment(
            [rect.left_top(), rect.left_bottom()],
            Stroke::new(0.5, theme::GRID_LINE),
        );
    }
}

fn draw_today_line(painter: &Painter, frame: &TimelineFrame, body: BodyArea, today: NaiveDate) {
    if !frame.axis.range.contains(today) {
        return;
    }
    let x = body.origin.x + frame.axis.date_to_offset(today) + frame.axis.day_width / 2.0;
    let bottom = (body.origin.y + frame.content_size.y).min(body.clip.bottom());
    painter.line_segment(
        [Pos2::new(x, body.clip.top()), Pos2::new(x, bottom)],
        Stroke::new(1.5, theme::TODAY_LINE),
    );
}

fn draw_links(
    painter: &Painter,
    engine: &TimelineEngine,
    frame: &TimelineFrame,
    body: BodyArea,
    hovered: Option<EdgeId>,
) {
    let width = engine.router().config().stroke_width;
    for link in &frame.links {
        let color = if hovered == Some(link.edge) {
            theme::LINK_HOVER
        } else if link.path.is_looped() {
            theme::LINK_LOOP_COLOR
        } else {
            theme::LINK_COLOR
        };
        draw_link_path(painter, &link.path, body, Stroke::new(width, color));
    }
}

fn draw_link_path(painter: &Painter, path: &LinkPath, body: BodyArea, stroke: Stroke) {
    match *path {
        LinkPath::Straight { from, to } => {
            painter.line_segment([body.to_screen(from), body.to_screen(to)], stroke);
        }
        LinkPath::Curve { .. } => {
            let points = path.control_points().map(|p| body.to_screen(p));
            painter.add(CubicBezierShape::from_points_stroke(
                points,
                false,
                Color32::TRANSPARENT,
                stroke,
            ));
        }
    }

    let tip = body.to_screen(path.to());
    let dir = path.end_direction();
    let back = tip - dir * theme::ARROW_SIZE;
    let side = Vec2::new(-dir.y, dir.x) * (theme::ARROW_SIZE * 0.5);
    painter.add(Shape::convex_polygon(
        vec![tip, back + side, back - side],
        stroke.color,
        Stroke::NONE,
    ));
}

fn draw_bars(
    painter: &Painter,
    engine: &TimelineEngine,
    frame: &TimelineFrame,
    items: &[Item],
    body: BodyArea,
    hovered: Option<(ItemId, BarHit)>,
) {
    let linking = engine.router().session();
    for bar in &frame.bars {
        let Some(item) = items.get(bar.row) else {
            continue;
        };
        let color = theme::team_color(item.attributes.team.as_deref());
        let rect = body.rect_to_screen(bar.rect);

        match bar.geometry.shape {
            BarShape::Bar => draw_bar(painter, rect, color, bar, &item.title),
            BarShape::Diamond { .. } => draw_diamond(painter, rect, color, bar, &item.title),
        }

        let is_hovered = hovered.is_some_and(|(id, _)| id == bar.item);
        if is_hovered && !bar.geometry.is_diamond() && linking.is_none() {
            draw_resize_handles(painter, rect);
        }
        // Connection handles show on hover, and on every other bar while a
        // link is being dragged so targets are visible.
        let show_connectors = match linking {
            Some(session) => session.source != bar.item,
            None => is_hovered,
        };
        if show_connectors {
            draw_connectors(painter, engine, bar, body, linking.map(|s| s.side));
        }
    }
}

fn draw_bar(painter: &Painter, rect: Rect, color: Color32, bar: &BarLayout, title: &str) {
    let rounding = Rounding::same(theme::BAR_ROUNDING);

    painter.rect_filled(rect.translate(Vec2::new(1.0, 2.0)), rounding, Color32::from_black_alpha(35));
    painter.rect_filled(rect, rounding, color);
    let highlight = Rect::from_min_size(rect.min, Vec2::new(rect.width(), (rect.height() * 0.45).max(4.0)));
    painter.rect_filled(
        highlight,
        Rounding {
            nw: theme::BAR_ROUNDING,
            ne: theme::BAR_ROUNDING,
            sw: 0.0,
            se: 0.0,
        },
        Color32::from_white_alpha(25),
    );

    if bar.geometry.previewing {
        painter.rect_stroke(
            rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    if rect.width() > 30.0 {
        let galley = painter.layout_no_wrap(title.to_owned(), theme::font_bar(), theme::TEXT_ON_BAR);
        let text_y = rect.top() + (rect.height() - galley.size().y) / 2.0;
        painter
            .with_clip_rect(rect.intersect(painter.clip_rect()))
            .galley(Pos2::new(rect.left() + 6.0, text_y), galley, Color32::TRANSPARENT);
    } else {
        painter.text(
            Pos2::new(rect.right() + 14.0, rect.center().y),
            Align2::LEFT_CENTER,
            title,
            theme::font_bar(),
            theme::TEXT_SECONDARY,
        );
    }
}

fn draw_diamond(painter: &Painter, rect: Rect, color: Color32, bar: &BarLayout, title: &str) {
    let center = rect.center();
    let size = rect.width() / 2.0;
    let diamond = |offset: Vec2| {
        vec![
            center + offset + Vec2::new(0.0, -size),
            center + offset + Vec2::new(size, 0.0),
            center + offset + Vec2::new(0.0, size),
            center + offset + Vec2::new(-size, 0.0),
        ]
    };

    painter.add(Shape::convex_polygon(
        diamond(Vec2::new(1.0, 1.5)),
        Color32::from_black_alpha(40),
        Stroke::NONE,
    ));
    let outline = if bar.geometry.previewing {
        Stroke::new(2.0, theme::BORDER_ACCENT)
    } else {
        Stroke::NONE
    };
    painter.add(Shape::convex_polygon(diamond(Vec2::ZERO), color, outline));

    painter.text(
        Pos2::new(rect.right() + 14.0, center.y),
        Align2::LEFT_CENTER,
        title,
        theme::font_bar(),
        theme::TEXT_SECONDARY,
    );
}

fn draw_resize_handles(painter: &Painter, rect: Rect) {
    let handle_h = rect.height() * 0.55;
    let handle_y = rect.center().y - handle_h / 2.0;
    for x in [rect.left() - 1.5, rect.right() - 2.5] {
        painter.rect_filled(
            Rect::from_min_size(Pos2::new(x, handle_y), Vec2::new(4.0, handle_h)),
            Rounding::same(2.0),
            theme::HANDLE_COLOR,
        );
    }
}

/// Draw a bar's connection handles. While linking from `source_side`, only
/// the opposing handle is a valid target.
fn draw_connectors(
    painter: &Painter,
    engine: &TimelineEngine,
    bar: &BarLayout,
    body: BodyArea,
    source_side: Option<AnchorSide>,
) {
    let rows = engine.row_layout();
    for side in [AnchorSide::Start, AnchorSide::End] {
        if source_side.is_some_and(|source| source.opposite() != side) {
            continue;
        }
        let center = body.to_screen(rows.connector_center(bar.row, &bar.geometry, side));
        painter.circle(
            center,
            rows.connector_radius,
            theme::BG_DARK,
            Stroke::new(1.5, theme::ACCENT),
        );
    }
}

fn show_item_tooltip(ui: &Ui, items: &[Item], frame: &TimelineFrame, item: ItemId) {
    let Some(bar) = frame.bars.iter().find(|bar| bar.item == item) else {
        return;
    };
    let Some(item) = items.get(bar.row) else {
        return;
    };
    egui::show_tooltip_at_pointer(
        ui.ctx(),
        ui.layer_id(),
        egui::Id::new(("item-tip", item.id)),
        |ui| {
            ui.strong(&item.title);
            ui.label(format!(
                "{} → {}  ({} days)",
                item.start.format("%d/%m/%Y"),
                item.end.format("%d/%m/%Y"),
                item.span().days(),
            ));
            let attrs = &item.attributes;
            for (label, value) in [
                ("Status", &attrs.status),
                ("Priority", &attrs.priority),
                ("Team", &attrs.team),
            ] {
                if let Some(value) = value {
                    ui.label(format!("{label}: {value}"));
                }
            }
        },
    );
}

// ── Header ──────────────────────────────────────────────────────────────────

/// Two-tier header pinned to the top of the visible area.
fn draw_header(painter: &Painter, engine: &TimelineEngine, frame: &TimelineFrame, origin: Pos2, clip: Rect) {
    let layout = &engine.config().layout;
    let group_top = clip.top();
    let column_top = group_top + layout.group_header_height;
    let bottom = column_top + layout.column_header_height;

    painter.rect_filled(
        Rect::from_min_max(clip.left_top(), Pos2::new(clip.right(), bottom)),
        0.0,
        theme::BG_HEADER,
    );

    for cell in &frame.scale.groups {
        let rect = Rect::from_min_size(
            Pos2::new(origin.x + cell.left, group_top),
            Vec2::new(cell.width, layout.group_header_height),
        );
        painter.rect_filled(rect, 0.0, theme::BG_GROUP_HEADER);
        draw_cell(painter, rect, &cell.label, theme::font_header(), theme::TEXT_PRIMARY);
    }

    for cell in &frame.scale.columns {
        let rect = Rect::from_min_size(
            Pos2::new(origin.x + cell.left, column_top),
            Vec2::new(cell.width, layout.column_header_height),
        );
        let color = if cell.is_today {
            painter.rect_filled(rect, 0.0, theme::BG_TODAY_CELL);
            theme::TEXT_PRIMARY
        } else if cell.is_weekend {
            theme::TEXT_DIM
        } else {
            theme::TEXT_SECONDARY
        };
        draw_cell(painter, rect, &cell.label, theme::font_sub(), color);
    }

    painter.line_segment(
        [Pos2::new(clip.left(), bottom), Pos2::new(clip.right(), bottom)],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
}

fn draw_cell(painter: &Painter, rect: Rect, label: &str, font: egui::FontId, color: Color32) {
    painter.line_segment(
        [rect.left_top(), rect.left_bottom()],
        Stroke::new(0.5, theme::BORDER_SUBTLE),
    );
    if label.is_empty() {
        return;
    }
    // Keep the label readable when the cell starts off-screen.
    let clip = rect.intersect(painter.clip_rect());
    let x = rect.left().max(clip.left()) + 4.0;
    painter.with_clip_rect(clip).text(
        Pos2::new(x, rect.center().y),
        Align2::LEFT_CENTER,
        label,
        font,
        color,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_wheel_line_is_one_zoom_step() {
        let one_line = (POINTS_PER_WHEEL_LINE / SCROLL_POINTS_PER_ZOOM_LN).exp();
        assert!((wheel_units(one_line) - 100.0).abs() < 1e-3);
        assert!((wheel_units(1.0 / one_line) + 100.0).abs() < 1e-3);
        assert_eq!(wheel_units(1.0), 0.0);
    }

    #[test]
    fn test_body_area_maps_between_screen_and_content() {
        let body = BodyArea {
            origin: Pos2::new(-340.0, 84.0),
            clip: Rect::from_min_max(Pos2::new(0.0, 128.0), Pos2::new(800.0, 600.0)),
        };
        let screen = Pos2::new(120.0, 200.0);
        let content = body.to_content(screen);
        assert_eq!(content, Pos2::new(460.0, 116.0));
        assert_eq!(body.to_screen(content), screen);
    }
}
