//! Viewport culling for rows and time columns.
//!
//! Everything here is index arithmetic; nothing iterates over the rows.

use std::ops::Range;

use egui::Vec2;

use super::scale::PixelWindow;

/// Scroll position and visible size of the chart body, in content pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub scroll: Vec2,
    pub size: Vec2,
}

impl Viewport {
    pub fn new(scroll: Vec2, size: Vec2) -> Self {
        Self { scroll, size }
    }

    /// Rows intersecting the viewport plus `buffer` pixels above and below.
    pub fn visible_rows(&self, row_height: f32, row_count: usize, buffer: f32) -> Range<usize> {
        visible_range(self.scroll.y, self.size.y, row_height, row_count, buffer)
    }

    /// Fixed-width time columns intersecting the viewport plus `buffer`
    /// pixels left and right.
    pub fn visible_columns(&self, cell_width: f32, column_count: usize, buffer: f32) -> Range<usize> {
        visible_range(self.scroll.x, self.size.x, cell_width, column_count, buffer)
    }

    /// The horizontal span currently on screen.
    pub fn pixel_window(&self) -> PixelWindow {
        PixelWindow::new(self.scroll.x, self.scroll.x + self.size.x)
    }
}

/// Index range `[floor((scroll - buffer) / size), ceil((scroll + extent +
/// buffer) / size))` clamped to `[0, count)`.
///
/// A non-positive or non-finite item size yields an empty range.
pub fn visible_range(scroll: f32, extent: f32, item_size: f32, count: usize, buffer: f32) -> Range<usize> {
    if count == 0 || !item_size.is_finite() || item_size <= 0.0 || !scroll.is_finite() {
        return 0..0;
    }
    let buffer = buffer.max(0.0);
    let extent = extent.max(0.0);
    let first = ((scroll - buffer) / item_size).floor().max(0.0);
    let last = ((scroll + extent + buffer) / item_size).ceil().max(0.0);
    // Float-to-usize casts saturate, so huge offsets clamp instead of wrapping.
    let start = (first as usize).min(count);
    let end = (last as usize).min(count);
    start..end.max(start)
}

/// Spacer heights standing in for the rows above and below `visible`.
pub fn spacer_padding(visible: &Range<usize>, count: usize, item_size: f32) -> (f32, f32) {
    let before = visible.start.min(count);
    let after = count.saturating_sub(visible.end);
    (before as f32 * item_size, after as f32 * item_size)
}
