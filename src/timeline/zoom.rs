//! Discrete zoom levels, wheel accumulation and cursor-anchored zoom.

use super::coords::{day_width, Period, TimeAxis, TimelineRange};
use crate::config::ZoomConfig;
use crate::error::ConfigError;

/// Where the pointer sat when a zoom was requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomAnchor {
    /// Pointer x relative to the left edge of the viewport.
    pub cursor_x: f32,
    /// Horizontal scroll offset before the zoom.
    pub scroll_left: f32,
}

/// Outcome of a zoom that changed the day width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomChange {
    pub old_day_width: f32,
    pub new_day_width: f32,
    /// Scroll offset that keeps the anchored point under the cursor.
    pub scroll_left: Option<f32>,
}

/// Scroll offset that keeps the time under `cursor_x` fixed when the day
/// width changes from `old_width` to `new_width`.
pub fn anchored_scroll(cursor_x: f32, scroll_left: f32, old_width: f32, new_width: f32) -> f32 {
    let days = (scroll_left + cursor_x) / old_width;
    (days * new_width - cursor_x).max(0.0)
}

#[derive(Debug, Clone)]
pub struct ZoomController {
    config: ZoomConfig,
    level: i32,
    period: Period,
    accumulator: f32,
    last_wheel: Option<f64>,
}

impl ZoomController {
    /// Build a controller at the configured default level.
    ///
    /// Fails if the configuration could yield a zero or undefined day width.
    pub fn new(config: ZoomConfig, period: Period) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            level: config.default_level,
            config,
            period,
            accumulator: 0.0,
            last_wheel: None,
        })
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn min_level(&self) -> i32 {
        self.config.min_level
    }

    pub fn max_level(&self) -> i32 {
        self.config.max_level
    }

    pub fn can_zoom_in(&self) -> bool {
        self.level < self.config.max_level
    }

    pub fn can_zoom_out(&self) -> bool {
        self.level > self.config.min_level
    }

    pub fn day_width(&self) -> f32 {
        day_width(self.period, self.level, &self.config)
    }

    pub fn axis(&self, range: TimelineRange) -> TimeAxis {
        TimeAxis::new(range, self.day_width())
    }

    pub fn zoom_in(&mut self, anchor: Option<ZoomAnchor>) -> Option<ZoomChange> {
        self.zoom_by(1, anchor)
    }

    pub fn zoom_out(&mut self, anchor: Option<ZoomAnchor>) -> Option<ZoomChange> {
        self.zoom_by(-1, anchor)
    }

    /// Move `steps` levels, clamped to the range. Returns `None` when the
    /// level didn't change.
    pub fn zoom_by(&mut self, steps: i32, anchor: Option<ZoomAnchor>) -> Option<ZoomChange> {
        let level = self
            .level
            .saturating_add(steps)
            .clamp(self.config.min_level, self.config.max_level);
        if level == self.level {
            return None;
        }
        let old_day_width = self.day_width();
        self.level = level;
        tracing::debug!(level, period = ?self.period, "zoom level changed");
        Some(self.change_from(old_day_width, anchor))
    }

    /// Switch granularity, keeping the anchored point in place.
    pub fn set_period(&mut self, period: Period, anchor: Option<ZoomAnchor>) -> Option<ZoomChange> {
        if period == self.period {
            return None;
        }
        let old_day_width = self.day_width();
        self.period = period;
        Some(self.change_from(old_day_width, anchor))
    }

    /// Feed a wheel delta (positive zooms in) observed at `time` seconds.
    ///
    /// Deltas accumulate until they cross the threshold; whole steps are
    /// consumed and the remainder is carried into the next event. A pause
    /// longer than the idle reset starts a fresh accumulation.
    pub fn accumulate_wheel(&mut self, delta: f32, time: f64) -> i32 {
        if !delta.is_finite() {
            return 0;
        }
        if let Some(last) = self.last_wheel {
            if time - last > self.config.wheel_idle_reset {
                self.accumulator = 0.0;
            }
        }
        self.last_wheel = Some(time);
        self.accumulator += delta;
        let steps = (self.accumulator / self.config.wheel_threshold).trunc();
        self.accumulator -= steps * self.config.wheel_threshold;
        steps as i32
    }

    pub fn wheel(&mut self, delta: f32, time: f64, anchor: Option<ZoomAnchor>) -> Option<ZoomChange> {
        match self.accumulate_wheel(delta, time) {
            0 => None,
            steps => self.zoom_by(steps, anchor),
        }
    }

    fn change_from(&self, old_day_width: f32, anchor: Option<ZoomAnchor>) -> ZoomChange {
        let new_day_width = self.day_width();
        ZoomChange {
            old_day_width,
            new_day_width,
            scroll_left: anchor.map(|a| {
                anchored_scroll(a.cursor_x, a.scroll_left, old_day_width, new_day_width)
            }),
        }
    }
}
