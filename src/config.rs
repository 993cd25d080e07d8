//! Timeline configuration.
//!
//! Every tunable of the timeline engine lives in [`TimelineConfig`]. The
//! configuration is read from `timeline.json` in the OS config directory.
//! All sections carry `#[serde(default)]` so that a partial JSON file is
//! valid: missing keys fall back to the built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::timeline::Period;

const CONFIG_FILE: &str = "timeline.json";

// ─── Top-level definition ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub zoom: ZoomConfig,
    pub layout: LayoutConfig,
    pub drag: DragConfig,
    pub links: LinkConfig,
    pub virtualization: VirtualizationConfig,
    pub labels: LabelConfig,
}

// ─── Zoom ───────────────────────────────────────────────────────────────────

/// Pixel width range of one header cell at a given granularity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellWidth {
    pub min: f32,
    pub max: f32,
}

impl CellWidth {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.max >= self.min
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min_level: i32,
    pub max_level: i32,
    pub default_level: i32,
    /// Accumulated wheel units needed for one zoom step.
    pub wheel_threshold: f32,
    /// Seconds without wheel input after which the accumulator starts over.
    pub wheel_idle_reset: f64,
    pub week: CellWidth,
    pub month: CellWidth,
    pub quarter: CellWidth,
    pub year: CellWidth,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_level: 1,
            max_level: 9,
            default_level: 5,
            wheel_threshold: 100.0,
            wheel_idle_reset: 0.25,
            week: CellWidth::new(6.0, 14.0),
            month: CellWidth::new(28.0, 84.0),
            quarter: CellWidth::new(60.0, 180.0),
            year: CellWidth::new(91.0, 273.0),
        }
    }
}

impl ZoomConfig {
    pub fn cell_width(&self, period: Period) -> CellWidth {
        match period {
            Period::Week => self.week,
            Period::Month => self.month,
            Period::Quarter => self.quarter,
            Period::Year => self.year,
        }
    }

    /// Reject ranges and widths that would produce a zero or undefined day
    /// width.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.min_level > self.max_level
            || self.default_level < self.min_level
            || self.default_level > self.max_level
        {
            return Err(ConfigError::InvalidZoomRange {
                min: self.min_level,
                max: self.max_level,
                default: self.default_level,
            });
        }
        for period in Period::ALL {
            let width = self.cell_width(period);
            if !width.is_valid() {
                return Err(ConfigError::InvalidCellWidth {
                    period,
                    min: width.min,
                    max: width.max,
                });
            }
        }
        positive("zoom.wheel_threshold", self.wheel_threshold)
    }
}

// ─── Layout ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub row_height: f32,
    /// Vertical inset so bars don't touch row edges.
    pub bar_inset: f32,
    pub group_header_height: f32,
    pub column_header_height: f32,
    pub min_bar_width: f32,
    pub handle_width: f32,
    pub connector_radius: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_height: 32.0,
            bar_inset: 6.0,
            group_header_height: 22.0,
            column_header_height: 22.0,
            min_bar_width: 6.0,
            handle_width: 7.0,
            connector_radius: 5.0,
        }
    }
}

impl LayoutConfig {
    pub fn header_height(&self) -> f32 {
        self.group_header_height + self.column_header_height
    }
}

// ─── Drag ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Pointer travel (px) before a press becomes a drag instead of a click.
    pub click_threshold: f32,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            click_threshold: 5.0,
        }
    }
}

// ─── Links ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub same_row_tolerance: f32,
    pub min_offset: f32,
    pub loop_min_offset: f32,
    pub loop_padding: f32,
    pub hit_width: f32,
    pub stroke_width: f32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            same_row_tolerance: 5.0,
            min_offset: 20.0,
            loop_min_offset: 40.0,
            loop_padding: 30.0,
            hit_width: 16.0,
            stroke_width: 1.5,
        }
    }
}

// ─── Virtualization ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualizationConfig {
    pub row_buffer: f32,
    pub column_buffer: f32,
    /// Extra pixels on each side of the viewport for header cells.
    pub scale_buffer: f32,
}

impl Default for VirtualizationConfig {
    fn default() -> Self {
        Self {
            row_buffer: 300.0,
            column_buffer: 300.0,
            scale_buffer: 500.0,
        }
    }
}

// ─── Labels ─────────────────────────────────────────────────────────────────

/// Cell widths below which header labels drop secondary information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub day_weekday_min_width: f32,
    pub week_date_min_width: f32,
    pub month_full_name_min_width: f32,
    pub group_year_min_width: f32,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            day_weekday_min_width: 24.0,
            week_date_min_width: 64.0,
            month_full_name_min_width: 72.0,
            group_year_min_width: 56.0,
        }
    }
}

// ─── Validation & loading ───────────────────────────────────────────────────

impl TimelineConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.zoom.validate()?;
        positive("layout.row_height", self.layout.row_height)?;
        positive("layout.min_bar_width", self.layout.min_bar_width)?;
        positive("drag.click_threshold", self.drag.click_threshold)?;
        positive("links.hit_width", self.links.hit_width)?;

        let links = &self.links;
        if !(links.min_offset >= 0.0
            && links.loop_min_offset > links.min_offset
            && links.loop_padding > 0.0)
        {
            return Err(ConfigError::InvalidLinkOffsets {
                min_offset: links.min_offset,
                loop_min_offset: links.loop_min_offset,
                loop_padding: links.loop_padding,
            });
        }
        Ok(())
    }

    /// Default location of the configuration file.
    pub fn config_path() -> PathBuf {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "RoadmapTimeline") {
            proj_dirs.config_dir().join(CONFIG_FILE)
        } else {
            PathBuf::from(".").join(CONFIG_FILE)
        }
    }

    /// Read and validate a configuration file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: TimelineConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the user configuration, falling back to defaults when the file is
    /// missing or unusable.
    pub fn load() -> Self {
        let path = Self::config_path();
        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded timeline config");
                config
            }
            Err(crate::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Self::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring timeline config");
                Self::default()
            }
        }
    }
}

fn positive(name: &'static str, value: f32) -> std::result::Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}
