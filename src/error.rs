use crate::timeline::Period;

/// A timeline configuration that cannot produce usable geometry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid zoom range {min}..={max} (default {default})")]
    InvalidZoomRange { min: i32, max: i32, default: i32 },

    #[error("invalid cell width for {period:?}: min {min}, max {max}")]
    InvalidCellWidth { period: Period, min: f32, max: f32 },

    #[error("invalid link offsets: min {min_offset}, loop min {loop_min_offset}, loop padding {loop_padding}")]
    InvalidLinkOffsets {
        min_offset: f32,
        loop_min_offset: f32,
        loop_padding: f32,
    },

    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f32 },
}

/// Crate-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
