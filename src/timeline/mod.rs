//! The interactive timeline engine.
//!
//! Everything under this module is independent of egui's painting: it works
//! in content coordinates (pixels from the top-left of the scrollable chart)
//! and leaves drawing to [`crate::ui`].

pub mod bars;
pub mod coords;
pub mod drag;
pub mod engine;
pub mod events;
pub mod links;
pub mod scale;
pub mod virtualize;
pub mod zoom;

pub use bars::{AnchorSide, BarGeometry, BarHit, BarShape, PreviewOverrides, RowLayout};
pub use coords::{day_width, CalendarDay, DateSpan, Period, TimeAxis, TimelineRange};
pub use drag::{DragController, DragSession, GestureKind};
pub use engine::{BarLayout, PointerOutcome, TimelineEngine, TimelineFrame};
pub use events::{TimelineCallbacks, TimelineEvent};
pub use links::{DependencyRouter, LinkPath, RoutedLink};
pub use scale::{PixelWindow, Scale, ScaleCell};
pub use virtualize::Viewport;
pub use zoom::{ZoomAnchor, ZoomChange, ZoomController};
