//! Interactive Gantt timeline for product roadmaps.
//!
//! [`timeline`] holds the rendering-independent engine: date/pixel mapping,
//! header scales, virtualization, bar geometry, drag and link gestures and
//! zoom. [`ui`] paints it with egui and [`app`] wires it to a [`model::Roadmap`].

pub mod app;
pub mod config;
pub mod error;
pub mod model;
pub mod timeline;
pub mod ui;

pub use error::{Error, Result};
