//! MMAT - Multi-Modal Annotation Toolkit
//!
//! A region annotation engine for images, video and audio timelines, text,
//! maps and point clouds. One generic [`Editor`] holds the region list, the
//! label palette, the tool state machine and the viewport; everything that
//! depends on the medium lives behind a [`MediumAdapter`].
//!
//! The host feeds input events in and receives the complete region list
//! through the `on_change` listener after every committed mutation.

pub mod adapter;
mod color_utils;
pub mod config;
pub mod constants;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod input;
pub mod keybindings;
pub mod medium;
pub mod model;
pub mod session;
pub mod store;
pub mod suggest;
pub mod tool;
pub mod undo;
pub mod viewport;

pub use adapter::MediumAdapter;
pub use config::EditorConfig;
pub use editor::{Editor, EditorInit, EditorStatus};
pub use error::RegionError;
pub use medium::{MediumKind, MediumLoadError, MediumSource};
pub use model::{Geometry, Label, Region, RegionId};
