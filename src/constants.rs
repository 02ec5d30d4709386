//! Global constants for the annotation engine.
//!
//! Values here are the defaults; most of them can be overridden through
//! [`crate::config::EditorConfig`].

/// Minimum width/height (medium units) for a committed box region.
pub const MIN_BOX_SIZE: f32 = 5.0;

/// Minimum number of vertices required for a valid polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Minimum area (square pixels) of a polygon after clamping to the image.
pub const MIN_POLYGON_AREA: f32 = 1.0;

/// Screen-space distance (pixels) within which a click closes an open polygon.
pub const POLYGON_CLOSE_DISTANCE: f32 = 10.0;

/// Screen-space distance (pixels) the pointer must travel before a press on a
/// selected region becomes a drag.
pub const MIN_DRAG_DISTANCE: f32 = 3.0;

/// Screen-space radius (pixels) for grabbing resize/vertex handles.
pub const HANDLE_HIT_RADIUS: f32 = 8.0;

/// Length in seconds of a segment created at the playhead.
pub const DEFAULT_SEGMENT_LENGTH: f64 = 5.0;

/// Timeline scale at zoom 1.
pub const DEFAULT_PIXELS_PER_SECOND: f32 = 100.0;

/// Zoom limits and step for spatial viewports.
pub mod zoom {
    /// Smallest allowed zoom factor.
    pub const MIN: f32 = 0.1;
    /// Largest allowed zoom factor.
    pub const MAX: f32 = 20.0;
    /// Multiplicative step for zoom in/out.
    pub const FACTOR: f32 = 1.2;
}

/// Number of undo steps kept per editor.
pub const UNDO_HISTORY_SIZE: usize = 100;

/// Seconds after which a pending suggestion request is considered stale.
pub const SUGGESTION_TIMEOUT_SECS: u64 = 30;

/// Label value used when the palette is empty.
pub const FALLBACK_LABEL: &str = "Object";

/// Neutral color stamped with the fallback label.
pub const FALLBACK_COLOR: &str = "#9E9E9E";

/// Number of palette entries reachable through the digit shortcuts (1-9).
pub const MAX_LABEL_HOTKEYS: usize = 9;

/// Smallest scale component a 3D box may have.
pub const MIN_BOX3D_SCALE: f32 = 1e-3;

/// Tolerance (degrees) used when hit-testing map points and lines.
pub const FEATURE_HIT_TOLERANCE: f64 = 1e-4;
