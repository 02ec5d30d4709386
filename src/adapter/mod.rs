//! Medium adapters.
//!
//! The generic editor knows nothing about pixels, seconds or character
//! offsets; every medium-specific rule lives behind [`MediumAdapter`]:
//!
//! - `create_rule` turns a finished gesture (or an implicit creation path)
//!   into a candidate geometry
//! - `commit_rule` clamps or rejects a candidate against the medium domain
//!   before it reaches the store
//! - `transform_space` tells the editor which coordinate space pointer input
//!   is projected into

mod map;
mod raster;
mod space3d;
mod text;
mod timeline;

pub use map::MapAdapter;
pub use raster::{DisplayFilters, RasterAdapter};
pub use space3d::{Space3dAdapter, TransformMode, apply_transform, normalize_angle};
pub use text::TextAdapter;
pub use timeline::TimelineAdapter;

use crate::config::{Thresholds, TimelineSettings, ZoomLimits};
use crate::error::RegionError;
use crate::geometry::{Point, Probe};
use crate::medium::{LoadedMedium, MediumKind, MediumLoadError};
use crate::model::{DrawnFeature, Feature, Geometry, Label, Region, RegionId, ValidationRules};
use crate::tool::ToolMode;
use crate::viewport::Viewport;

/// Coordinate space pointer input is interpreted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSpace {
    /// Image pixels through a zoom/pan transform.
    Pixels,
    /// Seconds on the x axis of a timeline.
    Seconds,
    /// Character offsets; selection comes from the host text layout.
    CharOffsets,
    /// Geographic degrees; drawing happens in the host map layer.
    LonLat,
    /// 3D world units; picking happens in the host renderer.
    World,
}

impl CoordinateSpace {
    /// Whether raw pointer events are projected and fed to the tool machine.
    pub fn takes_pointer_input(&self) -> bool {
        matches!(self, CoordinateSpace::Pixels | CoordinateSpace::Seconds)
    }
}

/// A request to create a region, before medium rules are applied.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateRequest {
    /// Box dragged from `anchor` to `corner` (medium space).
    Box { anchor: Point, corner: Point },
    /// Closed polygon.
    Polygon { vertices: Vec<Point> },
    /// Released text selection, in char offsets (any order).
    TextSelection { start: usize, end: usize },
    /// "Add segment" at the playhead.
    AtPlayhead { time: f64 },
    /// Place a default object (3D unit box).
    Placement,
    /// Feature adopted from the map drawing layer.
    Feature(Feature),
}

impl CreateRequest {
    pub fn name(&self) -> &'static str {
        match self {
            CreateRequest::Box { .. } => "box",
            CreateRequest::Polygon { .. } => "polygon",
            CreateRequest::TextSelection { .. } => "text selection",
            CreateRequest::AtPlayhead { .. } => "segment at playhead",
            CreateRequest::Placement => "placement",
            CreateRequest::Feature(_) => "feature",
        }
    }
}

/// Medium-specific behavior plugged into the generic editor.
pub trait MediumAdapter {
    /// The medium this adapter is currently set up for.
    fn kind(&self) -> MediumKind;

    /// Take ownership of a loaded medium.
    ///
    /// Fails with [`MediumLoadError::KindMismatch`] if the medium does not
    /// belong to this adapter.
    fn attach(&mut self, medium: LoadedMedium) -> Result<(), MediumLoadError>;

    /// Whether a medium is attached.
    fn is_attached(&self) -> bool;

    /// Whether the tool can be activated on this medium.
    fn supports_tool(&self, tool: ToolMode) -> bool;

    fn transform_space(&self) -> CoordinateSpace;

    /// Fresh viewport for the attached medium.
    fn initial_viewport(&self, zoom: &ZoomLimits, timeline: &TimelineSettings) -> Viewport;

    /// Hit-test probe for a pointer position in medium space.
    fn pointer_probe(&self, _medium: Point) -> Option<Probe> {
        None
    }

    /// Tolerance passed to the hit-test, in probe units.
    fn hit_tolerance(&self) -> f32 {
        0.0
    }

    /// Turn a creation request into a candidate geometry.
    fn create_rule(
        &self,
        request: &CreateRequest,
        thresholds: &Thresholds,
    ) -> Result<Geometry, RegionError>;

    /// Clamp or reject `geometry` against the medium domain.
    ///
    /// `existing` is the current region list; `exclude` names the region being
    /// edited so it does not collide with itself.
    fn commit_rule(
        &self,
        geometry: Geometry,
        existing: &[Region],
        exclude: Option<RegionId>,
    ) -> Result<Geometry, RegionError>;

    /// Rebuild the region list from an externally drawn feature set.
    ///
    /// `None` means the medium has no external drawing layer.
    fn reconcile_features(
        &mut self,
        _current: &[Region],
        _drawn: Vec<DrawnFeature>,
        _label: &Label,
        _rules: &ValidationRules,
    ) -> Option<Vec<Region>> {
        None
    }
}

fn unsupported_request(request: &CreateRequest, medium: MediumKind) -> RegionError {
    RegionError::UnsupportedGeometry {
        geometry: request.name(),
        medium: medium.name(),
    }
}

fn unsupported_geometry(geometry: &Geometry, medium: MediumKind) -> RegionError {
    RegionError::UnsupportedGeometry {
        geometry: geometry.kind_name(),
        medium: medium.name(),
    }
}

fn kind_mismatch(expected: MediumKind, medium: &LoadedMedium) -> MediumLoadError {
    MediumLoadError::KindMismatch {
        expected,
        found: medium.kind(),
    }
}
