//! Data models for the annotation engine.

mod feature;
mod label;
mod region;

pub use feature::{DrawnFeature, Feature, FeatureGeometry, LonLat, open_ring};
pub use label::{Label, LabelPalette};
pub use region::{
    Geometry, GeometryPatch, Region, RegionId, ValidationRules, regions_from_json,
    regions_to_json,
};
