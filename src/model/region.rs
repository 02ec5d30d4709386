//! Region data model.
//!
//! A [`Region`] is the atomic annotated unit: an id, a label snapshot and a
//! geometry variant anchored to one medium.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{MIN_BOX3D_SCALE, MIN_BOX_SIZE, MIN_POLYGON_VERTICES};
use crate::error::RegionError;
use crate::geometry::Point;
use crate::model::feature::{Feature, FeatureGeometry};
use crate::model::label::Label;

/// Unique identifier for a region.
pub type RegionId = Uuid;

/// Geometry of a region, in the units of its medium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    /// Axis-aligned box, top-left corner plus size.
    Box {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    /// Implicitly closed polygon.
    Polygon { points: Vec<Point> },
    /// Character offsets `[start, end)` into a fixed text.
    Span { start: usize, end: usize },
    /// Time range in seconds.
    Segment { start: f64, end: f64 },
    /// Oriented box; rotation is XYZ Euler angles in radians.
    Box3d {
        position: [f32; 3],
        rotation: [f32; 3],
        scale: [f32; 3],
    },
    /// Vector map feature.
    Feature(Feature),
}

impl Geometry {
    /// Variant name, matching the serialized tag.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Geometry::Box { .. } => "box",
            Geometry::Polygon { .. } => "polygon",
            Geometry::Span { .. } => "span",
            Geometry::Segment { .. } => "segment",
            Geometry::Box3d { .. } => "box3d",
            Geometry::Feature(_) => "feature",
        }
    }

    /// Build a normalized box from two corner points.
    pub fn box_from_corners(a: Point, b: Point) -> Self {
        Geometry::Box {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// A unit box at the origin.
    pub fn unit_box3d() -> Self {
        Geometry::Box3d {
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }

    /// Planar bounding box as (min, max) corners, for 2D variants only.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        match self {
            Geometry::Box {
                x,
                y,
                width,
                height,
            } => Some((Point::new(*x, *y), Point::new(x + width, y + height))),
            Geometry::Polygon { points } if !points.is_empty() => {
                let mut min = Point::new(f32::INFINITY, f32::INFINITY);
                let mut max = Point::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
                for p in points {
                    min.x = min.x.min(p.x);
                    min.y = min.y.min(p.y);
                    max.x = max.x.max(p.x);
                    max.y = max.y.max(p.y);
                }
                Some((min, max))
            }
            _ => None,
        }
    }

    /// Check the geometry against the "accidental click" guards.
    ///
    /// Medium-specific bounds (image size, duration, text length) are the
    /// adapter's business; this only rejects shapes that are degenerate on
    /// their own.
    pub fn validate(&self, rules: &ValidationRules) -> Result<(), RegionError> {
        let finite = |values: &[f32]| values.iter().all(|v| v.is_finite());
        match self {
            Geometry::Box {
                x,
                y,
                width,
                height,
            } => {
                if !finite(&[*x, *y, *width, *height]) {
                    return Err(RegionError::degenerate("box has non-finite coordinates"));
                }
                if *width < rules.min_box_size || *height < rules.min_box_size {
                    return Err(RegionError::degenerate(format!(
                        "box {width:.1}x{height:.1} is below the minimum size {:.1}",
                        rules.min_box_size
                    )));
                }
                Ok(())
            }
            Geometry::Polygon { points } => {
                if points.len() < MIN_POLYGON_VERTICES {
                    return Err(RegionError::degenerate(format!(
                        "polygon has {} vertices, needs at least {MIN_POLYGON_VERTICES}",
                        points.len()
                    )));
                }
                if !points.iter().all(|p| p.x.is_finite() && p.y.is_finite()) {
                    return Err(RegionError::degenerate("polygon has non-finite vertices"));
                }
                Ok(())
            }
            Geometry::Span { start, end } => {
                if start >= end {
                    return Err(RegionError::degenerate(format!(
                        "span [{start}, {end}) is empty"
                    )));
                }
                Ok(())
            }
            Geometry::Segment { start, end } => {
                if !start.is_finite() || !end.is_finite() || start >= end {
                    return Err(RegionError::degenerate(format!(
                        "segment [{start}, {end}) has no duration"
                    )));
                }
                Ok(())
            }
            Geometry::Box3d {
                position,
                rotation,
                scale,
            } => {
                if !finite(position) || !finite(rotation) || !finite(scale) {
                    return Err(RegionError::degenerate("3D box has non-finite values"));
                }
                if scale.iter().any(|s| *s < MIN_BOX3D_SCALE) {
                    return Err(RegionError::degenerate(format!(
                        "3D box scale {scale:?} has a collapsed axis"
                    )));
                }
                Ok(())
            }
            Geometry::Feature(feature) => match feature.geometry.structural_problem() {
                Some(problem) => Err(RegionError::degenerate(problem)),
                None => Ok(()),
            },
        }
    }

    /// Merge a partial geometry into this one.
    pub fn merge(&self, patch: GeometryPatch) -> Result<Geometry, RegionError> {
        let mismatch = |patch: &GeometryPatch| RegionError::GeometryMismatch {
            expected: self.kind_name(),
            found: patch.kind_name(),
        };

        let merged = match (self, patch) {
            (
                Geometry::Box {
                    x,
                    y,
                    width,
                    height,
                },
                GeometryPatch::Box {
                    x: px,
                    y: py,
                    width: pw,
                    height: ph,
                },
            ) => Geometry::Box {
                x: px.unwrap_or(*x),
                y: py.unwrap_or(*y),
                width: pw.unwrap_or(*width),
                height: ph.unwrap_or(*height),
            },
            (Geometry::Polygon { points }, GeometryPatch::Polygon { points: pp }) => {
                Geometry::Polygon {
                    points: pp.unwrap_or_else(|| points.clone()),
                }
            }
            (Geometry::Span { start, end }, GeometryPatch::Span { start: ps, end: pe }) => {
                Geometry::Span {
                    start: ps.unwrap_or(*start),
                    end: pe.unwrap_or(*end),
                }
            }
            (Geometry::Segment { start, end }, GeometryPatch::Segment { start: ps, end: pe }) => {
                Geometry::Segment {
                    start: ps.unwrap_or(*start),
                    end: pe.unwrap_or(*end),
                }
            }
            (
                Geometry::Box3d {
                    position,
                    rotation,
                    scale,
                },
                GeometryPatch::Box3d {
                    position: pp,
                    rotation: pr,
                    scale: ps,
                },
            ) => Geometry::Box3d {
                position: pp.unwrap_or(*position),
                rotation: pr.unwrap_or(*rotation),
                scale: ps.unwrap_or(*scale),
            },
            (
                Geometry::Feature(feature),
                GeometryPatch::Feature {
                    geometry,
                    properties,
                },
            ) => Geometry::Feature(Feature {
                geometry: geometry.unwrap_or_else(|| feature.geometry.clone()),
                properties: properties.unwrap_or_else(|| feature.properties.clone()),
            }),
            (_, patch) => return Err(mismatch(&patch)),
        };
        Ok(merged)
    }
}

/// Partial geometry for [`crate::store::RegionStore::update`].
///
/// `None` fields keep their current value.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryPatch {
    Box {
        x: Option<f32>,
        y: Option<f32>,
        width: Option<f32>,
        height: Option<f32>,
    },
    Polygon {
        points: Option<Vec<Point>>,
    },
    Span {
        start: Option<usize>,
        end: Option<usize>,
    },
    Segment {
        start: Option<f64>,
        end: Option<f64>,
    },
    Box3d {
        position: Option<[f32; 3]>,
        rotation: Option<[f32; 3]>,
        scale: Option<[f32; 3]>,
    },
    Feature {
        geometry: Option<FeatureGeometry>,
        properties: Option<serde_json::Map<String, serde_json::Value>>,
    },
}

impl GeometryPatch {
    /// Variant name of the geometry this patch applies to.
    pub fn kind_name(&self) -> &'static str {
        match self {
            GeometryPatch::Box { .. } => "box",
            GeometryPatch::Polygon { .. } => "polygon",
            GeometryPatch::Span { .. } => "span",
            GeometryPatch::Segment { .. } => "segment",
            GeometryPatch::Box3d { .. } => "box3d",
            GeometryPatch::Feature { .. } => "feature",
        }
    }
}

/// A full geometry converts into a patch that replaces every field.
impl From<Geometry> for GeometryPatch {
    fn from(geometry: Geometry) -> Self {
        match geometry {
            Geometry::Box {
                x,
                y,
                width,
                height,
            } => GeometryPatch::Box {
                x: Some(x),
                y: Some(y),
                width: Some(width),
                height: Some(height),
            },
            Geometry::Polygon { points } => GeometryPatch::Polygon {
                points: Some(points),
            },
            Geometry::Span { start, end } => GeometryPatch::Span {
                start: Some(start),
                end: Some(end),
            },
            Geometry::Segment { start, end } => GeometryPatch::Segment {
                start: Some(start),
                end: Some(end),
            },
            Geometry::Box3d {
                position,
                rotation,
                scale,
            } => GeometryPatch::Box3d {
                position: Some(position),
                rotation: Some(rotation),
                scale: Some(scale),
            },
            Geometry::Feature(feature) => GeometryPatch::Feature {
                geometry: Some(feature.geometry),
                properties: Some(feature.properties),
            },
        }
    }
}

/// Thresholds used by [`Geometry::validate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationRules {
    /// Minimum width and height of a box, in medium units
    pub min_box_size: f32,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_box_size: MIN_BOX_SIZE,
        }
    }
}

/// A labeled region on a medium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Unique identifier, immutable after creation.
    pub id: RegionId,
    /// Label value at creation time.
    pub label: String,
    /// Label color at creation time (`#RRGGBB`).
    pub color: String,
    /// The region geometry.
    pub geometry: Geometry,
}

impl Region {
    /// Create a region stamped with `label`, with a fresh id.
    pub fn new(label: &Label, geometry: Geometry) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.value.clone(),
            color: label.color.clone(),
            geometry,
        }
    }

    /// Replace the generated id (used when adopting ids from outside).
    pub fn with_id(mut self, id: RegionId) -> Self {
        self.id = id;
        self
    }
}

/// Serialize a region list to pretty JSON.
pub fn regions_to_json(regions: &[Region]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(regions)
}

/// Parse a region list from JSON.
pub fn regions_from_json(json: &str) -> Result<Vec<Region>, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label() -> Label {
        Label::new("car", "#FF0000")
    }

    #[test]
    fn test_box_from_corners_normalizes() {
        let a = Geometry::box_from_corners(Point::new(50.0, 80.0), Point::new(10.0, 20.0));
        assert_eq!(
            a,
            Geometry::Box {
                x: 10.0,
                y: 20.0,
                width: 40.0,
                height: 60.0
            }
        );
    }

    #[test]
    fn test_validate_box_threshold() {
        let rules = ValidationRules { min_box_size: 3.0 };
        let thin = Geometry::Box {
            x: 10.0,
            y: 10.0,
            width: 5.0,
            height: 2.0,
        };
        assert!(matches!(
            thin.validate(&rules),
            Err(RegionError::DegenerateGeometry { .. })
        ));

        let exact = Geometry::Box {
            x: 0.0,
            y: 0.0,
            width: 3.0,
            height: 3.0,
        };
        assert!(exact.validate(&rules).is_ok());
    }

    #[test]
    fn test_validate_zero_length() {
        let rules = ValidationRules::default();
        assert!(Geometry::Span { start: 4, end: 4 }.validate(&rules).is_err());
        assert!(
            Geometry::Segment {
                start: 2.0,
                end: 1.0
            }
            .validate(&rules)
            .is_err()
        );
        assert!(
            Geometry::Polygon {
                points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]
            }
            .validate(&rules)
            .is_err()
        );
    }

    #[test]
    fn test_merge_partial_box() {
        let geometry = Geometry::Box {
            x: 1.0,
            y: 2.0,
            width: 30.0,
            height: 40.0,
        };
        let merged = geometry
            .merge(GeometryPatch::Box {
                x: Some(5.0),
                y: None,
                width: None,
                height: Some(10.0),
            })
            .unwrap();
        assert_eq!(
            merged,
            Geometry::Box {
                x: 5.0,
                y: 2.0,
                width: 30.0,
                height: 10.0
            }
        );
    }

    #[test]
    fn test_merge_mismatch() {
        let geometry = Geometry::Span { start: 0, end: 4 };
        let err = geometry
            .merge(GeometryPatch::Segment {
                start: Some(1.0),
                end: None,
            })
            .unwrap_err();
        assert_eq!(
            err,
            RegionError::GeometryMismatch {
                expected: "span",
                found: "segment"
            }
        );
    }

    #[test]
    fn test_serialized_tags() {
        let region = Region::new(&label(), Geometry::unit_box3d());
        let json = serde_json::to_value(&region).unwrap();
        assert_eq!(json["geometry"]["type"], "box3d");
        assert_eq!(json["label"], "car");
        assert_eq!(json["color"], "#FF0000");
    }

    #[test]
    fn test_region_list_roundtrip_preserves_order() {
        let regions = vec![
            Region::new(
                &label(),
                Geometry::Polygon {
                    points: vec![
                        Point::new(0.0, 0.0),
                        Point::new(50.0, 0.0),
                        Point::new(50.0, 50.0),
                    ],
                },
            ),
            Region::new(&label(), Geometry::Span { start: 3, end: 9 }),
            Region::new(
                &label(),
                Geometry::Feature(Feature::new(FeatureGeometry::Point {
                    coordinates: [12.5, 55.7],
                })),
            ),
        ];

        let json = regions_to_json(&regions).unwrap();
        let parsed = regions_from_json(&json).unwrap();
        assert_eq!(parsed, regions);
    }
}
