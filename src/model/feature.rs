//! GeoJSON-like vector features for map annotation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A `[longitude, latitude]` pair in degrees.
pub type LonLat = [f64; 2];

/// Vector geometry of a map feature.
///
/// Polygons are a list of rings; the first ring is the outer boundary and
/// the rest are holes. Rings may or may not repeat their first coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FeatureGeometry {
    Point { coordinates: LonLat },
    LineString { coordinates: Vec<LonLat> },
    Polygon { coordinates: Vec<Vec<LonLat>> },
}

impl FeatureGeometry {
    /// GeoJSON type name.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FeatureGeometry::Point { .. } => "Point",
            FeatureGeometry::LineString { .. } => "LineString",
            FeatureGeometry::Polygon { .. } => "Polygon",
        }
    }

    /// Iterate over every coordinate of the geometry.
    pub fn coordinates(&self) -> Box<dyn Iterator<Item = &LonLat> + '_> {
        match self {
            FeatureGeometry::Point { coordinates } => Box::new(std::iter::once(coordinates)),
            FeatureGeometry::LineString { coordinates } => Box::new(coordinates.iter()),
            FeatureGeometry::Polygon { coordinates } => Box::new(coordinates.iter().flatten()),
        }
    }

    /// Check the structural minimums: a line needs two points, a polygon ring
    /// needs three distinct vertices.
    pub fn structural_problem(&self) -> Option<String> {
        match self {
            FeatureGeometry::Point { .. } => None,
            FeatureGeometry::LineString { coordinates } if coordinates.len() < 2 => Some(format!(
                "line has {} coordinate(s), needs at least 2",
                coordinates.len()
            )),
            FeatureGeometry::LineString { .. } => None,
            FeatureGeometry::Polygon { coordinates } => {
                let Some(outer) = coordinates.first() else {
                    return Some("polygon has no rings".to_string());
                };
                let distinct = open_ring(outer).len();
                if distinct < 3 {
                    Some(format!(
                        "polygon ring has {distinct} distinct vertices, needs at least 3"
                    ))
                } else {
                    None
                }
            }
        }
    }
}

/// Strip the closing coordinate of a ring if it repeats the first one.
pub fn open_ring(ring: &[LonLat]) -> &[LonLat] {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() > 1 && first == last => &ring[..ring.len() - 1],
        _ => ring,
    }
}

/// A feature stored as region geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub geometry: FeatureGeometry,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: FeatureGeometry) -> Self {
        Self {
            geometry,
            properties: Map::new(),
        }
    }
}

/// A feature as reported by the external drawing layer.
///
/// `id` carries the region id once the engine has adopted the feature;
/// freshly drawn features have none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawnFeature {
    #[serde(default)]
    pub id: Option<String>,
    pub geometry: FeatureGeometry,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl DrawnFeature {
    pub fn new(geometry: FeatureGeometry) -> Self {
        Self {
            id: None,
            geometry,
            properties: Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Convert into the stored representation, dropping the layer id.
    pub fn into_feature(self) -> Feature {
        Feature {
            geometry: self.geometry,
            properties: self.properties,
        }
    }
}
