//! Hit-testing for every geometry variant.

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::model::{FeatureGeometry, Geometry, LonLat, open_ring};

/// A probe location, in the coordinate space of the medium being tested.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Probe {
    /// Image pixels, or timeline space where `x` is seconds.
    Planar(Point),
    /// Character offset into a text.
    Offset(usize),
    /// Seconds on a timeline.
    Time(f64),
    /// World coordinates of a 3D scene.
    Spatial([f32; 3]),
    /// `[lon, lat]` degrees.
    Geographic(LonLat),
}

/// Check whether `probe` hits `geometry`.
///
/// `tolerance` widens boxes, segments and map points/lines (in the probe's
/// units). A probe of the wrong kind for the geometry never hits.
pub fn hit_test(probe: Probe, geometry: &Geometry, tolerance: f32) -> bool {
    match (geometry, probe) {
        (
            Geometry::Box {
                x,
                y,
                width,
                height,
            },
            Probe::Planar(p),
        ) => point_in_box(
            p,
            x - tolerance,
            y - tolerance,
            width + 2.0 * tolerance,
            height + 2.0 * tolerance,
        ),
        (Geometry::Polygon { points }, Probe::Planar(p)) => point_in_polygon(p, points),
        (Geometry::Span { start, end }, Probe::Offset(offset)) => {
            *start <= offset && offset < *end
        }
        (Geometry::Segment { start, end }, Probe::Time(t)) => {
            let tol = f64::from(tolerance);
            *start - tol <= t && t <= *end + tol
        }
        (Geometry::Segment { start, end }, Probe::Planar(p)) => {
            let (t, tol) = (f64::from(p.x), f64::from(tolerance));
            *start - tol <= t && t <= *end + tol
        }
        (
            Geometry::Box3d {
                position,
                rotation,
                scale,
            },
            Probe::Spatial(p),
        ) => box3d_contains(p, *position, *rotation, *scale),
        (Geometry::Feature(feature), Probe::Geographic(p)) => {
            feature_contains(&feature.geometry, p, f64::from(tolerance))
        }
        _ => false,
    }
}

/// Inclusive axis-aligned box test.
pub fn point_in_box(p: Point, x: f32, y: f32, width: f32, height: f32) -> bool {
    p.x >= x && p.x <= x + width && p.y >= y && p.y <= y + height
}

/// Point-in-polygon test using the even-odd ray casting rule.
pub fn point_in_polygon(p: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (vi, vj) = (vertices[i], vertices[j]);
        if ((vi.y > p.y) != (vj.y > p.y))
            && (p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Oriented 3D box containment.
///
/// The probe is rotated into the box frame (XYZ Euler angles) and compared
/// against the half extents.
pub fn box3d_contains(
    point: [f32; 3],
    position: [f32; 3],
    rotation: [f32; 3],
    scale: [f32; 3],
) -> bool {
    let rot = Rotation3::from_euler_angles(rotation[0], rotation[1], rotation[2]);
    let offset = Vector3::from(point) - Vector3::from(position);
    let local = rot.inverse() * offset;
    (0..3).all(|i| local[i].abs() <= scale[i] * 0.5 + 1e-5)
}

/// Distance from `p` to the segment `a`-`b`.
pub fn distance_to_line(p: LonLat, a: LonLat, b: LonLat) -> f64 {
    let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq > 0.0 {
        (((p[0] - a[0]) * dx + (p[1] - a[1]) * dy) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (a[0] + t * dx, a[1] + t * dy);
    ((p[0] - cx).powi(2) + (p[1] - cy).powi(2)).sqrt()
}

fn point_in_ring(p: LonLat, ring: &[LonLat]) -> bool {
    let ring = open_ring(ring);
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (vi, vj) = (ring[i], ring[j]);
        if ((vi[1] > p[1]) != (vj[1] > p[1]))
            && (p[0] < (vj[0] - vi[0]) * (p[1] - vi[1]) / (vj[1] - vi[1]) + vi[0])
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn feature_contains(geometry: &FeatureGeometry, p: LonLat, tolerance: f64) -> bool {
    match geometry {
        FeatureGeometry::Point { coordinates } => {
            distance_to_line(p, *coordinates, *coordinates) <= tolerance
        }
        FeatureGeometry::LineString { coordinates } => coordinates
            .windows(2)
            .any(|w| distance_to_line(p, w[0], w[1]) <= tolerance),
        FeatureGeometry::Polygon { coordinates } => match coordinates.split_first() {
            Some((outer, holes)) => {
                point_in_ring(p, outer) && !holes.iter().any(|hole| point_in_ring(p, hole))
            }
            None => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_4;

    use super::*;
    use crate::model::Feature;

    fn square() -> Geometry {
        Geometry::Polygon {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 100.0),
                Point::new(0.0, 100.0),
            ],
        }
    }

    #[test]
    fn test_box_hit_inclusive_edges() {
        let geometry = Geometry::Box {
            x: 10.0,
            y: 10.0,
            width: 100.0,
            height: 100.0,
        };
        assert!(hit_test(Probe::Planar(Point::new(50.0, 50.0)), &geometry, 0.0));
        assert!(hit_test(Probe::Planar(Point::new(10.0, 10.0)), &geometry, 0.0));
        assert!(!hit_test(Probe::Planar(Point::new(5.0, 50.0)), &geometry, 0.0));
        assert!(hit_test(Probe::Planar(Point::new(5.0, 50.0)), &geometry, 6.0));
    }

    #[test]
    fn test_polygon_hit() {
        assert!(hit_test(Probe::Planar(Point::new(50.0, 50.0)), &square(), 0.0));
        assert!(!hit_test(Probe::Planar(Point::new(150.0, 50.0)), &square(), 0.0));
    }

    #[test]
    fn test_concave_polygon() {
        // U shape: the notch between the arms is outside
        let u = vec![
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 30.0),
            Point::new(20.0, 30.0),
            Point::new(20.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 30.0),
            Point::new(0.0, 30.0),
        ];
        assert!(point_in_polygon(Point::new(5.0, 20.0), &u));
        assert!(!point_in_polygon(Point::new(15.0, 20.0), &u));
    }

    #[test]
    fn test_span_half_open() {
        let span = Geometry::Span { start: 10, end: 20 };
        assert!(hit_test(Probe::Offset(10), &span, 0.0));
        assert!(hit_test(Probe::Offset(19), &span, 0.0));
        assert!(!hit_test(Probe::Offset(20), &span, 0.0));
    }

    #[test]
    fn test_segment_time_and_planar() {
        let segment = Geometry::Segment {
            start: 30.0,
            end: 35.0,
        };
        assert!(hit_test(Probe::Time(32.0), &segment, 0.0));
        assert!(!hit_test(Probe::Time(36.0), &segment, 0.0));
        assert!(hit_test(Probe::Planar(Point::new(35.5, 0.0)), &segment, 1.0));
    }

    #[test]
    fn test_wrong_probe_never_hits() {
        assert!(!hit_test(Probe::Offset(5), &square(), 100.0));
        assert!(!hit_test(Probe::Time(1.0), &Geometry::unit_box3d(), 100.0));
    }

    #[test]
    fn test_box3d_rotated() {
        // A 4x1x1 box rotated 45 degrees around Z
        let position = [0.0, 0.0, 0.0];
        let rotation = [0.0, 0.0, FRAC_PI_4];
        let scale = [4.0, 1.0, 1.0];

        // Along the rotated long axis
        assert!(box3d_contains([1.2, 1.2, 0.0], position, rotation, scale));
        // Along the unrotated long axis, outside the rotated box
        assert!(!box3d_contains([1.9, 0.0, 0.0], position, rotation, scale));
        // Unrotated box accepts it
        assert!(box3d_contains([1.9, 0.0, 0.0], position, [0.0; 3], scale));
    }

    #[test]
    fn test_feature_hits() {
        let line = Geometry::Feature(Feature::new(FeatureGeometry::LineString {
            coordinates: vec![[0.0, 0.0], [10.0, 0.0]],
        }));
        assert!(hit_test(Probe::Geographic([5.0, 0.00005]), &line, 1e-4));
        assert!(!hit_test(Probe::Geographic([5.0, 1.0]), &line, 1e-4));

        let donut = Geometry::Feature(Feature::new(FeatureGeometry::Polygon {
            coordinates: vec![
                vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
                vec![[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0]],
            ],
        }));
        assert!(hit_test(Probe::Geographic([2.0, 2.0]), &donut, 0.0));
        assert!(!hit_test(Probe::Geographic([5.0, 5.0]), &donut, 0.0));
    }
}
