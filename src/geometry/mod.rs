//! Geometry kernel: coordinate transforms, hit-testing and handle math.
//!
//! Everything in here is pure. Screen coordinates are pixels relative to the
//! top-left corner of the editor surface; medium coordinates are whatever the
//! medium measures in (image pixels, seconds, ...).

mod handles;
mod hit;

pub use handles::{Corner, Edge, Handle, apply_handle_drag, handle_at};
pub use hit::{
    Probe, box3d_contains, distance_to_line, hit_test, point_in_box, point_in_polygon,
};

use serde::{Deserialize, Serialize};

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f32 {
        distance(*self, *other)
    }
}

impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Unsigned area of a simple polygon (shoelace formula).
pub fn polygon_area(points: &[Point]) -> f32 {
    let twice: f32 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    twice.abs() / 2.0
}

/// Pan/zoom transform of a spatial medium.
///
/// `screen = medium * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Transform {
    /// Create a new transform with the given zoom and pan.
    pub fn new(zoom: f32, pan_x: f32, pan_y: f32) -> Self {
        Self { zoom, pan_x, pan_y }
    }

    /// Create an identity transform (zoom=1, no pan).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Calculate zoom-to-cursor transformation.
    ///
    /// Keeps the medium point under the cursor fixed while zooming.
    pub fn zoom_to_cursor(&self, new_zoom: f32, cursor: Point) -> Transform {
        // Medium-space point under cursor (before zoom)
        let anchor = self.screen_to_medium(cursor);

        Transform {
            zoom: new_zoom,
            pan_x: cursor.x - anchor.x * new_zoom,
            pan_y: cursor.y - anchor.y * new_zoom,
        }
    }

    /// Apply a pan delta to the transform.
    pub fn pan_by(&self, dx: f32, dy: f32) -> Transform {
        Transform {
            zoom: self.zoom,
            pan_x: self.pan_x + dx,
            pan_y: self.pan_y + dy,
        }
    }

    pub fn screen_to_medium(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan_x) / self.zoom,
            (screen.y - self.pan_y) / self.zoom,
        )
    }

    pub fn medium_to_screen(&self, medium: Point) -> Point {
        Point::new(
            medium.x * self.zoom + self.pan_x,
            medium.y * self.zoom + self.pan_y,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Horizontal time axis shared by the playhead and segment bars.
///
/// `pixel = time * pixels_per_second - scroll`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    pub pixels_per_second: f32,
    /// Horizontal scroll offset in pixels.
    pub scroll: f32,
}

impl TimeScale {
    pub fn new(pixels_per_second: f32) -> Self {
        Self {
            pixels_per_second,
            scroll: 0.0,
        }
    }

    pub fn time_to_pixel(&self, time: f64) -> f32 {
        (time * f64::from(self.pixels_per_second)) as f32 - self.scroll
    }

    pub fn pixel_to_time(&self, pixel: f32) -> f64 {
        f64::from(pixel + self.scroll) / f64::from(self.pixels_per_second)
    }
}

/// Screen ↔ medium mapping of one viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Zoomable, pannable 2D surface.
    Spatial(Transform),
    /// Time on the x axis; y passes through (track lanes are external).
    Temporal(TimeScale),
    /// The projection is owned by something else (text layout, map, 3D camera).
    Identity,
}

/// Map a screen point into medium space.
///
/// For temporal projections the returned `x` is seconds.
pub fn to_medium_space(screen: Point, projection: &Projection) -> Point {
    match projection {
        Projection::Spatial(t) => t.screen_to_medium(screen),
        Projection::Temporal(scale) => Point::new(scale.pixel_to_time(screen.x) as f32, screen.y),
        Projection::Identity => screen,
    }
}

/// Map a medium point back to screen space.
pub fn to_screen_space(medium: Point, projection: &Projection) -> Point {
    match projection {
        Projection::Spatial(t) => t.medium_to_screen(medium),
        Projection::Temporal(scale) => {
            Point::new(scale.time_to_pixel(f64::from(medium.x)), medium.y)
        }
        Projection::Identity => medium,
    }
}

/// Scale factor from screen pixels to medium units along x.
///
/// Used to turn pixel thresholds (closing distance, handle radius) into
/// medium units at the current zoom.
pub fn pixels_to_medium(pixels: f32, projection: &Projection) -> f32 {
    match projection {
        Projection::Spatial(t) => pixels / t.zoom.max(f32::EPSILON),
        Projection::Temporal(scale) => pixels / scale.pixels_per_second.max(f32::EPSILON),
        Projection::Identity => pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_point_distance() {
        assert!(approx_eq(
            distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)),
            5.0
        ));
    }

    #[test]
    fn test_polygon_area() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(approx_eq(polygon_area(&square), 100.0));
        let collinear = [
            Point::new(0.0, 0.0),
            Point::new(5.0, 5.0),
            Point::new(10.0, 10.0),
        ];
        assert!(approx_eq(polygon_area(&collinear), 0.0));
    }

    #[test]
    fn test_spatial_roundtrip() {
        let projection = Projection::Spatial(Transform::new(2.5, 40.0, -12.0));
        let medium = Point::new(123.0, 45.5);
        let screen = to_screen_space(medium, &projection);
        let back = to_medium_space(screen, &projection);
        assert!(approx_eq(back.x, medium.x));
        assert!(approx_eq(back.y, medium.y));
    }

    #[test]
    fn test_zoom_to_cursor_preserves_cursor_point() {
        let t = Transform::new(1.0, 50.0, 30.0);
        let cursor = Point::new(150.0, 120.0);
        let before = t.screen_to_medium(cursor);

        let zoomed = t.zoom_to_cursor(2.0, cursor);
        let after = zoomed.screen_to_medium(cursor);

        assert_eq!(zoomed.zoom, 2.0);
        assert!(approx_eq(before.x, after.x));
        assert!(approx_eq(before.y, after.y));
    }

    #[test]
    fn test_pan_preserves_zoom() {
        let panned = Transform::new(2.5, 0.0, 0.0).pan_by(100.0, 200.0);
        assert_eq!(panned.zoom, 2.5);
        assert_eq!(panned.pan_x, 100.0);
        assert_eq!(panned.pan_y, 200.0);
    }

    #[test]
    fn test_time_scale() {
        let mut scale = TimeScale::new(100.0);
        assert!(approx_eq(scale.time_to_pixel(2.5), 250.0));
        scale.scroll = 50.0;
        assert!(approx_eq(scale.time_to_pixel(2.5), 200.0));
        assert!((scale.pixel_to_time(200.0) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_pixels_to_medium() {
        let projection = Projection::Spatial(Transform::new(2.0, 0.0, 0.0));
        assert!(approx_eq(pixels_to_medium(10.0, &projection), 5.0));
        assert!(approx_eq(pixels_to_medium(10.0, &Projection::Identity), 10.0));
    }

    #[test]
    fn test_point_serializes_as_pair() {
        let json = serde_json::to_string(&Point::new(1.5, 2.0)).unwrap();
        assert_eq!(json, "[1.5,2.0]");
        let parsed: Point = serde_json::from_str("[3.0,4.0]").unwrap();
        assert_eq!(parsed, Point::new(3.0, 4.0));
    }
}
