//! Raster image adapter: boxes and polygons in pixel space.

use image::{Rgba, RgbaImage};

use crate::adapter::{
    CoordinateSpace, CreateRequest, MediumAdapter, kind_mismatch, unsupported_geometry,
    unsupported_request,
};
use crate::config::{Thresholds, TimelineSettings, ZoomLimits};
use crate::constants::{MIN_POLYGON_AREA, MIN_POLYGON_VERTICES};
use crate::error::RegionError;
use crate::geometry::{Point, Probe, polygon_area};
use crate::medium::{LoadedMedium, MediumKind, MediumLoadError};
use crate::model::{Geometry, Region, RegionId};
use crate::tool::ToolMode;
use crate::viewport::{SpatialView, Viewport};

/// Display adjustments applied when rendering the image.
///
/// These only change what the annotator sees; region geometry is never
/// affected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayFilters {
    /// Additive offset in [-1, 1]
    pub brightness: f32,
    /// Multiplier around mid-gray, 1.0 is neutral
    pub contrast: f32,
}

impl Default for DisplayFilters {
    fn default() -> Self {
        Self {
            brightness: 0.0,
            contrast: 1.0,
        }
    }
}

impl DisplayFilters {
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }

    /// Adjusted copy of `image`. Alpha is preserved.
    pub fn apply(&self, image: &RgbaImage) -> RgbaImage {
        let mut out = image.clone();
        if self.is_neutral() {
            return out;
        }
        let adjust = |c: u8| {
            let v = f32::from(c) / 255.0;
            let v = (v - 0.5) * self.contrast + 0.5 + self.brightness;
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        };
        for pixel in out.pixels_mut() {
            let Rgba([r, g, b, a]) = *pixel;
            *pixel = Rgba([adjust(r), adjust(g), adjust(b), a]);
        }
        out
    }
}

/// Adapter for still images.
#[derive(Debug, Clone, Default)]
pub struct RasterAdapter {
    image: Option<RgbaImage>,
    filters: DisplayFilters,
}

impl RasterAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    /// Image size in pixels, `(0, 0)` when nothing is attached.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.as_ref().map_or((0, 0), RgbaImage::dimensions)
    }

    pub fn filters(&self) -> DisplayFilters {
        self.filters
    }

    pub fn set_brightness(&mut self, brightness: f32) {
        self.filters.brightness = brightness.clamp(-1.0, 1.0);
    }

    pub fn set_contrast(&mut self, contrast: f32) {
        self.filters.contrast = contrast.clamp(0.0, 4.0);
    }

    /// The attached image with the display filters applied.
    pub fn display_image(&self) -> Option<RgbaImage> {
        self.image.as_ref().map(|image| self.filters.apply(image))
    }

    fn clamp_point(&self, p: Point) -> Point {
        let (w, h) = self.dimensions();
        Point::new(p.x.clamp(0.0, w as f32), p.y.clamp(0.0, h as f32))
    }
}

impl MediumAdapter for RasterAdapter {
    fn kind(&self) -> MediumKind {
        MediumKind::Image
    }

    fn attach(&mut self, medium: LoadedMedium) -> Result<(), MediumLoadError> {
        match medium {
            LoadedMedium::Image(image) => {
                log::info!("Raster: attached {}x{} image", image.width(), image.height());
                self.image = Some(image);
                Ok(())
            }
            other => Err(kind_mismatch(MediumKind::Image, &other)),
        }
    }

    fn is_attached(&self) -> bool {
        self.image.is_some()
    }

    fn supports_tool(&self, _tool: ToolMode) -> bool {
        true
    }

    fn transform_space(&self) -> CoordinateSpace {
        CoordinateSpace::Pixels
    }

    fn initial_viewport(&self, zoom: &ZoomLimits, _timeline: &TimelineSettings) -> Viewport {
        Viewport::Spatial(SpatialView::new(*zoom))
    }

    fn pointer_probe(&self, medium: Point) -> Option<Probe> {
        Some(Probe::Planar(medium))
    }

    fn create_rule(
        &self,
        request: &CreateRequest,
        _thresholds: &Thresholds,
    ) -> Result<Geometry, RegionError> {
        match request {
            CreateRequest::Box { anchor, corner } => {
                Ok(Geometry::box_from_corners(*anchor, *corner))
            }
            CreateRequest::Polygon { vertices } => Ok(Geometry::Polygon {
                points: vertices.clone(),
            }),
            other => Err(unsupported_request(other, self.kind())),
        }
    }

    fn commit_rule(
        &self,
        geometry: Geometry,
        _existing: &[Region],
        _exclude: Option<RegionId>,
    ) -> Result<Geometry, RegionError> {
        match geometry {
            Geometry::Box {
                x,
                y,
                width,
                height,
            } => {
                let min = self.clamp_point(Point::new(x, y));
                let max = self.clamp_point(Point::new(x + width, y + height));
                if min.x != x || min.y != y || max.x != x + width || max.y != y + height {
                    log::debug!("Raster: box clamped to image bounds");
                }
                Ok(Geometry::box_from_corners(min, max))
            }
            Geometry::Polygon { points } => {
                let points: Vec<Point> =
                    points.into_iter().map(|p| self.clamp_point(p)).collect();
                let mut distinct: Vec<Point> = Vec::with_capacity(points.len());
                for p in &points {
                    if !distinct.contains(p) {
                        distinct.push(*p);
                    }
                }
                if distinct.len() < MIN_POLYGON_VERTICES {
                    return Err(RegionError::degenerate(format!(
                        "polygon has {} distinct vertices inside the image",
                        distinct.len()
                    )));
                }
                let area = polygon_area(&points);
                if area < MIN_POLYGON_AREA {
                    return Err(RegionError::degenerate(format!(
                        "polygon covers {area:.1} px inside the image"
                    )));
                }
                Ok(Geometry::Polygon { points })
            }
            other => Err(unsupported_geometry(&other, self.kind())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attached(width: u32, height: u32) -> RasterAdapter {
        let mut adapter = RasterAdapter::new();
        adapter
            .attach(LoadedMedium::Image(RgbaImage::new(width, height)))
            .unwrap();
        adapter
    }

    #[test]
    fn test_attach_rejects_other_media() {
        let mut adapter = RasterAdapter::new();
        let err = adapter.attach(LoadedMedium::Map).unwrap_err();
        assert!(matches!(
            err,
            MediumLoadError::KindMismatch {
                expected: MediumKind::Image,
                found: MediumKind::Map
            }
        ));
        assert!(!adapter.is_attached());
    }

    #[test]
    fn test_box_from_drag() {
        let adapter = attached(200, 200);
        let geometry = adapter
            .create_rule(
                &CreateRequest::Box {
                    anchor: Point::new(110.0, 80.0),
                    corner: Point::new(10.0, 10.0),
                },
                &Thresholds::default(),
            )
            .unwrap();
        assert_eq!(
            geometry,
            Geometry::Box {
                x: 10.0,
                y: 10.0,
                width: 100.0,
                height: 70.0
            }
        );
    }

    #[test]
    fn test_box_clamped_to_image() {
        let adapter = attached(100, 50);
        let clamped = adapter
            .commit_rule(
                Geometry::Box {
                    x: -10.0,
                    y: 20.0,
                    width: 50.0,
                    height: 100.0,
                },
                &[],
                None,
            )
            .unwrap();
        assert_eq!(
            clamped,
            Geometry::Box {
                x: 0.0,
                y: 20.0,
                width: 40.0,
                height: 30.0
            }
        );
    }

    #[test]
    fn test_polygon_vertices_clamped() {
        let adapter = attached(100, 100);
        let clamped = adapter
            .commit_rule(
                Geometry::Polygon {
                    points: vec![
                        Point::new(-5.0, 0.0),
                        Point::new(150.0, 0.0),
                        Point::new(50.0, 120.0),
                    ],
                },
                &[],
                None,
            )
            .unwrap();
        assert_eq!(
            clamped,
            Geometry::Polygon {
                points: vec![
                    Point::new(0.0, 0.0),
                    Point::new(100.0, 0.0),
                    Point::new(50.0, 100.0)
                ]
            }
        );
    }

    #[test]
    fn test_polygon_outside_image_rejected() {
        let adapter = attached(200, 200);
        let collapsed = Geometry::Polygon {
            points: vec![
                Point::new(300.0, 300.0),
                Point::new(400.0, 300.0),
                Point::new(400.0, 400.0),
            ],
        };
        let err = adapter.commit_rule(collapsed, &[], None).unwrap_err();
        assert!(matches!(err, RegionError::DegenerateGeometry { .. }));

        // Clamped onto the bottom edge, leaving a sliver
        let flattened = Geometry::Polygon {
            points: vec![
                Point::new(100.0, 250.0),
                Point::new(150.0, 300.0),
                Point::new(120.0, 199.99),
            ],
        };
        assert!(adapter.commit_rule(flattened, &[], None).is_err());
    }

    #[test]
    fn test_segment_unsupported() {
        let adapter = attached(10, 10);
        let err = adapter
            .create_rule(&CreateRequest::AtPlayhead { time: 1.0 }, &Thresholds::default())
            .unwrap_err();
        assert!(matches!(err, RegionError::UnsupportedGeometry { .. }));
    }

    #[test]
    fn test_display_filters() {
        let image = RgbaImage::from_pixel(1, 1, Rgba([100, 128, 200, 77]));
        assert_eq!(DisplayFilters::default().apply(&image), image);

        let brighter = DisplayFilters {
            brightness: 1.0,
            contrast: 1.0,
        }
        .apply(&image);
        assert_eq!(brighter.get_pixel(0, 0), &Rgba([255, 255, 255, 77]));

        let flat = DisplayFilters {
            brightness: 0.0,
            contrast: 0.0,
        }
        .apply(&image);
        assert_eq!(flat.get_pixel(0, 0), &Rgba([128, 128, 128, 77]));
    }

    #[test]
    fn test_filters_clamped() {
        let mut adapter = RasterAdapter::new();
        adapter.set_brightness(3.0);
        adapter.set_contrast(-1.0);
        assert_eq!(adapter.filters().brightness, 1.0);
        assert_eq!(adapter.filters().contrast, 0.0);
        assert!(adapter.display_image().is_none());
    }
}
