//! 3D point cloud adapter: oriented boxes in world units.

use std::f32::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::adapter::{
    CoordinateSpace, CreateRequest, MediumAdapter, kind_mismatch, unsupported_geometry,
    unsupported_request,
};
use crate::config::{Thresholds, TimelineSettings, ZoomLimits};
use crate::constants::MIN_BOX3D_SCALE;
use crate::error::RegionError;
use crate::geometry::box3d_contains;
use crate::medium::{LoadedMedium, MediumKind, MediumLoadError, PointCloud};
use crate::model::{Geometry, Region, RegionId};
use crate::tool::ToolMode;
use crate::viewport::Viewport;

/// Which component of the selected box a transform gesture edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl TransformMode {
    pub fn name(&self) -> &'static str {
        match self {
            TransformMode::Translate => "Translate",
            TransformMode::Rotate => "Rotate",
            TransformMode::Scale => "Scale",
        }
    }
}

/// Wrap an angle into (-π, π].
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// Apply an additive transform delta to a 3D box.
///
/// Returns `None` for any other geometry. Rotation is normalized; scale is
/// not clamped here, the commit rule rejects collapsed axes.
pub fn apply_transform(
    geometry: &Geometry,
    mode: TransformMode,
    delta: [f32; 3],
) -> Option<Geometry> {
    let Geometry::Box3d {
        mut position,
        mut rotation,
        mut scale,
    } = geometry.clone()
    else {
        return None;
    };
    for i in 0..3 {
        match mode {
            TransformMode::Translate => position[i] += delta[i],
            TransformMode::Rotate => rotation[i] = normalize_angle(rotation[i] + delta[i]),
            TransformMode::Scale => scale[i] += delta[i],
        }
    }
    Some(Geometry::Box3d {
        position,
        rotation,
        scale,
    })
}

/// Adapter for point cloud scenes.
#[derive(Debug, Clone, Default)]
pub struct Space3dAdapter {
    cloud: Option<PointCloud>,
}

impl Space3dAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cloud(&self) -> Option<&PointCloud> {
        self.cloud.as_ref()
    }

    /// Number of cloud points inside a 3D box.
    pub fn points_in_box(&self, geometry: &Geometry) -> usize {
        let (Some(cloud), Geometry::Box3d {
            position,
            rotation,
            scale,
        }) = (&self.cloud, geometry)
        else {
            return 0;
        };
        cloud
            .positions()
            .filter(|p| box3d_contains(*p, *position, *rotation, *scale))
            .count()
    }
}

impl MediumAdapter for Space3dAdapter {
    fn kind(&self) -> MediumKind {
        MediumKind::PointCloud
    }

    fn attach(&mut self, medium: LoadedMedium) -> Result<(), MediumLoadError> {
        match medium {
            LoadedMedium::PointCloud(cloud) => {
                log::info!("Space3d: attached cloud of {} points", cloud.len());
                if let Some((min, max)) = cloud.bounds() {
                    log::debug!("Space3d: bounds {:?} .. {:?}", min, max);
                }
                self.cloud = Some(cloud);
                Ok(())
            }
            other => Err(kind_mismatch(MediumKind::PointCloud, &other)),
        }
    }

    fn is_attached(&self) -> bool {
        self.cloud.is_some()
    }

    fn supports_tool(&self, tool: ToolMode) -> bool {
        tool == ToolMode::Select
    }

    fn transform_space(&self) -> CoordinateSpace {
        CoordinateSpace::World
    }

    fn initial_viewport(&self, _zoom: &ZoomLimits, _timeline: &TimelineSettings) -> Viewport {
        Viewport::Fixed
    }

    fn create_rule(
        &self,
        request: &CreateRequest,
        _thresholds: &Thresholds,
    ) -> Result<Geometry, RegionError> {
        match request {
            CreateRequest::Placement => Ok(Geometry::unit_box3d()),
            other => Err(unsupported_request(other, MediumKind::PointCloud)),
        }
    }

    fn commit_rule(
        &self,
        geometry: Geometry,
        _existing: &[Region],
        _exclude: Option<RegionId>,
    ) -> Result<Geometry, RegionError> {
        match geometry {
            Geometry::Box3d {
                position,
                rotation,
                scale,
            } => {
                let collapsed = scale
                    .iter()
                    .position(|s| !s.is_finite() || *s < MIN_BOX3D_SCALE);
                if let Some(axis) = collapsed {
                    return Err(RegionError::degenerate(format!(
                        "scale on axis {axis} must stay positive, got {}",
                        scale[axis]
                    )));
                }
                Ok(Geometry::Box3d {
                    position,
                    rotation: rotation.map(normalize_angle),
                    scale,
                })
            }
            other => Err(unsupported_geometry(&other, MediumKind::PointCloud)),
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(PI) - PI).abs() < EPSILON);
        assert!((normalize_angle(-PI) - PI).abs() < EPSILON);
        assert!((normalize_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < EPSILON);
        assert!((normalize_angle(0.25) - 0.25).abs() < EPSILON);
    }

    #[test]
    fn test_placement_is_unit_box() {
        let adapter = Space3dAdapter::new();
        let geometry = adapter
            .create_rule(&CreateRequest::Placement, &Thresholds::default())
            .unwrap();
        assert_eq!(geometry, Geometry::unit_box3d());
    }

    #[test]
    fn test_transform_modes_are_additive() {
        let unit = Geometry::unit_box3d();
        let moved = apply_transform(&unit, TransformMode::Translate, [1.0, 0.0, -2.0]).unwrap();
        let Geometry::Box3d { position, .. } = moved else {
            panic!("expected box3d");
        };
        assert_eq!(position, [1.0, 0.0, -2.0]);

        let scaled = apply_transform(&unit, TransformMode::Scale, [0.5, 0.5, 0.5]).unwrap();
        let Geometry::Box3d { scale, .. } = scaled else {
            panic!("expected box3d");
        };
        assert_eq!(scale, [1.5, 1.5, 1.5]);

        let spun = apply_transform(&unit, TransformMode::Rotate, [0.0, 0.0, 4.0]).unwrap();
        let Geometry::Box3d { rotation, .. } = spun else {
            panic!("expected box3d");
        };
        assert!((rotation[2] - (4.0 - TAU)).abs() < EPSILON);

        let span = Geometry::Span { start: 0, end: 1 };
        assert!(apply_transform(&span, TransformMode::Scale, [1.0; 3]).is_none());
    }

    #[test]
    fn test_collapsed_scale_rejected() {
        let adapter = Space3dAdapter::new();
        let unit = Geometry::unit_box3d();
        let flat = apply_transform(&unit, TransformMode::Scale, [0.0, -1.0, 0.0]).unwrap();
        assert!(matches!(
            adapter.commit_rule(flat, &[], None),
            Err(RegionError::DegenerateGeometry { .. })
        ));
    }

    #[test]
    fn test_points_in_box() {
        let mut adapter = Space3dAdapter::new();
        let cloud = PointCloud::new(array![
            [0.0, 0.0, 0.0],
            [0.4, -0.4, 0.2],
            [2.0, 0.0, 0.0],
            [0.0, 0.0, 0.6]
        ])
        .unwrap();
        adapter.attach(LoadedMedium::PointCloud(cloud)).unwrap();
        assert_eq!(adapter.points_in_box(&Geometry::unit_box3d()), 2);
    }
}
