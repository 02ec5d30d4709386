//! Medium sources and loading.
//!
//! A [`MediumSource`] describes what an editor annotates. Raster images and
//! point clouds are decoded from bytes through a [`LoaderRegistry`]; timeline
//! media only carry a duration (decoding happens in the host) and text and
//! map media carry no asset at all.
//!
//! ## Adding New Formats
//!
//! 1. Create a new loader in `loaders/` implementing `MediumLoader`
//! 2. Register it in `LoaderRegistry::new()`

mod error;
mod loader;
pub mod loaders;

use std::fmt;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

pub use error::MediumLoadError;
pub use loader::{LoaderRegistry, MediumLoader};

/// The kind of medium an editor annotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediumKind {
    Image,
    Video,
    Audio,
    Text,
    Map,
    PointCloud,
}

impl MediumKind {
    pub fn name(&self) -> &'static str {
        match self {
            MediumKind::Image => "image",
            MediumKind::Video => "video",
            MediumKind::Audio => "audio",
            MediumKind::Text => "text",
            MediumKind::Map => "map",
            MediumKind::PointCloud => "point cloud",
        }
    }
}

impl fmt::Display for MediumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where the medium comes from.
///
/// Asset-backed media take either a `path` or inline `bytes`; a path wins
/// when both are given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediumSource {
    Image {
        #[serde(default)]
        path: Option<PathBuf>,
        #[serde(default)]
        bytes: Option<Vec<u8>>,
    },
    Video {
        /// Seconds, from the host's decoder
        duration: f64,
    },
    Audio {
        /// Seconds, from the host's decoder
        duration: f64,
    },
    Text {
        content: String,
    },
    Map,
    PointCloud {
        #[serde(default)]
        path: Option<PathBuf>,
        #[serde(default)]
        bytes: Option<Vec<u8>>,
    },
}

impl MediumSource {
    /// Image source from a file.
    pub fn image_file(path: impl Into<PathBuf>) -> Self {
        Self::Image {
            path: Some(path.into()),
            bytes: None,
        }
    }

    /// Image source from encoded bytes.
    pub fn image_bytes(bytes: Vec<u8>) -> Self {
        Self::Image {
            path: None,
            bytes: Some(bytes),
        }
    }

    /// Point cloud from encoded `.npy` bytes.
    pub fn point_cloud_bytes(bytes: Vec<u8>) -> Self {
        Self::PointCloud {
            path: None,
            bytes: Some(bytes),
        }
    }

    pub fn kind(&self) -> MediumKind {
        match self {
            MediumSource::Image { .. } => MediumKind::Image,
            MediumSource::Video { .. } => MediumKind::Video,
            MediumSource::Audio { .. } => MediumKind::Audio,
            MediumSource::Text { .. } => MediumKind::Text,
            MediumSource::Map => MediumKind::Map,
            MediumSource::PointCloud { .. } => MediumKind::PointCloud,
        }
    }

    /// Resolve the source into a loaded medium.
    pub fn load(&self, registry: &LoaderRegistry) -> Result<LoadedMedium, MediumLoadError> {
        let kind = self.kind();
        match self {
            MediumSource::Image { path, bytes } | MediumSource::PointCloud { path, bytes } => {
                let (data, filename) = read_asset(kind, path.as_deref(), bytes.as_deref())?;
                registry.load(&data, filename.as_deref(), kind)
            }
            MediumSource::Video { duration } | MediumSource::Audio { duration } => {
                if !duration.is_finite() || *duration <= 0.0 {
                    return Err(MediumLoadError::invalid_metadata(format!(
                        "{kind} duration must be positive, got {duration}"
                    )));
                }
                Ok(LoadedMedium::Timeline {
                    kind,
                    duration: *duration,
                })
            }
            MediumSource::Text { content } => Ok(LoadedMedium::Text(content.clone())),
            MediumSource::Map => Ok(LoadedMedium::Map),
        }
    }
}

fn read_asset(
    kind: MediumKind,
    path: Option<&Path>,
    bytes: Option<&[u8]>,
) -> Result<(Vec<u8>, Option<String>), MediumLoadError> {
    if let Some(path) = path {
        let data = std::fs::read(path).map_err(|source| MediumLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        return Ok((data, filename));
    }
    match bytes {
        Some(bytes) => Ok((bytes.to_vec(), None)),
        None => Err(MediumLoadError::MissingAsset { kind }),
    }
}

/// A point cloud as an `N x 3` (xyz) or `N x 4` (xyz + intensity) array.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    points: Array2<f32>,
}

impl PointCloud {
    /// Wrap an array, checking its shape.
    pub fn new(points: Array2<f32>) -> Result<Self, MediumLoadError> {
        let columns = points.ncols();
        if columns != 3 && columns != 4 {
            return Err(MediumLoadError::invalid_metadata(format!(
                "point cloud must have 3 or 4 columns, got {columns}"
            )));
        }
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.points.nrows() == 0
    }

    pub fn has_intensity(&self) -> bool {
        self.points.ncols() == 4
    }

    /// Iterate over the xyz coordinates.
    pub fn positions(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.points
            .axis_iter(Axis(0))
            .map(|row: ArrayView1<'_, f32>| [row[0], row[1], row[2]])
    }

    /// Axis-aligned bounds as (min, max); `None` for an empty cloud.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let mut positions = self.positions();
        let first = positions.next()?;
        Some(positions.fold((first, first), |(mut min, mut max), p| {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
            (min, max)
        }))
    }
}

/// A medium after loading, ready to attach to an adapter.
#[derive(Debug, Clone)]
pub enum LoadedMedium {
    Image(RgbaImage),
    Timeline { kind: MediumKind, duration: f64 },
    Text(String),
    Map,
    PointCloud(PointCloud),
}

impl LoadedMedium {
    pub fn kind(&self) -> MediumKind {
        match self {
            LoadedMedium::Image(_) => MediumKind::Image,
            LoadedMedium::Timeline { kind, .. } => *kind,
            LoadedMedium::Text(_) => MediumKind::Text,
            LoadedMedium::Map => MediumKind::Map,
            LoadedMedium::PointCloud(_) => MediumKind::PointCloud,
        }
    }
}
