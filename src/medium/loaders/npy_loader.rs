//! Loader for point clouds stored as NumPy `.npy` files.

use std::io::Cursor;

use ndarray::Array2;
use ndarray_npy::ReadNpyExt;

use crate::medium::{LoadedMedium, MediumKind, MediumLoadError, MediumLoader, PointCloud};

/// Loader for NumPy `.npy` point clouds.
///
/// **Expected array shape**: `(N, 3)` for xyz or `(N, 4)` for xyz plus
/// intensity. Supported data types: `f32`, `f64`.
pub struct NpyLoader;

impl NpyLoader {
    /// NumPy magic bytes: \x93NUMPY
    const MAGIC: &'static [u8] = &[0x93, b'N', b'U', b'M', b'P', b'Y'];
}

impl MediumLoader for NpyLoader {
    fn id(&self) -> &'static str {
        "npy"
    }

    fn medium(&self) -> MediumKind {
        MediumKind::PointCloud
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["npy"]
    }

    fn can_load(&self, data: &[u8]) -> bool {
        data.starts_with(Self::MAGIC)
    }

    fn load(&self, data: &[u8]) -> Result<LoadedMedium, MediumLoadError> {
        let mut cursor = Cursor::new(data);

        // f32 is the usual dtype for point clouds
        let points = match Array2::<f32>::read_npy(&mut cursor) {
            Ok(array) => array,
            Err(f32_err) => {
                // Reset cursor and try f64
                cursor.set_position(0);
                match Array2::<f64>::read_npy(&mut cursor) {
                    Ok(array) => array.mapv(|v| v as f32),
                    Err(_) => {
                        return Err(MediumLoadError::decode(
                            self.id(),
                            format!("expected a 2D f32/f64 array: {f32_err}"),
                        ));
                    }
                }
            }
        };

        if points.iter().any(|v| !v.is_finite()) {
            return Err(MediumLoadError::invalid_metadata(
                "point cloud contains non-finite values",
            ));
        }

        let cloud = PointCloud::new(points)?;
        log::info!(
            "NpyLoader: loaded {} points{}",
            cloud.len(),
            if cloud.has_intensity() {
                " with intensity"
            } else {
                ""
            }
        );
        Ok(LoadedMedium::PointCloud(cloud))
    }

    fn priority(&self) -> i32 {
        10
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array1, array};
    use ndarray_npy::WriteNpyExt;

    use super::*;

    fn npy_bytes<T: ndarray_npy::WritableElement, D: ndarray::Dimension>(
        array: &ndarray::Array<T, D>,
    ) -> Vec<u8> {
        let mut bytes = Vec::new();
        array.write_npy(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_magic_detection() {
        let loader = NpyLoader;
        assert!(loader.can_load(&[0x93, b'N', b'U', b'M', b'P', b'Y', 0x01, 0x00]));
        assert!(!loader.can_load(&[0x89, 0x50, 0x4E, 0x47]));
    }

    #[test]
    fn test_load_xyz_f32() {
        let bytes = npy_bytes(&array![[0.0f32, 1.0, 2.0], [3.0, 4.0, 5.0]]);
        let LoadedMedium::PointCloud(cloud) = NpyLoader.load(&bytes).unwrap() else {
            panic!("expected point cloud");
        };
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.positions().nth(1), Some([3.0, 4.0, 5.0]));
    }

    #[test]
    fn test_load_xyzi_f64() {
        let bytes = npy_bytes(&array![[0.5f64, 1.0, 2.0, 0.9]]);
        let LoadedMedium::PointCloud(cloud) = NpyLoader.load(&bytes).unwrap() else {
            panic!("expected point cloud");
        };
        assert!(cloud.has_intensity());
        assert_eq!(cloud.positions().next(), Some([0.5, 1.0, 2.0]));
    }

    #[test]
    fn test_rejects_wrong_shape() {
        let one_d = npy_bytes(&Array1::<f32>::zeros(6));
        assert!(matches!(
            NpyLoader.load(&one_d),
            Err(MediumLoadError::Decode { .. })
        ));

        let two_columns = npy_bytes(&array![[0.0f32, 1.0], [2.0, 3.0]]);
        assert!(matches!(
            NpyLoader.load(&two_columns),
            Err(MediumLoadError::InvalidMetadata { .. })
        ));
    }
}
