//! Trait-based asset loading.
//!
//! Each asset format implements [`MediumLoader`]; the [`LoaderRegistry`]
//! picks a loader by extension first, then by magic bytes.

use crate::medium::{LoadedMedium, MediumKind, MediumLoadError};

/// A decoder for one asset format.
pub trait MediumLoader: Send + Sync {
    /// Unique identifier for this loader (e.g., "image", "npy").
    fn id(&self) -> &'static str;

    /// The medium this loader produces.
    fn medium(&self) -> MediumKind;

    /// File extensions this loader handles (lowercase, without dots).
    fn extensions(&self) -> &'static [&'static str];

    /// Check magic bytes for format auto-detection.
    fn can_load(&self, data: &[u8]) -> bool;

    /// Decode raw bytes.
    fn load(&self, data: &[u8]) -> Result<LoadedMedium, MediumLoadError>;

    /// Priority for format detection (higher = checked first).
    fn priority(&self) -> i32 {
        0
    }
}

/// Registry of available loaders.
pub struct LoaderRegistry {
    loaders: Vec<Box<dyn MediumLoader>>,
}

impl LoaderRegistry {
    /// Create a new registry with all built-in loaders.
    pub fn new() -> Self {
        let mut registry = Self {
            loaders: Vec::new(),
        };
        registry.register(Box::new(super::loaders::ImageLoader));
        registry.register(Box::new(super::loaders::NpyLoader));
        registry
    }

    /// Register a new loader.
    pub fn register(&mut self, loader: Box<dyn MediumLoader>) {
        self.loaders.push(loader);
        self.loaders.sort_by_key(|l| std::cmp::Reverse(l.priority()));
    }

    /// Get all supported file extensions for a medium.
    pub fn supported_extensions(&self, medium: MediumKind) -> Vec<&'static str> {
        let mut extensions: Vec<&'static str> = self
            .loaders
            .iter()
            .filter(|l| l.medium() == medium)
            .flat_map(|l| l.extensions().iter().copied())
            .collect();
        extensions.sort_unstable();
        extensions.dedup();
        extensions
    }

    /// Decode `data` into a medium of kind `medium`.
    ///
    /// Tries loaders in this order:
    /// 1. By file extension (if filename provided)
    /// 2. By magic byte detection
    pub fn load(
        &self,
        data: &[u8],
        filename: Option<&str>,
        medium: MediumKind,
    ) -> Result<LoadedMedium, MediumLoadError> {
        let candidates: Vec<&dyn MediumLoader> = self
            .loaders
            .iter()
            .filter(|l| l.medium() == medium)
            .map(|l| l.as_ref())
            .collect();

        let extension = filename
            .and_then(|f| f.rsplit_once('.'))
            .map(|(_, ext)| ext.to_lowercase());

        let mut last_error = None;
        if let Some(ext) = &extension {
            for loader in candidates
                .iter()
                .filter(|l| l.extensions().contains(&ext.as_str()))
            {
                match loader.load(data) {
                    Ok(loaded) => {
                        log::debug!("Loaded with {} loader (by extension)", loader.id());
                        return Ok(loaded);
                    }
                    Err(e) => {
                        log::trace!("Loader {} failed: {}", loader.id(), e);
                        last_error = Some(e);
                    }
                }
            }
        }

        if let Some(loader) = candidates.iter().find(|l| l.can_load(data)) {
            match loader.load(data) {
                Ok(loaded) => {
                    log::debug!("Loaded with {} loader (by detection)", loader.id());
                    return Ok(loaded);
                }
                Err(e) => {
                    log::trace!("Detected loader {} failed: {}", loader.id(), e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| MediumLoadError::Unsupported {
            filename: filename.map(str::to_string),
        }))
    }

    /// Get all registered loaders.
    pub fn loaders(&self) -> &[Box<dyn MediumLoader>] {
        &self.loaders
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions() {
        let registry = LoaderRegistry::new();
        let images = registry.supported_extensions(MediumKind::Image);
        assert!(images.contains(&"png"));
        assert!(images.contains(&"jpg"));
        assert!(!images.contains(&"npy"));
        assert_eq!(registry.supported_extensions(MediumKind::PointCloud), vec!["npy"]);
    }

    #[test]
    fn test_priority_order() {
        let registry = LoaderRegistry::new();
        assert_eq!(registry.loaders()[0].id(), "npy");
    }

    #[test]
    fn test_unknown_bytes_unsupported() {
        let registry = LoaderRegistry::new();
        let err = registry
            .load(&[0u8; 16], Some("mystery.bin"), MediumKind::Image)
            .unwrap_err();
        assert!(matches!(err, MediumLoadError::Unsupported { .. }));
    }

    #[test]
    fn test_wrong_medium_not_tried() {
        // Valid npy magic, but an image was requested
        let registry = LoaderRegistry::new();
        let data = [0x93, b'N', b'U', b'M', b'P', b'Y', 0x01, 0x00];
        let err = registry.load(&data, None, MediumKind::Image).unwrap_err();
        assert!(matches!(err, MediumLoadError::Unsupported { filename: None }));
    }
}
