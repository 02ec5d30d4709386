//! Loader for standard image formats (PNG, JPEG, BMP, TIFF, WebP).

use crate::medium::{LoadedMedium, MediumKind, MediumLoadError, MediumLoader};

/// Loader for raster images, decoded to RGBA8.
pub struct ImageLoader;

impl MediumLoader for ImageLoader {
    fn id(&self) -> &'static str {
        "image"
    }

    fn medium(&self) -> MediumKind {
        MediumKind::Image
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["png", "jpg", "jpeg", "bmp", "tiff", "tif", "webp"]
    }

    fn can_load(&self, data: &[u8]) -> bool {
        // Check common image magic bytes
        if data.len() < 8 {
            return false;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return true;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return true;
        }

        // BMP: 42 4D (BM)
        if data.starts_with(b"BM") {
            return true;
        }

        // TIFF: little or big endian
        if data.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            return true;
        }

        // WebP: RIFF....WEBP
        data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP"
    }

    fn load(&self, data: &[u8]) -> Result<LoadedMedium, MediumLoadError> {
        let img = image::load_from_memory(data)
            .map_err(|e| MediumLoadError::decode(self.id(), e.to_string()))?
            .to_rgba8();

        if img.width() == 0 || img.height() == 0 {
            return Err(MediumLoadError::invalid_metadata("image has zero size"));
        }

        log::debug!("ImageLoader: decoded {}x{} image", img.width(), img.height());
        Ok(LoadedMedium::Image(img))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgba, RgbaImage};

    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 100, 50, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_magic_detection() {
        let loader = ImageLoader;
        assert!(loader.can_load(&png_bytes(2, 2)));
        let jpeg_magic = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
        assert!(loader.can_load(&jpeg_magic));
        assert!(!loader.can_load(&[0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07]));
    }

    #[test]
    fn test_decode_png() {
        let loaded = ImageLoader.load(&png_bytes(4, 3)).unwrap();
        let LoadedMedium::Image(img) = loaded else {
            panic!("expected image");
        };
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(img.get_pixel(1, 1), &Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn test_corrupt_image() {
        let mut bytes = png_bytes(4, 3);
        bytes.truncate(20);
        let err = ImageLoader.load(&bytes).unwrap_err();
        assert!(matches!(err, MediumLoadError::Decode { loader: "image", .. }));
    }
}
