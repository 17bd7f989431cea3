//! The rendered image as a plain byte buffer.
use image::RgbImage;
use std::path::Path;

use crate::error::ArtError;

/// A `width × height × 3` RGB byte buffer, row-major.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelGrid {
    /// Wrap a byte buffer. Fails if its length is not `width * height * 3`.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ArtError> {
        if data.len() != width * height * 3 {
            return Err(ArtError::InvalidParameter(format!(
                "a {}x{} grid needs {} bytes, got {}",
                width,
                height,
                width * height * 3,
                data.len()
            )));
        }
        Ok(PixelGrid {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns (width, height).
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// The colour at column `x` and row `y`, or `None` if out of bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let k = 3 * (y * self.width + x);
        Some([self.data[k], self.data[k + 1], self.data[k + 2]])
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Convert into an `image` buffer for encoding.
    pub fn to_image(&self) -> Result<RgbImage, ArtError> {
        let width = u32::try_from(self.width)
            .map_err(|e| ArtError::InvalidParameter(format!("width too large: {}", e)))?;
        let height = u32::try_from(self.height)
            .map_err(|e| ArtError::InvalidParameter(format!("height too large: {}", e)))?;
        RgbImage::from_raw(width, height, self.data.clone()).ok_or_else(|| {
            ArtError::InvalidParameter("pixel buffer does not match its dimensions".to_string())
        })
    }

    /// Encode the image to a file; the format follows the extension (png, jpg, ...).
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ArtError> {
        self.to_image()?
            .save(path)
            .map_err(|e| ArtError::IOError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_layout() {
        let data: Vec<u8> = (0..18).collect();
        let grid = PixelGrid::from_raw(3, 2, data).unwrap();
        assert_eq!(grid.dimensions(), (3, 2));
        assert_eq!(grid.pixel(0, 0), Some([0, 1, 2]));
        assert_eq!(grid.pixel(2, 0), Some([6, 7, 8]));
        assert_eq!(grid.pixel(0, 1), Some([9, 10, 11]));
        assert_eq!(grid.pixel(3, 0), None);
        assert_eq!(grid.pixel(0, 2), None);
    }

    #[test]
    fn test_from_raw_rejects_bad_length() {
        assert!(PixelGrid::from_raw(2, 2, vec![0; 11]).is_err());
    }

    #[test]
    fn test_save_png() {
        let grid = PixelGrid::from_raw(2, 1, vec![255, 0, 0, 0, 0, 255]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.png");
        grid.save_to(&path).unwrap();

        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (2, 1));
        assert_eq!(decoded.get_pixel(1, 0).0, [0, 0, 255]);
    }
}
