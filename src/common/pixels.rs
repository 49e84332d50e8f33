//! # Pixel Representation
//!
//! A [`PixelMatrix`] is a `width × height` grid of RGB triplets with every
//! channel in `0..=255`. Alpha is always dropped on the way in.

use image::{DynamicImage, ImageResult, RgbImage};
use std::path::{Path, PathBuf};

/// Height × width × 3 grid of channel values.
pub type PixelMatrix = RgbImage;

/// Any input the core accepts as an image.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// File on disk, decoded by extension / content sniffing
    Path(PathBuf),
    /// Already decoded image in any color type
    Image(DynamicImage),
    /// Raw RGB matrix, used as is
    Matrix(PixelMatrix),
}

impl ImageSource {
    /// Normalize the source into a 3-channel matrix.
    ///
    /// # Errors
    /// - The path cannot be opened or decoded
    pub fn into_matrix(self) -> ImageResult<PixelMatrix> {
        match self {
            Self::Path(path) => Ok(image::open(path)?.to_rgb8()),
            Self::Image(img) => Ok(img.to_rgb8()),
            Self::Matrix(matrix) => Ok(matrix),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<&str> for ImageSource {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<DynamicImage> for ImageSource {
    fn from(img: DynamicImage) -> Self {
        Self::Image(img)
    }
}

impl From<PixelMatrix> for ImageSource {
    fn from(matrix: PixelMatrix) -> Self {
        Self::Matrix(matrix)
    }
}

/// Total of every channel value in the matrix.
pub fn channel_sum(matrix: &PixelMatrix) -> u64 {
    matrix.as_raw().iter().map(|&v| u64::from(v)).sum()
}

/// `(width, height)` of the matrix. Layers can only be summed when their
/// shapes match.
pub fn shape(matrix: &PixelMatrix) -> (u32, u32) {
    matrix.dimensions()
}

/// Number of (row, column) locations.
pub fn pixel_count(matrix: &PixelMatrix) -> usize {
    matrix.width() as usize * matrix.height() as usize
}
