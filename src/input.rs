use crate::layout::LayoutError;
use image::{DynamicImage, GenericImageView};
use std::path::Path;

/// Row-major grid of 0-255 intensities, one channel per cell.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityGrid {
    width: usize,
    height: usize,
    values: Vec<u8>,
}

impl IntensityGrid {
    pub fn new(width: usize, height: usize, values: Vec<u8>) -> Result<Self, LayoutError> {
        let expected = width * height;
        if values.len() != expected {
            return Err(LayoutError::GridSizeMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

    /// Builds a grid by evaluating `f(column, row)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> u8) -> Self {
        let mut values = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                values.push(f(col, row));
            }
        }
        Self {
            width,
            height,
            values,
        }
    }

    /// Samples the red channel; silhouettes are expected in greyscale.
    pub fn from_image(image: &DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        let rgba = image.to_rgba8();
        let values = rgba.pixels().map(|px| px.0[0]).collect();
        Self {
            width: width as usize,
            height: height as usize,
            values,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, col: usize, row: usize) -> Option<u8> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.values.get(row * self.width + col).copied()
    }

    /// Cells in row-major order as `(column, row, intensity)`.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        let width = self.width.max(1);
        self.values
            .iter()
            .enumerate()
            .map(move |(idx, value)| (idx % width, idx / width, *value))
    }
}

pub fn load_intensity_grid(path: &Path) -> anyhow::Result<IntensityGrid> {
    let image = image::open(path)?;
    tracing::debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "loaded silhouette image"
    );
    Ok(IntensityGrid::from_image(&image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    #[test]
    fn rejects_mismatched_length() {
        let err = IntensityGrid::new(3, 2, vec![0; 5]).unwrap_err();
        assert_eq!(
            err,
            LayoutError::GridSizeMismatch {
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn cells_are_row_major() {
        let grid = IntensityGrid::new(2, 2, vec![1, 2, 3, 4]).unwrap();
        let cells: Vec<_> = grid.cells().collect();
        assert_eq!(cells, vec![(0, 0, 1), (1, 0, 2), (0, 1, 3), (1, 1, 4)]);
        assert_eq!(grid.get(1, 1), Some(4));
        assert_eq!(grid.get(2, 0), None);
    }

    #[test]
    fn image_uses_red_channel() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([200, 10, 10, 255]));
        img.put_pixel(1, 0, Rgba([0, 255, 255, 255]));
        let grid = IntensityGrid::from_image(&DynamicImage::ImageRgba8(img));
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.get(0, 0), Some(200));
        assert_eq!(grid.get(1, 0), Some(0));
    }

    #[test]
    fn greyscale_image_round_trips_intensity() {
        let mut img = GrayImage::new(1, 2);
        img.put_pixel(0, 1, Luma([128]));
        let grid = IntensityGrid::from_image(&DynamicImage::ImageLuma8(img));
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.get(0, 0), Some(0));
        assert_eq!(grid.get(0, 1), Some(128));
    }
}
