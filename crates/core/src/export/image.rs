//! Grayscale rendering of Khalimsky contour grids.
//!
//! Only compiled with the `png_export` feature.

use crate::error::{HisegError, Result};
use crate::image::graph_image::KhalimskyGrid;
use image::{GrayImage, Luma};
use std::path::Path;

/// Render a contour grid to an 8-bit grayscale image; values are
/// normalized to the full range, strongest contours white.
pub fn render_khalimsky(grid: &KhalimskyGrid) -> Result<GrayImage> {
    if grid.data.is_empty() {
        return Err(HisegError::InvalidShape("empty contour grid".into()));
    }
    let max = grid.data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = grid.data.iter().copied().fold(f64::INFINITY, f64::min);
    let span = if max > min { max - min } else { 1.0 };

    let mut img = GrayImage::new(grid.width as u32, grid.height as u32);
    for (i, &v) in grid.data.iter().enumerate() {
        let y = (i / grid.width) as u32;
        let x = (i % grid.width) as u32;
        let value = ((v - min) / span * 255.0).round() as u8;
        img.put_pixel(x, y, Luma([value]));
    }
    Ok(img)
}

/// Render and save a contour grid as a PNG file.
pub fn save_khalimsky_png(grid: &KhalimskyGrid, path: &Path) -> Result<()> {
    let img = render_khalimsky(grid)?;
    img.save(path)
        .map_err(|e| HisegError::Io(std::io::Error::other(e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_normalizes() {
        let grid = KhalimskyGrid {
            data: vec![0.0, 1.0, 2.0, 4.0],
            height: 2,
            width: 2,
        };
        let img = render_khalimsky(&grid).unwrap();
        assert_eq!(img.get_pixel(0, 0).0[0], 0);
        assert_eq!(img.get_pixel(1, 1).0[0], 255);
        assert_eq!(img.get_pixel(1, 0).0[0], 64);
    }
}
