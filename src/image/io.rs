//! I/O helpers for grayscale images and JSON.
//!
//! - `load_grayscale_image`: read a PNG/JPEG/etc. into an owned 8-bit gray buffer.
//! - `list_image_files`: collect the PNG/JPEG files below a directory.
//! - `save_grayscale_u8`: write an owned 8-bit gray buffer to a PNG.
//! - `draw_rectangles`: burn axis-aligned box outlines into a gray buffer.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::ImageU8;
use image::{DynamicImage, GrayImage, ImageBuffer};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Owned 8-bit grayscale buffer with stride and borrowed view conversion.
#[derive(Clone, Debug)]
pub struct GrayImageU8 {
    width: usize,
    height: usize,
    stride: usize,
    data: Vec<u8>,
}

impl GrayImageU8 {
    /// Construct an owned grayscale buffer given raw bytes.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        let stride = width;
        Self {
            width,
            height,
            stride,
            data,
        }
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Borrow as a read-only `ImageU8` view
    pub fn as_view(&self) -> ImageU8<'_> {
        ImageU8 {
            w: self.width,
            h: self.height,
            stride: self.stride,
            data: &self.data,
        }
    }

    pub fn from_luma(img: GrayImage) -> Self {
        let width = img.width() as usize;
        let height = img.height() as usize;
        Self::new(width, height, img.into_raw())
    }

    pub fn to_luma(&self) -> Result<GrayImage, String> {
        ImageBuffer::from_raw(self.width as u32, self.height as u32, self.data.clone())
            .ok_or_else(|| "Failed to create image buffer".to_string())
    }

    fn put(&mut self, x: usize, y: usize, value: u8) {
        if x < self.width && y < self.height {
            self.data[y * self.stride + x] = value;
        }
    }
}

/// Load an image from disk and convert to 8-bit grayscale.
pub fn load_grayscale_image(path: &Path) -> Result<GrayImageU8, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_luma8();
    Ok(GrayImageU8::from_luma(img))
}

/// Recursively collect `png`/`jpg`/`jpeg` files below `dir`, sorted by path.
pub fn list_image_files(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let mut out = Vec::new();
    collect_image_files(dir, &mut out)?;
    out.sort();
    Ok(out)
}

fn collect_image_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), String> {
    let entries =
        fs::read_dir(dir).map_err(|e| format!("Failed to read {}: {e}", dir.display()))?;
    for entry in entries {
        let path = entry
            .map_err(|e| format!("Failed to read entry in {}: {e}", dir.display()))?
            .path();
        if path.is_dir() {
            collect_image_files(&path, out)?;
            continue;
        }
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
            .unwrap_or(false);
        if is_image {
            out.push(path);
        }
    }
    Ok(())
}

/// Save an 8-bit grayscale buffer to a PNG.
pub fn save_grayscale_u8(buffer: &GrayImageU8, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let image = buffer.to_luma()?;
    DynamicImage::ImageLuma8(image)
        .save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Draw the outlines of `[x, y, width, height]` boxes with the given gray
/// value. Boxes are clipped to the buffer.
pub fn draw_rectangles(
    buffer: &mut GrayImageU8,
    boxes: &[[usize; 4]],
    value: u8,
    thickness: usize,
) {
    for &[bx, by, bw, bh] in boxes {
        if bw == 0 || bh == 0 {
            continue;
        }
        for t in 0..thickness.min(bw).min(bh) {
            let (x0, y0) = (bx + t, by + t);
            let (x1, y1) = ((bx + bw - 1).saturating_sub(t), (by + bh - 1).saturating_sub(t));
            for x in x0..=x1 {
                buffer.put(x, y0, value);
                buffer.put(x, y1, value);
            }
            for y in y0..=y1 {
                buffer.put(x0, y, value);
                buffer.put(x1, y, value);
            }
        }
    }
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
