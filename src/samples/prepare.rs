//! Window extraction from raw grayscale images.
//!
//! Positives are assumed to be roughly centred object crops: an optional
//! band is removed from the top, the largest centred square is taken and
//! resized to the window. Negatives are background images: a random square
//! of at least window size is cropped at a random position and resized.
use crate::image::io::load_grayscale_image;
use crate::image::ImageF32;
use image::imageops::{self, FilterType};
use image::GrayImage;
use rand::Rng;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleKind {
    Positive,
    Negative,
}

pub(crate) fn luma_to_f32(img: &GrayImage) -> ImageF32 {
    ImageF32::from_fn(img.width() as usize, img.height() as usize, |x, y| {
        img.get_pixel(x as u32, y as u32)[0] as f32
    })
}

fn crop_resized(img: &GrayImage, x: u32, y: u32, side: u32, window: u32) -> ImageF32 {
    let crop = imageops::crop_imm(img, x, y, side, side).to_image();
    if side == window {
        return luma_to_f32(&crop);
    }
    luma_to_f32(&imageops::resize(&crop, window, window, FilterType::Triangle))
}

/// Centre-square crop below `crop_top`, resized to `window × window`.
///
/// Returns `None` when nothing is left after removing the top band.
pub fn positive_window(img: &GrayImage, window: u32, crop_top: u32) -> Option<ImageF32> {
    let (w, h) = img.dimensions();
    let h = h.checked_sub(crop_top)?;
    let side = w.min(h);
    if side == 0 || window == 0 {
        return None;
    }
    let x = (w - side) / 2;
    let y = crop_top + (h - side) / 2;
    Some(crop_resized(img, x, y, side, window))
}

/// Random square crop of side in `[window, min(w, h)]`, resized to the window.
///
/// Images smaller than the window are cropped to their largest square and
/// upscaled.
pub fn negative_window<R: Rng + ?Sized>(
    img: &GrayImage,
    window: u32,
    rng: &mut R,
) -> Option<ImageF32> {
    let (w, h) = img.dimensions();
    let max_side = w.min(h);
    if max_side == 0 || window == 0 {
        return None;
    }
    let min_side = window.min(max_side);
    let side = if min_side >= max_side {
        max_side
    } else {
        rng.gen_range(min_side..=max_side)
    };
    let x = rng.gen_range(0..=w - side);
    let y = rng.gen_range(0..=h - side);
    Some(crop_resized(img, x, y, side, window))
}

/// Load each file and extract one window of the given kind.
///
/// Files that yield no window are skipped with a warning.
pub fn load_sample_windows<R: Rng + ?Sized>(
    paths: &[PathBuf],
    kind: SampleKind,
    window: usize,
    crop_top: usize,
    rng: &mut R,
) -> Result<Vec<ImageF32>, String> {
    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        let gray = load_grayscale_image(path)?.to_luma()?;
        let extracted = match kind {
            SampleKind::Positive => positive_window(&gray, window as u32, crop_top as u32),
            SampleKind::Negative => negative_window(&gray, window as u32, rng),
        };
        match extracted {
            Some(win) => out.push(win),
            None => log::warn!(
                "skipping {}: {}x{} yields no {kind:?} window",
                path.display(),
                gray.width(),
                gray.height()
            ),
        }
    }
    Ok(out)
}
