//! Bilinear resampling for `ImageF32`.
//!
//! Pixel centres are aligned (`src = (dst + 0.5) * scale - 0.5`) and border
//! samples clamp to the image extents.
use super::{ImageF32, ImageView, ImageViewMut};

/// Sample `img` at a fractional position with clamped bilinear interpolation.
pub fn interpolate_bilinear(img: &ImageF32, x: f32, y: f32) -> f32 {
    debug_assert!(img.w > 0 && img.h > 0, "cannot interpolate on an empty image");
    let x = x.clamp(0.0, (img.w - 1) as f32);
    let y = y.clamp(0.0, (img.h - 1) as f32);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;
    let x1 = (x0 + 1).min(img.w - 1);
    let y1 = (y0 + 1).min(img.h - 1);

    let p00 = img.get(x0, y0);
    let p10 = img.get(x1, y0);
    let p01 = img.get(x0, y1);
    let p11 = img.get(x1, y1);
    (1.0 - fx) * (1.0 - fy) * p00 + fx * (1.0 - fy) * p10 + (1.0 - fx) * fy * p01 + fx * fy * p11
}

/// Resize `src` to `new_w × new_h`. Returns an empty image when either target
/// dimension or the source is empty.
pub fn resize_bilinear(src: &ImageF32, new_w: usize, new_h: usize) -> ImageF32 {
    if new_w == 0 || new_h == 0 || src.w == 0 || src.h == 0 {
        return ImageF32::new(new_w.min(src.w), new_h.min(src.h));
    }
    if new_w == src.w && new_h == src.h {
        return src.clone();
    }
    let sx = src.w as f32 / new_w as f32;
    let sy = src.h as f32 / new_h as f32;
    let mut out = ImageF32::new(new_w, new_h);
    for y in 0..new_h {
        let fy = (y as f32 + 0.5) * sy - 0.5;
        let row = out.row_mut(y);
        for (x, px) in row.iter_mut().enumerate() {
            let fx = (x as f32 + 0.5) * sx - 0.5;
            *px = interpolate_bilinear(src, fx, fy);
        }
    }
    debug_assert_eq!(out.height(), new_h);
    out
}
