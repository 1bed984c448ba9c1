use haar_cascade::image::ImageF32;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Left half at `bright`, right half at `dark`.
pub fn edge_window(size: usize, bright: f32, dark: f32) -> ImageF32 {
    ImageF32::from_fn(size, size, |x, _| if x < size / 2 { bright } else { dark })
}

/// Uniform noise in `[lo, hi)`.
pub fn noise_window(size: usize, lo: f32, hi: f32, rng: &mut StdRng) -> ImageF32 {
    ImageF32::from_fn(size, size, |_, _| rng.gen_range(lo..hi))
}

/// Clean edge windows with slightly varying contrast against uniform noise.
pub fn separable_windows(
    size: usize,
    positives: usize,
    negatives: usize,
    seed: u64,
) -> (Vec<ImageF32>, Vec<ImageF32>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let pos = (0..positives)
        .map(|i| edge_window(size, 200.0 - (i % 5) as f32 * 5.0, 40.0 + (i % 3) as f32 * 5.0))
        .collect();
    let neg = (0..negatives)
        .map(|_| noise_window(size, 0.0, 255.0, &mut rng))
        .collect();
    (pos, neg)
}

/// Weak edges buried in noise so that no single feature separates the classes.
pub fn overlapping_windows(
    size: usize,
    positives: usize,
    negatives: usize,
    seed: u64,
) -> (Vec<ImageF32>, Vec<ImageF32>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let pos = (0..positives)
        .map(|_| {
            let base = edge_window(size, 130.0, 115.0);
            ImageF32::from_fn(size, size, |x, y| base.get(x, y) + rng.gen_range(-60.0..60.0))
        })
        .collect();
    let neg = (0..negatives)
        .map(|_| noise_window(size, 60.0, 190.0, &mut rng))
        .collect();
    (pos, neg)
}

/// Constant background with `patch` copied to `(x0, y0)`.
pub fn scene_with_patch(
    width: usize,
    height: usize,
    background: f32,
    patch: &ImageF32,
    x0: usize,
    y0: usize,
) -> ImageF32 {
    ImageF32::from_fn(width, height, |x, y| {
        let inside = x >= x0 && x < x0 + patch.w && y >= y0 && y < y0 + patch.h;
        if inside {
            patch.get(x - x0, y - y0)
        } else {
            background
        }
    })
}
