//! Labelled training windows and the pixel normalization they share with
//! inference.
//!
//! Windows are normalized with a single global `(mean, std)` estimated over
//! every pixel of every sample; the same two scalars are stored with the
//! trained model and applied to images before detection.

pub mod prepare;

use crate::image::ImageF32;
use crate::integral::IntegralImage;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Standard deviations below this are treated as zero.
pub const MIN_STD: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParams {
    pub mean: f32,
    pub std: f32,
}

impl Default for NormalizationParams {
    fn default() -> Self {
        Self { mean: 0.0, std: 1.0 }
    }
}

impl NormalizationParams {
    /// Population mean and standard deviation over every pixel of every
    /// window. A near-zero deviation is replaced by `1.0`.
    pub fn estimate<'a, I>(windows: I) -> Self
    where
        I: IntoIterator<Item = &'a ImageF32>,
    {
        let windows: Vec<&ImageF32> = windows.into_iter().collect();
        let count: usize = windows.iter().map(|w| w.data.len()).sum();
        if count == 0 {
            return Self::default();
        }
        let n = count as f64;
        let mean = windows
            .iter()
            .flat_map(|w| w.data.iter())
            .map(|&v| v as f64)
            .sum::<f64>()
            / n;
        let var = windows
            .iter()
            .flat_map(|w| w.data.iter())
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        let std = var.sqrt() as f32;
        let std = if std < MIN_STD {
            log::warn!("sample std {std} is too small, using 1.0 instead");
            1.0
        } else {
            std
        };
        Self {
            mean: mean as f32,
            std,
        }
    }

    pub fn apply(&self, img: &ImageF32) -> ImageF32 {
        img.normalized(self.mean, self.std)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SampleError {
    WrongWindowSize {
        index: usize,
        width: usize,
        height: usize,
        window: usize,
    },
    NoSamples,
}

impl std::fmt::Display for SampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleError::WrongWindowSize {
                index,
                width,
                height,
                window,
            } => write!(
                f,
                "sample {index} is {width}x{height}, expected {window}x{window}"
            ),
            SampleError::NoSamples => write!(f, "no samples supplied"),
        }
    }
}

impl std::error::Error for SampleError {}

/// Normalized, integrated training windows with `1.0`/`0.0` labels.
///
/// Positives come first, then negatives.
#[derive(Clone, Debug)]
pub struct SampleSet {
    window_size: usize,
    samples: Vec<IntegralImage<f64>>,
    labels: Vec<f32>,
    normalization: NormalizationParams,
}

impl SampleSet {
    /// Estimate normalization over all windows, then normalize and integrate.
    pub fn from_windows(
        positives: &[ImageF32],
        negatives: &[ImageF32],
        window_size: usize,
    ) -> Result<Self, SampleError> {
        let normalization = NormalizationParams::estimate(positives.iter().chain(negatives));
        Self::from_windows_with(positives, negatives, window_size, normalization)
    }

    /// Like [`from_windows`](Self::from_windows) with fixed normalization,
    /// for evaluating held-out data against a trained model.
    pub fn from_windows_with(
        positives: &[ImageF32],
        negatives: &[ImageF32],
        window_size: usize,
        normalization: NormalizationParams,
    ) -> Result<Self, SampleError> {
        let all: Vec<&ImageF32> = positives.iter().chain(negatives).collect();
        if all.is_empty() {
            return Err(SampleError::NoSamples);
        }
        for (index, w) in all.iter().enumerate() {
            if w.w != window_size || w.h != window_size {
                return Err(SampleError::WrongWindowSize {
                    index,
                    width: w.w,
                    height: w.h,
                    window: window_size,
                });
            }
        }
        let samples = all
            .iter()
            .map(|w| IntegralImage::from_view(&normalization.apply(w)))
            .collect();
        let labels = std::iter::repeat(1.0)
            .take(positives.len())
            .chain(std::iter::repeat(0.0).take(negatives.len()))
            .collect();
        log::debug!(
            "sample set: {} positives, {} negatives, mean={:.4} std={:.4}",
            positives.len(),
            negatives.len(),
            normalization.mean,
            normalization.std
        );
        Ok(Self {
            window_size,
            samples,
            labels,
            normalization,
        })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[IntegralImage<f64>] {
        &self.samples
    }

    pub fn labels(&self) -> &[f32] {
        &self.labels
    }

    pub fn normalization(&self) -> NormalizationParams {
        self.normalization
    }

    pub fn positive_count(&self) -> usize {
        self.labels
            .iter()
            .filter(|&&y| crate::boost::is_positive(y))
            .count()
    }

    pub fn negative_count(&self) -> usize {
        self.len() - self.positive_count()
    }
}

/// Clamp a requested sample count to what is available, warning on shortfall.
pub fn clamp_request(requested: usize, available: usize, what: &str) -> usize {
    if requested > available {
        log::warn!("requested {requested} {what} samples but only {available} available");
        available
    } else {
        requested
    }
}

/// Pick `count` distinct items at random, in random order.
pub fn select_samples<T: Clone>(items: &[T], count: usize, rng: &mut StdRng) -> Vec<T> {
    items
        .choose_multiple(rng, count.min(items.len()))
        .cloned()
        .collect()
}
