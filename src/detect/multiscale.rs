//! Multi-scale sliding-window scan.
//!
//! The input is normalized once with the model's `(mean, std)`, then
//! repeatedly shrunk by `scale_factor`. At every level whose implied object
//! size lies in `[min_size, max_size]` one integral table is built and the
//! fixed window slides over it at `step_size`. Accepted windows are mapped
//! back by multiplying with the level scale, and NMS runs once over the
//! union of all levels.
use super::nms::{non_maximum_suppression, Detection};
use crate::cascade::{CascadeError, TrainedCascade};
use crate::diagnostics::{DetectionReport, ScaleReport, TimingBreakdown};
use crate::image::{resize_bilinear, ImageF32};
use crate::integral::IntegralImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectParams {
    pub window_size: usize,
    /// Pyramid shrink ratio between levels, must exceed 1.
    pub scale_factor: f64,
    pub step_size: usize,
    /// Smallest object size in input pixels.
    pub min_size: usize,
    /// Largest object size in input pixels; 0 means unbounded.
    pub max_size: usize,
    pub overlap_threshold: f32,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            window_size: 24,
            scale_factor: 1.2,
            step_size: 2,
            min_size: 24,
            max_size: 0,
            overlap_threshold: 0.3,
        }
    }
}

impl DetectParams {
    /// Replace values that would stall or break the scan with defaults.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut out = self.clone();
        if !(self.scale_factor.is_finite() && self.scale_factor > 1.0) {
            log::warn!(
                "scale factor {} must exceed 1, using {}",
                self.scale_factor,
                defaults.scale_factor
            );
            out.scale_factor = defaults.scale_factor;
        }
        if self.step_size == 0 {
            log::warn!("step size 0 is invalid, using 1");
            out.step_size = 1;
        }
        if self.window_size == 0 {
            log::warn!("window size 0 is invalid, using {}", defaults.window_size);
            out.window_size = defaults.window_size;
        }
        if !(0.0..=1.0).contains(&self.overlap_threshold) {
            log::warn!(
                "overlap threshold {} must lie in [0, 1], using {}",
                self.overlap_threshold,
                defaults.overlap_threshold
            );
            out.overlap_threshold = defaults.overlap_threshold;
        }
        out
    }

    fn accepts_size(&self, size: usize) -> bool {
        size >= self.min_size && (self.max_size == 0 || size <= self.max_size)
    }
}

/// One level of the detection pyramid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLevel {
    pub index: usize,
    pub scale: f64,
    pub width: usize,
    pub height: usize,
    /// Window size mapped back to input pixels.
    pub box_size: usize,
}

/// Pyramid levels scanned for an `image_w × image_h` input.
///
/// Levels smaller than `min_size` are skipped, the walk ends at the first
/// level above `max_size` or when the shrunk image no longer holds a window.
pub fn scale_levels(image_w: usize, image_h: usize, params: &DetectParams) -> Vec<ScaleLevel> {
    let window = params.window_size;
    let mut levels = Vec::new();
    if window == 0 || !params.scale_factor.is_finite() || params.scale_factor <= 1.0 {
        return levels;
    }
    let mut scale = 1.0f64;
    let mut index = 0;
    loop {
        let width = (image_w as f64 / scale) as usize;
        let height = (image_h as f64 / scale) as usize;
        if width < window || height < window {
            break;
        }
        let box_size = (window as f64 * scale) as usize;
        if params.max_size > 0 && box_size > params.max_size {
            break;
        }
        if params.accepts_size(box_size) {
            levels.push(ScaleLevel {
                index,
                scale,
                width,
                height,
                box_size,
            });
        }
        scale *= params.scale_factor;
        index += 1;
    }
    levels
}

#[derive(Clone, Debug)]
pub struct MultiScaleDetector {
    model: TrainedCascade,
    params: DetectParams,
}

impl MultiScaleDetector {
    /// Rejects a model that fails [`TrainedCascade::validate`].
    pub fn new(model: TrainedCascade, params: DetectParams) -> Result<Self, CascadeError> {
        model.validate()?;
        let mut params = params.sanitized();
        if params.window_size != model.window_size {
            log::warn!(
                "detection window {} differs from the trained window {}, using the trained one",
                params.window_size,
                model.window_size
            );
            params.window_size = model.window_size;
        }
        Ok(Self { model, params })
    }

    pub fn from_file(path: &Path, params: DetectParams) -> Result<Self, CascadeError> {
        Self::new(TrainedCascade::load(path)?, params)
    }

    pub fn model(&self) -> &TrainedCascade {
        &self.model
    }

    pub fn params(&self) -> &DetectParams {
        &self.params
    }

    /// Classify a single raw window of exactly the trained size.
    pub fn predict_window(&self, window: &ImageF32) -> bool {
        if window.w != self.params.window_size || window.h != self.params.window_size {
            return false;
        }
        let table = IntegralImage::<f64>::from_view(&self.model.normalization.apply(window));
        self.model.cascade.predict(&table)
    }

    /// Scan the raw image at its own resolution only, without NMS.
    pub fn detect_single_scale(&self, image: &ImageF32) -> Vec<Detection> {
        let normalized = self.model.normalization.apply(image);
        self.scan_scale(&normalized, 1.0).0
    }

    /// Full pyramid scan followed by NMS.
    pub fn detect_multi_scale(&self, image: &ImageF32) -> Vec<Detection> {
        self.detect_with_report(image).0
    }

    pub fn detect_with_report(&self, image: &ImageF32) -> (Vec<Detection>, DetectionReport) {
        let t_total = Instant::now();
        let mut timings = TimingBreakdown::default();
        let mut report = DetectionReport {
            image_width: image.w,
            image_height: image.h,
            scales: Vec::new(),
            raw_detections: 0,
            final_detections: 0,
            timings: TimingBreakdown::default(),
        };

        let window = self.params.window_size;
        if image.w < window || image.h < window {
            log::warn!(
                "image {}x{} is smaller than the {window}px window, nothing to scan",
                image.w,
                image.h
            );
            report.timings = TimingBreakdown::with_total(t_total.elapsed().as_secs_f64() * 1000.0);
            return (Vec::new(), report);
        }

        let t0 = Instant::now();
        let base = self.model.normalization.apply(image);
        timings.push("normalize", t0.elapsed().as_secs_f64() * 1000.0);

        let t_scan = Instant::now();
        let mut raw = Vec::new();
        for level in scale_levels(image.w, image.h, &self.params) {
            let t0 = Instant::now();
            let scaled = resize_bilinear(&base, level.width, level.height);
            let (found, windows) = self.scan_scale(&scaled, level.scale);
            let elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0;
            log::debug!(
                "scale {}: {}x{} for {}px objects, {} windows, {} candidates",
                level.index,
                level.width,
                level.height,
                level.box_size,
                windows,
                found.len()
            );
            report.scales.push(ScaleReport {
                scale: level.scale,
                width: level.width,
                height: level.height,
                box_size: level.box_size,
                windows_evaluated: windows,
                candidates: found.len(),
                elapsed_ms,
            });
            raw.extend(found);
        }
        timings.push("scan", t_scan.elapsed().as_secs_f64() * 1000.0);

        let t0 = Instant::now();
        let kept = non_maximum_suppression(&raw, self.params.overlap_threshold);
        timings.push("nms", t0.elapsed().as_secs_f64() * 1000.0);

        log::debug!("{} candidates, {} after NMS", raw.len(), kept.len());
        report.raw_detections = raw.len();
        report.final_detections = kept.len();
        timings.total_ms = t_total.elapsed().as_secs_f64() * 1000.0;
        report.timings = timings;
        (kept, report)
    }

    /// Slide the window over an already normalized image at one scale.
    ///
    /// Returns the accepted boxes in input-image coordinates and the number
    /// of windows evaluated.
    pub fn scan_scale(&self, normalized: &ImageF32, scale: f64) -> (Vec<Detection>, usize) {
        let window = self.params.window_size;
        if normalized.w < window || normalized.h < window {
            return (Vec::new(), 0);
        }
        let table = IntegralImage::<f64>::from_view(normalized);
        let step = self.params.step_size.max(1);
        let ys: Vec<usize> = (0..=normalized.h - window).step_by(step).collect();
        let xs: Vec<usize> = (0..=normalized.w - window).step_by(step).collect();
        let size = (window as f64 * scale) as usize;

        let scan_row = |&y: &usize| -> Vec<Detection> {
            xs.iter()
                .filter(|&&x| {
                    table
                        .window(x, y, window)
                        .is_some_and(|w| self.model.cascade.predict(&w))
                })
                .map(|&x| {
                    Detection::new(
                        (x as f64 * scale) as usize,
                        (y as f64 * scale) as usize,
                        size,
                        size,
                        1.0,
                    )
                })
                .collect()
        };

        #[cfg(feature = "parallel")]
        let rows: Vec<Vec<Detection>> = ys.par_iter().map(scan_row).collect();
        #[cfg(not(feature = "parallel"))]
        let rows: Vec<Vec<Detection>> = ys.iter().map(scan_row).collect();

        (rows.into_iter().flatten().collect(), xs.len() * ys.len())
    }
}
