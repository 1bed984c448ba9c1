//! Sliding-window detection over an image pyramid and non-maximum suppression.

pub mod multiscale;
pub mod nms;

pub use multiscale::{scale_levels, DetectParams, MultiScaleDetector, ScaleLevel};
pub use nms::{iou, non_maximum_suppression, Detection};
