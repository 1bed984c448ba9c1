use serde::{Deserialize, Serialize};

/// Axis-aligned box in input-image pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub confidence: f32,
}

impl Detection {
    pub fn new(x: usize, y: usize, width: usize, height: usize, confidence: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
        }
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// `[x, y, width, height]`, the layout used by the drawing helpers.
    pub fn as_rect(&self) -> [usize; 4] {
        [self.x, self.y, self.width, self.height]
    }
}

/// Intersection over union; disjoint or degenerate boxes score 0.
pub fn iou(a: &Detection, b: &Detection) -> f32 {
    let x1 = a.x.max(b.x);
    let y1 = a.y.max(b.y);
    let x2 = (a.x + a.width).min(b.x + b.width);
    let y2 = (a.y + a.height).min(b.y + b.height);
    let inter = x2.saturating_sub(x1) * y2.saturating_sub(y1);
    let union = a.area() + b.area() - inter;
    if union == 0 {
        return 0.0;
    }
    inter as f32 / union as f32
}

/// Greedy suppression in descending confidence order.
///
/// A detection is dropped when its IoU with an already kept one exceeds
/// `overlap_threshold`. Equal confidences keep their input order.
pub fn non_maximum_suppression(detections: &[Detection], overlap_threshold: f32) -> Vec<Detection> {
    let mut sorted = detections.to_vec();
    sorted.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut suppressed = vec![false; sorted.len()];
    let mut kept = Vec::new();
    for i in 0..sorted.len() {
        if suppressed[i] {
            continue;
        }
        kept.push(sorted[i]);
        for j in i + 1..sorted.len() {
            if !suppressed[j] && iou(&sorted[i], &sorted[j]) > overlap_threshold {
                suppressed[j] = true;
            }
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iou_of_half_shifted_boxes() {
        let a = Detection::new(0, 0, 10, 10, 1.0);
        let b = Detection::new(5, 5, 10, 10, 0.5);
        assert!((iou(&a, &b) - 25.0 / 175.0).abs() < 1e-6);
        assert_eq!(iou(&a, &a), 1.0);
        assert_eq!(iou(&a, &Detection::new(20, 0, 5, 5, 1.0)), 0.0);
        assert_eq!(iou(&a, &Detection::new(10, 0, 5, 5, 1.0)), 0.0, "touching edges");
    }

    #[test]
    fn higher_confidence_wins() {
        let low = Detection::new(0, 0, 10, 10, 0.2);
        let high = Detection::new(1, 1, 10, 10, 0.9);
        let kept = non_maximum_suppression(&[low, high], 0.3);
        assert_eq!(kept, vec![high]);
    }

    #[test]
    fn empty_input() {
        assert!(non_maximum_suppression(&[], 0.3).is_empty());
    }
}
