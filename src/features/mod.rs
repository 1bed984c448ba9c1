//! Haar-like rectangle features evaluated on summed-area tables.
//!
//! A [`Feature`] is a plain value: a [`FeatureKind`] tag plus the anchor and
//! size of the rectangle inside the training window. Each kind expands into a
//! fixed [`CornerTable`] of table corners with `±1` coefficients, and
//! [`Feature::evaluate`] is a single loop over that table, so the hot
//! per-sample, per-feature path does not dispatch on trait objects.
//!
//! Sign conventions (a rectangle with sign `s` adds `s · sum(rect)`):
//! - `TwoH`: left half minus right half.
//! - `TwoV`: bottom half minus top half.
//! - `ThreeH` / `ThreeV`: middle third minus both outer thirds.
//! - `Four`: diagonal quadrants (top-left, bottom-right) minus the others.
//!
//! Kinds split their rectangle with integer division, so callers should only
//! build features whose size is a multiple of [`FeatureKind::unit`];
//! [`generate`] only produces such features.

pub mod generate;

use crate::integral::SumTable;
use serde::{Deserialize, Serialize};

pub use generate::{
    create_all_features, create_features_of_kind, create_features_with_shape, locations_for,
    shapes_for,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureKind {
    TwoH,
    TwoV,
    ThreeH,
    ThreeV,
    Four,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 5] = [
        FeatureKind::TwoV,
        FeatureKind::TwoH,
        FeatureKind::ThreeV,
        FeatureKind::ThreeH,
        FeatureKind::Four,
    ];

    /// Minimal `(width, height)` block of the pattern.
    pub const fn unit(self) -> (u32, u32) {
        match self {
            FeatureKind::TwoH => (2, 1),
            FeatureKind::TwoV => (1, 2),
            FeatureKind::ThreeH => (3, 1),
            FeatureKind::ThreeV => (1, 3),
            FeatureKind::Four => (2, 2),
        }
    }
}

/// Haar feature anchored at `(x, y)` inside the detection window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Feature {
    pub kind: FeatureKind,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Corner {
    pub x: u32,
    pub y: u32,
    pub coeff: i8,
}

/// Up to 16 signed corners (four rectangles × four corners).
#[derive(Clone, Copy, Debug)]
pub struct CornerTable {
    corners: [Corner; 16],
    len: usize,
}

impl CornerTable {
    fn new() -> Self {
        Self {
            corners: [Corner::default(); 16],
            len: 0,
        }
    }

    fn push_rect(&mut self, x: u32, y: u32, w: u32, h: u32, sign: i8) {
        for (cx, cy, c) in [
            (x, y, sign),
            (x + w, y, -sign),
            (x, y + h, -sign),
            (x + w, y + h, sign),
        ] {
            self.corners[self.len] = Corner { x: cx, y: cy, coeff: c };
            self.len += 1;
        }
    }

    pub fn as_slice(&self) -> &[Corner] {
        &self.corners[..self.len]
    }
}

impl Feature {
    pub const fn new(kind: FeatureKind, x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            kind,
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the feature lies entirely inside a `window × window` region.
    pub fn fits(&self, window: usize) -> bool {
        (self.x + self.width) as usize <= window && (self.y + self.height) as usize <= window
    }

    pub fn corners(&self) -> CornerTable {
        let Feature {
            x,
            y,
            width: w,
            height: h,
            ..
        } = *self;
        let mut t = CornerTable::new();
        match self.kind {
            FeatureKind::TwoH => {
                let hw = w / 2;
                t.push_rect(x, y, hw, h, 1);
                t.push_rect(x + hw, y, hw, h, -1);
            }
            FeatureKind::TwoV => {
                let hh = h / 2;
                t.push_rect(x, y, w, hh, -1);
                t.push_rect(x, y + hh, w, hh, 1);
            }
            FeatureKind::ThreeH => {
                let tw = w / 3;
                t.push_rect(x, y, tw, h, -1);
                t.push_rect(x + tw, y, tw, h, 1);
                t.push_rect(x + 2 * tw, y, tw, h, -1);
            }
            FeatureKind::ThreeV => {
                let th = h / 3;
                t.push_rect(x, y, w, th, -1);
                t.push_rect(x, y + th, w, th, 1);
                t.push_rect(x, y + 2 * th, w, th, -1);
            }
            FeatureKind::Four => {
                let (hw, hh) = (w / 2, h / 2);
                t.push_rect(x, y, hw, hh, 1);
                t.push_rect(x + hw, y, hw, hh, -1);
                t.push_rect(x, y + hh, hw, hh, -1);
                t.push_rect(x + hw, y + hh, hw, hh, 1);
            }
        }
        t
    }

    /// Signed rectangle-sum combination of this feature over `table`.
    #[inline]
    pub fn evaluate<S: SumTable + ?Sized>(&self, table: &S) -> f32 {
        let corners = self.corners();
        let mut acc = 0.0f64;
        for c in corners.as_slice() {
            acc += c.coeff as f64 * table.corner(c.x as usize, c.y as usize);
        }
        acc as f32
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?}{{x={},y={},width={},height={}}}",
            self.kind, self.x, self.y, self.width, self.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageF32;
    use crate::integral::IntegralImage;

    fn table(img: &ImageF32) -> IntegralImage<f64> {
        IntegralImage::from_view(img)
    }

    #[test]
    fn two_h_is_left_minus_right() {
        // 4×2 region: left half 10, right half 3
        let img = ImageF32::from_fn(4, 2, |x, _| if x < 2 { 10.0 } else { 3.0 });
        let f = Feature::new(FeatureKind::TwoH, 0, 0, 4, 2);
        assert_eq!(f.evaluate(&table(&img)), (10.0 - 3.0) * 4.0);
    }

    #[test]
    fn two_v_is_bottom_minus_top() {
        let img = ImageF32::from_fn(3, 4, |_, y| if y < 2 { 5.0 } else { 1.0 });
        let f = Feature::new(FeatureKind::TwoV, 0, 0, 3, 4);
        assert_eq!(f.evaluate(&table(&img)), (1.0 - 5.0) * 6.0);
    }

    #[test]
    fn three_rect_features_favor_the_middle_band() {
        let img = ImageF32::from_fn(6, 6, |x, _| if (2..4).contains(&x) { 4.0 } else { 1.0 });
        let h = Feature::new(FeatureKind::ThreeH, 0, 0, 6, 6);
        assert_eq!(h.evaluate(&table(&img)), 4.0 * 12.0 - 2.0 * 12.0);

        let img_v = ImageF32::from_fn(6, 6, |_, y| if (2..4).contains(&y) { 4.0 } else { 1.0 });
        let v = Feature::new(FeatureKind::ThreeV, 0, 0, 6, 6);
        assert_eq!(v.evaluate(&table(&img_v)), 4.0 * 12.0 - 2.0 * 12.0);
    }

    #[test]
    fn four_is_diagonal_minus_off_diagonal() {
        let img = ImageF32::from_fn(4, 4, |x, y| match (x < 2, y < 2) {
            (true, true) => 1.0,
            (false, true) => 2.0,
            (true, false) => 3.0,
            (false, false) => 7.0,
        });
        let f = Feature::new(FeatureKind::Four, 0, 0, 4, 4);
        assert_eq!(f.evaluate(&table(&img)), 4.0 * (1.0 - 2.0 - 3.0 + 7.0));
    }

    #[test]
    fn offset_feature_only_sees_its_rectangle() {
        let img = ImageF32::from_fn(6, 6, |x, y| (x * 6 + y) as f32);
        let f = Feature::new(FeatureKind::TwoH, 2, 1, 2, 3);
        let expected: f32 = (1..4).map(|y| img.get(2, y) - img.get(3, y)).sum();
        assert_eq!(f.evaluate(&table(&img)), expected);
    }

    #[test]
    fn window_evaluation_matches_cropped_sample() {
        let big = ImageF32::from_fn(10, 10, |x, y| ((x * 3 + y * 5) % 7) as f32);
        let crop = ImageF32::from_fn(4, 4, |x, y| big.get(x + 5, y + 3));
        let big_table = table(&big);
        let window = big_table.window(5, 3, 4).expect("inside");
        for kind in FeatureKind::ALL {
            let (uw, uh) = kind.unit();
            let f = Feature::new(kind, 0, 0, uw * (4 / uw), uh * (4 / uh));
            let a = f.evaluate(&window);
            let b = f.evaluate(&table(&crop));
            assert!((a - b).abs() < 1e-4, "{kind:?}: {a} vs {b}");
        }
    }
}
