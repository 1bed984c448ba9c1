//! Summed-area tables (integral images) with O(1) rectangle sums.
//!
//! Layout
//! - For a `W × H` source the table stores `(W + 1) × (H + 1)` entries in
//!   row-major order. Row 0 and column 0 are zero, and entry `(x, y)` holds
//!   the sum of all source pixels with column `< x` and row `< y`.
//! - The recurrence `I[y,x] = src[y-1,x-1] + I[y-1,x] + I[y,x-1] - I[y-1,x-1]`
//!   is evaluated with the subtraction last, which keeps unsigned scalars from
//!   wrapping.
//!
//! [`IntegralWindow`] exposes a fixed square sub-window of a larger table
//! through the same [`SumTable`] interface, so Haar features are evaluated
//! identically on training samples and on detection windows.
use crate::image::ImageView;
use std::ops::{Add, Sub};

/// Scalar types a summed-area table can accumulate in.
pub trait IntegralScalar:
    Copy + Default + PartialEq + Send + Sync + 'static + Add<Output = Self> + Sub<Output = Self>
{
    fn to_f64(self) -> f64;
}

macro_rules! impl_integral_scalar {
    ($($t:ty),*) => {
        $(impl IntegralScalar for $t {
            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }
        })*
    };
}

impl_integral_scalar!(u32, u64, i32, i64, f32, f64);

/// Corner lookup shared by full tables and windows into them.
pub trait SumTable {
    /// Width and height of the covered source region in pixels.
    fn extent(&self) -> (usize, usize);
    /// Table entry at corner `(x, y)` with `x <= width`, `y <= height`.
    fn corner(&self, x: usize, y: usize) -> f64;
}

/// Rejection reasons when building a table from a nested grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntegralError {
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl std::fmt::Display for IntegralError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegralError::RaggedRows {
                row,
                expected,
                found,
            } => write!(
                f,
                "non-rectangular grid: row {row} has {found} columns, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for IntegralError {}

#[derive(Clone, Debug, PartialEq)]
pub struct IntegralImage<T> {
    w: usize,
    h: usize,
    data: Vec<T>,
}

impl<T: IntegralScalar> IntegralImage<T> {
    /// Build the table from any image view whose pixels widen into `T`.
    pub fn from_view<I>(img: &I) -> Self
    where
        I: ImageView,
        I::Pixel: Into<T>,
    {
        let (w, h) = (img.width(), img.height());
        let mut table = Self::zeroed(w, h);
        for y in 0..h {
            table.accumulate_row(y, img.row(y).iter().map(|&p| p.into()));
        }
        table
    }

    /// Build the table from a nested row-major grid, rejecting ragged input.
    pub fn from_grid<P>(rows: &[Vec<P>]) -> Result<Self, IntegralError>
    where
        P: Copy + Into<T>,
    {
        let h = rows.len();
        let w = rows.first().map_or(0, Vec::len);
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != w) {
            return Err(IntegralError::RaggedRows {
                row,
                expected: w,
                found: r.len(),
            });
        }
        let mut table = Self::zeroed(w, h);
        for (y, row) in rows.iter().enumerate() {
            table.accumulate_row(y, row.iter().map(|&p| p.into()));
        }
        Ok(table)
    }

    fn zeroed(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![T::default(); (w + 1) * (h + 1)],
        }
    }

    fn accumulate_row(&mut self, y: usize, pixels: impl Iterator<Item = T>) {
        let stride = self.w + 1;
        let (prev, cur) = self.data.split_at_mut((y + 1) * stride);
        let prev = &prev[y * stride..];
        for (x, px) in pixels.enumerate() {
            // up + left first, diagonal last
            cur[x + 1] = px + prev[x + 1] + cur[x] - prev[x];
        }
    }

    /// Source width in pixels (the table is one wider).
    pub fn width(&self) -> usize {
        self.w
    }

    /// Source height in pixels (the table is one taller).
    pub fn height(&self) -> usize {
        self.h
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> T {
        self.data[y * (self.w + 1) + x]
    }

    /// Sum of source pixels in the half-open box `[x1, x2) × [y1, y2)`.
    #[inline]
    pub fn rect_sum(&self, x1: usize, y1: usize, x2: usize, y2: usize) -> T {
        self.at(x2, y2) + self.at(x1, y1) - self.at(x2, y1) - self.at(x1, y2)
    }

    /// Borrow the `size × size` window whose top-left source pixel is `(x, y)`.
    pub fn window(&self, x: usize, y: usize, size: usize) -> Option<IntegralWindow<'_, T>> {
        (x + size <= self.w && y + size <= self.h).then_some(IntegralWindow {
            table: self,
            x0: x,
            y0: y,
            size,
        })
    }
}

impl<T: IntegralScalar> SumTable for IntegralImage<T> {
    fn extent(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    #[inline]
    fn corner(&self, x: usize, y: usize) -> f64 {
        self.at(x, y).to_f64()
    }
}

/// Square view into a larger table. Corner `(0, 0)` maps to the table entry
/// at the window origin, so rectangle sums inside the window are exact.
#[derive(Clone, Copy, Debug)]
pub struct IntegralWindow<'a, T> {
    table: &'a IntegralImage<T>,
    x0: usize,
    y0: usize,
    size: usize,
}

impl<T: IntegralScalar> IntegralWindow<'_, T> {
    pub fn origin(&self) -> (usize, usize) {
        (self.x0, self.y0)
    }
}

impl<T: IntegralScalar> SumTable for IntegralWindow<'_, T> {
    fn extent(&self) -> (usize, usize) {
        (self.size, self.size)
    }

    #[inline]
    fn corner(&self, x: usize, y: usize) -> f64 {
        self.table.at(self.x0 + x, self.y0 + y).to_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageF32;

    fn grid(w: usize, h: usize) -> Vec<Vec<u8>> {
        (0..h)
            .map(|y| (0..w).map(|x| ((x * 7 + y * 3) % 11) as u8).collect())
            .collect()
    }

    #[test]
    fn border_is_zero_and_total_matches_pixel_sum() {
        let rows = grid(5, 4);
        let table: IntegralImage<u32> = IntegralImage::from_grid(&rows).expect("rectangular");
        for x in 0..=5 {
            assert_eq!(table.at(x, 0), 0);
        }
        for y in 0..=4 {
            assert_eq!(table.at(0, y), 0);
        }
        let total: u32 = rows.iter().flatten().map(|&p| p as u32).sum();
        assert_eq!(table.rect_sum(0, 0, 5, 4), total);
    }

    #[test]
    fn rect_sum_matches_brute_force() {
        let rows = grid(6, 6);
        let table: IntegralImage<i64> = IntegralImage::from_grid(&rows).expect("rectangular");
        for (x1, y1, x2, y2) in [(0, 0, 1, 1), (1, 2, 4, 6), (3, 0, 6, 3), (2, 2, 2, 5)] {
            let mut expected = 0i64;
            for row in rows.iter().take(y2).skip(y1) {
                for &p in row.iter().take(x2).skip(x1) {
                    expected += p as i64;
                }
            }
            assert_eq!(table.rect_sum(x1, y1, x2, y2), expected, "box {x1},{y1}-{x2},{y2}");
        }
    }

    #[test]
    fn float_and_integer_tables_agree() {
        let img = ImageF32::from_fn(7, 3, |x, y| (x + 2 * y) as f32);
        let ft: IntegralImage<f64> = IntegralImage::from_view(&img);
        let rows: Vec<Vec<i32>> = (0..3)
            .map(|y| (0..7).map(|x| (x + 2 * y) as i32).collect())
            .collect();
        let it: IntegralImage<i64> = IntegralImage::from_grid(&rows).expect("rectangular");
        for y in 0..=3 {
            for x in 0..=7 {
                assert_eq!(ft.at(x, y), it.at(x, y) as f64);
            }
        }
    }

    #[test]
    fn ragged_grid_is_rejected() {
        let rows = vec![vec![1u8, 2, 3], vec![4u8, 5]];
        let err = IntegralImage::<u32>::from_grid(&rows).unwrap_err();
        assert_eq!(
            err,
            IntegralError::RaggedRows {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn window_rect_sums_match_the_parent_table() {
        let rows = grid(8, 8);
        let table: IntegralImage<u64> = IntegralImage::from_grid(&rows).expect("rectangular");
        let win = table.window(3, 2, 4).expect("inside");
        let inside = win.corner(4, 4) + win.corner(1, 1) - win.corner(4, 1) - win.corner(1, 4);
        assert_eq!(inside, table.rect_sum(4, 3, 7, 6) as f64);
        assert!(table.window(5, 5, 4).is_none());
    }
}
