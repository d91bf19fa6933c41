//! Matrix sources for 2D views.
//!
//! The view only needs bin lookups by integer coordinate and the maximum
//! intensity; [`DenseMatrix`] is the in-memory implementation used by the
//! file readers and tests.

use std::sync::Arc;

use crate::util::i64_to_index;

/// Read-only 2D grid of non-negative intensities.
///
/// Bin `(x, y)` is centred on data coordinate `(x, y)` and covers
/// `[x - 0.5, x + 0.5) × [y - 0.5, y + 0.5)`.
pub trait Matrix: Sync {
    /// Number of bins along X.
    fn width(&self) -> usize;

    /// Number of bins along Y.
    fn height(&self) -> usize;

    /// Content of bin `(x, y)`, or `0.0` if the bin is out of range.
    fn bin_content(&self, x: i64, y: i64) -> f64;

    /// Largest bin content.
    fn maximum(&self) -> f64;

    /// Whether `(x, y)` addresses a bin of this matrix.
    fn contains(&self, x: i64, y: i64) -> bool {
        i64_to_index(x, self.width()).is_some() && i64_to_index(y, self.height()).is_some()
    }
}

impl<M: Matrix + ?Sized> Matrix for &M {
    fn width(&self) -> usize {
        (**self).width()
    }

    fn height(&self) -> usize {
        (**self).height()
    }

    fn bin_content(&self, x: i64, y: i64) -> f64 {
        (**self).bin_content(x, y)
    }

    fn maximum(&self) -> f64 {
        (**self).maximum()
    }
}

impl<M: Matrix + Send + ?Sized> Matrix for Arc<M> {
    fn width(&self) -> usize {
        (**self).width()
    }

    fn height(&self) -> usize {
        (**self).height()
    }

    fn bin_content(&self, x: i64, y: i64) -> f64 {
        (**self).bin_content(x, y)
    }

    fn maximum(&self) -> f64 {
        (**self).maximum()
    }
}

/// A dense 2D histogram stored in row-major order.
///
/// Data is stored as `data[y * width + x]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    /// Flattened bin contents.
    data: Vec<f64>,

    /// Width in bins (X dimension).
    width: usize,

    /// Height in bins (Y dimension).
    height: usize,

    /// Cached maximum bin content.
    maximum: f64,
}

impl DenseMatrix {
    /// Create an empty matrix with the given dimensions.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: vec![0.0; width * height],
            width,
            height,
            maximum: 0.0,
        }
    }

    /// Create a matrix by evaluating `f(x, y)` for every bin.
    #[must_use]
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(sanitize(f(x, y)));
            }
        }
        let maximum = max_of(&data);
        Self {
            data,
            width,
            height,
            maximum,
        }
    }

    /// Wrap row-major bin contents.
    ///
    /// Returns `None` if `data.len() != width * height`.
    #[must_use]
    pub fn from_vec(width: usize, height: usize, mut data: Vec<f64>) -> Option<Self> {
        if width.checked_mul(height)? != data.len() {
            return None;
        }
        for value in &mut data {
            *value = sanitize(*value);
        }
        let maximum = max_of(&data);
        Some(Self {
            data,
            width,
            height,
            maximum,
        })
    }

    /// Get the content at a specific bin.
    #[must_use]
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }

    /// Set the content of a bin; out-of-range bins are ignored.
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            let old = self.data[idx];
            let value = sanitize(value);
            self.data[idx] = value;
            if value >= self.maximum {
                self.maximum = value;
            } else if old >= self.maximum {
                self.maximum = max_of(&self.data);
            }
        }
    }

    /// Increment the count at a specific bin.
    #[inline]
    pub fn increment(&mut self, x: usize, y: usize) {
        if let Some(value) = self.get(x, y) {
            self.set(x, y, value + 1.0);
        }
    }

    /// Row-major bin contents.
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Sum of all bin contents.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.data.iter().sum()
    }
}

impl Matrix for DenseMatrix {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn bin_content(&self, x: i64, y: i64) -> f64 {
        match (i64_to_index(x, self.width), i64_to_index(y, self.height)) {
            (Some(x), Some(y)) => self.data[y * self.width + x],
            _ => 0.0,
        }
    }

    fn maximum(&self) -> f64 {
        self.maximum
    }
}

/// Intensities are non-negative; NaN and negative inputs become zero.
fn sanitize(value: f64) -> f64 {
    if value.is_nan() || value < 0.0 {
        0.0
    } else {
        value
    }
}

fn max_of(data: &[f64]) -> f64 {
    data.iter().copied().fold(0.0, f64::max)
}
