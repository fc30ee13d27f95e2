use crate::error::{PatternError, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Index, Range};

/// A dense row-major 2D grid of `f32` values.
///
/// Used for the `U`/`V` concentration pair and for every field handed to
/// callers. Physical spacing is the caller's concern; a `Field` only knows
/// its shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FieldRepr")]
pub struct Field {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

/// Unchecked wire form; deserialization goes through [`Field::from_vec`].
#[derive(Deserialize)]
struct FieldRepr {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl TryFrom<FieldRepr> for Field {
    type Error = PatternError;

    fn try_from(repr: FieldRepr) -> Result<Self> {
        Field::from_vec(repr.rows, repr.cols, repr.data)
    }
}

impl Field {
    /// Creates a `rows x cols` field with every cell set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f32) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Wraps row-major `data` as a `rows x cols` field.
    ///
    /// ### Errors
    /// [`PatternError::InvalidConfig`] if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(PatternError::invalid_config(format!(
                "field data has {} values, expected {rows}x{cols}",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Builds a field by evaluating `f(row, col)` for every cell.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self { rows, cols, data }
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Overwrites the half-open rectangle `rows x cols` with `value`.
    ///
    /// Ranges are clipped to the grid, so a rectangle hanging off an edge
    /// only touches the cells that exist.
    pub fn fill_rect(&mut self, rows: Range<usize>, cols: Range<usize>, value: f32) {
        let r_end = rows.end.min(self.rows);
        let c_end = cols.end.min(self.cols);
        if cols.start >= c_end {
            return;
        }
        for r in rows.start..r_end {
            let base = r * self.cols;
            self.data[base + cols.start..base + c_end].fill(value);
        }
    }

    /// Smallest and largest cell value, or `None` for an empty field.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.data.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.data.iter().map(|&v| f64::from(v)).sum();
        (sum / self.data.len() as f64) as f32
    }
}

impl Index<(usize, usize)> for Field {
    type Output = f32;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &f32 {
        assert!(col < self.cols, "column {col} out of bounds ({})", self.cols);
        &self.data[row * self.cols + col]
    }
}
