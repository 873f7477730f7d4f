//! Dense row-major matrix storage.
//!
//! All simulation buffers are allocated once at their final shape and then
//! filled by index, so the layout never reallocates while a path is being
//! written.
//!
//! # Memory Layout
//!
//! Element `(i, j)` lives at `data[i * cols + j]`. Rows are contiguous
//! slices, which matches the time-major access pattern of the simulators.

use crate::error::{SimulationError, SimulationResult};

/// Dense `f64` matrix in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// Creates a `rows x cols` matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Creates an `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Creates a matrix from nested rows.
    ///
    /// An empty slice yields a `0 x 0` matrix. Rows of length zero are
    /// allowed and yield an `n x 0` matrix.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::ShapeMismatch`] if the rows are ragged.
    ///
    /// # Examples
    ///
    /// ```
    /// use synth_core::math::Matrix;
    ///
    /// let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
    /// assert_eq!(m.shape(), (2, 2));
    /// assert_eq!(m.get(1, 0), 3.0);
    ///
    /// assert!(Matrix::from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    /// ```
    pub fn from_rows(rows: &[Vec<f64>]) -> SimulationResult<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            if row.len() != n_cols {
                return Err(SimulationError::shape("matrix row", n_cols, row.len()));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            rows: n_rows,
            cols: n_cols,
        })
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Element at `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        debug_assert!(i < self.rows && j < self.cols);
        self.data[i * self.cols + j]
    }

    /// Sets the element at `(i, j)`.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        debug_assert!(i < self.rows && j < self.cols);
        self.data[i * self.cols + j] = value;
    }

    /// Row `i` as a contiguous slice.
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        let start = i * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Row `i` as a mutable slice.
    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        let start = i * self.cols;
        &mut self.data[start..start + self.cols]
    }

    /// Borrows row `i` immutably and row `i + 1` mutably.
    ///
    /// This is the access pattern of a forward recurrence: read step `t`,
    /// write step `t + 1`.
    ///
    /// # Panics
    ///
    /// Panics if `i + 1 >= rows`.
    #[inline]
    pub fn step_rows_mut(&mut self, i: usize) -> (&[f64], &mut [f64]) {
        assert!(i + 1 < self.rows, "row {} has no successor", i);
        let cols = self.cols;
        let (head, tail) = self.data.split_at_mut((i + 1) * cols);
        (&head[i * cols..], &mut tail[..cols])
    }

    /// Copies column `j` into a new vector.
    pub fn column(&self, j: usize) -> Vec<f64> {
        (0..self.rows).map(|i| self.get(i, j)).collect()
    }

    /// Iterates over rows as slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact panics on zero, and a zero-column matrix still has rows
        let cols = self.cols;
        (0..self.rows).map(move |i| &self.data[i * cols..(i + 1) * cols])
    }

    /// Underlying row-major buffer.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Computes `out = self * x`.
    ///
    /// A matrix with zero columns writes zeros.
    ///
    /// # Panics
    ///
    /// Panics if `x.len() != cols` or `out.len() != rows`.
    pub fn mul_vec_into(&self, x: &[f64], out: &mut [f64]) {
        assert_eq!(x.len(), self.cols, "vector length must equal column count");
        assert_eq!(out.len(), self.rows, "output length must equal row count");
        for (o, row) in out.iter_mut().zip(self.iter_rows()) {
            *o = row.iter().zip(x).map(|(a, b)| a * b).sum();
        }
    }
}
