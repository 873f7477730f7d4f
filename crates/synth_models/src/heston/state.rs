use synth_core::math::Matrix;

/// Simulated prices and variances, each `(T+1) x N`.
///
/// Row 0 holds the initial conditions; row `t+1` is the state after step
/// `t`.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetPathState {
    prices: Matrix,
    variances: Matrix,
}

impl AssetPathState {
    pub(crate) fn new(prices: Matrix, variances: Matrix) -> Self {
        debug_assert_eq!(prices.shape(), variances.shape());
        Self { prices, variances }
    }

    #[inline]
    pub fn prices(&self) -> &Matrix {
        &self.prices
    }

    #[inline]
    pub fn variances(&self) -> &Matrix {
        &self.variances
    }

    /// Number of simulated steps T (rows minus the initial row).
    #[inline]
    pub fn steps(&self) -> usize {
        self.prices.rows().saturating_sub(1)
    }

    #[inline]
    pub fn num_assets(&self) -> usize {
        self.prices.cols()
    }

    /// Last row of prices.
    pub fn final_prices(&self) -> &[f64] {
        self.prices.row(self.prices.rows() - 1)
    }

    /// Last row of variances.
    pub fn final_variances(&self) -> &[f64] {
        self.variances.row(self.variances.rows() - 1)
    }
}
