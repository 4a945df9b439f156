//! Ridge linear regression solved through the normal equations.

use super::error::ModelError;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

const PIVOT_EPSILON: f64 = 1e-12;

/// A fitted ridge regression model.
///
/// The intercept is not penalized: features and target are centered before
/// solving `(XᵀX + αI) w = Xᵀy`, and the intercept is recovered from the
/// means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidgeRegression {
    alpha: f64,
    intercept: f64,
    coefficients: Vec<f64>,
}

impl RidgeRegression {
    /// Fits the model.
    ///
    /// `alpha` must be finite and strictly positive; one-hot encoded columns
    /// are collinear with the intercept and the unpenalized system is
    /// singular.
    pub fn fit(
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
        alpha: f64,
    ) -> Result<Self, ModelError> {
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(ModelError::InvalidParameter(format!(
                "ridge alpha must be positive, got {alpha}"
            )));
        }
        let (rows, cols) = x.dim();
        if rows == 0 {
            return Err(ModelError::EmptyData("cannot fit on zero rows".to_string()));
        }
        if y.len() != rows {
            return Err(ModelError::FeatureMismatch {
                expected: rows,
                got: y.len(),
            });
        }

        let x_mean = x
            .mean_axis(Axis(0))
            .ok_or_else(|| ModelError::EmptyData("cannot fit on zero rows".to_string()))?;
        let y_mean = y.sum() / rows as f64;

        let centered = &x - &x_mean;
        let y_centered = y.mapv(|v| v - y_mean);

        let mut gram = centered.t().dot(&centered);
        for i in 0..cols {
            gram[[i, i]] += alpha;
        }
        let rhs = centered.t().dot(&y_centered);

        let weights = solve(gram, rhs)?;
        let intercept = y_mean - x_mean.dot(&weights);

        Ok(Self {
            alpha,
            intercept,
            coefficients: weights.to_vec(),
        })
    }

    /// Penalty the model was fitted with.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    #[must_use]
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Number of input features.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Predicts every row of `x`.
    pub fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
        if x.ncols() != self.n_features() {
            return Err(ModelError::FeatureMismatch {
                expected: self.n_features(),
                got: x.ncols(),
            });
        }
        let weights = ArrayView1::from(self.coefficients.as_slice());
        Ok(x.dot(&weights) + self.intercept)
    }

    /// Predicts a single feature row.
    pub fn predict_row(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.n_features() {
            return Err(ModelError::FeatureMismatch {
                expected: self.n_features(),
                got: row.len(),
            });
        }
        Ok(self.intercept
            + row
                .iter()
                .zip(&self.coefficients)
                .map(|(x, w)| x * w)
                .sum::<f64>())
    }
}

/// Solves `a · w = b` by Gaussian elimination with partial pivoting.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>, ModelError> {
    let n = b.len();

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))
            .unwrap_or(col);
        let pivot = a[[pivot_row, col]];
        if pivot.abs() < PIVOT_EPSILON || !pivot.is_finite() {
            return Err(ModelError::SingularMatrix {
                column: col,
                pivot: pivot.abs(),
            });
        }
        if pivot_row != col {
            for k in 0..n {
                a.swap([col, k], [pivot_row, k]);
            }
            b.swap(col, pivot_row);
        }

        for row in (col + 1)..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut w = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[[row, k]] * w[k]).sum();
        w[row] = (b[row] - tail) / a[[row, row]];
    }
    Ok(w)
}
