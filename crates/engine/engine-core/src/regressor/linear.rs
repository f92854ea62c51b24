//! Linear autoregression over a fixed window
//!
//! Fits `y = intercept + sum(coefficients[j] * window[j])` by ridge-regularized
//! ordinary least squares. The normal equations are solved with Gaussian
//! elimination and partial pivoting; the intercept is not penalized.

use engine_api::{EngineError, Result, SequenceRegressor, TrainingSet};
use serde::{Deserialize, Serialize};

/// Pivot magnitude below which the system is treated as singular.
const SINGULAR_EPSILON: f64 = 1e-14;

/// Linear autoregressive sequence regressor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearAutoregressor {
    /// L2 penalty on the coefficients
    ridge: f64,
    /// One weight per window position, oldest first
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearAutoregressor {
    pub fn new(ridge: f64) -> Result<Self> {
        if !ridge.is_finite() || ridge < 0.0 {
            return Err(EngineError::invalid_parameter(
                "ridge",
                "must be finite and non-negative",
            ));
        }
        Ok(Self {
            ridge,
            coefficients: Vec::new(),
            intercept: 0.0,
        })
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl SequenceRegressor for LinearAutoregressor {
    fn name(&self) -> &str {
        "linear"
    }

    fn fit(&mut self, training: &TrainingSet) -> Result<()> {
        if training.is_empty() {
            return Err(EngineError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }

        // Augmented design row: [1, w_0, ..., w_{W-1}]
        let dim = training.window_size() + 1;
        let mut gram = vec![vec![0.0; dim]; dim];
        let mut rhs = vec![0.0; dim];

        for (window, &target) in training.windows().iter().zip(training.targets()) {
            let row: Vec<f64> = std::iter::once(1.0).chain(window.iter().copied()).collect();
            for i in 0..dim {
                rhs[i] += row[i] * target;
                for j in i..dim {
                    gram[i][j] += row[i] * row[j];
                }
            }
        }
        for i in 0..dim {
            for j in 0..i {
                gram[i][j] = gram[j][i];
            }
            if i > 0 {
                gram[i][i] += self.ridge;
            }
        }

        let solution = solve(gram, rhs)?;
        self.intercept = solution[0];
        self.coefficients = solution[1..].to_vec();
        Ok(())
    }

    fn predict(&self, window: &[f64]) -> Result<f64> {
        if self.coefficients.is_empty() {
            return Err(EngineError::NotFitted);
        }
        if window.len() != self.coefficients.len() {
            return Err(EngineError::invalid_parameter(
                "window",
                format!(
                    "expected {} values, got {}",
                    self.coefficients.len(),
                    window.len()
                ),
            ));
        }
        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(window)
                .map(|(c, x)| c * x)
                .sum::<f64>())
    }

    fn input_size(&self) -> Option<usize> {
        (!self.coefficients.is_empty()).then_some(self.coefficients.len())
    }
}

/// Solve `a * x = b` in place.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&r, &s| a[r][col].abs().total_cmp(&a[s][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < SINGULAR_EPSILON {
            return Err(EngineError::Regressor(
                "singular normal equations; increase the ridge penalty".to_string(),
            ));
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(EngineError::Regressor(
            "least squares solution is not finite".to_string(),
        ));
    }
    Ok(x)
}
