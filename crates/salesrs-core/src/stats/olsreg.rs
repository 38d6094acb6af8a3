use crate::stats::fiterror::{FitError, FitResult};
use crate::stats::stats::r2_from_predictions;
use crate::table::{Table, TableError};

use log::debug;
use nalgebra::{DMatrix, DVector};
use std::fmt;

/// What to do when the design matrix does not have full column rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankPolicy {
    /// Refuse to fit.
    #[default]
    Fail,
    /// Return the minimum-norm least squares solution; directions with a zero
    /// singular value get zero weight.
    MinimumNorm,
}

/// An unfitted multivariate regression: the observed column and the bound
/// predictor names, in order.
#[derive(Debug, Clone, Default)]
pub struct Regression {
    observed: String,
    vars: Vec<String>,
    rank_policy: RankPolicy,
}

impl Regression {
    pub fn new(observed: &str) -> Self {
        Self { observed: observed.to_owned(), vars: Vec::new(), rank_policy: RankPolicy::Fail }
    }

    pub fn with_var(mut self, name: &str) -> Self {
        self.vars.push(name.to_owned());
        self
    }

    pub fn with_vars<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.vars.extend(names.into_iter().map(|n| n.as_ref().to_owned()));
        self
    }

    pub fn with_rank_policy(mut self, policy: RankPolicy) -> Self {
        self.rank_policy = policy;
        self
    }

    pub fn observed(&self) -> &str {
        &self.observed
    }

    pub fn vars(&self) -> &[String] {
        &self.vars
    }

    /// Ordinary least squares over every row of `table`.
    ///
    /// Solves `[1 | X] b = y` through an SVD of the design matrix. The rank is
    /// taken relative to the largest singular value, scaled by
    /// `max(rows, cols) * f64::EPSILON`.
    pub fn train(&self, table: &Table) -> FitResult<LinearModel> {
        if self.vars.is_empty() {
            return Err(FitError::NoVariables);
        }

        let y = column_or_missing(table, &self.observed)?;
        let xs: Vec<&[f64]> =
            self.vars.iter().map(|v| column_or_missing(table, v)).collect::<FitResult<_>>()?;

        let n = table.nrows();
        let p = self.vars.len() + 1;
        if n < p {
            return Err(FitError::NotEnoughRows { rows: n, needed: p });
        }
        if y.iter().chain(xs.iter().flat_map(|x| x.iter())).any(|v| !v.is_finite()) {
            return Err(FitError::NonFinite);
        }

        let design = DMatrix::from_fn(n, p, |i, j| if j == 0 { 1.0 } else { xs[j - 1][i] });
        let target = DVector::from_column_slice(y);

        let svd = design.clone().svd(true, true);
        let max_sv = svd.singular_values.max();
        let tol = max_sv * (n.max(p) as f64) * f64::EPSILON;
        let rank = svd.rank(tol);
        debug!("OLS design {}x{}, rank {}, largest singular value {:.4e}", n, p, rank, max_sv);

        if rank < p && self.rank_policy == RankPolicy::Fail {
            return Err(FitError::RankDeficient { rank, needed: p });
        }

        let beta = svd.solve(&target, tol).map_err(FitError::Solver)?;
        if beta.iter().any(|b| !b.is_finite()) {
            return Err(FitError::NonFinite);
        }

        let fitted = &design * &beta;
        let r2 = r2_from_predictions(y, fitted.as_slice());

        Ok(LinearModel {
            observed: self.observed.clone(),
            vars: self.vars.clone(),
            intercept: beta[0],
            coefficients: beta.iter().skip(1).copied().collect(),
            r2,
            n_obs: n,
        })
    }
}

fn column_or_missing<'a>(table: &'a Table, name: &str) -> FitResult<&'a [f64]> {
    table.column(name).map_err(|_| FitError::MissingColumn(name.to_owned()))
}

/// A fitted model: `observed = intercept + Σ coefficient_i * var_i`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    observed: String,
    vars: Vec<String>,
    intercept: f64,
    coefficients: Vec<f64>,
    r2: Option<f64>,
    n_obs: usize,
}

impl fmt::Display for LinearModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Predicted = {:.4}", self.intercept)?;
        for (name, coeff) in self.vars.iter().zip(&self.coefficients) {
            write!(f, " + {}*{:.2}", name, coeff)?;
        }
        Ok(())
    }
}

impl LinearModel {
    /// A model from known coefficients, one per variable in `vars`.
    pub fn from_parts(
        observed: &str,
        vars: &[&str],
        intercept: f64,
        coefficients: &[f64],
    ) -> FitResult<Self> {
        if vars.len() != coefficients.len() {
            return Err(FitError::LengthMismatch { got: coefficients.len(), expected: vars.len() });
        }
        Ok(Self {
            observed: observed.to_owned(),
            vars: vars.iter().map(|v| v.to_string()).collect(),
            intercept,
            coefficients: coefficients.to_vec(),
            r2: None,
            n_obs: 0,
        })
    }

    pub fn observed(&self) -> &str {
        &self.observed
    }

    pub fn variables(&self) -> &[String] {
        &self.vars
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.vars.iter().position(|v| v == name).map(|i| self.coefficients[i])
    }

    /// R² on the training rows, if the observed column had any variance.
    pub fn r2(&self) -> Option<f64> {
        self.r2
    }

    /// Rows the model was trained on.
    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    pub fn predict(&self, x: &[f64]) -> FitResult<f64> {
        if x.len() != self.coefficients.len() {
            return Err(FitError::LengthMismatch { got: x.len(), expected: self.coefficients.len() });
        }
        Ok(self.calculate(x))
    }

    fn calculate(&self, x: &[f64]) -> f64 {
        self.intercept + self.coefficients.iter().zip(x).map(|(c, xi)| c * xi).sum::<f64>()
    }

    /// Predictions for every row of `table`, looking the variables up by name.
    pub fn predict_table(&self, table: &Table) -> Result<Vec<f64>, TableError> {
        let xs: Vec<&[f64]> =
            self.vars.iter().map(|v| table.column(v)).collect::<Result<_, _>>()?;

        let predictions = (0..table.nrows())
            .map(|i| {
                let row: Vec<f64> = xs.iter().map(|col| col[i]).collect();
                self.calculate(&row)
            })
            .collect();
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const VARS: [&str; 3] = ["x1", "x2", "x3"];

    fn synthetic(n: usize, mut noise: impl FnMut() -> f64) -> Table {
        let x1: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let x2: Vec<f64> = (0..n).map(|i| ((i * i) % 13) as f64).collect();
        let x3: Vec<f64> = (0..n).map(|i| (i as f64 * 0.7).sin() * 5.0).collect();
        let y: Vec<f64> = (0..n)
            .map(|i| 5.0 + 2.0 * x1[i] + 0.5 * x2[i] - 1.0 * x3[i] + noise())
            .collect();
        Table::new(
            vec!["x1".into(), "x2".into(), "x3".into(), "y".into()],
            vec![x1, x2, x3, y],
        )
        .unwrap()
    }

    #[test]
    fn test_recovers_exact_model() {
        let table = synthetic(40, || 0.0);
        let model = Regression::new("y").with_vars(VARS).train(&table).unwrap();

        assert_abs_diff_eq!(model.intercept(), 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(model.coefficient("x1").unwrap(), 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(model.coefficient("x2").unwrap(), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(model.coefficient("x3").unwrap(), -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(model.r2().unwrap(), 1.0, epsilon = 1e-9);
        assert_eq!(model.n_obs(), 40);
    }

    #[test]
    fn test_recovers_model_with_noise() {
        let mut rng = StdRng::seed_from_u64(7);
        let table = synthetic(200, || rng.random::<f64>() * 0.1 - 0.05);
        let model = Regression::new("y").with_vars(VARS).train(&table).unwrap();

        assert_abs_diff_eq!(model.intercept(), 5.0, epsilon = 0.05);
        assert_abs_diff_eq!(model.coefficient("x1").unwrap(), 2.0, epsilon = 1e-3);
        assert_abs_diff_eq!(model.coefficient("x2").unwrap(), 0.5, epsilon = 0.01);
        assert_abs_diff_eq!(model.coefficient("x3").unwrap(), -1.0, epsilon = 0.01);
        assert!(model.r2().unwrap() > 0.999);
    }

    #[test]
    fn test_collinear_predictors_fail() {
        let x1: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let x2: Vec<f64> = x1.iter().map(|v| 2.0 * v).collect();
        let y: Vec<f64> = x1.iter().map(|v| 1.0 + v).collect();
        let table =
            Table::new(vec!["x1".into(), "x2".into(), "y".into()], vec![x1, x2, y]).unwrap();

        let res = Regression::new("y").with_var("x1").with_var("x2").train(&table);
        assert_eq!(res, Err(FitError::RankDeficient { rank: 2, needed: 3 }));
    }

    #[test]
    fn test_minimum_norm_ignores_zero_columns() {
        let x1: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let zeros = vec![0.0; 8];
        let y: Vec<f64> = x1.iter().map(|v| 3.0 + v).collect();
        let table = Table::new(
            vec!["x1".into(), "x2".into(), "x3".into(), "y".into()],
            vec![x1, zeros.clone(), zeros, y],
        )
        .unwrap();

        let reg = Regression::new("y").with_vars(VARS);
        assert!(matches!(reg.train(&table), Err(FitError::RankDeficient { rank: 2, needed: 4 })));

        let model = reg.with_rank_policy(RankPolicy::MinimumNorm).train(&table).unwrap();
        assert_abs_diff_eq!(model.intercept(), 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(model.coefficient("x1").unwrap(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(model.coefficient("x2").unwrap(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(model.coefficient("x3").unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_not_enough_rows() {
        let table = synthetic(3, || 0.0);
        let res = Regression::new("y").with_vars(VARS).train(&table);
        assert_eq!(res, Err(FitError::NotEnoughRows { rows: 3, needed: 4 }));
    }

    #[test]
    fn test_empty_training_table() {
        let table = synthetic(0, || 0.0);
        let res = Regression::new("y").with_vars(VARS).train(&table);
        assert_eq!(res, Err(FitError::NotEnoughRows { rows: 0, needed: 4 }));
    }

    #[test]
    fn test_missing_columns() {
        let table = synthetic(10, || 0.0);
        let res = Regression::new("Sales").with_vars(VARS).train(&table);
        assert_eq!(res, Err(FitError::MissingColumn("Sales".to_owned())));
        let res = Regression::new("y").with_var("TV").train(&table);
        assert_eq!(res, Err(FitError::MissingColumn("TV".to_owned())));
    }

    #[test]
    fn test_no_variables() {
        let table = synthetic(10, || 0.0);
        assert_eq!(Regression::new("y").train(&table), Err(FitError::NoVariables));
    }

    #[test]
    fn test_predict() {
        let model = LinearModel::from_parts("y", &["a", "b"], 1.0, &[2.0, -0.5]).unwrap();
        assert_eq!(model.predict(&[3.0, 4.0]), Ok(5.0));
        assert_eq!(model.predict(&[3.0]), Err(FitError::LengthMismatch { got: 1, expected: 2 }));
    }

    #[test]
    fn test_predict_table_by_name() {
        let model = LinearModel::from_parts("y", &["b", "a"], 1.0, &[10.0, 1.0]).unwrap();
        let table =
            Table::new(vec!["a".into(), "b".into()], vec![vec![1., 2.], vec![0.5, 0.25]]).unwrap();
        assert_eq!(model.predict_table(&table).unwrap(), vec![7.0, 5.5]);

        let other = Table::new(vec!["a".into()], vec![vec![1.]]).unwrap();
        assert_eq!(model.predict_table(&other), Err(TableError::MissingColumn("b".to_owned())));
    }

    #[test]
    fn test_formula() {
        let model = LinearModel::from_parts(
            "Sales",
            &["TV", "Radio", "Newspaper"],
            3.05252,
            &[0.0469, 0.1793, 0.0024],
        )
        .unwrap();
        assert_eq!(
            model.to_string(),
            "Predicted = 3.0525 + TV*0.05 + Radio*0.18 + Newspaper*0.00"
        );
    }

    #[test]
    fn test_from_parts_rejects_mismatched_coefficients() {
        let res = LinearModel::from_parts("y", &["a", "b"], 0.0, &[1.0]);
        assert_eq!(res, Err(FitError::LengthMismatch { got: 1, expected: 2 }));
    }
}
