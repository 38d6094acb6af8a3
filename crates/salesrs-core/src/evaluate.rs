use crate::stats::{mae, rmse, LinearModel};
use crate::table::{Table, TableError};

use log::{info, warn};
use std::fmt;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum EvalError {
    #[error("test data: {0}")]
    Table(#[from] TableError),
    #[error("{observed} observed values but {predicted} predictions")]
    LengthMismatch { observed: usize, predicted: usize },
}

/// Observed and predicted values for every test row, with the aggregate errors.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub observed: Vec<f64>,
    pub predicted: Vec<f64>,
    pub mae: f64,
    pub rmse: f64,
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MAE = {:.2}", self.mae)
    }
}

impl Evaluation {
    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    pub fn abs_errors(&self) -> impl Iterator<Item = f64> + '_ {
        self.observed.iter().zip(&self.predicted).map(|(y, y_hat)| (y - y_hat).abs())
    }
}

/// Apply `model` to every row of `test` and score it against the model's
/// observed column. An empty test table scores 0.
pub fn evaluate(model: &LinearModel, test: &Table) -> Result<Evaluation, EvalError> {
    let observed = test.column(model.observed())?.to_vec();
    let predicted = model.predict_table(test)?;

    let mismatch =
        || EvalError::LengthMismatch { observed: observed.len(), predicted: predicted.len() };
    let mae = mae(&observed, &predicted).ok_or_else(mismatch)?;
    let rmse = rmse(&observed, &predicted).ok_or_else(mismatch)?;

    if observed.is_empty() {
        warn!("No test rows, reporting MAE = 0");
    } else {
        info!("Evaluated {} test rows: MAE {:.4}, RMSE {:.4}", observed.len(), mae, rmse);
    }
    Ok(Evaluation { observed, predicted, mae, rmse })
}
