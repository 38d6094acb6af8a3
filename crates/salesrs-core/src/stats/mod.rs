pub mod fiterror;
pub mod olsreg;
pub mod stats;

pub use fiterror::{FitError, FitResult};
pub use olsreg::{LinearModel, RankPolicy, Regression};
pub use stats::{mae, r2_from_predictions, rmse};
