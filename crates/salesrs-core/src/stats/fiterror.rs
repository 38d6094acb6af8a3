use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    MissingColumn(String),
    NoVariables,
    LengthMismatch { got: usize, expected: usize },
    NotEnoughRows { rows: usize, needed: usize },
    RankDeficient { rank: usize, needed: usize },
    NonFinite, // NaN or inf in the inputs or the solution
    Solver(&'static str),
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitError::MissingColumn(name) => {
                write!(f, "no column named '{name}' in training data")
            },
            FitError::NoVariables => {
                write!(f, "no predictor variables set")
            },
            FitError::LengthMismatch { got, expected } => {
                write!(f, "got {got} predictor values, model has {expected} variables")
            },
            FitError::NotEnoughRows { rows, needed } => {
                write!(f, "not enough rows: got {rows}, need at least {needed}")
            },
            FitError::RankDeficient { rank, needed } => {
                write!(f, "predictor matrix is rank-deficient: rank {rank}, need {needed}")
            },
            FitError::NonFinite => {
                write!(f, "non-finite value in regression")
            },
            FitError::Solver(msg) => write!(f, "least squares solve failed: {msg}"),
        }
    }
}

impl std::error::Error for FitError {}

pub type FitResult<T> = Result<T, FitError>;
