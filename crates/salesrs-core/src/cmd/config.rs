use crate::csv_parse::{load_table, ParseError, WriteError};
use crate::evaluate::{evaluate, EvalError, Evaluation};
use crate::hist_plot::{
    histogram_path, BitmapHistogram, HistogramRenderer, PlotError, HIST_BINS, PLOT_DPI,
    PLOT_INCHES,
};
use crate::split::{Split, SplitRatio};
use crate::stats::{FitError, LinearModel, RankPolicy, Regression};
use crate::table::{Table, TableError};

use log::info;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

pub const INPUT_CSV: &str = "data/Advertising.csv";
pub const TRAIN_CSV: &str = "data/train.csv";
pub const TEST_CSV: &str = "data/test.csv";
pub const IMAGES_DIR: &str = "images";
pub const PREDICTORS: [&str; 3] = ["TV", "Radio", "Newspaper"];
pub const RESPONSE: &str = "Sales";

/* =================== Public configuration types =================== */

/// Every path and parameter the pipeline uses. `Default` gives the fixed
/// advertising analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub input: PathBuf,
    pub train_out: PathBuf,
    pub test_out: PathBuf,
    pub images_dir: PathBuf,
    pub split: SplitRatio,
    pub hist_bins: usize,
    pub plot_inches: f64,
    pub plot_dpi: u32,
    pub predictors: Vec<String>,
    pub response: String,
    pub rank_policy: RankPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(INPUT_CSV),
            train_out: PathBuf::from(TRAIN_CSV),
            test_out: PathBuf::from(TEST_CSV),
            images_dir: PathBuf::from(IMAGES_DIR),
            split: SplitRatio::default(),
            hist_bins: HIST_BINS,
            plot_inches: PLOT_INCHES,
            plot_dpi: PLOT_DPI,
            predictors: PREDICTORS.iter().map(|p| p.to_string()).collect(),
            response: RESPONSE.to_owned(),
            rank_policy: RankPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Visualize,
    Split,
    Train,
    Evaluate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Visualize => "visualize",
            Stage::Split => "split",
            Stage::Train => "train",
            Stage::Evaluate => "evaluate",
        };
        write!(f, "{name}")
    }
}

/* =================== Error type (no process::exit) =================== */

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("load: {0}")]
    Load(#[source] ParseError),
    #[error("{stage}: could not create directory {}: {source}", .path.display())]
    OutputDir { stage: Stage, path: PathBuf, source: std::io::Error },
    #[error("visualize: column '{column}': {source}")]
    Visualize { column: String, source: PlotError },
    #[error("split: {0}")]
    Split(#[source] TableError),
    #[error("split: {0}")]
    Persist(#[source] WriteError),
    #[error("{stage}: {source}")]
    Reload { stage: Stage, source: ParseError },
    #[error("train: {0}")]
    Train(#[source] FitError),
    #[error("evaluate: {0}")]
    Evaluate(#[source] EvalError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Load(_) => Stage::Load,
            PipelineError::OutputDir { stage, .. } => *stage,
            PipelineError::Visualize { .. } => Stage::Visualize,
            PipelineError::Split(_) | PipelineError::Persist(_) => Stage::Split,
            PipelineError::Reload { stage, .. } => *stage,
            PipelineError::Train(_) => Stage::Train,
            PipelineError::Evaluate(_) => Stage::Evaluate,
        }
    }
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct Report {
    pub rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub histograms: Vec<PathBuf>,
    pub model: LinearModel,
    pub evaluation: Evaluation,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Regression Formula: {}", self.model)?;
        write!(f, "{}", self.evaluation)
    }
}

/* =================== Entry point =================== */

impl Config {
    /// The default analysis with every relative path resolved under `root`.
    pub fn in_dir(root: &Path) -> Self {
        let base = Self::default();
        Self {
            input: root.join(&base.input),
            train_out: root.join(&base.train_out),
            test_out: root.join(&base.test_out),
            images_dir: root.join(&base.images_dir),
            ..base
        }
    }

    pub fn renderer(&self) -> BitmapHistogram {
        BitmapHistogram { bins: self.hist_bins, size_inches: self.plot_inches, dpi: self.plot_dpi }
    }

    pub fn regression(&self) -> Regression {
        Regression::new(&self.response)
            .with_vars(&self.predictors)
            .with_rank_policy(self.rank_policy)
    }

    pub fn run(&self) -> Result<Report, PipelineError> {
        self.run_with(&self.renderer())
    }

    /// Run every stage in order, stopping at the first failure.
    pub fn run_with<R: HistogramRenderer + ?Sized>(
        &self,
        renderer: &R,
    ) -> Result<Report, PipelineError> {
        let table = load_table(&self.input).map_err(PipelineError::Load)?;
        info!("Loaded {} from {}", table, self.input.display());

        let histograms = self.plot_histograms(&table, renderer)?;

        let split = Split::from_table(&table, self.split).map_err(PipelineError::Split)?;
        for out in [&self.train_out, &self.test_out] {
            if let Some(parent) = out.parent() {
                ensure_dir(parent, Stage::Split)?;
            }
        }
        split.persist(&self.train_out, &self.test_out).map_err(PipelineError::Persist)?;

        let train = load_table(&self.train_out)
            .map_err(|source| PipelineError::Reload { stage: Stage::Train, source })?;
        let model = self.regression().train(&train).map_err(PipelineError::Train)?;
        info!("Fitted on {} rows: {}", model.n_obs(), model);
        if let Some(r2) = model.r2() {
            info!("Training R2 = {:.4}", r2);
        }

        let test = load_table(&self.test_out)
            .map_err(|source| PipelineError::Reload { stage: Stage::Evaluate, source })?;
        let evaluation = evaluate(&model, &test).map_err(PipelineError::Evaluate)?;

        Ok(Report {
            rows: table.nrows(),
            train_rows: train.nrows(),
            test_rows: test.nrows(),
            histograms,
            model,
            evaluation,
        })
    }

    fn plot_histograms<R: HistogramRenderer + ?Sized>(
        &self,
        table: &Table,
        renderer: &R,
    ) -> Result<Vec<PathBuf>, PipelineError> {
        ensure_dir(&self.images_dir, Stage::Visualize)?;

        let mut written = Vec::with_capacity(table.ncols());
        for (name, values) in table.iter_columns() {
            let path = histogram_path(&self.images_dir, name);
            renderer.render(name, values, &path).map_err(|source| PipelineError::Visualize {
                column: name.to_owned(),
                source,
            })?;
            info!("Saved histogram {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

fn ensure_dir(dir: &Path, stage: Stage) -> Result<(), PipelineError> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| PipelineError::OutputDir {
        stage,
        path: dir.to_path_buf(),
        source,
    })?;
    info!("Created directory {}", dir.display());
    Ok(())
}
