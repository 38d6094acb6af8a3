use log::debug;
use plotters::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};

pub const HIST_BINS: usize = 16;
pub const PLOT_INCHES: f64 = 5.0;
pub const PLOT_DPI: u32 = 96;

#[derive(thiserror::Error, Debug)]
pub enum PlotError {
    #[error("histogram needs at least one bin")]
    NoBins,
    #[error("no values to plot")]
    EmptyColumn,
    #[error("non-finite value in column")]
    NonFinite,
    #[error("failed rendering {}: {msg}", .path.display())]
    Render { path: PathBuf, msg: String },
}

/// Equal-width, density-normalized histogram: the bar areas sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub min: f64,
    pub width: f64,
    pub counts: Vec<usize>,
    pub densities: Vec<f64>,
}

impl Histogram {
    /// Bins span `[min, max]` of the data; the maximum lands in the last bin.
    /// A constant column is spread over a unit range centred on its value.
    pub fn from_values(values: &[f64], bins: usize) -> Result<Self, PlotError> {
        if bins == 0 {
            return Err(PlotError::NoBins);
        }
        if values.is_empty() {
            return Err(PlotError::EmptyColumn);
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(PlotError::NonFinite);
        }

        let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max == min {
            min -= 0.5;
            max += 0.5;
        }
        let width = (max - min) / bins as f64;

        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - min) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        let n = values.len() as f64;
        let densities = counts.iter().map(|&c| c as f64 / (n * width)).collect();

        Ok(Self { min, width, counts, densities })
    }

    pub fn range(&self) -> (f64, f64) {
        (self.min, self.min + self.width * self.counts.len() as f64)
    }

    pub fn max_density(&self) -> f64 {
        self.densities.iter().copied().fold(0.0, f64::max)
    }

    /// `(left edge, right edge, density)` per bin.
    pub fn bars(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.densities.iter().enumerate().map(move |(i, &d)| {
            let left = self.min + i as f64 * self.width;
            (left, left + self.width, d)
        })
    }

    pub fn area(&self) -> f64 {
        self.densities.iter().map(|d| d * self.width).sum()
    }
}

/// Anything that can turn one column into a histogram image at `path`.
pub trait HistogramRenderer {
    fn render(&self, column: &str, values: &[f64], path: &Path) -> Result<(), PlotError>;
}

/// `<dir>/<column>_histogram.png`
pub fn histogram_path(dir: &Path, column: &str) -> PathBuf {
    dir.join(format!("{column}_histogram.png"))
}

fn render_err(path: &Path, e: impl fmt::Display) -> PlotError {
    PlotError::Render { path: path.to_path_buf(), msg: e.to_string() }
}

/// Square PNG histogram drawn with the plotters bitmap backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitmapHistogram {
    pub bins: usize,
    pub size_inches: f64,
    pub dpi: u32,
}

impl Default for BitmapHistogram {
    fn default() -> Self {
        Self { bins: HIST_BINS, size_inches: PLOT_INCHES, dpi: PLOT_DPI }
    }
}

impl fmt::Display for BitmapHistogram {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "BitmapHistogram({} bins, {}px)", self.bins, self.pixels())
    }
}

impl BitmapHistogram {
    pub fn pixels(&self) -> u32 {
        (self.size_inches * self.dpi as f64).round() as u32
    }
}

impl HistogramRenderer for BitmapHistogram {
    fn render(&self, column: &str, values: &[f64], path: &Path) -> Result<(), PlotError> {
        let hist = Histogram::from_values(values, self.bins)?;

        let px = self.pixels();
        let root_area = BitMapBackend::new(path, (px, px)).into_drawing_area();
        root_area.fill(&WHITE).map_err(|e| render_err(path, e))?;

        let (xmin, xmax) = hist.range();
        let ymax = hist.max_density() * 1.05;
        let mut ctx = ChartBuilder::on(&root_area)
            .caption(format!("Histogram of {column}"), ("sans-serif", 20).into_font())
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(50)
            .build_cartesian_2d(xmin..xmax, 0f64..ymax)
            .map_err(|e| render_err(path, e))?;

        ctx.configure_mesh().disable_mesh().draw().map_err(|e| render_err(path, e))?;

        let bar_col = RGBColor(105, 139, 213);
        ctx.draw_series(
            hist.bars().map(|(l, r, d)| Rectangle::new([(l, 0.0), (r, d)], bar_col.filled())),
        )
        .map_err(|e| render_err(path, e))?;
        ctx.draw_series(
            hist.bars().map(|(l, r, d)| Rectangle::new([(l, 0.0), (r, d)], BLACK.stroke_width(1))),
        )
        .map_err(|e| render_err(path, e))?;

        root_area.present().map_err(|e| render_err(path, e))?;
        debug!("Rendered {} to {}", column, path.display());
        Ok(())
    }
}
