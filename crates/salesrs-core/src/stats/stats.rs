use statrs::statistics::Statistics;

/// Mean absolute error. An empty input has no error to report and yields 0.
pub fn mae(y: &[f64], y_hat: &[f64]) -> Option<f64> {
    if y.len() != y_hat.len() {
        return None;
    }
    if y.is_empty() {
        return Some(0.0);
    }

    let sum_abs: f64 = y.iter().zip(y_hat.iter()).map(|(&yi, &yhi)| (yi - yhi).abs()).sum();

    Some(sum_abs / y.len() as f64)
}

pub fn rmse(y: &[f64], y_hat: &[f64]) -> Option<f64> {
    if y.len() != y_hat.len() {
        return None;
    }
    if y.is_empty() {
        return Some(0.0);
    }

    let sum_sq: f64 = y.iter().zip(y_hat.iter()).map(|(&yi, &yhi)| (yi - yhi).powi(2)).sum();

    Some((sum_sq / y.len() as f64).sqrt())
}

pub fn r2_from_predictions(y: &[f64], y_hat: &[f64]) -> Option<f64> {
    if y.len() != y_hat.len() || y.len() < 2 {
        return None;
    }

    let y_mean = y.mean();

    let ss_res: f64 = y.iter().zip(y_hat).map(|(&yi, &yhi)| (yi - yhi).powi(2)).sum();
    let ss_tot: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return None;
    }

    Some(1.0 - ss_res / ss_tot)
}
