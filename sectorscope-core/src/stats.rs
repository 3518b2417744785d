//! Descriptive statistics over columns that may contain gaps.
//!
//! Pure functions: values in, scalars out. Missing entries are skipped, never
//! treated as zero.

use serde::{Deserialize, Serialize};

/// count / mean / sample standard deviation / min / max of the present values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Describe {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (N-1). `None` with fewer than two values.
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Describe {
    /// Describe the present values of a column.
    pub fn of(values: &[Option<f64>]) -> Self {
        let present: Vec<f64> = values.iter().filter_map(|v| *v).collect();
        Self::of_present(&present)
    }

    /// Describe a slice with no gaps.
    pub fn of_present(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        Self {
            count: values.len(),
            mean: Some(mean(values)),
            std: sample_std(values),
            min: values.iter().copied().reduce(f64::min),
            max: values.iter().copied().reduce(f64::max),
        }
    }

    /// Round every statistic to `decimals` places.
    pub fn rounded(self, decimals: u32) -> Self {
        let r = |v: Option<f64>| v.map(|x| round_to(x, decimals));
        Self {
            count: self.count,
            mean: r(self.mean),
            std: r(self.std),
            min: r(self.min),
            max: r(self.max),
        }
    }
}

/// Arithmetic mean. Returns 0.0 for an empty slice; callers guard emptiness.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation with the N-1 denominator.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let var = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Round half away from zero to `decimals` places.
///
/// Values that round to zero come back as `+0.0`, so they print as `0`.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor + 0.0
}
