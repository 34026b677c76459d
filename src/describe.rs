//! Descriptive statistics over numeric columns.

use serde::Serialize;

/// Count, spread and quartiles of a numeric column (nulls dropped).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1). Zero for fewer than two values.
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Central tendency of a duration column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Most frequent value; the smallest one when several tie.
    pub mode: f64,
    pub min: f64,
    pub max: f64,
}

/// Summarize the non-null values. Returns `None` when there are none.
pub fn describe<I>(values: I) -> Option<Summary>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let sorted = sorted_values(values);
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let mean = mean(&sorted);
    let std = if n > 1 {
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    } else {
        0.0
    };

    Some(Summary {
        count: n,
        mean,
        std,
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[n - 1],
    })
}

/// Mean/median/mode/range of the non-null values.
pub fn duration_stats<I>(values: I) -> Option<DurationStats>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let sorted = sorted_values(values);
    if sorted.is_empty() {
        return None;
    }
    Some(DurationStats {
        count: sorted.len(),
        mean: mean(&sorted),
        median: quantile(&sorted, 0.5),
        mode: mode(&sorted),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
    })
}

/// Arithmetic mean of the non-null values.
pub fn mean_of<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let vals: Vec<f64> = values.into_iter().flatten().collect();
    if vals.is_empty() { None } else { Some(mean(&vals)) }
}

fn sorted_values<I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut vals: Vec<f64> = values.into_iter().flatten().filter(|v| v.is_finite()).collect();
    vals.sort_by(|a, b| a.total_cmp(b));
    vals
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Linear-interpolated quantile of sorted, non-empty data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Smallest most-frequent value of sorted, non-empty data.
fn mode(sorted: &[f64]) -> f64 {
    let mut best = sorted[0];
    let mut best_run = 0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        // Strictly greater keeps the smallest value on ties
        if j - i > best_run {
            best_run = j - i;
            best = sorted[i];
        }
        i = j;
    }
    best
}
