//! Score aggregation and smoothing.
//!
//! This module turns a thread's history of per-category scores into the
//! two figures shown on the dashboard: an outlier-dampened point estimate
//! over a recent window and a recency-weighted trend over everything.
//! All functions are pure and total; empty input yields 0.

use crate::models::{Category, CategoryScores, CategoryWeights, DashboardSnapshot, Estimate, Reflection};
use tracing::debug;

/// Number of most recent values used for the point estimate.
pub const DEFAULT_WINDOW: usize = 10;

/// Default EMA smoothing factor.
pub const DEFAULT_EMA_ALPHA: f64 = 0.5;

/// Below this many values the point estimate is a plain mean.
pub const MIN_TRIM_COUNT: usize = 5;

const TRIM_FRACTION: f64 = 0.10;
const MEDIAN_BLEND: f64 = 0.6;
const MIN_ALPHA: f64 = 0.01;
const MAX_ALPHA: f64 = 0.99;

fn without_nan(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| !v.is_nan()).collect()
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

fn bounds(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        })
}

/// Arithmetic mean, 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median, 0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sorted = sorted(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Symmetric trimmed mean.
///
/// Drops `max(1, floor(n * fraction))` values from each end of the sorted
/// sequence, always leaving at least one value.
pub fn trimmed_mean(values: &[f64], fraction: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sorted = sorted(values);
    let n = sorted.len();
    let k = ((n as f64 * fraction.max(0.0)).floor() as usize)
        .max(1)
        .min((n - 1) / 2);
    mean(&sorted[k..n - k])
}

/// Outlier-dampened aggregate of a window of values.
///
/// Fewer than [`MIN_TRIM_COUNT`] values give the arithmetic mean. Otherwise
/// the result is the average of a 10% trimmed mean and a
/// `0.6 * median + 0.4 * mean` blend. The result always lies within the
/// input range and never decreases when any single input increases.
pub fn dampened_aggregate(values: &[f64]) -> f64 {
    let values = without_nan(values);
    if values.is_empty() {
        return 0.0;
    }
    let plain = mean(&values);
    if values.len() < MIN_TRIM_COUNT {
        return plain;
    }

    let trimmed = trimmed_mean(&values, TRIM_FRACTION);
    let blend = MEDIAN_BLEND * median(&values) + (1.0 - MEDIAN_BLEND) * plain;
    let (lo, hi) = bounds(&values);
    ((trimmed + blend) / 2.0).clamp(lo, hi)
}

/// Clamp a smoothing factor into the accepted range.
pub fn clamp_alpha(alpha: f64) -> f64 {
    if alpha.is_nan() {
        DEFAULT_EMA_ALPHA
    } else {
        alpha.clamp(MIN_ALPHA, MAX_ALPHA)
    }
}

/// Exponential moving average over a time-ordered sequence.
///
/// Seeds with the first value, then folds `alpha * v + (1 - alpha) * running`.
pub fn ema(values: &[f64], alpha: f64) -> f64 {
    let values = without_nan(values);
    let Some((first, rest)) = values.split_first() else {
        return 0.0;
    };
    let alpha = clamp_alpha(alpha);

    let running = rest
        .iter()
        .fold(*first, |running, v| alpha * v + (1.0 - alpha) * running);

    let (lo, hi) = bounds(&values);
    running.clamp(lo, hi)
}

/// Weighted composite of per-category scores. Missing categories count as 0.
pub fn rgi_from_categories(scores: &CategoryScores, weights: &CategoryWeights) -> f64 {
    Category::ALL
        .iter()
        .map(|c| weights.weight(*c) * scores.get(*c))
        .sum()
}

/// [`rgi_from_categories`] with the canonical weight table.
pub fn canonical_rgi(scores: &CategoryScores) -> f64 {
    rgi_from_categories(scores, &CategoryWeights::canonical())
}

fn estimate(series: &[f64], ema_alpha: f64, window: usize) -> Estimate {
    let tail = &series[series.len().saturating_sub(window)..];
    Estimate {
        point: dampened_aggregate(tail),
        trend: ema(series, ema_alpha),
    }
}

/// Dashboard figures using the default window.
pub fn compute_dashboard(reflections: &[Reflection], ema_alpha: f64) -> DashboardSnapshot {
    compute_dashboard_with(reflections, ema_alpha, DEFAULT_WINDOW)
}

/// Dashboard figures for the composite index and every category.
///
/// Reflections are ordered by timestamp (stable, so ties keep their
/// original order). Points use the last `window` values, trends use the
/// whole history.
pub fn compute_dashboard_with(
    reflections: &[Reflection],
    ema_alpha: f64,
    window: usize,
) -> DashboardSnapshot {
    if reflections.is_empty() {
        return DashboardSnapshot::empty();
    }

    let window = window.max(1);
    let mut ordered: Vec<&Reflection> = reflections.iter().collect();
    ordered.sort_by_key(|r| r.timestamp);

    let composite: Vec<f64> = ordered.iter().map(|r| r.rgi).collect();
    let categories = Category::ALL
        .iter()
        .map(|c| {
            let series: Vec<f64> = ordered.iter().map(|r| r.scores.get(*c)).collect();
            (*c, estimate(&series, ema_alpha, window))
        })
        .collect();

    debug!(
        "Dashboard over {} reflections (window {}, alpha {:.2})",
        ordered.len(),
        window,
        clamp_alpha(ema_alpha)
    );

    DashboardSnapshot {
        composite: estimate(&composite, ema_alpha, window),
        categories,
        count: ordered.len(),
    }
}
