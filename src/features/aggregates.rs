//! Whole-batch aggregate statistics, recomputed fresh for every request.
//!
//! Derived feature scale therefore depends on batch composition; nothing
//! here is a fitted baseline. All helpers skip NaN the way the source
//! columns use it for missing values.

use crate::merge::MergedRecord;

/// Maximum over non-NaN values; NaN when none exist.
pub fn nan_max(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut best = f64::NAN;
    for v in values {
        if v.is_nan() {
            continue;
        }
        if best.is_nan() || v > best {
            best = v;
        }
    }
    best
}

/// Mean over non-NaN values; NaN when none exist.
pub fn nan_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        if v.is_nan() {
            continue;
        }
        sum += v;
        count += 1;
    }
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Linearly interpolated quantile over non-NaN values; NaN when none exist.
/// `q` is in [0, 1].
pub fn nan_quantile(values: impl IntoIterator<Item = f64>, q: f64) -> f64 {
    let mut xs: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if xs.is_empty() {
        return f64::NAN;
    }
    xs.sort_by(f64::total_cmp);
    let pos = q.clamp(0.0, 1.0) * (xs.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        xs[lo]
    } else {
        xs[lo] + (xs[hi] - xs[lo]) * (pos - lo as f64)
    }
}

/// The batch-level statistics the per-row formulas need.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchAggregates {
    pub os_changes_max: f64,
    pub device_changes_max: f64,
    pub avg_interval_mean: f64,
    pub logins_7d_q05: f64,
    pub logins_7d_q75: f64,
    pub logins_7d_q95: f64,
    pub acceleration_q95: f64,
}

impl BatchAggregates {
    pub fn compute(batch: &[MergedRecord]) -> Self {
        let os = || batch.iter().map(|r| r.pattern_value(|p| p.monthly_os_changes));
        let device = || {
            batch
                .iter()
                .map(|r| r.pattern_value(|p| p.monthly_phone_model_changes))
        };
        let avg_interval = || {
            batch
                .iter()
                .map(|r| r.pattern_value(|p| p.avg_login_interval_30d))
        };
        let logins_7d = || batch.iter().map(|r| r.pattern_value(|p| p.logins_last_7_days));
        let acceleration = || {
            batch.iter().map(|r| {
                r.pattern_value(|p| p.login_frequency_7d)
                    - r.pattern_value(|p| p.login_frequency_30d)
            })
        };

        Self {
            os_changes_max: nan_max(os()),
            device_changes_max: nan_max(device()),
            avg_interval_mean: nan_mean(avg_interval()),
            logins_7d_q05: nan_quantile(logins_7d(), 0.05),
            logins_7d_q75: nan_quantile(logins_7d(), 0.75),
            logins_7d_q95: nan_quantile(logins_7d(), 0.95),
            acceleration_q95: nan_quantile(acceleration(), 0.95),
        }
    }
}
