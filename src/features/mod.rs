//! Batch feature derivation from merged transaction/pattern records.

mod aggregates;
mod derive;

pub use aggregates::{nan_max, nan_mean, nan_quantile, BatchAggregates};
pub use derive::{DerivedRow, FeatureDeriver, FeatureError, EPSILON};

use serde::{Deserialize, Serialize};

/// Part-of-day bucket derived from the transaction hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartOfDay {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl PartOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => PartOfDay::Night,
            6..=11 => PartOfDay::Morning,
            12..=17 => PartOfDay::Afternoon,
            _ => PartOfDay::Evening,
        }
    }

    /// Ordinal encoding for the model matrix.
    pub fn ordinal(self) -> f64 {
        match self {
            PartOfDay::Night => 0.0,
            PartOfDay::Morning => 1.0,
            PartOfDay::Afternoon => 2.0,
            PartOfDay::Evening => 3.0,
        }
    }
}

/// One derived row: the post-drop merged fields with raw date/time replaced
/// by temporal features, plus the ratio, flag, and composite features.
/// Pattern-side numerics are NaN when the join found no match (serialized
/// as JSON null).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    // merged fields carried through
    pub amount: f64,
    pub document_number: f64,
    pub direction: String,
    pub monthly_os_changes: f64,
    pub monthly_phone_model_changes: f64,
    pub last_phone_model_categorical: Option<String>,
    pub last_os_categorical: Option<String>,
    pub logins_last_7_days: f64,
    pub logins_last_30_days: f64,
    pub login_frequency_7d: f64,
    pub login_frequency_30d: f64,
    pub freq_change_7d_vs_mean: f64,
    pub logins_7d_over_30d_ratio: f64,
    pub avg_login_interval_30d: f64,
    pub std_login_interval_30d: f64,
    pub var_login_interval_30d: f64,
    pub ewm_login_interval_7d: f64,
    pub burstiness_login_interval: f64,
    pub fano_factor_login_interval: f64,
    pub zscore_avg_login_interval_7d: f64,
    // temporal
    pub hour: u32,
    pub dayofweek: u32,
    pub day: u32,
    pub month: u32,
    pub is_weekend: u8,
    pub part_of_day: PartOfDay,
    // stabilized ratios and statistics
    pub login_freq_7d_vs_30d_ratio: f64,
    pub os_change_ratio: f64,
    pub device_change_ratio: f64,
    pub high_login_zscore: f64,
    pub high_login_zscore_flag: u8,
    pub os_device_change: f64,
    pub logins_per_hour: f64,
    pub bursty_and_frequent: f64,
    pub interval_std_over_mean: f64,
    pub ewm_vs_avg: f64,
    pub login_acceleration: f64,
    pub sudden_activity_spike: u8,
    // behavioral risk flags
    pub recent_os_change_flag: u8,
    pub recent_device_change_flag: u8,
    pub any_recent_change: u8,
    pub multiple_changes: u8,
    pub risk_score: i64,
    pub change_with_high_activity: u8,
    pub risky_hour: u8,
    pub night_with_change: u8,
    pub extreme_velocity: u8,
    // composite scores
    pub login_variability_score: f64,
    pub consistency_score: f64,
    pub freq_variability_product: f64,
    pub deviation_score: f64,
    pub extreme_login_freq: u8,
}

/// Fixed ordered feature set fed to the classifier. Join keys, raw
/// timestamps, the label, and free-text categoricals stay out; the
/// part-of-day bucket enters ordinal-encoded.
pub const MODEL_FEATURE_NAMES: [&str; 49] = [
    "amount",
    "document_number",
    "monthly_os_changes",
    "monthly_phone_model_changes",
    "logins_last_7_days",
    "logins_last_30_days",
    "login_frequency_7d",
    "login_frequency_30d",
    "freq_change_7d_vs_mean",
    "logins_7d_over_30d_ratio",
    "avg_login_interval_30d",
    "std_login_interval_30d",
    "var_login_interval_30d",
    "ewm_login_interval_7d",
    "burstiness_login_interval",
    "fano_factor_login_interval",
    "zscore_avg_login_interval_7d",
    "hour",
    "dayofweek",
    "day",
    "month",
    "is_weekend",
    "part_of_day",
    "login_freq_7d_vs_30d_ratio",
    "os_change_ratio",
    "device_change_ratio",
    "high_login_zscore",
    "high_login_zscore_flag",
    "os_device_change",
    "logins_per_hour",
    "bursty_and_frequent",
    "interval_std_over_mean",
    "ewm_vs_avg",
    "login_acceleration",
    "sudden_activity_spike",
    "recent_os_change_flag",
    "recent_device_change_flag",
    "any_recent_change",
    "multiple_changes",
    "risk_score",
    "change_with_high_activity",
    "risky_hour",
    "night_with_change",
    "extreme_velocity",
    "login_variability_score",
    "consistency_score",
    "freq_variability_product",
    "deviation_score",
    "extreme_login_freq",
];

impl FeatureVector {
    /// Encode the row in [`MODEL_FEATURE_NAMES`] order.
    pub fn model_row(&self) -> Vec<f64> {
        vec![
            self.amount,
            self.document_number,
            self.monthly_os_changes,
            self.monthly_phone_model_changes,
            self.logins_last_7_days,
            self.logins_last_30_days,
            self.login_frequency_7d,
            self.login_frequency_30d,
            self.freq_change_7d_vs_mean,
            self.logins_7d_over_30d_ratio,
            self.avg_login_interval_30d,
            self.std_login_interval_30d,
            self.var_login_interval_30d,
            self.ewm_login_interval_7d,
            self.burstiness_login_interval,
            self.fano_factor_login_interval,
            self.zscore_avg_login_interval_7d,
            f64::from(self.hour),
            f64::from(self.dayofweek),
            f64::from(self.day),
            f64::from(self.month),
            f64::from(self.is_weekend),
            self.part_of_day.ordinal(),
            self.login_freq_7d_vs_30d_ratio,
            self.os_change_ratio,
            self.device_change_ratio,
            self.high_login_zscore,
            f64::from(self.high_login_zscore_flag),
            self.os_device_change,
            self.logins_per_hour,
            self.bursty_and_frequent,
            self.interval_std_over_mean,
            self.ewm_vs_avg,
            self.login_acceleration,
            f64::from(self.sudden_activity_spike),
            f64::from(self.recent_os_change_flag),
            f64::from(self.recent_device_change_flag),
            f64::from(self.any_recent_change),
            f64::from(self.multiple_changes),
            self.risk_score as f64,
            f64::from(self.change_with_high_activity),
            f64::from(self.risky_hour),
            f64::from(self.night_with_change),
            f64::from(self.extreme_velocity),
            self.login_variability_score,
            self.consistency_score,
            self.freq_variability_product,
            self.deviation_score,
            f64::from(self.extreme_login_freq),
        ]
    }
}
