//! Per-row feature derivation: temporal buckets, stabilized ratios, risk
//! flags, composite scores.
//!
//! Pure over one batch: two passes, one computing [`BatchAggregates`], one
//! applying the per-row formulas. Repeated calls on the same batch produce
//! identical output.

use super::{BatchAggregates, FeatureVector, PartOfDay};
use crate::merge::MergedRecord;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use thiserror::Error;

/// Stabilizer added to denominators so division by zero never raises.
pub const EPSILON: f64 = 1e-6;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("invalid transaction datetime '{value}' at row {row}")]
    InvalidDatetime { row: usize, value: String },
}

/// Feature vector plus the lineage kept out of the classifier input.
#[derive(Debug, Clone)]
pub struct DerivedRow {
    pub subject_id: f64,
    pub label: Option<i64>,
    pub features: FeatureVector,
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Rows where every operational field is null carry nothing to score.
fn all_operational_null(record: &MergedRecord) -> bool {
    record.pattern_value(|p| p.monthly_os_changes).is_nan()
        && record
            .pattern_value(|p| p.monthly_phone_model_changes)
            .is_nan()
        && record.transaction.amount.is_nan()
}

pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Derive features for one merged batch. Batch aggregates are computed
    /// over the surviving rows of this call only.
    pub fn derive(batch: &[MergedRecord]) -> Result<Vec<DerivedRow>, FeatureError> {
        let kept: Vec<MergedRecord> = batch
            .iter()
            .filter(|r| !all_operational_null(r))
            .cloned()
            .collect();
        let aggregates = BatchAggregates::compute(&kept);

        kept.iter()
            .enumerate()
            .map(|(row, record)| Self::derive_row(row, record, &aggregates))
            .collect()
    }

    fn derive_row(
        row: usize,
        record: &MergedRecord,
        agg: &BatchAggregates,
    ) -> Result<DerivedRow, FeatureError> {
        let tx = &record.transaction;
        let when = parse_datetime(&tx.datetime).ok_or_else(|| FeatureError::InvalidDatetime {
            row,
            value: tx.datetime.clone(),
        })?;

        let hour = when.hour();
        let dayofweek = when.weekday().num_days_from_monday();
        let day = when.day();
        let month = when.month();
        let is_weekend = u8::from(dayofweek >= 5);
        let part_of_day = PartOfDay::from_hour(hour);

        let p = |f: fn(&crate::record::PatternRecord) -> f64| record.pattern_value(f);
        let os_changes = p(|x| x.monthly_os_changes);
        let device_changes = p(|x| x.monthly_phone_model_changes);
        let logins_7d = p(|x| x.logins_last_7_days);
        let logins_30d = p(|x| x.logins_last_30_days);
        let freq_7d = p(|x| x.login_frequency_7d);
        let freq_30d = p(|x| x.login_frequency_30d);
        let ratio_7d_30d = p(|x| x.logins_7d_over_30d_ratio);
        let avg_interval = p(|x| x.avg_login_interval_30d);
        let std_interval = p(|x| x.std_login_interval_30d);
        let ewm_interval = p(|x| x.ewm_login_interval_7d);
        let burstiness = p(|x| x.burstiness_login_interval);

        let login_freq_7d_vs_30d_ratio = freq_7d / (freq_30d + EPSILON);
        let os_change_ratio = os_changes / (agg.os_changes_max + EPSILON);
        let device_change_ratio = device_changes / (agg.device_changes_max + EPSILON);
        let high_login_zscore = (avg_interval - agg.avg_interval_mean) / (std_interval + EPSILON);
        let high_login_zscore_flag = u8::from(high_login_zscore.abs() > 2.0);
        let os_device_change = os_changes * device_changes;
        let logins_per_hour = logins_7d / (f64::from(hour) + EPSILON);
        let bursty_and_frequent = burstiness * logins_7d;
        let interval_std_over_mean = std_interval / (avg_interval + EPSILON);
        let ewm_vs_avg = ewm_interval / (avg_interval + EPSILON);
        let login_acceleration = freq_7d - freq_30d;
        let sudden_activity_spike = u8::from(logins_7d / 7.0 > (logins_30d / 30.0) * 2.0);

        let recent_os_change_flag = u8::from(os_changes > 0.0);
        let recent_device_change_flag = u8::from(device_changes > 0.0);
        let any_recent_change = recent_os_change_flag | recent_device_change_flag;
        let multiple_changes = u8::from(os_changes > 1.0 || device_changes > 1.0);

        let risk_score = i64::from(high_login_zscore_flag) * 2
            + i64::from(any_recent_change) * 3
            + i64::from(sudden_activity_spike) * 2
            + i64::from(ratio_7d_30d > 0.8)
            + i64::from(multiple_changes) * 4;

        let change_with_high_activity =
            u8::from(any_recent_change == 1 && logins_7d > agg.logins_7d_q75);
        let risky_hour = u8::from(matches!(hour, 0..=5 | 22 | 23));
        let night_with_change = u8::from(part_of_day == PartOfDay::Night && any_recent_change == 1);
        let extreme_velocity = u8::from(login_acceleration.abs() > agg.acceleration_q95);

        let login_variability_score = burstiness * interval_std_over_mean * (1.0 + os_device_change);
        let consistency_score = 1.0 / (1.0 + burstiness + os_device_change);
        let freq_variability_product = logins_7d * interval_std_over_mean;
        let monthly_baseline = logins_30d / 4.3;
        let deviation_score = (logins_7d - monthly_baseline).abs() / (monthly_baseline + EPSILON);
        let extreme_login_freq =
            u8::from(logins_7d > agg.logins_7d_q95 || logins_7d < agg.logins_7d_q05);

        let features = FeatureVector {
            amount: tx.amount,
            document_number: tx.document_number,
            direction: tx.direction.clone(),
            monthly_os_changes: os_changes,
            monthly_phone_model_changes: device_changes,
            last_phone_model_categorical: record
                .pattern
                .as_ref()
                .map(|x| x.last_phone_model_categorical.clone()),
            last_os_categorical: record
                .pattern
                .as_ref()
                .map(|x| x.last_os_categorical.clone()),
            logins_last_7_days: logins_7d,
            logins_last_30_days: logins_30d,
            login_frequency_7d: freq_7d,
            login_frequency_30d: freq_30d,
            freq_change_7d_vs_mean: p(|x| x.freq_change_7d_vs_mean),
            logins_7d_over_30d_ratio: ratio_7d_30d,
            avg_login_interval_30d: avg_interval,
            std_login_interval_30d: std_interval,
            var_login_interval_30d: p(|x| x.var_login_interval_30d),
            ewm_login_interval_7d: ewm_interval,
            burstiness_login_interval: burstiness,
            fano_factor_login_interval: p(|x| x.fano_factor_login_interval),
            zscore_avg_login_interval_7d: p(|x| x.zscore_avg_login_interval_7d),
            hour,
            dayofweek,
            day,
            month,
            is_weekend,
            part_of_day,
            login_freq_7d_vs_30d_ratio,
            os_change_ratio,
            device_change_ratio,
            high_login_zscore,
            high_login_zscore_flag,
            os_device_change,
            logins_per_hour,
            bursty_and_frequent,
            interval_std_over_mean,
            ewm_vs_avg,
            login_acceleration,
            sudden_activity_spike,
            recent_os_change_flag,
            recent_device_change_flag,
            any_recent_change,
            multiple_changes,
            risk_score,
            change_with_high_activity,
            risky_hour,
            night_with_change,
            extreme_velocity,
            login_variability_score,
            consistency_score,
            freq_variability_product,
            deviation_score,
            extreme_login_freq,
        };

        Ok(DerivedRow {
            subject_id: tx.subject_id,
            label: tx.label,
            features,
        })
    }
}
