//! Left join of transactions onto behavioral patterns by (subject_id, date).
//!
//! The transaction table always drives: output row count equals transaction
//! row count. Duplicate pattern keys would fan the join out, so they are
//! detected up front and rejected.

use crate::record::{PatternRecord, TransactionRecord};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("pattern table has duplicate (subject_id, date) keys: {0}")]
    DuplicateKeys(String),
}

/// One transaction with its matching pattern record, if any.
#[derive(Debug, Clone)]
pub struct MergedRecord {
    pub transaction: TransactionRecord,
    pub pattern: Option<PatternRecord>,
}

impl MergedRecord {
    /// Pattern-side numeric; NaN when the join found no match.
    pub fn pattern_value(&self, f: impl Fn(&PatternRecord) -> f64) -> f64 {
        self.pattern.as_ref().map(&f).unwrap_or(f64::NAN)
    }
}

// f64 subject ids are compared bitwise; the join entity is an identifier,
// not a measured quantity.
fn join_key(subject_id: f64, date: &str) -> (u64, String) {
    (subject_id.to_bits(), date.to_string())
}

/// Left outer join on (subject_id, date).
pub fn left_join(
    transactions: &[TransactionRecord],
    patterns: &[PatternRecord],
) -> Result<Vec<MergedRecord>, MergeError> {
    let mut index: HashMap<(u64, String), &PatternRecord> = HashMap::new();
    let mut duplicates: Vec<String> = Vec::new();
    for p in patterns {
        let key = join_key(p.subject_id, &p.date);
        if index.insert(key, p).is_some() {
            let rendered = format!("({}, {})", p.subject_id, p.date);
            if !duplicates.contains(&rendered) {
                duplicates.push(rendered);
            }
        }
    }
    if !duplicates.is_empty() {
        return Err(MergeError::DuplicateKeys(duplicates.join(", ")));
    }

    Ok(transactions
        .iter()
        .map(|t| MergedRecord {
            transaction: t.clone(),
            pattern: index
                .get(&join_key(t.subject_id, &t.date))
                .map(|p| (*p).clone()),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transaction(subject_id: f64, date: &str) -> TransactionRecord {
        TransactionRecord {
            subject_id,
            date: date.to_string(),
            datetime: format!("{date} 12:00:00"),
            amount: 100.0,
            document_number: 1.0,
            direction: "out".to_string(),
            label: None,
        }
    }

    fn pattern(subject_id: f64, date: &str) -> PatternRecord {
        PatternRecord {
            subject_id,
            date: date.to_string(),
            monthly_os_changes: 0.0,
            monthly_phone_model_changes: 0.0,
            last_phone_model_categorical: "m1".to_string(),
            last_os_categorical: "os1".to_string(),
            logins_last_7_days: 5.0,
            logins_last_30_days: 20.0,
            login_frequency_7d: 0.5,
            login_frequency_30d: 0.67,
            freq_change_7d_vs_mean: 0.1,
            logins_7d_over_30d_ratio: 0.25,
            avg_login_interval_30d: 3600.0,
            std_login_interval_30d: 600.0,
            var_login_interval_30d: 360_000.0,
            ewm_login_interval_7d: 3000.0,
            burstiness_login_interval: 1.2,
            fano_factor_login_interval: 1.5,
            zscore_avg_login_interval_7d: 2.0,
        }
    }

    #[test]
    fn preserves_transaction_row_count() {
        let tx = vec![
            transaction(1.0, "2023-01-01"),
            transaction(2.0, "2023-01-01"),
            transaction(1.0, "2023-01-02"),
        ];
        let pat = vec![pattern(1.0, "2023-01-01")];
        let merged = left_join(&tx, &pat).unwrap();
        assert_eq!(merged.len(), 3);
        assert!(merged[0].pattern.is_some());
        assert!(merged[1].pattern.is_none());
        assert!(merged[2].pattern.is_none());
    }

    #[test]
    fn unmatched_pattern_values_are_nan() {
        let merged = left_join(&[transaction(9.0, "2023-05-05")], &[]).unwrap();
        assert!(merged[0]
            .pattern_value(|p| p.logins_last_7_days)
            .is_nan());
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let pat = vec![pattern(1.0, "2023-01-01"), pattern(1.0, "2023-01-01")];
        let err = left_join(&[transaction(1.0, "2023-01-01")], &pat).unwrap_err();
        assert!(err.to_string().contains("(1, 2023-01-01)"));
    }

    #[test]
    fn same_subject_different_date_is_fine() {
        let pat = vec![pattern(1.0, "2023-01-01"), pattern(1.0, "2023-01-02")];
        let merged = left_join(&[transaction(1.0, "2023-01-02")], &pat).unwrap();
        assert_eq!(merged[0].pattern.as_ref().unwrap().date, "2023-01-02");
    }
}
