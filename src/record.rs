//! Typed transaction and pattern records extracted from validated tables.
//!
//! Numeric fields use NaN for null cells so that downstream arithmetic
//! propagates missing values the way the derivation expects.

use crate::ingest::{Cell, Table};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub subject_id: f64,
    pub date: String,
    pub datetime: String,
    pub amount: f64,
    pub document_number: f64,
    pub direction: String,
    /// Ground-truth fraud label when the table carries one.
    pub label: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternRecord {
    pub subject_id: f64,
    pub date: String,
    pub monthly_os_changes: f64,
    pub monthly_phone_model_changes: f64,
    pub last_phone_model_categorical: String,
    pub last_os_categorical: String,
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
}

fn f64_at(row: &[Cell], col: Option<usize>) -> f64 {
    col.map_or(f64::NAN, |c| row[c].as_f64())
}

fn string_at(row: &[Cell], col: Option<usize>) -> String {
    col.map_or_else(String::new, |c| row[c].as_string())
}

impl TransactionRecord {
    /// Extract rows from a table that passed the transactions schema.
    pub fn from_table(table: &Table) -> Vec<TransactionRecord> {
        let subject_id = table.column_index("subject_id");
        let date = table.column_index("date");
        let datetime = table.column_index("datetime");
        let amount = table.column_index("amount");
        let document_number = table.column_index("document_number");
        let direction = table.column_index("direction");
        let label = table.column_index("label");

        table
            .rows
            .iter()
            .map(|row| TransactionRecord {
                subject_id: f64_at(row, subject_id),
                date: string_at(row, date),
                datetime: string_at(row, datetime),
                amount: f64_at(row, amount),
                document_number: f64_at(row, document_number),
                direction: string_at(row, direction),
                label: label.and_then(|c| row[c].as_i64()),
            })
            .collect()
    }
}

impl PatternRecord {
    /// Extract rows from a table that passed the patterns schema.
    pub fn from_table(table: &Table) -> Vec<PatternRecord> {
        let subject_id = table.column_index("subject_id");
        let date = table.column_index("date");
        let os_changes = table.column_index("monthly_os_changes");
        let model_changes = table.column_index("monthly_phone_model_changes");
        let last_model = table.column_index("last_phone_model_categorical");
        let last_os = table.column_index("last_os_categorical");
        let logins_7d = table.column_index("logins_last_7_days");
        let logins_30d = table.column_index("logins_last_30_days");
        let freq_7d = table.column_index("login_frequency_7d");
        let freq_30d = table.column_index("login_frequency_30d");
        let freq_change = table.column_index("freq_change_7d_vs_mean");
        let ratio_7d_30d = table.column_index("logins_7d_over_30d_ratio");
        let avg_interval = table.column_index("avg_login_interval_30d");
        let std_interval = table.column_index("std_login_interval_30d");
        let var_interval = table.column_index("var_login_interval_30d");
        let ewm_interval = table.column_index("ewm_login_interval_7d");
        let burstiness = table.column_index("burstiness_login_interval");
        let fano = table.column_index("fano_factor_login_interval");
        let zscore = table.column_index("zscore_avg_login_interval_7d");

        table
            .rows
            .iter()
            .map(|row| PatternRecord {
                subject_id: f64_at(row, subject_id),
                date: string_at(row, date),
                monthly_os_changes: f64_at(row, os_changes),
                monthly_phone_model_changes: f64_at(row, model_changes),
                last_phone_model_categorical: string_at(row, last_model),
                last_os_categorical: string_at(row, last_os),
                logins_last_7_days: f64_at(row, logins_7d),
                logins_last_30_days: f64_at(row, logins_30d),
                login_frequency_7d: f64_at(row, freq_7d),
                login_frequency_30d: f64_at(row, freq_30d),
                freq_change_7d_vs_mean: f64_at(row, freq_change),
                logins_7d_over_30d_ratio: f64_at(row, ratio_7d_30d),
                avg_login_interval_30d: f64_at(row, avg_interval),
                std_login_interval_30d: f64_at(row, std_interval),
                var_login_interval_30d: f64_at(row, var_interval),
                ewm_login_interval_7d: f64_at(row, ewm_interval),
                burstiness_login_interval: f64_at(row, burstiness),
                fano_factor_login_interval: f64_at(row, fano),
                zscore_avg_login_interval_7d: f64_at(row, zscore),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::parse_delimited;

    #[test]
    fn transaction_extraction() {
        let t = parse_delimited(
            "subject_id;date;datetime;amount;document_number;direction;label\n1.0;2023-01-01;2023-01-01 12:00:00;100.0;12345;outbound;1",
        )
        .unwrap();
        let records = TransactionRecord::from_table(&t);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].subject_id, 1.0);
        assert_eq!(records[0].amount, 100.0);
        assert_eq!(records[0].label, Some(1));
    }

    #[test]
    fn missing_label_column_yields_none() {
        let t = parse_delimited(
            "subject_id;date;datetime;amount;document_number;direction\n1.0;2023-01-01;2023-01-01 12:00:00;100.0;12345;outbound",
        )
        .unwrap();
        let records = TransactionRecord::from_table(&t);
        assert_eq!(records[0].label, None);
    }

    #[test]
    fn null_amount_becomes_nan() {
        let t = parse_delimited(
            "subject_id;date;datetime;amount;document_number;direction;label\n1.0;2023-01-01;2023-01-01 12:00:00;;12345;outbound;0",
        )
        .unwrap();
        let records = TransactionRecord::from_table(&t);
        assert!(records[0].amount.is_nan());
    }
}
