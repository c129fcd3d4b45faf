//! Declarative table schemas and exhaustive validation.
//!
//! A schema is an ordered list of column rules evaluated in full: the
//! report enumerates every missing column and every type mismatch rather
//! than stopping at the first violation.

use crate::ingest::{Cell, Table};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Number,
    Text,
}

impl ColumnType {
    /// Whether an observed column type meets an expectation. Integer
    /// columns are valid numbers; the reverse is not true.
    pub fn satisfies(self, expected: ColumnType) -> bool {
        self == expected || (self == ColumnType::Integer && expected == ColumnType::Number)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColumnType::Integer => "integer",
            ColumnType::Number => "number",
            ColumnType::Text => "text",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct ColumnRule {
    pub name: &'static str,
    pub ty: ColumnType,
    pub required: bool,
}

impl ColumnRule {
    const fn required(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            required: true,
        }
    }

    const fn optional(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            required: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Schema {
    pub name: &'static str,
    pub rules: Vec<ColumnRule>,
}

impl Schema {
    /// Per-transaction records. `label` is optional ground truth; when the
    /// column is present it must still be integer-typed.
    pub fn transactions() -> Self {
        use ColumnType::*;
        Self {
            name: "transactions",
            rules: vec![
                ColumnRule::required("subject_id", Number),
                ColumnRule::required("date", Text),
                ColumnRule::required("datetime", Text),
                ColumnRule::required("amount", Number),
                ColumnRule::required("document_number", Integer),
                ColumnRule::required("direction", Text),
                ColumnRule::optional("label", Integer),
            ],
        }
    }

    /// Behavioral pattern records keyed by (subject_id, date).
    pub fn patterns() -> Self {
        use ColumnType::*;
        Self {
            name: "patterns",
            rules: vec![
                ColumnRule::required("date", Text),
                ColumnRule::required("subject_id", Number),
                ColumnRule::required("monthly_os_changes", Integer),
                ColumnRule::required("monthly_phone_model_changes", Integer),
                ColumnRule::required("last_phone_model_categorical", Text),
                ColumnRule::required("last_os_categorical", Text),
                ColumnRule::required("logins_last_7_days", Integer),
                ColumnRule::required("logins_last_30_days", Integer),
                ColumnRule::required("login_frequency_7d", Number),
                ColumnRule::required("login_frequency_30d", Number),
                ColumnRule::required("freq_change_7d_vs_mean", Number),
                ColumnRule::required("logins_7d_over_30d_ratio", Number),
                ColumnRule::required("avg_login_interval_30d", Number),
                ColumnRule::required("std_login_interval_30d", Number),
                ColumnRule::required("var_login_interval_30d", Number),
                ColumnRule::required("ewm_login_interval_7d", Number),
                ColumnRule::required("burstiness_login_interval", Number),
                ColumnRule::required("fano_factor_login_interval", Number),
                ColumnRule::required("zscore_avg_login_interval_7d", Number),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeMismatch {
    pub column: String,
    pub expected: ColumnType,
    pub observed: ColumnType,
}

/// Structured validation outcome for one table.
#[derive(Debug, Clone)]
pub struct SchemaReport {
    pub table: &'static str,
    pub missing: Vec<String>,
    pub mismatched: Vec<TypeMismatch>,
}

impl SchemaReport {
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty() && self.mismatched.is_empty()
    }

    /// Caller-facing message enumerating every violation found.
    pub fn message(&self) -> String {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!(
                "Missing required columns: {}",
                self.missing.join(", ")
            ));
        }
        if !self.mismatched.is_empty() {
            let details: Vec<String> = self
                .mismatched
                .iter()
                .map(|m| format!("{} (expected {}, got {})", m.column, m.expected, m.observed))
                .collect();
            parts.push(format!(
                "Incorrect data types for columns: {}",
                details.join(", ")
            ));
        }
        format!("{} table: {}", self.table, parts.join("; "))
    }
}

/// Observed type of one column: integer when every non-null cell is an
/// integer, number when floats appear (or the column is all null, which is
/// how a numeric column with no values presents), text otherwise.
pub fn observed_type(table: &Table, col: usize) -> ColumnType {
    let mut saw_value = false;
    let mut saw_float = false;
    for cell in table.column(col) {
        match cell {
            Cell::Null => {}
            Cell::Int(_) => saw_value = true,
            Cell::Float(_) => {
                saw_value = true;
                saw_float = true;
            }
            Cell::Text(_) => return ColumnType::Text,
        }
    }
    if saw_value && !saw_float {
        ColumnType::Integer
    } else {
        ColumnType::Number
    }
}

/// Check a table against a schema, collecting all violations.
pub fn validate(table: &Table, schema: &Schema) -> SchemaReport {
    let mut report = SchemaReport {
        table: schema.name,
        missing: Vec::new(),
        mismatched: Vec::new(),
    };
    for rule in &schema.rules {
        match table.column_index(rule.name) {
            None => {
                if rule.required {
                    report.missing.push(rule.name.to_string());
                }
            }
            Some(col) => {
                let observed = observed_type(table, col);
                if !observed.satisfies(rule.ty) {
                    report.mismatched.push(TypeMismatch {
                        column: rule.name.to_string(),
                        expected: rule.ty,
                        observed,
                    });
                }
            }
        }
    }
    report
}
