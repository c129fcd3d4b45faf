//! Delimited-table ingestion: delimiter sniffing, parsing into dynamically
//! typed tables, and transaction/pattern role assignment.

mod reader;
mod table;

pub use reader::{parse_delimited, parse_table, read_table, sniff_delimiter};
pub use table::{Cell, Table};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("input has no header line")]
    Empty,
    #[error("failed to read table: {0}")]
    Io(#[from] std::io::Error),
}

/// Decide which table is which: the one with fewer columns is the
/// transaction table, the wider one carries the behavioral patterns.
/// Ties keep the argument order.
pub fn assign_roles(first: Table, second: Table) -> (Table, Table) {
    if second.column_count() < first.column_count() {
        (second, first)
    } else {
        (first, second)
    }
}
