//! Reading delimited text into a [`Table`]: delimiter sniffing and parsing.

use super::{Cell, IngestError, Table};
use std::path::Path;

const DELIMITER_CANDIDATES: [char; 3] = [',', ';', '\t'];

/// Pick the delimiter by counting candidate occurrences in the first line.
/// The first candidate wins ties, in comma/semicolon/tab probe order.
pub fn sniff_delimiter(first_line: &str) -> char {
    let mut best = DELIMITER_CANDIDATES[0];
    let mut best_count = 0usize;
    for candidate in DELIMITER_CANDIDATES {
        let count = first_line.matches(candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// Parse delimited text: first line is the header, the rest are data rows.
/// Blank lines are skipped; short rows are padded with nulls, extra cells
/// beyond the header width are dropped.
pub fn parse_table(text: &str, delimiter: char) -> Result<Table, IngestError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header_line = lines.next().ok_or(IngestError::Empty)?;
    let headers: Vec<String> = header_line
        .split(delimiter)
        .map(|h| h.trim().to_string())
        .collect();

    let width = headers.len();
    let mut rows = Vec::new();
    for line in lines {
        let mut cells: Vec<Cell> = line.split(delimiter).take(width).map(Cell::parse).collect();
        cells.resize(width, Cell::Null);
        rows.push(cells);
    }
    Ok(Table::new(headers, rows))
}

/// Sniff the delimiter from the first line, then parse.
pub fn parse_delimited(text: &str) -> Result<Table, IngestError> {
    let first_line = text.lines().next().ok_or(IngestError::Empty)?;
    parse_table(text, sniff_delimiter(first_line))
}

/// Read a delimited file from disk. Encoding is fixed: bytes are decoded
/// as UTF-8, lossily — code-page translation is the transport's concern.
pub fn read_table(path: &Path) -> Result<Table, IngestError> {
    let bytes = std::fs::read(path)?;
    parse_delimited(&String::from_utf8_lossy(&bytes))
}
