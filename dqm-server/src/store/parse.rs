//! Delimited-text parsing
//!
//! Turns uploaded CSV/TSV bytes into a typed table: a fixed header plus
//! rows of `CellValue`s aligned with it. The column set comes from the
//! first non-empty line and never changes for the dataset's lifetime.

use dqm_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// A single parsed cell.
///
/// Empty fields and the sentinels `null`, `NA`, `None` become `Null`;
/// fields parsing as finite floats become `Number`; everything else stays
/// `Text`. Serializes untagged so a row round-trips through JSON as
/// `[1.0, "x", null]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

/// Header plus typed rows, the in-memory form of an uploaded table
#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// Parse delimited text into header + typed rows.
///
/// Fails if the content has no header, no data rows, duplicate column
/// names, or a data row whose field count differs from the header.
pub fn parse_delimited(content: &str) -> Result<ParsedTable> {
    let sep = detect_separator(content);
    let mut lines = content.lines().filter(|l| !l.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| Error::Parse("empty content".to_string()))?;
    let columns: Vec<String> = split_line(header, sep)
        .into_iter()
        .map(|s| s.trim().to_string())
        .collect();

    if columns.iter().any(|c| c.is_empty()) {
        return Err(Error::Parse("header has an empty column name".to_string()));
    }
    for (i, name) in columns.iter().enumerate() {
        if columns[..i].contains(name) {
            return Err(Error::Parse(format!("duplicate column name: {}", name)));
        }
    }

    let mut rows = Vec::new();
    for (line_no, line) in lines.enumerate() {
        let fields = split_line(line, sep);
        if fields.len() != columns.len() {
            return Err(Error::Parse(format!(
                "row {} has {} fields, expected {}",
                line_no + 2,
                fields.len(),
                columns.len()
            )));
        }
        rows.push(fields.iter().map(|f| parse_cell(f)).collect());
    }

    if rows.is_empty() {
        return Err(Error::Parse("no data rows".to_string()));
    }

    Ok(ParsedTable { columns, rows })
}

/// Comma by default; tab when the header carries more tabs than commas
fn detect_separator(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");
    let tabs = first_line.chars().filter(|&c| c == '\t').count();
    let commas = first_line.chars().filter(|&c| c == ',').count();
    if tabs > commas && tabs > 0 {
        '\t'
    } else {
        ','
    }
}

/// Quote-aware field split; separators inside double quotes don't split
fn split_line(line: &str, sep: char) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in line.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch == sep && !in_quotes {
            result.push(current.clone());
            current.clear();
        } else {
            current.push(ch);
        }
    }
    result.push(current);
    result
}

fn parse_cell(field: &str) -> CellValue {
    let field = field.trim();
    if field.is_empty() || field == "null" || field == "NA" || field == "None" {
        return CellValue::Null;
    }
    // Finite only: "NaN"/"inf" parse as floats but have no ordering use
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() => CellValue::Number(v),
        _ => CellValue::Text(field.to_string()),
    }
}
