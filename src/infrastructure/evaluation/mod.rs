//! Benchmark runners: retrieval precision@k, judged generation, verdict recount

mod generation;
mod retrieval;
mod verdicts;

pub use generation::{GenerationEvaluator, GenerationReport, Pacing};
pub use retrieval::{RetrievalEvaluator, RetrievedPassage};
pub use verdicts::count_verdicts;

use std::path::Path;

use crate::domain::DomainError;

/// Read the named columns of a CSV file, one `Vec` per row in column order
pub(crate) fn read_columns(path: &Path, columns: &[&str]) -> Result<Vec<Vec<String>>, DomainError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut positions = Vec::with_capacity(columns.len());
    let mut missing = Vec::new();
    for column in columns {
        match headers.iter().position(|h| h.trim() == *column) {
            Some(pos) => positions.push(pos),
            None => missing.push(*column),
        }
    }

    if !missing.is_empty() {
        return Err(DomainError::schema(format!(
            "Missing required columns in {}: {}",
            path.display(),
            missing.join(", ")
        )));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            positions
                .iter()
                .map(|pos| record.get(*pos).unwrap_or("").to_string())
                .collect(),
        );
    }

    Ok(rows)
}

/// Create the parent directory of an output file when it has one
pub(crate) fn ensure_parent(path: &Path) -> Result<(), DomainError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(std::fs::create_dir_all(parent)?),
        _ => Ok(()),
    }
}
