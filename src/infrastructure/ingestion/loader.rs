//! Document loading from CSV tables and JSON notes

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::document::{
    Document, META_CLASS, META_CREATED_AT, META_QUESTION, META_SOURCE, META_URL, META_UUID,
};
use crate::domain::DomainError;

/// Columns every Q/A CSV must provide
pub const REQUIRED_CSV_COLUMNS: [&str; 5] = ["question", "answer", "source", "class", "uuid"];

const JSON_NOTE_FIELDS: [&str; 4] = ["id", "url", "content", "created_at"];

/// Load every path, concatenating documents in input order
pub fn load_documents<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Document>, DomainError> {
    let mut documents = Vec::new();

    for path in paths {
        documents.extend(load_file(path.as_ref())?);
    }

    info!(files = paths.len(), documents = documents.len(), "Loaded documents");
    Ok(documents)
}

/// Load all regular files of a directory (non-recursive, sorted by name)
pub fn load_directory(dir: &Path) -> Result<Vec<Document>, DomainError> {
    let files = list_files(dir)?;
    load_documents(&files)
}

/// Dispatch on the file extension
pub fn load_file(path: &Path) -> Result<Vec<Document>, DomainError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("csv") => load_csv(path),
        Some("json") => load_json_note(path).map(|doc| vec![doc]),
        _ => Err(DomainError::validation(format!(
            "Unsupported file type: {} (expected .csv or .json)",
            path.display()
        ))),
    }
}

/// One document per row: content is the answer, metadata keeps the rest
pub fn load_csv(path: &Path) -> Result<Vec<Document>, DomainError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let missing: Vec<&str> = REQUIRED_CSV_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h.trim() == *col))
        .collect();

    if !missing.is_empty() {
        return Err(DomainError::schema(format!(
            "Missing required columns in {}: {}",
            path.display(),
            missing.join(", ")
        )));
    }

    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let (Some(q), Some(a), Some(s), Some(c), Some(u)) = (
        column("question"),
        column("answer"),
        column("source"),
        column("class"),
        column("uuid"),
    ) else {
        return Err(DomainError::internal("Column lookup failed after validation"));
    };

    let mut documents = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();

        let answer = field(a);
        if answer.is_empty() {
            return Err(DomainError::schema(format!(
                "Empty answer in {} at row {}",
                path.display(),
                row + 1
            )));
        }

        documents.push(
            Document::new(answer)
                .with_metadata(META_QUESTION, field(q))
                .with_metadata(META_CLASS, field(c))
                .with_metadata(META_SOURCE, field(s))
                .with_metadata(META_UUID, field(u)),
        );
    }

    debug!(path = %path.display(), rows = documents.len(), "Loaded CSV");
    Ok(documents)
}

/// A crawled note: a JSON array holding exactly one `{id, url, content, created_at}`
pub fn load_json_note(path: &Path) -> Result<Document, DomainError> {
    let raw = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
        DomainError::schema(format!("Invalid JSON in {}: {}", path.display(), e))
    })?;

    let records = value.as_array().ok_or_else(|| {
        DomainError::schema(format!("{} must contain a JSON array", path.display()))
    })?;

    if records.len() != 1 {
        return Err(DomainError::schema(format!(
            "{} must contain exactly one record, found {}",
            path.display(),
            records.len()
        )));
    }

    let record = records[0].as_object().ok_or_else(|| {
        DomainError::schema(format!("{}: record is not an object", path.display()))
    })?;

    let missing: Vec<&str> = JSON_NOTE_FIELDS
        .iter()
        .copied()
        .filter(|f| !record.contains_key(*f))
        .collect();
    if !missing.is_empty() {
        return Err(DomainError::schema(format!(
            "Missing required fields in {}: {}",
            path.display(),
            missing.join(", ")
        )));
    }

    let text = |key: &str| match record.get(key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    let content = text("content");
    if content.trim().is_empty() {
        return Err(DomainError::schema(format!(
            "Empty content in {}",
            path.display()
        )));
    }

    Ok(Document::new(content)
        .with_metadata(META_UUID, text("id"))
        .with_metadata(META_URL, text("url"))
        .with_metadata(META_SOURCE, text("url"))
        .with_metadata(META_CREATED_AT, text("created_at")))
}

/// Assign a fresh `uuid` to every row of a Q/A CSV, rewriting it in place
///
/// An existing `uuid` column is overwritten; otherwise one is appended.
pub fn label_uuids(path: &Path) -> Result<usize, DomainError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut headers = reader.headers()?.clone();
    let records: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
    drop(reader);

    let uuid_col = match headers.iter().position(|h| h.trim() == META_UUID) {
        Some(idx) => idx,
        None => {
            headers.push_field(META_UUID);
            headers.len() - 1
        }
    };

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&headers)?;

    for record in &records {
        let mut fields: Vec<String> = record.iter().map(String::from).collect();
        fields.resize(headers.len(), String::new());
        fields[uuid_col] = uuid::Uuid::new_v4().to_string();
        writer.write_record(&fields)?;
    }

    writer.flush()?;
    info!(path = %path.display(), rows = records.len(), "Labelled rows with uuids");
    Ok(records.len())
}

pub(crate) fn list_files(dir: &Path) -> Result<Vec<PathBuf>, DomainError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| DomainError::storage(format!("Cannot read {}: {}", dir.display(), e)))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();

    files.sort();
    Ok(files)
}
