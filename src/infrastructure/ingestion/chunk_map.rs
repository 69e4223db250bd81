//! Export of the chunk -> id mapping used when labelling benchmarks

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::domain::document::{Document, META_CLASS};
use crate::domain::DomainError;

/// Header line of the chunk map CSV
pub const CHUNK_MAP_COLUMNS: &str = "class,chunk,answer,chunk_id";

#[derive(Debug, Serialize)]
struct ChunkMapRow<'a> {
    class: &'a str,
    chunk: &'a str,
    answer: &'a str,
    chunk_id: &'a str,
}

/// Write `class, chunk, answer, chunk_id` for every chunk that has all four
///
/// `chunk` holds the source question; chunks from JSON notes have none and are
/// skipped. Returns the number of rows written.
pub fn write_chunk_map(chunks: &[Document], path: &Path) -> Result<usize, DomainError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    let mut written = 0;

    for chunk in chunks {
        let (Some(class), Some(question), Some(chunk_id)) =
            (chunk.get(META_CLASS), chunk.question(), chunk.chunk_id())
        else {
            continue;
        };

        writer.serialize(ChunkMapRow {
            class,
            chunk: question,
            answer: &chunk.content,
            chunk_id,
        })?;
        written += 1;
    }

    writer.flush()?;
    info!(path = %path.display(), rows = written, "Saved chunk map");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::{META_CHUNK_ID, META_QUESTION, META_UUID};
    use tempfile::TempDir;

    #[test]
    fn test_writes_only_complete_chunks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/chunk2id.csv");

        let chunks = vec![
            Document::new("可以")
                .with_metadata(META_CLASS, "出國")
                .with_metadata(META_QUESTION, "可以出國嗎")
                .with_metadata(META_UUID, "u1")
                .with_metadata(META_CHUNK_ID, "u1_0"),
            Document::new("note").with_metadata(META_CHUNK_ID, "n1_1"),
        ];

        assert_eq!(write_chunk_map(&chunks, &path).unwrap(), 1);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, format!("{}\n出國,可以出國嗎,可以,u1_0\n", CHUNK_MAP_COLUMNS));
    }
}
