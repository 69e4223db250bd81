//! Document ingestion infrastructure
//!
//! Loading of source files, the recursive splitter and the chunk map export.

pub mod chunk_map;
pub mod chunkers;
pub mod loader;

pub use chunk_map::{write_chunk_map, CHUNK_MAP_COLUMNS};
pub use chunkers::RecursiveCharacterSplitter;
pub use loader::{label_uuids, load_csv, load_directory, load_documents, load_file, load_json_note};
