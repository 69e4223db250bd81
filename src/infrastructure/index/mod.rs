//! Vector index persistence and querying

mod flat;
mod store;

pub use flat::{FlatIndex, DOCSTORE_FILE, MANIFEST_FILE, VECTORS_FILE};
pub use store::{append, build, load, IndexHandle};
