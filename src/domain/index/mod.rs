//! Vector index domain types

mod manifest;
mod retriever;

pub use manifest::{IndexManifest, MANIFEST_VERSION};
pub use retriever::{Retriever, SearchHit};

#[cfg(test)]
pub use retriever::MockRetriever;
