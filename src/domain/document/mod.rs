//! Document model

mod entity;

pub use entity::{
    make_chunk_id, parent_uuid, Document, META_CHUNK_ID, META_CLASS, META_CREATED_AT,
    META_QUESTION, META_SOURCE, META_URL, META_UUID,
};
