//! File-backed chatbot parameters

mod file_store;

pub use file_store::ParamsFileStore;
