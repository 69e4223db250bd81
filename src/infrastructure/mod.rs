//! Infrastructure layer - external service implementations

pub mod chat;
pub mod embedding;
pub mod evaluation;
pub mod index;
pub mod ingestion;
pub mod llm;
pub mod logging;
pub mod params;
pub mod services;
pub mod telegram;
