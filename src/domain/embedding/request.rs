//! Embedding request types

use serde::{Deserialize, Serialize};

/// Request to embed one or more texts with a given model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

impl EmbeddingRequest {
    pub fn new(model: impl Into<String>, input: Vec<String>) -> Self {
        Self {
            model: model.into(),
            input,
        }
    }

    pub fn single(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(model, vec![text.into()])
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn inputs(&self) -> &[String] {
        &self.input
    }

    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_request() {
        let request = EmbeddingRequest::single("text-embedding-3-small", "hello");

        assert_eq!(request.model(), "text-embedding-3-small");
        assert_eq!(request.inputs(), ["hello".to_string()]);
        assert_eq!(request.len(), 1);
    }

    #[test]
    fn test_serializes_as_openai_body() {
        let request = EmbeddingRequest::new("m", vec!["a".into(), "b".into()]);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "m");
        assert_eq!(json["input"], serde_json::json!(["a", "b"]));
    }
}
