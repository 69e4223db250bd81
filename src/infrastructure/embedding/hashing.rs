//! Local deterministic embedder for offline indexing and tests
//!
//! Model ids look like `hash:384`. Each text is tokenised into lowercase
//! words plus character bigrams (so CJK text without spaces still shares
//! features), every feature is hashed into a signed bucket, and the result is
//! L2-normalised. Identical inputs always produce identical vectors.

use async_trait::async_trait;
use unicode_segmentation::UnicodeSegmentation;

use crate::domain::embedding::{
    normalize, Embedding, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse,
};
use crate::domain::DomainError;

pub const HASH_MODEL_PREFIX: &str = "hash:";
const DEFAULT_DIMENSIONS: usize = 384;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Debug, Clone)]
pub struct HashingEmbeddingProvider {
    dimensions: usize,
}

impl HashingEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Parse a `hash:<dims>` model id; a bare `hash:` uses the default size
    pub fn from_model_id(model: &str) -> Result<Self, DomainError> {
        let dims = model.strip_prefix(HASH_MODEL_PREFIX).ok_or_else(|| {
            DomainError::configuration(format!("'{}' is not a hashing model id", model))
        })?;

        if dims.is_empty() {
            return Ok(Self::new(DEFAULT_DIMENSIONS));
        }

        match dims.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Self::new(n)),
            _ => Err(DomainError::configuration(format!(
                "Invalid hashing model dimensions in '{}'",
                model
            ))),
        }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();

        for word in lowered.unicode_words() {
            self.add_feature(&mut vector, "w", word);
        }

        let chars: Vec<char> = lowered
            .chars()
            .filter(|c| !c.is_whitespace() && !c.is_ascii_punctuation())
            .collect();
        for pair in chars.windows(2) {
            let bigram: String = pair.iter().collect();
            self.add_feature(&mut vector, "b", &bigram);
        }

        normalize(&mut vector);
        vector
    }

    fn add_feature(&self, vector: &mut [f32], kind: &str, feature: &str) {
        let hash = fnv1a(kind.bytes().chain(feature.bytes()));
        let bucket = (hash % self.dimensions as u64) as usize;
        let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign;
    }
}

fn fnv1a(bytes: impl Iterator<Item = u8>) -> u64 {
    bytes.fold(FNV_OFFSET, |hash, b| (hash ^ b as u64).wrapping_mul(FNV_PRIME))
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        let data = request
            .inputs()
            .iter()
            .enumerate()
            .map(|(idx, text)| Embedding::new(idx, self.embed_text(text)))
            .collect();

        Ok(EmbeddingResponse::new(request.model(), data))
    }

    fn provider_name(&self) -> &'static str {
        "hashing"
    }

    fn dimensions(&self, _model: &str) -> Option<usize> {
        Some(self.dimensions)
    }
}
