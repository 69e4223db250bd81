//! Retrieval benchmark rows and precision@k

use serde::{Deserialize, Serialize};

/// Benchmark files scored by a retrieval run, relative to the benchmark dir
pub const RETRIEVAL_BENCHMARKS: [&str; 4] = [
    "faq.csv",
    "faq_rephrased_full.csv",
    "military_questions.csv",
    "usrexp.csv",
];

/// Outcome of one benchmark question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalRow {
    pub question: String,
    pub gt_uuid: String,
    pub retrieved_uuid: Vec<String>,
    pub is_correct: bool,
    /// 1-based position of the first matching uuid; set iff `is_correct`
    pub rank: Option<usize>,
    pub k: usize,
}

impl RetrievalRow {
    pub fn score(
        question: impl Into<String>,
        gt_uuid: impl Into<String>,
        retrieved_uuid: Vec<String>,
        k: usize,
    ) -> Self {
        let gt_uuid = gt_uuid.into();
        let rank = retrieved_uuid
            .iter()
            .position(|id| *id == gt_uuid)
            .map(|pos| pos + 1);

        Self {
            question: question.into(),
            gt_uuid,
            retrieved_uuid,
            is_correct: rank.is_some(),
            rank,
            k,
        }
    }
}

/// Hits for a single benchmark file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileScore {
    pub file: String,
    pub correct: usize,
    pub total: usize,
}

/// Aggregate result of a retrieval evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalSummary {
    pub precision_at_k: f64,
    pub k: usize,
    pub total: usize,
    pub correct: usize,
    pub files: Vec<FileScore>,
    pub output_path: Option<String>,
}

impl RetrievalSummary {
    /// Summarise scored rows; `None` when there is nothing to score
    pub fn from_rows(rows: &[RetrievalRow], k: usize, files: Vec<FileScore>) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }

        let correct = rows.iter().filter(|r| r.is_correct).count();

        Some(Self {
            precision_at_k: correct as f64 / rows.len() as f64,
            k,
            total: rows.len(),
            correct,
            files,
            output_path: None,
        })
    }

    pub fn with_output_path(mut self, path: impl Into<String>) -> Self {
        self.output_path = Some(path.into());
        self
    }
}
