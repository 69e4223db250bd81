//! Evaluation domain: retrieval precision@k and judged generation

mod retrieval;
mod verdict;

pub use retrieval::{FileScore, RetrievalRow, RetrievalSummary, RETRIEVAL_BENCHMARKS};
pub use verdict::{
    judge_prompt, normalize_verdict, GenerationRow, Verdict, VerdictTally, GENERATION_BENCHMARKS,
    VERDICT_CORRECT, VERDICT_INCORRECT,
};
