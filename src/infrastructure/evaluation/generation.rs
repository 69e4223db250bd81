//! Generation benchmark: answer each question, ask a judge model for a verdict

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use super::{ensure_parent, read_columns};
use crate::domain::evaluation::{
    judge_prompt, GenerationRow, Verdict, VerdictTally, GENERATION_BENCHMARKS,
};
use crate::domain::{AnswerChain, DomainError, LlmProvider, LlmRequest};

const DEFAULT_PACING_EVERY: usize = 4;
const DEFAULT_PACING_DELAY: Duration = Duration::from_secs(180);

/// Rate-limit pause inserted between benchmark rows
///
/// The pause follows every `every`-th row of a file, counted per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub every: usize,
    pub delay: Duration,
}

impl Pacing {
    pub fn new(every: usize, delay: Duration) -> Self {
        Self { every, delay }
    }

    /// No pauses at all
    pub fn none() -> Self {
        Self {
            every: 0,
            delay: Duration::ZERO,
        }
    }

    fn should_pause(&self, row_number: usize) -> bool {
        self.every > 0 && !self.delay.is_zero() && row_number % self.every == 0
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::new(DEFAULT_PACING_EVERY, DEFAULT_PACING_DELAY)
    }
}

/// Result of a generation run
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub rows: Vec<GenerationRow>,
    pub tally: VerdictTally,
    pub output_path: String,
}

/// Runs a chain over benchmark questions and has a judge model grade each answer
pub struct GenerationEvaluator {
    chain: Arc<dyn AnswerChain>,
    judge: Arc<dyn LlmProvider>,
    judge_model: String,
    judge_temperature: f32,
    pacing: Pacing,
}

impl GenerationEvaluator {
    pub fn new(
        chain: Arc<dyn AnswerChain>,
        judge: Arc<dyn LlmProvider>,
        judge_model: impl Into<String>,
    ) -> Self {
        Self {
            chain,
            judge,
            judge_model: judge_model.into(),
            judge_temperature: 0.0,
            pacing: Pacing::default(),
        }
    }

    pub fn with_judge_temperature(mut self, temperature: f32) -> Self {
        self.judge_temperature = temperature;
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Run the standard benchmark set found in `benchmark_dir`
    pub async fn evaluate(
        &self,
        benchmark_dir: &Path,
        output_path: &Path,
    ) -> Result<GenerationReport, DomainError> {
        let files: Vec<PathBuf> = GENERATION_BENCHMARKS
            .iter()
            .map(|name| benchmark_dir.join(name))
            .collect();

        self.evaluate_files(&files, output_path).await
    }

    /// Answer and judge every question, write the results CSV and tally verdicts
    #[instrument(skip(self, files), fields(judge = %self.judge_model, output = %output_path.display()))]
    pub async fn evaluate_files(
        &self,
        files: &[PathBuf],
        output_path: &Path,
    ) -> Result<GenerationReport, DomainError> {
        let mut rows = Vec::new();

        for path in files {
            if !path.is_file() {
                warn!(path = %path.display(), "Benchmark file not found, skipped");
                continue;
            }

            rows.extend(self.evaluate_file(path).await?);
        }

        if rows.is_empty() {
            return Err(DomainError::empty_input("No samples found. Nothing to evaluate."));
        }

        write_rows(&rows, output_path)?;

        let tally = VerdictTally::from_evaluations(rows.iter().map(|r| r.evaluation.as_str()));
        info!(
            rows = rows.len(),
            correct = tally.correct,
            judged = tally.judged(),
            unrecognized = tally.unrecognized,
            "Generation evaluation finished"
        );

        Ok(GenerationReport {
            rows,
            tally,
            output_path: output_path.display().to_string(),
        })
    }

    async fn evaluate_file(&self, path: &Path) -> Result<Vec<GenerationRow>, DomainError> {
        let questions = read_columns(path, &["question"])?;
        let total = questions.len();
        let mut rows = Vec::with_capacity(total);

        for (idx, columns) in questions.into_iter().enumerate() {
            let question = columns.into_iter().next().unwrap_or_default();

            let answer = self.chain.invoke(&question).await?;
            let evaluation = self.judge(&question, &answer).await;

            info!(
                row = idx + 1,
                total,
                question = %question,
                answer = %answer,
                evaluation = %evaluation,
                "Judged answer"
            );
            if let Verdict::Unrecognized(raw) = Verdict::parse(&evaluation) {
                warn!(row = idx + 1, verdict = %raw, "Unrecognized verdict");
            }

            rows.push(GenerationRow {
                question,
                answer,
                evaluation,
            });

            if self.pacing.should_pause(idx + 1) {
                info!(
                    rows = self.pacing.every,
                    delay_secs = self.pacing.delay.as_secs(),
                    "Pausing for rate limit"
                );
                tokio::time::sleep(self.pacing.delay).await;
            }
        }

        Ok(rows)
    }

    /// Judge output, or `Error: ...` when the judge call fails
    async fn judge(&self, question: &str, answer: &str) -> String {
        let request = LlmRequest::builder()
            .user(judge_prompt(question, answer))
            .temperature(self.judge_temperature)
            .build();

        match self.judge.chat(&self.judge_model, request).await {
            Ok(response) => response.content().trim().to_string(),
            Err(e) => format!("Error: {}", e),
        }
    }
}

fn write_rows(rows: &[GenerationRow], output_path: &Path) -> Result<(), DomainError> {
    ensure_parent(output_path)?;

    let mut writer = csv::Writer::from_path(output_path)?;
    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    Ok(())
}
