//! Retrieval benchmark: precision@k over labelled question/uuid files

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::{ensure_parent, read_columns};
use crate::domain::document::META_QUESTION;
use crate::domain::evaluation::{FileScore, RetrievalRow, RetrievalSummary, RETRIEVAL_BENCHMARKS};
use crate::domain::{DomainError, Retriever};

/// Question/content pair shown by a single-query inspection
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedPassage {
    pub question: Option<String>,
    pub content: String,
    pub score: f32,
}

/// Scores a retriever against benchmark files
pub struct RetrievalEvaluator {
    retriever: Arc<dyn Retriever>,
    k: usize,
}

impl RetrievalEvaluator {
    pub fn new(retriever: Arc<dyn Retriever>, k: usize) -> Self {
        Self { retriever, k }
    }

    /// Run the standard benchmark set found in `benchmark_dir`
    pub async fn evaluate(
        &self,
        benchmark_dir: &Path,
        output_path: &Path,
    ) -> Result<RetrievalSummary, DomainError> {
        let files: Vec<PathBuf> = RETRIEVAL_BENCHMARKS
            .iter()
            .map(|name| benchmark_dir.join(name))
            .collect();

        self.evaluate_files(&files, output_path).await
    }

    /// Score every file, write the row-level CSV and return the summary
    ///
    /// Files that do not exist are skipped with a warning; if no rows remain
    /// the run fails with an empty-input error and nothing is written.
    #[instrument(skip(self, files), fields(k = self.k, output = %output_path.display()))]
    pub async fn evaluate_files(
        &self,
        files: &[PathBuf],
        output_path: &Path,
    ) -> Result<RetrievalSummary, DomainError> {
        let mut rows = Vec::new();
        let mut scores = Vec::new();

        for path in files {
            if !path.is_file() {
                warn!(path = %path.display(), "Benchmark file not found, skipped");
                continue;
            }

            let file_rows = self.score_file(path).await?;
            let score = FileScore {
                file: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                correct: file_rows.iter().filter(|r| r.is_correct).count(),
                total: file_rows.len(),
            };
            info!(file = %score.file, correct = score.correct, total = score.total, "Scored benchmark file");

            scores.push(score);
            rows.extend(file_rows);
        }

        let summary = RetrievalSummary::from_rows(&rows, self.k, scores)
            .ok_or_else(|| DomainError::empty_input("No samples found. Nothing to evaluate."))?;

        write_rows(&rows, output_path)?;

        info!(
            total = summary.total,
            correct = summary.correct,
            precision_at_k = summary.precision_at_k,
            "Retrieval evaluation finished"
        );

        Ok(summary.with_output_path(output_path.display().to_string()))
    }

    async fn score_file(&self, path: &Path) -> Result<Vec<RetrievalRow>, DomainError> {
        let questions = read_columns(path, &["question", "uuid"])?;
        let mut rows = Vec::with_capacity(questions.len());

        for columns in questions {
            let [question, gt_uuid]: [String; 2] = columns
                .try_into()
                .map_err(|_| DomainError::internal("Unexpected column count"))?;

            let hits = self.retriever.retrieve(&question, self.k).await?;
            let retrieved: Vec<String> = hits
                .iter()
                .take(self.k)
                .map(|hit| hit.document.uuid().unwrap_or_default().to_string())
                .collect();

            rows.push(RetrievalRow::score(question, gt_uuid, retrieved, self.k));
        }

        Ok(rows)
    }

    /// Top-k passages for one query
    pub async fn inspect(&self, query: &str) -> Result<Vec<RetrievedPassage>, DomainError> {
        let hits = self.retriever.retrieve(query, self.k).await?;

        Ok(hits
            .into_iter()
            .take(self.k)
            .map(|hit| RetrievedPassage {
                question: hit.document.get(META_QUESTION).map(str::to_string),
                content: hit.document.content,
                score: hit.score,
            })
            .collect())
    }
}

fn write_rows(rows: &[RetrievalRow], output_path: &Path) -> Result<(), DomainError> {
    ensure_parent(output_path)?;

    let mut writer = csv::Writer::from_path(output_path)?;
    writer.write_record(["question", "gt_uuid", "retrieved_uuid", "is_correct", "rank", "k"])?;

    for row in rows {
        let retrieved = serde_json::to_string(&row.retrieved_uuid)
            .map_err(|e| DomainError::internal(format!("Failed to encode ids: {}", e)))?;

        let rank = row.rank.map(|r| r.to_string()).unwrap_or_default();
        let k = row.k.to_string();

        writer.write_record([
            row.question.as_str(),
            row.gt_uuid.as_str(),
            retrieved.as_str(),
            if row.is_correct { "true" } else { "false" },
            rank.as_str(),
            k.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::{Document, META_UUID};
    use crate::domain::index::MockRetriever;
    use crate::domain::SearchHit;

    fn hit(uuid: &str, score: f32) -> SearchHit {
        SearchHit::new(
            Document::new(format!("answer for {}", uuid))
                .with_metadata(META_UUID, uuid)
                .with_metadata(META_QUESTION, format!("question for {}", uuid)),
            score,
        )
    }

    fn write_benchmark(dir: &Path, name: &str, rows: &[(&str, &str)]) -> PathBuf {
        let path = dir.join(name);
        let mut body = String::from("question,uuid\n");
        for (q, u) in rows {
            body.push_str(&format!("{},{}\n", q, u));
        }
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn test_rank_is_position_of_ground_truth() {
        let dir = tempfile::tempdir().unwrap();
        let bench = write_benchmark(dir.path(), "faq.csv", &[("q", "abc")]);

        let mut retriever = MockRetriever::new();
        retriever
            .expect_retrieve()
            .returning(|_, _| Ok(vec![hit("xyz", 0.9), hit("abc", 0.8), hit("def", 0.7)]));

        let output = dir.path().join("out/results.csv");
        let summary = RetrievalEvaluator::new(Arc::new(retriever), 3)
            .evaluate_files(&[bench], &output)
            .await
            .unwrap();

        assert_eq!(summary.correct, 1);
        assert_eq!(summary.precision_at_k, 1.0);

        let written = std::fs::read_to_string(&output).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next(), Some("question,gt_uuid,retrieved_uuid,is_correct,rank,k"));
        let row = lines.next().unwrap();
        assert!(row.contains("true,2,3"));
        assert!(row.contains(r#"[""xyz"",""abc"",""def""]"#));
    }

    #[tokio::test]
    async fn test_precision_over_ten_rows() {
        let dir = tempfile::tempdir().unwrap();
        let rows: Vec<(String, String)> = (0..10)
            .map(|i| (format!("q{}", i), format!("u{}", i)))
            .collect();
        let borrowed: Vec<(&str, &str)> = rows.iter().map(|(q, u)| (q.as_str(), u.as_str())).collect();
        let bench = write_benchmark(dir.path(), "faq.csv", &borrowed);

        // the first 7 questions find their uuid, the rest do not
        let mut retriever = MockRetriever::new();
        retriever.expect_retrieve().returning(|query, _| {
            let idx: usize = query[1..].parse().unwrap();
            if idx < 7 {
                Ok(vec![hit("other", 0.9), hit(&format!("u{}", idx), 0.5)])
            } else {
                Ok(vec![hit("other", 0.9)])
            }
        });

        let summary = RetrievalEvaluator::new(Arc::new(retriever), 5)
            .evaluate_files(&[bench], &dir.path().join("out.csv"))
            .await
            .unwrap();

        assert_eq!(summary.total, 10);
        assert_eq!(summary.correct, 7);
        assert!((summary.precision_at_k - 0.7).abs() < 1e-9);
        assert_eq!(summary.files[0].file, "faq.csv");
    }

    #[tokio::test]
    async fn test_missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_benchmark(dir.path(), "usrexp.csv", &[("q", "u1")]);

        let mut retriever = MockRetriever::new();
        retriever
            .expect_retrieve()
            .times(1)
            .returning(|_, _| Ok(vec![hit("u1", 1.0)]));

        let summary = RetrievalEvaluator::new(Arc::new(retriever), 1)
            .evaluate(dir.path(), &dir.path().join("out.csv"))
            .await
            .unwrap();

        assert_eq!(summary.files.len(), 1);
        assert_eq!(summary.total, 1);
    }

    #[tokio::test]
    async fn test_no_rows_is_empty_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut retriever = MockRetriever::new();
        retriever.expect_retrieve().never();

        let output = dir.path().join("out.csv");
        let err = RetrievalEvaluator::new(Arc::new(retriever), 3)
            .evaluate(dir.path(), &output)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::EmptyInput { .. }));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_inspect_returns_question_content_pairs() {
        let mut retriever = MockRetriever::new();
        retriever
            .expect_retrieve()
            .withf(|q, k| q == "美國那麼大？" && *k == 2)
            .returning(|_, _| Ok(vec![hit("a", 0.9), hit("b", 0.4)]));

        let passages = RetrievalEvaluator::new(Arc::new(retriever), 2)
            .inspect("美國那麼大？")
            .await
            .unwrap();

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].question.as_deref(), Some("question for a"));
        assert_eq!(passages[1].content, "answer for b");
    }
}
