//! Evaluation commands: retrieval precision@k, judged generation, verdict counts

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::AppConfig;
use crate::domain::evaluation::{RetrievalSummary, VERDICT_CORRECT, VERDICT_INCORRECT};
use crate::domain::Preset;
use crate::infrastructure::evaluation::count_verdicts;
use crate::infrastructure::llm::LlmProviderFactory;

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[arg(long)]
    pub preset: Option<Preset>,

    #[command(subcommand)]
    pub target: EvaluateTarget,
}

#[derive(Subcommand, Debug)]
pub enum EvaluateTarget {
    /// precision@k of the retriever against labelled questions
    Retrieval(BenchmarkArgs),

    /// Answer benchmark questions and let the judge model grade them
    Generation {
        #[command(flatten)]
        bench: BenchmarkArgs,

        /// Do not pause between batches of rows
        #[arg(long)]
        no_pause: bool,
    },

    /// Show what the retriever returns for one query
    Query { query: String },
}

#[derive(Args, Debug)]
pub struct BenchmarkArgs {
    #[arg(long)]
    pub benchmark_dir: Option<PathBuf>,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CountVerdictsArgs {
    /// Generation results CSV; defaults to evaluation.generation_output
    pub path: Option<PathBuf>,
}

pub async fn run(config: &AppConfig, args: EvaluateArgs) -> anyhow::Result<()> {
    let params = crate::resolve_params(config, args.preset).await?;
    let pipeline = crate::create_pipeline_service(config);
    let eval = &config.evaluation;

    match args.target {
        EvaluateTarget::Retrieval(bench) => {
            let dir = crate::path_or(bench.benchmark_dir.as_deref(), &eval.benchmark_dir);
            let output = crate::path_or(bench.output.as_deref(), &eval.retrieval_output);

            let summary = pipeline.evaluate_retrieval(&params, &dir, &output).await?;
            for line in summary_lines(&summary) {
                println!("{}", line);
            }
        }
        EvaluateTarget::Generation { bench, no_pause } => {
            let dir = crate::path_or(bench.benchmark_dir.as_deref(), &eval.benchmark_dir);
            let output = crate::path_or(bench.output.as_deref(), &eval.generation_output);
            let llm = LlmProviderFactory::create(&config.llm)?;

            let report = pipeline
                .evaluate_generation(
                    &params,
                    llm,
                    crate::generation_settings(config, !no_pause),
                    &dir,
                    &output,
                )
                .await?;

            println!("Evaluated {} answers", report.rows.len());
            println!("Accuracy: {}", report.tally);
            if report.tally.unrecognized > 0 {
                println!("Unrecognized verdicts: {}", report.tally.unrecognized);
            }
            println!("Results written to {}", report.output_path);
        }
        EvaluateTarget::Query { query } => {
            let passages = pipeline.inspect_query(&params, &query).await?;
            for (rank, passage) in passages.iter().enumerate() {
                println!(
                    "#{} score={:.4} question={}\n{}\n",
                    rank + 1,
                    passage.score,
                    passage.question.as_deref().unwrap_or("-"),
                    passage.content
                );
            }
        }
    }

    Ok(())
}

pub fn count(config: &AppConfig, args: CountVerdictsArgs) -> anyhow::Result<()> {
    let path = crate::path_or(args.path.as_deref(), &config.evaluation.generation_output);
    let tally = count_verdicts(&path)?;

    println!("{}: {}", VERDICT_CORRECT, tally.correct);
    println!("{}: {}", VERDICT_INCORRECT, tally.incorrect);
    if tally.unrecognized > 0 {
        println!("Unrecognized: {}", tally.unrecognized);
    }
    println!("Accuracy: {}", tally);
    Ok(())
}

fn summary_lines(summary: &RetrievalSummary) -> Vec<String> {
    let mut lines: Vec<String> = summary
        .files
        .iter()
        .map(|f| format!("{}: {}/{}", f.file, f.correct, f.total))
        .collect();

    lines.push(format!(
        "precision@{}: {:.4} ({}/{})",
        summary.k, summary.precision_at_k, summary.correct, summary.total
    ));
    if let Some(path) = &summary.output_path {
        lines.push(format!("Results written to {}", path));
    }
    lines
}
