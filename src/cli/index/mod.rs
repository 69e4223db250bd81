//! Index maintenance commands: build, append, search

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{ChatbotParams, ChunkingConfig, Preset, SearchHit};
use crate::infrastructure::services::BuildIndexRequest;

#[derive(Args, Debug)]
pub struct BuildIndexArgs {
    /// CSV files, JSON notes, or directories holding them
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Index directory; defaults to the params' faiss_idx_path
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Embedding model; defaults to the params' emb_model
    #[arg(long)]
    pub model: Option<String>,

    #[arg(long, default_value_t = 512)]
    pub chunk_size: usize,

    #[arg(long, default_value_t = 200)]
    pub chunk_overlap: usize,

    /// Also write a class,chunk,answer,chunk_id CSV
    #[arg(long)]
    pub chunk_map: Option<PathBuf>,

    #[arg(long)]
    pub preset: Option<Preset>,
}

#[derive(Args, Debug)]
pub struct AppendIndexArgs {
    /// Texts to add
    pub texts: Vec<String>,

    /// Read additional texts from a file, one per non-empty line
    #[arg(long)]
    pub file: Option<PathBuf>,

    #[arg(long)]
    pub index: Option<PathBuf>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub preset: Option<Preset>,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    pub query: String,

    /// Number of passages; defaults to the params' k
    #[arg(long)]
    pub k: Option<usize>,

    #[arg(long)]
    pub preset: Option<Preset>,
}

/// Params that supply index defaults; a missing params.json is not an error here
async fn index_defaults(config: &AppConfig, preset: Option<Preset>) -> anyhow::Result<ChatbotParams> {
    if preset.is_none() && !crate::params_store(config).exists().await {
        return Ok(ChatbotParams::default());
    }
    crate::resolve_params(config, preset).await
}

pub async fn build(config: &AppConfig, args: BuildIndexArgs) -> anyhow::Result<()> {
    let defaults = index_defaults(config, args.preset).await?;
    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(&defaults.faiss_idx_path));
    let model = args.model.unwrap_or(defaults.emb_model);

    let mut request = BuildIndexRequest::new(args.inputs, &output, &model)
        .with_chunking(ChunkingConfig::new(args.chunk_size, args.chunk_overlap));
    if let Some(path) = args.chunk_map {
        request = request.with_chunk_map(path);
    }

    let result = crate::create_pipeline_service(config)
        .build_index(request)
        .await?;

    info!(index = %output.display(), model = %model, "Index built");
    println!(
        "Indexed {} documents as {} chunks (dimension {}) into {}",
        result.documents,
        result.chunks,
        result.dimension,
        output.display()
    );
    if let Some(rows) = result.chunk_map_rows {
        println!("Wrote {} chunk map rows", rows);
    }

    Ok(())
}

pub async fn append(config: &AppConfig, args: AppendIndexArgs) -> anyhow::Result<()> {
    let defaults = index_defaults(config, args.preset).await?;
    let index = args
        .index
        .unwrap_or_else(|| PathBuf::from(&defaults.faiss_idx_path));
    let model = args.model.unwrap_or(defaults.emb_model);

    let mut texts = args.texts;
    if let Some(file) = args.file {
        let content = tokio::fs::read_to_string(&file).await?;
        texts.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from),
        );
    }

    let total = crate::create_pipeline_service(config)
        .append_index(&index, &model, &texts)
        .await?;

    println!(
        "Appended {} texts; {} now holds {} entries",
        texts.len(),
        index.display(),
        total
    );
    Ok(())
}

pub async fn search(config: &AppConfig, args: SearchArgs) -> anyhow::Result<()> {
    let mut params = crate::resolve_params(config, args.preset).await?;
    if let Some(k) = args.k {
        params.k = k;
    }

    let hits = crate::create_pipeline_service(config)
        .search(&params, &args.query)
        .await?;

    for line in format_hits(&hits) {
        println!("{}", line);
    }
    Ok(())
}

pub(crate) fn format_hits(hits: &[SearchHit]) -> Vec<String> {
    hits.iter()
        .enumerate()
        .map(|(rank, hit)| {
            format!(
                "#{} score={:.4} uuid={} chunk_id={}\n{}\n",
                rank + 1,
                hit.score,
                hit.document.uuid().unwrap_or("-"),
                hit.document.chunk_id().unwrap_or("-"),
                hit.document.content
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::META_UUID;
    use crate::domain::Document;

    #[test]
    fn test_format_hits() {
        let hits = vec![SearchHit::new(
            Document::new("役男出國").with_metadata(META_UUID, "u1"),
            0.91234,
        )];

        let lines = format_hits(&hits);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("#1 score=0.9123 uuid=u1 chunk_id=-"));
        assert!(lines[0].contains("役男出國"));
    }

    #[tokio::test]
    async fn test_index_defaults_without_params_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.chatbot.params_path = dir.path().join("params.json").display().to_string();

        let defaults = index_defaults(&config, None).await.unwrap();
        assert_eq!(defaults, ChatbotParams::default());
    }
}
