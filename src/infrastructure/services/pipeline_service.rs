//! Pipeline service - index build/append, search and benchmark runs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::evaluation::RetrievalSummary;
use crate::domain::ingestion::split_documents;
use crate::domain::{ChatbotParams, ChunkingConfig, DomainError, LlmProvider, SearchHit};
use crate::infrastructure::chat::ChatChain;
use crate::infrastructure::embedding::EmbedderFactory;
use crate::infrastructure::evaluation::{
    GenerationEvaluator, GenerationReport, Pacing, RetrievalEvaluator, RetrievedPassage,
};
use crate::infrastructure::index::{self, IndexHandle};
use crate::infrastructure::ingestion::{load_documents, write_chunk_map, RecursiveCharacterSplitter};

/// Request to build a fresh index from source files
#[derive(Debug, Clone)]
pub struct BuildIndexRequest {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub model: String,
    pub chunking: ChunkingConfig,
    pub chunk_map: Option<PathBuf>,
}

impl BuildIndexRequest {
    pub fn new(inputs: Vec<PathBuf>, output: impl Into<PathBuf>, model: impl Into<String>) -> Self {
        Self {
            inputs,
            output: output.into(),
            model: model.into(),
            chunking: ChunkingConfig::default(),
            chunk_map: None,
        }
    }

    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = chunking;
        self
    }

    pub fn with_chunk_map(mut self, path: impl Into<PathBuf>) -> Self {
        self.chunk_map = Some(path.into());
        self
    }
}

/// Outcome of [`PipelineService::build_index`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildIndexResult {
    pub documents: usize,
    pub chunks: usize,
    pub dimension: usize,
    pub chunk_map_rows: Option<usize>,
}

/// Offline pipeline operations driven by the CLI
#[derive(Debug, Clone)]
pub struct PipelineService {
    embedders: EmbedderFactory,
}

impl PipelineService {
    pub fn new(embedders: EmbedderFactory) -> Self {
        Self { embedders }
    }

    /// Load, split, embed and persist
    #[instrument(skip(self, request), fields(model = %request.model, output = %request.output.display()))]
    pub async fn build_index(&self, request: BuildIndexRequest) -> Result<BuildIndexResult, DomainError> {
        request.chunking.validate()?;

        let documents = load_documents(&request.inputs)?;
        let chunks = split_documents(&documents, &RecursiveCharacterSplitter::new(), &request.chunking)?;
        info!(documents = documents.len(), chunks = chunks.len(), "Split documents");

        let embedder = self.embedders.for_model(&request.model)?;
        let index = index::build(&chunks, &embedder, &request.output).await?;

        let chunk_map_rows = match request.chunk_map {
            Some(ref path) => Some(write_chunk_map(&chunks, path)?),
            None => None,
        };

        Ok(BuildIndexResult {
            documents: documents.len(),
            chunks: index.len(),
            dimension: index.manifest().dimension,
            chunk_map_rows,
        })
    }

    /// Add raw texts to an existing index; returns the new entry count
    pub async fn append_index(
        &self,
        path: &Path,
        model: &str,
        texts: &[String],
    ) -> Result<usize, DomainError> {
        if texts.is_empty() {
            return Err(DomainError::empty_input("No texts to append"));
        }

        let embedder = self.embedders.for_model(model)?;
        index::append(path, texts, &embedder).await
    }

    pub async fn open_index(&self, params: &ChatbotParams) -> Result<IndexHandle, DomainError> {
        let embedder = self.embedders.for_model(&params.emb_model)?;
        index::load(Path::new(&params.faiss_idx_path), embedder).await
    }

    pub async fn search(
        &self,
        params: &ChatbotParams,
        query: &str,
    ) -> Result<Vec<SearchHit>, DomainError> {
        self.open_index(params).await?.search(query, params.k).await
    }

    pub async fn inspect_query(
        &self,
        params: &ChatbotParams,
        query: &str,
    ) -> Result<Vec<RetrievedPassage>, DomainError> {
        let handle = Arc::new(self.open_index(params).await?);
        RetrievalEvaluator::new(handle, params.k).inspect(query).await
    }

    pub async fn evaluate_retrieval(
        &self,
        params: &ChatbotParams,
        benchmark_dir: &Path,
        output: &Path,
    ) -> Result<RetrievalSummary, DomainError> {
        let handle = Arc::new(self.open_index(params).await?);
        RetrievalEvaluator::new(handle, params.k)
            .evaluate(benchmark_dir, output)
            .await
    }

    /// Answer the generation benchmarks with the chain `params` describe and judge them
    pub async fn evaluate_generation(
        &self,
        params: &ChatbotParams,
        llm: Arc<dyn LlmProvider>,
        settings: GenerationSettings,
        benchmark_dir: &Path,
        output: &Path,
    ) -> Result<GenerationReport, DomainError> {
        let chain = if params.with_rag {
            let handle = Arc::new(self.open_index(params).await?);
            ChatChain::with_rag(
                llm.clone(),
                &params.chatbot_model,
                handle,
                params.k,
                params.prompt_style,
            )
        } else {
            ChatChain::without_rag(llm.clone(), &params.chatbot_model)
        };
        let chain = chain.with_temperature(settings.temperature);

        GenerationEvaluator::new(Arc::new(chain), llm, &params.judge_model)
            .with_judge_temperature(settings.judge_temperature)
            .with_pacing(settings.pacing)
            .evaluate(benchmark_dir, output)
            .await
    }
}

/// Model settings for a generation run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub judge_temperature: f32,
    pub pacing: Pacing,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            judge_temperature: 0.0,
            pacing: Pacing::default(),
        }
    }
}
