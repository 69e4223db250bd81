//! Update-config command - rewrites params.json

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{ParamsUpdate, Preset, PromptStyle};

#[derive(Args, Debug)]
pub struct UpdateConfigArgs {
    /// Start from this preset instead of the current file
    #[arg(long)]
    pub preset: Option<Preset>,

    #[arg(long)]
    pub emb_model: Option<String>,

    #[arg(long)]
    pub faiss_idx_path: Option<String>,

    #[arg(long)]
    pub k: Option<usize>,

    #[arg(long)]
    pub chatbot_model: Option<String>,

    #[arg(long)]
    pub judge_model: Option<String>,

    #[arg(long)]
    pub with_rag: Option<bool>,

    #[arg(long)]
    pub prompt_style: Option<PromptStyle>,
}

impl UpdateConfigArgs {
    pub fn to_update(&self) -> ParamsUpdate {
        ParamsUpdate {
            emb_model: self.emb_model.clone(),
            faiss_idx_path: self.faiss_idx_path.clone(),
            k: self.k,
            chatbot_model: self.chatbot_model.clone(),
            judge_model: self.judge_model.clone(),
            with_rag: self.with_rag,
            prompt_style: self.prompt_style,
        }
    }
}

/// Without flags the current params are printed unchanged
pub async fn run(config: &AppConfig, args: UpdateConfigArgs) -> anyhow::Result<()> {
    let store = crate::params_store(config);
    let update = args.to_update();

    let params = match args.preset {
        Some(preset) => {
            let mut params = preset.params();
            params.apply(update)?;
            store.save(&params).await?;
            info!(preset = %preset, path = %store.path().display(), "Params reset from preset");
            params
        }
        None if update.is_empty() => store.load().await?,
        None => store.update(update).await?,
    };

    println!("{}", serde_json::to_string_pretty(&params)?);
    Ok(())
}
