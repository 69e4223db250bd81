//! Ask command - answer one question from the terminal

use clap::Args;

use crate::config::AppConfig;
use crate::domain::{AnswerChain, Preset};

#[derive(Args, Debug)]
pub struct AskArgs {
    pub question: String,

    #[arg(long)]
    pub preset: Option<Preset>,

    /// Skip retrieval regardless of the params' with_rag
    #[arg(long)]
    pub no_rag: bool,

    #[arg(long)]
    pub k: Option<usize>,
}

pub async fn run(config: &AppConfig, args: AskArgs) -> anyhow::Result<()> {
    let mut params = crate::resolve_params(config, args.preset).await?;
    if args.no_rag {
        params.with_rag = false;
    }
    if let Some(k) = args.k {
        params.k = k;
    }
    params.ensure_valid()?;

    let chain = crate::create_chatbot_service(config)?
        .chain_for(&params)
        .await?;
    let answer = chain.invoke(&args.question).await?;

    println!("{}", answer);
    Ok(())
}
