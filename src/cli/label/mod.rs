//! Label-uuids command - stamps every row of Q/A CSVs with a fresh uuid

use std::path::PathBuf;

use clap::Args;

use crate::infrastructure::ingestion::label_uuids;

#[derive(Args, Debug)]
pub struct LabelUuidsArgs {
    /// CSV files to rewrite in place
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

pub fn run(args: LabelUuidsArgs) -> anyhow::Result<()> {
    for path in &args.paths {
        let rows = label_uuids(path)?;
        println!("{}: labelled {} rows", path.display(), rows);
    }
    Ok(())
}
