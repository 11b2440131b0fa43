use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use hustle_board_libs::{parse_contest_data, parse_vjudge_contests};
use std::path::PathBuf;

#[derive(Debug, ValueEnum, Clone)]
pub enum PageKind {
    /// The contest list page.
    List,
    /// A contest standings page.
    Detail,
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    #[arg(value_enum)]
    kind: PageKind,
    path: PathBuf,
}

pub async fn run(args: ParseArgs) -> Result<()> {
    let path = args.path;
    let markdown = tokio::fs::read_to_string(&path).await.with_context(|| {
        let message = format!("failed to read {}", path.display());
        tracing::error!(message);
        message
    })?;

    let json = match args.kind {
        PageKind::List => serde_json::to_string_pretty(&parse_vjudge_contests(&markdown))?,
        PageKind::Detail => serde_json::to_string_pretty(&parse_contest_data(&markdown))?,
    };
    println!("{}", json);

    Ok(())
}
