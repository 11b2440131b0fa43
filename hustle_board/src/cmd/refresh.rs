use crate::cmd::{build_refresher, open_store, StoreKind};
use crate::config::HustleConfig;
use anyhow::Result;
use clap::Args;
use hustle_board_libs::RefreshOutcome;

#[derive(Debug, Args)]
pub struct RefreshArgs {
    #[arg(long, value_enum, default_value_t = StoreKind::Postgres)]
    store: StoreKind,
}

pub async fn run(args: RefreshArgs) -> Result<()> {
    let config = HustleConfig::from_env()?;
    let store = open_store(&args.store, &config).await?;
    let refresher = build_refresher(&config, store)?;

    match refresher.refresh().await {
        Ok(RefreshOutcome::UpToDate { contest_id }) => {
            tracing::info!("Nothing to do, contest {} is already merged.", contest_id);
            Ok(())
        }
        Ok(RefreshOutcome::Updated(summary)) => {
            tracing::info!(
                "Contest {} ({}) merged: {} participants, {} new entries.",
                summary.latest_contest_id,
                summary.latest_contest_title,
                summary.participants,
                summary.added
            );
            Ok(())
        }
        Err(e) => {
            let message = format!("failed to refresh the leaderboard: {}", e);
            tracing::error!(message);
            anyhow::bail!(message)
        }
    }
}
