//! Show profile and store status.

use anyhow::Result;
use std::path::Path;

use super::{format_timestamp, open_engine};
use crate::config::ProfileConfig;

/// Run the status command.
pub async fn run(data_dir: &Path) -> Result<()> {
    println!("=== brandassoc status ===");
    println!();

    if !ProfileConfig::exists(data_dir).await {
        println!("Profile: NOT LOGGED IN");
        println!();
        println!("Run 'brandassoc login --account <account>' to start.");
        return Ok(());
    }

    let (profile, engine) = open_engine(data_dir).await?;
    println!("Profile:");
    println!("  Account: {}", profile.account);
    println!("  Since:   {}", format_timestamp(profile.created_at));
    println!();

    println!("Store:");
    println!("  Path:    {}", profile.store_path.display());
    match engine.reload().await {
        Ok(records) => {
            let own = records
                .iter()
                .filter(|r| r.owner == profile.account)
                .count();
            println!("  Status:  AVAILABLE");
            println!("  Records: {} ({} yours)", records.len(), own);
        }
        Err(e) => {
            println!("  Status:  {}", e.user_message());
        }
    }

    Ok(())
}
