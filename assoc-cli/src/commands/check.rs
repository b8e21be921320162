//! Probe store availability.

use anyhow::Result;
use std::path::Path;

use super::open_engine;

/// Run the check command. Fails if the store is unavailable.
pub async fn run(data_dir: &Path) -> Result<()> {
    let (profile, engine) = open_engine(data_dir).await?;

    if engine.check_availability().await? {
        println!("Store available: {}", profile.store_path.display());
        Ok(())
    } else {
        anyhow::bail!("Store unavailable: {}", profile.store_path.display())
    }
}
