//! Forget the bound account.

use anyhow::Result;
use std::path::Path;

use crate::config::ProfileConfig;

/// Run the logout command. Records in the store are kept.
pub async fn run(data_dir: &Path) -> Result<()> {
    if ProfileConfig::remove(data_dir).await? {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}
