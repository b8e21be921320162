//! Bind an account to the profile.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::ProfileConfig;

/// Run the login command.
pub async fn run(data_dir: &Path, account: &str, store: Option<PathBuf>) -> Result<()> {
    let account = account.trim();
    if account.is_empty() {
        anyhow::bail!("Account must not be empty");
    }

    if let Ok(previous) = ProfileConfig::load(data_dir).await {
        if previous.account == account {
            println!("Already logged in as {}", account);
            return Ok(());
        }
        println!("Switching account from {}", previous.account);
    }

    let profile = ProfileConfig::new(data_dir, account, store);
    profile.save(data_dir).await?;

    println!("Logged in successfully!");
    println!();
    println!("  Account:  {}", profile.account);
    println!("  Store:    {}", profile.store_path.display());
    println!("  Data dir: {}", data_dir.display());
    println!();
    println!("Next steps:");
    println!("  1. Record an association: brandassoc add --brand <brand> --platform <platform> --score <1-10>");
    println!("  2. Browse records: brandassoc list");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn login_creates_profile() {
        let dir = tempdir().unwrap();
        run(dir.path(), "0xABC", None).await.unwrap();

        let profile = ProfileConfig::load(dir.path()).await.unwrap();
        assert_eq!(profile.account, "0xABC");
        assert_eq!(profile.store_path, dir.path().join("store.json"));
    }

    #[tokio::test]
    async fn login_switches_account() {
        let dir = tempdir().unwrap();
        run(dir.path(), "0xABC", None).await.unwrap();
        run(dir.path(), "0xDEF", None).await.unwrap();

        let profile = ProfileConfig::load(dir.path()).await.unwrap();
        assert_eq!(profile.account, "0xDEF");
    }

    #[tokio::test]
    async fn login_rejects_blank_account() {
        let dir = tempdir().unwrap();
        assert!(run(dir.path(), "   ", None).await.is_err());
        assert!(!ProfileConfig::exists(dir.path()).await);
    }
}
