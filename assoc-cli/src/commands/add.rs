//! Encrypt and store a new record.

use anyhow::Result;
use brandassoc_client::{AddInput, TxStatus, KNOWN_PLATFORMS, PENDING_MESSAGE};
use std::path::Path;

use super::open_engine;

/// Run the add command.
pub async fn run(
    data_dir: &Path,
    brand: &str,
    platform: &str,
    score: i32,
    notes: &str,
) -> Result<()> {
    let (_, engine) = open_engine(data_dir).await?;

    if !KNOWN_PLATFORMS.contains(&platform) {
        tracing::warn!("platform {:?} is not one of {:?}", platform, KNOWN_PLATFORMS);
    }

    println!("{}", PENDING_MESSAGE);
    let input = AddInput::new(brand, platform, score).with_notes(notes);

    match engine.add(input).await {
        Ok(record) => {
            if let TxStatus::Succeeded { message } = engine.status() {
                println!("{}", message);
            }
            println!();
            println!("  ID:       {}", record.id);
            println!("  Brand:    {}", record.brand);
            println!("  Platform: {}", record.platform);
            println!("  Score:    {}/10", record.score);
            println!("  Records:  {}", engine.collection().len());
            Ok(())
        }
        Err(e) => {
            if let Some(id) = e.orphan() {
                eprintln!(
                    "Record {} was stored but could not be indexed; it will not be listed.",
                    id
                );
            }
            anyhow::bail!(e.user_message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfileConfig;
    use brandassoc_client::{KvBackend, DEFAULT_INDEX_KEY};
    use tempfile::tempdir;

    use crate::backend::FileBackend;

    async fn logged_in() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        ProfileConfig::new(dir.path(), "0xABC", None)
            .save(dir.path())
            .await
            .unwrap();
        dir
    }

    #[tokio::test]
    async fn add_requires_login() {
        let dir = tempdir().unwrap();
        assert!(run(dir.path(), "Acme", "TV", 8, "").await.is_err());
    }

    #[tokio::test]
    async fn add_stores_and_indexes() {
        let dir = logged_in().await;
        run(dir.path(), "Acme", "TV", 8, "prime time").await.unwrap();
        run(dir.path(), "Globex", "Print", 3, "").await.unwrap();

        let store = FileBackend::new(dir.path().join("store.json"));
        let index = store.get(DEFAULT_INDEX_KEY).await.unwrap();
        let ids: Vec<String> = serde_json::from_slice(&index).unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[tokio::test]
    async fn add_rejects_blank_brand() {
        let dir = logged_in().await;
        let err = run(dir.path(), " ", "TV", 8, "").await.unwrap_err();
        assert_eq!(err.to_string(), "Please fill required fields");
        assert!(!dir.path().join("store.json").exists());
    }

    #[tokio::test]
    async fn add_fails_when_store_directory_missing() {
        let dir = tempdir().unwrap();
        let store = dir.path().join("missing").join("store.json");
        ProfileConfig::new(dir.path(), "0xABC", Some(store.clone()))
            .save(dir.path())
            .await
            .unwrap();

        let err = run(dir.path(), "Acme", "TV", 8, "").await.unwrap_err();
        assert!(err.to_string().contains("unavailable"));
        assert!(!store.exists());
    }
}
