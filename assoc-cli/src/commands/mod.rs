//! CLI command implementations.

use anyhow::Result;
use brandassoc_client::{SyncConfig, SyncEngine};
use std::path::Path;

use crate::backend::FileBackend;
use crate::config::{unix_now, ProfileConfig};

pub mod add;
pub mod check;
pub mod list;
pub mod login;
pub mod logout;
pub mod stats;
pub mod status;

/// Engine over the profile's store, with the profile's account bound.
pub(crate) async fn open_engine(
    data_dir: &Path,
) -> Result<(ProfileConfig, SyncEngine<FileBackend>)> {
    let profile = ProfileConfig::load(data_dir).await?;
    let engine = SyncEngine::new(
        SyncConfig::default(),
        FileBackend::new(&profile.store_path),
    );
    engine.set_account(&profile.account).await;
    Ok((profile, engine))
}

/// Format a Unix timestamp as a human-readable string.
pub(crate) fn format_timestamp(ts: u64) -> String {
    let diff = unix_now().saturating_sub(ts);

    if diff < 60 {
        "just now".to_string()
    } else if diff < 3600 {
        format!("{} minutes ago", diff / 60)
    } else if diff < 86400 {
        format!("{} hours ago", diff / 3600)
    } else {
        format!("{} days ago", diff / 86400)
    }
}
