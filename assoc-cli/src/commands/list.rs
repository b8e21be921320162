//! Show records, newest first.

use anyhow::Result;
use brandassoc_client::{Record, Tab};
use std::path::Path;

use super::{format_timestamp, open_engine};

/// Run the list command.
pub async fn run(data_dir: &Path, search: &str, tab: Tab) -> Result<()> {
    let (_, engine) = open_engine(data_dir).await?;
    let total = engine.reload().await?.len();
    let records = engine.filtered(search, tab);

    if records.is_empty() {
        if total == 0 {
            println!("No records yet. Add one with 'brandassoc add'.");
        } else {
            println!("No records match (tab: {}, search: {:?}).", tab, search);
        }
        return Ok(());
    }

    println!("Showing {} of {} records (tab: {})", records.len(), total, tab);
    println!();
    for record in &records {
        println!("{}", render(record));
    }

    Ok(())
}

/// One line per record. Notes stay encrypted and are never shown.
fn render(record: &Record) -> String {
    format!(
        "{:>2}/10 {:<6}  {:<20} {:<14} {:<14} {}",
        record.score,
        strength(record),
        record.brand,
        record.platform,
        short_owner(&record.owner),
        format_timestamp(record.created_at)
    )
}

fn strength(record: &Record) -> &'static str {
    if record.is_strong() {
        "Strong"
    } else {
        "Weak"
    }
}

fn short_owner(owner: &str) -> String {
    if owner.chars().count() > 12 {
        let head: String = owner.chars().take(6).collect();
        let tail: String = owner
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("{}...{}", head, tail)
    } else {
        owner.to_string()
    }
}
