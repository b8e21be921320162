//! Show collection statistics.

use anyhow::Result;
use brandassoc_client::Stats;
use std::path::Path;

use super::open_engine;

/// Run the stats command.
pub async fn run(data_dir: &Path) -> Result<()> {
    let (_, engine) = open_engine(data_dir).await?;
    engine.reload().await?;
    print!("{}", render(&engine.stats()));
    Ok(())
}

fn render(stats: &Stats) -> String {
    format!(
        "Total Associations: {}\nAverage Score:      {:.1}\nStrong Associations: {}\nWeak Associations:   {}\n",
        stats.count, stats.average_score, stats.high_count, stats.low_count
    )
}
