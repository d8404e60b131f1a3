use anyhow::Result;
use colored::Colorize;

use crate::cli::Cli;

pub async fn run(cli: &Cli) -> Result<()> {
    let mut store = super::open_store(cli).await?;
    let mode = store.toggle_work_mode().await?;
    println!("{} Default mode is now {}", "✓".green(), mode.to_string().bold());
    Ok(())
}
