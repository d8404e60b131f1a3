use anyhow::Result;
use colored::Colorize;

use crate::cli::Cli;

pub async fn run(cli: &Cli) -> Result<()> {
    let existed = cli.config.exists();
    let store = super::open_store(cli).await?;

    if existed {
        println!(
            "{} Config is valid ({})",
            "✓".green(),
            cli.config.display()
        );
    } else {
        println!("{} Created {}", "✓".green(), cli.config.display());
    }
    println!("Default mode: {}", store.config().work_mode());
    Ok(())
}
