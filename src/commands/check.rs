use anyhow::Result;
use colored::Colorize;

use crate::cli::Cli;
use crate::config::PackageConfig;

pub async fn run(cli: &Cli, package: &str) -> Result<()> {
    let store = super::open_store(cli).await?;

    match store.get_package_config(package) {
        Some(found) => println!(
            "{} {} is configured (source: {})",
            "✓".green(),
            package,
            found.source()
        ),
        None => println!("{} {} is not configured", "✗".red(), package),
    }
    Ok(())
}

pub async fn show(cli: &Cli, package: &str) -> Result<()> {
    let store = super::open_store(cli).await?;

    let Some(found) = store.get_package_config(package) else {
        println!("{} {} is not configured", "!".yellow(), package);
        return Ok(());
    };

    let body = match found {
        PackageConfig::App(app) => toml::to_string_pretty(app)?,
        PackageConfig::Template { template, .. } => toml::to_string_pretty(template)?,
    };
    println!("# source: {}", found.source());
    print!("{body}");
    Ok(())
}
