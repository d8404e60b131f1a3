use anyhow::Result;
use colored::Colorize;

use crate::cli::Cli;
use crate::icon::{IconPipeline, IconResult};

use super::apps::icon_kind;

const MAX_SRC_WIDTH: usize = 60;

pub async fn run(cli: &Cli, packages: &[String]) -> Result<()> {
    let pipeline = IconPipeline::new(super::icon_capabilities(cli));

    let handles: Vec<_> = packages
        .iter()
        .map(|package| {
            let pipeline = pipeline.clone();
            let package = package.clone();
            tokio::spawn(async move { pipeline.resolve_icon(&package).await })
        })
        .collect();

    for (package, handle) in packages.iter().zip(handles) {
        let result = handle.await?;
        let marker = match result {
            IconResult::Fallback => "!".yellow(),
            _ => "✓".green(),
        };
        println!(
            "{} {:<44} {:<10} {}",
            marker,
            package,
            icon_kind(&result),
            truncate(result.as_src(), MAX_SRC_WIDTH)
        );
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{head}…")
    }
}
