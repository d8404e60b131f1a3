use anyhow::{bail, Result};
use colored::Colorize;
use tracing::warn;

use crate::apps::AppsStore;
use crate::cli::Cli;
use crate::icon::{IconPipeline, IconResult, IntersectionEntry, PRELOAD_COUNT};

pub async fn run(cli: &Cli, search: Option<String>, icons: bool) -> Result<()> {
    let store = super::open_store(cli).await?;
    let mut apps = AppsStore::new(Some(super::package_listing()));
    apps.load_installed_apps().await;
    if let Some(err) = apps.error() {
        bail!("{err}");
    }
    if let Some(query) = search {
        apps.search_apps(query);
    }
    let listed = apps.filtered_apps();
    let packages: Vec<&str> = listed.iter().map(|a| a.package_name.as_str()).collect();

    let pipeline = IconPipeline::new(super::icon_capabilities(cli));
    if icons {
        pipeline.preload_visible_icons(&packages).await;
        scroll_through(&pipeline, &packages).await;
    }

    println!("{}", "Installed Apps".bold());
    println!("{:<44} {:<14} {:<12} Icon", "Package", "Version", "Configured");
    println!("{}", "-".repeat(80));
    for app in &listed {
        let version = app
            .version_name
            .clone()
            .or_else(|| app.version_code.map(|c| c.to_string()))
            .unwrap_or_else(|| "-".to_string());
        let configured = match store.get_package_config(&app.package_name) {
            Some(found) => found.source().green().to_string(),
            None => "-".to_string(),
        };
        let icon = pipeline
            .icon(&app.package_name)
            .map(|r| icon_kind(&r))
            .unwrap_or("-");
        println!(
            "{:<44} {:<14} {:<12} {}",
            app.package_name, version, configured, icon
        );
    }
    println!("\nTotal: {}", listed.len());

    Ok(())
}

/// Feeds the rows after the preloaded ones to an observer one page at a time.
async fn scroll_through(pipeline: &IconPipeline, packages: &[&str]) {
    let mut observer = pipeline.observer();
    for (row, package) in packages.iter().enumerate() {
        observer.observe(format!("row-{row}"), *package);
    }

    let rows: Vec<usize> = (PRELOAD_COUNT..packages.len()).collect();
    for page in rows.chunks(PRELOAD_COUNT) {
        let entries: Vec<_> = page
            .iter()
            .map(|row| IntersectionEntry::visible(format!("row-{row}")))
            .collect();
        for handle in observer.on_intersection(&entries) {
            if let Err(e) = handle.await {
                warn!("icon load task failed: {e}");
            }
        }
    }
    observer.disconnect();
}

pub fn icon_kind(result: &IconResult) -> &'static str {
    match result {
        IconResult::Inline(_) => "inline",
        IconResult::Reference(_) => "reference",
        IconResult::Fallback => "fallback",
    }
}
