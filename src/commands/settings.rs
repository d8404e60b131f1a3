use anyhow::Result;
use colored::Colorize;

use crate::cli::Cli;
use crate::settings::{Language, SettingsStore, Theme};

pub fn run(cli: &Cli, theme: Option<Theme>, language: Option<Language>) -> Result<()> {
    let mut store = SettingsStore::load(&cli.settings);

    if let Some(theme) = theme {
        store.set_theme(theme)?;
    }
    if let Some(language) = language {
        store.set_language(language)?;
    }
    if theme.is_some() || language.is_some() {
        println!("{} Saved {}", "✓".green(), cli.settings.display());
    }

    let settings = store.settings();
    println!("{:<10} {}", "Theme", settings.theme);
    println!("{:<10} {}", "Language", settings.language);
    Ok(())
}
