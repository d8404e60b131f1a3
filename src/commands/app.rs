use anyhow::{bail, Result};
use colored::Colorize;

use crate::cli::{AppAction, Cli};
use crate::config::AppConfig;

pub async fn run(cli: &Cli, action: &AppAction) -> Result<()> {
    let mut store = super::open_store(cli).await?;

    match action {
        AppAction::Set {
            package,
            mode,
            device,
        } => {
            let existing = store
                .config()
                .apps()
                .iter()
                .find(|a| a.package == *package)
                .cloned();
            let created = existing.is_none();
            let mut app = existing.unwrap_or_else(|| AppConfig::new(package.clone()));
            if let Some(mode) = mode {
                app.mode = Some((*mode).into());
            }
            app.device.merge(device.clone().into());

            if app.device.is_empty() {
                println!(
                    "{} Override for {package} sets no device fields",
                    "!".yellow()
                );
            }

            store.set_app(app);
            store.save().await?;
            let verb = if created { "Added" } else { "Updated" };
            println!("{} {verb} override for {package}", "✓".green());
        }
        AppAction::Delete { package } => {
            if store.delete_app(package) == 0 {
                bail!("No override for {package}");
            }
            store.save().await?;
            println!("{} Deleted override for {package}", "✓".green());
        }
    }

    Ok(())
}
