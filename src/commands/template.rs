use anyhow::{bail, Result};
use colored::Colorize;

use crate::cli::{Cli, DeviceArgs, ModeArg, TemplateAction};
use crate::config::Template;

pub async fn run(cli: &Cli, action: &TemplateAction) -> Result<()> {
    let mut store = super::open_store(cli).await?;

    match action {
        TemplateAction::List => {
            let templates = store.config().templates();
            println!("{}", "Templates".bold());
            println!("{:<24} {:<10} {:<24} Packages", "Name", "Mode", "Model");
            println!("{}", "-".repeat(70));
            for (name, template) in templates {
                let mode = template
                    .mode
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "-".to_string());
                let model = template.device.model.as_deref().unwrap_or("-");
                println!(
                    "{:<24} {:<10} {:<24} {}",
                    name,
                    mode,
                    model,
                    template.packages().join(", ")
                );
            }
            println!("\nTotal: {}", templates.len());
        }
        TemplateAction::Set {
            name,
            packages,
            add,
            mode,
            device,
        } => {
            let existing = store.config().templates().get(name).cloned();
            let created = existing.is_none();
            let template = apply(
                existing.unwrap_or_default(),
                packages.clone(),
                add.clone(),
                *mode,
                device.clone(),
            );
            store.set_template(name.clone(), template);
            store.save().await?;
            let verb = if created { "Created" } else { "Updated" };
            println!("{} {verb} template '{name}'", "✓".green());
        }
        TemplateAction::Delete { name } => {
            if store.delete_template(name).is_none() {
                bail!("Template '{name}' not found");
            }
            store.save().await?;
            println!("{} Deleted template '{name}'", "✓".green());
        }
    }

    Ok(())
}

/// Applies command-line edits to a template.
pub fn apply(
    mut template: Template,
    packages: Option<Vec<String>>,
    add: Option<Vec<String>>,
    mode: Option<ModeArg>,
    device: DeviceArgs,
) -> Template {
    if let Some(packages) = packages {
        template.packages = Some(packages);
    }
    if let Some(add) = add {
        let list = template.packages.get_or_insert_with(Vec::new);
        for package in add {
            if !list.contains(&package) {
                list.push(package);
            }
        }
    }
    if let Some(mode) = mode {
        template.mode = Some(mode.into());
    }
    template.device.merge(device.into());
    template
}
