use anyhow::Result;
use colored::Colorize;

use crate::cli::Cli;

pub async fn run(cli: &Cli) -> Result<()> {
    let mut store = super::open_store(cli).await?;
    store.load_module_version(&cli.module_prop).await;
    let config = store.config();

    println!("{}", "Device Faker".bold());
    println!("{:<20} {}", "Module version", store.module_version());
    println!("{:<20} {}", "Work mode", config.work_mode());
    println!("{:<20} {}", "Templates", config.template_count());
    println!("{:<20} {}", "Faked apps", config.device_faker_count());
    println!(
        "{:<20} {}",
        "Denylist unmount",
        on_off(config.default_force_denylist_unmount.unwrap_or(false))
    );
    println!("{:<20} {}", "Debug", on_off(config.debug.unwrap_or(false)));
    Ok(())
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}
