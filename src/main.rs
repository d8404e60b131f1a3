use anyhow::Result;
use clap::Parser;
use device_faker_ui::cli::{Cli, Commands};
use device_faker_ui::commands;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match &cli.command {
        Commands::Init => commands::init::run(&cli).await,
        Commands::Status => commands::status::run(&cli).await,
        Commands::Check { package } => commands::check::run(&cli, package).await,
        Commands::Show { package } => commands::check::show(&cli, package).await,
        Commands::Template { action } => commands::template::run(&cli, action).await,
        Commands::App { action } => commands::app::run(&cli, action).await,
        Commands::ToggleMode => commands::mode::run(&cli).await,
        Commands::Apps { search, icons } => {
            commands::apps::run(&cli, search.clone(), *icons).await
        }
        Commands::Icon { packages } => commands::icon::run(&cli, packages).await,
        Commands::Settings { theme, language } => {
            commands::settings::run(&cli, *theme, *language)
        }
    }
}

/// `RUST_LOG` wins; otherwise `debug` when the config enables it, else `warn`.
fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if config_debug_enabled(cli) { "debug" } else { "warn" };
        EnvFilter::new(level)
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn config_debug_enabled(cli: &Cli) -> bool {
    std::fs::read_to_string(&cli.config)
        .ok()
        .and_then(|content| device_faker_ui::config::Config::from_toml(&content).ok())
        .and_then(|config| config.debug)
        .unwrap_or(false)
}
