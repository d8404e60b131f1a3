use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{DeviceInfo, Mode};
use crate::settings::{Language, Theme};

#[derive(Parser)]
#[command(
    name = "device-faker-ui",
    about = "Manage Device Faker templates, per-app overrides and app icons"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, global = true, default_value = crate::config::CONFIG_PATH)]
    pub config: PathBuf,

    /// Path to the module's module.prop
    #[arg(long, global = true, default_value = crate::module_prop::MODULE_PROP_PATH)]
    pub module_prop: PathBuf,

    /// Path to the local UI settings file
    #[arg(long, global = true, default_value = crate::settings::SETTINGS_PATH)]
    pub settings: PathBuf,

    /// Directory of exported `<package>.png` icons
    #[arg(long, global = true)]
    pub icon_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the config, creating a default one if it does not exist
    Init,

    /// Show module version, work mode and counts
    Status,

    /// Check whether a package is configured
    Check {
        /// Package name, optionally with an `@<user>` suffix
        package: String,
    },

    /// Print the configuration that applies to a package
    Show {
        /// Package name, optionally with an `@<user>` suffix
        package: String,
    },

    /// Manage device templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Manage per-app overrides
    App {
        #[command(subcommand)]
        action: AppAction,
    },

    /// Switch the default mode between lite and full
    ToggleMode,

    /// List installed apps
    Apps {
        /// Filter by package or app name
        #[arg(long)]
        search: Option<String>,

        /// Resolve an icon for every listed app
        #[arg(long)]
        icons: bool,
    },

    /// Resolve icons for packages
    Icon {
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Show or change UI settings
    Settings {
        #[arg(long)]
        theme: Option<Theme>,

        #[arg(long)]
        language: Option<Language>,
    },
}

#[derive(Subcommand)]
pub enum TemplateAction {
    /// List templates
    List,

    /// Create or update a template
    Set {
        name: String,

        /// Packages the template applies to (comma-separated); replaces the current list
        #[arg(long, value_delimiter = ',')]
        packages: Option<Vec<String>>,

        /// Add packages to the current list (comma-separated)
        #[arg(long, value_delimiter = ',', conflicts_with = "packages")]
        add: Option<Vec<String>>,

        #[arg(long)]
        mode: Option<ModeArg>,

        #[command(flatten)]
        device: DeviceArgs,
    },

    /// Delete a template
    Delete { name: String },
}

#[derive(Subcommand)]
pub enum AppAction {
    /// Create or update a per-app override
    Set {
        package: String,

        #[arg(long)]
        mode: Option<ModeArg>,

        #[command(flatten)]
        device: DeviceArgs,
    },

    /// Delete a per-app override
    Delete { package: String },
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum ModeArg {
    Lite,
    Full,
    Resetprop,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Lite => Mode::Lite,
            ModeArg::Full => Mode::Full,
            ModeArg::Resetprop => Mode::Resetprop,
        }
    }
}

#[derive(Args, Clone, Debug, Default)]
pub struct DeviceArgs {
    #[arg(long)]
    pub manufacturer: Option<String>,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub device: Option<String>,
    #[arg(long)]
    pub product: Option<String>,
    /// ro.product.name
    #[arg(long = "product-name", id = "product_name")]
    pub name: Option<String>,
    #[arg(long)]
    pub marketname: Option<String>,
    #[arg(long)]
    pub fingerprint: Option<String>,
    #[arg(long)]
    pub characteristics: Option<String>,
    /// Unmount for processes on the denylist
    #[arg(long)]
    pub force_denylist_unmount: Option<bool>,
}

impl From<DeviceArgs> for DeviceInfo {
    fn from(args: DeviceArgs) -> Self {
        DeviceInfo {
            manufacturer: args.manufacturer,
            brand: args.brand,
            model: args.model,
            device: args.device,
            product: args.product,
            name: args.name,
            marketname: args.marketname,
            fingerprint: args.fingerprint,
            characteristics: args.characteristics,
            force_denylist_unmount: args.force_denylist_unmount,
        }
    }
}
