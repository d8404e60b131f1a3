use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::package::{has_user_suffix, normalize_package_name};

pub const CONFIG_PATH: &str = "/data/adb/device_faker/config/config.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_mode: Option<Mode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_force_denylist_unmount: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,

    // always written, even when empty; the module's reader requires `apps`
    #[serde(default)]
    pub templates: BTreeMap<String, Template>,

    #[serde(default)]
    pub apps: Vec<AppConfig>,
}

/// How the spoofing engine applies a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Lite,
    Full,
    Resetprop,
}

impl Mode {
    pub fn toggled(self) -> Mode {
        match self {
            Mode::Lite => Mode::Full,
            // resetprop is never a toggle target; toggling it returns to lite
            Mode::Full | Mode::Resetprop => Mode::Lite,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Lite => write!(f, "lite"),
            Mode::Full => write!(f, "full"),
            Mode::Resetprop => write!(f, "resetprop"),
        }
    }
}

/// Fake identity fields. A present field means "override this property".
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DeviceInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub characteristics: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_denylist_unmount: Option<bool>,
}

impl DeviceInfo {
    pub fn is_empty(&self) -> bool {
        *self == DeviceInfo::default()
    }

    /// Overlays every field set in `other` onto `self`.
    pub fn merge(&mut self, other: DeviceInfo) {
        fn take<T>(dst: &mut Option<T>, src: Option<T>) {
            if src.is_some() {
                *dst = src;
            }
        }
        take(&mut self.manufacturer, other.manufacturer);
        take(&mut self.brand, other.brand);
        take(&mut self.model, other.model);
        take(&mut self.device, other.device);
        take(&mut self.product, other.product);
        take(&mut self.name, other.name);
        take(&mut self.marketname, other.marketname);
        take(&mut self.fingerprint, other.fingerprint);
        take(&mut self.characteristics, other.characteristics);
        take(
            &mut self.force_denylist_unmount,
            other.force_denylist_unmount,
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Template {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(flatten)]
    pub device: DeviceInfo,
}

impl Template {
    pub fn packages(&self) -> &[String] {
        self.packages.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    pub package: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(flatten)]
    pub device: DeviceInfo,
}

impl AppConfig {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            mode: None,
            device: DeviceInfo::default(),
        }
    }
}

/// The configuration that applies to a package, and where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PackageConfig<'a> {
    App(&'a AppConfig),
    Template {
        source: &'a str,
        template: &'a Template,
    },
}

impl<'a> PackageConfig<'a> {
    /// `"app"` for overrides, otherwise the template name.
    pub fn source(&self) -> &'a str {
        match *self {
            PackageConfig::App(_) => "app",
            PackageConfig::Template { source, .. } => source,
        }
    }

    pub fn mode(&self) -> Option<Mode> {
        match *self {
            PackageConfig::App(app) => app.mode,
            PackageConfig::Template { template, .. } => template.mode,
        }
    }

    pub fn device(&self) -> &'a DeviceInfo {
        match *self {
            PackageConfig::App(app) => &app.device,
            PackageConfig::Template { template, .. } => &template.device,
        }
    }
}

impl Config {
    /// Document written on first run.
    pub fn initial() -> Self {
        Self {
            default_mode: Some(Mode::Lite),
            ..Default::default()
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config")
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    pub fn work_mode(&self) -> Mode {
        self.default_mode.unwrap_or_default()
    }

    pub fn templates(&self) -> &BTreeMap<String, Template> {
        &self.templates
    }

    pub fn apps(&self) -> &[AppConfig] {
        &self.apps
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    /// Packages listed across all templates plus the number of app overrides.
    pub fn device_faker_count(&self) -> usize {
        let in_templates: usize = self.templates.values().map(|t| t.packages().len()).sum();
        in_templates + self.apps.len()
    }

    pub fn set_template(&mut self, name: impl Into<String>, template: Template) {
        self.templates.insert(name.into(), template);
    }

    pub fn delete_template(&mut self, name: &str) -> Option<Template> {
        self.templates.remove(name)
    }

    /// Replaces the override with the same package, or appends.
    pub fn set_app(&mut self, app: AppConfig) {
        match self.apps.iter_mut().find(|a| a.package == app.package) {
            Some(existing) => *existing = app,
            None => self.apps.push(app),
        }
    }

    /// Removes every override with exactly this package. Returns how many were removed.
    pub fn delete_app(&mut self, package: &str) -> usize {
        let before = self.apps.len();
        self.apps.retain(|a| a.package != package);
        before - self.apps.len()
    }

    pub fn is_package_configured(&self, package: &str) -> bool {
        self.get_package_config(package).is_some()
    }

    /// Resolves the configuration for `package`.
    ///
    /// Exact matches win, app overrides before templates. Only when the query
    /// carries a `@<user>` suffix are stored identifiers compared by their
    /// suffix-stripped form, again overrides first.
    pub fn get_package_config(&self, package: &str) -> Option<PackageConfig<'_>> {
        if let Some(found) = self.find_config(|candidate| candidate == package) {
            return Some(found);
        }

        if !has_user_suffix(package) {
            return None;
        }

        let base = normalize_package_name(package);
        self.find_config(|candidate| normalize_package_name(candidate) == base)
    }

    fn find_config(&self, matches: impl Fn(&str) -> bool) -> Option<PackageConfig<'_>> {
        if let Some(app) = self.apps.iter().find(|a| matches(&a.package)) {
            return Some(PackageConfig::App(app));
        }

        self.templates
            .iter()
            .find(|(_, t)| t.packages().iter().any(|p| matches(p)))
            .map(|(name, template)| PackageConfig::Template {
                source: name,
                template,
            })
    }
}
