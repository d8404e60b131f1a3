use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, error};

use crate::config::{AppConfig, Config, Mode, PackageConfig, Template};
use crate::host::FileHost;
use crate::module_prop::{self, DEFAULT_VERSION};

/// Owns the in-memory configuration document and its persisted file.
///
/// Mutations never touch disk; call [`ConfigStore::save`] to persist.
pub struct ConfigStore {
    fs: Arc<dyn FileHost>,
    path: PathBuf,
    config: Config,
    module_version: String,
    loading: bool,
    error: Option<String>,
}

impl ConfigStore {
    pub fn new(fs: Arc<dyn FileHost>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
            config: Config::default(),
            module_version: DEFAULT_VERSION.to_string(),
            loading: false,
            error: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn module_version(&self) -> &str {
        &self.module_version
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message of the last failed load or save, cleared when either starts.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Loads the document, creating and persisting the initial one when the
    /// file is absent. Failures are recorded in [`ConfigStore::error`].
    pub async fn load(&mut self) {
        self.loading = true;
        self.error = None;
        if let Err(e) = self.try_load().await {
            error!("Failed to load config: {e:#}");
            self.error = Some(format!("{e:#}"));
        }
        self.loading = false;
    }

    async fn try_load(&mut self) -> Result<()> {
        if !self.fs.exists(&self.path).await? {
            debug!(path = %self.path.display(), "config missing, writing initial document");
            if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
                self.fs.create_dir_all(dir).await?;
            }
            self.config = Config::initial();
            return self.write().await;
        }

        let content = self.fs.read_to_string(&self.path).await?;
        self.config = Config::from_toml(&content)?;
        Ok(())
    }

    /// Persists the document. The error is both recorded and returned.
    pub async fn save(&mut self) -> Result<()> {
        self.loading = true;
        self.error = None;
        let result = self.write().await;
        if let Err(e) = &result {
            error!("Failed to save config: {e:#}");
            self.error = Some(format!("{e:#}"));
        }
        self.loading = false;
        result
    }

    async fn write(&self) -> Result<()> {
        let content = self.config.to_toml()?;
        self.fs.write(&self.path, &content).await
    }

    /// Reads `version=` from the module metadata; leaves the current value
    /// in place when the file or the key is missing.
    pub async fn load_module_version(&mut self, path: &Path) {
        match self.fs.read_to_string(path).await {
            Ok(content) => {
                if let Some(version) = module_prop::parse_version(&content) {
                    self.module_version = version.to_string();
                }
            }
            Err(e) => error!("Failed to load module version: {e:#}"),
        }
    }

    pub fn set_template(&mut self, name: impl Into<String>, template: Template) {
        self.config.set_template(name, template);
    }

    pub fn delete_template(&mut self, name: &str) -> Option<Template> {
        self.config.delete_template(name)
    }

    pub fn set_app(&mut self, app: AppConfig) {
        self.config.set_app(app);
    }

    pub fn delete_app(&mut self, package: &str) -> usize {
        self.config.delete_app(package)
    }

    pub fn is_package_configured(&self, package: &str) -> bool {
        self.config.is_package_configured(package)
    }

    pub fn get_package_config(&self, package: &str) -> Option<PackageConfig<'_>> {
        self.config.get_package_config(package)
    }

    /// Flips the default mode between lite and full, then saves.
    pub async fn toggle_work_mode(&mut self) -> Result<Mode> {
        let mode = self.config.work_mode().toggled();
        self.config.default_mode = Some(mode);
        self.save().await?;
        Ok(mode)
    }
}
