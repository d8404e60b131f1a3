use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::error;

use crate::host::{InstalledApp, PackageInfo};

/// Installed-application list with a search filter.
pub struct AppsStore {
    source: Option<Arc<dyn PackageInfo>>,
    installed: Vec<InstalledApp>,
    search_query: String,
    loading: bool,
    error: Option<String>,
}

impl AppsStore {
    pub fn new(source: Option<Arc<dyn PackageInfo>>) -> Self {
        Self {
            source,
            installed: Vec::new(),
            search_query: String::new(),
            loading: false,
            error: None,
        }
    }

    pub fn installed_apps(&self) -> &[InstalledApp] {
        &self.installed
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Refreshes the list. On failure the previous list is kept and the
    /// message is recorded in [`AppsStore::error`].
    pub async fn load_installed_apps(&mut self) {
        self.loading = true;
        self.error = None;
        match self.fetch().await {
            Ok(apps) => self.installed = apps,
            Err(e) => {
                error!("Failed to load installed apps: {e:#}");
                self.error = Some(format!("{e:#}"));
            }
        }
        self.loading = false;
    }

    async fn fetch(&self) -> Result<Vec<InstalledApp>> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| anyhow!("No package listing available on this host"))?;
        source.installed_apps().await
    }

    pub fn search_apps(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Case-insensitive match on package or display name.
    pub fn filtered_apps(&self) -> Vec<&InstalledApp> {
        if self.search_query.is_empty() {
            return self.installed.iter().collect();
        }
        let q = self.search_query.to_lowercase();
        self.installed
            .iter()
            .filter(|app| {
                app.package_name.to_lowercase().contains(&q)
                    || app.app_name.to_lowercase().contains(&q)
            })
            .collect()
    }
}
