pub mod app;
pub mod apps;
pub mod check;
pub mod icon;
pub mod init;
pub mod mode;
pub mod settings;
pub mod status;
pub mod template;

use std::sync::Arc;

use anyhow::{bail, Result};

use crate::cli::Cli;
use crate::host::{CmdPackageHost, HostCapabilities, IconDirectory, LocalFs, PackageInfo};
use crate::store::ConfigStore;

/// Loads the config store for a command, failing if the document can't be read.
pub async fn open_store(cli: &Cli) -> Result<ConfigStore> {
    let mut store = ConfigStore::new(Arc::new(LocalFs), &cli.config);
    store.load().await;
    if let Some(err) = store.error() {
        bail!("{err}");
    }
    Ok(store)
}

/// Icon sources available when running directly on the device. There is no
/// `ksu://` resolver outside the WebUI, so only exported icons are used.
pub fn icon_capabilities(cli: &Cli) -> HostCapabilities {
    let caps = HostCapabilities::default();
    match &cli.icon_dir {
        Some(dir) => caps.with_package_manager(IconDirectory::new(dir)),
        None => caps,
    }
}

pub fn package_listing() -> Arc<dyn PackageInfo> {
    Arc::new(CmdPackageHost)
}
