//! Capabilities provided by the module host.
//!
//! Different hosts (KernelSU, Magisk, a plain shell) expose different subsets,
//! so everything optional is modeled as present-or-absent in
//! [`HostCapabilities`] instead of being probed at call time.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncRead;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Raw icon bytes as handed out by the package manager.
pub type IconStream = Box<dyn AsyncRead + Send + Unpin>;

pub trait FileHost: Send + Sync {
    fn exists<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<bool>>;
    fn read_to_string<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<String>>;
    fn write<'a>(&'a self, path: &'a Path, content: &'a str) -> BoxFuture<'a, Result<()>>;
    fn create_dir_all<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<()>>;
}

/// Package-manager style icon access, keyed by normalized package name.
pub trait PackageManager: Send + Sync {
    fn application_icon<'a>(&'a self, package: &'a str)
        -> BoxFuture<'a, Result<Option<IconStream>>>;
}

/// Privileged package metadata access (KernelSU style).
pub trait PackageInfo: Send + Sync {
    fn installed_apps(&self) -> BoxFuture<'_, Result<Vec<InstalledApp>>>;
}

/// Best-effort system lookup; may always return nothing when sandboxed.
pub trait SystemIconLookup: Send + Sync {
    fn lookup_icon<'a>(&'a self, package: &'a str) -> BoxFuture<'a, Result<Option<String>>>;
}

#[derive(Clone, Default)]
pub struct HostCapabilities {
    pub package_manager: Option<Arc<dyn PackageManager>>,
    pub package_info: Option<Arc<dyn PackageInfo>>,
    pub system: Option<Arc<dyn SystemIconLookup>>,
}

impl HostCapabilities {
    pub fn with_package_manager(mut self, pm: impl PackageManager + 'static) -> Self {
        self.package_manager = Some(Arc::new(pm));
        self
    }

    pub fn with_package_info(mut self, info: impl PackageInfo + 'static) -> Self {
        self.package_info = Some(Arc::new(info));
        self
    }

    pub fn with_system(mut self, system: impl SystemIconLookup + 'static) -> Self {
        self.system = Some(Arc::new(system));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledApp {
    pub package_name: String,
    pub app_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_code: Option<u64>,
}

/// Local filesystem through `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileHost for LocalFs {
    fn exists<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            tokio::fs::try_exists(path)
                .await
                .with_context(|| format!("Failed to stat {}", path.display()))
        })
    }

    fn read_to_string<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))
        })
    }

    fn write<'a>(&'a self, path: &'a Path, content: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            tokio::fs::write(path, content)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))
        })
    }

    fn create_dir_all<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            tokio::fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create {}", path.display()))
        })
    }
}

/// Serves `<dir>/<package>.png` as the package's icon stream.
#[derive(Debug, Clone)]
pub struct IconDirectory {
    dir: PathBuf,
}

impl IconDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PackageManager for IconDirectory {
    fn application_icon<'a>(
        &'a self,
        package: &'a str,
    ) -> BoxFuture<'a, Result<Option<IconStream>>> {
        Box::pin(async move {
            let path = self.dir.join(format!("{package}.png"));
            match tokio::fs::File::open(&path).await {
                Ok(file) => Ok(Some(Box::new(file) as IconStream)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e).with_context(|| format!("Failed to open {}", path.display())),
            }
        })
    }
}

/// Enumerates third-party packages with `cmd package list packages`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CmdPackageHost;

impl PackageInfo for CmdPackageHost {
    fn installed_apps(&self) -> BoxFuture<'_, Result<Vec<InstalledApp>>> {
        Box::pin(async move {
            let output = tokio::process::Command::new("cmd")
                .args(["package", "list", "packages", "-3", "--show-versioncode"])
                .output()
                .await
                .context("Failed to run `cmd package`")?;

            if !output.status.success() {
                bail!(
                    "`cmd package` exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }

            Ok(parse_package_list(&String::from_utf8_lossy(&output.stdout)))
        })
    }
}

/// Parses lines like `package:com.foo versionCode:123`.
pub fn parse_package_list(output: &str) -> Vec<InstalledApp> {
    let mut apps: Vec<InstalledApp> = output
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let package = parts.next()?.strip_prefix("package:")?;
            if package.is_empty() {
                return None;
            }
            let version_code = parts
                .find_map(|p| p.strip_prefix("versionCode:"))
                .and_then(|v| v.parse().ok());
            Some(InstalledApp {
                package_name: package.to_string(),
                app_name: package.to_string(),
                icon: None,
                version_name: None,
                version_code,
            })
        })
        .collect();
    apps.sort_by(|a, b| a.package_name.cmp(&b.package_name));
    apps
}
