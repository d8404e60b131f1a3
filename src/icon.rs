//! App icon resolution.
//!
//! [`IconPipeline`] turns a package identifier into something displayable by
//! walking the available host capabilities in order: package-manager icon
//! stream, `ksu://` reference, system lookup, and finally the fallback marker.
//! Results are cached per pipeline instance under the identifier exactly as
//! requested, so `com.foo` and `com.foo@10` are cached separately.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::ImageFormat;
use parking_lot::Mutex;
use tokio::io::AsyncReadExt;
use tokio::sync::{OnceCell, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::host::{HostCapabilities, PackageManager};
use crate::package::normalize_package_name;

pub const MAX_CONCURRENT_LOADS: usize = 3;
pub const PRELOAD_COUNT: usize = 10;
pub const KSU_ICON_PREFIX: &str = "ksu://icon/";
pub const FALLBACK: &str = "fallback";

const PNG_DATA_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconResult {
    /// `data:image/png;base64,...`
    Inline(String),
    /// A reference the presentation layer resolves itself, e.g. `ksu://icon/com.foo`.
    Reference(String),
    Fallback,
}

impl IconResult {
    /// The string an `<img src>` would receive.
    pub fn as_src(&self) -> &str {
        match self {
            IconResult::Inline(src) | IconResult::Reference(src) => src,
            IconResult::Fallback => FALLBACK,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, IconResult::Fallback)
    }

    fn from_src(src: String) -> Self {
        if src.starts_with("data:") {
            IconResult::Inline(src)
        } else {
            IconResult::Reference(src)
        }
    }
}

#[derive(Default)]
struct State {
    cache: HashMap<String, IconResult>,
    /// What the presentation layer currently shows per package.
    icons: HashMap<String, IconResult>,
    loaded: HashSet<String>,
    in_flight: HashMap<String, Arc<OnceCell<IconResult>>>,
}

struct Inner {
    caps: HostCapabilities,
    permits: Semaphore,
    timeout: Option<Duration>,
    state: Mutex<State>,
}

/// Per-consumer icon resolver. Clones share state; separate instances don't.
#[derive(Clone)]
pub struct IconPipeline {
    inner: Arc<Inner>,
}

impl IconPipeline {
    pub fn new(caps: HostCapabilities) -> Self {
        Self::build(caps, None)
    }

    /// Like [`IconPipeline::new`], but every backend call that takes longer
    /// than `limit` counts as a failed attempt.
    pub fn with_timeout(caps: HostCapabilities, limit: Duration) -> Self {
        Self::build(caps, Some(limit))
    }

    fn build(caps: HostCapabilities, timeout: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(Inner {
                caps,
                permits: Semaphore::new(MAX_CONCURRENT_LOADS),
                timeout,
                state: Mutex::new(State::default()),
            }),
        }
    }

    /// Resolves the icon for `package`. Never fails; every error degrades to
    /// [`IconResult::Fallback`].
    ///
    /// Concurrent calls for the same identifier share a single attempt chain.
    pub async fn resolve_icon(&self, package: &str) -> IconResult {
        let cell = {
            let mut state = self.inner.state.lock();
            if let Some(hit) = state.cache.get(package).cloned() {
                debug!(package, "icon cache hit");
                state.icons.insert(package.to_string(), hit.clone());
                state.loaded.insert(package.to_string());
                return hit;
            }
            if let Some(shown) = state.icons.get(package) {
                return shown.clone();
            }
            state
                .in_flight
                .entry(package.to_string())
                .or_default()
                .clone()
        };

        cell.get_or_init(|| self.load(package, cell.clone()))
            .await
            .clone()
    }

    async fn load(&self, package: &str, cell: Arc<OnceCell<IconResult>>) -> IconResult {
        let _guard = InFlightGuard {
            inner: &self.inner,
            package,
            cell,
        };

        let result = match self.inner.permits.acquire().await {
            Ok(_permit) => self.run_chain(package).await,
            Err(e) => {
                warn!(package, "icon permits unavailable: {e}");
                IconResult::Fallback
            }
        };

        {
            let mut state = self.inner.state.lock();
            state.cache.insert(package.to_string(), result.clone());
            state.icons.insert(package.to_string(), result.clone());
            state.loaded.insert(package.to_string());
        }
        result
    }

    async fn run_chain(&self, package: &str) -> IconResult {
        let normalized = normalize_package_name(package);
        let caps = &self.inner.caps;

        if let Some(pm) = &caps.package_manager {
            match self.attempt(read_icon(pm.as_ref(), normalized)).await {
                Ok(Some(src)) => return IconResult::Inline(src),
                Ok(None) => debug!(package, "package manager returned no icon"),
                Err(e) => warn!(package, "Failed to load icon via package manager: {e:#}"),
            }
        }

        if caps.package_info.is_some() {
            return IconResult::Reference(format!("{KSU_ICON_PREFIX}{normalized}"));
        }

        if let Some(system) = &caps.system {
            match self.attempt(system.lookup_icon(normalized)).await {
                Ok(Some(src)) => return IconResult::from_src(src),
                Ok(None) => {}
                Err(e) => warn!(package, "Failed to load icon from system: {e:#}"),
            }
        }

        debug!(package, "no icon source succeeded, using fallback");
        IconResult::Fallback
    }

    async fn attempt<T>(&self, call: impl Future<Output = Result<T>>) -> Result<T> {
        match self.inner.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| anyhow!("timed out after {limit:?}"))?,
            None => call.await,
        }
    }

    /// Schedules the first [`PRELOAD_COUNT`] packages independently and waits
    /// for all of them; everything else is left to an [`IconObserver`].
    pub async fn preload_visible_icons<S: AsRef<str>>(&self, packages: &[S]) {
        let handles: Vec<_> = packages
            .iter()
            .take(PRELOAD_COUNT)
            .map(|p| self.spawn_resolve(p.as_ref().to_string()))
            .collect();

        for handle in handles {
            if let Err(e) = handle.await {
                warn!("icon preload task failed: {e}");
            }
        }
    }

    fn spawn_resolve(&self, package: String) -> JoinHandle<IconResult> {
        let pipeline = self.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            pipeline.resolve_icon(&package).await
        })
    }

    /// Creates a viewport observer feeding this pipeline.
    pub fn observer(&self) -> IconObserver {
        IconObserver {
            pipeline: self.clone(),
            observed: HashMap::new(),
        }
    }

    /// The image finished rendering.
    pub fn on_icon_load(&self, package: &str) {
        self.inner.state.lock().loaded.insert(package.to_string());
    }

    /// The image failed to render; show the fallback instead.
    pub fn on_icon_error(&self, package: &str) {
        let mut state = self.inner.state.lock();
        state
            .icons
            .insert(package.to_string(), IconResult::Fallback);
        state.loaded.insert(package.to_string());
    }

    pub fn icon(&self, package: &str) -> Option<IconResult> {
        self.inner.state.lock().icons.get(package).cloned()
    }

    pub fn is_loaded(&self, package: &str) -> bool {
        self.inner.state.lock().loaded.contains(package)
    }

    pub fn cached(&self, package: &str) -> Option<IconResult> {
        self.inner.state.lock().cache.get(package).cloned()
    }

    pub fn in_flight_count(&self) -> usize {
        self.inner.state.lock().in_flight.len()
    }

    /// Empties the cache and per-package state. In-flight resolutions are not
    /// cancelled and will repopulate the cache when they finish.
    pub fn clear_cache(&self) {
        let mut state = self.inner.state.lock();
        state.cache.clear();
        state.icons.clear();
        state.loaded.clear();
    }
}

struct InFlightGuard<'a> {
    inner: &'a Inner,
    package: &'a str,
    cell: Arc<OnceCell<IconResult>>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock();
        if state
            .in_flight
            .get(self.package)
            .is_some_and(|current| Arc::ptr_eq(current, &self.cell))
        {
            state.in_flight.remove(self.package);
        }
    }
}

async fn read_icon(pm: &dyn PackageManager, package: &str) -> Result<Option<String>> {
    let Some(mut stream) = pm.application_icon(package).await? else {
        return Ok(None);
    };

    let mut bytes = Vec::new();
    stream
        .read_to_end(&mut bytes)
        .await
        .context("Failed to read icon stream")?;

    let png = ensure_png(bytes)?;
    Ok(Some(format!("{PNG_DATA_PREFIX}{}", BASE64.encode(png))))
}

/// Passes PNG bytes through and re-encodes anything else `image` can decode.
fn ensure_png(bytes: Vec<u8>) -> Result<Vec<u8>> {
    if matches!(image::guess_format(&bytes), Ok(ImageFormat::Png)) {
        return Ok(bytes);
    }

    let img = image::load_from_memory(&bytes).context("Icon stream is not a decodable image")?;
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .context("Failed to encode icon")?;
    Ok(buf)
}

/// An element reported by the viewport.
#[derive(Debug, Clone)]
pub struct IntersectionEntry {
    pub element: String,
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    pub fn visible(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            is_intersecting: true,
        }
    }
}

/// One-shot visibility trigger: each observed element schedules a single
/// resolution the first time it intersects, then stops being observed.
pub struct IconObserver {
    pipeline: IconPipeline,
    observed: HashMap<String, String>,
}

impl IconObserver {
    pub fn observe(&mut self, element: impl Into<String>, package: impl Into<String>) {
        self.observed.insert(element.into(), package.into());
    }

    pub fn unobserve(&mut self, element: &str) -> bool {
        self.observed.remove(element).is_some()
    }

    pub fn disconnect(&mut self) {
        self.observed.clear();
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    /// Schedules resolutions for newly visible elements. The handles can be
    /// awaited, but dropping them does not cancel anything.
    pub fn on_intersection(&mut self, entries: &[IntersectionEntry]) -> Vec<JoinHandle<IconResult>> {
        entries
            .iter()
            .filter(|e| e.is_intersecting)
            .filter_map(|e| self.observed.remove(&e.element))
            .map(|package| self.pipeline.spawn_resolve(package))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(format: ImageFormat) -> Vec<u8> {
        let img = image::DynamicImage::new_rgba8(2, 2);
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    #[test]
    fn png_passes_through_untouched() {
        let png = encode(ImageFormat::Png);
        assert_eq!(ensure_png(png.clone()).unwrap(), png);
    }

    #[test]
    fn other_formats_become_png() {
        let bmp = encode(ImageFormat::Bmp);
        let out = ensure_png(bmp).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(ensure_png(b"not an image".to_vec()).is_err());
        assert!(ensure_png(Vec::new()).is_err());
    }

    #[test]
    fn src_classification() {
        assert!(matches!(
            IconResult::from_src("data:image/webp;base64,AAAA".into()),
            IconResult::Inline(_)
        ));
        assert_eq!(
            IconResult::from_src("file:///x.png".into()).as_src(),
            "file:///x.png"
        );
        assert_eq!(IconResult::Fallback.as_src(), "fallback");
    }
}
