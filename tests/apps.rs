use std::sync::Arc;

use anyhow::{bail, Result};
use device_faker_ui::apps::AppsStore;
use device_faker_ui::host::{BoxFuture, InstalledApp, PackageInfo};
use parking_lot::Mutex;

struct FakePackages {
    apps: Mutex<Result<Vec<InstalledApp>, String>>,
}

impl PackageInfo for FakePackages {
    fn installed_apps(&self) -> BoxFuture<'_, Result<Vec<InstalledApp>>> {
        Box::pin(async move {
            match &*self.apps.lock() {
                Ok(apps) => Ok(apps.clone()),
                Err(msg) => bail!("{msg}"),
            }
        })
    }
}

fn app(package: &str, name: &str) -> InstalledApp {
    InstalledApp {
        package_name: package.to_string(),
        app_name: name.to_string(),
        icon: None,
        version_name: Some("1.0".to_string()),
        version_code: Some(1),
    }
}

fn fake() -> Arc<FakePackages> {
    Arc::new(FakePackages {
        apps: Mutex::new(Ok(vec![
            app("com.android.chrome", "Chrome"),
            app("com.tencent.mm", "WeChat"),
            app("com.supercell.brawlstars", "Brawl Stars"),
        ])),
    })
}

#[tokio::test]
async fn loads_and_filters() {
    let mut store = AppsStore::new(Some(fake()));
    store.load_installed_apps().await;
    assert_eq!(store.error(), None);
    assert_eq!(store.installed_apps().len(), 3);
    assert_eq!(store.filtered_apps().len(), 3);

    store.search_apps("BRAWL");
    let found: Vec<_> = store
        .filtered_apps()
        .iter()
        .map(|a| a.package_name.as_str())
        .collect();
    assert_eq!(found, ["com.supercell.brawlstars"]);

    store.search_apps("tencent");
    assert_eq!(store.filtered_apps()[0].app_name, "WeChat");

    store.search_apps("nothing matches");
    assert!(store.filtered_apps().is_empty());

    store.search_apps("");
    assert_eq!(store.filtered_apps().len(), 3);
}

#[tokio::test]
async fn failure_keeps_previous_list() {
    let source = fake();
    let mut store = AppsStore::new(Some(source.clone()));
    store.load_installed_apps().await;

    *source.apps.lock() = Err("permission denied".to_string());
    store.load_installed_apps().await;

    assert!(store.error().unwrap().contains("permission denied"));
    assert_eq!(store.installed_apps().len(), 3);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn missing_capability_is_an_error() {
    let mut store = AppsStore::new(None);
    store.load_installed_apps().await;
    assert!(store.error().is_some());
    assert!(store.installed_apps().is_empty());
}

#[test]
fn installed_app_json_uses_camel_case() {
    let json = serde_json::to_value(app("com.foo", "Foo")).unwrap();
    assert_eq!(json["packageName"], "com.foo");
    assert_eq!(json["versionCode"], 1);
    assert!(json.get("icon").is_none());
}
