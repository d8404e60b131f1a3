use std::sync::Arc;

use device_faker_ui::config::{AppConfig, Config, Mode, PackageConfig, Template};
use device_faker_ui::host::LocalFs;
use device_faker_ui::store::ConfigStore;

fn store_at(path: &std::path::Path) -> ConfigStore {
    ConfigStore::new(Arc::new(LocalFs), path)
}

#[tokio::test]
async fn load_creates_default_document_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config").join("config.toml");

    let mut store = store_at(&path);
    store.load().await;

    assert_eq!(store.error(), None);
    assert!(!store.is_loading());
    assert_eq!(store.config(), &Config::initial());
    assert!(store.config().templates().is_empty());
    assert!(store.config().apps().is_empty());

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("apps = []"), "{text}");
    assert!(text.contains("[templates]"), "{text}");
    let on_disk = Config::from_toml(&text).unwrap();
    assert_eq!(on_disk.default_mode, Some(Mode::Lite));
    assert_eq!(on_disk, Config::initial());
}

#[tokio::test]
async fn load_reads_existing_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
default_mode = "full"

[templates.redmagic_9_pro]
packages = ["com.supercell.brawlstars"]
model = "NX769J"
"#,
    )
    .unwrap();

    let mut store = store_at(&path);
    store.load().await;

    assert_eq!(store.error(), None);
    assert_eq!(store.config().work_mode(), Mode::Full);
    assert!(store.is_package_configured("com.supercell.brawlstars"));
    assert!(store.is_package_configured("com.supercell.brawlstars@10"));
    assert!(!store.is_package_configured("com.other.app"));
}

#[tokio::test]
async fn load_records_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "default_mode = [broken").unwrap();

    let mut store = store_at(&path);
    store.load().await;

    let err = store.error().unwrap();
    assert!(err.contains("Failed to parse config"), "{err}");
    assert_eq!(store.config(), &Config::default());
    // the broken file is left alone
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "default_mode = [broken"
    );
}

#[tokio::test]
async fn mutations_are_not_persisted_until_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut store = store_at(&path);
    store.load().await;
    store.set_app(AppConfig::new("com.foo"));
    store.set_template(
        "t",
        Template {
            packages: Some(vec!["com.bar".into()]),
            ..Default::default()
        },
    );

    let on_disk = Config::from_toml(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(on_disk.apps().is_empty());

    store.save().await.unwrap();
    let on_disk = Config::from_toml(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk.apps().len(), 1);
    assert_eq!(&on_disk, store.config());

    store.delete_app("com.foo");
    store.delete_template("t");
    store.save().await.unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("apps = []"), "{text}");
    let on_disk = Config::from_toml(&text).unwrap();
    assert_eq!(on_disk, Config::initial());
}

#[tokio::test]
async fn save_failure_is_recorded_and_returned() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("config.toml");

    let mut store = store_at(&path);
    store.set_app(AppConfig::new("com.foo"));

    let result = store.save().await;
    assert!(result.is_err());
    assert!(store.error().unwrap().contains("Failed to write"));
    assert!(!store.is_loading());
}

#[tokio::test]
async fn override_wins_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut store = store_at(&path);
    store.load().await;
    store.set_template(
        "t",
        Template {
            packages: Some(vec!["com.foo".into()]),
            ..Default::default()
        },
    );
    let mut app = AppConfig::new("com.foo");
    app.mode = Some(Mode::Resetprop);
    store.set_app(app);
    store.save().await.unwrap();

    let mut reloaded = store_at(&path);
    reloaded.load().await;
    match reloaded.get_package_config("com.foo") {
        Some(PackageConfig::App(app)) => assert_eq!(app.mode, Some(Mode::Resetprop)),
        other => panic!("expected override, got {other:?}"),
    }
}

#[tokio::test]
async fn toggle_work_mode_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut store = store_at(&path);
    store.load().await;

    assert_eq!(store.toggle_work_mode().await.unwrap(), Mode::Full);
    let on_disk = Config::from_toml(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk.default_mode, Some(Mode::Full));

    assert_eq!(store.toggle_work_mode().await.unwrap(), Mode::Lite);
    let on_disk = Config::from_toml(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk.default_mode, Some(Mode::Lite));
}

#[tokio::test]
async fn toggle_from_resetprop_goes_to_lite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "default_mode = \"resetprop\"\n").unwrap();

    let mut store = store_at(&path);
    store.load().await;
    assert_eq!(store.toggle_work_mode().await.unwrap(), Mode::Lite);
}

#[tokio::test]
async fn module_version_is_read_from_module_prop() {
    let dir = tempfile::tempdir().unwrap();
    let prop = dir.path().join("module.prop");
    std::fs::write(
        &prop,
        "id=device_faker\nname=Device Faker\nversion=1.0.0\nversionCode=100\n",
    )
    .unwrap();

    let mut store = store_at(&dir.path().join("config.toml"));
    assert_eq!(store.module_version(), "0.0.0");
    store.load_module_version(&prop).await;
    assert_eq!(store.module_version(), "1.0.0");
}

#[tokio::test]
async fn module_version_keeps_default_when_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = store_at(&dir.path().join("config.toml"));

    store
        .load_module_version(&dir.path().join("missing.prop"))
        .await;
    assert_eq!(store.module_version(), "0.0.0");

    let prop = dir.path().join("module.prop");
    std::fs::write(&prop, "id=device_faker\nversionCode=100\n").unwrap();
    store.load_module_version(&prop).await;
    assert_eq!(store.module_version(), "0.0.0");
    // module version problems never surface as store errors
    assert_eq!(store.error(), None);
}
