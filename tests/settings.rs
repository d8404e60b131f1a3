use device_faker_ui::settings::{Language, Settings, SettingsStore, Theme};

#[test]
fn defaults_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let store = SettingsStore::load(dir.path().join("settings.json"));
    assert_eq!(store.settings(), Settings::default());
    assert_eq!(store.settings().theme, Theme::System);
    assert_eq!(store.settings().language, Language::System);
}

#[test]
fn defaults_when_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{not json").unwrap();
    assert_eq!(SettingsStore::load(&path).settings(), Settings::default());
}

#[test]
fn every_change_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let mut store = SettingsStore::load(&path);
    store.set_theme(Theme::Dark).unwrap();
    assert_eq!(SettingsStore::load(&path).settings().theme, Theme::Dark);

    store.set_language(Language::Zh).unwrap();
    let reloaded = SettingsStore::load(&path).settings();
    assert_eq!(reloaded.theme, Theme::Dark);
    assert_eq!(reloaded.language, Language::Zh);

    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(raw, r#"{"theme":"dark","language":"zh"}"#);
}

#[test]
fn write_failure_is_returned() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = SettingsStore::load(dir.path().join("missing").join("settings.json"));
    assert!(store.set_theme(Theme::Light).is_err());
}

#[test]
fn names_display_like_the_stored_form() {
    for theme in [Theme::System, Theme::Light, Theme::Dark] {
        let stored = serde_json::to_value(theme).unwrap();
        assert_eq!(stored.as_str(), Some(theme.to_string().as_str()));
    }
    for language in [Language::System, Language::Zh, Language::En] {
        let stored = serde_json::to_value(language).unwrap();
        assert_eq!(stored.as_str(), Some(language.to_string().as_str()));
    }
    assert_eq!(Theme::Dark.to_string(), "dark");
    assert_eq!(Language::Zh.to_string(), "zh");
}
