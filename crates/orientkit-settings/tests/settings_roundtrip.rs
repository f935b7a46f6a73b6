use orientkit_settings::{Config, SettingsError, SettingsStore};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn store_persists_and_reloads_through_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");

    let store = SettingsStore::open(&path).unwrap();
    assert!(!store.auto_orient_enabled());
    store.set_auto_orient_enabled(true);
    store.set_auto_orient_debounce_ms(150).unwrap();
    store.save().unwrap();

    let reopened = SettingsStore::open(&path).unwrap();
    assert!(reopened.auto_orient_enabled());
    assert_eq!(reopened.auto_orient_debounce(), Duration::from_millis(150));
}

#[test]
fn json_and_toml_agree() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.orientation.penalize_overhang_volume = false;
    config.logging.json = true;

    let json = dir.path().join("config.json");
    let toml = dir.path().join("config.toml");
    config.save_to_file(&json).unwrap();
    config.save_to_file(&toml).unwrap();

    assert_eq!(Config::load_from_file(&json).unwrap(), config);
    assert_eq!(Config::load_from_file(&toml).unwrap(), config);
}

#[test]
fn reload_picks_up_external_edits() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    let store = SettingsStore::open(&path).unwrap();

    std::fs::write(&path, "[orientation]\nauto_orient_enabled = true\n").unwrap();
    store.reload().unwrap();
    assert!(store.auto_orient_enabled());
}

#[test]
fn invalid_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[orientation]\nauto_orient_debounce_ms = 999999\n").unwrap();

    assert!(matches!(
        SettingsStore::open(&path),
        Err(SettingsError::Config(_))
    ));
}
