//! Durable preference store tests

use forza_core::PreferenceStore;
use forza_storage::RedbPreferences;
use tempfile::TempDir;

#[test]
fn missing_key_on_fresh_database() {
    let dir = TempDir::new().unwrap();
    let prefs = RedbPreferences::open(dir.path().join("prefs.redb")).unwrap();

    assert_eq!(prefs.get("forza_radio_volume").unwrap(), None);
    assert!(prefs.keys().unwrap().is_empty());
}

#[test]
fn values_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("prefs.redb");

    {
        let prefs = RedbPreferences::open(&path).unwrap();
        prefs.set("forza_radio_volume", "0.35").unwrap();
        prefs.set("search_token", "abc").unwrap();
        prefs.set("search_token", "def").unwrap();
    }

    let prefs = RedbPreferences::open(&path).unwrap();
    assert_eq!(prefs.get("forza_radio_volume").unwrap().as_deref(), Some("0.35"));
    assert_eq!(prefs.get("search_token").unwrap().as_deref(), Some("def"));
    assert_eq!(
        prefs.keys().unwrap(),
        vec!["forza_radio_volume".to_string(), "search_token".to_string()]
    );
}

#[test]
fn remove_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let prefs = RedbPreferences::open(dir.path().join("prefs.redb")).unwrap();

    prefs.remove("never_written").unwrap();
    prefs.set("search_token_expiry", "1700000000000").unwrap();
    prefs.remove("search_token_expiry").unwrap();
    assert_eq!(prefs.get("search_token_expiry").unwrap(), None);
}
