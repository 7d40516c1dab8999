//! Persisted user preferences: display currency and notification opt-ins.

use crate::error::Result;
use crate::models::{Currency, NotificationPreferences};
use crate::storage::{self, CURRENCY_KEY, KeyValueStore, NOTIFICATIONS_KEY};

/// Saved currency, or the one detected from `locale` when none is saved or it is unreadable.
pub fn load_currency<S: KeyValueStore + ?Sized>(store: &S, locale: &str) -> Currency {
    storage::load_or_log(store, CURRENCY_KEY).unwrap_or_else(|| Currency::detect(locale))
}

pub fn save_currency<S: KeyValueStore + ?Sized>(store: &mut S, currency: &Currency) -> Result<()> {
    storage::write_json(store, CURRENCY_KEY, currency)
}

pub fn load_notifications<S: KeyValueStore + ?Sized>(store: &S) -> NotificationPreferences {
    storage::load_or_log(store, NOTIFICATIONS_KEY).unwrap_or_default()
}

pub fn save_notifications<S: KeyValueStore + ?Sized>(
    store: &mut S,
    prefs: &NotificationPreferences,
) -> Result<()> {
    storage::write_json(store, NOTIFICATIONS_KEY, prefs)
}

/// Best-effort locale of the current process, from `LC_ALL`, `LC_MONETARY` or `LANG`.
pub fn system_locale() -> String {
    ["LC_ALL", "LC_MONETARY", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|v| !v.is_empty() && v != "C" && v != "POSIX")
        .unwrap_or_else(|| "en-US".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_currency_defaults_to_detected() {
        let store = MemoryStore::new();
        assert_eq!(load_currency(&store, "en-GB").code, "GBP");
    }

    #[test]
    fn test_currency_roundtrip() {
        let mut store = MemoryStore::new();
        let eur = Currency::from_code("EUR").unwrap();
        save_currency(&mut store, &eur).unwrap();
        assert_eq!(load_currency(&store, "en-US"), eur);
    }

    #[test]
    fn test_corrupt_currency_falls_back() {
        let mut store = MemoryStore::new();
        store.set(CURRENCY_KEY, "\"nope").unwrap();
        assert_eq!(load_currency(&store, "ja-JP").code, "JPY");
    }

    #[test]
    fn test_notifications_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(load_notifications(&store), NotificationPreferences::default());

        let mut prefs = NotificationPreferences::default();
        prefs.updates = false;
        save_notifications(&mut store, &prefs).unwrap();
        assert!(!load_notifications(&store).updates);
    }
}
