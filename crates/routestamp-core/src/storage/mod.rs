pub mod file_store;
pub mod memory;

pub use file_store::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Key holding the JSON record array.
pub const COUNTRIES_KEY: &str = "routestamp-countries";
/// Key holding the JSON audit log array.
pub const HISTORY_KEY: &str = "routestamp-history";
/// Key holding the JSON currency preference object.
pub const CURRENCY_KEY: &str = "routestamp-currency";
/// Key holding the JSON trip array.
pub const TRIPS_KEY: &str = "routestamp-trips";
/// Key holding the notification preference flags.
pub const NOTIFICATIONS_KEY: &str = "routestamp-notifications";

/// String key → whole-document string value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Read and deserialize a JSON document. `Ok(None)` when the key is absent.
pub fn read_json<T, S>(store: &S, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serialize a value and write it as a whole document.
pub fn write_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// Like [`read_json`] but never fails: errors are logged and `None` returned.
pub fn load_or_log<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    match read_json(store, key) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(key, error = %e, "failed to load from storage");
            None
        }
    }
}

/// Like [`write_json`] but never fails: errors are logged and the write is dropped.
pub fn persist_or_log<T, S>(store: &mut S, key: &str, value: &T)
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    if let Err(e) = write_json(store, key, value) {
        tracing::error!(key, error = %e, "failed to save to storage");
    }
}
