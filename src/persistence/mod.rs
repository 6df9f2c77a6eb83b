//! Fail-soft persistence over a key/value backend
//!
//! Features:
//! - Bit-exact key space shared with earlier builds of the game
//! - JSON records, replaced whole on every write
//! - Corrupt or unreadable records read back as absent (never an error)
//! - One-time startup migration (see [`migration`])

pub mod migration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::platform::{Clock, MemoryStorage, Storage, SystemClock, iso_date};

/// Persisted key space
pub mod keys {
    /// Legacy single-profile record (pre multi-profile builds)
    pub const LEGACY_PROFILE: &str = "stadium_profile";
    /// Array of all profiles
    pub const PROFILES: &str = "stadium_profiles";
    /// Active profile id (decimal string)
    pub const ACTIVE_ID: &str = "stadium_active_id";
    /// Per-mode leaderboard tables
    pub const LEADERBOARD: &str = "stadium_leaderboard";
    /// Player preferences
    pub const SETTINGS: &str = "stadium_settings";
    /// Difficulty overrides
    pub const TUNING: &str = "stadium_tuning";
}

/// Owner of the durable dictionary
pub struct PersistenceStore {
    storage: Box<dyn Storage>,
    clock: Box<dyn Clock>,
}

impl PersistenceStore {
    pub fn new(storage: impl Storage + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            clock: Box::new(clock),
        }
    }

    /// Fresh in-memory store on the system clock
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new(), SystemClock)
    }

    /// Open the browser's localStorage, falling back to memory if unavailable
    #[cfg(target_arch = "wasm32")]
    pub fn browser() -> Self {
        match crate::platform::LocalStorage::open() {
            Ok(storage) => Self::new(storage, SystemClock),
            Err(e) => {
                log::warn!("{e}; progress will not be saved");
                Self::in_memory()
            }
        }
    }

    /// Raw value for `key`; backend failures read as absent
    pub fn get(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Failed to read `{key}`: {e}");
                None
            }
        }
    }

    pub fn set(&self, key: &str, raw: &str) {
        if let Err(e) = self.storage.set(key, raw) {
            log::warn!("Failed to write `{key}`: {e}");
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            log::warn!("Failed to remove `{key}`: {e}");
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some_and(|raw| !raw.is_empty())
    }

    /// Parse a JSON record; malformed data is treated as absence
    pub fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        if raw.is_empty() {
            return None;
        }
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Discarding malformed `{key}` record: {e}");
                None
            }
        }
    }

    /// Parse a JSON array record element by element, skipping elements that
    /// do not match `T`. A malformed document reads as an empty list.
    pub fn read_json_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        self.read_json::<Vec<serde_json::Value>>(key)
            .map(|values| parse_lenient(values, key))
            .unwrap_or_default()
    }

    /// Serialize and replace a JSON record
    pub fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.set(key, &json),
            Err(e) => log::warn!("Failed to serialize `{key}`: {e}"),
        }
    }

    /// Parse an integer scalar (leading/trailing whitespace ignored)
    pub fn read_int(&self, key: &str) -> Option<i64> {
        self.get(key)?.trim().parse().ok()
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Today's UTC date as `YYYY-MM-DD`
    pub fn today(&self) -> String {
        iso_date(self.now_millis())
    }
}

/// Convert raw JSON values, dropping the ones that fail to parse
pub(crate) fn parse_lenient<T: DeserializeOwned>(
    values: Vec<serde_json::Value>,
    what: &str,
) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                log::warn!("Skipping malformed element in `{what}`: {e}");
                None
            }
        })
        .collect()
}
