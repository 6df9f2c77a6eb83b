//! One-time startup migration
//!
//! Older builds stored a single profile under `stadium_profile`. On first run
//! of a multi-profile build it becomes the only list entry and is activated.
//! Leaderboards are then collapsed to one entry per player name.

use serde_json::Value;

use super::{PersistenceStore, keys};
use crate::leaderboard::LeaderboardService;
use crate::profiles::synthesize_id;

/// What the migration pass changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MigrationReport {
    /// A legacy profile was wrapped into the profile list
    pub migrated_legacy: bool,
    /// Leaderboard tables were rewritten by the dedupe pass
    pub deduped: bool,
}

/// Run all startup migrations. Safe to call on every launch.
pub fn run(store: &PersistenceStore) -> MigrationReport {
    let migrated_legacy = migrate_legacy_profile(store);
    let deduped = LeaderboardService::new(store).dedupe();
    if migrated_legacy || deduped {
        log::info!("Migration: legacy={migrated_legacy} deduped={deduped}");
    }
    MigrationReport {
        migrated_legacy,
        deduped,
    }
}

fn migrate_legacy_profile(store: &PersistenceStore) -> bool {
    if !store.contains(keys::LEGACY_PROFILE) || store.contains(keys::PROFILES) {
        return false;
    }

    let migrated = match store.read_json::<Value>(keys::LEGACY_PROFILE) {
        Some(Value::Object(mut record)) => {
            let id = synthesize_id(store.now_millis());
            record.insert("id".to_string(), Value::from(id));
            store.write_json(keys::PROFILES, &[Value::Object(record)]);
            store.set(keys::ACTIVE_ID, &id.to_string());
            log::info!("Migrated legacy profile as {id}");
            true
        }
        _ => {
            log::warn!("Dropping unreadable legacy profile");
            false
        }
    };

    store.remove(keys::LEGACY_PROFILE);
    migrated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::{GameMode, LeaderboardEntry};
    use crate::profiles::{Country, ProfileRegistry};

    fn entry(name: &str, score: u64) -> LeaderboardEntry {
        LeaderboardEntry {
            name: name.to_string(),
            country: Country::England,
            club: "Leeds United".to_string(),
            score,
            level: Some(1),
            result: None,
            date: "2024-01-01".to_string(),
        }
    }

    #[test]
    fn test_legacy_profile_is_wrapped_and_activated() {
        let store = PersistenceStore::in_memory();
        store.set(
            keys::LEGACY_PROFILE,
            r#"{"name":"ALEX","country":"Brazil","club":"Santos"}"#,
        );

        let report = run(&store);
        assert!(report.migrated_legacy);
        assert!(!store.contains(keys::LEGACY_PROFILE));

        let registry = ProfileRegistry::new(&store);
        let profiles = registry.list_profiles();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].name, "ALEX");
        assert_ne!(profiles[0].id, 0);
        assert_eq!(registry.active().map(|p| p.id), Some(profiles[0].id));

        // second launch is a no-op
        assert_eq!(run(&store), MigrationReport::default());
    }

    #[test]
    fn test_existing_list_wins_over_legacy() {
        let store = PersistenceStore::in_memory();
        store.set(keys::LEGACY_PROFILE, r#"{"name":"OLD","country":"Spain","club":"Roma"}"#);
        store.set(keys::PROFILES, "[]");

        assert!(!run(&store).migrated_legacy);
        assert!(store.contains(keys::LEGACY_PROFILE));
    }

    #[test]
    fn test_corrupt_legacy_record_is_removed() {
        let store = PersistenceStore::in_memory();
        store.set(keys::LEGACY_PROFILE, "{oops");

        assert!(!run(&store).migrated_legacy);
        assert!(!store.contains(keys::LEGACY_PROFILE));
        assert!(!store.contains(keys::PROFILES));
    }

    #[test]
    fn test_dedupe_rewrites_only_when_counts_change() {
        let store = PersistenceStore::in_memory();
        let mut tables = std::collections::BTreeMap::new();
        tables.insert(
            GameMode::Dodgeball.key(),
            vec![entry("ALEX", 50), entry("SAM", 70), entry("ALEX", 90)],
        );
        store.write_json(keys::LEADERBOARD, &tables);

        assert!(run(&store).deduped);
        let entries = LeaderboardService::new(&store).entries(GameMode::Dodgeball);
        let scores: Vec<(String, u64)> = entries.into_iter().map(|e| (e.name, e.score)).collect();
        assert_eq!(scores, vec![("ALEX".to_string(), 90), ("SAM".to_string(), 70)]);

        // Already unique: the raw record is left untouched
        let raw = store.get(keys::LEADERBOARD);
        assert!(!run(&store).deduped);
        assert_eq!(store.get(keys::LEADERBOARD), raw);
    }
}
