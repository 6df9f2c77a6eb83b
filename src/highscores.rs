//! Per-mode best-value counters
//!
//! Stored as plain decimal strings in LocalStorage, independent of the
//! leaderboard, and shown on the title screen. Values never decrease.

use crate::persistence::PersistenceStore;

/// High score slots (key names are shared with earlier builds)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighScoreKey {
    /// Best level reached in the dodgeball runner
    DodgeballLevel,
    /// Best final score in the dodgeball runner
    DodgeballScore,
    /// Best level reached in dribble mode
    DribbleLevel,
    /// Best shootout score
    PenaltyScore,
}

impl HighScoreKey {
    pub const ALL: [HighScoreKey; 4] = [
        HighScoreKey::DodgeballLevel,
        HighScoreKey::DodgeballScore,
        HighScoreKey::DribbleLevel,
        HighScoreKey::PenaltyScore,
    ];

    /// LocalStorage key
    pub fn storage_key(&self) -> &'static str {
        match self {
            HighScoreKey::DodgeballLevel => "stadiumRunner_hi",
            HighScoreKey::DodgeballScore => "stadiumRunner_hiScore",
            HighScoreKey::DribbleLevel => "dribble_hiLevel",
            HighScoreKey::PenaltyScore => "penalty_hiScore",
        }
    }
}

/// Title-screen summary of all best values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TitleBests {
    pub dodgeball_score: u64,
    pub dribble_level: u64,
    pub penalty_score: u64,
}

/// Façade over the scalar keys
pub struct HighScores<'a> {
    store: &'a PersistenceStore,
}

impl<'a> HighScores<'a> {
    pub fn new(store: &'a PersistenceStore) -> Self {
        Self { store }
    }

    /// Stored best (0 when missing or unparsable)
    pub fn get(&self, key: HighScoreKey) -> u64 {
        self.store
            .read_int(key.storage_key())
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(0)
    }

    /// Store `value` if it beats the current best. Returns whether it did.
    pub fn submit(&self, key: HighScoreKey, value: u64) -> bool {
        let prev = self.get(key);
        if value <= prev {
            return false;
        }
        self.store.set(key.storage_key(), &value.to_string());
        log::info!("New best for {}: {} (was {})", key.storage_key(), value, prev);
        true
    }

    pub fn title_bests(&self) -> TitleBests {
        TitleBests {
            dodgeball_score: self.get(HighScoreKey::DodgeballScore),
            dribble_level: self.get(HighScoreKey::DribbleLevel),
            penalty_score: self.get(HighScoreKey::PenaltyScore),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_is_monotonic() {
        let store = PersistenceStore::in_memory();
        let scores = HighScores::new(&store);

        assert_eq!(scores.get(HighScoreKey::PenaltyScore), 0);
        assert!(scores.submit(HighScoreKey::PenaltyScore, 120));
        assert!(!scores.submit(HighScoreKey::PenaltyScore, 80));
        assert!(!scores.submit(HighScoreKey::PenaltyScore, 120));
        assert!(scores.submit(HighScoreKey::PenaltyScore, 121));
        assert_eq!(scores.get(HighScoreKey::PenaltyScore), 121);
    }

    #[test]
    fn test_reads_legacy_raw_values() {
        let store = PersistenceStore::in_memory();
        store.set("dribble_hiLevel", "7");
        store.set("stadiumRunner_hiScore", "garbage");
        let scores = HighScores::new(&store);

        let bests = scores.title_bests();
        assert_eq!(bests.dribble_level, 7);
        assert_eq!(bests.dodgeball_score, 0);
    }

    #[test]
    fn test_keys_are_distinct() {
        let mut keys: Vec<&str> = HighScoreKey::ALL.iter().map(|k| k.storage_key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), HighScoreKey::ALL.len());
    }
}
