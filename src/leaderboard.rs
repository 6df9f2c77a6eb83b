//! Per-mode leaderboards
//!
//! Persisted to LocalStorage as `{ "dodgeball": [...], "dribble": [...],
//! "penalties": [...] }`. Each table keeps at most one entry per player name
//! (the best score), sorted best-first and truncated to the top 10.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::persistence::{PersistenceStore, keys, parse_lenient};
use crate::profiles::{Country, ProfileRegistry};

/// Maximum entries kept per mode
pub const MAX_ENTRIES: usize = 10;

/// Playable modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Dodgeball,
    Dribble,
    Penalties,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Dodgeball, GameMode::Dribble, GameMode::Penalties];

    /// Table key in the persisted leaderboard object
    pub fn key(&self) -> &'static str {
        match self {
            GameMode::Dodgeball => "dodgeball",
            GameMode::Dribble => "dribble",
            GameMode::Penalties => "penalties",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key() == key)
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameMode::Dodgeball => "Dodgeball",
            GameMode::Dribble => "Dribble",
            GameMode::Penalties => "Penalty Shootout",
        }
    }
}

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub country: Country,
    pub club: String,
    pub score: u64,
    /// Level reached (dodgeball, dribble)
    #[serde(default)]
    pub level: Option<u32>,
    /// Match result such as `"W 3-2"` (penalties)
    #[serde(default)]
    pub result: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
}

/// Result data submitted at the end of a session
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreCandidate {
    pub score: u64,
    pub level: Option<u32>,
    pub result: Option<String>,
}

impl ScoreCandidate {
    pub fn with_level(score: u64, level: u32) -> Self {
        Self {
            score,
            level: Some(level),
            result: None,
        }
    }

    pub fn with_result(score: u64, result: impl Into<String>) -> Self {
        Self {
            score,
            level: None,
            result: Some(result.into()),
        }
    }
}

/// What happened to a submitted score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Written; `rank` is 1-indexed, `None` if it fell outside the top 10
    Recorded { rank: Option<usize> },
    /// The player already has an equal or better entry
    NotABest,
    /// No active profile to attribute the score to
    NoActiveProfile,
}

type Tables = BTreeMap<String, Vec<LeaderboardEntry>>;

/// Keep the best entry per name (first wins on ties), sorted best-first
fn dedupe_table(entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    let mut best: Vec<LeaderboardEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        match best.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) if entry.score > existing.score => *existing = entry,
            Some(_) => {}
            None => best.push(entry),
        }
    }
    sort_best_first(&mut best);
    best
}

fn sort_best_first(entries: &mut [LeaderboardEntry]) {
    // stable: equal scores keep submission order
    entries.sort_by(|a, b| b.score.cmp(&a.score));
}

/// Ranking façade over the persisted tables
///
/// Stateless: every call re-reads the store.
pub struct LeaderboardService<'a> {
    store: &'a PersistenceStore,
}

impl<'a> LeaderboardService<'a> {
    pub fn new(store: &'a PersistenceStore) -> Self {
        Self { store }
    }

    fn load(&self) -> Tables {
        self.store
            .read_json::<BTreeMap<String, serde_json::Value>>(keys::LEADERBOARD)
            .map(|raw| {
                raw.into_iter()
                    .filter_map(|(mode, table)| match table {
                        serde_json::Value::Array(values) => {
                            Some((mode, parse_lenient(values, keys::LEADERBOARD)))
                        }
                        _ => {
                            log::warn!("Dropping leaderboard table `{mode}`: not a list");
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Entries for `mode`, best first
    pub fn entries(&self, mode: GameMode) -> Vec<LeaderboardEntry> {
        self.load().remove(mode.key()).unwrap_or_default()
    }

    /// Best score on the board for `mode`
    pub fn top_score(&self, mode: GameMode) -> Option<u64> {
        self.entries(mode).first().map(|e| e.score)
    }

    /// Submit a result for the active profile
    pub fn add_entry(&self, mode: GameMode, candidate: ScoreCandidate) -> RecordOutcome {
        let Some(profile) = ProfileRegistry::new(self.store).active() else {
            log::info!("No active profile, {} score not recorded", mode.key());
            return RecordOutcome::NoActiveProfile;
        };

        let mut tables = self.load();
        let table = tables.entry(mode.key().to_string()).or_default();

        let entry = LeaderboardEntry {
            name: profile.name,
            country: profile.country,
            club: profile.club,
            score: candidate.score,
            level: candidate.level,
            result: candidate.result,
            date: self.store.today(),
        };

        match table.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) if entry.score <= existing.score => {
                return RecordOutcome::NotABest;
            }
            Some(existing) => *existing = entry.clone(),
            None => table.push(entry.clone()),
        }

        sort_best_first(table);
        table.truncate(MAX_ENTRIES);
        let rank = table.iter().position(|e| e.name == entry.name).map(|i| i + 1);

        self.store.write_json(keys::LEADERBOARD, &tables);
        log::info!(
            "{} leaderboard: {} scored {} (rank {:?})",
            mode.key(),
            entry.name,
            entry.score,
            rank
        );
        RecordOutcome::Recorded { rank }
    }

    /// Normalize tables written before names were unique
    ///
    /// Rewrites the record only if some table shrank. Returns whether it did.
    pub fn dedupe(&self) -> bool {
        let tables = self.load();
        let mut changed = false;
        let deduped: Tables = tables
            .into_iter()
            .map(|(mode, entries)| {
                let before = entries.len();
                let entries = dedupe_table(entries);
                changed |= entries.len() != before;
                (mode, entries)
            })
            .collect();

        if changed {
            self.store.write_json(keys::LEADERBOARD, &deduped);
            log::info!("Leaderboard deduplicated");
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{FixedClock, MemoryStorage};
    use crate::profiles::Profile;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn store() -> PersistenceStore {
        // 2025-06-01T12:00:00Z
        PersistenceStore::new(MemoryStorage::new(), FixedClock::new(1_748_779_200_000))
    }

    fn activate(store: &PersistenceStore, name: &str) -> i64 {
        let registry = ProfileRegistry::new(store);
        let existing = registry.list_profiles().into_iter().find(|p| p.name == name);
        let id = match existing {
            Some(p) => p.id,
            None => registry.save(Profile::new(name, Country::Spain, "Barcelona").unwrap()),
        };
        registry.set_active(id);
        id
    }

    #[test]
    fn test_requires_active_profile() {
        let store = store();
        let board = LeaderboardService::new(&store);
        assert_eq!(
            board.add_entry(GameMode::Dribble, ScoreCandidate::with_level(100, 2)),
            RecordOutcome::NoActiveProfile
        );
        assert!(board.entries(GameMode::Dribble).is_empty());
        assert!(!store.contains(keys::LEADERBOARD));
    }

    #[test]
    fn test_entry_built_from_profile() {
        let store = store();
        activate(&store, "XAVI");
        let board = LeaderboardService::new(&store);

        let outcome =
            board.add_entry(GameMode::Penalties, ScoreCandidate::with_result(250, "W 4-2"));
        assert_eq!(outcome, RecordOutcome::Recorded { rank: Some(1) });

        let entries = board.entries(GameMode::Penalties);
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.name, "XAVI");
        assert_eq!(e.country, Country::Spain);
        assert_eq!(e.club, "Barcelona");
        assert_eq!(e.level, None);
        assert_eq!(e.result.as_deref(), Some("W 4-2"));
        assert_eq!(e.date, "2025-06-01");
    }

    #[test]
    fn test_only_improvements_replace() {
        let store = store();
        activate(&store, "XAVI");
        let board = LeaderboardService::new(&store);

        board.add_entry(GameMode::Dodgeball, ScoreCandidate::with_level(300, 3));
        assert_eq!(
            board.add_entry(GameMode::Dodgeball, ScoreCandidate::with_level(300, 4)),
            RecordOutcome::NotABest
        );
        assert_eq!(
            board.add_entry(GameMode::Dodgeball, ScoreCandidate::with_level(120, 1)),
            RecordOutcome::NotABest
        );
        board.add_entry(GameMode::Dodgeball, ScoreCandidate::with_level(500, 5));

        let entries = board.entries(GameMode::Dodgeball);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].score, 500);
        assert_eq!(entries[0].level, Some(5));
    }

    #[test]
    fn test_tables_are_independent_per_mode() {
        let store = store();
        activate(&store, "XAVI");
        let board = LeaderboardService::new(&store);
        board.add_entry(GameMode::Dodgeball, ScoreCandidate::with_level(10, 1));
        board.add_entry(GameMode::Dribble, ScoreCandidate::with_level(20, 1));
        assert_eq!(board.top_score(GameMode::Dodgeball), Some(10));
        assert_eq!(board.top_score(GameMode::Dribble), Some(20));
        assert_eq!(board.top_score(GameMode::Penalties), None);
    }

    #[test]
    fn test_dedupe_rewrites_only_when_shrunk() {
        let store = store();
        let raw = r#"{
            "dodgeball": [
                {"name":"A","country":"Spain","club":"Roma","score":50,"level":2,"result":null,"date":"2024-01-01"},
                {"name":"B","country":"Spain","club":"Roma","score":70,"level":3,"result":null,"date":"2024-01-01"},
                {"name":"A","country":"Spain","club":"Roma","score":90,"level":4,"result":null,"date":"2024-01-02"}
            ],
            "dribble": []
        }"#;
        store.set(keys::LEADERBOARD, raw);
        let board = LeaderboardService::new(&store);

        assert!(board.dedupe());
        let entries = board.entries(GameMode::Dodgeball);
        let scores: Vec<(String, u64)> =
            entries.iter().map(|e| (e.name.clone(), e.score)).collect();
        assert_eq!(scores, [("A".to_string(), 90), ("B".to_string(), 70)]);

        // second pass finds nothing to do and leaves the record untouched
        let before = store.get(keys::LEADERBOARD);
        assert!(!board.dedupe());
        assert_eq!(store.get(keys::LEADERBOARD), before);
    }

    #[test]
    fn test_corrupt_board_reads_empty() {
        let store = store();
        store.set(keys::LEADERBOARD, "[1,2,3");
        let board = LeaderboardService::new(&store);
        assert!(board.entries(GameMode::Dodgeball).is_empty());
        assert!(!board.dedupe());
    }

    #[test]
    fn test_bad_table_does_not_sink_the_others() {
        let store = store();
        let raw = r#"{
            "dodgeball": "oops",
            "dribble": [
                {"name":"A","country":"Spain","club":"Roma","score":40,"level":3,"result":null,"date":"2024-01-01"}
            ]
        }"#;
        store.set(keys::LEADERBOARD, raw);
        let board = LeaderboardService::new(&store);

        assert!(board.entries(GameMode::Dodgeball).is_empty());
        assert_eq!(board.top_score(GameMode::Dribble), Some(40));

        activate(&store, "XAVI");
        board.add_entry(GameMode::Dodgeball, ScoreCandidate::with_level(15, 1));
        assert_eq!(board.top_score(GameMode::Dodgeball), Some(15));
        let dribble = board.entries(GameMode::Dribble);
        assert_eq!(dribble.len(), 1);
        assert_eq!(dribble[0].name, "A");
    }

    proptest! {
        #[test]
        fn prop_one_entry_per_name_with_max_score(
            submissions in prop::collection::vec((0usize..4, 0u64..1000), 1..40)
        ) {
            let names = ["ANA", "BEN", "CY", "DEE"];
            let store = store();
            let board = LeaderboardService::new(&store);
            let mut best: HashMap<&str, u64> = HashMap::new();

            for (who, score) in submissions {
                let name = names[who];
                activate(&store, name);
                board.add_entry(GameMode::Dribble, ScoreCandidate::with_level(score, 1));
                let slot = best.entry(name).or_insert(score);
                *slot = (*slot).max(score);
            }

            let entries = board.entries(GameMode::Dribble);
            prop_assert_eq!(entries.len(), best.len());
            for entry in &entries {
                prop_assert_eq!(entries.iter().filter(|e| e.name == entry.name).count(), 1);
                prop_assert_eq!(Some(&entry.score), best.get(entry.name.as_str()));
            }
        }

        #[test]
        fn prop_bounded_and_sorted(
            submissions in prop::collection::vec((0usize..15, 0u64..5000), 1..60)
        ) {
            let names = [
                "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O",
            ];
            let store = store();
            let board = LeaderboardService::new(&store);

            for (who, score) in submissions {
                activate(&store, names[who]);
                board.add_entry(GameMode::Dodgeball, ScoreCandidate::with_level(score, 1));
                let entries = board.entries(GameMode::Dodgeball);
                prop_assert!(entries.len() <= MAX_ENTRIES);
                prop_assert!(entries.windows(2).all(|w| w[0].score >= w[1].score));
            }
        }
    }
}
