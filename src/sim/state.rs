//! Shared session types
//!
//! Every mode runs the same shape: `Active` until a terminal condition
//! latches, then `Finished` with an outcome the app acts on after the
//! display hint has elapsed.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::leaderboard::GameMode;
use crate::persistence::PersistenceStore;
use crate::presentation::Presentation;

/// State carried into a level: where to start and the running score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handoff {
    pub level: u32,
    pub score: u64,
}

impl Default for Handoff {
    fn default() -> Self {
        Self { level: 1, score: 0 }
    }
}

impl Handoff {
    pub fn new(level: u32, score: u64) -> Self {
        Self {
            level: level.max(1),
            score,
        }
    }
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCause {
    /// Dodgeball: struck by a falling ball
    Hit,
    /// Dribble: lost the ball to a defender or keeper
    Tackled,
    /// Dribble: shot struck a defender
    Blocked,
    /// Dribble: shot stopped by the keeper
    Saved,
    /// Dribble: shot never arrived
    Missed,
    /// Penalty: all rounds played
    ShootoutOver,
}

/// Final shootout standing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    Win,
    Loss,
    Draw,
}

impl MatchResult {
    pub fn from_goals(player: u32, cpu: u32) -> Self {
        match player.cmp(&cpu) {
            std::cmp::Ordering::Greater => MatchResult::Win,
            std::cmp::Ordering::Less => MatchResult::Loss,
            std::cmp::Ordering::Equal => MatchResult::Draw,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            MatchResult::Win => 'W',
            MatchResult::Loss => 'L',
            MatchResult::Draw => 'D',
        }
    }

    /// Leaderboard form, e.g. `"W 3-2"`
    pub fn describe(&self, player: u32, cpu: u32) -> String {
        format!("{} {}-{}", self.letter(), player, cpu)
    }
}

/// Everything the results screen shows
#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub mode: GameMode,
    pub level: u32,
    pub score: u64,
    /// Dodgeball only: share of the level covered (0-100)
    pub distance_pct: Option<u32>,
    /// Penalty only: `"W 3-2"` style result
    pub result: Option<String>,
    pub cause: EndCause,
}

/// Terminal transition of a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// Level won: start the next one from this handoff
    Advance(Handoff),
    /// Run over: show the results screen
    Ended(GameSummary),
}

/// Result of one session tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickStatus {
    /// Keep ticking
    Running,
    /// Cosmetic pause: keep showing the current state for this many ms
    /// before ticking again
    Hold(u32),
    /// Terminal; act on the outcome after `display_ms`
    Finished {
        outcome: SessionOutcome,
        display_ms: u32,
    },
    /// Already finished; the outcome was reported earlier
    Done,
}

impl TickStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TickStatus::Finished { .. } | TickStatus::Done)
    }
}

/// Guard ensuring a win/loss fires at most once per session
#[derive(Debug, Clone, Default)]
pub struct TerminalLatch {
    fired: bool,
}

impl TerminalLatch {
    /// Latch; returns true only for the first call
    pub fn fire(&mut self) -> bool {
        !std::mem::replace(&mut self.fired, true)
    }

    pub fn is_fired(&self) -> bool {
        self.fired
    }
}

/// Collaborators a session may touch while ticking
pub struct SessionContext<'a> {
    pub store: &'a PersistenceStore,
    pub presentation: &'a mut dyn Presentation,
}

impl<'a> SessionContext<'a> {
    pub fn new(store: &'a PersistenceStore, presentation: &'a mut dyn Presentation) -> Self {
        Self {
            store,
            presentation,
        }
    }
}

/// Per-session RNG (seeded by the host for reproducible runs)
pub fn session_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_latch_fires_once() {
        let mut latch = TerminalLatch::default();
        assert!(!latch.is_fired());
        assert!(latch.fire());
        assert!(!latch.fire());
        assert!(latch.is_fired());
    }

    #[test]
    fn test_match_result_format() {
        assert_eq!(MatchResult::from_goals(3, 2).describe(3, 2), "W 3-2");
        assert_eq!(MatchResult::from_goals(1, 4).describe(1, 4), "L 1-4");
        assert_eq!(MatchResult::from_goals(2, 2), MatchResult::Draw);
        assert_eq!(MatchResult::Draw.describe(2, 2), "D 2-2");
    }

    #[test]
    fn test_handoff_level_floor() {
        assert_eq!(Handoff::new(0, 5), Handoff { level: 1, score: 5 });
        assert_eq!(Handoff::default(), Handoff::new(1, 0));
    }

    #[test]
    fn test_session_rng_is_reproducible() {
        let mut a = session_rng(42);
        let mut b = session_rng(42);
        let xs: Vec<u32> = (0..8).map(|_| a.random()).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.random()).collect();
        assert_eq!(xs, ys);
    }
}
