//! Fixed timestep driver and per-mode dispatch
//!
//! The host samples input once per frame into an [`InputSnapshot`], feeds
//! frame time to [`FixedStep`], and ticks the active [`ModeSession`] once per
//! substep.

use glam::Vec2;

use super::dodgeball::DodgeballSession;
use super::dribble::DribbleSession;
use super::penalty::PenaltySession;
use super::state::{Handoff, SessionContext, TickStatus};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::leaderboard::GameMode;
use crate::tuning::Tuning;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    /// Steering, each axis in -1..=1 (+y is down the screen)
    pub movement: Vec2,
    /// Action (space / tap) is down
    pub action_held: bool,
    /// Action went down since the previous frame
    pub action_just_pressed: bool,
    /// Special move (E) went down since the previous frame
    pub special_just_pressed: bool,
    /// Sprint (shift) is down
    pub sprint_held: bool,
}

impl InputSnapshot {
    /// Same held state with the one-shot edges cleared
    pub fn without_edges(&self) -> Self {
        Self {
            action_just_pressed: false,
            special_just_pressed: false,
            ..*self
        }
    }
}

/// Frame time accumulator producing fixed substeps
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a frame's worth of time and return how many `SIM_DT` substeps to run
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        // cap long frames (tab switches) to avoid a spiral of death
        self.accumulator += frame_dt.clamp(0.0, 0.1);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }
}

/// The running mode
#[derive(Debug)]
pub enum ModeSession {
    Dodgeball(DodgeballSession),
    Dribble(DribbleSession),
    Penalty(PenaltySession),
}

impl ModeSession {
    /// Enter `mode`; the shootout always starts fresh
    pub fn start(mode: GameMode, handoff: Handoff, seed: u64, tuning: &Tuning) -> Self {
        match mode {
            GameMode::Dodgeball => ModeSession::Dodgeball(DodgeballSession::new(
                handoff,
                seed,
                tuning.dodgeball.clone(),
            )),
            GameMode::Dribble => {
                ModeSession::Dribble(DribbleSession::new(handoff, seed, tuning.dribble.clone()))
            }
            GameMode::Penalties => {
                ModeSession::Penalty(PenaltySession::new(seed, tuning.penalty.clone()))
            }
        }
    }

    pub fn mode(&self) -> GameMode {
        match self {
            ModeSession::Dodgeball(_) => GameMode::Dodgeball,
            ModeSession::Dribble(_) => GameMode::Dribble,
            ModeSession::Penalty(_) => GameMode::Penalties,
        }
    }

    /// Level (or shootout round)
    pub fn level(&self) -> u32 {
        match self {
            ModeSession::Dodgeball(s) => s.level(),
            ModeSession::Dribble(s) => s.level(),
            ModeSession::Penalty(s) => s.round(),
        }
    }

    pub fn score(&self) -> u64 {
        match self {
            ModeSession::Dodgeball(s) => s.score(),
            ModeSession::Dribble(s) => s.score(),
            ModeSession::Penalty(s) => s.score(),
        }
    }

    pub fn tick(
        &mut self,
        dt: f32,
        input: &InputSnapshot,
        ctx: &mut SessionContext<'_>,
    ) -> TickStatus {
        match self {
            ModeSession::Dodgeball(s) => s.tick(dt, input, ctx),
            ModeSession::Dribble(s) => s.tick(dt, input, ctx),
            ModeSession::Penalty(s) => s.tick(dt, input, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::PersistenceStore;
    use crate::presentation::HeadlessPresentation;
    use crate::sim::SessionOutcome;

    #[test]
    fn test_fixed_step_substeps() {
        let mut step = FixedStep::new();
        assert_eq!(step.advance(SIM_DT * 0.5), 0);
        assert_eq!(step.advance(SIM_DT * 0.6), 1);
        assert_eq!(step.advance(SIM_DT * 3.0), 3);
        // long frames are capped at 100 ms
        assert_eq!(step.advance(5.0), 6);
        assert_eq!(step.advance(-1.0), 0);
    }

    #[test]
    fn test_without_edges_keeps_held_state() {
        let input = InputSnapshot {
            movement: Vec2::X,
            action_held: true,
            action_just_pressed: true,
            special_just_pressed: true,
            sprint_held: true,
        };
        let held = input.without_edges();
        assert!(held.action_held && held.sprint_held);
        assert!(!held.action_just_pressed && !held.special_just_pressed);
        assert_eq!(held.movement, Vec2::X);
    }

    #[test]
    fn test_dispatch_reports_mode_and_handoff() {
        let tuning = Tuning::default();
        for mode in GameMode::ALL {
            let session = ModeSession::start(mode, Handoff::new(3, 120), 1, &tuning);
            assert_eq!(session.mode(), mode);
            if mode == GameMode::Penalties {
                assert_eq!((session.level(), session.score()), (1, 0));
            } else {
                assert_eq!((session.level(), session.score()), (3, 120));
            }
        }
    }

    #[test]
    fn test_determinism() {
        // Two sessions with the same seed see identical worlds
        let store = PersistenceStore::in_memory();
        let tuning = Tuning::default();
        let mut a = ModeSession::start(GameMode::Dodgeball, Handoff::new(6, 0), 99999, &tuning);
        let mut b = ModeSession::start(GameMode::Dodgeball, Handoff::new(6, 0), 99999, &tuning);
        let mut pa = HeadlessPresentation::new();
        let mut pb = HeadlessPresentation::new();

        let inputs = [
            InputSnapshot {
                movement: Vec2::new(0.0, -1.0),
                ..Default::default()
            },
            InputSnapshot {
                movement: Vec2::new(1.0, 0.5),
                action_just_pressed: true,
                ..Default::default()
            },
            InputSnapshot::default(),
        ];

        let mut ended = None;
        for i in 0..600 {
            let input = &inputs[i % inputs.len()];
            let sa = a.tick(SIM_DT, input, &mut SessionContext::new(&store, &mut pa));
            let sb = b.tick(SIM_DT, input, &mut SessionContext::new(&store, &mut pb));
            assert_eq!(sa, sb);
            if let TickStatus::Finished { outcome, .. } = sa {
                assert!(ended.is_none());
                ended = Some(outcome);
            }
        }

        assert_eq!(a.score(), b.score());
        assert_eq!(pa.calls, pb.calls);
        if let (ModeSession::Dodgeball(a), ModeSession::Dodgeball(b)) = (&a, &b) {
            assert_eq!(a.player(), b.player());
            assert_eq!(a.hazards().len(), b.hazards().len());
        }
        if let Some(SessionOutcome::Ended(summary)) = ended {
            assert_eq!(summary.mode, GameMode::Dodgeball);
        }
    }
}
