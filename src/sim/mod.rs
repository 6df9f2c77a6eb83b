//! Session simulation
//!
//! All gameplay logic lives here. Sessions are deterministic given a seed
//! and an input sequence:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Delayed events through a tick-driven timer queue
//! - No rendering or platform dependencies (effects go through `Presentation`)

pub mod collision;
pub mod dodgeball;
pub mod dribble;
pub mod penalty;
pub mod state;
pub mod tick;
pub mod timers;

pub use collision::{Rect, circle_rect_overlap, circles_overlap};
pub use dodgeball::DodgeballSession;
pub use dribble::DribbleSession;
pub use penalty::{DiveZone, KickVerdict, PenaltySession};
pub use state::{
    EndCause, GameSummary, Handoff, MatchResult, SessionContext, SessionOutcome, TerminalLatch,
    TickStatus, session_rng,
};
pub use tick::{FixedStep, InputSnapshot, ModeSession};
pub use timers::TimerQueue;
