//! Port to the rendering/audio collaborator
//!
//! Sessions never draw or play anything themselves. They describe effects
//! through [`Presentation`] and the host decides how to show them (canvas,
//! WebAudio, or nothing at all in tests).

use glam::Vec2;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Ball kicked (deflect, shot, CPU penalty)
    Kick,
    /// Player hit by a ball
    Hit,
    /// Hazard landed on the pitch
    Bounce,
    /// Hazard launched / keeper dive
    Whoosh,
    /// Level complete or shootout won
    LevelUp,
    /// Menu choice or dive locked in
    Select,
    /// Goal scored
    Goal,
    /// Tackle, block or save
    Tackle,
    /// Skill move
    Skill,
    /// Points awarded
    Points,
}

impl SoundCue {
    /// Stable name for hosts that key sounds by string
    pub fn name(&self) -> &'static str {
        match self {
            SoundCue::Kick => "kick",
            SoundCue::Hit => "hit",
            SoundCue::Bounce => "bounce",
            SoundCue::Whoosh => "whoosh",
            SoundCue::LevelUp => "levelUp",
            SoundCue::Select => "select",
            SoundCue::Goal => "goal",
            SoundCue::Tackle => "tackle",
            SoundCue::Skill => "skill",
            SoundCue::Points => "points",
        }
    }
}

/// Visual effects a session can request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualKind {
    /// Floating "+N" text
    ScorePopup { points: u64 },
    /// Star burst (deflects, goals, skill trail)
    StarBurst,
    /// Red hit burst (hit, tackle, block)
    HitBurst,
    /// Banner such as "Level 3" or "GOAL!"
    Banner(Banner),
}

impl VisualKind {
    /// Purely decorative particles, suppressed when particles are disabled
    pub fn is_particle(&self) -> bool {
        matches!(self, VisualKind::StarBurst | VisualKind::HitBurst)
    }

    pub fn name(&self) -> &'static str {
        match self {
            VisualKind::ScorePopup { .. } => "scorePopup",
            VisualKind::StarBurst => "starBurst",
            VisualKind::HitBurst => "hitBurst",
            VisualKind::Banner(banner) => banner.name(),
        }
    }
}

/// Centered result banners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    LevelStart,
    LevelComplete,
    Goal,
    Saved,
    Blocked,
    Missed,
    Tackled,
    GoalConceded,
    ShootoutWon,
    ShootoutLost,
    ShootoutDrawn,
}

impl Banner {
    pub fn name(&self) -> &'static str {
        match self {
            Banner::LevelStart => "levelStart",
            Banner::LevelComplete => "levelComplete",
            Banner::Goal => "goal",
            Banner::Saved => "saved",
            Banner::Blocked => "blocked",
            Banner::Missed => "missed",
            Banner::Tackled => "tackled",
            Banner::GoalConceded => "goalConceded",
            Banner::ShootoutWon => "shootoutWon",
            Banner::ShootoutLost => "shootoutLost",
            Banner::ShootoutDrawn => "shootoutDrawn",
        }
    }
}

/// Opaque id of a spawned visual (0 = suppressed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VisualHandle(pub u32);

impl VisualHandle {
    pub const NONE: VisualHandle = VisualHandle(0);
}

/// Effects sink implemented by the host
pub trait Presentation {
    fn spawn_visual(&mut self, kind: VisualKind, pos: Vec2) -> VisualHandle;
    fn play_sound(&mut self, cue: SoundCue);
    /// Shake the camera; intensity is a fraction of the view size
    fn camera_shake(&mut self, intensity: f32, duration_ms: u32);
}

/// A recorded presentation call
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationCall {
    Visual {
        handle: VisualHandle,
        kind: VisualKind,
        pos: Vec2,
    },
    Sound(SoundCue),
    Shake { intensity: f32, duration_ms: u32 },
}

/// Recording presentation for tests and the native demo
#[derive(Debug, Default)]
pub struct HeadlessPresentation {
    pub calls: Vec<PresentationCall>,
    next_handle: u32,
}

impl HeadlessPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sounds(&self) -> impl Iterator<Item = SoundCue> + '_ {
        self.calls.iter().filter_map(|c| match c {
            PresentationCall::Sound(cue) => Some(*cue),
            _ => None,
        })
    }

    pub fn visuals(&self) -> impl Iterator<Item = VisualKind> + '_ {
        self.calls.iter().filter_map(|c| match c {
            PresentationCall::Visual { kind, .. } => Some(*kind),
            _ => None,
        })
    }

    pub fn count_sound(&self, cue: SoundCue) -> usize {
        self.sounds().filter(|c| *c == cue).count()
    }

    pub fn shakes(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, PresentationCall::Shake { .. }))
            .count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Presentation for HeadlessPresentation {
    fn spawn_visual(&mut self, kind: VisualKind, pos: Vec2) -> VisualHandle {
        self.next_handle += 1;
        let handle = VisualHandle(self.next_handle);
        self.calls.push(PresentationCall::Visual { handle, kind, pos });
        handle
    }

    fn play_sound(&mut self, cue: SoundCue) {
        self.calls.push(PresentationCall::Sound(cue));
    }

    fn camera_shake(&mut self, intensity: f32, duration_ms: u32) {
        self.calls.push(PresentationCall::Shake {
            intensity,
            duration_ms,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_records_in_order() {
        let mut p = HeadlessPresentation::new();
        let a = p.spawn_visual(VisualKind::StarBurst, Vec2::ZERO);
        p.play_sound(SoundCue::Kick);
        let b = p.spawn_visual(VisualKind::ScorePopup { points: 10 }, Vec2::ONE);
        p.camera_shake(0.005, 80);

        assert_ne!(a, b);
        assert_ne!(a, VisualHandle::NONE);
        assert_eq!(p.calls.len(), 4);
        assert_eq!(p.count_sound(SoundCue::Kick), 1);
        assert_eq!(p.shakes(), 1);
        assert_eq!(
            p.visuals().collect::<Vec<_>>(),
            vec![VisualKind::StarBurst, VisualKind::ScorePopup { points: 10 }]
        );
    }

    #[test]
    fn test_particle_classification() {
        assert!(VisualKind::HitBurst.is_particle());
        assert!(!VisualKind::ScorePopup { points: 5 }.is_particle());
        assert!(!VisualKind::Banner(Banner::Goal).is_particle());
    }
}
