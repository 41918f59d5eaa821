//! Collaborators the session talks to
//!
//! Each one is optional. A missing collaborator means the matching feature
//! is off; the game itself never depends on them.

use crate::achievements::Achievement;
use crate::audio::SoundEffect;
use crate::sim::RunSummary;

/// Stats handed to the achievement check when a run ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalStats {
    pub run: RunSummary,
    /// Lifetime coins including this run
    pub lifetime_coins: u64,
}

pub trait AchievementSink {
    /// Unlock whatever `stats` qualifies for. Returns newly unlocked entries.
    fn check(&mut self, stats: &FinalStats) -> Vec<Achievement>;
}

pub trait LeaderboardSink {
    /// Record a finished run. Returns the rank (1-based) if it made the board.
    fn add_entry(
        &mut self,
        score: u64,
        duration_secs: f32,
        coins: u32,
        timestamp_ms: f64,
    ) -> Option<usize>;

    /// Update lifetime totals (games played, play time)
    fn record_run(&mut self, duration_secs: f32);
}

pub trait SoundSink {
    /// Play `effect` at `volume` in [0, 1]
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Optional collaborators, supplied at construction
#[derive(Default)]
pub struct Services {
    pub achievements: Option<Box<dyn AchievementSink>>,
    pub leaderboard: Option<Box<dyn LeaderboardSink>>,
    pub sound: Option<Box<dyn SoundSink>>,
}

impl Services {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_achievements(mut self, sink: impl AchievementSink + 'static) -> Self {
        self.achievements = Some(Box::new(sink));
        self
    }

    pub fn with_leaderboard(mut self, sink: impl LeaderboardSink + 'static) -> Self {
        self.leaderboard = Some(Box::new(sink));
        self
    }

    pub fn with_sound(mut self, sink: impl SoundSink + 'static) -> Self {
        self.sound = Some(Box::new(sink));
        self
    }

    pub fn play(&mut self, effect: SoundEffect, volume: f32) {
        if let Some(sound) = self.sound.as_mut() {
            sound.play(effect, volume);
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("achievements", &self.achievements.is_some())
            .field("leaderboard", &self.leaderboard.is_some())
            .field("sound", &self.sound.is_some())
            .finish()
    }
}
