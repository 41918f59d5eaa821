//! Level progression, combo and score rules
//!
//! Level is a pure function of score. Each level fixes the spawn cadence,
//! obstacle spacing and fall speed through linear formulas clamped to a
//! floor (or cap), bottoming out at level 15.

use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::obstacles::Obstacle;
use super::powerups::{EffectSet, PowerUpKind, PowerUpRegistry};
use crate::consts::*;

/// Level for a given score: `min(15, floor(score / 500) + 1)`
pub fn level_for_score(score: u64) -> u32 {
    let level = (score / POINTS_PER_LEVEL).saturating_add(1);
    level.min(MAX_LEVEL as u64) as u32
}

/// Obstacle spawn interval in ms: `max(1100, 2500 - (L-1)*100)`
pub fn obstacle_interval_ms(level: u32) -> f32 {
    let steps = level.clamp(1, MAX_LEVEL).saturating_sub(1) as f32;
    (OBSTACLE_INTERVAL_MS - steps * OBSTACLE_INTERVAL_STEP_MS).max(OBSTACLE_INTERVAL_MIN_MS)
}

/// Collectible spawn interval in ms: `max(500, 1800 - (L-1)*90)`
pub fn collectible_interval_ms(level: u32) -> f32 {
    let steps = level.clamp(1, MAX_LEVEL).saturating_sub(1) as f32;
    (COLLECTIBLE_INTERVAL_MS - steps * COLLECTIBLE_INTERVAL_STEP_MS)
        .max(COLLECTIBLE_INTERVAL_MIN_MS)
}

/// Minimum horizontal gap between consecutive obstacle spawns: `max(30, 100 - (L-1)*5)`
pub fn min_obstacle_gap(level: u32) -> f32 {
    let steps = level.clamp(1, MAX_LEVEL).saturating_sub(1) as f32;
    (OBSTACLE_MIN_GAP - steps * OBSTACLE_GAP_STEP).max(OBSTACLE_GAP_MIN)
}

/// Fall speed shared by obstacles and collectibles (pixels/s)
pub fn base_fall_speed(level: u32) -> f32 {
    let steps = level.max(1).saturating_sub(1) as f32;
    (BASE_FALL_SPEED + steps * FALL_SPEED_PER_LEVEL).min(MAX_FALL_SPEED)
}

/// Maximum simultaneous obstacles: `min(6, 3 + (L-1)/2)`
pub fn max_obstacles(level: u32) -> usize {
    let steps = level.max(1).saturating_sub(1) as usize;
    (OBSTACLE_CAP_BASE + steps / 2).min(OBSTACLE_CAP_MAX)
}

/// Everything level-dependent, recomputed when the level changes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelContext {
    pub level: u32,
    pub obstacle_interval_ms: f32,
    pub collectible_interval_ms: f32,
    pub min_gap: f32,
    pub base_speed: f32,
    pub max_obstacles: usize,
}

impl LevelContext {
    pub fn for_level(level: u32) -> Self {
        let level = level.clamp(1, MAX_LEVEL);
        Self {
            level,
            obstacle_interval_ms: obstacle_interval_ms(level),
            collectible_interval_ms: collectible_interval_ms(level),
            min_gap: min_obstacle_gap(level),
            base_speed: base_fall_speed(level),
            max_obstacles: max_obstacles(level),
        }
    }
}

impl Default for LevelContext {
    fn default() -> Self {
        Self::for_level(1)
    }
}

/// Per-run statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub level: u32,
    /// Seconds of play this run
    pub game_time: f32,
    /// Seconds since the last collision (shield hits included)
    pub perfect_run_time: f32,
    /// Game time of the last obstacle pass
    pub last_pass_time: Option<f32>,
    pub max_speed: f32,
    pub coins: u32,
    pub stars: u32,
    /// Fractional combo decay not yet applied
    #[serde(skip)]
    pub decay_debt: f32,
}

impl GameStats {
    pub fn new() -> Self {
        Self {
            level: 1,
            ..Default::default()
        }
    }

    /// Recompute the level from score. Returns the new level if it rose.
    pub fn refresh_level(&mut self) -> Option<u32> {
        let level = level_for_score(self.score);
        if level > self.level {
            self.level = level;
            Some(level)
        } else {
            None
        }
    }

    /// Record an obstacle pass and award its points. Returns the points.
    pub fn record_pass(&mut self, score_multiplier: f32) -> u64 {
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.last_pass_time = Some(self.game_time);
        self.decay_debt = 0.0;

        let raw = PASS_BASE_POINTS
            + self.combo as u64 * PASS_COMBO_WEIGHT
            + self.level as u64 * PASS_LEVEL_WEIGHT;
        let points = (raw as f32 * score_multiplier).floor().max(0.0) as u64;
        self.score += points;
        points
    }

    /// Award a collection bonus: `floor(base * multiplier)`
    pub fn record_bonus(&mut self, base: f32, score_multiplier: f32) -> u64 {
        let points = (base * score_multiplier).floor().max(0.0) as u64;
        self.score += points;
        points
    }

    /// Combo decay after the grace window. Returns true if the combo changed.
    pub fn decay_combo(&mut self, dt: f32) -> bool {
        let Some(last) = self.last_pass_time else {
            return false;
        };
        if self.game_time - last <= COMBO_GRACE_SECS || self.combo == 0 {
            return false;
        }

        self.decay_debt += dt * COMBO_DECAY_PER_SEC;
        let whole = self.decay_debt.floor();
        if whole < 1.0 {
            return false;
        }
        self.decay_debt -= whole;
        let before = self.combo;
        self.combo = self.combo.saturating_sub(whole as u32);
        if self.combo == 0 {
            self.decay_debt = 0.0;
        }
        self.combo != before
    }

    /// Continuous bonus while a combo is held: `floor((1 + combo*0.5) * mult * dt)`
    pub fn accrue_combo_bonus(&mut self, dt: f32, score_multiplier: f32) -> u64 {
        if self.combo == 0 {
            return 0;
        }
        let per_second = 1.0 + self.combo as f32 * 0.5;
        let points = (per_second * score_multiplier * dt).floor().max(0.0) as u64;
        self.score += points;
        points
    }

    /// Freeze the run: combo resets and final speed stat is recorded
    pub fn finish(&mut self) {
        self.combo = 0;
        self.decay_debt = 0.0;
        self.max_speed = self.max_speed.max(2.0 + self.level as f32 * 0.3);
    }
}

/// Outcome of a collision check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    Clear,
    /// Shield absorbed the hit (obstacle id)
    Shielded(u32),
    /// Run ends (obstacle id)
    Fatal(u32),
}

/// Resolve player vs obstacle collisions. At most one hit is handled.
pub fn resolve_collisions(
    player: &Rect,
    obstacles: &[Obstacle],
    powerups: &mut PowerUpRegistry,
    effects: &EffectSet,
) -> CollisionOutcome {
    let Some(hit) = obstacles.iter().find(|o| o.bounds().overlaps(player)) else {
        return CollisionOutcome::Clear;
    };

    if effects.shield {
        powerups.deactivate(PowerUpKind::Shield);
        CollisionOutcome::Shielded(hit.id)
    } else {
        CollisionOutcome::Fatal(hit.id)
    }
}
