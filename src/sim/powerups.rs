//! Timed power-up effects
//!
//! Activations are stamped with the simulation clock and expire lazily: a
//! query made after the duration has elapsed evicts the activation and
//! reports it inactive. Nothing runs in the background.

use serde::{Deserialize, Serialize};

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    SpeedBoost,
    ScoreMultiplier,
    SlowMotion,
    Magnet,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::Shield,
        PowerUpKind::SpeedBoost,
        PowerUpKind::ScoreMultiplier,
        PowerUpKind::SlowMotion,
        PowerUpKind::Magnet,
    ];

    #[inline]
    fn slot(self) -> usize {
        match self {
            PowerUpKind::Shield => 0,
            PowerUpKind::SpeedBoost => 1,
            PowerUpKind::ScoreMultiplier => 2,
            PowerUpKind::SlowMotion => 3,
            PowerUpKind::Magnet => 4,
        }
    }

    /// Stable identifier (used in the DOM and in storage)
    pub fn id(self) -> &'static str {
        match self {
            PowerUpKind::Shield => "shield",
            PowerUpKind::SpeedBoost => "speedBoost",
            PowerUpKind::ScoreMultiplier => "scoreMultiplier",
            PowerUpKind::SlowMotion => "slowMotion",
            PowerUpKind::Magnet => "magnet",
        }
    }

    /// HUD label
    pub fn label(self) -> &'static str {
        match self {
            PowerUpKind::Shield => "Shield",
            PowerUpKind::SpeedBoost => "Speed Boost",
            PowerUpKind::ScoreMultiplier => "Score x2",
            PowerUpKind::SlowMotion => "Slow Motion",
            PowerUpKind::Magnet => "Magnet",
        }
    }

    /// Accent color (0xRRGGBB)
    pub fn color(self) -> u32 {
        match self {
            PowerUpKind::Shield => 0x2196F3,
            PowerUpKind::SpeedBoost => 0xFF9800,
            PowerUpKind::ScoreMultiplier => 0x9C27B0,
            PowerUpKind::SlowMotion => 0x00BCD4,
            PowerUpKind::Magnet => 0xF44336,
        }
    }
}

/// Effect values derived from the active set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSet {
    pub shield: bool,
    pub speed_multiplier: f32,
    pub score_multiplier: f32,
    pub time_scale: f32,
    pub magnet: bool,
}

impl Default for EffectSet {
    fn default() -> Self {
        Self {
            shield: false,
            speed_multiplier: 1.0,
            score_multiplier: 1.0,
            time_scale: 1.0,
            magnet: false,
        }
    }
}

pub const SPEED_BOOST_MULTIPLIER: f32 = 1.5;
pub const SCORE_MULTIPLIER: f32 = 2.0;
pub const SLOW_MOTION_TIME_SCALE: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Activation {
    started_at_ms: f64,
    duration_ms: f64,
}

impl Activation {
    fn elapsed(&self, now_ms: f64) -> f64 {
        (now_ms - self.started_at_ms).max(0.0)
    }

    fn expired(&self, now_ms: f64) -> bool {
        self.elapsed(now_ms) >= self.duration_ms
    }
}

/// Registry of active power-ups (at most one activation per type)
#[derive(Debug, Clone, Default)]
pub struct PowerUpRegistry {
    slots: [Option<Activation>; 5],
}

impl PowerUpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate `kind`, overwriting any running activation of the same type
    pub fn activate(&mut self, kind: PowerUpKind, duration_ms: f64, now_ms: f64) {
        self.slots[kind.slot()] = Some(Activation {
            started_at_ms: now_ms,
            duration_ms: duration_ms.max(0.0),
        });
    }

    pub fn deactivate(&mut self, kind: PowerUpKind) {
        self.slots[kind.slot()] = None;
    }

    /// Whether `kind` is active at `now_ms`. Evicts the activation if expired.
    pub fn is_active(&mut self, kind: PowerUpKind, now_ms: f64) -> bool {
        let slot = &mut self.slots[kind.slot()];
        match slot {
            Some(activation) if activation.expired(now_ms) => {
                *slot = None;
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Remaining share of the duration in `[0, 1]` (0 when inactive)
    pub fn remaining_fraction(&mut self, kind: PowerUpKind, now_ms: f64) -> f32 {
        if !self.is_active(kind, now_ms) {
            return 0.0;
        }
        match self.slots[kind.slot()] {
            Some(activation) if activation.duration_ms > 0.0 => {
                let left = 1.0 - activation.elapsed(now_ms) / activation.duration_ms;
                left.clamp(0.0, 1.0) as f32
            }
            _ => 0.0,
        }
    }

    /// Derive the current effect multipliers
    pub fn effects(&mut self, now_ms: f64) -> EffectSet {
        EffectSet {
            shield: self.is_active(PowerUpKind::Shield, now_ms),
            speed_multiplier: if self.is_active(PowerUpKind::SpeedBoost, now_ms) {
                SPEED_BOOST_MULTIPLIER
            } else {
                1.0
            },
            score_multiplier: if self.is_active(PowerUpKind::ScoreMultiplier, now_ms) {
                SCORE_MULTIPLIER
            } else {
                1.0
            },
            time_scale: if self.is_active(PowerUpKind::SlowMotion, now_ms) {
                SLOW_MOTION_TIME_SCALE
            } else {
                1.0
            },
            magnet: self.is_active(PowerUpKind::Magnet, now_ms),
        }
    }

    /// Active types with their remaining fraction, in declaration order
    pub fn active_list(&mut self, now_ms: f64) -> Vec<(PowerUpKind, f32)> {
        PowerUpKind::ALL
            .iter()
            .filter_map(|&kind| {
                let left = self.remaining_fraction(kind, now_ms);
                (left > 0.0).then_some((kind, left))
            })
            .collect()
    }

    /// Evict every expired activation
    pub fn update(&mut self, now_ms: f64) {
        for kind in PowerUpKind::ALL {
            self.is_active(kind, now_ms);
        }
    }

    pub fn clear(&mut self) {
        self.slots = Default::default();
    }

    /// Read-only activity check (no eviction). Used by the renderer.
    pub fn peek_active(&self, kind: PowerUpKind, now_ms: f64) -> bool {
        self.slots[kind.slot()].is_some_and(|a| !a.expired(now_ms))
    }

    /// Read-only counterpart of [`Self::active_list`] for display
    pub fn peek_list(&self, now_ms: f64) -> Vec<(PowerUpKind, f32)> {
        PowerUpKind::ALL
            .iter()
            .filter_map(|&kind| {
                let a = self.slots[kind.slot()]?;
                if a.expired(now_ms) || a.duration_ms <= 0.0 {
                    return None;
                }
                let left = (1.0 - a.elapsed(now_ms) / a.duration_ms).clamp(0.0, 1.0) as f32;
                Some((kind, left))
            })
            .collect()
    }
}
