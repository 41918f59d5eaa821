//! Falling pickups: coins, stars and power-ups
//!
//! The field only moves items and flags collection. Scoring, wallet totals
//! and power-up activation happen in the tick, which sees each collected
//! item exactly once through [`CollectibleUpdate::collected`].

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{distance_sq, within_radius};
use super::powerups::PowerUpKind;
use super::scoring::LevelContext;
use crate::consts::*;

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleKind {
    Coin,
    Star,
    PowerUp(PowerUpKind),
}

impl CollectibleKind {
    /// Square size in pixels
    pub fn size(self) -> f32 {
        match self {
            CollectibleKind::Coin => 20.0,
            CollectibleKind::Star => 25.0,
            CollectibleKind::PowerUp(_) => 30.0,
        }
    }

    /// Type from two uniform rolls: one for the band, one for the power-up subtype
    pub fn from_rolls(band: f32, subtype: f32) -> Self {
        if band < STAR_CHANCE {
            CollectibleKind::Star
        } else if band < STAR_CHANCE + POWER_UP_CHANCE {
            let count = PowerUpKind::ALL.len();
            let index = ((subtype * count as f32) as usize).min(count - 1);
            CollectibleKind::PowerUp(PowerUpKind::ALL[index])
        } else {
            CollectibleKind::Coin
        }
    }
}

/// A falling pickup. `pos` is the item center.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub kind: CollectibleKind,
    pub pos: Vec2,
    pub size: f32,
    pub collected: bool,
    pub rotation: f32,
    /// Seconds alive
    pub anim_time: f32,
    /// Scale factor oscillating in [0.9, 1.1]
    pub pulse: f32,
    /// Glow intensity in [0, 1]
    pub glow: f32,
    /// Phase offset for the bob animation
    pub bob_phase: f32,
}

const BOB_SPEED: f32 = 0.05;
const BOB_AMOUNT: f32 = 5.0;

impl Collectible {
    pub fn new(id: u32, kind: CollectibleKind, pos: Vec2, bob_phase: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            size: kind.size(),
            collected: false,
            rotation: 0.0,
            anim_time: 0.0,
            pulse: 1.0,
            glow: 0.0,
            bob_phase,
        }
    }

    /// Vertical draw offset from the bob animation
    pub fn bob_offset(&self) -> f32 {
        (self.rotation * BOB_SPEED + self.bob_phase).sin() * BOB_AMOUNT
    }

    fn animate(&mut self, dt: f32) {
        self.anim_time += dt;
        self.rotation += dt * 0.05;
        self.pulse = (self.anim_time * 4.0).sin() * 0.1 + 1.0;
        self.glow = ((self.anim_time * 3.0).sin() + 1.0) / 2.0;
    }

    /// Pull toward `target` with strength falling off linearly to the magnet radius
    fn attract(&mut self, target: Vec2, dt: f32) {
        let dist_sq = distance_sq(self.pos, target);
        if dist_sq <= 0.0 || dist_sq >= MAGNET_RADIUS * MAGNET_RADIUS {
            return;
        }
        let dist = dist_sq.sqrt();
        let strength = (MAGNET_RADIUS - dist) / MAGNET_RADIUS;
        let dir = (target - self.pos) / dist;
        self.pos += dir * strength * MAGNET_PULL_SPEED * dt;
    }
}

/// Result of one collectible update
#[derive(Debug, Default)]
pub struct CollectibleUpdate {
    /// Items picked up this frame, in field order
    pub collected: Vec<Collectible>,
    /// Items that fell off screen
    pub missed: usize,
}

/// Owns all live pickups
#[derive(Debug, Clone, Default)]
pub struct CollectibleField {
    items: Vec<Collectible>,
    spawn_timer_ms: f32,
    next_id: u32,
}

impl CollectibleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Collectible] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.spawn_timer_ms = 0.0;
    }

    /// Advance the spawn timer and spawn on the level's cadence
    pub fn try_spawn<R: Rng>(
        &mut self,
        ctx: &LevelContext,
        dt_ms: f32,
        canvas_width: f32,
        rng: &mut R,
    ) -> Option<&Collectible> {
        self.spawn_timer_ms += dt_ms;
        if self.spawn_timer_ms < ctx.collectible_interval_ms {
            return None;
        }
        self.spawn_timer_ms = 0.0;
        Some(self.spawn(canvas_width, rng))
    }

    /// Spawn a random pickup just above the top edge
    pub fn spawn<R: Rng>(&mut self, canvas_width: f32, rng: &mut R) -> &Collectible {
        let kind = CollectibleKind::from_rolls(rng.random(), rng.random());
        let x = rng.random::<f32>() * (canvas_width - 40.0).max(0.0) + 20.0;
        let phase = rng.random::<f32>() * TAU;
        self.create(kind, Vec2::new(x, -30.0), phase)
    }

    /// Place a specific pickup
    pub fn create(&mut self, kind: CollectibleKind, pos: Vec2, bob_phase: f32) -> &Collectible {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Collectible::new(id, kind, pos, bob_phase));
        &self.items[self.items.len() - 1]
    }

    /// Move, attract, collect and cull.
    ///
    /// `fall_speed` is the level's base speed in pixels/s; `time_scale`
    /// slows falling during slow motion. Collection uses a strict
    /// squared-distance test against [`COLLECT_RADIUS`].
    pub fn update(
        &mut self,
        dt: f32,
        player_pos: Vec2,
        magnet: bool,
        fall_speed: f32,
        time_scale: f32,
        canvas_height: f32,
    ) -> CollectibleUpdate {
        for item in &mut self.items {
            item.animate(dt);
            item.pos.y += fall_speed * dt * time_scale;
            if magnet {
                item.attract(player_pos, dt);
            }
            if within_radius(item.pos, player_pos, COLLECT_RADIUS) {
                item.collected = true;
            }
        }

        let limit = canvas_height + COLLECTIBLE_DESPAWN_MARGIN;
        let mut missed = 0;
        let (collected, live): (Vec<_>, Vec<_>) = std::mem::take(&mut self.items)
            .into_iter()
            .filter(|item| {
                let keep = item.collected || item.pos.y <= limit;
                if !keep {
                    missed += 1;
                }
                keep
            })
            .partition(|item| item.collected);
        self.items = live;

        CollectibleUpdate { collected, missed }
    }
}
