//! Visual particles and the tap marker
//!
//! Not gameplay-affecting. Particles are advanced inside the tick so they
//! freeze with the rest of the simulation when the game is paused.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Maximum live particles; the oldest are dropped first
pub const MAX_PARTICLES: usize = 300;
/// Particle lifetime (seconds)
pub const PARTICLE_LIFETIME: f32 = 0.5;
/// Downward acceleration (pixels/s^2)
pub const PARTICLE_GRAVITY: f32 = 1080.0;
/// Tap marker lifetime (seconds)
pub const MARKER_LIFETIME: f32 = 1.0 / 3.0;

/// Burst colors
pub mod colors {
    pub const GOLD: u32 = 0xFFD700;
    pub const PURPLE: u32 = 0x9C27B0;
    pub const SHIELD_BLUE: u32 = 0x2196F3;
    pub const TAP_GREEN: u32 = 0x4CAF50;
    pub const CRASH_RED: u32 = 0xFF0000;
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    /// 1 at spawn, 0 at death; doubles as alpha
    pub life: f32,
    pub size: f32,
}

/// Short-lived ring drawn where the player tapped
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapMarker {
    pub pos: Vec2,
    /// 1 at spawn, 0 at death
    pub life: f32,
}

#[derive(Debug, Clone, Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    marker: Option<TapMarker>,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn marker(&self) -> Option<&TapMarker> {
        self.marker.as_ref()
    }

    /// Radial burst of `count` particles around `origin`
    pub fn burst<R: Rng>(&mut self, rng: &mut R, origin: Vec2, count: usize, color: u32) {
        if count == 0 {
            return;
        }
        let overflow = (self.particles.len() + count).saturating_sub(MAX_PARTICLES);
        if overflow > 0 {
            let drop = overflow.min(self.particles.len());
            self.particles.drain(..drop);
        }

        for i in 0..count {
            let angle = TAU * i as f32 / count as f32 + rng.random::<f32>() * 0.5;
            let speed = rng.random_range(2.0..5.0) * 60.0;
            let size = rng.random_range(2.0..5.0);
            self.particles.push(Particle {
                pos: origin,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                color,
                life: 1.0,
                size,
            });
        }
        if self.particles.len() > MAX_PARTICLES {
            let excess = self.particles.len() - MAX_PARTICLES;
            self.particles.drain(..excess);
        }
    }

    /// Place the tap marker (replaces any existing one)
    pub fn mark_tap(&mut self, pos: Vec2) {
        self.marker = Some(TapMarker { pos, life: 1.0 });
    }

    pub fn update(&mut self, dt: f32) {
        for particle in self.particles.iter_mut() {
            particle.pos += particle.vel * dt;
            particle.vel.y += PARTICLE_GRAVITY * dt;
            particle.life -= dt / PARTICLE_LIFETIME;
        }
        self.particles.retain(|p| p.life > 0.0);

        if let Some(marker) = self.marker.as_mut() {
            marker.life -= dt / MARKER_LIFETIME;
            if marker.life <= 0.0 {
                self.marker = None;
            }
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.marker = None;
    }
}
