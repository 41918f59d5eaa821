//! Falling obstacles: spawning, rotation physics, pass detection
//!
//! Obstacle positions are the top-left corner of their box. An obstacle
//! "passes" once it falls below the canvas plus a margin; passes are
//! reported to the caller, which owns scoring.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::scoring::LevelContext;
use crate::consts::*;
use crate::decay_factor;

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Tall, slow-spinning
    Tree,
    /// Compact and a bit faster
    Rock,
    /// Round, slightly slower, shows up more at high levels
    Snowman,
}

impl ObstacleKind {
    /// Box size (width, height)
    pub fn size(self) -> (f32, f32) {
        match self {
            ObstacleKind::Tree => (35.0, 50.0),
            ObstacleKind::Rock => (30.0, 30.0),
            ObstacleKind::Snowman => (35.0, 40.0),
        }
    }

    pub fn speed_multiplier(self) -> f32 {
        match self {
            ObstacleKind::Tree => 1.0,
            ObstacleKind::Rock => 1.1,
            ObstacleKind::Snowman => 0.9,
        }
    }

    /// Base angular speed limit (radians/s) before the fall-speed factor
    pub fn max_spin(self) -> f32 {
        match self {
            ObstacleKind::Tree => 0.02,
            ObstacleKind::Rock => 0.04,
            ObstacleKind::Snowman => 0.015,
        }
    }
}

/// Weighted type tables by level band
const EARLY_TABLE: &[(ObstacleKind, f32)] = &[(ObstacleKind::Tree, 0.6), (ObstacleKind::Rock, 0.4)];
const MID_TABLE: &[(ObstacleKind, f32)] = &[
    (ObstacleKind::Tree, 0.4),
    (ObstacleKind::Rock, 0.3),
    (ObstacleKind::Snowman, 0.3),
];
const LATE_TABLE: &[(ObstacleKind, f32)] = &[
    (ObstacleKind::Tree, 0.3),
    (ObstacleKind::Rock, 0.2),
    (ObstacleKind::Snowman, 0.5),
];

/// Type distribution for a level: <=3, 4-7, >7
pub fn kind_table(level: u32) -> &'static [(ObstacleKind, f32)] {
    match level {
        0..=3 => EARLY_TABLE,
        4..=7 => MID_TABLE,
        _ => LATE_TABLE,
    }
}

/// Pick a type from the level's table with a uniform roll in `[0, 1)`
pub fn pick_kind(level: u32, roll: f32) -> ObstacleKind {
    let table = kind_table(level);
    let mut acc = 0.0;
    for &(kind, weight) in table {
        acc += weight;
        if roll < acc {
            return kind;
        }
    }
    table[table.len() - 1].0
}

/// Draw a spawn x away from `last_x`, giving up after `retries` redraws
pub fn pick_spawn_x(
    mut draw: impl FnMut() -> f32,
    last_x: Option<f32>,
    min_gap: f32,
    retries: u32,
) -> f32 {
    let mut x = draw();
    let Some(last) = last_x else {
        return x;
    };
    let mut attempts = 0;
    while (x - last).abs() < min_gap && attempts < retries {
        x = draw();
        attempts += 1;
    }
    x
}

/// A falling obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Fall speed (pixels/s)
    pub speed: f32,
    /// Game time at spawn (seconds)
    pub spawn_time: f32,
    pub rotation: f32,
    pub rotation_vel: f32,
    pub rotation_accel: f32,
    /// Horizontal draw offset derived from spin
    pub wobble: f32,
    pub fall_distance: f32,
}

impl Obstacle {
    pub fn new(id: u32, kind: ObstacleKind, pos: Vec2, speed: f32, spawn_time: f32) -> Self {
        let (width, height) = kind.size();
        Self {
            id,
            kind,
            pos,
            width,
            height,
            speed,
            spawn_time,
            rotation: 0.0,
            rotation_vel: 0.0,
            rotation_accel: 0.0,
            wobble: 0.0,
            fall_distance: 0.0,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    /// Advance fall and spin by `dt` seconds of scaled time
    fn step(&mut self, dt: f32, time_scale: f32) {
        let fall = self.speed * dt * time_scale;
        self.fall_distance += fall;

        // Faster fallers may spin a little faster (capped at 1.5x)
        let speed_factor = (self.speed / (3.0 * REFERENCE_FPS)).min(1.5);
        let max_vel = self.kind.max_spin() * speed_factor;

        self.rotation_vel += self.rotation_accel * dt * time_scale;
        self.rotation_vel *= 1.0 - OBSTACLE_ROTATION_DAMPING * dt;
        self.rotation_vel = self.rotation_vel.clamp(-max_vel, max_vel);
        self.rotation += self.rotation_vel * dt * time_scale;

        if self.rotation_vel.abs() > 0.01 {
            self.wobble = (self.rotation * 2.0).sin() * self.rotation_vel.abs() * 3.0;
        } else {
            self.wobble *= decay_factor(0.95, dt);
        }

        self.pos.y += fall;
    }
}

/// Result of one obstacle update
#[derive(Debug, Default)]
pub struct ObstacleUpdate {
    /// Obstacles that left the bottom of the screen this frame, in order
    pub passed: Vec<Obstacle>,
    /// Obstacles dropped by the on-screen cap
    pub evicted: usize,
}

/// Owns all live obstacles
#[derive(Debug, Clone, Default)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
    last_spawn_x: Option<f32>,
    spawn_timer_ms: f32,
    next_id: u32,
}

impl ObstacleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn last_spawn_x(&self) -> Option<f32> {
        self.last_spawn_x
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
        self.last_spawn_x = None;
        self.spawn_timer_ms = 0.0;
    }

    /// Advance the spawn timer and spawn when the level's interval elapses
    pub fn try_spawn<R: Rng>(
        &mut self,
        ctx: &LevelContext,
        dt_ms: f32,
        canvas_width: f32,
        now: f32,
        rng: &mut R,
    ) -> Option<&Obstacle> {
        self.spawn_timer_ms += dt_ms;
        if self.spawn_timer_ms < ctx.obstacle_interval_ms {
            return None;
        }
        self.spawn_timer_ms = 0.0;
        Some(self.spawn(ctx, canvas_width, now, rng))
    }

    /// Spawn one obstacle above the top edge
    pub fn spawn<R: Rng>(
        &mut self,
        ctx: &LevelContext,
        canvas_width: f32,
        now: f32,
        rng: &mut R,
    ) -> &Obstacle {
        let kind = pick_kind(ctx.level, rng.random::<f32>());
        let (width, height) = kind.size();
        let span = (canvas_width - width).max(0.0);
        let x = pick_spawn_x(
            || rng.random::<f32>() * span,
            self.last_spawn_x,
            ctx.min_gap,
            OBSTACLE_SPAWN_RETRIES,
        );
        self.last_spawn_x = Some(x);

        let id = self.next_id;
        self.next_id += 1;

        let speed = ctx.base_speed * kind.speed_multiplier();
        let mut obstacle = Obstacle::new(id, kind, Vec2::new(x, -height), speed, now);
        obstacle.rotation = (rng.random::<f32>() - 0.5) * 0.3;
        obstacle.rotation_accel = (rng.random::<f32>() - 0.5) * 0.02;

        self.obstacles.push(obstacle);
        &self.obstacles[self.obstacles.len() - 1]
    }

    /// Insert a prepared obstacle (tests and scripted scenarios)
    pub fn insert(&mut self, obstacle: Obstacle) {
        self.next_id = self.next_id.max(obstacle.id + 1);
        self.obstacles.push(obstacle);
    }

    /// Remove an obstacle by id. Returns it if it was live.
    pub fn remove(&mut self, id: u32) -> Option<Obstacle> {
        let index = self.obstacles.iter().position(|o| o.id == id)?;
        Some(self.obstacles.remove(index))
    }

    /// Move everything, collect passes, enforce the level cap
    pub fn update(
        &mut self,
        dt: f32,
        time_scale: f32,
        canvas_height: f32,
        ctx: &LevelContext,
    ) -> ObstacleUpdate {
        for obstacle in &mut self.obstacles {
            obstacle.step(dt, time_scale);
        }

        let limit = canvas_height + OBSTACLE_PASS_MARGIN;
        let (passed, live): (Vec<_>, Vec<_>) = std::mem::take(&mut self.obstacles)
            .into_iter()
            .partition(|o| o.pos.y > limit);
        self.obstacles = live;
        if !passed.is_empty() && self.obstacles.is_empty() {
            self.last_spawn_x = None;
        }

        let cap = ctx.max_obstacles;
        let mut evicted = 0;
        if self.obstacles.len() > cap {
            self.obstacles
                .sort_by(|a, b| a.spawn_time.total_cmp(&b.spawn_time));
            evicted = self.obstacles.len() - cap;
            self.obstacles.drain(..evicted);
        }

        ObstacleUpdate { passed, evicted }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_kind_tables_sum_to_one() {
        for level in [1, 4, 8] {
            let total: f32 = kind_table(level).iter().map(|(_, w)| w).sum();
            assert!((total - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_pick_kind_bands() {
        assert_eq!(pick_kind(1, 0.0), ObstacleKind::Tree);
        assert_eq!(pick_kind(3, 0.65), ObstacleKind::Rock);
        assert_eq!(pick_kind(3, 0.999), ObstacleKind::Rock);
        assert_eq!(pick_kind(5, 0.75), ObstacleKind::Snowman);
        assert_eq!(pick_kind(9, 0.45), ObstacleKind::Rock);
        assert_eq!(pick_kind(9, 0.55), ObstacleKind::Snowman);
    }

    #[test]
    fn test_spawn_x_retries_then_accepts() {
        // Every draw lands on the last position: gives up after the retries
        let mut draws = 0;
        let x = pick_spawn_x(
            || {
                draws += 1;
                100.0
            },
            Some(100.0),
            50.0,
            5,
        );
        assert_eq!(x, 100.0);
        assert_eq!(draws, 6);

        // Second draw clears the gap
        let mut seq = [110.0, 300.0].into_iter();
        let x = pick_spawn_x(|| seq.next().unwrap_or(0.0), Some(100.0), 50.0, 5);
        assert_eq!(x, 300.0);
    }

    #[test]
    fn test_spawn_x_without_history_uses_first_draw() {
        let mut draws = 0;
        let x = pick_spawn_x(
            || {
                draws += 1;
                42.0
            },
            None,
            100.0,
            5,
        );
        assert_eq!(x, 42.0);
        assert_eq!(draws, 1);
    }

    #[test]
    fn test_spawn_places_above_screen() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut field = ObstacleField::new();
        let ctx = LevelContext::for_level(1);
        let o = field.spawn(&ctx, 500.0, 0.0, &mut rng).clone();
        assert_eq!(o.pos.y, -o.height);
        assert!(o.pos.x >= 0.0 && o.pos.x <= 500.0 - o.width);
        assert!((o.speed - 90.0 * o.kind.speed_multiplier()).abs() < 1e-4);
        assert!(o.rotation.abs() <= 0.15);
        assert_eq!(field.last_spawn_x(), Some(o.pos.x));
    }

    #[test]
    fn test_try_spawn_respects_interval() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut field = ObstacleField::new();
        let ctx = LevelContext::for_level(1);
        assert!(field.try_spawn(&ctx, 2000.0, 500.0, 0.0, &mut rng).is_none());
        assert!(field.try_spawn(&ctx, 499.0, 500.0, 0.0, &mut rng).is_none());
        assert!(field.try_spawn(&ctx, 1.0, 500.0, 0.0, &mut rng).is_some());
        assert_eq!(field.len(), 1);
        assert!(field.try_spawn(&ctx, 16.0, 500.0, 0.0, &mut rng).is_none());
    }

    #[test]
    fn test_pass_detection() {
        let mut field = ObstacleField::new();
        field.insert(Obstacle::new(0, ObstacleKind::Tree, Vec2::new(10.0, 845.0), 600.0, 0.0));
        field.insert(Obstacle::new(1, ObstacleKind::Rock, Vec2::new(200.0, 0.0), 90.0, 1.0));

        let update = field.update(0.01, 1.0, 800.0, &LevelContext::for_level(1));
        assert_eq!(update.passed.len(), 1);
        assert_eq!(update.passed[0].id, 0);
        assert_eq!(field.len(), 1);
    }

    #[test]
    fn test_last_x_resets_when_field_empties() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut field = ObstacleField::new();
        let ctx = LevelContext::for_level(1);
        field.spawn(&ctx, 500.0, 0.0, &mut rng);
        assert!(field.last_spawn_x().is_some());
        // Fall far enough to pass in one step
        field.update(20.0, 1.0, 800.0, &ctx);
        assert!(field.is_empty());
        assert_eq!(field.last_spawn_x(), None);
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut field = ObstacleField::new();
        for (id, t) in [(0, 5.0), (1, 1.0), (2, 3.0), (3, 4.0), (4, 2.0)] {
            field.insert(Obstacle::new(id, ObstacleKind::Rock, Vec2::new(0.0, 0.0), 0.0, t));
        }
        // Level 1 cap is 3
        let update = field.update(0.016, 1.0, 800.0, &LevelContext::for_level(1));
        assert_eq!(update.evicted, 2);
        let ids: Vec<u32> = field.all().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![2, 3, 0]);
    }

    #[test]
    fn test_cap_follows_level_context() {
        let mut field = ObstacleField::new();
        for id in 0..8 {
            field.insert(Obstacle::new(id, ObstacleKind::Rock, Vec2::ZERO, 0.0, id as f32));
        }
        let update = field.update(0.016, 1.0, 800.0, &LevelContext::for_level(7));
        assert_eq!(update.evicted, 2);
        assert_eq!(field.len(), 6);
    }

    #[test]
    fn test_remove_by_id() {
        let mut field = ObstacleField::new();
        field.insert(Obstacle::new(4, ObstacleKind::Tree, Vec2::ZERO, 90.0, 0.0));
        field.insert(Obstacle::new(7, ObstacleKind::Rock, Vec2::ZERO, 90.0, 0.0));
        assert_eq!(field.remove(4).map(|o| o.id), Some(4));
        assert!(field.remove(4).is_none());
        assert_eq!(field.all().iter().map(|o| o.id).collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn test_spin_is_clamped_and_damped() {
        let mut o = Obstacle::new(0, ObstacleKind::Rock, Vec2::ZERO, 270.0, 0.0);
        o.rotation_accel = 10.0;
        for _ in 0..120 {
            o.step(1.0 / 60.0, 1.0);
        }
        // speed factor = min(270 / 180, 1.5) = 1.5
        assert!(o.rotation_vel <= 0.04 * 1.5 + 1e-6);
        assert!(o.rotation > 0.0);
    }

    #[test]
    fn test_slow_motion_scales_fall() {
        let mut a = Obstacle::new(0, ObstacleKind::Tree, Vec2::ZERO, 100.0, 0.0);
        let mut b = a.clone();
        a.step(1.0, 1.0);
        b.step(1.0, 0.6);
        assert!((a.pos.y - 100.0).abs() < 1e-4);
        assert!((b.pos.y - 60.0).abs() < 1e-4);
    }
}
