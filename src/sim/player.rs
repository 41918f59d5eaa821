//! Player controller
//!
//! Input moves the target x; the drawn position eases toward it with
//! time-based exponential smoothing. Tilt, bounce, blink and shake are
//! cosmetic state read by the renderer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::*;
use crate::{decay_factor, smoothing_alpha};

/// Horizontal input direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    /// Both held: the moves cancel but the player still counts as moving
    Both,
    #[default]
    None,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
            Direction::Both | Direction::None => 0.0,
        }
    }

    /// Resolve held keys into a direction
    pub fn from_keys(left: bool, right: bool) -> Self {
        match (left, right) {
            (true, true) => Direction::Both,
            (false, true) => Direction::Right,
            (true, false) => Direction::Left,
            (false, false) => Direction::None,
        }
    }
}

/// Cosmetic animation state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerAnim {
    /// Seconds of animation time
    pub time: f32,
    /// Tilt angle (radians)
    pub tilt: f32,
    /// Vertical bounce offset (pixels)
    pub bounce: f32,
    /// 1.0 while the eyes are closed
    pub blink: f32,
    /// Hit shake magnitude
    pub shake: f32,
    /// Last movement direction (-1, 0, 1)
    pub direction: f32,
    pub moving: bool,
}

/// The player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub target_x: f32,
    pub width: f32,
    pub height: f32,
    /// Smoothing factor per reference frame
    pub smoothing: f32,
    pub anim: PlayerAnim,
    /// Direction held this frame
    #[serde(skip)]
    input: Direction,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            target_x: 0.0,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            smoothing: PLAYER_SMOOTHING,
            anim: PlayerAnim::default(),
            input: Direction::None,
        }
    }
}

impl Player {
    /// Player centered horizontally near the bottom of the canvas
    pub fn spawn(canvas: Vec2) -> Self {
        let mut player = Self::default();
        player.place(canvas);
        player
    }

    /// Reset position to the spawn point for `canvas`
    pub fn place(&mut self, canvas: Vec2) {
        self.pos = Vec2::new(canvas.x / 2.0, canvas.y - PLAYER_BOTTOM_OFFSET);
        self.target_x = self.pos.x;
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    /// Collision box centered on the player position
    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.pos, self.width, self.height)
    }

    /// Clamp an x coordinate to the playable range for `canvas_width`
    pub fn clamp_x(&self, x: f32, canvas_width: f32) -> f32 {
        let min = self.half_width();
        let max = (canvas_width - self.half_width()).max(min);
        x.clamp(min, max)
    }

    /// Set target x (pointer / tap). Clamped immediately and on every update.
    pub fn set_target_x(&mut self, x: f32, canvas_width: f32) {
        self.target_x = self.clamp_x(x, canvas_width);
    }

    /// Shift the target by a drag delta (already scaled to canvas pixels)
    pub fn nudge_target(&mut self, delta: f32, canvas_width: f32) {
        self.target_x = self.clamp_x(self.target_x + delta, canvas_width);
    }

    /// Record the held direction for the next update
    pub fn apply_directional_input(&mut self, direction: Direction) {
        self.input = direction;
    }

    /// Kick off the hit shake
    pub fn shake(&mut self, magnitude: f32) {
        self.anim.shake = self.anim.shake.max(magnitude);
    }

    /// Advance one frame
    pub fn update(&mut self, dt: f32, canvas_width: f32) {
        self.anim.time += dt;

        let dir = self.input.sign();
        if dir != 0.0 {
            self.target_x += dir * PLAYER_KEY_SPEED * dt;
        }
        self.anim.moving = self.input != Direction::None;
        self.anim.direction = dir;

        self.target_x = self.clamp_x(self.target_x, canvas_width);
        self.pos.x += (self.target_x - self.pos.x) * smoothing_alpha(self.smoothing, dt);

        if self.anim.moving {
            let target_tilt = self.anim.direction * PLAYER_MAX_TILT;
            self.anim.tilt +=
                (target_tilt - self.anim.tilt) * smoothing_alpha(PLAYER_TILT_RESPONSE, dt);
            self.anim.bounce =
                (self.anim.time * PLAYER_BOUNCE_FREQ).sin() * PLAYER_BOUNCE_AMPLITUDE;
        } else {
            self.anim.tilt *= decay_factor(PLAYER_TILT_DECAY, dt);
            self.anim.bounce = 0.0;
        }

        self.anim.blink = if (self.anim.time * 0.5).sin() > 0.95 {
            1.0
        } else {
            0.0
        };

        if self.anim.shake > 0.0 {
            self.anim.shake *= decay_factor(PLAYER_SHAKE_DECAY, dt);
            if self.anim.shake < 0.1 {
                self.anim.shake = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CANVAS: Vec2 = Vec2::new(500.0, 800.0);

    #[test]
    fn test_spawn_position() {
        let p = Player::spawn(CANVAS);
        assert_eq!(p.pos, Vec2::new(250.0, 700.0));
        assert_eq!(p.target_x, 250.0);
    }

    #[test]
    fn test_eases_toward_target() {
        let mut p = Player::spawn(CANVAS);
        p.set_target_x(400.0, CANVAS.x);
        p.update(1.0 / 60.0, CANVAS.x);
        // One reference frame closes 15% of the gap
        assert!((p.pos.x - (250.0 + 150.0 * 0.15)).abs() < 0.01);

        for _ in 0..600 {
            p.update(1.0 / 60.0, CANVAS.x);
        }
        assert!((p.pos.x - 400.0).abs() < 0.01);
    }

    #[test]
    fn test_large_dt_does_not_overshoot() {
        let mut p = Player::spawn(CANVAS);
        p.set_target_x(480.0, CANVAS.x);
        p.update(2.0, CANVAS.x);
        assert!(p.pos.x <= 480.0);
        assert!(p.pos.x > 470.0);
    }

    #[test]
    fn test_directional_input_moves_target() {
        let mut p = Player::spawn(CANVAS);
        p.apply_directional_input(Direction::Left);
        p.update(0.5, CANVAS.x);
        assert!((p.target_x - 100.0).abs() < 0.01);
        assert!(p.anim.moving);
        assert_eq!(p.anim.direction, -1.0);
        assert!(p.anim.tilt < 0.0);

        p.apply_directional_input(Direction::None);
        p.update(0.1, CANVAS.x);
        assert!(!p.anim.moving);
        assert_eq!(p.anim.bounce, 0.0);
    }

    #[test]
    fn test_target_clamped_at_edges() {
        let mut p = Player::spawn(CANVAS);
        p.set_target_x(-100.0, CANVAS.x);
        assert_eq!(p.target_x, 20.0);
        p.nudge_target(10_000.0, CANVAS.x);
        assert_eq!(p.target_x, 480.0);
    }

    #[test]
    fn test_narrow_canvas_shrinks_target_on_update() {
        let mut p = Player::spawn(CANVAS);
        p.set_target_x(480.0, CANVAS.x);
        p.update(0.016, 300.0);
        assert_eq!(p.target_x, 280.0);
    }

    #[test]
    fn test_shake_decays_to_zero() {
        let mut p = Player::spawn(CANVAS);
        p.shake(5.0);
        for _ in 0..120 {
            p.update(1.0 / 60.0, CANVAS.x);
        }
        assert_eq!(p.anim.shake, 0.0);
    }

    #[test]
    fn test_both_keys_hold_target() {
        let mut p = Player::spawn(CANVAS);
        p.apply_directional_input(Direction::from_keys(true, true));
        for _ in 0..30 {
            p.update(1.0 / 60.0, CANVAS.x);
        }
        assert_eq!(p.target_x, 250.0);
        assert_eq!(p.pos.x, 250.0);
        assert!(p.anim.moving);
        assert_eq!(p.anim.direction, 0.0);
    }

    #[test]
    fn test_direction_from_keys() {
        assert_eq!(Direction::from_keys(true, false), Direction::Left);
        assert_eq!(Direction::from_keys(false, true), Direction::Right);
        assert_eq!(Direction::from_keys(true, true), Direction::Both);
        assert_eq!(Direction::from_keys(false, false), Direction::None);
    }

    proptest! {
        #[test]
        fn prop_target_always_within_bounds(
            start in -1000.0f32..1000.0,
            width in 60.0f32..1200.0,
            dir in 0u8..3,
            dt in 0.0f32..0.2,
        ) {
            let mut p = Player::spawn(Vec2::new(width, 800.0));
            p.target_x = start;
            p.apply_directional_input(match dir {
                0 => Direction::Left,
                1 => Direction::Right,
                _ => Direction::None,
            });
            p.update(dt, width);
            prop_assert!(p.target_x >= p.half_width());
            prop_assert!(p.target_x <= width - p.half_width());
        }
    }
}
