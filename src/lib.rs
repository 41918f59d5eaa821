//! Snowfall Dodge - avoid falling obstacles, collect coins and power-ups
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player, spawning, physics, scoring)
//! - `session`: Per-frame orchestration with injected collaborators
//! - `renderer`: 2D canvas drawing (read-only over simulation state)
//! - `platform`: Viewport sizing and input translation
//! - `persistence`: LocalStorage access, tolerant parsing, debounced writes

pub mod achievements;
pub mod audio;
pub mod highscores;
pub mod hud;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod services;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::Leaderboard;
pub use session::Session;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Largest frame delta the loop will simulate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Frame rate the per-frame smoothing factors were tuned at
    pub const REFERENCE_FPS: f32 = 60.0;

    /// Desktop canvas caps (mobile goes full screen)
    pub const CANVAS_MAX_WIDTH: f32 = 500.0;
    pub const CANVAS_MAX_HEIGHT: f32 = 800.0;

    /// Player box and placement
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 50.0;
    /// Distance of the player center from the canvas bottom
    pub const PLAYER_BOTTOM_OFFSET: f32 = 100.0;
    /// Fraction of the remaining distance covered per reference frame
    pub const PLAYER_SMOOTHING: f32 = 0.15;
    pub const PLAYER_BOOSTED_SMOOTHING: f32 = 0.25;
    /// Directional key speed applied to the target (pixels/s)
    pub const PLAYER_KEY_SPEED: f32 = 300.0;
    pub const PLAYER_MAX_TILT: f32 = 0.15;
    pub const PLAYER_TILT_RESPONSE: f32 = 0.3;
    pub const PLAYER_TILT_DECAY: f32 = 0.9;
    pub const PLAYER_BOUNCE_FREQ: f32 = 8.0;
    pub const PLAYER_BOUNCE_AMPLITUDE: f32 = 2.0;
    pub const PLAYER_SHAKE_DECAY: f32 = 0.9;
    pub const PLAYER_HIT_SHAKE: f32 = 5.0;

    /// Shared fall speed for obstacles and collectibles (pixels/s)
    pub const BASE_FALL_SPEED: f32 = 90.0;
    pub const FALL_SPEED_PER_LEVEL: f32 = 12.0;
    pub const MAX_FALL_SPEED: f32 = 258.0;

    /// Level progression
    pub const MAX_LEVEL: u32 = 15;
    pub const POINTS_PER_LEVEL: u64 = 500;

    /// Spawn cadence (milliseconds) and spacing (pixels)
    pub const OBSTACLE_INTERVAL_MS: f32 = 2500.0;
    pub const OBSTACLE_INTERVAL_STEP_MS: f32 = 100.0;
    pub const OBSTACLE_INTERVAL_MIN_MS: f32 = 1100.0;
    pub const COLLECTIBLE_INTERVAL_MS: f32 = 1800.0;
    pub const COLLECTIBLE_INTERVAL_STEP_MS: f32 = 90.0;
    pub const COLLECTIBLE_INTERVAL_MIN_MS: f32 = 500.0;
    pub const OBSTACLE_MIN_GAP: f32 = 100.0;
    pub const OBSTACLE_GAP_STEP: f32 = 5.0;
    pub const OBSTACLE_GAP_MIN: f32 = 30.0;
    pub const OBSTACLE_SPAWN_RETRIES: u32 = 5;

    /// Simultaneous obstacle cap
    pub const OBSTACLE_CAP_BASE: usize = 3;
    pub const OBSTACLE_CAP_MAX: usize = 6;
    /// How far below the canvas an obstacle must fall to count as passed
    pub const OBSTACLE_PASS_MARGIN: f32 = 50.0;
    /// Angular damping (per second)
    pub const OBSTACLE_ROTATION_DAMPING: f32 = 0.1;

    /// Pass scoring: base + combo * weight + level * weight
    pub const PASS_BASE_POINTS: u64 = 10;
    pub const PASS_COMBO_WEIGHT: u64 = 3;
    pub const PASS_LEVEL_WEIGHT: u64 = 2;

    /// Combo decay
    pub const COMBO_GRACE_SECS: f32 = 3.0;
    pub const COMBO_DECAY_PER_SEC: f32 = 3.0;

    /// Collectible spawn odds (remainder is coins)
    pub const STAR_CHANCE: f32 = 0.11;
    pub const POWER_UP_CHANCE: f32 = 0.12;
    pub const COLLECT_RADIUS: f32 = 25.0;
    pub const MAGNET_RADIUS: f32 = 150.0;
    /// Peak magnet pull at zero distance (pixels/s)
    pub const MAGNET_PULL_SPEED: f32 = 480.0;
    pub const COLLECTIBLE_DESPAWN_MARGIN: f32 = 50.0;
    pub const COIN_POINTS: f32 = 50.0;
    pub const STAR_POINTS: f32 = 200.0;

    /// Power-up duration when picked up (milliseconds)
    pub const POWER_UP_DURATION_MS: f64 = 10_000.0;

    /// Persistence debounce window (milliseconds)
    pub const SAVE_DEBOUNCE_MS: f64 = 500.0;
}

/// Linear interpolation
#[inline]
pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start + (end - start) * t
}

/// Convert a per-reference-frame smoothing factor into one for `dt` seconds.
///
/// `factor` is the fraction of the remaining distance closed in one frame at
/// [`consts::REFERENCE_FPS`]. The result closes the same fraction per unit of
/// time at any frame rate, and never overshoots for large `dt`.
#[inline]
pub fn smoothing_alpha(factor: f32, dt: f32) -> f32 {
    let frames = (dt * consts::REFERENCE_FPS).max(0.0);
    1.0 - (1.0 - factor.clamp(0.0, 1.0)).powf(frames)
}

/// Convert a per-reference-frame multiplicative decay into one for `dt` seconds
#[inline]
pub fn decay_factor(per_frame: f32, dt: f32) -> f32 {
    per_frame.powf((dt * consts::REFERENCE_FPS).max(0.0))
}
