//! Game state and core simulation types
//!
//! Everything the tick mutates lives in [`GameState`]. Renderers and the
//! HUD only read it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collectibles::{CollectibleField, CollectibleKind};
use super::obstacles::ObstacleField;
use super::particles::ParticleSystem;
use super::player::Player;
use super::powerups::{EffectSet, PowerUpKind, PowerUpRegistry};
use super::scoring::{GameStats, LevelContext};
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Welcome screen, nothing moves
    Menu,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended
    GameOver,
}

/// Final stats handed to collaborators when a run ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub duration_secs: f32,
    pub coins: u32,
    pub stars: u32,
    pub max_combo: u32,
    pub level: u32,
    pub max_speed: f32,
    pub perfect_run_secs: f32,
}

impl RunSummary {
    pub fn from_stats(stats: &GameStats) -> Self {
        Self {
            score: stats.score,
            duration_secs: stats.game_time,
            coins: stats.coins,
            stars: stats.stars,
            max_combo: stats.max_combo,
            level: stats.level,
            max_speed: stats.max_speed,
            perfect_run_secs: stats.perfect_run_time,
        }
    }
}

/// Things that happened during a tick, drained by the session
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    RunStarted,
    ObstaclePassed { id: u32, points: u64 },
    Collected { kind: CollectibleKind, pos: Vec2, points: u64 },
    PowerUpActivated(PowerUpKind),
    ShieldConsumed,
    LevelUp(u32),
    ComboChanged(u32),
    TapMoved(Vec2),
    Paused,
    Resumed,
    GameOver(RunSummary),
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    /// Simulation clock (ms). Advances only while playing.
    pub clock_ms: f64,
    /// Canvas size in pixels
    pub canvas: Vec2,
    pub phase: GamePhase,
    pub player: Player,
    pub obstacles: ObstacleField,
    pub collectibles: CollectibleField,
    pub powerups: PowerUpRegistry,
    /// Effects as of the last tick (for rendering)
    pub effects: EffectSet,
    /// Visual particles (not gameplay-affecting)
    pub particles: ParticleSystem,
    pub stats: GameStats,
    pub level: LevelContext,
    events: Vec<GameEvent>,
    player_placed: bool,
}

impl GameState {
    /// Create a new game state in the menu
    pub fn new(seed: u64, canvas: Vec2) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            clock_ms: 0.0,
            canvas,
            phase: GamePhase::Menu,
            player: Player::default(),
            obstacles: ObstacleField::new(),
            collectibles: CollectibleField::new(),
            powerups: PowerUpRegistry::new(),
            effects: EffectSet::default(),
            particles: ParticleSystem::new(),
            stats: GameStats::new(),
            level: LevelContext::default(),
            events: Vec::new(),
            player_placed: false,
        };
        state.set_canvas(canvas);
        state
    }

    /// Resize the playfield. The player is only placed on the first call
    /// with a usable size; later resizes keep it where it is.
    pub fn set_canvas(&mut self, canvas: Vec2) {
        self.canvas = canvas;
        if !self.player_placed && canvas.x > 0.0 && canvas.y > 0.0 {
            self.player.place(canvas);
            self.player_placed = true;
        }
    }

    /// Reset everything run-scoped and enter `Playing`
    pub fn start_run(&mut self) {
        self.player = Player::spawn(self.canvas);
        self.player_placed = true;
        self.obstacles.clear();
        self.collectibles.clear();
        self.powerups.clear();
        self.particles.clear();
        self.effects = EffectSet::default();
        self.stats = GameStats::new();
        self.level = LevelContext::default();
        self.clock_ms = 0.0;
        self.phase = GamePhase::Playing;
        self.push_event(GameEvent::RunStarted);
    }

    /// Screen center, used for level-up bursts
    pub fn center(&self) -> Vec2 {
        self.canvas / 2.0
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Canvas sized to the desktop cap
    pub fn default_canvas() -> Vec2 {
        Vec2::new(CANVAS_MAX_WIDTH, CANVAS_MAX_HEIGHT)
    }
}
