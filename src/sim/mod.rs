//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Seeded RNG only
//! - One simulation clock, advanced only while playing
//! - No rendering or platform dependencies

pub mod collectibles;
pub mod collision;
pub mod obstacles;
pub mod particles;
pub mod player;
pub mod powerups;
pub mod scoring;
pub mod state;
pub mod tick;

pub use collectibles::{Collectible, CollectibleField, CollectibleKind};
pub use collision::{Rect, aabb_overlap, within_radius};
pub use obstacles::{Obstacle, ObstacleField, ObstacleKind};
pub use particles::{Particle, ParticleSystem, TapMarker};
pub use player::{Direction, Player, PlayerAnim};
pub use powerups::{EffectSet, PowerUpKind, PowerUpRegistry};
pub use scoring::{GameStats, LevelContext, level_for_score};
pub use state::{GameEvent, GamePhase, GameState, RunSummary};
pub use tick::{TickInput, tick};
