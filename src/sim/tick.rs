//! Per-frame simulation tick
//!
//! Update order while playing: clock and level, power-ups, player,
//! obstacles, collectibles, particles, collisions, combo. Every other phase
//! freezes the simulation.

use glam::Vec2;

use super::collectibles::CollectibleKind;
use super::particles::colors;
use super::player::Direction;
use super::powerups::PowerUpKind;
use super::scoring::{CollisionOutcome, LevelContext, resolve_collisions};
use super::state::{GameEvent, GamePhase, GameState, RunSummary};
use crate::consts::*;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Left direction held (arrow/A or on-screen button)
    pub left: bool,
    /// Right direction held
    pub right: bool,
    /// Tap/click position in canvas pixels
    pub tap: Option<Vec2>,
    /// Accumulated drag distance in canvas pixels
    pub drag_delta: f32,
    /// Pause toggle
    pub pause: bool,
    /// Start a run from the menu, or restart after game over
    pub start: bool,
}

/// Burst sizes
const COIN_BURST: usize = 10;
const STAR_BURST: usize = 15;
const POWER_UP_BURST: usize = 20;
const SHIELD_BURST: usize = 20;
const LEVEL_UP_BURST: usize = 30;
const GAME_OVER_BURST: usize = 30;
const TAP_BURST: usize = 8;

/// Advance the game by one frame of `dt` seconds (clamped to [`MAX_FRAME_DT`])
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.start && matches!(state.phase, GamePhase::Menu | GamePhase::GameOver) {
        state.start_run();
        log::info!("Run started");
    }

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                state.push_event(GameEvent::Paused);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                state.push_event(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    if state.phase != GamePhase::Playing {
        return;
    }

    let dt = dt.clamp(0.0, MAX_FRAME_DT);
    if dt == 0.0 {
        return;
    }

    advance_clock(state, dt);
    update_powerups(state);
    update_player(state, input, dt);
    update_obstacles(state, dt);
    update_collectibles(state, dt);
    state.particles.update(dt);

    if check_collisions(state) {
        return;
    }
    update_combo(state, dt);
}

fn advance_clock(state: &mut GameState, dt: f32) {
    state.clock_ms += dt as f64 * 1000.0;
    state.stats.game_time += dt;
    state.stats.perfect_run_time += dt;

    if let Some(level) = state.stats.refresh_level() {
        state.level = LevelContext::for_level(level);
        let center = state.center();
        burst(state, center, LEVEL_UP_BURST, colors::GOLD);
        state.push_event(GameEvent::LevelUp(level));
        log::info!("Level up: {}", level);
    }
}

fn update_powerups(state: &mut GameState) {
    state.powerups.update(state.clock_ms);
    state.effects = state.powerups.effects(state.clock_ms);
    state.player.smoothing = if state.effects.speed_multiplier > 1.0 {
        PLAYER_BOOSTED_SMOOTHING
    } else {
        PLAYER_SMOOTHING
    };
}

fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let width = state.canvas.x;

    if let Some(tap) = input.tap {
        state.player.set_target_x(tap.x, width);
        let marker = Vec2::new(state.player.target_x, tap.y);
        state.particles.mark_tap(marker);
        burst(state, marker, TAP_BURST, colors::TAP_GREEN);
        state.push_event(GameEvent::TapMoved(marker));
    }
    if input.drag_delta != 0.0 {
        state.player.nudge_target(input.drag_delta, width);
    }

    state
        .player
        .apply_directional_input(Direction::from_keys(input.left, input.right));
    state.player.update(dt, width);
}

fn update_obstacles(state: &mut GameState, dt: f32) {
    let now = state.stats.game_time;
    let width = state.canvas.x;
    let level = state.level;
    state
        .obstacles
        .try_spawn(&level, dt * 1000.0, width, now, &mut state.rng);

    let update = state.obstacles.update(
        dt,
        state.effects.time_scale,
        state.canvas.y,
        &level,
    );
    for obstacle in update.passed {
        let points = state.stats.record_pass(state.effects.score_multiplier);
        state.push_event(GameEvent::ObstaclePassed {
            id: obstacle.id,
            points,
        });
    }
}

fn update_collectibles(state: &mut GameState, dt: f32) {
    let width = state.canvas.x;
    let level = state.level;
    state
        .collectibles
        .try_spawn(&level, dt * 1000.0, width, &mut state.rng);

    let update = state.collectibles.update(
        dt,
        state.player.pos,
        state.effects.magnet,
        state.level.base_speed,
        state.effects.time_scale,
        state.canvas.y,
    );

    let multiplier = state.effects.score_multiplier;
    for item in update.collected {
        let points = match item.kind {
            CollectibleKind::Coin => {
                state.stats.coins += 1;
                burst(state, item.pos, COIN_BURST, colors::GOLD);
                state.stats.record_bonus(COIN_POINTS, multiplier)
            }
            CollectibleKind::Star => {
                state.stats.stars += 1;
                burst(state, item.pos, STAR_BURST, colors::GOLD);
                state.stats.record_bonus(STAR_POINTS, multiplier)
            }
            CollectibleKind::PowerUp(kind) => {
                activate_powerup(state, kind);
                burst(state, item.pos, POWER_UP_BURST, colors::PURPLE);
                0
            }
        };
        state.push_event(GameEvent::Collected {
            kind: item.kind,
            pos: item.pos,
            points,
        });
    }
}

fn activate_powerup(state: &mut GameState, kind: PowerUpKind) {
    state
        .powerups
        .activate(kind, POWER_UP_DURATION_MS, state.clock_ms);
    if kind == PowerUpKind::SpeedBoost {
        state.player.smoothing = PLAYER_BOOSTED_SMOOTHING;
    }
    state.effects = state.powerups.effects(state.clock_ms);
    state.push_event(GameEvent::PowerUpActivated(kind));
}

/// Returns true when the run ended
fn check_collisions(state: &mut GameState) -> bool {
    let effects = state.powerups.effects(state.clock_ms);
    let outcome = resolve_collisions(
        &state.player.bounds(),
        state.obstacles.all(),
        &mut state.powerups,
        &effects,
    );
    state.effects = state.powerups.effects(state.clock_ms);

    match outcome {
        CollisionOutcome::Clear => false,
        CollisionOutcome::Shielded(id) => {
            state.obstacles.remove(id);
            state.player.shake(PLAYER_HIT_SHAKE);
            state.stats.perfect_run_time = 0.0;
            let pos = state.player.pos;
            burst(state, pos, SHIELD_BURST, colors::SHIELD_BLUE);
            state.push_event(GameEvent::ShieldConsumed);
            false
        }
        CollisionOutcome::Fatal(_) => {
            game_over(state);
            true
        }
    }
}

fn update_combo(state: &mut GameState, dt: f32) {
    if state.stats.decay_combo(dt) {
        state.push_event(GameEvent::ComboChanged(state.stats.combo));
    }
    state
        .stats
        .accrue_combo_bonus(dt, state.effects.score_multiplier);
}

/// End the run: freeze, record final stats, emit the summary
pub fn game_over(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    state.stats.finish();
    let pos = state.player.pos;
    burst(state, pos, GAME_OVER_BURST, colors::CRASH_RED);

    let summary = RunSummary::from_stats(&state.stats);
    log::info!(
        "Game over: score {} in {:.1}s (level {}, max combo {})",
        summary.score,
        summary.duration_secs,
        summary.level,
        summary.max_combo
    );
    state.push_event(GameEvent::GameOver(summary));
}

fn burst(state: &mut GameState, origin: Vec2, count: usize, color: u32) {
    state
        .particles
        .burst(&mut state.rng, origin, count, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacles::{Obstacle, ObstacleKind};

    const DT: f32 = 1.0 / 60.0;

    fn playing_state() -> GameState {
        let mut state = GameState::new(12345, GameState::default_canvas());
        tick(
            &mut state,
            &TickInput {
                start: true,
                ..Default::default()
            },
            0.0,
        );
        state.drain_events();
        state
    }

    /// Obstacle sitting on top of the player
    fn obstacle_on_player(state: &GameState, id: u32) -> Obstacle {
        let p = state.player.pos;
        Obstacle::new(id, ObstacleKind::Rock, Vec2::new(p.x - 15.0, p.y - 15.0), 0.0, 0.0)
    }

    #[test]
    fn test_menu_to_playing() {
        let mut state = GameState::new(1, GameState::default_canvas());
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::Menu);
        assert_eq!(state.stats.game_time, 0.0);

        tick(
            &mut state,
            &TickInput {
                start: true,
                ..Default::default()
            },
            DT,
        );
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.stats.game_time > 0.0);
    }

    #[test]
    fn test_tick_pause() {
        let mut state = playing_state();
        tick(&mut state, &TickInput::default(), DT);

        let input = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        assert_eq!(state.phase, GamePhase::Paused);

        let frozen_time = state.stats.game_time;
        let frozen_clock = state.clock_ms;
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert_eq!(state.stats.game_time, frozen_time);
        assert_eq!(state.clock_ms, frozen_clock);

        tick(&mut state, &input, DT);
        assert_eq!(state.phase, GamePhase::Playing);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Paused));
        assert!(events.contains(&GameEvent::Resumed));
    }

    #[test]
    fn test_pause_freezes_powerup_countdown() {
        let mut state = playing_state();
        state
            .powerups
            .activate(PowerUpKind::Magnet, 1000.0, state.clock_ms);

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, DT);
        // Ten seconds of paused frames
        for _ in 0..100 {
            tick(&mut state, &TickInput::default(), 0.1);
        }
        tick(&mut state, &pause, DT);
        assert!(state.powerups.is_active(PowerUpKind::Magnet, state.clock_ms));
    }

    #[test]
    fn test_shield_absorbs_collision() {
        let mut state = playing_state();
        state
            .powerups
            .activate(PowerUpKind::Shield, POWER_UP_DURATION_MS, state.clock_ms);
        let obstacle = obstacle_on_player(&state, 900);
        state.obstacles.insert(obstacle);

        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!state.powerups.is_active(PowerUpKind::Shield, state.clock_ms));
        assert!(state.player.anim.shake > 0.0);
        assert!(state.drain_events().contains(&GameEvent::ShieldConsumed));
    }

    #[test]
    fn test_shield_saves_the_run() {
        let mut state = playing_state();
        state
            .powerups
            .activate(PowerUpKind::Shield, POWER_UP_DURATION_MS, state.clock_ms);
        // Falling tree just touching the top of the player box
        let (w, h) = ObstacleKind::Tree.size();
        let top = state.player.bounds().y;
        let pos = Vec2::new(state.player.pos.x - w / 2.0, top - h + 1.0);
        state
            .obstacles
            .insert(Obstacle::new(902, ObstacleKind::Tree, pos, 90.0, 0.0));

        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), DT);
        }

        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.obstacles.all().iter().all(|o| o.id != 902));
        let events = state.drain_events();
        assert_eq!(
            events.iter().filter(|e| **e == GameEvent::ShieldConsumed).count(),
            1
        );
    }

    #[test]
    fn test_collision_without_shield_ends_run() {
        let mut state = playing_state();
        state.stats.combo = 6;
        state.stats.last_pass_time = Some(0.0);
        let obstacle = obstacle_on_player(&state, 901);
        state.obstacles.insert(obstacle);

        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.stats.combo, 0);
        let events = state.drain_events();
        assert!(matches!(events.last(), Some(GameEvent::GameOver(_))));

        // Frozen afterwards
        let time = state.stats.game_time;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.stats.game_time, time);
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut state = playing_state();
        state.stats.score = 700;
        game_over(&mut state);
        tick(
            &mut state,
            &TickInput {
                start: true,
                ..Default::default()
            },
            DT,
        );
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.stats.score < 700);
        assert_eq!(state.stats.level, 1);
    }

    #[test]
    fn test_level_up_at_500() {
        let mut state = playing_state();
        state.stats.score = 500;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.stats.level, 2);
        assert_eq!(state.level.obstacle_interval_ms, 2400.0);
        assert_eq!(state.level.min_gap, 95.0);
        assert!(state.drain_events().contains(&GameEvent::LevelUp(2)));
        assert!(!state.particles.is_empty());
    }

    #[test]
    fn test_obstacle_pass_scores() {
        let mut state = playing_state();
        state.stats.score = 1000;
        state.stats.combo = 3;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.stats.level, 3);

        let mut obstacle = Obstacle::new(950, ObstacleKind::Tree, Vec2::new(0.0, 900.0), 90.0, 0.0);
        obstacle.rotation_accel = 0.0;
        state.obstacles.insert(obstacle);
        let before = state.stats.score;
        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.stats.combo, 4);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::ObstaclePassed { id: 950, points: 28 }));
        // Pass points plus the floored continuous bonus (zero at this dt)
        assert_eq!(state.stats.score, before + 28);
    }

    #[test]
    fn test_coin_collection_scores_and_counts() {
        let mut state = playing_state();
        let pos = state.player.pos;
        state.collectibles.create(CollectibleKind::Coin, pos, 0.0);
        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.stats.coins, 1);
        assert_eq!(state.stats.score, 50);
        assert!(state.drain_events().iter().any(|e| matches!(
            e,
            GameEvent::Collected {
                kind: CollectibleKind::Coin,
                points: 50,
                ..
            }
        )));
    }

    #[test]
    fn test_powerup_pickup_activates() {
        let mut state = playing_state();
        let pos = state.player.pos;
        state
            .collectibles
            .create(CollectibleKind::PowerUp(PowerUpKind::SpeedBoost), pos, 0.0);
        tick(&mut state, &TickInput::default(), DT);

        assert!(state.powerups.is_active(PowerUpKind::SpeedBoost, state.clock_ms));
        assert_eq!(state.player.smoothing, PLAYER_BOOSTED_SMOOTHING);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::PowerUpActivated(PowerUpKind::SpeedBoost))
        );

        // Lapses after ten seconds of play
        for _ in 0..101 {
            tick(&mut state, &TickInput::default(), 0.1);
            if state.phase != GamePhase::Playing {
                return;
            }
        }
        assert_eq!(state.player.smoothing, PLAYER_SMOOTHING);
    }

    #[test]
    fn test_score_multiplier_doubles_coin() {
        let mut state = playing_state();
        state
            .powerups
            .activate(PowerUpKind::ScoreMultiplier, POWER_UP_DURATION_MS, 0.0);
        let pos = state.player.pos;
        state.collectibles.create(CollectibleKind::Star, pos, 0.0);
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.stats.score, 400);
        assert_eq!(state.stats.stars, 1);
    }

    #[test]
    fn test_tap_moves_target_and_marks() {
        let mut state = playing_state();
        let input = TickInput {
            tap: Some(Vec2::new(-50.0, 300.0)),
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        assert_eq!(state.player.target_x, 20.0);
        assert_eq!(
            state.particles.marker().map(|m| m.pos),
            Some(Vec2::new(20.0, 300.0))
        );
    }

    #[test]
    fn test_large_dt_is_clamped() {
        let mut state = playing_state();
        tick(&mut state, &TickInput::default(), 5.0);
        assert!((state.stats.game_time - MAX_FRAME_DT).abs() < 1e-6);
    }

    #[test]
    fn test_combo_changes_emit_events() {
        let mut state = playing_state();
        state.stats.combo = 2;
        state.stats.last_pass_time = Some(0.0);
        state.stats.game_time = 10.0;
        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), 0.1);
            if state.phase != GamePhase::Playing {
                return;
            }
        }
        assert_eq!(state.stats.combo, 0);
        let changes = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::ComboChanged(_)))
            .count();
        assert_eq!(changes, 2);
    }

    #[test]
    fn test_determinism() {
        let mut a = playing_state();
        let mut b = playing_state();
        let inputs = [
            TickInput {
                left: true,
                ..Default::default()
            },
            TickInput {
                tap: Some(Vec2::new(300.0, 500.0)),
                ..Default::default()
            },
            TickInput::default(),
        ];
        for i in 0..600 {
            let input = &inputs[i % inputs.len()];
            tick(&mut a, input, DT);
            tick(&mut b, input, DT);
        }
        assert_eq!(a.stats, b.stats);
        assert_eq!(a.obstacles.len(), b.obstacles.len());
        assert_eq!(a.collectibles.len(), b.collectibles.len());
        assert!((a.player.pos.x - b.player.pos.x).abs() < 1e-4);
    }
}
