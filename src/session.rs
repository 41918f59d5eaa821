//! Frame orchestration around the simulation
//!
//! The session owns the game state and everything that reacts to what the
//! simulation reports: lifetime totals, sound cues, and the end-of-run
//! hand-off to achievements and the leaderboard.

use glam::Vec2;

use crate::achievements::Achievement;
use crate::audio::SoundEffect;
use crate::persistence::{SharedStorage, Wallet};
use crate::services::{FinalStats, Services};
use crate::settings::Settings;
use crate::sim::{CollectibleKind, GameEvent, GamePhase, GameState, RunSummary, TickInput, tick};

/// Volume for each cue
const COIN_VOLUME: f32 = 0.8;
const STAR_VOLUME: f32 = 1.0;
const TAP_VOLUME: f32 = 0.3;
const FULL_VOLUME: f32 = 1.0;

/// Outcome of the last finished run
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub summary: RunSummary,
    /// Leaderboard rank (1-based) if the run made the board
    pub rank: Option<usize>,
    pub unlocked: Vec<Achievement>,
}

pub struct Session {
    pub state: GameState,
    services: Services,
    wallet: Wallet,
    particles_enabled: bool,
    shake_enabled: bool,
    last_result: Option<RunResult>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.state.phase)
            .field("services", &self.services)
            .field("wallet", &self.wallet)
            .finish()
    }
}

impl Session {
    pub fn new(seed: u64, canvas: Vec2, storage: SharedStorage, services: Services) -> Self {
        Self {
            state: GameState::new(seed, canvas),
            services,
            wallet: Wallet::load(storage),
            particles_enabled: true,
            shake_enabled: true,
            last_result: None,
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.particles_enabled = settings.effective_particles();
        self.shake_enabled = settings.effective_screen_shake();
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn last_result(&self) -> Option<&RunResult> {
        self.last_result.as_ref()
    }

    /// Take the achievements unlocked by the last run (for notifications)
    pub fn take_unlocked(&mut self) -> Vec<Achievement> {
        self.last_result
            .as_mut()
            .map(|r| std::mem::take(&mut r.unlocked))
            .unwrap_or_default()
    }

    pub fn resize(&mut self, canvas: Vec2) {
        self.state.set_canvas(canvas);
    }

    /// Run one frame. `now_ms` is wall-clock time, used for write debouncing
    /// and leaderboard timestamps only.
    pub fn frame(&mut self, input: &TickInput, dt: f32, now_ms: f64) -> Vec<GameEvent> {
        tick(&mut self.state, input, dt);

        if !self.particles_enabled {
            self.state.particles.clear();
        }
        if !self.shake_enabled {
            self.state.player.anim.shake = 0.0;
        }

        let events = self.state.drain_events();
        for event in &events {
            self.handle_event(event, now_ms);
        }

        self.wallet.poll(now_ms);
        events
    }

    fn handle_event(&mut self, event: &GameEvent, now_ms: f64) {
        match event {
            GameEvent::RunStarted => {
                self.last_result = None;
            }
            GameEvent::Collected { kind, .. } => match kind {
                CollectibleKind::Coin => {
                    self.wallet.add_coins(1, now_ms);
                    self.services.play(SoundEffect::Collect, COIN_VOLUME);
                }
                CollectibleKind::Star => {
                    self.wallet.add_stars(1, now_ms);
                    self.services.play(SoundEffect::Collect, STAR_VOLUME);
                }
                CollectibleKind::PowerUp(_) => {}
            },
            GameEvent::PowerUpActivated(_) => {
                self.services.play(SoundEffect::PowerUp, FULL_VOLUME);
            }
            GameEvent::ShieldConsumed => {
                self.services.play(SoundEffect::Shield, FULL_VOLUME);
            }
            GameEvent::LevelUp(_) => {
                self.services.play(SoundEffect::LevelUp, FULL_VOLUME);
            }
            GameEvent::TapMoved(_) => {
                self.services.play(SoundEffect::Collect, TAP_VOLUME);
            }
            GameEvent::GameOver(summary) => self.finish_run(*summary, now_ms),
            GameEvent::ObstaclePassed { .. }
            | GameEvent::ComboChanged(_)
            | GameEvent::Paused
            | GameEvent::Resumed => {}
        }
    }

    fn finish_run(&mut self, summary: RunSummary, now_ms: f64) {
        self.services.play(SoundEffect::Collision, FULL_VOLUME);
        self.wallet.flush();

        let stats = FinalStats {
            run: summary,
            lifetime_coins: self.wallet.coins(),
        };
        let unlocked = match self.services.achievements.as_mut() {
            Some(sink) => sink.check(&stats),
            None => Vec::new(),
        };
        for achievement in &unlocked {
            log::info!("Unlocked {} {}", achievement.icon(), achievement.name());
            self.services.play(SoundEffect::LevelUp, FULL_VOLUME);
        }

        let rank = self.services.leaderboard.as_mut().and_then(|board| {
            board.record_run(summary.duration_secs);
            board.add_entry(summary.score, summary.duration_secs, summary.coins, now_ms)
        });
        if let Some(rank) = rank {
            log::info!("New high score at rank {}", rank);
        }

        self.last_result = Some(RunResult {
            summary,
            rank,
            unlocked,
        });
    }

    /// Flush anything pending (page hide / unload)
    pub fn teardown(&mut self) {
        self.wallet.flush();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::achievements::AchievementTracker;
    use crate::highscores::Leaderboard;
    use crate::persistence::{MemoryStorage, Storage};
    use crate::services::SoundSink;
    use crate::sim::{Obstacle, ObstacleKind, PowerUpKind};

    const DT: f32 = 1.0 / 60.0;

    #[derive(Clone, Default)]
    struct RecordingSound(Rc<RefCell<Vec<(SoundEffect, f32)>>>);

    impl SoundSink for RecordingSound {
        fn play(&mut self, effect: SoundEffect, volume: f32) {
            self.0.borrow_mut().push((effect, volume));
        }
    }

    fn start() -> TickInput {
        TickInput {
            start: true,
            ..Default::default()
        }
    }

    fn session_with(mem: &MemoryStorage, services: Services) -> Session {
        let storage: SharedStorage = Rc::new(mem.clone());
        Session::new(9, GameState::default_canvas(), storage, services)
    }

    fn crash(session: &mut Session) {
        let pos = session.state.player.pos;
        let obstacle = Obstacle::new(99, ObstacleKind::Rock, pos - Vec2::splat(10.0), 0.0, 0.0);
        session.state.obstacles.insert(obstacle);
    }

    #[test]
    fn test_runs_without_collaborators() {
        let mem = MemoryStorage::new();
        let mut session = session_with(&mem, Services::none());
        session.frame(&start(), DT, 0.0);
        assert_eq!(session.phase(), GamePhase::Playing);

        crash(&mut session);
        let events = session.frame(&TickInput::default(), DT, 16.0);
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameOver(_))));
        assert_eq!(session.phase(), GamePhase::GameOver);
        assert_eq!(session.last_result().map(|r| r.rank), Some(None));
    }

    #[test]
    fn test_coin_pickup_updates_wallet_and_plays_cue() {
        let mem = MemoryStorage::new();
        let sound = RecordingSound::default();
        let mut session = session_with(&mem, Services::none().with_sound(sound.clone()));
        session.frame(&start(), DT, 0.0);

        let pos = session.state.player.pos;
        session.state.collectibles.create(CollectibleKind::Coin, pos, 0.0);
        session.frame(&TickInput::default(), DT, 100.0);

        assert_eq!(session.wallet().coins(), 1);
        assert!(session.wallet().is_dirty());
        assert_eq!(sound.0.borrow().as_slice(), &[(SoundEffect::Collect, COIN_VOLUME)]);

        // Debounced write lands once the window passes
        session.frame(&TickInput::default(), DT, 700.0);
        assert_eq!(mem.get("snowfall_total_coins").as_deref(), Some("1"));
    }

    #[test]
    fn test_power_up_and_shield_cues() {
        let mem = MemoryStorage::new();
        let sound = RecordingSound::default();
        let mut session = session_with(&mem, Services::none().with_sound(sound.clone()));
        session.frame(&start(), DT, 0.0);

        let pos = session.state.player.pos;
        session
            .state
            .collectibles
            .create(CollectibleKind::PowerUp(PowerUpKind::Shield), pos, 0.0);
        session.frame(&TickInput::default(), DT, 16.0);
        crash(&mut session);
        session.frame(&TickInput::default(), DT, 32.0);

        let played: Vec<_> = sound.0.borrow().iter().map(|(e, _)| *e).collect();
        assert_eq!(played, vec![SoundEffect::PowerUp, SoundEffect::Shield]);
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_game_over_hands_off_final_stats() {
        let mem = MemoryStorage::new();
        let storage: SharedStorage = Rc::new(mem.clone());
        let services = Services::none()
            .with_achievements(AchievementTracker::load(storage.clone()))
            .with_leaderboard(Leaderboard::load(storage.clone()));
        let mut session = Session::new(3, GameState::default_canvas(), storage, services);

        session.frame(&start(), DT, 0.0);
        let pos = session.state.player.pos;
        session.state.collectibles.create(CollectibleKind::Coin, pos, 0.0);
        session.frame(&TickInput::default(), DT, 16.0);
        crash(&mut session);
        session.frame(&TickInput::default(), DT, 32.0);

        let result = session.last_result().cloned().unwrap();
        assert_eq!(result.summary.coins, 1);
        assert_eq!(result.rank, Some(1));
        assert_eq!(result.unlocked, vec![Achievement::FirstSteps]);
        // Wallet flushed synchronously at run end
        assert_eq!(mem.get("snowfall_total_coins").as_deref(), Some("1"));
        assert_eq!(mem.get("snowfall_total_games").as_deref(), Some("1"));

        assert_eq!(session.take_unlocked(), vec![Achievement::FirstSteps]);
        assert!(session.take_unlocked().is_empty());

        let board = Leaderboard::load(Rc::new(mem));
        assert_eq!(board.top_score(), Some(result.summary.score));
    }

    #[test]
    fn test_reduced_motion_suppresses_effects() {
        let mem = MemoryStorage::new();
        let mut session = session_with(&mem, Services::none());
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        session.apply_settings(&settings);
        session.frame(&start(), DT, 0.0);

        let pos = session.state.player.pos;
        session.state.collectibles.create(CollectibleKind::Star, pos, 0.0);
        session.frame(&TickInput::default(), DT, 16.0);
        assert!(session.state.particles.is_empty());
        assert_eq!(session.wallet().stars(), 1);
    }

    #[test]
    fn test_teardown_flushes_wallet() {
        let mem = MemoryStorage::new();
        let mut session = session_with(&mem, Services::none());
        session.frame(&start(), DT, 0.0);
        let pos = session.state.player.pos;
        session.state.collectibles.create(CollectibleKind::Star, pos, 0.0);
        session.frame(&TickInput::default(), DT, 16.0);
        assert!(mem.get("snowfall_total_stars").is_none());

        session.teardown();
        assert_eq!(mem.get("snowfall_total_stars").as_deref(), Some("1"));
    }
}
