//! Frame composition
//!
//! Draw order: background, obstacles, collectibles, particles, tap marker,
//! shield, player.

use glam::Vec2;

use super::skins::SkinRegistry;
use super::themes::ThemeRegistry;
use super::{Color, Surface, colors, star_points};
use crate::sim::{Collectible, CollectibleKind, GameState, Obstacle, ObstacleKind, PowerUpKind};

/// Skin and theme registries plus the current selection
pub struct Scene {
    skins: SkinRegistry,
    themes: ThemeRegistry,
    skin: String,
    theme: String,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            skins: SkinRegistry::new(),
            themes: ThemeRegistry::new(),
            skin: super::skins::DEFAULT_SKIN.to_string(),
            theme: super::themes::DEFAULT_THEME.to_string(),
        }
    }

    /// Select skin and theme by id. Unknown ids draw the defaults.
    pub fn select(&mut self, skin: &str, theme: &str) {
        if !self.skins.contains(skin) {
            log::warn!("Unknown skin '{}', using default", skin);
        }
        self.skin = skin.to_string();
        self.theme = theme.to_string();
    }

    pub fn skins(&self) -> &SkinRegistry {
        &self.skins
    }

    pub fn themes(&self) -> &ThemeRegistry {
        &self.themes
    }

    /// Draw one frame. `time` is wall-clock seconds for ambient animation.
    pub fn draw(&self, surface: &mut dyn Surface, state: &GameState, time: f32) {
        self.themes.get(&self.theme).draw(surface, time);

        for obstacle in state.obstacles.all() {
            draw_obstacle(surface, obstacle);
        }
        for item in state.collectibles.all() {
            draw_collectible(surface, item);
        }
        draw_particles(surface, state);
        draw_tap_marker(surface, state);
        self.draw_player(surface, state, time);
    }

    fn draw_player(&self, surface: &mut dyn Surface, state: &GameState, time: f32) {
        let player = &state.player;
        let anim = &player.anim;

        surface.save();
        surface.translate(player.pos);
        if anim.shake > 0.0 {
            // Deterministic jitter so drawing never touches the sim RNG
            let jitter = Vec2::new((time * 97.0).sin(), (time * 89.0).cos()) * anim.shake * 1.5;
            surface.translate(jitter);
        }
        surface.translate(Vec2::new(0.0, anim.bounce));

        if state.powerups.peek_active(PowerUpKind::Shield, state.clock_ms) {
            let pulse = 0.5 + 0.3 * (time * 6.0).sin();
            surface.fill_circle(Vec2::ZERO, 38.0, colors::SHIELD.with_alpha(0.15));
            surface.stroke_circle(Vec2::ZERO, 38.0, 3.0, colors::SHIELD.with_alpha(pulse));
        }

        surface.rotate(anim.tilt);
        self.skins.get(&self.skin).draw(surface, anim);
        surface.restore();
    }
}

fn draw_obstacle(surface: &mut dyn Surface, obstacle: &Obstacle) {
    let (w, h) = (obstacle.width, obstacle.height);

    surface.save();
    surface.translate(obstacle.center());
    surface.rotate(obstacle.rotation);
    surface.translate(Vec2::new(obstacle.wobble, 0.0));

    match obstacle.kind {
        ObstacleKind::Tree => {
            surface.fill_ellipse(Vec2::new(0.0, h / 2.0 + 5.0), Vec2::new(w / 2.0, 5.0), colors::SHADOW);
            surface.fill_rect(Vec2::new(-5.0, h / 2.0 - 10.0), Vec2::new(10.0, 10.0), colors::TRUNK);
            surface.fill_polygon(
                &[
                    Vec2::new(0.0, -h / 2.0),
                    Vec2::new(-w / 2.0, h / 2.0 - 10.0),
                    Vec2::new(w / 2.0, h / 2.0 - 10.0),
                ],
                colors::TREE,
            );
            surface.fill_circle(Vec2::new(-8.0, -10.0), 2.0, colors::GOLD);
            surface.fill_circle(Vec2::new(8.0, -5.0), 2.0, colors::GOLD);
            surface.fill_circle(Vec2::new(0.0, -15.0), 2.0, colors::ORNAMENT);
        }
        ObstacleKind::Rock => {
            surface.fill_ellipse(Vec2::new(0.0, h / 2.0 + 3.0), Vec2::new(w / 2.0, 3.0), colors::SHADOW);
            surface.fill_circle(Vec2::ZERO, w / 2.0, colors::ROCK);
            surface.stroke_circle(Vec2::ZERO, w / 2.0, 2.0, colors::ROCK_EDGE);
            surface.fill_circle(Vec2::new(-w * 0.15, -h * 0.15), w * 0.12, Color::hex(0x9E9E9E));
        }
        ObstacleKind::Snowman => {
            let r = w / 2.0;
            surface.fill_circle(Vec2::new(0.0, r * 0.4), r * 0.8, colors::WHITE);
            surface.stroke_circle(Vec2::new(0.0, r * 0.4), r * 0.8, 1.5, colors::SNOW_EDGE);
            surface.fill_circle(Vec2::new(0.0, -r * 0.5), r * 0.55, colors::WHITE);
            surface.stroke_circle(Vec2::new(0.0, -r * 0.5), r * 0.55, 1.5, colors::SNOW_EDGE);
            // Angry eyes
            surface.fill_circle(Vec2::new(-r * 0.2, -r * 0.6), 1.8, colors::ORNAMENT);
            surface.fill_circle(Vec2::new(r * 0.2, -r * 0.6), 1.8, colors::ORNAMENT);
        }
    }

    surface.restore();
}

fn draw_collectible(surface: &mut dyn Surface, item: &Collectible) {
    let center = item.pos + Vec2::new(0.0, item.bob_offset());
    let radius = item.size / 2.0 * item.pulse;

    match item.kind {
        CollectibleKind::Coin => {
            // Spin by squashing horizontally
            let squash = (item.rotation * 0.1).cos().abs().max(0.2);
            surface.fill_circle(center, radius * 1.4, colors::GOLD.with_alpha(0.2 * item.glow));
            surface.fill_ellipse(center, Vec2::new(radius * squash, radius), colors::COIN_EDGE);
            surface.fill_ellipse(center, Vec2::new((radius - 2.0).max(1.0) * squash, radius - 2.0), colors::GOLD);
        }
        CollectibleKind::Star => {
            surface.fill_circle(center, radius * 1.5, colors::GOLD.with_alpha(0.25 * item.glow));
            let points = star_points(center, radius, radius * 0.45, item.rotation * 0.05);
            surface.fill_polygon(&points, colors::GOLD);
        }
        CollectibleKind::PowerUp(kind) => {
            let color = Color::hex(kind.color());
            surface.fill_circle(center, radius * 1.5, color.with_alpha(0.3 * item.glow));
            surface.fill_circle(center, radius, color);
            surface.stroke_circle(center, radius, 2.0, colors::WHITE);
            surface.fill_text(power_up_glyph(kind), center, radius, colors::WHITE);
        }
    }
}

fn power_up_glyph(kind: PowerUpKind) -> &'static str {
    match kind {
        PowerUpKind::Shield => "S",
        PowerUpKind::SpeedBoost => "»",
        PowerUpKind::ScoreMultiplier => "x2",
        PowerUpKind::SlowMotion => "~",
        PowerUpKind::Magnet => "M",
    }
}

fn draw_particles(surface: &mut dyn Surface, state: &GameState) {
    for p in state.particles.all() {
        let alpha = p.life.clamp(0.0, 1.0);
        surface.fill_circle(p.pos, p.size, Color::hex(p.color).with_alpha(alpha));
    }
}

fn draw_tap_marker(surface: &mut dyn Surface, state: &GameState) {
    let Some(marker) = state.particles.marker() else {
        return;
    };
    let life = marker.life.clamp(0.0, 1.0);
    let radius = 10.0 + (1.0 - life) * 20.0;
    surface.stroke_circle(marker.pos, radius, 3.0, colors::TAP.with_alpha(life));
    surface.fill_circle(marker.pos, 4.0, colors::TAP.with_alpha(life));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::recording::{Op, RecordingSurface};

    fn state() -> GameState {
        let mut state = GameState::new(5, GameState::default_canvas());
        state.start_run();
        state
    }

    #[test]
    fn test_draws_every_entity_balanced() {
        let mut state = state();
        for (i, kind) in [ObstacleKind::Tree, ObstacleKind::Rock, ObstacleKind::Snowman]
            .into_iter()
            .enumerate()
        {
            let pos = Vec2::new(50.0 + i as f32 * 120.0, 100.0);
            state.obstacles.insert(Obstacle::new(i as u32, kind, pos, 90.0, 0.0));
        }
        state.collectibles.create(CollectibleKind::Coin, Vec2::new(100.0, 300.0), 0.0);
        state
            .collectibles
            .create(CollectibleKind::PowerUp(PowerUpKind::Magnet), Vec2::new(200.0, 300.0), 0.0);

        let scene = Scene::new();
        let mut surface = RecordingSurface::new(state.canvas);
        scene.draw(&mut surface, &state, 0.0);

        assert!(surface.balanced());
        // One save per obstacle plus one for the player
        assert_eq!(surface.count(|op| *op == Op::Save), 4);
        assert_eq!(surface.count(|op| *op == Op::Text("M".into())), 1);
    }

    #[test]
    fn test_shield_ring_only_when_active() {
        let mut state = state();
        let scene = Scene::new();
        let rings = |s: &RecordingSurface| {
            s.count(|op| matches!(op, Op::Ring(c, r, _) if *c == Vec2::ZERO && *r == 38.0))
        };

        let mut surface = RecordingSurface::new(state.canvas);
        scene.draw(&mut surface, &state, 0.0);
        assert_eq!(rings(&surface), 0);

        state.powerups.activate(PowerUpKind::Shield, 10_000.0, state.clock_ms);
        let mut surface = RecordingSurface::new(state.canvas);
        scene.draw(&mut surface, &state, 0.0);
        assert_eq!(rings(&surface), 1);
    }

    #[test]
    fn test_particles_and_marker() {
        let mut state = state();
        let mut rng = rand_pcg::Pcg32::new(1, 1);
        state.particles.burst(&mut rng, Vec2::new(100.0, 100.0), 8, 0x4CAF50);
        state.particles.mark_tap(Vec2::new(100.0, 100.0));

        let mut surface = RecordingSurface::new(state.canvas);
        draw_particles(&mut surface, &state);
        assert_eq!(surface.ops.len(), 8);

        let mut surface = RecordingSurface::new(state.canvas);
        draw_tap_marker(&mut surface, &state);
        assert!(matches!(surface.ops[0], Op::Ring(_, r, _) if r == 10.0));
    }

    #[test]
    fn test_unknown_selection_falls_back() {
        let mut scene = Scene::new();
        scene.select("dragon-snowman", "storm");
        let state = state();
        let mut surface = RecordingSurface::new(state.canvas);
        scene.draw(&mut surface, &state, 0.0);
        assert_eq!(surface.ops[0], Op::Gradient(3));
    }
}
