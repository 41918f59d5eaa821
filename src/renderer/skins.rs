//! Player skins
//!
//! Each skin is a draw strategy over a shared snowman body. Drawing happens
//! in player-local coordinates (origin at the player center, already
//! translated and tilted by the scene).

use glam::Vec2;

use super::{Color, Surface, colors};
use crate::sim::PlayerAnim;

pub const DEFAULT_SKIN: &str = "default-snowman";

pub trait Skin {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn draw(&self, surface: &mut dyn Surface, anim: &PlayerAnim);
}

/// Colors for the three body circles
#[derive(Debug, Clone, Copy)]
struct Body {
    fill: Color,
    edge: Color,
    head: Color,
}

const SNOW_BODY: Body = Body {
    fill: colors::WHITE,
    edge: colors::SNOW_EDGE,
    head: colors::WHITE,
};

/// Stick arms, swinging while moving
fn draw_arms(surface: &mut dyn Surface, anim: &PlayerAnim) {
    let swing = if anim.moving {
        (anim.time * 6.0).sin() * 3.0
    } else {
        0.0
    };
    let lean = anim.direction * 2.0;
    surface.line(
        Vec2::new(-15.0, -2.0),
        Vec2::new(-25.0 + lean + swing, 5.0),
        3.0,
        colors::STICK,
    );
    surface.line(
        Vec2::new(15.0, -2.0),
        Vec2::new(25.0 - lean - swing, 5.0),
        3.0,
        colors::STICK,
    );
}

fn draw_body(surface: &mut dyn Surface, body: Body) {
    surface.fill_ellipse(Vec2::new(0.0, 25.0), Vec2::new(20.0, 8.0), colors::SHADOW);

    surface.fill_circle(Vec2::new(0.0, 10.0), 18.0, body.fill);
    surface.stroke_circle(Vec2::new(0.0, 10.0), 18.0, 2.0, body.edge);
    surface.fill_circle(Vec2::new(0.0, -5.0), 15.0, body.fill);
    surface.stroke_circle(Vec2::new(0.0, -5.0), 15.0, 2.0, body.edge);
    surface.fill_circle(Vec2::new(0.0, 5.0), 2.0, colors::BLACK);
    surface.fill_circle(Vec2::new(0.0, -2.0), 2.0, colors::BLACK);

    surface.fill_circle(Vec2::new(0.0, -25.0), 12.0, body.head);
    surface.stroke_circle(Vec2::new(0.0, -25.0), 12.0, 2.0, body.edge);
}

/// Eyes (closed while blinking) and carrot nose
fn draw_face(surface: &mut dyn Surface, anim: &PlayerAnim) {
    if anim.blink > 0.0 && anim.moving {
        surface.line(Vec2::new(-6.0, -28.0), Vec2::new(-2.0, -28.0), 2.0, colors::BLACK);
        surface.line(Vec2::new(2.0, -28.0), Vec2::new(6.0, -28.0), 2.0, colors::BLACK);
    } else {
        for x in [-4.0, 4.0] {
            surface.fill_circle(Vec2::new(x, -28.0), 2.5, colors::BLACK);
            surface.fill_circle(Vec2::new(x + 0.5, -28.5), 1.0, colors::WHITE);
        }
    }
    surface.fill_polygon(
        &[
            Vec2::new(0.0, -26.0),
            Vec2::new(-3.0, -22.0),
            Vec2::new(3.0, -22.0),
        ],
        colors::CARROT,
    );
}

fn draw_snowman(surface: &mut dyn Surface, anim: &PlayerAnim, body: Body) {
    draw_arms(surface, anim);
    draw_body(surface, body);
    draw_face(surface, anim);
}

/// Pointed hat with an optional pompom
fn draw_cone_hat(surface: &mut dyn Surface, color: Color, trim: Color, tip: Vec2) {
    surface.fill_polygon(
        &[Vec2::new(-11.0, -33.0), tip, Vec2::new(11.0, -33.0)],
        color,
    );
    surface.fill_rect(Vec2::new(-12.0, -35.0), Vec2::new(24.0, 4.0), trim);
    surface.fill_circle(tip, 3.5, trim);
}

pub struct DefaultSkin;

impl Skin for DefaultSkin {
    fn id(&self) -> &'static str {
        DEFAULT_SKIN
    }

    fn name(&self) -> &'static str {
        "Classic Snowman"
    }

    fn draw(&self, surface: &mut dyn Surface, anim: &PlayerAnim) {
        draw_snowman(surface, anim, SNOW_BODY);
        // Top hat with a gold band
        let brown = Color::hex(0x654321);
        surface.fill_rect(Vec2::new(-12.0, -30.0), Vec2::new(24.0, 4.0), brown);
        surface.fill_circle(Vec2::new(0.0, -35.0), 10.0, brown);
        surface.fill_rect(Vec2::new(-8.0, -32.0), Vec2::new(16.0, 3.0), colors::GOLD);
    }
}

pub struct SantaSkin;

impl Skin for SantaSkin {
    fn id(&self) -> &'static str {
        "santa-snowman"
    }

    fn name(&self) -> &'static str {
        "Santa Snowman"
    }

    fn draw(&self, surface: &mut dyn Surface, anim: &PlayerAnim) {
        let body = Body {
            fill: Color::hex(0xCC0000),
            edge: colors::WHITE,
            head: colors::WHITE,
        };
        draw_snowman(surface, anim, body);
        // Belt and buckle
        surface.fill_rect(Vec2::new(-18.0, -2.0), Vec2::new(36.0, 8.0), colors::BLACK);
        surface.fill_rect(Vec2::new(-4.0, -1.0), Vec2::new(8.0, 6.0), colors::GOLD);
        draw_cone_hat(
            surface,
            Color::hex(0xFF0000),
            colors::WHITE,
            Vec2::new(8.0, -50.0),
        );
    }
}

pub struct ElfSkin;

impl Skin for ElfSkin {
    fn id(&self) -> &'static str {
        "elf-snowman"
    }

    fn name(&self) -> &'static str {
        "Elf Snowman"
    }

    fn draw(&self, surface: &mut dyn Surface, anim: &PlayerAnim) {
        let body = Body {
            fill: Color::hex(0x2E7D32),
            edge: Color::hex(0x1B5E20),
            head: colors::WHITE,
        };
        draw_snowman(surface, anim, body);
        // Pointed ears
        let skin = Color::hex(0xFFE0BD);
        surface.fill_polygon(
            &[Vec2::new(-11.0, -27.0), Vec2::new(-19.0, -32.0), Vec2::new(-11.0, -22.0)],
            skin,
        );
        surface.fill_polygon(
            &[Vec2::new(11.0, -27.0), Vec2::new(19.0, -32.0), Vec2::new(11.0, -22.0)],
            skin,
        );
        draw_cone_hat(
            surface,
            Color::hex(0x4CAF50),
            Color::hex(0xF44336),
            Vec2::new(-10.0, -52.0),
        );
    }
}

pub struct GoldenSkin;

impl Skin for GoldenSkin {
    fn id(&self) -> &'static str {
        "golden-snowman"
    }

    fn name(&self) -> &'static str {
        "Golden Snowman"
    }

    fn draw(&self, surface: &mut dyn Surface, anim: &PlayerAnim) {
        // Pulsing glow behind the body
        let glow = 0.25 + (anim.time * 3.0).sin().abs() * 0.15;
        surface.fill_circle(Vec2::ZERO, 32.0, colors::GOLD.with_alpha(glow));
        let body = Body {
            fill: colors::GOLD,
            edge: colors::COIN_EDGE,
            head: Color::hex(0xFFE55C),
        };
        draw_snowman(surface, anim, body);
        // Crown
        surface.fill_polygon(
            &[
                Vec2::new(-10.0, -34.0),
                Vec2::new(-10.0, -44.0),
                Vec2::new(-5.0, -39.0),
                Vec2::new(0.0, -46.0),
                Vec2::new(5.0, -39.0),
                Vec2::new(10.0, -44.0),
                Vec2::new(10.0, -34.0),
            ],
            colors::GOLD,
        );
    }
}

pub struct IceSkin;

impl Skin for IceSkin {
    fn id(&self) -> &'static str {
        "ice-snowman"
    }

    fn name(&self) -> &'static str {
        "Ice Snowman"
    }

    fn draw(&self, surface: &mut dyn Surface, anim: &PlayerAnim) {
        let body = Body {
            fill: Color::hex(0xB3E5FC).with_alpha(0.9),
            edge: Color::hex(0x4FC3F7),
            head: Color::hex(0xE1F5FE),
        };
        draw_snowman(surface, anim, body);
        // Ice crystal crown
        let crystal = Color::hex(0x81D4FA);
        for (x, h) in [(-7.0, 8.0), (0.0, 12.0), (7.0, 8.0)] {
            surface.fill_polygon(
                &[
                    Vec2::new(x - 3.0, -36.0),
                    Vec2::new(x, -36.0 - h),
                    Vec2::new(x + 3.0, -36.0),
                ],
                crystal,
            );
        }
    }
}

/// Skins by id, falling back to the default for unknown ids
pub struct SkinRegistry {
    skins: Vec<Box<dyn Skin>>,
}

impl Default for SkinRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SkinRegistry {
    pub fn new() -> Self {
        Self {
            skins: vec![
                Box::new(DefaultSkin),
                Box::new(SantaSkin),
                Box::new(ElfSkin),
                Box::new(GoldenSkin),
                Box::new(IceSkin),
            ],
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.skins.iter().map(|s| s.id())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.skins.iter().any(|s| s.id() == id)
    }

    pub fn get(&self, id: &str) -> &dyn Skin {
        self.skins
            .iter()
            .find(|s| s.id() == id)
            .unwrap_or(&self.skins[0])
            .as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::recording::{Op, RecordingSurface};

    #[test]
    fn test_registry_lookup_and_fallback() {
        let registry = SkinRegistry::new();
        assert_eq!(registry.ids().count(), 5);
        assert_eq!(registry.get("elf-snowman").id(), "elf-snowman");
        assert_eq!(registry.get("dragon-snowman").id(), DEFAULT_SKIN);
        assert!(!registry.contains(""));
    }

    #[test]
    fn test_every_skin_draws_body_and_face() {
        let registry = SkinRegistry::new();
        let anim = PlayerAnim::default();
        for id in registry.ids() {
            let mut surface = RecordingSurface::new(Vec2::new(500.0, 800.0));
            registry.get(id).draw(&mut surface, &anim);
            let circles = surface.count(|op| matches!(op, Op::Circle(..)));
            assert!(circles >= 7, "{} drew {} circles", id, circles);
            assert!(surface.count(|op| matches!(op, Op::Polygon(..))) >= 1);
        }
    }

    #[test]
    fn test_blink_closes_eyes() {
        let registry = SkinRegistry::new();
        let anim = PlayerAnim {
            blink: 1.0,
            moving: true,
            ..Default::default()
        };
        let mut open = RecordingSurface::default();
        registry.get(DEFAULT_SKIN).draw(&mut open, &PlayerAnim::default());
        let mut closed = RecordingSurface::default();
        registry.get(DEFAULT_SKIN).draw(&mut closed, &anim);

        let lines = |s: &RecordingSurface| s.count(|op| matches!(op, Op::Line(..)));
        assert_eq!(lines(&open), 2);
        assert_eq!(lines(&closed), 4);
    }
}
