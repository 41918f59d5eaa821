//! Background themes
//!
//! A theme paints the sky gradient and its ambient decoration. Decoration is
//! a pure function of `time`, so nothing is stored between frames.

use glam::Vec2;

use super::{Color, Surface, colors};

pub const DEFAULT_THEME: &str = "default-winter";

pub trait Theme {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    /// Gradient stops, top to bottom (offset, 0xRRGGBB)
    fn gradient(&self) -> &'static [(f32, u32)];
    fn draw_decor(&self, surface: &mut dyn Surface, time: f32);

    fn draw(&self, surface: &mut dyn Surface, time: f32) {
        let stops: Vec<(f32, Color)> = self
            .gradient()
            .iter()
            .map(|&(offset, rgb)| (offset, Color::hex(rgb)))
            .collect();
        surface.vertical_gradient(&stops);
        self.draw_decor(surface, time);
    }
}

/// Deterministic per-index value in [0, 1)
fn scatter(i: usize, salt: f32) -> f32 {
    ((i as f32 * 12.9898 + salt * 78.233).sin() * 43_758.547).fract().abs()
}

pub struct WinterTheme;

impl WinterTheme {
    const FLAKES: usize = 40;
}

impl Theme for WinterTheme {
    fn id(&self) -> &'static str {
        DEFAULT_THEME
    }

    fn name(&self) -> &'static str {
        "Winter Day"
    }

    fn gradient(&self) -> &'static [(f32, u32)] {
        &[(0.0, 0x87CEEB), (0.3, 0xE0F6FF), (1.0, 0xFFFFFF)]
    }

    fn draw_decor(&self, surface: &mut dyn Surface, time: f32) {
        let size = surface.size();
        for i in 0..Self::FLAKES {
            let speed = 20.0 + scatter(i, 1.0) * 40.0;
            let x = scatter(i, 2.0) * size.x + (time + i as f32).sin() * 10.0;
            let y = (scatter(i, 3.0) * size.y + time.max(0.0) * speed) % size.y.max(1.0);
            let radius = 1.0 + scatter(i, 4.0) * 2.0;
            surface.fill_circle(Vec2::new(x, y), radius, colors::WHITE.with_alpha(0.8));
        }
    }
}

pub struct NightTheme;

impl NightTheme {
    const STARS: usize = 50;
}

impl Theme for NightTheme {
    fn id(&self) -> &'static str {
        "night-sky"
    }

    fn name(&self) -> &'static str {
        "Night Sky"
    }

    fn gradient(&self) -> &'static [(f32, u32)] {
        &[(0.0, 0x0A0A1A), (0.5, 0x1A1A3A), (1.0, 0x2A2A4A)]
    }

    fn draw_decor(&self, surface: &mut dyn Surface, time: f32) {
        let size = surface.size();
        surface.fill_circle(
            Vec2::new(size.x * 0.8, size.y * 0.12),
            24.0,
            Color::hex(0xFFFDE7),
        );
        for i in 0..Self::STARS {
            let pos = Vec2::new(scatter(i, 5.0) * size.x, scatter(i, 6.0) * size.y * 0.6);
            let twinkle = 0.5 + 0.5 * (time * 2.0 + i as f32).sin();
            surface.fill_circle(pos, 1.2, colors::WHITE.with_alpha(twinkle));
        }
    }
}

pub struct AuroraTheme;

impl Theme for AuroraTheme {
    fn id(&self) -> &'static str {
        "aurora"
    }

    fn name(&self) -> &'static str {
        "Aurora"
    }

    fn gradient(&self) -> &'static [(f32, u32)] {
        &[(0.0, 0x0A1A0A), (0.3, 0x1A3A2A), (0.6, 0x2A5A3A), (1.0, 0x1A2A1A)]
    }

    fn draw_decor(&self, surface: &mut dyn Surface, time: f32) {
        const SEGMENTS: usize = 16;
        let size = surface.size();
        let bands = [(0x2ECC71, 0.15, 0.0), (0x00BCD4, 0.22, 1.7), (0x9C27B0, 0.3, 3.1)];

        for (rgb, height, phase) in bands {
            let base = size.y * height;
            let wave = |i: usize| {
                let t = i as f32 / SEGMENTS as f32;
                let y = base + (t * 6.0 + time * 0.8 + phase).sin() * 18.0;
                Vec2::new(t * size.x, y)
            };
            // Upper edge left to right, then lower edge back
            let mut points: Vec<Vec2> = (0..=SEGMENTS).map(wave).collect();
            points.extend((0..=SEGMENTS).rev().map(|i| wave(i) + Vec2::new(0.0, 40.0)));
            surface.fill_polygon(&points, Color::hex(rgb).with_alpha(0.18));
        }
    }
}

/// Themes by id, falling back to the default for unknown ids
pub struct ThemeRegistry {
    themes: Vec<Box<dyn Theme>>,
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeRegistry {
    pub fn new() -> Self {
        Self {
            themes: vec![Box::new(WinterTheme), Box::new(NightTheme), Box::new(AuroraTheme)],
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.themes.iter().map(|t| t.id())
    }

    pub fn get(&self, id: &str) -> &dyn Theme {
        self.themes
            .iter()
            .find(|t| t.id() == id)
            .unwrap_or(&self.themes[0])
            .as_ref()
    }
}
