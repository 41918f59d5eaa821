//! 2D canvas rendering
//!
//! Drawing goes through the [`Surface`] trait so scenes can be exercised
//! without a browser. Skins and themes are registries of draw strategies
//! keyed by id. Rendering only reads simulation state.

pub mod scene;
pub mod skins;
pub mod themes;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

use glam::Vec2;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use scene::Scene;
pub use skins::{Skin, SkinRegistry};
pub use themes::{Theme, ThemeRegistry};

/// RGBA color, channels in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Opaque color from 0xRRGGBB
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as f32 / 255.0,
            g: ((rgb >> 8) & 0xFF) as f32 / 255.0,
            b: (rgb & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgba()` string
    pub fn to_css(self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "rgba({}, {}, {}, {})",
            channel(self.r),
            channel(self.g),
            channel(self.b),
            (self.a.clamp(0.0, 1.0) * 1000.0).round() / 1000.0
        )
    }
}

/// Colors for game elements
pub mod colors {
    use super::Color;

    pub const WHITE: Color = Color::hex(0xFFFFFF);
    pub const BLACK: Color = Color::hex(0x000000);
    pub const SHADOW: Color = Color::hex(0x000000).with_alpha(0.2);
    pub const SNOW_EDGE: Color = Color::hex(0xD0D0D0);
    pub const CARROT: Color = Color::hex(0xFF9800);
    pub const STICK: Color = Color::hex(0x8B4513);
    pub const GOLD: Color = Color::hex(0xFFD700);
    pub const COIN_EDGE: Color = Color::hex(0xB8860B);
    pub const SHIELD: Color = Color::hex(0x2196F3);
    pub const TAP: Color = Color::hex(0x4CAF50);
    pub const TREE: Color = Color::hex(0x2E7D32);
    pub const TREE_EDGE: Color = Color::hex(0x1B5E20);
    pub const TRUNK: Color = Color::hex(0x5D4037);
    pub const ORNAMENT: Color = Color::hex(0xF44336);
    pub const ROCK: Color = Color::hex(0x757575);
    pub const ROCK_EDGE: Color = Color::hex(0x424242);
}

/// Minimal 2D drawing surface (a subset of the canvas 2D context)
pub trait Surface {
    fn size(&self) -> Vec2;
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2);
    fn rotate(&mut self, radians: f32);
    /// Fill the whole surface with a top-to-bottom gradient
    fn vertical_gradient(&mut self, stops: &[(f32, Color)]);
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Color);
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color);
    fn fill_polygon(&mut self, points: &[Vec2], color: Color);
    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);
    fn fill_text(&mut self, text: &str, pos: Vec2, size: f32, color: Color);
}

/// Points of a five-pointed star centered on `center`
pub fn star_points(center: Vec2, outer: f32, inner: f32, rotation: f32) -> Vec<Vec2> {
    (0..10)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let angle = rotation - std::f32::consts::FRAC_PI_2 + i as f32 * std::f32::consts::PI / 5.0;
            center + Vec2::from_angle(angle) * r
        })
        .collect()
}
