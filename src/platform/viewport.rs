//! Responsive canvas sizing

use glam::Vec2;

use crate::consts::{CANVAS_MAX_HEIGHT, CANVAS_MAX_WIDTH};

/// Canvas size plus the CSS box it is displayed in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Drawing buffer size in canvas pixels
    pub canvas: Vec2,
    /// Displayed size in CSS pixels
    pub css: Vec2,
}

impl Viewport {
    /// Size the canvas for a window of `window` CSS pixels.
    ///
    /// Mobile fills the window. Desktop keeps the 500:800 aspect ratio and
    /// never exceeds it.
    pub fn fit(window: Vec2, mobile: bool) -> Self {
        let window = window.max(Vec2::ZERO);
        if mobile {
            return Self {
                canvas: window.floor(),
                css: window.floor(),
            };
        }

        let aspect = CANVAS_MAX_WIDTH / CANVAS_MAX_HEIGHT;
        let (mut w, mut h) = (window.x, window.y);
        if h > 0.0 && w / h > aspect {
            w = h * aspect;
        } else {
            h = w / aspect;
        }
        let size = Vec2::new(w.min(CANVAS_MAX_WIDTH), h.min(CANVAS_MAX_HEIGHT)).floor();
        Self {
            canvas: size,
            css: size,
        }
    }

    /// Canvas pixels per CSS pixel along x
    pub fn scale_x(&self) -> f32 {
        if self.css.x > 0.0 {
            self.canvas.x / self.css.x
        } else {
            1.0
        }
    }

    /// Convert a point relative to the element's top-left (CSS px) to canvas px
    pub fn to_canvas(&self, css_point: Vec2) -> Vec2 {
        let scale = if self.css.x > 0.0 && self.css.y > 0.0 {
            self.canvas / self.css
        } else {
            Vec2::ONE
        };
        css_point * scale
    }

    pub fn is_usable(&self) -> bool {
        self.canvas.x > 0.0 && self.canvas.y > 0.0
    }
}

/// Mobile detection from the navigator user agent
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    const MARKERS: [&str; 8] = [
        "android",
        "webos",
        "iphone",
        "ipad",
        "ipod",
        "blackberry",
        "iemobile",
        "opera mini",
    ];
    let ua = user_agent.to_lowercase();
    MARKERS.iter().any(|m| ua.contains(m))
}
