//! Input tracking
//!
//! DOM listeners feed raw events in CSS pixels; the frame loop calls
//! [`InputState::take_frame`] once per animation frame to get a
//! [`TickInput`] in canvas pixels. One-shot commands are cleared on take.

use glam::Vec2;

use super::viewport::Viewport;
use crate::sim::TickInput;

/// A touch shorter than this counts as a tap (ms)
pub const TAP_MAX_MS: f64 = 300.0;
/// A touch that moved less than this counts as a tap (CSS px)
pub const TAP_MAX_TRAVEL: f32 = 10.0;
pub const DRAG_SENSITIVITY_DESKTOP: f32 = 1.2;
pub const DRAG_SENSITIVITY_MOBILE: f32 = 1.5;

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Pause,
    Start,
}

impl Key {
    /// Map a `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(Key::Left),
            "ArrowRight" | "d" | "D" => Some(Key::Right),
            "Escape" | "p" | "P" => Some(Key::Pause),
            " " | "Enter" => Some(Key::Start),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Touch {
    start: Vec2,
    last_x: f32,
    started_at_ms: f64,
}

/// Accumulated input between frames
#[derive(Debug, Clone)]
pub struct InputState {
    key_left: bool,
    key_right: bool,
    button_left: bool,
    button_right: bool,
    touch: Option<Touch>,
    sensitivity: f32,
    frame: TickInput,
}

impl InputState {
    pub fn new(mobile: bool) -> Self {
        Self {
            key_left: false,
            key_right: false,
            button_left: false,
            button_right: false,
            touch: None,
            sensitivity: if mobile {
                DRAG_SENSITIVITY_MOBILE
            } else {
                DRAG_SENSITIVITY_DESKTOP
            },
            frame: TickInput::default(),
        }
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::Left => self.key_left = true,
            Key::Right => self.key_right = true,
            Key::Pause => self.frame.pause = true,
            Key::Start => self.frame.start = true,
        }
    }

    pub fn key_up(&mut self, key: Key) {
        match key {
            Key::Left => self.key_left = false,
            Key::Right => self.key_right = false,
            Key::Pause | Key::Start => {}
        }
    }

    /// On-screen direction button pressed or released
    pub fn set_button(&mut self, key: Key, held: bool) {
        match key {
            Key::Left => self.button_left = held,
            Key::Right => self.button_right = held,
            Key::Pause | Key::Start => {}
        }
    }

    pub fn request_pause(&mut self) {
        self.frame.pause = true;
    }

    pub fn request_start(&mut self) {
        self.frame.start = true;
    }

    /// Release everything held (window blur)
    pub fn release_all(&mut self) {
        self.key_left = false;
        self.key_right = false;
        self.button_left = false;
        self.button_right = false;
        self.touch = None;
    }

    /// Mouse click at `css_point` relative to the canvas
    pub fn click(&mut self, css_point: Vec2, viewport: &Viewport) {
        self.frame.tap = Some(viewport.to_canvas(css_point));
    }

    pub fn touch_start(&mut self, css_point: Vec2, now_ms: f64) {
        self.touch = Some(Touch {
            start: css_point,
            last_x: css_point.x,
            started_at_ms: now_ms,
        });
    }

    /// Finger moved: shift the target by the scaled horizontal delta
    pub fn touch_move(&mut self, css_point: Vec2, viewport: &Viewport) {
        let Some(touch) = self.touch.as_mut() else {
            return;
        };
        let delta = css_point.x - touch.last_x;
        touch.last_x = css_point.x;
        self.frame.drag_delta += delta * viewport.scale_x() * self.sensitivity;
    }

    /// Finger lifted. A short, still touch becomes a tap.
    pub fn touch_end(&mut self, css_point: Vec2, now_ms: f64, viewport: &Viewport) {
        let Some(touch) = self.touch.take() else {
            return;
        };
        let quick = now_ms - touch.started_at_ms < TAP_MAX_MS;
        let still = touch.start.distance(css_point) < TAP_MAX_TRAVEL;
        if quick && still {
            self.click(css_point, viewport);
        }
    }

    pub fn touch_cancel(&mut self) {
        self.touch = None;
    }

    /// Input for this frame. Clears taps, drags and one-shot commands.
    pub fn take_frame(&mut self) -> TickInput {
        let mut input = std::mem::take(&mut self.frame);
        input.left = self.key_left || self.button_left;
        input.right = self.key_right || self.button_right;
        input
    }
}
