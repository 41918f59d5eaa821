//! Platform abstraction layer
//!
//! Browser-facing logic kept free of `web_sys` so it can be tested natively:
//! - Viewport sizing (full screen on mobile, capped aspect box on desktop)
//! - Input tracking (keys, tap-to-move, drag-to-move, on-screen buttons)

pub mod input;
pub mod viewport;

pub use input::{InputState, Key};
pub use viewport::{Viewport, is_mobile_user_agent};
