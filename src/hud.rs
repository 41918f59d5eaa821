//! HUD values derived from game state
//!
//! Pure formatting so the DOM layer only copies strings into elements.

use crate::sim::{GamePhase, GameState, PowerUpKind};

/// Combo highlight tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboTier {
    Normal,
    /// 5+
    Hot,
    /// 10+
    Blazing,
}

impl ComboTier {
    pub fn for_combo(combo: u32) -> Self {
        match combo {
            10.. => ComboTier::Blazing,
            5.. => ComboTier::Hot,
            _ => ComboTier::Normal,
        }
    }

    /// CSS color for the combo value
    pub fn color(self) -> &'static str {
        match self {
            ComboTier::Normal => "#FFFFFF",
            ComboTier::Hot => "#FF9800",
            ComboTier::Blazing => "#FFD700",
        }
    }

    pub fn bold(self) -> bool {
        self == ComboTier::Blazing
    }

    /// Inline style for the combo element
    pub fn style(self) -> String {
        let weight = if self.bold() { "bold" } else { "normal" };
        format!("color: {}; font-weight: {}", self.color(), weight)
    }
}

/// One active power-up row
#[derive(Debug, Clone, PartialEq)]
pub struct PowerUpBar {
    pub kind: PowerUpKind,
    /// Remaining share in [0, 1]
    pub remaining: f32,
}

impl PowerUpBar {
    /// Bar width as a CSS percentage
    pub fn width_percent(&self) -> String {
        format!("{:.0}%", self.remaining.clamp(0.0, 1.0) * 100.0)
    }

    pub fn color(&self) -> String {
        format!("#{:06X}", self.kind.color())
    }
}

/// Everything the HUD shows for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct HudSnapshot {
    pub score: String,
    /// Shown at every value, zero included
    pub combo: String,
    pub combo_tier: ComboTier,
    pub level: u32,
    pub coins: String,
    pub stars: String,
    pub time: String,
    pub power_ups: Vec<PowerUpBar>,
    pub phase: GamePhase,
}

impl HudSnapshot {
    /// Snapshot run values. `total_coins` and `total_stars` are lifetime totals.
    pub fn from_state(state: &GameState, total_coins: u64, total_stars: u64) -> Self {
        let stats = &state.stats;
        let power_ups = state
            .powerups
            .peek_list(state.clock_ms)
            .into_iter()
            .map(|(kind, remaining)| PowerUpBar { kind, remaining })
            .collect();

        Self {
            score: format_number(stats.score),
            combo: format_number(stats.combo as u64),
            combo_tier: ComboTier::for_combo(stats.combo),
            level: stats.level,
            coins: format_number(total_coins),
            stars: format_number(total_stars),
            time: format_time(stats.game_time),
            power_ups,
            phase: state.phase,
        }
    }
}

/// Format with thousands separators: 1234567 -> "1,234,567"
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format seconds as m:ss
pub fn format_time(secs: f32) -> String {
    let total = if secs.is_finite() { secs.max(0.0) as u64 } else { 0 };
    format!("{}:{:02}", total / 60, total % 60)
}
