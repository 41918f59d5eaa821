//! High score leaderboard and lifetime play stats
//!
//! Persisted through the shared storage, tracks the top 10 runs.

use serde::{Deserialize, Serialize};

use crate::persistence::{SharedStorage, load_count, load_json, save_json};
use crate::services::LeaderboardSink;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;
/// Entries kept when a save hits the storage quota
const RETRY_KEEP: usize = 5;

const ENTRIES_KEY: &str = "snowfall_leaderboard";
const GAMES_KEY: &str = "snowfall_total_games";
const PLAY_TIME_KEY: &str = "snowfall_total_play_time";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Run length in seconds
    pub duration_secs: f32,
    /// Coins collected during the run
    pub coins: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Lifetime totals
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LifetimeStats {
    pub best_score: u64,
    pub total_games: u64,
    /// Whole seconds
    pub total_play_secs: u64,
}

/// High score leaderboard
pub struct Leaderboard {
    entries: Vec<HighScoreEntry>,
    total_games: u64,
    total_play_secs: u64,
    storage: SharedStorage,
}

impl std::fmt::Debug for Leaderboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Leaderboard")
            .field("entries", &self.entries)
            .field("total_games", &self.total_games)
            .field("total_play_secs", &self.total_play_secs)
            .finish()
    }
}

impl Leaderboard {
    /// Load the board and lifetime totals
    pub fn load(storage: SharedStorage) -> Self {
        let mut entries: Vec<HighScoreEntry> = load_json(storage.as_ref(), ENTRIES_KEY);
        entries.retain(|e| e.duration_secs.is_finite() && e.timestamp.is_finite());
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_HIGH_SCORES);

        let total_games = load_count(storage.as_ref(), GAMES_KEY);
        let total_play_secs = load_count(storage.as_ref(), PLAY_TIME_KEY);
        log::info!("Loaded {} high scores", entries.len());

        Self {
            entries,
            total_games,
            total_play_secs,
            storage,
        }
    }

    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a run (if it qualifies) and save.
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_score(
        &mut self,
        score: u64,
        duration_secs: f32,
        coins: u32,
        timestamp: f64,
    ) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            duration_secs: sanitize_secs(duration_secs),
            coins,
            timestamp,
        };

        // Sorted descending by score; ties keep the older entry first
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_HIGH_SCORES);

        self.save();
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn stats(&self) -> LifetimeStats {
        LifetimeStats {
            best_score: self.top_score().unwrap_or(0),
            total_games: self.total_games,
            total_play_secs: self.total_play_secs,
        }
    }

    /// Bump games played and total play time
    pub fn update_stats(&mut self, duration_secs: f32) {
        self.total_games += 1;
        self.total_play_secs += sanitize_secs(duration_secs).floor() as u64;

        let storage = self.storage.as_ref();
        let result = storage
            .set(GAMES_KEY, &self.total_games.to_string())
            .and_then(|_| storage.set(PLAY_TIME_KEY, &self.total_play_secs.to_string()));
        if let Err(e) = result {
            log::warn!("Failed to update statistics: {}", e);
        }
    }

    /// Save entries. On a quota failure, keep the top 5 and retry once.
    fn save(&mut self) {
        let Err(e) = save_json(self.storage.as_ref(), ENTRIES_KEY, &self.entries) else {
            log::debug!("High scores saved ({} entries)", self.entries.len());
            return;
        };
        log::warn!("Failed to save leaderboard: {}", e);

        if !e.is_quota() || self.entries.len() <= RETRY_KEEP {
            return;
        }
        self.entries.truncate(RETRY_KEEP);
        if let Err(e) = save_json(self.storage.as_ref(), ENTRIES_KEY, &self.entries) {
            log::warn!("Retry save also failed: {}", e);
        }
    }
}

impl LeaderboardSink for Leaderboard {
    fn add_entry(
        &mut self,
        score: u64,
        duration_secs: f32,
        coins: u32,
        timestamp_ms: f64,
    ) -> Option<usize> {
        self.add_score(score, duration_secs, coins, timestamp_ms)
    }

    fn record_run(&mut self, duration_secs: f32) {
        self.update_stats(duration_secs);
    }
}

fn sanitize_secs(secs: f32) -> f32 {
    if secs.is_finite() { secs.max(0.0) } else { 0.0 }
}

/// Format a timestamp relative to `now` (both Unix ms)
pub fn format_relative(timestamp: f64, now: f64) -> String {
    let diff_mins = ((now - timestamp) / 60_000.0).max(0.0);
    let diff_hours = diff_mins / 60.0;
    let diff_days = diff_hours / 24.0;

    if diff_days >= 1.0 {
        let days = diff_days.floor() as i64;
        match days {
            1 => "Yesterday".to_string(),
            2..=6 => format!("{} days ago", days),
            _ => format!("{} weeks ago", days / 7),
        }
    } else if diff_hours >= 1.0 {
        let hours = diff_hours.floor() as i64;
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if diff_mins >= 1.0 {
        let mins = diff_mins.floor() as i64;
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}

/// Format a timestamp relative to the browser clock
#[cfg(target_arch = "wasm32")]
pub fn format_date(timestamp: f64) -> String {
    format_relative(timestamp, js_sys::Date::now())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn format_date(_timestamp: f64) -> String {
    "N/A".to_string()
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::persistence::{MemoryStorage, Storage};

    fn board() -> (MemoryStorage, Leaderboard) {
        let mem = MemoryStorage::new();
        let board = Leaderboard::load(Rc::new(mem.clone()));
        (mem, board)
    }

    #[test]
    fn test_sorted_and_capped() {
        let (_, mut board) = board();
        for score in [300, 100, 900, 500, 700, 200, 800, 400, 600, 1000, 50] {
            board.add_score(score, 30.0, 2, 0.0);
        }
        assert_eq!(board.entries().len(), MAX_HIGH_SCORES);
        assert_eq!(board.top_score(), Some(1000));
        assert_eq!(board.entries().last().map(|e| e.score), Some(100));
        assert!(!board.qualifies(100));
        assert!(board.qualifies(101));
    }

    #[test]
    fn test_rank_and_persist() {
        let (mem, mut board) = board();
        assert_eq!(board.add_score(500, 60.0, 10, 1.0), Some(1));
        assert_eq!(board.add_score(800, 61.0, 12, 2.0), Some(1));
        assert_eq!(board.potential_rank(600), Some(2));
        assert_eq!(board.add_score(0, 1.0, 0, 3.0), None);

        let reloaded = Leaderboard::load(Rc::new(mem));
        assert_eq!(reloaded.entries().len(), 2);
        assert_eq!(reloaded.entries()[0].coins, 12);
    }

    #[test]
    fn test_lifetime_stats() {
        let (mem, mut board) = board();
        board.update_stats(61.7);
        board.update_stats(f32::NAN);
        board.update_stats(30.2);
        let stats = board.stats();
        assert_eq!(stats.total_games, 3);
        assert_eq!(stats.total_play_secs, 91);
        assert_eq!(mem.get(GAMES_KEY).as_deref(), Some("3"));
    }

    #[test]
    fn test_malformed_storage_starts_fresh() {
        let mem = MemoryStorage::new();
        mem.set(ENTRIES_KEY, "[{\"score\": \"lots\"}]").unwrap();
        mem.set(GAMES_KEY, "-4").unwrap();
        let board = Leaderboard::load(Rc::new(mem));
        assert!(board.is_empty());
        assert_eq!(board.stats().total_games, 0);
    }

    #[test]
    fn test_quota_failure_truncates_and_retries() {
        let (_, mut probe) = board();
        for i in 0..6 {
            probe.add_score(1000 + i, 10.0, 1, 0.0);
        }
        let six = serde_json::to_string(probe.entries()).unwrap().len();

        // Room for five entries but not six
        let mem = MemoryStorage::with_quota(ENTRIES_KEY.len() + six - 10);
        let mut board = Leaderboard::load(Rc::new(mem.clone()));
        for i in 0..6 {
            board.add_score(1000 + i, 10.0, 1, 0.0);
        }
        assert_eq!(board.entries().len(), RETRY_KEEP);
        let saved: Vec<HighScoreEntry> = serde_json::from_str(&mem.get(ENTRIES_KEY).unwrap()).unwrap();
        assert_eq!(saved.len(), RETRY_KEEP);
        assert_eq!(saved[0].score, 1005);
    }

    #[test]
    fn test_format_relative() {
        let now = 10_000_000_000.0;
        assert_eq!(format_relative(now - 10_000.0, now), "Just now");
        assert_eq!(format_relative(now - 60_000.0, now), "1 min ago");
        assert_eq!(format_relative(now - 3.0 * 3_600_000.0, now), "3 hours ago");
        assert_eq!(format_relative(now - 86_400_000.0, now), "Yesterday");
        assert_eq!(format_relative(now - 15.0 * 86_400_000.0, now), "2 weeks ago");
    }
}
