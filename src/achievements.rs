//! Achievements unlocked from final run stats
//!
//! The unlocked set is persisted as a JSON list of ids.

use std::collections::BTreeSet;

use crate::persistence::{SharedStorage, load_json, save_json};
use crate::services::{AchievementSink, FinalStats};

const STORAGE_KEY: &str = "snowfall_achievements";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Achievement {
    FirstSteps,
    SpeedDemon,
    CoinCollector,
    ComboMaster,
    Survivor,
    PerfectRun,
}

impl Achievement {
    pub const ALL: [Achievement; 6] = [
        Achievement::FirstSteps,
        Achievement::SpeedDemon,
        Achievement::CoinCollector,
        Achievement::ComboMaster,
        Achievement::Survivor,
        Achievement::PerfectRun,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Achievement::FirstSteps => "first_steps",
            Achievement::SpeedDemon => "speed_demon",
            Achievement::CoinCollector => "coin_collector",
            Achievement::ComboMaster => "combo_master",
            Achievement::Survivor => "survivor",
            Achievement::PerfectRun => "perfect_run",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            Achievement::FirstSteps => "First Steps",
            Achievement::SpeedDemon => "Speed Demon",
            Achievement::CoinCollector => "Coin Collector",
            Achievement::ComboMaster => "Combo Master",
            Achievement::Survivor => "Survivor",
            Achievement::PerfectRun => "Perfect Run",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Achievement::FirstSteps => "Play your first game",
            Achievement::SpeedDemon => "Reach top speed",
            Achievement::CoinCollector => "Collect 100 coins",
            Achievement::ComboMaster => "Reach a 10+ combo",
            Achievement::Survivor => "Survive for 2 minutes",
            Achievement::PerfectRun => "Avoid every obstacle for 1 minute",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Achievement::FirstSteps => "🎮",
            Achievement::SpeedDemon => "⚡",
            Achievement::CoinCollector => "🪙",
            Achievement::ComboMaster => "🔥",
            Achievement::Survivor => "⏱️",
            Achievement::PerfectRun => "⭐",
        }
    }

    /// Whether `stats` earns this achievement
    pub fn earned_by(self, stats: &FinalStats) -> bool {
        let run = &stats.run;
        match self {
            Achievement::FirstSteps => true,
            Achievement::SpeedDemon => run.max_speed >= 4.0,
            Achievement::CoinCollector => stats.lifetime_coins >= 100,
            Achievement::ComboMaster => run.max_combo >= 10,
            Achievement::Survivor => run.duration_secs >= 120.0,
            Achievement::PerfectRun => run.perfect_run_secs >= 60.0,
        }
    }
}

pub struct AchievementTracker {
    unlocked: BTreeSet<Achievement>,
    storage: SharedStorage,
}

impl AchievementTracker {
    pub fn load(storage: SharedStorage) -> Self {
        let ids: Vec<String> = load_json(storage.as_ref(), STORAGE_KEY);
        let unlocked: BTreeSet<_> = ids.iter().filter_map(|id| Achievement::from_id(id)).collect();
        log::debug!("Loaded {} unlocked achievements", unlocked.len());
        Self { unlocked, storage }
    }

    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        self.unlocked.contains(&achievement)
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked.len()
    }

    /// Unlock and persist. Returns false if it was already unlocked.
    pub fn unlock(&mut self, achievement: Achievement) -> bool {
        if !self.unlocked.insert(achievement) {
            return false;
        }
        log::info!("Achievement unlocked: {}", achievement.name());
        self.save();
        true
    }

    fn save(&self) {
        let ids: Vec<&str> = self.unlocked.iter().map(|a| a.id()).collect();
        if let Err(e) = save_json(self.storage.as_ref(), STORAGE_KEY, &ids) {
            log::warn!("Failed to save achievements: {}", e);
        }
    }
}

impl AchievementSink for AchievementTracker {
    fn check(&mut self, stats: &FinalStats) -> Vec<Achievement> {
        Achievement::ALL
            .into_iter()
            .filter(|a| a.earned_by(stats))
            .filter(|a| self.unlock(*a))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::persistence::{MemoryStorage, Storage};
    use crate::sim::RunSummary;

    fn stats(duration_secs: f32, max_combo: u32, lifetime_coins: u64) -> FinalStats {
        FinalStats {
            run: RunSummary {
                score: 100,
                duration_secs,
                coins: 0,
                stars: 0,
                max_combo,
                level: 1,
                max_speed: 2.3,
                perfect_run_secs: duration_secs,
            },
            lifetime_coins,
        }
    }

    #[test]
    fn test_first_run_unlocks_first_steps_only() {
        let mut tracker = AchievementTracker::load(Rc::new(MemoryStorage::new()));
        let unlocked = tracker.check(&stats(20.0, 3, 10));
        assert_eq!(unlocked, vec![Achievement::FirstSteps]);
        // Already unlocked: not reported again
        assert!(tracker.check(&stats(20.0, 3, 10)).is_empty());
    }

    #[test]
    fn test_thresholds() {
        let mut tracker = AchievementTracker::load(Rc::new(MemoryStorage::new()));
        let unlocked = tracker.check(&stats(125.0, 10, 100));
        assert!(unlocked.contains(&Achievement::Survivor));
        assert!(unlocked.contains(&Achievement::PerfectRun));
        assert!(unlocked.contains(&Achievement::ComboMaster));
        assert!(unlocked.contains(&Achievement::CoinCollector));
        assert!(!unlocked.contains(&Achievement::SpeedDemon));
    }

    #[test]
    fn test_speed_demon_from_level() {
        let mut s = stats(10.0, 0, 0);
        s.run.max_speed = 2.0 + 7.0 * 0.3;
        assert!(Achievement::SpeedDemon.earned_by(&s));
    }

    #[test]
    fn test_persisted_and_reloaded() {
        let mem = MemoryStorage::new();
        let mut tracker = AchievementTracker::load(Rc::new(mem.clone()));
        tracker.unlock(Achievement::ComboMaster);

        let reloaded = AchievementTracker::load(Rc::new(mem.clone()));
        assert!(reloaded.is_unlocked(Achievement::ComboMaster));
        assert_eq!(reloaded.unlocked_count(), 1);

        mem.set(STORAGE_KEY, "[\"combo_master\", \"bogus\"]").unwrap();
        let tolerant = AchievementTracker::load(Rc::new(mem));
        assert_eq!(tolerant.unlocked_count(), 1);
    }
}
