//! Lifetime coin and star totals
//!
//! Every change pushes a write deadline [`SAVE_DEBOUNCE_MS`] into the
//! future; [`Wallet::poll`] performs the write once the deadline passes.
//! [`Wallet::flush`] writes immediately and is called when a run ends.

use super::{SharedStorage, StorageError, load_count};
use crate::consts::SAVE_DEBOUNCE_MS;

const COINS_KEY: &str = "snowfall_total_coins";
const STARS_KEY: &str = "snowfall_total_stars";

pub struct Wallet {
    storage: SharedStorage,
    coins: u64,
    stars: u64,
    /// Wall-clock time (ms) after which pending changes are written
    deadline: Option<f64>,
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("coins", &self.coins)
            .field("stars", &self.stars)
            .field("deadline", &self.deadline)
            .finish()
    }
}

impl Wallet {
    /// Load totals from storage
    pub fn load(storage: SharedStorage) -> Self {
        let coins = load_count(storage.as_ref(), COINS_KEY);
        let stars = load_count(storage.as_ref(), STARS_KEY);
        log::debug!("Wallet loaded: {} coins, {} stars", coins, stars);
        Self {
            storage,
            coins,
            stars,
            deadline: None,
        }
    }

    pub fn coins(&self) -> u64 {
        self.coins
    }

    pub fn stars(&self) -> u64 {
        self.stars
    }

    pub fn is_dirty(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn add_coins(&mut self, count: u64, now_ms: f64) {
        self.coins = self.coins.saturating_add(count);
        self.touch(now_ms);
    }

    pub fn add_stars(&mut self, count: u64, now_ms: f64) {
        self.stars = self.stars.saturating_add(count);
        self.touch(now_ms);
    }

    fn touch(&mut self, now_ms: f64) {
        self.deadline = Some(now_ms + SAVE_DEBOUNCE_MS);
    }

    /// Write pending changes if the debounce window has elapsed.
    /// Returns true if a write was attempted.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.flush();
                true
            }
            _ => false,
        }
    }

    /// Write pending changes now. Failures are logged and dropped.
    pub fn flush(&mut self) {
        if self.deadline.take().is_none() {
            return;
        }
        if let Err(e) = self.write() {
            log::warn!("Failed to save wallet: {}", e);
        }
    }

    fn write(&self) -> Result<(), StorageError> {
        self.storage.set(COINS_KEY, &self.coins.to_string())?;
        self.storage.set(STARS_KEY, &self.stars.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::persistence::{MemoryStorage, Storage};

    fn wallet() -> (MemoryStorage, Wallet) {
        let mem = MemoryStorage::new();
        let wallet = Wallet::load(Rc::new(mem.clone()));
        (mem, wallet)
    }

    #[test]
    fn test_loads_tolerantly() {
        let mem = MemoryStorage::new();
        mem.set(COINS_KEY, "120").unwrap();
        mem.set(STARS_KEY, "-3").unwrap();
        let wallet = Wallet::load(Rc::new(mem));
        assert_eq!(wallet.coins(), 120);
        assert_eq!(wallet.stars(), 0);
    }

    #[test]
    fn test_debounced_write() {
        let (mem, mut wallet) = wallet();
        wallet.add_coins(1, 1000.0);
        assert!(!wallet.poll(1200.0));
        // Another change pushes the deadline out
        wallet.add_coins(1, 1400.0);
        assert!(!wallet.poll(1600.0));
        assert!(mem.get(COINS_KEY).is_none());

        assert!(wallet.poll(1900.0));
        assert_eq!(mem.get(COINS_KEY).as_deref(), Some("2"));
        assert!(!wallet.is_dirty());
        assert!(!wallet.poll(5000.0));
    }

    #[test]
    fn test_flush_writes_immediately() {
        let (mem, mut wallet) = wallet();
        wallet.add_stars(3, 0.0);
        wallet.flush();
        assert_eq!(mem.get(STARS_KEY).as_deref(), Some("3"));
        assert_eq!(mem.get(COINS_KEY).as_deref(), Some("0"));
    }

    #[test]
    fn test_failed_write_is_dropped() {
        let mem = MemoryStorage::with_quota(4);
        let mut wallet = Wallet::load(Rc::new(mem.clone()));
        wallet.add_coins(5, 0.0);
        wallet.flush();
        assert!(!wallet.is_dirty());
        assert_eq!(wallet.coins(), 5);
        assert!(mem.is_empty());
    }
}
