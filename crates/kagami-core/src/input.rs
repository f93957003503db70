use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Rising-edge detector for key-state samples
///
/// A command fires on a released->pressed transition, at most once per
/// `min_interval`. Event-driven hotkeys and polled key states both feed it,
/// so a key seen by both paths still fires once.
pub struct CommandEdges<K> {
    prev: HashMap<K, bool>,
    last_fire: HashMap<K, Instant>,
    min_interval: Duration,
}

impl<K: Eq + Hash + Copy> CommandEdges<K> {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            prev: HashMap::new(),
            last_fire: HashMap::new(),
            min_interval,
        }
    }

    /// Record a sample; returns true if the command should fire now
    pub fn sample(&mut self, key: K, down: bool, now: Instant) -> bool {
        let before = self.prev.insert(key, down).unwrap_or(false);
        if !down || before {
            return false;
        }
        if let Some(last) = self.last_fire.get(&key) {
            if now.saturating_duration_since(*last) < self.min_interval {
                return false;
            }
        }
        self.last_fire.insert(key, now);
        true
    }
}
