//! Placeholder "analysis" randomness.
//!
//! Forecast rain and disease health are coin flips, not model output. Handlers
//! take the source as a dependency so tests can pin the outcome.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Probability that a forecast day has rain.
pub const RAIN_PROBABILITY: f64 = 0.3;

/// A disease analysis reports healthy when the draw exceeds this.
pub const HEALTHY_THRESHOLD: f64 = 0.5;

pub trait RandomSource: Send + Sync {
    /// Uniform draw in `[0, 1)`.
    fn next_f64(&self) -> f64;

    fn rain(&self) -> bool {
        self.next_f64() < RAIN_PROBABILITY
    }

    fn healthy(&self) -> bool {
        self.next_f64() > HEALTHY_THRESHOLD
    }
}

/// Unseeded source backed by the OS generator (via random v4 UUIDs).
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn next_f64(&self) -> f64 {
        // The low 53 bits of a v4 UUID are all random (version and variant
        // bits sit higher up).
        let bits = uuid::Uuid::new_v4().as_u128() as u64 & ((1u64 << 53) - 1);
        bits as f64 / (1u64 << 53) as f64
    }
}

/// Deterministic source that cycles through a fixed list of draws.
#[derive(Debug)]
pub struct SequenceRandom {
    values: Vec<f64>,
    cursor: AtomicUsize,
}

impl SequenceRandom {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.values[i % self.values.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_random_in_unit_interval() {
        let source = OsRandom;
        for _ in 0..1000 {
            let v = source.next_f64();
            assert!((0.0..1.0).contains(&v), "draw out of range: {}", v);
        }
    }

    #[test]
    fn test_sequence_cycles() {
        let source = SequenceRandom::new(vec![0.1, 0.9]);
        assert_eq!(source.next_f64(), 0.1);
        assert_eq!(source.next_f64(), 0.9);
        assert_eq!(source.next_f64(), 0.1);
    }

    #[test]
    fn test_thresholds() {
        let source = SequenceRandom::new(vec![0.29, 0.3, 0.5, 0.51]);
        assert!(source.rain());
        assert!(!source.rain());
        assert!(!source.healthy());
        assert!(source.healthy());
    }

    #[test]
    fn test_empty_sequence_is_zero() {
        let source = SequenceRandom::new(Vec::new());
        assert_eq!(source.next_f64(), 0.0);
        assert!(source.rain());
    }
}
