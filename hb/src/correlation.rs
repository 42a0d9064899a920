//! Correlation id generation
//!
//! Ids are derived from a wall-clock seed scaled below millisecond resolution
//! plus a repeat counter for calls landing on the same seed. Each generator
//! owns its state; two mediators never share a counter.

use std::sync::Mutex;

use tracing::debug;

use crate::message::CorrelationId;

/// Seed units per millisecond
const SEED_SCALE: u64 = 100;

/// Decimal digits kept from the seed; fits the 53-bit integer range of JavaScript peers
pub const ID_DIGITS: u32 = 15;

const ID_MODULUS: u64 = 10u64.pow(ID_DIGITS);

/// Source of wall-clock time
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[derive(Debug, Default)]
struct GeneratorState {
    last_seed: u64,
    repeat: u64,
    last_issued: u64,
}

/// Produces locally unique, strictly increasing correlation ids
pub struct CorrelationIdGenerator {
    clock: Box<dyn Clock>,
    state: Mutex<GeneratorState>,
}

impl CorrelationIdGenerator {
    /// Create a generator reading the system clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Create a generator reading a custom clock
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            state: Mutex::new(GeneratorState::default()),
        }
    }

    /// Next id
    ///
    /// Back-to-back calls never return the same value, even when the clock has
    /// not advanced or has stepped backwards.
    pub fn next(&self) -> CorrelationId {
        let seed = self.clock.now_millis().max(0) as u64 * SEED_SCALE;

        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if seed == state.last_seed {
            state.repeat += 1;
        } else {
            state.repeat = 0;
            state.last_seed = seed;
        }

        let mut candidate = seed + state.repeat;
        if candidate <= state.last_issued {
            candidate = state.last_issued + 1;
        }
        state.last_issued = candidate;

        let id = candidate % ID_MODULUS;
        debug!(id, repeat = state.repeat, "CorrelationIdGenerator::next: issued");
        id
    }
}

impl Default for CorrelationIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CorrelationIdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorrelationIdGenerator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Clock that only moves when told to
    #[derive(Clone, Default)]
    struct ManualClock(Arc<AtomicI64>);

    impl ManualClock {
        fn at(millis: i64) -> Self {
            Self(Arc::new(AtomicI64::new(millis)))
        }

        fn set(&self, millis: i64) {
            self.0.store(millis, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> i64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn test_back_to_back_ids_differ_on_frozen_clock() {
        let generator = CorrelationIdGenerator::with_clock(ManualClock::at(1_700_000_000_000));

        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generator.next()));
        }
    }

    #[test]
    fn test_system_clock_tight_loop_distinct() {
        let generator = CorrelationIdGenerator::new();
        let mut previous = generator.next();
        for _ in 0..1000 {
            let next = generator.next();
            assert_ne!(next, previous);
            previous = next;
        }
    }

    #[test]
    fn test_repeat_folds_into_seed() {
        let generator = CorrelationIdGenerator::with_clock(ManualClock::at(5));
        assert_eq!(generator.next(), 500);
        assert_eq!(generator.next(), 501);
        assert_eq!(generator.next(), 502);
    }

    #[test]
    fn test_repeat_resets_when_clock_advances() {
        let clock = ManualClock::at(5);
        let generator = CorrelationIdGenerator::with_clock(clock.clone());
        generator.next();
        generator.next();

        clock.set(6);
        assert_eq!(generator.next(), 600);
    }

    #[test]
    fn test_burst_does_not_collide_with_next_millisecond() {
        let clock = ManualClock::at(5);
        let generator = CorrelationIdGenerator::with_clock(clock.clone());

        let mut seen = HashSet::new();
        for _ in 0..250 {
            assert!(seen.insert(generator.next()));
        }

        clock.set(6);
        for _ in 0..10 {
            assert!(seen.insert(generator.next()));
        }
    }

    #[test]
    fn test_clock_stepping_backwards_stays_increasing() {
        let clock = ManualClock::at(1_000);
        let generator = CorrelationIdGenerator::with_clock(clock.clone());
        let before = generator.next();

        clock.set(900);
        let after = generator.next();
        assert!(after > before);
    }

    #[test]
    fn test_ids_are_truncated_to_fixed_width() {
        let generator = CorrelationIdGenerator::with_clock(ManualClock::at(i64::MAX / 1000));
        let id = generator.next();
        assert!(id < ID_MODULUS);
    }

    #[test]
    fn test_concurrent_callers_get_distinct_ids() {
        let generator = Arc::new(CorrelationIdGenerator::with_clock(ManualClock::at(42)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let generator = generator.clone();
                std::thread::spawn(move || (0..500).map(|_| generator.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {}", id);
            }
        }
        assert_eq!(seen.len(), 4000);
    }
}
