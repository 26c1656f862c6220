/// EncounterClock: hidden step counter toward the next random encounter.
///
/// The counter only goes up through `reseed`, which draws uniformly from a
/// half-open range whose lower bound is at least 1.

use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

pub const DEFAULT_RANGE: Range<u32> = 5..64;

#[derive(Debug)]
pub struct EncounterClock {
    rng: StdRng,
    range: Range<u32>,
    remaining: u32,
}

impl EncounterClock {
    /// An unusable range (empty, or reaching down to zero) falls back to
    /// `DEFAULT_RANGE`.
    pub fn new(range: Range<u32>, rng: StdRng) -> Self {
        let range = if range.start == 0 || range.end <= range.start {
            warn!(start = range.start, end = range.end, "encounter_range_invalid_using_default");
            DEFAULT_RANGE
        } else {
            range
        };
        EncounterClock { rng, range, remaining: 0 }
    }

    /// Seeded when `seed` is given, otherwise drawn from the OS.
    pub fn from_seed(range: Range<u32>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        EncounterClock::new(range, rng)
    }

    pub fn reseed(&mut self) {
        self.remaining = self.rng.random_range(self.range.clone());
    }

    /// Count one step down and return what is left. Stays at zero.
    pub fn tick(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    pub fn current(&self) -> u32 {
        self.remaining
    }

    pub fn range(&self) -> Range<u32> {
        self.range.clone()
    }

    #[cfg(test)]
    pub(crate) fn set_remaining(&mut self, n: u32) {
        self.remaining = n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(seed: u64) -> EncounterClock {
        EncounterClock::new(DEFAULT_RANGE, StdRng::seed_from_u64(seed))
    }

    #[test]
    fn reseed_stays_in_range() {
        let mut c = clock(7);
        for _ in 0..1000 {
            c.reseed();
            assert!((5..64).contains(&c.current()), "got {}", c.current());
        }
    }

    #[test]
    fn tick_counts_down_by_one_to_zero() {
        let mut c = clock(11);
        c.reseed();
        let start = c.current();
        for expected in (0..start).rev() {
            assert_eq!(c.tick(), expected);
        }
        assert_eq!(c.current(), 0);
        assert_eq!(c.tick(), 0);
        c.reseed();
        assert!(c.current() >= 5);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = clock(42);
        let mut b = clock(42);
        for _ in 0..20 {
            a.reseed();
            b.reseed();
            assert_eq!(a.current(), b.current());
        }
    }

    #[test]
    fn invalid_range_falls_back() {
        let c = EncounterClock::new(0..10, StdRng::seed_from_u64(1));
        assert_eq!(c.range(), DEFAULT_RANGE);
        #[allow(clippy::reversed_empty_ranges)]
        let c = EncounterClock::new(9..3, StdRng::seed_from_u64(1));
        assert_eq!(c.range(), DEFAULT_RANGE);
    }

    #[test]
    fn custom_range() {
        let mut c = EncounterClock::from_seed(2..3, Some(5));
        c.reseed();
        assert_eq!(c.current(), 2);
    }
}
