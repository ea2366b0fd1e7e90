//! Deterministic utilities for reproducible training
//!
//! Provides an LCG-based RNG, seed mixing for per-tree streams and a seeded
//! train/holdout split, so that the same data and seed always produce the
//! same ensemble.

use std::num::Wrapping;

/// 64-bit linear congruential generator (Knuth MMIX constants)
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: Wrapping<u64>,
}

impl LcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        let mut rng = Self {
            state: Wrapping(mix_seed(seed, 0)),
        };
        rng.next_u32();
        rng
    }

    /// Next 32 random bits (high half of the state)
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state * Wrapping(Self::MULTIPLIER) + Wrapping(Self::INCREMENT);
        (self.state.0 >> 32) as u32
    }

    /// Uniform value in `[0, max)`; 0 when `max` is 0
    pub fn next_range(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        ((self.next_u32() as u64 * max as u64) >> 32) as usize
    }

    /// Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_range(i + 1);
            items.swap(i, j);
        }
    }

    /// Random permutation of `0..n`
    pub fn permutation(&mut self, n: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..n).collect();
        self.shuffle(&mut indices);
        indices
    }
}

/// Derive an independent seed for stream `stream` of a base seed
pub fn mix_seed(seed: u64, stream: u64) -> u64 {
    const PRIME1: u64 = 0x9E3779B185EBCA87;
    const PRIME2: u64 = 0xC2B2AE3D27D4EB4F;
    const PRIME3: u64 = 0x165667B19E3779F9;

    let mut h = seed.wrapping_add(PRIME3);
    h = h.wrapping_add(stream.wrapping_mul(PRIME1));
    h = h.rotate_left(31).wrapping_mul(PRIME2);

    h ^= h >> 33;
    h = h.wrapping_mul(PRIME1);
    h ^= h >> 29;
    h = h.wrapping_mul(PRIME2);
    h ^= h >> 32;

    h
}

/// Row indices of the train and holdout partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Seeded shuffle split; the holdout gets `ceil(n * test_ratio)` rows
pub fn train_test_split(n: usize, test_ratio: f64, seed: u64) -> Split {
    let mut rng = LcgRng::new(seed);
    let order = rng.permutation(n);

    let test_len = ((n as f64) * test_ratio).ceil() as usize;
    let test_len = test_len.min(n);

    let (test, train) = order.split_at(test_len);
    Split {
        train: train.to_vec(),
        test: test.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcg_determinism() {
        let mut rng1 = LcgRng::new(42);
        let mut rng2 = LcgRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_lcg_seeds_differ() {
        let a: Vec<u32> = {
            let mut rng = LcgRng::new(1);
            (0..8).map(|_| rng.next_u32()).collect()
        };
        let b: Vec<u32> = {
            let mut rng = LcgRng::new(2);
            (0..8).map(|_| rng.next_u32()).collect()
        };
        assert_ne!(a, b);
    }

    #[test]
    fn test_lcg_range() {
        let mut rng = LcgRng::new(42);
        let mut seen = [false; 10];
        for _ in 0..1000 {
            let val = rng.next_range(10);
            assert!(val < 10);
            seen[val] = true;
        }
        assert!(seen.iter().all(|s| *s));
        assert_eq!(rng.next_range(0), 0);
    }

    #[test]
    fn test_permutation_is_complete() {
        let mut rng = LcgRng::new(7);
        let mut perm = rng.permutation(50);
        perm.sort_unstable();
        assert_eq!(perm, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_mix_seed_streams() {
        assert_eq!(mix_seed(42, 3), mix_seed(42, 3));
        assert_ne!(mix_seed(42, 3), mix_seed(42, 4));
        assert_ne!(mix_seed(42, 3), mix_seed(43, 3));
    }

    #[test]
    fn test_split_sizes_and_determinism() {
        let split = train_test_split(101, 0.2, 42);
        assert_eq!(split.test.len(), 21);
        assert_eq!(split.train.len(), 80);
        assert_eq!(split, train_test_split(101, 0.2, 42));
        assert_ne!(split, train_test_split(101, 0.2, 43));

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..101).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_small() {
        let split = train_test_split(5, 0.2, 42);
        assert_eq!(split.test.len(), 1);
        assert_eq!(split.train.len(), 4);
    }
}
