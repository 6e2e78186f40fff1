//! Two-generation bloom filter for recently seen transaction ids.
//!
//! Each generation is sized for `tps * cycle_secs` keys at the configured
//! false-positive rate. Queries check both generations; inserts go to the
//! current one. The caller rotates once per cycle, so a key stays visible
//! for at least one and at most two cycles.
//!
//! All operations take one `parking_lot::Mutex`, so concurrent callers
//! see each insert, query and rotation as atomic.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;

/// Largest key count one generation may be sized for.
pub const MAX_EXPECTED_ITEMS: u64 = 1 << 31;

/// Largest bit array one generation may allocate (2 GiB).
pub const MAX_FILTER_BITS: u64 = 1 << 34;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterConfigError {
    #[error("tps {tps} * cycle_secs {cycle_secs} overflows")]
    CapacityOverflow { tps: u64, cycle_secs: u64 },
    #[error("filter must be sized for at least one key")]
    ZeroCapacity,
    #[error("filter sized for {items} keys, at most {max} allowed", max = MAX_EXPECTED_ITEMS)]
    CapacityTooLarge { items: u64 },
    #[error("false_positive_rate must be strictly between 0 and 1, got {0}")]
    InvalidRate(f64),
    #[error("filter needs {bits} bits, at most {max} allowed", max = MAX_FILTER_BITS)]
    TooManyBits { bits: u64 },
}

/// Filter sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DuplicateFilterConfig {
    /// Expected transactions per second.
    pub tps: u64,
    /// Rotation period in seconds.
    pub cycle_secs: u64,
    pub false_positive_rate: f64,
}

impl Default for DuplicateFilterConfig {
    fn default() -> Self {
        Self {
            tps: 1000,
            cycle_secs: 2 * 24 * 60 * 60,
            false_positive_rate: 0.01,
        }
    }
}

impl DuplicateFilterConfig {
    /// Keys one generation is sized for.
    pub fn expected_items(&self) -> Result<u64, FilterConfigError> {
        let items = self
            .tps
            .checked_mul(self.cycle_secs)
            .ok_or(FilterConfigError::CapacityOverflow {
                tps: self.tps,
                cycle_secs: self.cycle_secs,
            })?;
        match items {
            0 => Err(FilterConfigError::ZeroCapacity),
            n if n > MAX_EXPECTED_ITEMS => Err(FilterConfigError::CapacityTooLarge { items: n }),
            n => Ok(n),
        }
    }

    /// Check the sizing without allocating anything.
    pub fn validate(&self) -> Result<(), FilterConfigError> {
        let items = self.expected_items()?;
        BloomFilter::dimensions(items, self.false_positive_rate).map(|_| ())
    }
}

/// A fixed-size bloom filter over byte keys, double-hashed from SHA-256.
#[derive(Debug, Clone)]
pub struct BloomFilter {
    bits: Vec<u64>,
    num_bits: u64,
    num_hashes: u32,
}

impl BloomFilter {
    /// Size for `expected_items` keys at false-positive rate `fpp`.
    pub fn with_rate(expected_items: u64, fpp: f64) -> Result<Self, FilterConfigError> {
        let (num_bits, num_hashes) = Self::dimensions(expected_items, fpp)?;
        let words = num_bits.div_ceil(64) as usize;
        Ok(Self {
            bits: vec![0; words],
            num_bits,
            num_hashes,
        })
    }

    /// Bit count and hash count: m = -n ln p / ln2^2, k = m/n ln2.
    fn dimensions(expected_items: u64, fpp: f64) -> Result<(u64, u32), FilterConfigError> {
        if !(fpp > 0.0 && fpp < 1.0) {
            return Err(FilterConfigError::InvalidRate(fpp));
        }
        if expected_items == 0 {
            return Err(FilterConfigError::ZeroCapacity);
        }
        if expected_items > MAX_EXPECTED_ITEMS {
            return Err(FilterConfigError::CapacityTooLarge { items: expected_items });
        }
        let n = expected_items as f64;
        let ln2 = std::f64::consts::LN_2;
        let bits = ((-n * fpp.ln()) / (ln2 * ln2)).ceil().max(64.0);
        if bits > MAX_FILTER_BITS as f64 {
            return Err(FilterConfigError::TooManyBits {
                bits: bits.min(u64::MAX as f64) as u64,
            });
        }
        let num_bits = bits as u64;
        let num_hashes = ((num_bits as f64 / n) * ln2).round().clamp(1.0, 30.0) as u32;
        Ok((num_bits, num_hashes))
    }

    /// Empty filter with the same dimensions.
    fn cleared(&self) -> Self {
        Self {
            bits: vec![0; self.bits.len()],
            num_bits: self.num_bits,
            num_hashes: self.num_hashes,
        }
    }

    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    fn positions(&self, key: &[u8]) -> impl Iterator<Item = u64> + '_ {
        let digest = Sha256::digest(key);
        let mut h1 = [0u8; 8];
        let mut h2 = [0u8; 8];
        h1.copy_from_slice(&digest[0..8]);
        h2.copy_from_slice(&digest[8..16]);
        let h1 = u64::from_le_bytes(h1);
        let h2 = u64::from_le_bytes(h2) | 1;
        (0..u64::from(self.num_hashes))
            .map(move |i| h1.wrapping_add(i.wrapping_mul(h2)) % self.num_bits)
    }

    pub fn insert(&mut self, key: &[u8]) {
        let positions: Vec<u64> = self.positions(key).collect();
        for pos in positions {
            self.bits[(pos / 64) as usize] |= 1u64 << (pos % 64);
        }
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.positions(key)
            .all(|pos| self.bits[(pos / 64) as usize] & (1u64 << (pos % 64)) != 0)
    }
}

struct Generations {
    current: BloomFilter,
    previous: BloomFilter,
}

/// Recently-seen set with bounded memory. No false negatives within a
/// generation; keys age out after two rotations.
pub struct DuplicateFilter {
    config: DuplicateFilterConfig,
    inner: Mutex<Generations>,
}

impl DuplicateFilter {
    pub fn new(config: DuplicateFilterConfig) -> Result<Self, FilterConfigError> {
        let fresh = Self::fresh(&config)?;
        Ok(Self {
            inner: Mutex::new(Generations {
                current: fresh.clone(),
                previous: fresh,
            }),
            config,
        })
    }

    fn fresh(config: &DuplicateFilterConfig) -> Result<BloomFilter, FilterConfigError> {
        BloomFilter::with_rate(config.expected_items()?, config.false_positive_rate)
    }

    pub fn config(&self) -> &DuplicateFilterConfig {
        &self.config
    }

    /// True if `key` is probably in either generation.
    pub fn might_contain(&self, key: &[u8]) -> bool {
        let g = self.inner.lock();
        g.current.contains(key) || g.previous.contains(key)
    }

    /// Insert into the current generation.
    pub fn put(&self, key: &[u8]) {
        self.inner.lock().current.insert(key);
    }

    /// Retire the previous generation, demote the current one, and start
    /// a fresh current generation.
    pub fn rotate(&self) {
        let mut g = self.inner.lock();
        let fresh = g.current.cleared();
        g.previous = std::mem::replace(&mut g.current, fresh);
        info!(
            bits = g.current.num_bits(),
            hashes = g.current.num_hashes(),
            "duplicate filter rotated"
        );
    }
}
