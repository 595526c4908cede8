//! Deterministic 64-bit bit engines.
//!
//! Every higher layer of this crate consumes randomness exclusively through
//! [`BitEngine::next`]. Two engines are provided:
//!
//! - [`Lcprng`]: linear congruential generator with Knuth's MMIX constants.
//!   Invertible, so the sequence can be walked backwards with
//!   [`Lcprng::prev`].
//! - [`XorShift`]: Marsaglia's xorshift64 shift-register generator.
//!
//! # Concurrency
//!
//! The state is a single `u64` behind a [`Mutex`]. Every state-touching
//! call locks for exactly one read-modify-write, so one engine can be shared
//! by reference across threads. Concurrent callers observe some interleaving
//! of one deterministic sequence; determinism is per sequence, not per
//! caller.
//!
//! # Reproducibility
//!
//! Seeding with the same explicit value reproduces the same sequence
//! bit-for-bit on every platform:
//!
//! ```
//! use u_variate::{BitEngine, Lcprng};
//!
//! let a = Lcprng::with_seed(42);
//! let b = Lcprng::with_seed(42);
//! assert_eq!(a.next(), b.next());
//! ```

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng, TryRngCore};
use tracing::{debug, warn};

/// LCG multiplier `a` (Knuth, MMIX).
pub const MULTIPLIER: u64 = 0x5851_f42d_4c95_7f2d;

/// LCG increment `c` (Knuth, MMIX).
pub const INCREMENT: u64 = 0x1405_7b7e_f767_814f;

/// Multiplicative inverse of [`MULTIPLIER`] modulo 2⁶⁴.
pub const INVERSE_MULTIPLIER: u64 = 0xc097_ef87_329e_28a5;

/// Inverse increment `d = −b·c (mod 2⁶⁴)`.
pub const INVERSE_INCREMENT: u64 = 0x9995_b5b6_2153_5015;

/// Source of raw 64-bit words.
///
/// Implementors must be safe to share between threads; all derived
/// operations (see [`UniformReduction`](crate::UniformReduction)) take the
/// engine by shared reference.
pub trait BitEngine: Send + Sync {
    /// Advances the state and returns the new 64-bit value.
    fn next(&self) -> u64;
}

impl<T: BitEngine + ?Sized> BitEngine for &T {
    #[inline]
    fn next(&self) -> u64 {
        (**self).next()
    }
}

impl<T: BitEngine + ?Sized> BitEngine for Box<T> {
    #[inline]
    fn next(&self) -> u64 {
        (**self).next()
    }
}

impl<T: BitEngine + ?Sized> BitEngine for std::sync::Arc<T> {
    #[inline]
    fn next(&self) -> u64 {
        (**self).next()
    }
}

/// Marsaglia's xorshift64 diffusion step (13, 7, 17).
///
/// Zero is its only fixed point.
///
/// # Examples
/// ```
/// use u_variate::engine::xorshift64;
/// assert_eq!(xorshift64(0), 0);
/// assert_eq!(xorshift64(1), 0x4082_2041);
/// ```
#[inline]
pub fn xorshift64(mut x: u64) -> u64 {
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x
}

/// Folds an explicit seed list into one state: `s = xorshift64(s) ^ seed`.
///
/// Starting from zero, a single seed `s` folds to `s` itself. Distinct lists
/// fold to distinct states with high probability.
///
/// # Examples
/// ```
/// use u_variate::engine::fold_seeds;
/// assert_eq!(fold_seeds(&[42]), 42);
/// assert_ne!(fold_seeds(&[1, 2]), fold_seeds(&[2, 1]));
/// ```
pub fn fold_seeds(seeds: &[u64]) -> u64 {
    seeds
        .iter()
        .fold(0, |state, &seed| xorshift64(state) ^ seed)
}

/// 2-adic multiplicative inverse: `o · r ≡ 1 (mod 2⁶⁴)`.
///
/// Trailing zero bits of `o` are trimmed first, so every non-zero input
/// has an answer. Returns 0 for 0.
///
/// # Algorithm
/// Bit-by-bit Hensel lifting: bit `i` of `r` is set whenever the low
/// `i + 1` bits of `o · r` differ from 1.
///
/// # Examples
/// ```
/// use u_variate::engine::{mul_inv64, MULTIPLIER, INVERSE_MULTIPLIER};
/// assert_eq!(mul_inv64(MULTIPLIER), INVERSE_MULTIPLIER);
/// assert_eq!(MULTIPLIER.wrapping_mul(INVERSE_MULTIPLIER), 1);
/// ```
pub fn mul_inv64(o: u64) -> u64 {
    if o == 0 {
        return 0;
    }
    let o = o >> o.trailing_zeros();
    let mut r = 0u64;
    let mut mask = 0u64;
    for bit in 0..64 {
        let b = 1u64 << bit;
        mask |= b;
        if o.wrapping_mul(r) & mask != 1 {
            r |= b;
        }
    }
    r
}

/// Seed derived from the system clock mixed with OS entropy.
///
/// Falls back to the clock alone when the OS source fails.
pub(crate) fn entropy_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    let mut seed = xorshift64(nanos);
    match OsRng.try_next_u64() {
        Ok(bits) => seed ^= bits,
        Err(err) => warn!(%err, "OS entropy unavailable, seeding from system time only"),
    }
    seed
}

fn lock(state: &Mutex<u64>) -> MutexGuard<'_, u64> {
    // A poisoned lock still guards a valid u64.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Linear congruential engine
// ============================================================================

/// Linear congruential pseudo-random engine.
///
/// ```text
/// next: s ← s·a + c   (mod 2⁶⁴)
/// prev: s ← s·b + d   (mod 2⁶⁴),  b = a⁻¹, d = −b·c
/// ```
///
/// Full period 2⁶⁴. Not cryptographically secure: the state is the output.
///
/// # Examples
/// ```
/// use u_variate::{BitEngine, Lcprng};
///
/// let rng = Lcprng::with_seed(7);
/// let x = rng.next();
/// assert_eq!(rng.prev(), 7);
/// assert_eq!(rng.next(), x);
/// ```
pub struct Lcprng {
    state: Mutex<u64>,
}

impl Lcprng {
    /// Creates an engine seeded from system time and OS entropy.
    pub fn new() -> Self {
        let rng = Self::with_seed(0);
        rng.randomize(&[]);
        rng
    }

    /// Creates an engine whose raw state is exactly `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: Mutex::new(seed),
        }
    }

    /// Creates an engine from a folded seed list (see [`fold_seeds`]).
    pub fn from_seeds(seeds: &[u64]) -> Self {
        Self::with_seed(fold_seeds(seeds))
    }

    /// Current state.
    pub fn seed(&self) -> u64 {
        *lock(&self.state)
    }

    /// Re-initializes the state and returns it.
    ///
    /// An empty slice seeds from system time and OS entropy; otherwise the
    /// seeds are folded with [`fold_seeds`].
    pub fn randomize(&self, seeds: &[u64]) -> u64 {
        let seed = if seeds.is_empty() {
            entropy_seed()
        } else {
            fold_seeds(seeds)
        };
        *lock(&self.state) = seed;
        debug!(seed, explicit = !seeds.is_empty(), "lcprng randomized");
        seed
    }

    /// Steps the sequence backwards and returns the new state.
    ///
    /// `prev` undoes exactly one `next`, and vice versa.
    pub fn prev(&self) -> u64 {
        let mut state = lock(&self.state);
        *state = state
            .wrapping_mul(INVERSE_MULTIPLIER)
            .wrapping_add(INVERSE_INCREMENT);
        *state
    }
}

impl BitEngine for Lcprng {
    #[inline]
    fn next(&self) -> u64 {
        let mut state = lock(&self.state);
        *state = state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        *state
    }
}

impl Default for Lcprng {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot: the clone continues from the same state independently.
impl Clone for Lcprng {
    fn clone(&self) -> Self {
        Self::with_seed(self.seed())
    }
}

impl std::fmt::Debug for Lcprng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lcprng").field("seed", &self.seed()).finish()
    }
}

impl RngCore for Lcprng {
    fn next_u32(&mut self) -> u32 {
        (BitEngine::next(&*self) >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        BitEngine::next(&*self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        rand::rand_core::impls::fill_bytes_via_next(self, dst)
    }
}

/// The 8 seed bytes are read little-endian as the raw state.
impl SeedableRng for Lcprng {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::with_seed(u64::from_le_bytes(seed))
    }
}

// ============================================================================
// Xorshift engine
// ============================================================================

/// Marsaglia xorshift64 engine.
///
/// Period 2⁶⁴ − 1 over non-zero states. If the state is ever zero (only
/// reachable by seeding with zero) the next call re-seeds from entropy.
pub struct XorShift {
    state: Mutex<u64>,
}

impl XorShift {
    /// Creates an engine seeded from system time and OS entropy.
    pub fn new() -> Self {
        Self::with_seed(entropy_seed())
    }

    /// Creates an engine whose raw state is exactly `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: Mutex::new(seed),
        }
    }

    /// Current state.
    pub fn seed(&self) -> u64 {
        *lock(&self.state)
    }

    /// Re-initializes the state and returns it.
    ///
    /// An empty slice advances the engine once and keeps that value.
    pub fn randomize(&self, seeds: &[u64]) -> u64 {
        let seed = if seeds.is_empty() {
            self.next()
        } else {
            fold_seeds(seeds)
        };
        *lock(&self.state) = seed;
        debug!(seed, explicit = !seeds.is_empty(), "xorshift randomized");
        seed
    }
}

impl BitEngine for XorShift {
    fn next(&self) -> u64 {
        let mut state = lock(&self.state);
        *state = xorshift64(*state);
        while *state == 0 {
            *state = entropy_seed();
        }
        *state
    }
}

impl Default for XorShift {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for XorShift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XorShift").field("seed", &self.seed()).finish()
    }
}

impl RngCore for XorShift {
    fn next_u32(&mut self) -> u32 {
        (BitEngine::next(&*self) >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        BitEngine::next(&*self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        rand::rand_core::impls::fill_bytes_via_next(self, dst)
    }
}

// ============================================================================
// Process-wide default instance
// ============================================================================

static SHARED: OnceLock<Lcprng> = OnceLock::new();

/// Process-wide engine, entropy-seeded on first use.
///
/// Convenience for call sites that do not thread an engine through;
/// library code in this crate never touches it implicitly.
///
/// # Examples
/// ```
/// use u_variate::{engine, UniformReduction};
/// let die = engine::shared().int(1, 6);
/// assert!((1..=6).contains(&die));
/// ```
pub fn shared() -> &'static Lcprng {
    SHARED.get_or_init(Lcprng::new)
}

// ============================================================================
// Tests
// ============================================================================


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn next_then_prev_is_identity(seed in any::<u64>()) {
            let rng = Lcprng::with_seed(seed);
            rng.next();
            prop_assert_eq!(rng.prev(), seed);
        }

        #[test]
        fn prev_then_next_is_identity(seed in any::<u64>()) {
            let rng = Lcprng::with_seed(seed);
            rng.prev();
            prop_assert_eq!(rng.next(), seed);
        }

        #[test]
        fn same_seed_same_stream(seed in any::<u64>(), len in 1_usize..64) {
            let a = Lcprng::with_seed(seed);
            let b = Lcprng::with_seed(seed);
            for _ in 0..len {
                prop_assert_eq!(a.next(), b.next());
            }
        }

        #[test]
        fn mul_inv64_of_odd_is_inverse(x in any::<u64>()) {
            let odd = x | 1;
            prop_assert_eq!(odd.wrapping_mul(mul_inv64(odd)), 1);
        }
    }
}
