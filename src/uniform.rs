//! Range reduction from raw 64-bit words to bounded values.
//!
//! [`UniformReduction`] is blanket-implemented for every
//! [`BitEngine`], so any engine (or reference to one) gains these methods.
//!
//! # Algorithms
//!
//! - **Bounded integers**: rejection on the stride `f = ⌊2⁶⁴ / (n+1)⌋`;
//!   a draw `x` is accepted when `x / f < n + 1`. The rejection probability
//!   is `(2⁶⁴ mod (n+1)) / 2⁶⁴`, so the expected number of draws is below 2
//!   for every `n` and essentially 1 for small `n`.
//! - **Unit floats**: the top 53 bits scaled by 2⁻⁵³, redrawn while zero,
//!   giving values in (0, 1).
//!
//! # References
//!
//! - Lemire (2019), "Fast random integer generation in an interval"
//! - Knuth, TAOCP Vol. 2, §3.4.2 (selection sampling)

use std::f64::consts::TAU;

use crate::engine::BitEngine;

/// 2⁻⁵³, the resolution of [`UniformReduction::unit`].
const UNIT_SCALE: f64 = 1.0 / (1u64 << 53) as f64;

/// Bit tested by [`UniformReduction::flip`].
const FLIP_BIT: u64 = 1 << 37;

/// Unbiased bounded values derived from [`BitEngine::next`].
///
/// # Examples
/// ```
/// use u_variate::{Lcprng, UniformReduction};
///
/// let rng = Lcprng::with_seed(42);
/// let die = rng.int(1, 6);
/// assert!((1..=6).contains(&die));
/// let idx = rng.choice(52);
/// assert!((0..52).contains(&idx));
/// ```
pub trait UniformReduction: BitEngine {
    /// Uniform integer in `[0, n]`, without modulo bias.
    ///
    /// `limited(0)` is 0 without consuming a draw; `limited(u64::MAX)`
    /// returns one raw word.
    fn limited(&self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        let Some(span) = n.checked_add(1) else {
            return self.next();
        };
        let stride = span.wrapping_neg() / span + 1;
        loop {
            let draw = self.next() / stride;
            if draw < span {
                return draw;
            }
        }
    }

    /// Uniform integer in the closed range `[m, n]` (bounds auto-swapped).
    fn int(&self, m: i64, n: i64) -> i64 {
        let (lo, hi) = if m > n { (n, m) } else { (m, n) };
        lo.wrapping_add(self.limited(hi.wrapping_sub(lo) as u64) as i64)
    }

    /// Signed index choice.
    ///
    /// - `n > 1`: uniform in `[0, n)`
    /// - `n == 1`: 0, `n == 0`: −1 (empty population), without drawing
    /// - `n < 0`: uniform in `[n, −1]`
    fn choice(&self, n: i64) -> i64 {
        if n > 1 {
            self.limited((n - 1) as u64) as i64
        } else if n < 0 {
            -(self.limited(n.unsigned_abs() - 1) as i64) - 1
        } else {
            n - 1
        }
    }

    /// Fair coin from a single raw draw.
    fn flip(&self) -> bool {
        self.next() & FLIP_BIT != 0
    }

    /// True with probability `k / n`.
    ///
    /// False when `n <= 0` or `k <= 0`; true when `n <= k`.
    fn choose(&self, n: i64, k: i64) -> bool {
        n > 0 && k > 0 && (n <= k || self.choice(n) < k)
    }

    /// Uniform float in the open interval (0, 1), 53-bit resolution.
    fn unit(&self) -> f64 {
        loop {
            let bits = self.next() >> 11;
            if bits != 0 {
                return bits as f64 * UNIT_SCALE;
            }
        }
    }

    /// Uniform angle in (0, 2π).
    fn angle(&self) -> f64 {
        TAU * self.unit()
    }

    /// Uniform float in (0, x); `uniform(0.0)` is 0 without drawing.
    fn uniform(&self, x: f64) -> f64 {
        if x == 0.0 {
            0.0
        } else {
            x * self.unit()
        }
    }

    /// Uniform float between `a` and `b`.
    fn range(&self, a: f64, b: f64) -> f64 {
        a + self.uniform(b - a)
    }

    /// True with probability `p`; certain outcomes consume no draw.
    fn bernoulli(&self, p: f64) -> bool {
        p >= 1.0 || (p > 0.0 && p > self.unit())
    }

    /// [`bernoulli`](Self::bernoulli) as 0 or 1.
    fn bit(&self, p: f64) -> u64 {
        u64::from(self.bernoulli(p))
    }

    /// `x` with a uniformly random sign; 0 consumes no draw.
    fn rademacher(&self, x: f64) -> f64 {
        if x != 0.0 && self.flip() {
            -x
        } else {
            x
        }
    }
}

impl<T: BitEngine + ?Sized> UniformReduction for T {}

/// Clamps `value` to the closed range spanned by `min` and `max`.
///
/// Bounds are swapped when given in the wrong order.
///
/// # Examples
/// ```
/// use u_variate::uniform::censor;
/// assert_eq!(censor(1, 10, 6), 6);
/// assert_eq!(censor(6, 0, 1), 1);
/// assert_eq!(censor(0.0, 0.5, 1.0), 0.5);
/// ```
pub fn censor<T: PartialOrd>(min: T, value: T, max: T) -> T {
    let (lo, hi) = if min > max { (max, min) } else { (min, max) };
    if value < lo {
        lo
    } else if value > hi {
        hi
    } else {
        value
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Lcprng;
    use crate::stats::uniform_chi_squared_test;

    fn frequencies(rng: &Lcprng, n: u64, trials: usize) -> Vec<u64> {
        let mut counts = vec![0u64; n as usize + 1];
        for _ in 0..trials {
            counts[rng.limited(n) as usize] += 1;
        }
        counts
    }

    #[test]
    fn test_limited_zero_consumes_nothing() {
        let rng = Lcprng::with_seed(9);
        assert_eq!(rng.limited(0), 0);
        assert_eq!(rng.seed(), 9);
    }

    #[test]
    fn test_limited_full_range_is_raw() {
        let rng = Lcprng::with_seed(42);
        let raw = Lcprng::with_seed(42);
        assert_eq!(rng.limited(u64::MAX), raw.next());
    }

    #[test]
    fn test_limited_bounds() {
        let rng = Lcprng::with_seed(1);
        for n in [1u64, 2, 3, 7, 51, 1000, u64::MAX / 3, u64::MAX - 1] {
            for _ in 0..200 {
                assert!(rng.limited(n) <= n);
            }
        }
    }

    #[test]
    fn test_limited_unbiased_small() {
        let rng = Lcprng::with_seed(2024);
        let counts = frequencies(&rng, 9, 1_000_000);
        let fit = uniform_chi_squared_test(&counts).expect("ten bins");
        assert!(fit.p_value > 1e-4, "chi2 = {}, p = {}", fit.statistic, fit.p_value);
    }

    #[test]
    fn test_limited_unbiased_non_power_of_two() {
        let rng = Lcprng::with_seed(77);
        let counts = frequencies(&rng, 50, 1_000_000);
        let fit = uniform_chi_squared_test(&counts).expect("51 bins");
        assert!(fit.p_value > 1e-4, "chi2 = {}, p = {}", fit.statistic, fit.p_value);
    }

    #[test]
    fn test_int_swaps_and_covers() {
        let rng = Lcprng::with_seed(5);
        let mut seen = [false; 6];
        for _ in 0..1000 {
            let x = rng.int(6, 1);
            assert!((1..=6).contains(&x));
            seen[(x - 1) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(rng.int(-3, -3), -3);
    }

    #[test]
    fn test_int_extreme_range() {
        let rng = Lcprng::with_seed(5);
        for _ in 0..100 {
            let _ = rng.int(i64::MIN, i64::MAX);
        }
        let x = rng.int(i64::MAX - 1, i64::MAX);
        assert!(x >= i64::MAX - 1);
    }

    #[test]
    fn test_choice_conventions() {
        let rng = Lcprng::with_seed(3);
        assert_eq!(rng.choice(0), -1);
        assert_eq!(rng.choice(1), 0);
        assert_eq!(rng.seed(), 3, "degenerate choices must not draw");
        for _ in 0..1000 {
            let x = rng.choice(-5);
            assert!((-5..=-1).contains(&x));
            let y = rng.choice(52);
            assert!((0..52).contains(&y));
        }
        let z = rng.choice(i64::MIN);
        assert!(z < 0);
    }

    #[test]
    fn test_choose_edges() {
        let rng = Lcprng::with_seed(3);
        assert!(!rng.choose(0, 1));
        assert!(!rng.choose(5, 0));
        assert!(!rng.choose(-5, 3));
        assert!(rng.choose(3, 3));
        assert!(rng.choose(3, 10));
        assert_eq!(rng.seed(), 3);
    }

    #[test]
    fn test_choose_rate() {
        let rng = Lcprng::with_seed(11);
        let hits = (0..100_000).filter(|_| rng.choose(10, 3)).count();
        let rate = hits as f64 / 100_000.0;
        assert!((rate - 0.3).abs() < 0.01, "rate = {rate}");
    }

    #[test]
    fn test_flip_is_fair() {
        let rng = Lcprng::with_seed(8);
        let heads = (0..100_000).filter(|_| rng.flip()).count();
        let rate = heads as f64 / 100_000.0;
        assert!((rate - 0.5).abs() < 0.01, "rate = {rate}");
    }

    #[test]
    fn test_unit_open_interval_and_mean() {
        let rng = Lcprng::with_seed(99);
        let n = 200_000;
        let mut sum = 0.0;
        for _ in 0..n {
            let u = rng.unit();
            assert!(u > 0.0 && u < 1.0);
            sum += u;
        }
        assert!((sum / n as f64 - 0.5).abs() < 0.005);
    }

    #[test]
    fn test_uniform_range_angle() {
        let rng = Lcprng::with_seed(4);
        assert_eq!(rng.uniform(0.0), 0.0);
        for _ in 0..1000 {
            let x = rng.uniform(-2.0);
            assert!(x < 0.0 && x > -2.0);
            let r = rng.range(3.0, 5.0);
            assert!(r > 3.0 && r < 5.0);
            let a = rng.angle();
            assert!(a > 0.0 && a < TAU);
        }
    }

    #[test]
    fn test_bernoulli_edges() {
        let rng = Lcprng::with_seed(4);
        assert!(rng.bernoulli(1.0));
        assert!(rng.bernoulli(2.5));
        assert!(!rng.bernoulli(0.0));
        assert!(!rng.bernoulli(-1.0));
        assert_eq!(rng.seed(), 4);
        assert_eq!(rng.bit(1.0), 1);
        assert_eq!(rng.bit(0.0), 0);
    }

    #[test]
    fn test_rademacher_signs() {
        let rng = Lcprng::with_seed(12);
        let positives = (0..10_000).filter(|_| rng.rademacher(2.0) > 0.0).count();
        assert!((4_700..5_300).contains(&positives));
        assert_eq!(rng.rademacher(3.0).abs(), 3.0);
        let before = rng.seed();
        assert_eq!(rng.rademacher(0.0), 0.0);
        assert_eq!(rng.seed(), before);
    }

    #[test]
    fn test_censor() {
        assert_eq!(censor(0, -5, 10), 0);
        assert_eq!(censor(10, 15, 0), 10);
        assert_eq!(censor(0, 5, 10), 5);
        assert_eq!(censor(1.0, f64::INFINITY, 2.0), 2.0);
    }

    #[test]
    fn test_works_through_trait_object() {
        let rng: Box<dyn BitEngine> = Box::new(Lcprng::with_seed(1));
        let x = rng.int(0, 9);
        assert!((0..=9).contains(&x));
    }
}
