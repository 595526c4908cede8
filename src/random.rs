//! Combinatorial sampling: shuffles, subsets, weighted selection, ranking.
//!
//! Every function takes the engine by shared reference as its last
//! argument and draws only through [`UniformReduction`], so results are
//! reproducible from the engine seed.
//!
//! # Algorithms
//!
//! - **Shuffle**: Fisher–Yates (Durstenfeld), one reverse pass.
//! - **Fill / permutation**: inside-out Fisher–Yates, each new value
//!   inserted at a uniformly chosen earlier position.
//! - **Combination**: selection sampling (Knuth, Algorithm S); candidate
//!   `i` is kept with probability `needed / remaining`.
//! - **Loaded / weighted**: binary search over a cumulative mass table.
//! - **Race**: three-zone weighted ranking (favorites from the front,
//!   penalized entries from the back, neutral entries uniformly between).
//! - **Riffle shuffle**: Gilbert–Shannon–Reeds model, binomial cut then
//!   size-proportional interleave.
//! - **Sort**: Hoare quicksort with random pivot over an explicit FIFO
//!   partition queue, insertion sort below 16 elements.
//!
//! # References
//!
//! - Knuth (1997), *TAOCP* Vol. 2, §3.4.2
//! - Knuth (2011), *TAOCP* Vol. 4A, §7.2.1.6, Algorithm W
//! - Bayer & Diaconis (1992), "Trailing the Dovetail Shuffle to its Lair"

use std::cmp::Ordering;
use std::collections::VecDeque;

use tracing::debug;

use crate::distributions::{binomial, discrete};
use crate::engine::BitEngine;
use crate::error::SamplingError;
use crate::uniform::UniformReduction;

/// Partitions at or below this length are insertion sorted.
pub const SORT_THRESHOLD: usize = 16;

// ============================================================================
// Permutations and subsets
// ============================================================================

/// Fisher–Yates (Durstenfeld) in-place shuffle.
///
/// Produces a uniformly random permutation: each of the n! permutations
/// is equally likely.
///
/// # Algorithm
/// Iterates backwards; position `i − 1` is swapped with `choice(i)`.
///
/// # Complexity
/// Time: O(n), Space: O(1) (in-place)
///
/// # Examples
/// ```
/// use u_variate::Lcprng;
/// use u_variate::random::shuffle;
///
/// let rng = Lcprng::with_seed(42);
/// let mut v = vec![1, 2, 3, 4, 5];
/// shuffle(&mut v, &rng);
/// v.sort();
/// assert_eq!(v, vec![1, 2, 3, 4, 5]);
/// ```
pub fn shuffle<T, R: BitEngine + ?Sized>(slice: &mut [T], rng: &R) {
    let mut i = slice.len();
    while i > 1 {
        let j = rng.choice(i as i64) as usize;
        i -= 1;
        slice.swap(i, j);
    }
}

/// The values `m, m+1, …, m+n−1` in random order.
///
/// # Algorithm
/// Inside-out shuffle: slot `i` receives the value at `int(0, i)`, which in
/// turn receives `m + i`.
///
/// # Examples
/// ```
/// use u_variate::Lcprng;
/// use u_variate::random::fill;
///
/// let rng = Lcprng::with_seed(1);
/// let mut v = fill(10, 5, &rng);
/// v.sort();
/// assert_eq!(v, vec![10, 11, 12, 13, 14]);
/// ```
pub fn fill<R: BitEngine + ?Sized>(m: i64, n: usize, rng: &R) -> Vec<i64> {
    let mut a = vec![0; n];
    for i in 0..n {
        let j = rng.int(0, i as i64) as usize;
        a[i] = a[j];
        a[j] = m + i as i64;
    }
    a
}

/// Random permutation of `0..n`.
pub fn permutation<R: BitEngine + ?Sized>(n: usize, rng: &R) -> Vec<usize> {
    fill(0, n, rng).into_iter().map(|x| x as usize).collect()
}

/// Uniformly random `k`-subset of `0..n`, in increasing order.
///
/// Returns all of `0..n` when `k >= n`.
///
/// # Algorithm
/// Selection sampling: walking candidates upwards, keep each with
/// probability `needed / remaining`. Every one of the C(n, k) subsets is
/// equally likely and no subset is materialized.
///
/// # Complexity
/// Time: O(n), Space: O(k)
///
/// # Examples
/// ```
/// use u_variate::Lcprng;
/// use u_variate::random::combination;
///
/// let rng = Lcprng::with_seed(7);
/// let hand = combination(52, 5, &rng);
/// assert_eq!(hand.len(), 5);
/// assert!(hand.windows(2).all(|w| w[0] < w[1]));
/// ```
pub fn combination<R: BitEngine + ?Sized>(n: usize, k: usize, rng: &R) -> Vec<usize> {
    let mut picked = Vec::with_capacity(k.min(n));
    let (mut remaining, mut needed) = (n as i64, k as i64);
    let mut i = 0;
    while remaining > 0 && needed > 0 {
        if rng.choose(remaining, needed) {
            picked.push(i);
            needed -= 1;
        }
        remaining -= 1;
        i += 1;
    }
    picked
}

/// `k` elements of `items` chosen without replacement, in original order.
pub fn sample<T: Clone, R: BitEngine + ?Sized>(k: usize, items: &[T], rng: &R) -> Vec<T> {
    combination(items.len(), k, rng)
        .into_iter()
        .map(|i| items[i].clone())
        .collect()
}

/// Uniformly random index into `items`; `None` when empty.
pub fn index<T, R: BitEngine + ?Sized>(items: &[T], rng: &R) -> Option<usize> {
    usize::try_from(rng.choice(items.len() as i64)).ok()
}

/// Uniformly random element of `items`; `None` when empty.
pub fn item<'a, T, R: BitEngine + ?Sized>(items: &'a [T], rng: &R) -> Option<&'a T> {
    index(items, rng).map(|i| &items[i])
}

// ============================================================================
// Weighted selection
// ============================================================================

/// Precomputed cumulative integer mass for repeated loaded draws.
///
/// Element `i` is the total mass of indices `0..=i`, so the table is
/// non-decreasing and its last element is the total mass.
///
/// # Examples
/// ```
/// use u_variate::Lcprng;
/// use u_variate::random::CumulativeMassTable;
///
/// let table = CumulativeMassTable::from_weights(&[1, 0, 3]).unwrap();
/// assert_eq!(table.as_slice(), &[1, 1, 4]);
/// let rng = Lcprng::with_seed(3);
/// let i = table.sample(&rng).unwrap();
/// assert!(i == 0 || i == 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeMassTable {
    cumulative: Vec<u64>,
}

impl CumulativeMassTable {
    /// Accumulates non-negative integer weights.
    ///
    /// # Errors
    /// [`SamplingError::NegativeWeight`] naming the first negative entry.
    pub fn from_weights(weights: &[i64]) -> Result<Self, SamplingError> {
        let mut cumulative = Vec::with_capacity(weights.len());
        let mut total = 0u64;
        for (index, &weight) in weights.iter().enumerate() {
            if weight < 0 {
                debug!(index, weight, "rejected weight table");
                return Err(SamplingError::NegativeWeight { index, weight });
            }
            total = total.saturating_add(weight as u64);
            cumulative.push(total);
        }
        Ok(Self { cumulative })
    }

    /// Wraps an already cumulative table.
    ///
    /// The table must be non-decreasing; this is not re-checked.
    pub fn from_cumulative(cumulative: Vec<u64>) -> Self {
        Self { cumulative }
    }

    /// Total mass (last element), 0 when empty.
    pub fn total(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    /// True if there are no categories.
    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// The cumulative values.
    pub fn as_slice(&self) -> &[u64] {
        &self.cumulative
    }

    /// Draws an index; see [`loaded`].
    pub fn sample<R: BitEngine + ?Sized>(&self, rng: &R) -> Option<usize> {
        loaded(&self.cumulative, rng)
    }
}

/// Loaded index draw from a cumulative mass table.
///
/// Index `i` is returned with probability `(c[i] − c[i−1]) / c[last]`.
/// A table whose total is 0 falls back to a uniform index.
///
/// # Complexity
/// O(log n) via binary search.
///
/// # Returns
/// - `None` if `cumulative` is empty.
///
/// # Examples
/// ```
/// use u_variate::Lcprng;
/// use u_variate::random::loaded;
///
/// let rng = Lcprng::with_seed(9);
/// assert_eq!(loaded(&[0, 0, 5], &rng), Some(2));
/// assert_eq!(loaded(&[], &rng), None);
/// ```
pub fn loaded<R: BitEngine + ?Sized>(cumulative: &[u64], rng: &R) -> Option<usize> {
    let last = cumulative.len().checked_sub(1)?;
    if last == 0 {
        return Some(0);
    }
    let total = cumulative[last];
    if total == 0 {
        return Some(rng.limited(last as u64) as usize);
    }
    let n = rng.limited(total - 1);
    let (mut l, mut r) = (0, last);
    while l < r {
        let m = (l + r) / 2;
        if n < cumulative[m] {
            r = m;
        } else {
            l = m + 1;
        }
    }
    Some(r)
}

/// Weighted index draw from integer weights.
///
/// Index `i` is returned with probability `w[i] / Σw`; an all-zero
/// vector selects uniformly.
///
/// # Errors
/// - [`SamplingError::EmptyPopulation`] if `weights` is empty.
/// - [`SamplingError::NegativeWeight`] if any weight is negative.
///
/// # Examples
/// ```
/// use u_variate::{Lcprng, SamplingError};
/// use u_variate::random::weighted;
///
/// let rng = Lcprng::with_seed(4);
/// assert!(weighted(&[1, 2, 3, 4], &rng).unwrap() < 4);
/// assert_eq!(weighted(&[], &rng), Err(SamplingError::EmptyPopulation));
/// ```
pub fn weighted<R: BitEngine + ?Sized>(weights: &[i64], rng: &R) -> Result<usize, SamplingError> {
    if weights.is_empty() {
        return Err(SamplingError::EmptyPopulation);
    }
    let table = CumulativeMassTable::from_weights(weights)?;
    table.sample(rng).ok_or(SamplingError::EmptyPopulation)
}

/// Cumulative sampler over floating-point weights.
///
/// Weights that are not positive and finite carry no mass, so those
/// indices are never drawn.
///
/// # Algorithm
/// Draws `u` uniform in `(0, total)` and binary-searches for the first
/// running total that reaches it.
///
/// # Complexity
/// Construction O(n), each draw O(log n).
///
/// # Examples
/// ```
/// use u_variate::Lcprng;
/// use u_variate::random::WeightedSampler;
///
/// let dice = WeightedSampler::new(&[1.0, 2.0, 3.0, 4.0]).unwrap();
/// assert_eq!(dice.probability(3), 0.4);
/// let rng = Lcprng::with_seed(42);
/// assert!(dice.sample(&rng) < 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedSampler {
    running: Vec<f64>,
}

impl WeightedSampler {
    /// Running totals of `weights`. `None` when nothing carries mass.
    pub fn new(weights: &[f64]) -> Option<Self> {
        let running: Vec<f64> = weights
            .iter()
            .scan(0.0, |acc, &w| {
                if w > 0.0 && w.is_finite() {
                    *acc += w;
                }
                Some(*acc)
            })
            .collect();
        match running.last() {
            Some(&total) if total > 0.0 && total.is_finite() => Some(Self { running }),
            _ => None,
        }
    }

    /// Index drawn with probability proportional to its weight.
    pub fn sample<R: BitEngine + ?Sized>(&self, rng: &R) -> usize {
        let u = rng.uniform(self.total_weight());
        let i = self.running.partition_point(|&c| c < u);
        i.min(self.running.len() - 1)
    }

    /// Share of the total mass held by index `i` (0 out of range).
    pub fn probability(&self, i: usize) -> f64 {
        let Some(&hi) = self.running.get(i) else {
            return 0.0;
        };
        let lo = if i == 0 { 0.0 } else { self.running[i - 1] };
        (hi - lo) / self.total_weight()
    }

    /// Number of indices, massless ones included.
    pub fn len(&self) -> usize {
        self.running.len()
    }

    /// Always false: a sampler holds at least one weighted index.
    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// Sum of the accepted weights.
    pub fn total_weight(&self) -> f64 {
        self.running.last().copied().unwrap_or(0.0)
    }
}

// ============================================================================
// Race ranking
// ============================================================================

struct Track<'a> {
    tuning: &'a [i64],
    standing: Vec<usize>,
    place: isize,
    finished: usize,
}

impl Track<'_> {
    /// Runs one zone. `tune` is the zone's total |weight|; 0 means uniform.
    fn run<R: BitEngine + ?Sized>(&mut self, mut cars: Vec<usize>, mut tune: u64, dir: isize, rng: &R) {
        let podium = self.standing.len();
        while !cars.is_empty() && self.finished < podium {
            let mut i = 0;
            if cars.len() > 1 {
                if tune == 0 {
                    i = rng.limited(cars.len() as u64 - 1) as usize;
                } else {
                    let mut n = rng.limited(tune - 1);
                    loop {
                        let w = self.tuning[cars[i]].unsigned_abs();
                        if n < w || i + 1 == cars.len() {
                            tune = tune.saturating_sub(w);
                            break;
                        }
                        n -= w;
                        i += 1;
                    }
                }
            }
            if self.place >= 0 && (self.place as usize) < podium {
                self.standing[self.place as usize] = cars[i];
                self.finished += 1;
            }
            self.place += dir;
            cars.remove(i);
        }
    }
}

/// Weighted random ranking of `tuning.len()` entries; returns the first
/// `podium` places.
///
/// Entries with positive tuning are ranked from the front, each next place
/// going to a remaining favorite with probability proportional to its
/// tuning. Entries with zero tuning fill the following places uniformly.
/// Entries with negative tuning are ranked from the back with probability
/// proportional to |tuning|, so the heaviest penalty tends to finish last.
///
/// `podium` is clamped to the number of entries; 0 yields an empty standing.
///
/// # Examples
/// ```
/// use u_variate::Lcprng;
/// use u_variate::random::race;
///
/// let rng = Lcprng::with_seed(5);
/// let standing = race(3, &[0, 10, -10], &rng);
/// assert_eq!(standing, vec![1, 0, 2]);
/// ```
pub fn race<R: BitEngine + ?Sized>(podium: usize, tuning: &[i64], rng: &R) -> Vec<usize> {
    let cars = tuning.len();
    let podium = podium.min(cars);
    if podium == 0 {
        return Vec::new();
    }

    let (mut head, mut body, mut tail) = (Vec::new(), Vec::new(), Vec::new());
    let (mut pos, mut neg) = (0u64, 0u64);
    for (car, &t) in tuning.iter().enumerate() {
        match t.cmp(&0) {
            Ordering::Greater => {
                head.push(car);
                pos = pos.saturating_add(t.unsigned_abs());
            }
            Ordering::Less => {
                tail.push(car);
                neg = neg.saturating_add(t.unsigned_abs());
            }
            Ordering::Equal => body.push(car),
        }
    }

    let mut track = Track {
        tuning,
        standing: vec![0; podium],
        place: 0,
        finished: 0,
    };
    track.run(head, pos, 1, rng);
    track.run(body, 0, 1, rng);
    track.place = cars as isize - 1;
    track.run(tail, neg, -1, rng);
    track.standing
}

/// Full weighted random permutation: `race(tuning.len(), tuning)`.
pub fn convoy<R: BitEngine + ?Sized>(tuning: &[i64], rng: &R) -> Vec<usize> {
    race(tuning.len(), tuning, rng)
}

// ============================================================================
// Riffle shuffle
// ============================================================================

/// Splits a deck at a Binomial(n, ½) position.
pub fn cut_deck<T: Clone, R: BitEngine + ?Sized>(deck: &[T], rng: &R) -> (Vec<T>, Vec<T>) {
    let at = binomial(deck.len() as u64, 0.5, rng) as usize;
    let (left, right) = deck.split_at(at.min(deck.len()));
    (left.to_vec(), right.to_vec())
}

/// Interleaves two packets, bottom up, dropping from each hand with
/// probability proportional to the cards it still holds.
///
/// The relative order inside each packet is preserved.
pub fn dove_tail<T: Clone, R: BitEngine + ?Sized>(left: &[T], right: &[T], rng: &R) -> Vec<T> {
    let (mut i, mut j) = (left.len(), right.len());
    let mut deck = Vec::with_capacity(i + j);
    while i + j > 0 {
        if rng.choose((i + j) as i64, i as i64) {
            i -= 1;
            deck.push(left[i].clone());
        } else {
            j -= 1;
            deck.push(right[j].clone());
        }
    }
    deck.reverse();
    deck
}

/// Riffles needed to mix an `n`-card deck: ⌈1.5·log₂ n⌉, 0 for n ≤ 1.
///
/// # Examples
/// ```
/// use u_variate::random::riffle_passes;
/// assert_eq!(riffle_passes(52), 9);
/// assert_eq!(riffle_passes(1), 0);
/// ```
pub fn riffle_passes(n: usize) -> u32 {
    if n <= 1 {
        0
    } else {
        (1.5 * (n as f64).log2()).ceil() as u32
    }
}

/// Gilbert–Shannon–Reeds riffle shuffle, repeated [`riffle_passes`] times.
///
/// # Examples
/// ```
/// use u_variate::Lcprng;
/// use u_variate::random::riffle_shuffle;
///
/// let rng = Lcprng::with_seed(52);
/// let mut deck: Vec<u32> = (0..52).collect();
/// riffle_shuffle(&mut deck, &rng);
/// let mut sorted = deck.clone();
/// sorted.sort();
/// assert_eq!(sorted, (0..52).collect::<Vec<_>>());
/// ```
pub fn riffle_shuffle<T: Clone, R: BitEngine + ?Sized>(deck: &mut [T], rng: &R) {
    for _ in 0..riffle_passes(deck.len()) {
        let (left, right) = cut_deck(deck, rng);
        let mixed = dove_tail(&left, &right, rng);
        deck.clone_from_slice(&mixed);
    }
}

// ============================================================================
// Sorting
// ============================================================================

/// In-place sort with a randomized pivot.
///
/// # Algorithm
/// Hoare partitioning around a pivot chosen by `int(lo, hi)`, partitions
/// processed from a FIFO queue instead of recursion; partitions spanning at
/// most [`SORT_THRESHOLD`] positions are insertion sorted. Not stable.
///
/// # Complexity
/// Expected O(n log n) time for any input order, O(n) queue space.
///
/// # Examples
/// ```
/// use u_variate::Lcprng;
/// use u_variate::random::sort;
///
/// let rng = Lcprng::with_seed(0);
/// let mut v = vec![5, 3, 9, 1, 3];
/// sort(&mut v, &rng);
/// assert_eq!(v, vec![1, 3, 3, 5, 9]);
/// ```
pub fn sort<T: Ord + Clone, R: BitEngine + ?Sized>(x: &mut [T], rng: &R) {
    if x.len() < 2 {
        return;
    }
    let mut queue = VecDeque::from([(0usize, x.len() - 1)]);
    while let Some((lo, hi)) = queue.pop_front() {
        if hi - lo > SORT_THRESHOLD {
            let pivot = x[rng.int(lo as i64, hi as i64) as usize].clone();
            let (mut l, mut r) = (lo as isize, hi as isize);
            while l <= r {
                while x[l as usize] < pivot {
                    l += 1;
                }
                while pivot < x[r as usize] {
                    r -= 1;
                }
                if l <= r {
                    x.swap(l as usize, r as usize);
                    l += 1;
                    r -= 1;
                }
            }
            if (lo as isize) < r {
                queue.push_back((lo, r as usize));
            }
            if l < hi as isize {
                queue.push_back((l as usize, hi));
            }
        } else {
            for r in lo + 1..=hi {
                let mut l = r;
                while l > lo && x[l - 1] > x[l] {
                    x.swap(l - 1, l);
                    l -= 1;
                }
            }
        }
    }
}

// ============================================================================
// Integer partitions and forests
// ============================================================================

/// `parts` random integers summing exactly to `total`.
///
/// Each part has mean `total / parts`. Small totals drop units one at a
/// time into uniformly chosen parts; large totals split sequentially with
/// a discretized normal approximation of the multinomial marginals.
///
/// # Examples
/// ```
/// use u_variate::Lcprng;
/// use u_variate::random::scatter;
///
/// let rng = Lcprng::with_seed(3);
/// let parts = scatter(100, 4, &rng);
/// assert_eq!(parts.len(), 4);
/// assert_eq!(parts.iter().sum::<i64>(), 100);
/// ```
pub fn scatter<R: BitEngine + ?Sized>(total: i64, parts: usize, rng: &R) -> Vec<i64> {
    const BERNOULLI_LIMIT: f64 = 2.0 * 53.0 * std::f64::consts::LN_2;

    let mut d = vec![0i64; parts];
    if parts == 0 || total == 0 {
        return d;
    }
    let n = parts as i64;
    if parts > 1 && (total as f64).abs() < (n - 1) as f64 * BERNOULLI_LIMIT {
        let unit = total.signum();
        for _ in 0..total.unsigned_abs() {
            d[rng.choice(n) as usize] += unit;
        }
    } else {
        let mut s = total;
        for k in (1..parts).rev() {
            let t = s as f64;
            let c = (k + 1) as f64;
            d[k] = discrete(t / c, (t.abs() * (c - 1.0)).sqrt() / c, rng);
            s -= d[k];
        }
        d[0] = s;
    }
    d
}

/// Uniformly random balanced string of `n` parenthesis pairs.
///
/// # Algorithm
/// Knuth, TAOCP 4A, Algorithm W: emit `)` with probability
/// `(q − p)(q + 1) / ((q + p)(q − p + 1))` where `p`, `q` count the
/// remaining opening and closing parentheses.
///
/// # Examples
/// ```
/// use u_variate::Lcprng;
/// use u_variate::random::forest;
///
/// let rng = Lcprng::with_seed(8);
/// let f = forest(4, &rng);
/// assert_eq!(f.len(), 8);
/// assert!(f.starts_with('('));
/// ```
pub fn forest<R: BitEngine + ?Sized>(n: usize, rng: &R) -> String {
    let mut f = String::with_capacity(2 * n);
    let (mut p, mut q) = (n as i64, n as i64);
    while q > 0 {
        if rng.choose((q + p) * (q - p + 1), (q - p) * (q + 1)) {
            f.push(')');
            q -= 1;
        } else {
            f.push('(');
            p -= 1;
        }
    }
    f
}

// ============================================================================
// Tests
// ============================================================================
