//! Running statistics, compensated summation and goodness of fit.
//!
//! # Contents
//!
//! - [`StatCalc`]: one-pass accumulator of count, sum, extremes, mean and
//!   deviation, used to aggregate sampler output and game returns.
//! - [`Babushka`]: second-order Kahan–Babuška summation.
//! - [`kahan_sum`], [`mean`], [`population_variance`]: batch counterparts
//!   the running accumulator is checked against.
//! - [`chi_squared_test`], [`uniform_chi_squared_test`]: Pearson
//!   goodness of fit for sampler frequency tables.
//!
//! # Algorithms
//!
//! - **Running variance**: Welford (1962), "Note on a Method for
//!   Calculating Corrected Sums of Squares and Products", *Technometrics*
//!   4(3).
//! - **Compensated summation**: Klein (2006), "A Generalized
//!   Kahan–Babuška-Summation-Algorithm", *Computing* 76.

use serde::{Deserialize, Serialize};

use crate::special::chi_squared_sf;

/// Largest magnitude at which every integral `f64` is exactly an integer
/// that fits the GCD accumulator.
const INTEGRAL_LIMIT: f64 = 9_007_199_254_740_992.0; // 2^53

// ---------------------------------------------------------------------------
// Batch statistics
// ---------------------------------------------------------------------------

/// Arithmetic mean using compensated summation.
///
/// # Returns
/// - `None` if `data` is empty or contains any NaN/Inf.
///
/// # Examples
/// ```
/// use u_variate::stats::mean;
/// let v = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert!((mean(&v).unwrap() - 3.0).abs() < 1e-15);
/// ```
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() || !data.iter().all(|x| x.is_finite()) {
        return None;
    }
    Some(kahan_sum(data) / data.len() as f64)
}

/// Population variance (denominator `n`) by the two-pass formula over the
/// compensated mean.
///
/// # Returns
/// - `None` if `data` is empty or contains NaN/Inf.
///
/// # Examples
/// ```
/// use u_variate::stats::population_variance;
/// let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert!((population_variance(&v).unwrap() - 4.0).abs() < 1e-10);
/// ```
pub fn population_variance(data: &[f64]) -> Option<f64> {
    let mu = mean(data)?;
    let squares: Vec<f64> = data.iter().map(|x| (x - mu) * (x - mu)).collect();
    Some(kahan_sum(&squares) / data.len() as f64)
}

/// Neumaier's improved Kahan summation.
///
/// Handles the case where the addend is larger in magnitude than the
/// running sum, which plain Kahan summation gets wrong.
///
/// # Complexity
/// Time: O(n), Space: O(1)
///
/// # Examples
/// ```
/// use u_variate::stats::kahan_sum;
/// assert_eq!(kahan_sum(&[1.0, 1e100, 1.0, -1e100]), 2.0);
/// ```
pub fn kahan_sum(data: &[f64]) -> f64 {
    let mut sum = 0.0_f64;
    let mut c = 0.0_f64;
    for &x in data {
        let t = sum + x;
        c += two_sum_error(sum, x, t);
        sum = t;
    }
    sum + c
}

/// Rounding error of `t = a + b`.
fn two_sum_error(a: f64, b: f64, t: f64) -> f64 {
    if a.abs() >= b.abs() {
        (a - t) + b
    } else {
        (b - t) + a
    }
}

// ---------------------------------------------------------------------------
// Babushka
// ---------------------------------------------------------------------------

/// Second-order iterative Kahan–Babuška accumulator.
///
/// Keeps the plain running sum next to two cascaded compensation terms, so
/// the caller can compare the naive and corrected totals.
///
/// # Examples
/// ```
/// use u_variate::stats::Babushka;
///
/// let mut b = Babushka::new();
/// for x in [1.0, 1e100, 1.0, -1e100] {
///     b.add(x);
/// }
/// assert_eq!(b.sum(), 0.0);
/// assert_eq!(b.total(), 2.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Babushka {
    sum: f64,
    cs: f64,
    ccs: f64,
    plain: f64,
}

impl Babushka {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `x` to the sum.
    pub fn add(&mut self, x: f64) {
        self.plain += x;
        let t = self.sum + x;
        let c = two_sum_error(self.sum, x, t);
        self.sum = t;
        let t = self.cs + c;
        let cc = two_sum_error(self.cs, c, t);
        self.cs = t;
        self.ccs += cc;
    }

    /// Adds every value in `xs`.
    pub fn add_all(&mut self, xs: &[f64]) {
        xs.iter().for_each(|&x| self.add(x));
    }

    /// Naive running sum `Σ x`.
    pub fn sum(&self) -> f64 {
        self.plain
    }

    /// Compensated sum `Σ x` with both correction terms applied.
    pub fn total(&self) -> f64 {
        self.sum + self.cs + self.ccs
    }

    /// Resets to 0.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Extend<f64> for Babushka {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        iter.into_iter().for_each(|x| self.add(x));
    }
}

// ---------------------------------------------------------------------------
// StatCalc
// ---------------------------------------------------------------------------

/// Streaming statistical calculator.
///
/// Tracks count, sum, sum of squares, extremes, mean and population
/// deviation in one pass, plus the number of zero values, the last value,
/// how many values were integral and the GCD of those integral values. An
/// optional category names the series.
///
/// Serializes with short field names
/// (`cnt, sum, sqr, min, max, avg, dev, abe, nul, val, int, gcd, cat`).
///
/// # Algorithm
/// Welford's update: `μₙ = μₙ₋₁ + (x − μₙ₋₁)/n` and
/// `abe += (x − μₙ₋₁)(x − μₙ)`, where the aberration `abe = n·σ²`.
///
/// # Examples
/// ```
/// use u_variate::stats::StatCalc;
///
/// let mut calc = StatCalc::new();
/// calc.add_all([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
/// assert_eq!(calc.count(), 8);
/// assert!((calc.mean() - 5.0).abs() < 1e-15);
/// assert!((calc.deviation() - 2.0).abs() < 1e-12);
/// assert_eq!(calc.gcd(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatCalc {
    #[serde(rename = "cnt")]
    count: u64,
    sum: f64,
    #[serde(rename = "sqr", default)]
    squares: f64,
    min: f64,
    max: f64,
    #[serde(rename = "avg")]
    mean: f64,
    #[serde(rename = "dev", default)]
    deviation: f64,
    #[serde(rename = "abe", default)]
    aberration: f64,
    #[serde(rename = "nul", default)]
    zeros: u64,
    #[serde(rename = "val")]
    last: f64,
    #[serde(rename = "int", default)]
    integers: u64,
    #[serde(default)]
    gcd: u64,
    #[serde(rename = "cat", default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
}

impl StatCalc {
    /// Creates an empty calculator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty calculator labelled with `category`.
    pub fn with_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    /// Adds one value and returns the running sum.
    pub fn add(&mut self, x: f64) -> f64 {
        if self.count == 0 {
            self.min = x;
            self.max = x;
        } else if x < self.min {
            self.min = x;
        } else if x > self.max {
            self.max = x;
        }
        self.count += 1;
        if x == 0.0 {
            self.zeros += 1;
        } else {
            self.sum += x;
            self.squares += x * x;
        }
        if x.fract() == 0.0 && x.abs() < INTEGRAL_LIMIT {
            self.integers += 1;
            self.gcd = gcd(self.gcd, x.abs() as u64);
        }

        let previous = self.mean;
        self.mean += (x - previous) / self.count as f64;
        self.aberration += (x - previous) * (x - self.mean);
        self.deviation = (self.aberration / self.count as f64).sqrt();
        self.last = x;
        self.sum
    }

    /// Adds every value and returns the running sum.
    pub fn add_all<I: IntoIterator<Item = f64>>(&mut self, values: I) -> f64 {
        values.into_iter().for_each(|x| {
            self.add(x);
        });
        self.sum
    }

    /// Adds integer values and returns the running sum.
    pub fn add_integers(&mut self, values: &[i64]) -> f64 {
        self.add_all(values.iter().map(|&i| i as f64))
    }

    /// Clears every statistic; the category is kept.
    pub fn reset(&mut self) {
        let category = self.category.take();
        *self = Self {
            category,
            ..Self::default()
        };
    }

    /// Number of values added.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// `Σ x`.
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// `Σ x²`.
    pub fn sum_of_squares(&self) -> f64 {
        self.squares
    }

    /// Smallest value, 0 before the first value.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest value, 0 before the first value.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Running mean μ, 0 before the first value.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population variance σ², 0 before the first value.
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.aberration / self.count as f64
        }
    }

    /// Population standard deviation σ.
    pub fn deviation(&self) -> f64 {
        self.deviation
    }

    /// Aberration `n·σ²`, the running sum of squared deviations.
    pub fn aberration(&self) -> f64 {
        self.aberration
    }

    /// Number of zero values.
    pub fn zeros(&self) -> u64 {
        self.zeros
    }

    /// Most recently added value.
    pub fn last(&self) -> f64 {
        self.last
    }

    /// Number of integral values.
    pub fn integers(&self) -> u64 {
        self.integers
    }

    /// Whether every value so far was integral.
    pub fn all_integral(&self) -> bool {
        self.integers == self.count
    }

    /// GCD of the integral values (0 while all were zero or none were
    /// integral).
    pub fn gcd(&self) -> u64 {
        self.gcd
    }

    /// Category label.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

impl Extend<f64> for StatCalc {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl FromIterator<f64> for StatCalc {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut calc = Self::new();
        calc.add_all(iter);
        calc
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

// ---------------------------------------------------------------------------
// Goodness of fit
// ---------------------------------------------------------------------------

/// Outcome of a Pearson chi-squared goodness-of-fit test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoodnessOfFit {
    /// Pearson statistic `Σ (O − E)² / E`.
    pub statistic: f64,
    /// Bins with positive expectation, minus one.
    pub degrees_of_freedom: usize,
    /// Probability of a statistic at least this large under the null.
    pub p_value: f64,
}

/// Pearson chi-squared test of observed counts against expected counts.
///
/// Bins expecting 0 are skipped when they also observed 0; an observation
/// in such a bin makes the statistic infinite and the p-value 0.
///
/// # Returns
/// - `None` if the slices differ in length, an expectation is negative or
///   non-finite, or fewer than two bins have positive expectation.
///
/// # Examples
/// ```
/// use u_variate::stats::chi_squared_test;
///
/// let fit = chi_squared_test(&[48, 52], &[50.0, 50.0]).unwrap();
/// assert_eq!(fit.degrees_of_freedom, 1);
/// assert!((fit.statistic - 0.16).abs() < 1e-12);
/// assert!(fit.p_value > 0.5);
/// ```
pub fn chi_squared_test(observed: &[u64], expected: &[f64]) -> Option<GoodnessOfFit> {
    if observed.len() != expected.len()
        || expected.iter().any(|e| !e.is_finite() || *e < 0.0)
    {
        return None;
    }
    let mut bins = 0usize;
    let mut terms = Vec::with_capacity(observed.len());
    for (&o, &e) in observed.iter().zip(expected) {
        let o = o as f64;
        if e > 0.0 {
            bins += 1;
            terms.push((o - e) * (o - e) / e);
        } else if o > 0.0 {
            terms.push(f64::INFINITY);
        }
    }
    if bins < 2 {
        return None;
    }
    let statistic = kahan_sum(&terms);
    let degrees_of_freedom = bins - 1;
    let p_value = if statistic.is_finite() {
        chi_squared_sf(statistic, degrees_of_freedom as f64)
    } else {
        0.0
    };
    Some(GoodnessOfFit {
        statistic,
        degrees_of_freedom,
        p_value,
    })
}

/// Chi-squared test of observed counts against the uniform law over the
/// same bins.
///
/// # Returns
/// - `None` for fewer than two bins or no observations.
///
/// # Examples
/// ```
/// use u_variate::stats::uniform_chi_squared_test;
///
/// let fit = uniform_chi_squared_test(&[100, 100, 100]).unwrap();
/// assert_eq!(fit.statistic, 0.0);
/// assert_eq!(fit.p_value, 1.0);
/// ```
pub fn uniform_chi_squared_test(observed: &[u64]) -> Option<GoodnessOfFit> {
    let total: u64 = observed.iter().sum();
    if total == 0 {
        return None;
    }
    let expected = vec![total as f64 / observed.len() as f64; observed.len()];
    chi_squared_test(observed, &expected)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
