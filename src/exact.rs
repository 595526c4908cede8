//! Exact probability functions.
//!
//! Closed-form counting and probability mass functions. They give exact
//! game odds and serve as oracles for the empirical frequencies of the
//! samplers in [`crate::distributions`].

use crate::stats::Babushka;

/// Largest `n` whose factorial is finite in `f64`.
const MAX_FACTORIAL: u64 = 170;

/// Factorial `n!` as an exact running product.
///
/// Returns `+∞` for `n > 170`.
///
/// # Examples
/// ```
/// use u_variate::exact::factorial;
/// assert_eq!(factorial(5), 120.0);
/// assert_eq!(factorial(171), f64::INFINITY);
/// ```
pub fn factorial(n: u64) -> f64 {
    if n > MAX_FACTORIAL {
        return f64::INFINITY;
    }
    (2..=n).fold(1.0, |f, i| f * i as f64)
}

/// Falling factorial `n · (n−1) ··· (n−k+1) = n! / (n−k)!`.
///
/// Defined for any negative `n`; for non-negative `n` it is 0 once
/// `k > n`. `k <= 0` gives the empty product 1.
pub fn falling_factorial(n: i64, k: i64) -> f64 {
    if n >= 0 && k > n {
        return 0.0;
    }
    let n = i128::from(n);
    let mut f = 1.0;
    for i in 0..i128::from(k.max(0)) {
        f *= (n - i) as f64;
        if f.is_infinite() || f == 0.0 {
            break;
        }
    }
    f
}

/// Binomial coefficient `C(n, k)`.
///
/// # Algorithm
/// Pascal-triangle multiplicative formula over the shorter side,
/// `b = b·n/i`, which keeps every intermediate value an exact integer
/// while it fits the mantissa. Negative `n` follows Newton's generalized
/// identity `C(n, k) = (−1)ᵏ·C(k−n−1, k)` for `k ≥ 0` and
/// `C(n, k) = (−1)ⁿ⁻ᵏ·C(−k−1, n−k)` for `k ≤ n`; everything else is 0.
///
/// # Examples
/// ```
/// use u_variate::exact::binomial_coefficient;
/// assert_eq!(binomial_coefficient(52, 5), 2_598_960.0);
/// assert_eq!(binomial_coefficient(-1, 3), -1.0);
/// assert_eq!(binomial_coefficient(4, 7), 0.0);
/// ```
pub fn binomial_coefficient(n: i64, k: i64) -> f64 {
    wide_binomial(i128::from(n), i128::from(k))
}

/// Reflections of `i64` arguments stay inside `i128`.
fn wide_binomial(n: i128, k: i128) -> f64 {
    let (mut n, mut k) = (n, k);
    let mut b = 1.0;
    if n < 0 {
        if k <= n {
            k = n - k;
        }
        if k >= 0 {
            n = k - n - 1;
        }
        if k & 1 != 0 {
            b = -b;
        }
    }
    if !(0 <= k && k <= n) {
        return 0.0;
    }
    let k = k.min(n - k);
    for i in 1..=k {
        b = b * n as f64 / i as f64;
        if b.is_infinite() {
            break;
        }
        n -= 1;
    }
    b
}

/// Multinomial coefficient `(k₀ + k₁ + ···)! / (k₀!·k₁!···)`.
///
/// Built as a product of binomial coefficients over the running total.
///
/// # Examples
/// ```
/// use u_variate::exact::multinomial;
/// assert_eq!(multinomial(&[2, 3, 4]), 1260.0);
/// assert_eq!(multinomial(&[]), 1.0);
/// ```
pub fn multinomial(k: &[i64]) -> f64 {
    let mut m = 1.0;
    let mut n: i128 = 0;
    for &j in k {
        let j = i128::from(j);
        n += j;
        let c = wide_binomial(n, j);
        if c == 0.0 {
            return 0.0;
        }
        m *= c;
    }
    m
}

/// `(ln Γ(n), ln G(n))` for integer `n`, with G the Barnes G-function.
///
/// With `scaled`, both are divided by `ln n`. `n = 0` gives `(+∞, −∞)`,
/// negative `n` gives NaN for both. Benford moments are expressed through
/// this pair.
///
/// # Examples
/// ```
/// use u_variate::exact::log_gamma_barnes;
/// let (g, b) = log_gamma_barnes(5, false);
/// assert!((g - 24.0_f64.ln()).abs() < 1e-12); // Γ(5) = 4!
/// assert!((b - 12.0_f64.ln()).abs() < 1e-12); // G(5) = 1!·2!·3!
/// ```
pub fn log_gamma_barnes(n: i64, scaled: bool) -> (f64, f64) {
    match n {
        0 => (f64::INFINITY, f64::NEG_INFINITY),
        n if n < 0 => (f64::NAN, f64::NAN),
        _ => {
            let (mut gamma, mut barnes) = (0.0, 0.0);
            for k in 2..n {
                barnes += gamma;
                gamma += (k as f64).ln();
            }
            if scaled && n > 1 {
                let l = (n as f64).ln();
                gamma /= l;
                barnes /= l;
            }
            (gamma, barnes)
        }
    }
}

/// Probability of exactly `hits` successes when drawing `draw` items
/// without replacement from `size` items of which `succ` are successes.
///
/// Same as spreadsheet `HYPGEOMDIST(hits, draw, succ, size)`.
///
/// # Examples
/// ```
/// use u_variate::exact::hypergeometric_pmf;
/// // two hearts in a five-card poker hand
/// let p = hypergeometric_pmf(2, 5, 13, 52);
/// assert!((p - 0.274_279_711_884_753_9).abs() < 1e-12);
/// ```
pub fn hypergeometric_pmf(hits: i64, draw: i64, succ: i64, size: i64) -> f64 {
    let mut prob = binomial_coefficient(succ, hits);
    if prob != 0.0 {
        prob *= binomial_coefficient(size - succ, draw - hits);
        if prob != 0.0 {
            prob /= binomial_coefficient(size, draw);
        }
    }
    prob
}

/// Probability of drawing exactly `draw` successes before the `miss`-th
/// failure, from `size` items of which `succ` are successes.
pub fn negative_hypergeometric_pmf(draw: i64, miss: i64, succ: i64, size: i64) -> f64 {
    let miss = miss + draw;
    let mut prob = binomial_coefficient(miss - 1, draw);
    if prob != 0.0 {
        prob *= binomial_coefficient(size - miss, succ - draw);
        if prob != 0.0 {
            prob /= binomial_coefficient(size, succ);
        }
    }
    prob
}

/// Poisson probabilities `P(k) = e^−λ·λᵏ/k!` for `k = 0..=n`, plus the
/// remaining tail mass `rest = 1 − Σ P(k)`.
///
/// # Algorithm
/// Ratio recurrence `P(k) = P(k−1)·λ/k`; the tail mass is taken from a
/// [`Babushka`] compensated sum and clamped at 0. `λ = 0` puts all mass on
/// 0; negative `λ` returns zeros with `rest = 1`.
///
/// # Examples
/// ```
/// use u_variate::exact::poisson_pmf;
/// let (pmf, rest) = poisson_pmf(3, 3.0);
/// assert_eq!(pmf.len(), 4);
/// assert!((pmf[0] - (-3.0_f64).exp()).abs() < 1e-15);
/// assert!((pmf.iter().sum::<f64>() + rest - 1.0).abs() < 1e-12);
/// ```
pub fn poisson_pmf(n: usize, lambda: f64) -> (Vec<f64>, f64) {
    let mut prob = vec![0.0; n + 1];
    if !(lambda >= 0.0) {
        return (prob, 1.0);
    }
    if lambda == 0.0 {
        prob[0] = 1.0;
        return (prob, 0.0);
    }
    prob[0] = (-lambda).exp();
    for i in 1..=n {
        prob[i] = prob[i - 1] * lambda / i as f64;
    }
    let mut acc = Babushka::new();
    prob.iter().for_each(|&p| acc.add(p));
    let rest = (1.0 - acc.total()).max(0.0);
    (prob, rest)
}

/// Probability that a weighted race finishes with the given leading
/// `order`: the product of each finisher's share of the weight still in
/// the race.
///
/// Out-of-range indices or an exhausted total give 0.
///
/// # Examples
/// ```
/// use u_variate::exact::race_probability;
/// // 3/6 · 1/3 · 2/2
/// let p = race_probability(&[2, 0, 1], &[1, 2, 3]);
/// assert!((p - 1.0 / 6.0).abs() < 1e-15);
/// ```
pub fn race_probability(order: &[usize], weights: &[u64]) -> f64 {
    let mut remaining: u128 = weights.iter().map(|&w| u128::from(w)).sum();
    let mut prob = 1.0;
    for &o in order {
        let Some(&w) = weights.get(o) else {
            return 0.0;
        };
        if remaining == 0 {
            return 0.0;
        }
        prob *= w as f64 / remaining as f64;
        remaining = remaining.saturating_sub(u128::from(w));
    }
    prob
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(0), 1.0);
        assert_eq!(factorial(1), 1.0);
        assert_eq!(factorial(10), 3_628_800.0);
        assert!(factorial(170).is_finite());
        assert_eq!(factorial(171), f64::INFINITY);
    }

    #[test]
    fn test_falling_factorial() {
        assert_eq!(falling_factorial(5, 2), 20.0);
        assert_eq!(falling_factorial(5, 5), 120.0);
        assert_eq!(falling_factorial(3, 5), 0.0);
        assert_eq!(falling_factorial(-2, 3), -24.0);
        assert_eq!(falling_factorial(7, 0), 1.0);
    }

    #[test]
    fn test_binomial_coefficient_pascal_row() {
        let row: Vec<f64> = (0..=6).map(|k| binomial_coefficient(6, k)).collect();
        assert_eq!(row, vec![1.0, 6.0, 15.0, 20.0, 15.0, 6.0, 1.0]);
        assert_eq!(binomial_coefficient(6, -1), 0.0);
        assert_eq!(binomial_coefficient(6, 7), 0.0);
        assert_eq!(binomial_coefficient(0, 0), 1.0);
    }

    #[test]
    fn test_binomial_coefficient_newton_extension() {
        // C(-1, k) = (-1)^k
        for k in 0..8 {
            let expected = if k % 2 == 0 { 1.0 } else { -1.0 };
            assert_eq!(binomial_coefficient(-1, k), expected);
        }
        // C(-3, 2) = C(4, 2)
        assert_eq!(binomial_coefficient(-3, 2), 6.0);
        assert_eq!(binomial_coefficient(-3, 3), -10.0);
        // k <= n < 0 branch
        assert_eq!(binomial_coefficient(-3, -5), 6.0);
        assert_eq!(binomial_coefficient(-3, -1), 0.0);
    }

    #[test]
    fn test_binomial_coefficient_large() {
        assert_relative_eq!(
            binomial_coefficient(52, 26),
            495_918_532_948_104.0,
            max_relative = 1e-14
        );
        assert_eq!(binomial_coefficient(52, 5), binomial_coefficient(52, 47));
    }

    #[test]
    fn test_binomial_coefficient_extreme_arguments() {
        assert_eq!(binomial_coefficient(i64::MIN, 0), 1.0);
        assert_eq!(binomial_coefficient(i64::MIN, i64::MIN), 1.0);
        assert_eq!(binomial_coefficient(-1, i64::MAX), -1.0);
        assert_eq!(binomial_coefficient(-1, i64::MAX - 1), 1.0);
        assert_eq!(binomial_coefficient(i64::MAX, 1), i64::MAX as f64);
        assert_eq!(binomial_coefficient(i64::MAX, i64::MAX), 1.0);
        assert_eq!(binomial_coefficient(i64::MAX, i64::MAX / 2), f64::INFINITY);
        // C(2⁶³ + 1, 2)
        assert_relative_eq!(binomial_coefficient(i64::MIN, 2), 2.0_f64.powi(125));
    }

    #[test]
    fn test_falling_factorial_extreme_arguments() {
        assert_eq!(falling_factorial(i64::MIN, 1), i64::MIN as f64);
        assert_eq!(falling_factorial(i64::MIN, i64::MAX), f64::NEG_INFINITY);
        assert_eq!(falling_factorial(i64::MAX, i64::MAX), f64::INFINITY);
    }

    #[test]
    fn test_multinomial() {
        assert_eq!(multinomial(&[2, 3, 4]), 1260.0);
        assert_eq!(multinomial(&[5]), 1.0);
        assert_eq!(multinomial(&[1, 1, 1, 1]), 24.0);
        assert_eq!(multinomial(&[3, 2, 0]), 10.0);
    }

    #[test]
    fn test_multinomial_total_past_i64() {
        // C(2⁶³ − 1, 2⁶³ − 1) · C(2⁶³, 1)
        assert_eq!(multinomial(&[i64::MAX, 1]), 2.0_f64.powi(63));
        assert_eq!(multinomial(&[i64::MAX, i64::MAX]), f64::INFINITY);
        assert_eq!(multinomial(&[i64::MAX, 1, -1]), 0.0);
    }

    #[test]
    fn test_log_gamma_barnes() {
        assert_eq!(log_gamma_barnes(1, false), (0.0, 0.0));
        assert_eq!(log_gamma_barnes(2, false), (0.0, 0.0));
        let (g, b) = log_gamma_barnes(6, false);
        assert_abs_diff_eq!(g, 120.0_f64.ln(), epsilon = 1e-12);
        assert_abs_diff_eq!(b, 288.0_f64.ln(), epsilon = 1e-12);
        let (gs, bs) = log_gamma_barnes(6, true);
        assert_abs_diff_eq!(gs, g / 6.0_f64.ln(), epsilon = 1e-12);
        assert_abs_diff_eq!(bs, b / 6.0_f64.ln(), epsilon = 1e-12);
        assert_eq!(log_gamma_barnes(0, true), (f64::INFINITY, f64::NEG_INFINITY));
        let (g, b) = log_gamma_barnes(-3, false);
        assert!(g.is_nan() && b.is_nan());
    }

    #[test]
    fn test_hypergeometric_pmf_sums_to_one() {
        let total: f64 = (0..=5).map(|h| hypergeometric_pmf(h, 5, 13, 52)).sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            hypergeometric_pmf(2, 5, 13, 52),
            0.274_279_711_884_753_9,
            epsilon = 1e-12
        );
        assert_eq!(hypergeometric_pmf(6, 5, 13, 52), 0.0);
        assert_eq!(hypergeometric_pmf(-1, 5, 13, 52), 0.0);
    }

    #[test]
    fn test_negative_hypergeometric_pmf() {
        assert_abs_diff_eq!(negative_hypergeometric_pmf(1, 2, 4, 10), 1.0 / 3.0, epsilon = 1e-12);
        let total: f64 = (0..=4).map(|d| negative_hypergeometric_pmf(d, 2, 4, 10)).sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
        assert_eq!(negative_hypergeometric_pmf(5, 2, 4, 10), 0.0);
    }

    #[test]
    fn test_poisson_pmf() {
        let (pmf, rest) = poisson_pmf(3, 3.0);
        let expected = [
            0.049_787_068_367_863_944,
            0.149_361_205_103_591_83,
            0.224_041_807_655_387_75,
            0.224_041_807_655_387_75,
        ];
        for (p, e) in pmf.iter().zip(expected) {
            assert_abs_diff_eq!(*p, e, epsilon = 1e-15);
        }
        assert_abs_diff_eq!(rest, 0.352_768_111_217_768_74, epsilon = 1e-14);
    }

    #[test]
    fn test_poisson_pmf_degenerate() {
        assert_eq!(poisson_pmf(2, 0.0), (vec![1.0, 0.0, 0.0], 0.0));
        assert_eq!(poisson_pmf(2, -1.0), (vec![0.0, 0.0, 0.0], 1.0));
        assert_eq!(poisson_pmf(0, f64::NAN), (vec![0.0], 1.0));
        let (_, rest) = poisson_pmf(200, 5.0);
        assert!(rest < 1e-14);
    }

    #[test]
    fn test_race_probability() {
        assert_abs_diff_eq!(race_probability(&[2, 0, 1], &[1, 2, 3]), 1.0 / 6.0, epsilon = 1e-15);
        assert_abs_diff_eq!(race_probability(&[1], &[1, 3]), 0.75, epsilon = 1e-15);
        assert_eq!(race_probability(&[], &[1, 2]), 1.0);
        assert_eq!(race_probability(&[5], &[1, 2]), 0.0);
        assert_eq!(race_probability(&[0, 0], &[1, 0]), 0.0);
    }

    #[test]
    fn test_race_probability_total_past_u64() {
        let weights = [u64::MAX, 1];
        assert_relative_eq!(race_probability(&[1], &weights), 2.0_f64.powi(-64));
        assert_relative_eq!(race_probability(&[1, 0], &weights), 2.0_f64.powi(-64));
        assert_relative_eq!(race_probability(&[0, 1], &weights), 1.0);
    }

    #[test]
    fn test_race_probability_orders_sum_to_one() {
        let weights = [1, 2, 3];
        let orders = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        let total: f64 = orders.iter().map(|o| race_probability(o, &weights)).sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn pascal_rule(n in 1_i64..60, k in 1_i64..60) {
            let lhs = binomial_coefficient(n, k);
            let rhs = binomial_coefficient(n - 1, k - 1) + binomial_coefficient(n - 1, k);
            prop_assert!((lhs - rhs).abs() <= 1e-12 * lhs.abs().max(1.0));
        }

        #[test]
        fn symmetry(n in 0_i64..60, k in 0_i64..60) {
            prop_assume!(k <= n);
            prop_assert_eq!(binomial_coefficient(n, k), binomial_coefficient(n, n - k));
        }

        #[test]
        fn hypergeometric_mass_is_one(size in 1_i64..40, d in 0.0_f64..=1.0, s in 0.0_f64..=1.0) {
            let draw = (size as f64 * d) as i64;
            let succ = (size as f64 * s) as i64;
            let total: f64 = (0..=draw).map(|h| hypergeometric_pmf(h, draw, succ, size)).sum();
            prop_assert!((total - 1.0).abs() < 1e-9);
        }

        #[test]
        fn poisson_mass_is_one(lambda in 0.0_f64..50.0, n in 0_usize..100) {
            let (pmf, rest) = poisson_pmf(n, lambda);
            let total = pmf.iter().sum::<f64>() + rest;
            prop_assert!((total - 1.0).abs() < 1e-9);
        }
    }
}
