//! Special functions backing the goodness-of-fit checks.
//!
//! Only what the validation layer needs: the log-gamma function, the
//! regularized incomplete gamma pair, the chi-squared distribution
//! functions and the standard normal CDF.

/// 1/√(2π) ≈ 0.3989422804014327
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Iteration cap for the incomplete gamma series and continued fraction.
/// Large shapes (χ² tests over hundreds of bins) need more than a few
/// hundred terms.
const MAX_ITERATIONS: usize = 1000;

/// Relative convergence tolerance for the incomplete gamma expansions.
const TOLERANCE: f64 = 1e-15;

/// Floor guarding the modified Lentz recurrences against division by 0.
const TINY: f64 = 1e-300;

/// Standard normal CDF Φ(x) = P(Z ≤ x) for Z ~ N(0,1).
///
/// # Algorithm
/// Abramowitz & Stegun formula 26.2.17, Horner evaluation.
///
/// # Accuracy
/// Maximum absolute error < 7.5 × 10⁻⁸.
///
/// # Examples
/// ```
/// use u_variate::special::standard_normal_cdf;
/// assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-7);
/// assert!((standard_normal_cdf(1.96) - 0.975).abs() < 1e-3);
/// ```
pub fn standard_normal_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x.is_infinite() {
        return if x > 0.0 { 1.0 } else { 0.0 };
    }

    let z = x.abs();
    let k = 1.0 / (1.0 + 0.231_641_9 * z);
    let density = FRAC_1_SQRT_2PI * (-0.5 * z * z).exp();
    let poly = k
        * (0.319_381_530
            + k * (-0.356_563_782 + k * (1.781_477_937 + k * (-1.821_255_978 + k * 1.330_274_429))));
    let upper = density * poly;

    if x >= 0.0 {
        1.0 - upper
    } else {
        upper
    }
}

/// Lanczos approximation of ln Γ(x), with reflection below ½.
///
/// # Accuracy
/// Relative error < 2 × 10⁻¹⁰ for x > 0.
///
/// # Examples
/// ```
/// use u_variate::special::ln_gamma;
/// assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
/// ```
pub fn ln_gamma(x: f64) -> f64 {
    #[allow(clippy::excessive_precision)]
    const LANCZOS: [f64; 9] = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];
    const G: f64 = 7.0;
    use std::f64::consts::PI;

    if x < 0.5 {
        return (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let series = LANCZOS[1..]
        .iter()
        .enumerate()
        .fold(LANCZOS[0], |acc, (i, &c)| acc + c / (x + i as f64 + 1.0));
    let t = x + G + 0.5;
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

/// Γ(x) = exp(ln Γ(x)).
///
/// # Examples
/// ```
/// use u_variate::special::gamma;
/// assert!((gamma(5.0) - 24.0).abs() < 1e-8);
/// assert!((gamma(0.5) - std::f64::consts::PI.sqrt()).abs() < 1e-10);
/// ```
pub fn gamma(x: f64) -> f64 {
    ln_gamma(x).exp()
}

/// `(P(a, x), Q(a, x))`, the regularized lower and upper incomplete gamma
/// functions, each computed directly on the side where it converges so the
/// small tail keeps full relative precision.
fn incomplete_gamma(a: f64, x: f64) -> (f64, f64) {
    let prefactor = (-x + a * x.ln() - ln_gamma(a)).exp();
    if x < a + 1.0 {
        let p = prefactor * gamma_series(a, x);
        (p, 1.0 - p)
    } else {
        let q = prefactor * gamma_continued_fraction(a, x);
        (1.0 - q, q)
    }
}

/// Σ xⁿ / (a(a+1)···(a+n)).
fn gamma_series(a: f64, x: f64) -> f64 {
    let mut term = 1.0 / a;
    let mut sum = term;
    let mut ap = a;
    for _ in 0..MAX_ITERATIONS {
        ap += 1.0;
        term *= x / ap;
        sum += term;
        if term.abs() < sum.abs() * TOLERANCE {
            break;
        }
    }
    sum
}

/// Modified Lentz evaluation of the Legendre continued fraction for Q.
fn gamma_continued_fraction(a: f64, x: f64) -> f64 {
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / TINY;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=MAX_ITERATIONS {
        let i = i as f64;
        let an = -i * (i - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < TINY {
            d = TINY;
        }
        c = b + an / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < TOLERANCE {
            break;
        }
    }
    h
}

/// Regularized lower incomplete gamma P(a, x) = γ(a, x) / Γ(a).
///
/// # Examples
/// ```
/// use u_variate::special::regularized_lower_gamma;
/// let p = regularized_lower_gamma(1.0, 2.0);
/// assert!((p - (1.0 - (-2.0_f64).exp())).abs() < 1e-10);
/// ```
pub fn regularized_lower_gamma(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    incomplete_gamma(a, x).0
}

/// Regularized upper incomplete gamma Q(a, x) = 1 − P(a, x).
pub fn regularized_upper_gamma(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    incomplete_gamma(a, x).1
}

/// Chi-squared CDF with `k` degrees of freedom: P(k/2, x/2).
///
/// NaN for NaN input or non-positive `k`; 0 for `x ≤ 0`.
///
/// # Examples
/// ```
/// use u_variate::special::chi_squared_cdf;
/// assert_eq!(chi_squared_cdf(0.0, 5.0), 0.0);
/// assert!((chi_squared_cdf(3.841, 1.0) - 0.95).abs() < 0.01);
/// ```
pub fn chi_squared_cdf(x: f64, k: f64) -> f64 {
    if x.is_nan() || !(k > 0.0) {
        return f64::NAN;
    }
    regularized_lower_gamma(k / 2.0, x / 2.0)
}

/// Chi-squared survival function `1 − CDF`, i.e. the p-value of a
/// statistic `x` on `k` degrees of freedom.
pub fn chi_squared_sf(x: f64, k: f64) -> f64 {
    if x.is_nan() || !(k > 0.0) {
        return f64::NAN;
    }
    regularized_upper_gamma(k / 2.0, x / 2.0)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn normal_cdf_monotonic(x1 in -6.0_f64..6.0, x2 in -6.0_f64..6.0) {
            let (lo, hi) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
            prop_assert!(standard_normal_cdf(lo) <= standard_normal_cdf(hi) + 1e-15);
        }

        #[test]
        fn incomplete_gamma_pair_sums_to_one(a in 0.1_f64..500.0, x in 0.01_f64..1000.0) {
            let total = regularized_lower_gamma(a, x) + regularized_upper_gamma(a, x);
            prop_assert!((total - 1.0).abs() < 1e-9);
        }

        #[test]
        fn chi_squared_cdf_in_unit_interval(x in 0.0_f64..2000.0, k in 1.0_f64..1000.0) {
            let c = chi_squared_cdf(x, k);
            prop_assert!((0.0..=1.0).contains(&c), "cdf({x}, {k}) = {c}");
        }
    }
}
