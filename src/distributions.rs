//! Random variate samplers.
//!
//! One free function per distribution, each built only from
//! [`UniformReduction`] primitives and other samplers in this module.
//! Every function takes the engine by shared reference as its last
//! argument.
//!
//! # Supported Distributions
//!
//! | Sampler | Parameters | Mean | Variance |
//! |---|---|---|---|
//! | [`exponential`] | λ | 1/λ | 1/λ² |
//! | [`normal`] | μ, σ | μ | σ² |
//! | [`gamma`] | α, β (rate) | α/β | α/β² |
//! | [`beta`] | α, β | α/(α+β) | αβ/((α+β)²(α+β+1)) |
//! | [`chi_squared`] | k | k | 2k |
//! | [`students_t`] | ν | 0 | ν/(ν−2) |
//! | [`binomial`] | n, p | np | np(1−p) |
//! | [`poisson`] | λ | λ | λ |
//! | [`hypergeometric`] | draw, succ, size | draw·succ/size | see docs |
//! | [`weibull`] | λ, k | λΓ(1+1/k) | λ²Γ(1+2/k) − μ² |
//!
//! Moments for the remaining samplers are listed on each function.
//!
//! # Degenerate Parameters
//!
//! Samplers are total. A zero scale returns the location parameter, a
//! non-positive shape returns 0, and a non-positive rate of
//! [`exponential`] or [`gamma`] returns `+∞`. The only fallible sampler is
//! [`negative_hypergeometric`], whose counts can be inconsistent.
//!
//! # Thresholds
//!
//! Several discrete samplers switch from exact simulation to a normal
//! approximation above an empirically tuned threshold, exposed as
//! constants ([`BINOMIAL_CLT_TRIALS`], [`POISSON_CLT_MEAN`],
//! [`CHI_SQUARED_CLT_DEGREES`], [`IRWIN_HALL_CLT_TERMS`]).

use std::f64::consts::E;

use crate::engine::BitEngine;
use crate::error::SamplingError;
use crate::uniform::{censor, UniformReduction};

/// Binomial uses the normal approximation above this many trials
/// (and only when `n·p > 9·q` and `n·q > 9·p`).
pub const BINOMIAL_CLT_TRIALS: u64 = 50;

/// Binomial normal approximation spread factor.
const BINOMIAL_CLT_SPREAD: f64 = 9.0;

/// Poisson switches to the variance-stabilized approximation at this mean.
pub const POISSON_CLT_MEAN: f64 = 256.0;

/// Chi-squared switches to the normal approximation at this many degrees.
pub const CHI_SQUARED_CLT_DEGREES: u64 = 256;

/// Irwin–Hall uses the normal approximation above this many terms.
pub const IRWIN_HALL_CLT_TERMS: u64 = 64;

/// Skew-normal shape beyond which the half-normal limit is used.
pub const SKEW_NORMAL_HALF_LIMIT: f64 = 1024.0;

/// Speed of light in vacuum (m/s).
const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Absolute zero (°C).
const ABSOLUTE_ZERO: f64 = -273.15;

/// Ideal gas constant scaled for molar mass in g/mol: N_A · k_B · 1000.
const GAS_CONSTANT: f64 = 6.022_140_76e23 * 1.380_649e-23 * 1000.0;

// ============================================================================
// Exponential family and transforms of it
// ============================================================================

/// Exponential with rate 1.
pub fn standard_exponential<R: BitEngine + ?Sized>(rng: &R) -> f64 {
    -(-rng.unit()).ln_1p()
}

/// Exponential distribution with rate `lambda`.
///
/// μ = 1/λ, σ² = 1/λ². Non-positive rate returns `+∞`.
///
/// # Examples
/// ```
/// use u_variate::Lcprng;
/// use u_variate::distributions::exponential;
///
/// let rng = Lcprng::with_seed(1);
/// assert!(exponential(2.0, &rng) > 0.0);
/// assert_eq!(exponential(0.0, &rng), f64::INFINITY);
/// ```
pub fn exponential<R: BitEngine + ?Sized>(lambda: f64, rng: &R) -> f64 {
    if lambda > 0.0 {
        standard_exponential(rng) / lambda
    } else {
        f64::INFINITY
    }
}

/// Rayleigh distribution with scale `sigma`.
///
/// μ = σ·√(π/2), σ² = (2 − π/2)·σ².
pub fn rayleigh<R: BitEngine + ?Sized>(sigma: f64, rng: &R) -> f64 {
    if sigma == 0.0 {
        return 0.0;
    }
    sigma * (2.0 * standard_exponential(rng)).sqrt()
}

/// Sine of a uniform angle, in (−1, 1). μ = 0, σ² = ½.
pub fn arcus<R: BitEngine + ?Sized>(rng: &R) -> f64 {
    rng.angle().sin()
}

/// Arcsine distribution on (0, 1). μ = ½, σ² = ⅛.
pub fn arcsine<R: BitEngine + ?Sized>(rng: &R) -> f64 {
    (arcus(rng) + 1.0) / 2.0
}

/// Standard normal variate.
///
/// # Algorithm
/// Box–Muller in polar form: a Rayleigh radius `√(2·E)` times the sine of
/// an independent uniform angle. Two uniform draws, no rejection.
pub fn gauss<R: BitEngine + ?Sized>(rng: &R) -> f64 {
    rayleigh(arcus(rng), rng)
}

/// Normal distribution N(μ, σ²). Zero `sigma` returns `mu`.
///
/// # Examples
/// ```
/// use u_variate::Lcprng;
/// use u_variate::distributions::normal;
///
/// let rng = Lcprng::with_seed(7);
/// assert_eq!(normal(3.0, 0.0, &rng), 3.0);
/// assert!(normal(0.0, 1.0, &rng).is_finite());
/// ```
pub fn normal<R: BitEngine + ?Sized>(mu: f64, sigma: f64, rng: &R) -> f64 {
    if sigma == 0.0 {
        mu
    } else {
        mu + sigma * gauss(rng)
    }
}

/// Normal variate rounded to the nearest integer.
pub fn discrete<R: BitEngine + ?Sized>(mu: f64, sigma: f64, rng: &R) -> i64 {
    normal(mu, sigma, rng).round() as i64
}

/// Skew-normal distribution with location `xi`, scale `omega`, shape `alpha`.
///
/// With δ = α/√(1+α²): μ = ξ + ωδ√(2/π), σ² = ω²(1 − 2δ²/π).
///
/// # Algorithm
/// Sorts two independent normals `u ≤ v` and returns their combination
/// `(u(1−α) + v(1+α)) / √(2(1+α²))`; α = ±1 return the minimum or maximum
/// directly. Beyond ±[`SKEW_NORMAL_HALF_LIMIT`] the half-normal limit is
/// used.
pub fn skew_normal<R: BitEngine + ?Sized>(xi: f64, omega: f64, alpha: f64, rng: &R) -> f64 {
    if omega == 0.0 {
        return xi;
    }
    let s = if alpha == 0.0 {
        gauss(rng)
    } else if alpha < -SKEW_NORMAL_HALF_LIMIT {
        -gauss(rng).abs()
    } else if alpha > SKEW_NORMAL_HALF_LIMIT {
        gauss(rng).abs()
    } else {
        let (x, y) = target(1.0, rng);
        let (u, v) = if x > y { (y, x) } else { (x, y) };
        if alpha == -1.0 {
            u
        } else if alpha == 1.0 {
            v
        } else {
            (u * (1.0 - alpha) + v * (1.0 + alpha)) / (2.0 * (1.0 + alpha * alpha)).sqrt()
        }
    };
    xi + omega * s
}

/// Log-normal: `exp(N(μ, σ²))`. μ = exp(μ + σ²/2).
pub fn log_normal<R: BitEngine + ?Sized>(mu: f64, sigma: f64, rng: &R) -> f64 {
    normal(mu, sigma, rng).exp()
}

/// Exponentially modified normal: `N(μ, σ²) + Exp(λ)`.
///
/// μ + 1/λ, σ² + 1/λ².
pub fn exp_normal<R: BitEngine + ?Sized>(mu: f64, sigma: f64, lambda: f64, rng: &R) -> f64 {
    normal(mu, sigma, rng) + exponential(lambda, rng)
}

/// Laplace (double exponential). μ, σ² = 2b².
pub fn laplace<R: BitEngine + ?Sized>(mu: f64, b: f64, rng: &R) -> f64 {
    if b == 0.0 {
        return mu;
    }
    mu + b * rng.rademacher(standard_exponential(rng))
}

/// Gumbel (type I extreme value). μ = m + βγ, σ = βπ/√6.
pub fn gumbel<R: BitEngine + ?Sized>(m: f64, beta: f64, rng: &R) -> f64 {
    if beta == 0.0 {
        return m;
    }
    m - beta * standard_exponential(rng).ln()
}

/// Suzuki: Rayleigh with a log-normal scale.
///
/// E[x²] = 2·exp(2m + 2ν²).
pub fn suzuki<R: BitEngine + ?Sized>(m: f64, nu: f64, rng: &R) -> f64 {
    rayleigh(log_normal(m, nu, rng), rng)
}

/// Cauchy (Lorentz). Mean and variance are undefined.
pub fn cauchy<R: BitEngine + ?Sized>(x0: f64, gamma: f64, rng: &R) -> f64 {
    if gamma == 0.0 {
        return x0;
    }
    x0 + gamma * rng.angle().tan()
}

/// Tukey lambda distribution.
///
/// λ = 0 is the standard logistic, λ = 1 uniform on (−1, 1), λ = 2
/// uniform on (−½, ½).
pub fn tukey<R: BitEngine + ?Sized>(lambda: f64, rng: &R) -> f64 {
    let p = rng.unit();
    if lambda == 0.0 {
        (1.0 / p - 1.0).ln()
    } else if lambda == 1.0 {
        2.0 * p - 1.0
    } else if lambda == 2.0 {
        p - 0.5
    } else {
        (p.powf(lambda) - (1.0 - p).powf(lambda)) / lambda
    }
}

/// Logistic distribution. μ, σ = sπ/√3.
pub fn logistic<R: BitEngine + ?Sized>(mu: f64, s: f64, rng: &R) -> f64 {
    if s == 0.0 {
        return mu;
    }
    mu + s * (1.0 / rng.unit() - 1.0).ln()
}

// ============================================================================
// Counting distributions
// ============================================================================

/// Binomial distribution: successes in `n` trials of probability `p`.
///
/// μ = np, σ² = np(1−p).
///
/// # Algorithm
/// Direct Bernoulli summation for small `n`; above
/// [`BINOMIAL_CLT_TRIALS`] trials with both tails well inside `[0, n]`,
/// a rounded normal `N(np, np(1−p))` redrawn until it lands in `[0, n]`.
///
/// # Examples
/// ```
/// use u_variate::Lcprng;
/// use u_variate::distributions::binomial;
///
/// let rng = Lcprng::with_seed(52);
/// assert!(binomial(52, 0.5, &rng) <= 52);
/// assert_eq!(binomial(10, 1.0, &rng), 10);
/// assert_eq!(binomial(10, 0.0, &rng), 0);
/// ```
pub fn binomial<R: BitEngine + ?Sized>(n: u64, p: f64, rng: &R) -> u64 {
    if p <= 0.0 || n == 0 {
        return 0;
    }
    if p >= 1.0 {
        return n;
    }
    let (x, q) = (n as f64, 1.0 - p);
    if n > BINOMIAL_CLT_TRIALS && x * p > BINOMIAL_CLT_SPREAD * q && x * q > BINOMIAL_CLT_SPREAD * p {
        let mu = x * p;
        let sigma = (mu * q).sqrt();
        loop {
            let b = normal(mu, sigma, rng).round();
            if (0.0..=x).contains(&b) {
                return (b as u64).min(n);
            }
        }
    }
    (0..n).map(|_| rng.bit(p)).sum()
}

/// Poisson distribution. μ = σ² = λ.
///
/// # Algorithm
/// Knuth's multiplicative method below [`POISSON_CLT_MEAN`]; above it the
/// variance-stabilizing square root, `round(N(√(λ−¼), ½)²)`.
pub fn poisson<R: BitEngine + ?Sized>(lambda: f64, rng: &R) -> u64 {
    if !(lambda > 0.0) {
        return 0;
    }
    if lambda < POISSON_CLT_MEAN {
        let limit = (-lambda).exp();
        let mut n = 0;
        let mut p = rng.unit();
        while p > limit {
            n += 1;
            p *= rng.unit();
        }
        n
    } else {
        let x = normal((lambda - 0.25).sqrt(), 0.5, rng);
        (x * x).round() as u64
    }
}

/// Skellam: difference of two Poisson variates.
///
/// μ = μ₁ − μ₂, σ² = μ₁ + μ₂. Negative means return 0.
pub fn skellam<R: BitEngine + ?Sized>(mu1: f64, mu2: f64, rng: &R) -> i64 {
    if mu1 >= 0.0 && mu2 >= 0.0 {
        poisson(mu1, rng) as i64 - poisson(mu2, rng) as i64
    } else {
        0
    }
}

/// Hermite: `Poisson(α₁) + 2·Poisson(α₂)`.
///
/// μ = α₁ + 2α₂, σ² = α₁ + 4α₂.
pub fn hermite<R: BitEngine + ?Sized>(alpha1: f64, alpha2: f64, rng: &R) -> u64 {
    if alpha1 >= 0.0 && alpha2 >= 0.0 {
        poisson(alpha1, rng) + 2 * poisson(alpha2, rng)
    } else {
        0
    }
}

/// Pascal (negative binomial): failures before the `r`-th success.
///
/// μ = rq/p, σ² = rq/p². `r == 0` or `p <= 0` returns `+∞`; `p >= 1`
/// returns 0.
pub fn pascal<R: BitEngine + ?Sized>(r: u64, p: f64, rng: &R) -> f64 {
    if r == 0 || p <= 0.0 {
        return f64::INFINITY;
    }
    if p >= 1.0 {
        return 0.0;
    }
    let rate = -(-p).ln_1p();
    (0..r).map(|_| exponential(rate, rng).floor()).sum()
}

/// Geometric: failures before the first success. μ = q/p, σ² = q/p².
pub fn geometric<R: BitEngine + ?Sized>(p: f64, rng: &R) -> f64 {
    pascal(1, p, rng)
}

/// Yule–Simon distribution. μ = ρ/(ρ−1), σ² = μ²/(ρ−2).
pub fn yule<R: BitEngine + ?Sized>(rho: f64, rng: &R) -> f64 {
    if rho > 0.0 {
        geometric((-exponential(rho, rng)).exp(), rng) + 1.0
    } else {
        0.0
    }
}

/// Hypergeometric: successes among `draw` items taken without replacement
/// from `size` items of which `succ` are successes.
///
/// μ = draw·succ/size, σ² = μ·(1 − succ/size)·(size − draw)/(size − 1).
/// Counts that exceed the population return 0.
///
/// # Algorithm
/// Sequential urn depletion: each draw is a success with probability
/// `succ / size`; stops early once either draws or successes run out, and
/// takes the rest wholesale once only successes remain.
pub fn hypergeometric<R: BitEngine + ?Sized>(draw: u64, succ: u64, size: u64, rng: &R) -> u64 {
    if size < draw || size < succ {
        return 0;
    }
    let (mut draw, mut succ, mut size) = (draw, succ, size);
    let mut hits = 0;
    while draw > 0 && succ > 0 {
        if size == succ {
            hits += draw.min(succ);
            break;
        }
        if rng.choose(size as i64, succ as i64) {
            hits += 1;
            succ -= 1;
        }
        size -= 1;
        draw -= 1;
    }
    hits
}

/// Negative hypergeometric: successes drawn before the `miss`-th failure.
///
/// With p = miss/(size − succ + 1): μ = succ·p.
///
/// # Errors
/// [`SamplingError::InconsistentCounts`] when `miss + succ > size`.
///
/// # Examples
/// ```
/// use u_variate::{Lcprng, SamplingError};
/// use u_variate::distributions::negative_hypergeometric;
///
/// let rng = Lcprng::with_seed(3);
/// assert!(negative_hypergeometric(2, 4, 10, &rng).unwrap() <= 4);
/// assert!(matches!(
///     negative_hypergeometric(7, 4, 10, &rng),
///     Err(SamplingError::InconsistentCounts { .. })
/// ));
/// ```
pub fn negative_hypergeometric<R: BitEngine + ?Sized>(
    miss: u64,
    succ: u64,
    size: u64,
    rng: &R,
) -> Result<u64, SamplingError> {
    if miss.checked_add(succ).map_or(true, |total| total > size) {
        return Err(SamplingError::InconsistentCounts { miss, succ, size });
    }
    let (mut miss, mut succ, mut size) = (miss, succ, size);
    let mut drawn = 0;
    while miss > 0 {
        if rng.choose(size as i64, succ as i64) {
            drawn += 1;
            succ -= 1;
        } else {
            miss -= 1;
        }
        size -= 1;
    }
    Ok(drawn)
}

/// Beta-binomial. With s = α+β, p = α/s: μ = np, σ² = np(1−p)(s+n)/(s+1).
pub fn beta_binomial<R: BitEngine + ?Sized>(n: u64, alpha: f64, beta_: f64, rng: &R) -> u64 {
    if n == 0 || !(alpha >= 0.0) || !(beta_ >= 0.0) {
        return 0;
    }
    if alpha == 0.0 {
        0
    } else if beta_ == 0.0 {
        n
    } else if alpha == 1.0 && beta_ == 1.0 {
        rng.limited(n)
    } else if n == 1 {
        rng.bit(alpha / (alpha + beta_))
    } else {
        binomial(n, beta(alpha, beta_, rng), rng)
    }
}

/// Pólya urn: beta-binomial with mean fraction `p` and dispersion `alpha`.
///
/// μ = np, σ² = np(1−p)(αn + 1)/(α + 1).
pub fn polya<R: BitEngine + ?Sized>(n: u64, p: f64, alpha: f64, rng: &R) -> u64 {
    if n > 0 && p > 0.0 && alpha > 0.0 {
        beta_binomial(n, p / alpha, (1.0 - p) / alpha, rng)
    } else {
        0
    }
}

/// Benford-law integer in `[m, n]` (bounds auto-swapped).
///
/// Leading-digit frequencies follow `log₁₀(1 + 1/d)`. For `m = 1`, with
/// `(a, b) = log_gamma_barnes(n + 1, true)`: μ = n − a, σ² = a − a² + 2b
/// (see [`crate::exact::log_gamma_barnes`]). A lower bound of 0 returns 0.
pub fn benford<R: BitEngine + ?Sized>(m: u64, n: u64, rng: &R) -> u64 {
    let (m, n) = if m > n { (n, m) } else { (m, n) };
    if m == 0 {
        return 0;
    }
    if m == n {
        return m;
    }
    let x = rng
        .range((m as f64).ln(), (n as f64 + 1.0).ln())
        .exp()
        .trunc() as u64;
    censor(m, x, n)
}

// ============================================================================
// Chi-squared and gamma family
// ============================================================================

/// Chi-squared with `k` degrees of freedom. μ = k, σ² = 2k.
///
/// # Algorithm
/// Pairs of degrees contribute `−2·ln(U)`, accumulated as one product of
/// uniforms; an odd remaining degree adds one squared Gaussian formed as
/// `E·(arcus + 1)`. From [`CHI_SQUARED_CLT_DEGREES`] on, `N(k, 2k)` redrawn
/// while negative.
pub fn chi_squared<R: BitEngine + ?Sized>(k: u64, rng: &R) -> f64 {
    if k >= CHI_SQUARED_CLT_DEGREES {
        let x = k as f64;
        let sigma = (2.0 * x).sqrt();
        loop {
            let y = normal(x, sigma, rng);
            if y >= 0.0 {
                return y;
            }
        }
    }
    let mut k = k;
    let mut x = 0.0;
    if k > 1 {
        let mut product = 1.0;
        while k > 1 {
            product -= rng.uniform(product);
            k -= 2;
        }
        x = -2.0 * product.ln();
    }
    if k > 0 {
        x += standard_exponential(rng) * (arcus(rng) + 1.0);
    }
    x
}

/// Chi distribution: length of a `k`-dimensional Gaussian vector.
pub fn chi<R: BitEngine + ?Sized>(k: u64, rng: &R) -> f64 {
    match k {
        0 => 0.0,
        1 => gauss(rng).abs(),
        2 => rayleigh(1.0, rng),
        _ => chi_squared(k, rng).sqrt(),
    }
}

/// Gamma with shape `alpha` and unit rate.
///
/// # Algorithm
/// `2α` is split into its integer part `t` and fraction. The fractional
/// shape `a = frac/2 ∈ (0, ½)` is drawn with Ahrens–Dieter GS
/// acceptance-rejection; the integer part adds `χ²(t)/2 = Gamma(t/2)`.
/// The sum of independent gammas reconstructs Gamma(α) exactly.
///
/// # References
/// Ahrens & Dieter (1974), "Computer methods for sampling from gamma,
/// beta, Poisson and binomial distributions"
pub fn standard_gamma<R: BitEngine + ?Sized>(alpha: f64, rng: &R) -> f64 {
    if !(alpha > 0.0) {
        return 0.0;
    }
    let twice = 2.0 * alpha;
    let whole = twice.trunc();
    let a = (twice - whole) / 2.0;
    let mut g = 0.0;
    if a > 0.0 {
        let (bound, inv, shape) = (a + E, 1.0 / a, a - 1.0);
        g = loop {
            if rng.uniform(bound) < E {
                let x = rng.unit().powf(inv);
                if rng.bernoulli((-x).exp()) {
                    break x;
                }
            } else {
                let x = 1.0 + standard_exponential(rng);
                if rng.bernoulli(x.powf(shape)) {
                    break x;
                }
            }
        };
    }
    g + chi_squared(whole as u64, rng) / 2.0
}

/// Gamma distribution with shape `alpha` and rate `beta`.
///
/// μ = α/β, σ² = α/β². Non-positive shape returns 0, non-positive rate
/// `+∞`.
///
/// # Examples
/// ```
/// use u_variate::Lcprng;
/// use u_variate::distributions::gamma;
///
/// let rng = Lcprng::with_seed(2);
/// assert!(gamma(2.0, 1.0, &rng) > 0.0);
/// assert_eq!(gamma(0.0, 1.0, &rng), 0.0);
/// assert_eq!(gamma(2.0, 0.0, &rng), f64::INFINITY);
/// ```
pub fn gamma<R: BitEngine + ?Sized>(alpha: f64, beta: f64, rng: &R) -> f64 {
    if !(alpha > 0.0) {
        0.0
    } else if beta > 0.0 {
        standard_gamma(alpha, rng) / beta
    } else {
        f64::INFINITY
    }
}

/// Erlang: sum of `k` exponentials of rate `lambda`. μ = k/λ, σ² = k/λ².
pub fn erlang<R: BitEngine + ?Sized>(k: u64, lambda: f64, rng: &R) -> f64 {
    gamma(k as f64, lambda, rng)
}

/// Inverse gamma. μ = β/(α−1), σ² = μ²/(α−2).
pub fn inverse_gamma<R: BitEngine + ?Sized>(alpha: f64, beta: f64, rng: &R) -> f64 {
    if alpha > 0.0 && beta > 0.0 {
        beta / standard_gamma(alpha, rng)
    } else {
        0.0
    }
}

/// Beta distribution on (0, 1).
///
/// With s = α+β: μ = α/s, σ² = αβ/(s²(s+1)).
///
/// # Algorithm
/// Closed forms for α = β = 1 (uniform), α = 1 or β = 1 (power of a
/// uniform) and α = β = ½ (arcsine); otherwise `Gα / (Gα + Gβ)`.
pub fn beta<R: BitEngine + ?Sized>(alpha: f64, beta: f64, rng: &R) -> f64 {
    if !(alpha > 0.0 && beta > 0.0) {
        return 0.0;
    }
    if alpha == 1.0 && beta == 1.0 {
        rng.unit()
    } else if alpha == 1.0 {
        1.0 - (1.0 - rng.unit()).powf(1.0 / beta)
    } else if beta == 1.0 {
        rng.unit().powf(1.0 / alpha)
    } else if alpha == 0.5 && beta == 0.5 {
        arcsine(rng)
    } else {
        let x = standard_gamma(alpha, rng);
        if x == 0.0 {
            0.0
        } else {
            x / (x + standard_gamma(beta, rng))
        }
    }
}

/// Beta prime: `B / (1 − B)`. μ = α/(β−1).
pub fn beta_prime<R: BitEngine + ?Sized>(alpha: f64, beta_: f64, rng: &R) -> f64 {
    let b = beta(alpha, beta_, rng);
    if b != 0.0 && b != 1.0 {
        b / (1.0 - b)
    } else {
        b
    }
}

/// Student's t with `nu` degrees of freedom. μ = 0, σ² = ν/(ν−2).
///
/// `nu = +∞` is exactly [`gauss`]; non-positive `nu` returns 0.
pub fn students_t<R: BitEngine + ?Sized>(nu: f64, rng: &R) -> f64 {
    if !(nu > 0.0) {
        return 0.0;
    }
    let t = gauss(rng);
    if nu.is_infinite() {
        t
    } else {
        let half = nu / 2.0;
        t * (half / standard_gamma(half, rng)).sqrt()
    }
}

/// Snedecor's F: `(χ²(d₁)/d₁) / (χ²(d₂)/d₂)`. μ = d₂/(d₂−2).
pub fn snedecors_f<R: BitEngine + ?Sized>(d1: f64, d2: f64, rng: &R) -> f64 {
    if d1 > 0.0 && d2 > 0.0 {
        beta_prime(d1 / 2.0, d2 / 2.0, rng) * d2 / d1
    } else {
        0.0
    }
}

/// Fisher's z: `ln(F) / 2`.
pub fn fisher_z<R: BitEngine + ?Sized>(d1: f64, d2: f64, rng: &R) -> f64 {
    let f = snedecors_f(d1, d2, rng);
    if f > 0.0 {
        f.ln() / 2.0
    } else {
        f
    }
}

/// Dirichlet: random proportions summing to 1.
///
/// With s = Σα: μᵢ = αᵢ/s. A single component is always `[1.0]`; an
/// all-degenerate shape vector falls back to flat (α = 1) proportions.
///
/// # Examples
/// ```
/// use u_variate::Lcprng;
/// use u_variate::distributions::dirichlet;
///
/// let rng = Lcprng::with_seed(4);
/// let p = dirichlet(&[1.0, 2.0, 3.0], &rng);
/// assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
/// ```
pub fn dirichlet<R: BitEngine + ?Sized>(alpha: &[f64], rng: &R) -> Vec<f64> {
    match alpha.len() {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let mut d: Vec<f64> = alpha.iter().map(|&a| standard_gamma(a, rng)).collect();
            let mut s: f64 = d.iter().sum();
            if s == 0.0 {
                d = alpha.iter().map(|_| standard_exponential(rng)).collect();
                s = d.iter().sum();
            }
            d.iter_mut().for_each(|x| *x /= s);
            d
        }
    }
}

/// Nakagami-m with spread `omega`: `√(Gamma(m)·Ω/m)`. E[x²] = Ω.
pub fn nakagami<R: BitEngine + ?Sized>(m: f64, omega: f64, rng: &R) -> f64 {
    if m > 0.0 && omega > 0.0 {
        (standard_gamma(m, rng) * omega / m).sqrt()
    } else {
        0.0
    }
}

/// Maxwell–Boltzmann molecular speed (m/s) for molar mass `molar_mass`
/// (g/mol) at temperature `celsius` (°C).
///
/// μ = √(8RT/(πM)). Negative mass or a temperature below absolute zero
/// returns NaN; zero mass returns the speed of light; absolute zero
/// returns 0. Speeds are capped at the speed of light.
pub fn maxwellian<R: BitEngine + ?Sized>(molar_mass: f64, celsius: f64, rng: &R) -> f64 {
    let kelvin = celsius - ABSOLUTE_ZERO;
    if molar_mass < 0.0 || kelvin < 0.0 {
        f64::NAN
    } else if molar_mass == 0.0 {
        SPEED_OF_LIGHT
    } else if kelvin == 0.0 {
        0.0
    } else {
        (chi_squared(3, rng) * GAS_CONSTANT * kelvin / molar_mass)
            .sqrt()
            .min(SPEED_OF_LIGHT)
    }
}

/// Wald (inverse Gaussian). μ, σ² = μ³/λ.
///
/// # Algorithm
/// Michael, Schucany & Haas (1976) transformation with one χ²(1) draw and
/// one uniform root selection.
pub fn wald<R: BitEngine + ?Sized>(mu: f64, lambda: f64, rng: &R) -> f64 {
    if !(mu > 0.0 && lambda > 0.0) {
        return 0.0;
    }
    let twice = 2.0 * lambda;
    let y = mu * chi_squared(1, rng);
    let w = mu + mu * (y - (y * (2.0 * twice + y)).sqrt()) / twice;
    if rng.uniform(mu + w) > mu {
        mu * mu / w
    } else {
        w
    }
}

/// Pareto type I with minimum `xm` and tail index `alpha`.
///
/// μ = αxm/(α−1), σ² = xm²α/((α−1)²(α−2)).
pub fn pareto<R: BitEngine + ?Sized>(xm: f64, alpha: f64, rng: &R) -> f64 {
    if xm > 0.0 && alpha > 0.0 {
        xm * exponential(alpha, rng).exp()
    } else {
        0.0
    }
}

/// Lomax (Pareto type II): `Pareto(λ, α) − λ`. μ = λ/(α−1).
pub fn lomax<R: BitEngine + ?Sized>(alpha: f64, lambda: f64, rng: &R) -> f64 {
    pareto(lambda, alpha, rng) - lambda
}

/// Weibull with scale `lambda` and shape `k`.
///
/// μ = λΓ(1+1/k), σ² = λ²Γ(1+2/k) − μ².
pub fn weibull<R: BitEngine + ?Sized>(lambda: f64, k: f64, rng: &R) -> f64 {
    if lambda > 0.0 && k > 0.0 {
        lambda * standard_exponential(rng).powf(1.0 / k)
    } else {
        0.0
    }
}

/// Log-uniform between `a` and `b` (bounds auto-swapped).
///
/// μ = (b−a)/ln(b/a). A non-positive lower bound returns 0.
pub fn logarithmic<R: BitEngine + ?Sized>(a: f64, b: f64, rng: &R) -> f64 {
    let (a, b) = if a > b { (b, a) } else { (a, b) };
    if !(a > 0.0) {
        return 0.0;
    }
    if a == b {
        return a;
    }
    censor(a, rng.range(a.ln(), b.ln()).exp(), b)
}

// ============================================================================
// Sums of uniforms and bounded shapes
// ============================================================================

/// Irwin–Hall: sum of `n` uniforms. μ = n/2, σ² = n/12.
///
/// Above [`IRWIN_HALL_CLT_TERMS`] terms the normal limit is sampled.
pub fn irwin_hall<R: BitEngine + ?Sized>(n: u64, rng: &R) -> f64 {
    if n > IRWIN_HALL_CLT_TERMS {
        let x = n as f64;
        normal(x / 2.0, (x / 12.0).sqrt(), rng)
    } else {
        (0..n).map(|_| rng.unit()).sum()
    }
}

/// Bates: mean of `n` uniforms rescaled to `[a, b]`.
///
/// μ = (a+b)/2, σ² = (b−a)²/(12n).
pub fn bates<R: BitEngine + ?Sized>(n: u64, a: f64, b: f64, rng: &R) -> f64 {
    if n == 0 {
        return 0.0;
    }
    a + (b - a) * irwin_hall(n, rng) / n as f64
}

/// Triangular distribution on `[a, b]` with peak at `mode`.
///
/// μ = (a+b+c)/3, σ² = (a²+b²+c²−ab−ac−bc)/18. A mode outside the
/// interval returns 0.
///
/// # Algorithm
/// Inverse CDF of the two linear pieces from a single uniform draw.
pub fn triangular<R: BitEngine + ?Sized>(a: f64, b: f64, mode: f64, rng: &R) -> f64 {
    let (a, b) = if a > b { (b, a) } else { (a, b) };
    if !(a <= mode && mode <= b) {
        return 0.0;
    }
    let (width, rise) = (b - a, mode - a);
    let x = rng.uniform(width);
    if x < rise {
        a + (x * rise).sqrt()
    } else {
        b - ((width - x) * (b - mode)).sqrt()
    }
}

/// House-edge variate for a given return to player: `1 − rtp·E`.
///
/// μ = 1 − rtp, σ = rtp. Non-positive `rtp` returns 1.
pub fn house_edge<R: BitEngine + ?Sized>(rtp: f64, rng: &R) -> f64 {
    if rtp > 0.0 {
        1.0 - rtp * standard_exponential(rng)
    } else {
        1.0
    }
}

// ============================================================================
// Planar variates
// ============================================================================

/// Uniform point on the circle of radius `r`.
pub fn circle<R: BitEngine + ?Sized>(r: f64, rng: &R) -> (f64, f64) {
    if r == 0.0 {
        return (0.0, 0.0);
    }
    let (sin, cos) = rng.angle().sin_cos();
    (r * cos, r * sin)
}

/// Uniform point in the disc of radius `r`.
pub fn disc<R: BitEngine + ?Sized>(r: f64, rng: &R) -> (f64, f64) {
    if r == 0.0 {
        return (0.0, 0.0);
    }
    circle(r * rng.unit().sqrt(), rng)
}

/// Isotropic Gaussian point: independent N(0, d²) coordinates.
pub fn target<R: BitEngine + ?Sized>(dispersion: f64, rng: &R) -> (f64, f64) {
    let radius = rayleigh(dispersion, rng);
    circle(radius, rng)
}

/// Pair of independent normals N(μ₁, σ₁²), N(μ₂, σ₂²).
pub fn bi_normal<R: BitEngine + ?Sized>(
    mu1: f64,
    mu2: f64,
    sigma1: f64,
    sigma2: f64,
    rng: &R,
) -> (f64, f64) {
    let (n1, n2) = target(1.0, rng);
    (mu1 + n1 * sigma1, mu2 + n2 * sigma2)
}

/// Beckmann: distance from the origin of a [`bi_normal`] point.
///
/// E[x²] = μ₁² + μ₂² + σ₁² + σ₂².
pub fn beckmann<R: BitEngine + ?Sized>(
    mu1: f64,
    mu2: f64,
    sigma1: f64,
    sigma2: f64,
    rng: &R,
) -> f64 {
    let (x, y) = bi_normal(mu1, mu2, sigma1, sigma2, rng);
    x.hypot(y)
}

/// Rice: distance of a Gaussian point centered `nu` from the origin.
///
/// E[x²] = ν² + 2σ².
pub fn rice<R: BitEngine + ?Sized>(nu: f64, sigma: f64, rng: &R) -> f64 {
    if nu == 0.0 {
        rayleigh(sigma, rng)
    } else {
        let (x, y) = circle(nu, rng);
        beckmann(x, y, sigma, sigma, rng)
    }
}

// ============================================================================
// Tests
// ============================================================================
