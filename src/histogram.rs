//! Text histograms for eyeballing sampler output.
//!
//! Values pass through a [`Binning`] (an affine [`LinearMap`], an optional
//! transform and a [`Quantization`] policy) into integer bins. The
//! histogram keeps a [`StatCalc`] over the raw values next to the bin
//! counts, and [`Histogram::render`] draws proportionally scaled bars
//! annotated with the sample mean and deviation.
//!
//! This is a diagnostic interface, not a plotting library.
//!
//! # Examples
//! ```
//! use u_variate::Lcprng;
//! use u_variate::distributions::poisson;
//! use u_variate::histogram::{Histogram, RenderOptions};
//!
//! let rng = Lcprng::with_seed(1);
//! let mut h = Histogram::new("Poisson (λ = 3)");
//! h.set_expected(3.0, 3.0_f64.sqrt());
//! for _ in 0..10_000 {
//!     h.add(poisson(3.0, &rng) as f64);
//! }
//! let text = h.render(&RenderOptions::default());
//! assert!(text.starts_with("Poisson (λ = 3) PMF:"));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::stats::StatCalc;
use crate::uniform::censor;

/// Bar glyph.
const BAR: &str = "╶";
/// Axis glyph for bins whose center is an integer.
const AXIS_INTEGRAL: &str = "┼";
/// Axis glyph for fractional bin centers.
const AXIS_FRACTIONAL: &str = "│";
/// Marks the most populated bin.
const MARK_PEAK: &str = "►";
/// Marks the least populated non-empty bin of a PDF.
const MARK_BOTTOM: &str = "◂";

// ============================================================================
// Binning
// ============================================================================

/// Affine map through the points `(x₁, y₁)` and `(x₂, y₂)`, from value
/// space `x` to bin space `y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearMap {
    origin_x: f64,
    origin_y: f64,
    dx: f64,
    dy: f64,
}

impl LinearMap {
    /// Line through `(x1, y1)` and `(x2, y2)`. A degenerate line (equal
    /// `x` or equal `y`) falls back to the identity.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        if x1 == x2 || y1 == y2 {
            return Self::identity();
        }
        Self {
            origin_x: x1,
            origin_y: y1,
            dx: x2 - x1,
            dy: y2 - y1,
        }
    }

    /// `y = x`.
    pub fn identity() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            dx: 1.0,
            dy: 1.0,
        }
    }

    /// Line through the origin and `(dx, dy)`: `scale(1.0, 5.0)` puts five
    /// bins in every unit of value.
    pub fn scale(dx: f64, dy: f64) -> Self {
        Self::new(0.0, 0.0, dx, dy)
    }

    /// Bins per unit of value.
    pub fn slope(&self) -> f64 {
        self.dy / self.dx
    }

    /// Value to bin space.
    pub fn forward(&self, x: f64) -> f64 {
        (x - self.origin_x) * self.dy / self.dx + self.origin_y
    }

    /// Bin space back to value.
    pub fn inverse(&self, y: f64) -> f64 {
        (y - self.origin_y) * self.dx / self.dy + self.origin_x
    }
}

impl Default for LinearMap {
    fn default() -> Self {
        Self::identity()
    }
}

/// Rounding applied to the mapped value to pick its bin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantization {
    /// Nearest bin.
    #[default]
    Round,
    /// Bin at or below.
    Floor,
    /// Bin at or above.
    Ceil,
}

impl Quantization {
    fn apply(self, y: f64) -> f64 {
        match self {
            Self::Round => y.round(),
            Self::Floor => y.floor(),
            Self::Ceil => y.ceil(),
        }
    }
}

/// User-supplied post-processing of the mapped value, applied before
/// quantization.
pub type Transform = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// How raw values become bin indices.
#[derive(Clone, Default)]
pub struct Binning {
    /// Value to bin-space map.
    pub map: LinearMap,
    /// Rounding policy.
    pub quantization: Quantization,
    /// Optional transform between the map and the rounding.
    pub transform: Option<Transform>,
}

impl Binning {
    /// `map` with the given rounding and no transform.
    pub fn new(map: LinearMap, quantization: Quantization) -> Self {
        Self {
            map,
            quantization,
            transform: None,
        }
    }

    /// Adds a transform.
    pub fn with_transform(mut self, f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        self.transform = Some(Arc::new(f));
        self
    }

    /// Bin index of `x`. Saturates at the `i64` range; NaN lands in bin 0.
    pub fn bin(&self, x: f64) -> i64 {
        let mut y = self.map.forward(x);
        if let Some(f) = &self.transform {
            y = f(y);
        }
        self.quantization.apply(y) as i64
    }
}

impl fmt::Debug for Binning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binning")
            .field("map", &self.map)
            .field("quantization", &self.quantization)
            .field("transform", &self.transform.as_ref().map(|_| "Fn(f64) -> f64"))
            .finish()
    }
}

// ============================================================================
// Render options
// ============================================================================

/// Layout of [`Histogram::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Bar length, in glyphs, of the tallest row.
    pub width: usize,
    /// With zero bins included, rows farther than this from the mode are
    /// cut. `None` shows every bin.
    pub tail_limit: Option<u64>,
    /// Draw the cumulative distribution instead of the density.
    pub cumulative: bool,
    /// Draw empty bins between the first and last populated one.
    pub include_zero_bins: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 100,
            tail_limit: Some(25),
            cumulative: false,
            include_zero_bins: true,
        }
    }
}

// ============================================================================
// Histogram
// ============================================================================

/// Binned frequency table with running statistics.
#[derive(Debug, Clone)]
pub struct Histogram {
    title: String,
    binning: Binning,
    bins: BTreeMap<i64, u64>,
    calc: StatCalc,
    min_bin: i64,
    max_bin: i64,
    mode: i64,
    peak: u64,
    expected: Option<(f64, f64)>,
    started: Instant,
}

impl Histogram {
    /// Empty histogram with unit-width rounded bins.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_binning(title, Binning::default())
    }

    /// Empty histogram with the given binning.
    pub fn with_binning(title: impl Into<String>, binning: Binning) -> Self {
        Self {
            title: title.into(),
            binning,
            bins: BTreeMap::new(),
            calc: StatCalc::new(),
            min_bin: 0,
            max_bin: 0,
            mode: 0,
            peak: 0,
            expected: None,
            started: Instant::now(),
        }
    }

    /// Title shown in the header.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Replaces the title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Swaps in `binning` and clears all data, the expectation and the
    /// timer. The title is kept.
    pub fn reset(&mut self, binning: Binning) {
        trace!(title = %self.title, samples = self.calc.count(), "histogram reset");
        let title = std::mem::take(&mut self.title);
        *self = Self::with_binning(title, binning);
    }

    /// Theoretical mean and deviation, shown as `(expected = μ ± σ)`.
    pub fn set_expected(&mut self, mu: f64, sigma: f64) {
        self.expected = Some((mu, sigma));
    }

    /// Current binning.
    pub fn binning(&self) -> &Binning {
        &self.binning
    }

    /// Bin index `x` would fall into.
    pub fn bin(&self, x: f64) -> i64 {
        self.binning.bin(x)
    }

    /// Records one value.
    pub fn add(&mut self, x: f64) {
        self.calc.add(x);
        let n = self.bin(x);
        let count = self.bins.entry(n).or_insert(0);
        *count += 1;
        let c = *count;
        if self.calc.count() == 1 {
            self.min_bin = n;
            self.max_bin = n;
        } else {
            self.min_bin = self.min_bin.min(n);
            self.max_bin = self.max_bin.max(n);
        }
        if c > self.peak {
            self.mode = n;
            self.peak = c;
        }
    }

    /// Count in bin `n`.
    pub fn count(&self, n: i64) -> u64 {
        self.bins.get(&n).copied().unwrap_or(0)
    }

    /// Most populated bin (first to reach the peak count).
    pub fn mode(&self) -> i64 {
        self.mode
    }

    /// Count of the mode bin.
    pub fn peak(&self) -> u64 {
        self.peak
    }

    /// Lowest populated bin.
    pub fn min_bin(&self) -> i64 {
        self.min_bin
    }

    /// Highest populated bin.
    pub fn max_bin(&self) -> i64 {
        self.max_bin
    }

    /// Running statistics over the raw values.
    pub fn stats(&self) -> &StatCalc {
        &self.calc
    }

    /// Seconds since the last reset and values recorded per second.
    pub fn elapsed(&self) -> (f64, f64) {
        let secs = self.started.elapsed().as_secs_f64();
        let rate = if secs > 0.0 {
            self.calc.count() as f64 / secs
        } else {
            0.0
        };
        (secs, rate)
    }

    /// Renders the table as text, one row per bin.
    ///
    /// The header names the distribution "PMF" when every value was
    /// integral, "PDF" otherwise and "CDF" in cumulative mode. Each row is
    /// the bin center, a mark (`►` on the peak row, `◂` on the least
    /// populated row of a PDF), an axis glyph, the bar, the probability or
    /// density, and the raw count. The footer reports sample count,
    /// elapsed time and throughput.
    pub fn render(&self, options: &RenderOptions) -> String {
        let mut out = String::new();
        let calc = &self.calc;
        let pmf = calc.all_integral();
        let label = if options.cumulative {
            "CDF"
        } else if pmf {
            "PMF"
        } else {
            "PDF"
        };
        out.push_str(&format!(
            "{} {}:  [{}, {}]  μ = {}  σ = {}",
            self.title,
            label,
            short(calc.min()),
            short(calc.max()),
            short(calc.mean()),
            short(calc.deviation())
        ));
        if let Some((mu, sigma)) = self.expected {
            out.push_str(&format!("  (expected = {} ± {})", short(mu), short(sigma)));
        }
        out.push('\n');

        if calc.count() > 0 {
            self.render_rows(options, pmf, &mut out);
        }

        let (secs, rate) = self.elapsed();
        let freq = rate.round() as u64;
        out.push_str(&format!(
            "{} randoms  t = {:.3}\"  f = {}.{:06} M / s\n",
            calc.count(),
            secs,
            freq / 1_000_000,
            freq % 1_000_000
        ));
        out
    }

    fn render_rows(&self, options: &RenderOptions, pmf: bool, out: &mut String) {
        let total = self.calc.count() as f64;
        let top = if options.cumulative {
            total
        } else {
            self.peak as f64
        };
        let scale = options.width as f64 / top;

        let (lo, hi) = match options.tail_limit {
            Some(limit) if options.include_zero_bins => {
                let limit = i64::try_from(limit).unwrap_or(i64::MAX);
                (
                    censor(self.min_bin, self.mode.saturating_sub(limit), self.max_bin),
                    censor(self.min_bin, self.mode.saturating_add(limit), self.max_bin),
                )
            }
            _ => (self.min_bin, self.max_bin),
        };
        let mut running: u64 = self.bins.range(..lo).map(|(_, &c)| c).sum();
        let bottom = self.bins.values().copied().min().unwrap_or(0);
        let slope = self.binning.map.slope();

        let rows: Box<dyn Iterator<Item = i64> + '_> = if options.include_zero_bins {
            Box::new(lo..=hi)
        } else {
            Box::new(self.bins.range(lo..=hi).map(|(&i, _)| i))
        };
        for i in rows {
            let d = self.count(i);
            let n = if options.cumulative {
                running += d;
                running
            } else {
                d
            };
            let bar = BAR.repeat((n as f64 * scale).round() as usize);
            let mut y = n as f64 / total;
            if !options.cumulative {
                y *= slope;
            }
            let value = if pmf {
                format!("{}%", short(100.0 * y))
            } else if y >= 1.0 {
                trim_zeros(&format!("{y:.3}"), "")
            } else {
                trim_zeros(&format!("{y:.5}"), "")
            };
            let x = self.binning.map.inverse(i as f64);
            let center = trim_zeros(&format!("{x:10.3}"), " ");
            let mark = if d == self.peak {
                MARK_PEAK
            } else if d > 0 && d == bottom && !pmf {
                MARK_BOTTOM
            } else {
                " "
            };
            let axis = if x == x.floor() {
                AXIS_INTEGRAL
            } else {
                AXIS_FRACTIONAL
            };
            out.push_str(&format!("{center}  {mark}{axis}{bar}  {value}  {n}\n"));
        }
    }
}

impl Extend<f64> for Histogram {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        iter.into_iter().for_each(|x| self.add(x));
    }
}

/// Two decimals with trailing zeros dropped; `∞` and `undefined` for the
/// non-finite cases.
fn short(a: f64) -> String {
    if a == f64::INFINITY {
        "∞".to_string()
    } else if a == f64::NEG_INFINITY {
        "-∞".to_string()
    } else if a.is_nan() {
        "undefined".to_string()
    } else {
        trim_zeros(&format!("{a:.2}"), "")
    }
}

/// Replaces trailing fractional zeros (and a bare trailing point) with
/// `fill`, preserving width when `fill` is a space.
fn trim_zeros(s: &str, fill: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    let body = s.trim_end_matches('0');
    let cut = s.len() - body.len();
    let (body, cut) = match body.strip_suffix('.') {
        Some(b) => (b, cut + 1),
        None => (body, cut),
    };
    let mut out = body.to_string();
    out.push_str(&fill.repeat(cut));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::{exponential, gauss};
    use crate::engine::Lcprng;

    fn dice() -> Histogram {
        let mut h = Histogram::new("dice");
        h.extend([1.0, 2.0, 2.0, 3.0, 3.0, 3.0]);
        h
    }

    fn narrow() -> RenderOptions {
        RenderOptions {
            width: 6,
            ..RenderOptions::default()
        }
    }

    #[test]
    fn test_linear_map_round_trip() {
        let m = LinearMap::new(1.0, 10.0, 3.0, 20.0);
        assert_eq!(m.slope(), 5.0);
        assert_eq!(m.forward(1.0), 10.0);
        assert_eq!(m.forward(2.0), 15.0);
        assert_eq!(m.inverse(20.0), 3.0);
        assert_eq!(LinearMap::new(1.0, 2.0, 1.0, 5.0), LinearMap::identity());
        assert_eq!(LinearMap::scale(1.0, 5.0).forward(0.3), 1.5);
    }

    #[test]
    fn test_quantization_policies() {
        let map = LinearMap::scale(1.0, 2.0);
        assert_eq!(Binning::new(map, Quantization::Round).bin(1.3), 3);
        assert_eq!(Binning::new(map, Quantization::Floor).bin(1.3), 2);
        assert_eq!(Binning::new(map, Quantization::Ceil).bin(1.1), 3);
        assert_eq!(Binning::new(map, Quantization::Floor).bin(-0.1), -1);
    }

    #[test]
    fn test_transform_applied_before_rounding() {
        let binning = Binning::default().with_transform(|y| y * y);
        assert_eq!(binning.bin(1.5), 2);
        assert_eq!(binning.bin(-3.0), 9);
        assert!(format!("{binning:?}").contains("Fn(f64) -> f64"));
    }

    #[test]
    fn test_add_tracks_mode_and_range() {
        let h = dice();
        assert_eq!(h.count(1), 1);
        assert_eq!(h.count(2), 2);
        assert_eq!(h.count(3), 3);
        assert_eq!(h.count(4), 0);
        assert_eq!(h.mode(), 3);
        assert_eq!(h.peak(), 3);
        assert_eq!((h.min_bin(), h.max_bin()), (1, 3));
        assert_eq!(h.stats().count(), 6);
    }

    #[test]
    fn test_mode_keeps_first_to_peak() {
        let mut h = Histogram::new("tie");
        h.extend([5.0, 4.0, 4.0, 5.0]);
        assert_eq!(h.mode(), 4);
        assert_eq!(h.peak(), 2);
    }

    #[test]
    fn test_render_pmf() {
        let text = dice().render(&narrow());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "dice PMF:  [1, 3]  μ = 2.33  σ = 0.75");
        assert_eq!(lines.len(), 5);
        assert!(lines[1].ends_with(" ┼╶╶  16.67%  1"), "{}", lines[1]);
        assert!(lines[2].ends_with(" ┼╶╶╶╶  33.33%  2"), "{}", lines[2]);
        assert!(lines[3].ends_with("►┼╶╶╶╶╶╶  50%  3"), "{}", lines[3]);
        assert!(lines[3].starts_with("     3    "));
        assert!(lines[4].starts_with("6 randoms  t = "));
        assert!(lines[4].ends_with(" M / s"));
    }

    #[test]
    fn test_render_cdf() {
        let options = RenderOptions {
            cumulative: true,
            ..narrow()
        };
        let text = dice().render(&options);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("dice CDF:"));
        assert!(lines[1].ends_with("┼╶  16.67%  1"), "{}", lines[1]);
        assert!(lines[2].ends_with("┼╶╶╶  50%  3"), "{}", lines[2]);
        assert!(lines[3].ends_with("┼╶╶╶╶╶╶  100%  6"), "{}", lines[3]);
    }

    #[test]
    fn test_render_zero_bins_and_tail_limit() {
        let mut h = Histogram::new("gaps");
        h.extend([0.0, 0.0, 0.0, 2.0, 10.0]);
        let all = h.render(&RenderOptions {
            tail_limit: None,
            ..narrow()
        });
        assert_eq!(all.lines().count(), 1 + 11 + 1);

        let cut = h.render(&narrow_with_limit(3));
        assert_eq!(cut.lines().count(), 1 + 4 + 1);

        let sparse = h.render(&RenderOptions {
            include_zero_bins: false,
            ..narrow_with_limit(3)
        });
        assert_eq!(sparse.lines().count(), 1 + 3 + 1);
    }

    fn narrow_with_limit(limit: u64) -> RenderOptions {
        RenderOptions {
            tail_limit: Some(limit),
            ..narrow()
        }
    }

    #[test]
    fn test_render_pdf_marks_and_density() {
        let rng = Lcprng::with_seed(11);
        let mut h = Histogram::with_binning(
            "Exponential (λ = 2)",
            Binning::new(LinearMap::scale(1.0, 5.0), Quantization::Floor),
        );
        h.set_expected(0.5, 0.5);
        for _ in 0..50_000 {
            h.add(exponential(2.0, &rng));
        }
        let text = h.render(&RenderOptions {
            tail_limit: Some(10),
            ..RenderOptions::default()
        });
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Exponential (λ = 2) PDF:  [0"));
        assert!(lines[0].ends_with("(expected = 0.5 ± 0.5)"));
        assert_eq!(lines.iter().filter(|l| l.contains(MARK_PEAK)).count(), 1);
        // first bin [0, 0.2) holds 1 − e^-0.4 ≈ 0.33 of the mass: density ≈ 1.65
        assert!(lines[1].contains(MARK_PEAK));
        assert!(lines[1].contains("  1.6"), "{}", lines[1]);
        assert!(lines[2].contains("│"));
    }

    #[test]
    fn test_bottom_mark_only_for_pdf() {
        let mut h = Histogram::new("halves");
        h.extend([0.5, 0.5, 1.5, 1.4, 2.5]);
        let text = h.render(&RenderOptions::default());
        assert!(text.contains(MARK_BOTTOM));
        assert!(!dice().render(&RenderOptions::default()).contains(MARK_BOTTOM));
    }

    #[test]
    fn test_non_finite_values_land_in_extreme_bins() {
        let mut h = Histogram::new("overflow");
        h.extend([1.0, 1.0, f64::INFINITY, f64::NAN, f64::NEG_INFINITY]);
        assert_eq!(h.min_bin(), i64::MIN);
        assert_eq!(h.max_bin(), i64::MAX);
        assert_eq!(h.count(i64::MIN), 1);
        assert_eq!(h.count(i64::MAX), 1);
        assert_eq!(h.count(0), 1);
        assert_eq!(h.count(1), 2);
        assert_eq!((h.mode(), h.peak()), (1, 2));

        let text = h.render(&narrow());
        assert!(text.starts_with("overflow PDF:  [-∞, ∞]  μ = undefined"), "{text}");
        assert_eq!(text.lines().count(), 1 + 51 + 1);

        let sparse = h.render(&RenderOptions {
            include_zero_bins: false,
            tail_limit: None,
            ..narrow()
        });
        assert_eq!(sparse.lines().count(), 1 + 4 + 1);
    }

    #[test]
    fn test_render_empty() {
        let h = Histogram::new("empty");
        let text = h.render(&RenderOptions::default());
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("empty PMF:  [0, 0]  μ = 0  σ = 0"));
    }

    #[test]
    fn test_reset_swaps_binning_and_clears() {
        let rng = Lcprng::with_seed(3);
        let mut h = Histogram::new("gauss");
        h.set_expected(0.0, 1.0);
        for _ in 0..1000 {
            h.add(gauss(&rng));
        }
        h.reset(Binning::new(LinearMap::scale(1.0, 10.0), Quantization::Ceil));
        assert_eq!(h.title(), "gauss");
        assert_eq!(h.stats().count(), 0);
        assert_eq!(h.peak(), 0);
        assert!(!h.render(&RenderOptions::default()).contains("expected"));
        assert_eq!(h.bin(0.11), 2);
    }

    #[test]
    fn test_render_options_serde_defaults() {
        let options: RenderOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, RenderOptions::default());
        let options: RenderOptions =
            serde_json::from_str(r#"{"width": 60, "tail_limit": null, "cumulative": true}"#).unwrap();
        assert_eq!(options.width, 60);
        assert_eq!(options.tail_limit, None);
        assert!(options.cumulative);
        assert!(options.include_zero_bins);
        let q: Quantization = serde_json::from_str(r#""ceil""#).unwrap();
        assert_eq!(q, Quantization::Ceil);
    }

    #[test]
    fn test_short_formatting() {
        assert_eq!(short(2.0), "2");
        assert_eq!(short(2.5), "2.5");
        assert_eq!(short(0.126), "0.13");
        assert_eq!(short(100.0), "100");
        assert_eq!(short(f64::INFINITY), "∞");
        assert_eq!(short(f64::NEG_INFINITY), "-∞");
        assert_eq!(short(f64::NAN), "undefined");
        assert_eq!(trim_zeros("     1.500", " "), "     1.5  ");
        assert_eq!(trim_zeros("    10.000", " "), "    10    ");
    }
}
