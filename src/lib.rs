//! # u-variate
//!
//! Deterministic pseudorandom variates for the U-Engine ecosystem.
//!
//! Everything in this crate is driven by a single 64-bit [`BitEngine`].
//! Seeded explicitly, an engine reproduces the same stream of integers,
//! permutations and variates bit-for-bit on every platform, which makes
//! Monte Carlo runs and randomized tests replayable.
//!
//! ## Modules
//!
//! - [`engine`] — LCG and xorshift bit engines, seeding, reversibility
//! - [`uniform`] — Unbiased reduction of raw words to integers, floats and coins
//! - [`random`] — Shuffles, combinations, weighted choice, races, riffles
//! - [`distributions`] — Samplers for nearly sixty continuous and discrete laws
//! - [`exact`] — Closed-form combinatorics and probability mass functions
//! - [`stats`] — Online statistics, compensated summation, goodness of fit
//! - [`histogram`] — Binned text histograms for eyeballing sampler output
//! - [`special`] — Gamma-family special functions backing the validation
//! - [`config`] — Engine seeding from configuration or the environment
//! - [`error`] — Error types
//!
//! ## Example
//!
//! ```
//! use u_variate::{Lcprng, UniformReduction};
//! use u_variate::distributions::normal;
//! use u_variate::random::shuffle;
//!
//! let rng = Lcprng::with_seed(42);
//! let die = rng.int(1, 6);
//! assert!((1..=6).contains(&die));
//!
//! let mut deck: Vec<u32> = (1..=52).collect();
//! shuffle(&mut deck, &rng);
//!
//! let height = normal(170.0, 8.0, &rng);
//! assert!(height.is_finite());
//! ```
//!
//! ## Design Philosophy
//!
//! - **Reproducibility first**: one engine, one sequence, no hidden
//!   global state in library code
//! - **Total samplers**: degenerate parameters return documented
//!   degenerate values instead of panicking
//! - **Statistical testing**: sampler output checked against exact
//!   moments and probability mass functions via chi-squared and proptest

pub mod config;
pub mod distributions;
pub mod engine;
pub mod error;
pub mod exact;
pub mod histogram;
pub mod random;
pub mod special;
pub mod stats;
pub mod uniform;

pub use engine::{shared, BitEngine, Lcprng, XorShift};
pub use error::{ConfigError, SamplingError};
pub use uniform::{censor, UniformReduction};
