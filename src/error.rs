//! Error types.
//!
//! Samplers in this crate are total: degenerate parameters produce a
//! documented degenerate value instead of an error. The variants below
//! cover the few inputs that are inconsistent rather than degenerate,
//! plus configuration parsing.

use thiserror::Error;

/// Inconsistent input to a combinatorial primitive or sampler.
///
/// # Examples
/// ```
/// use u_variate::SamplingError;
///
/// let err = SamplingError::NegativeWeight { index: 2, weight: -5 };
/// assert_eq!(err.to_string(), "negative weight -5 at index 2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SamplingError {
    /// Selection from an empty population.
    #[error("cannot select from an empty population")]
    EmptyPopulation,

    /// A weight table contains a negative mass.
    #[error("negative weight {weight} at index {index}")]
    NegativeWeight {
        /// Position of the offending weight.
        index: usize,
        /// The negative weight itself.
        weight: i64,
    },

    /// Population counts that cannot describe a real urn.
    #[error("inconsistent counts: miss={miss}, succ={succ}, size={size}")]
    InconsistentCounts {
        /// Failures that end the draw.
        miss: u64,
        /// Successes in the population.
        succ: u64,
        /// Population size.
        size: u64,
    },
}

/// Engine configuration could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A seed token is neither decimal nor `0x` hexadecimal.
    #[error("invalid seed {value:?}: expected decimal or 0x-prefixed hexadecimal u64")]
    InvalidSeed {
        /// The token as it appeared in the input.
        value: String,
    },

    /// The seed variable is set but not valid unicode.
    #[error("environment variable {name} is not valid unicode")]
    Env {
        /// Variable name.
        name: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampling_error_display() {
        assert_eq!(
            SamplingError::EmptyPopulation.to_string(),
            "cannot select from an empty population"
        );
        let err = SamplingError::InconsistentCounts {
            miss: 7,
            succ: 3,
            size: 8,
        };
        assert!(err.to_string().contains("miss=7"));
        assert!(err.to_string().contains("size=8"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidSeed {
            value: "0xZZ".to_string(),
        };
        assert!(err.to_string().contains("\"0xZZ\""));
        let err = ConfigError::Env {
            name: "U_VARIATE_SEEDS",
        };
        assert!(err.to_string().contains("U_VARIATE_SEEDS"));
    }
}
