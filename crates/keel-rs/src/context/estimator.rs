//! Token estimation policy.
//!
//! Token counts are approximations derived from character counts. The ratio
//! is a policy, not a property of any tokenizer, so it sits behind the
//! [`TokenEstimator`] trait and can be swapped per provider.

use std::fmt;

/// Default characters per token.
pub const DEFAULT_CHARS_PER_TOKEN: f64 = 4.0;

/// Estimates how many tokens a piece of text costs.
pub trait TokenEstimator: Send + Sync + fmt::Debug {
    fn estimate(&self, text: &str) -> usize;
}

/// Estimates tokens as `bytes / chars_per_token`, rounded down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharRatioEstimator {
    chars_per_token: f64,
}

impl CharRatioEstimator {
    /// Create an estimator with the given ratio. Non-finite or non-positive
    /// ratios fall back to [`DEFAULT_CHARS_PER_TOKEN`].
    pub fn new(chars_per_token: f64) -> Self {
        let chars_per_token = if chars_per_token.is_finite() && chars_per_token > 0.0 {
            chars_per_token
        } else {
            DEFAULT_CHARS_PER_TOKEN
        };
        Self { chars_per_token }
    }

    pub fn chars_per_token(&self) -> f64 {
        self.chars_per_token
    }
}

impl Default for CharRatioEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_CHARS_PER_TOKEN)
    }
}

impl TokenEstimator for CharRatioEstimator {
    fn estimate(&self, text: &str) -> usize {
        (text.len() as f64 / self.chars_per_token) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_four_chars_per_token() {
        let est = CharRatioEstimator::default();
        assert_eq!(est.estimate(""), 0);
        assert_eq!(est.estimate("abc"), 0);
        assert_eq!(est.estimate("abcd"), 1);
        assert_eq!(est.estimate(&"x".repeat(400)), 100);
    }

    #[test]
    fn custom_ratio() {
        let est = CharRatioEstimator::new(2.0);
        assert_eq!(est.estimate(&"x".repeat(10)), 5);
    }

    #[test]
    fn invalid_ratio_falls_back() {
        assert_eq!(CharRatioEstimator::new(0.0).chars_per_token(), DEFAULT_CHARS_PER_TOKEN);
        assert_eq!(CharRatioEstimator::new(-3.0).chars_per_token(), DEFAULT_CHARS_PER_TOKEN);
        assert_eq!(
            CharRatioEstimator::new(f64::NAN).chars_per_token(),
            DEFAULT_CHARS_PER_TOKEN
        );
    }
}
