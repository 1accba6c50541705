//! Aligner configuration.
//!
//! Only the options the core consumes live here; everything that belongs to
//! a rendering collaborator (colors, spacing, interaction toggles) stays with
//! the caller.

use serde::{Deserialize, Serialize};

use crate::AlignError;

/// Configuration consumed by the alignment core.
///
/// ## Parameters
///
/// - `normalize`: lowercase and strip the fixed punctuation set before
///   tokenizing
/// - `consensus`: boost match pairs corroborated through third tokens and
///   process pairs in descending score order
/// - `edit_distance`: maximum normalized edit distance
///   `2·lev(a,b)/(|a|+|b|)` for a fuzzy token match; `None` means exact
///   matching only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignerOptions {
    /// Lowercase and strip punctuation during normalization.
    pub normalize: bool,
    /// Enable consensus scoring of match pairs.
    pub consensus: bool,
    /// Fuzzy-match threshold in `(0, 1]`, or `None` for exact matching.
    pub edit_distance: Option<f64>,
}

impl Default for AlignerOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            consensus: true,
            edit_distance: None,
        }
    }
}

impl AlignerOptions {
    /// Exact-match configuration with normalization and consensus enabled.
    pub fn exact() -> Self {
        Self::default()
    }

    /// Fuzzy-match configuration with the given threshold.
    pub fn fuzzy(threshold: f64) -> Self {
        Self {
            edit_distance: Some(threshold),
            ..Self::default()
        }
    }

    /// Check that the options are internally consistent.
    pub fn validate(&self) -> Result<(), AlignError> {
        if let Some(threshold) = self.edit_distance {
            if !threshold.is_finite() || threshold <= 0.0 || threshold > 1.0 {
                return Err(AlignError::InvalidThreshold(threshold));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_validate() {
        assert!(AlignerOptions::default().validate().is_ok());
    }

    #[test]
    fn threshold_bounds_are_enforced() {
        assert!(AlignerOptions::fuzzy(0.5).validate().is_ok());
        assert!(AlignerOptions::fuzzy(1.0).validate().is_ok());
        assert!(AlignerOptions::fuzzy(0.0).validate().is_err());
        assert!(AlignerOptions::fuzzy(1.5).validate().is_err());
        assert!(AlignerOptions::fuzzy(f64::NAN).validate().is_err());
    }
}
