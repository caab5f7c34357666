// config.rs

use crate::error::ClumpError;

/// Thresholds and window width shared by every stage of region detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClumpConfig {
    /// Markers at or below this p-value seed a region.
    pub index_threshold: f64,
    /// Markers at or below this p-value extend and populate a region.
    pub suggestive_threshold: f64,
    /// Half-width in base pairs of each expansion step.
    pub search_space: u64,
}

impl ClumpConfig {
    pub fn new(
        index_threshold: f64,
        suggestive_threshold: f64,
        search_space: u64,
    ) -> Result<Self, ClumpError> {
        for (label, value) in [
            ("index", index_threshold),
            ("suggestive", suggestive_threshold),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ClumpError::InvalidConfig(format!(
                    "{} p-value threshold must be within [0, 1], got {}",
                    label, value
                )));
            }
        }
        if index_threshold > suggestive_threshold {
            return Err(ClumpError::InvalidConfig(format!(
                "index threshold ({}) must not exceed suggestive threshold ({})",
                index_threshold, suggestive_threshold
            )));
        }
        Ok(Self {
            index_threshold,
            suggestive_threshold,
            search_space,
        })
    }

    #[inline]
    pub fn is_index(&self, p_value: f64) -> bool {
        p_value <= self.index_threshold
    }

    #[inline]
    pub fn is_suggestive(&self, p_value: f64) -> bool {
        p_value <= self.suggestive_threshold
    }
}
