//! Size-scaling cost recommender
//!
//! Ingredient cost of every pizza size is derived from the medium size
//! through a fixed multiplier table.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of pizza sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SizeKey {
    #[serde(rename = "pizza-slice")]
    Slice,
    #[serde(rename = "pizza-individual")]
    Individual,
    #[serde(rename = "pizza-small")]
    Small,
    #[serde(rename = "pizza-medium")]
    Medium,
    #[serde(rename = "pizza-big")]
    Big,
    #[serde(rename = "pizza-bigger")]
    Bigger,
}

impl SizeKey {
    /// Size every other recommendation is scaled from
    pub const REFERENCE: SizeKey = SizeKey::Medium;

    pub const ALL: [SizeKey; 6] = [
        SizeKey::Slice,
        SizeKey::Individual,
        SizeKey::Small,
        SizeKey::Medium,
        SizeKey::Big,
        SizeKey::Bigger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeKey::Slice => "pizza-slice",
            SizeKey::Individual => "pizza-individual",
            SizeKey::Small => "pizza-small",
            SizeKey::Medium => "pizza-medium",
            SizeKey::Big => "pizza-big",
            SizeKey::Bigger => "pizza-bigger",
        }
    }

    /// Multiplier relative to the medium size
    pub fn factor(&self) -> f64 {
        match self {
            SizeKey::Slice => 0.25,
            SizeKey::Individual => 0.5,
            SizeKey::Small => 0.75,
            SizeKey::Medium => 1.0,
            SizeKey::Big => 1.25,
            SizeKey::Bigger => 2.0,
        }
    }
}

impl fmt::Display for SizeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        SizeKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| AppError::InvalidSizeKey(s.to_string()))
    }
}

/// Recommended cost of one unit of `size_key`, given the medium-size cost
pub fn recommended_cost(size_key: &str, reference_cost: f64) -> Result<f64> {
    let size: SizeKey = size_key.parse()?;
    Ok(recommended_cost_for(size, reference_cost))
}

pub fn recommended_cost_for(size: SizeKey, reference_cost: f64) -> f64 {
    reference_cost * size.factor()
}

/// Recommended cost of every size, in table order
pub fn recommended_costs_for_all(reference_cost: f64) -> Vec<(SizeKey, f64)> {
    SizeKey::ALL
        .into_iter()
        .map(|size| (size, recommended_cost_for(size, reference_cost)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_is_quarter_of_reference() {
        assert_eq!(recommended_cost("pizza-slice", 24.0).unwrap(), 6.0);
    }

    #[test]
    fn test_medium_is_identity() {
        for reference in [0.0, 1.5, 24.0, 317.33] {
            assert_eq!(recommended_cost("pizza-medium", reference).unwrap(), reference);
        }
    }

    #[test]
    fn test_every_size_scales_by_factor() {
        let reference = 20.0;
        assert_eq!(recommended_cost("pizza-individual", reference).unwrap(), 10.0);
        assert_eq!(recommended_cost("pizza-small", reference).unwrap(), 15.0);
        assert_eq!(recommended_cost("pizza-big", reference).unwrap(), 25.0);
        assert_eq!(recommended_cost("pizza-bigger", reference).unwrap(), 40.0);
    }

    #[test]
    fn test_unknown_size_is_rejected() {
        let result = recommended_cost("pizza-family", 10.0);
        assert!(matches!(result, Err(AppError::InvalidSizeKey(key)) if key == "pizza-family"));
    }

    #[test]
    fn test_all_sizes_in_table_order() {
        let all = recommended_costs_for_all(8.0);
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], (SizeKey::Slice, 2.0));
        assert_eq!(all[3], (SizeKey::Medium, 8.0));
        assert_eq!(all[5], (SizeKey::Bigger, 16.0));
    }

    #[test]
    fn test_key_round_trip_through_str() {
        for key in SizeKey::ALL {
            assert_eq!(key.as_str().parse::<SizeKey>().unwrap(), key);
        }
    }
}
