//! Settings Service
//!
//! Overhead configuration (dna and waste percentages).

use crate::error::{AppError, Result};
use crate::finance::types::{Channel, OverheadConfig};
use crate::state::AppState;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Partial overhead update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverheadUpdate {
    pub dna_percentage: Option<f64>,
    pub waste_percentage: Option<f64>,
}

pub struct SettingsService;

impl SettingsService {
    /// Overhead currently used for pricing
    pub fn get_overhead(state: &AppState) -> OverheadConfig {
        state.get_overhead()
    }

    /// Update overhead and refresh the cached copy
    pub fn update_overhead(state: &AppState, update: OverheadUpdate) -> Result<OverheadConfig> {
        info!("SettingsService::update_overhead - {:?}", update);

        if let Some(dna) = update.dna_percentage {
            validate_percentage("dna_percentage", dna)?;
        }
        if let Some(waste) = update.waste_percentage {
            validate_percentage("waste_percentage", waste)?;
        }

        if let Some(dna) = update.dna_percentage {
            for channel in state.sqlite.list_channels()? {
                validate_price_load(dna, &channel)?;
            }
        }

        let overhead = state
            .sqlite
            .update_overhead(update.dna_percentage, update.waste_percentage)?;
        state.set_overhead(overhead);

        Ok(overhead)
    }
}

/// Percentages must be finite and within 0..100
pub(crate) fn validate_percentage(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..100.0).contains(&value) {
        return Err(AppError::Validation(format!(
            "{} must be between 0 and 100, got {}",
            field, value
        )));
    }
    Ok(())
}

/// dna and channel margin together must leave part of the price to cover cost
pub(crate) fn validate_price_load(dna_percentage: f64, channel: &Channel) -> Result<()> {
    if dna_percentage + channel.target_margin_perc >= 100.0 {
        return Err(AppError::Validation(format!(
            "dna_percentage ({}) plus target margin of channel '{}' ({}) must stay below 100",
            dna_percentage, channel.key, channel.target_margin_perc
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_refreshes_cache() {
        let state = AppState::in_memory().unwrap();
        let overhead = SettingsService::update_overhead(
            &state,
            OverheadUpdate {
                dna_percentage: Some(11.0),
                waste_percentage: Some(3.0),
            },
        )
        .unwrap();

        assert_eq!(overhead.dna_percentage, 11.0);
        assert_eq!(SettingsService::get_overhead(&state), overhead);
        assert_eq!(state.pricing_snapshot().overhead.waste_percentage, 3.0);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let state = AppState::in_memory().unwrap();
        for bad in [-1.0, 100.0, f64::NAN] {
            let err = SettingsService::update_overhead(
                &state,
                OverheadUpdate {
                    dna_percentage: Some(bad),
                    waste_percentage: None,
                },
            )
            .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        assert_eq!(state.get_overhead(), OverheadConfig::default());
    }

    #[test]
    fn test_rejects_dna_that_leaves_no_room_for_channel_margin() {
        let state = AppState::in_memory().unwrap();
        state
            .sqlite
            .upsert_channel(&Channel {
                key: "cardapio".to_string(),
                name: "Storefront".to_string(),
                target_margin_perc: 50.0,
                ..Default::default()
            })
            .unwrap();

        let err = SettingsService::update_overhead(
            &state,
            OverheadUpdate {
                dna_percentage: Some(60.0),
                waste_percentage: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(state.sqlite.get_overhead().unwrap().dna_percentage, 0.0);

        SettingsService::update_overhead(
            &state,
            OverheadUpdate {
                dna_percentage: Some(49.0),
                waste_percentage: None,
            },
        )
        .unwrap();
    }
}
