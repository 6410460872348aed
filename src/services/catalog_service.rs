//! Catalog Service
//!
//! Reference data used by pricing: sizes, channels and menu items.
//! Every write refreshes the reference cache in `AppState`.

use crate::db::sqlite::models::{CreateMenuItemRequest, MenuItem};
use crate::error::{AppError, Result};
use crate::finance::size_scaling::SizeKey;
use crate::finance::types::{Channel, Size};
use crate::services::settings_service::{validate_percentage, validate_price_load};
use crate::state::AppState;
use tracing::info;

pub struct CatalogService;

impl CatalogService {
    pub fn create_menu_item(state: &AppState, request: CreateMenuItemRequest) -> Result<MenuItem> {
        info!("CatalogService::create_menu_item - {}", request.name);

        if request.name.trim().is_empty() {
            return Err(AppError::Validation("Menu item name is required".to_string()));
        }

        state.sqlite.create_menu_item(&request)
    }

    pub fn list_menu_items(state: &AppState) -> Result<Vec<MenuItem>> {
        state.sqlite.list_menu_items()
    }

    /// Create or update a channel by key
    pub fn upsert_channel(state: &AppState, channel: Channel) -> Result<Channel> {
        info!("CatalogService::upsert_channel - {}", channel.key);

        if channel.key.trim().is_empty() || channel.name.trim().is_empty() {
            return Err(AppError::Validation("Channel key and name are required".to_string()));
        }
        validate_percentage("tax_perc", channel.tax_perc)?;
        validate_percentage("target_margin_perc", channel.target_margin_perc)?;
        validate_percentage("online_payment_tax_perc", channel.online_payment_tax_perc)?;
        if !channel.fee_amount.is_finite() || channel.fee_amount < 0.0 {
            return Err(AppError::Validation(format!(
                "fee_amount must be a non-negative number, got {}",
                channel.fee_amount
            )));
        }

        validate_price_load(state.sqlite.get_overhead()?.dna_percentage, &channel)?;

        let stored = state.sqlite.upsert_channel(&channel)?;
        state.refresh_reference_cache()?;

        Ok(stored)
    }

    /// Set packaging and dough cost of a size
    pub fn update_size_costs(
        state: &AppState,
        size_id: &str,
        packaging_cost_amount: f64,
        dough_cost_amount: f64,
    ) -> Result<Size> {
        info!(
            "CatalogService::update_size_costs - {} packaging={} dough={}",
            size_id, packaging_cost_amount, dough_cost_amount
        );

        for (field, value) in [
            ("packaging_cost_amount", packaging_cost_amount),
            ("dough_cost_amount", dough_cost_amount),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::Validation(format!(
                    "{} must be a non-negative number, got {}",
                    field, value
                )));
            }
        }

        let current = state
            .sqlite
            .get_size(size_id)?
            .ok_or_else(|| AppError::NotFound(format!("size '{}'", size_id)))?;

        // Size rows outside the scaling table are a configuration defect
        current.key.parse::<SizeKey>()?;

        let size = state
            .sqlite
            .update_size_costs(size_id, packaging_cost_amount, dough_cost_amount)?
            .ok_or_else(|| AppError::NotFound(format!("size '{}'", size_id)))?;

        state.refresh_reference_cache()?;

        Ok(size)
    }
}
