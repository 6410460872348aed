//! Selling Price Service
//!
//! Computes channel prices for the catalog, compares them with the prices
//! actually charged and records every price change with an audit snapshot.

use crate::db::sqlite::models::{
    MenuItem, NewSellPriceAudit, SellPriceAudit, SellPriceVariation, SellPriceWrite,
};
use crate::error::{AppError, Result};
use crate::finance::selling_price::{price_for_channel, profit_perc_from_selling_price, SellingPriceBreakdown};
use crate::finance::size_scaling::SizeKey;
use crate::finance::warnings::{detect_sell_price_warnings, ItemVisibility, Warning};
use crate::state::AppState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

/// Optional filters for the price table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SellPriceFilter {
    pub menu_item_id: Option<String>,
    pub size_key: Option<String>,
    pub channel_key: Option<String>,
}

/// One (item, size, channel) cell of the price table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellPriceRow {
    pub menu_item_id: String,
    pub item_name: String,
    pub size_id: String,
    pub size_key: String,
    pub channel_id: String,
    pub channel_key: String,
    pub price_amount: f64,
    pub previous_price_amount: f64,
    pub discount_percentage: f64,
    /// Profit share left by the price actually charged (%)
    pub profit_actual_perc: f64,
    pub breakdown: SellingPriceBreakdown,
    pub warnings: Vec<Warning>,
}

/// Price write request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSellPriceRequest {
    pub menu_item_id: String,
    pub size_id: String,
    pub channel_id: String,
    pub price_amount: f64,
    #[serde(default)]
    pub discount_percentage: f64,
    pub updated_by: Option<String>,
}

/// Outcome of a price write
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSellPriceResult {
    pub variation: SellPriceVariation,
    pub price_expected_amount: f64,
    pub profit_expected_perc: f64,
    pub profit_actual_perc: f64,
}

pub struct SellingPriceService;

impl SellingPriceService {
    /// Price table across items, sizes and channels
    pub fn price_table(state: &AppState, filter: &SellPriceFilter) -> Result<Vec<SellPriceRow>> {
        let snapshot = state.pricing_snapshot();

        let items: Vec<MenuItem> = state
            .sqlite
            .list_menu_items()?
            .into_iter()
            .filter(|i| filter.menu_item_id.as_ref().map_or(true, |id| &i.id == id))
            .collect();

        let recipe_costs: HashMap<(String, String), f64> = state
            .sqlite
            .list_cost_variations()?
            .into_iter()
            .map(|v| ((v.menu_item_id, v.size_id), v.cost_amount))
            .collect();

        let prices: HashMap<(String, String, String), SellPriceVariation> = state
            .sqlite
            .list_sell_prices()?
            .into_iter()
            .map(|p| ((p.menu_item_id.clone(), p.size_id.clone(), p.channel_id.clone()), p))
            .collect();

        let sizes: Vec<_> = snapshot
            .sizes
            .iter()
            .filter(|s| filter.size_key.as_ref().map_or(true, |k| &s.key == k))
            .collect();
        let channels: Vec<_> = snapshot
            .channels
            .iter()
            .filter(|c| filter.channel_key.as_ref().map_or(true, |k| &c.key == k))
            .collect();

        debug!(
            "SellingPriceService::price_table - {} items x {} sizes x {} channels",
            items.len(),
            sizes.len(),
            channels.len()
        );

        let mut rows = Vec::with_capacity(items.len() * sizes.len() * channels.len());

        for item in &items {
            let visibility = ItemVisibility {
                active: item.active,
                visible: item.visible,
            };

            for size in &sizes {
                let recipe_cost = recipe_costs
                    .get(&(item.id.clone(), size.id.clone()))
                    .copied()
                    .unwrap_or(0.0);

                for channel in &channels {
                    let breakdown =
                        price_for_channel(Some(*channel), recipe_cost, Some(*size), &snapshot.overhead);
                    let stored = prices.get(&(item.id.clone(), size.id.clone(), channel.id.clone()));
                    let price_amount = stored.map(|p| p.price_amount).unwrap_or(0.0);

                    let label = format!("{} ({}, {})", item.name, size.name, channel.name);
                    let warnings = detect_sell_price_warnings(
                        visibility,
                        &size.key,
                        &label,
                        breakdown.minimum_price.price_amount.with_profit,
                        price_amount,
                    );

                    rows.push(SellPriceRow {
                        menu_item_id: item.id.clone(),
                        item_name: item.name.clone(),
                        size_id: size.id.clone(),
                        size_key: size.key.clone(),
                        channel_id: channel.id.clone(),
                        channel_key: channel.key.clone(),
                        price_amount,
                        previous_price_amount: stored.map(|p| p.previous_price_amount).unwrap_or(0.0),
                        discount_percentage: stored.map(|p| p.discount_percentage).unwrap_or(0.0),
                        profit_actual_perc: profit_perc_from_selling_price(
                            price_amount,
                            &breakdown.cost_base(),
                            snapshot.overhead.dna_percentage,
                        ),
                        breakdown,
                        warnings,
                    });
                }
            }
        }

        Ok(rows)
    }

    /// Computed price of one item size on one channel.
    ///
    /// Unknown channel keys price with a zero-valued channel.
    pub fn compute_price(
        state: &AppState,
        menu_item_id: &str,
        size_key: &str,
        channel_key: &str,
    ) -> Result<SellingPriceBreakdown> {
        size_key.parse::<SizeKey>()?;

        let snapshot = state.pricing_snapshot();
        let size = snapshot.size_by_key(size_key);
        let recipe_cost = match size {
            Some(size) => state
                .sqlite
                .get_item_cost_variations(menu_item_id)?
                .into_iter()
                .find(|v| v.size_id == size.id)
                .map(|v| v.cost_amount)
                .unwrap_or(0.0),
            None => 0.0,
        };

        Ok(price_for_channel(
            snapshot.channel_by_key(channel_key),
            recipe_cost,
            size,
            &snapshot.overhead,
        ))
    }

    /// Write the price charged for one (item, size, channel)
    pub fn update_sell_price(
        state: &AppState,
        request: UpdateSellPriceRequest,
    ) -> Result<UpdateSellPriceResult> {
        info!(
            "SellingPriceService::update_sell_price - item={} size={} channel={} price={}",
            request.menu_item_id, request.size_id, request.channel_id, request.price_amount
        );

        validate_price_request(&request)?;

        if state.sqlite.get_menu_item(&request.menu_item_id)?.is_none() {
            return Err(AppError::NotFound(format!("menu item '{}'", request.menu_item_id)));
        }
        let size = state
            .sqlite
            .get_size(&request.size_id)?
            .ok_or_else(|| AppError::NotFound(format!("size '{}'", request.size_id)))?;
        let channel = state
            .sqlite
            .get_channel(&request.channel_id)?
            .ok_or_else(|| AppError::NotFound(format!("channel '{}'", request.channel_id)))?;

        let overhead = state.get_overhead();
        let recipe_cost = state
            .sqlite
            .get_item_cost_variations(&request.menu_item_id)?
            .into_iter()
            .find(|v| v.size_id == size.id)
            .map(|v| v.cost_amount)
            .unwrap_or(0.0);

        let breakdown = price_for_channel(Some(&channel), recipe_cost, Some(&size), &overhead);
        let cost_base = breakdown.cost_base();
        let price_expected = breakdown.minimum_price.price_amount.with_profit;
        let profit_expected = profit_perc_from_selling_price(price_expected, &cost_base, overhead.dna_percentage);
        let profit_actual =
            profit_perc_from_selling_price(request.price_amount, &cost_base, overhead.dna_percentage);

        let write = SellPriceWrite {
            menu_item_id: request.menu_item_id.clone(),
            size_id: size.id.clone(),
            channel_id: channel.id.clone(),
            price_amount: request.price_amount,
            discount_percentage: request.discount_percentage,
            updated_by: request.updated_by.clone(),
        };
        let audit = NewSellPriceAudit {
            menu_item_id: request.menu_item_id,
            size_id: size.id,
            channel_id: channel.id,
            recipe_cost_amount: cost_base.recipe_cost_amount,
            packaging_cost_amount: cost_base.packaging_cost_amount,
            dough_cost_amount: cost_base.dough_cost_amount,
            waste_cost_amount: cost_base.waste_cost_amount,
            dna_perc: overhead.dna_percentage,
            selling_price_expected_amount: price_expected,
            profit_expected_perc: profit_expected,
            selling_price_actual_amount: request.price_amount,
            profit_actual_perc: profit_actual,
            updated_by: request.updated_by,
        };

        let variation = state.sqlite.write_sell_price(&write, &audit)?;

        Ok(UpdateSellPriceResult {
            variation,
            price_expected_amount: price_expected,
            profit_expected_perc: profit_expected,
            profit_actual_perc: profit_actual,
        })
    }

    /// Audit trail of one price, newest first
    pub fn price_history(
        state: &AppState,
        menu_item_id: &str,
        size_id: &str,
        channel_id: &str,
    ) -> Result<Vec<SellPriceAudit>> {
        state.sqlite.get_sell_price_audits(menu_item_id, size_id, channel_id)
    }
}

fn validate_price_request(request: &UpdateSellPriceRequest) -> Result<()> {
    if !request.price_amount.is_finite() || request.price_amount < 0.0 {
        return Err(AppError::Validation(format!(
            "price_amount must be a non-negative number, got {}",
            request.price_amount
        )));
    }
    if !request.discount_percentage.is_finite() || !(0.0..=100.0).contains(&request.discount_percentage) {
        return Err(AppError::Validation(format!(
            "discount_percentage must be between 0 and 100, got {}",
            request.discount_percentage
        )));
    }
    Ok(())
}
