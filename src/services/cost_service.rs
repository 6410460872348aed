//! Cost Service
//!
//! Builds the ingredient cost sheet of every menu item: stored cost per size,
//! the cost recommended from the medium size and the warnings raised on it.

use crate::db::sqlite::models::{CostVariation, MenuItem};
use crate::error::{AppError, Result};
use crate::finance::size_scaling::{recommended_cost, SizeKey};
use crate::finance::types::{PricingSnapshot, Size};
use crate::finance::warnings::{detect_item_cost_warnings, ItemVisibility, Warning};
use crate::state::AppState;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// One size of an item cost sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostSheetRow {
    pub size_id: String,
    pub size_key: String,
    pub size_name: String,
    pub cost_amount: f64,
    pub previous_cost_amount: f64,
    pub recommended_cost_amount: f64,
    pub warnings: Vec<Warning>,
    pub updated_by: Option<String>,
    pub updated_at: Option<String>,
}

/// Costs of one menu item across every size
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCostSheet {
    pub menu_item_id: String,
    pub name: String,
    pub active: bool,
    pub visible: bool,
    /// Medium-size cost every recommendation scales from
    pub reference_cost_amount: f64,
    pub rows: Vec<CostSheetRow>,
}

/// Cost write request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCostRequest {
    pub menu_item_id: String,
    pub size_id: String,
    pub cost_amount: f64,
    pub updated_by: Option<String>,
}

pub struct CostService;

impl CostService {
    /// Cost sheets of every menu item
    pub fn cost_sheets(state: &AppState) -> Result<Vec<ItemCostSheet>> {
        let snapshot = state.pricing_snapshot();
        let items = state.sqlite.list_menu_items()?;

        let mut by_item: HashMap<String, Vec<CostVariation>> = HashMap::new();
        for variation in state.sqlite.list_cost_variations()? {
            by_item
                .entry(variation.menu_item_id.clone())
                .or_default()
                .push(variation);
        }

        debug!(
            "CostService::cost_sheets - {} items, {} sizes",
            items.len(),
            snapshot.sizes.len()
        );

        items
            .iter()
            .map(|item| {
                let variations = by_item.remove(&item.id).unwrap_or_default();
                build_cost_sheet(item, &variations, &snapshot)
            })
            .collect()
    }

    /// Cost sheet of one item
    pub fn item_cost_sheet(state: &AppState, menu_item_id: &str) -> Result<ItemCostSheet> {
        let snapshot = state.pricing_snapshot();
        let item = state
            .sqlite
            .get_menu_item(menu_item_id)?
            .ok_or_else(|| AppError::NotFound(format!("menu item '{}'", menu_item_id)))?;
        let variations = state.sqlite.get_item_cost_variations(menu_item_id)?;

        build_cost_sheet(&item, &variations, &snapshot)
    }

    /// Write the cost of one (item, size) and return the refreshed sheet row
    pub fn update_cost(state: &AppState, request: UpdateCostRequest) -> Result<CostSheetRow> {
        info!(
            "CostService::update_cost - item={} size={} cost={}",
            request.menu_item_id, request.size_id, request.cost_amount
        );

        if !request.cost_amount.is_finite() {
            return Err(AppError::Validation(format!(
                "cost_amount must be a finite number, got {}",
                request.cost_amount
            )));
        }

        if state.sqlite.get_menu_item(&request.menu_item_id)?.is_none() {
            return Err(AppError::NotFound(format!("menu item '{}'", request.menu_item_id)));
        }
        let size = state
            .sqlite
            .get_size(&request.size_id)?
            .ok_or_else(|| AppError::NotFound(format!("size '{}'", request.size_id)))?;
        size.key.parse::<SizeKey>()?;

        state.sqlite.upsert_cost_variation(
            &request.menu_item_id,
            &request.size_id,
            request.cost_amount,
            request.updated_by.as_deref(),
        )?;

        let sheet = Self::item_cost_sheet(state, &request.menu_item_id)?;
        sheet
            .rows
            .into_iter()
            .find(|row| row.size_id == size.id)
            .ok_or_else(|| AppError::Internal(format!("size '{}' missing from cost sheet", size.key)))
    }
}

fn build_cost_sheet(
    item: &MenuItem,
    variations: &[CostVariation],
    snapshot: &PricingSnapshot,
) -> Result<ItemCostSheet> {
    let visibility = ItemVisibility {
        active: item.active,
        visible: item.visible,
    };

    let reference_cost = variations
        .iter()
        .find(|v| v.size_key == SizeKey::REFERENCE.as_str())
        .map(|v| v.cost_amount)
        .unwrap_or(0.0);

    for variation in variations {
        if snapshot.size_by_key(&variation.size_key).is_none() {
            warn!(
                "Cost of '{}' references uncached size {}",
                item.name, variation.size_key
            );
        }
    }

    let rows = snapshot
        .sizes
        .iter()
        .map(|size| {
            let variation = variations.iter().find(|v| v.size_id == size.id);
            build_row(item, visibility, size, variation, reference_cost)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ItemCostSheet {
        menu_item_id: item.id.clone(),
        name: item.name.clone(),
        active: item.active,
        visible: item.visible,
        reference_cost_amount: reference_cost,
        rows,
    })
}

fn build_row(
    item: &MenuItem,
    visibility: ItemVisibility,
    size: &Size,
    variation: Option<&CostVariation>,
    reference_cost: f64,
) -> Result<CostSheetRow> {
    let recommended = recommended_cost(&size.key, reference_cost)?;
    let cost_amount = variation.map(|v| v.cost_amount).unwrap_or(0.0);
    let previous_cost_amount = variation.map(|v| v.previous_cost_amount).unwrap_or(0.0);

    let label = format!("{} ({})", item.name, size.name);
    let warnings = detect_item_cost_warnings(visibility, cost_amount, previous_cost_amount, recommended, &label);

    Ok(CostSheetRow {
        size_id: size.id.clone(),
        size_key: size.key.clone(),
        size_name: size.name.clone(),
        cost_amount,
        previous_cost_amount,
        recommended_cost_amount: recommended,
        warnings,
        updated_by: variation.and_then(|v| v.updated_by.clone()),
        updated_at: variation.map(|v| v.updated_at.clone()),
    })
}
