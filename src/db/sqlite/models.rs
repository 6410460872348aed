//! SQLite database models

use crate::finance::monthly_close::{MonthlyCloseInput, MonthlyCloseTotals};
use serde::{Deserialize, Serialize};

/// Menu item (only the fields the engine reads)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub visible: bool,
    pub sort_order_index: i32,
    pub created_at: String,
}

/// Create request for a menu item
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMenuItemRequest {
    pub name: String,
    pub active: bool,
    pub visible: bool,
    pub sort_order_index: i32,
}

/// Ingredient cost of one item size
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostVariation {
    pub id: String,
    pub menu_item_id: String,
    pub size_id: String,
    pub size_key: String,
    pub cost_amount: f64,
    /// Value right before the last overwrite
    pub previous_cost_amount: f64,
    pub updated_by: Option<String>,
    pub updated_at: String,
}

/// Selling price of one item size on one channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellPriceVariation {
    pub id: String,
    pub menu_item_id: String,
    pub size_id: String,
    pub size_key: String,
    pub channel_id: String,
    pub channel_key: String,
    pub price_amount: f64,
    /// Value right before the last overwrite
    pub previous_price_amount: f64,
    pub discount_percentage: f64,
    pub updated_by: Option<String>,
    pub updated_at: String,
}

/// Write request for a selling price
#[derive(Debug, Clone, Deserialize)]
pub struct SellPriceWrite {
    pub menu_item_id: String,
    pub size_id: String,
    pub channel_id: String,
    pub price_amount: f64,
    pub discount_percentage: f64,
    pub updated_by: Option<String>,
}

/// Snapshot of the pricing inputs at the moment a price was changed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellPriceAudit {
    pub id: String,
    pub menu_item_id: String,
    pub size_id: String,
    pub channel_id: String,
    pub recipe_cost_amount: f64,
    pub packaging_cost_amount: f64,
    pub dough_cost_amount: f64,
    pub waste_cost_amount: f64,
    pub dna_perc: f64,
    pub selling_price_expected_amount: f64,
    pub profit_expected_perc: f64,
    pub selling_price_actual_amount: f64,
    pub profit_actual_perc: f64,
    pub updated_by: Option<String>,
    pub created_at: String,
}

/// Audit values captured by a price write
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSellPriceAudit {
    pub menu_item_id: String,
    pub size_id: String,
    pub channel_id: String,
    pub recipe_cost_amount: f64,
    pub packaging_cost_amount: f64,
    pub dough_cost_amount: f64,
    pub waste_cost_amount: f64,
    pub dna_perc: f64,
    pub selling_price_expected_amount: f64,
    pub profit_expected_perc: f64,
    pub selling_price_actual_amount: f64,
    pub profit_actual_perc: f64,
    pub updated_by: Option<String>,
}

/// Stored monthly close: raw figures plus the totals derived from them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyCloseRecord {
    pub id: String,
    pub input: MonthlyCloseInput,
    pub totals: MonthlyCloseTotals,
    pub created_at: String,
    pub updated_at: String,
}
