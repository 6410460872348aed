//! Reference data consumed by the pricing engine

use serde::{Deserialize, Serialize};

/// Product size with its fixed per-unit costs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub id: String,
    pub key: String,
    pub name: String,
    pub sort_order_index: i32,
    pub packaging_cost_amount: f64,
    pub dough_cost_amount: f64,
}

/// Sales channel (storefront, delivery marketplace, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub key: String,
    pub name: String,
    pub is_marketplace: bool,
    /// Per-transaction fee charged by the channel (%)
    pub tax_perc: f64,
    /// Flat fee, informational only
    pub fee_amount: f64,
    /// Informational only
    pub online_payment_tax_perc: f64,
    /// Desired profit margin (%)
    pub target_margin_perc: f64,
}

/// Company-wide overhead configuration.
///
/// `dna_percentage` is the fixed-cost + card-fee + tax load expressed as a
/// percentage of revenue. `waste_percentage` is the expected ingredient loss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OverheadConfig {
    pub dna_percentage: f64,
    pub waste_percentage: f64,
}

/// Reference data held constant across one batch computation
#[derive(Debug, Clone, Default, Serialize)]
pub struct PricingSnapshot {
    pub sizes: Vec<Size>,
    pub channels: Vec<Channel>,
    pub overhead: OverheadConfig,
}

impl PricingSnapshot {
    /// Sizes ordered by sort index then key, channels by key
    pub fn new(mut sizes: Vec<Size>, mut channels: Vec<Channel>, overhead: OverheadConfig) -> Self {
        sizes.sort_by(|a, b| {
            a.sort_order_index
                .cmp(&b.sort_order_index)
                .then_with(|| a.key.cmp(&b.key))
        });
        channels.sort_by(|a, b| a.key.cmp(&b.key));

        Self {
            sizes,
            channels,
            overhead,
        }
    }

    pub fn size_by_key(&self, key: &str) -> Option<&Size> {
        self.sizes.iter().find(|s| s.key == key)
    }

    pub fn channel_by_key(&self, key: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.key == key)
    }
}
