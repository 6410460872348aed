//! Channel price calculator
//!
//! Pricing is layered in three steps:
//!
//! ```text
//! recipe cost ──> + waste + dough + packaging ──> total cost
//! total cost  ──> price_from_cost(dna %, margin %) ──> storefront price
//! storefront  ──> price_from_marketplace(channel tax %) ──> marketplace price
//! ```
//!
//! Only the two final outputs (break-even and with-profit) are rounded, both
//! through [`round_up_to_nickel`].

use crate::finance::rounding::{round_to_cents, round_up_to_nickel};
use crate::finance::types::{Channel, OverheadConfig, Size};
use serde::{Deserialize, Serialize};

/// Final price pair, both rounded up to 0.05
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceAmount {
    pub with_profit: f64,
    /// Covers every cost with zero profit
    pub break_even: f64,
}

/// Price plus the formula that produced it, for audit display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellingPriceAudit {
    pub formula_explanation: String,
    pub formula_expression: String,
    pub price_amount: PriceAmount,
}

/// Channel metadata echoed in a breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub name: String,
    pub tax_perc: f64,
    pub fee_amount: f64,
    pub is_marketplace: bool,
    pub online_payment_tax_perc: f64,
    pub target_margin_perc: f64,
}

impl From<&Channel> for ChannelSummary {
    fn from(channel: &Channel) -> Self {
        Self {
            name: channel.name.clone(),
            tax_perc: channel.tax_perc,
            fee_amount: channel.fee_amount,
            is_marketplace: channel.is_marketplace,
            online_payment_tax_perc: channel.online_payment_tax_perc,
            target_margin_perc: channel.target_margin_perc,
        }
    }
}

/// Full audit breakdown of a channel price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellingPriceBreakdown {
    pub recipe_cost_amount: f64,
    pub waste_cost_amount: f64,
    pub dough_cost_amount: f64,
    pub packaging_cost_amount: f64,
    pub dna_percentage: f64,
    pub channel: ChannelSummary,
    pub minimum_price: SellingPriceAudit,
}

impl SellingPriceBreakdown {
    pub fn cost_base(&self) -> CostBase {
        CostBase {
            recipe_cost_amount: self.recipe_cost_amount,
            packaging_cost_amount: self.packaging_cost_amount,
            dough_cost_amount: self.dough_cost_amount,
            waste_cost_amount: self.waste_cost_amount,
        }
    }
}

/// Cost components of one unit sold
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBase {
    pub recipe_cost_amount: f64,
    pub packaging_cost_amount: f64,
    pub dough_cost_amount: f64,
    pub waste_cost_amount: f64,
}

impl CostBase {
    pub fn total(&self) -> f64 {
        self.recipe_cost_amount
            + self.packaging_cost_amount
            + self.dough_cost_amount
            + self.waste_cost_amount
    }
}

/// `amount / divisor`, or 0 when the divisor leaves no room for a price
fn divide_or_zero(amount: f64, divisor: f64) -> f64 {
    if divisor > 0.0 {
        amount / divisor
    } else {
        0.0
    }
}

/// Core pricing formula: cost loaded with overhead and margin.
///
/// A dna + margin load of 100 % or more yields a zero price, the signal for
/// incomplete configuration.
pub fn price_from_cost(amount: f64, dna_perc: f64, margin_perc: f64) -> SellingPriceAudit {
    let divisor_with_margin = 1.0 - (dna_perc / 100.0 + margin_perc / 100.0);
    let price_with_profit = divide_or_zero(amount, divisor_with_margin);

    let divisor_break_even = 1.0 - dna_perc / 100.0;
    let price_break_even = divide_or_zero(amount, divisor_break_even);

    SellingPriceAudit {
        formula_explanation:
            "(Recipe cost + Waste + Dough + Packaging) / (1 - (% DNA + % Margin))".to_string(),
        formula_expression: format!(
            "({:.2} / (1 - ({:.2} / 100 + {:.2} / 100)))",
            amount, dna_perc, margin_perc
        ),
        price_amount: PriceAmount {
            with_profit: round_up_to_nickel(price_with_profit),
            break_even: round_up_to_nickel(price_break_even),
        },
    }
}

/// Marketplace surcharge layered on the storefront price.
///
/// The break-even price passes through unchanged: the marketplace tax is
/// modeled on the margin layer only.
pub fn price_from_marketplace(
    base_price: PriceAmount,
    other_costs: f64,
    channel_tax_perc: f64,
) -> SellingPriceAudit {
    let divisor = 1.0 - channel_tax_perc / 100.0;
    let price_with_profit = divide_or_zero(base_price.with_profit + other_costs, divisor);

    SellingPriceAudit {
        formula_explanation:
            "(Storefront price + Other costs) / (1 - Channel tax). Marketplace prices start from the storefront price"
                .to_string(),
        formula_expression: format!(
            "({:.2} + {:.2}) / (1 - {} / 100)",
            base_price.with_profit, other_costs, channel_tax_perc
        ),
        price_amount: PriceAmount {
            with_profit: round_up_to_nickel(price_with_profit),
            break_even: base_price.break_even,
        },
    }
}

/// Selling price of one item size on one channel.
///
/// Missing channel or size rows count as zero-valued defaults.
pub fn price_for_channel(
    channel: Option<&Channel>,
    item_recipe_cost: f64,
    size: Option<&Size>,
    overhead: &OverheadConfig,
) -> SellingPriceBreakdown {
    let default_channel = Channel::default();
    let channel = channel.unwrap_or(&default_channel);

    let dough_cost = size.map(|s| s.dough_cost_amount).unwrap_or(0.0);
    let packaging_cost = size.map(|s| s.packaging_cost_amount).unwrap_or(0.0);

    let waste_factor = 1.0 + overhead.waste_percentage / 100.0;
    let total_cost = item_recipe_cost * waste_factor + dough_cost + packaging_cost;

    let mut price = price_from_cost(total_cost, overhead.dna_percentage, channel.target_margin_perc);

    if channel.is_marketplace {
        // delivery or online payment fees would go here
        let other_costs = 0.0;
        price = price_from_marketplace(price.price_amount, other_costs, channel.tax_perc);
    }

    SellingPriceBreakdown {
        recipe_cost_amount: round_to_cents(item_recipe_cost),
        waste_cost_amount: round_to_cents(item_recipe_cost * (waste_factor - 1.0)),
        dough_cost_amount: round_to_cents(dough_cost),
        packaging_cost_amount: round_to_cents(packaging_cost),
        dna_percentage: overhead.dna_percentage,
        channel: ChannelSummary::from(channel),
        minimum_price: price,
    }
}

/// Profit share (%) left by a selling price after costs and the dna load
pub fn profit_perc_from_selling_price(selling_price: f64, cost: &CostBase, dna_perc: f64) -> f64 {
    let total_cost = cost.total();

    if selling_price <= 0.0 || total_cost <= 0.0 {
        return 0.0;
    }

    let profit = 1.0 - total_cost / selling_price - dna_perc / 100.0;
    round_to_cents(profit * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storefront(margin: f64) -> Channel {
        Channel {
            id: "c1".to_string(),
            key: "cardapio".to_string(),
            name: "Storefront".to_string(),
            target_margin_perc: margin,
            ..Default::default()
        }
    }

    fn marketplace(margin: f64, tax: f64) -> Channel {
        Channel {
            id: "c2".to_string(),
            key: "ifood".to_string(),
            name: "iFood".to_string(),
            is_marketplace: true,
            tax_perc: tax,
            target_margin_perc: margin,
            ..Default::default()
        }
    }

    fn medium() -> Size {
        Size {
            id: "s1".to_string(),
            key: "pizza-medium".to_string(),
            name: "Medium".to_string(),
            sort_order_index: 4,
            packaging_cost_amount: 2.0,
            dough_cost_amount: 3.0,
        }
    }

    fn is_nickel_multiple(value: f64) -> bool {
        ((value * 100.0).round() as i64) % 5 == 0
    }

    #[test]
    fn test_core_formula_example() {
        let audit = price_from_cost(10.0, 10.0, 20.0);
        assert_eq!(audit.price_amount.with_profit, 14.30);
        // 10 / 0.9 = 11.11 -> 11.15
        assert_eq!(audit.price_amount.break_even, 11.15);
        assert_eq!(audit.formula_expression, "(10.00 / (1 - (10.00 / 100 + 20.00 / 100)))");
    }

    #[test]
    fn test_overloaded_divisor_yields_zero() {
        let audit = price_from_cost(10.0, 60.0, 40.0);
        assert_eq!(audit.price_amount.with_profit, 0.0);
        assert_eq!(audit.price_amount.break_even, 25.0);
    }

    #[test]
    fn test_direct_channel_builds_up_costs() {
        let overhead = OverheadConfig {
            dna_percentage: 10.0,
            waste_percentage: 5.0,
        };
        let breakdown = price_for_channel(Some(&storefront(20.0)), 20.0, Some(&medium()), &overhead);

        assert_eq!(breakdown.recipe_cost_amount, 20.0);
        assert_eq!(breakdown.waste_cost_amount, 1.0);
        assert_eq!(breakdown.dough_cost_amount, 3.0);
        assert_eq!(breakdown.packaging_cost_amount, 2.0);
        // total 26.0 -> 26 / 0.7 = 37.142 -> 37.15 ; 26 / 0.9 = 28.888 -> 28.90
        assert_eq!(breakdown.minimum_price.price_amount.with_profit, 37.15);
        assert_eq!(breakdown.minimum_price.price_amount.break_even, 28.90);
        assert!(!breakdown.channel.is_marketplace);
    }

    #[test]
    fn test_marketplace_surcharges_storefront_price() {
        let overhead = OverheadConfig {
            dna_percentage: 10.0,
            waste_percentage: 5.0,
        };
        let direct = price_for_channel(Some(&storefront(20.0)), 20.0, Some(&medium()), &overhead);
        let market = price_for_channel(Some(&marketplace(20.0, 27.0)), 20.0, Some(&medium()), &overhead);

        // 37.15 / 0.73 = 50.89 -> 50.90
        assert_eq!(market.minimum_price.price_amount.with_profit, 50.90);
        assert_eq!(
            market.minimum_price.price_amount.break_even,
            direct.minimum_price.price_amount.break_even
        );
        assert_eq!(market.channel.tax_perc, 27.0);
    }

    #[test]
    fn test_zero_tax_marketplace_matches_direct() {
        let overhead = OverheadConfig {
            dna_percentage: 12.5,
            waste_percentage: 3.0,
        };
        for cost in [0.0, 4.2, 13.37, 58.0] {
            let direct = price_for_channel(Some(&storefront(18.0)), cost, Some(&medium()), &overhead);
            let market = price_for_channel(Some(&marketplace(18.0, 0.0)), cost, Some(&medium()), &overhead);
            assert_eq!(
                direct.minimum_price.price_amount.with_profit,
                market.minimum_price.price_amount.with_profit
            );
        }
    }

    #[test]
    fn test_price_properties_hold_over_costs() {
        let overhead = OverheadConfig {
            dna_percentage: 14.0,
            waste_percentage: 4.0,
        };
        for step in 0..200 {
            let cost = step as f64 * 0.37;
            let direct = price_for_channel(Some(&storefront(15.0)), cost, Some(&medium()), &overhead);
            let market = price_for_channel(Some(&marketplace(15.0, 23.0)), cost, Some(&medium()), &overhead);
            let price = direct.minimum_price.price_amount;

            assert!(is_nickel_multiple(price.with_profit), "{} not on a 0.05 step", price.with_profit);
            assert!(is_nickel_multiple(price.break_even));
            assert!(price.with_profit >= price.break_even);
            assert!(market.minimum_price.price_amount.with_profit >= price.with_profit);
        }
    }

    #[test]
    fn test_missing_reference_rows_default_to_zero() {
        let breakdown = price_for_channel(None, 10.0, None, &OverheadConfig::default());
        assert_eq!(breakdown.dough_cost_amount, 0.0);
        assert_eq!(breakdown.packaging_cost_amount, 0.0);
        assert_eq!(breakdown.channel.name, "");
        assert_eq!(breakdown.minimum_price.price_amount.with_profit, 10.0);
        assert_eq!(breakdown.minimum_price.price_amount.break_even, 10.0);
    }

    #[test]
    fn test_profit_perc_from_selling_price() {
        let cost = CostBase {
            recipe_cost_amount: 20.0,
            packaging_cost_amount: 2.0,
            dough_cost_amount: 3.0,
            waste_cost_amount: 1.0,
        };
        // 1 - 26/52 - 0.10 = 0.40
        assert_eq!(profit_perc_from_selling_price(52.0, &cost, 10.0), 40.0);
        assert_eq!(profit_perc_from_selling_price(0.0, &cost, 10.0), 0.0);
        assert_eq!(profit_perc_from_selling_price(52.0, &CostBase::default(), 10.0), 0.0);
    }
}
