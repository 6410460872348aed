//! Cost and selling-price anomaly detection
//!
//! Warnings are transient: they are recomputed on every read and never stored.

use crate::finance::size_scaling::SizeKey;
use serde::{Deserialize, Serialize};

/// Costs at or above this amount are suspicious for a single pizza
pub const COST_TOO_HIGH_THRESHOLD: f64 = 1000.0;

/// Costs below one currency unit are suspicious
pub const COST_VERY_LOW_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningKind {
    Info,
    Alert,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub code: String,
    pub message: String,
}

impl Warning {
    fn new(kind: WarningKind, code: &str, message: String) -> Self {
        Self {
            kind,
            code: code.to_string(),
            message,
        }
    }
}

/// Publication state of the item owning the checked figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemVisibility {
    pub active: bool,
    pub visible: bool,
}

impl ItemVisibility {
    /// Only published items get warnings
    pub fn is_actionable(&self) -> bool {
        self.active && self.visible
    }
}

/// Check one (item, size) cost against its recommendation and last value.
///
/// Rules are independent; several may fire for the same figures.
pub fn detect_cost_warnings(
    cost_amount: f64,
    previous_cost_amount: f64,
    recommended_cost_amount: f64,
    item_label: &str,
) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if cost_amount < recommended_cost_amount {
        warnings.push(Warning::new(
            WarningKind::Alert,
            "COST_BELOW_RECOMMENDED",
            format!(
                "The cost of {} ({:.2}) is below the recommended cost ({:.2}).",
                item_label, cost_amount, recommended_cost_amount
            ),
        ));
    }

    if cost_amount > recommended_cost_amount {
        warnings.push(Warning::new(
            WarningKind::Info,
            "COST_ABOVE_RECOMMENDED",
            format!(
                "The cost of {} ({:.2}) is above the recommended cost ({:.2}).",
                item_label, cost_amount, recommended_cost_amount
            ),
        ));
    }

    if cost_amount == 0.0 {
        warnings.push(Warning::new(
            WarningKind::Critical,
            "COST_ZERO",
            format!("The cost of {} is zero.", item_label),
        ));
    }

    if cost_amount < 0.0 {
        warnings.push(Warning::new(
            WarningKind::Critical,
            "COST_NEGATIVE",
            format!("The cost of {} is negative.", item_label),
        ));
    }

    if cost_amount > 0.0 && cost_amount < COST_VERY_LOW_THRESHOLD {
        warnings.push(Warning::new(
            WarningKind::Info,
            "COST_VERY_LOW",
            format!("The cost of {} is very low.", item_label),
        ));
    }

    if cost_amount > COST_TOO_HIGH_THRESHOLD {
        warnings.push(Warning::new(
            WarningKind::Alert,
            "COST_TOO_HIGH",
            format!("The cost of {} is too high.", item_label),
        ));
    }

    if previous_cost_amount != 0.0 && previous_cost_amount < cost_amount {
        warnings.push(Warning::new(
            WarningKind::Info,
            "COST_INCREASED",
            format!(
                "The cost of {} increased from {:.2} to {:.2}.",
                item_label, previous_cost_amount, cost_amount
            ),
        ));
    }

    warnings
}

/// Cost warnings gated on the owning item being active and visible
pub fn detect_item_cost_warnings(
    visibility: ItemVisibility,
    cost_amount: f64,
    previous_cost_amount: f64,
    recommended_cost_amount: f64,
    item_label: &str,
) -> Vec<Warning> {
    if !visibility.is_actionable() {
        return Vec::new();
    }
    detect_cost_warnings(cost_amount, previous_cost_amount, recommended_cost_amount, item_label)
}

/// Check one (item, size, channel) selling price against the computed minimum.
///
/// Slices are priced by hand and never flagged.
pub fn detect_sell_price_warnings(
    visibility: ItemVisibility,
    size_key: &str,
    item_label: &str,
    computed_price: f64,
    actual_price: f64,
) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if !visibility.is_actionable() || size_key == SizeKey::Slice.as_str() {
        return warnings;
    }

    if actual_price == 0.0 {
        warnings.push(Warning::new(
            WarningKind::Critical,
            "SELL_PRICE_ZERO",
            format!("The selling price of {} is zero.", item_label),
        ));
    }

    if actual_price < computed_price {
        warnings.push(Warning::new(
            WarningKind::Alert,
            "SELL_PRICE_BELOW_RECOMMENDED",
            format!(
                "The selling price of {} ({:.2}) is below the recommended price ({:.2}).",
                item_label, actual_price, computed_price
            ),
        ));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBLISHED: ItemVisibility = ItemVisibility {
        active: true,
        visible: true,
    };

    fn codes(warnings: &[Warning]) -> Vec<&str> {
        warnings.iter().map(|w| w.code.as_str()).collect()
    }

    #[test]
    fn test_zero_cost_is_critical() {
        let warnings = detect_item_cost_warnings(PUBLISHED, 0.0, 0.0, 12.0, "Margherita (Medium)");
        assert_eq!(codes(&warnings), vec!["COST_BELOW_RECOMMENDED", "COST_ZERO"]);
        assert_eq!(warnings[1].kind, WarningKind::Critical);
    }

    #[test]
    fn test_unpublished_items_get_no_warnings() {
        let inactive = ItemVisibility {
            active: false,
            visible: true,
        };
        let hidden = ItemVisibility {
            active: true,
            visible: false,
        };
        assert!(detect_item_cost_warnings(inactive, 0.0, 0.0, 12.0, "x").is_empty());
        assert!(detect_item_cost_warnings(hidden, -3.0, 5.0, 12.0, "x").is_empty());
    }

    #[test]
    fn test_rules_fire_independently_in_order() {
        let warnings = detect_cost_warnings(1500.0, 900.0, 1200.0, "Calabresa (Bigger)");
        assert_eq!(
            codes(&warnings),
            vec!["COST_ABOVE_RECOMMENDED", "COST_TOO_HIGH", "COST_INCREASED"]
        );
    }

    #[test]
    fn test_negative_and_very_low() {
        let negative = detect_cost_warnings(-1.0, 0.0, 0.0, "x");
        assert_eq!(codes(&negative), vec!["COST_BELOW_RECOMMENDED", "COST_NEGATIVE"]);

        let very_low = detect_cost_warnings(0.5, 0.0, 0.5, "x");
        assert_eq!(codes(&very_low), vec!["COST_VERY_LOW"]);
    }

    #[test]
    fn test_increase_needs_previous_value() {
        assert!(detect_cost_warnings(10.0, 0.0, 10.0, "x").is_empty());
        assert_eq!(codes(&detect_cost_warnings(10.0, 8.0, 10.0, "x")), vec!["COST_INCREASED"]);
        assert!(detect_cost_warnings(10.0, 12.0, 10.0, "x").is_empty());
    }

    #[test]
    fn test_sell_price_rules() {
        let warnings = detect_sell_price_warnings(PUBLISHED, "pizza-medium", "x", 45.0, 0.0);
        assert_eq!(codes(&warnings), vec!["SELL_PRICE_ZERO", "SELL_PRICE_BELOW_RECOMMENDED"]);

        let below = detect_sell_price_warnings(PUBLISHED, "pizza-big", "x", 45.0, 44.95);
        assert_eq!(codes(&below), vec!["SELL_PRICE_BELOW_RECOMMENDED"]);

        assert!(detect_sell_price_warnings(PUBLISHED, "pizza-big", "x", 45.0, 49.9).is_empty());
    }

    #[test]
    fn test_sell_prices_of_unpublished_items_are_not_flagged() {
        let hidden = ItemVisibility {
            active: true,
            visible: false,
        };
        assert!(detect_sell_price_warnings(hidden, "pizza-medium", "x", 45.0, 0.0).is_empty());
    }

    #[test]
    fn test_slices_are_never_flagged() {
        assert!(detect_sell_price_warnings(PUBLISHED, "pizza-slice", "x", 12.0, 0.0).is_empty());
    }

    #[test]
    fn test_warning_serializes_type_field() {
        let warning = &detect_cost_warnings(0.0, 0.0, 0.0, "x")[0];
        let json = serde_json::to_value(warning).unwrap();
        assert_eq!(json["type"], "critical");
        assert_eq!(json["code"], "COST_ZERO");
    }
}
