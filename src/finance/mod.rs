//! Pricing and financial computation engine
//!
//! Pure, synchronous functions with no shared state. Reference data and the
//! overhead configuration are passed in explicitly on every call.
//!
//! # Components
//!
//! - `size_scaling` - Recommended cost per pizza size
//! - `warnings` - Cost and selling-price anomaly detection
//! - `selling_price` - Channel price calculator
//! - `monthly_close` - Monthly P&L aggregation

pub mod monthly_close;
pub mod rounding;
pub mod selling_price;
pub mod size_scaling;
pub mod types;
pub mod warnings;

pub use monthly_close::{aggregate_monthly_close, MonthlyCloseInput, MonthlyCloseTotals};
pub use rounding::round_up_to_nickel;
pub use selling_price::{price_for_channel, PriceAmount, SellingPriceAudit, SellingPriceBreakdown};
pub use size_scaling::{recommended_cost, recommended_costs_for_all, SizeKey};
pub use types::{Channel, OverheadConfig, PricingSnapshot, Size};
pub use warnings::{Warning, WarningKind};
