//! Services Layer
//!
//! Orchestration between the pricing engine and the database. Batch
//! operations take one `PricingSnapshot` from `AppState` and hold it for
//! the whole batch.
//!
//! # Architecture
//!
//! ```text
//! pizzeria-admin binary ──> Services ──┬──> finance (pure engine)
//!                                      └──> SqliteDb
//! ```
//!
//! # Services
//!
//! - `CatalogService` - Sizes, channels, menu items
//! - `SettingsService` - Overhead configuration
//! - `CostService` - Cost sheets, recommended costs, cost warnings
//! - `SellingPriceService` - Channel price table, price updates and audit
//! - `MonthlyCloseService` - Monthly P&L close, report, daily goals
//! - `ReportService` - Back-office report

pub mod catalog_service;
pub mod cost_service;
pub mod monthly_close_service;
pub mod report_service;
pub mod selling_price_service;
pub mod settings_service;

// Re-export commonly used types and services
pub use catalog_service::CatalogService;
pub use cost_service::{CostService, CostSheetRow, ItemCostSheet, UpdateCostRequest};
pub use monthly_close_service::{
    DailyGoalsRequest, MonthlyCloseComparison, MonthlyCloseReport, MonthlyCloseService,
};
pub use report_service::{BackOfficeReport, ReportService};
pub use selling_price_service::{
    SellPriceFilter, SellPriceRow, SellingPriceService, UpdateSellPriceRequest, UpdateSellPriceResult,
};
pub use settings_service::{OverheadUpdate, SettingsService};
