//! Report Service
//!
//! Assembles the back-office report printed by the `pizzeria-admin` binary.

use crate::error::Result;
use crate::finance::types::OverheadConfig;
use crate::services::cost_service::{CostService, ItemCostSheet};
use crate::services::monthly_close_service::{MonthlyCloseReport, MonthlyCloseService};
use crate::services::selling_price_service::{SellPriceFilter, SellPriceRow, SellingPriceService};
use crate::state::AppState;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackOfficeReport {
    pub generated_at: String,
    pub overhead: OverheadConfig,
    pub cost_sheets: Vec<ItemCostSheet>,
    pub sell_prices: Vec<SellPriceRow>,
    pub warning_count: usize,
    pub latest_monthly_close: Option<MonthlyCloseReport>,
}

pub struct ReportService;

impl ReportService {
    pub fn build(state: &AppState) -> Result<BackOfficeReport> {
        let cost_sheets = CostService::cost_sheets(state)?;
        let sell_prices = SellingPriceService::price_table(state, &SellPriceFilter::default())?;
        let latest_monthly_close = MonthlyCloseService::latest_report(state)?;

        let warning_count = cost_sheets
            .iter()
            .flat_map(|sheet| sheet.rows.iter())
            .map(|row| row.warnings.len())
            .sum::<usize>()
            + sell_prices.iter().map(|row| row.warnings.len()).sum::<usize>();

        info!(
            "ReportService::build - {} items, {} prices, {} warnings",
            cost_sheets.len(),
            sell_prices.len(),
            warning_count
        );

        Ok(BackOfficeReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            overhead: state.get_overhead(),
            cost_sheets,
            sell_prices,
            warning_count,
            latest_monthly_close,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::models::CreateMenuItemRequest;
    use crate::finance::monthly_close::MonthlyCloseInput;
    use crate::finance::types::Channel;
    use crate::services::catalog_service::CatalogService;

    #[test]
    fn test_empty_database_report() {
        let state = AppState::in_memory().unwrap();
        let report = ReportService::build(&state).unwrap();
        assert!(report.cost_sheets.is_empty());
        assert!(report.sell_prices.is_empty());
        assert_eq!(report.warning_count, 0);
        assert!(report.latest_monthly_close.is_none());
    }

    #[test]
    fn test_report_counts_warnings_and_serializes() {
        let state = AppState::in_memory().unwrap();
        CatalogService::upsert_channel(
            &state,
            Channel {
                key: "counter".to_string(),
                name: "Counter".to_string(),
                target_margin_perc: 20.0,
                ..Default::default()
            },
        )
        .unwrap();
        CatalogService::create_menu_item(
            &state,
            CreateMenuItemRequest {
                name: "Margherita".to_string(),
                active: true,
                visible: true,
                sort_order_index: 0,
            },
        )
        .unwrap();
        MonthlyCloseService::save(
            &state,
            MonthlyCloseInput {
                reference_year: 2025,
                reference_month: 3,
                bank_revenue_amount: 10000.0,
                ..Default::default()
            },
        )
        .unwrap();

        let report = ReportService::build(&state).unwrap();
        assert_eq!(report.cost_sheets.len(), 1);
        // one row per size on the single channel
        assert_eq!(report.sell_prices.len(), 6);
        // no costs entered: every size is flagged COST_ZERO
        assert!(report.warning_count >= 6);
        assert!(report.latest_monthly_close.is_some());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["cost_sheets"][0]["rows"][0]["warnings"][0]["type"], "critical");
    }
}
