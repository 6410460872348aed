//! Monthly Close Service
//!
//! Validates and stores the figures of a month, and builds the month report:
//! totals, health ratings and the comparison with the previous month.

use crate::db::sqlite::models::MonthlyCloseRecord;
use crate::error::{AppError, Result};
use crate::finance::monthly_close::{
    compare_totals, coverage_status, daily_sales_goals, margin_tier,
    previous_period, rate_contribution_margin, rate_net_result, CoverageStatus, DailyGoalInput,
    DailyGoals, HealthStatus, MarginTier, MonthlyCloseDelta, MonthlyCloseInput, WEEKDAY_SLOTS,
};
use crate::state::AppState;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Comparison with the month before
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyCloseComparison {
    pub previous_year: i32,
    pub previous_month: u32,
    pub delta: MonthlyCloseDelta,
}

/// Stored close plus the signals derived from its totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyCloseReport {
    pub record: MonthlyCloseRecord,
    pub coverage_status: CoverageStatus,
    pub contribution_margin_status: HealthStatus,
    pub net_result_status: HealthStatus,
    pub margin_tier: Option<MarginTier>,
    /// Absent when the previous month was never closed
    pub comparison: Option<MonthlyCloseComparison>,
}

/// Request for daily sales goals of a closed month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyGoalsRequest {
    pub reference_year: i32,
    pub reference_month: u32,
    pub target_profit_perc: f64,
    pub sales_distribution_perc: [f64; WEEKDAY_SLOTS],
    #[serde(default = "default_weekday_count")]
    pub weekday_count_in_month: u32,
}

fn default_weekday_count() -> u32 {
    DailyGoalInput::default().weekday_count_in_month
}

pub struct MonthlyCloseService;

impl MonthlyCloseService {
    /// Validate, aggregate and upsert the close of the input's period
    pub fn save(state: &AppState, input: MonthlyCloseInput) -> Result<MonthlyCloseRecord> {
        info!(
            "MonthlyCloseService::save - {}/{:02}",
            input.reference_year, input.reference_month
        );

        validate_input(&input)?;

        let record = state.sqlite.upsert_monthly_close(&input)?;
        let totals = &record.totals;

        info!(
            "Monthly close {}/{:02} saved: gross={:.2} net_result={:.2}",
            input.reference_year,
            input.reference_month,
            totals.gross_revenue_amount,
            totals.net_result_amount
        );

        Ok(record)
    }

    pub fn report(state: &AppState, year: i32, month: u32) -> Result<MonthlyCloseReport> {
        let record = state
            .sqlite
            .get_monthly_close(year, month)?
            .ok_or_else(|| AppError::NotFound(format!("monthly close {}/{:02}", year, month)))?;

        Self::build_report(state, record)
    }

    /// Report of the most recent closed month, if any
    pub fn latest_report(state: &AppState) -> Result<Option<MonthlyCloseReport>> {
        match state.sqlite.list_monthly_closes()?.into_iter().next() {
            Some(record) => Ok(Some(Self::build_report(state, record)?)),
            None => Ok(None),
        }
    }

    pub fn list(state: &AppState) -> Result<Vec<MonthlyCloseRecord>> {
        state.sqlite.list_monthly_closes()
    }

    pub fn delete(state: &AppState, year: i32, month: u32) -> Result<()> {
        info!("MonthlyCloseService::delete - {}/{:02}", year, month);

        if !state.sqlite.delete_monthly_close(year, month)? {
            return Err(AppError::NotFound(format!("monthly close {}/{:02}", year, month)));
        }
        Ok(())
    }

    /// Split the break-even point of a closed month into daily sales goals
    pub fn daily_goals(state: &AppState, request: DailyGoalsRequest) -> Result<DailyGoals> {
        if !request.target_profit_perc.is_finite()
            || request.sales_distribution_perc.iter().any(|p| !p.is_finite() || *p < 0.0)
        {
            return Err(AppError::Validation(
                "Daily goal percentages must be non-negative numbers".to_string(),
            ));
        }

        let record = state
            .sqlite
            .get_monthly_close(request.reference_year, request.reference_month)?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "monthly close {}/{:02}",
                    request.reference_year, request.reference_month
                ))
            })?;

        Ok(daily_sales_goals(&DailyGoalInput {
            break_even_amount: record.totals.break_even_amount,
            target_profit_perc: request.target_profit_perc,
            sales_distribution_perc: request.sales_distribution_perc,
            weekday_count_in_month: request.weekday_count_in_month,
        }))
    }

    fn build_report(state: &AppState, record: MonthlyCloseRecord) -> Result<MonthlyCloseReport> {
        let totals = &record.totals;
        let (previous_year, previous_month) =
            previous_period(record.input.reference_year, record.input.reference_month);

        let comparison = state
            .sqlite
            .get_monthly_close(previous_year, previous_month)?
            .map(|previous| MonthlyCloseComparison {
                previous_year,
                previous_month,
                delta: compare_totals(totals, &previous.totals),
            });

        Ok(MonthlyCloseReport {
            coverage_status: coverage_status(totals.coverage_ratio_perc),
            contribution_margin_status: rate_contribution_margin(totals.contribution_margin_perc),
            net_result_status: rate_net_result(totals.net_result_perc),
            margin_tier: margin_tier(totals.contribution_margin_perc),
            comparison,
            record,
        })
    }
}

/// Reject malformed figures before they reach the aggregator
fn validate_input(input: &MonthlyCloseInput) -> Result<()> {
    if !(1..=12).contains(&input.reference_month) {
        return Err(AppError::Validation(format!(
            "reference_month must be between 1 and 12, got {}",
            input.reference_month
        )));
    }
    if !(1900..=9999).contains(&input.reference_year) {
        return Err(AppError::Validation(format!(
            "reference_year out of range: {}",
            input.reference_year
        )));
    }

    let fixed = &input.fixed_costs;
    let variable = &input.variable_costs;
    let fields = [
        ("bank_revenue_amount", input.bank_revenue_amount),
        ("cash_revenue_amount", input.cash_revenue_amount),
        ("monthly_billing_amount", input.monthly_billing_amount),
        ("card_sales_amount", input.card_sales_amount),
        ("card_tax_perc", input.card_tax_perc),
        ("marketplace_sales_amount", input.marketplace_sales_amount),
        ("marketplace_tax_perc", input.marketplace_tax_perc),
        ("health_plan_amount", fixed.health_plan_amount),
        ("staff_payroll_amount", fixed.staff_payroll_amount),
        ("pro_labore_amount", fixed.pro_labore_amount),
        ("pro_labore_withdrawal_amount", fixed.pro_labore_withdrawal_amount),
        ("profit_withdrawal_amount", fixed.profit_withdrawal_amount),
        ("loan_installment_amount", fixed.loan_installment_amount),
        ("marketing_agency_amount", fixed.marketing_agency_amount),
        ("paid_traffic_amount", fixed.paid_traffic_amount),
        ("credit_card_bill_amount", fixed.credit_card_bill_amount),
        ("fixed_cost_total_amount", input.fixed_cost_total_amount),
        ("ingredients_amount", variable.ingredients_amount),
        ("delivery_amount", variable.delivery_amount),
        ("taxes_amount", variable.taxes_amount),
        ("variable_cost_total_amount", input.variable_cost_total_amount),
        ("non_operating_inflows_amount", input.non_operating_inflows_amount),
        ("non_operating_outflows_amount", input.non_operating_outflows_amount),
    ];

    for (field, value) in fields {
        if !value.is_finite() || value < 0.0 {
            return Err(AppError::Validation(format!(
                "{} must be a non-negative number, got {}",
                field, value
            )));
        }
    }

    for (field, value) in [
        ("card_tax_perc", input.card_tax_perc),
        ("marketplace_tax_perc", input.marketplace_tax_perc),
    ] {
        if value > 100.0 {
            return Err(AppError::Validation(format!(
                "{} must not exceed 100, got {}",
                field, value
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(year: i32, month: u32, bank: f64) -> MonthlyCloseInput {
        MonthlyCloseInput {
            reference_year: year,
            reference_month: month,
            bank_revenue_amount: bank,
            cash_revenue_amount: 2000.0,
            variable_cost_total_amount: 4000.0,
            fixed_cost_total_amount: 3000.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_report_of_reference_month() {
        let state = AppState::in_memory().unwrap();
        MonthlyCloseService::save(&state, input(2025, 3, 8000.0)).unwrap();

        let report = MonthlyCloseService::report(&state, 2025, 3).unwrap();
        assert_eq!(report.record.totals.net_result_amount, 3000.0);
        assert_eq!(report.coverage_status, CoverageStatus::Covered);
        assert_eq!(report.contribution_margin_status, HealthStatus::Healthy);
        assert_eq!(report.net_result_status, HealthStatus::Healthy);
        assert_eq!(report.margin_tier, Some(MarginTier::Healthy));
        assert!(report.comparison.is_none());
    }

    #[test]
    fn test_report_compares_with_previous_month_across_years() {
        let state = AppState::in_memory().unwrap();
        MonthlyCloseService::save(&state, input(2024, 12, 8000.0)).unwrap();
        MonthlyCloseService::save(&state, input(2025, 1, 9000.0)).unwrap();

        let report = MonthlyCloseService::report(&state, 2025, 1).unwrap();
        let comparison = report.comparison.unwrap();
        assert_eq!((comparison.previous_year, comparison.previous_month), (2024, 12));
        assert_eq!(comparison.delta.gross_revenue_amount, 1000.0);
        assert_eq!(comparison.delta.net_result_amount, 1000.0);

        let latest = MonthlyCloseService::latest_report(&state).unwrap().unwrap();
        assert_eq!(latest.record.input.reference_month, 1);
    }

    #[test]
    fn test_save_rejects_malformed_input() {
        let state = AppState::in_memory().unwrap();

        let bad_month = MonthlyCloseService::save(&state, input(2025, 13, 8000.0)).unwrap_err();
        assert!(matches!(bad_month, AppError::Validation(_)));

        let bad_amount = MonthlyCloseService::save(&state, input(2025, 3, f64::INFINITY)).unwrap_err();
        assert!(matches!(bad_amount, AppError::Validation(_)));

        assert!(MonthlyCloseService::list(&state).unwrap().is_empty());
    }

    #[test]
    fn test_save_rejects_negative_rates_and_amounts() {
        let state = AppState::in_memory().unwrap();

        let negative_card_tax = MonthlyCloseInput {
            card_sales_amount: 5000.0,
            card_tax_perc: -4.0,
            ..input(2025, 3, 10000.0)
        };
        let err = MonthlyCloseService::save(&state, negative_card_tax).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut negative_taxes = input(2025, 3, 10000.0);
        negative_taxes.variable_costs.taxes_amount = -300.0;
        let err = MonthlyCloseService::save(&state, negative_taxes).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let oversized_rate = MonthlyCloseInput {
            marketplace_sales_amount: 1000.0,
            marketplace_tax_perc: 150.0,
            ..input(2025, 3, 10000.0)
        };
        let err = MonthlyCloseService::save(&state, oversized_rate).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        assert!(MonthlyCloseService::list(&state).unwrap().is_empty());

        let record = MonthlyCloseService::save(
            &state,
            MonthlyCloseInput {
                card_sales_amount: 5000.0,
                card_tax_perc: 4.0,
                ..input(2025, 3, 10000.0)
            },
        )
        .unwrap();
        assert!(record.totals.net_revenue_amount <= record.totals.gross_revenue_amount);
    }

    #[test]
    fn test_resave_replaces_the_month() {
        let state = AppState::in_memory().unwrap();
        MonthlyCloseService::save(&state, input(2025, 3, 8000.0)).unwrap();
        let record = MonthlyCloseService::save(&state, input(2025, 3, 6000.0)).unwrap();

        assert_eq!(record.totals.gross_revenue_amount, 8000.0);
        assert_eq!(MonthlyCloseService::list(&state).unwrap().len(), 1);
    }

    #[test]
    fn test_delete() {
        let state = AppState::in_memory().unwrap();
        MonthlyCloseService::save(&state, input(2025, 3, 8000.0)).unwrap();

        MonthlyCloseService::delete(&state, 2025, 3).unwrap();
        let err = MonthlyCloseService::delete(&state, 2025, 3).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(matches!(
            MonthlyCloseService::report(&state, 2025, 3).unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[test]
    fn test_daily_goals_from_stored_break_even() {
        let state = AppState::in_memory().unwrap();
        MonthlyCloseService::save(&state, input(2025, 3, 8000.0)).unwrap();

        let goals = MonthlyCloseService::daily_goals(
            &state,
            DailyGoalsRequest {
                reference_year: 2025,
                reference_month: 3,
                target_profit_perc: 20.0,
                sales_distribution_perc: [20.0; WEEKDAY_SLOTS],
                weekday_count_in_month: 4,
            },
        )
        .unwrap();

        // break-even 5000 spread over 5 slots of 4 days each
        assert!((goals.min_sales_amount[0] - 250.0).abs() < 1e-6);
        assert!((goals.target_sales_amount[0] - 300.0).abs() < 1e-6);
    }
}
