//! Monthly close aggregator
//!
//! Turns the figures entered for one month into the derived P&L totals:
//! net revenue, contribution margin, break-even point and net result.
//! Every ratio short-circuits to 0 instead of dividing by zero.

use crate::finance::rounding::finite_or_zero;
use serde::{Deserialize, Serialize};

/// Itemized fixed costs of a month
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedCostLines {
    pub health_plan_amount: f64,
    pub staff_payroll_amount: f64,
    pub pro_labore_amount: f64,
    pub pro_labore_withdrawal_amount: f64,
    pub profit_withdrawal_amount: f64,
    pub loan_installment_amount: f64,
    pub marketing_agency_amount: f64,
    pub paid_traffic_amount: f64,
    pub credit_card_bill_amount: f64,
}

impl FixedCostLines {
    pub fn sum(&self) -> f64 {
        self.health_plan_amount
            + self.staff_payroll_amount
            + self.pro_labore_amount
            + self.pro_labore_withdrawal_amount
            + self.profit_withdrawal_amount
            + self.loan_installment_amount
            + self.marketing_agency_amount
            + self.paid_traffic_amount
            + self.credit_card_bill_amount
    }

    fn sanitized(&self) -> Self {
        Self {
            health_plan_amount: finite_or_zero(self.health_plan_amount),
            staff_payroll_amount: finite_or_zero(self.staff_payroll_amount),
            pro_labore_amount: finite_or_zero(self.pro_labore_amount),
            pro_labore_withdrawal_amount: finite_or_zero(self.pro_labore_withdrawal_amount),
            profit_withdrawal_amount: finite_or_zero(self.profit_withdrawal_amount),
            loan_installment_amount: finite_or_zero(self.loan_installment_amount),
            marketing_agency_amount: finite_or_zero(self.marketing_agency_amount),
            paid_traffic_amount: finite_or_zero(self.paid_traffic_amount),
            credit_card_bill_amount: finite_or_zero(self.credit_card_bill_amount),
        }
    }
}

/// Itemized variable costs of a month
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableCostLines {
    pub ingredients_amount: f64,
    pub delivery_amount: f64,
    /// Sales tax paid; also the source of the month's tax rate
    pub taxes_amount: f64,
}

impl VariableCostLines {
    pub fn sum(&self) -> f64 {
        self.ingredients_amount + self.delivery_amount + self.taxes_amount
    }

    fn sanitized(&self) -> Self {
        Self {
            ingredients_amount: finite_or_zero(self.ingredients_amount),
            delivery_amount: finite_or_zero(self.delivery_amount),
            taxes_amount: finite_or_zero(self.taxes_amount),
        }
    }
}

/// Raw figures entered for one month
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlyCloseInput {
    pub reference_year: i32,
    pub reference_month: u32,
    pub bank_revenue_amount: f64,
    pub cash_revenue_amount: f64,
    /// Register total, informational
    pub monthly_billing_amount: f64,
    pub card_sales_amount: f64,
    pub card_tax_perc: f64,
    pub marketplace_sales_amount: f64,
    pub marketplace_tax_perc: f64,
    pub fixed_costs: FixedCostLines,
    pub fixed_cost_total_amount: f64,
    pub variable_costs: VariableCostLines,
    pub variable_cost_total_amount: f64,
    pub non_operating_inflows_amount: f64,
    pub non_operating_outflows_amount: f64,
    pub notes: Option<String>,
}

/// Gross-to-net revenue bridge
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetRevenueBridge {
    pub gross_revenue_amount: f64,
    pub card_fee_amount: f64,
    pub tax_amount: f64,
    pub marketplace_fee_amount: f64,
    pub net_revenue_amount: f64,
}

impl NetRevenueBridge {
    pub fn total_deductions(&self) -> f64 {
        self.card_fee_amount + self.tax_amount + self.marketplace_fee_amount
    }
}

/// Derived totals of a month
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCloseTotals {
    pub gross_revenue_amount: f64,
    pub billing_gap_amount: f64,
    pub card_sales_perc: f64,
    pub card_fee_amount: f64,
    pub marketplace_fee_amount: f64,
    pub tax_amount: f64,
    pub tax_perc: f64,
    pub net_revenue_amount: f64,
    pub fixed_cost_total_amount: f64,
    pub fixed_cost_other_amount: f64,
    pub fixed_cost_perc: f64,
    pub variable_cost_total_amount: f64,
    pub variable_cost_other_amount: f64,
    pub variable_cost_perc: f64,
    pub contribution_margin_amount: f64,
    pub contribution_margin_perc: f64,
    pub break_even_amount: f64,
    pub non_operating_result_amount: f64,
    pub net_result_amount: f64,
    pub net_result_perc: f64,
    pub coverage_ratio_perc: f64,
}

fn perc_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Bridge gross revenue down to revenue net of card fees, sales tax and
/// marketplace fees. Card fees apply to the share of gross paid by card.
pub fn compute_net_revenue(
    gross_revenue: f64,
    card_sales_amount: f64,
    card_tax_perc: f64,
    tax_perc: f64,
    marketplace_sales_amount: f64,
    marketplace_tax_perc: f64,
) -> NetRevenueBridge {
    let gross = finite_or_zero(gross_revenue);
    let card_sales = finite_or_zero(card_sales_amount);
    let marketplace_sales = finite_or_zero(marketplace_sales_amount);

    let card_sales_perc = perc_of(card_sales, gross);
    let gross_by_card = if gross > 0.0 {
        gross * card_sales_perc / 100.0
    } else {
        0.0
    };
    let card_fee_amount = if gross_by_card > 0.0 {
        gross_by_card * finite_or_zero(card_tax_perc) / 100.0
    } else {
        0.0
    };

    let tax_amount = if gross > 0.0 {
        gross * finite_or_zero(tax_perc) / 100.0
    } else {
        0.0
    };

    let marketplace_fee_amount = if marketplace_sales > 0.0 {
        marketplace_sales * finite_or_zero(marketplace_tax_perc) / 100.0
    } else {
        0.0
    };

    NetRevenueBridge {
        gross_revenue_amount: gross,
        card_fee_amount,
        tax_amount,
        marketplace_fee_amount,
        net_revenue_amount: gross - card_fee_amount - tax_amount - marketplace_fee_amount,
    }
}

/// Derive every total of a month from its raw figures
pub fn aggregate_monthly_close(input: &MonthlyCloseInput) -> MonthlyCloseTotals {
    let fixed_lines = input.fixed_costs.sanitized();
    let variable_lines = input.variable_costs.sanitized();

    let gross = finite_or_zero(input.bank_revenue_amount) + finite_or_zero(input.cash_revenue_amount);

    let tax_amount = variable_lines.taxes_amount;
    let tax_perc = perc_of(tax_amount, gross);

    let bridge = compute_net_revenue(
        gross,
        input.card_sales_amount,
        input.card_tax_perc,
        tax_perc,
        input.marketplace_sales_amount,
        input.marketplace_tax_perc,
    );

    let fixed_total = finite_or_zero(input.fixed_cost_total_amount);
    let variable_total = finite_or_zero(input.variable_cost_total_amount);

    let fixed_cost_perc = if bridge.net_revenue_amount > 0.0 {
        fixed_total / bridge.net_revenue_amount
    } else {
        0.0
    };
    let variable_cost_perc = if gross > 0.0 { variable_total / gross } else { 0.0 };

    let break_even = if gross > 0.0 && (1.0 - variable_cost_perc) != 0.0 {
        fixed_total / (1.0 - variable_cost_perc)
    } else {
        0.0
    };

    let contribution_margin = gross - variable_total;
    let non_operating_result = finite_or_zero(input.non_operating_inflows_amount)
        - finite_or_zero(input.non_operating_outflows_amount);
    let net_result = (contribution_margin - fixed_total) + non_operating_result;

    let coverage_ratio_perc = if break_even > 0.0 {
        gross / break_even * 100.0
    } else {
        0.0
    };

    MonthlyCloseTotals {
        gross_revenue_amount: gross,
        billing_gap_amount: finite_or_zero(input.monthly_billing_amount) - gross,
        card_sales_perc: perc_of(finite_or_zero(input.card_sales_amount), gross),
        card_fee_amount: bridge.card_fee_amount,
        marketplace_fee_amount: bridge.marketplace_fee_amount,
        tax_amount: bridge.tax_amount,
        tax_perc,
        net_revenue_amount: bridge.net_revenue_amount,
        fixed_cost_total_amount: fixed_total,
        fixed_cost_other_amount: fixed_total - fixed_lines.sum(),
        fixed_cost_perc,
        variable_cost_total_amount: variable_total,
        variable_cost_other_amount: variable_total - variable_lines.sum(),
        variable_cost_perc,
        contribution_margin_amount: contribution_margin,
        contribution_margin_perc: perc_of(contribution_margin, gross),
        break_even_amount: break_even,
        non_operating_result_amount: non_operating_result,
        net_result_amount: net_result,
        net_result_perc: perc_of(net_result, gross),
        coverage_ratio_perc,
    }
}

// ============================================================================
// Health signals
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    Covered,
    AtLimit,
    Uncovered,
}

pub fn coverage_status(coverage_ratio_perc: f64) -> CoverageStatus {
    if coverage_ratio_perc >= 110.0 {
        CoverageStatus::Covered
    } else if coverage_ratio_perc >= 90.0 {
        CoverageStatus::AtLimit
    } else {
        CoverageStatus::Uncovered
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Attention,
    Critical,
}

fn rate(value: f64, good: f64, warn: f64) -> HealthStatus {
    if value >= good {
        HealthStatus::Healthy
    } else if value >= warn {
        HealthStatus::Attention
    } else {
        HealthStatus::Critical
    }
}

pub fn rate_contribution_margin(perc: f64) -> HealthStatus {
    rate(perc, 35.0, 20.0)
}

pub fn rate_net_result(perc: f64) -> HealthStatus {
    rate(perc, 15.0, 5.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginTier {
    Excellent,
    Healthy,
    /// Promotions and discounts are risky
    Sensitive,
    BelowIdeal,
}

pub fn margin_tier(contribution_margin_perc: f64) -> Option<MarginTier> {
    if !contribution_margin_perc.is_finite() {
        return None;
    }
    Some(if contribution_margin_perc > 60.0 {
        MarginTier::Excellent
    } else if contribution_margin_perc >= 50.0 {
        MarginTier::Healthy
    } else if contribution_margin_perc >= 45.0 {
        MarginTier::Sensitive
    } else {
        MarginTier::BelowIdeal
    })
}

// ============================================================================
// Month-over-month comparison
// ============================================================================

/// Period right before `(year, month)`
pub fn previous_period(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Current minus previous, field by field. Percentages are in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCloseDelta {
    pub gross_revenue_amount: f64,
    pub net_revenue_amount: f64,
    pub contribution_margin_amount: f64,
    pub contribution_margin_perc: f64,
    pub fixed_cost_total_amount: f64,
    pub variable_cost_total_amount: f64,
    pub break_even_amount: f64,
    pub non_operating_result_amount: f64,
    pub net_result_amount: f64,
    pub net_result_perc: f64,
}

pub fn compare_totals(current: &MonthlyCloseTotals, previous: &MonthlyCloseTotals) -> MonthlyCloseDelta {
    MonthlyCloseDelta {
        gross_revenue_amount: current.gross_revenue_amount - previous.gross_revenue_amount,
        net_revenue_amount: current.net_revenue_amount - previous.net_revenue_amount,
        contribution_margin_amount: current.contribution_margin_amount
            - previous.contribution_margin_amount,
        contribution_margin_perc: current.contribution_margin_perc - previous.contribution_margin_perc,
        fixed_cost_total_amount: current.fixed_cost_total_amount - previous.fixed_cost_total_amount,
        variable_cost_total_amount: current.variable_cost_total_amount
            - previous.variable_cost_total_amount,
        break_even_amount: current.break_even_amount - previous.break_even_amount,
        non_operating_result_amount: current.non_operating_result_amount
            - previous.non_operating_result_amount,
        net_result_amount: current.net_result_amount - previous.net_result_amount,
        net_result_perc: current.net_result_perc - previous.net_result_perc,
    }
}

// ============================================================================
// Daily sales goals
// ============================================================================

pub const WEEKDAY_SLOTS: usize = 5;

/// Inputs for splitting the break-even point into daily sales goals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyGoalInput {
    pub break_even_amount: f64,
    pub target_profit_perc: f64,
    /// Share of the month's sales made on each weekday slot (%)
    pub sales_distribution_perc: [f64; WEEKDAY_SLOTS],
    /// Occurrences of each weekday in the month
    pub weekday_count_in_month: u32,
}

impl Default for DailyGoalInput {
    fn default() -> Self {
        Self {
            break_even_amount: 0.0,
            target_profit_perc: 0.0,
            sales_distribution_perc: [0.0; WEEKDAY_SLOTS],
            weekday_count_in_month: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyGoals {
    /// Sales needed per day to reach break-even
    pub min_sales_amount: [f64; WEEKDAY_SLOTS],
    /// Sales needed per day to reach the target profit
    pub target_sales_amount: [f64; WEEKDAY_SLOTS],
}

pub fn daily_sales_goals(input: &DailyGoalInput) -> DailyGoals {
    let mut goals = DailyGoals::default();

    if input.weekday_count_in_month == 0 {
        return goals;
    }

    let weekdays = input.weekday_count_in_month as f64;
    let multiplier = 1.0 + input.target_profit_perc / 100.0;

    for (slot, perc) in input.sales_distribution_perc.iter().enumerate() {
        let min = input.break_even_amount * (perc / 100.0) / weekdays;
        goals.min_sales_amount[slot] = min;
        goals.target_sales_amount[slot] = min * multiplier;
    }

    goals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn sample_input() -> MonthlyCloseInput {
        MonthlyCloseInput {
            reference_year: 2025,
            reference_month: 3,
            bank_revenue_amount: 8000.0,
            cash_revenue_amount: 2000.0,
            variable_cost_total_amount: 4000.0,
            fixed_cost_total_amount: 3000.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_reference_example() {
        let totals = aggregate_monthly_close(&sample_input());
        assert_eq!(totals.gross_revenue_amount, 10000.0);
        assert_eq!(totals.contribution_margin_amount, 6000.0);
        assert!(approx(totals.contribution_margin_perc, 60.0));
        assert!(approx(totals.break_even_amount, 5000.0));
        assert_eq!(totals.net_result_amount, 3000.0);
        assert!(approx(totals.net_result_perc, 30.0));
        assert!(approx(totals.coverage_ratio_perc, 200.0));
        assert_eq!(coverage_status(totals.coverage_ratio_perc), CoverageStatus::Covered);
    }

    #[test]
    fn test_non_operating_entries_flow_into_result() {
        let input = MonthlyCloseInput {
            non_operating_inflows_amount: 500.0,
            non_operating_outflows_amount: 1200.0,
            ..sample_input()
        };
        let totals = aggregate_monthly_close(&input);
        assert_eq!(totals.non_operating_result_amount, -700.0);
        assert_eq!(
            totals.net_result_amount,
            totals.contribution_margin_amount - totals.fixed_cost_total_amount
                + totals.non_operating_result_amount
        );
        assert_eq!(totals.net_result_amount, 2300.0);
    }

    #[test]
    fn test_other_lines_reconcile_to_entered_totals() {
        let input = MonthlyCloseInput {
            fixed_costs: FixedCostLines {
                staff_payroll_amount: 1500.0,
                pro_labore_amount: 600.0,
                paid_traffic_amount: 150.0,
                ..Default::default()
            },
            variable_costs: VariableCostLines {
                ingredients_amount: 2500.0,
                delivery_amount: 400.0,
                taxes_amount: 600.0,
            },
            ..sample_input()
        };
        let totals = aggregate_monthly_close(&input);

        assert_eq!(totals.fixed_cost_other_amount, 750.0);
        assert_eq!(totals.variable_cost_other_amount, 500.0);
        assert_eq!(
            input.fixed_costs.sum() + totals.fixed_cost_other_amount,
            input.fixed_cost_total_amount
        );
        assert_eq!(
            input.variable_costs.sum() + totals.variable_cost_other_amount,
            input.variable_cost_total_amount
        );
    }

    #[test]
    fn test_tax_rate_is_derived_from_tax_amount() {
        let input = MonthlyCloseInput {
            variable_costs: VariableCostLines {
                taxes_amount: 600.0,
                ..Default::default()
            },
            ..sample_input()
        };
        let totals = aggregate_monthly_close(&input);
        assert!(approx(totals.tax_perc, 6.0));
        assert!(approx(totals.tax_amount, 600.0));
    }

    #[test]
    fn test_net_revenue_bridge_reconciles() {
        let input = MonthlyCloseInput {
            card_sales_amount: 6000.0,
            card_tax_perc: 3.5,
            marketplace_sales_amount: 1500.0,
            marketplace_tax_perc: 27.0,
            variable_costs: VariableCostLines {
                taxes_amount: 450.0,
                ..Default::default()
            },
            ..sample_input()
        };
        let totals = aggregate_monthly_close(&input);

        assert!(approx(totals.card_fee_amount, 210.0));
        assert!(approx(totals.marketplace_fee_amount, 405.0));
        assert!(approx(totals.card_sales_perc, 60.0));
        assert!(totals.net_revenue_amount <= totals.gross_revenue_amount);
        assert!(approx(
            totals.gross_revenue_amount - totals.net_revenue_amount,
            totals.card_fee_amount + totals.tax_amount + totals.marketplace_fee_amount
        ));
        assert!(approx(totals.net_revenue_amount, 10000.0 - 210.0 - 450.0 - 405.0));
    }

    #[test]
    fn test_compute_net_revenue_directly() {
        let bridge = compute_net_revenue(5000.0, 5000.0, 2.0, 4.0, 0.0, 25.0);
        assert!(approx(bridge.card_fee_amount, 100.0));
        assert!(approx(bridge.tax_amount, 200.0));
        assert_eq!(bridge.marketplace_fee_amount, 0.0);
        assert!(approx(bridge.gross_revenue_amount - bridge.net_revenue_amount, bridge.total_deductions()));
    }

    #[test]
    fn test_zero_revenue_guards_every_ratio() {
        let input = MonthlyCloseInput {
            fixed_cost_total_amount: 3000.0,
            variable_cost_total_amount: 200.0,
            card_sales_amount: 100.0,
            card_tax_perc: 3.0,
            ..Default::default()
        };
        let totals = aggregate_monthly_close(&input);
        assert_eq!(totals.gross_revenue_amount, 0.0);
        assert_eq!(totals.break_even_amount, 0.0);
        assert_eq!(totals.contribution_margin_perc, 0.0);
        assert_eq!(totals.net_result_perc, 0.0);
        assert_eq!(totals.coverage_ratio_perc, 0.0);
        assert_eq!(totals.tax_perc, 0.0);
        assert_eq!(totals.card_fee_amount, 0.0);
        assert_eq!(totals.net_result_amount, -3200.0);
        assert!(totals.fixed_cost_perc.is_finite());
    }

    #[test]
    fn test_variable_costs_equal_to_revenue_has_no_break_even() {
        let input = MonthlyCloseInput {
            variable_cost_total_amount: 10000.0,
            ..sample_input()
        };
        let totals = aggregate_monthly_close(&input);
        assert_eq!(totals.break_even_amount, 0.0);
        assert_eq!(totals.coverage_ratio_perc, 0.0);
    }

    #[test]
    fn test_non_finite_inputs_count_as_zero() {
        let input = MonthlyCloseInput {
            cash_revenue_amount: f64::NAN,
            non_operating_inflows_amount: f64::INFINITY,
            ..sample_input()
        };
        let totals = aggregate_monthly_close(&input);
        assert_eq!(totals.gross_revenue_amount, 8000.0);
        assert_eq!(totals.non_operating_result_amount, 0.0);
    }

    #[test]
    fn test_status_ratings() {
        assert_eq!(coverage_status(110.0), CoverageStatus::Covered);
        assert_eq!(coverage_status(95.0), CoverageStatus::AtLimit);
        assert_eq!(coverage_status(89.9), CoverageStatus::Uncovered);

        assert_eq!(rate_contribution_margin(40.0), HealthStatus::Healthy);
        assert_eq!(rate_contribution_margin(25.0), HealthStatus::Attention);
        assert_eq!(rate_contribution_margin(10.0), HealthStatus::Critical);
        assert_eq!(rate_net_result(15.0), HealthStatus::Healthy);
        assert_eq!(rate_net_result(4.99), HealthStatus::Critical);

        assert_eq!(margin_tier(61.0), Some(MarginTier::Excellent));
        assert_eq!(margin_tier(60.0), Some(MarginTier::Healthy));
        assert_eq!(margin_tier(45.0), Some(MarginTier::Sensitive));
        assert_eq!(margin_tier(44.0), Some(MarginTier::BelowIdeal));
        assert_eq!(margin_tier(f64::NAN), None);
    }

    #[test]
    fn test_previous_period_wraps_year() {
        assert_eq!(previous_period(2025, 1), (2024, 12));
        assert_eq!(previous_period(2025, 7), (2025, 6));
    }

    #[test]
    fn test_compare_totals() {
        let previous = aggregate_monthly_close(&sample_input());
        let current = aggregate_monthly_close(&MonthlyCloseInput {
            bank_revenue_amount: 10000.0,
            ..sample_input()
        });
        let delta = compare_totals(&current, &previous);
        assert_eq!(delta.gross_revenue_amount, 2000.0);
        assert_eq!(delta.net_result_amount, 2000.0);
        assert_eq!(delta.fixed_cost_total_amount, 0.0);
        assert!(approx(delta.contribution_margin_perc, 66.666_666_666 - 60.0));
    }

    #[test]
    fn test_daily_sales_goals() {
        let goals = daily_sales_goals(&DailyGoalInput {
            break_even_amount: 40000.0,
            target_profit_perc: 10.0,
            sales_distribution_perc: [10.0, 15.0, 20.0, 25.0, 30.0],
            weekday_count_in_month: 4,
        });
        assert!(approx(goals.min_sales_amount[0], 1000.0));
        assert!(approx(goals.min_sales_amount[4], 3000.0));
        assert!(approx(goals.target_sales_amount[4], 3300.0));

        let empty = daily_sales_goals(&DailyGoalInput {
            weekday_count_in_month: 0,
            ..DailyGoalInput::default()
        });
        assert_eq!(empty, DailyGoals::default());
    }
}
