//! Monthly close storage
//!
//! Totals are aggregated from the raw figures on write. Totals returned
//! on read are recomputed from the raw figures, so they always match the
//! current aggregation rules.

use crate::db::sqlite::models::MonthlyCloseRecord;
use crate::error::Result;
use crate::finance::monthly_close::{
    aggregate_monthly_close, FixedCostLines, MonthlyCloseInput, VariableCostLines,
};
use rusqlite::{named_params, params, Connection, OptionalExtension, Row};

const SELECT_MONTHLY_CLOSE: &str = "SELECT id, reference_year, reference_month,
        bank_revenue_amount, cash_revenue_amount, monthly_billing_amount,
        card_sales_amount, card_tax_perc, marketplace_sales_amount, marketplace_tax_perc,
        fixed_health_plan_amount, fixed_staff_payroll_amount, fixed_pro_labore_amount,
        fixed_pro_labore_withdrawal_amount, fixed_profit_withdrawal_amount,
        fixed_loan_installment_amount, fixed_marketing_agency_amount, fixed_paid_traffic_amount,
        fixed_credit_card_bill_amount, fixed_cost_total_amount,
        variable_ingredients_amount, variable_delivery_amount, variable_taxes_amount,
        variable_cost_total_amount, non_operating_inflows_amount, non_operating_outflows_amount,
        notes, created_at, updated_at
     FROM monthly_closes";

fn record_from_row(row: &Row) -> rusqlite::Result<MonthlyCloseRecord> {
    let input = MonthlyCloseInput {
        reference_year: row.get(1)?,
        reference_month: row.get(2)?,
        bank_revenue_amount: row.get(3)?,
        cash_revenue_amount: row.get(4)?,
        monthly_billing_amount: row.get(5)?,
        card_sales_amount: row.get(6)?,
        card_tax_perc: row.get(7)?,
        marketplace_sales_amount: row.get(8)?,
        marketplace_tax_perc: row.get(9)?,
        fixed_costs: FixedCostLines {
            health_plan_amount: row.get(10)?,
            staff_payroll_amount: row.get(11)?,
            pro_labore_amount: row.get(12)?,
            pro_labore_withdrawal_amount: row.get(13)?,
            profit_withdrawal_amount: row.get(14)?,
            loan_installment_amount: row.get(15)?,
            marketing_agency_amount: row.get(16)?,
            paid_traffic_amount: row.get(17)?,
            credit_card_bill_amount: row.get(18)?,
        },
        fixed_cost_total_amount: row.get(19)?,
        variable_costs: VariableCostLines {
            ingredients_amount: row.get(20)?,
            delivery_amount: row.get(21)?,
            taxes_amount: row.get(22)?,
        },
        variable_cost_total_amount: row.get(23)?,
        non_operating_inflows_amount: row.get(24)?,
        non_operating_outflows_amount: row.get(25)?,
        notes: row.get(26)?,
    };
    let totals = aggregate_monthly_close(&input);

    Ok(MonthlyCloseRecord {
        id: row.get(0)?,
        input,
        totals,
        created_at: row.get(27)?,
        updated_at: row.get(28)?,
    })
}

/// Insert or replace the close of `(reference_year, reference_month)`
pub fn upsert_monthly_close(conn: &Connection, input: &MonthlyCloseInput) -> Result<MonthlyCloseRecord> {
    let totals = aggregate_monthly_close(input);
    let now = chrono::Utc::now().to_rfc3339();
    let fixed = &input.fixed_costs;
    let variable = &input.variable_costs;

    conn.execute(
        "INSERT INTO monthly_closes (
            id, reference_year, reference_month,
            bank_revenue_amount, cash_revenue_amount, monthly_billing_amount,
            card_sales_amount, card_tax_perc, marketplace_sales_amount, marketplace_tax_perc,
            fixed_health_plan_amount, fixed_staff_payroll_amount, fixed_pro_labore_amount,
            fixed_pro_labore_withdrawal_amount, fixed_profit_withdrawal_amount,
            fixed_loan_installment_amount, fixed_marketing_agency_amount, fixed_paid_traffic_amount,
            fixed_credit_card_bill_amount, fixed_cost_total_amount,
            variable_ingredients_amount, variable_delivery_amount, variable_taxes_amount,
            variable_cost_total_amount, non_operating_inflows_amount, non_operating_outflows_amount,
            notes,
            gross_revenue_amount, card_sales_perc, card_fee_amount, marketplace_fee_amount,
            tax_amount, tax_perc, net_revenue_amount, fixed_cost_other_amount, fixed_cost_perc,
            variable_cost_other_amount, variable_cost_perc, contribution_margin_amount,
            contribution_margin_perc, break_even_amount, net_result_amount, net_result_perc,
            created_at, updated_at
         ) VALUES (
            :id, :year, :month,
            :bank, :cash, :billing,
            :card_sales, :card_tax, :marketplace_sales, :marketplace_tax,
            :health_plan, :staff_payroll, :pro_labore,
            :pro_labore_withdrawal, :profit_withdrawal,
            :loan_installment, :marketing_agency, :paid_traffic,
            :credit_card_bill, :fixed_total,
            :ingredients, :delivery, :taxes,
            :variable_total, :inflows, :outflows,
            :notes,
            :gross, :card_sales_perc, :card_fee, :marketplace_fee,
            :tax_amount, :tax_perc, :net_revenue, :fixed_other, :fixed_perc,
            :variable_other, :variable_perc, :margin,
            :margin_perc, :break_even, :net_result, :net_result_perc,
            :now, :now
         )
         ON CONFLICT(reference_year, reference_month) DO UPDATE SET
            bank_revenue_amount = excluded.bank_revenue_amount,
            cash_revenue_amount = excluded.cash_revenue_amount,
            monthly_billing_amount = excluded.monthly_billing_amount,
            card_sales_amount = excluded.card_sales_amount,
            card_tax_perc = excluded.card_tax_perc,
            marketplace_sales_amount = excluded.marketplace_sales_amount,
            marketplace_tax_perc = excluded.marketplace_tax_perc,
            fixed_health_plan_amount = excluded.fixed_health_plan_amount,
            fixed_staff_payroll_amount = excluded.fixed_staff_payroll_amount,
            fixed_pro_labore_amount = excluded.fixed_pro_labore_amount,
            fixed_pro_labore_withdrawal_amount = excluded.fixed_pro_labore_withdrawal_amount,
            fixed_profit_withdrawal_amount = excluded.fixed_profit_withdrawal_amount,
            fixed_loan_installment_amount = excluded.fixed_loan_installment_amount,
            fixed_marketing_agency_amount = excluded.fixed_marketing_agency_amount,
            fixed_paid_traffic_amount = excluded.fixed_paid_traffic_amount,
            fixed_credit_card_bill_amount = excluded.fixed_credit_card_bill_amount,
            fixed_cost_total_amount = excluded.fixed_cost_total_amount,
            variable_ingredients_amount = excluded.variable_ingredients_amount,
            variable_delivery_amount = excluded.variable_delivery_amount,
            variable_taxes_amount = excluded.variable_taxes_amount,
            variable_cost_total_amount = excluded.variable_cost_total_amount,
            non_operating_inflows_amount = excluded.non_operating_inflows_amount,
            non_operating_outflows_amount = excluded.non_operating_outflows_amount,
            notes = excluded.notes,
            gross_revenue_amount = excluded.gross_revenue_amount,
            card_sales_perc = excluded.card_sales_perc,
            card_fee_amount = excluded.card_fee_amount,
            marketplace_fee_amount = excluded.marketplace_fee_amount,
            tax_amount = excluded.tax_amount,
            tax_perc = excluded.tax_perc,
            net_revenue_amount = excluded.net_revenue_amount,
            fixed_cost_other_amount = excluded.fixed_cost_other_amount,
            fixed_cost_perc = excluded.fixed_cost_perc,
            variable_cost_other_amount = excluded.variable_cost_other_amount,
            variable_cost_perc = excluded.variable_cost_perc,
            contribution_margin_amount = excluded.contribution_margin_amount,
            contribution_margin_perc = excluded.contribution_margin_perc,
            break_even_amount = excluded.break_even_amount,
            net_result_amount = excluded.net_result_amount,
            net_result_perc = excluded.net_result_perc,
            updated_at = excluded.updated_at",
        named_params! {
            ":id": uuid::Uuid::new_v4().to_string(),
            ":year": input.reference_year,
            ":month": input.reference_month,
            ":bank": input.bank_revenue_amount,
            ":cash": input.cash_revenue_amount,
            ":billing": input.monthly_billing_amount,
            ":card_sales": input.card_sales_amount,
            ":card_tax": input.card_tax_perc,
            ":marketplace_sales": input.marketplace_sales_amount,
            ":marketplace_tax": input.marketplace_tax_perc,
            ":health_plan": fixed.health_plan_amount,
            ":staff_payroll": fixed.staff_payroll_amount,
            ":pro_labore": fixed.pro_labore_amount,
            ":pro_labore_withdrawal": fixed.pro_labore_withdrawal_amount,
            ":profit_withdrawal": fixed.profit_withdrawal_amount,
            ":loan_installment": fixed.loan_installment_amount,
            ":marketing_agency": fixed.marketing_agency_amount,
            ":paid_traffic": fixed.paid_traffic_amount,
            ":credit_card_bill": fixed.credit_card_bill_amount,
            ":fixed_total": input.fixed_cost_total_amount,
            ":ingredients": variable.ingredients_amount,
            ":delivery": variable.delivery_amount,
            ":taxes": variable.taxes_amount,
            ":variable_total": input.variable_cost_total_amount,
            ":inflows": input.non_operating_inflows_amount,
            ":outflows": input.non_operating_outflows_amount,
            ":notes": input.notes,
            ":gross": totals.gross_revenue_amount,
            ":card_sales_perc": totals.card_sales_perc,
            ":card_fee": totals.card_fee_amount,
            ":marketplace_fee": totals.marketplace_fee_amount,
            ":tax_amount": totals.tax_amount,
            ":tax_perc": totals.tax_perc,
            ":net_revenue": totals.net_revenue_amount,
            ":fixed_other": totals.fixed_cost_other_amount,
            ":fixed_perc": totals.fixed_cost_perc,
            ":variable_other": totals.variable_cost_other_amount,
            ":variable_perc": totals.variable_cost_perc,
            ":margin": totals.contribution_margin_amount,
            ":margin_perc": totals.contribution_margin_perc,
            ":break_even": totals.break_even_amount,
            ":net_result": totals.net_result_amount,
            ":net_result_perc": totals.net_result_perc,
            ":now": now,
        },
    )?;

    let record = conn.query_row(
        &format!(
            "{} WHERE reference_year = ?1 AND reference_month = ?2",
            SELECT_MONTHLY_CLOSE
        ),
        params![input.reference_year, input.reference_month],
        record_from_row,
    )?;

    Ok(record)
}

pub fn get_monthly_close(conn: &Connection, year: i32, month: u32) -> Result<Option<MonthlyCloseRecord>> {
    let record = conn
        .query_row(
            &format!(
                "{} WHERE reference_year = ?1 AND reference_month = ?2",
                SELECT_MONTHLY_CLOSE
            ),
            params![year, month],
            record_from_row,
        )
        .optional()?;

    Ok(record)
}

/// All closes, most recent period first
pub fn list_monthly_closes(conn: &Connection) -> Result<Vec<MonthlyCloseRecord>> {
    let mut stmt = conn.prepare(&format!(
        "{} ORDER BY reference_year DESC, reference_month DESC",
        SELECT_MONTHLY_CLOSE
    ))?;

    let records = stmt
        .query_map([], record_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(records)
}

/// Delete a close. Returns whether a row was removed.
pub fn delete_monthly_close(conn: &Connection, year: i32, month: u32) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM monthly_closes WHERE reference_year = ?1 AND reference_month = ?2",
        params![year, month],
    )?;

    Ok(deleted > 0)
}
