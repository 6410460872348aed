//! SQLite database migrations

use crate::error::Result;
use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Create migrations table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    run_migration(conn, "001_settings", CREATE_SETTINGS_TABLE)?;
    run_migration(conn, "002_sizes", CREATE_SIZES_TABLE)?;
    run_migration(conn, "003_channels", CREATE_CHANNELS_TABLE)?;
    run_migration(conn, "004_menu_items", CREATE_MENU_ITEMS_TABLE)?;
    run_migration(conn, "005_cost_variations", CREATE_COST_VARIATIONS_TABLE)?;
    run_migration(conn, "006_sell_price_variations", CREATE_SELL_PRICE_VARIATIONS_TABLE)?;
    run_migration(conn, "007_sell_price_audits", CREATE_SELL_PRICE_AUDITS_TABLE)?;
    run_migration(conn, "008_monthly_closes", CREATE_MONTHLY_CLOSES_TABLE)?;

    tracing::info!("Database migrations completed");
    Ok(())
}

fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
    // Check if migration already applied
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM migrations WHERE name = ?)",
        [name],
        |row| row.get(0),
    )?;

    if !exists {
        tracing::info!("Running migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
    }

    Ok(())
}

const CREATE_SETTINGS_TABLE: &str = r#"
CREATE TABLE settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    dna_perc REAL NOT NULL DEFAULT 0,
    waste_perc REAL NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
INSERT OR IGNORE INTO settings (id) VALUES (1);
"#;

const CREATE_SIZES_TABLE: &str = r#"
CREATE TABLE sizes (
    id TEXT PRIMARY KEY,
    key TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    sort_order_index INTEGER NOT NULL DEFAULT 0,
    packaging_cost_amount REAL NOT NULL DEFAULT 0,
    dough_cost_amount REAL NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
INSERT OR IGNORE INTO sizes (id, key, name, sort_order_index) VALUES
    ('size-slice', 'pizza-slice', 'Slice', 1),
    ('size-individual', 'pizza-individual', 'Individual', 2),
    ('size-small', 'pizza-small', 'Small', 3),
    ('size-medium', 'pizza-medium', 'Medium', 4),
    ('size-big', 'pizza-big', 'Big', 5),
    ('size-bigger', 'pizza-bigger', 'Bigger', 6);
"#;

const CREATE_CHANNELS_TABLE: &str = r#"
CREATE TABLE channels (
    id TEXT PRIMARY KEY,
    key TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    is_marketplace INTEGER NOT NULL DEFAULT 0,
    tax_perc REAL NOT NULL DEFAULT 0,
    fee_amount REAL NOT NULL DEFAULT 0,
    online_payment_tax_perc REAL NOT NULL DEFAULT 0,
    target_margin_perc REAL NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

const CREATE_MENU_ITEMS_TABLE: &str = r#"
CREATE TABLE menu_items (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    visible INTEGER NOT NULL DEFAULT 1,
    sort_order_index INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

const CREATE_COST_VARIATIONS_TABLE: &str = r#"
CREATE TABLE cost_variations (
    id TEXT PRIMARY KEY,
    menu_item_id TEXT NOT NULL REFERENCES menu_items(id) ON DELETE CASCADE,
    size_id TEXT NOT NULL REFERENCES sizes(id),
    cost_amount REAL NOT NULL DEFAULT 0,
    previous_cost_amount REAL NOT NULL DEFAULT 0,
    updated_by TEXT,
    updated_at TEXT NOT NULL,
    UNIQUE(menu_item_id, size_id)
);
CREATE INDEX IF NOT EXISTS idx_cost_variations_size ON cost_variations(size_id);
"#;

const CREATE_SELL_PRICE_VARIATIONS_TABLE: &str = r#"
CREATE TABLE sell_price_variations (
    id TEXT PRIMARY KEY,
    menu_item_id TEXT NOT NULL REFERENCES menu_items(id) ON DELETE CASCADE,
    size_id TEXT NOT NULL REFERENCES sizes(id),
    channel_id TEXT NOT NULL REFERENCES channels(id),
    price_amount REAL NOT NULL DEFAULT 0,
    previous_price_amount REAL NOT NULL DEFAULT 0,
    discount_percentage REAL NOT NULL DEFAULT 0,
    updated_by TEXT,
    updated_at TEXT NOT NULL,
    UNIQUE(menu_item_id, size_id, channel_id)
);
CREATE INDEX IF NOT EXISTS idx_sell_price_variations_channel ON sell_price_variations(channel_id);
"#;

const CREATE_SELL_PRICE_AUDITS_TABLE: &str = r#"
CREATE TABLE sell_price_audits (
    id TEXT PRIMARY KEY,
    menu_item_id TEXT NOT NULL REFERENCES menu_items(id) ON DELETE CASCADE,
    size_id TEXT NOT NULL,
    channel_id TEXT NOT NULL,
    recipe_cost_amount REAL NOT NULL,
    packaging_cost_amount REAL NOT NULL,
    dough_cost_amount REAL NOT NULL,
    waste_cost_amount REAL NOT NULL,
    dna_perc REAL NOT NULL,
    selling_price_expected_amount REAL NOT NULL,
    profit_expected_perc REAL NOT NULL,
    selling_price_actual_amount REAL NOT NULL,
    profit_actual_perc REAL NOT NULL,
    updated_by TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_sell_price_audits_variation
    ON sell_price_audits(menu_item_id, size_id, channel_id, created_at);
"#;

const CREATE_MONTHLY_CLOSES_TABLE: &str = r#"
CREATE TABLE monthly_closes (
    id TEXT PRIMARY KEY,
    reference_year INTEGER NOT NULL,
    reference_month INTEGER NOT NULL CHECK (reference_month BETWEEN 1 AND 12),
    bank_revenue_amount REAL NOT NULL DEFAULT 0,
    cash_revenue_amount REAL NOT NULL DEFAULT 0,
    monthly_billing_amount REAL NOT NULL DEFAULT 0,
    card_sales_amount REAL NOT NULL DEFAULT 0,
    card_tax_perc REAL NOT NULL DEFAULT 0,
    marketplace_sales_amount REAL NOT NULL DEFAULT 0,
    marketplace_tax_perc REAL NOT NULL DEFAULT 0,
    fixed_health_plan_amount REAL NOT NULL DEFAULT 0,
    fixed_staff_payroll_amount REAL NOT NULL DEFAULT 0,
    fixed_pro_labore_amount REAL NOT NULL DEFAULT 0,
    fixed_pro_labore_withdrawal_amount REAL NOT NULL DEFAULT 0,
    fixed_profit_withdrawal_amount REAL NOT NULL DEFAULT 0,
    fixed_loan_installment_amount REAL NOT NULL DEFAULT 0,
    fixed_marketing_agency_amount REAL NOT NULL DEFAULT 0,
    fixed_paid_traffic_amount REAL NOT NULL DEFAULT 0,
    fixed_credit_card_bill_amount REAL NOT NULL DEFAULT 0,
    fixed_cost_total_amount REAL NOT NULL DEFAULT 0,
    variable_ingredients_amount REAL NOT NULL DEFAULT 0,
    variable_delivery_amount REAL NOT NULL DEFAULT 0,
    variable_taxes_amount REAL NOT NULL DEFAULT 0,
    variable_cost_total_amount REAL NOT NULL DEFAULT 0,
    non_operating_inflows_amount REAL NOT NULL DEFAULT 0,
    non_operating_outflows_amount REAL NOT NULL DEFAULT 0,
    notes TEXT,
    -- derived, rewritten on every save
    gross_revenue_amount REAL NOT NULL DEFAULT 0,
    card_sales_perc REAL NOT NULL DEFAULT 0,
    card_fee_amount REAL NOT NULL DEFAULT 0,
    marketplace_fee_amount REAL NOT NULL DEFAULT 0,
    tax_amount REAL NOT NULL DEFAULT 0,
    tax_perc REAL NOT NULL DEFAULT 0,
    net_revenue_amount REAL NOT NULL DEFAULT 0,
    fixed_cost_other_amount REAL NOT NULL DEFAULT 0,
    fixed_cost_perc REAL NOT NULL DEFAULT 0,
    variable_cost_other_amount REAL NOT NULL DEFAULT 0,
    variable_cost_perc REAL NOT NULL DEFAULT 0,
    contribution_margin_amount REAL NOT NULL DEFAULT 0,
    contribution_margin_perc REAL NOT NULL DEFAULT 0,
    break_even_amount REAL NOT NULL DEFAULT 0,
    net_result_amount REAL NOT NULL DEFAULT 0,
    net_result_perc REAL NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(reference_year, reference_month)
);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(applied, 8);

        let sizes: i64 = conn
            .query_row("SELECT COUNT(*) FROM sizes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(sizes, 6);
    }
}
