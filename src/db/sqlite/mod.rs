//! SQLite database module

pub mod models;
mod catalog;
mod cost_variations;
mod migrations;
mod monthly_close;
mod sell_prices;
mod settings;

use crate::error::Result;
use crate::finance::monthly_close::MonthlyCloseInput;
use crate::finance::types::{Channel, OverheadConfig, Size};
use models::*;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;

/// SQLite database wrapper
pub struct SqliteDb {
    conn: Mutex<Connection>,
}

impl SqliteDb {
    /// Create new SQLite database connection
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )?;

        Self::with_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Mutex::new(conn),
        };

        // Run migrations
        db.run_migrations()?;

        Ok(db)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock();
        migrations::run_migrations(&conn)
    }

    // ========== Settings Methods ==========

    /// Get overhead configuration
    pub fn get_overhead(&self) -> Result<OverheadConfig> {
        let conn = self.conn.lock();
        settings::get_overhead(&conn)
    }

    /// Update overhead configuration
    pub fn update_overhead(
        &self,
        dna_percentage: Option<f64>,
        waste_percentage: Option<f64>,
    ) -> Result<OverheadConfig> {
        let conn = self.conn.lock();
        settings::update_overhead(&conn, dna_percentage, waste_percentage)
    }

    // ========== Catalog Methods ==========

    pub fn list_sizes(&self) -> Result<Vec<Size>> {
        let conn = self.conn.lock();
        catalog::list_sizes(&conn)
    }

    pub fn get_size(&self, id: &str) -> Result<Option<Size>> {
        let conn = self.conn.lock();
        catalog::get_size(&conn, id)
    }

    /// Set packaging and dough cost of a size
    pub fn update_size_costs(
        &self,
        id: &str,
        packaging_cost_amount: f64,
        dough_cost_amount: f64,
    ) -> Result<Option<Size>> {
        let conn = self.conn.lock();
        catalog::update_size_costs(&conn, id, packaging_cost_amount, dough_cost_amount)
    }

    pub fn list_channels(&self) -> Result<Vec<Channel>> {
        let conn = self.conn.lock();
        catalog::list_channels(&conn)
    }

    pub fn get_channel(&self, id: &str) -> Result<Option<Channel>> {
        let conn = self.conn.lock();
        catalog::get_channel(&conn, id)
    }

    /// Insert or update a channel by key
    pub fn upsert_channel(&self, channel: &Channel) -> Result<Channel> {
        let conn = self.conn.lock();
        catalog::upsert_channel(&conn, channel)
    }

    pub fn create_menu_item(&self, request: &CreateMenuItemRequest) -> Result<MenuItem> {
        let conn = self.conn.lock();
        catalog::create_menu_item(&conn, request)
    }

    pub fn list_menu_items(&self) -> Result<Vec<MenuItem>> {
        let conn = self.conn.lock();
        catalog::list_menu_items(&conn)
    }

    pub fn get_menu_item(&self, id: &str) -> Result<Option<MenuItem>> {
        let conn = self.conn.lock();
        catalog::get_menu_item(&conn, id)
    }

    // ========== Cost Methods ==========

    /// Write a cost, keeping the outgoing value as previous
    pub fn upsert_cost_variation(
        &self,
        menu_item_id: &str,
        size_id: &str,
        cost_amount: f64,
        updated_by: Option<&str>,
    ) -> Result<CostVariation> {
        let conn = self.conn.lock();
        cost_variations::upsert_cost_variation(&conn, menu_item_id, size_id, cost_amount, updated_by)
    }

    pub fn get_item_cost_variations(&self, menu_item_id: &str) -> Result<Vec<CostVariation>> {
        let conn = self.conn.lock();
        cost_variations::get_item_cost_variations(&conn, menu_item_id)
    }

    pub fn list_cost_variations(&self) -> Result<Vec<CostVariation>> {
        let conn = self.conn.lock();
        cost_variations::list_cost_variations(&conn)
    }

    // ========== Sell Price Methods ==========

    /// Write a selling price together with its audit record
    pub fn write_sell_price(
        &self,
        write: &SellPriceWrite,
        audit: &NewSellPriceAudit,
    ) -> Result<SellPriceVariation> {
        let mut conn = self.conn.lock();
        sell_prices::write_sell_price(&mut conn, write, audit)
    }

    pub fn list_sell_prices(&self) -> Result<Vec<SellPriceVariation>> {
        let conn = self.conn.lock();
        sell_prices::list_sell_prices(&conn)
    }

    pub fn get_sell_price_audits(
        &self,
        menu_item_id: &str,
        size_id: &str,
        channel_id: &str,
    ) -> Result<Vec<SellPriceAudit>> {
        let conn = self.conn.lock();
        sell_prices::get_sell_price_audits(&conn, menu_item_id, size_id, channel_id)
    }

    // ========== Monthly Close Methods ==========

    /// Insert or replace the close of the input's period
    pub fn upsert_monthly_close(&self, input: &MonthlyCloseInput) -> Result<MonthlyCloseRecord> {
        let conn = self.conn.lock();
        monthly_close::upsert_monthly_close(&conn, input)
    }

    pub fn get_monthly_close(&self, year: i32, month: u32) -> Result<Option<MonthlyCloseRecord>> {
        let conn = self.conn.lock();
        monthly_close::get_monthly_close(&conn, year, month)
    }

    pub fn list_monthly_closes(&self) -> Result<Vec<MonthlyCloseRecord>> {
        let conn = self.conn.lock();
        monthly_close::list_monthly_closes(&conn)
    }

    pub fn delete_monthly_close(&self, year: i32, month: u32) -> Result<bool> {
        let conn = self.conn.lock();
        monthly_close::delete_monthly_close(&conn, year, month)
    }
}
