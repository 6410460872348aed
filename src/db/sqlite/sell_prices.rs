//! Selling price per (menu item, size, channel) and its audit trail

use crate::db::sqlite::models::{NewSellPriceAudit, SellPriceAudit, SellPriceVariation, SellPriceWrite};
use crate::error::Result;
use rusqlite::{params, Connection, Row};

const SELECT_SELL_PRICE: &str = "SELECT sp.id, sp.menu_item_id, sp.size_id, s.key, sp.channel_id, c.key,
        sp.price_amount, sp.previous_price_amount, sp.discount_percentage,
        sp.updated_by, sp.updated_at
     FROM sell_price_variations sp
     JOIN sizes s ON s.id = sp.size_id
     JOIN channels c ON c.id = sp.channel_id";

fn sell_price_from_row(row: &Row) -> rusqlite::Result<SellPriceVariation> {
    Ok(SellPriceVariation {
        id: row.get(0)?,
        menu_item_id: row.get(1)?,
        size_id: row.get(2)?,
        size_key: row.get(3)?,
        channel_id: row.get(4)?,
        channel_key: row.get(5)?,
        price_amount: row.get(6)?,
        previous_price_amount: row.get(7)?,
        discount_percentage: row.get(8)?,
        updated_by: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn audit_from_row(row: &Row) -> rusqlite::Result<SellPriceAudit> {
    Ok(SellPriceAudit {
        id: row.get(0)?,
        menu_item_id: row.get(1)?,
        size_id: row.get(2)?,
        channel_id: row.get(3)?,
        recipe_cost_amount: row.get(4)?,
        packaging_cost_amount: row.get(5)?,
        dough_cost_amount: row.get(6)?,
        waste_cost_amount: row.get(7)?,
        dna_perc: row.get(8)?,
        selling_price_expected_amount: row.get(9)?,
        profit_expected_perc: row.get(10)?,
        selling_price_actual_amount: row.get(11)?,
        profit_actual_perc: row.get(12)?,
        updated_by: row.get(13)?,
        created_at: row.get(14)?,
    })
}

/// Write a selling price and append its audit record in one transaction.
///
/// The outgoing price is copied into `previous_price_amount` by the same
/// statement; a first write records a previous value of 0.
pub fn write_sell_price(
    conn: &mut Connection,
    write: &SellPriceWrite,
    audit: &NewSellPriceAudit,
) -> Result<SellPriceVariation> {
    let now = chrono::Utc::now().to_rfc3339();
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO sell_price_variations
            (id, menu_item_id, size_id, channel_id, price_amount, previous_price_amount,
             discount_percentage, updated_by, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7, ?8)
         ON CONFLICT(menu_item_id, size_id, channel_id) DO UPDATE SET
            previous_price_amount = sell_price_variations.price_amount,
            price_amount = excluded.price_amount,
            discount_percentage = excluded.discount_percentage,
            updated_by = excluded.updated_by,
            updated_at = excluded.updated_at",
        params![
            uuid::Uuid::new_v4().to_string(),
            write.menu_item_id,
            write.size_id,
            write.channel_id,
            write.price_amount,
            write.discount_percentage,
            write.updated_by,
            now,
        ],
    )?;

    tx.execute(
        "INSERT INTO sell_price_audits
            (id, menu_item_id, size_id, channel_id, recipe_cost_amount, packaging_cost_amount,
             dough_cost_amount, waste_cost_amount, dna_perc, selling_price_expected_amount,
             profit_expected_perc, selling_price_actual_amount, profit_actual_perc,
             updated_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            uuid::Uuid::new_v4().to_string(),
            audit.menu_item_id,
            audit.size_id,
            audit.channel_id,
            audit.recipe_cost_amount,
            audit.packaging_cost_amount,
            audit.dough_cost_amount,
            audit.waste_cost_amount,
            audit.dna_perc,
            audit.selling_price_expected_amount,
            audit.profit_expected_perc,
            audit.selling_price_actual_amount,
            audit.profit_actual_perc,
            audit.updated_by,
            now,
        ],
    )?;

    let variation = tx.query_row(
        &format!(
            "{} WHERE sp.menu_item_id = ?1 AND sp.size_id = ?2 AND sp.channel_id = ?3",
            SELECT_SELL_PRICE
        ),
        params![write.menu_item_id, write.size_id, write.channel_id],
        sell_price_from_row,
    )?;

    tx.commit()?;

    Ok(variation)
}

pub fn list_sell_prices(conn: &Connection) -> Result<Vec<SellPriceVariation>> {
    let mut stmt = conn.prepare(&format!(
        "{} ORDER BY sp.menu_item_id, s.sort_order_index, c.name",
        SELECT_SELL_PRICE
    ))?;

    let prices = stmt
        .query_map([], sell_price_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(prices)
}

/// Audit trail of one price, newest first
pub fn get_sell_price_audits(
    conn: &Connection,
    menu_item_id: &str,
    size_id: &str,
    channel_id: &str,
) -> Result<Vec<SellPriceAudit>> {
    let mut stmt = conn.prepare(
        "SELECT id, menu_item_id, size_id, channel_id, recipe_cost_amount, packaging_cost_amount,
                dough_cost_amount, waste_cost_amount, dna_perc, selling_price_expected_amount,
                profit_expected_perc, selling_price_actual_amount, profit_actual_perc,
                updated_by, created_at
         FROM sell_price_audits
         WHERE menu_item_id = ?1 AND size_id = ?2 AND channel_id = ?3
         ORDER BY rowid DESC",
    )?;

    let audits = stmt
        .query_map(params![menu_item_id, size_id, channel_id], audit_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(audits)
}
