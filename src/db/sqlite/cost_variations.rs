//! Ingredient cost per (menu item, size)

use crate::db::sqlite::models::CostVariation;
use crate::error::Result;
use rusqlite::{params, Connection, Row};

const SELECT_COST_VARIATION: &str = "SELECT cv.id, cv.menu_item_id, cv.size_id, s.key, cv.cost_amount,
        cv.previous_cost_amount, cv.updated_by, cv.updated_at
     FROM cost_variations cv
     JOIN sizes s ON s.id = cv.size_id";

fn cost_variation_from_row(row: &Row) -> rusqlite::Result<CostVariation> {
    Ok(CostVariation {
        id: row.get(0)?,
        menu_item_id: row.get(1)?,
        size_id: row.get(2)?,
        size_key: row.get(3)?,
        cost_amount: row.get(4)?,
        previous_cost_amount: row.get(5)?,
        updated_by: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Write a cost. The outgoing value is copied into `previous_cost_amount`
/// by the same statement; a first write records a previous value of 0.
pub fn upsert_cost_variation(
    conn: &Connection,
    menu_item_id: &str,
    size_id: &str,
    cost_amount: f64,
    updated_by: Option<&str>,
) -> Result<CostVariation> {
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO cost_variations
            (id, menu_item_id, size_id, cost_amount, previous_cost_amount, updated_by, updated_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)
         ON CONFLICT(menu_item_id, size_id) DO UPDATE SET
            previous_cost_amount = cost_variations.cost_amount,
            cost_amount = excluded.cost_amount,
            updated_by = excluded.updated_by,
            updated_at = excluded.updated_at",
        params![id, menu_item_id, size_id, cost_amount, updated_by, now],
    )?;

    let variation = conn.query_row(
        &format!(
            "{} WHERE cv.menu_item_id = ?1 AND cv.size_id = ?2",
            SELECT_COST_VARIATION
        ),
        params![menu_item_id, size_id],
        cost_variation_from_row,
    )?;

    Ok(variation)
}

/// Costs of one item, in size order
pub fn get_item_cost_variations(conn: &Connection, menu_item_id: &str) -> Result<Vec<CostVariation>> {
    let mut stmt = conn.prepare(&format!(
        "{} WHERE cv.menu_item_id = ?1 ORDER BY s.sort_order_index",
        SELECT_COST_VARIATION
    ))?;

    let variations = stmt
        .query_map([menu_item_id], cost_variation_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(variations)
}

pub fn list_cost_variations(conn: &Connection) -> Result<Vec<CostVariation>> {
    let mut stmt = conn.prepare(&format!(
        "{} ORDER BY cv.menu_item_id, s.sort_order_index",
        SELECT_COST_VARIATION
    ))?;

    let variations = stmt
        .query_map([], cost_variation_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(variations)
}
