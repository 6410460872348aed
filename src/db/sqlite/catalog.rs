//! Sizes, channels and menu items

use crate::db::sqlite::models::{CreateMenuItemRequest, MenuItem};
use crate::error::Result;
use crate::finance::types::{Channel, Size};
use rusqlite::{params, Connection, OptionalExtension, Row};

fn size_from_row(row: &Row) -> rusqlite::Result<Size> {
    Ok(Size {
        id: row.get(0)?,
        key: row.get(1)?,
        name: row.get(2)?,
        sort_order_index: row.get(3)?,
        packaging_cost_amount: row.get(4)?,
        dough_cost_amount: row.get(5)?,
    })
}

fn channel_from_row(row: &Row) -> rusqlite::Result<Channel> {
    Ok(Channel {
        id: row.get(0)?,
        key: row.get(1)?,
        name: row.get(2)?,
        is_marketplace: row.get::<_, i32>(3)? == 1,
        tax_perc: row.get(4)?,
        fee_amount: row.get(5)?,
        online_payment_tax_perc: row.get(6)?,
        target_margin_perc: row.get(7)?,
    })
}

fn menu_item_from_row(row: &Row) -> rusqlite::Result<MenuItem> {
    Ok(MenuItem {
        id: row.get(0)?,
        name: row.get(1)?,
        active: row.get::<_, i32>(2)? == 1,
        visible: row.get::<_, i32>(3)? == 1,
        sort_order_index: row.get(4)?,
        created_at: row.get(5)?,
    })
}

const SIZE_COLUMNS: &str = "id, key, name, sort_order_index, packaging_cost_amount, dough_cost_amount";
const CHANNEL_COLUMNS: &str =
    "id, key, name, is_marketplace, tax_perc, fee_amount, online_payment_tax_perc, target_margin_perc";

// ========== Sizes ==========

/// List sizes ordered for display
pub fn list_sizes(conn: &Connection) -> Result<Vec<Size>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM sizes ORDER BY sort_order_index, key",
        SIZE_COLUMNS
    ))?;

    let sizes = stmt
        .query_map([], size_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(sizes)
}

pub fn get_size(conn: &Connection, id: &str) -> Result<Option<Size>> {
    let size = conn
        .query_row(
            &format!("SELECT {} FROM sizes WHERE id = ?1", SIZE_COLUMNS),
            [id],
            size_from_row,
        )
        .optional()?;

    Ok(size)
}

/// Set the per-unit packaging and dough costs of a size
pub fn update_size_costs(
    conn: &Connection,
    id: &str,
    packaging_cost_amount: f64,
    dough_cost_amount: f64,
) -> Result<Option<Size>> {
    let changed = conn.execute(
        "UPDATE sizes
         SET packaging_cost_amount = ?1, dough_cost_amount = ?2, updated_at = datetime('now')
         WHERE id = ?3",
        params![packaging_cost_amount, dough_cost_amount, id],
    )?;

    if changed == 0 {
        return Ok(None);
    }

    get_size(conn, id)
}

// ========== Channels ==========

pub fn list_channels(conn: &Connection) -> Result<Vec<Channel>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM channels ORDER BY is_marketplace, name",
        CHANNEL_COLUMNS
    ))?;

    let channels = stmt
        .query_map([], channel_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(channels)
}

pub fn get_channel(conn: &Connection, id: &str) -> Result<Option<Channel>> {
    let channel = conn
        .query_row(
            &format!("SELECT {} FROM channels WHERE id = ?1", CHANNEL_COLUMNS),
            [id],
            channel_from_row,
        )
        .optional()?;

    Ok(channel)
}

/// Insert a channel or update the one with the same key
pub fn upsert_channel(conn: &Connection, channel: &Channel) -> Result<Channel> {
    let id = if channel.id.is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        channel.id.clone()
    };

    conn.execute(
        "INSERT INTO channels (id, key, name, is_marketplace, tax_perc, fee_amount,
                               online_payment_tax_perc, target_margin_perc)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(key) DO UPDATE SET
            name = excluded.name,
            is_marketplace = excluded.is_marketplace,
            tax_perc = excluded.tax_perc,
            fee_amount = excluded.fee_amount,
            online_payment_tax_perc = excluded.online_payment_tax_perc,
            target_margin_perc = excluded.target_margin_perc,
            updated_at = datetime('now')",
        params![
            id,
            channel.key,
            channel.name,
            channel.is_marketplace as i32,
            channel.tax_perc,
            channel.fee_amount,
            channel.online_payment_tax_perc,
            channel.target_margin_perc,
        ],
    )?;

    let stored = conn.query_row(
        &format!("SELECT {} FROM channels WHERE key = ?1", CHANNEL_COLUMNS),
        [&channel.key],
        channel_from_row,
    )?;

    Ok(stored)
}

// ========== Menu Items ==========

pub fn create_menu_item(conn: &Connection, request: &CreateMenuItemRequest) -> Result<MenuItem> {
    let id = uuid::Uuid::new_v4().to_string();
    let created_at = chrono::Utc::now().to_rfc3339();

    conn.execute(
        "INSERT INTO menu_items (id, name, active, visible, sort_order_index, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id,
            request.name,
            request.active as i32,
            request.visible as i32,
            request.sort_order_index,
            created_at,
        ],
    )?;

    Ok(MenuItem {
        id,
        name: request.name.clone(),
        active: request.active,
        visible: request.visible,
        sort_order_index: request.sort_order_index,
        created_at,
    })
}

pub fn list_menu_items(conn: &Connection) -> Result<Vec<MenuItem>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, active, visible, sort_order_index, created_at
         FROM menu_items ORDER BY sort_order_index, name",
    )?;

    let items = stmt
        .query_map([], menu_item_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(items)
}

pub fn get_menu_item(conn: &Connection, id: &str) -> Result<Option<MenuItem>> {
    let item = conn
        .query_row(
            "SELECT id, name, active, visible, sort_order_index, created_at
             FROM menu_items WHERE id = ?1",
            [id],
            menu_item_from_row,
        )
        .optional()?;

    Ok(item)
}
