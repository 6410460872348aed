//! Overhead settings (singleton row)

use crate::error::Result;
use crate::finance::types::OverheadConfig;
use rusqlite::Connection;

/// Get the overhead configuration. A missing row reads as zeros.
pub fn get_overhead(conn: &Connection) -> Result<OverheadConfig> {
    let result = conn.query_row(
        "SELECT dna_perc, waste_perc FROM settings WHERE id = 1",
        [],
        |row| {
            Ok(OverheadConfig {
                dna_percentage: row.get(0)?,
                waste_percentage: row.get(1)?,
            })
        },
    );

    match result {
        Ok(overhead) => Ok(overhead),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(OverheadConfig::default()),
        Err(e) => Err(e.into()),
    }
}

/// Update overhead settings
pub fn update_overhead(
    conn: &Connection,
    dna_percentage: Option<f64>,
    waste_percentage: Option<f64>,
) -> Result<OverheadConfig> {
    let mut updates = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(d) = dna_percentage {
        updates.push("dna_perc = ?");
        params.push(Box::new(d));
    }
    if let Some(w) = waste_percentage {
        updates.push("waste_perc = ?");
        params.push(Box::new(w));
    }

    if !updates.is_empty() {
        updates.push("updated_at = datetime('now')");

        // Row may have been removed by hand
        conn.execute("INSERT OR IGNORE INTO settings (id) VALUES (1)", [])?;

        let sql = format!("UPDATE settings SET {} WHERE id = 1", updates.join(", "));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;
    }

    get_overhead(conn)
}
