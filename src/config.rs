//! Runtime configuration
//!
//! Read from the environment. Business settings (overhead percentages) are
//! not configured here; they live in the database `settings` row.

use crate::error::{AppError, Result};
use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "PIZZERIA_DATA_DIR";
pub const DB_FILE_ENV: &str = "PIZZERIA_DB_FILE";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_DB_FILE: &str = "pizzeria.db";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application data directory
    pub data_dir: PathBuf,
    /// SQLite file name inside `data_dir`
    pub db_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            db_file: DEFAULT_DB_FILE.to_string(),
        }
    }
}

impl AppConfig {
    /// Build from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(DATA_DIR_ENV) {
            if dir.trim().is_empty() {
                return Err(AppError::Config(format!("{} is empty", DATA_DIR_ENV)));
            }
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(file) = lookup(DB_FILE_ENV) {
            let file = file.trim().to_string();
            if file.is_empty() || file.contains('/') || file.contains('\\') {
                return Err(AppError::Config(format!(
                    "{} must be a plain file name, got '{}'",
                    DB_FILE_ENV, file
                )));
            }
            config.db_file = file;
        }

        Ok(config)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.db_path(), PathBuf::from("data").join("pizzeria.db"));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            (DATA_DIR_ENV, "/var/lib/pizzeria"),
            (DB_FILE_ENV, "admin.db"),
        ]))
        .unwrap();
        assert_eq!(config.db_path(), PathBuf::from("/var/lib/pizzeria/admin.db"));
    }

    #[test]
    fn test_rejects_path_as_file_name() {
        let err = AppConfig::from_lookup(lookup(&[(DB_FILE_ENV, "../x.db")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
