//! Application state management

use crate::config::AppConfig;
use crate::db::sqlite::SqliteDb;
use crate::error::Result;
use crate::finance::types::{OverheadConfig, PricingSnapshot, Size};
use parking_lot::{Mutex, RwLock};
use std::path::PathBuf;
use std::sync::Arc;

/// Application state shared across all services
pub struct AppState {
    /// SQLite database connection
    pub sqlite: Arc<SqliteDb>,

    /// Sizes, channels and overhead, replaced as a whole on refresh
    reference: RwLock<Arc<PricingSnapshot>>,

    /// Serializes reload-and-swap so an older read never replaces a newer one
    refresh_lock: Mutex<()>,

    /// Application data directory
    pub data_dir: PathBuf,
}

impl AppState {
    /// Create new application state
    pub fn new(config: &AppConfig) -> Result<Self> {
        // Create data directory if it doesn't exist
        std::fs::create_dir_all(&config.data_dir)?;

        tracing::info!("Data directory: {:?}", config.data_dir);

        let sqlite = Arc::new(SqliteDb::new(&config.db_path())?);

        let state = Self::with_db(sqlite, config.data_dir.clone());
        state.refresh_reference_cache()?;
        Ok(state)
    }

    /// State over a private in-memory database
    pub fn in_memory() -> Result<Self> {
        let sqlite = Arc::new(SqliteDb::open_in_memory()?);
        let state = Self::with_db(sqlite, PathBuf::new());
        state.refresh_reference_cache()?;
        Ok(state)
    }

    fn with_db(sqlite: Arc<SqliteDb>, data_dir: PathBuf) -> Self {
        Self {
            sqlite,
            reference: RwLock::new(Arc::new(PricingSnapshot::default())),
            refresh_lock: Mutex::new(()),
            data_dir,
        }
    }

    /// Reload sizes, channels and overhead from the database
    pub fn refresh_reference_cache(&self) -> Result<()> {
        let _guard = self.refresh_lock.lock();

        let snapshot = PricingSnapshot::new(
            self.sqlite.list_sizes()?,
            self.sqlite.list_channels()?,
            self.sqlite.get_overhead()?,
        );

        tracing::info!(
            "Loaded {} sizes and {} channels into cache",
            snapshot.sizes.len(),
            snapshot.channels.len()
        );

        *self.reference.write() = Arc::new(snapshot);
        Ok(())
    }

    /// Replace the cached sizes, keeping channels and overhead
    pub fn load_size_cache(&self, sizes: Vec<Size>) {
        let _guard = self.refresh_lock.lock();
        let current = self.pricing_snapshot();
        let next = PricingSnapshot::new(sizes, current.channels.clone(), current.overhead);

        tracing::info!("Loaded {} sizes into cache", next.sizes.len());

        *self.reference.write() = Arc::new(next);
    }

    pub fn get_overhead(&self) -> OverheadConfig {
        self.reference.read().overhead
    }

    pub fn set_overhead(&self, overhead: OverheadConfig) {
        let _guard = self.refresh_lock.lock();
        let current = self.pricing_snapshot();
        let next = PricingSnapshot {
            overhead,
            ..(*current).clone()
        };
        *self.reference.write() = Arc::new(next);
    }

    /// Reference data held constant for one batch
    pub fn pricing_snapshot(&self) -> Arc<PricingSnapshot> {
        Arc::clone(&self.reference.read())
    }
}
