use std::time::Duration;

use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection, DbBackend};

use crate::config::DatabaseConfig;

/// Read-only handle on the catalog database.
pub struct Database {
    pub(crate) conn: DatabaseConnection,
}

impl Database {
    /// Connect to the catalog at `url` (PostgreSQL or SQLite).
    pub async fn connect(url: &str, options: &DatabaseConfig) -> Result<Self> {
        log::debug!("Connecting to catalog database");

        // Configure connection options
        let mut opt = ConnectOptions::new(url.to_owned());
        opt.max_connections(options.max_connections)
            .min_connections(options.min_connections)
            .connect_timeout(Duration::from_secs(options.connect_timeout_secs))
            .acquire_timeout(Duration::from_secs(options.connect_timeout_secs))
            .sqlx_logging(options.sqlx_logging);

        let conn = SeaDatabase::connect(opt)
            .await
            .wrap_err("Failed to connect to catalog database")?;

        let database = Database { conn };
        match database.backend() {
            DbBackend::Postgres | DbBackend::Sqlite => {}
            other => {
                return Err(eyre!(
                    "Unsupported database backend {:?}: expected PostgreSQL or SQLite",
                    other
                ));
            }
        }

        database
            .conn
            .ping()
            .await
            .wrap_err("Catalog database did not answer ping")?;

        log::info!("Catalog database ready ({:?})", database.backend());
        Ok(database)
    }

    pub fn backend(&self) -> DbBackend {
        self.conn.get_database_backend()
    }
}
