//! Connects to a configured engine and returns the matching [`crate::DbAdapter`].
//!
//! Grounded on `SFerenczy-glance::db::connect`'s backend-dispatch factory;
//! GaussDB reuses the PostgreSQL adapter wholesale since it is wire- and
//! catalog-compatible (spec §2's `is_postgres_wire_compatible`).

use sqlsage_core::EngineKind;

use crate::engines::{mysql::MySqlAdapter, oracle::OracleAdapter, postgresql::PostgresAdapter, sqlserver::SqlServerAdapter};
use crate::error::DbResult;
use crate::DbAdapter;

/// Plain-text connection parameters. Credentials reach this layer already
/// decrypted by the caller (spec §3: "credentials are never stored or logged
/// in plaintext" — that invariant is the storage layer's job, not this one's).
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Hostname or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Database/schema/service name.
    pub database: String,
    /// Connecting username.
    pub username: String,
    /// Connecting password.
    pub password: String,
}

/// Connect to the engine named by `kind` and return a boxed [`DbAdapter`].
///
/// Connection attempts run through [`crate::with_retry`] per spec §5.
pub async fn connect(kind: EngineKind, config: &ConnectionConfig) -> DbResult<Box<dyn DbAdapter>> {
    match kind {
        EngineKind::PostgreSql => {
            let adapter = PostgresAdapter::connect(config, EngineKind::PostgreSql).await?;
            Ok(Box::new(adapter))
        }
        EngineKind::GaussDb => {
            let adapter = PostgresAdapter::connect(config, EngineKind::GaussDb).await?;
            Ok(Box::new(adapter))
        }
        EngineKind::MySql => {
            let adapter = MySqlAdapter::connect(config).await?;
            Ok(Box::new(adapter))
        }
        EngineKind::Oracle => {
            let adapter = OracleAdapter::connect(config).await?;
            Ok(Box::new(adapter))
        }
        EngineKind::SqlServer => {
            let adapter = SqlServerAdapter::connect(config).await?;
            Ok(Box::new(adapter))
        }
    }
}
