//! Test fixtures for common sqlsage domain types.

use chrono::Utc;
use sqlsage_core::{ConnectionId, EngineKind, ProviderId, ProviderKind, SessionId};
use sqlsage_storage::records::{ConnectionRecord, ProviderRecord};

/// Create a fresh, random session id.
#[must_use]
pub fn test_session_id() -> SessionId {
    SessionId::new()
}

/// Create a fresh, random connection id.
#[must_use]
pub fn test_connection_id() -> ConnectionId {
    ConnectionId::new()
}

/// Create a fresh, random provider id.
#[must_use]
pub fn test_provider_id() -> ProviderId {
    ProviderId::new()
}

/// A sample PostgreSQL connection record, as if just saved via `connection add`.
#[must_use]
pub fn test_connection_record() -> ConnectionRecord {
    let now = Utc::now();
    ConnectionRecord {
        id: test_connection_id(),
        name: "test-pg".to_owned(),
        db_type: EngineKind::PostgreSql,
        host: "localhost".to_owned(),
        port: 5432,
        database: "testdb".to_owned(),
        username: "tester".to_owned(),
        password_encrypted: "encrypted:placeholder".to_owned(),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// A sample connection record for a specific engine, left inactive.
#[must_use]
pub fn test_connection_record_for(name: &str, engine: EngineKind) -> ConnectionRecord {
    let mut record = test_connection_record();
    record.name = name.to_owned();
    record.db_type = engine;
    record.is_active = false;
    record
}

/// A sample Claude provider profile, as if just saved via `provider add`.
#[must_use]
pub fn test_provider_record() -> ProviderRecord {
    let now = Utc::now();
    ProviderRecord {
        id: test_provider_id(),
        name: "test-claude".to_owned(),
        provider: ProviderKind::Claude,
        api_key_encrypted: "encrypted:placeholder".to_owned(),
        model: "claude-sonnet-4-20250514".to_owned(),
        base_url: None,
        is_default: true,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(test_session_id(), test_session_id());
    }

    #[test]
    fn connection_record_defaults_to_postgres() {
        let record = test_connection_record();
        assert_eq!(record.db_type, EngineKind::PostgreSql);
        assert!(record.is_active);
    }

    #[test]
    fn connection_record_for_overrides_engine_and_name() {
        let record = test_connection_record_for("ora-1", EngineKind::Oracle);
        assert_eq!(record.name, "ora-1");
        assert_eq!(record.db_type, EngineKind::Oracle);
        assert!(!record.is_active);
    }

    #[test]
    fn provider_record_defaults_to_claude() {
        let record = test_provider_record();
        assert_eq!(record.provider, ProviderKind::Claude);
        assert!(record.is_default);
    }
}
