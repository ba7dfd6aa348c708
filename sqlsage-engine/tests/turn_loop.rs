//! Integration tests for the Agent Conversation Engine's turn loop
//! (spec §4.10), driven through `MockLlmProvider`/`MockDbAdapter` instead of
//! a real provider or database.

use std::sync::Arc;

use serde_json::json;
use sqlsage_audit::AuditLog;
use sqlsage_core::EngineKind;
use sqlsage_db::DbOutcome;
use sqlsage_engine::{Agent, ChatOutcome, PauseReason};
use sqlsage_llm::ToolCall;
use sqlsage_storage::Database;
use sqlsage_test::{MockDbAdapter, MockLlmProvider, test_connection_id, test_session_id};

async fn test_agent(llm: MockLlmProvider) -> Agent {
    let (agent, _storage, _audit) = test_agent_with_handles(llm).await;
    agent
}

async fn test_agent_with_handles(llm: MockLlmProvider) -> (Agent, Arc<Database>, Arc<AuditLog>) {
    let storage = Arc::new(Database::connect_memory().await.expect("in-memory store"));
    let audit = Arc::new(AuditLog::new(storage.clone()));
    let agent = Agent::new(Box::new(llm), test_session_id(), storage.clone(), audit.clone());
    (agent, storage, audit)
}

#[tokio::test]
async fn chat_returns_done_on_plain_text_reply() {
    let mut agent = test_agent(MockLlmProvider::new().push_text("3 tables found")).await;

    let outcome = agent.chat("how many tables are there?").await.unwrap();

    match outcome {
        ChatOutcome::Done(text) => assert_eq!(text, "3 tables found"),
        other => panic!("expected Done, got {other:?}"),
    }
    assert_eq!(agent.history().len(), 2);
}

#[tokio::test]
async fn chat_pauses_for_confirmation_on_mutating_sql() {
    let call = ToolCall::new("call-1", "execute_sql").with_arguments(json!({"sql": "DROP TABLE customers"}));
    let mut agent = test_agent(MockLlmProvider::new().push_tool_call(vec![call])).await;

    let adapter = MockDbAdapter::new(EngineKind::PostgreSql).push(
        "execute_sql",
        DbOutcome::PendingConfirmation {
            sql: "DROP TABLE customers".to_string(),
            operation: "DROP TABLE".to_string(),
        },
    );
    agent.set_connection(Box::new(adapter), test_connection_id());

    let outcome = agent.chat("drop the customers table").await.unwrap();

    match outcome {
        ChatOutcome::Paused { reason: PauseReason::Confirmation { operation }, .. } => {
            assert_eq!(operation.sql, "DROP TABLE customers");
            assert_eq!(operation.tool_name, "execute_sql");
        }
        other => panic!("expected Paused(Confirmation), got {other:?}"),
    }
    assert_eq!(agent.pending_operations().len(), 1);
}

#[tokio::test]
async fn chat_paused_outcome_carries_pre_tool_assistant_content() {
    let call = ToolCall::new("call-1", "execute_sql").with_arguments(json!({"sql": "DROP TABLE customers"}));
    let mut agent = test_agent(
        MockLlmProvider::new()
            .push_tool_call_with_content("I'll drop that table for you.", vec![call]),
    )
    .await;

    let adapter = MockDbAdapter::new(EngineKind::PostgreSql).push(
        "execute_sql",
        DbOutcome::PendingConfirmation {
            sql: "DROP TABLE customers".to_string(),
            operation: "DROP TABLE".to_string(),
        },
    );
    agent.set_connection(Box::new(adapter), test_connection_id());

    let outcome = agent.chat("drop the customers table").await.unwrap();

    match outcome {
        ChatOutcome::Paused { content, reason: PauseReason::Confirmation { .. } } => {
            assert_eq!(content.as_deref(), Some("I'll drop that table for you."));
        }
        other => panic!("expected Paused(Confirmation), got {other:?}"),
    }
}

#[tokio::test]
async fn confirm_operation_executes_and_audits_the_pending_statement() {
    let call = ToolCall::new("call-1", "execute_sql").with_arguments(json!({"sql": "DELETE FROM sessions"}));
    let (mut agent, _storage, audit) =
        test_agent_with_handles(MockLlmProvider::new().push_tool_call(vec![call])).await;

    let adapter = MockDbAdapter::new(EngineKind::PostgreSql)
        .push(
            "execute_sql",
            DbOutcome::PendingConfirmation {
                sql: "DELETE FROM sessions".to_string(),
                operation: "DELETE".to_string(),
            },
        )
        .push("execute_sql", DbOutcome::success(json!({"affected_rows": 12})));
    agent.set_connection(Box::new(adapter), test_connection_id());

    agent.chat("clear stale sessions").await.unwrap();
    assert_eq!(agent.pending_operations().len(), 1);

    let confirmation = agent.confirm_operation(0).await.unwrap();
    assert!(confirmation.outcome.is_success());
    assert_eq!(agent.pending_operations().len(), 0);

    let logs = audit.get_logs_by_session(agent.session_id(), 10).await.unwrap();
    assert!(logs.iter().any(|entry| entry.action == "execute_sql"));
}

#[tokio::test]
async fn interrupt_requested_before_the_turn_starts_stops_immediately() {
    let mut agent = test_agent(MockLlmProvider::new().push_text("should not be reached")).await;

    let handle = agent.interrupt_handle();
    handle.request_interrupt();

    let outcome = agent.chat("long running analysis").await.unwrap();
    assert!(matches!(outcome, ChatOutcome::Interrupted));
}

#[tokio::test]
async fn auto_execute_migration_forces_confirmed_without_pausing() {
    let call = ToolCall::new("call-1", "execute_sql")
        .with_arguments(json!({"sql": "ALTER TABLE orders ADD COLUMN x INT"}));
    let mut agent = test_agent(
        MockLlmProvider::new()
            .push_tool_call(vec![call])
            .push_text("column added"),
    )
    .await;

    let adapter =
        MockDbAdapter::new(EngineKind::PostgreSql).push("execute_sql", DbOutcome::success(json!({"affected_rows": 0})));
    agent.set_connection(Box::new(adapter), test_connection_id());
    agent.set_auto_execute_migration(true);

    let outcome = agent.chat("run the migration step").await.unwrap();

    match outcome {
        ChatOutcome::Done(text) => assert_eq!(text, "column added"),
        other => panic!("expected Done (no pause), got {other:?}"),
    }
    assert!(agent.pending_operations().is_empty());
}
