//! Mock implementations of the LLM provider and database adapter traits.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream;
use sqlsage_core::EngineKind;
use sqlsage_db::{DbAdapter, DbOutcome};
use sqlsage_llm::{
    LlmError, LlmProvider, LlmResponse, LlmResult, LlmToolDefinition, Message, StopReason,
    StreamBox, StreamEvent, ToolCall, Usage,
};

/// Mock implementation of [`LlmProvider`] for testing the turn loop without a
/// real API call.
///
/// Queue canned [`LlmResponse`]s with [`MockLlmProvider::push_response`];
/// `complete` pops them in order and panics if the queue runs dry (a test
/// asking for one more turn than it scripted is a test bug, not a runtime
/// condition to handle gracefully).
pub struct MockLlmProvider {
    responses: Mutex<VecDeque<LlmResponse>>,
    model: String,
    max_context_length: usize,
}

impl MockLlmProvider {
    /// Create a mock provider with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model: "mock-model".to_owned(),
            max_context_length: 200_000,
        }
    }

    /// Queue a response to be returned by the next `complete` call.
    #[must_use]
    pub fn push_response(self, response: LlmResponse) -> Self {
        self.responses
            .lock()
            .expect("mock provider mutex poisoned")
            .push_back(response);
        self
    }

    /// Queue a plain end-turn text response.
    #[must_use]
    pub fn push_text(self, text: impl Into<String>) -> Self {
        self.push_response(LlmResponse {
            message: Message::assistant(text),
            has_tool_calls: false,
            stop_reason: StopReason::EndTurn,
            usage: Usage::default(),
        })
    }

    /// Queue a tool-use response.
    #[must_use]
    pub fn push_tool_call(self, tool_calls: Vec<ToolCall>) -> Self {
        self.push_response(LlmResponse {
            message: Message::assistant_with_tools(tool_calls),
            has_tool_calls: true,
            stop_reason: StopReason::ToolUse,
            usage: Usage::default(),
        })
    }

    /// Queue a tool-use response that also carries assistant text emitted
    /// alongside the tool calls (spec §4.10 step f.iv "pre-tool assistant
    /// content").
    #[must_use]
    pub fn push_tool_call_with_content(self, content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        self.push_response(LlmResponse {
            message: Message::assistant_with_tools_and_content(content, tool_calls),
            has_tool_calls: true,
            stop_reason: StopReason::ToolUse,
            usage: Usage::default(),
        })
    }

    /// Number of responses still queued.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.responses.lock().expect("mock provider mutex poisoned").len()
    }
}

impl Default for MockLlmProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn stream(
        &self,
        _messages: &[Message],
        _tools: &[LlmToolDefinition],
        _system: &str,
    ) -> LlmResult<StreamBox> {
        let response = self.complete(&[], &[], "").await?;
        let text = response.message.text().unwrap_or_default().to_owned();
        let events = vec![Ok(StreamEvent::TextDelta(text)), Ok(StreamEvent::Done)];
        Ok(Box::pin(stream::iter(events)))
    }

    async fn complete(
        &self,
        _messages: &[Message],
        _tools: &[LlmToolDefinition],
        _system: &str,
    ) -> LlmResult<LlmResponse> {
        self.responses
            .lock()
            .expect("mock provider mutex poisoned")
            .pop_front()
            .ok_or_else(|| {
                LlmError::InvalidResponse(
                    "MockLlmProvider: no queued response for this turn".to_owned(),
                )
            })
    }

    fn max_context_length(&self) -> usize {
        self.max_context_length
    }
}

/// Mock implementation of [`DbAdapter`] for testing engine/tool dispatch
/// without a real database connection.
///
/// Canned outcomes are queued per method name; a method with an empty queue
/// falls back to `DbOutcome::success(json!({}))` rather than panicking,
/// since most tests only care about a handful of calls and shouldn't have to
/// script every adapter method up front.
pub struct MockDbAdapter {
    engine: EngineKind,
    outcomes: Mutex<HashMap<&'static str, VecDeque<DbOutcome>>>,
}

impl MockDbAdapter {
    /// Create a mock adapter for the given engine with no queued outcomes.
    #[must_use]
    pub fn new(engine: EngineKind) -> Self {
        Self {
            engine,
            outcomes: Mutex::new(HashMap::new()),
        }
    }

    /// Queue an outcome for a specific method (e.g. `"execute_sql"`).
    #[must_use]
    pub fn push(self, method: &'static str, outcome: DbOutcome) -> Self {
        self.outcomes
            .lock()
            .expect("mock adapter mutex poisoned")
            .entry(method)
            .or_default()
            .push_back(outcome);
        self
    }

    fn pop(&self, method: &'static str) -> DbOutcome {
        self.outcomes
            .lock()
            .expect("mock adapter mutex poisoned")
            .get_mut(method)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| DbOutcome::success(serde_json::json!({})))
    }
}

#[async_trait]
impl DbAdapter for MockDbAdapter {
    fn engine_kind(&self) -> EngineKind {
        self.engine
    }

    async fn get_db_info(&self) -> DbOutcome {
        self.pop("get_db_info")
    }

    async fn list_tables(&self, _schema: Option<&str>) -> DbOutcome {
        self.pop("list_tables")
    }

    async fn describe_table(&self, _table: &str, _schema: Option<&str>) -> DbOutcome {
        self.pop("describe_table")
    }

    async fn get_sample_data(&self, _table: &str, _schema: Option<&str>, _limit: u32) -> DbOutcome {
        self.pop("get_sample_data")
    }

    async fn list_databases(&self) -> DbOutcome {
        self.pop("list_databases")
    }

    async fn execute_safe_query(&self, _sql: &str) -> DbOutcome {
        self.pop("execute_safe_query")
    }

    async fn execute_sql(&self, _sql: &str, _confirmed: bool) -> DbOutcome {
        self.pop("execute_sql")
    }

    async fn run_explain(&self, _sql: &str, _analyze: bool) -> DbOutcome {
        self.pop("run_explain")
    }

    async fn create_index(&self, _sql: &str, _concurrent: bool) -> DbOutcome {
        self.pop("create_index")
    }

    async fn analyze_table(&self, _table: &str, _schema: Option<&str>) -> DbOutcome {
        self.pop("analyze_table")
    }

    async fn check_index_usage(&self, _table: &str, _schema: Option<&str>) -> DbOutcome {
        self.pop("check_index_usage")
    }

    async fn get_table_stats(&self, _table: &str, _schema: Option<&str>) -> DbOutcome {
        self.pop("get_table_stats")
    }

    async fn get_running_queries(&self) -> DbOutcome {
        self.pop("get_running_queries")
    }

    async fn identify_slow_queries(&self, _min_ms: f64, _limit: u32) -> DbOutcome {
        self.pop("identify_slow_queries")
    }

    async fn get_all_objects(&self, _schema: Option<&str>, _object_types: Option<&[String]>) -> DbOutcome {
        self.pop("get_all_objects")
    }

    async fn get_object_ddl(&self, _object_type: &str, _object_name: &str, _schema: Option<&str>) -> DbOutcome {
        self.pop("get_object_ddl")
    }

    async fn get_object_dependencies(&self, _schema: Option<&str>) -> DbOutcome {
        self.pop("get_object_dependencies")
    }

    async fn get_foreign_key_dependencies(&self, _schema: Option<&str>) -> DbOutcome {
        self.pop("get_foreign_key_dependencies")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_llm_provider_pops_queued_responses_in_order() {
        let provider = MockLlmProvider::new().push_text("first").push_text("second");

        let first = provider.complete(&[], &[], "").await.unwrap();
        assert_eq!(first.message.text(), Some("first"));

        let second = provider.complete(&[], &[], "").await.unwrap();
        assert_eq!(second.message.text(), Some("second"));
    }

    #[tokio::test]
    async fn mock_llm_provider_errors_when_queue_empty() {
        let provider = MockLlmProvider::new();
        assert!(provider.complete(&[], &[], "").await.is_err());
    }

    #[tokio::test]
    async fn mock_db_adapter_returns_queued_outcome() {
        let adapter = MockDbAdapter::new(EngineKind::PostgreSql)
            .push("execute_sql", DbOutcome::success(serde_json::json!({"rows": 1})));

        let outcome = adapter.execute_sql("select 1", true).await;
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn mock_db_adapter_falls_back_to_empty_success() {
        let adapter = MockDbAdapter::new(EngineKind::MySql);
        let outcome = adapter.list_tables(None).await;
        assert!(outcome.is_success());
    }
}
