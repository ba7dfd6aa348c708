//! The Agent Conversation Engine's state (spec §4.10).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sqlsage_approval::PendingOpsQueue;
use sqlsage_audit::AuditLog;
use sqlsage_context::Compressor;
use sqlsage_core::{ConnectionId, Language, MigrationTaskId, SessionId};
use sqlsage_db::DbAdapter;
use sqlsage_llm::{LlmProvider, Message};
use sqlsage_mcp::ToolServerManager;
use sqlsage_skills::SkillRegistry;
use sqlsage_storage::Database;

/// Default cap on turn-loop iterations (spec §4.10 step 3).
pub const DEFAULT_MAX_ITERATIONS: u32 = 30;

/// Cooperative interrupt signal shared between an `Agent` and whatever
/// producer (a signal handler, a separate UI thread) wants to interrupt its
/// current turn (spec §4.10 "Interrupt", §5).
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    /// A fresh, unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Request that the running turn stop at its next checkpoint.
    pub fn request_interrupt(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Snapshot taken when a turn is interrupted, so the next `chat()` call can
/// prefix a resumption hint (spec §4.10 step 1, "Interrupt").
#[derive(Debug, Clone)]
pub struct InterruptedState {
    /// Loop iteration the turn was on when interrupted.
    pub iteration: u32,
    /// The user message that started the interrupted turn.
    pub original_message: String,
}

/// Progress snapshot emitted after every migration-tool dispatch, so a
/// caller can drive a progress bar without polling `get_migration_status`
/// (spec §4.10 "Dispatch": "after each, emit a migration_progress
/// notification via the optional caller-supplied observer").
#[derive(Debug, Clone)]
pub struct MigrationProgressEvent {
    /// The task the dispatched tool acted on.
    pub task_id: MigrationTaskId,
    /// Name of the migration tool that was just dispatched.
    pub tool_name: String,
    /// Total items planned for the task.
    pub total_items: u32,
    /// Items completed so far.
    pub completed_items: u32,
    /// Items failed so far.
    pub failed_items: u32,
    /// Items skipped so far.
    pub skipped_items: u32,
}

/// Caller-supplied sink for [`MigrationProgressEvent`]s.
pub type MigrationObserver = Arc<dyn Fn(MigrationProgressEvent) + Send + Sync>;

/// One conversation's full engine state (spec §4.10 "State").
///
/// An `Agent` is not re-entrant: at most one in-flight `chat()` call per
/// instance (spec §5). Multiple independent `Agent`s may run concurrently,
/// each owning its own database adapter and LLM client.
pub struct Agent {
    pub(crate) llm: Box<dyn LlmProvider>,
    pub(crate) db: Option<Box<dyn DbAdapter>>,
    pub(crate) connection_id: Option<ConnectionId>,
    pub(crate) session_id: SessionId,
    pub(crate) history: Vec<Message>,
    pub(crate) mcp: Option<Arc<ToolServerManager>>,
    pub(crate) skills: Option<Arc<SkillRegistry>>,
    pub(crate) pending_ops: PendingOpsQueue,
    pub(crate) interrupt: InterruptFlag,
    pub(crate) interrupted_state: Option<InterruptedState>,
    pub(crate) auto_execute_migration: bool,
    pub(crate) language: Language,
    pub(crate) storage: Arc<Database>,
    pub(crate) audit: Arc<AuditLog>,
    pub(crate) compressor: Compressor,
    pub(crate) max_iterations: u32,
    pub(crate) migration_observer: Option<MigrationObserver>,
}

impl Agent {
    /// Build a new agent bound to one session.
    ///
    /// `db`/`mcp`/`skills` are all optional: a session may exist before a
    /// database connection is chosen, before any tool server is configured,
    /// and skills are only loaded when a skill directory is present.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        llm: Box<dyn LlmProvider>,
        session_id: SessionId,
        storage: Arc<Database>,
        audit: Arc<AuditLog>,
    ) -> Self {
        Self {
            llm,
            db: None,
            connection_id: None,
            session_id,
            history: Vec::new(),
            mcp: None,
            skills: None,
            pending_ops: PendingOpsQueue::new(),
            interrupt: InterruptFlag::new(),
            interrupted_state: None,
            auto_execute_migration: false,
            language: Language::default(),
            storage,
            audit,
            compressor: Compressor::new(sqlsage_context::DEFAULT_KEEP_RECENT),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            migration_observer: None,
        }
    }

    /// Register a sink for [`MigrationProgressEvent`]s, replacing any
    /// previous one.
    pub fn set_migration_observer(&mut self, observer: MigrationObserver) {
        self.migration_observer = Some(observer);
    }

    pub(crate) fn notify_migration_progress(&self, event: MigrationProgressEvent) {
        if let Some(observer) = &self.migration_observer {
            observer(event);
        }
    }

    /// Attach (or replace) the active database adapter and its connection id.
    pub fn set_connection(&mut self, db: Box<dyn DbAdapter>, connection_id: ConnectionId) {
        self.db = Some(db);
        self.connection_id = Some(connection_id);
    }

    /// Attach the External Tool-Server Manager.
    pub fn set_tool_servers(&mut self, mcp: Arc<ToolServerManager>) {
        self.mcp = Some(mcp);
    }

    /// Attach the Skill Registry.
    pub fn set_skills(&mut self, skills: Arc<SkillRegistry>) {
        self.skills = Some(skills);
    }

    /// Set the active UI/content language.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Override the turn loop's iteration cap (spec default: 30).
    pub fn set_max_iterations(&mut self, max_iterations: u32) {
        self.max_iterations = max_iterations;
    }

    /// A cloneable handle that can request this agent's current turn be
    /// interrupted from another task/thread (spec §4.10 "Interrupt").
    #[must_use]
    pub fn interrupt_handle(&self) -> InterruptFlag {
        self.interrupt.clone()
    }

    /// The session this agent is bound to.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// The in-memory conversation history (post-compression).
    #[must_use]
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Whether a migration task window is currently forcing `confirmed =
    /// true` on ad-hoc `execute_sql` calls (spec §4.9, §4.10).
    #[must_use]
    pub fn auto_execute_migration(&self) -> bool {
        self.auto_execute_migration
    }

    /// Enter or leave the auto-execute-migration window.
    pub fn set_auto_execute_migration(&mut self, enabled: bool) {
        self.auto_execute_migration = enabled;
    }

    /// Pending operations currently awaiting confirmation.
    #[must_use]
    pub fn pending_operations(&self) -> &[sqlsage_approval::PendingOperation] {
        self.pending_ops.list()
    }
}
