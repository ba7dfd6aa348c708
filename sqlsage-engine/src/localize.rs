//! The handful of template strings the engine itself owns, as opposed to
//! the tool-catalog strings `sqlsage-tools` localizes (spec §4.10's
//! resumption hint, migration-window close).
//!
//! Mirrors `sqlsage_tools::localize::tr`'s match-with-English-fallback
//! shape rather than pulling in a full i18n crate for four strings.

use sqlsage_core::Language;

/// Prefix prepended to the next user message after a turn was interrupted
/// (spec §4.10 step 1), so the model knows the conversation resumed
/// mid-task rather than starting fresh.
#[must_use]
pub fn resumption_hint(language: Language) -> &'static str {
    match language {
        Language::En => {
            "[The previous turn was interrupted before it finished. Continue from \
             where you left off, re-checking any in-flight operation's state before \
             assuming it completed.]\n\n"
        }
        Language::Zh => "[上一轮在完成前被中断。请从中断处继续,并在假定某项操作已完成前先核实其状态。]\n\n",
    }
}

/// System-prompt fragment appended while a migration task window is open
/// (`auto_execute_migration`), so the model understands `execute_sql` calls
/// will run without a confirmation round-trip for the remainder of the task.
#[must_use]
pub fn auto_execute_migration_notice(language: Language) -> &'static str {
    match language {
        Language::En => {
            "A migration task is currently executing unattended: ad-hoc `execute_sql` \
             calls run immediately without waiting for user confirmation until \
             `generate_migration_report` closes the window."
        }
        Language::Zh => "当前有迁移任务正在无人值守执行:在调用 generate_migration_report 关闭该窗口之前,临时的 execute_sql 调用将立即执行,无需用户确认。",
    }
}

/// Base system prompt, independent of connection/migration state.
#[must_use]
pub fn base_system_prompt(language: Language) -> &'static str {
    match language {
        Language::En => {
            "You are a database operations assistant. You can inspect schemas, run \
             read-only queries freely, and propose mutating statements — but mutating \
             and analytically expensive statements require the user's explicit \
             confirmation before they run. Use the migration tools only once a \
             migration task has been set up; ask for missing configuration via \
             request_migration_setup rather than guessing connection details."
        }
        Language::Zh => {
            "你是一名数据库运维助手。你可以查看模式结构、自由执行只读查询、并提出变更语句的建议——\
             但写操作和开销较大的分析型查询在执行前需要用户明确确认。仅在已建立迁移任务后才使用迁移相关工具;\
             缺少的配置项应通过 request_migration_setup 向用户询问,而不是猜测连接信息。"
        }
    }
}
