//! sqlsage — command-line front-end for the database agent (spec §6).
//!
//! Everything runs in-process: there is no daemon. `main` loads layered
//! configuration, opens the embedded store, resolves the active connection
//! and provider profiles, and then either runs a subcommand or drops into
//! an interactive chat REPL that drives [`sqlsage_engine::Agent`] directly.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod commands;
mod home;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use sqlsage_audit::AuditLog;
use sqlsage_core::{Language, ProviderKind, SessionId};
use sqlsage_db::ConnectionConfig;
use sqlsage_engine::{Agent, ChatOutcome, PauseReason};
use sqlsage_llm::{ClaudeProvider, LlmProvider, OpenAiCompatProvider, ProviderConfig};
use sqlsage_storage::records::{ConnectionRecord, ProviderRecord, SessionRecord};
use sqlsage_storage::{ConnectionRepository, Database, ProviderRepository, SessionRepository};

use commands::{connection, provider};
use home::Home;

/// sqlsage — an interactive multi-turn database agent.
#[derive(Parser)]
#[command(name = "sqlsage")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage stored database connection profiles.
    Connection(connection::ConnectionArgs),
    /// Manage stored LLM provider profiles.
    Provider(provider::ProviderArgs),
    /// Start an interactive chat session (also the default with no
    /// subcommand).
    Chat {
        /// Connection profile to bind (defaults to the active one, if any).
        #[arg(long)]
        connection: Option<String>,
        /// Provider profile to bind (defaults to the default profile).
        #[arg(long)]
        provider: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let home = Home::resolve()?;

    let workspace_root = std::env::current_dir().ok();
    let resolved = sqlsage_config::Config::load(workspace_root.as_deref())
        .context("failed to load configuration")?;
    let config = resolved.config;

    sqlsage_telemetry::setup_logging(&config.logging).context("failed to initialize logging")?;

    let storage = Arc::new(
        Database::connect_embedded(&home.db_path())
            .await
            .context("failed to open the embedded store")?,
    );

    match cli.command {
        Some(Commands::Connection(args)) => connection::run(&storage, args).await,
        Some(Commands::Provider(args)) => provider::run(&storage, args).await,
        Some(Commands::Chat { connection, provider }) => {
            run_chat(&storage, &config, connection, provider).await
        }
        None => run_chat(&storage, &config, None, None).await,
    }
}

async fn run_chat(
    storage: &Arc<Database>,
    config: &sqlsage_config::Config,
    connection_name: Option<String>,
    provider_name: Option<String>,
) -> Result<()> {
    let provider_record = resolve_provider(storage, provider_name).await?;
    let connection_record = resolve_connection(storage, connection_name).await?;

    let llm = build_provider(&provider_record, config)?;
    let session_id = SessionId::new();
    let audit = Arc::new(AuditLog::new(Arc::clone(storage)));

    let session_repo = SessionRepository::new(storage);
    session_repo
        .upsert(&SessionRecord {
            id: session_id,
            name: format!("Session {}", chrono::Utc::now().format("%Y-%m-%d %H:%M")),
            connection_id: connection_record.as_ref().map(|c| c.id),
            provider_id: Some(provider_record.id),
            is_current: true,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        })
        .await
        .context("failed to persist session record")?;

    let mut agent = Agent::new(llm, session_id, Arc::clone(storage), audit);
    agent.set_language(Language::default());
    agent.set_max_iterations(config.sessions.max_iterations);

    if let Some(record) = &connection_record {
        let adapter_config = ConnectionConfig {
            host: record.host.clone(),
            port: record.port,
            database: record.database.clone(),
            username: record.username.clone(),
            password: sqlsage_crypto::decrypt(&record.password_encrypted),
        };
        let adapter = sqlsage_db::connect(record.db_type, &adapter_config)
            .await
            .with_context(|| format!("failed to connect to \"{}\"", record.name))?;
        agent.set_connection(adapter, record.id);
        println!("connected to \"{}\" ({})", record.name, record.db_type);
    } else {
        println!("no active database connection — add one with `sqlsage connection add`");
    }

    if let Ok(skills) = sqlsage_skills::SkillRegistry::discover(&std::env::current_dir()?, None) {
        agent.set_skills(Arc::new(skills));
    }

    println!("sqlsage ready. Type your question, or \"exit\" to quit.\n");
    chat_loop(&mut agent).await
}

async fn chat_loop(agent: &mut Agent) -> Result<()> {
    let mut editor = DefaultEditor::new().context("failed to initialize the line editor")?;

    loop {
        let line = match editor.readline("sqlsage> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                return Ok(());
            }
            Err(err) => return Err(err).context("readline failed"),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            println!("Goodbye!");
            return Ok(());
        }
        let _ = editor.add_history_entry(input);

        let mut message = input.to_string();
        loop {
            let outcome = agent.chat(message).await.context("turn failed")?;
            match outcome {
                ChatOutcome::Done(text) => {
                    println!("{text}\n");
                    break;
                }
                ChatOutcome::Error(text) => {
                    eprintln!("error: {text}\n");
                    break;
                }
                ChatOutcome::Interrupted => {
                    println!("(interrupted)\n");
                    break;
                }
                ChatOutcome::Paused { content, reason } => {
                    if let Some(content) = content {
                        println!("{content}");
                    }
                    match handle_pause(agent, &mut editor, reason).await? {
                        Some(next) => {
                            message = next;
                        }
                        None => break,
                    }
                }
            }
        }
    }
}

/// Render the pause to the operator and collect a follow-up message to feed
/// back into `chat()`, or `None` if the operator chose to stop here.
async fn handle_pause(
    agent: &mut Agent,
    editor: &mut DefaultEditor,
    reason: PauseReason,
) -> Result<Option<String>> {
    match reason {
        PauseReason::Confirmation { operation } | PauseReason::PerformanceConfirmation { operation } => {
            println!("pending: {} — {}", operation.tool_name, operation.sql);
            let answer = editor
                .readline("confirm? [y/N] ")
                .context("readline failed")?;
            if answer.trim().eq_ignore_ascii_case("y") {
                let confirmation = agent.confirm_operation(0).await.context("failed to confirm operation")?;
                Ok(Some(format!(
                    "the pending statement was confirmed and executed: {:?}",
                    confirmation.outcome
                )))
            } else {
                Ok(Some("the pending statement was declined by the operator".to_string()))
            }
        }
        PauseReason::FormInput { prompt, fields } => {
            println!("{prompt}");
            let mut answers = Vec::with_capacity(fields.len());
            for field in &fields {
                let value = editor
                    .readline(&format!("{field}: "))
                    .context("readline failed")?;
                answers.push(format!("{field}={value}"));
            }
            Ok(Some(answers.join(", ")))
        }
        PauseReason::MigrationSetup { missing_fields } => {
            println!("migration setup needs: {}", missing_fields.join(", "));
            let mut answers = Vec::with_capacity(missing_fields.len());
            for field in &missing_fields {
                let value = editor
                    .readline(&format!("{field}: "))
                    .context("readline failed")?;
                answers.push(format!("{field}={value}"));
            }
            Ok(Some(answers.join(", ")))
        }
    }
}

async fn resolve_connection(storage: &Database, name: Option<String>) -> Result<Option<ConnectionRecord>> {
    let repo = ConnectionRepository::new(storage);
    if let Some(name) = name {
        let Some(record) = repo.get_by_name(&name).await? else {
            bail!("no connection named \"{name}\"");
        };
        return Ok(Some(record));
    }
    Ok(repo.list().await?.into_iter().find(|c| c.is_active))
}

async fn resolve_provider(storage: &Database, name: Option<String>) -> Result<ProviderRecord> {
    let repo = ProviderRepository::new(storage);
    if let Some(name) = name {
        return repo
            .list()
            .await?
            .into_iter()
            .find(|p| p.name == name)
            .with_context(|| format!("no provider named \"{name}\""));
    }
    repo.list()
        .await?
        .into_iter()
        .find(|p| p.is_default)
        .context("no default provider configured — add one with `sqlsage provider add --default`")
}

fn build_provider(record: &ProviderRecord, config: &sqlsage_config::Config) -> Result<Box<dyn LlmProvider>> {
    let api_key = sqlsage_crypto::decrypt(&record.api_key_encrypted);
    let provider: Box<dyn LlmProvider> = match record.provider {
        ProviderKind::Claude => {
            let mut provider_config = ProviderConfig::new(api_key, &record.model)
                .max_tokens(config.llm.max_tokens)
                .temperature(config.llm.temperature);
            if let Some(base_url) = &record.base_url {
                provider_config = provider_config.base_url(base_url.clone());
            }
            Box::new(ClaudeProvider::new(provider_config))
        }
        ProviderKind::OpenAi => Box::new(OpenAiCompatProvider::openai(&api_key, &record.model)),
        ProviderKind::DeepSeek => Box::new(OpenAiCompatProvider::deepseek(&api_key, &record.model)),
        ProviderKind::Qwen => Box::new(OpenAiCompatProvider::qwen(&api_key, &record.model)),
        ProviderKind::Gemini => Box::new(OpenAiCompatProvider::gemini(&api_key, &record.model)),
        ProviderKind::Ollama => Box::new(OpenAiCompatProvider::ollama(&record.model)),
    };
    Ok(provider)
}

