//! `provider` subcommand: manage stored LLM provider profiles.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use sqlsage_core::{ProviderId, ProviderKind};
use sqlsage_storage::records::ProviderRecord;
use sqlsage_storage::{Database, ProviderRepository};

#[derive(Debug, Args)]
pub(crate) struct ProviderArgs {
    #[command(subcommand)]
    command: ProviderCommand,
}

#[derive(Debug, Subcommand)]
enum ProviderCommand {
    /// Add a new provider profile.
    Add {
        /// Unique name for this profile.
        name: String,
        /// Provider kind: deepseek, openai, claude, gemini, qwen, ollama.
        #[arg(long)]
        provider: String,
        #[arg(long)]
        model: String,
        /// API key; prompted on stdin if omitted (ignored for ollama).
        #[arg(long)]
        api_key: Option<String>,
        /// Override base URL, e.g. for a self-hosted proxy.
        #[arg(long)]
        base_url: Option<String>,
        /// Make this profile the default for new sessions.
        #[arg(long)]
        default: bool,
    },
    /// List every stored provider profile.
    List,
    /// Remove a provider profile by name.
    Remove { name: String },
    /// Make a provider profile the default for new sessions.
    Default { name: String },
}

pub(crate) async fn run(storage: &Database, args: ProviderArgs) -> Result<()> {
    match args.command {
        ProviderCommand::Add { name, provider, model, api_key, base_url, default } => {
            add(storage, name, provider, model, api_key, base_url, default).await
        }
        ProviderCommand::List => list(storage).await,
        ProviderCommand::Remove { name } => remove(storage, &name).await,
        ProviderCommand::Default { name } => set_default(storage, &name).await,
    }
}

#[allow(clippy::too_many_arguments)]
async fn add(
    storage: &Database,
    name: String,
    provider: String,
    model: String,
    api_key: Option<String>,
    base_url: Option<String>,
    default: bool,
) -> Result<()> {
    let Some(kind) = ProviderKind::parse(&provider) else {
        bail!("unknown provider kind \"{provider}\"");
    };
    let repo = ProviderRepository::new(storage);
    let api_key = api_key.unwrap_or_default();

    let now = chrono::Utc::now();
    let id = ProviderId::new();
    let record = ProviderRecord {
        id,
        name: name.clone(),
        provider: kind,
        api_key_encrypted: sqlsage_crypto::encrypt(&api_key),
        model,
        base_url,
        is_default: default,
        created_at: now,
        updated_at: now,
    };
    repo.upsert(&record).await?;
    if default {
        repo.set_default(id).await?;
    }
    println!("provider \"{name}\" added");
    Ok(())
}

async fn list(storage: &Database) -> Result<()> {
    let repo = ProviderRepository::new(storage);
    let providers = repo.list().await?;
    if providers.is_empty() {
        println!("no providers configured");
        return Ok(());
    }
    for p in providers {
        let marker = if p.is_default { "*" } else { " " };
        println!("{marker} {:<20} {:<10} {}", p.name, p.provider, p.model);
    }
    Ok(())
}

async fn remove(storage: &Database, name: &str) -> Result<()> {
    let repo = ProviderRepository::new(storage);
    let Some(record) = find_by_name(&repo, name).await? else {
        bail!("no provider named \"{name}\"");
    };
    repo.delete(record.id).await?;
    println!("provider \"{name}\" removed");
    Ok(())
}

async fn set_default(storage: &Database, name: &str) -> Result<()> {
    let repo = ProviderRepository::new(storage);
    let Some(record) = find_by_name(&repo, name).await? else {
        bail!("no provider named \"{name}\"");
    };
    repo.set_default(record.id).await?;
    println!("provider \"{name}\" is now the default");
    Ok(())
}

async fn find_by_name(repo: &ProviderRepository<'_>, name: &str) -> Result<Option<ProviderRecord>> {
    Ok(repo.list().await?.into_iter().find(|p| p.name == name))
}
