//! `connection` subcommand: manage stored database connection profiles.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use sqlsage_core::{ConnectionId, EngineKind};
use sqlsage_db::ConnectionConfig;
use sqlsage_storage::records::ConnectionRecord;
use sqlsage_storage::{ConnectionRepository, Database};

#[derive(Debug, Args)]
pub(crate) struct ConnectionArgs {
    #[command(subcommand)]
    command: ConnectionCommand,
}

#[derive(Debug, Subcommand)]
enum ConnectionCommand {
    /// Add a new connection profile.
    Add {
        /// Unique name for this profile.
        name: String,
        /// Engine kind: postgresql, mysql, gaussdb, oracle, sqlserver.
        #[arg(long)]
        engine: String,
        #[arg(long)]
        host: String,
        #[arg(long)]
        port: u16,
        #[arg(long)]
        database: String,
        #[arg(long)]
        username: String,
        /// Prompted on stdin if omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// List every stored connection profile.
    List,
    /// Remove a connection profile by name.
    Remove {
        name: String,
    },
    /// Connect once and run a trivial query to confirm the profile works.
    Test {
        name: String,
    },
}

pub(crate) async fn run(storage: &Database, args: ConnectionArgs) -> Result<()> {
    match args.command {
        ConnectionCommand::Add { name, engine, host, port, database, username, password } => {
            add(storage, name, engine, host, port, database, username, password).await
        }
        ConnectionCommand::List => list(storage).await,
        ConnectionCommand::Remove { name } => remove(storage, &name).await,
        ConnectionCommand::Test { name } => test(storage, &name).await,
    }
}

#[allow(clippy::too_many_arguments)]
async fn add(
    storage: &Database,
    name: String,
    engine: String,
    host: String,
    port: u16,
    database: String,
    username: String,
    password: Option<String>,
) -> Result<()> {
    let Some(db_type) = EngineKind::parse(&engine) else {
        bail!("unknown engine kind \"{engine}\" (expected postgresql, mysql, gaussdb, oracle, or sqlserver)");
    };
    let repo = ConnectionRepository::new(storage);
    if repo.get_by_name(&name).await?.is_some() {
        bail!("a connection named \"{name}\" already exists");
    }

    let password = match password {
        Some(p) => p,
        None => rpassword_prompt("Password: ")?,
    };

    let now = chrono::Utc::now();
    let record = ConnectionRecord {
        id: ConnectionId::new(),
        name: name.clone(),
        db_type,
        host,
        port,
        database,
        username,
        password_encrypted: sqlsage_crypto::encrypt(&password),
        is_active: false,
        created_at: now,
        updated_at: now,
    };
    repo.upsert(&record).await?;
    println!("connection \"{name}\" added");
    Ok(())
}

async fn list(storage: &Database) -> Result<()> {
    let repo = ConnectionRepository::new(storage);
    let connections = repo.list().await?;
    if connections.is_empty() {
        println!("no connections configured");
        return Ok(());
    }
    for conn in connections {
        let marker = if conn.is_active { "*" } else { " " };
        println!(
            "{marker} {:<20} {:<10} {}@{}:{}/{}",
            conn.name, conn.db_type, conn.username, conn.host, conn.port, conn.database
        );
    }
    Ok(())
}

async fn remove(storage: &Database, name: &str) -> Result<()> {
    let repo = ConnectionRepository::new(storage);
    let Some(record) = repo.get_by_name(name).await? else {
        bail!("no connection named \"{name}\"");
    };
    repo.delete(record.id).await?;
    println!("connection \"{name}\" removed");
    Ok(())
}

async fn test(storage: &Database, name: &str) -> Result<()> {
    let repo = ConnectionRepository::new(storage);
    let Some(record) = repo.get_by_name(name).await? else {
        bail!("no connection named \"{name}\"");
    };
    let config = ConnectionConfig {
        host: record.host.clone(),
        port: record.port,
        database: record.database.clone(),
        username: record.username.clone(),
        password: sqlsage_crypto::decrypt(&record.password_encrypted),
    };
    let adapter = sqlsage_db::connect(record.db_type, &config)
        .await
        .with_context(|| format!("failed to connect to \"{name}\""))?;
    match adapter.list_databases().await {
        sqlsage_db::DbOutcome::Success { .. } => println!("connection \"{name}\" is reachable"),
        sqlsage_db::DbOutcome::Error { error } => bail!("connection \"{name}\" reached but failed: {error}"),
        _ => println!("connection \"{name}\" is reachable"),
    }
    Ok(())
}

fn rpassword_prompt(prompt: &str) -> Result<String> {
    use std::io::Write;
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
