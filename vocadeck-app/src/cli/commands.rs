use crate::api::routes::AppState;
use crate::api::server as api_server;
use crate::cli::opts::*;
use crate::cli::paths::default_database_url;

use anyhow::{bail, Context, Result};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use vocadeck_core::{load_overview, repo::memory::MemoryRepo, validate, Repository};
use vocadeck_pg::PostgresRepo;
use vocadeck_sqlite::SqliteRepo;

pub async fn run_cli(args: Cli) -> Result<()> {
    let url = args.database_url.clone().unwrap_or_else(default_database_url);
    let repo = open_repo(&url).await?;

    match args.cmd.clone().unwrap_or(Command::Serve) {
        Command::Serve => {
            let addr: SocketAddr = tokio::net::lookup_host((args.host.as_str(), args.port))
                .await?
                .next()
                .with_context(|| format!("cannot resolve bind address {}:{}", args.host, args.port))?;
            let state = AppState {
                repo,
                require_user_id: args.require_user_id,
                score_policy: args.score_policy.into(),
            };
            tracing::info!(
                require_user_id = state.require_user_id,
                score_policy = ?state.score_policy,
                "starting api"
            );
            api_server::run(state, addr).await
        }
        Command::Deck(cmd) => deck_cmd(repo, cmd).await,
    }
}

/// Picks the backend from the URL scheme and makes sure its schema exists.
pub async fn open_repo(url: &str) -> Result<Arc<dyn Repository>> {
    if url == "memory" {
        tracing::warn!("using in-memory store; data is lost on exit");
        return Ok(Arc::new(MemoryRepo::new()));
    }
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        let repo = PostgresRepo::connect(url).await.context("opening postgres store")?;
        tracing::info!("connected to postgres");
        return Ok(Arc::new(repo));
    }
    if url == "sqlite::memory:" || url == "sqlite://:memory:" {
        let repo = SqliteRepo::open_memory().await.context("opening sqlite store")?;
        tracing::warn!("using in-memory sqlite store; data is lost on exit");
        return Ok(Arc::new(repo));
    }
    if let Some(path) = url.strip_prefix("sqlite://").or_else(|| url.strip_prefix("sqlite:")) {
        let path = Path::new(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let repo = SqliteRepo::open_file(path).await.context("opening sqlite store")?;
        tracing::info!(path = %path.display(), "opened sqlite store");
        return Ok(Arc::new(repo));
    }
    bail!("unsupported database url; expected postgres://, sqlite:// or memory")
}

async fn deck_cmd(repo: Arc<dyn Repository>, cmd: DeckCmd) -> Result<()> {
    match cmd {
        DeckCmd::Add { name, user } => {
            let name = validate::required(Some(name.as_str()), "name is required")?;
            let d = repo.create_deck(&user.user, name).await?;
            println!("{}", d.id);
        }
        DeckCmd::List { user } => {
            let overview = load_overview(&*repo, &user.user).await?;
            println!("{}", serde_json::to_string_pretty(&overview)?);
        }
        DeckCmd::Rm { name, user } => {
            repo.delete_deck(&user.user, &name).await?;
            println!("ok");
        }
    }
    Ok(())
}
