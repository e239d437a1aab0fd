use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use taqyim_core::types::Role;
use taqyim_core::{db, ingest, users, IngestConfig, Principal};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Taqyim administrative tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run embedded database migrations
    Migrate,
    /// Provision an admin principal
    CreateAdmin(CreateAdminArgs),
    /// Ingest one file from disk as an upload session
    Ingest(IngestArgs),
}

#[derive(Args, Debug)]
struct CreateAdminArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: Option<String>,
}

#[derive(Args, Debug)]
struct IngestArgs {
    /// Path of the file to ingest
    path: PathBuf,
    /// Id of the admin user performing the ingestion
    #[arg(long)]
    user: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Migrate => handle_migrate().await,
        Command::CreateAdmin(args) => handle_create_admin(args).await,
        Command::Ingest(args) => handle_ingest(args).await,
    }
}

async fn connect() -> Result<db::DbPool> {
    dotenvy::dotenv().ok();
    let database_url = env::var("DATABASE_URL")
        .or_else(|_| env::var("TAQYIM_DATABASE_URL"))
        .context("DATABASE_URL (or TAQYIM_DATABASE_URL) must be set")?;
    Ok(db::connect(&database_url).await?)
}

async fn handle_migrate() -> Result<()> {
    let pool = connect().await?;
    db::run_migrations(&pool).await?;
    info!("migrations applied");
    Ok(())
}

async fn handle_create_admin(args: CreateAdminArgs) -> Result<()> {
    let pool = connect().await?;
    db::run_migrations(&pool).await?;

    let user = users::create_user(&pool, &args.username, Role::Admin, args.email.as_deref())
        .await
        .context("failed to create admin user")?;

    println!("Created admin '{}' with id {}", user.username, user.id);
    Ok(())
}

async fn handle_ingest(args: IngestArgs) -> Result<()> {
    let pool = connect().await?;
    db::run_migrations(&pool).await?;

    let filename = args
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .context("path has no usable file name")?
        .to_string();
    let extension = args
        .path
        .extension()
        .and_then(|e| e.to_str())
        .context("path has no file extension")?
        .to_string();
    let bytes = std::fs::read(&args.path)
        .with_context(|| format!("failed to read {}", args.path.display()))?;

    let principal = Principal::new(args.user, Role::Admin);
    let receipt = ingest::ingest_upload(
        &pool,
        &principal,
        &IngestConfig::default(),
        &filename,
        &extension,
        &bytes,
    )
    .await?;

    println!(
        "Session {}: {} total, {} processed, {} failed",
        receipt.session_id,
        receipt.total_records,
        receipt.processed_records,
        receipt.failed_records
    );
    Ok(())
}
