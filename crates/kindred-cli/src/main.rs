//! Kindred CLI - Family trees and relationship paths from the command line

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{completions, member, path, relation, serve, tree};
use config::Config;
use kindred_core::{FamilyTree, TreeId};
use kindred_storage::{SqliteStorage, StorageBackend};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "kindred")]
#[command(author, version, about = "Family trees with relationship path lookups")]
pub struct Cli {
    /// Family tree to operate on
    #[arg(short, long, env = "KINDRED_TREE", global = true)]
    pub tree: Option<TreeId>,

    /// Data directory
    #[arg(short, long, env = "KINDRED_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file
    #[arg(long, env = "KINDRED_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config::config_file_path)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage family trees
    Tree(tree::TreeArgs),
    /// Manage family members
    Member(member::MemberArgs),
    /// Manage relationships
    Relation(relation::RelationArgs),
    /// Find how two members are related
    Path(path::PathArgs),
    /// Start the HTTP API server
    Serve(serve::ServeArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context with storage backend
pub struct AppContext {
    pub storage: Arc<SqliteStorage>,
    pub config: Config,
    pub tree: Option<TreeId>,
    pub format: OutputFormat,
}

impl AppContext {
    pub async fn new(cli: &Cli, config: Config) -> anyhow::Result<Self> {
        let data_dir = cli
            .data_dir
            .clone()
            .unwrap_or_else(|| config.data_dir.clone());
        std::fs::create_dir_all(&data_dir)?;

        let db_path = data_dir.join("kindred.db");
        tracing::debug!("Using database at: {:?}", db_path);

        let storage = SqliteStorage::open(&db_path)?;
        storage.initialize().await?;

        Ok(Self {
            storage: Arc::new(storage),
            tree: cli.tree.or(config.default_tree),
            format: cli.format,
            config,
        })
    }

    /// The selected tree, which must exist
    pub async fn require_tree(&self) -> anyhow::Result<FamilyTree> {
        let Some(id) = self.tree else {
            anyhow::bail!(
                "No family tree selected. Pass --tree <id>, set KINDRED_TREE, \
                 or run 'kindred config set default_tree <id>'"
            );
        };

        self.storage
            .get_tree(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Family tree {} not found", id))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting kindred CLI");

    let config_path = cli.config_path();

    // Commands that never touch the database
    match &cli.command {
        Commands::Config(args) => return commands::config::run(args, &config_path, cli.format),
        Commands::Completions(args) => return completions::run(args),
        _ => {}
    }

    let config = Config::load(&config_path)?;
    let ctx = AppContext::new(&cli, config).await?;

    match &cli.command {
        Commands::Tree(args) => tree::run(args, &ctx).await?,
        Commands::Member(args) => member::run(args, &ctx).await?,
        Commands::Relation(args) => relation::run(args, &ctx).await?,
        Commands::Path(args) => path::run(args, &ctx).await?,
        Commands::Serve(args) => serve::run(args, &ctx).await?,
        Commands::Config(_) | Commands::Completions(_) => {}
    }

    ctx.storage.close().await?;
    Ok(())
}
