//! docsync: poke at the synchronized record tree from a shell.
//!
//! Usage:
//!   docsync --db app.db --workspace wrk_1 ls .insomnia/Request
//!   docsync --db app.db --config sync.toml export ./checkout
//!   echo '{...}' | docsync --db app.db --workspace wrk_1 put .insomnia/Request/req_1.json
//!
//! Logs go to stderr; set `RUST_LOG=docsync_kernel=debug` for per-record detail.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use docsync_kernel::{
    DocumentStore, SharedDocumentStore, SqliteStore, StoreBackend, SyncConfig, VfsOps,
    export_tree, import_tree,
};

/// Expose a record database as a file tree.
#[derive(Parser, Debug)]
#[command(name = "docsync")]
#[command(about = "Browse and edit a record database through its synchronized file tree")]
struct Args {
    /// SQLite database holding the records
    #[arg(long, default_value = "docsync.db")]
    db: PathBuf,

    #[command(flatten)]
    binding: Binding,

    #[command(subcommand)]
    command: Command,
}

/// Which workspace the tree shows.
#[derive(clap::Args, Debug)]
struct Binding {
    /// TOML file with workspace_id, project_id and sync_root
    #[arg(long)]
    config: Option<PathBuf>,

    /// Workspace to expose (overrides the config file)
    #[arg(long)]
    workspace: Option<String>,

    /// Project written workspaces are re-parented under (overrides the config file)
    #[arg(long)]
    project: Option<String>,

    /// Name of the reserved top-level directory (overrides the config file)
    #[arg(long)]
    sync_root: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List a directory
    Ls { path: PathBuf },
    /// Print a file
    Cat { path: PathBuf },
    /// Show file attributes
    Stat { path: PathBuf },
    /// Write a file from FILE, or stdin when omitted
    Put { path: PathBuf, file: Option<PathBuf> },
    /// Remove a file
    Rm { path: PathBuf },
    /// Materialize the whole tree under DIR
    Export { dir: PathBuf },
    /// Write every record file found under DIR/<sync root>
    Import { dir: PathBuf },
    /// Print every record in the database, one JSON document per line
    Dump,
}

impl Binding {
    fn sync_config(&self) -> Result<SyncConfig> {
        let mut config = match &self.config {
            Some(path) => SyncConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => {
                let Some(workspace) = &self.workspace else {
                    bail!("either --config or --workspace is required");
                };
                SyncConfig::new(workspace.clone(), None)
            }
        };

        if let Some(workspace) = &self.workspace {
            config.workspace_id = workspace.clone();
        }
        if let Some(project) = &self.project {
            config.project_id = Some(project.clone());
        }
        if let Some(sync_root) = &self.sync_root {
            config.sync_root = sync_root.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let store: SharedDocumentStore = Arc::new(
        SqliteStore::open(&args.db).with_context(|| format!("opening {}", args.db.display()))?,
    );
    tracing::debug!(db = %args.db.display(), "store opened");

    match args.command {
        Command::Dump => dump(store.as_ref()).await,
        command => {
            let config = args.binding.sync_config()?;
            tracing::debug!(
                workspace = %config.workspace_id,
                project = ?config.project_id,
                sync_root = %config.sync_root,
                "binding sync session"
            );
            let fs = StoreBackend::new(&config, store)?;
            run(&fs, command).await
        }
    }
}

async fn run(fs: &StoreBackend, command: Command) -> Result<()> {
    match command {
        Command::Ls { path } => {
            for entry in fs.readdir(&path).await? {
                let suffix = if entry.kind.is_dir() { "/" } else { "" };
                println!("{}{}", entry.name, suffix);
            }
        }
        Command::Cat { path } => {
            let data = fs.read(&path).await?;
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&data).await?;
            stdout.flush().await?;
        }
        Command::Stat { path } => {
            let attr = fs.stat(&path).await?;
            println!("type:  {:?}", attr.kind);
            println!("size:  {}", attr.size);
            println!("ino:   {}", attr.ino_or_zero());
            println!("mtime: {}", attr.mtime);
            println!("mode:  {:o}", attr.perm);
        }
        Command::Put { path, file } => {
            let data = read_input(file.as_deref()).await?;
            fs.write(&path, &data).await?;
        }
        Command::Rm { path } => {
            fs.unlink(&path).await?;
        }
        Command::Export { dir } => {
            let summary = export_tree(fs, &dir).await?;
            println!(
                "exported {} files in {} directories to {}",
                summary.files,
                summary.directories,
                dir.display()
            );
        }
        Command::Import { dir } => {
            let summary = import_tree(fs, &dir).await?;
            println!("imported {} files", summary.written.len());
            for (path, err) in &summary.failed {
                eprintln!("failed: {}: {}", path.display(), err);
            }
            if !summary.is_clean() {
                bail!("{} files could not be imported", summary.failed.len());
            }
        }
        Command::Dump => dump(fs.store().as_ref()).await?,
    }

    Ok(())
}

async fn read_input(file: Option<&Path>) -> Result<Vec<u8>> {
    match file {
        Some(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("reading {}", path.display())),
        None => {
            let mut data = Vec::new();
            tokio::io::stdin().read_to_end(&mut data).await?;
            Ok(data)
        }
    }
}

async fn dump(store: &dyn DocumentStore) -> Result<()> {
    for record in store.all().await? {
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(())
}
