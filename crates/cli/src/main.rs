//! modsync: keep a mod directory in sync with an authoritative server
//!
//! One host serves the canonical mod set; any number of clients pull it:
//! - Content-addressed  - SHA-256 hashes skip files that already match
//! - Deduplicated       - only the newest version of each mod is published
//! - Whole-file         - no deltas, a changed file is refetched outright
//! - Pull-only          - clients never write back to the server

mod config;
mod discover;
mod progress;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand, builder::Styles};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use tracing::info;

use modsync_core::MANIFEST_FILE_NAME;
use modsync_client::SyncClient;
use modsync_server::{FileManager, ManifestBuilder};

use config::ModsyncConfig;
use discover::FileNameMetadata;

const DEFAULT_PORT: u16 = 8443;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default())
    .valid(AnsiColor::Green.on_default())
    .invalid(AnsiColor::Red.on_default());

#[derive(Parser)]
#[command(name = "modsync")]
#[command(version)]
#[command(styles = STYLES)]
#[command(about = "Keep a mod directory in sync with an authoritative server")]
#[command(long_about = r#"
modsync keeps one server's mod set mirrored on any number of clients.

Features:
  • Content-addressed - SHA-256 hashes skip files that already match
  • Deduplicated      - only the newest version of each mod is published
  • Exclusions        - mod ids can be withheld on either side
  • Plain HTTP(S)     - servable behind any reverse proxy

Examples:
  modsync serve ./servermods                 Publish a mods directory
  modsync sync http://host:8443 ./mods       Pull the server's mod set
  modsync manifest ./servermods              Print the manifest locally
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve a mods directory to sync clients
    Serve {
        /// Primary mods directory; the manifest is persisted here
        dir: PathBuf,

        /// Additional directories to serve files from
        #[arg(long = "extra-root")]
        extra_roots: Vec<PathBuf>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Distribution tag published in the manifest
        #[arg(long)]
        distro_version: Option<String>,
    },

    /// Pull a server's mod set into a local directory
    Sync {
        /// Server address (http://host:port)
        server: Option<String>,

        /// Target directory for downloaded mods
        #[arg(default_value = "servermods")]
        dir: PathBuf,

        /// Mod ids to skip even when the server lists them
        #[arg(long = "exclude")]
        excludes: Vec<String>,
    },

    /// Build and print the manifest for a mods directory
    Manifest {
        /// Directory to scan
        dir: PathBuf,

        /// Output format (json, summary)
        #[arg(short, long, default_value = "summary")]
        format: String,
    },

    /// Show version and build info
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Version => {
            eprintln!("modsync {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Manifest { dir, format } => {
            manifest_command(&dir, &format)?;
        }
        Commands::Serve {
            dir,
            extra_roots,
            port,
            distro_version,
        } => {
            serve_command(dir, extra_roots, port, distro_version).await?;
        }
        Commands::Sync {
            server,
            dir,
            excludes,
        } => {
            sync_command(server, dir, excludes).await?;
        }
    }

    Ok(())
}

fn default_distro_version() -> String {
    format!("modsync-{}", env!("CARGO_PKG_VERSION"))
}

fn discover_all(roots: &[PathBuf]) -> Result<Vec<modsync_core::Candidate>> {
    let mut candidates = Vec::new();
    for root in roots {
        candidates.extend(discover::discover_mods(root)?);
    }
    Ok(candidates)
}

async fn serve_command(
    dir: PathBuf,
    extra_roots: Vec<PathBuf>,
    port: Option<u16>,
    distro_version: Option<String>,
) -> Result<()> {
    let config = ModsyncConfig::load(Path::new("."))?;
    let port = port.or(config.server.port).unwrap_or(DEFAULT_PORT);
    let distro_version = distro_version
        .or(config.server.distro_version)
        .unwrap_or_else(default_distro_version);
    let excluded: HashSet<String> = config.server.excluded_mod_ids.into_iter().collect();

    let mut roots = vec![dir.clone()];
    roots.extend(extra_roots);

    let candidates = discover_all(&roots)?;
    info!("found {} candidate files", candidates.len());

    let manifest = ManifestBuilder::new(excluded, distro_version)
        .persist_to(dir.join(MANIFEST_FILE_NAME))
        .build(candidates, &FileNameMetadata)?;
    info!("publishing manifest with {} files", manifest.files.len());

    let files = Arc::new(FileManager::new(roots, &manifest));
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    modsync_server::run(listener, files).await?;
    Ok(())
}

async fn sync_command(
    server: Option<String>,
    dir: PathBuf,
    excludes: Vec<String>,
) -> Result<()> {
    let config = ModsyncConfig::load(Path::new("."))?;
    let server = server.or(config.client.remote_server).ok_or_else(|| {
        eyre!("no server address given; pass one or set client.remote_server in modsync.toml")
    })?;
    let mut excluded: HashSet<String> = config.client.excluded_mod_ids.into_iter().collect();
    excluded.extend(excludes);

    std::fs::create_dir_all(&dir)?;

    let client = SyncClient::new(&server, &dir, excluded)?;
    let sink = Arc::new(progress::ConsoleSink::new());
    let task = client.start(sink.clone());

    match task.wait().await {
        Some(manifest) => {
            sink.finish(manifest.files.len());
            Ok(())
        }
        None => Err(eyre!("sync failed; the local mod set is incomplete")),
    }
}

fn manifest_command(dir: &Path, format: &str) -> Result<()> {
    info!("scanning {}...", dir.display());

    let candidates = discover::discover_mods(dir)?;
    let manifest = ManifestBuilder::new(HashSet::new(), default_distro_version())
        .build(candidates, &FileNameMetadata)?;

    match format {
        "json" => {
            println!("{}", manifest.to_json());
        }
        _ => {
            eprintln!("Files: {}", manifest.files.len());
            for entry in &manifest.files {
                eprintln!("  {} ({}) {}", entry.file_name, entry.mod_id, entry.checksum);
            }
        }
    }

    Ok(())
}
