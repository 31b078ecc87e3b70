//! wastore CLI: entry point.
//!
//! # Commands
//!
//! - `wastore exists -s SESSION`: print whether a bundle is stored
//! - `wastore save -s SESSION [--dir DIR]`: upload `DIR/SESSION.zip`
//! - `wastore extract -s SESSION -p PATH`: download the bundle to `PATH`
//! - `wastore delete -s SESSION`: remove the stored bundle
//! - `wastore onboard`: write a default config
//! - `wastore status`: show configuration status

mod helpers;
mod onboard;
mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use wastore_core::config::{load_config, Config};
use wastore_core::SessionStore;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// wastore: WhatsApp session bundles in Supabase Storage
#[derive(Parser)]
#[command(name = "wastore", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.wastore/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a session bundle is stored
    Exists {
        /// Session identifier
        #[arg(short, long)]
        session: String,
    },

    /// Upload SESSION.zip and drop the previous version
    Save {
        /// Session identifier
        #[arg(short, long)]
        session: String,

        /// Directory holding SESSION.zip (default: store.sessionDir from config)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Download a session bundle
    Extract {
        /// Session identifier
        #[arg(short, long)]
        session: String,

        /// Destination file (its directory must exist)
        #[arg(short, long)]
        path: PathBuf,
    },

    /// Delete a stored session bundle
    Delete {
        /// Session identifier
        #[arg(short, long)]
        session: String,
    },

    /// Write a default configuration file
    Onboard,

    /// Show configuration status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logs);

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Onboard => onboard::run(config_path),
        Commands::Status => status::run(config_path),
        Commands::Exists { session } => {
            let store = build_store(&load_config(config_path), None)?;
            let exists = store
                .exists(&session)
                .await
                .with_context(|| format!("failed to check session '{session}'"))?;
            helpers::print_exists(&session, exists);
            Ok(())
        }
        Commands::Save { session, dir } => {
            let store = build_store(&load_config(config_path), dir)?;
            let source = store.bundle_path(&session);
            info!(session = %session, source = %source.display(), "saving session");
            store
                .save(&session)
                .await
                .with_context(|| format!("failed to save session '{session}'"))?;
            helpers::print_done(&format!("saved session '{session}'"));
            Ok(())
        }
        Commands::Extract { session, path } => {
            let store = build_store(&load_config(config_path), None)?;
            store
                .extract(&session, &path)
                .await
                .with_context(|| format!("failed to extract session '{session}'"))?;
            helpers::print_done(&format!(
                "extracted session '{session}' to {}",
                path.display()
            ));
            Ok(())
        }
        Commands::Delete { session } => {
            let store = build_store(&load_config(config_path), None)?;
            store
                .delete(&session)
                .await
                .with_context(|| format!("failed to delete session '{session}'"))?;
            helpers::print_done(&format!("deleted session '{session}'"));
            Ok(())
        }
    }
}

/// Build a `SessionStore` from the loaded configuration.
///
/// `dir_override` replaces `store.sessionDir`.
fn build_store(config: &Config, dir_override: Option<PathBuf>) -> Result<SessionStore> {
    wastore_backends::build_store(config, dir_override).context(
        "Supabase is not configured. Set WASTORE_SUPABASE__URL and \
         WASTORE_SUPABASE__SERVICE_ROLE_KEY or run `wastore onboard`",
    )
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("wastore=debug,wastore_core=debug,wastore_backends=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
