//! # School Meal CLI (`schoolmeal`)
//!
//! Looks up Korean school meal menus from the NEIS Open API, resolving
//! school names (including names shared across regions) against a local
//! corpus of school-information JSON files.
//!
//! ## Usage
//!
//! ```bash
//! schoolmeal --config ./config/schoolmeal.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `schoolmeal serve stdio` | MCP server on stdin/stdout |
//! | `schoolmeal serve http` | HTTP API plus MCP streamable HTTP at `/mcp` |
//! | `schoolmeal meal <school> [--date]` | Print the meal report |
//! | `schoolmeal find <school>` | Show which schools a name resolves to |
//! | `schoolmeal duplicates [--top N]` | Names shared by several schools |
//! | `schoolmeal corpus` | Per-file corpus load summary |
//!
//! ## MCP client configuration
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "school-meal": {
//!       "command": "schoolmeal",
//!       "args": ["--config", "/path/to/schoolmeal.toml", "serve", "stdio"]
//!     }
//!   }
//! }
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use school_meal::config::{self, Config};
use school_meal::{corpus, logging, mcp, meal, server};

/// School Meal CLI: Korean school meal lookup over the NEIS Open API.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/schoolmeal.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "schoolmeal",
    about = "Korean school meal lookup (NEIS Open API) with an MCP server",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Built-in defaults are used when the file does not exist.
    #[arg(long, global = true, default_value = "./config/schoolmeal.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a server exposing the meal tools.
    Serve {
        #[command(subcommand)]
        transport: ServeTransport,
    },

    /// Print the meal report for a school.
    Meal {
        /// Full school name, e.g. `서울고등학교`.
        school: String,

        /// `YYYYMMDD`, or 오늘/내일/어제/모레 (today/tomorrow/yesterday/day-after-tomorrow).
        /// Defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// Show every school a name resolves to, or similar names.
    Find {
        /// School name to resolve.
        school: String,
    },

    /// List school names shared by more than one school.
    Duplicates {
        /// Number of names to show.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Show which corpus files were loaded.
    Corpus,
}

#[derive(Subcommand)]
enum ServeTransport {
    /// MCP over stdin/stdout.
    Stdio,
    /// HTTP API on `[server].bind`, with MCP at `/mcp`.
    Http,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_found = cli.config.exists();
    let cfg = if config_found {
        config::load_config(&cli.config)?
    } else {
        Config::default()
    };

    logging::init_logging(&cfg.logging);
    if !config_found {
        tracing::warn!(path = %cli.config.display(), "config file not found; using defaults");
    }

    match cli.command {
        Commands::Serve { transport } => {
            let service = meal::build_service(&cfg)?;
            match transport {
                ServeTransport::Stdio => mcp::serve_stdio(service).await?,
                ServeTransport::Http => server::run_server(&cfg, service).await?,
            }
        }
        Commands::Meal { school, date } => {
            meal::run_meal(&cfg, &school, date.as_deref()).await?;
        }
        Commands::Find { school } => {
            meal::run_find(&cfg, &school)?;
        }
        Commands::Duplicates { top } => {
            meal::run_duplicates(&cfg, top)?;
        }
        Commands::Corpus => {
            corpus::list_corpus(&cfg.corpus)?;
        }
    }

    Ok(())
}
