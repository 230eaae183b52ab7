// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Nutrilog - tiered storage for meals, meal types, sports, and users.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod init;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nutrilog_config::NutrilogConfig;

/// Nutrilog - tiered storage for meals, meal types, sports, and users.
#[derive(Parser, Debug)]
#[command(name = "nutrilog", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file only.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the database and apply pending migrations.
    Init,
    /// Show sources, metrics, health, and row counts per repository.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Validate the configuration and print the effective values.
    CheckConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => nutrilog_config::load_and_validate_path(path),
        None => nutrilog_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            nutrilog_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);

    let outcome = match cli.command {
        Some(Commands::Init) => init::run_init(&config).await,
        Some(Commands::Status { json, plain }) => status::run_status(&config, json, plain).await,
        Some(Commands::CheckConfig) => {
            print_effective_config(&config);
            Ok(())
        }
        None => {
            println!("nutrilog: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("nutrilog: {e}");
        std::process::exit(1);
    }
}

fn print_effective_config(config: &NutrilogConfig) {
    println!("nutrilog: configuration is valid");
    match toml::to_string_pretty(config) {
        Ok(rendered) => println!("\n{rendered}"),
        Err(e) => eprintln!("nutrilog: cannot render configuration: {e}"),
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "nutrilog={level},nutrilog_core={level},nutrilog_storage={level},warn",
            level = log_level.to_lowercase()
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc answers epoch/stats queries.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_status_flags() {
        let cli = Cli::try_parse_from(["nutrilog", "status", "--json", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(
            cli.command,
            Some(Commands::Status {
                json: true,
                plain: false
            })
        ));
    }

    #[test]
    fn default_config_renders_as_toml() {
        let rendered = toml::to_string_pretty(&NutrilogConfig::default()).unwrap();
        assert!(rendered.contains("database_path = \"nutrilog.db\""));
        assert!(rendered.contains("[locking]"));
    }
}
