// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `nutrilog status` command implementation.
//!
//! Opens the stores the same way an embedding service would and reports,
//! per repository, the sources in consultation order with their metric and
//! health, plus the stored row count.

use std::io::IsTerminal;

use nutrilog_config::NutrilogConfig;
use nutrilog_core::{EntityKind, HealthStatus, NutrilogError, SourceHealth};
use nutrilog_storage::Stores;
use serde::Serialize;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub database_path: String,
    pub repositories: Vec<RepositoryStatus>,
}

#[derive(Debug, Serialize)]
pub struct RepositoryStatus {
    pub kind: EntityKind,
    pub rows: u64,
    pub sources: Vec<SourceStatus>,
}

#[derive(Debug, Serialize)]
pub struct SourceStatus {
    pub name: String,
    pub metric: u32,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl From<SourceHealth> for SourceStatus {
    fn from(health: SourceHealth) -> Self {
        let (state, detail) = match health.status {
            HealthStatus::Healthy => ("healthy", None),
            HealthStatus::Degraded(reason) => ("degraded", Some(reason)),
            HealthStatus::Unhealthy(reason) => ("unhealthy", Some(reason)),
        };
        Self {
            name: health.name,
            metric: health.metric,
            state,
            detail,
        }
    }
}

/// Collect the status of every repository.
pub async fn collect_status(config: &NutrilogConfig) -> Result<StatusResponse, NutrilogError> {
    let stores = Stores::open(config).await?;
    let counts = stores.row_counts().await?;

    let repositories = stores
        .health()
        .await
        .into_iter()
        .map(|(kind, sources)| RepositoryStatus {
            kind,
            rows: counts
                .iter()
                .find(|(counted, _)| *counted == kind)
                .map_or(0, |(_, rows)| *rows),
            sources: sources.into_iter().map(SourceStatus::from).collect(),
        })
        .collect();

    Ok(StatusResponse {
        database_path: config.storage.database_path.clone(),
        repositories,
    })
}

/// Run the `nutrilog status` command.
///
/// If `--json` is passed, outputs structured JSON for scripting.
/// If `--plain` is passed or stdout is not a TTY, disables colors.
pub async fn run_status(
    config: &NutrilogConfig,
    json: bool,
    plain: bool,
) -> Result<(), NutrilogError> {
    let status = collect_status(config).await?;

    if json {
        let rendered = serde_json::to_string_pretty(&status)
            .map_err(|e| NutrilogError::Internal(format!("failed to render status: {e}")))?;
        println!("{rendered}");
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&status, use_color);
    }
    Ok(())
}

fn print_status(status: &StatusResponse, use_color: bool) {
    println!();
    println!("  nutrilog status ({})", status.database_path);
    println!("  {}", "-".repeat(35));

    for repo in &status.repositories {
        println!("    {:<10} {} rows", repo.kind.to_string(), repo.rows);
        for source in &repo.sources {
            let marker = state_marker(source.state, use_color);
            match &source.detail {
                Some(detail) => println!(
                    "      {marker} {} (metric {}): {detail}",
                    source.name, source.metric
                ),
                None => println!("      {marker} {} (metric {})", source.name, source.metric),
            }
        }
    }
    println!();
}

fn state_marker(state: &str, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        match state {
            "healthy" => "✓".green().to_string(),
            "degraded" => "!".yellow().to_string(),
            _ => "✗".red().to_string(),
        }
    } else {
        match state {
            "healthy" => "[OK]".to_string(),
            "degraded" => "[WARN]".to_string(),
            _ => "[FAIL]".to_string(),
        }
    }
}
