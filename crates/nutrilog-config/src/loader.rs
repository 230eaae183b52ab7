// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `/etc/nutrilog/nutrilog.toml`, then
//! `~/.config/nutrilog/nutrilog.toml`, then `./nutrilog.toml`, with
//! `NUTRILOG_` environment variables applied last.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::NutrilogConfig;

pub const SYSTEM_CONFIG_PATH: &str = "/etc/nutrilog/nutrilog.toml";
pub const LOCAL_CONFIG_PATH: &str = "nutrilog.toml";

/// Path of the per-user config file, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("nutrilog/nutrilog.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/nutrilog/nutrilog.toml`
/// 3. `~/.config/nutrilog/nutrilog.toml`
/// 4. `./nutrilog.toml`
/// 5. `NUTRILOG_*` environment variables
pub fn load_config() -> Result<NutrilogConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string over the defaults (no file lookup,
/// no environment).
pub fn load_config_from_str(toml_content: &str) -> Result<NutrilogConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NutrilogConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file, with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<NutrilogConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NutrilogConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The full layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(NutrilogConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Map `NUTRILOG_SECTION_KEY` to `section.key`.
///
/// Uses an explicit section map instead of `Env::split("_")` because keys
/// contain underscores: `NUTRILOG_STORAGE_DATABASE_PATH` must become
/// `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("NUTRILOG_").map(|key| {
        let key_str = key.as_str();
        let mapped = ["storage_", "locking_", "sources_", "log_"]
            .iter()
            .find_map(|section| {
                key_str.strip_prefix(section).map(|rest| {
                    format!("{}.{rest}", section.trim_end_matches('_'))
                })
            })
            .unwrap_or_else(|| key_str.to_string());
        mapped.into()
    })
}
