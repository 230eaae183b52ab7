// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by models, data sources, and repositories.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Storage identity of a persisted record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl RecordId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Tag naming the entity kind a repository or data source serves.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    MealType,
    Meal,
    Sport,
}

impl EntityKind {
    /// Table (and lock resource) name backing this kind.
    pub fn table(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::MealType => "meal_types",
            Self::Meal => "meals",
            Self::Sport => "sports",
        }
    }
}

/// Health status reported by data source health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Source is fully operational.
    Healthy,
    /// Source is operational but experiencing issues.
    Degraded(String),
    /// Source is not operational.
    Unhealthy(String),
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => f.write_str("healthy"),
            Self::Degraded(reason) => write!(f, "degraded ({reason})"),
            Self::Unhealthy(reason) => write!(f, "unhealthy ({reason})"),
        }
    }
}

/// Answer of a single data source to a read.
///
/// `Found` means the source is authoritative for the value it carries, even
/// when that value is an empty list or `None`. `NotFoundHere` tells the
/// repository to keep asking the next source.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    NotFoundHere,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::NotFoundHere => Lookup::NotFoundHere,
        }
    }

    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFoundHere => None,
        }
    }
}

impl<T> Lookup<Vec<T>> {
    /// Wrap the rows a source read. An empty result is only an answer when
    /// the source is authoritative.
    pub fn rows(rows: Vec<T>, authoritative: bool) -> Self {
        if rows.is_empty() && !authoritative {
            Self::NotFoundHere
        } else {
            Self::Found(rows)
        }
    }
}

impl<T> Lookup<Option<T>> {
    /// Single-row counterpart of [`Lookup::rows`].
    pub fn row(row: Option<T>, authoritative: bool) -> Self {
        if row.is_none() && !authoritative {
            Self::NotFoundHere
        } else {
            Self::Found(row)
        }
    }
}
