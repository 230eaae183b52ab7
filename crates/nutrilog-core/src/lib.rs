// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Nutrilog data-access layer.
//!
//! This crate provides the stored models with change tracking, the data
//! source traits every backend implements, the per-resource async mutex used
//! around write-then-read-identity sequences, and repositories that fall
//! back across sources ordered by cost.

pub mod error;
pub mod lock;
pub mod model;
pub mod repository;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{BackendError, ModelError, NutrilogError};
pub use lock::{LockError, ResourceGuard, ResourceMutexManager};
pub use model::{ChangedFields, Entity, Field, Meal, MealType, Record, Sport, User};
pub use repository::{
    MealRepository, MealTypeRepository, Repository, SourceHealth, SportRepository,
    UserRepository,
};
pub use traits::{DataSource, MealSource, MealTypeSource, SportSource, UserSource};
pub use types::{EntityKind, HealthStatus, Lookup, RecordId};
