// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use super::source::{DataSource, ListLookup};
use crate::error::NutrilogError;
use crate::model::Meal;
use crate::types::RecordId;

/// Capabilities of a meal store.
#[async_trait]
pub trait MealSource: DataSource<Entity = Meal> {
    async fn find_all_by_type(&self, type_id: RecordId) -> Result<ListLookup<Meal>, NutrilogError>;

    async fn find_all_by_user(&self, user_id: RecordId) -> Result<ListLookup<Meal>, NutrilogError>;

    /// Remove every meal of the given type. Returns the number removed.
    async fn delete_all_of_type(&self, type_id: RecordId) -> Result<usize, NutrilogError>;
}
