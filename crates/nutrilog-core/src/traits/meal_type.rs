// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use super::source::{DataSource, ListLookup, SingleLookup};
use crate::error::NutrilogError;
use crate::model::MealType;
use crate::types::RecordId;

/// Capabilities of a meal type store.
#[async_trait]
pub trait MealTypeSource: DataSource<Entity = MealType> {
    async fn find_by_id(&self, id: RecordId) -> Result<SingleLookup<MealType>, NutrilogError>;

    async fn find_all_by_user(
        &self,
        user_id: RecordId,
    ) -> Result<ListLookup<MealType>, NutrilogError>;

    /// Remove the meal type. Deleting an absent id is not an error.
    async fn delete(&self, id: RecordId) -> Result<(), NutrilogError>;
}
