// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use super::source::{DataSource, SingleLookup};
use crate::error::NutrilogError;
use crate::model::User;
use crate::types::RecordId;

/// Read capabilities of a user store. Name and email match case-insensitively.
#[async_trait]
pub trait UserSource: DataSource<Entity = User> {
    async fn find_by_id(&self, id: RecordId) -> Result<SingleLookup<User>, NutrilogError>;

    async fn find_by_name(&self, user_name: &str) -> Result<SingleLookup<User>, NutrilogError>;

    async fn find_by_email(&self, email: &str) -> Result<SingleLookup<User>, NutrilogError>;
}
