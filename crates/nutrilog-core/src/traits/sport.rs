// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;

use super::source::{DataSource, ListLookup};
use crate::error::NutrilogError;
use crate::model::Sport;
use crate::types::RecordId;

/// Capabilities of a sport session store.
#[async_trait]
pub trait SportSource: DataSource<Entity = Sport> {
    async fn find_all_by_user(&self, user_id: RecordId)
    -> Result<ListLookup<Sport>, NutrilogError>;
}
