// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::Serialize;
use strum::{EnumIter, IntoStaticStr};

use super::{Entity, Field, Record};
use crate::types::{EntityKind, RecordId};

/// One eaten meal of a given type at a point in time (unix seconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub type_id: RecordId,
    pub user_id: RecordId,
    pub date: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum MealField {
    TypeId,
    Date,
}

impl Field for MealField {
    fn column(self) -> &'static str {
        self.into()
    }
}

impl Entity for Meal {
    type Field = MealField;
    const KIND: EntityKind = EntityKind::Meal;
}

impl Record<Meal> {
    pub fn set_type_id(&mut self, type_id: RecordId) {
        self.mutate(MealField::TypeId, |e| e.type_id = type_id);
    }

    pub fn set_date(&mut self, date: i64) {
        self.mutate(MealField::Date, |e| e.date = date);
    }
}
