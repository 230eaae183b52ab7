// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::Serialize;
use strum::{EnumIter, IntoStaticStr};

use super::{Entity, Field, Record};
use crate::types::{EntityKind, RecordId};

/// A user-defined kind of meal with its nutritional values per serving.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealType {
    pub user_id: RecordId,
    pub name: String,
    pub calories: f64,
    pub carbs: f64,
    pub proteins: f64,
    pub fat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum MealTypeField {
    Name,
    Calories,
    Carbs,
    Proteins,
    Fat,
}

impl Field for MealTypeField {
    fn column(self) -> &'static str {
        self.into()
    }
}

impl Entity for MealType {
    type Field = MealTypeField;
    const KIND: EntityKind = EntityKind::MealType;
}

impl Record<MealType> {
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.mutate(MealTypeField::Name, |e| e.name = name);
    }

    pub fn set_calories(&mut self, calories: f64) {
        self.mutate(MealTypeField::Calories, |e| e.calories = calories);
    }

    pub fn set_carbs(&mut self, carbs: f64) {
        self.mutate(MealTypeField::Carbs, |e| e.carbs = carbs);
    }

    pub fn set_proteins(&mut self, proteins: f64) {
        self.mutate(MealTypeField::Proteins, |e| e.proteins = proteins);
    }

    pub fn set_fat(&mut self, fat: f64) {
        self.mutate(MealTypeField::Fat, |e| e.fat = fat);
    }
}
