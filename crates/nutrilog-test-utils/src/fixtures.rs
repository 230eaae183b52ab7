// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use nutrilog_core::{Meal, MealType, RecordId, Sport, User};

pub fn user(user_name: &str) -> User {
    User {
        user_name: user_name.to_string(),
        pwd: "$argon2id$placeholder".to_string(),
        email: format!("{}@example.org", user_name.to_lowercase()),
        first_name: user_name.to_string(),
        last_name: "Tester".to_string(),
        birth_date: 631_152_000,
        weight: 70.0,
        gender: "x".to_string(),
        height: 1.75,
    }
}

/// A 300 kcal soup owned by `user_id`.
pub fn soup(user_id: RecordId) -> MealType {
    MealType {
        user_id,
        name: "Soup".to_string(),
        calories: 300.0,
        carbs: 0.0,
        proteins: 0.0,
        fat: 0.0,
    }
}

pub fn meal(type_id: RecordId, user_id: RecordId, date: i64) -> Meal {
    Meal {
        type_id,
        user_id,
        date,
    }
}

pub fn run(user_id: RecordId, date: i64) -> Sport {
    Sport {
        user_id,
        date,
        duration: 1800,
        intensity: 2,
    }
}
