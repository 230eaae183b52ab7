// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::Serialize;
use strum::{EnumIter, IntoStaticStr};

use super::{Entity, Field, Record};
use crate::types::EntityKind;

/// An account. `pwd` holds the password hash and is never projected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_name: String,
    #[serde(skip_serializing)]
    pub pwd: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: i64,
    pub weight: f64,
    pub gender: String,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum UserField {
    UserName,
    Pwd,
    Email,
    FirstName,
    LastName,
    BirthDate,
    Weight,
    Gender,
    Height,
}

impl Field for UserField {
    fn column(self) -> &'static str {
        self.into()
    }
}

impl Entity for User {
    type Field = UserField;
    const KIND: EntityKind = EntityKind::User;
    const EXPOSE_ID: bool = false;
}

impl Record<User> {
    pub fn set_user_name(&mut self, user_name: impl Into<String>) {
        let user_name = user_name.into();
        self.mutate(UserField::UserName, |e| e.user_name = user_name);
    }

    pub fn set_pwd(&mut self, pwd: impl Into<String>) {
        let pwd = pwd.into();
        self.mutate(UserField::Pwd, |e| e.pwd = pwd);
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        let email = email.into();
        self.mutate(UserField::Email, |e| e.email = email);
    }

    pub fn set_first_name(&mut self, first_name: impl Into<String>) {
        let first_name = first_name.into();
        self.mutate(UserField::FirstName, |e| e.first_name = first_name);
    }

    pub fn set_last_name(&mut self, last_name: impl Into<String>) {
        let last_name = last_name.into();
        self.mutate(UserField::LastName, |e| e.last_name = last_name);
    }

    pub fn set_birth_date(&mut self, birth_date: i64) {
        self.mutate(UserField::BirthDate, |e| e.birth_date = birth_date);
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.mutate(UserField::Weight, |e| e.weight = weight);
    }

    pub fn set_gender(&mut self, gender: impl Into<String>) {
        let gender = gender.into();
        self.mutate(UserField::Gender, |e| e.gender = gender);
    }

    pub fn set_height(&mut self, height: f64) {
        self.mutate(UserField::Height, |e| e.height = height);
    }
}
