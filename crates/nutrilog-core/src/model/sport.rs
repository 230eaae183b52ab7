// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::Serialize;
use strum::{EnumIter, IntoStaticStr};

use super::{Entity, Field, Record};
use crate::types::{EntityKind, RecordId};

/// A sport session: start (unix seconds), duration in seconds, and a
/// free-scale intensity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sport {
    pub user_id: RecordId,
    pub date: i64,
    pub duration: i64,
    pub intensity: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum SportField {
    Date,
    Duration,
    Intensity,
}

impl Field for SportField {
    fn column(self) -> &'static str {
        self.into()
    }
}

impl Entity for Sport {
    type Field = SportField;
    const KIND: EntityKind = EntityKind::Sport;
}

impl Record<Sport> {
    pub fn set_date(&mut self, date: i64) {
        self.mutate(SportField::Date, |e| e.date = date);
    }

    pub fn set_duration(&mut self, duration: i64) {
        self.mutate(SportField::Duration, |e| e.duration = duration);
    }

    pub fn set_intensity(&mut self, intensity: i64) {
        self.mutate(SportField::Intensity, |e| e.intensity = intensity);
    }
}
