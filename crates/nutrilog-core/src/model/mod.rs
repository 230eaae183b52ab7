// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stored entities and the change-tracking record wrapper.
//!
//! A [`Record`] owns one entity value, its storage identity (unset until the
//! first insert), and the ordered set of fields mutated since it was built
//! or loaded. Data sources use the changed set to write partial updates and
//! clear it after a successful write.

mod meal;
mod meal_type;
mod sport;
mod user;

use std::fmt;
use std::ops::Deref;

use serde::{Serialize, Serializer};

use crate::error::ModelError;
use crate::types::{EntityKind, RecordId};

pub use meal::{Meal, MealField};
pub use meal_type::{MealType, MealTypeField};
pub use sport::{Sport, SportField};
pub use user::{User, UserField};

/// A mutable column of an entity.
pub trait Field: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Column name in the backing table.
    fn column(self) -> &'static str;
}

/// A domain value stored by the data layer.
pub trait Entity: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// The fields that setters may change.
    type Field: Field;

    /// Kind tag shared with data sources and repositories of this entity.
    const KIND: EntityKind;

    /// Whether the JSON projection carries the record identity.
    const EXPOSE_ID: bool = true;
}

/// Fields mutated since creation or the last successful write.
///
/// Keeps first-mutation order and never holds a field twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFields<F> {
    fields: Vec<F>,
}

impl<F> Default for ChangedFields<F> {
    fn default() -> Self {
        Self { fields: Vec::new() }
    }
}

impl<F: Field> ChangedFields<F> {
    /// Record a mutation. Returns `false` if the field was already marked.
    pub fn insert(&mut self, field: F) -> bool {
        if self.fields.contains(&field) {
            return false;
        }
        self.fields.push(field);
        true
    }

    pub fn contains(&self, field: F) -> bool {
        self.fields.contains(&field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = F> + '_ {
        self.fields.iter().copied()
    }

    pub fn as_slice(&self) -> &[F] {
        &self.fields
    }

    /// Column names of the changed fields, in mutation order.
    pub fn columns(&self) -> Vec<&'static str> {
        self.iter().map(Field::column).collect()
    }

    fn clear(&mut self) {
        self.fields.clear();
    }
}

/// One stored entity plus identity and change tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<E: Entity> {
    id: Option<RecordId>,
    entity: E,
    changed: ChangedFields<E::Field>,
}

impl<E: Entity> Record<E> {
    /// A fresh record that has never been persisted.
    pub fn new(entity: E) -> Self {
        Self {
            id: None,
            entity,
            changed: ChangedFields::default(),
        }
    }

    /// A record read back from storage. The changed set starts empty.
    pub fn loaded(id: RecordId, entity: E) -> Self {
        Self {
            id: Some(id),
            entity,
            changed: ChangedFields::default(),
        }
    }

    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn entity(&self) -> &E {
        &self.entity
    }

    pub fn into_entity(self) -> E {
        self.entity
    }

    pub fn changed_fields(&self) -> &ChangedFields<E::Field> {
        &self.changed
    }

    /// Set the storage identity. Only the inserting data source calls this,
    /// and only once.
    pub fn assign_id(&mut self, id: RecordId) -> Result<(), ModelError> {
        if let Some(current) = self.id {
            return Err(ModelError::IdentityAlreadyAssigned {
                kind: E::KIND,
                current,
                attempted: id,
            });
        }
        self.id = Some(id);
        Ok(())
    }

    /// Forget pending mutations after a successful write.
    pub fn clear_changed_fields(&mut self) {
        self.changed.clear();
    }

    /// Precondition of insert: the record has no identity yet.
    pub fn ensure_new(&self) -> Result<(), ModelError> {
        match self.id {
            Some(id) => Err(ModelError::AlreadyPersisted { kind: E::KIND, id }),
            None => Ok(()),
        }
    }

    /// Precondition of update: the identity the update is keyed by.
    pub fn persisted_id(&self) -> Result<RecordId, ModelError> {
        self.id.ok_or(ModelError::NotPersisted { kind: E::KIND })
    }

    pub(crate) fn mutate(&mut self, field: E::Field, apply: impl FnOnce(&mut E)) {
        apply(&mut self.entity);
        self.changed.insert(field);
    }
}

impl<E: Entity> Deref for Record<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.entity
    }
}

impl<E: Entity + Serialize> Serialize for Record<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Projection<'a, T> {
            #[serde(skip_serializing_if = "Option::is_none")]
            id: Option<RecordId>,
            #[serde(flatten)]
            entity: &'a T,
        }

        let id = if E::EXPOSE_ID { self.id } else { None };
        Projection {
            id,
            entity: &self.entity,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn soup() -> MealType {
        MealType {
            user_id: RecordId(1),
            name: "Soup".into(),
            calories: 300.0,
            carbs: 0.0,
            proteins: 0.0,
            fat: 0.0,
        }
    }

    #[test]
    fn new_record_has_no_identity_and_no_changes() {
        let record = Record::new(soup());
        assert_eq!(record.id(), None);
        assert!(record.changed_fields().is_empty());
        assert_eq!(record.name, "Soup");
    }

    #[test]
    fn setters_track_fields_in_first_mutation_order() {
        let mut record = Record::new(soup());
        record.set_calories(250.0);
        record.set_name("Tomato soup");
        record.set_calories(260.0);

        assert_eq!(
            record.changed_fields().as_slice(),
            &[MealTypeField::Calories, MealTypeField::Name]
        );
        assert_eq!(record.changed_fields().columns(), ["calories", "name"]);
        assert_eq!(record.calories, 260.0);
    }

    #[test]
    fn identity_is_assigned_once() {
        let mut record = Record::new(soup());
        record.assign_id(RecordId(7)).expect("first assignment");
        let err = record.assign_id(RecordId(8)).expect_err("second assignment");
        assert_eq!(
            err,
            ModelError::IdentityAlreadyAssigned {
                kind: EntityKind::MealType,
                current: RecordId(7),
                attempted: RecordId(8),
            }
        );
        assert_eq!(record.id(), Some(RecordId(7)));
    }

    #[test]
    fn preconditions_follow_identity() {
        let fresh = Record::new(soup());
        assert!(fresh.ensure_new().is_ok());
        assert!(matches!(
            fresh.persisted_id(),
            Err(ModelError::NotPersisted { .. })
        ));

        let stored = Record::loaded(RecordId(3), soup());
        assert_eq!(stored.persisted_id(), Ok(RecordId(3)));
        assert!(matches!(
            stored.ensure_new(),
            Err(ModelError::AlreadyPersisted { id: RecordId(3), .. })
        ));
    }

    #[test]
    fn clear_changed_fields_empties_the_set() {
        let mut record = Record::loaded(RecordId(1), soup());
        record.set_fat(1.5);
        assert_eq!(record.changed_fields().len(), 1);
        record.clear_changed_fields();
        assert!(record.changed_fields().is_empty());
    }

    #[test]
    fn meal_type_projection_is_camel_case_with_id() {
        let record = Record::loaded(RecordId(4), soup());
        let json = serde_json::to_value(&record).expect("should serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "id": 4,
                "userId": 1,
                "name": "Soup",
                "calories": 300.0,
                "carbs": 0.0,
                "proteins": 0.0,
                "fat": 0.0,
            })
        );
    }

    fn apply(record: &mut Record<MealType>, op: u8) -> MealTypeField {
        match op % 5 {
            0 => {
                record.set_name("x");
                MealTypeField::Name
            }
            1 => {
                record.set_calories(1.0);
                MealTypeField::Calories
            }
            2 => {
                record.set_carbs(1.0);
                MealTypeField::Carbs
            }
            3 => {
                record.set_proteins(1.0);
                MealTypeField::Proteins
            }
            _ => {
                record.set_fat(1.0);
                MealTypeField::Fat
            }
        }
    }

    proptest! {
        #[test]
        fn changed_set_is_deduplicated_mutation_order(ops in proptest::collection::vec(any::<u8>(), 0..32)) {
            let mut record = Record::new(soup());
            let mut expected: Vec<MealTypeField> = Vec::new();
            for op in ops {
                let field = apply(&mut record, op);
                if !expected.contains(&field) {
                    expected.push(field);
                }
            }
            prop_assert_eq!(record.changed_fields().as_slice(), expected.as_slice());
        }
    }
}
