// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use nutrilog_core::model::UserField;
use nutrilog_core::traits::SingleLookup;
use nutrilog_core::{
    DataSource, EntityKind, HealthStatus, Lookup, NutrilogError, Record, RecordId,
    ResourceMutexManager, User, UserSource,
};
use rusqlite::types::Value;

use super::table::SqliteTable;
use super::SourceOptions;
use crate::database::Database;

const INSERT: &str = "INSERT INTO users \
    (user_name, pwd, email, first_name, last_name, birth_date, weight, gender, height) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";
const COLUMNS: &str =
    "id, user_name, pwd, email, first_name, last_name, birth_date, weight, gender, height";

/// Accounts stored in the `users` table. Name and email lookups ignore case.
pub struct SqliteUserSource {
    name: String,
    metric: u32,
    authoritative: bool,
    table: SqliteTable,
}

impl SqliteUserSource {
    pub fn new(db: Database, locks: ResourceMutexManager, options: SourceOptions) -> Self {
        let table = EntityKind::User.table();
        Self {
            name: options.resolve_name(table),
            metric: options.metric,
            authoritative: options.authoritative,
            table: SqliteTable::new(db, locks, table),
        }
    }

    pub fn database(&self) -> &Database {
        self.table.database()
    }

    async fn select_where(
        &self,
        condition: &str,
        value: Value,
    ) -> Result<SingleLookup<User>, NutrilogError> {
        let sql = format!("SELECT {COLUMNS} FROM users WHERE {condition}");
        let row = self.table.select_one(&sql, vec![value], from_row).await?;
        Ok(Lookup::row(row, self.authoritative))
    }
}

fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record<User>> {
    Ok(Record::loaded(
        RecordId(row.get("id")?),
        User {
            user_name: row.get("user_name")?,
            pwd: row.get("pwd")?,
            email: row.get("email")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            birth_date: row.get("birth_date")?,
            weight: row.get("weight")?,
            gender: row.get("gender")?,
            height: row.get("height")?,
        },
    ))
}

fn column_value(user: &User, field: UserField) -> Value {
    match field {
        UserField::UserName => user.user_name.clone().into(),
        UserField::Pwd => user.pwd.clone().into(),
        UserField::Email => user.email.clone().into(),
        UserField::FirstName => user.first_name.clone().into(),
        UserField::LastName => user.last_name.clone().into(),
        UserField::BirthDate => user.birth_date.into(),
        UserField::Weight => user.weight.into(),
        UserField::Gender => user.gender.clone().into(),
        UserField::Height => user.height.into(),
    }
}

#[async_trait]
impl DataSource for SqliteUserSource {
    type Entity = User;

    fn name(&self) -> &str {
        &self.name
    }

    fn metric(&self) -> u32 {
        self.metric
    }

    async fn insert(&self, record: &mut Record<User>) -> Result<RecordId, NutrilogError> {
        let values: Vec<Value> = vec![
            record.user_name.clone().into(),
            record.pwd.clone().into(),
            record.email.clone().into(),
            record.first_name.clone().into(),
            record.last_name.clone().into(),
            record.birth_date.into(),
            record.weight.into(),
            record.gender.clone().into(),
            record.height.into(),
        ];
        self.table.insert(record, INSERT, values).await
    }

    async fn update(&self, record: &mut Record<User>) -> Result<(), NutrilogError> {
        self.table.update(record, column_value).await
    }

    async fn health_check(&self) -> Result<HealthStatus, NutrilogError> {
        self.table.health_check().await
    }
}

#[async_trait]
impl UserSource for SqliteUserSource {
    async fn find_by_id(&self, id: RecordId) -> Result<SingleLookup<User>, NutrilogError> {
        self.select_where("id = ?", id.get().into()).await
    }

    async fn find_by_name(&self, user_name: &str) -> Result<SingleLookup<User>, NutrilogError> {
        self.select_where("user_name = ? COLLATE NOCASE", user_name.to_string().into())
            .await
    }

    async fn find_by_email(&self, email: &str) -> Result<SingleLookup<User>, NutrilogError> {
        self.select_where("email = ? COLLATE NOCASE", email.to_string().into())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::testing::open_db;
    use nutrilog_core::BackendError;
    use tempfile::tempdir;

    fn alice() -> User {
        User {
            user_name: "Alice".into(),
            pwd: "hash".into(),
            email: "alice@example.org".into(),
            first_name: "Alice".into(),
            last_name: "Liddell".into(),
            birth_date: 0,
            weight: 58.5,
            gender: "f".into(),
            height: 1.68,
        }
    }

    async fn source(dir: &tempfile::TempDir) -> SqliteUserSource {
        SqliteUserSource::new(
            open_db(dir).await,
            ResourceMutexManager::new(),
            SourceOptions::default(),
        )
    }

    #[tokio::test]
    async fn lookups_ignore_case() {
        let dir = tempdir().unwrap();
        let source = source(&dir).await;
        let mut record = Record::new(alice());
        let id = source.insert(&mut record).await.unwrap();

        let by_name = source.find_by_name("aLiCe").await.unwrap().found().flatten();
        assert_eq!(by_name.map(|u| u.id()), Some(Some(id)));

        let by_email = source
            .find_by_email("ALICE@EXAMPLE.ORG")
            .await
            .unwrap()
            .found()
            .flatten();
        assert_eq!(by_email, Some(record));
    }

    #[tokio::test]
    async fn duplicate_user_name_conflicts() {
        let dir = tempdir().unwrap();
        let source = source(&dir).await;
        source.insert(&mut Record::new(alice())).await.unwrap();

        let mut twin = Record::new(User {
            user_name: "ALICE".into(),
            email: "other@example.org".into(),
            ..alice()
        });
        let err = source.insert(&mut twin).await.unwrap_err();
        assert_eq!(err.code(), Some(BackendError::CONFLICT));
        assert!(!twin.is_persisted());
    }

    #[tokio::test]
    async fn unknown_user_passes_to_next_tier() {
        let dir = tempdir().unwrap();
        let source = source(&dir).await;
        assert_eq!(
            source.find_by_name("nobody").await.unwrap(),
            Lookup::NotFoundHere
        );
    }

    #[tokio::test]
    async fn password_change_is_persisted() {
        let dir = tempdir().unwrap();
        let source = source(&dir).await;
        let mut record = Record::new(alice());
        let id = source.insert(&mut record).await.unwrap();

        record.set_pwd("new-hash");
        source.update(&mut record).await.unwrap();

        let stored = source.find_by_id(id).await.unwrap().found().flatten().unwrap();
        assert_eq!(stored.pwd, "new-hash");
    }
}
