//! SQLite profile repository implementation.
//!
//! Profile fields are stored as one JSON object per user. Updates read,
//! merge, and write back inside a writer transaction.

use chrono::Utc;
use sqlx::Row;

use parlor_core::profile::repository::ProfileRepository;
use parlor_types::error::RepositoryError;
use parlor_types::profile::{Profile, ProfileFields};

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `ProfileRepository`.
#[derive(Clone)]
pub struct SqliteProfileRepository {
    pool: DatabasePool,
}

impl SqliteProfileRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct ProfileRow {
    user_id: String,
    fields: String,
    created_at: String,
    updated_at: String,
}

impl ProfileRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            user_id: row.try_get("user_id")?,
            fields: row.try_get("fields")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_profile(self) -> Result<Profile, RepositoryError> {
        Ok(Profile {
            fields: decode_fields(&self.fields)?,
            user_id: self.user_id,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn decode_fields(json: &str) -> Result<ProfileFields, RepositoryError> {
    serde_json::from_str(json)
        .map_err(|e| RepositoryError::Query(format!("invalid profile fields: {e}")))
}

fn encode_fields(fields: &ProfileFields) -> Result<String, RepositoryError> {
    serde_json::to_string(fields)
        .map_err(|e| RepositoryError::Query(format!("unencodable profile fields: {e}")))
}

impl ProfileRepository for SqliteProfileRepository {
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let profile_row = ProfileRow::from_row(&row).map_err(query_error)?;
                Ok(Some(profile_row.into_profile()?))
            }
            None => Ok(None),
        }
    }

    async fn create_profile(
        &self,
        user_id: &str,
        fields: &ProfileFields,
    ) -> Result<Profile, RepositoryError> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO profiles (user_id, fields, created_at, updated_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                fields = excluded.fields,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at",
        )
        .bind(user_id)
        .bind(encode_fields(fields)?)
        .bind(format_datetime(&now))
        .bind(format_datetime(&now))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(Profile {
            user_id: user_id.to_string(),
            fields: fields.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_profile(
        &self,
        user_id: &str,
        partial: &ProfileFields,
    ) -> Result<Option<Profile>, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let row = sqlx::query("SELECT * FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_error)?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut profile = ProfileRow::from_row(&row)
            .map_err(query_error)?
            .into_profile()?;
        for (key, value) in partial {
            profile.fields.insert(key.clone(), value.clone());
        }
        profile.updated_at = Utc::now();

        sqlx::query("UPDATE profiles SET fields = ?, updated_at = ? WHERE user_id = ?")
            .bind(encode_fields(&profile.fields)?)
            .bind(format_datetime(&profile.updated_at))
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;
        Ok(Some(profile))
    }

    async fn delete_profile(&self, user_id: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::test_pool;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> ProfileFields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_absent_profile_is_none() {
        let repo = SqliteProfileRepository::new(test_pool().await);
        assert!(repo.get_profile("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_replaces_existing_profile() {
        let repo = SqliteProfileRepository::new(test_pool().await);
        repo.create_profile("u1", &fields(json!({"name": "Asha", "age": 29})))
            .await
            .unwrap();
        repo.create_profile("u1", &fields(json!({"name": "Ravi"})))
            .await
            .unwrap();

        let profile = repo.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.fields, fields(json!({"name": "Ravi"})));
        assert_eq!(profile.user_id, "u1");
    }

    #[tokio::test]
    async fn test_update_merges_per_field() {
        let repo = SqliteProfileRepository::new(test_pool().await);
        let created = repo
            .create_profile(
                "u1",
                &fields(json!({"name": "Asha", "goals": ["run"], "ai_tone": "casual"})),
            )
            .await
            .unwrap();

        let updated = repo
            .update_profile("u1", &fields(json!({"goals": ["swim", "lift"], "age": 30})))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            updated.fields,
            fields(json!({
                "name": "Asha",
                "goals": ["swim", "lift"],
                "ai_tone": "casual",
                "age": 30
            }))
        );
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let stored = repo.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(stored.fields, updated.fields);
    }

    #[tokio::test]
    async fn test_update_missing_profile_returns_none() {
        let repo = SqliteProfileRepository::new(test_pool().await);
        let result = repo
            .update_profile("ghost", &fields(json!({"name": "x"})))
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(repo.get_profile("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_profile() {
        let repo = SqliteProfileRepository::new(test_pool().await);
        repo.create_profile("u1", &fields(json!({"name": "Asha"})))
            .await
            .unwrap();
        assert!(repo.delete_profile("u1").await.unwrap());
        assert!(!repo.delete_profile("u1").await.unwrap());
    }
}
