//! SQLite prompt catalog repository.

use sqlx::Row;

use parlor_core::prompt::repository::PromptRepository;
use parlor_types::error::RepositoryError;
use parlor_types::prompt::{PromptCatalog, PromptCategory};

use super::pool::DatabasePool;
use super::query_error;

/// SQLite-backed implementation of `PromptRepository`.
#[derive(Clone)]
pub struct SqlitePromptRepository {
    pool: DatabasePool,
}

impl SqlitePromptRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl PromptRepository for SqlitePromptRepository {
    async fn get_prompts(&self) -> Result<PromptCatalog, RepositoryError> {
        let rows = sqlx::query(
            "SELECT category, prompt FROM prompt_templates
             ORDER BY category_position ASC, position ASC",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let mut catalog = PromptCatalog::default();
        for row in &rows {
            let category: String = row.try_get("category").map_err(query_error)?;
            let prompt: String = row.try_get("prompt").map_err(query_error)?;
            match catalog.categories.last_mut() {
                Some(last) if last.name == category => last.prompts.push(prompt),
                _ => catalog.categories.push(PromptCategory {
                    name: category,
                    prompts: vec![prompt],
                }),
            }
        }
        Ok(catalog)
    }

    async fn get_prompts_by_category(&self, category: &str) -> Result<Vec<String>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT prompt FROM prompt_templates WHERE category = ? ORDER BY position ASC",
        )
        .bind(category)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter()
            .map(|row| row.try_get("prompt").map_err(query_error))
            .collect()
    }

    async fn get_categories(&self) -> Result<Vec<String>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT category FROM prompt_templates
             GROUP BY category ORDER BY MIN(category_position) ASC",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter()
            .map(|row| row.try_get("category").map_err(query_error))
            .collect()
    }

    async fn seed_catalog(&self, catalog: &PromptCatalog) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM prompt_templates")
            .fetch_one(&mut *tx)
            .await
            .map_err(query_error)?;
        if existing > 0 || catalog.is_empty() {
            return Ok(false);
        }

        for (category_position, category) in catalog.categories.iter().enumerate() {
            for (position, prompt) in category.prompts.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO prompt_templates (category, category_position, position, prompt)
                     VALUES (?, ?, ?, ?)",
                )
                .bind(&category.name)
                .bind(category_position as i64)
                .bind(position as i64)
                .bind(prompt)
                .execute(&mut *tx)
                .await
                .map_err(query_error)?;
            }
        }

        tx.commit().await.map_err(query_error)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::test_pool;

    #[tokio::test]
    async fn test_seed_then_read_back_builtin_catalog() {
        let repo = SqlitePromptRepository::new(test_pool().await);
        let builtin = PromptCatalog::builtin();

        assert!(repo.seed_catalog(&builtin).await.unwrap());
        assert_eq!(repo.get_prompts().await.unwrap(), builtin);
        assert_eq!(repo.get_categories().await.unwrap(), builtin.category_names());
        assert_eq!(
            repo.get_prompts_by_category("meal_planner").await.unwrap(),
            builtin.category("meal_planner").unwrap().prompts
        );
    }

    #[tokio::test]
    async fn test_seed_only_once() {
        let repo = SqlitePromptRepository::new(test_pool().await);
        assert!(repo.seed_catalog(&PromptCatalog::builtin()).await.unwrap());

        let other: PromptCatalog = serde_json::from_str(r#"{"misc": ["x"]}"#).unwrap();
        assert!(!repo.seed_catalog(&other).await.unwrap());
        assert_eq!(repo.get_categories().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_unknown_category_and_empty_store() {
        let repo = SqlitePromptRepository::new(test_pool().await);
        assert!(repo.get_prompts().await.unwrap().is_empty());
        assert!(repo.get_categories().await.unwrap().is_empty());
        assert!(repo.get_prompts_by_category("qna").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_category_is_not_stored() {
        let repo = SqlitePromptRepository::new(test_pool().await);
        let catalog: PromptCatalog =
            serde_json::from_str(r#"{"empty": [], "full": ["a", "b"]}"#).unwrap();
        repo.seed_catalog(&catalog).await.unwrap();
        assert_eq!(repo.get_categories().await.unwrap(), vec!["full"]);
    }
}
