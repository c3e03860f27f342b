//! Prompt catalog service.

use tracing::{debug, info};

use parlor_types::error::RepositoryError;
use parlor_types::prompt::PromptCatalog;

use crate::prompt::repository::PromptRepository;

/// Read-only view over the prompt catalog, seeded once at startup.
pub struct PromptService<R: PromptRepository> {
    repo: R,
}

impl<R: PromptRepository> PromptService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Seed the store with `catalog` unless it already holds prompts.
    pub async fn ensure_seeded(&self, catalog: &PromptCatalog) -> Result<bool, RepositoryError> {
        let seeded = self.repo.seed_catalog(catalog).await?;
        if seeded {
            info!(categories = catalog.categories.len(), "Prompt catalog seeded");
        } else {
            debug!("Prompt catalog already present, skipping seed");
        }
        Ok(seeded)
    }

    pub async fn catalog(&self) -> Result<PromptCatalog, RepositoryError> {
        self.repo.get_prompts().await
    }

    pub async fn prompts_in(&self, category: &str) -> Result<Vec<String>, RepositoryError> {
        self.repo.get_prompts_by_category(category).await
    }

    pub async fn categories(&self) -> Result<Vec<String>, RepositoryError> {
        self.repo.get_categories().await
    }
}
