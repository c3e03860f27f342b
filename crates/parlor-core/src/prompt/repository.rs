//! PromptRepository trait definition.

use parlor_types::error::RepositoryError;
use parlor_types::prompt::PromptCatalog;

/// Read access to the prompt catalog plus one-time seeding.
///
/// Implementations live in parlor-infra (e.g., `SqlitePromptRepository`).
pub trait PromptRepository: Send + Sync {
    /// The whole catalog in category order.
    fn get_prompts(
        &self,
    ) -> impl std::future::Future<Output = Result<PromptCatalog, RepositoryError>> + Send;

    /// Prompts of one category. Empty for an unknown category.
    fn get_prompts_by_category(
        &self,
        category: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>, RepositoryError>> + Send;

    /// Category names in catalog order.
    fn get_categories(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<String>, RepositoryError>> + Send;

    /// Store `catalog` if the store holds no prompts yet.
    ///
    /// Returns whether anything was written.
    fn seed_catalog(
        &self,
        catalog: &PromptCatalog,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
