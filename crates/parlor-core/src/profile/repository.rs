//! ProfileRepository trait definition.

use parlor_types::error::RepositoryError;
use parlor_types::profile::{Profile, ProfileFields};

/// Repository trait for user profiles, at most one per user.
///
/// Implementations live in parlor-infra (e.g., `SqliteProfileRepository`).
pub trait ProfileRepository: Send + Sync {
    fn get_profile(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Profile>, RepositoryError>> + Send;

    /// Create or replace the user's profile with exactly `fields`.
    ///
    /// Both timestamps are reset to now.
    fn create_profile(
        &self,
        user_id: &str,
        fields: &ProfileFields,
    ) -> impl std::future::Future<Output = Result<Profile, RepositoryError>> + Send;

    /// Merge `partial` into an existing profile, key by key, and bump
    /// `updated_at`. Returns `None` when the user has no profile.
    fn update_profile(
        &self,
        user_id: &str,
        partial: &ProfileFields,
    ) -> impl std::future::Future<Output = Result<Option<Profile>, RepositoryError>> + Send;

    /// Returns `false` when the user had no profile.
    fn delete_profile(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
