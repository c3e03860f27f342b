//! Profile service: validation around the profile repository.

use tracing::info;

use parlor_types::error::ProfileError;
use parlor_types::profile::{Profile, ProfileFields, strip_reserved};

use crate::profile::repository::ProfileRepository;

/// Manages user profiles.
pub struct ProfileService<P: ProfileRepository> {
    repo: P,
}

impl<P: ProfileRepository> ProfileService<P> {
    pub fn new(repo: P) -> Self {
        Self { repo }
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, ProfileError> {
        Ok(self.repo.get_profile(user_id).await?)
    }

    /// Create or replace a profile. Store-owned keys in `fields` are dropped.
    pub async fn create_profile(
        &self,
        user_id: &str,
        fields: ProfileFields,
    ) -> Result<Profile, ProfileError> {
        let fields = strip_reserved(fields);
        let profile = self.repo.create_profile(user_id, &fields).await?;
        info!(user_id = %user_id, fields = fields.len(), "Profile saved");
        Ok(profile)
    }

    /// Merge fields into an existing profile.
    pub async fn update_profile(
        &self,
        user_id: &str,
        partial: ProfileFields,
    ) -> Result<Profile, ProfileError> {
        let partial = strip_reserved(partial);
        let profile = self
            .repo
            .update_profile(user_id, &partial)
            .await?
            .ok_or(ProfileError::NotFound)?;
        info!(user_id = %user_id, fields = partial.len(), "Profile updated");
        Ok(profile)
    }

    pub async fn delete_profile(&self, user_id: &str) -> Result<(), ProfileError> {
        if !self.repo.delete_profile(user_id).await? {
            return Err(ProfileError::NotFound);
        }
        info!(user_id = %user_id, "Profile deleted");
        Ok(())
    }
}
