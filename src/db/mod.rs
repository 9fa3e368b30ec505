use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, SessionRecord, User};
use crate::recipes::repo_types::{NewRecipe, RecipeRow};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    Conflict,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Persistence seam for users, sessions and recipes.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn find_user_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;
    /// Fails with [`StoreError::Conflict`] when the username is taken.
    async fn create_user(&self, new: NewUser) -> Result<User, StoreError>;

    async fn create_session(
        &self,
        user_id: i64,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<SessionRecord>;
    async fn find_session(&self, id: Uuid) -> anyhow::Result<Option<SessionRecord>>;
    async fn touch_session(&self, id: Uuid, expires_at: OffsetDateTime) -> anyhow::Result<()>;
    /// Returns whether a row was removed.
    async fn delete_session(&self, id: Uuid) -> anyhow::Result<bool>;

    async fn list_recipes(&self) -> anyhow::Result<Vec<RecipeRow>>;
    async fn create_recipe(&self, new: NewRecipe) -> anyhow::Result<RecipeRow>;
}
