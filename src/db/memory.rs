use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::auth::repo_types::{NewUser, SessionRecord, User};
use crate::recipes::repo_types::{NewRecipe, RecipeRow};

struct StoredRecipe {
    id: i64,
    title: String,
    instructions: String,
    minutes_to_complete: Option<i32>,
    user_id: i64,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    recipes: Vec<StoredRecipe>,
    sessions: HashMap<Uuid, SessionRecord>,
}

/// In-process store used by tests; mirrors the Postgres constraints.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub async fn user_count(&self) -> usize {
        self.tables.lock().await.users.len()
    }

    pub async fn session_count(&self) -> usize {
        self.tables.lock().await.sessions.len()
    }

    pub async fn remove_user(&self, id: i64) {
        let mut t = self.tables.lock().await;
        t.users.retain(|u| u.id != id);
    }

    pub async fn expire_session(&self, id: Uuid) {
        let mut t = self.tables.lock().await;
        if let Some(s) = t.sessions.get_mut(&id) {
            s.expires_at = OffsetDateTime::now_utc() - time::Duration::seconds(1);
        }
    }
}

fn join(recipe: &StoredRecipe, users: &[User]) -> anyhow::Result<RecipeRow> {
    let owner = users
        .iter()
        .find(|u| u.id == recipe.user_id)
        .ok_or_else(|| anyhow::anyhow!("recipe {} references missing user", recipe.id))?;
    Ok(RecipeRow {
        id: recipe.id,
        title: recipe.title.clone(),
        instructions: recipe.instructions.clone(),
        minutes_to_complete: recipe.minutes_to_complete,
        user_id: owner.id,
        username: owner.username.clone(),
        image_url: owner.image_url.clone(),
        bio: owner.bio.clone(),
    })
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut t = self.tables.lock().await;
        if t.users.iter().any(|u| u.username == new.username) {
            return Err(StoreError::Conflict);
        }
        let id = t.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let user = User {
            id,
            username: new.username,
            password: new.password,
            image_url: new.image_url,
            bio: new.bio,
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn create_session(
        &self,
        user_id: i64,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<SessionRecord> {
        let mut t = self.tables.lock().await;
        anyhow::ensure!(
            t.users.iter().any(|u| u.id == user_id),
            "session references missing user {}",
            user_id
        );
        let session = SessionRecord {
            id: Uuid::new_v4(),
            user_id,
            expires_at,
        };
        t.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_session(&self, id: Uuid) -> anyhow::Result<Option<SessionRecord>> {
        Ok(self.tables.lock().await.sessions.get(&id).cloned())
    }

    async fn touch_session(&self, id: Uuid, expires_at: OffsetDateTime) -> anyhow::Result<()> {
        if let Some(s) = self.tables.lock().await.sessions.get_mut(&id) {
            s.expires_at = expires_at;
        }
        Ok(())
    }

    async fn delete_session(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.tables.lock().await.sessions.remove(&id).is_some())
    }

    async fn list_recipes(&self) -> anyhow::Result<Vec<RecipeRow>> {
        let t = self.tables.lock().await;
        t.recipes.iter().map(|r| join(r, &t.users)).collect()
    }

    async fn create_recipe(&self, new: NewRecipe) -> anyhow::Result<RecipeRow> {
        let mut t = self.tables.lock().await;
        anyhow::ensure!(
            t.users.iter().any(|u| u.id == new.user_id),
            "recipe references missing user {}",
            new.user_id
        );
        let recipe = StoredRecipe {
            id: t.recipes.len() as i64 + 1,
            title: new.title,
            instructions: new.instructions,
            minutes_to_complete: new.minutes_to_complete,
            user_id: new.user_id,
        };
        let row = join(&recipe, &t.users)?;
        t.recipes.push(recipe);
        Ok(row)
    }
}
