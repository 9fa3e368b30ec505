use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::auth::repo_types::{NewUser, SessionRecord, User};
use crate::config::AppConfig;
use crate::recipes::repo_types::{NewRecipe, RecipeRow};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

fn insert_user_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StoreError::Conflict;
        }
    }
    StoreError::Other(anyhow::Error::new(e).context("insert user"))
}

#[async_trait]
impl Store for PgStore {
    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, image_url, bio
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("find user by username")?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, image_url, bio
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, image_url, bio)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, image_url, bio
            "#,
        )
        .bind(&new.username)
        .bind(&new.password)
        .bind(&new.image_url)
        .bind(&new.bio)
        .fetch_one(&self.pool)
        .await
        .map_err(insert_user_error)
    }

    async fn create_session(
        &self,
        user_id: i64,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<SessionRecord> {
        let session = sqlx::query_as::<_, SessionRecord>(
            r#"
            INSERT INTO sessions (id, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, expires_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await
        .context("insert session")?;
        Ok(session)
    }

    async fn find_session(&self, id: Uuid) -> anyhow::Result<Option<SessionRecord>> {
        let session = sqlx::query_as::<_, SessionRecord>(
            r#"
            SELECT id, user_id, expires_at
            FROM sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("find session")?;
        Ok(session)
    }

    async fn touch_session(&self, id: Uuid, expires_at: OffsetDateTime) -> anyhow::Result<()> {
        sqlx::query("UPDATE sessions SET expires_at = $2 WHERE id = $1")
            .bind(id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .context("touch session")?;
        Ok(())
    }

    async fn delete_session(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("delete session")?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_recipes(&self) -> anyhow::Result<Vec<RecipeRow>> {
        let rows = sqlx::query_as::<_, RecipeRow>(
            r#"
            SELECT r.id, r.title, r.instructions, r.minutes_to_complete, r.user_id,
                   u.username, u.image_url, u.bio
              FROM recipes r
              JOIN users u ON u.id = r.user_id
             ORDER BY r.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("list recipes")?;
        Ok(rows)
    }

    async fn create_recipe(&self, new: NewRecipe) -> anyhow::Result<RecipeRow> {
        let row = sqlx::query_as::<_, RecipeRow>(
            r#"
            WITH inserted AS (
                INSERT INTO recipes (title, instructions, minutes_to_complete, user_id)
                VALUES ($1, $2, $3, $4)
                RETURNING id, title, instructions, minutes_to_complete, user_id
            )
            SELECT i.id, i.title, i.instructions, i.minutes_to_complete, i.user_id,
                   u.username, u.image_url, u.bio
              FROM inserted i
              JOIN users u ON u.id = i.user_id
            "#,
        )
        .bind(&new.title)
        .bind(&new.instructions)
        .bind(new.minutes_to_complete)
        .bind(new.user_id)
        .fetch_one(&self.pool)
        .await
        .context("insert recipe")?;
        Ok(row)
    }
}
