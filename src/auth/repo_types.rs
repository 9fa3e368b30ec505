use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::password::HashedPassword;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[sqlx(rename = "password_hash")]
    pub password: HashedPassword, // argon2 PHC string, never exposed
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

/// Fields needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: HashedPassword,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

/// Server-side half of a session; the signed cookie references `id`.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRecord {
    pub id: Uuid,
    pub user_id: i64,
    pub expires_at: OffsetDateTime,
}

impl SessionRecord {
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}
