use serde::{Deserialize, Serialize};

use super::repo_types::RecipeRow;
use crate::auth::dto::PublicUser;

#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub title: Option<String>,
    pub instructions: Option<String>,
    pub minutes_to_complete: Option<i32>,
}

/// A recipe with its owner embedded.
#[derive(Debug, Serialize)]
pub struct RecipeView {
    pub id: i64,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: Option<i32>,
    pub user: PublicUser,
}

impl From<RecipeRow> for RecipeView {
    fn from(r: RecipeRow) -> Self {
        Self {
            id: r.id,
            title: r.title,
            instructions: r.instructions,
            minutes_to_complete: r.minutes_to_complete,
            user: PublicUser {
                id: r.user_id,
                username: r.username,
                image_url: r.image_url,
                bio: r.bio,
            },
        }
    }
}
