use sqlx::FromRow;

/// Fields needed to insert a recipe.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: Option<i32>,
    pub user_id: i64,
}

/// A recipe joined with its owner's public columns.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeRow {
    pub id: i64,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: Option<i32>,
    pub user_id: i64,
    pub username: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}
