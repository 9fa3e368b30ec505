use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument};

use super::dto::{CreateRecipeRequest, RecipeView};
use super::services;
use crate::{
    auth::session::SessionUser,
    error::{ApiResult, AppJson},
    state::AppState,
};

pub fn recipe_routes() -> Router<AppState> {
    Router::new().route("/recipes", get(list_recipes).post(create_recipe))
}

#[instrument(skip_all, fields(user_id = session.user.id))]
pub async fn list_recipes(
    State(state): State<AppState>,
    session: SessionUser,
) -> ApiResult<Json<Vec<RecipeView>>> {
    let recipes = services::list(state.store.as_ref()).await?;
    Ok(Json(recipes))
}

#[instrument(skip_all, fields(user_id = session.user.id))]
pub async fn create_recipe(
    State(state): State<AppState>,
    session: SessionUser,
    AppJson(payload): AppJson<CreateRecipeRequest>,
) -> ApiResult<(StatusCode, Json<RecipeView>)> {
    let recipe = services::create(state.store.as_ref(), payload, session.user.id).await?;
    info!(recipe_id = recipe.id, title = %recipe.title, "recipe created");
    Ok((StatusCode::CREATED, Json(recipe)))
}
