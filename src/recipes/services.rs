use super::dto::{CreateRecipeRequest, RecipeView};
use super::repo_types::NewRecipe;
use crate::db::Store;
use crate::error::{ApiError, ApiResult};

pub const MIN_INSTRUCTIONS_CHARS: usize = 50;

/// Checks a create request and binds it to its owner.
pub fn validate(req: CreateRecipeRequest, user_id: i64) -> ApiResult<NewRecipe> {
    let title = match req.title {
        Some(t) if !t.trim().is_empty() => t,
        _ => return Err(ApiError::Validation("Title is required".into())),
    };
    let Some(instructions) = req.instructions.filter(|i| !i.is_empty()) else {
        return Err(ApiError::Validation("Instructions are required".into()));
    };
    if instructions.chars().count() < MIN_INSTRUCTIONS_CHARS {
        return Err(ApiError::Validation(format!(
            "Instructions must be at least {} characters long",
            MIN_INSTRUCTIONS_CHARS
        )));
    }
    Ok(NewRecipe {
        title,
        instructions,
        minutes_to_complete: req.minutes_to_complete,
        user_id,
    })
}

pub async fn list(store: &dyn Store) -> ApiResult<Vec<RecipeView>> {
    let rows = store.list_recipes().await?;
    Ok(rows.into_iter().map(RecipeView::from).collect())
}

pub async fn create(
    store: &dyn Store,
    req: CreateRecipeRequest,
    user_id: i64,
) -> ApiResult<RecipeView> {
    let new = validate(req, user_id)?;
    let row = store.create_recipe(new).await?;
    Ok(row.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(title: Option<&str>, instructions: Option<String>) -> CreateRecipeRequest {
        CreateRecipeRequest {
            title: title.map(str::to_owned),
            instructions,
            minutes_to_complete: Some(30),
        }
    }

    #[test]
    fn instructions_length_boundary() {
        let err = validate(req(Some("Soup"), Some("a".repeat(49))), 1).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let ok = validate(req(Some("Soup"), Some("a".repeat(50))), 1).unwrap();
        assert_eq!(ok.instructions.len(), 50);
        assert_eq!(ok.user_id, 1);
        assert_eq!(ok.minutes_to_complete, Some(30));
    }

    #[test]
    fn instructions_length_counts_characters_not_bytes() {
        // 49 two-byte characters is still too short
        let err = validate(req(Some("Crêpes"), Some("é".repeat(49))), 1).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(validate(req(Some("Crêpes"), Some("é".repeat(50))), 1).is_ok());
    }

    #[test]
    fn title_and_instructions_are_required() {
        let long = "x".repeat(60);
        for bad in [
            req(None, Some(long.clone())),
            req(Some("  "), Some(long.clone())),
            req(Some("Soup"), None),
            req(Some("Soup"), Some(String::new())),
        ] {
            assert!(matches!(validate(bad, 1), Err(ApiError::Validation(_))));
        }
    }

    #[test]
    fn minutes_to_complete_is_optional() {
        let mut r = req(Some("Toast"), Some("t".repeat(50)));
        r.minutes_to_complete = None;
        assert_eq!(validate(r, 3).unwrap().minutes_to_complete, None);
    }
}
