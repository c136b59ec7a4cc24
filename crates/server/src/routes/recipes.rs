use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde_json::{json, Value};

use models::recipe::Recipe;
use service::errors::ServiceError;
use service::recipe::domain::{CreateRecipeInput, DeleteRecipesInput, UploadedImage};

use crate::errors::ApiError;
use crate::routes::ServerState;

/// Form part carrying the optional image upload.
const IMAGE_PART: &str = "image";

fn bad_part(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError(ServiceError::Validation(format!("bad multipart body: {e}")))
}

/// Accepts a multipart form: one text part per recipe field plus an
/// optional `image` file part.
pub async fn create(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Result<Json<Recipe>, ApiError> {
    let mut input = CreateRecipeInput::default();
    let mut image: Option<UploadedImage> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_part)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == IMAGE_PART {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type =
                field.content_type().unwrap_or("application/octet-stream").to_string();
            let bytes = field.bytes().await.map_err(bad_part)?;
            if !bytes.is_empty() {
                image = Some(UploadedImage { file_name, content_type, bytes });
            }
            continue;
        }
        let value = field.text().await.map_err(bad_part)?;
        match name.as_str() {
            "username" => input.username = value,
            "name" => input.name = value,
            "ingredients" => input.ingredients = value,
            "steps" => input.steps = value,
            "duration" => input.duration = value,
            "servings" => input.servings = value,
            "dietaryPreferences" => input.dietary_preferences = value,
            "calories" => input.calories = value,
            "fat" => input.fat = value,
            "carbohydrates" => input.carbohydrates = value,
            "protein" => input.protein = value,
            "finalIngredientList" => input.final_ingredient_list = value,
            // unknown parts are ignored rather than rejected
            _ => {}
        }
    }

    let recipe = state.recipes.create(input, image).await?;
    Ok(Json(recipe))
}

pub async fn list_all(State(state): State<ServerState>) -> Result<Json<Vec<Recipe>>, ApiError> {
    let recipes = state.recipes.list().await?;
    Ok(Json(recipes))
}

pub async fn list_by_owner(
    State(state): State<ServerState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let recipes = state.recipes.list_by_owner(&username).await?;
    Ok(Json(recipes))
}

pub async fn delete_by_owner(
    State(state): State<ServerState>,
    Path(username): Path<String>,
    Json(input): Json<DeleteRecipesInput>,
) -> Result<Json<Value>, ApiError> {
    state.recipes.delete_by_owner(&username, &input.ids).await?;
    Ok(Json(json!({"message": "Recipes deleted successfully"})))
}
