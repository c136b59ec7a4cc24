use bytes::Bytes;
use serde::Deserialize;

use crate::errors::ServiceError;

/// Raw recipe submission as the HTTP layer hands it over: every field is
/// text until validated. Missing form parts arrive as empty strings.
#[derive(Debug, Clone, Default)]
pub struct CreateRecipeInput {
    pub username: String,
    pub name: String,
    pub ingredients: String,
    pub steps: String,
    pub duration: String,
    pub servings: String,
    pub dietary_preferences: String,
    pub calories: String,
    pub fat: String,
    pub carbohydrates: String,
    pub protein: String,
    pub final_ingredient_list: String,
}

/// Numeric payload extracted from a validated submission.
#[derive(Debug, Clone, Copy)]
pub struct RecipeAmounts {
    pub duration: u32,
    pub servings: u32,
    pub calories: f64,
    pub fat: f64,
    pub carbohydrates: f64,
    pub protein: f64,
}

impl CreateRecipeInput {
    /// Check required fields and numeric constraints; return the parsed
    /// amounts on success.
    pub fn validate(&self) -> Result<RecipeAmounts, ServiceError> {
        required(&self.username, "username")?;
        required(&self.name, "name")?;
        required(&self.steps, "steps")?;
        required(&self.dietary_preferences, "dietaryPreferences")?;
        required(&self.final_ingredient_list, "finalIngredientList")?;

        let ingredients = required(&self.ingredients, "ingredients")?;
        let parsed: Result<serde_json::Value, _> = serde_json::from_str(ingredients);
        if !parsed.map(|v| v.is_array()).unwrap_or(false) {
            return Err(ServiceError::Validation("ingredients must be a JSON list".into()));
        }

        Ok(RecipeAmounts {
            duration: positive_int(&self.duration, "duration")?,
            servings: positive_int(&self.servings, "servings")?,
            calories: non_negative(&self.calories, "calories")?,
            fat: non_negative(&self.fat, "fat")?,
            carbohydrates: non_negative(&self.carbohydrates, "carbohydrates")?,
            protein: non_negative(&self.protein, "protein")?,
        })
    }
}

/// An uploaded image payload: raw bytes plus the declared MIME type and
/// the original filename from the form part.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Body of a bulk delete request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeleteRecipesInput {
    pub ids: Vec<String>,
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(format!("{field} is required")));
    }
    Ok(trimmed)
}

fn positive_int(value: &str, field: &str) -> Result<u32, ServiceError> {
    let n: u32 = required(value, field)?
        .parse()
        .map_err(|_| ServiceError::Validation(format!("{field} must be a positive integer")))?;
    if n == 0 {
        return Err(ServiceError::Validation(format!("{field} must be a positive integer")));
    }
    Ok(n)
}

fn non_negative(value: &str, field: &str) -> Result<f64, ServiceError> {
    let n: f64 = required(value, field)?
        .parse()
        .map_err(|_| ServiceError::Validation(format!("{field} must be a number")))?;
    if !n.is_finite() || n < 0.0 {
        return Err(ServiceError::Validation(format!("{field} must be non-negative")));
    }
    Ok(n)
}
