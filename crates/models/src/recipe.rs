use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::ModelError;
use crate::record::Record;

/// A shared recipe as persisted in the `recipes` collection.
///
/// `ingredients` holds the raw JSON list text exactly as submitted; it is
/// validated to parse on create and passed through untouched afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub ingredients: String,
    pub steps: String,
    pub duration: u32,
    pub servings: u32,
    pub dietary_preferences: String,
    pub calories: f64,
    pub fat: f64,
    pub carbohydrates: f64,
    pub protein: f64,
    pub like_count: i64,
    pub dislike_count: i64,
    pub final_ingredient_list: String,
    pub upload_date: DateTime<Utc>,
    pub image_url: Option<String>,
}

fn parse_u32(rec: &Record, name: &str) -> Result<u32, ModelError> {
    rec.require(name)?
        .parse()
        .map_err(|_| ModelError::Parse(format!("bad {name}: not an integer")))
}

fn parse_i64(rec: &Record, name: &str) -> Result<i64, ModelError> {
    rec.require(name)?
        .parse()
        .map_err(|_| ModelError::Parse(format!("bad {name}: not an integer")))
}

fn parse_f64(rec: &Record, name: &str) -> Result<f64, ModelError> {
    rec.require(name)?
        .parse()
        .map_err(|_| ModelError::Parse(format!("bad {name}: not a number")))
}

impl Recipe {
    pub fn to_record(&self) -> Record {
        Record::new()
            .with("id", self.id.to_string())
            .with("name", &self.name)
            .with("username", &self.username)
            .with("ingredients", &self.ingredients)
            .with("steps", &self.steps)
            .with("duration", self.duration.to_string())
            .with("servings", self.servings.to_string())
            .with("dietaryPreferences", &self.dietary_preferences)
            .with("calories", self.calories.to_string())
            .with("fat", self.fat.to_string())
            .with("carbohydrates", self.carbohydrates.to_string())
            .with("protein", self.protein.to_string())
            .with("likeCount", self.like_count.to_string())
            .with("dislikeCount", self.dislike_count.to_string())
            .with("finalIngredientList", &self.final_ingredient_list)
            .with("uploadDate", self.upload_date.to_rfc3339())
            // nullable column: absent image is the empty string
            .with("imageUrl", self.image_url.as_deref().unwrap_or(""))
    }

    pub fn from_record(rec: &Record) -> Result<Self, ModelError> {
        let id = rec
            .require("id")?
            .parse()
            .map_err(|_| ModelError::Parse("bad id: not a uuid".into()))?;
        let upload_date = DateTime::parse_from_rfc3339(rec.require("uploadDate")?)
            .map_err(|e| ModelError::Parse(format!("bad uploadDate: {e}")))?
            .with_timezone(&Utc);
        let image_url = match rec.require("imageUrl")? {
            "" => None,
            url => Some(url.to_string()),
        };
        Ok(Self {
            id,
            name: rec.require("name")?.to_string(),
            username: rec.require("username")?.to_string(),
            ingredients: rec.require("ingredients")?.to_string(),
            steps: rec.require("steps")?.to_string(),
            duration: parse_u32(rec, "duration")?,
            servings: parse_u32(rec, "servings")?,
            dietary_preferences: rec.require("dietaryPreferences")?.to_string(),
            calories: parse_f64(rec, "calories")?,
            fat: parse_f64(rec, "fat")?,
            carbohydrates: parse_f64(rec, "carbohydrates")?,
            protein: parse_f64(rec, "protein")?,
            like_count: parse_i64(rec, "likeCount")?,
            dislike_count: parse_i64(rec, "dislikeCount")?,
            final_ingredient_list: rec.require("finalIngredientList")?.to_string(),
            upload_date,
            image_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            name: "Shakshuka".into(),
            username: "alice".into(),
            ingredients: r#"[{"name":"eggs","amount":"4"},{"name":"tomatoes","amount":"6"}]"#.into(),
            steps: "Simmer tomatoes, crack eggs on top".into(),
            duration: 35,
            servings: 2,
            dietary_preferences: "vegetarian".into(),
            calories: 420.5,
            fat: 24.0,
            carbohydrates: 18.25,
            protein: 21.0,
            like_count: 0,
            dislike_count: 0,
            final_ingredient_list: "eggs, tomatoes, paprika".into(),
            upload_date: Utc::now(),
            image_url: None,
        }
    }

    #[test]
    fn record_round_trip_without_image() {
        let recipe = sample();
        let back = Recipe::from_record(&recipe.to_record()).unwrap();
        assert_eq!(back, recipe);
    }

    #[test]
    fn record_round_trip_with_image() {
        let mut recipe = sample();
        recipe.image_url = Some("https://recipe-share.s3.eu-central-1.amazonaws.com/recipes/images/1-x.png".into());
        let back = Recipe::from_record(&recipe.to_record()).unwrap();
        assert_eq!(back.image_url, recipe.image_url);
    }

    #[test]
    fn from_record_rejects_non_numeric_duration() {
        let rec = sample().to_record();
        let mut broken = Record::new();
        for name in rec.field_names() {
            let v = if name == "duration" { "abc" } else { rec.get(name).unwrap() };
            broken.push(name, v);
        }
        assert!(Recipe::from_record(&broken).is_err());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("dietaryPreferences").is_some());
        assert!(json.get("finalIngredientList").is_some());
        assert!(json.get("uploadDate").is_some());
        assert_eq!(json["likeCount"], 0);
    }
}
