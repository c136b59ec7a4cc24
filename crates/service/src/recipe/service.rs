use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use models::recipe::Recipe;
use tracing::{info, instrument};
use uuid::Uuid;

use super::domain::{CreateRecipeInput, UploadedImage};
use crate::errors::ServiceError;
use crate::storage::blob_store::BlobStore;
use crate::storage::record_store::RecordStore;

/// Collection blob holding all shared recipes.
pub const RECIPES_COLLECTION: &str = "recipes/recipe.csv";

/// Key namespace for uploaded recipe images.
const IMAGES_PREFIX: &str = "recipes/images";

/// Recipe business service independent of web framework
pub struct RecipeService {
    store: Arc<RecordStore>,
    blobs: Arc<dyn BlobStore>,
}

impl RecipeService {
    pub fn new(store: Arc<RecordStore>, blobs: Arc<dyn BlobStore>) -> Arc<Self> {
        Arc::new(Self { store, blobs })
    }

    /// Validate a submission, store the optional image, append the recipe.
    #[instrument(skip(self, input, image), fields(username = %input.username, name = %input.name))]
    pub async fn create(
        &self,
        input: CreateRecipeInput,
        image: Option<UploadedImage>,
    ) -> Result<Recipe, ServiceError> {
        let amounts = input.validate()?;

        let image_url = match image {
            Some(img) => Some(self.store_image(img).await?),
            None => None,
        };

        let recipe = Recipe {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            username: input.username.trim().to_string(),
            ingredients: input.ingredients.trim().to_string(),
            steps: input.steps.trim().to_string(),
            duration: amounts.duration,
            servings: amounts.servings,
            dietary_preferences: input.dietary_preferences.trim().to_string(),
            calories: amounts.calories,
            fat: amounts.fat,
            carbohydrates: amounts.carbohydrates,
            protein: amounts.protein,
            like_count: 0,
            dislike_count: 0,
            final_ingredient_list: input.final_ingredient_list.trim().to_string(),
            upload_date: Utc::now(),
            image_url,
        };

        let stored = recipe.to_record();
        self.store
            .mutate(RECIPES_COLLECTION, move |mut records| {
                records.push(stored);
                Ok(records)
            })
            .await?;

        info!(recipe_id = %recipe.id, "recipe_created");
        Ok(recipe)
    }

    /// All recipes; `NotFound` when no recipe was ever stored.
    pub async fn list(&self) -> Result<Vec<Recipe>, ServiceError> {
        let records = self.store.load_required(RECIPES_COLLECTION, "recipes").await?;
        records
            .iter()
            .map(|rec| Recipe::from_record(rec).map_err(Into::into))
            .collect()
    }

    /// Recipes owned by `username`; `NotFound` when the filter comes back
    /// empty, matching the collection-absent case from the caller's view.
    pub async fn list_by_owner(&self, username: &str) -> Result<Vec<Recipe>, ServiceError> {
        let owned: Vec<Recipe> = self
            .list()
            .await?
            .into_iter()
            .filter(|r| r.username == username)
            .collect();
        if owned.is_empty() {
            return Err(ServiceError::NotFound(format!("no recipes found for {username}")));
        }
        Ok(owned)
    }

    /// Delete the caller's recipes with the given ids. Records owned by
    /// other users survive even when their id is listed. The rewritten
    /// collection is persisted unconditionally, matched or not.
    #[instrument(skip(self, ids), fields(username = %username))]
    pub async fn delete_by_owner(&self, username: &str, ids: &[String]) -> Result<(), ServiceError> {
        if ids.is_empty() {
            return Err(ServiceError::Validation("ids must not be empty".into()));
        }
        let ids: HashSet<&str> = ids.iter().map(String::as_str).collect();

        let mut dropped = 0usize;
        self.store
            .mutate_existing(RECIPES_COLLECTION, "recipes", |records| {
                let before = records.len();
                let remaining: Vec<_> = records
                    .into_iter()
                    .filter(|rec| {
                        rec.get("username") != Some(username)
                            || rec.get("id").map_or(true, |id| !ids.contains(id))
                    })
                    .collect();
                dropped = before - remaining.len();
                Ok(remaining)
            })
            .await?;

        info!(dropped, "recipes_deleted");
        Ok(())
    }

    async fn store_image(&self, image: UploadedImage) -> Result<String, ServiceError> {
        let key = format!(
            "{IMAGES_PREFIX}/{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_file_name(&image.file_name)
        );
        self.blobs.write(&key, image.bytes, &image.content_type).await?;
        Ok(self.blobs.public_url(&key))
    }
}

/// Collapse anything outside `[A-Za-z0-9._-]` so the original filename can
/// never introduce separators or traversal into the object key.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();
    let trimmed = cleaned.trim_matches(['.', '_']);
    if trimmed.is_empty() { "upload".to_string() } else { trimmed.to_string() }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::recipe::domain::CreateRecipeInput;
    use crate::storage::blob_store::memory::MemoryBlobStore;

    fn services() -> (Arc<RecipeService>, Arc<RecordStore>) {
        let blobs = MemoryBlobStore::new();
        let store = RecordStore::new(Arc::clone(&blobs) as Arc<dyn BlobStore>);
        (RecipeService::new(Arc::clone(&store), blobs), store)
    }

    fn submission(username: &str, name: &str) -> CreateRecipeInput {
        CreateRecipeInput {
            username: username.into(),
            name: name.into(),
            ingredients: r#"[{"name":"eggs","amount":"4"}]"#.into(),
            steps: "Whisk and fry".into(),
            duration: "10".into(),
            servings: "1".into(),
            dietary_preferences: "vegetarian".into(),
            calories: "250".into(),
            fat: "18".into(),
            carbohydrates: "2".into(),
            protein: "16".into(),
            final_ingredient_list: "eggs, butter".into(),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_persists() -> Result<(), anyhow::Error> {
        let (svc, _) = services();
        let recipe = svc.create(submission("alice", "Omelette"), None).await?;
        assert_eq!(recipe.like_count, 0);
        assert_eq!(recipe.image_url, None);

        let listed = svc.list().await?;
        assert_eq!(listed, vec![recipe]);
        Ok(())
    }

    #[tokio::test]
    async fn create_with_image_records_public_url() -> Result<(), anyhow::Error> {
        let (svc, _) = services();
        let image = UploadedImage {
            file_name: "my dish!.png".into(),
            content_type: "image/png".into(),
            bytes: Bytes::from_static(b"\x89PNG"),
        };
        let recipe = svc.create(submission("alice", "Omelette"), Some(image)).await?;

        let url = recipe.image_url.expect("image url recorded");
        assert!(url.starts_with("https://test-bucket.s3.eu-central-1.amazonaws.com/recipes/images/"));
        assert!(url.ends_with("-my_dish_.png"));
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_bad_ingredients() {
        let (svc, _) = services();
        let mut input = submission("alice", "Omelette");
        input.ingredients = "not json".into();
        assert!(matches!(svc.create(input, None).await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn list_on_absent_collection_is_not_found() {
        let (svc, _) = services();
        assert!(matches!(svc.list().await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_by_owner_filters_exactly() -> Result<(), anyhow::Error> {
        let (svc, _) = services();
        svc.create(submission("alice", "Omelette"), None).await?;
        svc.create(submission("bob", "Stew"), None).await?;

        let mine = svc.list_by_owner("alice").await?;
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "Omelette");
        Ok(())
    }

    #[tokio::test]
    async fn list_by_owner_without_matches_is_not_found() -> Result<(), anyhow::Error> {
        let (svc, _) = services();
        svc.create(submission("alice", "Omelette"), None).await?;
        assert!(matches!(svc.list_by_owner("carol").await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn delete_by_owner_only_touches_owned_listed_ids() -> Result<(), anyhow::Error> {
        let (svc, _) = services();
        let r1 = svc.create(submission("alice", "Omelette"), None).await?;
        let r2 = svc.create(submission("alice", "Frittata"), None).await?;
        let r3 = svc.create(submission("bob", "Stew"), None).await?;

        // r2 is alice's but not listed; r3 is listed but owned by bob
        svc.delete_by_owner("alice", &[r1.id.to_string(), r3.id.to_string()]).await?;

        let remaining = svc.list().await?;
        let ids: Vec<Uuid> = remaining.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![r2.id, r3.id]);
        Ok(())
    }

    #[tokio::test]
    async fn delete_with_no_matches_still_rewrites() -> Result<(), anyhow::Error> {
        let (svc, store) = services();
        svc.create(submission("alice", "Omelette"), None).await?;

        svc.delete_by_owner("alice", &[Uuid::new_v4().to_string()]).await?;
        assert_eq!(store.load_collection(RECIPES_COLLECTION).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn delete_requires_ids() {
        let (svc, _) = services();
        assert!(matches!(
            svc.delete_by_owner("alice", &[]).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn delete_on_absent_collection_is_not_found() {
        let (svc, _) = services();
        let result = svc.delete_by_owner("alice", &["x".to_string()]).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn sanitize_keeps_safe_chars_only() {
        assert_eq!(sanitize_file_name("my dish!.png"), "my_dish_.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_file_name("é"), "upload");
    }
}
