//! Category CRUD.

use std::sync::Arc;

use stockroom_core::validation::{validate_category, validate_id};
use stockroom_core::{Category, CategoryRequest, CoreError};
use tracing::info;

use crate::error::ApiResult;
use crate::AppState;

/// Category service.
#[derive(Debug, Clone)]
pub struct CategoryService {
    state: Arc<AppState>,
}

impl CategoryService {
    pub fn new(state: Arc<AppState>) -> Self {
        CategoryService { state }
    }

    pub async fn create(&self, request: &CategoryRequest) -> ApiResult<Category> {
        let input = validate_category(request)?;
        let category = self.state.db.categories().insert(&input).await?;

        info!(category_id = category.id, "Category created");
        Ok(category)
    }

    /// All categories, newest first.
    pub async fn list(&self) -> ApiResult<Vec<Category>> {
        Ok(self.state.db.categories().list().await?)
    }

    pub async fn get(&self, id: i64) -> ApiResult<Category> {
        validate_id("id", id)?;

        self.state
            .db
            .categories()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::CategoryNotFound(id).into())
    }

    pub async fn update(&self, id: i64, request: &CategoryRequest) -> ApiResult<Category> {
        validate_id("id", id)?;
        let input = validate_category(request)?;

        let category = self.state.db.categories().update(id, &input).await?;

        info!(category_id = id, "Category updated");
        Ok(category)
    }

    /// Deletes a category. Refused with `Conflict` while products use it.
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        validate_id("id", id)?;

        self.state.db.categories().delete(id).await?;

        info!(category_id = id, "Category deleted");
        Ok(())
    }
}
