//! Product catalog CRUD.
//!
//! Stock is visible here but never writable: products start at zero and
//! only move through [`TransactionService::create`](super::transaction_service::TransactionService::create).

use std::sync::Arc;

use stockroom_core::validation::{validate_id, validate_product};
use stockroom_core::{CoreError, Product, ProductRequest};
use tracing::info;

use crate::error::ApiResult;
use crate::AppState;

/// Product service.
#[derive(Debug, Clone)]
pub struct ProductService {
    state: Arc<AppState>,
}

impl ProductService {
    pub fn new(state: Arc<AppState>) -> Self {
        ProductService { state }
    }

    /// Creates a product with zero stock in an existing category.
    pub async fn create(&self, request: &ProductRequest) -> ApiResult<Product> {
        let input = validate_product(request)?;
        self.ensure_category(input.category_id).await?;

        let product = self.state.db.products().insert(&input).await?;

        info!(product_id = product.id, category_id = product.category_id, "Product created");
        Ok(product)
    }

    /// All products, newest first.
    pub async fn list(&self) -> ApiResult<Vec<Product>> {
        Ok(self.state.db.products().list().await?)
    }

    pub async fn get(&self, id: i64) -> ApiResult<Product> {
        validate_id("id", id)?;

        self.state
            .db
            .products()
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id).into())
    }

    /// Updates catalog fields; stock is untouched.
    pub async fn update(&self, id: i64, request: &ProductRequest) -> ApiResult<Product> {
        validate_id("id", id)?;
        let input = validate_product(request)?;
        self.ensure_category(input.category_id).await?;

        let product = self.state.db.products().update(id, &input).await?;

        info!(product_id = id, "Product updated");
        Ok(product)
    }

    /// Deletes a product. Refused with `Conflict` once it has transaction history.
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        validate_id("id", id)?;

        self.state.db.products().delete(id).await?;

        info!(product_id = id, "Product deleted");
        Ok(())
    }

    async fn ensure_category(&self, category_id: i64) -> ApiResult<()> {
        if !self.state.db.categories().exists(category_id).await? {
            return Err(CoreError::CategoryNotFound(category_id).into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorCode;
    use crate::test_support::{services, user};
    use crate::Services;
    use stockroom_core::{CategoryRequest, CreateTransactionRequest, ProductRequest};

    async fn category(services: &Services) -> i64 {
        services
            .categories()
            .create(&CategoryRequest {
                name: "Bakery".to_string(),
                description: "Bread".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    fn request(name: &str, category_id: i64) -> ProductRequest {
        ProductRequest {
            name: name.to_string(),
            description: "Sourdough loaf".to_string(),
            image_url: "https://img.example.com/bread.png".to_string(),
            category_id,
        }
    }

    #[tokio::test]
    async fn test_create_and_update() {
        let services = services().await;
        let category_id = category(&services).await;
        let products = services.products();

        let product = products.create(&request("Loaf", category_id)).await.unwrap();
        assert_eq!(product.stock, 0);

        let updated = products.update(product.id, &request("Big Loaf", category_id)).await.unwrap();
        assert_eq!(updated.name, "Big Loaf");
        assert_eq!(products.get(product.id).await.unwrap(), updated);
        assert_eq!(products.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_category() {
        let services = services().await;

        let err = services.products().create(&request("Loaf", 5)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(err.message.contains("Category"));
    }

    #[tokio::test]
    async fn test_delete_with_history_is_conflict() {
        let services = services().await;
        let user_id = user(&services, "baker@example.com").await;
        let category_id = category(&services).await;

        let product = services.products().create(&request("Loaf", category_id)).await.unwrap();
        services
            .transactions()
            .create(user_id, &CreateTransactionRequest::inbound([(product.id, 3)]))
            .await
            .unwrap();

        let err = services.products().delete(product.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(services.products().get(product.id).await.unwrap().stock, 3);

        let fresh = services.products().create(&request("Bun", category_id)).await.unwrap();
        services.products().delete(fresh.id).await.unwrap();
        assert_eq!(
            services.products().get(fresh.id).await.unwrap_err().status(),
            404
        );
    }
}
