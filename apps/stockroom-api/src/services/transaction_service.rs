//! Inventory transactions: create through the engine, read the history.

use std::sync::Arc;

use stockroom_core::validation::validate_id;
use stockroom_core::{CreateTransactionRequest, TransactionRecord};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Transaction service.
#[derive(Debug, Clone)]
pub struct TransactionService {
    state: Arc<AppState>,
}

impl TransactionService {
    pub fn new(state: Arc<AppState>) -> Self {
        TransactionService { state }
    }

    /// Records a transaction for the authenticated initiator and returns
    /// the new header id. Applies the configured deadline, if any.
    pub async fn create(
        &self,
        initiator_id: i64,
        request: &CreateTransactionRequest,
    ) -> ApiResult<i64> {
        let inventory = self.state.db.inventory();

        let header_id = match self.state.config.transaction_deadline() {
            Some(deadline) => {
                inventory
                    .create_transaction_within(request, initiator_id, deadline)
                    .await?
            }
            None => inventory.create_transaction(request, initiator_id).await?,
        };

        Ok(header_id)
    }

    /// Every transaction the initiator created, newest first.
    pub async fn history(&self, initiator_id: i64) -> ApiResult<Vec<TransactionRecord>> {
        validate_id("initiator_id", initiator_id)?;

        let records = self.state.db.transactions().get_by_initiator(initiator_id).await?;

        debug!(initiator_id, count = records.len(), "Transaction history loaded");
        Ok(records)
    }

    /// One of the initiator's own transactions.
    ///
    /// Someone else's transaction reads as not found.
    pub async fn get(&self, initiator_id: i64, header_id: i64) -> ApiResult<TransactionRecord> {
        validate_id("id", header_id)?;

        match self.state.db.transactions().get_by_id(header_id).await? {
            Some(record) if record.header.initiator_id == initiator_id => Ok(record),
            _ => Err(ApiError::not_found("Transaction", header_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorCode;
    use crate::response::ApiResponse;
    use crate::test_support::{services, user};
    use crate::Services;
    use stockroom_core::{CategoryRequest, CreateTransactionRequest, ProductRequest, TransactionType};

    async fn product(services: &Services) -> i64 {
        let category = services
            .categories()
            .create(&CategoryRequest {
                name: "Produce".to_string(),
                description: "Fresh".to_string(),
            })
            .await
            .unwrap();
        services
            .products()
            .create(&ProductRequest {
                name: "Mango".to_string(),
                description: "Harum manis".to_string(),
                image_url: "https://img.example.com/mango.png".to_string(),
                category_id: category.id,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_and_history() {
        let services = services().await;
        let user_id = user(&services, "clerk@example.com").await;
        let p = product(&services).await;
        let transactions = services.transactions();

        let first = transactions
            .create(user_id, &CreateTransactionRequest::inbound([(p, 10)]))
            .await
            .unwrap();
        let second = transactions
            .create(user_id, &CreateTransactionRequest::outbound([(p, 4)]))
            .await
            .unwrap();

        let history = transactions.history(user_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].header.id, second);
        assert_eq!(history[0].header.transaction_type, TransactionType::Out);
        assert_eq!(history[1].header.id, first);

        assert_eq!(services.products().get(p).await.unwrap().stock, 6);

        let record = transactions.get(user_id, first).await.unwrap();
        assert_eq!(record.items[0].quantity, 10);
    }

    #[tokio::test]
    async fn test_insufficient_stock_envelope() {
        let services = services().await;
        let user_id = user(&services, "clerk@example.com").await;
        let p = product(&services).await;
        let transactions = services.transactions();

        transactions
            .create(user_id, &CreateTransactionRequest::inbound([(p, 10)]))
            .await
            .unwrap();

        let result = transactions
            .create(user_id, &CreateTransactionRequest::outbound([(p, 4), (p, 7)]))
            .await;
        let (status, body) = ApiResponse::respond(result, 201, "Transaction created");

        assert_eq!(status, 422);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["responseCode"], "01");
        assert_eq!(
            json["message"],
            format!("Insufficient stock for product {}: available 6, requested 7", p)
        );

        assert_eq!(services.products().get(p).await.unwrap().stock, 10);
        assert_eq!(transactions.history(user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_items_is_validation_error() {
        let services = services().await;
        let user_id = user(&services, "clerk@example.com").await;

        let err = services
            .transactions()
            .create(user_id, &CreateTransactionRequest::outbound([]))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.errors[0].field, "items");
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let services = services().await;
        let user_id = user(&services, "clerk@example.com").await;

        let err = services
            .transactions()
            .create(user_id, &CreateTransactionRequest::inbound([(404, 1)]))
            .await
            .unwrap_err();

        assert_eq!(err.status(), 404);
    }

    #[tokio::test]
    async fn test_other_users_transaction_is_hidden() {
        let services = services().await;
        let owner = user(&services, "owner@example.com").await;
        let other = user(&services, "other@example.com").await;
        let p = product(&services).await;

        let header_id = services
            .transactions()
            .create(owner, &CreateTransactionRequest::inbound([(p, 1)]))
            .await
            .unwrap();

        assert_eq!(
            services.transactions().get(other, header_id).await.unwrap_err().code,
            ErrorCode::NotFound
        );
        assert!(services.transactions().history(other).await.unwrap().is_empty());
    }
}
