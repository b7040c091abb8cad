//! # Stockroom API
//!
//! Application services for the Stockroom inventory system. An HTTP router
//! decodes a request, resolves the bearer token through [`AuthService`],
//! calls one service method and wraps the result in an [`ApiResponse`].
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Stockroom Services                              │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  AuthService   │  │  UserService   │  │  TransactionService        ││
//! │  │                │  │                │  │                            ││
//! │  │ • register     │  │ • profile      │  │ • create  (engine)         ││
//! │  │ • login        │  │ • update       │  │ • history (by initiator)   ││
//! │  │ • authenticate │  │                │  │ • get                      ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐                                │
//! │  │CategoryService │  │ ProductService │                                │
//! │  │ • CRUD         │  │ • CRUD         │  (stock is read-only here)    │
//! │  └────────────────┘  └────────────────┘                                │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  AppState: Database (stockroom-db) • ApiConfig • JwtManager      │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config::ApiConfig`]):
//! - `DATABASE_PATH` - SQLite file (default: ./stockroom.db)
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `DB_BUSY_TIMEOUT_MS` - Lock wait per statement (default: 5000)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_LIFETIME_SECS` - Token lifetime (default: 86400)
//! - `TRANSACTION_DEADLINE_MS` - Optional inventory transaction deadline

pub mod auth;
pub mod config;
pub mod error;
pub mod response;
pub mod services;

use std::sync::Arc;

use stockroom_db::Database;
use tracing_subscriber::EnvFilter;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use response::ApiResponse;
pub use services::{
    auth_service::AuthService, category_service::CategoryService,
    product_service::ProductService, transaction_service::TransactionService,
    user_service::UserService,
};

use crate::auth::JwtManager;

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    pub db: Database,
    pub config: ApiConfig,
    pub jwt: JwtManager,
}

impl AppState {
    /// Opens the database described by `config` and builds the state.
    pub async fn connect(config: ApiConfig) -> ApiResult<Self> {
        let db = Database::new(config.db_config()).await?;
        Ok(Self::with_database(db, config))
    }

    /// Builds the state around an already open database.
    pub fn with_database(db: Database, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_lifetime_secs);
        AppState { db, config, jwt }
    }
}

/// Entry point to every service, sharing one [`AppState`].
#[derive(Debug, Clone)]
pub struct Services {
    state: Arc<AppState>,
}

impl Services {
    pub fn new(state: AppState) -> Self {
        Services {
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.state.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.state.clone())
    }

    pub fn categories(&self) -> CategoryService {
        CategoryService::new(self.state.clone())
    }

    pub fn products(&self) -> ProductService {
        ProductService::new(self.state.clone())
    }

    pub fn transactions(&self) -> TransactionService {
        TransactionService::new(self.state.clone())
    }
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info` with quieter sqlx.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stockroom=debug,sqlx=warn"));

    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
