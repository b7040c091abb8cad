//! # Validation Module
//!
//! Input validation for Stockroom requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP layer                                                   │
//! │  └── JSON decoding (serde): shapes, enum values like "IN"/"OUT"        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, lengths, formats                                 │
//! │  └── Non-empty item lists, positive quantities and ids                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Inventory engine                                             │
//! │  └── Product existence, stock sufficiency (needs the database)         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE / FOREIGN KEY constraints                       │
//! │  └── CHECK (stock >= 0), CHECK (quantity > 0)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::validation::validate_transaction_request;
//! use stockroom_core::CreateTransactionRequest;
//!
//! let request = CreateTransactionRequest::inbound([(1, 5)]);
//! assert!(validate_transaction_request(&request).is_ok());
//!
//! let empty = CreateTransactionRequest::outbound([]);
//! assert!(validate_transaction_request(&empty).is_err());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::requests::{
    CategoryRequest, CreateTransactionRequest, LoginRequest, ProductRequest, ProfileInput,
    RegisterRequest,
};
use crate::types::Gender;
use crate::{MAX_NAME_LEN, MAX_TRANSACTION_ITEMS, MIN_PASSWORD_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Inventory Transactions
// =============================================================================

/// Validates the structure of an inventory transaction request.
///
/// ## Rules
/// - At least one line item, at most [`MAX_TRANSACTION_ITEMS`]
/// - Every `product_id` > 0
/// - Every `quantity` > 0
///
/// Repeated product ids are allowed; their effect is cumulative.
pub fn validate_transaction_request(request: &CreateTransactionRequest) -> ValidationResult<()> {
    if request.items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }

    if request.items.len() > MAX_TRANSACTION_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_TRANSACTION_ITEMS as i64,
        });
    }

    for (index, item) in request.items.iter().enumerate() {
        validate_id(&format!("items[{}].product_id", index), item.product_id)?;

        if item.quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: format!("items[{}].quantity", index),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Identifiers
// =============================================================================

/// Validates a store-assigned id (must be > 0).
pub fn validate_id(field: &str, id: i64) -> ValidationResult<()> {
    if id <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required free-text field and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most `max` characters
pub fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates an email address and returns it trimmed and lower-cased.
///
/// Deliberately shallow: one `@`, non-empty local part, a dot in the
/// domain. Deliverability is not our problem.
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = validate_text("email", email, 254)?.to_lowercase();

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@example.com".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }

    Ok(email)
}

/// Validates a plain-text password.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

/// Parses a `YYYY-MM-DD` birth date.
pub fn validate_date_of_birth(value: &str) -> ValidationResult<NaiveDate> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: "date_of_birth".to_string(),
        });
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::InvalidFormat {
        field: "date_of_birth".to_string(),
        reason: "expected YYYY-MM-DD".to_string(),
    })
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates registration or profile-update fields.
pub fn validate_profile(request: &RegisterRequest) -> ValidationResult<ProfileInput> {
    let first_name = validate_text("first_name", &request.first_name, MAX_NAME_LEN)?;
    let last_name = validate_text("last_name", &request.last_name, MAX_NAME_LEN)?;
    let email = validate_email(&request.email)?;
    validate_password(&request.password)?;
    let date_of_birth = validate_date_of_birth(&request.date_of_birth)?;
    let gender: Gender = request.gender.trim().parse()?;

    Ok(ProfileInput {
        first_name,
        last_name,
        email,
        password: request.password.clone(),
        date_of_birth,
        gender,
    })
}

/// Validates login fields. Only presence is checked; a short password just
/// fails to match.
pub fn validate_login(request: &LoginRequest) -> ValidationResult<String> {
    let email = validate_email(&request.email)?;

    if request.password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    Ok(email)
}

/// Validates a category body and returns it trimmed.
pub fn validate_category(request: &CategoryRequest) -> ValidationResult<CategoryRequest> {
    Ok(CategoryRequest {
        name: validate_text("name", &request.name, MAX_NAME_LEN)?,
        description: validate_text("description", &request.description, 2000)?,
    })
}

/// Validates a product body and returns it trimmed.
pub fn validate_product(request: &ProductRequest) -> ValidationResult<ProductRequest> {
    validate_id("category_id", request.category_id)?;

    Ok(ProductRequest {
        name: validate_text("name", &request.name, MAX_NAME_LEN)?,
        description: validate_text("description", &request.description, 2000)?,
        image_url: validate_text("image_url", &request.image_url, 2048)?,
        category_id: request.category_id,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests::LineItemRequest;

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            first_name: " Siti ".to_string(),
            last_name: "Rahma".to_string(),
            email: "Siti@Example.com".to_string(),
            password: "correct-horse".to_string(),
            date_of_birth: "1994-02-17".to_string(),
            gender: "P".to_string(),
        }
    }

    #[test]
    fn test_transaction_request_valid() {
        let request = CreateTransactionRequest::outbound([(1, 4), (1, 7), (2, 1)]);
        assert!(validate_transaction_request(&request).is_ok());
    }

    #[test]
    fn test_transaction_request_empty_items() {
        let request = CreateTransactionRequest::inbound([]);
        assert_eq!(
            validate_transaction_request(&request),
            Err(ValidationError::Empty {
                field: "items".to_string()
            })
        );
    }

    #[test]
    fn test_transaction_request_bad_quantity() {
        let request = CreateTransactionRequest::inbound([(1, 5), (2, 0)]);
        assert_eq!(
            validate_transaction_request(&request),
            Err(ValidationError::MustBePositive {
                field: "items[1].quantity".to_string()
            })
        );

        let request = CreateTransactionRequest::outbound([(1, -3)]);
        assert!(validate_transaction_request(&request).is_err());
    }

    #[test]
    fn test_transaction_request_bad_product_id() {
        let request = CreateTransactionRequest::inbound([(0, 1)]);
        assert!(matches!(
            validate_transaction_request(&request),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_transaction_request_too_many_items() {
        let request = CreateTransactionRequest {
            transaction_type: crate::TransactionType::In,
            items: vec![LineItemRequest::new(1, 1); MAX_TRANSACTION_ITEMS + 1],
        };
        assert!(matches!(
            validate_transaction_request(&request),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(" A@B.co ").unwrap(), "a@b.co");
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@localhost").is_err());
        assert!(validate_email("a@@example.com").is_err());
        assert!(validate_email("a b@example.com").is_err());
    }

    #[test]
    fn test_validate_profile() {
        let input = validate_profile(&register_request()).unwrap();
        assert_eq!(input.first_name, "Siti");
        assert_eq!(input.email, "siti@example.com");
        assert_eq!(input.gender, Gender::Female);
        assert_eq!(input.date_of_birth, NaiveDate::from_ymd_opt(1994, 2, 17).unwrap());
    }

    #[test]
    fn test_validate_profile_rejects_bad_fields() {
        let mut request = register_request();
        request.gender = "X".to_string();
        assert!(matches!(
            validate_profile(&request),
            Err(ValidationError::NotAllowed { .. })
        ));

        let mut request = register_request();
        request.date_of_birth = "17/02/1994".to_string();
        assert!(matches!(
            validate_profile(&request),
            Err(ValidationError::InvalidFormat { .. })
        ));

        let mut request = register_request();
        request.password = "short".to_string();
        assert!(matches!(
            validate_profile(&request),
            Err(ValidationError::TooShort { .. })
        ));
    }

    #[test]
    fn test_validate_product() {
        let request = ProductRequest {
            name: "  Kopi Arabika ".to_string(),
            description: "250g".to_string(),
            image_url: "https://img.example.com/kopi.png".to_string(),
            category_id: 3,
        };
        assert_eq!(validate_product(&request).unwrap().name, "Kopi Arabika");

        let request = ProductRequest {
            category_id: 0,
            ..request
        };
        assert!(validate_product(&request).is_err());
    }

    #[test]
    fn test_validate_text_limits() {
        assert!(validate_text("name", "   ", 10).is_err());
        assert!(validate_text("name", &"x".repeat(11), 10).is_err());
        assert_eq!(validate_text("name", "ok", 10).unwrap(), "ok");
    }
}
