/// Error Handling Module
///
/// Every failure in the service maps onto `AppError`, which is composed of
/// smaller domain enums:
/// 1. Input validation errors (field level, safe to show the caller)
/// 2. Credential store errors (never leaked past a generic message)
/// 3. Authentication / authorization errors
/// 4. Configuration errors (fatal at startup)
///
/// `ErrorHandler` turns an `AppError` into a status code plus a JSON body and
/// logs it with the right severity.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Validation errors for input data
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyField(&'static str),
    TooShort(&'static str, usize),
    TooLong(&'static str, usize),
    InvalidFormat(&'static str),
    SuspiciousContent(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
            ValidationError::SuspiciousContent(field) => {
                write!(f, "{} contains suspicious content", field)
            }
        }
    }
}

impl StdError for ValidationError {}

/// Credential / document store errors
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// A storage-level uniqueness constraint rejected the write
    UniqueViolation(String),
    /// The call did not finish inside the per-operation deadline
    Timeout,
    Connection(String),
    Query(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::UniqueViolation(msg) => write!(f, "Duplicate entry: {}", msg),
            StoreError::Timeout => write!(f, "Store operation timed out"),
            StoreError::Connection(msg) => write!(f, "Store connection error: {}", msg),
            StoreError::Query(msg) => write!(f, "Store query error: {}", msg),
        }
    }
}

impl StdError for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            // 23505 = unique_violation
            if db_err.code().as_deref() == Some("23505") {
                return StoreError::UniqueViolation(db_err.message().to_string());
            }
        }

        match err {
            sqlx::Error::PoolTimedOut => StoreError::Timeout,
            sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                StoreError::Connection(err.to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    MissingRequired(String),
    InvalidValue(String),
    ParseError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(msg) => write!(f, "Missing required config: {}", msg),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Config parse error: {}", msg),
        }
    }
}

impl StdError for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Authentication and authorization errors
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// Unknown email or wrong password; the two are never told apart
    InvalidCredentials,
    DuplicateEmail,
    TokenExpired,
    TokenInvalid,
    /// No bearer token / refresh cookie on the request
    MissingToken,
    /// Refresh token not accepted (not the stored one, or no such user)
    Unauthorized,
    Forbidden,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::DuplicateEmail => write!(f, "Email already registered"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::TokenInvalid => write!(f, "Invalid token"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::Unauthorized => write!(f, "Refresh token not accepted"),
            AuthError::Forbidden => write!(f, "Insufficient permissions"),
        }
    }
}

impl StdError for AuthError {}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

/// Central error type that all application errors map to
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Store(StoreError),
    Auth(AuthError),
    Config(ConfigError),
    Hashing(String),
    NotFound(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Store(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Config(e) => write!(f, "{}", e),
            AppError::Hashing(msg) => write!(f, "Password hashing error: {}", msg),
            AppError::NotFound(what) => write!(f, "{} not found", what),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl AppError {
    /// The authentication error kind, if this is one.
    pub fn auth_kind(&self) -> Option<&AuthError> {
        match self {
            AppError::Auth(e) => Some(e),
            _ => None,
        }
    }
}

// ============================================================================
// FROM IMPLEMENTATIONS
// ============================================================================

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let (status, code, message) = match self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),

            AppError::Store(e) => match e {
                StoreError::Timeout => (
                    StatusCode::GATEWAY_TIMEOUT,
                    "STORE_TIMEOUT",
                    "Storage did not respond in time".to_string(),
                ),
                StoreError::Connection(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Storage temporarily unavailable".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "Storage error occurred".to_string(),
                ),
            },

            // Token failures collapse to one message so callers cannot probe them
            AppError::Auth(e) => match e {
                AuthError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_CREDENTIALS",
                    "Invalid credentials".to_string(),
                ),
                AuthError::DuplicateEmail => (
                    StatusCode::BAD_REQUEST,
                    "DUPLICATE_EMAIL",
                    "Email already registered".to_string(),
                ),
                AuthError::TokenExpired | AuthError::TokenInvalid | AuthError::Unauthorized => (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHENTICATED",
                    "Invalid or expired token".to_string(),
                ),
                AuthError::MissingToken => (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHENTICATED",
                    "Missing authentication token".to_string(),
                ),
                AuthError::Forbidden => (
                    StatusCode::FORBIDDEN,
                    "FORBIDDEN",
                    "Insufficient permissions".to_string(),
                ),
            },

            AppError::NotFound(what) => (StatusCode::NOT_FOUND, "NOT_FOUND", format!("{} not found", what)),

            AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                "Server configuration error".to_string(),
            ),

            AppError::Hashing(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        };

        let error_response =
            ErrorResponse::new(request_id.to_string(), message, code.to_string(), status.as_u16());

        (status, error_response)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Validation error");
            }
            AppError::Store(e) => {
                tracing::error!(request_id = request_id, error = %e, "Store error");
            }
            AppError::Auth(AuthError::InvalidCredentials) => {
                tracing::warn!(request_id = request_id, "Invalid credentials attempt");
            }
            AppError::Auth(AuthError::DuplicateEmail) => {
                tracing::warn!(request_id = request_id, "Duplicate registration attempt");
            }
            AppError::Auth(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Authentication error");
            }
            AppError::NotFound(what) => {
                tracing::debug!(request_id = request_id, resource = %what, "Resource not found");
            }
            AppError::Config(e) => {
                tracing::error!(request_id = request_id, error = %e, "Configuration error");
            }
            AppError::Hashing(msg) => {
                tracing::error!(request_id = request_id, error = %msg, "Password hashing error");
            }
            AppError::Internal(msg) => {
                tracing::error!(request_id = request_id, error = %msg, "Internal error");
            }
        }
    }
}

/// Implement ResponseError for Actix-web integration
impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &request_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        <Self as ErrorHandler>::error_response(self, "").0
    }
}

// ============================================================================
// 4. ERROR CONTEXT ENRICHMENT
// ============================================================================

/// Error context for flow-level logging
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub user_id: Option<String>,
    pub operation: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            operation: operation.into(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn log_error(&self, error: &AppError) {
        match error {
            AppError::Validation(_) | AppError::Auth(_) | AppError::NotFound(_) => {
                tracing::warn!(
                    request_id = %self.request_id,
                    operation = %self.operation,
                    user_id = ?self.user_id,
                    error = %error,
                    "Operation rejected"
                );
            }
            _ => {
                tracing::error!(
                    request_id = %self.request_id,
                    operation = %self.operation,
                    user_id = ?self.user_id,
                    error = %error,
                    "Operation failed"
                );
            }
        }
    }
}
