use std::error::Error as StdError;
use std::fmt;

use auth::JwtError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::checkout::errors::CheckoutError;
use crate::coupon::errors::CouponError;
use crate::session::errors::AuthError;
use crate::session::errors::SessionError;
use crate::user::errors::UserError;

/// Failure category of an HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Conflict,
    InvalidCredentials,
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    BadRequest,
    Internal,
}

impl ApiErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ApiErrorKind::Conflict
            | ApiErrorKind::InvalidCredentials
            | ApiErrorKind::Validation
            | ApiErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ApiErrorKind::NotFound => StatusCode::NOT_FOUND,
            ApiErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error returned by handlers and middleware.
///
/// `message` is what the client sees. `cause` is the internal error chain,
/// exposed as `stack` outside production only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    pub cause: Option<String>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: &(dyn StdError + 'static)) -> Self {
        self.cause = Some(error_chain(cause));
        self
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unauthorized, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::BadRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Internal, message)
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    fn stack(&self) -> String {
        let head = format!("{:?}: {}", self.kind, self.message);
        match &self.cause {
            Some(cause) => format!("{}\n    caused by: {}", head, cause),
            None => head,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status().as_u16(), self.message)
    }
}

/// Render an error and its sources as one line per level.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        chain.push_str("\n    caused by: ");
        chain.push_str(&inner.to_string());
        source = inner.source();
    }
    chain
}

/// JSON error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Attached to every error response so the normalizer can log it and, when
/// allowed, re-render the body with the stack included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub kind: ApiErrorKind,
    pub status: StatusCode,
    pub message: String,
    pub stack: String,
}

impl ErrorReport {
    pub fn body(&self, expose_stack: bool) -> ApiErrorBody {
        ApiErrorBody {
            success: false,
            error: self.message.clone(),
            stack: expose_stack.then(|| self.stack.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let report = ErrorReport {
            kind: self.kind,
            status: self.status(),
            stack: self.stack(),
            message: self.message,
        };

        let mut response = (report.status, Json(report.body(false))).into_response();
        response.extensions_mut().insert(report);
        response
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        let api_error = match &err {
            UserError::InvalidUserId(_) => ApiError::not_found("Resource not found"),
            UserError::EmailAlreadyExists(_) => {
                ApiError::bad_request("Duplicate field value entered")
            }
            UserError::Validation(_) => ApiError::new(ApiErrorKind::Validation, err.to_string()),
            UserError::DatabaseError(_) => ApiError::internal(err.to_string()),
        };
        api_error.with_cause(&err)
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        let api_error = match &err {
            JwtError::TokenExpired => ApiError::unauthorized("Token expired"),
            JwtError::InvalidToken(_) => ApiError::unauthorized("Invalid token"),
            JwtError::EncodingFailed(_) => ApiError::internal(err.to_string()),
        };
        api_error.with_cause(&err)
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::User(inner) => inner.into(),
            SessionError::Token(inner) => inner.into(),
            SessionError::UserAlreadyExists => {
                ApiError::new(ApiErrorKind::Conflict, err.to_string())
            }
            SessionError::InvalidCredentials => {
                ApiError::new(ApiErrorKind::InvalidCredentials, err.to_string())
            }
            SessionError::MissingRefreshToken
            | SessionError::RefreshTokenExpired
            | SessionError::InvalidRefreshToken => ApiError::unauthorized(err.to_string()),
            SessionError::Store(_) | SessionError::Password(_) => {
                ApiError::internal(err.to_string()).with_cause(&err)
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Lookup(inner) => inner.into(),
            AuthError::Forbidden(_) => ApiError::new(ApiErrorKind::Forbidden, err.to_string()),
            AuthError::MissingAccessToken
            | AuthError::AccessTokenExpired
            | AuthError::InvalidAccessToken
            | AuthError::UserNotFound => ApiError::unauthorized(err.to_string()),
        }
    }
}

impl From<CouponError> for ApiError {
    fn from(err: CouponError) -> Self {
        match &err {
            CouponError::MissingCode => ApiError::new(ApiErrorKind::Validation, err.to_string()),
            CouponError::NotFound => ApiError::not_found(err.to_string()),
            CouponError::Expired => ApiError::bad_request(err.to_string()),
            CouponError::DatabaseError(_) => ApiError::internal(err.to_string()).with_cause(&err),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match &err {
            CheckoutError::Coupon(inner) => inner.clone().into(),
            CheckoutError::EmptyCart
            | CheckoutError::AmountOutOfRange
            | CheckoutError::PaymentNotCompleted => {
                ApiError::bad_request(err.to_string())
            }
            CheckoutError::InvalidItem(_) => {
                ApiError::new(ApiErrorKind::Validation, err.to_string())
            }
            CheckoutError::SessionNotFound => ApiError::not_found(err.to_string()),
            CheckoutError::DuplicateOrder(_) => {
                ApiError::bad_request("Duplicate field value entered").with_cause(&err)
            }
            CheckoutError::MalformedMetadata(_)
            | CheckoutError::Gateway(_)
            | CheckoutError::DatabaseError(_) => ApiError::internal(err.to_string()).with_cause(&err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text()).with_cause(&rejection)
    }
}
