//! Authentication utilities library
//!
//! Provides the token and credential primitives used by the storefront service:
//! - Password hashing (Argon2id)
//! - JWT encoding and verification
//! - Access/refresh token pair issuance with distinct signing secrets
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Token Pairs
//! ```
//! use auth::{TokenIssuer, TokenLifetimes};
//!
//! let issuer = TokenIssuer::new(
//!     b"access_secret_key_at_least_32_bytes!",
//!     b"refresh_secret_key_at_least_32_bytes",
//!     TokenLifetimes::default(),
//! );
//!
//! let pair = issuer.issue("user123").unwrap();
//! let claims = issuer.verify_access(&pair.access_token).unwrap();
//! assert_eq!(claims.user_id, "user123");
//!
//! // The refresh secret does not validate access tokens
//! assert!(issuer.verify_refresh(&pair.access_token).is_err());
//! ```

pub mod jwt;
pub mod password;
pub mod tokens;

// Re-export commonly used items
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use tokens::TokenIssuer;
pub use tokens::TokenLifetimes;
pub use tokens::TokenPair;
