use std::time::Duration;

use async_trait::async_trait;
use auth::TokenPair;

use crate::domain::session::errors::AuthError;
use crate::domain::session::errors::SessionError;
use crate::domain::session::errors::SessionStoreError;
use crate::domain::session::models::IssuedSession;
use crate::domain::session::models::SigninCommand;
use crate::domain::session::models::SignupCommand;
use crate::domain::session::models::UserProfile;
use crate::domain::user::models::UserId;

/// Port for session manager and gatekeeper operations.
#[async_trait]
pub trait SessionServicePort: Send + Sync + 'static {
    /// Register a new user and open a session for them.
    ///
    /// # Errors
    /// * `UserAlreadyExists` - Email is already registered
    /// * `User` - Store failure, including a unique-key race on email
    /// * `Store` - Session cache failure
    async fn signup(&self, command: SignupCommand) -> Result<IssuedSession, SessionError>;

    /// Verify credentials and open a session.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `Store` - Session cache failure
    async fn signin(&self, command: SigninCommand) -> Result<IssuedSession, SessionError>;

    /// Forget the session behind a refresh token, if it can be identified.
    ///
    /// Never fails: cache or verification problems are logged and swallowed.
    async fn signout(&self, refresh_token: Option<&str>);

    /// Exchange the current refresh token for a new pair.
    ///
    /// # Errors
    /// * `MissingRefreshToken` - No token presented
    /// * `RefreshTokenExpired` / `InvalidRefreshToken` - Token rejected, or
    ///   not the one currently on record for its user
    async fn refresh(&self, refresh_token: Option<&str>) -> Result<TokenPair, SessionError>;

    /// Resolve an access token to the user it was issued to.
    ///
    /// # Errors
    /// * `MissingAccessToken`, `AccessTokenExpired`, `InvalidAccessToken`
    /// * `UserNotFound` - Token is valid but the account no longer exists
    async fn authenticate(&self, access_token: Option<&str>) -> Result<UserProfile, AuthError>;
}

/// Single-slot refresh token ledger, one entry per user.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Record `token` as the user's current refresh token, replacing any other.
    async fn store(&self, user_id: &UserId, token: &str, ttl: Duration)
        -> Result<(), SessionStoreError>;

    /// Current refresh token of a user, if one is on record and unexpired.
    async fn get(&self, user_id: &UserId) -> Result<Option<String>, SessionStoreError>;

    /// Drop the user's entry. Deleting a missing entry is not an error.
    async fn delete(&self, user_id: &UserId) -> Result<(), SessionStoreError>;

    /// Atomically replace the user's token with `replacement` only if the
    /// current value equals `expected` byte for byte.
    ///
    /// # Returns
    /// `true` if the swap happened, `false` if the entry was absent or different
    async fn rotate(
        &self,
        user_id: &UserId,
        expected: &str,
        replacement: &str,
        ttl: Duration,
    ) -> Result<bool, SessionStoreError>;
}
