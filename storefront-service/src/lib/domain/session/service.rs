use std::sync::Arc;

use async_trait::async_trait;
use auth::JwtError;
use auth::PasswordHasher;
use auth::TokenIssuer;
use auth::TokenPair;
use chrono::Utc;

use crate::domain::session::errors::AuthError;
use crate::domain::session::errors::SessionError;
use crate::domain::session::models::token_ttl;
use crate::domain::session::models::IssuedSession;
use crate::domain::session::models::SigninCommand;
use crate::domain::session::models::SignupCommand;
use crate::domain::session::models::UserProfile;
use crate::domain::session::ports::SessionServicePort;
use crate::domain::session::ports::SessionStore;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;

/// Session manager: signup, signin, signout, refresh, and access-token
/// resolution for the gatekeeper.
///
/// Refresh tokens are single-slot per user. Issuing a new one overwrites the
/// cached value, so every earlier refresh token for that user stops working.
pub struct SessionService<UR, SS>
where
    UR: UserRepository,
    SS: SessionStore,
{
    users: Arc<UR>,
    sessions: Arc<SS>,
    tokens: Arc<TokenIssuer>,
    password_hasher: PasswordHasher,
}

impl<UR, SS> SessionService<UR, SS>
where
    UR: UserRepository,
    SS: SessionStore,
{
    /// Create a new session service with injected dependencies.
    ///
    /// # Arguments
    /// * `users` - Credential store
    /// * `sessions` - Refresh token cache
    /// * `tokens` - Token pair issuer
    pub fn new(users: Arc<UR>, sessions: Arc<SS>, tokens: Arc<TokenIssuer>) -> Self {
        Self {
            users,
            sessions,
            tokens,
            password_hasher: PasswordHasher::new(),
        }
    }

    /// Issue a pair for `user_id` and record its refresh token.
    async fn open_session(&self, user_id: &UserId) -> Result<TokenPair, SessionError> {
        let tokens = self.tokens.issue(user_id)?;
        self.sessions
            .store(
                user_id,
                &tokens.refresh_token,
                token_ttl(&tokens.refresh_claims),
            )
            .await?;
        Ok(tokens)
    }
}

#[async_trait]
impl<UR, SS> SessionServicePort for SessionService<UR, SS>
where
    UR: UserRepository,
    SS: SessionStore,
{
    async fn signup(&self, command: SignupCommand) -> Result<IssuedSession, SessionError> {
        if self.users.find_by_email(&command.email).await?.is_some() {
            tracing::warn!(email = %command.email, "User already exists");
            return Err(SessionError::UserAlreadyExists);
        }

        let password_hash = self.password_hasher.hash(command.password.expose())?;

        let user = User {
            id: UserId::new(),
            name: command.name,
            email: command.email,
            password_hash,
            role: Role::Customer,
            created_at: Utc::now(),
        };

        let user = self.users.create(user).await?;
        let tokens = self.open_session(&user.id).await?;

        tracing::info!(user_id = %user.id, "User signed up");

        Ok(IssuedSession {
            user: user.into(),
            tokens,
        })
    }

    async fn signin(&self, command: SigninCommand) -> Result<IssuedSession, SessionError> {
        let email =
            EmailAddress::new(command.email).map_err(|_| SessionError::InvalidCredentials)?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(SessionError::InvalidCredentials)?;

        if !self
            .password_hasher
            .verify(&command.password, &user.password_hash)?
        {
            tracing::warn!(user_id = %user.id, "Signin rejected: password mismatch");
            return Err(SessionError::InvalidCredentials);
        }

        let tokens = self.open_session(&user.id).await?;

        tracing::info!(user_id = %user.id, "User signed in");

        Ok(IssuedSession {
            user: user.into(),
            tokens,
        })
    }

    async fn signout(&self, refresh_token: Option<&str>) {
        let Some(token) = refresh_token else {
            tracing::debug!("Signout without refresh token");
            return;
        };

        let user_id = match self
            .tokens
            .verify_refresh(token)
            .ok()
            .and_then(|claims| UserId::from_string(&claims.user_id).ok())
        {
            Some(user_id) => user_id,
            None => {
                tracing::debug!("Signout with unverifiable refresh token, clearing cookies only");
                return;
            }
        };

        match self.sessions.delete(&user_id).await {
            Ok(()) => tracing::info!(user_id = %user_id, "Logged out successfully"),
            Err(e) => tracing::warn!(
                user_id = %user_id,
                error = %e,
                "Failed to drop refresh token on signout"
            ),
        }
    }

    async fn refresh(&self, refresh_token: Option<&str>) -> Result<TokenPair, SessionError> {
        let presented = refresh_token.ok_or_else(|| {
            tracing::warn!("No refresh token provided");
            SessionError::MissingRefreshToken
        })?;

        let claims = self
            .tokens
            .verify_refresh(presented)
            .map_err(|e| match e {
                JwtError::TokenExpired => SessionError::RefreshTokenExpired,
                _ => SessionError::InvalidRefreshToken,
            })?;

        let user_id =
            UserId::from_string(&claims.user_id).map_err(|_| SessionError::InvalidRefreshToken)?;

        let tokens = self.tokens.issue(user_id)?;
        let rotated = self
            .sessions
            .rotate(
                &user_id,
                presented,
                &tokens.refresh_token,
                token_ttl(&tokens.refresh_claims),
            )
            .await?;

        if !rotated {
            let on_record = self.sessions.get(&user_id).await.ok().flatten().is_some();
            tracing::warn!(
                user_id = %user_id,
                superseded = on_record,
                "Invalid refresh token"
            );
            return Err(SessionError::InvalidRefreshToken);
        }

        tracing::info!(user_id = %user_id, "Token refreshed successfully");

        Ok(tokens)
    }

    async fn authenticate(&self, access_token: Option<&str>) -> Result<UserProfile, AuthError> {
        let token = access_token.ok_or(AuthError::MissingAccessToken)?;

        let claims = self.tokens.verify_access(token).map_err(|e| match e {
            JwtError::TokenExpired => AuthError::AccessTokenExpired,
            _ => AuthError::InvalidAccessToken,
        })?;

        let user_id =
            UserId::from_string(&claims.user_id).map_err(|_| AuthError::InvalidAccessToken)?;

        self.users
            .find_by_id(&user_id)
            .await?
            .map(UserProfile::from)
            .ok_or(AuthError::UserNotFound)
    }
}
