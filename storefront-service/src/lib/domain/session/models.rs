use std::time::Duration;

use auth::Claims;
use auth::TokenPair;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::DisplayName;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Validated signup input.
#[derive(Debug)]
pub struct SignupCommand {
    pub name: DisplayName,
    pub email: EmailAddress,
    pub password: Password,
}

impl SignupCommand {
    pub fn new(name: DisplayName, email: EmailAddress, password: Password) -> Self {
        Self {
            name,
            email,
            password,
        }
    }

    /// Validate every raw field and report all failures at once.
    ///
    /// # Errors
    /// * `Validation` - One message per invalid field (name, email, password order)
    pub fn parse(name: String, email: String, password: String) -> Result<Self, UserError> {
        let name = DisplayName::new(name);
        let email = EmailAddress::new(email);
        let password = Password::new(password);

        match (name, email, password) {
            (Ok(name), Ok(email), Ok(password)) => Ok(Self::new(name, email, password)),
            (name, email, password) => {
                let messages = [
                    name.err().map(|e| e.to_string()),
                    email.err().map(|e| e.to_string()),
                    password.err().map(|e| e.to_string()),
                ]
                .into_iter()
                .flatten()
                .collect();
                Err(UserError::Validation(messages))
            }
        }
    }
}

/// Raw signin input.
///
/// Left unvalidated: a malformed email must fail exactly like an unknown one.
#[derive(Debug)]
pub struct SigninCommand {
    pub email: String,
    pub password: String,
}

/// User record without its password hash.
///
/// This is what the gatekeeper attaches to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub name: DisplayName,
    pub email: EmailAddress,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Outcome of signup or signin: who signed in and the pair to hand out.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub user: UserProfile,
    pub tokens: TokenPair,
}

/// Remaining validity of a token, as a cache/cookie TTL.
pub fn token_ttl(claims: &Claims) -> Duration {
    Duration::from_secs(claims.lifetime_secs().max(0) as u64)
}
