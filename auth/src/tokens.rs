use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;

/// Lifetimes of the two tokens in a session pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::days(7),
        }
    }
}

/// A freshly issued access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_claims: Claims,
    pub refresh_claims: Claims,
}

/// Issues and verifies session token pairs.
///
/// Access and refresh tokens are signed with distinct secrets, so a token of
/// one kind never verifies as the other.
pub struct TokenIssuer {
    access: JwtHandler,
    refresh: JwtHandler,
    lifetimes: TokenLifetimes,
}

impl TokenIssuer {
    /// Create a new issuer.
    ///
    /// # Arguments
    /// * `access_secret` - Signing secret for access tokens
    /// * `refresh_secret` - Signing secret for refresh tokens
    /// * `lifetimes` - Validity window of each token kind
    pub fn new(access_secret: &[u8], refresh_secret: &[u8], lifetimes: TokenLifetimes) -> Self {
        Self {
            access: JwtHandler::new(access_secret),
            refresh: JwtHandler::new(refresh_secret),
            lifetimes,
        }
    }

    /// Issue a new access/refresh pair for a user.
    ///
    /// Both tokens share the same issue instant.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue(&self, user_id: impl ToString) -> Result<TokenPair, JwtError> {
        let user_id = user_id.to_string();
        let now = Utc::now();

        let access_claims = Claims::issued_at(&user_id, now, self.lifetimes.access);
        let refresh_claims = Claims::issued_at(&user_id, now, self.lifetimes.refresh);

        Ok(TokenPair {
            access_token: self.access.encode(&access_claims)?,
            refresh_token: self.refresh.encode(&refresh_claims)?,
            access_claims,
            refresh_claims,
        })
    }

    /// Verify an access token.
    ///
    /// # Errors
    /// * `TokenExpired` - Token is past its expiry
    /// * `InvalidToken` - Token is malformed or not signed with the access secret
    pub fn verify_access(&self, token: &str) -> Result<Claims, JwtError> {
        self.access.decode(token)
    }

    /// Verify a refresh token.
    ///
    /// # Errors
    /// * `TokenExpired` - Token is past its expiry
    /// * `InvalidToken` - Token is malformed or not signed with the refresh secret
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, JwtError> {
        self.refresh.decode(token)
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_SECRET: &[u8] = b"test_access_secret_at_least_32_bytes!";
    const REFRESH_SECRET: &[u8] = b"test_refresh_secret_at_least_32_bytes";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(ACCESS_SECRET, REFRESH_SECRET, TokenLifetimes::default())
    }

    #[test]
    fn test_issue_embeds_user_and_lifetimes() {
        let pair = issuer().issue("user123").expect("Failed to issue tokens");

        let access = issuer()
            .verify_access(&pair.access_token)
            .expect("Access token rejected");
        let refresh = issuer()
            .verify_refresh(&pair.refresh_token)
            .expect("Refresh token rejected");

        assert_eq!(access.user_id, "user123");
        assert_eq!(refresh.user_id, "user123");
        assert_eq!(access.lifetime_secs(), 15 * 60);
        assert_eq!(refresh.lifetime_secs(), 7 * 24 * 60 * 60);
        assert_eq!(access, pair.access_claims);
        assert_eq!(refresh, pair.refresh_claims);
    }

    #[test]
    fn test_tokens_are_not_interchangeable() {
        let issuer = issuer();
        let pair = issuer.issue("user123").expect("Failed to issue tokens");

        assert!(matches!(
            issuer.verify_refresh(&pair.access_token),
            Err(JwtError::InvalidToken(_))
        ));
        assert!(matches!(
            issuer.verify_access(&pair.refresh_token),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_access_token() {
        let expired = TokenIssuer::new(
            ACCESS_SECRET,
            REFRESH_SECRET,
            TokenLifetimes {
                access: Duration::seconds(-10),
                refresh: Duration::days(7),
            },
        );
        let pair = expired.issue("user123").expect("Failed to issue tokens");

        assert_eq!(
            issuer().verify_access(&pair.access_token),
            Err(JwtError::TokenExpired)
        );
        assert!(issuer().verify_refresh(&pair.refresh_token).is_ok());
    }

    #[test]
    fn test_consecutive_pairs_verify_independently() {
        let issuer = issuer();
        let first = issuer.issue("user123").expect("Failed to issue tokens");
        let second = issuer.issue("user456").expect("Failed to issue tokens");

        assert_eq!(
            issuer.verify_refresh(&first.refresh_token).unwrap().user_id,
            "user123"
        );
        assert_eq!(
            issuer.verify_refresh(&second.refresh_token).unwrap().user_id,
            "user456"
        );
    }
}
