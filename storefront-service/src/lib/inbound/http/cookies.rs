use auth::TokenPair;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::SameSite;
use axum_extra::extract::CookieJar;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Set both session cookies, each expiring with its token.
pub fn set_session_cookies(jar: CookieJar, tokens: &TokenPair, secure: bool) -> CookieJar {
    jar.add(session_cookie(
        ACCESS_TOKEN_COOKIE,
        tokens.access_token.clone(),
        tokens.access_claims.lifetime_secs(),
        secure,
    ))
    .add(session_cookie(
        REFRESH_TOKEN_COOKIE,
        tokens.refresh_token.clone(),
        tokens.refresh_claims.lifetime_secs(),
        secure,
    ))
}

/// Expire both session cookies, whether or not the request carried them.
pub fn clear_session_cookies(jar: CookieJar, secure: bool) -> CookieJar {
    [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE]
        .into_iter()
        .fold(jar, |jar, name| {
            let mut cookie = session_cookie(name, String::new(), 0, secure);
            cookie.make_removal();
            jar.add(cookie)
        })
}

pub fn access_token(jar: &CookieJar) -> Option<String> {
    token_value(jar, ACCESS_TOKEN_COOKIE)
}

pub fn refresh_token(jar: &CookieJar) -> Option<String> {
    token_value(jar, REFRESH_TOKEN_COOKIE)
}

fn token_value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

fn session_cookie(name: &'static str, value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::seconds(max_age_secs.max(0)))
        .build()
}

#[cfg(test)]
mod tests {
    use auth::TokenIssuer;
    use auth::TokenLifetimes;
    use axum::http::header::SET_COOKIE;
    use axum::response::IntoResponse;

    use super::*;

    fn set_cookie_headers(jar: CookieJar) -> Vec<String> {
        let response = (jar, ()).into_response();
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|value| value.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_session_cookie_attributes() {
        let issuer = TokenIssuer::new(b"access", b"refresh", TokenLifetimes::default());
        let tokens = issuer.issue("user-1").unwrap();

        let headers = set_cookie_headers(set_session_cookies(CookieJar::new(), &tokens, true));
        let access = headers.iter().find(|h| h.starts_with("accessToken=")).unwrap();
        let refresh = headers.iter().find(|h| h.starts_with("refreshToken=")).unwrap();

        assert!(access.contains("HttpOnly"));
        assert!(access.contains("SameSite=Strict"));
        assert!(access.contains("Secure"));
        assert!(access.contains("Path=/"));
        assert!(access.contains("Max-Age=900"));
        assert!(refresh.contains("Max-Age=604800"));
    }

    #[test]
    fn test_insecure_outside_production() {
        let issuer = TokenIssuer::new(b"access", b"refresh", TokenLifetimes::default());
        let tokens = issuer.issue("user-1").unwrap();

        let headers = set_cookie_headers(set_session_cookies(CookieJar::new(), &tokens, false));
        assert!(headers.iter().all(|h| !h.contains("Secure")));
    }

    #[test]
    fn test_clear_emits_removals_for_absent_cookies() {
        let headers = set_cookie_headers(clear_session_cookies(CookieJar::new(), false));

        assert_eq!(headers.len(), 2);
        assert!(headers.iter().any(|h| h.starts_with("accessToken=;")));
        assert!(headers.iter().any(|h| h.starts_with("refreshToken=;")));
        assert!(headers.iter().all(|h| h.contains("Max-Age=0")));
    }

    #[test]
    fn test_empty_cookie_value_is_absent() {
        let jar = CookieJar::new().add(Cookie::new(ACCESS_TOKEN_COOKIE, ""));
        assert_eq!(access_token(&jar), None);
    }
}
