use axum::{async_trait, extract::FromRequestParts, http::request::Parts, http::HeaderMap};

use crate::{auth::jwt::JwtKeys, error::ApiError, state::AppState};

use super::jwt::Claims;

pub(crate) const COOKIE_NAME: &str = "access_token";

/// Pulls the access token out of the request's `Cookie` header.
pub(crate) fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == COOKIE_NAME {
            return Some(val.to_string());
        }
    }
    None
}

/// Authenticated request: a valid access token was presented. Carries the
/// decoded claims for downstream handlers.
#[derive(Debug)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Unauthorized: No token provided".into()))?;
        let keys = JwtKeys::from_config(&state.config.jwt)?;
        let claims = keys.verify(&token)?;
        Ok(AuthUser(claims))
    }
}

/// Authenticated and admin. Non-admin tokens are rejected with 403.
#[derive(Debug)]
pub struct AdminUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.admin {
            return Err(ApiError::Forbidden("Forbidden: Admin access required".into()));
        }
        Ok(AdminUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::http::Request;
    use uuid::Uuid;

    fn parts_with_cookie(cookie: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/users");
        if let Some(c) = cookie {
            builder = builder.header(axum::http::header::COOKIE, c);
        }
        let (parts, _) = builder.body(()).expect("request").into_parts();
        parts
    }

    fn signed_cookie(state: &AppState, user_id: Uuid, admin: bool) -> String {
        let keys = JwtKeys::from_config(&state.config.jwt).expect("keys");
        let token = keys.sign(user_id, admin).expect("sign");
        format!("{COOKIE_NAME}={token}")
    }

    #[test]
    fn finds_the_access_token_among_other_cookies() {
        let mut parts = parts_with_cookie(Some("theme=dark; access_token=abc123; lang=en"));
        assert_eq!(token_from_headers(&parts.headers).as_deref(), Some("abc123"));
        parts.headers.remove(axum::http::header::COOKIE);
        assert!(token_from_headers(&parts.headers).is_none());
    }

    #[tokio::test]
    async fn missing_cookie_is_unauthorized() {
        let state = AppState::fake();
        let mut parts = parts_with_cookie(None);
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert_eq!(err.to_string(), "Unauthorized: No token provided");
    }

    #[tokio::test]
    async fn invalid_token_is_unauthorized() {
        let state = AppState::fake();
        let mut parts = parts_with_cookie(Some("access_token=garbage"));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert_eq!(err.to_string(), "Invalid token");
    }

    #[tokio::test]
    async fn valid_token_attaches_claims() {
        let state = AppState::fake();
        let user_id = Uuid::new_v4();
        let cookie = signed_cookie(&state, user_id, false);
        let mut parts = parts_with_cookie(Some(&cookie));
        let AuthUser(claims) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect("authenticated");
        assert_eq!(claims.sub, user_id);
        assert!(!claims.admin);
    }

    #[tokio::test]
    async fn non_admin_is_forbidden_on_admin_routes() {
        let state = AppState::fake();
        let cookie = signed_cookie(&state, Uuid::new_v4(), false);
        let mut parts = parts_with_cookie(Some(&cookie));
        let err = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn admin_token_passes_the_admin_gate() {
        let state = AppState::fake();
        let user_id = Uuid::new_v4();
        let cookie = signed_cookie(&state, user_id, true);
        let mut parts = parts_with_cookie(Some(&cookie));
        let AdminUser(claims) = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .expect("admin");
        assert_eq!(claims.sub, user_id);
        assert!(claims.admin);
    }
}
