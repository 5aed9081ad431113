use axum::{
    extract::State,
    http::{
        header::{InvalidHeaderValue, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthUserResponse, LoginRequest, MessageResponse, RegisterRequest},
        extractors::{token_from_headers, COOKIE_NAME},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    config::AppConfig,
    error::ApiError,
    state::AppState,
    users::repo_types::{NewUser, User, UserStatus},
};

/// Build the `Set-Cookie` value for a fresh access token. `Secure` only in
/// production so local HTTP development still works.
pub(crate) fn access_cookie(
    token: &str,
    config: &AppConfig,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Strict");
    if config.production {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_access_cookie(config: &AppConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
    if config.production {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn cookie_header(value: Result<HeaderValue, InvalidHeaderValue>) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, value.map_err(|e| ApiError::Internal(e.into()))?);
    Ok(headers)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthUserResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.validate()?;

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    let password_hash = hash_password(&payload.password)?;
    let user = User::create(
        &state.db,
        NewUser {
            name: payload.name,
            email: payload.email,
            password_hash,
            mobile_no: payload.mobile_no,
            is_admin: false,
            status: UserStatus::Active,
        },
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    // No token on registration; login is a separate step.
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthUserResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.validate()?;

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::NotFound("User not found".into())
        })?;

    if user.status == UserStatus::Inactive {
        warn!(user_id = %user.id, "login on inactive account");
        return Err(ApiError::Forbidden("Account is inactive".into()));
    }

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::CredentialsMismatch);
    }

    let keys = JwtKeys::from_config(&state.config.jwt)?;
    let token = keys.sign(user.id, user.is_admin)?;
    let headers = cookie_header(access_cookie(&token, &state.config))?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((headers, Json(user.into())))
}

/// Logout verifies the presented token and clears the cookie. There is no
/// blacklist: the token itself stays valid until expiry.
#[instrument(skip(state, headers))]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let Some(token) = token_from_headers(&headers) else {
        return Ok(Json(MessageResponse::new("No active session")).into_response());
    };

    let keys = JwtKeys::from_config(&state.config.jwt)?;
    keys.verify(&token)?;

    let response_headers = cookie_header(clear_access_cookie(&state.config))?;
    info!("user logged out");
    Ok((
        response_headers,
        Json(MessageResponse::new("Logged out successfully")),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    fn fake_config(production: bool) -> AppConfig {
        let mut config = (*AppState::fake().config).clone();
        config.production = production;
        config
    }

    #[tokio::test]
    async fn access_cookie_is_http_only_and_strict() {
        let value = access_cookie("tok123", &fake_config(false)).expect("cookie");
        let cookie = value.to_str().unwrap();
        assert!(cookie.starts_with("access_token=tok123"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(!cookie.contains("Secure"));
    }

    #[tokio::test]
    async fn access_cookie_is_secure_in_production() {
        let value = access_cookie("tok123", &fake_config(true)).expect("cookie");
        assert!(value.to_str().unwrap().contains("Secure"));
    }

    #[tokio::test]
    async fn clear_cookie_expires_immediately() {
        let value = clear_access_cookie(&fake_config(false)).expect("cookie");
        let cookie = value.to_str().unwrap();
        assert!(cookie.starts_with("access_token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn logout_without_cookie_is_a_no_op() {
        let state = AppState::fake();
        let response = logout(State(state.clone()), HeaderMap::new())
            .await
            .expect("logout");
        assert_eq!(response.status(), StatusCode::OK);
        // Idempotent: a second cookie-less call also succeeds.
        let response = logout(State(state), HeaderMap::new()).await.expect("logout");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn logout_with_invalid_token_is_unauthorized() {
        let state = AppState::fake();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("access_token=garbage"));
        let err = logout(State(state), headers).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn logout_with_valid_token_clears_the_cookie() {
        let state = AppState::fake();
        let keys = JwtKeys::from_config(&state.config.jwt).expect("keys");
        let token = keys.sign(uuid::Uuid::new_v4(), false).expect("sign");
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("access_token={token}")).unwrap(),
        );
        let response = logout(State(state), headers).await.expect("logout");
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .expect("Set-Cookie present")
            .to_str()
            .unwrap();
        assert!(set_cookie.contains("Max-Age=0"));
    }
}
