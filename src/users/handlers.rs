use axum::{
    extract::{Path, Query, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::MessageResponse,
        extractors::{AdminUser, AuthUser},
        handlers::access_cookie,
        jwt::JwtKeys,
        password::hash_password,
    },
    error::ApiError,
    state::AppState,
};

use super::{
    dto::{CreateUserRequest, CreatedUserResponse, SearchQuery, UpdateUserRequest},
    repo_types::{NewUser, User, UserStatus},
};

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Json(mut payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, HeaderMap, Json<CreatedUserResponse>), ApiError> {
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
            is_admin: payload.is_admin.unwrap_or(false),
            status: payload.status.unwrap_or(UserStatus::Active),
        },
    )
    .await?;

    // The created account gets a token of its own, cookie included.
    let keys = JwtKeys::from_config(&state.config.jwt)?;
    let token = keys.sign(user.id, user.is_admin)?;
    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        access_cookie(&token, &state.config).map_err(|e| ApiError::Internal(e.into()))?,
    );

    info!(user_id = %user.id, email = %user.email, is_admin = user.is_admin, "user created");
    Ok((
        StatusCode::CREATED,
        headers,
        Json(CreatedUserResponse { user, token }),
    ))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = User::list_all(&state.db).await?;
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(user))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    payload.validate()?;
    let user = User::update(&state.db, id, payload.into_changes())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    info!(user_id = %user.id, "user updated");
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !User::soft_delete(&state.db, id).await? {
        return Err(ApiError::NotFound("User not found".into()));
    }
    info!(user_id = %id, "user soft-deleted");
    Ok(Json(MessageResponse::new("User soft-deleted successfully")))
}

#[instrument(skip(state))]
pub async fn search_users(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::Validation("Query parameter is required".into()))?;
    let users = User::search_by_name(&state.db, query).await?;
    Ok(Json(users))
}
