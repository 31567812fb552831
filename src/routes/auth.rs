use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::{HeaderMap, StatusCode},
    response::Json as RespJson,
    routing::{get, post},
    Router,
};

use super::AppState;
use crate::error::{ApiError, ApiResult};
use crate::model::signup::{looks_like_email, AuthResponse, LoginRequest, SignupPayload};
use crate::model::user::{NewUser, User, UserResponse};
use crate::store::StoreError;

pub fn auth_router() -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}

/// Resolves the bearer token on a request to a user that still exists.
pub async fn authenticate(headers: &HeaderMap, state: &AppState) -> ApiResult<User> {
    let token = headers
        .get("authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;

    let claims = state
        .tokens
        .verify(token.trim())
        .map_err(|_| ApiError::Unauthorized)?;

    state
        .users
        .find_user(claims.sub)
        .await?
        .ok_or(ApiError::Unauthorized)
}

fn issue_response(state: &AppState, user: &User) -> ApiResult<AuthResponse> {
    let token = state
        .tokens
        .issue(user)
        .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))?;
    Ok(AuthResponse {
        token,
        user: UserResponse::from(user),
    })
}

pub async fn register(
    Extension(state): Extension<AppState>,
    payload: Result<Json<SignupPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, RespJson<AuthResponse>)> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    tracing::info!("🔧 Register attempt - Email: {}, Role: {}", payload.email(), payload.role());

    payload.validate().map_err(ApiError::BadRequest)?;

    let password = payload.password().to_string();
    let cost = state.bcrypt_cost;
    let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let new_user = NewUser {
        name: payload.name().trim().to_string(),
        email: payload.email().to_string(),
        role: payload.role(),
        password_hash,
        doctor: payload.doctor_profile(),
    };

    let user = state.users.insert_user(new_user).await.map_err(|e| match e {
        StoreError::Conflict => ApiError::EmailTaken,
        other => ApiError::Store(other),
    })?;

    tracing::info!("✅ User registered: {} ({})", user.id, user.role);
    Ok((StatusCode::CREATED, RespJson(issue_response(&state, &user)?)))
}

pub async fn login(
    Extension(state): Extension<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<RespJson<AuthResponse>> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    tracing::info!("🔧 Login attempt - Email: {}", payload.email);

    if !looks_like_email(&payload.email) || payload.password.is_empty() {
        return Err(ApiError::InvalidCredentials);
    }

    let user = state
        .users
        .find_user_by_email(&payload.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let hash = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(payload.password, &hash))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !matches {
        return Err(ApiError::InvalidCredentials);
    }

    tracing::info!("✅ Login successful for user: {}", user.id);
    Ok(RespJson(issue_response(&state, &user)?))
}

pub async fn me(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> ApiResult<RespJson<UserResponse>> {
    let user = authenticate(&headers, &state).await?;
    Ok(RespJson(UserResponse::from(&user)))
}
