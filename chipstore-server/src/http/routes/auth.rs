//! Registration, login and session endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::{generate_session_token, hash_password, verify_password};
use crate::db::repos::{UserRecord, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::BearerToken;
use crate::models::{EmailAddress, Registration, Role};
use crate::state::AppState;

/// Register request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public user fields; the password hash never appears here.
#[derive(Serialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
}

impl From<UserRecord> for UserProfile {
    fn from(u: UserRecord) -> Self {
        Self {
            id: u.id.to_hex(),
            name: u.name,
            email: u.email,
            role: u.role.as_str().to_owned(),
            created_at: u.created_at.to_chrono().to_rfc3339(),
        }
    }
}

/// Session token plus profile, returned by register and login
#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// POST /api/auth/register - create an account and start a session
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let registration = Registration::new(&req.name, &req.email, &req.password)?;

    let db = state.connections().ensure_connected().await?;
    let repo = UserRepo::new(&db);

    if repo
        .find_by_email(registration.email.as_str())
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict {
            message: "email already registered".into(),
        });
    }

    let password_hash = hash_password(&registration.password)?;
    let user = repo
        .create(
            registration.name,
            registration.email,
            password_hash,
            Role::Customer,
        )
        .await?;

    let token = generate_session_token();
    repo.create_session(user.id, token.clone()).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserProfile::from(user),
        }),
    ))
}

/// POST /api/auth/login - exchange credentials for a session
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let db = state.connections().ensure_connected().await?;
    let repo = UserRepo::new(&db);

    // A malformed email can't match an account; same 401 as a wrong password.
    let user = match EmailAddress::new(&req.email) {
        Ok(email) => repo.find_by_email(email.as_str()).await?,
        Err(_) => None,
    }
    .ok_or(ApiError::Unauthorized {
        reason: "invalid email or password",
    })?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized {
            reason: "invalid email or password",
        });
    }

    let token = generate_session_token();
    repo.create_session(user.id, token.clone()).await?;

    Ok(Json(AuthResponse {
        token,
        user: UserProfile::from(user),
    }))
}

/// GET /api/auth/me - profile for the current session
async fn me(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<UserProfile>, ApiError> {
    let db = state.connections().ensure_connected().await?;
    let user = UserRepo::new(&db)
        .resolve_session(&token)
        .await?
        .ok_or(ApiError::Unauthorized {
            reason: "invalid or expired session",
        })?;

    Ok(Json(UserProfile::from(user)))
}

/// POST /api/auth/logout - end the current session
async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<StatusCode, ApiError> {
    let db = state.connections().ensure_connected().await?;
    UserRepo::new(&db).delete_session(&token).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Auth routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/auth/logout", post(logout))
}
