use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Role, User};
use crate::services::otp;
use crate::state::AppState;

// POST /auth/send-otp
#[derive(Deserialize)]
pub struct SendOtpRequest {
    pub phone: String,
}

pub async fn send_otp(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SendOtpRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    otp::request_code(&state, &body.phone).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

// POST /auth/verify
#[derive(Deserialize)]
pub struct VerifyRequest {
    pub phone: String,
    pub otp: String,
}

pub async fn verify(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VerifyRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = otp::verify_code(&state, &body.phone, &body.otp)?;
    Ok(Json(serde_json::json!({ "success": true, "user": user })))
}

// POST /auth/name
#[derive(Deserialize)]
pub struct SetNameRequest {
    pub user_id: String,
    pub name: String,
}

pub async fn set_name(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetNameRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }

    let db = state.db.lock().unwrap();
    if !queries::update_user_name(&db, &body.user_id, name)? {
        return Err(AppError::NotFound(format!("user {}", body.user_id)));
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}

// POST /auth/role
#[derive(Deserialize)]
pub struct SetRoleRequest {
    pub user_id: String,
    pub role: String,
}

pub async fn set_role(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetRoleRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    // Strict vocabulary at the boundary: only customer|worker parse.
    let role = Role::parse_assignable(&body.role).ok_or_else(|| {
        AppError::Validation(format!(
            "role must be 'customer' or 'worker', got '{}'",
            body.role
        ))
    })?;

    let db = state.db.lock().unwrap();
    if !queries::update_user_role(&db, &body.user_id, role)? {
        return Err(AppError::NotFound(format!("user {}", body.user_id)));
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}

// POST /auth/push-token
#[derive(Deserialize)]
pub struct SetPushTokenRequest {
    pub user_id: String,
    pub push_token: String,
}

pub async fn set_push_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetPushTokenRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = body.push_token.trim();
    if token.is_empty() {
        return Err(AppError::Validation("push_token is required".to_string()));
    }

    let db = state.db.lock().unwrap();
    if !queries::update_user_push_token(&db, &body.user_id, token)? {
        return Err(AppError::NotFound(format!("user {}", body.user_id)));
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}

// GET /auth/me/:id
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    let db = state.db.lock().unwrap();
    let user =
        queries::get_user(&db, &id)?.ok_or_else(|| AppError::NotFound(format!("user {id}")))?;
    Ok(Json(user))
}
