use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::endpoints::extractors::ApiJson;
use crate::error::{AppError, Result};
use crate::middleware::auth::SESSION_COOKIE_NAME;
use crate::middleware::{require_auth, Authenticated};
use crate::models::user;
use crate::services::security::{authenticate, create_session, delete_session};
use crate::state::AppState;

/// Create auth routes for session management
pub fn auth_routes(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .route("/login", post(login))
        .merge(session_routes)
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub no_induk: String,
    pub password: String,
}

// ============================================================================
// Session Cookie Helpers
// ============================================================================

fn session_cookie(session_id: &str, max_age_secs: i64, secure: bool) -> Result<HeaderValue> {
    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        SESSION_COOKIE_NAME,
        session_id,
        max_age_secs,
        if secure { "; Secure" } else { "" }
    );
    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::Internal(format!("Invalid session cookie: {}", e)))
}

fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("inventaris_session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}

// ============================================================================
// Endpoints
// ============================================================================

/// Login with no_induk and password, returns session cookie
async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Response> {
    if request.no_induk.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "no_induk and password are required".to_string(),
        ));
    }

    let found = match authenticate(&state.db, &request.no_induk, &request.password).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(no_induk = %request.no_induk.trim(), "Failed login attempt");
            return Err(e);
        }
    };

    let session = create_session(&state.db, found.id, state.auth.session_ttl_hours).await?;
    let cookie = session_cookie(
        &session.id,
        state.auth.session_ttl_hours * 3600,
        state.auth.secure_cookies,
    )?;

    tracing::info!(user_id = found.id, role = %found.role, "User logged in");

    Ok(([(header::SET_COOKIE, cookie)], Json(found)).into_response())
}

/// Logout - deletes the session and clears the cookie
async fn logout(State(state): State<AppState>, auth: Authenticated) -> Result<Response> {
    delete_session(&state.db, auth.session_id()).await?;
    tracing::info!(user_id = auth.user().id, "User logged out");

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(serde_json::json!({"message": "Logged out"})),
    )
        .into_response())
}

/// Current user
async fn me(auth: Authenticated) -> Json<user::Model> {
    Json(auth.user().clone())
}
