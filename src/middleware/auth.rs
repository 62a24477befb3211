//! Authentication middleware for API routes
//!
//! Resolves the `inventaris_session` cookie into the current user for every
//! protected route.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::models::user;
use crate::services::access::role_permissions;
use crate::services::security::resolve_session;
use crate::state::AppState;

/// Session cookie name
pub const SESSION_COOKIE_NAME: &str = "inventaris_session";

/// Authenticated user stored in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: user::Model,
    pub session_id: String,
}

impl AuthenticatedUser {
    /// Whether the user's role grants a permission; unknown roles get none
    pub fn has_permission(&self, permission: &str) -> bool {
        self.user
            .role()
            .map(|role| role_permissions(role).contains(&permission))
            .unwrap_or(false)
    }
}

/// Auth middleware that validates the session cookie
///
/// Returns 401 Unauthorized if the cookie is missing, unknown or expired.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let session_id = match extract_session_id(req.headers()) {
        Some(id) => id,
        None => {
            return AppError::Unauthorized("Authentication required".to_string()).into_response();
        }
    };

    let user = match resolve_session(&state.db, &session_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return AppError::Unauthorized("Session expired or invalid".to_string())
                .into_response();
        }
        Err(e) => return e.into_response(),
    };

    req.extensions_mut()
        .insert(AuthenticatedUser { user, session_id });

    next.run(req).await
}

/// Extract the session id from the cookie header
pub fn extract_session_id(headers: &HeaderMap) -> Option<String> {
    let prefix = format!("{}=", SESSION_COOKIE_NAME);

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|cookie| cookie.trim().strip_prefix(prefix.as_str()))
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_session_id_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; inventaris_session=abc-123; lang=id"),
        );
        assert_eq!(extract_session_id(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_extract_session_id_missing_or_empty() {
        let mut headers = HeaderMap::new();
        assert!(extract_session_id(&headers).is_none());

        headers.insert(header::COOKIE, HeaderValue::from_static("inventaris_session="));
        assert!(extract_session_id(&headers).is_none());
    }
}
