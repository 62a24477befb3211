//! Permission system with type-safe authorization extractors
//!
//! Usage in handlers:
//! ```ignore
//! use crate::middleware::{Authorized, permissions::*};
//!
//! async fn create_transfer(
//!     auth: Authorized<TransfersCreate>,
//!     State(state): State<AppState>,
//! ) -> Result<Json<TransferEntry>> {
//!     // Permission already verified; auth.policy() scopes the rows
//! }
//! ```

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::models::user;
use crate::services::access::AccessPolicy;

/// Trait for permission marker types
pub trait Permission: Send + Sync + 'static {
    /// The permission string (e.g., "items.manage")
    const NAME: &'static str;
}

/// Macro to define permission types
///
/// Creates zero-sized marker types that implement `Permission`
macro_rules! define_permissions {
    ($($(#[$meta:meta])* $name:ident => $perm:expr),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy)]
            pub struct $name;

            impl Permission for $name {
                const NAME: &'static str = $perm;
            }
        )*
    };
}

define_permissions! {
    /// View items, rooms, schools and reference data
    InventoryView => "inventory.view",
    /// Add, update and delete items
    ItemsManage => "items.manage",
    /// Move item quantity between rooms
    TransfersCreate => "transfers.create",
    /// Read the history and transfer logs
    HistoryView => "history.view",
    /// Create, update and delete rooms
    RoomsManage => "rooms.manage",
    /// Create, update and delete schools
    SchoolsManage => "schools.manage",
    /// List and create users
    UsersManage => "users.manage",
}

fn authenticated_user(parts: &Parts) -> Result<&AuthenticatedUser, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
}

/// Extractor that requires a specific permission
///
/// This extractor verifies that the authenticated user has the required
/// permission before the handler is called. If the permission check fails,
/// a 403 Forbidden error is returned.
#[derive(Debug, Clone)]
pub struct Authorized<P: Permission>(pub user::Model, PhantomData<P>);

impl<P: Permission> Authorized<P> {
    /// Get the authenticated user
    pub fn user(&self) -> &user::Model {
        &self.0
    }

    /// Get the user ID
    pub fn user_id(&self) -> i64 {
        self.0.id
    }

    /// Row-level access policy for this user
    pub fn policy(&self) -> AccessPolicy {
        AccessPolicy::for_user(&self.0)
    }
}

impl<S, P> FromRequestParts<S> for Authorized<P>
where
    S: Send + Sync,
    P: Permission,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_user = authenticated_user(parts)?;

        if !auth_user.has_permission(P::NAME) {
            return Err(AppError::Forbidden(format!(
                "Permission denied: {} required",
                P::NAME
            )));
        }

        Ok(Authorized(auth_user.user.clone(), PhantomData))
    }
}

/// Extractor for any authenticated user (no specific permission required)
#[derive(Debug, Clone)]
pub struct Authenticated(pub AuthenticatedUser);

impl Authenticated {
    /// Get the authenticated user
    pub fn user(&self) -> &user::Model {
        &self.0.user
    }

    pub fn session_id(&self) -> &str {
        &self.0.session_id
    }
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Authenticated(authenticated_user(parts)?.clone()))
    }
}
