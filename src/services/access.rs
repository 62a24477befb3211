//! School-scoped access policy
//!
//! Two layers decide whether a user may touch something:
//!
//! 1. Role permissions ([`role_permissions`]) gate *what kind* of action a role may
//!    perform. Checked by the `Authorized<P>` extractor before a handler runs.
//! 2. [`AccessPolicy`] gates *which rows* the user may act on, based on the school
//!    a school, room or item belongs to. Consulted by the mutation engine before
//!    any write and by read queries to scope their results.
//!
//! Anything not listed is denied, including users whose stored role is unknown.

use sea_orm::{ConnectionTrait, EntityTrait};

use crate::error::{AppError, Result};
use crate::models::prelude::*;
use crate::models::user::{self, Role};

/// Permissions granted to each role
pub fn role_permissions(role: Role) -> &'static [&'static str] {
    match role {
        Role::Admin => &[
            "inventory.view",
            "items.manage",
            "transfers.create",
            "history.view",
            "rooms.manage",
            "schools.manage",
            "users.manage",
        ],
        Role::KepalaSekolah => &[
            "inventory.view",
            "items.manage",
            "transfers.create",
            "history.view",
            "rooms.manage",
        ],
        Role::Guru | Role::Staff => &[
            "inventory.view",
            "items.manage",
            "transfers.create",
            "history.view",
        ],
        Role::Murid => &["inventory.view"],
    }
}

/// Which schools' rows a user can reach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchoolScope {
    /// Every school
    All,
    /// Exactly one school
    School(i64),
    /// Nothing at all
    None,
}

impl SchoolScope {
    pub fn allows(&self, school_id: i64) -> bool {
        match self {
            SchoolScope::All => true,
            SchoolScope::School(id) => *id == school_id,
            SchoolScope::None => false,
        }
    }
}

/// Row-level access checks for one acting user
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    user_id: Option<i64>,
    scope: SchoolScope,
}

impl AccessPolicy {
    /// Policy for a logged-in user
    pub fn for_user(user: &user::Model) -> Self {
        let scope = match (user.role(), user.school_id) {
            (Some(Role::Admin), _) => SchoolScope::All,
            // A head of school without a school reaches nothing
            (Some(Role::KepalaSekolah), Some(school_id)) => SchoolScope::School(school_id),
            (Some(Role::KepalaSekolah), None) => SchoolScope::None,
            (Some(Role::Guru | Role::Staff | Role::Murid), Some(school_id)) => {
                SchoolScope::School(school_id)
            }
            (Some(Role::Guru | Role::Staff | Role::Murid), None) => SchoolScope::All,
            (None, _) => SchoolScope::None,
        };

        Self {
            user_id: Some(user.id),
            scope,
        }
    }

    /// Policy for internal callers acting without a user (seeding, maintenance jobs)
    pub fn unrestricted() -> Self {
        Self {
            user_id: None,
            scope: SchoolScope::All,
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }

    pub fn scope(&self) -> SchoolScope {
        self.scope
    }

    pub fn can_access_school(&self, school_id: i64) -> bool {
        self.scope.allows(school_id)
    }

    /// Check a room; unknown rooms are `NotFound`
    pub async fn can_access_room<C: ConnectionTrait>(&self, db: &C, room_id: i64) -> Result<bool> {
        let found = Room::find_by_id(room_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Room {} not found", room_id)))?;
        Ok(self.can_access_school(found.school_id))
    }

    /// Check an item through the room that owns it
    pub async fn can_access_item<C: ConnectionTrait>(
        &self,
        db: &C,
        found: &item::Model,
    ) -> Result<bool> {
        self.can_access_room(db, found.room_id).await
    }

    /// Load an item and require access to it; unknown items are `NotFound`
    pub async fn ensure_item<C: ConnectionTrait>(
        &self,
        db: &C,
        item_id: i64,
    ) -> Result<item::Model> {
        let found = Item::find_by_id(item_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item {} not found", item_id)))?;

        if !self.can_access_item(db, &found).await? {
            return Err(AppError::Forbidden(
                "You do not have access to this item".to_string(),
            ));
        }
        Ok(found)
    }

    pub fn ensure_school(&self, school_id: i64) -> Result<()> {
        if self.can_access_school(school_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You do not have access to this school".to_string(),
            ))
        }
    }

    /// Load a room and require access to it
    pub async fn ensure_room<C: ConnectionTrait>(
        &self,
        db: &C,
        room_id: i64,
    ) -> Result<room::Model> {
        let found = Room::find_by_id(room_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Room {} not found", room_id)))?;

        if !self.can_access_school(found.school_id) {
            return Err(AppError::Forbidden(
                "You do not have access to this room".to_string(),
            ));
        }
        Ok(found)
    }
}
