use crate::config::auth::AuthConfig;
use crate::db::DbConn;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(db: DbConn, auth: AuthConfig) -> Self {
        Self { db, auth }
    }
}
