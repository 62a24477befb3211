use std::env;

use super::env_flag;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session lifetime in hours (env: `INVENTARIS_SESSION_TTL_HOURS`)
    pub session_ttl_hours: i64,
    /// Mark the session cookie `Secure` (env: `INVENTARIS_SECURE_COOKIES`)
    pub secure_cookies: bool,
    /// Initial admin created on an empty users table
    /// (env: `INVENTARIS_ADMIN_NO_INDUK`, `INVENTARIS_ADMIN_PASSWORD`)
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub no_induk: String,
    pub password: String,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let bootstrap_admin = match (
            env::var("INVENTARIS_ADMIN_NO_INDUK"),
            env::var("INVENTARIS_ADMIN_PASSWORD"),
        ) {
            (Ok(no_induk), Ok(password)) if !no_induk.trim().is_empty() && !password.is_empty() => {
                Some(BootstrapAdmin {
                    no_induk: no_induk.trim().to_string(),
                    password,
                })
            }
            _ => None,
        };

        Self {
            session_ttl_hours: parse_ttl(env::var("INVENTARIS_SESSION_TTL_HOURS").ok()),
            secure_cookies: env_flag("INVENTARIS_SECURE_COOKIES"),
            bootstrap_admin,
        }
    }
}

fn parse_ttl(raw: Option<String>) -> i64 {
    raw.and_then(|v| v.trim().parse().ok())
        .filter(|h: &i64| *h > 0)
        .unwrap_or(168)
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: 168,
            secure_cookies: false,
            bootstrap_admin: None,
        }
    }
}
