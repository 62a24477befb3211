pub mod access;
pub mod history;
pub mod inventory;
pub mod security;

pub use access::{AccessPolicy, SchoolScope};
pub use security::{hash_password, verify_password};
