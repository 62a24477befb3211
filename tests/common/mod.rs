//! Test helpers and utilities for integration testing.
//!
//! Builds an in-memory SQLite database with every migration applied and seeds
//! schools, rooms, users and items through SeaORM active models.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Set,
};
use sea_orm_migration::MigratorTrait;
use tower::util::ServiceExt;

use inventaris::config::auth::AuthConfig;
use inventaris::endpoints::create_router;
use inventaris::migrations::Migrator;
use inventaris::models::{item, room, school, user};
use inventaris::services::access::AccessPolicy;
use inventaris::state::AppState;

/// Password shared by every fixture user
pub const TEST_PASSWORD: &str = "rahasia123";

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    // Every connection to sqlite::memory: gets its own database, so keep one
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

pub fn build_test_app_state(db: DatabaseConnection) -> AppState {
    AppState::new(db, AuthConfig::default())
}

pub fn build_test_app(db: &DatabaseConnection) -> Router {
    create_router(build_test_app_state(db.clone()))
}

pub async fn create_test_school(db: &DatabaseConnection, name: &str) -> school::Model {
    let now = chrono::Utc::now();
    school::ActiveModel {
        name: Set(name.to_string()),
        address: Set(Some("Jl. Merdeka 1".to_string())),
        phone: Set(None),
        email: Set(None),
        kepala_sekolah_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn create_test_room(
    db: &DatabaseConnection,
    school_id: i64,
    name: &str,
) -> room::Model {
    let now = chrono::Utc::now();
    room::ActiveModel {
        name: Set(name.to_string()),
        school_id: Set(school_id),
        status_id: Set(None),
        type_id: Set(None),
        responsible_user_id: Set(None),
        floor: Set(Some("1".to_string())),
        building: Set(None),
        notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

/// Seeded category id by name ("Perabot", "Peralatan", "Buku")
pub async fn category_id(db: &DatabaseConnection, name: &str) -> i64 {
    use inventaris::models::category;
    use inventaris::models::prelude::Category;
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

    Category::find()
        .filter(category::Column::Name.eq(name))
        .one(db)
        .await
        .unwrap()
        .expect("Seeded category not found")
        .id
}

pub async fn create_test_item(
    db: &DatabaseConnection,
    room_id: i64,
    category_id: i64,
    name: &str,
    quantity: i32,
) -> item::Model {
    let now = chrono::Utc::now();
    item::ActiveModel {
        name: Set(name.to_string()),
        category_id: Set(category_id),
        room_id: Set(room_id),
        quantity: Set(quantity),
        condition: Set("Baik".to_string()),
        acquisition_date: Set(chrono::NaiveDate::from_ymd_opt(2024, 7, 15)),
        notes: Set(Some("Pengadaan BOS".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

/// Create a user with the given role; the password is always `TEST_PASSWORD`
pub async fn create_test_user(
    db: &DatabaseConnection,
    no_induk: &str,
    role: &str,
    school_id: Option<i64>,
) -> user::Model {
    // Minimum bcrypt cost keeps the suite fast
    let hashed = bcrypt::hash(TEST_PASSWORD, 4).unwrap();
    let now = chrono::Utc::now();

    user::ActiveModel {
        name: Set(format!("User {}", no_induk)),
        no_induk: Set(no_induk.to_string()),
        phone: Set(None),
        hashed_password: Set(hashed),
        role: Set(role.to_string()),
        school_id: Set(school_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

/// Policy for an admin fixture user
pub async fn admin_policy(db: &DatabaseConnection) -> (user::Model, AccessPolicy) {
    let admin = create_test_user(db, "admin-1", "admin", None).await;
    let policy = AccessPolicy::for_user(&admin);
    (admin, policy)
}

/// Two rooms in one school, the usual transfer setup
pub struct Campus {
    pub school: school::Model,
    pub room_a: room::Model,
    pub room_b: room::Model,
    pub perabot: i64,
}

pub async fn create_campus(db: &DatabaseConnection) -> Campus {
    let school = create_test_school(db, "SMA Negeri 1").await;
    let room_a = create_test_room(db, school.id, "Ruang A").await;
    let room_b = create_test_room(db, school.id, "Ruang B").await;
    let perabot = category_id(db, "Perabot").await;
    Campus {
        school,
        room_a,
        room_b,
        perabot,
    }
}

/// Make every `event` (INSERT, UPDATE or DELETE) on `table` abort.
///
/// Lets a test fail one statement in the middle of a service transaction.
pub async fn fail_writes(db: &DatabaseConnection, table: &str, event: &str) {
    let sql = format!(
        "CREATE TRIGGER fail_{event}_{table} BEFORE {event} ON {table} \
         BEGIN SELECT RAISE(ABORT, 'write refused'); END",
        event = event.to_lowercase(),
        table = table,
    );
    db.execute_unprepared(&sql).await.unwrap();
}

// ============================================================================
// HTTP helpers
// ============================================================================

/// POST /auth/login and return (status, "inventaris_session=..." cookie pair)
pub async fn do_login(app: Router, no_induk: &str, password: &str) -> (StatusCode, Option<String>) {
    let body = serde_json::json!({
        "no_induk": no_induk,
        "password": password,
    })
    .to_string();

    let request = Request::builder()
        .uri("/auth/login")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();

    let cookie = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .find_map(|v| {
            let s = v.to_str().ok()?;
            s.starts_with("inventaris_session=")
                .then(|| s.split(';').next().unwrap().to_string())
        });

    (status, cookie)
}

/// Log in as a fixture user and return the session cookie
pub async fn login_cookie(app: Router, no_induk: &str) -> String {
    let (status, cookie) = do_login(app, no_induk, TEST_PASSWORD).await;
    assert_eq!(status, StatusCode::OK, "login failed for {}", no_induk);
    cookie.expect("login did not set a session cookie")
}

/// Send a request with an optional cookie and JSON body, returning status + JSON body
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}
