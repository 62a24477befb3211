//! HTTP endpoint integration tests
//!
//! Covers:
//! - `POST /auth/login`, `GET /auth/me`, `POST /auth/logout`
//! - `POST /api/transfers`, `GET /api/transfers`
//! - `POST /api/items`, `PUT /api/items/{id}`, `DELETE /api/items/{id}`
//! - `GET /api/history`, `GET /api/history/stats`
//! - rooms, schools, users and reference data
//! - role permissions and school scoping

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{
    build_test_app, create_campus, create_test_db, create_test_item, create_test_room,
    create_test_school, create_test_user, do_login, login_cookie, send,
};

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let db = create_test_db().await;
    let (status, body) = send(build_test_app(&db), "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_api_requires_session() {
    let db = create_test_db().await;
    let (status, body) = send(build_test_app(&db), "GET", "/api/items", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    let (status, _) = send(
        build_test_app(&db),
        "GET",
        "/api/items",
        Some("inventaris_session=not-a-real-session"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_me_logout_cycle() {
    let db = create_test_db().await;
    create_test_user(&db, "1001", "guru", None).await;

    let (status, cookie) = do_login(build_test_app(&db), "1001", "wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(cookie.is_none());

    let cookie = login_cookie(build_test_app(&db), "1001").await;

    let (status, me) = send(build_test_app(&db), "GET", "/auth/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["no_induk"], "1001");
    assert_eq!(me["role"], "guru");
    assert!(me.get("hashed_password").is_none());

    let (status, _) = send(build_test_app(&db), "POST", "/auth/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(build_test_app(&db), "GET", "/auth/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Transfers
// ============================================================================

#[tokio::test]
async fn test_post_transfer_returns_201_with_names() {
    let db = create_test_db().await;
    create_test_user(&db, "2001", "staff", None).await;
    let campus = create_campus(&db).await;
    let kursi = create_test_item(&db, campus.room_a.id, campus.perabot, "Kursi", 10).await;
    let cookie = login_cookie(build_test_app(&db), "2001").await;

    let (status, body) = send(
        build_test_app(&db),
        "POST",
        "/api/transfers",
        Some(&cookie),
        Some(json!({
            "item_id": kursi.id,
            "from_room_id": campus.room_a.id,
            "to_room_id": campus.room_b.id,
            "quantity": 4,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quantity"], 4);
    assert_eq!(body["item_name"], "Kursi");
    assert_eq!(body["from_room_name"], "Ruang A");
    assert_eq!(body["to_room_name"], "Ruang B");
    assert_eq!(body["transferred_by_name"], "User 2001");

    let (status, list) = send(
        build_test_app(&db),
        "GET",
        &format!("/api/transfers?item_id={}&room_id=", kursi.id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_post_transfer_errors_map_to_status_codes() {
    let db = create_test_db().await;
    create_test_user(&db, "2002", "admin", None).await;
    let campus = create_campus(&db).await;
    let kursi = create_test_item(&db, campus.room_a.id, campus.perabot, "Kursi", 3).await;
    let cookie = login_cookie(build_test_app(&db), "2002").await;

    let cases = [
        (
            json!({"item_id": kursi.id, "from_room_id": campus.room_a.id, "to_room_id": campus.room_a.id, "quantity": 1}),
            StatusCode::BAD_REQUEST,
            "validation_error",
        ),
        (
            json!({"item_id": kursi.id, "from_room_id": campus.room_a.id, "to_room_id": campus.room_b.id, "quantity": 9}),
            StatusCode::BAD_REQUEST,
            "insufficient_quantity",
        ),
        (
            json!({"item_id": kursi.id, "from_room_id": campus.room_a.id, "to_room_id": 9999, "quantity": 1}),
            StatusCode::NOT_FOUND,
            "not_found",
        ),
        (
            json!({"from_room_id": campus.room_a.id, "to_room_id": campus.room_b.id, "quantity": 1}),
            StatusCode::BAD_REQUEST,
            "validation_error",
        ),
    ];

    for (payload, expected_status, expected_code) in cases {
        let (status, body) = send(
            build_test_app(&db),
            "POST",
            "/api/transfers",
            Some(&cookie),
            Some(payload.clone()),
        )
        .await;
        assert_eq!(status, expected_status, "payload {}", payload);
        assert_eq!(body["code"], expected_code, "payload {}", payload);
        assert!(body["message"].is_string());
    }
}

#[tokio::test]
async fn test_murid_cannot_transfer() {
    let db = create_test_db().await;
    create_test_user(&db, "3001", "murid", None).await;
    let campus = create_campus(&db).await;
    let kursi = create_test_item(&db, campus.room_a.id, campus.perabot, "Kursi", 3).await;
    let cookie = login_cookie(build_test_app(&db), "3001").await;

    let (status, body) = send(
        build_test_app(&db),
        "POST",
        "/api/transfers",
        Some(&cookie),
        Some(json!({
            "item_id": kursi.id,
            "from_room_id": campus.room_a.id,
            "to_room_id": campus.room_b.id,
            "quantity": 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    // Viewing stays allowed
    let (status, items) = send(build_test_app(&db), "GET", "/api/items", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_kepala_sekolah_cannot_transfer_out_of_other_school() {
    let db = create_test_db().await;
    let campus = create_campus(&db).await;
    let other = create_test_school(&db, "SMP Negeri 2").await;
    let lab = create_test_room(&db, other.id, "Lab").await;
    let meja = create_test_item(&db, lab.id, campus.perabot, "Meja", 3).await;
    create_test_user(&db, "4001", "kepala_sekolah", Some(campus.school.id)).await;
    let cookie = login_cookie(build_test_app(&db), "4001").await;

    let (status, _) = send(
        build_test_app(&db),
        "POST",
        "/api/transfers",
        Some(&cookie),
        Some(json!({
            "item_id": meja.id,
            "from_room_id": lab.id,
            "to_room_id": campus.room_a.id,
            "quantity": 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Other school's items are invisible in listings
    let (_, items) = send(build_test_app(&db), "GET", "/api/items", Some(&cookie), None).await;
    assert!(items.as_array().unwrap().is_empty());

    let (status, _) = send(
        build_test_app(&db),
        "GET",
        &format!("/api/items/{}", meja.id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ============================================================================
// Items
// ============================================================================

#[tokio::test]
async fn test_item_lifecycle_over_http() {
    let db = create_test_db().await;
    create_test_user(&db, "5001", "guru", None).await;
    let campus = create_campus(&db).await;
    let cookie = login_cookie(build_test_app(&db), "5001").await;

    let (status, created) = send(
        build_test_app(&db),
        "POST",
        "/api/items",
        Some(&cookie),
        Some(json!({
            "name": "Globe",
            "category_id": campus.perabot,
            "room_id": campus.room_a.id,
            "quantity": 5,
            "condition": "Baik",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["room_name"], "Ruang A");
    assert_eq!(created["category_name"], "Perabot");
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        build_test_app(&db),
        "PUT",
        &format!("/api/items/{}", id),
        Some(&cookie),
        Some(json!({
            "name": "Globe",
            "category_id": campus.perabot,
            "room_id": campus.room_a.id,
            "quantity": "3",
            "condition": "Baik",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["quantity"], 3);

    let (status, history) = send(
        build_test_app(&db),
        "GET",
        &format!("/api/history?item_id={}&action_type=update", id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["notes"], "Quantity changed from 5 to 3");
    assert_eq!(history[0]["user_name"], "User 5001");

    let (status, body) = send(
        build_test_app(&db),
        "DELETE",
        &format!("/api/items/{}", id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("Globe"));

    let (status, body) = send(
        build_test_app(&db),
        "GET",
        &format!("/api/items/{}", id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_delete_with_transfer_history_is_400() {
    let db = create_test_db().await;
    create_test_user(&db, "5002", "admin", None).await;
    let campus = create_campus(&db).await;
    let kursi = create_test_item(&db, campus.room_a.id, campus.perabot, "Kursi", 3).await;
    let cookie = login_cookie(build_test_app(&db), "5002").await;

    let (status, _) = send(
        build_test_app(&db),
        "POST",
        "/api/transfers",
        Some(&cookie),
        Some(json!({
            "item_id": kursi.id,
            "from_room_id": campus.room_a.id,
            "to_room_id": campus.room_b.id,
            "quantity": 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        build_test_app(&db),
        "DELETE",
        &format!("/api/items/{}", kursi.id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn test_malformed_body_is_validation_error() {
    let db = create_test_db().await;
    create_test_user(&db, "5003", "admin", None).await;
    let cookie = login_cookie(build_test_app(&db), "5003").await;

    let (status, body) = send(
        build_test_app(&db),
        "POST",
        "/api/items",
        Some(&cookie),
        Some(json!({"name": "Tanpa ruang"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
}

#[tokio::test]
async fn test_item_filters() {
    let db = create_test_db().await;
    create_test_user(&db, "5004", "admin", None).await;
    let campus = create_campus(&db).await;
    create_test_item(&db, campus.room_a.id, campus.perabot, "Kursi Lipat", 3).await;
    create_test_item(&db, campus.room_b.id, campus.perabot, "Meja", 1).await;
    let cookie = login_cookie(build_test_app(&db), "5004").await;

    let (_, by_room) = send(
        build_test_app(&db),
        "GET",
        &format!("/api/items?room_id={}", campus.room_b.id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(by_room.as_array().unwrap().len(), 1);
    assert_eq!(by_room[0]["name"], "Meja");

    let (_, searched) = send(
        build_test_app(&db),
        "GET",
        "/api/items?search=Lipat",
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(searched.as_array().unwrap().len(), 1);

    let (_, by_school) = send(
        build_test_app(&db),
        "GET",
        &format!("/api/items?school_id={}", campus.school.id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(by_school.as_array().unwrap().len(), 2);
}

// ============================================================================
// Rooms, schools, users, reference data
// ============================================================================

#[tokio::test]
async fn test_room_with_items_cannot_be_deleted() {
    let db = create_test_db().await;
    create_test_user(&db, "6001", "admin", None).await;
    let campus = create_campus(&db).await;
    create_test_item(&db, campus.room_a.id, campus.perabot, "Kursi", 1).await;
    let cookie = login_cookie(build_test_app(&db), "6001").await;

    let (status, body) = send(
        build_test_app(&db),
        "DELETE",
        &format!("/api/rooms/{}", campus.room_a.id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "conflict");

    let (status, _) = send(
        build_test_app(&db),
        "DELETE",
        &format!("/api/rooms/{}", campus.room_b.id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_room_create_and_school_delete_guard() {
    let db = create_test_db().await;
    create_test_user(&db, "6002", "admin", None).await;
    let school = create_test_school(&db, "SD Negeri 3").await;
    let cookie = login_cookie(build_test_app(&db), "6002").await;

    let (status, room) = send(
        build_test_app(&db),
        "POST",
        "/api/rooms",
        Some(&cookie),
        Some(json!({
            "name": "Perpustakaan",
            "school_id": school.id,
            "floor": "2",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(room["school_name"], "SD Negeri 3");
    assert_eq!(room["item_count"], 0);

    let (status, body) = send(
        build_test_app(&db),
        "DELETE",
        &format!("/api/schools/{}", school.id),
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn test_guru_cannot_manage_rooms_or_schools() {
    let db = create_test_db().await;
    create_test_user(&db, "6003", "guru", None).await;
    let school = create_test_school(&db, "SD Negeri 4").await;
    let cookie = login_cookie(build_test_app(&db), "6003").await;

    let (status, _) = send(
        build_test_app(&db),
        "POST",
        "/api/rooms",
        Some(&cookie),
        Some(json!({"name": "Kelas 1", "school_id": school.id})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        build_test_app(&db),
        "POST",
        "/api/schools",
        Some(&cookie),
        Some(json!({"name": "Sekolah Baru"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_user_creation_and_duplicates() {
    let db = create_test_db().await;
    create_test_user(&db, "7001", "admin", None).await;
    let cookie = login_cookie(build_test_app(&db), "7001").await;

    let payload = json!({
        "name": "Siti",
        "no_induk": "7002",
        "phone": "081234",
        "password": "rahasia123",
        "role": "guru",
    });

    let (status, created) = send(
        build_test_app(&db),
        "POST",
        "/api/users",
        Some(&cookie),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["role"], "guru");

    let (status, body) = send(
        build_test_app(&db),
        "POST",
        "/api/users",
        Some(&cookie),
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "conflict");

    let (status, _) = send(
        build_test_app(&db),
        "POST",
        "/api/users",
        Some(&cookie),
        Some(json!({
            "name": "Budi",
            "no_induk": "7003",
            "phone": "081234",
            "password": "rahasia123",
            "role": "guru",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        build_test_app(&db),
        "POST",
        "/api/users",
        Some(&cookie),
        Some(json!({
            "name": "Joko",
            "no_induk": "7004",
            "password": "rahasia123",
            "role": "superuser",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reference_data_is_seeded() {
    let db = create_test_db().await;
    create_test_user(&db, "8001", "murid", None).await;
    let cookie = login_cookie(build_test_app(&db), "8001").await;

    let (status, categories) =
        send(build_test_app(&db), "GET", "/api/categories", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(categories.as_array().unwrap().len(), 3);

    let (_, types) = send(build_test_app(&db), "GET", "/api/room-types", Some(&cookie), None).await;
    assert_eq!(types.as_array().unwrap().len(), 5);

    let (_, statuses) =
        send(build_test_app(&db), "GET", "/api/room-statuses", Some(&cookie), None).await;
    assert_eq!(statuses.as_array().unwrap().len(), 3);

    // Viewing only; murid cannot add categories
    let (status, _) = send(
        build_test_app(&db),
        "POST",
        "/api/categories",
        Some(&cookie),
        Some(json!({"name": "Olahraga"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_history_stats_endpoint() {
    let db = create_test_db().await;
    create_test_user(&db, "9001", "staff", None).await;
    let campus = create_campus(&db).await;
    let kursi = create_test_item(&db, campus.room_a.id, campus.perabot, "Kursi", 3).await;
    let cookie = login_cookie(build_test_app(&db), "9001").await;

    send(
        build_test_app(&db),
        "POST",
        "/api/transfers",
        Some(&cookie),
        Some(json!({
            "item_id": kursi.id,
            "from_room_id": campus.room_a.id,
            "to_room_id": campus.room_b.id,
            "quantity": 1,
        })),
    )
    .await;

    let (status, stats) = send(
        build_test_app(&db),
        "GET",
        "/api/history/stats",
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_events"], 1);
    assert_eq!(stats["total_transfers"], 1);
}
