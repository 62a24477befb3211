//! Item update tests: change diffing and conditional history writes

use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

mod common;
use common::{
    admin_policy, category_id, create_campus, create_test_db, create_test_item, create_test_room,
    create_test_school, create_test_user, fail_writes,
};

use inventaris::error::AppError;
use inventaris::models::item;
use inventaris::models::prelude::*;
use inventaris::services::access::AccessPolicy;
use inventaris::services::inventory::{update_item, UpdateItemRequest};

/// Request that repeats the item's current state
fn unchanged(found: &item::Model) -> UpdateItemRequest {
    UpdateItemRequest {
        name: found.name.clone(),
        category_id: found.category_id,
        room_id: Some(found.room_id),
        quantity: Some(json!(found.quantity)),
        condition: found.condition.clone(),
        acquisition_date: found.acquisition_date,
        notes: found.notes.clone(),
    }
}

#[tokio::test]
async fn test_identical_update_writes_no_history() {
    let db = create_test_db().await;
    let (_, policy) = admin_policy(&db).await;
    let campus = create_campus(&db).await;
    let meja = create_test_item(&db, campus.room_a.id, campus.perabot, "Meja", 5).await;

    let updated = update_item(&db, &policy, meja.id, unchanged(&meja))
        .await
        .unwrap();

    assert_eq!(updated.quantity, 5);
    assert_eq!(updated.name, "Meja");
    assert_eq!(ItemHistory::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_quantity_change_writes_one_history_row() {
    let db = create_test_db().await;
    let (admin, policy) = admin_policy(&db).await;
    let campus = create_campus(&db).await;
    let meja = create_test_item(&db, campus.room_a.id, campus.perabot, "Meja", 5).await;

    let updated = update_item(
        &db,
        &policy,
        meja.id,
        UpdateItemRequest {
            quantity: Some(json!(3)),
            ..unchanged(&meja)
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.quantity, 3);

    let history = ItemHistory::find().all(&db).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action_type, "update");
    assert_eq!(history[0].quantity, 3);
    assert_eq!(history[0].item_id, Some(meja.id));
    assert_eq!(history[0].user_id, Some(admin.id));
    assert!(history[0]
        .notes
        .as_deref()
        .unwrap()
        .contains("Quantity changed from 5 to 3"));
}

#[tokio::test]
async fn test_changelist_is_semicolon_joined() {
    let db = create_test_db().await;
    let (_, policy) = admin_policy(&db).await;
    let campus = create_campus(&db).await;
    let meja = create_test_item(&db, campus.room_a.id, campus.perabot, "Meja", 5).await;

    update_item(
        &db,
        &policy,
        meja.id,
        UpdateItemRequest {
            name: "Meja Guru".to_string(),
            condition: "Rusak Ringan".to_string(),
            quantity: Some(json!("4")),
            ..unchanged(&meja)
        },
    )
    .await
    .unwrap();

    let row = ItemHistory::find().one(&db).await.unwrap().unwrap();
    let notes = row.notes.unwrap();
    let parts: Vec<&str> = notes.split("; ").collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "Quantity changed from 5 to 4");
    assert!(parts[1].contains("Meja Guru"));
    assert!(parts[2].contains("Rusak Ringan"));
}

#[tokio::test]
async fn test_room_move_is_recorded_as_other_properties() {
    let db = create_test_db().await;
    let (_, policy) = admin_policy(&db).await;
    let campus = create_campus(&db).await;
    let meja = create_test_item(&db, campus.room_a.id, campus.perabot, "Meja", 5).await;

    let updated = update_item(
        &db,
        &policy,
        meja.id,
        UpdateItemRequest {
            room_id: Some(campus.room_b.id),
            ..unchanged(&meja)
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.room_id, campus.room_b.id);

    let row = ItemHistory::find().one(&db).await.unwrap().unwrap();
    assert_eq!(row.notes.as_deref(), Some("Other properties updated"));
    assert_eq!(row.room_id, Some(campus.room_b.id));
}

#[tokio::test]
async fn test_notes_only_change_is_saved_without_history() {
    let db = create_test_db().await;
    let (_, policy) = admin_policy(&db).await;
    let campus = create_campus(&db).await;
    let meja = create_test_item(&db, campus.room_a.id, campus.perabot, "Meja", 5).await;

    let updated = update_item(
        &db,
        &policy,
        meja.id,
        UpdateItemRequest {
            notes: Some("Dipindah ke pojok".to_string()),
            ..unchanged(&meja)
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.notes.as_deref(), Some("Dipindah ke pojok"));
    assert_eq!(ItemHistory::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_room_falls_back_to_current_room() {
    let db = create_test_db().await;
    let (_, policy) = admin_policy(&db).await;
    let campus = create_campus(&db).await;
    let meja = create_test_item(&db, campus.room_a.id, campus.perabot, "Meja", 5).await;

    let updated = update_item(
        &db,
        &policy,
        meja.id,
        UpdateItemRequest {
            room_id: None,
            quantity: Some(json!(6)),
            ..unchanged(&meja)
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.room_id, campus.room_a.id);
    let row = ItemHistory::find().one(&db).await.unwrap().unwrap();
    assert_eq!(row.room_id, Some(campus.room_a.id));
}

#[tokio::test]
async fn test_non_numeric_quantity_counts_as_zero() {
    let db = create_test_db().await;
    let (_, policy) = admin_policy(&db).await;
    let campus = create_campus(&db).await;
    let meja = create_test_item(&db, campus.room_a.id, campus.perabot, "Meja", 5).await;

    let updated = update_item(
        &db,
        &policy,
        meja.id,
        UpdateItemRequest {
            quantity: Some(json!("banyak")),
            ..unchanged(&meja)
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.quantity, 0);
    let row = ItemHistory::find().one(&db).await.unwrap().unwrap();
    assert_eq!(row.notes.as_deref(), Some("Quantity changed from 5 to 0"));
}

#[tokio::test]
async fn test_negative_quantity_is_rejected() {
    let db = create_test_db().await;
    let (_, policy) = admin_policy(&db).await;
    let campus = create_campus(&db).await;
    let meja = create_test_item(&db, campus.room_a.id, campus.perabot, "Meja", 5).await;

    let err = update_item(
        &db,
        &policy,
        meja.id,
        UpdateItemRequest {
            quantity: Some(json!(-1)),
            ..unchanged(&meja)
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    let reread = Item::find_by_id(meja.id).one(&db).await.unwrap().unwrap();
    assert_eq!(reread.quantity, 5);
}

#[tokio::test]
async fn test_dangling_category_or_room_is_validation_error() {
    let db = create_test_db().await;
    let (_, policy) = admin_policy(&db).await;
    let campus = create_campus(&db).await;
    let meja = create_test_item(&db, campus.room_a.id, campus.perabot, "Meja", 5).await;

    let err = update_item(
        &db,
        &policy,
        meja.id,
        UpdateItemRequest {
            category_id: 9999,
            ..unchanged(&meja)
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = update_item(
        &db,
        &policy,
        meja.id,
        UpdateItemRequest {
            room_id: Some(9999),
            ..unchanged(&meja)
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert_eq!(ItemHistory::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_item_is_not_found() {
    let db = create_test_db().await;
    let (_, policy) = admin_policy(&db).await;
    let buku = category_id(&db, "Buku").await;

    let err = update_item(
        &db,
        &policy,
        31337,
        UpdateItemRequest {
            name: "Atlas".to_string(),
            category_id: buku,
            quantity: Some(json!(1)),
            condition: "Baik".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_kepala_sekolah_cannot_move_item_into_other_school() {
    let db = create_test_db().await;
    let campus = create_campus(&db).await;
    let other = create_test_school(&db, "SMP Negeri 2").await;
    let other_room = create_test_room(&db, other.id, "Lab IPA").await;
    let meja = create_test_item(&db, campus.room_a.id, campus.perabot, "Meja", 5).await;

    let kepala = create_test_user(&db, "kepsek-1", "kepala_sekolah", Some(campus.school.id)).await;
    let policy = AccessPolicy::for_user(&kepala);

    let err = update_item(
        &db,
        &policy,
        meja.id,
        UpdateItemRequest {
            room_id: Some(other_room.id),
            ..unchanged(&meja)
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let reread = Item::find_by_id(meja.id).one(&db).await.unwrap().unwrap();
    assert_eq!(reread.room_id, campus.room_a.id);
}

#[tokio::test]
async fn test_kepala_sekolah_cannot_update_item_in_other_school() {
    let db = create_test_db().await;
    let campus = create_campus(&db).await;
    let other = create_test_school(&db, "SMP Negeri 2").await;
    let other_room = create_test_room(&db, other.id, "Lab IPA").await;
    let mikroskop = create_test_item(&db, other_room.id, campus.perabot, "Mikroskop", 2).await;

    let kepala = create_test_user(&db, "kepsek-1", "kepala_sekolah", Some(campus.school.id)).await;
    let policy = AccessPolicy::for_user(&kepala);

    let err = update_item(
        &db,
        &policy,
        mikroskop.id,
        UpdateItemRequest {
            quantity: Some(json!(0)),
            ..unchanged(&mikroskop)
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let reread = Item::find_by_id(mikroskop.id).one(&db).await.unwrap().unwrap();
    assert_eq!(reread.quantity, 2);
    assert_eq!(ItemHistory::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_failed_history_write_rolls_back_update() {
    let db = create_test_db().await;
    let (_, policy) = admin_policy(&db).await;
    let campus = create_campus(&db).await;
    let meja = create_test_item(&db, campus.room_a.id, campus.perabot, "Meja", 5).await;

    // The item UPDATE succeeds; the history insert after it aborts
    fail_writes(&db, "item_history", "INSERT").await;

    let err = update_item(
        &db,
        &policy,
        meja.id,
        UpdateItemRequest {
            name: "Meja Guru".to_string(),
            quantity: Some(json!(2)),
            ..unchanged(&meja)
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Database(_)));

    let reread = Item::find_by_id(meja.id).one(&db).await.unwrap().unwrap();
    assert_eq!(reread.quantity, 5);
    assert_eq!(reread.name, "Meja");
    assert_eq!(Item::find().count(&db).await.unwrap(), 1);
    assert_eq!(ItemTransfer::find().count(&db).await.unwrap(), 0);
    assert_eq!(ItemHistory::find().count(&db).await.unwrap(), 0);
}
