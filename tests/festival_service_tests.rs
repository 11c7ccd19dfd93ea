//! Festival CRUD and ticket type management around the state machine.

mod common;

use sqlx::PgPool;
use wristpass::error::WristpassError;
use wristpass::festivals::FestivalService;
use wristpass::models::{ActorRole, FestivalChanges, NewFestival, NewTicketType};
use wristpass::state_machine::FestivalState;

fn new_festival() -> NewFestival {
    NewFestival {
        name: "Riverlights".to_string(),
        description: Some("Three days by the river".to_string()),
        start_date: chrono::NaiveDate::from_ymd_opt(2026, 7, 10).unwrap(),
        end_date: chrono::NaiveDate::from_ymd_opt(2026, 7, 12).unwrap(),
        location: Some("Valencia".to_string()),
        capacity: Some(20_000),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn festivals_are_created_in_draft_by_their_promoter(pool: PgPool) {
    let promoter = common::create_actor(&pool, ActorRole::Promoter).await;
    let service = FestivalService::new(pool.clone());

    let festival = service
        .create_festival(new_festival(), promoter.actor_id)
        .await
        .expect("create");
    assert_eq!(festival.state, FestivalState::Draft);
    assert_eq!(festival.promoter_id, promoter.actor_id);

    // Admins and cashiers cannot take the promoter seat.
    let admin = common::create_actor(&pool, ActorRole::Admin).await;
    let err = service
        .create_festival(new_festival(), admin.actor_id)
        .await
        .unwrap_err();
    assert!(matches!(err, WristpassError::ActorNotFound { .. }));
}

#[sqlx::test(migrations = "./migrations")]
async fn metadata_updates_validate_the_combined_date_range(pool: PgPool) {
    let promoter = common::create_actor(&pool, ActorRole::Promoter).await;
    let service = FestivalService::new(pool.clone());
    let festival = service
        .create_festival(new_festival(), promoter.actor_id)
        .await
        .unwrap();

    // Moving only the end date before the existing start must fail.
    let err = service
        .update_festival(
            festival.festival_id,
            FestivalChanges {
                end_date: chrono::NaiveDate::from_ymd_opt(2026, 7, 1),
                ..FestivalChanges::default()
            },
            promoter.actor_id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WristpassError::Validation(_)));

    let updated = service
        .update_festival(
            festival.festival_id,
            FestivalChanges {
                name: Some("Riverlights XL".to_string()),
                capacity: Some(25_000),
                ..FestivalChanges::default()
            },
            promoter.actor_id,
        )
        .await
        .expect("update");
    assert_eq!(updated.name, "Riverlights XL");
    assert_eq!(updated.capacity, Some(25_000));
    assert_eq!(updated.state, FestivalState::Draft, "state untouched");
}

#[sqlx::test(migrations = "./migrations")]
async fn deletion_is_refused_while_tickets_exist(pool: PgPool) {
    let promoter = common::create_actor(&pool, ActorRole::Promoter).await;
    let service = FestivalService::new(pool.clone());
    let festival = service
        .create_festival(new_festival(), promoter.actor_id)
        .await
        .unwrap();
    let ticket_type = common::create_ticket_type(&pool, festival.festival_id, "25.00", 5, false).await;
    common::mint_tickets(&pool, &ticket_type, 1).await;

    let err = service
        .delete_festival(festival.festival_id, promoter.actor_id)
        .await
        .unwrap_err();
    assert!(matches!(err, WristpassError::FestivalHasTickets { .. }));

    assert!(service
        .find_festival(festival.festival_id)
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn ticketless_festival_can_be_deleted_by_its_owner(pool: PgPool) {
    let promoter = common::create_actor(&pool, ActorRole::Promoter).await;
    let service = FestivalService::new(pool.clone());
    let festival = service
        .create_festival(new_festival(), promoter.actor_id)
        .await
        .unwrap();

    service
        .delete_festival(festival.festival_id, promoter.actor_id)
        .await
        .expect("delete");
    assert!(service
        .find_festival(festival.festival_id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn ticket_types_require_festival_access(pool: PgPool) {
    let owner = common::create_actor(&pool, ActorRole::Promoter).await;
    let outsider = common::create_actor(&pool, ActorRole::Promoter).await;
    let service = FestivalService::new(pool.clone());
    let festival = service
        .create_festival(new_festival(), owner.actor_id)
        .await
        .unwrap();

    let new_type = |festival_id| NewTicketType {
        festival_id,
        name: "VIP".to_string(),
        description: None,
        price: common::decimal("90.00"),
        stock: 200,
        requires_nomination: true,
    };

    let err = service
        .add_ticket_type(new_type(festival.festival_id), outsider.actor_id)
        .await
        .unwrap_err();
    assert!(matches!(err, WristpassError::PermissionDenied { .. }));

    let created = service
        .add_ticket_type(new_type(festival.festival_id), owner.actor_id)
        .await
        .expect("create ticket type");
    assert!(created.requires_nomination);
    assert_eq!(created.stock, 200);

    let listed = service.list_ticket_types(festival.festival_id).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn published_listing_filters_by_window_and_state(pool: PgPool) {
    let promoter = common::create_actor(&pool, ActorRole::Promoter).await;
    let service = FestivalService::new(pool.clone());

    let festival = service
        .create_festival(new_festival(), promoter.actor_id)
        .await
        .unwrap();
    common::force_festival_state(&pool, festival.festival_id, FestivalState::Published).await;

    let draft = service
        .create_festival(new_festival(), promoter.actor_id)
        .await
        .unwrap();

    let in_window = service
        .list_published_between(
            chrono::NaiveDate::from_ymd_opt(2026, 7, 1),
            chrono::NaiveDate::from_ymd_opt(2026, 7, 31),
        )
        .await
        .unwrap();
    assert_eq!(in_window.len(), 1);
    assert_eq!(in_window[0].festival_id, festival.festival_id);

    let out_of_window = service
        .list_published_between(
            chrono::NaiveDate::from_ymd_opt(2026, 9, 1),
            chrono::NaiveDate::from_ymd_opt(2026, 9, 30),
        )
        .await
        .unwrap();
    assert!(out_of_window.is_empty());

    let drafts = service.list_by_state(FestivalState::Draft).await.unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].festival_id, draft.festival_id);
}
