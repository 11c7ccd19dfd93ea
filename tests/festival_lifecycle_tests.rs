//! Festival lifecycle transitions against a live database.

mod common;

use sqlx::PgPool;
use wristpass::error::WristpassError;
use wristpass::models::ActorRole;
use wristpass::state_machine::{
    FestivalEvent, FestivalState, FestivalStateMachine, FestivalStateTransition,
};

#[sqlx::test(migrations = "./migrations")]
async fn draft_publishes_and_leaves_an_audit_row(pool: PgPool) {
    let admin = common::create_actor(&pool, ActorRole::Admin).await;
    let promoter = common::create_actor(&pool, ActorRole::Promoter).await;
    let festival = common::create_festival(&pool, promoter.actor_id).await;

    let machine = FestivalStateMachine::new(pool.clone());
    let published = machine
        .transition(festival.festival_id, FestivalEvent::Publish, admin.actor_id)
        .await
        .expect("publish");
    assert_eq!(published.state, FestivalState::Published);

    let mut conn = pool.acquire().await.unwrap();
    let audit = FestivalStateTransition::list_for_festival(&mut conn, festival.festival_id)
        .await
        .unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].from_state, FestivalState::Draft);
    assert_eq!(audit[0].to_state, FestivalState::Published);
    assert_eq!(audit[0].actor_id, admin.actor_id);
}

#[sqlx::test(migrations = "./migrations")]
async fn draft_cannot_finish(pool: PgPool) {
    let admin = common::create_actor(&pool, ActorRole::Admin).await;
    let promoter = common::create_actor(&pool, ActorRole::Promoter).await;
    let festival = common::create_festival(&pool, promoter.actor_id).await;

    let machine = FestivalStateMachine::new(pool.clone());
    let err = machine
        .transition(festival.festival_id, FestivalEvent::Finish, admin.actor_id)
        .await
        .unwrap_err();
    assert!(matches!(err, WristpassError::InvalidStateTransition { .. }));

    // Nothing moved, nothing audited.
    let mut conn = pool.acquire().await.unwrap();
    let audit = FestivalStateTransition::list_for_festival(&mut conn, festival.festival_id)
        .await
        .unwrap();
    assert!(audit.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn terminal_states_reject_everything_but_noop(pool: PgPool) {
    let admin = common::create_actor(&pool, ActorRole::Admin).await;
    let promoter = common::create_actor(&pool, ActorRole::Promoter).await;
    let festival = common::create_festival(&pool, promoter.actor_id).await;
    common::force_festival_state(&pool, festival.festival_id, FestivalState::Cancelled).await;

    let machine = FestivalStateMachine::new(pool.clone());

    let err = machine
        .transition(festival.festival_id, FestivalEvent::Publish, admin.actor_id)
        .await
        .unwrap_err();
    assert!(matches!(err, WristpassError::InvalidStateTransition { .. }));

    // Re-applying the current state is accepted without a new audit row.
    let unchanged = machine
        .transition(festival.festival_id, FestivalEvent::Cancel, admin.actor_id)
        .await
        .expect("no-op cancel");
    assert_eq!(unchanged.state, FestivalState::Cancelled);

    let mut conn = pool.acquire().await.unwrap();
    let audit = FestivalStateTransition::list_for_festival(&mut conn, festival.festival_id)
        .await
        .unwrap();
    assert!(audit.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn published_can_finish(pool: PgPool) {
    let admin = common::create_actor(&pool, ActorRole::Admin).await;
    let promoter = common::create_actor(&pool, ActorRole::Promoter).await;
    let festival = common::published_festival(&pool, promoter.actor_id).await;

    let machine = FestivalStateMachine::new(pool.clone());
    let finished = machine
        .transition(festival.festival_id, FestivalEvent::Finish, admin.actor_id)
        .await
        .expect("finish");
    assert_eq!(finished.state, FestivalState::Finished);
}

#[sqlx::test(migrations = "./migrations")]
async fn only_admins_drive_transitions(pool: PgPool) {
    let promoter = common::create_actor(&pool, ActorRole::Promoter).await;
    let festival = common::create_festival(&pool, promoter.actor_id).await;

    let machine = FestivalStateMachine::new(pool.clone());

    // Not even the owning promoter may publish.
    let err = machine
        .transition(
            festival.festival_id,
            FestivalEvent::Publish,
            promoter.actor_id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WristpassError::AdminRequired { .. }));

    let mut conn = pool.acquire().await.unwrap();
    let current = wristpass::models::Festival::find_by_id(&mut conn, festival.festival_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(current.state, FestivalState::Draft);
}

#[sqlx::test(migrations = "./migrations")]
async fn unknown_festival_is_not_found(pool: PgPool) {
    let admin = common::create_actor(&pool, ActorRole::Admin).await;
    let machine = FestivalStateMachine::new(pool.clone());
    let err = machine
        .transition(999_999, FestivalEvent::Publish, admin.actor_id)
        .await
        .unwrap_err();
    assert!(matches!(err, WristpassError::FestivalNotFound { .. }));
}
