//! # Authorization Guard
//!
//! Centralized owner-or-admin check every mutating operation runs before
//! touching shared state. The actor and festival rows are read on the
//! caller's transaction connection so the decision is never made against
//! state a concurrent transaction is about to change.

use sqlx::PgConnection;
use tracing::warn;

use crate::error::{Result, WristpassError};
use crate::models::{Actor, ActorRole, Festival};

/// Allow iff the actor is an admin, or a promoter owning the festival.
///
/// Any other combination denies, and the caller must treat the denial as
/// fatal to the whole request.
pub async fn ensure_festival_access(
    conn: &mut PgConnection,
    festival_id: i64,
    actor_id: i64,
) -> Result<()> {
    let actor = Actor::find_by_id(&mut *conn, actor_id)
        .await?
        .ok_or(WristpassError::ActorNotFound { id: actor_id })?;

    if actor.is_admin() {
        return Ok(());
    }

    let festival = Festival::find_by_id(&mut *conn, festival_id)
        .await?
        .ok_or(WristpassError::FestivalNotFound { id: festival_id })?;

    if actor.role == ActorRole::Promoter && festival.promoter_id == actor_id {
        return Ok(());
    }

    warn!(
        actor_id,
        role = %actor.role,
        festival_id,
        owner_id = festival.promoter_id,
        "festival access denied"
    );
    Err(WristpassError::PermissionDenied {
        actor_id,
        festival_id,
    })
}

/// Guard for wristband operations (associate, recharge, spend, lookups).
///
/// Cashiers operate wristbands at points of sale without owning anything,
/// so the rule widens to: admin, owning promoter, or any active cashier.
/// Festival management stays owner-or-admin via
/// [`ensure_festival_access`].
pub async fn ensure_wristband_operator(
    conn: &mut PgConnection,
    festival_id: i64,
    actor_id: i64,
) -> Result<()> {
    let actor = Actor::find_by_id(&mut *conn, actor_id)
        .await?
        .ok_or(WristpassError::ActorNotFound { id: actor_id })?;

    if actor.role == ActorRole::Cashier && actor.active {
        return Ok(());
    }

    if actor.is_admin() {
        return Ok(());
    }

    let festival = Festival::find_by_id(&mut *conn, festival_id)
        .await?
        .ok_or(WristpassError::FestivalNotFound { id: festival_id })?;

    if actor.role == ActorRole::Promoter && festival.promoter_id == actor_id {
        return Ok(());
    }

    warn!(
        actor_id,
        role = %actor.role,
        festival_id,
        "wristband operation denied"
    );
    Err(WristpassError::PermissionDenied {
        actor_id,
        festival_id,
    })
}

/// Admin-only gate for festival lifecycle transitions.
pub async fn ensure_admin(conn: &mut PgConnection, actor_id: i64) -> Result<()> {
    let actor = Actor::find_by_id(&mut *conn, actor_id)
        .await?
        .ok_or(WristpassError::ActorNotFound { id: actor_id })?;

    if actor.is_admin() {
        return Ok(());
    }

    warn!(actor_id, role = %actor.role, "admin-only operation denied");
    Err(WristpassError::AdminRequired { actor_id })
}
