//! # Wristband Ledger
//!
//! Owns every wristband's cashless balance and its at-most-one active-ticket
//! binding. All three mutations (associate, recharge, spend) run inside one
//! transaction and take the per-wristband exclusive lock before the first
//! read of balance or binding, so concurrent operations on the same band
//! serialize while different bands proceed in parallel.
//!
//! Wristbands are created lazily: the first association of an unseen UID
//! materializes the row with a zero balance, pinned to the ticket's festival
//! for the rest of its life.

use bigdecimal::BigDecimal;
use sqlx::PgPool;
use tracing::info;

use crate::authorization;
use crate::error::{Result, WristpassError};
use crate::models::{Recharge, Spend, Ticket, TicketContext, Wristband};
use crate::money;

/// Inputs for a balance top-up.
#[derive(Debug, Clone)]
pub struct RechargeRequest {
    pub wristband_uid: String,
    pub amount: BigDecimal,
    pub payment_method: Option<String>,
    pub operator_id: i64,
    pub festival_id: i64,
}

/// Inputs for a point-of-sale debit.
#[derive(Debug, Clone)]
pub struct SpendRequest {
    pub wristband_uid: String,
    pub amount: BigDecimal,
    pub description: String,
    pub festival_id: i64,
    pub point_of_sale_id: Option<i64>,
    pub actor_id: i64,
}

pub struct WristbandLedger {
    pool: PgPool,
}

impl WristbandLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bind a wristband to a ticket, redeeming the ticket.
    ///
    /// The ticket must be `Active`, nominated when its type requires it, and
    /// belong to a published festival the actor may operate on. An existing
    /// wristband must be active, festival-compatible, and not bound to a
    /// different ticket; an unseen UID is created on the spot. The ticket
    /// transitions to `Used` in the same transaction.
    pub async fn associate_to_ticket(
        &self,
        wristband_uid: &str,
        ticket_id: i64,
        actor_id: i64,
    ) -> Result<Wristband> {
        ensure_uid(wristband_uid)?;

        let mut tx = self.pool.begin().await?;

        let context = Ticket::load_context(&mut *tx, ticket_id)
            .await?
            .ok_or_else(|| WristpassError::TicketNotFound {
                reference: format!("id {ticket_id}"),
            })?;

        authorization::ensure_wristband_operator(&mut *tx, context.festival_id, actor_id).await?;

        let wristband = Self::associate_locked(&mut tx, wristband_uid, &context).await?;

        tx.commit().await?;
        Ok(wristband)
    }

    /// Point-of-sale association keyed by the ticket's redemption code.
    ///
    /// Unauthenticated: the redemption code itself is the credential. An
    /// optional festival hint rejects tickets scanned at the wrong festival.
    pub async fn associate_by_redemption_code(
        &self,
        redemption_code: &str,
        wristband_uid: &str,
        festival_hint: Option<i64>,
    ) -> Result<Wristband> {
        ensure_uid(wristband_uid)?;
        if redemption_code.trim().is_empty() {
            return Err(WristpassError::Validation(
                "redemption code is required".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let context = Ticket::load_context_by_code(&mut *tx, redemption_code)
            .await?
            .ok_or_else(|| WristpassError::TicketNotFound {
                reference: "redemption code".to_string(),
            })?;

        if let Some(expected_festival) = festival_hint {
            if context.festival_id != expected_festival {
                return Err(WristpassError::CrossFestivalConflict {
                    uid: wristband_uid.to_string(),
                });
            }
        }

        let wristband = Self::associate_locked(&mut tx, wristband_uid, &context).await?;

        tx.commit().await?;
        Ok(wristband)
    }

    /// Top up a balance. Requires the operator to be authorized on the
    /// festival the wristband belongs to; appends a `Recharge` audit row.
    pub async fn recharge(&self, request: RechargeRequest) -> Result<Wristband> {
        ensure_uid(&request.wristband_uid)?;
        if !money::is_positive(&request.amount) {
            return Err(WristpassError::Validation(
                "recharge amount must be positive".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        authorization::ensure_wristband_operator(&mut *tx, request.festival_id, request.operator_id)
            .await?;

        let wristband =
            Self::lock_for_festival(&mut tx, &request.wristband_uid, request.festival_id).await?;

        Recharge::create(
            &mut *tx,
            wristband.wristband_id,
            &request.amount,
            request.payment_method.as_deref(),
            Some(request.operator_id),
        )
        .await?;

        let updated = Wristband::set_balance(
            &mut *tx,
            wristband.wristband_id,
            wristband.balance + &request.amount,
        )
        .await?;

        tx.commit().await?;

        info!(
            uid = %updated.uid,
            amount = %request.amount,
            balance = %updated.balance,
            operator_id = request.operator_id,
            "wristband recharged"
        );
        Ok(updated)
    }

    /// Debit a balance at a point of sale. Fails with `InsufficientBalance`
    /// when the balance cannot cover the amount; appends a `Spend` audit row.
    pub async fn spend(&self, request: SpendRequest) -> Result<Wristband> {
        ensure_uid(&request.wristband_uid)?;
        if !money::is_positive(&request.amount) {
            return Err(WristpassError::Validation(
                "spend amount must be positive".to_string(),
            ));
        }
        if request.description.trim().is_empty() {
            return Err(WristpassError::Validation(
                "spend description is required".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        authorization::ensure_wristband_operator(&mut *tx, request.festival_id, request.actor_id)
            .await?;

        let wristband =
            Self::lock_for_festival(&mut tx, &request.wristband_uid, request.festival_id).await?;

        if wristband.balance < request.amount {
            return Err(WristpassError::InsufficientBalance {
                balance: wristband.balance.to_string(),
                requested: request.amount.to_string(),
            });
        }

        Spend::create(
            &mut *tx,
            wristband.wristband_id,
            &request.amount,
            request.description.trim(),
            request.festival_id,
            request.point_of_sale_id,
        )
        .await?;

        let updated = Wristband::set_balance(
            &mut *tx,
            wristband.wristband_id,
            wristband.balance - &request.amount,
        )
        .await?;

        tx.commit().await?;

        info!(
            uid = %updated.uid,
            amount = %request.amount,
            balance = %updated.balance,
            "wristband spend recorded"
        );
        Ok(updated)
    }

    /// Guard-protected lookup by UID.
    pub async fn find_by_uid(&self, uid: &str, actor_id: i64) -> Result<Option<Wristband>> {
        let mut conn = self.pool.acquire().await?;
        let Some(wristband) = Wristband::find_by_uid(&mut *conn, uid).await? else {
            return Ok(None);
        };
        if let Some(festival_id) = wristband.festival_id {
            authorization::ensure_wristband_operator(&mut *conn, festival_id, actor_id).await?;
        }
        Ok(Some(wristband))
    }

    /// Current balance, zero when the UID is unseen.
    pub async fn balance_of(&self, uid: &str, actor_id: i64) -> Result<BigDecimal> {
        Ok(self
            .find_by_uid(uid, actor_id)
            .await?
            .map(|w| w.balance)
            .unwrap_or_else(|| BigDecimal::from(0)))
    }

    /// All wristbands of a festival, guard-protected. Read-only, no locks.
    pub async fn list_by_festival(
        &self,
        festival_id: i64,
        actor_id: i64,
    ) -> Result<Vec<Wristband>> {
        let mut conn = self.pool.acquire().await?;
        authorization::ensure_wristband_operator(&mut *conn, festival_id, actor_id).await?;
        Ok(Wristband::list_by_festival(&mut *conn, festival_id).await?)
    }

    /// Shared association core: validates the ticket, locks (or creates) the
    /// wristband, binds both sides, and redeems the ticket. Caller owns the
    /// transaction.
    async fn associate_locked(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        uid: &str,
        context: &TicketContext,
    ) -> Result<Wristband> {
        if !context.state.is_active() {
            return Err(WristpassError::TicketNotActive {
                id: context.ticket_id,
                state: context.state.to_string(),
            });
        }
        if context.requires_nomination && context.attendee_id.is_none() {
            return Err(WristpassError::TicketNotNominated {
                id: context.ticket_id,
            });
        }
        if !context.festival_state.allows_operations() {
            return Err(WristpassError::FestivalNotPublished {
                name: context.festival_name.clone(),
            });
        }

        let wristband = match Wristband::lock_by_uid(&mut *tx, uid).await? {
            Some(existing) => {
                if !existing.active {
                    return Err(WristpassError::WristbandInactive {
                        uid: uid.to_string(),
                    });
                }
                if let Some(bound_ticket) = existing.ticket_id {
                    if bound_ticket != context.ticket_id {
                        return Err(WristpassError::WristbandAlreadyBound {
                            uid: uid.to_string(),
                        });
                    }
                }
                if let Some(festival_id) = existing.festival_id {
                    if festival_id != context.festival_id {
                        return Err(WristpassError::CrossFestivalConflict {
                            uid: uid.to_string(),
                        });
                    }
                }
                Wristband::bind_to_ticket(
                    &mut *tx,
                    existing.wristband_id,
                    context.ticket_id,
                    context.festival_id,
                )
                .await?
            }
            None => {
                Wristband::create_bound(&mut *tx, uid, context.ticket_id, context.festival_id)
                    .await?
            }
        };

        // Replacement flow: any wristband previously bound to this ticket is
        // fully unbound in the same transaction.
        Wristband::unbind_others_from_ticket(
            &mut *tx,
            context.ticket_id,
            wristband.wristband_id,
        )
        .await?;

        Ticket::mark_used(&mut *tx, context.ticket_id).await?;

        info!(
            uid = %wristband.uid,
            ticket_id = context.ticket_id,
            festival_id = context.festival_id,
            "wristband associated, ticket redeemed"
        );
        Ok(wristband)
    }

    /// Lock a wristband by UID and check it belongs to the festival the
    /// operation claims to act for, and is active.
    async fn lock_for_festival(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        uid: &str,
        festival_id: i64,
    ) -> Result<Wristband> {
        let wristband = Wristband::lock_by_uid(&mut *tx, uid)
            .await?
            .ok_or_else(|| WristpassError::WristbandNotFound {
                uid: uid.to_string(),
            })?;

        if wristband.festival_id != Some(festival_id) {
            return Err(WristpassError::CrossFestivalConflict {
                uid: uid.to_string(),
            });
        }
        if !wristband.active {
            return Err(WristpassError::WristbandInactive {
                uid: uid.to_string(),
            });
        }
        Ok(wristband)
    }
}

fn ensure_uid(uid: &str) -> Result<()> {
    if uid.trim().is_empty() {
        return Err(WristpassError::Validation(
            "wristband uid is required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_uid_rejected() {
        assert!(ensure_uid("").is_err());
        assert!(ensure_uid("  ").is_err());
        assert!(ensure_uid("04:A3:1F:22").is_ok());
    }
}
