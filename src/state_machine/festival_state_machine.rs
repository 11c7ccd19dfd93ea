//! # Festival State Machine
//!
//! Exhaustive transition table for the festival lifecycle. Only admins drive
//! transitions; re-applying the current state is an accepted no-op, terminal
//! states reject everything else.

use sqlx::PgPool;
use tracing::info;

use super::events::FestivalEvent;
use super::persistence::FestivalStateTransition;
use super::states::FestivalState;
use crate::authorization;
use crate::error::{Result, WristpassError};
use crate::models::Festival;

pub struct FestivalStateMachine {
    pool: PgPool,
}

impl FestivalStateMachine {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Determine the target state for `event`, or reject the transition.
    ///
    /// Pure table: `Draft → {Published, Cancelled}`,
    /// `Published → {Cancelled, Finished}`, terminal states admit nothing.
    /// Same-state re-application is reported as `None` (accepted, no write).
    pub fn determine_target_state(
        current_state: FestivalState,
        event: FestivalEvent,
    ) -> Result<Option<FestivalState>> {
        let target = event.target_state();
        if current_state == target {
            return Ok(None);
        }

        let allowed = match (current_state, event) {
            (FestivalState::Draft, FestivalEvent::Publish) => true,
            (FestivalState::Draft, FestivalEvent::Cancel) => true,
            (FestivalState::Published, FestivalEvent::Cancel) => true,
            (FestivalState::Published, FestivalEvent::Finish) => true,
            _ => false,
        };

        if allowed {
            Ok(Some(target))
        } else {
            Err(WristpassError::InvalidStateTransition {
                from: current_state.to_string(),
                to: target.to_string(),
            })
        }
    }

    /// Attempt to transition a festival. Admin-only; the actor and festival
    /// are read inside the same transaction as the write.
    pub async fn transition(
        &self,
        festival_id: i64,
        event: FestivalEvent,
        actor_id: i64,
    ) -> Result<Festival> {
        let mut tx = self.pool.begin().await?;

        authorization::ensure_admin(&mut *tx, actor_id).await?;

        let festival = Festival::find_by_id(&mut *tx, festival_id)
            .await?
            .ok_or(WristpassError::FestivalNotFound { id: festival_id })?;

        let Some(target) = Self::determine_target_state(festival.state, event)? else {
            // No-op re-application of the current state.
            tx.commit().await?;
            return Ok(festival);
        };

        let updated = Festival::update_state(&mut *tx, festival_id, target).await?;
        FestivalStateTransition::record(&mut *tx, festival_id, festival.state, target, actor_id)
            .await?;

        tx.commit().await?;

        info!(
            festival_id,
            from = %festival.state,
            to = %target,
            actor_id,
            "festival state transition committed"
        );

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALL_STATES: [FestivalState; 4] = [
        FestivalState::Draft,
        FestivalState::Published,
        FestivalState::Cancelled,
        FestivalState::Finished,
    ];
    const ALL_EVENTS: [FestivalEvent; 3] = [
        FestivalEvent::Publish,
        FestivalEvent::Cancel,
        FestivalEvent::Finish,
    ];

    #[test]
    fn draft_transitions() {
        assert_eq!(
            FestivalStateMachine::determine_target_state(FestivalState::Draft, FestivalEvent::Publish)
                .unwrap(),
            Some(FestivalState::Published)
        );
        assert_eq!(
            FestivalStateMachine::determine_target_state(FestivalState::Draft, FestivalEvent::Cancel)
                .unwrap(),
            Some(FestivalState::Cancelled)
        );
        assert!(FestivalStateMachine::determine_target_state(
            FestivalState::Draft,
            FestivalEvent::Finish
        )
        .is_err());
    }

    #[test]
    fn published_transitions() {
        assert_eq!(
            FestivalStateMachine::determine_target_state(
                FestivalState::Published,
                FestivalEvent::Cancel
            )
            .unwrap(),
            Some(FestivalState::Cancelled)
        );
        assert_eq!(
            FestivalStateMachine::determine_target_state(
                FestivalState::Published,
                FestivalEvent::Finish
            )
            .unwrap(),
            Some(FestivalState::Finished)
        );
    }

    #[test]
    fn same_state_is_noop() {
        assert_eq!(
            FestivalStateMachine::determine_target_state(
                FestivalState::Published,
                FestivalEvent::Publish
            )
            .unwrap(),
            None
        );
        assert_eq!(
            FestivalStateMachine::determine_target_state(
                FestivalState::Cancelled,
                FestivalEvent::Cancel
            )
            .unwrap(),
            None
        );
    }

    proptest! {
        /// Terminal states admit no transition other than the same-state no-op.
        #[test]
        fn terminal_states_admit_nothing(
            state_idx in 0usize..ALL_STATES.len(),
            event_idx in 0usize..ALL_EVENTS.len(),
        ) {
            let state = ALL_STATES[state_idx];
            let event = ALL_EVENTS[event_idx];
            if state.is_terminal() {
                let outcome = FestivalStateMachine::determine_target_state(state, event);
                if event.target_state() == state {
                    prop_assert_eq!(outcome.unwrap(), None);
                } else {
                    prop_assert!(outcome.is_err());
                }
            }
        }

        /// No event ever produces a transition out of line with the table.
        #[test]
        fn transitions_never_invent_states(
            state_idx in 0usize..ALL_STATES.len(),
            event_idx in 0usize..ALL_EVENTS.len(),
        ) {
            let state = ALL_STATES[state_idx];
            let event = ALL_EVENTS[event_idx];
            if let Ok(Some(target)) = FestivalStateMachine::determine_target_state(state, event) {
                prop_assert_eq!(target, event.target_state());
                prop_assert_ne!(target, FestivalState::Draft);
            }
        }
    }
}
