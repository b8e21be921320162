//! Transaction status state machine for BrandAssoc writes.
//!
//! This module provides a pure, side-effect-free state machine tracking the
//! lifecycle of one write:
//!
//! ```text
//! Idle -> Pending -> Succeeded -> (settled, reset timer) -> Idle
//!                 \-> Failed    -> (reset timer)          -> Idle
//! ```
//!
//! A success only starts its display delay once the client reports the
//! follow-up reload as [`StatusEvent::Settled`].
//!
//! The machine never sleeps. It asks for a timer via
//! [`Action::ScheduleReset`] and the client feeds back
//! [`StatusEvent::ResetTimerFired`] when it expires. Each cycle carries a
//! generation number, so a timer belonging to an earlier cycle is ignored.

use std::time::Duration;

use brandassoc_types::RecordId;

/// Message shown while a write is in flight.
pub const PENDING_MESSAGE: &str = "Encrypting brand data...";

/// Message shown once both write phases succeeded.
pub const SUCCESS_MESSAGE: &str = "Brand data encrypted and stored securely!";

/// Observable status of the current write.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TxStatus {
    /// No write in progress.
    #[default]
    Idle,
    /// Write submitted, waiting on the backend.
    Pending {
        /// Progress message.
        message: String,
    },
    /// Record and index both written.
    Succeeded {
        /// Confirmation message.
        message: String,
    },
    /// The write failed.
    Failed {
        /// Classification and user-facing message.
        failure: TxFailure,
    },
}

impl TxStatus {
    /// Whether a write is in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// User-facing message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Pending { message } | Self::Succeeded { message } => Some(message),
            Self::Failed { failure } => Some(&failure.message),
        }
    }
}

/// Why a write ended in [`TxStatus::Failed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxFailure {
    /// Failure classification.
    pub kind: FailureKind,
    /// Message suitable for display.
    pub message: String,
}

/// Classification of a failed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The backend reported itself unavailable; nothing was written.
    Unavailable,
    /// The encryption collaborator failed; nothing was written.
    Encryption,
    /// The authenticated identity declined a write.
    Declined {
        /// Set when the decline hit the index append, leaving an orphan.
        orphan: Option<RecordId>,
    },
    /// The record write failed; the index is untouched.
    RecordWrite,
    /// The record was written but the index append failed.
    IndexAppend {
        /// The unreferenced record.
        orphan: RecordId,
    },
}

impl FailureKind {
    /// The orphaned record id, when the failure left one behind.
    pub fn orphan(&self) -> Option<&RecordId> {
        match self {
            Self::Declined { orphan } => orphan.as_ref(),
            Self::IndexAppend { orphan } => Some(orphan),
            Self::Unavailable | Self::Encryption | Self::RecordWrite => None,
        }
    }
}

/// How long terminal states stay visible before returning to idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetDelays {
    /// Delay after [`TxStatus::Succeeded`].
    pub success: Duration,
    /// Delay after [`TxStatus::Failed`].
    pub failure: Duration,
}

impl Default for ResetDelays {
    fn default() -> Self {
        Self {
            success: Duration::from_secs(2),
            failure: Duration::from_secs(3),
        }
    }
}

/// Events driving the status machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// A write was submitted.
    Submitted {
        /// Progress message.
        message: String,
    },
    /// Both write phases succeeded.
    Completed {
        /// Confirmation message.
        message: String,
    },
    /// The reload following a successful write finished.
    Settled {
        /// Generation of the write that was reloaded.
        generation: u64,
    },
    /// The write failed.
    Failed {
        /// What went wrong.
        failure: TxFailure,
    },
    /// A reset timer expired.
    ResetTimerFired {
        /// Generation the timer was scheduled for.
        generation: u64,
    },
    /// Drop any terminal status immediately (e.g. on account change).
    Cleared,
}

/// Actions to be executed by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Fire [`StatusEvent::ResetTimerFired`] after `delay`.
    ScheduleReset {
        /// Delay before the reset.
        delay: Duration,
        /// Generation to echo back.
        generation: u64,
    },
    /// Abort any outstanding reset timer.
    CancelReset,
}

/// Transaction status machine - NO I/O, just state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusMachine {
    status: TxStatus,
    generation: u64,
    delays: ResetDelays,
}

impl StatusMachine {
    /// Create a machine in [`TxStatus::Idle`].
    pub fn new(delays: ResetDelays) -> Self {
        Self {
            status: TxStatus::Idle,
            generation: 0,
            delays,
        }
    }

    /// Current status.
    pub fn status(&self) -> &TxStatus {
        &self.status
    }

    /// Current cycle generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a write is in flight.
    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    /// Process an event and return the new machine plus actions to execute.
    ///
    /// This is a pure function. Events that make no sense in the current
    /// state leave it unchanged and produce no actions.
    pub fn on_event(self, event: StatusEvent) -> (Self, Vec<Action>) {
        let Self {
            status,
            generation,
            delays,
        } = self;

        match (status, event) {
            // A new cycle from Idle
            (TxStatus::Idle, StatusEvent::Submitted { message }) => (
                Self {
                    status: TxStatus::Pending { message },
                    generation: generation + 1,
                    delays,
                },
                vec![],
            ),

            // A new cycle before the previous one auto-reset: close it now
            (
                TxStatus::Succeeded { .. } | TxStatus::Failed { .. },
                StatusEvent::Submitted { message },
            ) => (
                Self {
                    status: TxStatus::Pending { message },
                    generation: generation + 1,
                    delays,
                },
                vec![Action::CancelReset],
            ),

            // From Pending. Success waits for Settled before the display delay.
            (TxStatus::Pending { .. }, StatusEvent::Completed { message }) => (
                Self {
                    status: TxStatus::Succeeded { message },
                    generation,
                    delays,
                },
                vec![],
            ),
            (TxStatus::Pending { .. }, StatusEvent::Failed { failure }) => (
                Self {
                    status: TxStatus::Failed { failure },
                    generation,
                    delays,
                },
                vec![Action::ScheduleReset {
                    delay: delays.failure,
                    generation,
                }],
            ),

            (TxStatus::Succeeded { message }, StatusEvent::Settled { generation: settled })
                if settled == generation =>
            {
                (
                    Self {
                        status: TxStatus::Succeeded { message },
                        generation,
                        delays,
                    },
                    vec![Action::ScheduleReset {
                        delay: delays.success,
                        generation,
                    }],
                )
            }

            // Auto-reset, only for the cycle that scheduled it
            (
                TxStatus::Succeeded { .. } | TxStatus::Failed { .. },
                StatusEvent::ResetTimerFired { generation: fired },
            ) if fired == generation => (
                Self {
                    status: TxStatus::Idle,
                    generation,
                    delays,
                },
                vec![],
            ),

            (TxStatus::Succeeded { .. } | TxStatus::Failed { .. }, StatusEvent::Cleared) => (
                Self {
                    status: TxStatus::Idle,
                    generation,
                    delays,
                },
                vec![Action::CancelReset],
            ),

            // Invalid transitions - stay in current state
            (status, _) => (
                Self {
                    status,
                    generation,
                    delays,
                },
                vec![],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submitted() -> StatusEvent {
        StatusEvent::Submitted {
            message: PENDING_MESSAGE.into(),
        }
    }

    fn completed() -> StatusEvent {
        StatusEvent::Completed {
            message: SUCCESS_MESSAGE.into(),
        }
    }

    fn failed(kind: FailureKind) -> StatusEvent {
        StatusEvent::Failed {
            failure: TxFailure {
                kind,
                message: "Submission failed: boom".into(),
            },
        }
    }

    fn pending_machine() -> StatusMachine {
        StatusMachine::new(ResetDelays::default()).on_event(submitted()).0
    }

    #[test]
    fn starts_idle() {
        let machine = StatusMachine::new(ResetDelays::default());
        assert_eq!(machine.status(), &TxStatus::Idle);
        assert_eq!(machine.generation(), 0);
    }

    #[test]
    fn submit_transitions_to_pending_and_bumps_generation() {
        let machine = pending_machine();
        assert!(machine.is_pending());
        assert_eq!(machine.generation(), 1);
        assert_eq!(machine.status().message(), Some(PENDING_MESSAGE));
    }

    fn settled(generation: u64) -> StatusEvent {
        StatusEvent::Settled { generation }
    }

    #[test]
    fn success_waits_for_settle_before_reset() {
        let (machine, actions) = pending_machine().on_event(completed());

        assert!(matches!(machine.status(), TxStatus::Succeeded { .. }));
        assert!(actions.is_empty());

        let (machine, actions) = machine.on_event(settled(1));
        assert!(matches!(machine.status(), TxStatus::Succeeded { .. }));
        assert_eq!(
            actions,
            vec![Action::ScheduleReset {
                delay: Duration::from_secs(2),
                generation: 1
            }]
        );
    }

    #[test]
    fn settle_for_another_cycle_is_ignored() {
        let (machine, _) = pending_machine().on_event(completed());
        let (after, actions) = machine.clone().on_event(settled(7));
        assert_eq!(after, machine);
        assert!(actions.is_empty());

        // Settling a pending or failed cycle schedules nothing either
        let (_, actions) = pending_machine().on_event(settled(1));
        assert!(actions.is_empty());
        let (failed_machine, _) = pending_machine().on_event(failed(FailureKind::RecordWrite));
        let (_, actions) = failed_machine.on_event(settled(1));
        assert!(actions.is_empty());
    }

    #[test]
    fn failure_schedules_longer_reset() {
        let (machine, actions) = pending_machine().on_event(failed(FailureKind::RecordWrite));

        assert!(matches!(machine.status(), TxStatus::Failed { .. }));
        assert_eq!(
            actions,
            vec![Action::ScheduleReset {
                delay: Duration::from_secs(3),
                generation: 1
            }]
        );
    }

    #[test]
    fn reset_timer_returns_to_idle() {
        let (machine, _) = pending_machine().on_event(completed());
        let (machine, _) = machine.on_event(settled(1));
        let (machine, actions) = machine.on_event(StatusEvent::ResetTimerFired { generation: 1 });

        assert_eq!(machine.status(), &TxStatus::Idle);
        assert!(actions.is_empty());
    }

    #[test]
    fn stale_reset_timer_is_ignored() {
        // Cycle 1 succeeds, cycle 2 starts and fails before timer 1 fires
        let (machine, _) = pending_machine().on_event(completed());
        let (machine, actions) = machine.on_event(submitted());
        assert!(actions.contains(&Action::CancelReset));
        let (machine, _) = machine.on_event(failed(FailureKind::Unavailable));

        let (machine, _) = machine.on_event(StatusEvent::ResetTimerFired { generation: 1 });
        assert!(matches!(machine.status(), TxStatus::Failed { .. }));

        let (machine, _) = machine.on_event(StatusEvent::ResetTimerFired { generation: 2 });
        assert_eq!(machine.status(), &TxStatus::Idle);
    }

    #[test]
    fn pending_cannot_be_skipped() {
        let idle = StatusMachine::new(ResetDelays::default());
        let (machine, actions) = idle.clone().on_event(completed());
        assert_eq!(machine, idle);
        assert!(actions.is_empty());

        let (machine, _) = idle.clone().on_event(failed(FailureKind::RecordWrite));
        assert_eq!(machine, idle);
    }

    #[test]
    fn resubmit_while_pending_is_ignored() {
        let machine = pending_machine();
        let (after, actions) = machine.clone().on_event(submitted());
        assert_eq!(after, machine);
        assert!(actions.is_empty());
    }

    #[test]
    fn reset_timer_does_not_end_pending() {
        let machine = pending_machine();
        let (after, _) = machine
            .clone()
            .on_event(StatusEvent::ResetTimerFired { generation: 1 });
        assert_eq!(after, machine);
    }

    #[test]
    fn cleared_drops_terminal_status_but_not_pending() {
        let (machine, _) = pending_machine().on_event(failed(FailureKind::Encryption));
        let (machine, actions) = machine.on_event(StatusEvent::Cleared);
        assert_eq!(machine.status(), &TxStatus::Idle);
        assert_eq!(actions, vec![Action::CancelReset]);

        let pending = pending_machine();
        let (after, _) = pending.clone().on_event(StatusEvent::Cleared);
        assert_eq!(after, pending);
    }

    #[test]
    fn custom_delays_are_used() {
        let delays = ResetDelays {
            success: Duration::from_millis(10),
            failure: Duration::from_millis(20),
        };
        let (machine, _) = StatusMachine::new(delays).on_event(submitted());
        let (machine, _) = machine.on_event(completed());
        let (_, actions) = machine.on_event(settled(1));
        assert!(matches!(
            actions[0],
            Action::ScheduleReset { delay, .. } if delay == Duration::from_millis(10)
        ));
    }

    #[test]
    fn orphan_classification() {
        let id = RecordId::parse("1-a").unwrap();
        assert_eq!(
            FailureKind::IndexAppend { orphan: id.clone() }.orphan(),
            Some(&id)
        );
        assert_eq!(
            FailureKind::Declined {
                orphan: Some(id.clone())
            }
            .orphan(),
            Some(&id)
        );
        assert_eq!(FailureKind::Declined { orphan: None }.orphan(), None);
        assert_eq!(FailureKind::RecordWrite.orphan(), None);
    }
}
