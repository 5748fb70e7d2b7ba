//! Per-action outcome tracking.
//!
//! Each action surface (extraction, editing) owns one [`ActionSlot`]. The slot
//! holds at most one live [`RequestOutcome`] and enforces two rules that the
//! facade deliberately does not:
//!
//! - **Mutual exclusion.** [`ActionSlot::begin`] refuses to start while the
//!   current outcome is `Pending`.
//! - **Stale-result rejection.** Every `begin` hands out a [`RequestTicket`].
//!   [`ActionSlot::resolve`] applies a result only for the current ticket, and
//!   only once. After [`ActionSlot::discard`] the in-flight request keeps
//!   running, but its result is ignored when it arrives.

use crate::error::{ErrorKind, VisionError};
use serde::Serialize;

/// Identifies one `begin` on one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RequestTicket(u64);

/// Why an action failed, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionFailure {
    pub kind: ErrorKind,
    pub message: String,
    /// Full error text, for logs and `--verbose` output.
    pub detail: String,
}

impl From<&VisionError> for ActionFailure {
    fn from(e: &VisionError) -> Self {
        let kind = e.kind();
        let message = match kind {
            ErrorKind::Input | ErrorKind::Output => e.to_string(),
            _ => kind.user_message().to_string(),
        };
        Self {
            kind,
            message,
            detail: e.to_string(),
        }
    }
}

/// State of one user-initiated action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RequestOutcome<T> {
    Pending,
    Success(T),
    Failure(ActionFailure),
}

impl<T> RequestOutcome<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestOutcome::Pending)
    }
}

/// Holder of the single live outcome for one action surface.
#[derive(Debug)]
pub struct ActionSlot<T> {
    generation: u64,
    outcome: Option<RequestOutcome<T>>,
}

impl<T> Default for ActionSlot<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            outcome: None,
        }
    }
}

impl<T> ActionSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The live outcome, `None` before the first action or after a discard.
    pub fn outcome(&self) -> Option<&RequestOutcome<T>> {
        self.outcome.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.outcome.as_ref().is_some_and(RequestOutcome::is_pending)
    }

    /// Start a new action, replacing any finished outcome.
    ///
    /// Returns `None` while another action on this slot is pending.
    pub fn begin(&mut self) -> Option<RequestTicket> {
        if self.is_pending() {
            return None;
        }
        self.generation += 1;
        self.outcome = Some(RequestOutcome::Pending);
        Some(RequestTicket(self.generation))
    }

    /// Record the result for `ticket`.
    ///
    /// Returns `false`, leaving the slot untouched, when the ticket is stale
    /// or the outcome was already resolved.
    pub fn resolve(&mut self, ticket: RequestTicket, result: Result<T, VisionError>) -> bool {
        if ticket.0 != self.generation || !self.is_pending() {
            return false;
        }
        self.outcome = Some(match result {
            Ok(value) => RequestOutcome::Success(value),
            Err(e) => RequestOutcome::Failure(ActionFailure::from(&e)),
        });
        true
    }

    /// Abandon the current action. A pending request is not aborted; its
    /// eventual result will be rejected by [`ActionSlot::resolve`].
    pub fn discard(&mut self) {
        self.generation += 1;
        self.outcome = None;
    }

    /// Take the finished outcome out of the slot, leaving it empty.
    /// A pending outcome stays where it is.
    pub fn take_finished(&mut self) -> Option<RequestOutcome<T>> {
        if self.is_pending() {
            return None;
        }
        self.outcome.take()
    }
}
