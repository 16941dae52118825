//! Settlement lifecycle states
//!
//! A settlement starts `Pending` and transitions exactly once, to either
//! `Fulfilled` or `Rejected`. Terminal states admit no further transitions.

use std::fmt;

/// Lifecycle state of a settlement
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettleState {
    /// Not yet settled
    Pending,
    /// Settled with a fulfillment value
    Fulfilled,
    /// Settled with a rejection reason
    Rejected,
}

impl SettleState {
    /// Check whether this state admits no further transitions
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SettleState::Pending)
    }

    /// Check whether a transition from this state to `next` is legal
    pub fn can_transition_to(&self, next: SettleState) -> bool {
        matches!(
            (self, next),
            (SettleState::Pending, SettleState::Fulfilled)
                | (SettleState::Pending, SettleState::Rejected)
        )
    }
}

impl fmt::Display for SettleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SettleState::Pending => "pending",
            SettleState::Fulfilled => "fulfilled",
            SettleState::Rejected => "rejected",
        };
        f.write_str(name)
    }
}
