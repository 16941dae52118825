//! Settled results

use crate::{Reason, SettleState};

/// The settled result of a settlement: a fulfillment value or a rejection
/// reason
///
/// Absent while the settlement is pending; immutable once set.
#[derive(Clone, Debug)]
pub enum Outcome<T> {
    /// The settlement fulfilled with this value
    Fulfilled(T),
    /// The settlement rejected with this reason
    Rejected(Reason),
}

impl<T> Outcome<T> {
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Outcome::Fulfilled(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    /// The terminal state this outcome corresponds to
    pub fn state(&self) -> SettleState {
        match self {
            Outcome::Fulfilled(_) => SettleState::Fulfilled,
            Outcome::Rejected(_) => SettleState::Rejected,
        }
    }

    /// The fulfillment value, when fulfilled
    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Fulfilled(value) => Some(value),
            Outcome::Rejected(_) => None,
        }
    }

    /// The rejection reason, when rejected
    pub fn into_reason(self) -> Option<Reason> {
        match self {
            Outcome::Fulfilled(_) => None,
            Outcome::Rejected(reason) => Some(reason),
        }
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Outcome::Fulfilled(value) => Some(value),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn as_reason(&self) -> Option<&Reason> {
        match self {
            Outcome::Fulfilled(_) => None,
            Outcome::Rejected(reason) => Some(reason),
        }
    }
}
