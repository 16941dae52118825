//! Chained-resolution capability
//!
//! The original engine duck-typed "thenables" by probing for a callable
//! `then` member. Here the capability is explicit: a resolver flattens a
//! value only when it arrives as [`Resolution::Chained`], and producers opt
//! in by implementing [`Awaitable`]. [`crate::Settlement`] implements it,
//! so settlements nest and flatten transitively.

use accord_core::Reason;

/// Continuation invoked with a fulfillment value
pub type FulfillFn<T> = Box<dyn FnOnce(T)>;

/// Continuation invoked with a rejection reason
pub type RejectFn = Box<dyn FnOnce(Reason)>;

/// Capability for values that settle later
pub trait Awaitable {
    type Output;

    /// Register continuations for the eventual outcome
    ///
    /// At most one of the two continuations fires, exactly once.
    fn register(self: Box<Self>, on_fulfill: FulfillFn<Self::Output>, on_reject: RejectFn);
}

/// A resolution input: an immediate value or a chained producer
///
/// The typed rendering of "value or thenable". Resolvers fulfill with a
/// `Value` directly and forward a `Chained` producer's eventual outcome.
pub enum Resolution<T> {
    /// An immediate fulfillment value
    Value(T),
    /// A producer whose eventual outcome drives the settlement
    Chained(Box<dyn Awaitable<Output = T>>),
}

impl<T> Resolution<T> {
    pub fn value(value: T) -> Self {
        Resolution::Value(value)
    }

    pub fn chained(producer: impl Awaitable<Output = T> + 'static) -> Self {
        Resolution::Chained(Box::new(producer))
    }

    pub fn is_chained(&self) -> bool {
        matches!(self, Resolution::Chained(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysNine;

    impl Awaitable for AlwaysNine {
        type Output = u32;

        fn register(self: Box<Self>, on_fulfill: FulfillFn<u32>, _on_reject: RejectFn) {
            on_fulfill(9);
        }
    }

    #[test]
    fn test_resolution_constructors() {
        assert!(!Resolution::value(1u32).is_chained());
        assert!(Resolution::chained(AlwaysNine).is_chained());
    }

    #[test]
    fn test_external_awaitable_registers() {
        let producer: Box<dyn Awaitable<Output = u32>> = Box::new(AlwaysNine);
        let seen = std::rc::Rc::new(std::cell::Cell::new(0u32));
        let sink = seen.clone();
        producer.register(
            Box::new(move |value| sink.set(value)),
            Box::new(|_reason| {}),
        );
        assert_eq!(seen.get(), 9);
    }
}
