//! Settlement value containers

use std::cell::RefCell;
use std::rc::Rc;

use accord_core::{Dispatch, Outcome, Reason, SettleResult, SettleState};
use accord_dispatch::DispatchQueue;

use crate::{Awaitable, FulfillFn, RejectFn, Resolution, Resolver};

/// Shared mutable core of a settlement
///
/// Invariant: `result` is `Some` exactly when `state` is terminal, and the
/// outcome variant matches the state. Wrapper lists only grow while
/// pending; settlement drains them, so settled cells retain no callbacks.
pub(crate) struct SettleCell<T> {
    pub(crate) state: SettleState,
    pub(crate) result: Option<Outcome<T>>,
    pub(crate) fulfill_wrappers: Vec<FulfillFn<T>>,
    pub(crate) reject_wrappers: Vec<RejectFn>,
}

impl<T> SettleCell<T> {
    fn new() -> Self {
        SettleCell {
            state: SettleState::Pending,
            result: None,
            fulfill_wrappers: Vec::new(),
            reject_wrappers: Vec::new(),
        }
    }
}

/// A one-shot value container
///
/// Holds the lifecycle state, the settled outcome, and the registered
/// continuation wrappers. Mutation happens only through the owning
/// [`Resolver`]; holders of a settlement read its state and register
/// continuations. Handles are cheap clones sharing one cell.
pub struct Settlement<T> {
    pub(crate) cell: Rc<RefCell<SettleCell<T>>>,
    pub(crate) queue: DispatchQueue,
}

impl<T> Clone for Settlement<T> {
    fn clone(&self) -> Self {
        Settlement {
            cell: self.cell.clone(),
            queue: self.queue.clone(),
        }
    }
}

impl<T: Clone + 'static> Settlement<T> {
    /// Create a pending settlement and the resolver that owns it
    pub fn pending(queue: &DispatchQueue) -> (Self, Resolver<T>) {
        let cell = Rc::new(RefCell::new(SettleCell::new()));
        let settlement = Settlement {
            cell: cell.clone(),
            queue: queue.clone(),
        };
        let resolver = Resolver::new(cell, queue.clone());
        (settlement, resolver)
    }

    /// Create a settlement driven by an initializer
    ///
    /// The initializer runs synchronously with the resolver and usually
    /// parks it for later completion. An `Err` return rejects the
    /// settlement with synchronous notification.
    pub fn new<F>(queue: &DispatchQueue, init: F) -> Self
    where
        F: FnOnce(&Resolver<T>) -> SettleResult<()>,
    {
        let (settlement, resolver) = Self::pending(queue);
        if let Err(reason) = init(&resolver) {
            resolver.reject(reason, Dispatch::Immediate);
        }
        settlement
    }

    /// An immediately fulfilled settlement
    pub fn fulfilled(queue: &DispatchQueue, value: T) -> Self {
        let (settlement, resolver) = Self::pending(queue);
        resolver.fulfill(value, Dispatch::Immediate);
        settlement
    }

    /// An immediately rejected settlement
    pub fn rejected(queue: &DispatchQueue, reason: impl Into<Reason>) -> Self {
        let (settlement, resolver) = Self::pending(queue);
        resolver.reject(reason, Dispatch::Immediate);
        settlement
    }

    /// A settlement resolved from a value or a chained producer
    ///
    /// The normalization step combinator inputs go through: a plain value
    /// fulfills immediately, a chained producer settles this settlement
    /// with its eventual outcome.
    pub fn resolved(queue: &DispatchQueue, resolution: Resolution<T>) -> Self {
        let (settlement, resolver) = Self::pending(queue);
        resolver.resolve(resolution, Dispatch::Immediate);
        settlement
    }

    /// Current lifecycle state
    pub fn state(&self) -> SettleState {
        self.cell.borrow().state
    }

    /// The settled outcome, absent while pending
    pub fn outcome(&self) -> Option<Outcome<T>> {
        self.cell.borrow().result.clone()
    }

    /// The fulfillment value, when fulfilled
    pub fn value(&self) -> Option<T> {
        match self.cell.borrow().result {
            Some(Outcome::Fulfilled(ref value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// The rejection reason, when rejected
    pub fn reason(&self) -> Option<Reason> {
        match self.cell.borrow().result {
            Some(Outcome::Rejected(ref reason)) => Some(reason.clone()),
            _ => None,
        }
    }

    /// Register raw continuation wrappers
    ///
    /// While pending, wrappers are stored in registration order. On a
    /// settled cell, the matching wrapper is deferred to the queue with the
    /// stored result, so it never runs from within this call.
    pub fn append_wrappers(&self, on_fulfill: Option<FulfillFn<T>>, on_reject: Option<RejectFn>) {
        let mut cell = self.cell.borrow_mut();
        match cell.state {
            SettleState::Pending => {
                if let Some(wrapper) = on_fulfill {
                    cell.fulfill_wrappers.push(wrapper);
                }
                if let Some(wrapper) = on_reject {
                    cell.reject_wrappers.push(wrapper);
                }
            }
            SettleState::Fulfilled => {
                if let (Some(wrapper), Some(Outcome::Fulfilled(value))) =
                    (on_fulfill, cell.result.as_ref())
                {
                    let value = value.clone();
                    self.queue.defer(move || wrapper(value));
                }
            }
            SettleState::Rejected => {
                if let (Some(wrapper), Some(Outcome::Rejected(reason))) =
                    (on_reject, cell.result.as_ref())
                {
                    let reason = reason.clone();
                    self.queue.defer(move || wrapper(reason));
                }
            }
        }
    }

    /// Derive a settlement from a fulfillment continuation
    ///
    /// The continuation runs inside the failure boundary: an `Ok` return
    /// resolves the derived settlement (chained producers flatten), an
    /// `Err` rejects it. A rejection of this settlement passes through to
    /// the derived settlement untouched.
    pub fn then<U, F>(&self, on_fulfill: F) -> Settlement<U>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> SettleResult<Resolution<U>> + 'static,
    {
        let (derived, resolver) = Settlement::pending(&self.queue);
        let forward = resolver.clone();
        self.append_wrappers(
            Some(Box::new(move |value| match on_fulfill(value) {
                Ok(resolution) => resolver.resolve(resolution, Dispatch::Immediate),
                Err(reason) => resolver.reject(reason, Dispatch::Immediate),
            })),
            Some(Box::new(move |reason| {
                forward.reject(reason, Dispatch::Immediate)
            })),
        );
        derived
    }

    /// Derive a settlement from both continuations
    ///
    /// Like [`Settlement::then`], but a rejection runs `on_reject` inside
    /// the failure boundary, so the handler may recover into a fulfillment
    /// or re-reject.
    pub fn then_catch<U, F, R>(&self, on_fulfill: F, on_reject: R) -> Settlement<U>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> SettleResult<Resolution<U>> + 'static,
        R: FnOnce(Reason) -> SettleResult<Resolution<U>> + 'static,
    {
        let (derived, resolver) = Settlement::pending(&self.queue);
        let recover = resolver.clone();
        self.append_wrappers(
            Some(Box::new(move |value| match on_fulfill(value) {
                Ok(resolution) => resolver.resolve(resolution, Dispatch::Immediate),
                Err(reason) => resolver.reject(reason, Dispatch::Immediate),
            })),
            Some(Box::new(move |reason| match on_reject(reason) {
                Ok(resolution) => recover.resolve(resolution, Dispatch::Immediate),
                Err(reason) => recover.reject(reason, Dispatch::Immediate),
            })),
        );
        derived
    }

    /// Derive a settlement from a rejection continuation
    ///
    /// A fulfillment passes through untouched; a rejection runs the
    /// handler inside the failure boundary and may recover.
    pub fn catch<R>(&self, on_reject: R) -> Settlement<T>
    where
        R: FnOnce(Reason) -> SettleResult<Resolution<T>> + 'static,
    {
        let (derived, resolver) = Settlement::pending(&self.queue);
        let recover = resolver.clone();
        self.append_wrappers(
            Some(Box::new(move |value| {
                resolver.fulfill(value, Dispatch::Immediate)
            })),
            Some(Box::new(move |reason| match on_reject(reason) {
                Ok(resolution) => recover.resolve(resolution, Dispatch::Immediate),
                Err(reason) => recover.reject(reason, Dispatch::Immediate),
            })),
        );
        derived
    }

    /// Derive a transparent settlement with no continuations
    ///
    /// The derived settlement settles identically to this one.
    pub fn chain(&self) -> Settlement<T> {
        let (derived, resolver) = Settlement::pending(&self.queue);
        let forward = resolver.clone();
        self.append_wrappers(
            Some(Box::new(move |value| {
                resolver.fulfill(value, Dispatch::Immediate)
            })),
            Some(Box::new(move |reason| {
                forward.reject(reason, Dispatch::Immediate)
            })),
        );
        derived
    }

    /// Register terminal observers
    ///
    /// No derived settlement and no failure boundary: side-effecting
    /// consumers at the end of a chain observe the outcome directly, so a
    /// rejection handler should always be supplied where failures matter.
    pub fn done(&self, on_fulfill: Option<FulfillFn<T>>, on_reject: Option<RejectFn>) {
        self.append_wrappers(on_fulfill, on_reject);
    }
}

impl<T: Clone + 'static> Awaitable for Settlement<T> {
    type Output = T;

    fn register(self: Box<Self>, on_fulfill: FulfillFn<T>, on_reject: RejectFn) {
        self.append_wrappers(Some(on_fulfill), Some(on_reject));
    }
}

impl<T: Clone + 'static> From<Settlement<T>> for Resolution<T> {
    fn from(settlement: Settlement<T>) -> Self {
        Resolution::Chained(Box::new(settlement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn drain(queue: &DispatchQueue) {
        queue.run_until_idle();
    }

    #[test]
    fn test_pending_settlement_has_no_result() {
        let queue = DispatchQueue::new();
        let (settlement, _resolver) = Settlement::<u32>::pending(&queue);
        assert_eq!(settlement.state(), SettleState::Pending);
        assert!(settlement.outcome().is_none());
        assert!(settlement.value().is_none());
        assert!(settlement.reason().is_none());
    }

    #[test]
    fn test_fulfilled_constructor() {
        let queue = DispatchQueue::new();
        let settlement = Settlement::fulfilled(&queue, 41u32);
        assert_eq!(settlement.state(), SettleState::Fulfilled);
        assert_eq!(settlement.value(), Some(41));
    }

    #[test]
    fn test_rejected_constructor() {
        let queue = DispatchQueue::new();
        let settlement = Settlement::<u32>::rejected(&queue, "no such method");
        assert_eq!(settlement.state(), SettleState::Rejected);
        assert_eq!(
            settlement.reason().map(|r| r.description()),
            Some("no such method".to_owned())
        );
    }

    #[test]
    fn test_initializer_rejection() {
        let queue = DispatchQueue::new();
        let settlement: Settlement<u32> =
            Settlement::new(&queue, |_resolver| Err(Reason::from("init failed")));
        assert_eq!(settlement.state(), SettleState::Rejected);
        assert_eq!(
            settlement.reason().map(|r| r.description()),
            Some("init failed".to_owned())
        );
    }

    #[test]
    fn test_initializer_parks_resolver_for_later() {
        let queue = DispatchQueue::new();
        let parked: Rc<RefCell<Option<Resolver<u32>>>> = Rc::new(RefCell::new(None));

        let slot = parked.clone();
        let settlement = Settlement::new(&queue, move |resolver| {
            *slot.borrow_mut() = Some(resolver.clone());
            Ok(())
        });
        assert_eq!(settlement.state(), SettleState::Pending);

        if let Some(resolver) = parked.borrow().as_ref() {
            resolver.fulfill(11, Dispatch::Deferred);
        }
        assert_eq!(settlement.state(), SettleState::Fulfilled);
        assert_eq!(settlement.value(), Some(11));
    }

    #[test]
    fn test_late_attached_continuation_is_never_synchronous() {
        let queue = DispatchQueue::new();
        let settlement = Settlement::fulfilled(&queue, 5u32);

        let seen = Rc::new(Cell::new(None));
        let sink = seen.clone();
        settlement.done(Some(Box::new(move |value| sink.set(Some(value)))), None);

        // attached after settlement: nothing fires until the queue drains
        assert_eq!(seen.get(), None);
        drain(&queue);
        assert_eq!(seen.get(), Some(5));
    }

    #[test]
    fn test_then_transforms_the_value() {
        let queue = DispatchQueue::new();
        let settlement = Settlement::fulfilled(&queue, 6u32);
        let derived = settlement.then(|value| Ok(Resolution::value(value * 7)));

        drain(&queue);
        assert_eq!(derived.state(), SettleState::Fulfilled);
        assert_eq!(derived.value(), Some(42));
    }

    #[test]
    fn test_then_failure_boundary_rejects_derived() {
        let queue = DispatchQueue::new();
        let settlement = Settlement::fulfilled(&queue, 1u32);
        let derived: Settlement<u32> =
            settlement.then(|_value| Err(Reason::from("handler blew up")));

        drain(&queue);
        assert_eq!(derived.state(), SettleState::Rejected);
        assert_eq!(
            derived.reason().map(|r| r.description()),
            Some("handler blew up".to_owned())
        );
    }

    #[test]
    fn test_then_passes_rejection_through() {
        let queue = DispatchQueue::new();
        let settlement = Settlement::<u32>::rejected(&queue, "upstream");
        let derived = settlement.then(|value| Ok(Resolution::value(value + 1)));

        drain(&queue);
        assert_eq!(derived.state(), SettleState::Rejected);
        assert_eq!(
            derived.reason().map(|r| r.description()),
            Some("upstream".to_owned())
        );
    }

    #[test]
    fn test_then_returning_chained_settlement_flattens() {
        let queue = DispatchQueue::new();
        let inner_queue = queue.clone();
        let settlement = Settlement::fulfilled(&queue, 2u32);
        let derived = settlement.then(move |value| {
            Ok(Settlement::fulfilled(&inner_queue, value * 10).into())
        });

        drain(&queue);
        assert_eq!(derived.value(), Some(20));
    }

    #[test]
    fn test_catch_recovers_from_rejection() {
        let queue = DispatchQueue::new();
        let settlement = Settlement::<u32>::rejected(&queue, "transient");
        let recovered = settlement.catch(|_reason| Ok(Resolution::value(0)));

        drain(&queue);
        assert_eq!(recovered.state(), SettleState::Fulfilled);
        assert_eq!(recovered.value(), Some(0));
    }

    #[test]
    fn test_catch_passes_fulfillment_through() {
        let queue = DispatchQueue::new();
        let settlement = Settlement::fulfilled(&queue, 3u32);
        let derived = settlement.catch(|reason| Err(reason));

        drain(&queue);
        assert_eq!(derived.value(), Some(3));
    }

    #[test]
    fn test_then_catch_recovery_path() {
        let queue = DispatchQueue::new();
        let settlement = Settlement::<u32>::rejected(&queue, "bad reply");
        let derived = settlement.then_catch(
            |value| Ok(Resolution::value(value.to_string())),
            |reason| Ok(Resolution::value(format!("recovered: {}", reason.description()))),
        );

        drain(&queue);
        assert_eq!(derived.value(), Some("recovered: bad reply".to_owned()));
    }

    #[test]
    fn test_chain_mirrors_fulfillment() {
        let queue = DispatchQueue::new();
        let settlement = Settlement::fulfilled(&queue, 9u32);
        let mirror = settlement.chain();

        drain(&queue);
        assert_eq!(mirror.state(), settlement.state());
        assert_eq!(mirror.value(), settlement.value());
    }

    #[test]
    fn test_chain_mirrors_rejection() {
        let queue = DispatchQueue::new();
        let settlement = Settlement::<u32>::rejected(&queue, "gone");
        let mirror = settlement.chain();

        drain(&queue);
        assert_eq!(mirror.state(), SettleState::Rejected);
        assert_eq!(
            mirror.reason().map(|r| r.description()),
            settlement.reason().map(|r| r.description())
        );
    }

    #[test]
    fn test_wrappers_fire_in_registration_order() {
        let queue = DispatchQueue::new();
        let (settlement, resolver) = Settlement::<u32>::pending(&queue);
        let order = Rc::new(RefCell::new(Vec::new()));

        for id in 0..3 {
            let order = order.clone();
            settlement.done(Some(Box::new(move |_| order.borrow_mut().push(id))), None);
        }

        resolver.fulfill(1, Dispatch::Immediate);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_settled_cell_retains_no_wrappers() {
        let queue = DispatchQueue::new();
        let (settlement, resolver) = Settlement::<u32>::pending(&queue);
        settlement.done(Some(Box::new(|_| {})), Some(Box::new(|_| {})));
        resolver.fulfill(1, Dispatch::Immediate);

        let cell = settlement.cell.borrow();
        assert!(cell.fulfill_wrappers.is_empty());
        assert!(cell.reject_wrappers.is_empty());
    }

    #[test]
    fn test_nested_chained_resolution_flattens_transitively() {
        let queue = DispatchQueue::new();
        let innermost = Settlement::fulfilled(&queue, 42u32);
        let middle = Settlement::resolved(&queue, innermost.into());
        let outer = Settlement::resolved(&queue, middle.into());

        drain(&queue);
        assert_eq!(outer.state(), SettleState::Fulfilled);
        assert_eq!(outer.value(), Some(42));
    }
}
