//! Settlement resolvers
//!
//! A resolver is the single authorized mutator of its settlement. Clones
//! share a one-shot guard: after the first successful fulfill or reject,
//! every later resolve/fulfill/reject on any clone is a no-op, so
//! competing resolutions are settled first-wins without locking.

use std::cell::{Cell, RefCell};
use std::mem;
use std::rc::Rc;

use accord_core::{Dispatch, Outcome, Reason, SettleState};
use accord_dispatch::DispatchQueue;

use crate::settlement::SettleCell;
use crate::{FulfillFn, RejectFn, Resolution};

/// The single authorized mutator of a settlement
pub struct Resolver<T> {
    cell: Rc<RefCell<SettleCell<T>>>,
    queue: DispatchQueue,
    resolved: Rc<Cell<bool>>,
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        Resolver {
            cell: self.cell.clone(),
            queue: self.queue.clone(),
            resolved: self.resolved.clone(),
        }
    }
}

impl<T: Clone + 'static> Resolver<T> {
    pub(crate) fn new(cell: Rc<RefCell<SettleCell<T>>>, queue: DispatchQueue) -> Self {
        Resolver {
            cell,
            queue,
            resolved: Rc::new(Cell::new(false)),
        }
    }

    /// Whether this resolver already settled its settlement
    pub fn is_resolved(&self) -> bool {
        self.resolved.get()
    }

    /// Resolve with a value or a chained producer
    ///
    /// A plain value fulfills directly. A chained producer gets forwarding
    /// continuations registered on it and nothing else: the settlement
    /// then settles with the producer's eventual outcome, unless another
    /// resolution arrives first and wins under the one-shot guard.
    pub fn resolve(&self, resolution: Resolution<T>, mode: Dispatch) {
        if self.resolved.get() {
            return;
        }
        match resolution {
            Resolution::Value(value) => self.fulfill(value, mode),
            Resolution::Chained(producer) => {
                let fulfill = self.clone();
                let reject = self.clone();
                producer.register(
                    Box::new(move |value| fulfill.fulfill(value, Dispatch::Immediate)),
                    Box::new(move |reason| reject.reject(reason, Dispatch::Immediate)),
                );
            }
        }
    }

    /// Fulfill the settlement
    ///
    /// No-op once settled. Sets the state and result, then notifies the
    /// registered fulfillment wrappers in registration order, on the
    /// current stack or deferred to the queue per `mode`.
    pub fn fulfill(&self, value: T, mode: Dispatch) {
        if self.resolved.get() {
            return;
        }
        self.resolved.set(true);

        let wrappers = {
            let mut cell = self.cell.borrow_mut();
            cell.state = SettleState::Fulfilled;
            cell.result = Some(Outcome::Fulfilled(value.clone()));
            cell.reject_wrappers.clear();
            mem::take(&mut cell.fulfill_wrappers)
        };
        tracing::trace!("settlement fulfilled, notifying {} wrappers", wrappers.len());
        dispatch_fulfill(&self.queue, wrappers, value, mode);
    }

    /// Reject the settlement
    ///
    /// Symmetric to [`Resolver::fulfill`]: notifies the rejection wrappers
    /// and drops the fulfillment wrappers.
    pub fn reject(&self, reason: impl Into<Reason>, mode: Dispatch) {
        if self.resolved.get() {
            return;
        }
        self.resolved.set(true);

        let reason = reason.into();
        let wrappers = {
            let mut cell = self.cell.borrow_mut();
            cell.state = SettleState::Rejected;
            cell.result = Some(Outcome::Rejected(reason.clone()));
            cell.fulfill_wrappers.clear();
            mem::take(&mut cell.reject_wrappers)
        };
        tracing::debug!(
            "settlement rejected ({}), notifying {} wrappers",
            reason.description(),
            wrappers.len()
        );
        dispatch_reject(&self.queue, wrappers, reason, mode);
    }
}

fn dispatch_fulfill<T: Clone + 'static>(
    queue: &DispatchQueue,
    wrappers: Vec<FulfillFn<T>>,
    value: T,
    mode: Dispatch,
) {
    if wrappers.is_empty() {
        return;
    }
    match mode {
        Dispatch::Immediate => run_fulfill(wrappers, value),
        Dispatch::Deferred => queue.defer(move || run_fulfill(wrappers, value)),
    }
}

fn dispatch_reject(queue: &DispatchQueue, wrappers: Vec<RejectFn>, reason: Reason, mode: Dispatch) {
    if wrappers.is_empty() {
        return;
    }
    match mode {
        Dispatch::Immediate => run_reject(wrappers, reason),
        Dispatch::Deferred => queue.defer(move || run_reject(wrappers, reason)),
    }
}

fn run_fulfill<T: Clone>(wrappers: Vec<FulfillFn<T>>, value: T) {
    for wrapper in wrappers {
        wrapper(value.clone());
    }
}

fn run_reject(wrappers: Vec<RejectFn>, reason: Reason) {
    for wrapper in wrappers {
        wrapper(reason.clone());
    }
}
