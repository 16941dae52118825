//! Multi-input combinators
//!
//! Each combinator derives one settlement's outcome from an ordered
//! sequence of inputs. Inputs arrive as [`Resolution`]s - plain values and
//! chained producers are both accepted - and are first normalized through
//! [`Settlement::resolved`]. Result collection is index-aligned to input
//! order, never completion order.

use std::cell::RefCell;
use std::rc::Rc;

use accord_core::{Dispatch, Reason};
use accord_dispatch::DispatchQueue;

use crate::{Resolution, Settlement};

/// Index-aligned result collection for `every` and `some`
struct SlotSet<T> {
    slots: Vec<Option<T>>,
    remaining: usize,
}

impl<T> SlotSet<T> {
    fn new(len: usize) -> Self {
        SlotSet {
            slots: (0..len).map(|_| None).collect(),
            remaining: len,
        }
    }

    /// Fill one slot; returns the ordered results once every slot is in
    fn fill(&mut self, index: usize, value: T) -> Option<Vec<T>> {
        if let Some(slot) = self.slots.get_mut(index) {
            if slot.is_none() {
                *slot = Some(value);
                self.remaining -= 1;
            }
        }
        if self.remaining == 0 {
            Some(self.slots.iter_mut().filter_map(Option::take).collect())
        } else {
            None
        }
    }
}

/// Settle with the first input to settle, success or failure
///
/// The winning input's outcome is forwarded verbatim. With no inputs the
/// result fulfills immediately with no value.
pub fn any<T: Clone + 'static>(
    queue: &DispatchQueue,
    inputs: Vec<Resolution<T>>,
) -> Settlement<Option<T>> {
    let (settlement, resolver) = Settlement::pending(queue);
    if inputs.is_empty() {
        resolver.fulfill(None, Dispatch::Immediate);
        return settlement;
    }

    for input in inputs {
        let on_fulfill = resolver.clone();
        let on_reject = resolver.clone();
        Settlement::resolved(queue, input).done(
            Some(Box::new(move |value| {
                on_fulfill.fulfill(Some(value), Dispatch::Immediate)
            })),
            Some(Box::new(move |reason| {
                on_reject.reject(reason, Dispatch::Immediate)
            })),
        );
    }
    settlement
}

/// Fulfill once every input fulfills; reject on the first rejection
///
/// Fulfills with the inputs' values in input order. A single rejection
/// settles the result with that reason; later outcomes are no-ops. With no
/// inputs the result fulfills immediately with the empty vector.
pub fn every<T: Clone + 'static>(
    queue: &DispatchQueue,
    inputs: Vec<Resolution<T>>,
) -> Settlement<Vec<T>> {
    let (settlement, resolver) = Settlement::pending(queue);
    if inputs.is_empty() {
        resolver.fulfill(Vec::new(), Dispatch::Immediate);
        return settlement;
    }

    let slots = Rc::new(RefCell::new(SlotSet::new(inputs.len())));
    for (index, input) in inputs.into_iter().enumerate() {
        let slots = slots.clone();
        let on_fulfill = resolver.clone();
        let on_reject = resolver.clone();
        Settlement::resolved(queue, input).done(
            Some(Box::new(move |value| {
                let completed = slots.borrow_mut().fill(index, value);
                if let Some(values) = completed {
                    on_fulfill.fulfill(values, Dispatch::Immediate);
                }
            })),
            Some(Box::new(move |reason| {
                on_reject.reject(reason, Dispatch::Immediate)
            })),
        );
    }
    settlement
}

/// Fulfill on the first fulfillment; reject once every input rejects
///
/// The inverse posture of [`every`]: the first success wins, and only a
/// full sweep of rejections rejects the result, with the reasons collected
/// in input order under [`Reason::Aggregate`]. With no inputs the result
/// fulfills immediately with no value.
pub fn some<T: Clone + 'static>(
    queue: &DispatchQueue,
    inputs: Vec<Resolution<T>>,
) -> Settlement<Option<T>> {
    let (settlement, resolver) = Settlement::pending(queue);
    if inputs.is_empty() {
        resolver.fulfill(None, Dispatch::Immediate);
        return settlement;
    }

    let slots = Rc::new(RefCell::new(SlotSet::new(inputs.len())));
    for (index, input) in inputs.into_iter().enumerate() {
        let slots = slots.clone();
        let on_fulfill = resolver.clone();
        let on_reject = resolver.clone();
        Settlement::resolved(queue, input).done(
            Some(Box::new(move |value| {
                on_fulfill.fulfill(Some(value), Dispatch::Immediate)
            })),
            Some(Box::new(move |reason| {
                let completed = slots.borrow_mut().fill(index, reason);
                if let Some(reasons) = completed {
                    on_reject.reject(Reason::Aggregate(reasons), Dispatch::Immediate);
                }
            })),
        );
    }
    settlement
}
