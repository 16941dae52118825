//! Remote call simulator
//!
//! Stands in for the excluded collaborators: callers open named calls and
//! receive a pending settlement; the test script later completes or fails
//! outstanding calls, in order or by name, the way bridge callbacks settle
//! resolvers once the underlying call finishes. Completion notifies with
//! deferred dispatch, so continuations run on the next queue drain and
//! never on the completing stack.

use std::cell::RefCell;
use std::collections::VecDeque;

use accord_core::{Dispatch, Reason};
use accord_dispatch::DispatchQueue;
use accord_settle::{Resolver, Settlement};

/// Reply payload of a simulated call
pub type CallReply = String;

struct OutstandingCall {
    method: String,
    resolver: Resolver<CallReply>,
}

/// Scripted completion source for settlements
pub struct RemoteCallSim {
    queue: DispatchQueue,
    outstanding: RefCell<VecDeque<OutstandingCall>>,
}

impl RemoteCallSim {
    pub fn new(queue: &DispatchQueue) -> Self {
        RemoteCallSim {
            queue: queue.clone(),
            outstanding: RefCell::new(VecDeque::new()),
        }
    }

    pub fn queue(&self) -> &DispatchQueue {
        &self.queue
    }

    /// Open a call; the settlement stays pending until scripted completion
    pub fn call(&self, method: &str) -> Settlement<CallReply> {
        let (settlement, resolver) = Settlement::pending(&self.queue);
        self.outstanding.borrow_mut().push_back(OutstandingCall {
            method: method.to_owned(),
            resolver,
        });
        settlement
    }

    /// Number of calls awaiting completion
    pub fn outstanding(&self) -> usize {
        self.outstanding.borrow().len()
    }

    /// Names of calls awaiting completion, oldest first
    pub fn outstanding_methods(&self) -> Vec<String> {
        self.outstanding
            .borrow()
            .iter()
            .map(|call| call.method.clone())
            .collect()
    }

    /// Complete the oldest outstanding call with a reply
    pub fn complete_next(&self, reply: &str) -> bool {
        let call = self.outstanding.borrow_mut().pop_front();
        match call {
            Some(call) => {
                call.resolver.fulfill(reply.to_owned(), Dispatch::Deferred);
                true
            }
            None => false,
        }
    }

    /// Fail the oldest outstanding call with a bridge-style descriptor
    pub fn fail_next(&self, desc: &str) -> bool {
        let call = self.outstanding.borrow_mut().pop_front();
        match call {
            Some(call) => {
                let reason = Reason::descriptor(desc, format!("sim://{}", call.method));
                call.resolver.reject(reason, Dispatch::Deferred);
                true
            }
            None => false,
        }
    }

    /// Complete the oldest outstanding call with the given name
    pub fn complete(&self, method: &str, reply: &str) -> bool {
        let call = self.take_by_method(method);
        match call {
            Some(call) => {
                call.resolver.fulfill(reply.to_owned(), Dispatch::Deferred);
                true
            }
            None => false,
        }
    }

    /// Fail the oldest outstanding call with the given name
    pub fn fail(&self, method: &str, desc: &str) -> bool {
        let call = self.take_by_method(method);
        match call {
            Some(call) => {
                let reason = Reason::descriptor(desc, format!("sim://{}", call.method));
                call.resolver.reject(reason, Dispatch::Deferred);
                true
            }
            None => false,
        }
    }

    fn take_by_method(&self, method: &str) -> Option<OutstandingCall> {
        let mut outstanding = self.outstanding.borrow_mut();
        let position = outstanding.iter().position(|call| call.method == method);
        position.and_then(|index| outstanding.remove(index))
    }
}
