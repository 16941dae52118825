//! End-to-end chain scenarios
//!
//! The consumption patterns of the original client, driven end to end
//! against the scripted simulator: a sequential fetch loop where each call
//! is issued only after the previous reply arrives, a fan-out collect over
//! many calls, and first-wins races over redundant providers.

use std::rc::Rc;

use accord_settle::{any, every, some, Resolution, Settlement};

use crate::{CallReply, RemoteCallSim};

/// Issue one call per name, each only after the previous reply arrived,
/// collecting the replies in issue order
pub fn sequential_fetch(sim: &Rc<RemoteCallSim>, methods: &[&str]) -> Settlement<Vec<CallReply>> {
    let remaining: Vec<String> = methods.iter().map(|method| (*method).to_owned()).collect();
    fetch_remaining(sim.clone(), remaining, Vec::new())
}

fn fetch_remaining(
    sim: Rc<RemoteCallSim>,
    mut remaining: Vec<String>,
    mut collected: Vec<CallReply>,
) -> Settlement<Vec<CallReply>> {
    if remaining.is_empty() {
        return Settlement::fulfilled(sim.queue(), collected);
    }
    let method = remaining.remove(0);
    let call = sim.call(&method);
    call.then(move |reply| {
        collected.push(reply);
        Ok(fetch_remaining(sim, remaining, collected).into())
    })
}

/// Issue every call up front and collect the replies in input order
pub fn fan_out_fetch(sim: &RemoteCallSim, methods: &[&str]) -> Settlement<Vec<CallReply>> {
    let inputs: Vec<Resolution<CallReply>> = methods
        .iter()
        .map(|method| sim.call(method).into())
        .collect();
    every(sim.queue(), inputs)
}

/// Race redundant providers; the first settlement wins, success or failure
pub fn race_fetch(sim: &RemoteCallSim, methods: &[&str]) -> Settlement<Option<CallReply>> {
    let inputs: Vec<Resolution<CallReply>> = methods
        .iter()
        .map(|method| sim.call(method).into())
        .collect();
    any(sim.queue(), inputs)
}

/// Take the first provider that answers; fail only when all of them fail
pub fn first_answer(sim: &RemoteCallSim, methods: &[&str]) -> Settlement<Option<CallReply>> {
    let inputs: Vec<Resolution<CallReply>> = methods
        .iter()
        .map(|method| sim.call(method).into())
        .collect();
    some(sim.queue(), inputs)
}
