//! Basic Accord Example
//!
//! This example demonstrates how to create settlements, chain
//! continuations, and compose multi-call patterns, with completion
//! scripted the way a remote bridge would deliver it.

use std::rc::Rc;

use accord_core::{Dispatch, SettleState};
use accord_dispatch::DispatchQueue;
use accord_settle::{every, Resolution, Settlement};
use accord_test::{fan_out_fetch, race_fetch, sequential_fetch, RemoteCallSim};

fn main() {
    println!("=== Accord Chain Example ===\n");

    // 1. Create the dispatch queue every settlement notifies through
    println!("1. Creating dispatch queue...");
    let queue = DispatchQueue::new();
    println!("   Queue ready (idle: {})", queue.is_idle());

    // 2. A settlement settled by hand
    println!("\n2. Settling by hand...");
    let (settlement, resolver) = Settlement::<u32>::pending(&queue);
    println!("   State before: {}", settlement.state());
    resolver.fulfill(42, Dispatch::Deferred);
    println!("   State after fulfill: {}", settlement.state());
    println!("   Pending notifications: {}", queue.pending());
    queue.run_until_idle();

    // 3. A derived chain with a failure boundary
    println!("\n3. Chaining continuations...");
    let doubled = settlement
        .then(|value| Ok(Resolution::value(value * 2)))
        .then(|value| Ok(Resolution::value(format!("result={value}"))));
    queue.run_until_idle();
    println!("   Chain result: {:?}", doubled.value());

    // 4. Sequential fetch: each call issued after the previous reply
    println!("\n4. Sequential fetch chain...");
    let sim = Rc::new(RemoteCallSim::new(&queue));
    let sequence = sequential_fetch(&sim, &["GetVersion", "GetCapabilities"]);
    println!("   Outstanding: {:?}", sim.outstanding_methods());
    sim.complete_next("1.2");
    queue.run_until_idle();
    println!("   Outstanding after first reply: {:?}", sim.outstanding_methods());
    sim.complete_next("caps");
    queue.run_until_idle();
    println!("   Replies in order: {:?}", sequence.value());

    // 5. Fan-out collect over parallel calls
    println!("\n5. Fan-out collect...");
    let collected = fan_out_fetch(&sim, &["PropsA", "PropsB", "PropsC"]);
    sim.complete("PropsC", "c");
    sim.complete("PropsA", "a");
    sim.complete("PropsB", "b");
    queue.run_until_idle();
    println!("   Collected (input order): {:?}", collected.value());

    // 6. First-wins race over redundant providers
    println!("\n6. Racing redundant providers...");
    let winner = race_fetch(&sim, &["Mirror1", "Mirror2"]);
    sim.complete("Mirror2", "fastest");
    queue.run_until_idle();
    println!("   Winner: {:?}", winner.value());

    // 7. Rejections are values, observable on the settlement
    println!("\n7. Observing a failure...");
    let failing = sim.call("Register");
    sim.fail_next("access denied");
    queue.run_until_idle();
    println!("   State: {}", failing.state());
    if let Some(reason) = failing.reason() {
        println!("   Reason: {}", reason.description());
    }

    // 8. Combining already-settled values
    println!("\n8. Combining plain values...");
    let combined = every(
        &queue,
        vec![
            Resolution::value(1u32),
            Resolution::value(2u32),
            Resolution::value(3u32),
        ],
    );
    queue.run_until_idle();
    assert_eq!(combined.state(), SettleState::Fulfilled);
    println!("   Combined: {:?}", combined.value());

    println!("\n=== Example Complete ===");
}
