// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred work: asynchronous dispatch, `on_applied` callbacks, and a host scheduler.
//!
//! The tree tells the host when its queue becomes non-empty. This demo plays the host:
//! it records flush requests and drains the queue in a small loop, the way an event loop
//! would on its next turn.
//!
//! Run:
//! - `cargo run -p understory_form_demos --example deferred_work`

use std::cell::Cell;
use std::rc::Rc;

use serde_json::json;
use understory_form::{EventType, FormError, FormTree, GroupConfig, LeafConfig};
use understory_form_demos::{init_tracing, object};

fn main() -> Result<(), FormError> {
    init_tracing();

    let requested = Rc::new(Cell::new(false));
    let flag = requested.clone();
    let mut tree = FormTree::with_scheduler(move || flag.set(true));

    let form = tree.insert_group(
        None,
        GroupConfig::new()
            .with_namespace("login")
            .on(EventType::custom("validate"), |envelope, details| {
                let ok = envelope
                    .payload()
                    .value()
                    .and_then(|v| v.as_str())
                    .is_some_and(|s| s.contains('@'));
                details.insert("valid", json!(ok));
                Some(json!(ok))
            }),
    )?;
    let email = tree.insert_leaf(
        Some(form),
        LeafConfig::new("email")
            .with_default_value(json!(""))
            .with_default_state(object(json!({ "touched": false }))),
    )?;
    tree.activate(email, None)?;

    tree.set_value_then(email, json!("not-an-email"), move |tree| {
        let value = tree.value(email).cloned().unwrap_or_default();
        tree.dispatch_async(email, EventType::custom("validate"), value);
    })?;
    tree.set_aux_state(email, object(json!({ "touched": true })))?;

    // Host loop: one turn per flush request.
    let mut turn = 0;
    while requested.replace(false) {
        turn += 1;
        for outcome in tree.flush() {
            println!(
                "turn {turn}: {:?} bag={} details={}",
                outcome.envelope.event_type(),
                outcome.details.value_bag.to_value(),
                json!(outcome.details.entries),
            );
            if outcome.details.get("valid") == Some(&json!(false)) {
                tree.set_error(email, object(json!({ "format": "missing @" })))?;
            }
        }
    }

    println!("errors: {:?}", tree.errors(email));
    println!("aux-state: {:?}", tree.aux_state(email));
    tree.reset(email)?;
    println!("after reset: value={:?} errors={:?}", tree.value(email), tree.errors(email));
    Ok(())
}
