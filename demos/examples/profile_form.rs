// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registration and value bags for a small profile form.
//!
//! Builds `form > profile > {name, email}` plus `form > address > city`, seeds initial
//! values, activates every leaf, and collects the register envelopes at the root into one
//! merged value bag. Then edits a field and shows the bag produced by a synchronous
//! `NewValue` dispatch.
//!
//! Run:
//! - `cargo run -p understory_form_demos --example profile_form`

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use tracing::info;
use understory_form::{
    DispatchMode, EventType, FormError, FormTree, GroupConfig, LeafConfig, MountRef, ValueBag,
};
use understory_form_demos::{init_tracing, object};

fn main() -> Result<(), FormError> {
    init_tracing();

    let registered = Rc::new(RefCell::new(ValueBag::new()));
    let sink = registered.clone();

    let mut tree = FormTree::new();
    tree.set_initial_values(object(json!({
        "profile": { "name": "Ann", "email": "ann@example.com" },
        "address": { "city": "Oslo" },
    })));

    let form = tree.insert_group(
        None,
        GroupConfig::new()
            .on_register(move |_, details| {
                sink.borrow_mut().merge(&details.value_bag);
                None
            })
            .on_new_value(|envelope, details| {
                info!(
                    field = envelope.target().bag_key(),
                    bag = %details.value_bag.to_value(),
                    "changed"
                );
                Some(details.value_bag.to_value())
            }),
    )?;
    let profile = tree.insert_group(Some(form), GroupConfig::new().with_namespace("profile"))?;
    let address = tree.insert_group(Some(form), GroupConfig::new().with_namespace("address"))?;

    let name = tree.insert_leaf(
        Some(profile),
        LeafConfig::new("name").with_default_value(json!("")),
    )?;
    let email = tree.insert_leaf(
        Some(profile),
        LeafConfig::new("email").with_default_value(json!("")),
    )?;
    let city = tree.insert_leaf(
        Some(address),
        LeafConfig::new("city").with_default_value(json!("")),
    )?;
    let submit = tree.insert_leaf(Some(form), LeafConfig::new("submit"))?;

    for (mount, leaf) in [name, email, city, submit].into_iter().enumerate() {
        tree.activate(leaf, Some(MountRef(mount as u64)))?;
    }
    println!("pending before flush: {}", tree.pending());

    let delivered = tree.flush();
    println!("delivered {} register envelopes", delivered.len());
    println!("registered: {}", registered.borrow().to_value());

    tree.set_value(city, json!("Paris"))?;
    let value = tree.value(city).cloned().unwrap_or_default();
    if let Some(outcome) = tree.dispatch(city, EventType::NewValue, value, DispatchMode::Sync) {
        println!(
            "visited {} groups; reply: {}",
            outcome.visited,
            outcome.reply.unwrap_or_default()
        );
    }
    println!(
        "city: {:?} (was {:?}, initially {:?})",
        tree.value(city),
        tree.previous_value(city),
        tree.initial_value(city)
    );
    Ok(())
}
