// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value bags: namespaced aggregates of field values built while an event bubbles.
//!
//! A bag starts empty for every dispatch. The first namespaced group on the way up
//! seeds it with `{namespace: {field: value}}`; every further namespaced group wraps
//! whatever is already there one level deeper under its own namespace. Groups
//! without a namespace leave the bag alone.
//!
//! ```
//! use serde_json::json;
//! use understory_form::value_bag::{ValueBag, namespaced_patch};
//!
//! let inner = namespaced_patch(&ValueBag::new(), "city", json!("Paris"), "addr");
//! let outer = namespaced_patch(&inner, "city", json!("Paris"), "form");
//! assert_eq!(outer.to_value(), json!({ "form": { "addr": { "city": "Paris" } } }));
//! ```
//!
//! Bags from separate dispatches can be folded together with [`ValueBag::merge`], which
//! merges nested objects key by key so sibling fields never overwrite each other.

use alloc::string::String;
use serde::Serialize;
use serde_json::{Map, Value};

/// Aggregate of field values nested by namespace.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValueBag(Map<String, Value>);

impl ValueBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no group has contributed to this bag.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Mutable access for handlers that rewrite the bag themselves.
    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    /// Snapshot the bag as a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Consume the bag into a JSON object.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Insert a top-level entry, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Wrap the whole bag one level deeper under `namespace`.
    pub fn nest(self, namespace: &str) -> Self {
        let mut outer = Map::new();
        outer.insert(String::from(namespace), Value::Object(self.0));
        Self(outer)
    }

    /// Deep-merge `other` into `self`.
    ///
    /// Objects present on both sides are merged recursively; any other value in
    /// `other` replaces the one in `self`.
    pub fn merge(&mut self, other: &Self) {
        merge_maps(&mut self.0, &other.0);
    }
}

impl From<Map<String, Value>> for ValueBag {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Nest a field contribution under `namespace`.
///
/// An empty `bag` is taken to mean no closer group has contributed yet, so the
/// result is `{namespace: {name: value}}`. Otherwise the existing bag already
/// carries the field and is wrapped as `{namespace: bag}`.
///
/// Groups do not rely on emptiness: a handler may have written to the bag before
/// any namespace applied. They track the seed in [`Details`](crate::Details) and
/// use [`ValueBag::insert`] and [`ValueBag::nest`] directly.
pub fn namespaced_patch(bag: &ValueBag, name: &str, value: Value, namespace: &str) -> ValueBag {
    let mut inner = bag.clone();
    if inner.is_empty() {
        inner.insert(name, value);
    }
    inner.nest(namespace)
}

fn merge_maps(dst: &mut Map<String, Value>, src: &Map<String, Value>) {
    for (key, incoming) in src {
        match (dst.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(nested)) => merge_maps(existing, nested),
            _ => {
                dst.insert(key.clone(), incoming.clone());
            }
        }
    }
}
