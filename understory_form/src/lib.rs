// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Form: a form composition tree with bubbling dispatch and namespaced value bags.
//!
//! Forms are built from two kinds of nodes:
//!
//! - **Leaves** own field state: a value, the previous value, the initial value captured on
//!   activation, an aux-state mapping (touched, focus, whatever the host wants), and errors.
//! - **Groups** intercept events coming up from their descendants. A group with a namespace
//!   nests every value that passes through it one level deeper, so the outermost ancestor
//!   receives a [`ValueBag`] shaped like the form itself.
//!
//! Groups also scope the ambient context for their subtree: a namespaced group narrows the
//! initial values its descendants see to its own entry, and any group may override the
//! element wrapper used when rendering leaves.
//!
//! ## Dispatch
//!
//! A dispatch creates an [`Envelope`] and fresh [`Details`], computes the bubble path with
//! [`router::bubble_path`], and hands both to every group on it, closest first, via
//! [`dispatcher::run`]. There is no cancellation. Synchronous dispatches return a
//! [`DispatchOutcome`] carrying the first handler reply; asynchronous ones (including the
//! register envelope every leaf emits on activation) wait in a FIFO queue until the host
//! calls [`FormTree::flush`]. A [`Scheduler`] is told whenever the queue becomes non-empty.
//!
//! ## Example
//!
//! ```rust
//! use std::{cell::RefCell, rc::Rc};
//!
//! use serde_json::json;
//! use understory_form::{FormTree, GroupConfig, LeafConfig, ValueBag};
//!
//! let collected = Rc::new(RefCell::new(ValueBag::new()));
//! let sink = collected.clone();
//!
//! let mut tree = FormTree::new();
//! tree.set_initial_values(
//!     json!({ "profile": { "name": "Ann" } })
//!         .as_object()
//!         .cloned()
//!         .unwrap(),
//! );
//!
//! let form = tree
//!     .insert_group(
//!         None,
//!         GroupConfig::new().on_register(move |_, details| {
//!             sink.borrow_mut().merge(&details.value_bag);
//!             None
//!         }),
//!     )
//!     .unwrap();
//! let profile = tree
//!     .insert_group(Some(form), GroupConfig::new().with_namespace("profile"))
//!     .unwrap();
//! let name = tree
//!     .insert_leaf(Some(profile), LeafConfig::new("name").with_default_value(json!("")))
//!     .unwrap();
//! let age = tree
//!     .insert_leaf(Some(profile), LeafConfig::new("age").with_default_value(json!(0)))
//!     .unwrap();
//!
//! tree.activate(name, None).unwrap();
//! tree.activate(age, None).unwrap();
//! assert!(collected.borrow().is_empty());
//!
//! tree.flush();
//! assert_eq!(
//!     collected.borrow().to_value(),
//!     json!({ "profile": { "name": "Ann", "age": 0 } })
//! );
//! ```
//!
//! ## Rendering
//!
//! The core never renders. [`FormTree::render`] builds [`RenderProps`] for an active leaf,
//! calls [`Renderer::render_leaf`], and applies the inherited [`WrapperId`] through
//! [`Renderer::wrap`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod group;
pub mod leaf;
pub mod render;
pub mod router;
pub mod scheduler;
pub mod tree;
pub mod types;
pub mod value_bag;

pub use envelope::{Details, Envelope, Payload, Registration, Target};
pub use error::FormError;
pub use group::{GroupConfig, Handler};
pub use leaf::{DefaultState, LeafConfig, LeafState};
pub use render::{DispatchHandle, RenderProps, Renderer, WrapperId};
pub use scheduler::{Applied, ManualScheduler, Scheduler};
pub use tree::{DispatchOutcome, FormTree};
pub use types::{DispatchMode, EventType, MountRef, NodeFlags, NodeId, NodeKind};
pub use value_bag::ValueBag;
