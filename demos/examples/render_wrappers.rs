// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rendering through a host `Renderer` with inherited element wrappers.
//!
//! The tree-wide wrapper frames every field; the `billing` group overrides it for its
//! own subtree. Rendering produces plain strings here.
//!
//! Run:
//! - `cargo run -p understory_form_demos --example render_wrappers`

use serde_json::json;
use understory_form::{
    DispatchMode, EventType, FormError, FormTree, GroupConfig, LeafConfig, RenderProps, Renderer,
    WrapperId,
};
use understory_form_demos::{init_tracing, object};

const ROW: WrapperId = WrapperId(0);
const BOXED: WrapperId = WrapperId(1);

struct TextRenderer;

impl Renderer for TextRenderer {
    type Element = String;

    fn render_leaf(&mut self, props: RenderProps<'_>) -> String {
        let value = props.value.map(ToString::to_string).unwrap_or_default();
        if props.errors.is_empty() {
            format!("[{value}]")
        } else {
            format!("[{value}] !{}", props.errors.len())
        }
    }

    fn wrap(&mut self, wrapper: WrapperId, name: Option<&str>, element: String) -> String {
        let label = name.unwrap_or("?");
        match wrapper {
            BOXED => format!("+ {label}: {element} +"),
            _ => format!("{label}: {element}"),
        }
    }
}

fn main() -> Result<(), FormError> {
    init_tracing();

    let mut tree = FormTree::new();
    tree.set_element_wrapper(Some(ROW));

    let form = tree.insert_group(None, GroupConfig::new().with_namespace("order"))?;
    let billing = tree.insert_group(
        Some(form),
        GroupConfig::new().with_namespace("billing").with_wrapper(BOXED),
    )?;
    let qty = tree.insert_leaf(Some(form), LeafConfig::new("qty").with_default_value(json!(1)))?;
    let card = tree.insert_leaf(
        Some(billing),
        LeafConfig::new("card").with_default_value(json!("")),
    )?;
    tree.activate(qty, None)?;
    tree.activate(card, None)?;
    tree.flush();

    tree.set_error(card, object(json!({ "required": true })))?;

    let mut renderer = TextRenderer;
    for leaf in [qty, card] {
        if let Some(line) = tree.render(leaf, &mut renderer) {
            println!("{line}");
        }
    }

    // Leaves dispatch through the handle they were rendered with.
    if let Some(props) = tree.render_props(card) {
        let handle = props.dispatch;
        if let Some(outcome) =
            handle.dispatch(&mut tree, EventType::NewValue, json!("4242"), DispatchMode::Sync)
        {
            println!("bag: {}", outcome.details.value_bag.to_value());
        }
    }
    Ok(())
}
