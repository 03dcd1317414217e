// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, leaf state, delivery, deferred work.

use alloc::{boxed::Box, rc::Rc, string::String, vec, vec::Vec};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::dispatcher;
use crate::envelope::{Details, Envelope, Payload, Registration, Target};
use crate::error::FormError;
use crate::group::{Context, GroupConfig};
use crate::leaf::{LeafConfig, LeafState};
use crate::render::{DispatchHandle, RenderProps, Renderer, WrapperId};
use crate::router::{self, BubblePath, InterceptorLookup, ParentLookup};
use crate::scheduler::{Deferred, ManualScheduler, Scheduler, WorkQueue};
use crate::types::{DispatchMode, EventType, MountRef, NodeFlags, NodeId, NodeKind};

/// Form composition tree.
///
/// Owns every leaf and group, their parent links, the ambient context (initial
/// values and element wrapper), and the queue of deferred work.
///
/// Leaf state exists only between [`FormTree::activate`] and
/// [`FormTree::deactivate`]. Activation queues a register envelope; asynchronous
/// dispatches and `*_then` callbacks are queued as well, and nothing queued runs
/// until the host calls [`FormTree::flush`].
///
/// ## Example
///
/// ```rust
/// use serde_json::json;
/// use understory_form::{DispatchMode, EventType, FormTree, GroupConfig, LeafConfig};
///
/// let mut tree = FormTree::new();
/// let form = tree.insert_group(None, GroupConfig::new().with_namespace("form")).unwrap();
/// let addr = tree.insert_group(Some(form), GroupConfig::new().with_namespace("addr")).unwrap();
/// let city = tree
///     .insert_leaf(Some(addr), LeafConfig::new("city").with_default_value(json!("")))
///     .unwrap();
/// tree.activate(city, None).unwrap();
///
/// let outcome = tree
///     .dispatch(city, EventType::NewValue, json!("Paris"), DispatchMode::Sync)
///     .unwrap();
/// assert_eq!(
///     outcome.details.value_bag.to_value(),
///     json!({ "form": { "addr": { "city": "Paris" } } })
/// );
/// assert_eq!(outcome.visited, 2);
/// ```
pub struct FormTree {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root_context: Context,
    queue: WorkQueue,
    flushing: bool,
    scheduler: Box<dyn Scheduler>,
}

impl core::fmt::Debug for FormTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("FormTree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .field("pending", &self.queue.len())
            .finish_non_exhaustive()
    }
}

impl Default for FormTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of delivering one envelope.
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchOutcome {
    /// The delivered envelope.
    pub envelope: Envelope,
    /// Details as left by the outermost group.
    pub details: Details,
    /// Number of groups visited. Zero means the origin had no intercepting
    /// ancestor, was detached, or had been removed.
    pub visited: usize,
    /// First reply produced by a handler, closest group first.
    pub reply: Option<Value>,
}

#[derive(Debug)]
struct Leaf {
    config: LeafConfig,
    state: Option<LeafState>,
    mount: Option<MountRef>,
}

#[derive(Debug)]
enum NodeData {
    Leaf(Leaf),
    Group(GroupConfig),
}

#[derive(Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    flags: NodeFlags,
    /// Context this node exposes to its children. Leaves pass theirs through.
    context: Context,
    data: NodeData,
}

impl Node {
    fn new(generation: u32, data: NodeData) -> Self {
        let flags = match &data {
            NodeData::Leaf(leaf) if leaf.config.is_valueless() => NodeFlags::VALUELESS,
            _ => NodeFlags::empty(),
        };
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            flags,
            context: Context::default(),
            data,
        }
    }

    fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Leaf(_) => NodeKind::Leaf,
            NodeData::Group(_) => NodeKind::Group,
        }
    }
}

/// Accumulator threaded through one delivery.
struct Bubble {
    envelope: Envelope,
    details: Details,
}

impl FormTree {
    /// Create an empty tree whose host flushes on its own cadence.
    pub fn new() -> Self {
        Self::with_scheduler(ManualScheduler)
    }

    /// Create an empty tree that notifies `scheduler` when deferred work is queued.
    pub fn with_scheduler(scheduler: impl Scheduler + 'static) -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root_context: Context::default(),
            queue: WorkQueue::default(),
            flushing: false,
            scheduler: Box::new(scheduler),
        }
    }

    /// Replace the scheduler.
    pub fn set_scheduler(&mut self, scheduler: impl Scheduler + 'static) {
        self.scheduler = Box::new(scheduler);
    }

    // --- structure ---

    /// Insert a leaf as a child of `parent` (or as a root if `None`).
    ///
    /// The leaf starts inactive; call [`FormTree::activate`] to create its state.
    pub fn insert_leaf(
        &mut self,
        parent: Option<NodeId>,
        config: LeafConfig,
    ) -> Result<NodeId, FormError> {
        self.insert(
            parent,
            NodeData::Leaf(Leaf {
                config,
                state: None,
                mount: None,
            }),
        )
    }

    /// Insert a group as a child of `parent` (or as a root if `None`).
    pub fn insert_group(
        &mut self,
        parent: Option<NodeId>,
        config: GroupConfig,
    ) -> Result<NodeId, FormError> {
        self.insert(parent, NodeData::Group(config))
    }

    fn insert(&mut self, parent: Option<NodeId>, data: NodeData) -> Result<NodeId, FormError> {
        if let Some(p) = parent
            && !self.is_alive(p)
        {
            return Err(FormError::Stale(p));
        }
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, data));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, data)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        if let Some(p) = parent {
            self.link_parent(id, p);
        }
        self.refresh_context(id);
        debug!(node = ?id, ?parent, kind = ?self.node(id).kind(), "inserted node");
        Ok(id)
    }

    /// Remove a node (and its subtree) from the tree.
    ///
    /// Leaf state in the subtree is dropped. Envelopes still queued for removed
    /// nodes are delivered as no-ops.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        let children = self.node(id).children.clone();
        for child in children {
            self.remove(child);
        }
        self.nodes[id.idx()] = None;
        // A saturated generation can no longer tell new ids from stale ones; retire the slot.
        if self.generations[id.idx()] < u32::MAX {
            self.free_list.push(id.idx());
        }
        debug!(node = ?id, "removed node");
    }

    /// Move `id` under `new_parent` (or make it a root).
    ///
    /// The subtree's inherited context is recomputed. Active leaves keep the
    /// initial value they captured at activation.
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<(), FormError> {
        if !self.is_alive(id) {
            return Err(FormError::Stale(id));
        }
        if let Some(p) = new_parent {
            if !self.is_alive(p) {
                return Err(FormError::Stale(p));
            }
            let mut cur = Some(p);
            while let Some(n) = cur {
                if n == id {
                    return Err(FormError::Cycle(id));
                }
                cur = self.parent_of(n);
            }
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        if let Some(p) = new_parent {
            self.link_parent(id, p);
        }
        self.refresh_context(id);
        debug!(node = ?id, parent = ?new_parent, "reparented node");
        Ok(())
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is live if its slot exists and its generation matches
    /// the current generation stored in that slot.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node_opt(id).is_some()
    }

    /// Returns the parent of a node if live, or `None` for roots or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|node| node.parent)
    }

    /// Get the children of a node, or an empty slice if the node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node_opt(id).map_or(&[], |node| &node.children)
    }

    /// Kind of a live node.
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node_opt(id).map(Node::kind)
    }

    /// Flags of a live node.
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        self.node_opt(id).map(|node| node.flags)
    }

    /// Returns true if the node is live and active.
    pub fn is_active(&self, id: NodeId) -> bool {
        self.flags(id)
            .is_some_and(|flags| flags.contains(NodeFlags::ACTIVE))
    }

    /// Returns true if the node is a live valueless leaf.
    pub fn is_valueless(&self, id: NodeId) -> bool {
        self.flags(id)
            .is_some_and(|flags| flags.contains(NodeFlags::VALUELESS))
    }

    /// Field name of a live leaf.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.leaf(id)?.config.name.as_deref()
    }

    /// Namespace of a live group.
    pub fn namespace(&self, id: NodeId) -> Option<&str> {
        match &self.node_opt(id)?.data {
            NodeData::Group(group) => group.namespace(),
            NodeData::Leaf(_) => None,
        }
    }

    /// Mount reference of an active leaf.
    pub fn mount(&self, id: NodeId) -> Option<MountRef> {
        self.leaf(id)?.mount
    }

    // --- context ---

    /// Replace the ambient initial values and recompute every node's view.
    ///
    /// Leaves that are already active keep their captured initial value.
    pub fn set_initial_values(&mut self, initial_values: Map<String, Value>) {
        self.root_context.initial_values = Rc::new(initial_values);
        self.refresh_all();
    }

    /// Ambient initial values.
    pub fn initial_values(&self) -> &Map<String, Value> {
        &self.root_context.initial_values
    }

    /// Set the element wrapper applied to leaves that no group overrides.
    pub fn set_element_wrapper(&mut self, wrapper: Option<WrapperId>) {
        self.root_context.wrapper = wrapper;
        self.refresh_all();
    }

    /// Initial-values view a live node exposes to its children.
    ///
    /// For a namespaced group this is the ambient view's entry at the namespace
    /// (empty if absent); for anything else it is the inherited view.
    pub fn initial_values_view(&self, id: NodeId) -> Option<&Map<String, Value>> {
        self.node_opt(id).map(|node| &*node.context.initial_values)
    }

    // --- lifecycle ---

    /// Activate a node.
    ///
    /// For a leaf this creates its state from its configuration and the inherited
    /// initial values, records `mount`, and queues one register envelope carrying
    /// the mount and the leaf's value. Activating an active node does nothing.
    pub fn activate(&mut self, id: NodeId, mount: Option<MountRef>) -> Result<(), FormError> {
        let node = self.node_opt_mut(id).ok_or(FormError::Stale(id))?;
        if node.flags.contains(NodeFlags::ACTIVE) {
            return Ok(());
        }
        node.flags.insert(NodeFlags::ACTIVE);
        let NodeData::Leaf(leaf) = &mut node.data else {
            debug!(node = ?id, "activated group");
            return Ok(());
        };
        let state = LeafState::new(&leaf.config, &node.context.initial_values);
        let registration = Registration {
            mount,
            value: state.value().cloned(),
        };
        leaf.state = Some(state);
        leaf.mount = mount;
        debug!(node = ?id, ?mount, "activated leaf");

        let target = self.target_of(id);
        self.defer(Deferred::Deliver(Envelope::new(
            EventType::Register,
            Payload::Register(registration),
            target,
        )));
        Ok(())
    }

    /// Deactivate a node and its subtree, dropping leaf state.
    ///
    /// Register envelopes still queued for the deactivated leaves are discarded.
    pub fn deactivate(&mut self, id: NodeId) -> Result<(), FormError> {
        if !self.is_alive(id) {
            return Err(FormError::Stale(id));
        }
        let mut retired: Vec<NodeId> = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let node = self.node_mut(cur);
            if node.flags.contains(NodeFlags::ACTIVE) {
                node.flags.remove(NodeFlags::ACTIVE);
                if let NodeData::Leaf(leaf) = &mut node.data {
                    leaf.state = None;
                    leaf.mount = None;
                    retired.push(cur);
                }
                debug!(node = ?cur, "deactivated node");
            }
            stack.extend(node.children.iter().copied());
        }
        if !retired.is_empty() {
            self.queue.retain(|item| match item {
                Deferred::Deliver(envelope) => {
                    *envelope.event_type() != EventType::Register
                        || !retired.contains(&envelope.target().id)
                }
                Deferred::Applied(_) => true,
            });
            trace!(pending = self.queue.len(), "dropped stale registrations");
        }
        Ok(())
    }

    // --- leaf state ---

    /// State of an active leaf.
    pub fn leaf_state(&self, id: NodeId) -> Option<&LeafState> {
        self.leaf(id)?.state.as_ref()
    }

    /// Current value of an active leaf.
    pub fn value(&self, id: NodeId) -> Option<&Value> {
        self.leaf_state(id)?.value()
    }

    /// Value of an active leaf before its most recent write.
    pub fn previous_value(&self, id: NodeId) -> Option<&Value> {
        self.leaf_state(id)?.previous_value()
    }

    /// Value an active leaf captured at activation.
    pub fn initial_value(&self, id: NodeId) -> Option<&Value> {
        self.leaf_state(id)?.initial_value()
    }

    /// Aux-state of an active leaf.
    pub fn aux_state(&self, id: NodeId) -> Option<&Map<String, Value>> {
        self.leaf_state(id).map(LeafState::aux_state)
    }

    /// Validation errors of an active leaf.
    pub fn errors(&self, id: NodeId) -> Option<&Map<String, Value>> {
        self.leaf_state(id).map(LeafState::errors)
    }

    /// Replace a leaf's value, remembering the old one as its previous value.
    pub fn set_value(&mut self, id: NodeId, value: Value) -> Result<(), FormError> {
        self.state_mut(id)?.set_value(Some(value));
        trace!(node = ?id, "set value");
        Ok(())
    }

    /// [`FormTree::set_value`], then run `on_applied` at the next flush.
    pub fn set_value_then(
        &mut self,
        id: NodeId,
        value: Value,
        on_applied: impl FnOnce(&mut Self) + 'static,
    ) -> Result<(), FormError> {
        self.set_value(id, value)?;
        self.defer(Deferred::Applied(Box::new(on_applied)));
        Ok(())
    }

    /// Shallow-merge `partial` into a leaf's aux-state.
    pub fn set_aux_state(
        &mut self,
        id: NodeId,
        partial: Map<String, Value>,
    ) -> Result<(), FormError> {
        self.state_mut(id)?.merge_aux_state(partial);
        trace!(node = ?id, "merged aux-state");
        Ok(())
    }

    /// [`FormTree::set_aux_state`], then run `on_applied` at the next flush.
    pub fn set_aux_state_then(
        &mut self,
        id: NodeId,
        partial: Map<String, Value>,
        on_applied: impl FnOnce(&mut Self) + 'static,
    ) -> Result<(), FormError> {
        self.set_aux_state(id, partial)?;
        self.defer(Deferred::Applied(Box::new(on_applied)));
        Ok(())
    }

    /// Empty a leaf's aux-state.
    pub fn clear_aux_state(&mut self, id: NodeId) -> Result<(), FormError> {
        self.state_mut(id)?.replace_aux_state(Map::new());
        Ok(())
    }

    /// Restore a leaf's aux-state to its configured default.
    pub fn reset_aux_state(&mut self, id: NodeId) -> Result<(), FormError> {
        let leaf = self.leaf_mut(id)?;
        let state = leaf.state.as_mut().ok_or(FormError::Inactive(id))?;
        state.replace_aux_state(leaf.config.default_state.resolve());
        Ok(())
    }

    /// Shallow-merge `partial` into a leaf's errors.
    pub fn set_error(&mut self, id: NodeId, partial: Map<String, Value>) -> Result<(), FormError> {
        self.state_mut(id)?.merge_errors(partial);
        Ok(())
    }

    /// Empty a leaf's errors.
    pub fn clear_errors(&mut self, id: NodeId) -> Result<(), FormError> {
        self.state_mut(id)?.clear_errors();
        Ok(())
    }

    /// Restore a leaf's value and aux-state to their defaults and clear its errors.
    pub fn reset(&mut self, id: NodeId) -> Result<(), FormError> {
        let leaf = self.leaf_mut(id)?;
        let state = leaf.state.as_mut().ok_or(FormError::Inactive(id))?;
        state.reset(&leaf.config);
        debug!(node = ?id, "reset leaf");
        Ok(())
    }

    // --- dispatch ---

    /// Dispatch `event_type` with `payload` from `id`.
    ///
    /// [`DispatchMode::Sync`] delivers before returning and yields the outcome;
    /// [`DispatchMode::Async`] queues the envelope for the next flush and yields `None`.
    pub fn dispatch(
        &mut self,
        id: NodeId,
        event_type: EventType,
        payload: Value,
        mode: DispatchMode,
    ) -> Option<DispatchOutcome> {
        match mode {
            DispatchMode::Sync => Some(self.dispatch_sync(id, event_type, payload)),
            DispatchMode::Async => {
                self.dispatch_async(id, event_type, payload);
                None
            }
        }
    }

    /// Deliver an envelope from `id` to its ancestors before returning.
    pub fn dispatch_sync(
        &mut self,
        id: NodeId,
        event_type: EventType,
        payload: Value,
    ) -> DispatchOutcome {
        let envelope = Envelope::new(event_type, Payload::Value(payload), self.target_of(id));
        self.deliver(envelope)
    }

    /// Queue an envelope from `id` for delivery on the next flush.
    pub fn dispatch_async(&mut self, id: NodeId, event_type: EventType, payload: Value) {
        let envelope = Envelope::new(event_type, Payload::Value(payload), self.target_of(id));
        self.defer(Deferred::Deliver(envelope));
    }

    /// Run all deferred work in FIFO order, including work queued while flushing.
    ///
    /// Returns the outcome of every envelope delivered.
    pub fn flush(&mut self) -> Vec<DispatchOutcome> {
        let mut delivered = Vec::new();
        let outer = core::mem::replace(&mut self.flushing, true);
        while let Some(item) = self.queue.pop() {
            match item {
                Deferred::Deliver(envelope) => delivered.push(self.deliver(envelope)),
                Deferred::Applied(on_applied) => on_applied(self),
            }
        }
        self.flushing = outer;
        trace!(delivered = delivered.len(), "flushed");
        delivered
    }

    /// Number of queued items.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    fn deliver(&mut self, envelope: Envelope) -> DispatchOutcome {
        let origin = envelope.target().id;
        let path: BubblePath<NodeId> = if self.is_alive(origin) {
            router::bubble_path(origin, &*self)
        } else {
            BubblePath::new()
        };
        let mut bubble = Bubble {
            envelope,
            details: Details::new(),
        };
        let nodes = &mut self.nodes;
        let reply = dispatcher::run(&path, &mut bubble, |&group_id, bubble| {
            let node = nodes.get_mut(group_id.idx())?.as_mut()?;
            let NodeData::Group(group) = &mut node.data else {
                return None;
            };
            bubble.envelope.set_current(Some(group_id));
            trace!(group = ?group_id, namespace = ?group.namespace(), "intercepting");
            group.intercept(&bubble.envelope, &mut bubble.details)
        });
        let Bubble {
            mut envelope,
            details,
        } = bubble;
        envelope.set_current(None);
        trace!(
            ?origin,
            event = ?envelope.event_type(),
            visited = path.len(),
            replied = reply.is_some(),
            "delivered"
        );
        DispatchOutcome {
            envelope,
            details,
            visited: path.len(),
            reply,
        }
    }

    fn defer(&mut self, item: Deferred) {
        let was_empty = self.queue.push(item);
        trace!(pending = self.queue.len(), "deferred work");
        if was_empty && !self.flushing {
            self.scheduler.request_flush();
        }
    }

    // --- rendering ---

    /// Props for rendering an active leaf.
    pub fn render_props(&self, id: NodeId) -> Option<RenderProps<'_>> {
        let state = self.leaf_state(id)?;
        Some(RenderProps {
            value: state.value(),
            state: state.aux_state(),
            errors: state.errors(),
            dispatch: DispatchHandle::new(id),
        })
    }

    /// Render an active leaf and apply the element wrapper it inherits, if any.
    pub fn render<R: Renderer>(&self, id: NodeId, renderer: &mut R) -> Option<R::Element> {
        let props = self.render_props(id)?;
        let element = renderer.render_leaf(props);
        Some(match self.node_opt(id)?.context.wrapper {
            Some(wrapper) => renderer.wrap(wrapper, self.name(id), element),
            None => element,
        })
    }

    // --- internals ---

    /// Access a node; panics if `id` is stale.
    fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn leaf(&self, id: NodeId) -> Option<&Leaf> {
        match &self.node_opt(id)?.data {
            NodeData::Leaf(leaf) => Some(leaf),
            NodeData::Group(_) => None,
        }
    }

    fn leaf_mut(&mut self, id: NodeId) -> Result<&mut Leaf, FormError> {
        match &mut self.node_opt_mut(id).ok_or(FormError::Stale(id))?.data {
            NodeData::Leaf(leaf) => Ok(leaf),
            NodeData::Group(_) => Err(FormError::NotALeaf(id)),
        }
    }

    fn state_mut(&mut self, id: NodeId) -> Result<&mut LeafState, FormError> {
        self.leaf_mut(id)?
            .state
            .as_mut()
            .ok_or(FormError::Inactive(id))
    }

    /// Snapshot of `id` for an envelope. Stale ids become nameless valueless targets.
    fn target_of(&self, id: NodeId) -> Target {
        match self.node_opt(id).map(|node| (&node.data, node.flags)) {
            Some((NodeData::Leaf(leaf), flags)) => Target {
                id,
                name: leaf.config.name.clone(),
                valueless: flags.contains(NodeFlags::VALUELESS),
            },
            _ => Target {
                id,
                name: None,
                valueless: true,
            },
        }
    }

    fn inherited_context(&self, id: NodeId) -> Context {
        match self.parent_of(id) {
            Some(parent) => self.node(parent).context.clone(),
            None => self.root_context.clone(),
        }
    }

    /// Recompute the context of `id` and its subtree, parents before children.
    fn refresh_context(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let inherited = self.inherited_context(cur);
            let node = self.node_mut(cur);
            node.context = match &node.data {
                NodeData::Group(group) => group.child_context(&inherited),
                NodeData::Leaf(_) => inherited,
            };
            stack.extend(node.children.iter().rev().copied());
        }
    }

    fn refresh_all(&mut self) {
        let roots: Vec<NodeId> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                Some(n) if n.parent.is_none() =>
                {
                    #[allow(
                        clippy::cast_possible_truncation,
                        reason = "NodeId uses 32-bit indices by design."
                    )]
                    Some(NodeId::new(i as u32, n.generation))
                }
                _ => None,
            })
            .collect();
        for root in roots {
            self.refresh_context(root);
        }
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        let parent_node = self.node_mut(parent);
        parent_node.children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        let p = self.node_mut(parent);
        p.children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }
}

impl ParentLookup<NodeId> for FormTree {
    fn parent_of(&self, node: &NodeId) -> Option<NodeId> {
        Self::parent_of(self, *node)
    }
}

impl InterceptorLookup<NodeId> for FormTree {
    fn intercepts(&self, node: &NodeId) -> bool {
        self.kind(*node) == Some(NodeKind::Group)
    }
}
