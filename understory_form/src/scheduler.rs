// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred work and the host's scheduling hook.
//!
//! The core never decides when deferred work runs. Asynchronous envelopes and
//! `on_applied` callbacks are queued in FIFO order, the host is told through
//! [`Scheduler::request_flush`] that work is pending, and the host drains the queue
//! by calling [`FormTree::flush`] whenever its own scheduling turn comes around.

use alloc::boxed::Box;
use alloc::collections::VecDeque;

use crate::envelope::Envelope;
use crate::tree::FormTree;

/// Callback run once a leaf mutation is visible, at the next flush.
pub type Applied = Box<dyn FnOnce(&mut FormTree)>;

/// Host hook notified when the deferred queue goes from empty to non-empty.
///
/// Any `FnMut()` closure is a scheduler.
pub trait Scheduler {
    /// Ask the host to call [`FormTree::flush`] on a later turn.
    fn request_flush(&mut self);
}

impl<F: FnMut()> Scheduler for F {
    fn request_flush(&mut self) {
        self();
    }
}

/// Scheduler that does nothing; the host flushes on its own cadence.
#[derive(Copy, Clone, Debug, Default)]
pub struct ManualScheduler;

impl Scheduler for ManualScheduler {
    fn request_flush(&mut self) {}
}

pub(crate) enum Deferred {
    Deliver(Envelope),
    Applied(Applied),
}

impl core::fmt::Debug for Deferred {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Deliver(envelope) => f.debug_tuple("Deliver").field(envelope).finish(),
            Self::Applied(_) => f.write_str("Applied(..)"),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct WorkQueue {
    items: VecDeque<Deferred>,
}

impl WorkQueue {
    /// Push an item; returns true if the queue was empty before.
    pub(crate) fn push(&mut self, item: Deferred) -> bool {
        let was_empty = self.items.is_empty();
        self.items.push_back(item);
        was_empty
    }

    pub(crate) fn pop(&mut self) -> Option<Deferred> {
        self.items.pop_front()
    }

    /// Keep only the items for which `keep` returns true, preserving order.
    pub(crate) fn retain(&mut self, keep: impl FnMut(&Deferred) -> bool) {
        self.items.retain(keep);
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}
