//! Resize tracking
//!
//! Exposes the content rectangle of the node in the target slot. The
//! rectangle is all zeros until a node is set and the observer reports.
//! The slot is re-read on activation and after every commit.

use std::rc::Rc;

use crate::Result;
use crate::lifecycle::Lifecycle;
use crate::node_ref::NodeRef;
use crate::platform::Platform;
use crate::state::StateCell;
use crate::subscription::{Subscription, SubscriptionGuard};
use crate::traits::{NodeId, Rect, ResizeCallback, ResizeEntry, ResizeObserverFactory};

/// Content rectangle of one node
pub struct Resize {
    factory: Option<Rc<dyn ResizeObserverFactory>>,
    target: NodeRef,
    rect: Rc<StateCell<Rect>>,
    guard: SubscriptionGuard<NodeId>,
    active: bool,
}

impl Resize {
    pub fn new(platform: &Platform, target: NodeRef) -> Self {
        Self {
            factory: platform.resize(),
            target,
            rect: Rc::new(StateCell::new(Rect::default())),
            guard: SubscriptionGuard::new("resize"),
            active: false,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect.get()
    }

    pub fn version(&self) -> u64 {
        self.rect.version()
    }

    pub fn target(&self) -> &NodeRef {
        &self.target
    }

    fn refresh(&mut self) -> Result<()> {
        let Some(factory) = self.factory.clone() else {
            tracing::debug!("no resize observer; reporting an empty rect");
            return Ok(());
        };
        let Some(node) = self.target.get() else {
            if self.guard.deactivate() {
                self.rect.set_if_changed(Rect::default());
            }
            return Ok(());
        };

        let rect = Rc::downgrade(&self.rect);
        self.guard.sync(node.id(), move |target, _| {
            let target = *target;
            let callback: ResizeCallback = Rc::new(move |entries: &[ResizeEntry]| {
                let Some(entry) = entries.iter().rev().find(|entry| entry.target == target) else {
                    return;
                };
                if let Some(rect) = rect.upgrade() {
                    rect.set_if_changed(entry.content_rect);
                }
            });
            let mut connection = factory.observe(&node, callback)?;
            Ok(Subscription::new("resize", move || connection.disconnect()))
        })?;
        Ok(())
    }
}

impl Lifecycle for Resize {
    fn activate(&mut self) -> Result<()> {
        self.active = true;
        self.refresh()
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.guard.deactivate();
    }

    fn committed(&mut self) {
        if self.active {
            if let Err(e) = self.refresh() {
                tracing::warn!(error = %e, "failed to re-observe resize target");
            }
        }
    }
}
