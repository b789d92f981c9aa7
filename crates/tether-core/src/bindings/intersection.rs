// # Intersection Binding
//
// Whether a node currently intersects its root (the viewport unless the
// options name one).
//
// ## Target Tracking
//
// The target slot is read on activation and after every commit. A new
// node or new options disconnect the old observer before the next one
// connects; an empty slot disconnects and reports `false`. Entries for
// other targets are ignored, and within one batch the last entry for
// the target wins.

use std::rc::Rc;

use crate::Result;
use crate::lifecycle::Lifecycle;
use crate::node_ref::NodeRef;
use crate::platform::Platform;
use crate::state::StateCell;
use crate::subscription::{Subscription, SubscriptionGuard};
use crate::traits::{
    IntersectionCallback, IntersectionEntry, IntersectionObserverFactory, IntersectionOptions,
    NodeId,
};

/// Visibility of one node
pub struct Intersection {
    factory: Option<Rc<dyn IntersectionObserverFactory>>,
    target: NodeRef,
    options: IntersectionOptions,
    state: Rc<StateCell<bool>>,
    guard: SubscriptionGuard<(NodeId, IntersectionOptions)>,
    active: bool,
}

impl Intersection {
    pub fn new(platform: &Platform, target: NodeRef, options: IntersectionOptions) -> Self {
        Self {
            factory: platform.intersection(),
            target,
            options,
            state: Rc::new(StateCell::new(false)),
            guard: SubscriptionGuard::new("intersection"),
            active: false,
        }
    }

    pub fn is_intersecting(&self) -> bool {
        self.state.get()
    }

    pub fn version(&self) -> u64 {
        self.state.version()
    }

    pub fn target(&self) -> &NodeRef {
        &self.target
    }

    pub fn options(&self) -> &IntersectionOptions {
        &self.options
    }

    /// Replace the options; an active binding reconnects when they differ
    pub fn set_options(&mut self, options: IntersectionOptions) -> Result<()> {
        self.options = options;
        if self.active { self.refresh() } else { Ok(()) }
    }

    fn refresh(&mut self) -> Result<()> {
        let Some(factory) = self.factory.clone() else {
            tracing::debug!("no intersection observer; reporting not intersecting");
            return Ok(());
        };
        let Some(node) = self.target.get() else {
            if self.guard.deactivate() {
                self.state.set_if_changed(false);
            }
            return Ok(());
        };

        let id = node.id();
        let state = Rc::downgrade(&self.state);
        let key = (id, self.options.clone());
        let reconnected = self.guard.sync(key, move |(target, options), _| {
            let target = *target;
            let callback: IntersectionCallback = Rc::new(move |entries: &[IntersectionEntry]| {
                let Some(entry) = entries.iter().rev().find(|entry| entry.target == target) else {
                    return;
                };
                if let Some(state) = state.upgrade() {
                    state.set_if_changed(entry.is_intersecting);
                }
            });
            let mut connection = factory.observe(&node, options, callback)?;
            Ok(Subscription::new("intersection", move || connection.disconnect()))
        })?;
        if reconnected {
            tracing::debug!(node = %id, "observing intersection");
        }
        Ok(())
    }
}

impl Lifecycle for Intersection {
    fn activate(&mut self) -> Result<()> {
        self.active = true;
        self.refresh()
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.guard.deactivate();
    }

    fn committed(&mut self) {
        if !self.active {
            return;
        }
        if let Err(e) = self.refresh() {
            tracing::warn!(error = %e, "failed to re-observe intersection target");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Node;
    use crate::Mount;
    use crate::platform::MemoryPlatform;

    fn entry(target: NodeId, is_intersecting: bool) -> IntersectionEntry {
        IntersectionEntry {
            target,
            is_intersecting,
            ratio: if is_intersecting { 1.0 } else { 0.0 },
        }
    }

    #[test]
    fn empty_slot_observes_nothing() {
        let memory = MemoryPlatform::new();
        let binding =
            Intersection::new(&memory.platform(), NodeRef::new(), IntersectionOptions::default());
        let mounted = Mount::new(binding).unwrap();
        assert_eq!(memory.intersection.observation_count(), 0);
        assert!(!mounted.is_intersecting());
    }

    #[test]
    fn filters_entries_by_target() {
        let memory = MemoryPlatform::new();
        let watched = memory.dom.create_element(None);
        let other = memory.dom.create_element(None);
        let slot = NodeRef::with_node(watched.handle());
        let mounted = Mount::new(Intersection::new(
            &memory.platform(),
            slot,
            IntersectionOptions::default(),
        ))
        .unwrap();

        memory.intersection.trigger(&[entry(other.id(), true)]);
        assert!(!mounted.is_intersecting());
        memory
            .intersection
            .trigger(&[entry(watched.id(), false), entry(watched.id(), true)]);
        assert!(mounted.is_intersecting());
    }

    #[test]
    fn new_options_reconnect_the_observer() {
        let memory = MemoryPlatform::new();
        let node = memory.dom.create_element(None);
        let mut mounted = Mount::new(Intersection::new(
            &memory.platform(),
            NodeRef::with_node(node.handle()),
            IntersectionOptions::default(),
        ))
        .unwrap();

        let options = IntersectionOptions {
            root: None,
            root_margin: "10px".to_string(),
            thresholds: vec![0.5],
        };
        mounted.set_options(options.clone()).unwrap();
        assert_eq!(memory.intersection.observation_count(), 1);
        assert_eq!(memory.intersection.last_options(), Some(options));
    }

    #[test]
    fn slot_changes_are_picked_up_on_commit() {
        let memory = MemoryPlatform::new();
        let node = memory.dom.create_element(None);
        let slot = NodeRef::new();
        let mut mounted = Mount::new(Intersection::new(
            &memory.platform(),
            slot.clone(),
            IntersectionOptions::default(),
        ))
        .unwrap();

        slot.set(Some(node.handle()));
        mounted.rerender();
        assert_eq!(memory.intersection.observed_targets(), vec![node.id()]);

        slot.clear();
        mounted.rerender();
        assert_eq!(memory.intersection.observation_count(), 0);
    }

    #[test]
    fn refused_observer_is_reported() {
        let memory = MemoryPlatform::new();
        let node = memory.dom.create_element(None);
        memory.intersection.refuse_next_observe();
        let binding = Intersection::new(
            &memory.platform(),
            NodeRef::with_node(node.handle()),
            IntersectionOptions::default(),
        );
        assert!(Mount::new(binding).is_err());
    }
}
