// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-annotation change notification.
//!
//! Observers [`subscribe`](ChangeBus::subscribe) to one annotation and later
//! [`take`](ChangeBus::take) the accumulated [`ChangeFlags`]. A write is
//! delivered to exactly the subscriptions registered for that annotation at
//! the time it is published; subscribing later does not replay earlier writes.

use hashbrown::HashMap;
use smallvec::SmallVec;
use trellis_annotation::AnnotationId;

bitflags::bitflags! {
    /// Which observable fields of an annotation changed.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ChangeFlags: u8 {
        /// Intended or visual position.
        const POSITION   = 0b0000_0001;
        /// Size.
        const SIZE       = 0b0000_0010;
        /// Render order.
        const Z_INDEX    = 0b0000_0100;
        /// Visibility.
        const VISIBILITY = 0b0000_1000;
        /// Selection state.
        const SELECTION  = 0b0001_0000;
        /// Group membership or behavior.
        const MEMBERSHIP = 0b0010_0000;
        /// Kind-specific content such as text, title, or color.
        const CONTENT    = 0b0100_0000;
        /// The annotation left the canvas.
        const REMOVED    = 0b1000_0000;
    }
}

/// Handle returned by [`ChangeBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Clone, Debug)]
struct Subscription {
    annotation: AnnotationId,
    pending: ChangeFlags,
}

/// A change bus keyed by annotation id.
#[derive(Clone, Debug, Default)]
pub struct ChangeBus {
    next: u64,
    subscriptions: HashMap<SubscriptionId, Subscription>,
    by_annotation: HashMap<AnnotationId, SmallVec<[SubscriptionId; 2]>>,
}

impl ChangeBus {
    /// An empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start observing `annotation`.
    pub fn subscribe(&mut self, annotation: AnnotationId) -> SubscriptionId {
        let id = SubscriptionId(self.next);
        self.next += 1;
        self.by_annotation
            .entry(annotation.clone())
            .or_default()
            .push(id);
        self.subscriptions.insert(
            id,
            Subscription {
                annotation,
                pending: ChangeFlags::empty(),
            },
        );
        id
    }

    /// Stop observing. Returns whether the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(sub) = self.subscriptions.remove(&id) else {
            return false;
        };
        if let Some(subs) = self.by_annotation.get_mut(&sub.annotation) {
            subs.retain(|s| *s != id);
            if subs.is_empty() {
                self.by_annotation.remove(&sub.annotation);
            }
        }
        true
    }

    /// Record a write to `annotation` for all its current subscribers.
    pub fn publish(&mut self, annotation: &AnnotationId, flags: ChangeFlags) {
        if flags.is_empty() {
            return;
        }
        let Some(subs) = self.by_annotation.get(annotation) else {
            return;
        };
        for id in subs {
            if let Some(sub) = self.subscriptions.get_mut(id) {
                sub.pending |= flags;
            }
        }
    }

    /// Take and reset the changes accumulated for a subscription.
    ///
    /// Unknown subscriptions report no changes.
    pub fn take(&mut self, id: SubscriptionId) -> ChangeFlags {
        self.subscriptions
            .get_mut(&id)
            .map(|sub| core::mem::take(&mut sub.pending))
            .unwrap_or_default()
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether there are no live subscriptions.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_to_current_subscribers_only() {
        let mut bus = ChangeBus::new();
        let a = AnnotationId::from("a");
        let b = AnnotationId::from("b");
        let sa = bus.subscribe(a.clone());
        let sb = bus.subscribe(b.clone());

        bus.publish(&a, ChangeFlags::POSITION);
        bus.publish(&a, ChangeFlags::SIZE);
        let late = bus.subscribe(a.clone());

        assert_eq!(bus.take(sa), ChangeFlags::POSITION | ChangeFlags::SIZE);
        assert_eq!(bus.take(sa), ChangeFlags::empty());
        assert_eq!(bus.take(sb), ChangeFlags::empty());
        assert_eq!(bus.take(late), ChangeFlags::empty());
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = ChangeBus::new();
        let a = AnnotationId::from("a");
        let s = bus.subscribe(a.clone());
        assert!(bus.unsubscribe(s));
        assert!(!bus.unsubscribe(s));
        bus.publish(&a, ChangeFlags::Z_INDEX);
        assert_eq!(bus.take(s), ChangeFlags::empty());
        assert!(bus.is_empty());
    }
}
