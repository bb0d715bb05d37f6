//! Registry of live host subscriptions.
//!
//! Every observation the core asks the host for is recorded here until it
//! is detached. Events tagged with an id that is no longer live are stale
//! and get dropped by the caller.

use std::collections::BTreeMap;

use log::debug;

use crate::host::{ObserveRequest, ObserverHost, ObserverKind, SubscriptionId};

/// Live subscriptions keyed by id.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    live: BTreeMap<SubscriptionId, ObserveRequest>,
    next_id: u64,
}

impl SubscriptionSet {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id, record it, and ask the host to start observing.
    pub fn attach(
        &mut self,
        host: &mut impl ObserverHost,
        request: ObserveRequest,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        host.observe(id, &request);
        debug!("Attached {:?} subscription {} on {:?}", request.kind, id.0, request.target);
        self.live.insert(id, request);
        id
    }

    /// Stop a subscription. Returns `false` if it was not live.
    pub fn detach(&mut self, host: &mut impl ObserverHost, id: SubscriptionId) -> bool {
        match self.live.remove(&id) {
            Some(request) => {
                host.unobserve(id);
                debug!("Detached {:?} subscription {}", request.kind, id.0);
                true
            },
            None => false,
        }
    }

    /// Stop every subscription of `kind`. Returns how many were detached.
    pub fn detach_kind(&mut self, host: &mut impl ObserverHost, kind: ObserverKind) -> usize {
        let ids: Vec<SubscriptionId> =
            self.live.iter().filter(|(_, r)| r.kind == kind).map(|(id, _)| *id).collect();
        for id in &ids {
            self.detach(host, *id);
        }
        ids.len()
    }

    /// Stop everything.
    pub fn detach_all(&mut self, host: &mut impl ObserverHost) -> usize {
        let ids: Vec<SubscriptionId> = self.live.keys().copied().collect();
        for id in &ids {
            self.detach(host, *id);
        }
        ids.len()
    }

    /// Kind of a live subscription.
    pub fn kind_of(&self, id: SubscriptionId) -> Option<ObserverKind> {
        self.live.get(&id).map(|r| r.kind)
    }

    /// Whether `id` is live.
    pub fn is_live(&self, id: SubscriptionId) -> bool {
        self.live.contains_key(&id)
    }

    /// Number of live subscriptions of `kind`.
    pub fn count_of(&self, kind: ObserverKind) -> usize {
        self.live.values().filter(|r| r.kind == kind).count()
    }

    /// Total number of live subscriptions.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Whether nothing is live.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
