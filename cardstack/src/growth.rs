//! Growth sentinel: appends a batch when the last panel scrolls into view.
//!
//! The sentinel watches exactly one panel. Firing disarms it before the
//! batch is produced, and it refuses to re-arm on a panel it already grew
//! from, so overlapping callbacks for the same last panel append once.

use log::{debug, trace};

use crate::config::CardStackConfig;
use crate::host::{IntersectionEntry, RenderSurface, SubscriptionId, panel_of};
use crate::panel::{Panel, PanelId, growth_batch};

/// The panel the sentinel currently observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Armed {
    /// Host subscription delivering this panel's intersections.
    pub subscription: SubscriptionId,
    /// Observed panel.
    pub panel: PanelId,
}

/// Outcome of a firing sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthTrigger {
    /// Subscription to detach: the panel that fired is no longer observed.
    pub detach: SubscriptionId,
    /// Records to append.
    pub batch: Vec<Panel>,
}

/// Single-target sentinel state.
#[derive(Debug, Default)]
pub struct GrowthSentinel {
    armed: Option<Armed>,
    grown_from: Option<PanelId>,
}

impl GrowthSentinel {
    /// Create a disarmed sentinel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the sentinel may observe `last`.
    pub fn may_arm(&self, last: PanelId) -> bool {
        self.grown_from.is_none_or(|grown| last > grown)
    }

    /// Start observing `panel` through `subscription`.
    pub fn arm(&mut self, subscription: SubscriptionId, panel: PanelId) {
        debug!("Growth sentinel armed on panel {}", panel.0);
        self.armed = Some(Armed { subscription, panel });
    }

    /// Stop observing. Returns the subscription that was armed, if any.
    pub fn disarm(&mut self) -> Option<SubscriptionId> {
        self.armed.take().map(|a| a.subscription)
    }

    /// Currently observed panel.
    pub fn armed(&self) -> Option<Armed> {
        self.armed
    }

    /// Last panel that produced a batch.
    pub fn grown_from(&self) -> Option<PanelId> {
        self.grown_from
    }

    /// Handle one intersection entry delivered on `subscription`.
    ///
    /// `max_id` is the store's current maximum; the batch continues from it.
    pub fn trigger<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &S,
        subscription: SubscriptionId,
        entry: &IntersectionEntry,
        max_id: Option<PanelId>,
        config: &CardStackConfig,
    ) -> Option<GrowthTrigger> {
        let Some(armed) = self.armed else {
            trace!("Growth entry with nothing observed");
            return None;
        };
        if armed.subscription != subscription {
            trace!("Dropping growth entry from stale subscription {}", subscription.0);
            return None;
        }
        if panel_of(surface, entry.target) != Some(armed.panel) {
            trace!("Dropping growth entry for unexpected node {:?}", entry.target);
            return None;
        }
        if !entry.is_intersecting || entry.intersection_ratio < config.observers.growth_threshold {
            return None;
        }

        self.armed = None;
        self.grown_from = Some(armed.panel);

        let batch = growth_batch(max_id, config);
        debug!("Growth fired on panel {}, appending {} panels", armed.panel.0, batch.len());
        Some(GrowthTrigger { detach: armed.subscription, batch })
    }
}
