//! The render context: one store, one host, and every tracker wired to it.
//!
//! [`CardStack`] is the mediator between host callbacks and the panel store.
//! Trackers turn events into [`StoreCommand`]s; only this type applies them.
//! It owns every host subscription and releases all of them on
//! [`CardStack::teardown`] or drop.

use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};

use crate::config::CardStackConfig;
use crate::drag::DragResize;
use crate::echo::echo_patches;
use crate::error::CardResult;
use crate::growth::GrowthSentinel;
use crate::host::{
    IntersectionEntry, MutationRecord, ObserveRequest, ObserveTarget, ObserverHost, ObserverKind,
    PointerEvent, RenderSurface, RenderedSet, ResizeEntry, SubscriptionId,
};
use crate::panel::{PanelId, initial_panels};
use crate::size::size_patch;
use crate::store::{PanelStore, ReaderId, Snapshot, StoreCommand};
use crate::subscription::SubscriptionSet;
use crate::title_edit::{EditKey, TitleEditor};
use crate::visibility::visibility_patch;

/// Render context for one card list.
pub struct CardStack<H: ObserverHost + RenderSurface> {
    config: CardStackConfig,
    store: PanelStore,
    host: H,
    subscriptions: SubscriptionSet,
    growth: GrowthSentinel,
    drag: DragResize,
    editor: TitleEditor,
    rendered: RenderedSet,
    torn_down: bool,
}

impl<H: ObserverHost + RenderSurface> CardStack<H> {
    /// Validate `config`, seed the initial batch, and take ownership of `host`.
    ///
    /// Nothing is observed until the first [`CardStack::sync_rendered`].
    pub fn new(config: CardStackConfig, host: H) -> CardResult<Self> {
        config.validate()?;

        let mut store = PanelStore::new(config.bounds());
        store.append(initial_panels(&config))?;

        let drag = DragResize::new(config.bounds(), Duration::from_millis(config.drag.throttle_ms));
        let editor = TitleEditor::new(config.edit.revert_on_cancel);
        info!("Card stack created with {} panels", store.len());

        Ok(Self {
            config,
            store,
            host,
            subscriptions: SubscriptionSet::new(),
            growth: GrowthSentinel::new(),
            drag,
            editor,
            rendered: RenderedSet::default(),
            torn_down: false,
        })
    }

    /// The rendered set changed: drop every observer and observe the new set.
    pub fn sync_rendered(&mut self, rendered: RenderedSet) {
        if self.torn_down {
            trace!("Ignoring rendered-set change after teardown");
            return;
        }

        for kind in [ObserverKind::Visibility, ObserverKind::Size, ObserverKind::ContentEcho] {
            self.subscriptions.detach_kind(&mut self.host, kind);
        }
        if let Some(sub) = self.growth.disarm() {
            self.subscriptions.detach(&mut self.host, sub);
        }

        let observers = self.config.observers;
        for mounted in &rendered.panels {
            let target = ObserveTarget::Node(mounted.node);
            self.observe(ObserverKind::Visibility, target, Some(observers.visibility_threshold));
            self.observe(ObserverKind::Size, target, None);
        }

        if let Some(root) = rendered.root {
            self.observe(ObserverKind::ContentEcho, ObserveTarget::Subtree(root), None);
        }

        if let Some(last) = rendered.panels.last() {
            if self.growth.may_arm(last.id) {
                let target = ObserveTarget::Node(last.node);
                let threshold = Some(observers.growth_threshold);
                let sub = self.observe(ObserverKind::Growth, target, threshold);
                self.growth.arm(sub, last.id);
            }
        }

        debug!("Observing {} rendered panels", rendered.panels.len());
        self.rendered = rendered;
    }

    /// Intersection callback for a visibility or growth subscription.
    pub fn on_intersection(&mut self, subscription: SubscriptionId, entries: &[IntersectionEntry]) {
        match self.live_kind(subscription) {
            Some(ObserverKind::Visibility) => {
                let threshold = self.config.observers.visibility_threshold;
                for entry in entries {
                    if let Some(cmd) = visibility_patch(&self.host, entry, threshold) {
                        self.dispatch(cmd);
                    }
                }
            },
            Some(ObserverKind::Growth) => {
                for entry in entries {
                    let fired = self.growth.trigger(
                        &self.host,
                        subscription,
                        entry,
                        self.store.max_id(),
                        &self.config,
                    );
                    if let Some(trigger) = fired {
                        self.subscriptions.detach(&mut self.host, trigger.detach);
                        self.dispatch(StoreCommand::Append(trigger.batch));
                    }
                }
            },
            other => self.drop_event(subscription, other),
        }
    }

    /// Content-size callback.
    pub fn on_resize(&mut self, subscription: SubscriptionId, entries: &[ResizeEntry]) {
        match self.live_kind(subscription) {
            Some(ObserverKind::Size) => {
                let threshold = self.config.observers.organic_height_threshold;
                let dragging = self.drag.active_panel();
                for entry in entries {
                    if let Some(cmd) = size_patch(&self.host, entry, threshold, dragging) {
                        self.dispatch(cmd);
                    }
                }
            },
            other => self.drop_event(subscription, other),
        }
    }

    /// Tree mutation callback.
    pub fn on_mutations(&mut self, subscription: SubscriptionId, records: &[MutationRecord]) {
        match self.live_kind(subscription) {
            Some(ObserverKind::ContentEcho) => {
                for cmd in echo_patches(&self.host, records) {
                    self.dispatch(cmd);
                }
            },
            other => self.drop_event(subscription, other),
        }
    }

    /// Pointer pressed on `panel`'s resize handle. Returns `true` if a drag began.
    pub fn on_handle_pointer_down(&mut self, panel: PanelId, pointer: PointerEvent) -> bool {
        if self.torn_down {
            return false;
        }
        let Some(start_height) = self.store.get(panel).map(|p| p.height) else {
            trace!("Ignoring handle press on unknown panel {}", panel.0);
            return false;
        };

        let gesture = self.observe(ObserverKind::PointerGesture, ObserveTarget::Document, None);
        match self.drag.begin(panel, start_height, pointer, gesture) {
            Ok(()) => true,
            Err(reason) => {
                trace!("Releasing refused gesture {}: {reason:?}", gesture.0);
                self.subscriptions.detach(&mut self.host, gesture);
                false
            },
        }
    }

    /// Document-level pointer move during a gesture.
    pub fn on_pointer_move(&mut self, subscription: SubscriptionId, pointer: PointerEvent) {
        if self.live_kind(subscription) != Some(ObserverKind::PointerGesture) {
            self.drop_event(subscription, None);
            return;
        }
        match self.drag.moved(subscription, pointer) {
            Ok(step) => {
                if let Some(cmd) = step.commit {
                    self.dispatch(cmd);
                }
                if let Some(at) = step.wake_at {
                    self.host.schedule_wakeup(at);
                }
            },
            Err(reason) => trace!("Ignoring pointer move: {reason:?}"),
        }
    }

    /// Document-level pointer release ending a gesture.
    pub fn on_pointer_up(&mut self, subscription: SubscriptionId, pointer: PointerEvent) {
        if self.live_kind(subscription) != Some(ObserverKind::PointerGesture) {
            self.drop_event(subscription, None);
            return;
        }
        match self.drag.released(subscription, pointer) {
            Ok(released) => {
                self.dispatch(released.commit);
                self.subscriptions.detach(&mut self.host, released.gesture);
            },
            Err(reason) => trace!("Ignoring pointer release: {reason:?}"),
        }
    }

    /// Host wake-up: run timed work that is due at `now`.
    pub fn fire_timers(&mut self, now: Instant) {
        if self.torn_down {
            return;
        }
        if let Some(cmd) = self.drag.fire(now) {
            self.dispatch(cmd);
        }
    }

    /// Title clicked: switch it to edit mode.
    pub fn click_title(&mut self, panel: PanelId) -> bool {
        if self.torn_down {
            return false;
        }
        match self.store.get(panel) {
            Some(record) => {
                self.editor.begin(panel, &record.title);
                true
            },
            None => false,
        }
    }

    /// Edit field text changed.
    pub fn edit_input(&mut self, panel: PanelId, text: &str) {
        if self.torn_down {
            return;
        }
        if let Some(cmd) = self.editor.input(panel, text) {
            self.dispatch(cmd);
        }
    }

    /// Key pressed in the edit field.
    pub fn edit_key(&mut self, panel: PanelId, key: EditKey, text: &str) {
        if self.torn_down {
            return;
        }
        if let Some(cmd) = self.editor.key(panel, key, text) {
            self.dispatch(cmd);
        }
    }

    /// Edit field lost focus.
    pub fn edit_blur(&mut self, panel: PanelId, text: &str) {
        if self.torn_down {
            return;
        }
        if let Some(cmd) = self.editor.blur(panel, text) {
            self.dispatch(cmd);
        }
    }

    /// Release every subscription and stop reacting to events. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        self.drag.cancel();
        self.growth.disarm();
        self.editor.abandon();
        let released = self.subscriptions.detach_all(&mut self.host);
        self.rendered = RenderedSet::default();
        info!("Card stack torn down, released {released} subscriptions");
    }

    /// Current snapshot, for drawing.
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Read access to the store.
    pub fn store(&self) -> &PanelStore {
        &self.store
    }

    /// Register a snapshot reader (the render surface).
    pub fn subscribe(&mut self, listener: impl FnMut(&Snapshot) + 'static) -> ReaderId {
        self.store.subscribe(listener)
    }

    /// Remove a snapshot reader.
    pub fn unsubscribe(&mut self, reader: ReaderId) -> bool {
        self.store.unsubscribe(reader)
    }

    /// Height to draw for `panel`: the live drag candidate, else the stored one.
    pub fn display_height(&self, panel: PanelId) -> Option<f32> {
        self.drag.display_height(panel).or_else(|| self.store.get(panel).map(|p| p.height))
    }

    /// Panel being drag-resized.
    pub fn dragging(&self) -> Option<PanelId> {
        self.drag.active_panel()
    }

    /// Panel whose title is in edit mode.
    pub fn editing(&self) -> Option<PanelId> {
        self.editor.editing()
    }

    /// Number of live subscriptions of `kind`.
    pub fn live_subscriptions(&self, kind: ObserverKind) -> usize {
        self.subscriptions.count_of(kind)
    }

    /// Last rendered set received.
    pub fn rendered(&self) -> &RenderedSet {
        &self.rendered
    }

    /// Whether [`CardStack::teardown`] has run.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Active configuration.
    pub fn config(&self) -> &CardStackConfig {
        &self.config
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, e.g. to change its rendered tree.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    fn observe(
        &mut self,
        kind: ObserverKind,
        target: ObserveTarget,
        threshold: Option<f32>,
    ) -> SubscriptionId {
        let request = ObserveRequest { kind, target, threshold };
        self.subscriptions.attach(&mut self.host, request)
    }

    fn live_kind(&self, subscription: SubscriptionId) -> Option<ObserverKind> {
        if self.torn_down { None } else { self.subscriptions.kind_of(subscription) }
    }

    fn drop_event(&self, subscription: SubscriptionId, kind: Option<ObserverKind>) {
        trace!("Dropping event from subscription {} ({kind:?})", subscription.0);
    }

    fn dispatch(&mut self, cmd: StoreCommand) -> bool {
        match self.store.apply(cmd) {
            Ok(published) => published,
            Err(err) => {
                warn!("Store rejected command: {err}");
                false
            },
        }
    }
}

impl<H: ObserverHost + RenderSurface> Drop for CardStack<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
