//! Drag-to-resize state machine for a panel's corner handle.
//!
//! A pointer-down on a handle enters `Dragging`; document-level move and
//! release listeners live for the duration of the gesture. While dragging,
//! each move recomputes a candidate height. Store writes go through a
//! timer-armed pending slot so at most one write lands per throttle window.
//! Release commits the final candidate immediately and returns to `Idle`.
//!
//! Only one gesture can be active at a time, across all panels.

use std::time::{Duration, Instant};

use log::{debug, trace, warn};

use crate::host::{PointerEvent, SubscriptionId};
use crate::panel::{HeightBounds, PanelId, PanelPatch};
use crate::store::StoreCommand;

/// Deferred write slot for throttled commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingWrite {
    /// Nothing waiting.
    Empty,
    /// The latest candidate is committed once `deadline` passes.
    Armed {
        /// Earliest commit time.
        deadline: Instant,
    },
}

/// State of the gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveDrag {
    /// Panel being resized.
    pub panel: PanelId,
    /// Pointer Y at pointer-down.
    pub start_y: f32,
    /// Stored height at pointer-down.
    pub start_height: f32,
    /// Most recently computed height, shown even before it is committed.
    pub candidate: f32,
    /// Subscription carrying the gesture's move/up listeners.
    pub gesture: SubscriptionId,
    /// Throttle slot.
    pub pending: PendingWrite,
}

/// Current state of the drag controller.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A handle is being dragged.
    Dragging(ActiveDrag),
}

/// Why a pointer event did not affect the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragIgnored {
    /// A gesture is already in progress.
    AlreadyActive,
    /// No gesture is in progress.
    NotDragging,
    /// The event came from a gesture that is no longer current.
    StaleGesture,
}

/// Effect of one pointer move.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DragStep {
    /// Write to apply now, if the throttle window had already elapsed.
    pub commit: Option<StoreCommand>,
    /// Wake-up to schedule for a newly armed pending write.
    pub wake_at: Option<Instant>,
}

/// Effect of releasing the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct Released {
    /// Final, unconditional write.
    pub commit: StoreCommand,
    /// Gesture listeners to detach.
    pub gesture: SubscriptionId,
}

/// The drag-resize controller.
#[derive(Debug)]
pub struct DragResize {
    state: DragState,
    bounds: HeightBounds,
    throttle: Duration,
}

impl DragResize {
    /// Create an idle controller.
    pub fn new(bounds: HeightBounds, throttle: Duration) -> Self {
        Self { state: DragState::Idle, bounds, throttle }
    }

    /// Current state.
    pub fn state(&self) -> DragState {
        self.state
    }

    /// Panel being dragged, if any.
    pub fn active_panel(&self) -> Option<PanelId> {
        match self.state {
            DragState::Dragging(drag) => Some(drag.panel),
            DragState::Idle => None,
        }
    }

    /// Height to draw for `panel`: the live candidate while it is dragged.
    pub fn display_height(&self, panel: PanelId) -> Option<f32> {
        match self.state {
            DragState::Dragging(drag) if drag.panel == panel => Some(drag.candidate),
            _ => None,
        }
    }

    /// Idle → Dragging.
    pub fn begin(
        &mut self,
        panel: PanelId,
        start_height: f32,
        pointer: PointerEvent,
        gesture: SubscriptionId,
    ) -> Result<(), DragIgnored> {
        if let DragState::Dragging(active) = self.state {
            warn!("Ignoring drag on panel {} while panel {} is resizing", panel.0, active.panel.0);
            return Err(DragIgnored::AlreadyActive);
        }

        let start_height = self.bounds.clamp(start_height);
        self.state = DragState::Dragging(ActiveDrag {
            panel,
            start_y: pointer.y,
            start_height,
            candidate: start_height,
            gesture,
            pending: PendingWrite::Empty,
        });
        debug!("Drag started on panel {} at height {start_height}", panel.0);
        Ok(())
    }

    /// Pointer moved while dragging.
    pub fn moved(
        &mut self,
        gesture: SubscriptionId,
        pointer: PointerEvent,
    ) -> Result<DragStep, DragIgnored> {
        let bounds = self.bounds;
        let throttle = self.throttle;
        let drag = self.active_mut(gesture)?;

        drag.candidate = candidate_height(bounds, drag.start_height, drag.start_y, pointer.y);
        trace!("Drag candidate for panel {}: {}", drag.panel.0, drag.candidate);

        match drag.pending {
            PendingWrite::Empty => {
                let deadline = pointer.at + throttle;
                drag.pending = PendingWrite::Armed { deadline };
                Ok(DragStep { commit: None, wake_at: Some(deadline) })
            },
            PendingWrite::Armed { deadline } if pointer.at >= deadline => {
                drag.pending = PendingWrite::Empty;
                Ok(DragStep { commit: Some(commit(drag.panel, drag.candidate)), wake_at: None })
            },
            PendingWrite::Armed { .. } => Ok(DragStep::default()),
        }
    }

    /// Timer callback: commit the pending candidate if its deadline passed.
    pub fn fire(&mut self, now: Instant) -> Option<StoreCommand> {
        let DragState::Dragging(drag) = &mut self.state else {
            return None;
        };
        match drag.pending {
            PendingWrite::Armed { deadline } if now >= deadline => {
                drag.pending = PendingWrite::Empty;
                Some(commit(drag.panel, drag.candidate))
            },
            _ => None,
        }
    }

    /// Dragging → Idle. The final height bypasses the throttle.
    pub fn released(
        &mut self,
        gesture: SubscriptionId,
        pointer: PointerEvent,
    ) -> Result<Released, DragIgnored> {
        let bounds = self.bounds;
        let drag = *self.active_mut(gesture)?;

        let height = candidate_height(bounds, drag.start_height, drag.start_y, pointer.y);
        self.state = DragState::Idle;
        debug!("Drag on panel {} released at height {height}", drag.panel.0);
        Ok(Released { commit: commit(drag.panel, height), gesture: drag.gesture })
    }

    /// Abandon the gesture without writing. Returns its listeners to detach.
    pub fn cancel(&mut self) -> Option<SubscriptionId> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(drag) => {
                debug!("Drag on panel {} cancelled", drag.panel.0);
                Some(drag.gesture)
            },
            DragState::Idle => None,
        }
    }

    fn active_mut(&mut self, gesture: SubscriptionId) -> Result<&mut ActiveDrag, DragIgnored> {
        match &mut self.state {
            DragState::Dragging(drag) if drag.gesture == gesture => Ok(drag),
            DragState::Dragging(_) => Err(DragIgnored::StaleGesture),
            DragState::Idle => Err(DragIgnored::NotDragging),
        }
    }
}

/// `clamp(start_height + (y - start_y))` within `bounds`.
pub fn candidate_height(bounds: HeightBounds, start_height: f32, start_y: f32, y: f32) -> f32 {
    bounds.clamp(start_height + (y - start_y))
}

fn commit(panel: PanelId, height: f32) -> StoreCommand {
    StoreCommand::Update { id: panel, patch: PanelPatch::height(height) }
}
