//! Interfaces consumed from the host platform and the render surface.
//!
//! The host owns the real observers (intersection, resize, mutation,
//! pointer capture) and the rendered node tree. The core only ever sees
//! opaque [`NodeId`]s and the events tagged with the [`SubscriptionId`]
//! that requested them.

use std::time::Instant;

use crate::panel::PanelId;

/// Opaque handle for a node in the rendered tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Identifier of one observation requested from the host (never reused).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

/// Which subsystem owns a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObserverKind {
    /// Per-panel viewport intersection for the visible flag.
    Visibility,
    /// Intersection of the last panel, driving list growth.
    Growth,
    /// Per-panel content size.
    Size,
    /// Character-data and child-list mutations under the render root.
    ContentEcho,
    /// Document-level pointer move/up listeners for one drag gesture.
    PointerGesture,
}

/// What a subscription observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveTarget {
    /// A single node.
    Node(NodeId),
    /// A node and all of its descendants.
    Subtree(NodeId),
    /// The whole document.
    Document,
}

/// A request handed to [`ObserverHost::observe`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserveRequest {
    /// Owning subsystem.
    pub kind: ObserverKind,
    /// Observed target.
    pub target: ObserveTarget,
    /// Intersection threshold, for intersection kinds only.
    pub threshold: Option<f32>,
}

/// One intersection observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    /// Observed node.
    pub target: NodeId,
    /// Fraction of the node inside the viewport (0.0–1.0).
    pub intersection_ratio: f32,
    /// Whether the node intersects the viewport at all.
    pub is_intersecting: bool,
}

/// One content-size observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeEntry {
    /// Observed node.
    pub target: NodeId,
    /// Observed content height in pixels.
    pub content_height: f32,
}

/// Kind of tree mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Children added or removed.
    ChildList,
    /// Text content changed.
    CharacterData,
    /// An attribute changed.
    Attributes,
}

/// One mutation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationRecord {
    /// What changed.
    pub kind: MutationKind,
    /// Node where the mutation originated.
    pub target: NodeId,
}

/// Pointer position sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Vertical client coordinate in pixels.
    pub y: f32,
    /// When the sample was taken.
    pub at: Instant,
}

/// A panel whose visual representation is currently mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountedPanel {
    /// Record the node draws.
    pub id: PanelId,
    /// Root node carrying the identity attribute.
    pub node: NodeId,
}

/// The rendered-set change signal: everything currently mounted, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedSet {
    /// Root of the render tree, observed for content mutations.
    pub root: Option<NodeId>,
    /// Mounted panels in list order.
    pub panels: Vec<MountedPanel>,
}

/// Platform side of every subscription.
pub trait ObserverHost {
    /// Start delivering events for `id`.
    fn observe(&mut self, id: SubscriptionId, request: &ObserveRequest);

    /// Stop delivering events for `id`.
    fn unobserve(&mut self, id: SubscriptionId);

    /// Ask to be woken at `at` so pending timed work can run.
    fn schedule_wakeup(&mut self, _at: Instant) {}
}

/// Read-only access to the rendered node tree.
pub trait RenderSurface {
    /// Raw panel identity attribute of `node`, if it carries one.
    fn identity(&self, node: NodeId) -> Option<String>;

    /// Parent of `node`, or `None` at the root.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Live text of the title region inside the panel rooted at `node`.
    fn title_text(&self, node: NodeId) -> Option<String>;
}

/// Parse an identity attribute value. Malformed values yield `None`.
pub fn parse_identity(raw: &str) -> Option<PanelId> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok().map(PanelId)
}

/// Identity of `node` itself, parsed.
pub fn panel_of<S: RenderSurface + ?Sized>(surface: &S, node: NodeId) -> Option<PanelId> {
    surface.identity(node).as_deref().and_then(parse_identity)
}
