//! Content echo tracker: mirrors live title text into `echoed_title`.
//!
//! Mutations can originate anywhere under a panel (a text node inside the
//! title, a child of the edit field). The tracker walks up to the nearest
//! node tagged with a panel identity and re-reads that panel's title region.

use log::trace;

use crate::host::{MutationKind, MutationRecord, NodeId, RenderSurface, parse_identity};
use crate::panel::{PanelId, PanelPatch};
use crate::store::StoreCommand;

/// Upper bound on ancestor hops, so a malformed host tree cannot loop forever.
const MAX_ANCESTOR_DEPTH: usize = 64;

/// Nearest node at or above `start` that carries a panel identity attribute.
///
/// A node with a malformed identity stops the walk: the event is dropped.
pub fn owning_panel<S: RenderSurface + ?Sized>(
    surface: &S,
    start: NodeId,
) -> Option<(PanelId, NodeId)> {
    let mut node = start;
    for _ in 0..MAX_ANCESTOR_DEPTH {
        if let Some(raw) = surface.identity(node) {
            return parse_identity(&raw).map(|id| (id, node));
        }
        node = surface.parent(node)?;
    }
    None
}

/// Map a batch of mutation records to store writes, in delivery order.
pub fn echo_patches<S: RenderSurface + ?Sized>(
    surface: &S,
    records: &[MutationRecord],
) -> Vec<StoreCommand> {
    records
        .iter()
        .filter(|r| matches!(r.kind, MutationKind::ChildList | MutationKind::CharacterData))
        .filter_map(|record| {
            let Some((id, node)) = owning_panel(surface, record.target) else {
                trace!("Dropping mutation outside any panel at {:?}", record.target);
                return None;
            };
            let title = surface.title_text(node)?;
            Some(StoreCommand::Update { id, patch: PanelPatch::echoed(title) })
        })
        .collect()
}
