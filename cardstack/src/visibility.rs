//! Visibility tracker: intersection entries to `visible` patches.

use log::trace;

use crate::host::{IntersectionEntry, RenderSurface, panel_of};
use crate::panel::PanelPatch;
use crate::store::StoreCommand;

/// Map one intersection entry to a store write.
///
/// A panel counts as visible once at least `threshold` of it is inside the
/// viewport. Entries whose target carries no valid identity are dropped.
pub fn visibility_patch<S: RenderSurface + ?Sized>(
    surface: &S,
    entry: &IntersectionEntry,
    threshold: f32,
) -> Option<StoreCommand> {
    let Some(id) = panel_of(surface, entry.target) else {
        trace!("Dropping intersection entry for untagged node {:?}", entry.target);
        return None;
    };

    let visible = entry.is_intersecting && entry.intersection_ratio >= threshold;
    Some(StoreCommand::Update { id, patch: PanelPatch::visible(visible) })
}
