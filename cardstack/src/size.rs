//! Size tracker: organic content-size changes to `height` patches.

use log::trace;

use crate::host::{RenderSurface, ResizeEntry, panel_of};
use crate::panel::{PanelId, PanelPatch};
use crate::store::StoreCommand;

/// Map one resize entry to a store write.
///
/// Heights at or below `threshold` are the resting size and are ignored.
/// Writes for `dragging` are suppressed so an in-flight manual resize is
/// never overwritten by the layout it causes.
pub fn size_patch<S: RenderSurface + ?Sized>(
    surface: &S,
    entry: &ResizeEntry,
    threshold: f32,
    dragging: Option<PanelId>,
) -> Option<StoreCommand> {
    let Some(id) = panel_of(surface, entry.target) else {
        trace!("Dropping resize entry for untagged node {:?}", entry.target);
        return None;
    };
    if dragging == Some(id) {
        trace!("Suppressing organic resize of panel {} during drag", id.0);
        return None;
    }
    if entry.content_height.is_nan() || entry.content_height <= threshold {
        return None;
    }

    Some(StoreCommand::Update { id, patch: PanelPatch::height(entry.content_height) })
}
