//! Panel records and field-level patches.
//!
//! Records are plain values. The store replaces a whole record on every
//! write, so a [`Panel`] held by a reader never changes underneath it.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::CardStackConfig;

/// Unique identifier for a panel (monotonic counter, never reused).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PanelId(pub u32);

/// Inclusive height limits applied to every stored height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightBounds {
    /// Smallest storable height.
    pub min: f32,
    /// Largest storable height.
    pub max: f32,
}

impl HeightBounds {
    /// Create bounds; callers validate `min <= max` through the config.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Clamp a height into the bounds. NaN maps to `min`.
    pub fn clamp(&self, height: f32) -> f32 {
        if height.is_nan() { self.min } else { height.clamp(self.min, self.max) }
    }
}

impl Default for HeightBounds {
    fn default() -> Self {
        Self::new(100.0, 500.0)
    }
}

/// A single card in the stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    /// Unique panel identifier.
    pub id: PanelId,
    /// User-editable display title.
    pub title: String,
    /// Last title text mirrored from the render tree.
    pub echoed_title: Option<String>,
    /// Rendered height in pixels.
    pub height: f32,
    /// Whether the panel currently intersects the viewport.
    pub visible: bool,
}

impl Panel {
    /// Create a hidden panel with no echoed title.
    pub fn new(id: PanelId, title: impl Into<String>, height: f32) -> Self {
        Self { id, title: title.into(), echoed_title: None, height, visible: false }
    }

    /// Return the replacement record produced by applying `patch`.
    pub fn merged(&self, patch: &PanelPatch, bounds: HeightBounds) -> Panel {
        Panel {
            id: self.id,
            title: patch.title.clone().unwrap_or_else(|| self.title.clone()),
            echoed_title: patch.echoed_title.clone().or_else(|| self.echoed_title.clone()),
            height: patch.height.map_or(self.height, |h| bounds.clamp(h)),
            visible: patch.visible.unwrap_or(self.visible),
        }
    }
}

/// A partial update. `None` fields leave the record untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelPatch {
    /// New title.
    pub title: Option<String>,
    /// New echoed title.
    pub echoed_title: Option<String>,
    /// New height, clamped on merge.
    pub height: Option<f32>,
    /// New visibility flag.
    pub visible: Option<bool>,
}

impl PanelPatch {
    /// Patch touching only `visible`.
    pub fn visible(visible: bool) -> Self {
        Self { visible: Some(visible), ..Self::default() }
    }

    /// Patch touching only `height`.
    pub fn height(height: f32) -> Self {
        Self { height: Some(height), ..Self::default() }
    }

    /// Patch touching only `echoed_title`.
    pub fn echoed(text: impl Into<String>) -> Self {
        Self { echoed_title: Some(text.into()), ..Self::default() }
    }

    /// Patch setting `title` and `echoed_title` together, as the edit path does.
    pub fn edited(text: impl Into<String>) -> Self {
        let text = text.into();
        Self { title: Some(text.clone()), echoed_title: Some(text), ..Self::default() }
    }

    /// Whether the patch touches no field at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.echoed_title.is_none()
            && self.height.is_none()
            && self.visible.is_none()
    }
}

/// Build the startup batch.
pub fn initial_panels(config: &CardStackConfig) -> Vec<Panel> {
    let last = config.initial_count.saturating_sub(1);
    (0..config.initial_count)
        .map(|i| {
            let title = if i == 0 {
                config.first_title.clone()
            } else if i == last {
                config.last_title.clone()
            } else {
                format!("Card {}", i + 1)
            };
            Panel::new(PanelId(i), title, config.height.default)
        })
        .collect()
}

/// Build the batch that follows `after` (the current maximum id, if any).
///
/// Returns an empty batch once the id space is exhausted.
pub fn growth_batch(after: Option<PanelId>, config: &CardStackConfig) -> Vec<Panel> {
    let start = after.map_or(Some(0), |PanelId(id)| id.checked_add(1));
    let Some(range) = start.and_then(|s| Some(s..s.checked_add(config.batch_size)?)) else {
        warn!("Panel ids exhausted after {after:?}, not growing");
        return Vec::new();
    };

    range
        .map(|id| {
            let title = format!("New Card {}", u64::from(id) + 1);
            Panel::new(PanelId(id), title, config.height.default)
        })
        .collect()
}
