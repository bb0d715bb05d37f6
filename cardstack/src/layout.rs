//! Vertical stack layout for a snapshot.
//!
//! Hosts with native intersection observers do not need this. Hosts
//! without them (terminal or canvas front-ends, tests) lay the snapshot out
//! here and turn viewport overlap into [`IntersectionEntry`] values.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::host::{IntersectionEntry, MountedPanel};
use crate::panel::{Panel, PanelId};

/// Column geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Panel width in pixels.
    pub width: f32,
    /// Vertical gap between panels.
    pub gap: f32,
    /// Padding above the first panel.
    pub top: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self { width: 600.0, gap: 24.0, top: 32.0 }
    }
}

/// Compute each panel's rectangle, top to bottom, in list order.
pub fn stack_layout(panels: &[Panel], config: &LayoutConfig) -> Vec<(PanelId, Rect)> {
    let mut y = config.top;
    panels
        .iter()
        .map(|panel| {
            let rect = Rect::new(0.0, y, config.width, panel.height);
            y += panel.height + config.gap;
            (panel.id, rect)
        })
        .collect()
}

/// Intersection ratio of every laid-out panel against `viewport`.
pub fn intersections(layout: &[(PanelId, Rect)], viewport: &Rect) -> HashMap<PanelId, f32> {
    layout.iter().map(|(id, rect)| (*id, rect.intersection_ratio(viewport))).collect()
}

/// Synthesize intersection entries for the given mounted panels.
pub fn intersection_entries(
    layout: &[(PanelId, Rect)],
    mounted: &[MountedPanel],
    viewport: &Rect,
) -> Vec<IntersectionEntry> {
    let ratios = intersections(layout, viewport);
    mounted
        .iter()
        .filter_map(|m| {
            let ratio = *ratios.get(&m.id)?;
            Some(IntersectionEntry {
                target: m.node,
                intersection_ratio: ratio,
                is_intersecting: ratio > 0.0,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NodeId;

    fn panels(heights: &[f32]) -> Vec<Panel> {
        heights
            .iter()
            .enumerate()
            .map(|(i, h)| Panel::new(PanelId(i as u32), format!("p{i}"), *h))
            .collect()
    }

    #[test]
    fn layout_stacks_with_gap() {
        let layout = stack_layout(&panels(&[200.0, 100.0, 300.0]), &LayoutConfig::default());
        assert_eq!(layout.len(), 3);
        assert_eq!(layout[0].1.y, 32.0);
        assert_eq!(layout[1].1.y, 32.0 + 200.0 + 24.0);
        assert_eq!(layout[2].1.y, 32.0 + 200.0 + 24.0 + 100.0 + 24.0);
        assert!(layout.iter().all(|(_, r)| r.width == 600.0));
    }

    #[test]
    fn viewport_ratios() {
        let layout = stack_layout(&panels(&[200.0, 200.0, 200.0]), &LayoutConfig::default());
        // Panel 0 spans 32..232, panel 1 spans 256..456, panel 2 spans 480..680.
        let viewport = Rect::new(0.0, 0.0, 800.0, 580.0);
        let ratios = intersections(&layout, &viewport);
        assert_eq!(ratios[&PanelId(0)], 1.0);
        assert_eq!(ratios[&PanelId(1)], 1.0);
        assert!((ratios[&PanelId(2)] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn entries_only_for_mounted_panels() {
        let layout = stack_layout(&panels(&[200.0, 200.0]), &LayoutConfig::default());
        let mounted = [MountedPanel { id: PanelId(1), node: NodeId(11) }];
        let viewport = Rect::new(0.0, 0.0, 800.0, 100.0);
        let entries = intersection_entries(&layout, &mounted, &viewport);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].target, NodeId(11));
        assert!(!entries[0].is_intersecting);
    }
}
