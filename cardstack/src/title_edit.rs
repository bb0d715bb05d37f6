//! Title edit path.
//!
//! Clicking a title swaps it for an edit field. Every keystroke writes the
//! field's text into both `title` and `echoed_title`, so the direct path and
//! the echo path agree while typing. Enter or blur commits; Escape leaves
//! edit mode.

use log::debug;

use crate::panel::{PanelId, PanelPatch};
use crate::store::StoreCommand;

/// Keys with edit-mode meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    /// Acknowledge and commit.
    Enter,
    /// Cancel.
    Escape,
    /// Anything else; text changes arrive through `input`.
    Other,
}

/// The panel being edited and its title before the edit began.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    /// Panel in edit mode.
    pub panel: PanelId,
    /// Title at the moment editing started.
    pub original: String,
}

/// Edit-mode state machine. At most one panel is edited at a time.
#[derive(Debug, Default)]
pub struct TitleEditor {
    session: Option<EditSession>,
    revert_on_cancel: bool,
}

impl TitleEditor {
    /// Create an editor in display mode.
    pub fn new(revert_on_cancel: bool) -> Self {
        Self { session: None, revert_on_cancel }
    }

    /// Panel currently in edit mode.
    pub fn editing(&self) -> Option<PanelId> {
        self.session.as_ref().map(|s| s.panel)
    }

    /// Enter edit mode for `panel`. Any other session is left as typed.
    pub fn begin(&mut self, panel: PanelId, current_title: &str) {
        if self.editing() == Some(panel) {
            return;
        }
        debug!("Editing title of panel {}", panel.0);
        self.session = Some(EditSession { panel, original: current_title.to_owned() });
    }

    /// Field text changed.
    pub fn input(&mut self, panel: PanelId, text: &str) -> Option<StoreCommand> {
        (self.editing() == Some(panel)).then(|| edited(panel, text))
    }

    /// Key pressed in the field; `text` is the field's current value.
    pub fn key(&mut self, panel: PanelId, key: EditKey, text: &str) -> Option<StoreCommand> {
        if self.editing() != Some(panel) {
            return None;
        }
        match key {
            EditKey::Enter => self.commit(panel, text),
            EditKey::Escape => self.cancel(),
            EditKey::Other => None,
        }
    }

    /// Field lost focus.
    pub fn blur(&mut self, panel: PanelId, text: &str) -> Option<StoreCommand> {
        if self.editing() != Some(panel) {
            return None;
        }
        self.commit(panel, text)
    }

    /// Leave edit mode. Without `revert_on_cancel` the live-typed value stays.
    pub fn cancel(&mut self) -> Option<StoreCommand> {
        let session = self.session.take()?;
        debug!("Cancelled title edit of panel {}", session.panel.0);
        self.revert_on_cancel.then(|| edited(session.panel, &session.original))
    }

    /// Drop the session without any write.
    pub fn abandon(&mut self) {
        self.session = None;
    }

    fn commit(&mut self, panel: PanelId, text: &str) -> Option<StoreCommand> {
        self.session = None;
        debug!("Committed title of panel {}", panel.0);
        Some(edited(panel, text))
    }
}

fn edited(panel: PanelId, text: &str) -> StoreCommand {
    StoreCommand::Update { id: panel, patch: PanelPatch::edited(text) }
}
