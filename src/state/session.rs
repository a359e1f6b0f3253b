//! Grid editing session.
//!
//! SYSTEM CONTEXT
//! ==============
//! `GridSession` is the single owner of everything mutable on the start page:
//! the layout engine, the creation drafts, the icon search and the save
//! worker. Hosts drive it with user actions and call [`GridSession::poll`]
//! (or one of the `wait_*`/`next_*` helpers) to fold in network results.
//!
//! DESIGN
//! ======
//! Viewing and Editing are the only modes. Entering Editing enables the
//! engine and strips placeholders. Leaving it runs, in order: disable the
//! engine, serialize and queue the save, refill placeholders, revert the
//! chrome. The save is not awaited; its outcome arrives later through the
//! persistence gateway and is folded into [`SaveState`].
//!
//! ERROR HANDLING
//! ==============
//! Network failures never change the mode or touch the engine. A failed save
//! becomes a [`SessionNotice::SaveFailed`] and can be resent with
//! [`GridSession::retry_save`]. Validation and placement errors are returned
//! to the caller with the drafts left intact so the user can fix and retry.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use super::ValidationError;
use super::color_picker::ColorPicker;
use super::dynamic_cell::{DynamicCellBuilder, GalleryEntry};
use super::icon_search::{FriendlyIcon, IconSearchClient, SearchEvent};
use super::link_cell::LinkCellBuilder;
use crate::config::StartpageConfig;
use crate::engine::{DragPhase, EngineError, ItemId, LayoutEngine};
use crate::net::api::GridApi;
use crate::net::types::CellDraft;
use crate::services::persistence::{PersistenceGateway, SaveOutcome, SaveResult, SaveSeq};
use crate::services::placeholders::{fill_with_placeholders, remove_placeholders};
use crate::services::serializer::{place_draft, serialize};

pub const EDIT_TITLE: &str = "Edit Cells";
pub const SAVE_TITLE: &str = "Save Cells";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditMode {
    #[default]
    Viewing,
    Editing,
}

/// Tabs of the add-cell panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CreationTab {
    #[default]
    Link,
    Dynamic,
}

/// Menu affordances that follow the edit mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chrome {
    /// Tooltip of the edit toggle.
    pub toggle_title: &'static str,
    pub border_visible: bool,
}

impl Chrome {
    const VIEWING: Self = Self { toggle_title: EDIT_TITLE, border_visible: false };
    const EDITING: Self = Self { toggle_title: SAVE_TITLE, border_visible: true };
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CreationPanel {
    pub open: bool,
    pub tab: CreationTab,
}

/// Status of the most recently queued snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SaveState {
    #[default]
    Idle,
    Pending { seq: SaveSeq },
    Saved { seq: SaveSeq },
    Failed { seq: SaveSeq, message: String },
}

/// Non-blocking, user-visible messages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionNotice {
    SaveSucceeded { seq: SaveSeq },
    SaveFailed { seq: SaveSeq, message: String },
    SearchFailed { message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("cells can only be changed while editing")]
    NotEditing,
    #[error("no failed save to retry")]
    NothingToRetry,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub struct GridSession<E: LayoutEngine> {
    engine: E,
    mode: EditMode,
    chrome: Chrome,
    trash_active: Arc<AtomicBool>,
    creation: CreationPanel,
    search: IconSearchClient,
    link: LinkCellBuilder,
    dynamic: DynamicCellBuilder,
    persistence: PersistenceGateway,
    save_state: SaveState,
    notices: Vec<SessionNotice>,
}

impl<E: LayoutEngine> GridSession<E> {
    /// Start a session in Viewing mode over an engine that already holds the
    /// loaded grid. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if placeholders cannot be inserted.
    pub fn new(mut engine: E, api: Arc<dyn GridApi>, config: &StartpageConfig) -> Result<Self, SessionError> {
        let trash_active = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&trash_active);
        engine.on_drag(Box::new(move |phase, item| {
            flag.store(phase == DragPhase::Start, Ordering::SeqCst);
            debug!(%item, ?phase, "cell drag");
        }));

        engine.disable();
        let placeholders = fill_with_placeholders(&mut engine)?;
        debug!(placeholders, "grid session started");

        Ok(Self {
            engine,
            mode: EditMode::Viewing,
            chrome: Chrome::VIEWING,
            trash_active,
            creation: CreationPanel::default(),
            search: IconSearchClient::new(Arc::clone(&api), config),
            link: LinkCellBuilder::default(),
            dynamic: DynamicCellBuilder::default(),
            persistence: PersistenceGateway::spawn(api),
            save_state: SaveState::Idle,
            notices: Vec::new(),
        })
    }

    /// Use an external color picker for the link draft.
    #[must_use]
    pub fn with_picker(mut self, picker: Box<dyn ColorPicker>) -> Self {
        self.link = LinkCellBuilder::new(picker);
        self
    }

    /// Replace the built-in widget gallery.
    #[must_use]
    pub fn with_gallery(mut self, gallery: Vec<GalleryEntry>) -> Self {
        self.dynamic = DynamicCellBuilder::new(gallery);
        self
    }

    // =========================================================================
    // Edit mode
    // =========================================================================

    /// Flip the mode. Returns the save sequence when leaving Editing.
    ///
    /// # Errors
    ///
    /// Propagates engine errors from placeholder handling.
    pub fn toggle_editing(&mut self) -> Result<Option<SaveSeq>, SessionError> {
        match self.mode {
            EditMode::Viewing => self.enter_editing().map(|()| None),
            EditMode::Editing => self.exit_editing(),
        }
    }

    /// Unlock the layout. No-op when already editing.
    ///
    /// # Errors
    ///
    /// Propagates engine errors from placeholder removal.
    pub fn enter_editing(&mut self) -> Result<(), SessionError> {
        if self.mode == EditMode::Editing {
            return Ok(());
        }
        self.engine.enable();
        let removed = remove_placeholders(&mut self.engine)?;
        self.mode = EditMode::Editing;
        self.chrome = Chrome::EDITING;
        debug!(removed, "editing started");
        Ok(())
    }

    /// Lock the layout and queue a save. Returns `None`, without saving, when
    /// the session is not editing.
    ///
    /// # Errors
    ///
    /// Propagates engine errors from refilling placeholders. The save has
    /// already been queued and the mode is Viewing when this fails.
    pub fn exit_editing(&mut self) -> Result<Option<SaveSeq>, SessionError> {
        if self.mode == EditMode::Viewing {
            return Ok(None);
        }
        self.engine.disable();
        self.mode = EditMode::Viewing;
        let seq = self.submit_snapshot();

        let filled = fill_with_placeholders(&mut self.engine);
        self.chrome = Chrome::VIEWING;
        let placeholders = filled?;
        debug!(seq, placeholders, "editing finished");
        Ok(Some(seq))
    }

    /// Resend the current layout after a failed save.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NothingToRetry`] unless the last save failed.
    pub fn retry_save(&mut self) -> Result<SaveSeq, SessionError> {
        let SaveState::Failed { seq, .. } = &self.save_state else {
            return Err(SessionError::NothingToRetry);
        };
        info!(failed = *seq, "retrying grid save");
        Ok(self.submit_snapshot())
    }

    fn submit_snapshot(&mut self) -> SaveSeq {
        let grid = serialize(&self.engine);
        let seq = self.persistence.submit(grid);
        self.save_state = SaveState::Pending { seq };
        seq
    }

    // =========================================================================
    // Async results
    // =========================================================================

    /// Fold in every save outcome and search reply that has already arrived.
    pub fn poll(&mut self) {
        while let Some(outcome) = self.persistence.try_next_outcome() {
            self.apply_save_outcome(outcome);
        }
        for event in self.search.poll() {
            self.note_search_event(&event);
        }
    }

    /// Wait until every queued save has resolved.
    pub async fn wait_for_save(&mut self) -> &SaveState {
        while let Some(outcome) = self.persistence.next_outcome().await {
            self.apply_save_outcome(outcome);
        }
        &self.save_state
    }

    /// Wait for the next icon search reply. `None` when no search is pending.
    pub async fn next_search_event(&mut self) -> Option<SearchEvent> {
        let event = self.search.next_event().await?;
        self.note_search_event(&event);
        Some(event)
    }

    fn apply_save_outcome(&mut self, outcome: SaveOutcome) {
        let latest = self.persistence.last_seq() == Some(outcome.seq);
        match outcome.result {
            SaveResult::Saved if latest => {
                self.save_state = SaveState::Saved { seq: outcome.seq };
                self.notices.push(SessionNotice::SaveSucceeded { seq: outcome.seq });
            }
            SaveResult::Failed(e) if latest => {
                let message = e.to_string();
                self.save_state = SaveState::Failed { seq: outcome.seq, message: message.clone() };
                self.notices.push(SessionNotice::SaveFailed { seq: outcome.seq, message });
            }
            SaveResult::Failed(e) => {
                // A newer full snapshot is already queued and carries these edits.
                warn!(seq = outcome.seq, error = %e, "older save failed; newer snapshot pending");
            }
            SaveResult::Saved | SaveResult::Superseded { .. } => {
                debug!(seq = outcome.seq, "older save resolved");
            }
        }
    }

    fn note_search_event(&mut self, event: &SearchEvent) {
        if let SearchEvent::Failed { error, .. } = event {
            self.notices.push(SessionNotice::SearchFailed { message: error.to_string() });
        }
    }

    /// Drain pending notices.
    pub fn take_notices(&mut self) -> Vec<SessionNotice> {
        std::mem::take(&mut self.notices)
    }

    // =========================================================================
    // Creation panel
    // =========================================================================

    pub fn open_creation(&mut self) {
        self.creation.open = true;
    }

    pub fn select_tab(&mut self, tab: CreationTab) {
        self.creation.tab = tab;
    }

    /// Close the panel. Drafts are kept for the next time it opens.
    pub fn dismiss_creation(&mut self) {
        self.creation.open = false;
    }

    /// Must be called from within a tokio runtime.
    pub fn search_input(&mut self, text: &str) {
        self.search.on_input(text);
    }

    /// Feed a rendered search result into the link draft.
    pub fn select_search_result(&mut self, index: usize) -> Option<FriendlyIcon> {
        let icon = self.search.results().get(index)?.clone();
        self.link.select_icon(&icon);
        Some(icon)
    }

    /// Finish the link draft and place it in the grid.
    ///
    /// # Errors
    ///
    /// Fails when not editing, when the link is invalid or when the grid is
    /// full. Drafts are left untouched on failure.
    pub fn add_link_cell(&mut self) -> Result<ItemId, SessionError> {
        self.ensure_editing()?;
        let draft = self.link.draft()?;
        self.place(&draft)
    }

    /// Finish the dynamic draft and place it in the grid.
    ///
    /// # Errors
    ///
    /// Fails when not editing, when no source was chosen or when the grid is
    /// full. Drafts are left untouched on failure.
    pub fn add_dynamic_cell(&mut self) -> Result<ItemId, SessionError> {
        self.ensure_editing()?;
        let draft = self.dynamic.draft()?;
        self.place(&draft)
    }

    /// Drop a cell on the trash.
    ///
    /// # Errors
    ///
    /// Fails when not editing or when `id` is not in the grid.
    pub fn remove_cell(&mut self, id: ItemId) -> Result<(), SessionError> {
        self.ensure_editing()?;
        self.engine.remove_item(id)?;
        self.trash_active.store(false, Ordering::SeqCst);
        debug!(%id, "cell removed");
        Ok(())
    }

    fn place(&mut self, draft: &CellDraft) -> Result<ItemId, SessionError> {
        let id = place_draft(&mut self.engine, draft)?;
        debug!(%id, w = draft.w, h = draft.h, "cell created");
        self.creation.open = false;
        self.reset_creation();
        Ok(id)
    }

    fn reset_creation(&mut self) {
        self.search.reset();
        self.link.reset();
        self.dynamic.reset();
    }

    fn ensure_editing(&self) -> Result<(), SessionError> {
        match self.mode {
            EditMode::Editing => Ok(()),
            EditMode::Viewing => Err(SessionError::NotEditing),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.mode == EditMode::Editing
    }

    #[must_use]
    pub fn chrome(&self) -> Chrome {
        self.chrome
    }

    /// Whether a cell is being dragged, so the trash target should highlight.
    #[must_use]
    pub fn trash_active(&self) -> bool {
        self.trash_active.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn creation(&self) -> CreationPanel {
        self.creation
    }

    #[must_use]
    pub fn save_state(&self) -> &SaveState {
        &self.save_state
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    #[must_use]
    pub fn icon_search(&self) -> &IconSearchClient {
        &self.search
    }

    #[must_use]
    pub fn link_builder(&self) -> &LinkCellBuilder {
        &self.link
    }

    pub fn link_builder_mut(&mut self) -> &mut LinkCellBuilder {
        &mut self.link
    }

    #[must_use]
    pub fn dynamic_builder(&self) -> &DynamicCellBuilder {
        &self.dynamic
    }

    pub fn dynamic_builder_mut(&mut self) -> &mut DynamicCellBuilder {
        &mut self.dynamic
    }
}
