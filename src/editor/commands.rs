//! Keyboard actions and medium-specific commands.

use crate::adapter::{CreateRequest, MediumAdapter, TextAdapter, TransformMode, apply_transform};
use crate::editor::Editor;
use crate::geometry::Point;
use crate::input::KeyEvent;
use crate::keybindings::Action;
use crate::medium::MediumKind;
use crate::model::{DrawnFeature, Geometry, Region, RegionId};
use crate::suggest::{SuggestionSender, SuggestionTicket};

impl<A: MediumAdapter> Editor<A> {
    /// Handle a key press. Returns whether it mapped to an action.
    pub fn key(&mut self, event: KeyEvent) -> bool {
        if !self.is_ready() {
            return false;
        }
        if self.text_input_focused {
            log::trace!("Editor: {} ignored, text input has focus", event.key.name());
            return false;
        }
        let is_3d = self.adapter.kind() == MediumKind::PointCloud;
        match self.config.keybindings.action_for(&event, is_3d) {
            Some(action) => {
                log::debug!("Editor: {} -> {:?}", event.key.name(), action);
                self.perform(action);
                true
            }
            None => false,
        }
    }

    /// Run an action as if its shortcut was pressed.
    pub fn perform(&mut self, action: Action) {
        match action {
            Action::SetTool(mode) => {
                self.set_tool(mode);
            }
            Action::SelectLabel(index) => {
                self.set_active_label(index);
            }
            Action::DeleteSelected => {
                self.delete_selected();
            }
            Action::Cancel => self.cancel(),
            Action::FinishPolygon => {
                let outcome = self.tool.finish_polygon();
                self.apply_outcome(outcome);
            }
            Action::AddSegment => {
                self.add_segment_at_playhead();
            }
            Action::AddBox3d => {
                self.place_box();
            }
            Action::SetTransformMode(mode) => self.set_transform_mode(mode),
            Action::ZoomIn => self.zoom_in(None),
            Action::ZoomOut => self.zoom_out(None),
            Action::ZoomReset => self.viewport.reset(),
            Action::PlayPause => {
                self.toggle_play();
            }
            Action::Undo => {
                self.undo();
            }
            Action::Redo => {
                self.redo();
            }
        }
    }

    /// Drop the draft and clear the selection.
    pub fn cancel(&mut self) {
        self.tool.cancel();
        self.clear_selection();
    }

    /// Remove the selected region. Returns whether something was removed.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.store.selected() else {
            return false;
        };
        self.remove(id)
    }

    /// Remove a region by id; a missing id is a no-op.
    pub fn remove(&mut self, id: RegionId) -> bool {
        if !self.is_ready() {
            return false;
        }
        match self.mutate("delete", |store| Ok(store.remove(id))) {
            Ok(removed) => removed,
            Err(e) => {
                log::warn!("Editor: delete of region {} rejected: {}", id, e);
                false
            }
        }
    }

    /// Reassign the label of a region to a palette entry.
    pub fn relabel(&mut self, id: RegionId, value: &str) -> bool {
        if !self.is_ready() {
            return false;
        }
        let Some(label) = self.palette.find(value).cloned() else {
            log::warn!("Editor: relabel to unknown label '{}'", value);
            return false;
        };
        match self.mutate("relabel", |store| store.relabel(id, &label)) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Editor: relabel of region {} rejected: {}", id, e);
                false
            }
        }
    }

    /// Restore the list before the last mutation.
    pub fn undo(&mut self) -> bool {
        if !self.is_ready() || self.read_only {
            return false;
        }
        self.tool.cancel();
        let current = self.store.regions().to_vec();
        match self.undo.undo(current) {
            Some(previous) => {
                self.store.replace_all(previous);
                true
            }
            None => false,
        }
    }

    /// Re-apply the last undone mutation.
    pub fn redo(&mut self) -> bool {
        if !self.is_ready() || self.read_only {
            return false;
        }
        self.tool.cancel();
        let current = self.store.regions().to_vec();
        match self.undo.redo(current) {
            Some(next) => {
                self.store.replace_all(next);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.read_only && self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.read_only && self.undo.can_redo()
    }

    /// Zoom in one step around `cursor` (screen space).
    pub fn zoom_in(&mut self, cursor: Option<Point>) {
        if self.is_ready() {
            self.viewport.zoom_in(self.config.zoom.factor, cursor);
        }
    }

    /// Zoom out one step around `cursor` (screen space).
    pub fn zoom_out(&mut self, cursor: Option<Point>) {
        if self.is_ready() {
            self.viewport.zoom_out(self.config.zoom.factor, cursor);
        }
    }

    /// Translate the view by a screen delta.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        if self.is_ready() {
            self.viewport.pan_by(dx, dy);
        }
    }

    /// Move the playhead (timeline media only).
    pub fn seek(&mut self, time: f64) -> bool {
        self.is_ready() && self.viewport.seek(time)
    }

    /// Advance playback by `dt` seconds of wall time.
    pub fn tick(&mut self, dt: f64) {
        if self.is_ready() {
            self.viewport.advance(dt);
        }
    }

    /// Toggle playback; `None` if the medium has no timeline.
    pub fn toggle_play(&mut self) -> Option<bool> {
        if !self.is_ready() {
            return None;
        }
        self.viewport.toggle_play()
    }

    /// Add a default-length segment starting at the playhead.
    pub fn add_segment_at_playhead(&mut self) -> Option<RegionId> {
        let Some(time) = self.viewport.current_time() else {
            log::debug!("Editor: no playhead on {}", self.adapter.kind());
            return None;
        };
        self.create(CreateRequest::AtPlayhead { time })
    }

    /// Turn a released text selection into a span.
    pub fn select_text(&mut self, start: usize, end: usize) -> Option<RegionId> {
        self.create(CreateRequest::TextSelection { start, end })
    }

    /// Place a unit box at the origin.
    pub fn place_box(&mut self) -> Option<RegionId> {
        self.create(CreateRequest::Placement)
    }

    /// Switch the 3D transform mode (ignored on other media).
    pub fn set_transform_mode(&mut self, mode: TransformMode) {
        if self.adapter.kind() != MediumKind::PointCloud {
            return;
        }
        if self.transform_mode != mode {
            log::debug!("Editor: transform mode {}", mode.name());
        }
        self.transform_mode = mode;
    }

    /// Apply a transform delta to the selected 3D box in the current mode.
    pub fn transform_selected(&mut self, delta: [f32; 3]) -> bool {
        let Some(region) = self.store.selected_region() else {
            log::debug!("Editor: nothing selected to transform");
            return false;
        };
        let id = region.id;
        match apply_transform(&region.geometry, self.transform_mode, delta) {
            Some(geometry) => self.commit_edit(id, geometry),
            None => {
                log::debug!(
                    "Editor: {} region can't be transformed",
                    region.geometry.kind_name()
                );
                false
            }
        }
    }

    /// Reconcile the regions with the full drawn feature set of a map layer.
    ///
    /// The result is committed in one emission; nothing is emitted if the
    /// drawn set already matches.
    pub fn sync_features(&mut self, drawn: Vec<DrawnFeature>) -> bool {
        if !self.is_ready() {
            return false;
        }
        let label = self.active_label();
        let Some(next) = self.adapter.reconcile_features(
            self.store.regions(),
            drawn,
            &label,
            self.store.rules(),
        ) else {
            log::debug!("Editor: {} has no drawing layer", self.adapter.kind());
            return false;
        };
        if next.as_slice() == self.store.regions() {
            log::debug!("Editor: feature sync without changes");
            return false;
        }
        match self.mutate("sync features", |store| {
            store.replace_all(next);
            Ok(())
        }) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Editor: feature sync rejected: {}", e);
                false
            }
        }
    }

    /// Ask for suggestions; the answer arrives through [`Self::suggestion_sender`].
    pub fn request_suggestions(&mut self) -> Option<SuggestionTicket> {
        if !self.is_ready() || self.read_only {
            return None;
        }
        Some(self.suggestions.request())
    }

    pub fn cancel_suggestions(&mut self, ticket: SuggestionTicket) -> bool {
        self.suggestions.cancel(ticket)
    }

    /// Handle for the suggestion service.
    pub fn suggestion_sender(&self) -> SuggestionSender {
        self.suggestions.sender()
    }

    /// Merge answered suggestions. Each suggested region goes through the same
    /// rules as a manual creation and is appended on its own.
    ///
    /// Returns the number of regions added.
    pub fn poll_suggestions(&mut self) -> usize {
        if !self.is_ready() {
            return 0;
        }
        let responses = self.suggestions.drain();
        if self.read_only {
            if !responses.is_empty() {
                log::warn!(
                    "Editor: read-only, dropped {} suggestion responses",
                    responses.len()
                );
            }
            return 0;
        }

        let mut added = 0;
        for suggestion in responses.into_iter().flat_map(|response| response.regions) {
            let label = match &suggestion.label {
                Some(value) => self.palette.resolve(value),
                None => self.active_label(),
            };
            let kind = suggestion.geometry.kind_name();
            let result = self
                .adapter
                .commit_rule(suggestion.geometry, self.store.regions(), None)
                .and_then(|geometry| {
                    let region = Region::new(&label, geometry);
                    self.mutate("suggestion", |store| store.add(region))
                });
            match result {
                Ok(_) => added += 1,
                Err(e) => log::warn!("Editor: suggested {} rejected: {}", kind, e),
            }
        }
        if added > 0 {
            log::info!("Editor: merged {} suggested regions", added);
        }
        added
    }
}

impl Editor<TextAdapter> {
    /// Text covered by the selected span.
    pub fn selected_text(&self) -> Option<&str> {
        match self.store.selected_region()?.geometry {
            Geometry::Span { start, end } => self.adapter.span_text(start, end),
            _ => None,
        }
    }
}
