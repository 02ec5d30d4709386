//! The generic region editor.
//!
//! One [`Editor`] drives one medium through its [`MediumAdapter`]. Input
//! flows through the viewport projection into the tool machine; finished
//! gestures go through the adapter's create/commit rules into the region
//! store, which emits the full list after every committed mutation.
//!
//! Region errors never escape the editor: they are logged and the only
//! observable signal is whether `on_change` fired. Medium load failures are
//! returned to the caller and leave the editor disabled.

mod commands;
mod pointer;


use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adapter::{MediumAdapter, TransformMode};
use crate::config::EditorConfig;
use crate::error::RegionError;
use crate::medium::{LoaderRegistry, MediumLoadError, MediumSource};
use crate::model::{Geometry, Label, LabelPalette, Region, RegionId};
use crate::store::RegionStore;
use crate::suggest::SuggestionQueue;
use crate::tool::{ToolMachine, ToolMode};
use crate::undo::{UndoConfig, UndoStack};
use crate::viewport::Viewport;

/// Initial state handed over by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorInit {
    /// Labels available in this editor, in shortcut order
    pub palette: Vec<Label>,
    /// Previously saved regions
    pub regions: Vec<Region>,
    pub read_only: bool,
}

/// Lifecycle of an editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorStatus {
    /// No medium attached yet.
    Empty,
    /// Medium attached, accepting input.
    Ready,
    /// The last load failed; input is ignored until a load succeeds.
    Failed { message: String },
    /// Torn down; input is ignored.
    Closed,
}

/// Region editor for one medium.
pub struct Editor<A: MediumAdapter> {
    adapter: A,
    store: RegionStore,
    palette: LabelPalette,
    tool: ToolMachine,
    viewport: Viewport,
    undo: UndoStack,
    suggestions: SuggestionQueue,
    config: EditorConfig,
    loaders: LoaderRegistry,
    status: EditorStatus,
    read_only: bool,
    text_input_focused: bool,
    transform_mode: TransformMode,
}

impl<A: MediumAdapter> Editor<A> {
    /// Create an editor with the given adapter and initial state.
    ///
    /// The editor stays [`EditorStatus::Empty`] until
    /// [`Editor::load_medium`] succeeds.
    pub fn new(adapter: A, init: EditorInit, config: EditorConfig) -> Self {
        let mut store = RegionStore::new(config.thresholds.validation_rules());
        store.load(init.regions);
        let palette = LabelPalette::new(init.palette);
        if palette.is_empty() {
            log::warn!(
                "Editor: empty palette on {} editor, drawing tools disabled",
                adapter.kind()
            );
        }

        Self {
            adapter,
            store,
            palette,
            tool: ToolMachine::new(),
            viewport: Viewport::Fixed,
            undo: UndoStack::with_config(UndoConfig {
                max_history: config.undo_history,
            }),
            suggestions: SuggestionQueue::new(Duration::from_secs(config.suggestion_timeout_secs)),
            config,
            loaders: LoaderRegistry::new(),
            status: EditorStatus::Empty,
            read_only: init.read_only,
            text_input_focused: false,
            transform_mode: TransformMode::default(),
        }
    }

    /// Install the change listener, called with the full list after every
    /// committed mutation.
    pub fn set_on_change(&mut self, listener: impl FnMut(&[Region]) + 'static) {
        self.store.set_listener(Box::new(listener));
    }

    /// Load and attach a medium.
    ///
    /// On failure the editor enters [`EditorStatus::Failed`] and ignores all
    /// input until a later load succeeds. Regions are kept either way.
    pub fn load_medium(&mut self, source: &MediumSource) -> Result<(), MediumLoadError> {
        let result = if source.kind() == self.adapter.kind() {
            source
                .load(&self.loaders)
                .and_then(|medium| self.adapter.attach(medium))
        } else {
            Err(MediumLoadError::KindMismatch {
                expected: self.adapter.kind(),
                found: source.kind(),
            })
        };

        self.tool.set_mode(ToolMode::Select);
        match result {
            Ok(()) => {
                self.viewport = self
                    .adapter
                    .initial_viewport(&self.config.zoom, &self.config.timeline);
                self.status = EditorStatus::Ready;
                log::info!(
                    "Editor: {} ready ({} regions)",
                    self.adapter.kind(),
                    self.store.len()
                );
                Ok(())
            }
            Err(e) => {
                log::error!("Editor: failed to load {}: {}", source.kind(), e);
                self.viewport = Viewport::Fixed;
                self.status = EditorStatus::Failed {
                    message: e.to_string(),
                };
                Err(e)
            }
        }
    }

    /// Tear down: drop drafts and pending suggestions without committing.
    pub fn close(&mut self) {
        self.tool.cancel();
        self.suggestions.cancel_all();
        self.status = EditorStatus::Closed;
        log::debug!("Editor: closed");
    }

    pub fn status(&self) -> &EditorStatus {
        &self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status == EditorStatus::Ready
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Mutable adapter access, for display settings such as image filters.
    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn regions(&self) -> &[Region] {
        self.store.regions()
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.store.get(id)
    }

    pub fn selected(&self) -> Option<RegionId> {
        self.store.selected()
    }

    pub fn palette(&self) -> &LabelPalette {
        &self.palette
    }

    pub fn tool_mode(&self) -> ToolMode {
        self.tool.mode()
    }

    /// Draft geometry of an in-progress creation gesture.
    pub fn draft(&self) -> Option<Geometry> {
        self.tool.draft()
    }

    /// Geometry shown for a region being dragged.
    pub fn transform_preview(&self) -> Option<(RegionId, &Geometry)> {
        self.tool.preview()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn transform_mode(&self) -> TransformMode {
        self.transform_mode
    }

    /// While a text input has focus, keyboard shortcuts are ignored.
    pub fn set_text_input_focus(&mut self, focused: bool) {
        self.text_input_focused = focused;
    }

    /// Switch tools. Drawing tools clear the selection.
    ///
    /// Returns false if the tool is unavailable: not supported by the medium,
    /// or a drawing tool on a read-only editor or with an empty palette.
    pub fn set_tool(&mut self, mode: ToolMode) -> bool {
        if !self.is_ready() {
            return false;
        }
        if !self.adapter.supports_tool(mode) {
            log::debug!(
                "Editor: {} tool not available on {}",
                mode.name(),
                self.adapter.kind()
            );
            return false;
        }
        if mode.is_drawing_tool() && (self.read_only || self.palette.is_empty()) {
            log::debug!("Editor: {} tool disabled", mode.name());
            return false;
        }
        self.tool.set_mode(mode);
        if mode.is_drawing_tool() {
            self.clear_selection();
        }
        true
    }

    /// Activate a palette entry. Existing regions are untouched.
    pub fn set_active_label(&mut self, index: usize) -> bool {
        self.palette.set_active_index(index)
    }

    /// Select a region by id, or clear with `None`.
    pub fn select(&mut self, id: Option<RegionId>) -> bool {
        match self.store.select(id) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Editor: {}", e);
                false
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.select(None);
    }

    /// Run one store mutation with read-only guard and undo recording.
    ///
    /// A snapshot is pushed only if the store actually emitted.
    fn mutate<T>(
        &mut self,
        description: &str,
        f: impl FnOnce(&mut RegionStore) -> Result<T, RegionError>,
    ) -> Result<T, RegionError> {
        if self.read_only {
            return Err(RegionError::ReadOnly);
        }
        let before = self.store.regions().to_vec();
        let revision = self.store.revision();
        let result = f(&mut self.store);
        if self.store.revision() != revision {
            self.undo.push(description, before);
        }
        result
    }

    /// Label for a new region; the fallback label if the palette is empty.
    fn active_label(&self) -> Label {
        self.palette.active()
    }
}
