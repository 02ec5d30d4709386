//! Scripted editor sessions.
//!
//! A session file names a medium, the initial editor state and a list of
//! input events. Replaying it drives a real [`Editor`] and reports the
//! final region list, which makes the engine usable from the command line
//! and gives tests a compact way to describe whole interactions.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "medium": { "kind": "text", "content": "The quick brown fox" },
//!   "palette": [{ "value": "animal", "color": "#FF9900" }],
//!   "events": [
//!     { "type": "select_text", "start": 16, "end": 19 },
//!     { "type": "key", "key": "Z", "modifiers": { "ctrl": true } }
//!   ]
//! }
//! ```

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::adapter::{
    MapAdapter, MediumAdapter, RasterAdapter, Space3dAdapter, TextAdapter, TimelineAdapter,
    TransformMode,
};
use crate::config::EditorConfig;
use crate::editor::{Editor, EditorInit};
use crate::geometry::{Point, Probe};
use crate::input::{KeyEvent, PointerEvent};
use crate::medium::{MediumKind, MediumLoadError, MediumSource};
use crate::model::{DrawnFeature, Region, RegionId};
use crate::suggest::{SuggestedRegion, SuggestionResponse};
use crate::tool::ToolMode;

/// Current session file format version.
pub const SESSION_VERSION: u32 = 1;

fn default_version() -> u32 {
    SESSION_VERSION
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Pointer event in screen coordinates
    Pointer(PointerEvent),
    Key(KeyEvent),
    SetTool {
        tool: ToolMode,
    },
    /// Activate a palette entry (0-based)
    SetLabel {
        index: usize,
    },
    ZoomIn {
        #[serde(default)]
        cursor: Option<Point>,
    },
    ZoomOut {
        #[serde(default)]
        cursor: Option<Point>,
    },
    Pan {
        dx: f32,
        dy: f32,
    },
    Seek {
        time: f64,
    },
    /// Advance playback by wall-clock seconds
    Advance {
        seconds: f64,
    },
    TogglePlay,
    SelectAt {
        probe: Probe,
    },
    SelectText {
        start: usize,
        end: usize,
    },
    AddSegment,
    PlaceBox,
    TransformMode {
        mode: TransformMode,
    },
    Transform {
        delta: [f32; 3],
    },
    /// Full drawn feature set reported by a map layer
    SyncFeatures {
        features: Vec<DrawnFeature>,
    },
    /// Request suggestions and answer them immediately
    Suggestions {
        regions: Vec<SuggestedRegion>,
    },
    TextFocus {
        focused: bool,
    },
    Delete,
    Cancel,
    Undo,
    Redo,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::Pointer(_) => "pointer",
            SessionEvent::Key(_) => "key",
            SessionEvent::SetTool { .. } => "set_tool",
            SessionEvent::SetLabel { .. } => "set_label",
            SessionEvent::ZoomIn { .. } => "zoom_in",
            SessionEvent::ZoomOut { .. } => "zoom_out",
            SessionEvent::Pan { .. } => "pan",
            SessionEvent::Seek { .. } => "seek",
            SessionEvent::Advance { .. } => "advance",
            SessionEvent::TogglePlay => "toggle_play",
            SessionEvent::SelectAt { .. } => "select_at",
            SessionEvent::SelectText { .. } => "select_text",
            SessionEvent::AddSegment => "add_segment",
            SessionEvent::PlaceBox => "place_box",
            SessionEvent::TransformMode { .. } => "transform_mode",
            SessionEvent::Transform { .. } => "transform",
            SessionEvent::SyncFeatures { .. } => "sync_features",
            SessionEvent::Suggestions { .. } => "suggestions",
            SessionEvent::TextFocus { .. } => "text_focus",
            SessionEvent::Delete => "delete",
            SessionEvent::Cancel => "cancel",
            SessionEvent::Undo => "undo",
            SessionEvent::Redo => "redo",
        }
    }
}

/// A scripted session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Format version for forward compatibility.
    #[serde(default = "default_version")]
    pub version: u32,
    pub medium: MediumSource,
    #[serde(flatten)]
    pub init: EditorInit,
    #[serde(default)]
    pub events: Vec<SessionEvent>,
}

impl Session {
    pub fn new(medium: MediumSource, init: EditorInit) -> Self {
        Self {
            version: SESSION_VERSION,
            medium,
            init,
            events: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        let session: Self = serde_json::from_str(json)?;
        if session.version > SESSION_VERSION {
            return Err(SessionError::VersionTooNew {
                file_version: session.version,
                supported_version: SESSION_VERSION,
            });
        }
        Ok(session)
    }

    /// Read a session file. Relative asset paths are resolved against the
    /// directory of the file.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let json = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut session = Self::from_json(&json)?;
        if let Some(base) = path.parent() {
            session.resolve_paths(base);
        }
        log::info!(
            "Loaded {} session from {:?} ({} events)",
            session.medium.kind(),
            path,
            session.events.len()
        );
        Ok(session)
    }

    fn resolve_paths(&mut self, base: &Path) {
        if let MediumSource::Image {
            path: Some(path), ..
        }
        | MediumSource::PointCloud {
            path: Some(path), ..
        } = &mut self.medium
            && path.is_relative()
        {
            *path = base.join(&*path);
        }
    }
}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    /// Final region list
    pub regions: Vec<Region>,
    /// Number of `on_change` emissions
    pub emissions: usize,
    pub selected: Option<RegionId>,
}

/// Errors that can occur when loading or replaying a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to parse session: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(
        "Session file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load medium: {0}")]
    Load(#[from] MediumLoadError),
}

/// Replay a session with the adapter matching its medium.
pub fn replay(session: Session, config: EditorConfig) -> Result<ReplayReport, SessionError> {
    match session.medium.kind() {
        MediumKind::Image => run(RasterAdapter::new(), session, config),
        MediumKind::Video => run(TimelineAdapter::video(), session, config),
        MediumKind::Audio => run(TimelineAdapter::audio(), session, config),
        MediumKind::Text => run(TextAdapter::new(), session, config),
        MediumKind::Map => run(MapAdapter::new(), session, config),
        MediumKind::PointCloud => run(Space3dAdapter::new(), session, config),
    }
}

fn run<A: MediumAdapter>(
    adapter: A,
    session: Session,
    config: EditorConfig,
) -> Result<ReplayReport, SessionError> {
    let mut editor = Editor::new(adapter, session.init, config);
    let emissions = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&emissions);
    editor.set_on_change(move |regions| {
        counter.set(counter.get() + 1);
        log::debug!("Replay: emission {} ({} regions)", counter.get(), regions.len());
    });

    editor.load_medium(&session.medium)?;

    for (index, event) in session.events.into_iter().enumerate() {
        log::debug!("Replay: event {} {}", index, event.name());
        apply(&mut editor, event);
    }

    let report = ReplayReport {
        regions: editor.regions().to_vec(),
        emissions: emissions.get(),
        selected: editor.selected(),
    };
    editor.close();
    log::info!(
        "Replay finished: {} regions after {} emissions",
        report.regions.len(),
        report.emissions
    );
    Ok(report)
}

fn apply<A: MediumAdapter>(editor: &mut Editor<A>, event: SessionEvent) {
    match event {
        SessionEvent::Pointer(event) => editor.pointer(event),
        SessionEvent::Key(event) => {
            editor.key(event);
        }
        SessionEvent::SetTool { tool } => {
            editor.set_tool(tool);
        }
        SessionEvent::SetLabel { index } => {
            editor.set_active_label(index);
        }
        SessionEvent::ZoomIn { cursor } => editor.zoom_in(cursor),
        SessionEvent::ZoomOut { cursor } => editor.zoom_out(cursor),
        SessionEvent::Pan { dx, dy } => editor.pan_by(dx, dy),
        SessionEvent::Seek { time } => {
            editor.seek(time);
        }
        SessionEvent::Advance { seconds } => editor.tick(seconds),
        SessionEvent::TogglePlay => {
            editor.toggle_play();
        }
        SessionEvent::SelectAt { probe } => {
            editor.select_at(probe);
        }
        SessionEvent::SelectText { start, end } => {
            editor.select_text(start, end);
        }
        SessionEvent::AddSegment => {
            editor.add_segment_at_playhead();
        }
        SessionEvent::PlaceBox => {
            editor.place_box();
        }
        SessionEvent::TransformMode { mode } => editor.set_transform_mode(mode),
        SessionEvent::Transform { delta } => {
            editor.transform_selected(delta);
        }
        SessionEvent::SyncFeatures { features } => {
            editor.sync_features(features);
        }
        SessionEvent::Suggestions { regions } => {
            let Some(ticket) = editor.request_suggestions() else {
                log::warn!("Replay: suggestions unavailable");
                return;
            };
            editor
                .suggestion_sender()
                .send(SuggestionResponse { ticket, regions });
            editor.poll_suggestions();
        }
        SessionEvent::TextFocus { focused } => editor.set_text_input_focus(focused),
        SessionEvent::Delete => {
            editor.delete_selected();
        }
        SessionEvent::Cancel => editor.cancel(),
        SessionEvent::Undo => {
            editor.undo();
        }
        SessionEvent::Redo => {
            editor.redo();
        }
    }
}
