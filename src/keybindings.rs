//! Customizable keybindings.
//!
//! Maps key presses to editor [`Action`]s. `Delete`/`Backspace` and `Escape`
//! are fixed; everything else can be rebound through the config file.

use serde::{Deserialize, Serialize};

use crate::adapter::TransformMode;
use crate::constants::MAX_LABEL_HOTKEYS;
use crate::input::{Key, KeyEvent};
use crate::tool::ToolMode;

/// Something a key press asks the editor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SetTool(ToolMode),
    /// Activate the palette entry at this index (0-based)
    SelectLabel(usize),
    DeleteSelected,
    /// Cancel the draft and clear the selection
    Cancel,
    FinishPolygon,
    AddSegment,
    AddBox3d,
    SetTransformMode(TransformMode),
    ZoomIn,
    ZoomOut,
    ZoomReset,
    PlayPause,
    Undo,
    Redo,
}

/// Keybinding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Hotkey for Select tool
    pub tool_select: Key,
    /// Hotkey for Rectangle tool
    pub tool_rectangle: Key,
    /// Hotkey for Polygon tool
    pub tool_polygon: Key,
    /// Hotkey for Pan tool
    pub tool_pan: Key,

    pub finish_polygon: Key,
    /// Add a segment at the playhead (timeline editors)
    pub add_segment: Key,
    /// Place a new box (3D editors)
    pub add_box3d: Key,

    /// 3D transform modes; these shadow tool keys on 3D editors
    pub transform_translate: Key,
    pub transform_rotate: Key,
    pub transform_scale: Key,

    pub zoom_in: Key,
    pub zoom_out: Key,
    pub zoom_reset: Key,
    pub play_pause: Key,

    /// Undo with Ctrl; Ctrl+Shift redoes
    pub undo: Key,
    /// Redo with Ctrl
    pub redo: Key,

    /// Hotkeys for label selection (index 0 is the first palette entry)
    /// None means no hotkey assigned for that slot
    pub label_hotkeys: [Option<Key>; MAX_LABEL_HOTKEYS],
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            tool_select: Key::S,
            tool_rectangle: Key::E,
            tool_polygon: Key::R,
            tool_pan: Key::H,
            finish_polygon: Key::Enter,
            add_segment: Key::A,
            add_box3d: Key::N,
            transform_translate: Key::W,
            transform_rotate: Key::E,
            transform_scale: Key::R,
            zoom_in: Key::Plus,
            zoom_out: Key::Minus,
            zoom_reset: Key::Key0,
            play_pause: Key::Space,
            undo: Key::Z,
            redo: Key::Y,
            label_hotkeys: [
                Some(Key::Key1),
                Some(Key::Key2),
                Some(Key::Key3),
                Some(Key::Key4),
                Some(Key::Key5),
                Some(Key::Key6),
                Some(Key::Key7),
                Some(Key::Key8),
                Some(Key::Key9),
            ],
        }
    }
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a key press to an action.
    ///
    /// On 3D editors the transform-mode keys take precedence over tool keys.
    pub fn action_for(&self, event: &KeyEvent, is_3d: bool) -> Option<Action> {
        let key = event.key;
        let mods = event.modifiers;

        if mods.ctrl {
            return if key == self.undo && mods.shift {
                Some(Action::Redo)
            } else if key == self.undo {
                Some(Action::Undo)
            } else if key == self.redo {
                Some(Action::Redo)
            } else {
                None
            };
        }

        match key {
            Key::Delete | Key::Backspace => return Some(Action::DeleteSelected),
            Key::Escape => return Some(Action::Cancel),
            _ => {}
        }

        if is_3d && let Some(mode) = self.transform_mode_for_key(key) {
            return Some(Action::SetTransformMode(mode));
        }
        if let Some(tool) = self.tool_for_key(key) {
            return Some(Action::SetTool(tool));
        }
        if let Some(index) = self.label_index_for_key(key) {
            return Some(Action::SelectLabel(index));
        }

        let action = if key == self.finish_polygon {
            Action::FinishPolygon
        } else if key == self.add_segment {
            Action::AddSegment
        } else if key == self.add_box3d {
            Action::AddBox3d
        } else if key == self.zoom_in || (key == Key::Equal && self.zoom_in == Key::Plus) {
            Action::ZoomIn
        } else if key == self.zoom_out {
            Action::ZoomOut
        } else if key == self.zoom_reset {
            Action::ZoomReset
        } else if key == self.play_pause {
            Action::PlayPause
        } else {
            return None;
        };
        Some(action)
    }

    /// Get the tool that corresponds to a key press, if any.
    pub fn tool_for_key(&self, key: Key) -> Option<ToolMode> {
        if key == self.tool_select {
            Some(ToolMode::Select)
        } else if key == self.tool_rectangle {
            Some(ToolMode::Rectangle)
        } else if key == self.tool_polygon {
            Some(ToolMode::Polygon)
        } else if key == self.tool_pan {
            Some(ToolMode::Pan)
        } else {
            None
        }
    }

    /// Get the 3D transform mode for a key press, if any.
    pub fn transform_mode_for_key(&self, key: Key) -> Option<TransformMode> {
        if key == self.transform_translate {
            Some(TransformMode::Translate)
        } else if key == self.transform_rotate {
            Some(TransformMode::Rotate)
        } else if key == self.transform_scale {
            Some(TransformMode::Scale)
        } else {
            None
        }
    }

    /// Get the label index (0-based) that corresponds to a key press, if any.
    pub fn label_index_for_key(&self, key: Key) -> Option<usize> {
        self.label_hotkeys
            .iter()
            .position(|hotkey| *hotkey == Some(key))
    }

    /// Get the hotkey for a specific tool.
    pub fn key_for_tool(&self, tool: ToolMode) -> Key {
        match tool {
            ToolMode::Select => self.tool_select,
            ToolMode::Rectangle => self.tool_rectangle,
            ToolMode::Polygon => self.tool_polygon,
            ToolMode::Pan => self.tool_pan,
        }
    }

    /// Set the hotkey for a label index.
    pub fn set_label_key(&mut self, index: usize, key: Option<Key>) {
        if index < MAX_LABEL_HOTKEYS {
            self.label_hotkeys[index] = key;
        }
    }

    /// Check if a key is already used by a tool or label binding.
    /// Returns a description of what it's used for, if anything.
    pub fn key_conflict(&self, key: Key) -> Option<String> {
        if let Some(tool) = self.tool_for_key(key) {
            return Some(format!("{} tool", tool.name()));
        }
        self.label_index_for_key(key)
            .map(|i| format!("Label {}", i + 1))
    }
}
