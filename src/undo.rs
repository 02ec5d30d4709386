//! Undo/redo history for region edits.
//!
//! The store is replace-on-write, so the history keeps full region-list
//! snapshots rather than per-operation inverse commands. Before each
//! committed mutation the editor records the list as it was; undo swaps the
//! current list for the most recent snapshot and moves the current one onto
//! the redo stack.

use crate::model::Region;

/// One recorded state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// What the following mutation did, for logging.
    pub description: String,
    /// The region list before the mutation.
    pub regions: Vec<Region>,
}

/// Configuration for the undo stack
#[derive(Debug, Clone)]
pub struct UndoConfig {
    /// Maximum number of snapshots to keep in history
    pub max_history: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            max_history: crate::constants::UNDO_HISTORY_SIZE,
        }
    }
}

/// The undo/redo history stack.
///
/// Maintains two stacks:
/// - `undo_stack`: states that can be restored by undo (most recent at the end)
/// - `redo_stack`: states that can be restored by redo (most recent at the end)
///
/// Recording a new state clears the redo stack.
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    config: UndoConfig,
}

impl UndoStack {
    /// Create a new empty undo stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: UndoConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Record the state before a mutation.
    /// This clears the redo stack (can't redo after a new action).
    pub fn push(&mut self, description: impl Into<String>, regions: Vec<Region>) {
        let snapshot = Snapshot {
            description: description.into(),
            regions,
        };
        log::debug!("📝 Undo: pushed '{}'", snapshot.description);
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();

        // Limit history size
        if self.undo_stack.len() > self.config.max_history {
            let excess = self.undo_stack.len() - self.config.max_history;
            self.undo_stack.drain(..excess);
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Step back: returns the list to restore, stashing `current` for redo.
    pub fn undo(&mut self, current: Vec<Region>) -> Option<Vec<Region>> {
        let snapshot = self.undo_stack.pop()?;
        log::debug!("⏪ Undo: '{}'", snapshot.description);
        self.redo_stack.push(Snapshot {
            description: snapshot.description,
            regions: current,
        });
        Some(snapshot.regions)
    }

    /// Step forward: returns the list to restore, stashing `current` for undo.
    pub fn redo(&mut self, current: Vec<Region>) -> Option<Vec<Region>> {
        let snapshot = self.redo_stack.pop()?;
        log::debug!("⏩ Redo: '{}'", snapshot.description);
        self.undo_stack.push(Snapshot {
            description: snapshot.description,
            regions: current,
        });
        Some(snapshot.regions)
    }

    /// Get the description of the step that would be undone
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|s| s.description.as_str())
    }

    /// Get the description of the step that would be redone
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|s| s.description.as_str())
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        log::debug!("🗑️ Undo history cleared");
    }

    /// Get the number of steps in undo history
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of steps in redo history
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Geometry, Label};

    fn region(start: usize) -> Region {
        Region::new(
            &Label::new("word", "#00FF00"),
            Geometry::Span {
                start,
                end: start + 1,
            },
        )
    }

    #[test]
    fn test_empty_stack() {
        let mut stack = UndoStack::new();
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
        assert_eq!(stack.undo(Vec::new()), None);
        assert_eq!(stack.redo(Vec::new()), None);
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut stack = UndoStack::new();
        let a = region(0);
        let b = region(5);

        // Empty -> [a] -> [a, b]
        stack.push("Add span", Vec::new());
        stack.push("Add span", vec![a.clone()]);
        let current = vec![a.clone(), b.clone()];

        let restored = stack.undo(current.clone()).unwrap();
        assert_eq!(restored, vec![a.clone()]);
        assert!(stack.can_redo());

        let restored = stack.undo(restored).unwrap();
        assert!(restored.is_empty());
        assert!(!stack.can_undo());

        let restored = stack.redo(restored).unwrap();
        assert_eq!(restored, vec![a.clone()]);
        let restored = stack.redo(restored).unwrap();
        assert_eq!(restored, current);
        assert_eq!(stack.undo_count(), 2);
    }

    #[test]
    fn test_push_clears_redo() {
        let mut stack = UndoStack::new();
        stack.push("Add", Vec::new());
        stack.undo(vec![region(0)]);
        assert!(stack.can_redo());

        stack.push("Add other", Vec::new());
        assert!(!stack.can_redo());
        assert_eq!(stack.undo_description(), Some("Add other"));
    }

    #[test]
    fn test_history_limit() {
        let mut stack = UndoStack::with_config(UndoConfig { max_history: 3 });
        for i in 0..5 {
            stack.push(format!("step {i}"), vec![region(i)]);
        }
        assert_eq!(stack.undo_count(), 3);

        // Oldest two were dropped
        let mut current = Vec::new();
        while let Some(previous) = stack.undo(current.clone()) {
            current = previous;
        }
        assert_eq!(current[0].geometry, Geometry::Span { start: 2, end: 3 });
    }
}
