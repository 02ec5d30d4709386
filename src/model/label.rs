//! Label definitions and the per-editor label palette.

use serde::{Deserialize, Serialize};

use crate::color_utils::{generated_color, parse_hex, rgb_to_hex};
use crate::constants::{FALLBACK_COLOR, FALLBACK_LABEL};

/// A label with a display value and a color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Display value, stamped onto regions.
    pub value: String,
    /// Color as `#RRGGBB`.
    #[serde(default)]
    pub color: String,
}

impl Label {
    /// Create a new label with the given value and color.
    pub fn new(value: &str, color: &str) -> Self {
        Self {
            value: value.to_string(),
            color: color.to_string(),
        }
    }

    /// The catch-all label used when the palette is empty.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_LABEL, FALLBACK_COLOR)
    }
}

/// Ordered set of labels available to one editor, plus the active entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelPalette {
    labels: Vec<Label>,
    active: usize,
}

impl LabelPalette {
    /// Build a palette, dropping duplicate values and repairing colors.
    pub fn new(labels: Vec<Label>) -> Self {
        let mut unique: Vec<Label> = Vec::with_capacity(labels.len());
        for mut label in labels {
            if unique.iter().any(|l| l.value == label.value) {
                log::warn!(
                    "Palette: duplicate label '{}' dropped (shortcut would be ambiguous)",
                    label.value
                );
                continue;
            }
            label.color = match parse_hex(&label.color) {
                Some(rgb) => rgb_to_hex(rgb),
                None => {
                    let color = generated_color(unique.len());
                    if !label.color.is_empty() {
                        log::warn!(
                            "Palette: label '{}' has invalid color '{}', using {}",
                            label.value,
                            label.color,
                            color
                        );
                    }
                    color
                }
            };
            unique.push(label);
        }
        Self {
            labels: unique,
            active: 0,
        }
    }

    /// Whether the palette has no entries (creation tools are then disabled).
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// The label stamped on new regions; the fallback label if the palette is empty.
    pub fn active(&self) -> Label {
        self.labels
            .get(self.active)
            .cloned()
            .unwrap_or_else(Label::fallback)
    }

    /// Index of the active entry, `None` for an empty palette.
    pub fn active_index(&self) -> Option<usize> {
        (!self.labels.is_empty()).then_some(self.active)
    }

    /// Activate the entry at `index`. Out-of-range indices are ignored.
    pub fn set_active_index(&mut self, index: usize) -> bool {
        if index < self.labels.len() {
            self.active = index;
            log::debug!("Palette: active label '{}'", self.labels[index].value);
            true
        } else {
            log::debug!(
                "Palette: index {} out of range ({} labels)",
                index,
                self.labels.len()
            );
            false
        }
    }

    /// Activate the entry with the given value.
    pub fn set_active_value(&mut self, value: &str) -> bool {
        match self.labels.iter().position(|l| l.value == value) {
            Some(index) => self.set_active_index(index),
            None => false,
        }
    }

    /// Find a label by value.
    pub fn find(&self, value: &str) -> Option<&Label> {
        self.labels.iter().find(|l| l.value == value)
    }

    /// Resolve a label value to a full label, falling back to the catch-all.
    pub fn resolve(&self, value: &str) -> Label {
        self.find(value).cloned().unwrap_or_else(Label::fallback)
    }
}
