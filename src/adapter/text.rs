//! Plain text adapter: non-overlapping spans in character offsets.

use crate::adapter::{
    CoordinateSpace, CreateRequest, MediumAdapter, kind_mismatch, unsupported_geometry,
    unsupported_request,
};
use crate::config::{Thresholds, TimelineSettings, ZoomLimits};
use crate::error::RegionError;
use crate::medium::{LoadedMedium, MediumKind, MediumLoadError};
use crate::model::{Geometry, Region, RegionId};
use crate::tool::ToolMode;
use crate::viewport::Viewport;

/// Adapter for a fixed text. Offsets count Unicode scalar values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextAdapter {
    content: Option<String>,
    char_len: usize,
}

impl TextAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// The text covered by `[start, end)`, if in range.
    pub fn span_text(&self, start: usize, end: usize) -> Option<&str> {
        if start > end || end > self.char_len {
            return None;
        }
        let content = self.content();
        let byte_at = |offset: usize| {
            content
                .char_indices()
                .nth(offset)
                .map_or(content.len(), |(i, _)| i)
        };
        content.get(byte_at(start)..byte_at(end))
    }

    fn overlapping<'a>(
        start: usize,
        end: usize,
        existing: &'a [Region],
        exclude: Option<RegionId>,
    ) -> Option<&'a Region> {
        existing
            .iter()
            .filter(|r| Some(r.id) != exclude)
            .find(|r| match r.geometry {
                Geometry::Span { start: s, end: e } => start < e && s < end,
                _ => false,
            })
    }
}

impl MediumAdapter for TextAdapter {
    fn kind(&self) -> MediumKind {
        MediumKind::Text
    }

    fn attach(&mut self, medium: LoadedMedium) -> Result<(), MediumLoadError> {
        match medium {
            LoadedMedium::Text(content) => {
                self.char_len = content.chars().count();
                log::info!("Text: attached {} characters", self.char_len);
                self.content = Some(content);
                Ok(())
            }
            other => Err(kind_mismatch(MediumKind::Text, &other)),
        }
    }

    fn is_attached(&self) -> bool {
        self.content.is_some()
    }

    fn supports_tool(&self, tool: ToolMode) -> bool {
        tool == ToolMode::Select
    }

    fn transform_space(&self) -> CoordinateSpace {
        CoordinateSpace::CharOffsets
    }

    fn initial_viewport(&self, _zoom: &ZoomLimits, _timeline: &TimelineSettings) -> Viewport {
        Viewport::Fixed
    }

    fn create_rule(
        &self,
        request: &CreateRequest,
        _thresholds: &Thresholds,
    ) -> Result<Geometry, RegionError> {
        match request {
            // Selections may be made backwards
            CreateRequest::TextSelection { start, end } => Ok(Geometry::Span {
                start: (*start).min(*end).min(self.char_len),
                end: (*start).max(*end).min(self.char_len),
            }),
            other => Err(unsupported_request(other, MediumKind::Text)),
        }
    }

    fn commit_rule(
        &self,
        geometry: Geometry,
        existing: &[Region],
        exclude: Option<RegionId>,
    ) -> Result<Geometry, RegionError> {
        let Geometry::Span { start, end } = geometry else {
            return Err(unsupported_geometry(&geometry, MediumKind::Text));
        };
        if end > self.char_len {
            return Err(RegionError::out_of_domain(format!(
                "span end {end} is past the text length {}",
                self.char_len
            )));
        }
        if let Some(region) = Self::overlapping(start, end, existing, exclude) {
            return Err(RegionError::OverlapRejected {
                start,
                end,
                existing: region.id,
            });
        }
        Ok(geometry)
    }
}
