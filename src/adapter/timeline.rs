//! Video and audio timeline adapter: segments in seconds.

use crate::adapter::{
    CoordinateSpace, CreateRequest, MediumAdapter, kind_mismatch, unsupported_geometry,
    unsupported_request,
};
use crate::config::{Thresholds, TimelineSettings, ZoomLimits};
use crate::error::RegionError;
use crate::geometry::{Point, Probe};
use crate::medium::{LoadedMedium, MediumKind, MediumLoadError};
use crate::model::{Geometry, Region, RegionId};
use crate::tool::ToolMode;
use crate::viewport::{TimelineView, Viewport};

/// Adapter for time-based media. Decoding and playback happen in the host;
/// the adapter only needs the duration.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineAdapter {
    kind: MediumKind,
    duration: Option<f64>,
}

impl TimelineAdapter {
    pub fn video() -> Self {
        Self {
            kind: MediumKind::Video,
            duration: None,
        }
    }

    pub fn audio() -> Self {
        Self {
            kind: MediumKind::Audio,
            duration: None,
        }
    }

    /// Duration in seconds, 0 when nothing is attached.
    pub fn duration(&self) -> f64 {
        self.duration.unwrap_or(0.0)
    }

    fn clamp_time(&self, time: f64) -> f64 {
        time.clamp(0.0, self.duration())
    }
}

impl MediumAdapter for TimelineAdapter {
    fn kind(&self) -> MediumKind {
        self.kind
    }

    fn attach(&mut self, medium: LoadedMedium) -> Result<(), MediumLoadError> {
        match medium {
            LoadedMedium::Timeline { kind, duration } if kind == self.kind => {
                log::info!("Timeline: attached {} of {:.2}s", kind, duration);
                self.duration = Some(duration);
                Ok(())
            }
            other => Err(kind_mismatch(self.kind, &other)),
        }
    }

    fn is_attached(&self) -> bool {
        self.duration.is_some()
    }

    fn supports_tool(&self, tool: ToolMode) -> bool {
        matches!(tool, ToolMode::Select | ToolMode::Pan)
    }

    fn transform_space(&self) -> CoordinateSpace {
        CoordinateSpace::Seconds
    }

    fn initial_viewport(&self, zoom: &ZoomLimits, timeline: &TimelineSettings) -> Viewport {
        Viewport::Temporal(TimelineView::new(self.duration(), *timeline, *zoom))
    }

    fn pointer_probe(&self, medium: Point) -> Option<Probe> {
        Some(Probe::Time(f64::from(medium.x)))
    }

    fn create_rule(
        &self,
        request: &CreateRequest,
        thresholds: &Thresholds,
    ) -> Result<Geometry, RegionError> {
        match request {
            CreateRequest::AtPlayhead { time } => {
                let start = self.clamp_time(*time);
                let end = (start + thresholds.default_segment_length).min(self.duration());
                Ok(Geometry::Segment { start, end })
            }
            other => Err(unsupported_request(other, self.kind)),
        }
    }

    fn commit_rule(
        &self,
        geometry: Geometry,
        _existing: &[Region],
        _exclude: Option<RegionId>,
    ) -> Result<Geometry, RegionError> {
        match geometry {
            Geometry::Segment { start, end } => {
                if !start.is_finite() || !end.is_finite() {
                    return Err(RegionError::degenerate("segment has non-finite bounds"));
                }
                let clamped = Geometry::Segment {
                    start: self.clamp_time(start),
                    end: self.clamp_time(end),
                };
                if clamped != (Geometry::Segment { start, end }) {
                    log::debug!(
                        "Timeline: segment [{:.2}, {:.2}] clamped to duration {:.2}",
                        start,
                        end,
                        self.duration()
                    );
                }
                Ok(clamped)
            }
            other => Err(unsupported_geometry(&other, self.kind)),
        }
    }
}
