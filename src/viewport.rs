//! Viewport controller: pan, zoom and playhead state of one editor.
//!
//! A viewport is created when a medium is attached and owns the screen ↔
//! medium mapping used by the tool machine. Text, map and 3D editors get a
//! [`Viewport::Fixed`] viewport; their projection lives in the host.

use crate::config::{TimelineSettings, ZoomLimits};
use crate::geometry::{Point, Projection, TimeScale, Transform};

/// Zoomable, pannable 2D view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialView {
    pub transform: Transform,
    limits: ZoomLimits,
}

impl SpatialView {
    pub fn new(limits: ZoomLimits) -> Self {
        Self {
            transform: Transform::identity(),
            limits,
        }
    }

    /// Zoom to `new_zoom` (clamped), keeping the point under `cursor` fixed.
    pub fn zoom_at(&mut self, new_zoom: f32, cursor: Option<Point>) {
        let new_zoom = self.limits.clamp(new_zoom);
        self.transform = match cursor {
            Some(cursor) => self.transform.zoom_to_cursor(new_zoom, cursor),
            None => Transform::new(new_zoom, self.transform.pan_x, self.transform.pan_y),
        };
        log::debug!(
            "Viewport: zoom {:.2}, pan ({:.1}, {:.1})",
            self.transform.zoom,
            self.transform.pan_x,
            self.transform.pan_y
        );
    }
}

/// Time axis with a playhead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineView {
    pub scale: TimeScale,
    base_pixels_per_second: f32,
    current_time: f64,
    duration: f64,
    playing: bool,
    limits: ZoomLimits,
}

impl TimelineView {
    pub fn new(duration: f64, settings: TimelineSettings, limits: ZoomLimits) -> Self {
        Self {
            scale: TimeScale::new(settings.pixels_per_second),
            base_pixels_per_second: settings.pixels_per_second,
            current_time: 0.0,
            duration: duration.max(0.0),
            playing: false,
            limits,
        }
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Zoom factor relative to the configured pixels per second.
    pub fn zoom(&self) -> f32 {
        self.scale.pixels_per_second / self.base_pixels_per_second
    }

    /// Move the playhead, clamped to `[0, duration]`.
    pub fn seek(&mut self, time: f64) {
        let clamped = if time.is_finite() {
            time.clamp(0.0, self.duration)
        } else {
            log::warn!("Viewport: ignoring seek to {}", time);
            self.current_time
        };
        if clamped != time {
            log::debug!("Viewport: seek {:.3}s clamped to {:.3}s", time, clamped);
        }
        self.current_time = clamped;
    }

    /// Advance playback by `dt` seconds; stops at the end.
    pub fn advance(&mut self, dt: f64) {
        if !self.playing {
            return;
        }
        self.current_time = (self.current_time + dt).min(self.duration);
        if self.current_time >= self.duration {
            self.playing = false;
            log::debug!("Viewport: playback reached the end");
        }
    }

    /// Toggle playback. Playing from the end restarts at zero.
    pub fn toggle_play(&mut self) -> bool {
        self.playing = !self.playing;
        if self.playing && self.current_time >= self.duration {
            self.current_time = 0.0;
        }
        log::debug!(
            "Viewport: {} at {:.3}s",
            if self.playing { "playing" } else { "paused" },
            self.current_time
        );
        self.playing
    }

    /// Change the zoom factor, keeping the time under `cursor_x` fixed.
    pub fn zoom_at(&mut self, zoom: f32, cursor_x: Option<f32>) {
        let zoom = self.limits.clamp(zoom);
        let anchor_x = cursor_x.unwrap_or_else(|| self.scale.time_to_pixel(self.current_time));
        let anchor_time = self.scale.pixel_to_time(anchor_x);
        self.scale.pixels_per_second = self.base_pixels_per_second * zoom;
        self.scale.scroll =
            (anchor_time * f64::from(self.scale.pixels_per_second)) as f32 - anchor_x;
        log::debug!(
            "Viewport: timeline zoom {:.2} ({:.1} px/s)",
            zoom,
            self.scale.pixels_per_second
        );
    }

    /// Scroll horizontally by a screen delta (dragging right scrolls back).
    pub fn scroll_by(&mut self, dx: f32) {
        self.scale.scroll = (self.scale.scroll - dx).max(0.0);
    }
}

/// Viewport state of one editor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Viewport {
    Spatial(SpatialView),
    Temporal(TimelineView),
    /// Projection owned by the host (text layout, map, 3D camera).
    Fixed,
}

impl Viewport {
    /// Screen ↔ medium mapping for the geometry kernel.
    pub fn projection(&self) -> Projection {
        match self {
            Viewport::Spatial(view) => Projection::Spatial(view.transform),
            Viewport::Temporal(view) => Projection::Temporal(view.scale),
            Viewport::Fixed => Projection::Identity,
        }
    }

    /// Current zoom factor (1.0 for fixed viewports).
    pub fn zoom(&self) -> f32 {
        match self {
            Viewport::Spatial(view) => view.transform.zoom,
            Viewport::Temporal(view) => view.zoom(),
            Viewport::Fixed => 1.0,
        }
    }

    pub fn zoom_in(&mut self, factor: f32, cursor: Option<Point>) {
        let zoom = self.zoom() * factor;
        self.zoom_to(zoom, cursor);
    }

    pub fn zoom_out(&mut self, factor: f32, cursor: Option<Point>) {
        let zoom = self.zoom() / factor;
        self.zoom_to(zoom, cursor);
    }

    /// Back to zoom 1 with no pan/scroll.
    pub fn reset(&mut self) {
        match self {
            Viewport::Spatial(view) => {
                view.transform = Transform::identity();
                log::debug!("Viewport: reset");
            }
            Viewport::Temporal(view) => {
                view.scale.pixels_per_second = view.base_pixels_per_second;
                view.scale.scroll = 0.0;
                log::debug!("Viewport: timeline reset");
            }
            Viewport::Fixed => {}
        }
    }

    /// Translate by a screen delta.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        match self {
            Viewport::Spatial(view) => view.transform = view.transform.pan_by(dx, dy),
            Viewport::Temporal(view) => view.scroll_by(dx),
            Viewport::Fixed => {}
        }
    }

    /// Move the playhead. Returns false for non-temporal viewports.
    pub fn seek(&mut self, time: f64) -> bool {
        match self {
            Viewport::Temporal(view) => {
                view.seek(time);
                true
            }
            _ => false,
        }
    }

    pub fn advance(&mut self, dt: f64) {
        if let Viewport::Temporal(view) = self {
            view.advance(dt);
        }
    }

    /// Toggle playback; `None` for non-temporal viewports.
    pub fn toggle_play(&mut self) -> Option<bool> {
        match self {
            Viewport::Temporal(view) => Some(view.toggle_play()),
            _ => None,
        }
    }

    pub fn timeline(&self) -> Option<&TimelineView> {
        match self {
            Viewport::Temporal(view) => Some(view),
            _ => None,
        }
    }

    pub fn current_time(&self) -> Option<f64> {
        self.timeline().map(TimelineView::current_time)
    }

    fn zoom_to(&mut self, zoom: f32, cursor: Option<Point>) {
        match self {
            Viewport::Spatial(view) => view.zoom_at(zoom, cursor),
            Viewport::Temporal(view) => view.zoom_at(zoom, cursor.map(|c| c.x)),
            Viewport::Fixed => {}
        }
    }
}
