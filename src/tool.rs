//! Tool state machine.
//!
//! Interprets pointer gestures according to the active tool. The machine owns
//! only transient state (drafts, drag previews); everything it decides is
//! returned as a [`ToolOutcome`] for the editor to apply. Malformed gestures
//! (a move or release with no press) are logged and ignored.

use serde::{Deserialize, Serialize};

use crate::adapter::CreateRequest;
use crate::config::Thresholds;
use crate::constants::MIN_POLYGON_VERTICES;
use crate::geometry::{Handle, Point, apply_handle_drag, distance, handle_at};
use crate::input::PointerKind;
use crate::model::{Geometry, RegionId};

/// Tools selectable by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolMode {
    /// Select, move and reshape existing regions
    #[default]
    Select,
    /// Drag the viewport
    Pan,
    /// Draw axis-aligned boxes
    Rectangle,
    /// Click out polygons
    Polygon,
}

impl ToolMode {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            ToolMode::Select => "Select",
            ToolMode::Pan => "Pan",
            ToolMode::Rectangle => "Rectangle",
            ToolMode::Polygon => "Polygon",
        }
    }

    /// Get all available tools.
    pub fn all() -> &'static [ToolMode] {
        &[
            ToolMode::Select,
            ToolMode::Pan,
            ToolMode::Rectangle,
            ToolMode::Polygon,
        ]
    }

    /// Check if this tool creates regions.
    pub fn is_drawing_tool(&self) -> bool {
        matches!(self, ToolMode::Rectangle | ToolMode::Polygon)
    }
}

/// In-progress gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Dragging the viewport; `last` is the previous screen position.
    Panning { last: Point },
    /// Box draft in medium space.
    DrawingBox { anchor: Point, corner: Point },
    /// Open polygon in medium space.
    DrawingPolygon { vertices: Vec<Point> },
    /// Pressed on a handle of the selected region, not yet moved enough.
    PendingTransform {
        id: RegionId,
        handle: Handle,
        start: Point,
        start_screen: Point,
        original: Geometry,
    },
    /// Dragging a handle; `preview` is the geometry shown until release.
    Transforming {
        id: RegionId,
        handle: Handle,
        start: Point,
        original: Geometry,
        preview: Geometry,
    },
}

/// What the editor should do after a pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Nothing,
    /// Translate the viewport by a screen-space delta.
    Pan { dx: f32, dy: f32 },
    /// Select whatever is under this medium point (with cycling).
    SelectAt(Point),
    /// A draft is complete; create a region from it.
    Create(CreateRequest),
    /// A handle drag finished; commit the new geometry.
    Commit { id: RegionId, geometry: Geometry },
}

/// Inputs the machine needs from the editor for one pointer event.
#[derive(Debug, Clone, Copy)]
pub struct ToolContext<'a> {
    /// The selected region, if handles on it may be grabbed.
    pub selected: Option<(RegionId, &'a Geometry)>,
    /// Medium units per screen pixel at the current zoom.
    pub units_per_pixel: f32,
    pub thresholds: &'a Thresholds,
}

/// The per-editor tool state.
#[derive(Debug, Clone, Default)]
pub struct ToolMachine {
    mode: ToolMode,
    gesture: Gesture,
}

impl ToolMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Whether a gesture is in progress.
    pub fn is_busy(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    /// Switch tools, discarding any draft.
    pub fn set_mode(&mut self, mode: ToolMode) {
        if self.mode != mode {
            log::debug!("Tool: {} -> {}", self.mode.name(), mode.name());
        }
        self.cancel();
        self.mode = mode;
    }

    /// Drop any in-progress gesture. Returns whether something was dropped.
    pub fn cancel(&mut self) -> bool {
        let busy = self.is_busy();
        if busy {
            log::debug!("Tool: cancelled {}", self.gesture_name());
        }
        self.gesture = Gesture::Idle;
        busy
    }

    /// The current draft as geometry, for display.
    pub fn draft(&self) -> Option<Geometry> {
        match &self.gesture {
            Gesture::DrawingBox { anchor, corner } => {
                Some(Geometry::box_from_corners(*anchor, *corner))
            }
            Gesture::DrawingPolygon { vertices } => Some(Geometry::Polygon {
                points: vertices.clone(),
            }),
            _ => None,
        }
    }

    /// The transform preview, for display.
    pub fn preview(&self) -> Option<(RegionId, &Geometry)> {
        match &self.gesture {
            Gesture::Transforming { id, preview, .. } => Some((*id, preview)),
            _ => None,
        }
    }

    /// Feed one pointer event.
    ///
    /// `screen` is the raw position, `medium` the same point projected into
    /// medium space.
    pub fn pointer(
        &mut self,
        kind: PointerKind,
        screen: Point,
        medium: Point,
        ctx: &ToolContext<'_>,
    ) -> ToolOutcome {
        log::trace!(
            "Tool: {} {:?} at screen ({:.1}, {:.1}) medium ({:.2}, {:.2})",
            self.mode.name(),
            kind,
            screen.x,
            screen.y,
            medium.x,
            medium.y
        );
        match self.mode {
            ToolMode::Select => self.select_pointer(kind, screen, medium, ctx),
            ToolMode::Pan => self.pan_pointer(kind, screen),
            ToolMode::Rectangle => self.box_pointer(kind, medium),
            ToolMode::Polygon => self.polygon_pointer(kind, medium, ctx),
        }
    }

    /// Close the open polygon if it has enough vertices.
    pub fn finish_polygon(&mut self) -> ToolOutcome {
        match &self.gesture {
            Gesture::DrawingPolygon { vertices } if vertices.len() >= MIN_POLYGON_VERTICES => {
                let vertices = vertices.clone();
                self.finish(CreateRequest::Polygon { vertices })
            }
            Gesture::DrawingPolygon { vertices } => {
                log::debug!(
                    "Polygon: finish ignored, only {} vertices",
                    vertices.len()
                );
                ToolOutcome::Nothing
            }
            _ => ToolOutcome::Nothing,
        }
    }

    fn finish(&mut self, request: CreateRequest) -> ToolOutcome {
        self.gesture = Gesture::Idle;
        self.mode = ToolMode::Select;
        ToolOutcome::Create(request)
    }

    fn pan_pointer(&mut self, kind: PointerKind, screen: Point) -> ToolOutcome {
        match (kind, &self.gesture) {
            (PointerKind::Down, _) => {
                self.gesture = Gesture::Panning { last: screen };
                ToolOutcome::Nothing
            }
            (PointerKind::Move, Gesture::Panning { last }) => {
                let (dx, dy) = (screen.x - last.x, screen.y - last.y);
                self.gesture = Gesture::Panning { last: screen };
                ToolOutcome::Pan { dx, dy }
            }
            (PointerKind::Up, Gesture::Panning { last }) => {
                let (dx, dy) = (screen.x - last.x, screen.y - last.y);
                self.gesture = Gesture::Idle;
                if dx == 0.0 && dy == 0.0 {
                    ToolOutcome::Nothing
                } else {
                    ToolOutcome::Pan { dx, dy }
                }
            }
            _ => self.stray(kind),
        }
    }

    fn box_pointer(&mut self, kind: PointerKind, p: Point) -> ToolOutcome {
        match (kind, &mut self.gesture) {
            (PointerKind::Down, _) => {
                self.gesture = Gesture::DrawingBox {
                    anchor: p,
                    corner: p,
                };
                log::debug!("Box: started at ({:.1}, {:.1})", p.x, p.y);
                ToolOutcome::Nothing
            }
            (PointerKind::Move, Gesture::DrawingBox { corner, .. }) => {
                *corner = p;
                ToolOutcome::Nothing
            }
            (PointerKind::Up, Gesture::DrawingBox { anchor, .. }) => {
                let anchor = *anchor;
                log::debug!("Box: released at ({:.1}, {:.1})", p.x, p.y);
                self.finish(CreateRequest::Box { anchor, corner: p })
            }
            _ => self.stray(kind),
        }
    }

    fn polygon_pointer(
        &mut self,
        kind: PointerKind,
        p: Point,
        ctx: &ToolContext<'_>,
    ) -> ToolOutcome {
        // Vertices are placed on press; moves and releases are expected noise
        if kind != PointerKind::Down {
            return ToolOutcome::Nothing;
        }

        let close_distance = ctx.thresholds.polygon_close_distance * ctx.units_per_pixel;
        match &mut self.gesture {
            Gesture::DrawingPolygon { vertices } => {
                if vertices.len() >= MIN_POLYGON_VERTICES
                    && distance(p, vertices[0]) <= close_distance
                {
                    let vertices = vertices.clone();
                    log::debug!("Polygon: closed with {} vertices", vertices.len());
                    return self.finish(CreateRequest::Polygon { vertices });
                }
                vertices.push(p);
                log::debug!(
                    "Polygon: added vertex {} at ({:.1}, {:.1})",
                    vertices.len(),
                    p.x,
                    p.y
                );
            }
            _ => {
                self.gesture = Gesture::DrawingPolygon { vertices: vec![p] };
                log::debug!("Polygon: started at ({:.1}, {:.1})", p.x, p.y);
            }
        }
        ToolOutcome::Nothing
    }

    fn select_pointer(
        &mut self,
        kind: PointerKind,
        screen: Point,
        p: Point,
        ctx: &ToolContext<'_>,
    ) -> ToolOutcome {
        match kind {
            PointerKind::Down => {
                let radius = ctx.thresholds.handle_hit_radius * ctx.units_per_pixel;
                let grabbed = ctx.selected.and_then(|(id, geometry)| {
                    handle_at(geometry, p, radius).map(|handle| (id, handle, geometry.clone()))
                });
                match grabbed {
                    Some((id, handle, original)) => {
                        // Don't start editing until there's actual movement
                        log::debug!("Potential drag on region {}, handle={:?}", id, handle);
                        self.gesture = Gesture::PendingTransform {
                            id,
                            handle,
                            start: p,
                            start_screen: screen,
                            original,
                        };
                        ToolOutcome::Nothing
                    }
                    None => ToolOutcome::SelectAt(p),
                }
            }
            PointerKind::Move => {
                let gesture = std::mem::take(&mut self.gesture);
                self.gesture = match gesture {
                    Gesture::PendingTransform {
                        id,
                        handle,
                        start,
                        start_screen,
                        original,
                    } => {
                        if distance(screen, start_screen) >= ctx.thresholds.min_drag_distance {
                            log::debug!(
                                "Starting handle drag on region {}, handle={:?}",
                                id,
                                handle
                            );
                            let preview = apply_handle_drag(&original, handle, start, p)
                                .unwrap_or_else(|| original.clone());
                            Gesture::Transforming {
                                id,
                                handle,
                                start,
                                original,
                                preview,
                            }
                        } else {
                            Gesture::PendingTransform {
                                id,
                                handle,
                                start,
                                start_screen,
                                original,
                            }
                        }
                    }
                    Gesture::Transforming {
                        id,
                        handle,
                        start,
                        original,
                        preview,
                    } => {
                        let preview =
                            apply_handle_drag(&original, handle, start, p).unwrap_or(preview);
                        Gesture::Transforming {
                            id,
                            handle,
                            start,
                            original,
                            preview,
                        }
                    }
                    other => other,
                };
                ToolOutcome::Nothing
            }
            PointerKind::Up => match std::mem::take(&mut self.gesture) {
                // Released without enough movement: a click, which cycles selection
                Gesture::PendingTransform { .. } => ToolOutcome::SelectAt(p),
                Gesture::Transforming {
                    id,
                    handle,
                    start,
                    original,
                    preview,
                } => {
                    let geometry =
                        apply_handle_drag(&original, handle, start, p).unwrap_or(preview);
                    log::debug!("Finished dragging region {}", id);
                    ToolOutcome::Commit { id, geometry }
                }
                Gesture::Idle => ToolOutcome::Nothing,
                other => {
                    log::warn!("Select: release during unexpected gesture {:?}", other);
                    ToolOutcome::Nothing
                }
            },
        }
    }

    fn stray(&self, kind: PointerKind) -> ToolOutcome {
        log::debug!(
            "{}: ignoring {:?} during {}",
            self.mode.name(),
            kind,
            self.gesture_name()
        );
        ToolOutcome::Nothing
    }

    fn gesture_name(&self) -> &'static str {
        match self.gesture {
            Gesture::Idle => "Idle",
            Gesture::Panning { .. } => "Panning",
            Gesture::DrawingBox { .. } => "DrawingBox",
            Gesture::DrawingPolygon { .. } => "DrawingPolygon",
            Gesture::PendingTransform { .. } => "PendingTransform",
            Gesture::Transforming { .. } => "Transforming",
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn ctx(thresholds: &Thresholds) -> ToolContext<'_> {
        ToolContext {
            selected: None,
            units_per_pixel: 1.0,
            thresholds,
        }
    }

    fn feed(
        machine: &mut ToolMachine,
        kind: PointerKind,
        x: f32,
        y: f32,
        ctx: &ToolContext<'_>,
    ) -> ToolOutcome {
        let p = Point::new(x, y);
        machine.pointer(kind, p, p, ctx)
    }

    #[test]
    fn test_box_draw_returns_to_select() {
        let thresholds = Thresholds::default();
        let ctx = ctx(&thresholds);
        let mut machine = ToolMachine::new();
        machine.set_mode(ToolMode::Rectangle);

        feed(&mut machine, PointerKind::Down, 10.0, 10.0, &ctx);
        feed(&mut machine, PointerKind::Move, 60.0, 40.0, &ctx);
        assert_eq!(
            machine.draft(),
            Some(Geometry::Box {
                x: 10.0,
                y: 10.0,
                width: 50.0,
                height: 30.0
            })
        );

        let outcome = feed(&mut machine, PointerKind::Up, 110.0, 80.0, &ctx);
        assert_eq!(
            outcome,
            ToolOutcome::Create(CreateRequest::Box {
                anchor: Point::new(10.0, 10.0),
                corner: Point::new(110.0, 80.0)
            })
        );
        assert_eq!(machine.mode(), ToolMode::Select);
        assert!(!machine.is_busy());
    }

    #[test]
    fn test_stray_events_are_noops() {
        let thresholds = Thresholds::default();
        let ctx = ctx(&thresholds);
        let mut machine = ToolMachine::new();
        machine.set_mode(ToolMode::Rectangle);

        assert_eq!(
            feed(&mut machine, PointerKind::Up, 5.0, 5.0, &ctx),
            ToolOutcome::Nothing
        );
        assert_eq!(
            feed(&mut machine, PointerKind::Move, 5.0, 5.0, &ctx),
            ToolOutcome::Nothing
        );
        assert_eq!(machine.mode(), ToolMode::Rectangle);
    }

    #[test]
    fn test_polygon_closes_near_first_vertex() {
        let thresholds = Thresholds::default();
        let ctx = ctx(&thresholds);
        let mut machine = ToolMachine::new();
        machine.set_mode(ToolMode::Polygon);

        for (x, y) in [(0.0, 0.0), (50.0, 0.0), (50.0, 50.0)] {
            assert_eq!(
                feed(&mut machine, PointerKind::Down, x, y, &ctx),
                ToolOutcome::Nothing
            );
            feed(&mut machine, PointerKind::Up, x, y, &ctx);
        }
        let outcome = feed(&mut machine, PointerKind::Down, 5.0, 5.0, &ctx);
        let ToolOutcome::Create(CreateRequest::Polygon { vertices }) = outcome else {
            panic!("expected polygon, got {outcome:?}");
        };
        assert_eq!(vertices.len(), 3);
        assert_eq!(machine.mode(), ToolMode::Select);
    }

    #[test]
    fn test_polygon_close_distance_scales_with_zoom() {
        let thresholds = Thresholds::default();
        // Zoomed in 4x: 10 screen px is 2.5 medium units
        let ctx = ToolContext {
            selected: None,
            units_per_pixel: 0.25,
            thresholds: &thresholds,
        };
        let mut machine = ToolMachine::new();
        machine.set_mode(ToolMode::Polygon);
        for (x, y) in [(0.0, 0.0), (50.0, 0.0), (50.0, 50.0), (5.0, 5.0)] {
            feed(&mut machine, PointerKind::Down, x, y, &ctx);
        }
        assert_eq!(machine.draft().map(|g| g.kind_name()), Some("polygon"));
        let Gesture::DrawingPolygon { vertices } = machine.gesture() else {
            panic!("polygon should still be open");
        };
        assert_eq!(vertices.len(), 4);
    }

    #[test]
    fn test_escape_cancels_polygon() {
        let thresholds = Thresholds::default();
        let ctx = ctx(&thresholds);
        let mut machine = ToolMachine::new();
        machine.set_mode(ToolMode::Polygon);
        feed(&mut machine, PointerKind::Down, 0.0, 0.0, &ctx);
        feed(&mut machine, PointerKind::Down, 10.0, 0.0, &ctx);

        assert!(machine.cancel());
        assert_eq!(machine.draft(), None);
        assert_eq!(machine.finish_polygon(), ToolOutcome::Nothing);
    }

    #[test]
    fn test_finish_polygon_with_enter() {
        let thresholds = Thresholds::default();
        let ctx = ctx(&thresholds);
        let mut machine = ToolMachine::new();
        machine.set_mode(ToolMode::Polygon);
        feed(&mut machine, PointerKind::Down, 0.0, 0.0, &ctx);
        feed(&mut machine, PointerKind::Down, 40.0, 0.0, &ctx);
        assert_eq!(machine.finish_polygon(), ToolOutcome::Nothing);

        feed(&mut machine, PointerKind::Down, 40.0, 40.0, &ctx);
        assert!(matches!(
            machine.finish_polygon(),
            ToolOutcome::Create(CreateRequest::Polygon { ref vertices }) if vertices.len() == 3
        ));
    }

    #[test]
    fn test_pan_emits_deltas() {
        let thresholds = Thresholds::default();
        let ctx = ctx(&thresholds);
        let mut machine = ToolMachine::new();
        machine.set_mode(ToolMode::Pan);

        feed(&mut machine, PointerKind::Down, 100.0, 100.0, &ctx);
        assert_eq!(
            feed(&mut machine, PointerKind::Move, 110.0, 95.0, &ctx),
            ToolOutcome::Pan { dx: 10.0, dy: -5.0 }
        );
        assert_eq!(
            feed(&mut machine, PointerKind::Up, 110.0, 95.0, &ctx),
            ToolOutcome::Nothing
        );
    }

    #[test]
    fn test_select_click_without_handle() {
        let thresholds = Thresholds::default();
        let ctx = ctx(&thresholds);
        let mut machine = ToolMachine::new();
        assert_eq!(
            feed(&mut machine, PointerKind::Down, 30.0, 30.0, &ctx),
            ToolOutcome::SelectAt(Point::new(30.0, 30.0))
        );
        assert_eq!(
            feed(&mut machine, PointerKind::Up, 30.0, 30.0, &ctx),
            ToolOutcome::Nothing
        );
    }

    #[test]
    fn test_transform_drag_commits() {
        let thresholds = Thresholds::default();
        let id = Uuid::new_v4();
        let geometry = Geometry::Box {
            x: 10.0,
            y: 10.0,
            width: 100.0,
            height: 50.0,
        };
        let ctx = ToolContext {
            selected: Some((id, &geometry)),
            units_per_pixel: 1.0,
            thresholds: &thresholds,
        };
        let mut machine = ToolMachine::new();

        feed(&mut machine, PointerKind::Down, 50.0, 30.0, &ctx);
        assert!(matches!(machine.gesture(), Gesture::PendingTransform { .. }));

        // Below the drag threshold: still pending
        feed(&mut machine, PointerKind::Move, 51.0, 30.0, &ctx);
        assert!(matches!(machine.gesture(), Gesture::PendingTransform { .. }));

        feed(&mut machine, PointerKind::Move, 60.0, 30.0, &ctx);
        assert_eq!(
            machine.preview(),
            Some((
                id,
                &Geometry::Box {
                    x: 20.0,
                    y: 10.0,
                    width: 100.0,
                    height: 50.0
                }
            ))
        );

        let outcome = feed(&mut machine, PointerKind::Up, 70.0, 40.0, &ctx);
        assert_eq!(
            outcome,
            ToolOutcome::Commit {
                id,
                geometry: Geometry::Box {
                    x: 30.0,
                    y: 20.0,
                    width: 100.0,
                    height: 50.0
                }
            }
        );
        assert!(!machine.is_busy());
    }

    #[test]
    fn test_press_release_on_handle_is_click() {
        let thresholds = Thresholds::default();
        let id = Uuid::new_v4();
        let geometry = Geometry::Box {
            x: 10.0,
            y: 10.0,
            width: 100.0,
            height: 50.0,
        };
        let ctx = ToolContext {
            selected: Some((id, &geometry)),
            units_per_pixel: 1.0,
            thresholds: &thresholds,
        };
        let mut machine = ToolMachine::new();
        feed(&mut machine, PointerKind::Down, 50.0, 30.0, &ctx);
        assert_eq!(
            feed(&mut machine, PointerKind::Up, 50.0, 30.0, &ctx),
            ToolOutcome::SelectAt(Point::new(50.0, 30.0))
        );
    }
}
