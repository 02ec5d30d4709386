//! Edit handles: which part of a region the pointer grabbed, and how a drag
//! on that part reshapes the geometry.

use crate::geometry::{Point, distance, point_in_box, point_in_polygon};
use crate::model::Geometry;

/// Box corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Box edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

/// A grabbable part of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    /// Box corner (resize both axes).
    Corner(Corner),
    /// Box edge (resize one axis).
    Edge(Edge),
    /// Polygon vertex by index.
    Vertex(usize),
    /// Segment start.
    Start,
    /// Segment end.
    End,
    /// The whole shape (move).
    Body,
}

/// Find the handle of `geometry` under `p`.
///
/// Corners and vertices win over edges, edges over the body. `radius` is in
/// medium units. Segments are probed with `p.x` in seconds.
pub fn handle_at(geometry: &Geometry, p: Point, radius: f32) -> Option<Handle> {
    match geometry {
        Geometry::Box {
            x,
            y,
            width,
            height,
        } => {
            let (x0, y0, x1, y1) = (*x, *y, x + width, y + height);
            let corners = [
                (Corner::TopLeft, Point::new(x0, y0)),
                (Corner::TopRight, Point::new(x1, y0)),
                (Corner::BottomLeft, Point::new(x0, y1)),
                (Corner::BottomRight, Point::new(x1, y1)),
            ];
            if let Some((corner, _)) = corners.iter().find(|(_, c)| distance(p, *c) <= radius) {
                return Some(Handle::Corner(*corner));
            }

            let within_x = p.x >= x0 - radius && p.x <= x1 + radius;
            let within_y = p.y >= y0 - radius && p.y <= y1 + radius;
            if within_x && (p.y - y0).abs() <= radius {
                return Some(Handle::Edge(Edge::Top));
            }
            if within_x && (p.y - y1).abs() <= radius {
                return Some(Handle::Edge(Edge::Bottom));
            }
            if within_y && (p.x - x0).abs() <= radius {
                return Some(Handle::Edge(Edge::Left));
            }
            if within_y && (p.x - x1).abs() <= radius {
                return Some(Handle::Edge(Edge::Right));
            }

            point_in_box(p, x0, y0, *width, *height).then_some(Handle::Body)
        }
        Geometry::Polygon { points } => {
            if let Some(index) = points.iter().position(|v| distance(p, *v) <= radius) {
                return Some(Handle::Vertex(index));
            }
            point_in_polygon(p, points).then_some(Handle::Body)
        }
        Geometry::Segment { start, end } => {
            let t = f64::from(p.x);
            let r = f64::from(radius);
            if (t - start).abs() <= r {
                Some(Handle::Start)
            } else if (t - end).abs() <= r {
                Some(Handle::End)
            } else if *start <= t && t <= *end {
                Some(Handle::Body)
            } else {
                None
            }
        }
        // Spans are re-selected rather than dragged; 3D boxes and map
        // features are edited by their own transform tools.
        Geometry::Span { .. } | Geometry::Box3d { .. } | Geometry::Feature(_) => None,
    }
}

/// Apply a drag of `handle` from `start` to `current` to the original geometry.
///
/// Box resizes are re-normalized so dragging a corner past the opposite one
/// flips the box instead of producing a negative size. Returns `None` if the
/// handle does not belong to this geometry.
pub fn apply_handle_drag(
    original: &Geometry,
    handle: Handle,
    start: Point,
    current: Point,
) -> Option<Geometry> {
    let dx = current.x - start.x;
    let dy = current.y - start.y;

    match (original, handle) {
        (
            Geometry::Box {
                x,
                y,
                width,
                height,
            },
            handle,
        ) => {
            let (mut x0, mut y0, mut x1, mut y1) = (*x, *y, x + width, y + height);
            match handle {
                Handle::Body => {
                    x0 += dx;
                    x1 += dx;
                    y0 += dy;
                    y1 += dy;
                }
                Handle::Corner(Corner::TopLeft) => {
                    x0 += dx;
                    y0 += dy;
                }
                Handle::Corner(Corner::TopRight) => {
                    x1 += dx;
                    y0 += dy;
                }
                Handle::Corner(Corner::BottomLeft) => {
                    x0 += dx;
                    y1 += dy;
                }
                Handle::Corner(Corner::BottomRight) => {
                    x1 += dx;
                    y1 += dy;
                }
                Handle::Edge(Edge::Top) => y0 += dy,
                Handle::Edge(Edge::Bottom) => y1 += dy,
                Handle::Edge(Edge::Left) => x0 += dx,
                Handle::Edge(Edge::Right) => x1 += dx,
                Handle::Vertex(_) | Handle::Start | Handle::End => return None,
            }
            Some(Geometry::box_from_corners(
                Point::new(x0, y0),
                Point::new(x1, y1),
            ))
        }
        (Geometry::Polygon { points }, Handle::Vertex(index)) => {
            let mut points = points.clone();
            let vertex = points.get_mut(index)?;
            vertex.x += dx;
            vertex.y += dy;
            Some(Geometry::Polygon { points })
        }
        (Geometry::Polygon { points }, Handle::Body) => Some(Geometry::Polygon {
            points: points
                .iter()
                .map(|p| Point::new(p.x + dx, p.y + dy))
                .collect(),
        }),
        (Geometry::Segment { start: s, end: e }, handle) => {
            let dt = f64::from(dx);
            let (s, e) = match handle {
                Handle::Start => (s + dt, *e),
                Handle::End => (*s, e + dt),
                Handle::Body => (s + dt, e + dt),
                _ => return None,
            };
            Some(Geometry::Segment {
                start: s.min(e),
                end: s.max(e),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Geometry {
        Geometry::Box {
            x: 10.0,
            y: 10.0,
            width: 100.0,
            height: 50.0,
        }
    }

    #[test]
    fn test_handle_priority() {
        let b = rect();
        assert_eq!(
            handle_at(&b, Point::new(11.0, 9.0), 4.0),
            Some(Handle::Corner(Corner::TopLeft))
        );
        assert_eq!(
            handle_at(&b, Point::new(60.0, 58.0), 4.0),
            Some(Handle::Edge(Edge::Bottom))
        );
        assert_eq!(
            handle_at(&b, Point::new(108.0, 30.0), 4.0),
            Some(Handle::Edge(Edge::Right))
        );
        assert_eq!(handle_at(&b, Point::new(50.0, 30.0), 4.0), Some(Handle::Body));
        assert_eq!(handle_at(&b, Point::new(200.0, 30.0), 4.0), None);
    }

    #[test]
    fn test_box_move_and_resize() {
        let b = rect();
        let moved = apply_handle_drag(
            &b,
            Handle::Body,
            Point::new(50.0, 30.0),
            Point::new(60.0, 25.0),
        );
        assert_eq!(
            moved,
            Some(Geometry::Box {
                x: 20.0,
                y: 5.0,
                width: 100.0,
                height: 50.0
            })
        );

        let resized = apply_handle_drag(
            &b,
            Handle::Corner(Corner::BottomRight),
            Point::new(110.0, 60.0),
            Point::new(130.0, 70.0),
        );
        assert_eq!(
            resized,
            Some(Geometry::Box {
                x: 10.0,
                y: 10.0,
                width: 120.0,
                height: 60.0
            })
        );
    }

    #[test]
    fn test_box_resize_past_opposite_edge_flips() {
        let flipped = apply_handle_drag(
            &rect(),
            Handle::Edge(Edge::Right),
            Point::new(110.0, 30.0),
            Point::new(0.0, 30.0),
        );
        assert_eq!(
            flipped,
            Some(Geometry::Box {
                x: 0.0,
                y: 10.0,
                width: 10.0,
                height: 50.0
            })
        );
    }

    #[test]
    fn test_polygon_vertex_drag() {
        let polygon = Geometry::Polygon {
            points: vec![
                Point::new(0.0, 0.0),
                Point::new(50.0, 0.0),
                Point::new(50.0, 50.0),
            ],
        };
        assert_eq!(
            handle_at(&polygon, Point::new(49.0, 1.0), 3.0),
            Some(Handle::Vertex(1))
        );
        let dragged = apply_handle_drag(
            &polygon,
            Handle::Vertex(1),
            Point::new(50.0, 0.0),
            Point::new(60.0, -5.0),
        );
        let Some(Geometry::Polygon { points }) = dragged else {
            panic!("expected polygon");
        };
        assert_eq!(points[1], Point::new(60.0, -5.0));
        assert_eq!(points[0], Point::new(0.0, 0.0));

        assert_eq!(
            apply_handle_drag(&polygon, Handle::Vertex(7), Point::default(), Point::default()),
            None
        );
    }

    #[test]
    fn test_segment_handles() {
        let segment = Geometry::Segment {
            start: 10.0,
            end: 20.0,
        };
        assert_eq!(
            handle_at(&segment, Point::new(10.1, 0.0), 0.25),
            Some(Handle::Start)
        );
        assert_eq!(
            handle_at(&segment, Point::new(19.9, 0.0), 0.25),
            Some(Handle::End)
        );
        assert_eq!(
            handle_at(&segment, Point::new(15.0, 0.0), 0.25),
            Some(Handle::Body)
        );

        let moved = apply_handle_drag(
            &segment,
            Handle::Body,
            Point::new(15.0, 0.0),
            Point::new(17.0, 0.0),
        );
        assert_eq!(
            moved,
            Some(Geometry::Segment {
                start: 12.0,
                end: 22.0
            })
        );
    }

    #[test]
    fn test_no_handles_on_spans() {
        let span = Geometry::Span { start: 0, end: 5 };
        assert_eq!(handle_at(&span, Point::new(2.0, 0.0), 10.0), None);
    }
}
