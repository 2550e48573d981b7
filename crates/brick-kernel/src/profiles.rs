//! Sketch-region to truck face conversion.
//!
//! truck has no sketch layer; every boundary loop is built as a wire of
//! shared vertices and the face is attached to the outer wire plus inverted
//! hole wires.

use crate::types::*;
use std::f64::consts::PI;
use truck_modeling::builder;
use truck_modeling::topology::{Edge, Face, Solid, Wire};
use truck_modeling::{InnerSpace, Point3, Rad, Vector3};

fn point(p: [f64; 3]) -> Point3 {
    Point3::new(p[0], p[1], p[2])
}

fn vector(v: [f64; 3]) -> Vector3 {
    Vector3::new(v[0], v[1], v[2])
}

/// Closed wire through `points`, in order.
pub fn polygon_wire(points: &[Point3]) -> Wire {
    let vertices: Vec<_> = points.iter().map(|&p| builder::vertex(p)).collect();
    let n = vertices.len();
    let edges: Vec<Edge> = (0..n)
        .map(|i| builder::line(&vertices[i], &vertices[(i + 1) % n]))
        .collect();
    Wire::from_iter(edges)
}

/// Full circle around `axis`, counter-clockwise when viewed against it.
pub fn circle_wire(center: Point3, start: Point3, axis: Vector3) -> Wire {
    let v = builder::vertex(start);
    builder::rsweep(&v, center, axis.normalize(), Rad(2.0 * PI))
}

/// Counter-clockwise wire for one sketch shape placed on `plane`.
pub fn shape_wire(shape: &SketchShape, plane: &Workplane) -> Result<Wire, KernelError> {
    match shape {
        SketchShape::Rect { .. } => {
            let b = shape.bounds();
            let corners = [[b[0], b[1]], [b[2], b[1]], [b[2], b[3]], [b[0], b[3]]];
            let pts: Vec<Point3> = corners.iter().map(|c| point(plane.to_world(*c))).collect();
            Ok(polygon_wire(&pts))
        }
        SketchShape::Circle { center, radius } => {
            if *radius <= 0.0 {
                return Err(KernelError::InvalidProfile {
                    reason: format!("circle radius {} is not positive", radius),
                });
            }
            Ok(circle_wire(
                point(plane.to_world(*center)),
                point(plane.to_world([center[0] + radius, center[1]])),
                vector(plane.normal),
            ))
        }
        SketchShape::Polygon { points } => {
            if points.len() < 3 {
                return Err(KernelError::InvalidProfile {
                    reason: "polygon has fewer than 3 points".to_string(),
                });
            }
            let mut pts: Vec<Point3> = points.iter().map(|p| point(plane.to_world(*p))).collect();
            if brick_types::shoelace_area(points) < 0.0 {
                pts.reverse();
            }
            Ok(polygon_wire(&pts))
        }
    }
}

/// Planar face for a region: outer wire plus one inverted wire per hole.
pub fn region_face(region: &Region, plane: &Workplane) -> Result<Face, KernelError> {
    let mut wires = vec![shape_wire(&region.outer, plane)?];
    for hole in &region.holes {
        wires.push(shape_wire(hole, plane)?.inverse());
    }
    builder::try_attach_plane(&wires).map_err(|e| KernelError::InvalidProfile {
        reason: format!("failed to create planar face: {}", e),
    })
}

/// Axis-aligned box via successive translational sweeps.
/// Origin at (0,0,0), extends to (w,h,d).
pub fn make_box(w: f64, h: f64, d: f64) -> Solid {
    let v = builder::vertex(Point3::new(0.0, 0.0, 0.0));
    let edge = builder::tsweep(&v, Vector3::new(w, 0.0, 0.0));
    let face = builder::tsweep(&edge, Vector3::new(0.0, h, 0.0));
    builder::tsweep(&face, Vector3::new(0.0, 0.0, d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use brick_types::SketchMode;

    #[test]
    fn test_make_box_topology() {
        let solid = make_box(1.0, 2.0, 3.0);
        let shell = &solid.boundaries()[0];
        assert_eq!(shell.face_iter().count(), 6);
    }

    #[test]
    fn test_rect_region_face() {
        let sketch = Sketch::new().rect(4.0, 2.0, SketchMode::Add);
        let region = &sketch.regions()[0];
        let face = region_face(region, &Workplane::xy()).unwrap();
        assert_eq!(face.boundaries().len(), 1);
        assert_eq!(face.boundaries()[0].len(), 4);
    }

    #[test]
    fn test_annulus_region_face_has_hole() {
        let sketch = Sketch::new()
            .circle(4.75, SketchMode::Add)
            .circle(3.55, SketchMode::Subtract);
        let region = &sketch.regions()[0];
        let face = region_face(region, &Workplane::xy_at(10.0)).unwrap();
        assert_eq!(face.boundaries().len(), 2);
    }

    #[test]
    fn test_short_polygon_is_rejected() {
        let shape = SketchShape::Polygon {
            points: vec![[0.0, 0.0], [1.0, 0.0]],
        };
        assert!(shape_wire(&shape, &Workplane::xy()).is_err());
    }
}
