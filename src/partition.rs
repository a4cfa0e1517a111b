//! Conversion of simplified fixed-point rings into hole-free model-space
//! polygons ready for flat-shaded rendering.

use crate::geometry::{point_in_polygon, signed_area, IntPolygons, Point, Polygon, Polygons};

/// Convert a ring set that may contain holes (clockwise winding) into
/// simple, hole-free polygons.
///
/// Rings are scaled back to model space, holes are matched to their
/// innermost enclosing outer ring, and each outer with holes is handed to
/// the ear-clipping primitive, which bridges the holes into the boundary
/// and returns a triangulation. Outer rings without holes pass through
/// unchanged. Degenerate rings are discarded.
pub fn remove_holes(scale: f64, rings: &IntPolygons) -> Polygons {
    struct Ring {
        poly: Polygon,
        area: i64,
    }

    let mut classified: Vec<Ring> = Vec::new();
    for ring in rings {
        if ring.len() < 3 {
            continue;
        }
        let area = signed_area(ring);
        if area == 0 {
            continue;
        }
        let poly = ring
            .iter()
            .map(|p| Point::new(p.x as f64 / scale, p.y as f64 / scale))
            .collect();
        classified.push(Ring { poly, area });
    }

    // Holes (negative area) attach to the smallest outer ring containing
    // their first vertex; orphaned holes are dropped.
    let mut hole_lists: Vec<Vec<usize>> = vec![Vec::new(); classified.len()];
    for h in 0..classified.len() {
        if classified[h].area > 0 {
            continue;
        }
        let probe = classified[h].poly[0];
        let mut best: Option<usize> = None;
        for o in 0..classified.len() {
            if classified[o].area <= 0 || !point_in_polygon(probe, &classified[o].poly) {
                continue;
            }
            if best.map_or(true, |b| classified[o].area.abs() < classified[b].area.abs()) {
                best = Some(o);
            }
        }
        if let Some(o) = best {
            hole_lists[o].push(h);
        }
    }

    let mut out = Vec::new();
    for o in 0..classified.len() {
        if classified[o].area <= 0 {
            continue;
        }
        if hole_lists[o].is_empty() {
            out.push(classified[o].poly.clone());
            continue;
        }

        let mut coords: Vec<f64> = Vec::new();
        let mut hole_indices: Vec<usize> = Vec::new();
        for p in &classified[o].poly {
            coords.push(p.x);
            coords.push(p.y);
        }
        for &h in &hole_lists[o] {
            hole_indices.push(coords.len() / 2);
            for p in &classified[h].poly {
                coords.push(p.x);
                coords.push(p.y);
            }
        }

        let triangles = earcutr::earcut(&coords, &hole_indices, 2).unwrap_or_default();
        for tri in triangles.chunks_exact(3) {
            let vertex = |i: usize| Point::new(coords[2 * i], coords[2 * i + 1]);
            out.push(vec![vertex(tri[0]), vertex(tri[1]), vertex(tri[2])]);
        }
    }

    out
}
