//! Polygon boolean combination on fixed-point rings.
//!
//! Wraps the `i_overlay` clipping primitive for two jobs: resolving a
//! shape's authored sub-paths into simple, non-intersecting fill rings
//! under its fill rule, and expanding a resolved fill into a stroke
//! outline via Minkowski summation of a square brush.

use i_overlay::core::fill_rule::FillRule as OverlayFillRule;
use i_overlay::core::overlay::Overlay;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::i_float::int::point::IntPoint;
use i_overlay::i_shape::int::shape::IntShapes;

use crate::geometry::{signed_area, IntPolygon, IntPolygons};
use crate::shape::FillRule;

/// Union the (possibly self-intersecting, mutually overlapping) rings with
/// themselves under the given fill rule, producing simple rings.
///
/// Output orientation is normalized: outer boundaries counter-clockwise
/// (positive area), holes clockwise. Downstream hole detection keys off
/// this.
pub fn resolve_fill(rings: &IntPolygons, fill_rule: FillRule) -> IntPolygons {
    if rings.is_empty() {
        return Vec::new();
    }

    let rule = match fill_rule {
        FillRule::NonZero => OverlayFillRule::NonZero,
        FillRule::EvenOdd => OverlayFillRule::EvenOdd,
    };

    let clip: IntPolygons = Vec::new();
    let shapes = Overlay::with_contours(rings, &clip).overlay(OverlayRule::Subject, rule);
    normalize(shapes)
}

/// Minkowski-sum a brush polygon along every ring, then union the result.
///
/// Each ring is expected to be explicitly closed (first vertex re-appended).
/// For every ring edge and every brush edge one quad spanning the two brush
/// translates is emitted; the NonZero union of all quads is the uniform
/// band around the ring boundary. Corner treatment is whatever the brush
/// shape produces.
pub fn minkowski_stroke(brush: &IntPolygon, rings: &IntPolygons) -> IntPolygons {
    let mut quads: IntPolygons = Vec::new();

    for ring in rings {
        for edge in ring.windows(2) {
            let (a, b) = (edge[0], edge[1]);
            for j in 0..brush.len() {
                let b0 = brush[j];
                let b1 = brush[(j + 1) % brush.len()];
                let mut quad = vec![
                    IntPoint::new(a.x + b0.x, a.y + b0.y),
                    IntPoint::new(a.x + b1.x, a.y + b1.y),
                    IntPoint::new(b.x + b1.x, b.y + b1.y),
                    IntPoint::new(b.x + b0.x, b.y + b0.y),
                ];
                if signed_area(&quad) < 0 {
                    quad.reverse();
                }
                quads.push(quad);
            }
        }
    }

    if quads.is_empty() {
        return Vec::new();
    }

    let clip: IntPolygons = Vec::new();
    let shapes =
        Overlay::with_contours(&quads, &clip).overlay(OverlayRule::Subject, OverlayFillRule::NonZero);
    normalize(shapes)
}

/// Flatten the clipper's nested shape output into a plain ring list with
/// the crate's orientation convention enforced.
fn normalize(shapes: IntShapes) -> IntPolygons {
    let mut out = Vec::new();
    for shape in shapes {
        for (i, mut ring) in shape.into_iter().enumerate() {
            let area = signed_area(&ring);
            if area == 0 {
                continue;
            }
            // Contour 0 is the outer boundary, the rest are holes.
            let hole = i > 0;
            if hole != (area < 0) {
                ring.reverse();
            }
            out.push(ring);
        }
    }
    out
}
