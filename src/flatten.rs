//! Adaptive flattening of cubic Bézier segments into fixed-point polylines.

use i_overlay::i_float::int::point::IntPoint;

use crate::geometry::{IntPolygon, Point};
use crate::tessellator::TessellationParameters;

/// Recursively flatten one cubic Bézier segment, appending points to `out`.
///
/// Control points are already in the fixed-point coordinate space. The
/// flatness test compares the perpendicular deviation of the interior
/// control points against the chord; flat-enough segments emit their
/// endpoint as a single point. Recursion past `max_levels` is abandoned,
/// which bounds output size and guarantees termination for degenerate
/// input (coincident control points, `tolerance <= 0`).
#[allow(clippy::too_many_arguments)]
pub fn flatten_cubic(
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    x3: f64,
    y3: f64,
    x4: f64,
    y4: f64,
    level: u32,
    parameters: &TessellationParameters,
    out: &mut IntPolygon,
) {
    if level > parameters.max_levels {
        return;
    }

    let x12 = (x1 + x2) * 0.5;
    let y12 = (y1 + y2) * 0.5;
    let x23 = (x2 + x3) * 0.5;
    let y23 = (y2 + y3) * 0.5;
    let x34 = (x3 + x4) * 0.5;
    let y34 = (y3 + y4) * 0.5;
    let x123 = (x12 + x23) * 0.5;
    let y123 = (y12 + y23) * 0.5;

    let dx = x4 - x1;
    let dy = y4 - y1;
    let d2 = ((x2 - x4) * dy - (y2 - y4) * dx).abs();
    let d3 = ((x3 - x4) * dy - (y3 - y4) * dx).abs();

    if (d2 + d3) * (d2 + d3) < parameters.tolerance * (dx * dx + dy * dy) {
        out.push(IntPoint::new(x4 as i32, y4 as i32));
        return;
    }

    let x234 = (x23 + x34) * 0.5;
    let y234 = (y23 + y34) * 0.5;
    let x1234 = (x123 + x234) * 0.5;
    let y1234 = (y123 + y234) * 0.5;

    flatten_cubic(x1, y1, x12, y12, x123, y123, x1234, y1234, level + 1, parameters, out);
    flatten_cubic(x1234, y1234, x234, y234, x34, y34, x4, y4, level + 1, parameters, out);
}

/// Flatten a closed Bézier path into a fixed-point ring.
///
/// The path is a chain of cubic segments: four control points per segment,
/// consecutive segments sharing an endpoint (stride 3). The scaled start
/// point is emitted before and after the chain to guarantee closure.
pub fn flatten_path(points: &[Point], parameters: &TessellationParameters, out: &mut IntPolygon) {
    if points.is_empty() {
        return;
    }

    let s = parameters.scale;
    let p0 = IntPoint::new((points[0].x * s) as i32, (points[0].y * s) as i32);

    out.push(p0);
    let mut i = 0;
    while i + 3 < points.len() {
        let p = &points[i..i + 4];
        flatten_cubic(
            p[0].x * s,
            p[0].y * s,
            p[1].x * s,
            p[1].y * s,
            p[2].x * s,
            p[2].y * s,
            p[3].x * s,
            p[3].y * s,
            1,
            parameters,
            out,
        );
        i += 3;
    }
    out.push(p0);
}
