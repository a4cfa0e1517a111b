//! Shape geometry and style, and the lookup capability the tessellator
//! uses to reach shapes by key.

use i_overlay::i_float::int::point::IntPoint;
use indexmap::IndexMap;

use crate::boolean;
use crate::flatten::flatten_path;
use crate::geometry::{Color, IntPolygon, IntPolygons, Point};
use crate::tessellator::TessellationParameters;

/// Winding test used to resolve overlapping/self-intersecting sub-paths
/// into one unambiguous filled region.
///
/// Only these two rules exist; an out-of-range rule is unrepresentable by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    NonZero,
    #[default]
    EvenOdd,
}

/// One closed chain of cubic Bézier segments: four control points per
/// segment, consecutive segments sharing an endpoint (stride 3).
#[derive(Debug, Clone)]
pub struct SubPath {
    pub points: Vec<Point>,
    pub closed: bool,
}

/// A vector outline with fill/stroke style.
///
/// Geometry and style mutations set the dirty flag; the owner is expected
/// to forward it to the tessellator via `mark_dirty`. Color changes only
/// repaint and do not dirty the tessellation.
#[derive(Debug, Clone)]
pub struct Shape {
    paths: Vec<SubPath>,
    fill_rule: FillRule,
    fill_color: Color,
    stroke_color: Color,
    stroke_width: f64,
    dirty: bool,
}

impl Default for Shape {
    fn default() -> Self {
        Shape {
            paths: Vec::new(),
            fill_rule: FillRule::EvenOdd,
            fill_color: [1.0, 1.0, 1.0, 1.0],
            stroke_color: [0.0, 0.0, 0.0, 1.0],
            stroke_width: 3.0,
            dirty: true,
        }
    }
}

impl Shape {
    pub fn new() -> Self {
        Shape::default()
    }

    pub fn add_path(&mut self, points: Vec<Point>) {
        self.paths.push(SubPath {
            points,
            closed: true,
        });
        self.dirty = true;
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn path_points(&self, path: usize) -> &[Point] {
        &self.paths[path].points
    }

    pub fn set_path_points(&mut self, path: usize, points: Vec<Point>) {
        self.paths[path].points = points;
        self.dirty = true;
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    pub fn set_fill_rule(&mut self, fill_rule: FillRule) {
        if self.fill_rule != fill_rule {
            self.fill_rule = fill_rule;
            self.dirty = true;
        }
    }

    pub fn fill_color(&self) -> Color {
        self.fill_color
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
    }

    pub fn stroke_color(&self) -> Color {
        self.stroke_color
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.stroke_color = color;
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.stroke_width = width;
        self.dirty = true;
    }

    /// Consume the dirty flag. Returns true when geometry or style changed
    /// since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Flatten every sub-path and boolean-resolve the result under this
    /// shape's fill rule into simple fill rings.
    pub fn resolve_fill(&self, parameters: &TessellationParameters) -> IntPolygons {
        let mut rings: IntPolygons = Vec::new();
        for path in &self.paths {
            let mut ring = IntPolygon::new();
            flatten_path(&path.points, parameters, &mut ring);
            rings.push(ring);
        }
        boolean::resolve_fill(&rings, self.fill_rule)
    }

    /// The shape's authored anchor points (every third control point),
    /// scaled into the fixed-point space. These seed the shared identity
    /// map before melding.
    pub fn lock_points(&self, parameters: &TessellationParameters) -> IntPolygon {
        let s = parameters.scale;
        let mut points = IntPolygon::new();
        for path in &self.paths {
            let mut k = 0;
            while k < path.points.len() {
                let p = path.points[k];
                points.push(IntPoint::new((p.x * s) as i32, (p.y * s) as i32));
                k += 3;
            }
        }
        points
    }

    /// Expand the already-resolved fill rings into a stroke outline by
    /// Minkowski-summing a square brush of half the stroke width along
    /// each explicitly closed ring. A non-positive width disables the
    /// stroke entirely.
    pub fn expand_stroke(
        &self,
        parameters: &TessellationParameters,
        fill: &IntPolygons,
    ) -> IntPolygons {
        if self.stroke_width <= 0.0 {
            return Vec::new();
        }

        let w = (0.5 * self.stroke_width * parameters.scale) as i32;
        let brush = vec![
            IntPoint::new(-w, -w),
            IntPoint::new(w, -w),
            IntPoint::new(w, w),
            IntPoint::new(-w, w),
        ];

        let mut closed: IntPolygons = Vec::new();
        for ring in fill {
            if ring.is_empty() {
                continue;
            }
            let mut c = ring.clone();
            c.push(ring[0]);
            closed.push(c);
        }

        boolean::minkowski_stroke(&brush, &closed)
    }
}

/// Lookup capability injected into the tessellator: resolves a cache key
/// to a live shape, and receives redraw requests when scene-wide
/// parameters change.
pub trait ShapeSource {
    fn shape(&self, key: &str) -> Option<&Shape>;

    fn request_redraw(&mut self, key: &str) {
        let _ = key;
    }
}

/// A plain keyed shape collection for embedders (and tests) that have no
/// scene graph of their own.
#[derive(Debug, Default)]
pub struct ShapeStore {
    shapes: IndexMap<String, Shape>,
}

impl ShapeStore {
    pub fn new() -> Self {
        ShapeStore::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, shape: Shape) {
        self.shapes.insert(key.into(), shape);
    }

    pub fn remove(&mut self, key: &str) -> Option<Shape> {
        self.shapes.shift_remove(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Shape> {
        self.shapes.get_mut(key)
    }
}

impl ShapeSource for ShapeStore {
    fn shape(&self, key: &str) -> Option<&Shape> {
        self.shapes.get(key)
    }
}
