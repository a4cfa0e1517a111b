//! The tessellation cache and orchestrator.
//!
//! Owns one cache entry per registered shape, decides when per-shape and
//! whole-scene (meld) recomputation is needed, and assembles the final
//! per-shape fill/stroke polygon sets plus bounds. All work is synchronous
//! and driven by a single logical owner; `&mut self` on every mutating
//! entry point encodes that assumption.

use indexmap::IndexMap;
use log::{debug, trace};

use crate::error::Error;
use crate::geometry::{point_in_polygon, IntPolygons, Point, Polygons, Rect};
use crate::partition::remove_holes;
use crate::shape::{Shape, ShapeSource};
use crate::simplify::Points;

/// Scene-wide tessellation parameters.
///
/// `quality` (0–100) controls final simplification aggressiveness: higher
/// quality means a smaller detail threshold. `scale` maps model coordinates
/// into the fixed-point space the boolean and simplification stages operate
/// on. `tolerance` and `max_levels` bound curve flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessellationParameters {
    pub quality: f32,
    pub meld: bool,
    pub scale: f64,
    pub tolerance: f64,
    pub max_levels: u32,
}

impl Default for TessellationParameters {
    fn default() -> Self {
        TessellationParameters {
            quality: 100.0,
            meld: true,
            scale: 10.0,
            tolerance: 0.1,
            max_levels: 10,
        }
    }
}

/// Renderable result for one shape: hole-free fill and stroke polygon sets
/// in model space, plus a bounding rectangle over both. The bounds are the
/// zero rectangle whenever the fill set is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tessellation {
    pub fill: Polygons,
    pub stroke: Polygons,
    pub bounds: Rect,
}

impl Tessellation {
    /// Hit test against both fill and stroke polygons.
    pub fn contains_point(&self, p: Point) -> bool {
        self.fill.iter().chain(self.stroke.iter()).any(|poly| point_in_polygon(p, poly))
    }
}

#[derive(Debug, Default)]
struct CacheEntry {
    valid: bool,
    base: IntPolygons,
    tessellation: Tessellation,
}

/// Per-scene tessellation owner.
///
/// Lifecycle per shape: `register_shape` creates an invalid entry,
/// `mark_dirty` invalidates it after edits, `deregister_shape` removes it.
/// Reads are pull-based: `get_tessellation` recomputes lazily, running a
/// full meld pass first whenever the scene-wide meld flag is dirty.
#[derive(Debug)]
pub struct Tessellator {
    cache: IndexMap<String, CacheEntry>,
    parameters: TessellationParameters,
    meld_dirty: bool,
}

impl Default for Tessellator {
    fn default() -> Self {
        Tessellator::new(TessellationParameters::default())
    }
}

impl Tessellator {
    pub fn new(parameters: TessellationParameters) -> Self {
        Tessellator {
            cache: IndexMap::new(),
            parameters,
            meld_dirty: true,
        }
    }

    pub fn parameters(&self) -> &TessellationParameters {
        &self.parameters
    }

    /// Create an (invalid) cache entry for a shape key.
    pub fn register_shape(&mut self, key: impl Into<String>) {
        self.cache.insert(key.into(), CacheEntry::default());
        self.meld_dirty = true;
    }

    /// Drop a shape's cache entry. Must be called before the shape itself
    /// is destroyed.
    pub fn deregister_shape(&mut self, key: &str) {
        self.cache.shift_remove(key);
        self.meld_dirty = true;
    }

    /// Invalidate one shape's entry after a geometry or style edit.
    pub fn mark_dirty(&mut self, key: &str) -> Result<(), Error> {
        let entry = self
            .cache
            .get_mut(key)
            .ok_or_else(|| Error::UnknownShape(key.to_string()))?;
        entry.valid = false;
        self.meld_dirty = true;
        Ok(())
    }

    pub fn quality(&self) -> f32 {
        self.parameters.quality
    }

    /// Change the simplification quality (0–100). Invalidates every entry
    /// and asks all registered shapes to redraw.
    pub fn set_quality<S: ShapeSource>(&mut self, quality: f32, scene: &mut S) {
        let quality = quality.clamp(0.0, 100.0);
        if quality != self.parameters.quality {
            self.parameters.quality = quality;
            self.refresh(scene);
        }
    }

    pub fn meld(&self) -> bool {
        self.parameters.meld
    }

    /// Toggle cross-shape seam preservation. Invalidates every entry and
    /// asks all registered shapes to redraw.
    pub fn set_meld<S: ShapeSource>(&mut self, meld: bool, scene: &mut S) {
        if meld != self.parameters.meld {
            self.parameters.meld = meld;
            self.refresh(scene);
        }
    }

    /// Read entry point. Runs a meld pass first if the scene is meld-dirty,
    /// then recomputes this shape alone if it is still invalid.
    pub fn get_tessellation<S: ShapeSource>(
        &mut self,
        scene: &S,
        key: &str,
    ) -> Result<&Tessellation, Error> {
        if self.meld_dirty {
            self.compute_meld(scene)?;
            self.meld_dirty = false;
        }

        let parameters = self.parameters;
        let entry = self
            .cache
            .get_mut(key)
            .ok_or_else(|| Error::UnknownShape(key.to_string()))?;

        if !entry.valid {
            let shape = scene
                .shape(key)
                .ok_or_else(|| Error::MissingGeometry(key.to_string()))?;
            trace!("recomputing tessellation for shape `{key}`");
            update_record(&parameters, shape, entry);
        }

        Ok(&entry.tessellation)
    }

    /// Bounding rectangle of a shape's current tessellation.
    pub fn get_edit_rect<S: ShapeSource>(&mut self, scene: &S, key: &str) -> Result<Rect, Error> {
        Ok(self.get_tessellation(scene, key)?.bounds)
    }

    /// Whole-scene recompute that preserves seams between touching shapes.
    ///
    /// One identity map spans the entire scene: every shape's authored
    /// anchor points are locked into it, so edges shared between adjacent
    /// shapes collapse onto identical, simplification-immune vertices.
    /// Shapes are then processed in reverse registration order — later
    /// (top) shapes get priority claiming ambiguous shared vertices, a
    /// deliberate tie-break policy.
    fn compute_meld<S: ShapeSource>(&mut self, scene: &S) -> Result<(), Error> {
        if !self.parameters.meld {
            return Ok(());
        }

        debug!("meld pass over {} shapes", self.cache.len());

        for (key, entry) in self.cache.iter_mut() {
            let shape = scene
                .shape(key)
                .ok_or_else(|| Error::MissingGeometry(key.clone()))?;
            if !entry.valid {
                entry.base = shape.resolve_fill(&self.parameters);
            }
        }

        let mut points = Points::new();
        for key in self.cache.keys() {
            let shape = scene
                .shape(key)
                .ok_or_else(|| Error::MissingGeometry(key.clone()))?;
            points.lock(&shape.lock_points(&self.parameters));
        }

        let detail = detail(&self.parameters);
        let keys: Vec<String> = self.cache.keys().cloned().collect();
        for key in keys.iter().rev() {
            let shape = scene
                .shape(key)
                .ok_or_else(|| Error::MissingGeometry(key.clone()))?;
            let Some(entry) = self.cache.get_mut(key) else {
                continue;
            };

            let fill = points.simplify(detail, &entry.base);
            let stroke = shape.expand_stroke(&self.parameters, &fill);
            let stroke = points.simplify(detail, &stroke);

            entry.tessellation = build_tessellation(self.parameters.scale, &fill, &stroke);
            entry.valid = true;
        }

        Ok(())
    }

    /// Invalidate everything after a parameter change and notify shapes.
    fn refresh<S: ShapeSource>(&mut self, scene: &mut S) {
        self.meld_dirty = true;
        for entry in self.cache.values_mut() {
            entry.valid = false;
        }
        let keys: Vec<String> = self.cache.keys().cloned().collect();
        for key in &keys {
            scene.request_redraw(key);
        }
    }
}

/// Detail threshold in fixed-point units derived from `quality`.
fn detail(parameters: &TessellationParameters) -> f64 {
    let quality = 2.0 * parameters.quality as f64 / 100.0;
    parameters.scale / quality
}

/// Single-shape (non-melded) recompute path: fresh identity maps for fill
/// and stroke, no cross-shape locking.
fn update_record(parameters: &TessellationParameters, shape: &Shape, entry: &mut CacheEntry) {
    let detail = detail(parameters);

    entry.base = shape.resolve_fill(parameters);

    let mut fill_points = Points::new();
    let fill = fill_points.simplify(detail, &entry.base);

    let stroke = shape.expand_stroke(parameters, &fill);
    let mut stroke_points = Points::new();
    let stroke = stroke_points.simplify(detail, &stroke);

    entry.tessellation = build_tessellation(parameters.scale, &fill, &stroke);
    entry.valid = true;
}

/// Run hole removal on fill and stroke and compute the covering bounds.
fn build_tessellation(scale: f64, fill: &IntPolygons, stroke: &IntPolygons) -> Tessellation {
    let fill = remove_holes(scale, fill);
    let stroke = remove_holes(scale, stroke);

    let bounds = if fill.is_empty() {
        Rect::default()
    } else {
        let mut rect = Rect::new(fill[0][0], Point::default());
        for poly in fill.iter().chain(stroke.iter()) {
            for &p in poly {
                rect.expand_to(p);
            }
        }
        rect
    };

    Tessellation {
        fill,
        stroke,
        bounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::tests::square_path;
    use crate::shape::{FillRule, ShapeStore};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn square_shape(x0: f64, y0: f64, x1: f64, y1: f64) -> Shape {
        let mut shape = Shape::new();
        shape.add_path(square_path(x0, y0, x1, y1));
        shape
    }

    fn fill_vertices(t: &Tessellation) -> Vec<Point> {
        t.fill.iter().flatten().copied().collect()
    }

    #[test]
    fn test_empty_shape_yields_valid_empty_tessellation() {
        let mut store = ShapeStore::new();
        store.insert("a", Shape::new());

        let mut tess = Tessellator::default();
        tess.register_shape("a");

        let t = tess.get_tessellation(&store, "a").unwrap().clone();
        assert!(t.fill.is_empty());
        assert!(t.stroke.is_empty());
        assert_eq!(t.bounds, Rect::default());
    }

    #[test]
    fn test_deregistered_shape_read_is_an_error() {
        let mut store = ShapeStore::new();
        store.insert("a", Shape::new());

        let mut tess = Tessellator::default();
        tess.register_shape("a");
        tess.deregister_shape("a");

        assert_eq!(
            tess.get_tessellation(&store, "a"),
            Err(Error::UnknownShape("a".to_string()))
        );
    }

    #[test]
    fn test_unresolvable_shape_is_an_error() {
        let store = ShapeStore::new();
        let mut tess = Tessellator::default();
        tess.register_shape("ghost");

        assert_eq!(
            tess.get_tessellation(&store, "ghost"),
            Err(Error::MissingGeometry("ghost".to_string()))
        );
    }

    #[test]
    fn test_mark_dirty_unknown_key_is_an_error() {
        let mut tess = Tessellator::default();
        assert_eq!(
            tess.mark_dirty("nope"),
            Err(Error::UnknownShape("nope".to_string()))
        );
    }

    #[test]
    fn test_square_bounds_cover_fill_and_stroke() {
        let mut store = ShapeStore::new();
        store.insert("a", square_shape(0.0, 0.0, 10.0, 10.0));

        let mut tess = Tessellator::default();
        tess.register_shape("a");

        let t = tess.get_tessellation(&store, "a").unwrap();
        // Stroke width 3 at scale 10 extends the 10x10 square by 1.5.
        assert!(approx(t.bounds.position.x, -1.5));
        assert!(approx(t.bounds.position.y, -1.5));
        assert!(approx(t.bounds.size.x, 13.0));
        assert!(approx(t.bounds.size.y, 13.0));
    }

    #[test]
    fn test_repeated_reads_are_identical() {
        let mut store = ShapeStore::new();
        store.insert("a", square_shape(0.0, 0.0, 10.0, 10.0));

        let mut tess = Tessellator::default();
        tess.register_shape("a");

        let first = tess.get_tessellation(&store, "a").unwrap().clone();
        let second = tess.get_tessellation(&store, "a").unwrap().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_mark_dirty_picks_up_new_geometry() {
        let mut store = ShapeStore::new();
        store.insert("a", square_shape(0.0, 0.0, 10.0, 10.0));

        let mut tess = Tessellator::default();
        tess.register_shape("a");
        let old_bounds = tess.get_tessellation(&store, "a").unwrap().bounds;

        store
            .get_mut("a")
            .unwrap()
            .set_path_points(0, square_path(0.0, 0.0, 20.0, 20.0));
        tess.mark_dirty("a").unwrap();

        let new_bounds = tess.get_tessellation(&store, "a").unwrap().bounds;
        assert_ne!(old_bounds, new_bounds);
        assert!(approx(new_bounds.size.x, 23.0));
    }

    #[test]
    fn test_meld_preserves_shared_edge() {
        let mut store = ShapeStore::new();
        store.insert("left", square_shape(0.0, 0.0, 10.0, 10.0));
        store.insert("right", square_shape(10.0, 0.0, 20.0, 10.0));

        let mut tess = Tessellator::default();
        tess.register_shape("left");
        tess.register_shape("right");

        let left = tess.get_tessellation(&store, "left").unwrap().clone();
        let right = tess.get_tessellation(&store, "right").unwrap().clone();

        for corner in [Point::new(10.0, 0.0), Point::new(10.0, 10.0)] {
            assert!(fill_vertices(&left).contains(&corner));
            assert!(fill_vertices(&right).contains(&corner));
        }
    }

    #[test]
    fn test_meld_disabled_still_tessellates() {
        let mut store = ShapeStore::new();
        store.insert("a", square_shape(0.0, 0.0, 10.0, 10.0));

        let mut tess = Tessellator::default();
        tess.register_shape("a");
        tess.set_meld(false, &mut store);

        let t = tess.get_tessellation(&store, "a").unwrap();
        assert!(!t.fill.is_empty());
        assert!(approx(t.bounds.size.x, 13.0));
    }

    #[test]
    fn test_fill_rules_diverge() {
        let mut nonzero = Shape::new();
        nonzero.add_path(square_path(0.0, 0.0, 6.0, 10.0));
        nonzero.add_path(square_path(4.0, 0.0, 10.0, 10.0));
        nonzero.set_fill_rule(FillRule::NonZero);
        nonzero.set_stroke_width(0.0);

        let mut evenodd = nonzero.clone();
        evenodd.set_fill_rule(FillRule::EvenOdd);

        let mut store = ShapeStore::new();
        store.insert("nz", nonzero);
        store.insert("eo", evenodd);

        let mut tess = Tessellator::default();
        tess.register_shape("nz");
        tess.register_shape("eo");

        let nz = tess.get_tessellation(&store, "nz").unwrap().clone();
        let eo = tess.get_tessellation(&store, "eo").unwrap().clone();

        // NonZero merges the overlap into one region; EvenOdd carves it
        // out, leaving two disjoint regions.
        assert_ne!(nz.fill.len(), eo.fill.len());
        assert!(nz.contains_point(Point::new(5.0, 5.0)));
        assert!(!eo.contains_point(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_zero_stroke_width_empty_stroke() {
        let mut shape = square_shape(0.0, 0.0, 10.0, 10.0);
        shape.set_stroke_width(0.0);

        let mut store = ShapeStore::new();
        store.insert("a", shape);

        let mut tess = Tessellator::default();
        tess.register_shape("a");

        let t = tess.get_tessellation(&store, "a").unwrap();
        assert!(t.stroke.is_empty());
        assert!(!t.fill.is_empty());
        // Without a stroke the bounds hug the fill.
        assert!(approx(t.bounds.size.x, 10.0));
    }

    /// Scene wrapper that counts redraw requests.
    struct CountingScene {
        store: ShapeStore,
        redraws: usize,
    }

    impl ShapeSource for CountingScene {
        fn shape(&self, key: &str) -> Option<&Shape> {
            self.store.shape(key)
        }

        fn request_redraw(&mut self, _key: &str) {
            self.redraws += 1;
        }
    }

    #[test]
    fn test_quality_change_invalidates_and_requests_redraw() {
        let mut scene = CountingScene {
            store: ShapeStore::new(),
            redraws: 0,
        };
        scene.store.insert("a", square_shape(0.0, 0.0, 10.0, 10.0));

        let mut tess = Tessellator::default();
        tess.register_shape("a");
        let _ = tess.get_tessellation(&scene, "a").unwrap();

        tess.set_quality(50.0, &mut scene);
        assert_eq!(scene.redraws, 1);
        assert_eq!(tess.quality(), 50.0);

        // Setting the same value again is a no-op.
        tess.set_quality(50.0, &mut scene);
        assert_eq!(scene.redraws, 1);

        // The next read recomputes rather than serving stale data.
        let t = tess.get_tessellation(&scene, "a").unwrap();
        assert!(!t.fill.is_empty());
    }

    #[test]
    fn test_contains_point_hit_test() {
        let mut store = ShapeStore::new();
        store.insert("a", square_shape(0.0, 0.0, 10.0, 10.0));

        let mut tess = Tessellator::default();
        tess.register_shape("a");

        let t = tess.get_tessellation(&store, "a").unwrap().clone();
        assert!(t.contains_point(Point::new(5.0, 5.0)));
        // Inside the stroke band but outside the fill.
        assert!(t.contains_point(Point::new(-1.0, 5.0)));
        assert!(!t.contains_point(Point::new(-5.0, 5.0)));
    }

    #[test]
    fn test_edit_rect_matches_bounds() {
        let mut store = ShapeStore::new();
        store.insert("a", square_shape(0.0, 0.0, 10.0, 10.0));

        let mut tess = Tessellator::default();
        tess.register_shape("a");

        let bounds = tess.get_tessellation(&store, "a").unwrap().bounds;
        assert_eq!(tess.get_edit_rect(&store, "a").unwrap(), bounds);
    }
}
