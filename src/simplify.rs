//! Vertex-identity-aware polygon simplification.
//!
//! A Douglas-Peucker-style reduction augmented with a persistent identity
//! map: vertices at identical fixed-point coordinates are one logical
//! vertex, across rings and across calls on the same [`Points`] instance.
//! Each vertex carries a tri-state (neutral / locked / removed); a locked
//! vertex always survives simplification at its exact coordinate. Melding
//! relies on this — shared edges between adjacent shapes collapse onto the
//! same records and simplify identically on both sides.

use std::collections::HashMap;

use i_overlay::i_float::int::point::IntPoint;

use crate::geometry::{IntPolygon, IntPolygons};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Neutral,
    Locked,
    Removed,
}

#[derive(Debug, Clone)]
struct VertexRecord {
    p: IntPoint,
    state: State,
}

impl VertexRecord {
    fn lock(&mut self) {
        self.state = State::Locked;
    }

    fn remove(&mut self) {
        // A locked vertex must never be discarded; hitting this is a
        // broken invariant in the caller, not bad input.
        assert!(
            self.state != State::Locked,
            "attempted to remove a locked vertex at ({}, {})",
            self.p.x,
            self.p.y
        );
        self.state = State::Removed;
    }

    fn is_locked(&self) -> bool {
        self.state == State::Locked
    }

    fn is_removed(&self) -> bool {
        self.state == State::Removed
    }

    fn to_f64(&self) -> (f64, f64) {
        (self.p.x as f64, self.p.y as f64)
    }
}

/// Shared vertex arena for one simplification pass (or one whole meld pass
/// when pre-seeded via [`Points::lock`]).
#[derive(Debug, Default)]
pub struct Points {
    points: Vec<VertexRecord>,
    index: HashMap<(i32, i32), usize>,
}

impl Points {
    pub fn new() -> Self {
        Points::default()
    }

    /// Register every point of `path` as locked. Points already known are
    /// left untouched, so locking is idempotent and never downgrades.
    pub fn lock(&mut self, path: &IntPolygon) {
        for &p in path {
            if self.index.contains_key(&(p.x, p.y)) {
                continue;
            }
            self.index.insert((p.x, p.y), self.points.len());
            self.points.push(VertexRecord {
                p,
                state: State::Locked,
            });
        }
    }

    /// Reduce every ring in `rings` against the shared arena.
    ///
    /// `detail` is the minimum feature size (in fixed-point units) below
    /// which geometry may be discarded. Rings left with fewer than three
    /// surviving points are dropped.
    pub fn simplify(&mut self, detail: f64, rings: &IntPolygons) -> IntPolygons {
        let mut out = Vec::new();

        for ring in rings {
            let indices = self.map(ring);
            if indices.len() < 3 {
                continue;
            }

            let mut kept = Vec::new();
            let s = self.split(&indices);
            self.simplify_range(detail, &indices, 0, s, &mut kept);
            self.simplify_range(detail, &indices, s, indices.len(), &mut kept);

            if kept.len() < 3 {
                continue;
            }

            out.push(kept.iter().map(|&k| self.points[k].p).collect());
        }

        out
    }

    /// Map ring points to identity-deduplicated arena indices, skipping
    /// coordinates already marked removed.
    fn map(&mut self, ring: &IntPolygon) -> Vec<usize> {
        let mut indices = Vec::with_capacity(ring.len());
        for &p in ring {
            if let Some(&k) = self.index.get(&(p.x, p.y)) {
                if self.points[k].is_removed() {
                    continue;
                }
                indices.push(k);
            } else {
                let k = self.points.len();
                self.index.insert((p.x, p.y), k);
                self.points.push(VertexRecord {
                    p,
                    state: State::Neutral,
                });
                indices.push(k);
            }
        }
        indices
    }

    /// Initial split point: the index farthest from the ring start, so the
    /// recursive core always works on open chains instead of a closed ring.
    fn split(&self, path: &[usize]) -> usize {
        if path.len() < 3 {
            return 0;
        }

        let p0 = self.points[path[0]].to_f64();

        let mut max_i = 0;
        let mut max_d = 0.0;

        for (i, &k) in path.iter().enumerate().skip(1) {
            let r = &self.points[k];
            if r.is_removed() {
                continue;
            }
            let p = r.to_f64();
            let (dx, dy) = (p.0 - p0.0, p.1 - p0.1);
            let d = dx * dx + dy * dy;
            if d > max_d {
                max_i = i;
                max_d = d;
            }
        }

        max_i
    }

    /// Recursive core over the open chain `path[begin..end]`.
    ///
    /// Siblings must observe each other's removed/locked transitions, which
    /// is why state lives in the shared arena rather than per call.
    fn simplify_range(
        &mut self,
        detail: f64,
        path: &[usize],
        begin: usize,
        end: usize,
        out: &mut Vec<usize>,
    ) {
        if end - begin < 3 {
            for &k in &path[begin..end] {
                let r = &mut self.points[k];
                if r.is_removed() {
                    continue;
                }
                r.lock();
                out.push(k);
            }
            return;
        }

        let mut n = end - 1;
        let p0 = self.points[path[begin]].to_f64();
        let mut pn = self.points[path[n]].to_f64();

        // Walk the chord endpoint backwards until the chord is at least
        // `detail` long. If the range collapses first, keep one
        // representative near the middle and drop the rest.
        loop {
            let (dx, dy) = (pn.0 - p0.0, pn.1 - p0.1);
            if dx * dx + dy * dy >= detail * detail {
                break;
            }

            if n - begin <= 2 {
                let mid = (begin + end) / 2;
                let mut chosen = None;
                let mut c = 0;
                while mid >= begin + c || mid + c < end {
                    if mid >= begin + c && !self.points[path[mid - c]].is_removed() {
                        chosen = Some(mid - c);
                        break;
                    }
                    if mid + c < end && !self.points[path[mid + c]].is_removed() {
                        chosen = Some(mid + c);
                        break;
                    }
                    c += 1;
                }
                if let Some(k) = chosen {
                    self.points[path[k]].lock();
                }

                for &k in &path[begin..end] {
                    if self.points[k].is_locked() {
                        out.push(k);
                    } else {
                        self.points[k].remove();
                    }
                }
                return;
            }

            n -= 1;
            pn = self.points[path[n]].to_f64();
        }

        let (cx, cy) = (pn.0 - p0.0, pn.1 - p0.1);
        let len = (cx * cx + cy * cy).sqrt();
        let dir = if len > 0.0 {
            (cx / len, cy / len)
        } else {
            (0.0, 0.0)
        };

        // Best unlocked deviation is the removal candidate; best unremoved
        // deviation is the split candidate. The removal bias is what makes
        // repeated passes converge instead of locking everything.
        let mut max_d = 0.0;
        let mut max_i = None;
        let mut split_d = 0.0;
        let mut split_i = None;

        for i in (begin + 1)..n {
            let r = &self.points[path[i]];
            let p = r.to_f64();

            let t = dir.0 * (p.0 - p0.0) + dir.1 * (p.1 - p0.1);
            let (ex, ey) = (p0.0 + dir.0 * t - p.0, p0.1 + dir.1 * t - p.1);
            let d = ex * ex + ey * ey;

            if !r.is_locked() && d > max_d {
                max_d = d;
                max_i = Some(i);
            }
            if !r.is_removed() && d > split_d {
                split_d = d;
                split_i = Some(i);
            }
        }

        if let Some(max_i) = max_i {
            if max_d < detail * detail {
                self.points[path[max_i]].remove();
                self.simplify_range(detail, path, begin, max_i, out);
                self.simplify_range(detail, path, max_i + 1, end, out);
                return;
            }
        }

        if let Some(split_i) = split_i {
            self.points[path[split_i]].lock();
            self.simplify_range(detail, path, begin, split_i, out);
            out.push(path[split_i]);
            self.simplify_range(detail, path, split_i + 1, end, out);
        } else {
            for &k in &path[begin..end] {
                let r = &mut self.points[k];
                if r.is_removed() {
                    continue;
                }
                r.lock();
                out.push(k);
            }
        }
    }
}
