//! Tessellation of closed cubic-Bézier outlines into flat-shaded polygon
//! meshes.
//!
//! The pipeline per shape: adaptively flatten curves into fixed-point
//! polylines ([`flatten`]), boolean-resolve them into simple fill rings
//! under the shape's fill rule and expand strokes by Minkowski summation
//! ([`boolean`]), reduce vertex density with a vertex-identity-aware
//! simplifier ([`simplify`]), and partition away holes for rendering
//! ([`partition`]). The [`Tessellator`] caches results per shape and, when
//! melding is enabled, shares one vertex-identity map across the whole
//! scene so independently-authored shapes that touch stay seamless after
//! simplification.

pub mod boolean;
pub mod error;
pub mod flatten;
pub mod geometry;
pub mod partition;
pub mod shape;
pub mod simplify;
pub mod tessellator;

pub use error::Error;
pub use geometry::{Color, IntPolygon, IntPolygons, Point, Polygon, Polygons, Rect};
pub use shape::{FillRule, Shape, ShapeSource, ShapeStore, SubPath};
pub use simplify::Points;
pub use tessellator::{Tessellation, TessellationParameters, Tessellator};
