use i_overlay::i_float::int::point::IntPoint;

/// A 2D point in model space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// RGBA color, components in 0..=1
pub type Color = [f32; 4];

/// One closed polygon ring in model space (no explicit closing duplicate)
pub type Polygon = Vec<Point>;

/// A set of polygon rings in model space
pub type Polygons = Vec<Polygon>;

/// One closed polygon ring in the fixed-point coordinate space shared by the
/// boolean and simplification stages. Exact coordinate equality on these
/// points is the vertex-identity relation melding depends on.
pub type IntPolygon = Vec<IntPoint>;

/// A set of fixed-point polygon rings
pub type IntPolygons = Vec<IntPolygon>;

/// Axis-aligned bounding rectangle. `Rect::default()` is the empty rectangle
/// at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub position: Point,
    pub size: Point,
}

impl Rect {
    pub fn new(position: Point, size: Point) -> Self {
        Rect { position, size }
    }

    /// Grow the rectangle so it covers `p`
    pub fn expand_to(&mut self, p: Point) {
        let mut begin = self.position;
        let mut end = Point::new(self.position.x + self.size.x, self.position.y + self.size.y);

        if p.x < begin.x {
            begin.x = p.x;
        }
        if p.y < begin.y {
            begin.y = p.y;
        }
        if p.x > end.x {
            end.x = p.x;
        }
        if p.y > end.y {
            end.y = p.y;
        }

        self.position = begin;
        self.size = Point::new(end.x - begin.x, end.y - begin.y);
    }
}

/// Twice the signed area of an integer ring (shoelace). Positive means
/// counter-clockwise, which is the convention for outer boundaries; holes
/// are clockwise (negative).
pub fn signed_area(ring: &[IntPoint]) -> i64 {
    let mut area = 0i64;
    for i in 0..ring.len() {
        let p = ring[i];
        let q = ring[(i + 1) % ring.len()];
        area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    area
}

/// Even-odd ray-cast point-in-polygon test
pub fn point_in_polygon(p: Point, ring: &[Point]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}
