use serde::{Deserialize, Serialize};

const CONTAIN_TOL: f64 = 1e-9;

/// A plane in world space that 2D sketch coordinates are placed on.
///
/// Sketch `(u, v)` maps to `origin + u * x_dir + v * y_dir` with
/// `y_dir = normal × x_dir`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Workplane {
    pub origin: [f64; 3],
    pub normal: [f64; 3],
    pub x_dir: [f64; 3],
}

impl Workplane {
    /// Build a workplane, normalizing both directions.
    pub fn new(origin: [f64; 3], normal: [f64; 3], x_dir: [f64; 3]) -> Self {
        Self {
            origin,
            normal: normalize(normal),
            x_dir: normalize(x_dir),
        }
    }

    /// The XY plane through the origin, normal +Z.
    pub fn xy() -> Self {
        Self::xy_at(0.0)
    }

    /// The XY plane lifted to height `z`.
    pub fn xy_at(z: f64) -> Self {
        Self::new([0.0, 0.0, z], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0])
    }

    /// The YZ plane through the origin, normal +X; sketch u runs along Y and v along Z.
    pub fn yz() -> Self {
        Self::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0])
    }

    pub fn y_dir(&self) -> [f64; 3] {
        cross(self.normal, self.x_dir)
    }

    /// Map a sketch point into world space.
    pub fn to_world(&self, p: [f64; 2]) -> [f64; 3] {
        let y = self.y_dir();
        [
            self.origin[0] + self.x_dir[0] * p[0] + y[0] * p[1],
            self.origin[1] + self.x_dir[1] * p[0] + y[1] * p[1],
            self.origin[2] + self.x_dir[2] * p[0] + y[2] * p[1],
        ]
    }

    /// The same plane moved `distance` along its normal.
    pub fn offset(&self, distance: f64) -> Self {
        Self {
            origin: [
                self.origin[0] + self.normal[0] * distance,
                self.origin[1] + self.normal[1] * distance,
                self.origin[2] + self.normal[2] * distance,
            ],
            ..*self
        }
    }
}

/// Whether a sketch item adds material or cuts it away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SketchMode {
    Add,
    Subtract,
}

/// A closed 2D shape in sketch coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SketchShape {
    Rect {
        center: [f64; 2],
        width: f64,
        height: f64,
    },
    Circle {
        center: [f64; 2],
        radius: f64,
    },
    Polygon {
        points: Vec<[f64; 2]>,
    },
}

impl SketchShape {
    /// Axis-aligned bounds as `[min_u, min_v, max_u, max_v]`.
    pub fn bounds(&self) -> [f64; 4] {
        match self {
            SketchShape::Rect {
                center,
                width,
                height,
            } => [
                center[0] - width / 2.0,
                center[1] - height / 2.0,
                center[0] + width / 2.0,
                center[1] + height / 2.0,
            ],
            SketchShape::Circle { center, radius } => [
                center[0] - radius,
                center[1] - radius,
                center[0] + radius,
                center[1] + radius,
            ],
            SketchShape::Polygon { points } => points.iter().fold(
                [f64::MAX, f64::MAX, f64::MIN, f64::MIN],
                |b, p| [b[0].min(p[0]), b[1].min(p[1]), b[2].max(p[0]), b[3].max(p[1])],
            ),
        }
    }

    pub fn area(&self) -> f64 {
        match self {
            SketchShape::Rect { width, height, .. } => width * height,
            SketchShape::Circle { radius, .. } => std::f64::consts::PI * radius * radius,
            SketchShape::Polygon { points } => shoelace_area(points).abs(),
        }
    }

    /// Area centroid of the shape.
    pub fn centroid(&self) -> [f64; 2] {
        match self {
            SketchShape::Rect { center, .. } | SketchShape::Circle { center, .. } => *center,
            SketchShape::Polygon { points } => polygon_centroid(points),
        }
    }

    /// Boundary points that must lie inside an enclosing shape for this shape to be contained.
    pub fn sample_points(&self) -> Vec<[f64; 2]> {
        match self {
            SketchShape::Rect { .. } => {
                let b = self.bounds();
                vec![[b[0], b[1]], [b[2], b[1]], [b[2], b[3]], [b[0], b[3]]]
            }
            SketchShape::Circle { center, radius } => vec![
                [center[0] + radius, center[1]],
                [center[0], center[1] + radius],
                [center[0] - radius, center[1]],
                [center[0], center[1] - radius],
            ],
            SketchShape::Polygon { points } => points.clone(),
        }
    }

    /// Whether a point lies inside or on the boundary of this shape.
    pub fn contains_point(&self, p: [f64; 2]) -> bool {
        match self {
            SketchShape::Circle { center, radius } => {
                ((p[0] - center[0]).powi(2) + (p[1] - center[1]).powi(2)).sqrt()
                    <= radius + CONTAIN_TOL
            }
            SketchShape::Rect { .. } => {
                let b = self.bounds();
                p[0] >= b[0] - CONTAIN_TOL
                    && p[1] >= b[1] - CONTAIN_TOL
                    && p[0] <= b[2] + CONTAIN_TOL
                    && p[1] <= b[3] + CONTAIN_TOL
            }
            SketchShape::Polygon { points } => point_in_polygon(p, points),
        }
    }

    /// Whether `other` lies entirely within this shape.
    pub fn contains(&self, other: &SketchShape) -> bool {
        match self {
            SketchShape::Circle { center, radius } => match other {
                SketchShape::Circle {
                    center: c,
                    radius: r,
                } => {
                    let d = ((c[0] - center[0]).powi(2) + (c[1] - center[1]).powi(2)).sqrt();
                    d + r <= radius + CONTAIN_TOL
                }
                _ => other.sample_points().iter().all(|p| {
                    ((p[0] - center[0]).powi(2) + (p[1] - center[1]).powi(2)).sqrt()
                        <= radius + CONTAIN_TOL
                }),
            },
            SketchShape::Rect { .. } => {
                let outer = self.bounds();
                let inner = other.bounds();
                inner[0] >= outer[0] - CONTAIN_TOL
                    && inner[1] >= outer[1] - CONTAIN_TOL
                    && inner[2] <= outer[2] + CONTAIN_TOL
                    && inner[3] <= outer[3] + CONTAIN_TOL
            }
            SketchShape::Polygon { points } => other
                .sample_points()
                .iter()
                .all(|p| point_in_polygon(*p, points)),
        }
    }
}

/// One shape placed in a sketch together with its mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchItem {
    pub shape: SketchShape,
    pub mode: SketchMode,
}

/// A connected planar region: one outer boundary with zero or more holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub outer: SketchShape,
    pub holes: Vec<SketchShape>,
}

impl Region {
    pub fn area(&self) -> f64 {
        self.outer.area() - self.holes.iter().map(SketchShape::area).sum::<f64>()
    }

    /// Area-weighted centroid with holes removed.
    pub fn centroid(&self) -> [f64; 2] {
        let area = self.area();
        let outer_area = self.outer.area();
        let oc = self.outer.centroid();
        if area.abs() < 1e-12 {
            return oc;
        }
        let mut m = [oc[0] * outer_area, oc[1] * outer_area];
        for hole in &self.holes {
            let (ha, hc) = (hole.area(), hole.centroid());
            m[0] -= hc[0] * ha;
            m[1] -= hc[1] * ha;
        }
        [m[0] / area, m[1] / area]
    }
}

/// A 2D sketch built from rectangles, circles and polygons, optionally
/// stamped at every location of a rectangular array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sketch {
    pub items: Vec<SketchItem>,
    #[serde(skip, default = "origin_locations")]
    locations: Vec<[f64; 2]>,
}

fn origin_locations() -> Vec<[f64; 2]> {
    vec![[0.0, 0.0]]
}

impl Default for Sketch {
    fn default() -> Self {
        Self::new()
    }
}

impl Sketch {
    /// An empty sketch whose current location is the origin.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            locations: origin_locations(),
        }
    }

    /// Replace the current locations with an `nx × ny` array centered on
    /// the origin at pitch `(x_spacing, y_spacing)`. A zero count leaves no
    /// locations, so following shapes are not placed at all.
    pub fn rarray(mut self, x_spacing: f64, y_spacing: f64, nx: u32, ny: u32) -> Self {
        self.locations = rarray_locations(x_spacing, y_spacing, nx, ny);
        self
    }

    /// Current stamping locations.
    pub fn locations(&self) -> &[[f64; 2]] {
        &self.locations
    }

    pub fn rect(mut self, width: f64, height: f64, mode: SketchMode) -> Self {
        for &center in &self.locations {
            self.items.push(SketchItem {
                shape: SketchShape::Rect {
                    center,
                    width,
                    height,
                },
                mode,
            });
        }
        self
    }

    pub fn circle(mut self, radius: f64, mode: SketchMode) -> Self {
        for &center in &self.locations {
            self.items.push(SketchItem {
                shape: SketchShape::Circle { center, radius },
                mode,
            });
        }
        self
    }

    /// Closed polygon through `points`, offset to every current location.
    pub fn polygon(mut self, points: &[[f64; 2]], mode: SketchMode) -> Self {
        for &loc in &self.locations {
            let moved = points
                .iter()
                .map(|p| [p[0] + loc[0], p[1] + loc[1]])
                .collect();
            self.items.push(SketchItem {
                shape: SketchShape::Polygon { points: moved },
                mode,
            });
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Resolve the sketch into connected regions.
    ///
    /// Each added shape starts a region. A subtracted shape becomes a hole of
    /// the most recent preceding region whose outer boundary contains it;
    /// a subtraction that no region contains has no effect.
    pub fn regions(&self) -> Vec<Region> {
        let mut regions: Vec<Region> = Vec::new();
        for item in &self.items {
            match item.mode {
                SketchMode::Add => regions.push(Region {
                    outer: item.shape.clone(),
                    holes: Vec::new(),
                }),
                SketchMode::Subtract => {
                    if let Some(region) = regions
                        .iter_mut()
                        .rev()
                        .find(|r| r.outer.contains(&item.shape))
                    {
                        region.holes.push(item.shape.clone());
                    }
                }
            }
        }
        regions
    }
}

/// Centered rectangular array of locations, X varying slowest.
pub fn rarray_locations(x_spacing: f64, y_spacing: f64, nx: u32, ny: u32) -> Vec<[f64; 2]> {
    let x0 = -(nx.saturating_sub(1) as f64) * x_spacing / 2.0;
    let y0 = -(ny.saturating_sub(1) as f64) * y_spacing / 2.0;
    let mut locs = Vec::with_capacity(nx as usize * ny as usize);
    for i in 0..nx {
        for j in 0..ny {
            locs.push([x0 + i as f64 * x_spacing, y0 + j as f64 * y_spacing]);
        }
    }
    locs
}

fn polygon_centroid(pts: &[[f64; 2]]) -> [f64; 2] {
    let a = shoelace_area(pts);
    if a.abs() < 1e-12 {
        let n = pts.len().max(1) as f64;
        let sum = pts.iter().fold([0.0, 0.0], |s, p| [s[0] + p[0], s[1] + p[1]]);
        return [sum[0] / n, sum[1] / n];
    }
    let n = pts.len();
    let (mut cx, mut cy) = (0.0, 0.0);
    for i in 0..n {
        let j = (i + 1) % n;
        let f = pts[i][0] * pts[j][1] - pts[j][0] * pts[i][1];
        cx += (pts[i][0] + pts[j][0]) * f;
        cy += (pts[i][1] + pts[j][1]) * f;
    }
    [cx / (6.0 * a), cy / (6.0 * a)]
}

/// Signed area of a 2D polygon using the shoelace formula.
pub fn shoelace_area(pts: &[[f64; 2]]) -> f64 {
    let n = pts.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += pts[i][0] * pts[j][1];
        area -= pts[j][0] * pts[i][1];
    }
    area / 2.0
}

fn point_in_polygon(p: [f64; 2], poly: &[[f64; 2]]) -> bool {
    // Boundary points count as inside.
    let n = poly.len();
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        let cross = (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0]);
        let within = p[0] >= a[0].min(b[0]) - CONTAIN_TOL
            && p[0] <= a[0].max(b[0]) + CONTAIN_TOL
            && p[1] >= a[1].min(b[1]) - CONTAIN_TOL
            && p[1] <= a[1].max(b[1]) + CONTAIN_TOL;
        if cross.abs() < CONTAIN_TOL && within {
            return true;
        }
    }

    let mut inside = false;
    let mut j = n.saturating_sub(1);
    for i in 0..n {
        let (pi, pj) = (poly[i], poly[j]);
        if (pi[1] > p[1]) != (pj[1] > p[1]) {
            let x_cross = pj[0] + (p[1] - pj[1]) / (pi[1] - pj[1]) * (pi[0] - pj[0]);
            if p[0] < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize(v: [f64; 3]) -> [f64; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len < 1e-12 {
        v
    } else {
        [v[0] / len, v[1] / len, v[2] / len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rarray_is_centered() {
        let locs = rarray_locations(16.0, 16.0, 2, 4);
        assert_eq!(locs.len(), 8);
        assert_eq!(locs[0], [-8.0, -24.0]);
        assert_eq!(locs[7], [8.0, 24.0]);
    }

    #[test]
    fn rarray_with_zero_count_is_empty() {
        assert!(rarray_locations(16.0, 16.0, 0, 3).is_empty());
        let sketch = Sketch::new().rarray(16.0, 16.0, 0, 3).circle(1.0, SketchMode::Add);
        assert!(sketch.is_empty());
    }

    #[test]
    fn ring_with_tubes_resolves_into_separate_regions() {
        let sketch = Sketch::new()
            .rect(31.6, 63.6, SketchMode::Add)
            .rect(29.2, 61.2, SketchMode::Subtract)
            .rarray(16.0, 16.0, 1, 3)
            .circle(6.65, SketchMode::Add)
            .circle(5.65, SketchMode::Subtract);

        let regions = sketch.regions();
        assert_eq!(regions.len(), 4, "ring plus three tubes");
        assert_eq!(regions[0].holes.len(), 1, "ring has the cavity as its only hole");
        for tube in &regions[1..] {
            assert!(matches!(tube.outer, SketchShape::Circle { radius, .. } if radius == 6.65));
            assert_eq!(tube.holes.len(), 1);
        }
    }

    #[test]
    fn region_area_subtracts_holes() {
        let region = Region {
            outer: SketchShape::Rect {
                center: [0.0, 0.0],
                width: 4.0,
                height: 2.0,
            },
            holes: vec![SketchShape::Rect {
                center: [0.0, 0.0],
                width: 2.0,
                height: 1.0,
            }],
        };
        assert!((region.area() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn triangle_centroid() {
        let tri = SketchShape::Polygon {
            points: vec![[0.0, 0.0], [3.0, 0.0], [0.0, 3.0]],
        };
        let c = tri.centroid();
        assert!((c[0] - 1.0).abs() < 1e-12 && (c[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn polygon_contains_inner_points() {
        let square = SketchShape::Polygon {
            points: vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]],
        };
        let inner = SketchShape::Circle {
            center: [2.0, 2.0],
            radius: 1.0,
        };
        let outside = SketchShape::Circle {
            center: [5.0, 2.0],
            radius: 0.5,
        };
        assert!(square.contains(&inner));
        assert!(!square.contains(&outside));
    }

    #[test]
    fn yz_plane_maps_u_to_y_and_v_to_z() {
        let plane = Workplane::yz();
        assert_eq!(plane.to_world([3.0, 5.0]), [0.0, 3.0, 5.0]);
    }

    #[test]
    fn offset_moves_along_normal() {
        let plane = Workplane::xy().offset(-2.5);
        assert_eq!(plane.origin, [0.0, 0.0, -2.5]);
    }
}
