//! Polygon union areas.
//!
//! Walls sharing a pattern are merged into one region so overlapping walls
//! are filled and stroked as a single seamless outline.

use csgrs::sketch::Sketch;
use csgrs::traits::CSG;
use floorkit_core::geometry::{polygon_signed_area, Point, Rect};
use floorkit_core::GeometryError;
use lyon::math::point;
use lyon::path::Path;
use std::fmt;

/// Closed ring of an area, either an outer boundary or a hole.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub points: Vec<Point>,
    pub hole: bool,
}

/// Union of polygons, kept both as a CSG sketch and as flattened rings.
#[derive(Clone)]
pub struct PlanArea {
    sketch: Sketch<()>,
    rings: Vec<Ring>,
}

impl Default for PlanArea {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for PlanArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanArea").field("rings", &self.rings).finish()
    }
}

impl PlanArea {
    pub fn empty() -> Self {
        Self {
            sketch: Sketch::new(),
            rings: Vec::new(),
        }
    }

    /// Area enclosed by a single polygon.
    pub fn from_polygon(points: &[Point]) -> Result<Self, GeometryError> {
        let sketch = polygon_sketch(points)?;
        Ok(Self::from_sketch(sketch))
    }

    /// Union of `polygons`; polygons with fewer than 3 points are skipped.
    pub fn union_of<'a, I>(polygons: I) -> Self
    where
        I: IntoIterator<Item = &'a [Point]>,
    {
        let mut sketch: Sketch<()> = Sketch::new();
        let mut count = 0;
        for polygon in polygons {
            if let Ok(s) = polygon_sketch(polygon) {
                sketch = if count == 0 { s } else { sketch.union(&s) };
                count += 1;
            }
        }
        if count == 0 {
            return Self::empty();
        }
        Self::from_sketch(sketch)
    }

    /// Union of this area with another one.
    pub fn union(&self, other: &PlanArea) -> PlanArea {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        Self::from_sketch(self.sketch.union(&other.sketch))
    }

    fn from_sketch(sketch: Sketch<()>) -> Self {
        let mut rings = Vec::new();
        let mp = sketch.to_multipolygon();
        for poly in mp.0 {
            let exterior = ring_points(poly.exterior().0.iter().map(|c| (c.x, c.y)));
            if exterior.len() >= 3 {
                rings.push(Ring {
                    points: exterior,
                    hole: false,
                });
            }
            for interior in poly.interiors() {
                let hole = ring_points(interior.0.iter().map(|c| (c.x, c.y)));
                if hole.len() >= 3 {
                    rings.push(Ring {
                        points: hole,
                        hole: true,
                    });
                }
            }
        }
        Self { sketch, rings }
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Surface of the region: outer rings minus holes.
    pub fn area(&self) -> f32 {
        self.rings
            .iter()
            .map(|r| {
                let a = polygon_signed_area(&r.points).abs();
                if r.hole {
                    -a
                } else {
                    a
                }
            })
            .sum()
    }

    /// Even-odd containment test over all rings.
    pub fn contains(&self, p: &Point) -> bool {
        self.rings
            .iter()
            .filter(|r| floorkit_core::geometry::polygon_contains(&r.points, p))
            .count()
            % 2
            == 1
    }

    pub fn bounds(&self) -> Option<Rect> {
        Rect::from_points(self.rings.iter().flat_map(|r| r.points.iter()))
    }

    /// Closed lyon path of every ring, in model coordinates.
    pub fn to_path(&self) -> Path {
        let mut builder = Path::builder();
        for ring in &self.rings {
            let mut first = true;
            for p in &ring.points {
                let p = point(p.x, p.y);
                if first {
                    builder.begin(p);
                    first = false;
                } else {
                    builder.line_to(p);
                }
            }
            if !first {
                builder.close();
            }
        }
        builder.build()
    }
}

fn polygon_sketch(points: &[Point]) -> Result<Sketch<()>, GeometryError> {
    if points.len() < 3 || polygon_signed_area(points).abs() <= f32::EPSILON {
        return Err(GeometryError::DegeneratePolygon {
            points: points.len(),
        });
    }
    let pts: Vec<[f64; 2]> = points.iter().map(|p| [p.x as f64, p.y as f64]).collect();
    Ok(Sketch::polygon(&pts, None))
}

/// Converts a closed geo ring to points, dropping the repeated closing point.
fn ring_points(coords: impl Iterator<Item = (f64, f64)>) -> Vec<Point> {
    let mut points: Vec<Point> = coords.map(|(x, y)| Point::new(x as f32, y as f32)).collect();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}
