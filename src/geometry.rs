//! 計算領域の幾何形状。
//!
//! 長方形・多角形と、その差集合 (CSG difference) を表し、
//! 内部点と境界点のランダムサンプリングを提供します。

use crate::airfoil::Point;
use crate::error::{PinnError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// 1点あたりの棄却サンプリング試行回数の上限
const MAX_ATTEMPTS_PER_POINT: usize = 1000;

/// `numpy.isclose` と同じ既定の許容誤差で比較します。
pub fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-8 + 1e-5 * b.abs()
}

/// 軸に平行な長方形
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub min: Point,
    pub max: Point,
}

impl Rectangle {
    pub fn new(min: Point, max: Point) -> Result<Self> {
        let rect = Self { min, max };
        rect.validate()?;
        Ok(rect)
    }

    /// 各辺の長さが正であることを確認します。
    pub fn validate(&self) -> Result<()> {
        let finite = self.min.iter().chain(&self.max).all(|v| v.is_finite());
        if !finite || self.min[0] >= self.max[0] || self.min[1] >= self.max[1] {
            return Err(PinnError::InvalidConfig(format!(
                "長方形の範囲が不正です: min = {:?}, max = {:?}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    /// 境界を含めて点が内側にあるか
    pub fn contains(&self, p: Point) -> bool {
        p[0] >= self.min[0] && p[0] <= self.max[0] && p[1] >= self.min[1] && p[1] <= self.max[1]
    }

    /// 他の長方形を完全に含むか
    pub fn contains_rect(&self, other: &Rectangle) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    pub fn on_boundary(&self, p: Point) -> bool {
        let within_x = p[0] >= self.min[0] - 1e-8 && p[0] <= self.max[0] + 1e-8;
        let within_y = p[1] >= self.min[1] - 1e-8 && p[1] <= self.max[1] + 1e-8;
        let on_vertical = is_close(p[0], self.min[0]) || is_close(p[0], self.max[0]);
        let on_horizontal = is_close(p[1], self.min[1]) || is_close(p[1], self.max[1]);
        (on_vertical && within_y) || (on_horizontal && within_x)
    }

    /// 内部の一様乱数点
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Point {
        [
            self.min[0] + rng.random::<f64>() * self.width(),
            self.min[1] + rng.random::<f64>() * self.height(),
        ]
    }

    /// 周上に一様分布する境界点を生成します。
    pub fn random_boundary_points<R: Rng>(&self, n: usize, rng: &mut R) -> Vec<Point> {
        let (w, h) = (self.width(), self.height());
        let perimeter = 2.0 * (w + h);
        (0..n)
            .map(|_| {
                let s = rng.random::<f64>() * perimeter;
                if s < w {
                    [self.min[0] + s, self.min[1]]
                } else if s < w + h {
                    [self.max[0], self.min[1] + (s - w)]
                } else if s < 2.0 * w + h {
                    [self.max[0] - (s - w - h), self.max[1]]
                } else {
                    [self.min[0], self.max[1] - (s - 2.0 * w - h)]
                }
            })
            .collect()
    }
}

/// 頂点列で与えられる単純多角形。最後の頂点と最初の頂点は暗黙に結ばれます。
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// 偶奇規則による内外判定
    pub fn contains(&self, p: Point) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a[1] > p[1]) != (b[1] > p[1]) {
                let x_cross = a[0] + (p[1] - a[1]) / (b[1] - a[1]) * (b[0] - a[0]);
                if p[0] < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    pub fn bounding_box(&self) -> Rectangle {
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for v in &self.vertices {
            for k in 0..2 {
                min[k] = min[k].min(v[k]);
                max[k] = max[k].max(v[k]);
            }
        }
        Rectangle { min, max }
    }

    /// 隣接しない辺どうしが交差しないかを調べます。
    pub fn is_simple(&self) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let edges: Vec<(Point, Point)> = self.edges().collect();
        for i in 0..n {
            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue;
                }
                let (a, b) = edges[i];
                let (c, d) = edges[j];
                if segments_intersect(a, b, c, d) {
                    return false;
                }
            }
        }
        true
    }
}

fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p[0] >= a[0].min(b[0]) && p[0] <= a[0].max(b[0]) && p[1] >= a[1].min(b[1]) && p[1] <= a[1].max(b[1])
}

fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let d1 = orientation(c, d, a);
    let d2 = orientation(c, d, b);
    let d3 = orientation(a, b, c);
    let d4 = orientation(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    (d1 == 0.0 && on_segment(c, d, a))
        || (d2 == 0.0 && on_segment(c, d, b))
        || (d3 == 0.0 && on_segment(a, b, c))
        || (d4 == 0.0 && on_segment(a, b, d))
}

/// 構成的幾何 (CSG) による領域
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Rectangle(Rectangle),
    Polygon(Polygon),
    /// 左の領域から右の領域を取り除いたもの
    Difference(Box<Geometry>, Box<Geometry>),
}

impl Geometry {
    /// `self - other` を作ります。
    pub fn difference(self, other: Geometry) -> Geometry {
        Geometry::Difference(Box::new(self), Box::new(other))
    }

    pub fn contains(&self, p: Point) -> bool {
        match self {
            Geometry::Rectangle(r) => r.contains(p),
            Geometry::Polygon(poly) => poly.contains(p),
            Geometry::Difference(a, b) => a.contains(p) && !b.contains(p),
        }
    }

    pub fn bounding_box(&self) -> Rectangle {
        match self {
            Geometry::Rectangle(r) => *r,
            Geometry::Polygon(poly) => poly.bounding_box(),
            Geometry::Difference(a, _) => a.bounding_box(),
        }
    }

    /// 外接長方形からの棄却サンプリングで内部点を生成します。
    pub fn random_points<R: Rng>(&self, n: usize, rng: &mut R) -> Result<Vec<Point>> {
        let bbox = self.bounding_box();
        bbox.validate()?;
        let mut points = Vec::with_capacity(n);
        let max_attempts = n.saturating_mul(MAX_ATTEMPTS_PER_POINT);
        let mut attempts = 0;
        while points.len() < n {
            if attempts >= max_attempts {
                return Err(PinnError::InvalidConfig(format!(
                    "領域内の点を {} 個生成できませんでした ({} 個で打ち切り)",
                    n,
                    points.len()
                )));
            }
            attempts += 1;
            let p = bbox.sample(rng);
            if self.contains(p) {
                points.push(p);
            }
        }
        Ok(points)
    }
}
