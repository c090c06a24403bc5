//! NACA 4桁翼型の輪郭生成。
//!
//! 翼弦を余弦分割し、厚み分布とキャンバーラインから上下面の座標を求めて、
//! 後縁(下面) → 前縁 → 後縁(上面) の順に並んだ閉じた多角形を返します。

use crate::error::{PinnError, Result};
use std::f64::consts::PI;

/// 2次元の点 `[x, y]`
pub type Point = [f64; 2];

/// 厚み分布多項式の係数 (√ξ, ξ, ξ², ξ³, ξ⁴)
const THICKNESS_COEFFS: [f64; 5] = [0.2969, -0.1260, -0.3516, 0.2843, -0.1015];

/// NACA 4桁翼型の形状パラメータ。
///
/// 値は番号の桁そのまま (最大キャンバー[%], 最大キャンバー位置[1/10], 最大翼厚[%]) で保持します。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Naca4 {
    max_camber_pct: f64,
    camber_pos_tenths: f64,
    max_thickness_pct: f64,
}

/// キャンバーラインの区分。最大キャンバー位置の前後で式が切り替わります。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CamberRegime {
    /// 前縁から最大キャンバー位置まで (境界を含む)
    Forward,
    /// 最大キャンバー位置より後ろ
    Aft,
}

impl CamberRegime {
    fn locate(x: f64, p: f64, chord: f64) -> Self {
        if x <= p * chord {
            CamberRegime::Forward
        } else {
            CamberRegime::Aft
        }
    }

    /// 無次元位置 `xi` におけるキャンバー高さ (翼弦長でスケール済み)
    fn camber(self, m: f64, p: f64, xi: f64, chord: f64) -> f64 {
        match self {
            CamberRegime::Forward => chord * (m / (p * p) * xi * (2.0 * p - xi)),
            CamberRegime::Aft => {
                let q = 1.0 - p;
                chord * (m / (q * q) * (1.0 + (2.0 * p - xi) * xi - 2.0 * p))
            }
        }
    }

    fn slope(self, m: f64, p: f64, xi: f64) -> f64 {
        match self {
            CamberRegime::Forward => m / (p * p) * 2.0 * (p - xi),
            CamberRegime::Aft => {
                let q = 1.0 - p;
                m / (q * q) * 2.0 * (p - xi)
            }
        }
    }
}

/// 翼弦上の1ステーションでの諸量
#[derive(Debug, Clone, Copy)]
struct Station {
    x: f64,
    half_thickness: f64,
    camber: f64,
    slope: f64,
}

impl Station {
    fn upper(&self) -> Point {
        let theta = self.slope.atan2(1.0);
        [
            self.x - self.half_thickness * theta.sin(),
            self.camber + self.half_thickness * theta.cos(),
        ]
    }

    fn lower(&self) -> Point {
        let theta = self.slope.atan2(1.0);
        [
            self.x + self.half_thickness * theta.sin(),
            self.camber - self.half_thickness * theta.cos(),
        ]
    }
}

impl Naca4 {
    /// 形状パラメータを検証して翼型を作成します。
    pub fn new(max_camber_pct: f64, camber_pos_tenths: f64, max_thickness_pct: f64) -> Result<Self> {
        let naca = Self {
            max_camber_pct,
            camber_pos_tenths,
            max_thickness_pct,
        };
        naca.validate()?;
        Ok(naca)
    }

    fn validate(&self) -> Result<()> {
        let Self {
            max_camber_pct,
            camber_pos_tenths,
            max_thickness_pct,
        } = *self;
        if !max_camber_pct.is_finite() || max_camber_pct < 0.0 {
            return Err(PinnError::shape(
                "max_camber_pct",
                max_camber_pct,
                "0以上の有限値である必要があります",
            ));
        }
        if !max_thickness_pct.is_finite() || max_thickness_pct <= 0.0 {
            return Err(PinnError::shape(
                "max_thickness_pct",
                max_thickness_pct,
                "正の有限値である必要があります",
            ));
        }
        if max_camber_pct > 0.0
            && (!camber_pos_tenths.is_finite()
                || camber_pos_tenths <= 0.0
                || camber_pos_tenths > 10.0)
        {
            return Err(PinnError::shape(
                "camber_pos_tenths",
                camber_pos_tenths,
                "キャンバーがある場合は 0 < p <= 10 である必要があります",
            ));
        }
        Ok(())
    }

    /// 最大キャンバー [%]
    pub fn max_camber_pct(&self) -> f64 {
        self.max_camber_pct
    }

    /// 最大キャンバー位置 [1/10 翼弦]
    pub fn camber_pos_tenths(&self) -> f64 {
        self.camber_pos_tenths
    }

    /// 最大翼厚 [%]
    pub fn max_thickness_pct(&self) -> f64 {
        self.max_thickness_pct
    }

    /// "2412" のような4桁番号から翼型を作成します。
    pub fn from_designation(code: &str) -> Result<Self> {
        let code = code.trim();
        let digits: Vec<u32> = code.chars().filter_map(|c| c.to_digit(10)).collect();
        if code.len() != 4 || digits.len() != 4 {
            return Err(PinnError::InvalidDesignation(code.to_string()));
        }
        let thickness = digits[2] * 10 + digits[3];
        Self::new(digits[0] as f64, digits[1] as f64, thickness as f64)
            .map_err(|_| PinnError::InvalidDesignation(code.to_string()))
    }

    /// 対称翼 (キャンバーなし) かどうか
    pub fn is_symmetric(&self) -> bool {
        self.max_camber_pct == 0.0
    }

    /// 正規化したパラメータ `(m, p, t)`。キャンバーが0の場合は `p = 1` とします。
    fn normalized(&self) -> (f64, f64, f64) {
        let m = self.max_camber_pct / 100.0;
        let t = self.max_thickness_pct / 100.0;
        let p = if m == 0.0 {
            1.0
        } else {
            self.camber_pos_tenths / 10.0
        };
        (m, p, t)
    }

    /// 位置 `x` における半翼厚
    pub fn half_thickness(&self, x: f64, chord: f64) -> f64 {
        let (_, _, t) = self.normalized();
        let xi = x / chord;
        let poly = THICKNESS_COEFFS[0] * xi.sqrt()
            + xi * (THICKNESS_COEFFS[1]
                + xi * (THICKNESS_COEFFS[2] + xi * (THICKNESS_COEFFS[3] + xi * THICKNESS_COEFFS[4])));
        5.0 * t * chord * poly
    }

    /// 位置 `x` におけるキャンバー高さと傾き `(yc, dyc/dx)`
    pub fn camber_line(&self, x: f64, chord: f64) -> (f64, f64) {
        let (m, p, _) = self.normalized();
        let xi = x / chord;
        let regime = CamberRegime::locate(x, p, chord);
        (regime.camber(m, p, xi, chord), regime.slope(m, p, xi))
    }

    /// 翼型の輪郭を `2 * num_points + 1` 点の多角形として生成します。
    pub fn contour(&self, chord: f64, num_points: usize, offset: Point) -> Result<Vec<Point>> {
        self.validate()?;
        if !chord.is_finite() || chord <= 0.0 {
            return Err(PinnError::shape("chord", chord, "正の有限値である必要があります"));
        }
        if num_points == 0 {
            return Err(PinnError::shape("num_points", 0.0, "1以上である必要があります"));
        }
        if !offset.iter().all(|v| v.is_finite()) {
            return Err(PinnError::shape("offset", f64::NAN, "有限値である必要があります"));
        }

        let stations: Vec<Station> = cosine_stations(chord, num_points)
            .into_iter()
            .map(|x| {
                let (camber, slope) = self.camber_line(x, chord);
                Station {
                    x,
                    half_thickness: self.half_thickness(x, chord),
                    camber,
                    slope,
                }
            })
            .collect();

        let translate = |[x, y]: Point| [x + offset[0], y + offset[1]];
        let lower = stations[1..].iter().rev().map(Station::lower);
        let upper = stations.iter().map(Station::upper);
        Ok(lower.chain(upper).map(translate).collect())
    }
}

/// 翼弦 `[0, chord]` を余弦分割した `n + 1` 個のステーション。
///
/// 前縁と後縁の近くほど点が密になります。`n = 0` の場合は前縁のみを返します。
pub fn cosine_stations(chord: f64, n: usize) -> Vec<f64> {
    if n == 0 {
        return vec![0.0];
    }
    (0..=n)
        .map(|i| {
            let s = chord * i as f64 / n as f64;
            chord / 2.0 * (1.0 - (PI * s / chord).cos())
        })
        .collect()
}

/// NACA 4桁翼型の輪郭点列を生成します。
///
/// 下面を後縁から前縁へ、続けて上面を前縁から後縁へ並べ、`(offset_x, offset_y)` だけ平行移動します。
pub fn generate_airfoil(
    max_camber_pct: f64,
    camber_pos_tenths: f64,
    max_thickness_pct: f64,
    chord: f64,
    num_points: usize,
    offset_x: f64,
    offset_y: f64,
) -> Result<Vec<Point>> {
    Naca4::new(max_camber_pct, camber_pos_tenths, max_thickness_pct)?.contour(
        chord,
        num_points,
        [offset_x, offset_y],
    )
}
