//! 翼型まわりの問題の組み立て。
//!
//! 遠方境界から翼型を差し引いた領域を作り、翼型近傍の細分化領域とその外側から
//! 内部点を、遠方境界と翼面から境界点を集めます。

use crate::airfoil::Point;
use crate::boundary::BoundaryRegion;
use crate::config::ProblemConfig;
use crate::error::{PinnError, Result};
use crate::geometry::{Geometry, Polygon, Rectangle};
use burn::tensor::Tensor;
use burn::tensor::backend::Backend;
use log::debug;
use rand::Rng;

/// 問題の幾何形状
#[derive(Debug, Clone)]
pub struct ProblemGeometry {
    pub farfield: Rectangle,
    pub airfoil: Polygon,
    /// 遠方境界 − 翼型
    pub domain: Geometry,
    /// 細分化領域 − 翼型
    pub inner: Geometry,
    /// (遠方境界 − 細分化領域) − 翼型
    pub outer: Geometry,
}

impl ProblemGeometry {
    pub fn from_config(config: &ProblemConfig) -> Result<Self> {
        let farfield = config.domain;
        let airfoil = Polygon::new(config.airfoil.contour(config.airfoil.geometry_points)?);
        let far = Geometry::Rectangle(farfield);
        let foil = Geometry::Polygon(airfoil.clone());
        let refinement = Geometry::Rectangle(config.refinement);

        Ok(Self {
            farfield,
            domain: far.clone().difference(foil.clone()),
            inner: refinement.clone().difference(foil.clone()),
            outer: far.difference(refinement).difference(foil),
            airfoil,
        })
    }
}

/// 残差を評価する点の集合
#[derive(Debug, Clone)]
pub struct CollocationSet {
    pub inner: Vec<Point>,
    pub outer: Vec<Point>,
    pub farfield: Vec<Point>,
    /// 翼面上のアンカー点 (翼型輪郭の頂点)
    pub airfoil: Vec<Point>,
}

impl CollocationSet {
    pub fn assemble<R: Rng>(
        config: &ProblemConfig,
        geometry: &ProblemGeometry,
        rng: &mut R,
    ) -> Result<Self> {
        let sampling = &config.sampling;
        let inner = geometry.inner.random_points(sampling.inner_points, rng)?;
        let outer = geometry.outer.random_points(sampling.outer_points, rng)?;
        let farfield = geometry
            .farfield
            .random_boundary_points(sampling.farfield_points, rng);
        let airfoil = config.airfoil.contour(config.airfoil.anchor_points)?;
        debug!(
            "点を生成しました: 内側 {}, 外側 {}, 遠方境界 {}, 翼面 {}",
            inner.len(),
            outer.len(),
            farfield.len(),
            airfoil.len()
        );
        Ok(Self {
            inner,
            outer,
            farfield,
            airfoil,
        })
    }

    pub fn len(&self) -> usize {
        self.inner.len() + self.outer.len() + self.farfield.len() + self.airfoil.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// すべての点 (内側, 外側, 遠方境界, 翼面の順)
    pub fn all(&self) -> Vec<Point> {
        self.groups().into_iter().flat_map(|(_, pts)| pts.iter().copied()).collect()
    }

    /// 名前付きの点群
    pub fn groups(&self) -> [(&'static str, &[Point]); 4] {
        [
            ("inner", self.inner.as_slice()),
            ("outer", self.outer.as_slice()),
            ("farfield", self.farfield.as_slice()),
            ("airfoil", self.airfoil.as_slice()),
        ]
    }

    /// 指定した境界区分に属する境界点
    pub fn boundary_points(&self, region: BoundaryRegion, farfield: &Rectangle) -> Vec<Point> {
        self.farfield
            .iter()
            .chain(&self.airfoil)
            .copied()
            .filter(|&p| region.contains(p, farfield, true))
            .collect()
    }
}

/// 点列を `[N, 2]` のテンソルにします。
pub fn points_to_tensor<B: Backend>(points: &[Point], device: &B::Device) -> Tensor<B, 2> {
    let flat: Vec<f64> = points.iter().flatten().copied().collect();
    let coords_1d = Tensor::<B, 1>::from_floats(flat.as_slice(), device);
    coords_1d.reshape([points.len(), 2])
}

/// テンソルの値を `f64` の列として取り出します。
pub fn tensor_values<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f64>> {
    tensor
        .into_data()
        .convert::<f64>()
        .to_vec::<f64>()
        .map_err(|e| PinnError::Data(format!("{:?}", e)))
}
