//! 問題設定。
//!
//! 既定値は翼型まわりの定常流れ (ρ = 1.0, μ = 0.02, U∞ = 1.0) と
//! 遠方境界 [0, 1] × [0, 0.7] に合わせてあります。JSONファイルから部分的に上書きできます。

use crate::airfoil::{Naca4, Point};
use crate::error::{PinnError, Result};
use crate::geometry::{Polygon, Rectangle};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 流体の物性値と流入速度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluidProperties {
    /// 密度 ρ
    pub density: f64,
    /// 粘性係数 μ
    pub viscosity: f64,
    /// 流入速度 U∞
    pub inlet_velocity: f64,
}

impl Default for FluidProperties {
    fn default() -> Self {
        Self {
            density: 1.0,
            viscosity: 0.02,
            inlet_velocity: 1.0,
        }
    }
}

/// 翼型の形状と配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirfoilSpec {
    pub max_camber_pct: f64,
    pub camber_pos_tenths: f64,
    pub max_thickness_pct: f64,
    pub chord: f64,
    /// 前縁の位置
    pub offset: Point,
    /// 領域の差集合に使う輪郭の分割数
    pub geometry_points: usize,
    /// 境界条件用アンカー点の分割数
    pub anchor_points: usize,
}

impl Default for AirfoilSpec {
    fn default() -> Self {
        Self {
            max_camber_pct: 0.0,
            camber_pos_tenths: 0.0,
            max_thickness_pct: 12.0,
            chord: 0.2,
            offset: [0.20, 0.35],
            geometry_points: 250,
            anchor_points: 125,
        }
    }
}

impl AirfoilSpec {
    pub fn naca(&self) -> Result<Naca4> {
        Naca4::new(
            self.max_camber_pct,
            self.camber_pos_tenths,
            self.max_thickness_pct,
        )
    }

    /// 4桁番号で形状パラメータを置き換えます。
    pub fn set_designation(&mut self, code: &str) -> Result<()> {
        let naca = Naca4::from_designation(code)?;
        self.max_camber_pct = naca.max_camber_pct();
        self.camber_pos_tenths = naca.camber_pos_tenths();
        self.max_thickness_pct = naca.max_thickness_pct();
        Ok(())
    }

    /// 分割数 `n` の輪郭
    pub fn contour(&self, n: usize) -> Result<Vec<Point>> {
        self.naca()?.contour(self.chord, n, self.offset)
    }
}

/// サンプリング点数と乱数シード
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// 細分化領域内の点数
    pub inner_points: usize,
    /// 細分化領域外の点数
    pub outer_points: usize,
    /// 遠方境界上の点数
    pub farfield_points: usize,
    pub seed: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            inner_points: 10000,
            outer_points: 10000,
            farfield_points: 1280,
            seed: 48,
        }
    }
}

/// ネットワークの構成 (入力2, 出力5)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub hidden_width: usize,
    pub hidden_layers: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            hidden_width: 40,
            hidden_layers: 8,
        }
    }
}

/// 問題全体の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProblemConfig {
    pub fluid: FluidProperties,
    /// 遠方境界
    pub domain: Rectangle,
    pub airfoil: AirfoilSpec,
    /// 翼型まわりで点を密にする領域
    pub refinement: Rectangle,
    pub sampling: SamplingConfig,
    pub network: NetworkConfig,
}

impl Default for ProblemConfig {
    fn default() -> Self {
        Self {
            fluid: FluidProperties::default(),
            domain: Rectangle {
                min: [0.0, 0.0],
                max: [1.0, 0.7],
            },
            airfoil: AirfoilSpec::default(),
            refinement: Rectangle {
                min: [0.15, 0.28],
                max: [0.28, 0.42],
            },
            sampling: SamplingConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

impl ProblemConfig {
    /// JSONファイルから読み込みます。省略した項目は既定値になります。
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: ProblemConfig = serde_json::from_str(&text)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let fluid = &self.fluid;
        if !(fluid.density.is_finite() && fluid.density > 0.0) {
            return Err(PinnError::InvalidConfig(format!(
                "密度は正である必要があります: {}",
                fluid.density
            )));
        }
        if !(fluid.viscosity.is_finite() && fluid.viscosity > 0.0) {
            return Err(PinnError::InvalidConfig(format!(
                "粘性係数は正である必要があります: {}",
                fluid.viscosity
            )));
        }
        if !fluid.inlet_velocity.is_finite() {
            return Err(PinnError::InvalidConfig(format!(
                "流入速度が不正です: {}",
                fluid.inlet_velocity
            )));
        }

        self.domain.validate()?;
        self.refinement.validate()?;
        if !self.domain.contains_rect(&self.refinement) {
            return Err(PinnError::InvalidConfig(
                "細分化領域が遠方境界の外にはみ出しています".to_string(),
            ));
        }

        if self.airfoil.anchor_points == 0 {
            return Err(PinnError::InvalidConfig(
                "anchor_points は1以上である必要があります".to_string(),
            ));
        }
        let outline = Polygon::new(self.airfoil.contour(self.airfoil.geometry_points)?);
        let bbox = outline.bounding_box();
        let touches = self.domain.on_boundary(bbox.min) || self.domain.on_boundary(bbox.max);
        if !self.domain.contains_rect(&bbox) || touches {
            return Err(PinnError::InvalidConfig(
                "翼型が遠方境界の内側に収まっていません".to_string(),
            ));
        }

        if self.network.hidden_width == 0 || self.network.hidden_layers == 0 {
            return Err(PinnError::InvalidConfig(
                "隠れ層の幅と数は1以上である必要があります".to_string(),
            ));
        }
        Ok(())
    }
}
