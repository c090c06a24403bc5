//! Navier-Stokes方程式の残差。
//!
//! ネットワークの出力は流れ関数 ψ, 圧力 p, 応力 σ11, σ22, σ12 の5チャネルです。
//! 速度は `u = ∂ψ/∂y`, `v = -∂ψ/∂x` から求めるため、連続の式は恒等的に満たされます。

use crate::config::FluidProperties;
use crate::error::{PinnError, Result};
use burn::nn::loss::{MseLoss, Reduction};
use burn::tensor::Tensor;
use burn::tensor::backend::Backend;

/// 流れ関数 ψ
pub const PSI: usize = 0;
/// 圧力 p
pub const PRESSURE: usize = 1;
/// 応力 σ11
pub const SIGMA11: usize = 2;
/// 応力 σ22
pub const SIGMA22: usize = 3;
/// 応力 σ12
pub const SIGMA12: usize = 4;
/// 出力チャネル数
pub const NUM_CHANNELS: usize = 5;

/// 各点における出力値と、座標 (x, y) についての1階・2階偏微分。
///
/// すべて `[N, 5]` のテンソルです。
#[derive(Debug, Clone)]
pub struct FieldJet<B: Backend> {
    pub value: Tensor<B, 2>,
    pub dx: Tensor<B, 2>,
    pub dy: Tensor<B, 2>,
    pub dxx: Tensor<B, 2>,
    pub dxy: Tensor<B, 2>,
    pub dyy: Tensor<B, 2>,
}

fn column<B: Backend>(tensor: &Tensor<B, 2>, channel: usize) -> Tensor<B, 2> {
    let n = tensor.dims()[0];
    tensor.clone().slice([0..n, channel..channel + 1])
}

impl<B: Backend> FieldJet<B> {
    /// 形状を検証して作成します。
    pub fn new(
        value: Tensor<B, 2>,
        dx: Tensor<B, 2>,
        dy: Tensor<B, 2>,
        dxx: Tensor<B, 2>,
        dxy: Tensor<B, 2>,
        dyy: Tensor<B, 2>,
    ) -> Result<Self> {
        let [n, channels] = value.dims();
        if channels != NUM_CHANNELS {
            return Err(PinnError::ShapeMismatch {
                what: "出力チャネル数",
                expected: NUM_CHANNELS,
                actual: channels,
            });
        }
        for derivative in [&dx, &dy, &dxx, &dxy, &dyy] {
            let [rows, cols] = derivative.dims();
            if cols != NUM_CHANNELS {
                return Err(PinnError::ShapeMismatch {
                    what: "偏微分のチャネル数",
                    expected: NUM_CHANNELS,
                    actual: cols,
                });
            }
            if rows != n {
                return Err(PinnError::ShapeMismatch {
                    what: "偏微分の点数",
                    expected: n,
                    actual: rows,
                });
            }
        }
        Ok(Self {
            value,
            dx,
            dy,
            dxx,
            dxy,
            dyy,
        })
    }

    pub fn channel(&self, channel: usize) -> Tensor<B, 2> {
        column(&self.value, channel)
    }

    /// 速度 `(u, v)`
    pub fn velocity(&self) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let u = column(&self.dy, PSI);
        let v = column(&self.dx, PSI).neg();
        (u, v)
    }
}

/// 6つの残差 (運動量保存2つ、構成則4つ)。各 `[N, 1]`。
#[derive(Debug, Clone)]
pub struct Residuals<B: Backend> {
    pub momentum_x: Tensor<B, 2>,
    pub momentum_y: Tensor<B, 2>,
    pub constitutive_1: Tensor<B, 2>,
    pub constitutive_2: Tensor<B, 2>,
    pub constitutive_3: Tensor<B, 2>,
    pub constitutive_4: Tensor<B, 2>,
}

impl<B: Backend> Residuals<B> {
    pub const NAMES: [&'static str; 6] = [
        "momentum_x",
        "momentum_y",
        "constitutive_1",
        "constitutive_2",
        "constitutive_3",
        "constitutive_4",
    ];

    pub fn components(&self) -> [Tensor<B, 2>; 6] {
        [
            self.momentum_x.clone(),
            self.momentum_y.clone(),
            self.constitutive_1.clone(),
            self.constitutive_2.clone(),
            self.constitutive_3.clone(),
            self.constitutive_4.clone(),
        ]
    }

    /// `[N, 6]` にまとめます。
    pub fn stacked(&self) -> Tensor<B, 2> {
        Tensor::cat(Vec::from(self.components()), 1)
    }

    /// 各残差の二乗平均 `[6]`
    pub fn mean_squares(&self) -> Tensor<B, 1> {
        let losses = self.components().into_iter().map(mean_square).collect();
        Tensor::cat(losses, 0)
    }

    /// 二乗平均の総和。学習時の物理損失に相当します。
    pub fn total(&self) -> Tensor<B, 1> {
        self.mean_squares().sum()
    }
}

/// 残差をゼロに近づける二乗平均誤差
pub fn mean_square<B: Backend>(residual: Tensor<B, 2>) -> Tensor<B, 1> {
    let target = Tensor::zeros_like(&residual);
    MseLoss::new().forward(residual, target, Reduction::Mean)
}

/// 定常非圧縮Navier-Stokes方程式 (応力形式) の残差を計算します。
///
/// 入力と物性値のみの純粋な関数で、副作用はありません。
pub fn navier_stokes<B: Backend>(fluid: &FluidProperties, jet: &FieldJet<B>) -> Residuals<B> {
    let rho = fluid.density;
    let mu = fluid.viscosity;

    let (u, v) = jet.velocity();
    let u_x = column(&jet.dxy, PSI);
    let u_y = column(&jet.dyy, PSI);
    let v_x = column(&jet.dxx, PSI).neg();
    let v_y = column(&jet.dxy, PSI).neg();

    let p = jet.channel(PRESSURE);
    let sigma11 = jet.channel(SIGMA11);
    let sigma22 = jet.channel(SIGMA22);
    let sigma12 = jet.channel(SIGMA12);

    let sigma11_x = column(&jet.dx, SIGMA11);
    let sigma12_x = column(&jet.dx, SIGMA12);
    let sigma12_y = column(&jet.dy, SIGMA12);
    let sigma22_y = column(&jet.dy, SIGMA22);

    let momentum_x = (u.clone() * u_x.clone() + v.clone() * u_y.clone()).mul_scalar(rho)
        - sigma11_x
        - sigma12_y;
    let momentum_y = (u * v_x.clone() + v * v_y.clone()).mul_scalar(rho) - sigma12_x - sigma22_y;

    let constitutive_1 = p.clone().neg() + u_x.mul_scalar(2.0 * mu) - sigma11.clone();
    let constitutive_2 = p.clone().neg() + v_y.mul_scalar(2.0 * mu) - sigma22.clone();
    let constitutive_3 = (u_y + v_x).mul_scalar(mu) - sigma12;
    let constitutive_4 = p + (sigma11 + sigma22).div_scalar(2.0);

    Residuals {
        momentum_x,
        momentum_y,
        constitutive_1,
        constitutive_2,
        constitutive_3,
        constitutive_4,
    }
}
