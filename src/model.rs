use crate::config::{FluidProperties, NetworkConfig};
use crate::error::{PinnError, Result};
use crate::pinn::{FieldJet, NUM_CHANNELS, Residuals, navier_stokes};
use burn::module::Module;
use burn::nn::{Initializer, Linear, LinearConfig, Tanh};
use burn::prelude::Backend;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use burn::tensor::Tensor;
use std::path::Path;

/// 入力座標の次元 (x, y)
pub const NUM_INPUTS: usize = 2;

/// PINNの本体となるニューラルネットワークモデル。
///
/// 座標(x, y)を入力とし、流れ関数・圧力・応力の5チャネルを予測する多層パーセプトロン（MLP）です。
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    linears: Vec<Linear<B>>,
    activation: Tanh,
}

/// 値と座標についての1階・2階偏微分をまとめて層を通すための組。
struct Jet<B: Backend> {
    value: Tensor<B, 2>,
    dx: Tensor<B, 2>,
    dy: Tensor<B, 2>,
    dxx: Tensor<B, 2>,
    dxy: Tensor<B, 2>,
    dyy: Tensor<B, 2>,
}

impl<B: Backend> Jet<B> {
    /// 入力座標そのもの。∂x/∂x = 1, ∂y/∂y = 1 で2階微分は0です。
    fn seed(coords: Tensor<B, 2>) -> Self {
        let device = coords.device();
        let n = coords.dims()[0];
        let ones = Tensor::<B, 2>::ones([n, 1], &device);
        let zeros = Tensor::<B, 2>::zeros([n, 1], &device);
        Self {
            value: coords,
            dx: Tensor::cat(vec![ones.clone(), zeros.clone()], 1),
            dy: Tensor::cat(vec![zeros, ones], 1),
            dxx: Tensor::zeros([n, NUM_INPUTS], &device),
            dxy: Tensor::zeros([n, NUM_INPUTS], &device),
            dyy: Tensor::zeros([n, NUM_INPUTS], &device),
        }
    }

    /// 線形層は微分にも重みだけが掛かります (バイアスは値のみ)。
    fn linear(self, layer: &Linear<B>) -> Self {
        let weight = layer.weight.val();
        Self {
            value: layer.forward(self.value),
            dx: self.dx.matmul(weight.clone()),
            dy: self.dy.matmul(weight.clone()),
            dxx: self.dxx.matmul(weight.clone()),
            dxy: self.dxy.matmul(weight.clone()),
            dyy: self.dyy.matmul(weight),
        }
    }

    /// tanh' = 1 − tanh², tanh'' = −2·tanh·(1 − tanh²) による連鎖律
    fn tanh(self, activation: &Tanh) -> Self {
        let t = activation.forward(self.value);
        let d1 = t.clone().mul(t.clone()).neg().add_scalar(1.0);
        let d2 = t.clone().mul(d1.clone()).mul_scalar(-2.0);
        Self {
            dxx: d1.clone() * self.dxx + d2.clone() * self.dx.clone() * self.dx.clone(),
            dxy: d1.clone() * self.dxy + d2.clone() * self.dx.clone() * self.dy.clone(),
            dyy: d1.clone() * self.dyy + d2 * self.dy.clone() * self.dy.clone(),
            dx: d1.clone() * self.dx,
            dy: d1 * self.dy,
            value: t,
        }
    }

    fn into_field(self) -> Result<FieldJet<B>> {
        FieldJet::new(self.value, self.dx, self.dy, self.dxx, self.dxy, self.dyy)
    }
}

impl<B: Backend> Model<B> {
    /// 新しいモデルを Glorot (Xavier) 一様分布で初期化します。
    pub fn new(config: &NetworkConfig, device: &B::Device) -> Self {
        let n_hidden = config.hidden_width;
        let initializer = Initializer::XavierUniform { gain: 1.0 };
        let layer = |d_input, d_output| {
            LinearConfig::new(d_input, d_output)
                .with_initializer(initializer.clone())
                .init(device)
        };
        let mut linears = Vec::new();
        linears.push(layer(NUM_INPUTS, n_hidden));
        for _ in 1..config.hidden_layers {
            linears.push(layer(n_hidden, n_hidden));
        }
        linears.push(layer(n_hidden, NUM_CHANNELS));
        Self {
            linears,
            activation: Tanh::new(),
        }
    }

    /// 保存済みモデルを読み込みます。構成は保存時と同じである必要があります。
    pub fn load<P: AsRef<Path>>(path: P, config: &NetworkConfig, device: &B::Device) -> Result<Self> {
        Self::new(config, device)
            .load_file(
                path.as_ref().to_path_buf(),
                &NamedMpkFileRecorder::<FullPrecisionSettings>::new(),
                device,
            )
            .map_err(|e| PinnError::Record(e.to_string()))
    }

    pub fn save<P: AsRef<Path>>(self, path: P) -> Result<()> {
        self.save_file(
            path.as_ref().to_path_buf(),
            &NamedMpkFileRecorder::<FullPrecisionSettings>::new(),
        )
        .map_err(|e| PinnError::Record(e.to_string()))
    }

    /// モデルの順伝播を実行します。
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = input;
        let last = self.linears.len() - 1;
        for (i, linear) in self.linears.iter().enumerate() {
            x = linear.forward(x);
            if i < last {
                x = self.activation.forward(x);
            }
        }
        x
    }

    /// 出力とその座標についての1階・2階偏微分を前進モードで計算します。
    ///
    /// 通常のテンソル演算だけで構成されるため、自動微分バックエンド上では
    /// 結果をさらにパラメータで微分できます。
    pub fn forward_jet(&self, coords: Tensor<B, 2>) -> Result<FieldJet<B>> {
        let cols = coords.dims()[1];
        if cols != NUM_INPUTS {
            return Err(PinnError::ShapeMismatch {
                what: "入力座標の次元",
                expected: NUM_INPUTS,
                actual: cols,
            });
        }
        let last = self.linears.len() - 1;
        let mut jet = Jet::seed(coords);
        for (i, linear) in self.linears.iter().enumerate() {
            jet = jet.linear(linear);
            if i < last {
                jet = jet.tanh(&self.activation);
            }
        }
        jet.into_field()
    }

    /// 座標 `[N, 2]` における6つの残差を計算します。
    pub fn residuals(&self, coords: Tensor<B, 2>, fluid: &FluidProperties) -> Result<Residuals<B>> {
        let jet = self.forward_jet(coords)?;
        Ok(navier_stokes(fluid, &jet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::tensor_values;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = NdArray<f64>;
    type TestAutodiffBackend = Autodiff<NdArray<f64>>;

    fn small_config() -> NetworkConfig {
        NetworkConfig {
            hidden_width: 12,
            hidden_layers: 3,
        }
    }

    fn sample_coords<B: Backend>(device: &B::Device) -> Tensor<B, 2> {
        Tensor::from_floats(
            [[0.1, 0.2], [0.45, 0.35], [0.9, 0.05], [0.3, 0.66], [0.0, 0.0]],
            device,
        )
    }

    fn shifted<B: Backend>(coords: &Tensor<B, 2>, dx: f64, dy: f64) -> Tensor<B, 2> {
        let n = coords.dims()[0];
        let device = coords.device();
        let shift = Tensor::<B, 2>::cat(
            vec![
                Tensor::ones([n, 1], &device).mul_scalar(dx),
                Tensor::ones([n, 1], &device).mul_scalar(dy),
            ],
            1,
        );
        coords.clone() + shift
    }

    fn assert_close(a: &[f64], b: &[f64], tol: f64) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((x - y).abs() <= tol, "{} vs {}", x, y);
        }
    }

    #[test]
    fn output_has_five_channels() {
        let device = Default::default();
        let model = Model::<TestBackend>::new(&NetworkConfig::default(), &device);
        let out = model.forward(sample_coords(&device));
        assert_eq!(out.dims(), [5, NUM_CHANNELS]);
    }

    #[test]
    fn jet_value_matches_forward() {
        let device = Default::default();
        let model = Model::<TestBackend>::new(&small_config(), &device);
        let coords = sample_coords::<TestBackend>(&device);
        let jet = model.forward_jet(coords.clone()).unwrap();
        let direct = model.forward(coords);
        assert_close(
            &tensor_values(jet.value).unwrap(),
            &tensor_values(direct).unwrap(),
            1e-12,
        );
    }

    #[test]
    fn jet_gradient_matches_autodiff() {
        let device = Default::default();
        let model = Model::<TestAutodiffBackend>::new(&small_config(), &device);
        let coords = sample_coords::<TestAutodiffBackend>(&device);
        let n = coords.dims()[0];

        for channel in 0..NUM_CHANNELS {
            let coords_grad = coords.clone().require_grad();
            let out = model.forward(coords_grad.clone());
            let grads = out.slice([0..n, channel..channel + 1]).sum().backward();
            let g = coords_grad.grad(&grads).unwrap();
            let g_x = tensor_values(g.clone().slice([0..n, 0..1])).unwrap();
            let g_y = tensor_values(g.slice([0..n, 1..2])).unwrap();

            let jet = model.forward_jet(coords.clone()).unwrap();
            let dx = tensor_values(jet.dx.slice([0..n, channel..channel + 1])).unwrap();
            let dy = tensor_values(jet.dy.slice([0..n, channel..channel + 1])).unwrap();
            assert_close(&dx, &g_x, 1e-10);
            assert_close(&dy, &g_y, 1e-10);
        }
    }

    #[test]
    fn second_derivatives_match_finite_differences() {
        let device = Default::default();
        let model = Model::<TestBackend>::new(&small_config(), &device);
        let coords = sample_coords::<TestBackend>(&device);
        let h = 1e-5;

        let jet = model.forward_jet(coords.clone()).unwrap();
        let plus_x = model.forward_jet(shifted(&coords, h, 0.0)).unwrap();
        let minus_x = model.forward_jet(shifted(&coords, -h, 0.0)).unwrap();
        let plus_y = model.forward_jet(shifted(&coords, 0.0, h)).unwrap();
        let minus_y = model.forward_jet(shifted(&coords, 0.0, -h)).unwrap();

        let central = |plus: Tensor<TestBackend, 2>, minus: Tensor<TestBackend, 2>| {
            tensor_values((plus - minus).div_scalar(2.0 * h)).unwrap()
        };
        assert_close(
            &central(plus_x.dx.clone(), minus_x.dx.clone()),
            &tensor_values(jet.dxx.clone()).unwrap(),
            1e-6,
        );
        assert_close(
            &central(plus_x.dy, minus_x.dy),
            &tensor_values(jet.dxy.clone()).unwrap(),
            1e-6,
        );
        assert_close(
            &central(plus_y.dx, minus_y.dx),
            &tensor_values(jet.dxy).unwrap(),
            1e-6,
        );
        assert_close(
            &central(plus_y.dy, minus_y.dy),
            &tensor_values(jet.dyy).unwrap(),
            1e-6,
        );
    }

    #[test]
    fn residuals_reject_wrong_coordinate_dimension() {
        let device = Default::default();
        let model = Model::<TestBackend>::new(&small_config(), &device);
        let coords = Tensor::<TestBackend, 2>::zeros([4, 3], &device);
        assert!(matches!(
            model.residuals(coords, &FluidProperties::default()),
            Err(PinnError::ShapeMismatch { expected: 2, actual: 3, .. })
        ));
    }

    #[test]
    fn residuals_are_differentiable_in_parameters() {
        let device = Default::default();
        let model = Model::<TestAutodiffBackend>::new(&small_config(), &device);
        let residuals = model
            .residuals(sample_coords(&device), &FluidProperties::default())
            .unwrap();
        let grads = residuals.total().backward();
        let weight_grad = model.linears[0].weight.grad(&grads);
        assert!(weight_grad.is_some());
    }

    #[test]
    fn saved_model_reloads_identically() {
        let device = Default::default();
        let config = small_config();
        let model = Model::<TestBackend>::new(&config, &device);
        let coords = sample_coords::<TestBackend>(&device);
        let before = tensor_values(model.forward(coords.clone())).unwrap();

        let path = std::env::temp_dir().join(format!("naca_pinn_model_{}", std::process::id()));
        model.save(&path).unwrap();
        let loaded = Model::<TestBackend>::load(&path, &config, &device).unwrap();
        let after = tensor_values(loaded.forward(coords)).unwrap();
        let _ = std::fs::remove_file(path.with_extension("mpk"));
        // 保存は単精度
        assert_close(&before, &after, 1e-5);
    }
}
