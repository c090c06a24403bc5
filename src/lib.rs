//! # NACA翼型まわりの物理情報ニューラルネットワーク (PINN) ライブラリ
//!
//! 遠方境界の長方形から NACA 4桁翼型を差し引いた領域で、定常非圧縮 Navier-Stokes 方程式を
//! 解くための問題を `burn` 上に構築します。翼型輪郭の生成、領域と評価点の組み立て、
//! 境界条件、そして流れ関数・圧力・応力を出力とするネットワークの残差計算を提供します。

pub mod airfoil;
pub mod boundary;
pub mod cli;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod geometry;
pub mod layout;
pub mod model;
pub mod output;
pub mod pinn;
pub mod problem;

pub use error::{PinnError, Result};

/// モデルを保存するファイル名
pub const MODEL_FILENAME: &str = "naca_pinn_model.mpk";
