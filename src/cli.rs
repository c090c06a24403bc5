use crate::MODEL_FILENAME;
use crate::config::ProblemConfig;
use crate::error::Result;
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

/// clapでコマンドラインの構造を定義します。
#[derive(Parser, Debug)]
#[command(author, version, about = "Navier-Stokes PINN problem around a NACA 4-digit airfoil with Burn", long_about = None)]
pub struct Cli {
    /// 問題設定のJSONファイル (省略時は既定値)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// ログレベル (off, error, warn, info, debug, trace)
    #[arg(long, global = true, value_parser = parse_level)]
    pub log_level: Option<LevelFilter>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 実行するサブコマンドを定義します（geometry または residuals）。
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 翼型の輪郭と残差評価点を生成し、CSVとPNGに保存します
    Geometry(GeometryArgs),
    /// ネットワークの残差と境界条件の誤差を評価します
    Residuals(ResidualArgs),
}

#[derive(Args, Debug)]
pub struct GeometryArgs {
    #[command(flatten)]
    pub problem: ProblemOverrides,

    /// 出力先ディレクトリ
    #[arg(long, default_value = "output")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct ResidualArgs {
    #[command(flatten)]
    pub problem: ProblemOverrides,

    /// 学習済みモデルファイル (存在しなければ初期化したネットワークを使います)
    #[arg(long, default_value = MODEL_FILENAME)]
    pub model: PathBuf,

    /// 出力先ディレクトリ
    #[arg(long, default_value = "output")]
    pub output: PathBuf,
}

/// 設定ファイルの値をコマンドラインから上書きします。
#[derive(Args, Debug, Default)]
pub struct ProblemOverrides {
    /// NACA 4桁番号 (例: 0012, 2412)
    #[arg(long)]
    pub naca: Option<String>,

    /// 領域の差集合に使う輪郭の分割数
    #[arg(long = "points")]
    pub airfoil_points: Option<usize>,

    /// 境界条件用アンカー点の分割数
    #[arg(long)]
    pub anchor_points: Option<usize>,

    #[arg(long)]
    pub inner_points: Option<usize>,

    #[arg(long)]
    pub outer_points: Option<usize>,

    #[arg(long)]
    pub farfield_points: Option<usize>,

    /// 乱数シード
    #[arg(long)]
    pub seed: Option<u64>,
}

impl ProblemOverrides {
    pub fn apply(&self, config: &mut ProblemConfig) -> Result<()> {
        if let Some(code) = &self.naca {
            config.airfoil.set_designation(code)?;
        }
        if let Some(n) = self.airfoil_points {
            config.airfoil.geometry_points = n;
        }
        if let Some(n) = self.anchor_points {
            config.airfoil.anchor_points = n;
        }
        if let Some(n) = self.inner_points {
            config.sampling.inner_points = n;
        }
        if let Some(n) = self.outer_points {
            config.sampling.outer_points = n;
        }
        if let Some(n) = self.farfield_points {
            config.sampling.farfield_points = n;
        }
        if let Some(seed) = self.seed {
            config.sampling.seed = seed;
        }
        Ok(())
    }
}

fn parse_level(s: &str) -> std::result::Result<LevelFilter, String> {
    s.parse()
        .map_err(|_| format!("不明なログレベルです: {} (off, error, warn, info, debug, trace)", s))
}
