//! # NACA翼型まわりの PINN 問題構築プログラム
//!
//! `burn` フレームワークを使用して、翼型まわりの定常非圧縮流れを表す物理情報ニューラルネットワーク
//! （PINN）の問題を構築し、残差を評価します。
//!
//! `clap` クレートを利用して、コマンドラインから`geometry`（領域と評価点の生成）と
//! `residuals`（残差の評価）の機能を個別に実行できます。
//!
//! ## 使い方
//!
//! ### 領域と評価点
//! ```bash
//! cargo run --release -- geometry --naca 0012
//! ```
//!
//! ### 残差の評価
//! ```bash
//! cargo run --release -- residuals --config problem.json
//! ```

use clap::Parser;
use env_logger::Env;
use log::{LevelFilter, info};
use naca_pinn::cli::{Cli, Commands};
use naca_pinn::config::ProblemConfig;
use naca_pinn::{evaluation, layout};
use std::io::Write;

/// `RUST_LOG` (既定は info) を読み、`--log-level` があればそれで上書きします。
fn init_logging(level: Option<LevelFilter>) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();
}

/// プログラムのエントリーポイント。
///
/// コマンドライン引数を解析し、`geometry`または`residuals`の処理に振り分けます。
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let mut config = match &cli.config {
        Some(path) => {
            info!("設定を '{}' から読み込みます", path.display());
            ProblemConfig::load(path)?
        }
        None => ProblemConfig::default(),
    };

    match &cli.command {
        Commands::Geometry(args) => {
            args.problem.apply(&mut config)?;
            config.validate()?;
            layout::run(&config, args)?;
        }
        Commands::Residuals(args) => {
            args.problem.apply(&mut config)?;
            config.validate()?;
            evaluation::run(&config, args)?;
        }
    }
    Ok(())
}
