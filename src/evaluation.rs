use crate::boundary::{BoundaryCondition, BoundaryRegion};
use crate::cli::ResidualArgs;
use crate::config::ProblemConfig;
use crate::error::Result;
use crate::model::Model;
use crate::output::write_csv;
use crate::pinn::{Residuals, mean_square};
use crate::problem::{CollocationSet, ProblemGeometry, points_to_tensor, tensor_values};
use burn::backend::NdArray;
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Instant;

type MyBackend = NdArray<f32>;

/// `residuals`サブコマンドを実行します。
///
/// 評価点を生成し、ネットワークの6つの残差と各境界条件の二乗平均誤差を求めます。
pub fn run(config: &ProblemConfig, args: &ResidualArgs) -> Result<()> {
    let device = Default::default();

    let geometry = ProblemGeometry::from_config(config)?;
    let mut rng = StdRng::seed_from_u64(config.sampling.seed);
    let points = CollocationSet::assemble(config, &geometry, &mut rng)?;
    for region in BoundaryRegion::ALL {
        let n = points.boundary_points(region, &geometry.farfield).len();
        info!("境界 {}: {} 点", region, n);
    }

    let model = if args.model.exists() {
        info!("保存済みモデルを '{}' からロード中...", args.model.display());
        Model::<MyBackend>::load(&args.model, &config.network, &device)?
    } else {
        warn!(
            "モデルファイル '{}' が見つかりません。初期化したネットワークで評価します。",
            args.model.display()
        );
        Model::<MyBackend>::new(&config.network, &device)
    };

    info!("残差を評価します - バックエンド: NdArray (CPU)");
    let evaluation_start = Instant::now();

    let all_points = points.all();
    let coords = points_to_tensor::<MyBackend>(&all_points, &device);
    let residuals = model.residuals(coords, &config.fluid)?;
    let mean_squares = tensor_values(residuals.mean_squares())?;
    for (name, value) in Residuals::<MyBackend>::NAMES.iter().zip(&mean_squares) {
        info!("[PDE] {:<15} 二乗平均: {:.6e}", name, value);
    }
    info!("[PDE] 合計: {:.6e}", mean_squares.iter().sum::<f64>());

    for bc in BoundaryCondition::standard_set(&config.fluid) {
        let bc_points = points.boundary_points(bc.region, &geometry.farfield);
        if bc_points.is_empty() {
            warn!("[BC] {} に該当する点がありません", bc);
            continue;
        }
        let jet = model.forward_jet(points_to_tensor::<MyBackend>(&bc_points, &device))?;
        let loss = tensor_values(mean_square(bc.residual(&jet)))?;
        info!("[BC] {:<20} 二乗平均: {:.6e}", bc.to_string(), loss[0]);
    }
    info!("=> 評価時間: {:.2?}", evaluation_start.elapsed());

    std::fs::create_dir_all(&args.output)?;
    let path = args.output.join("residuals.csv");
    let stacked = tensor_values(residuals.stacked())?;
    let mut columns = vec![
        all_points.iter().map(|p| p[0]).collect::<Vec<f64>>(),
        all_points.iter().map(|p| p[1]).collect(),
    ];
    let n_components = Residuals::<MyBackend>::NAMES.len();
    for k in 0..n_components {
        columns.push(stacked.iter().skip(k).step_by(n_components).copied().collect());
    }
    let mut headers = vec!["x", "y"];
    headers.extend(Residuals::<MyBackend>::NAMES);
    write_csv(&path, &headers, &columns)?;
    info!("=> 残差を '{}' に保存しました。", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ProblemOverrides;
    use crate::config::NetworkConfig;

    fn small_config() -> ProblemConfig {
        let mut config = ProblemConfig::default();
        config.sampling.inner_points = 40;
        config.sampling.outer_points = 40;
        config.sampling.farfield_points = 32;
        config.airfoil.geometry_points = 50;
        config.airfoil.anchor_points = 16;
        config.network = NetworkConfig {
            hidden_width: 8,
            hidden_layers: 2,
        };
        config
    }

    #[test]
    fn residual_csv_has_one_row_per_point_in_stacked_order() {
        let config = small_config();
        let output = std::env::temp_dir().join(format!("naca_pinn_eval_{}", std::process::id()));
        std::fs::create_dir_all(&output).unwrap();

        let device = Default::default();
        let model_path = output.join("model.mpk");
        Model::<MyBackend>::new(&config.network, &device)
            .save(&model_path)
            .unwrap();

        let args = ResidualArgs {
            problem: ProblemOverrides::default(),
            model: model_path.clone(),
            output: output.clone(),
        };
        run(&config, &args).unwrap();
        let text = std::fs::read_to_string(output.join("residuals.csv")).unwrap();

        // 同じシードで点を作り直し、保存したモデルで残差を求める
        let geometry = ProblemGeometry::from_config(&config).unwrap();
        let mut rng = StdRng::seed_from_u64(config.sampling.seed);
        let points = CollocationSet::assemble(&config, &geometry, &mut rng)
            .unwrap()
            .all();
        let model = Model::<MyBackend>::load(&model_path, &config.network, &device).unwrap();
        let residuals = model
            .residuals(points_to_tensor::<MyBackend>(&points, &device), &config.fluid)
            .unwrap();
        let stacked = tensor_values(residuals.stacked()).unwrap();
        let _ = std::fs::remove_dir_all(&output);

        let lines: Vec<&str> = text.lines().collect();
        let mut headers = vec!["x", "y"];
        headers.extend(Residuals::<MyBackend>::NAMES);
        assert_eq!(lines[0], headers.join(","));
        assert_eq!(lines.len(), points.len() + 1);

        let row: Vec<f64> = lines[1].split(',').map(|v| v.parse().unwrap()).collect();
        assert_eq!(row.len(), 8);
        assert!((row[0] - points[0][0]).abs() < 1e-12);
        assert!((row[1] - points[0][1]).abs() < 1e-12);
        for k in 0..6 {
            let expected = stacked[k];
            assert!(
                (row[2 + k] - expected).abs() <= 1e-6 * (1.0 + expected.abs()),
                "列 {}: {} != {}",
                Residuals::<MyBackend>::NAMES[k],
                row[2 + k],
                expected
            );
        }
    }
}
