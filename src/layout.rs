use crate::airfoil::Point;
use crate::cli::GeometryArgs;
use crate::config::ProblemConfig;
use crate::error::{PinnError, Result};
use crate::geometry::Rectangle;
use crate::output::{write_csv, write_points};
use crate::problem::{CollocationSet, ProblemGeometry};
use log::info;
use plotters::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;
use std::time::Instant;

const PLOT_WIDTH: u32 = 1200;
/// 描画領域の高さの範囲 [px]
const PLOT_HEIGHT_RANGE: (f64, f64) = (200.0, 2400.0);

/// `geometry`サブコマンドを実行します。
///
/// 翼型の輪郭と残差評価点を生成し、CSVと散布図PNGに保存します。
pub fn run(config: &ProblemConfig, args: &GeometryArgs) -> Result<()> {
    let start = Instant::now();
    let geometry = ProblemGeometry::from_config(config)?;
    let mut rng = StdRng::seed_from_u64(config.sampling.seed);
    let points = CollocationSet::assemble(config, &geometry, &mut rng)?;
    info!(
        "点の生成が完了しました: {} 点 ({:.2?})",
        points.len(),
        start.elapsed()
    );

    std::fs::create_dir_all(&args.output)?;

    let airfoil_path = args.output.join("airfoil.csv");
    write_points(&airfoil_path, geometry.airfoil.vertices())?;
    info!("=> 翼型の輪郭を '{}' に保存しました。", airfoil_path.display());

    let collocation_path = args.output.join("collocation.csv");
    write_collocation(&collocation_path, &points)?;
    info!("=> 評価点を '{}' に保存しました。", collocation_path.display());

    let plot_path = args.output.join("collocation.png");
    plot_collocation(&plot_path, config, &points, geometry.airfoil.vertices())?;
    info!("=> 点の分布図を '{}' に保存しました。", plot_path.display());

    Ok(())
}

/// `x, y, group` の3列で保存します。group は 0: 内側, 1: 外側, 2: 遠方境界, 3: 翼面。
fn write_collocation(path: &Path, points: &CollocationSet) -> Result<()> {
    let mut xs = Vec::with_capacity(points.len());
    let mut ys = Vec::with_capacity(points.len());
    let mut groups = Vec::with_capacity(points.len());
    for (group, (_, pts)) in points.groups().into_iter().enumerate() {
        for p in pts {
            xs.push(p[0]);
            ys.push(p[1]);
            groups.push(group as f64);
        }
    }
    write_csv(path, &["x", "y", "group"], &[xs, ys, groups])
}

/// 評価点の分布を散布図としてPNGファイルに出力します。
fn plot_collocation(
    path: &Path,
    config: &ProblemConfig,
    points: &CollocationSet,
    outline: &[Point],
) -> Result<()> {
    draw_collocation(path, config, points, outline).map_err(|e| PinnError::Plot(e.to_string()))
}

/// 遠方境界の縦横比に合わせた高さ
fn plot_height(domain: &Rectangle) -> u32 {
    let (lo, hi) = PLOT_HEIGHT_RANGE;
    let aspect = domain.height() / domain.width();
    (PLOT_WIDTH as f64 * aspect).round().clamp(lo, hi) as u32
}

fn draw_collocation(
    path: &Path,
    config: &ProblemConfig,
    points: &CollocationSet,
    outline: &[Point],
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let domain = config.domain;
    let height = plot_height(&domain);
    let width = PLOT_WIDTH;
    let root = BitMapBackend::new(path, (width, height + 60)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Collocation Points", ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(domain.min[0]..domain.max[0], domain.min[1]..domain.max[1])?;
    chart.configure_mesh().x_desc("x").y_desc("y").draw()?;

    let colors = [BLUE, GREEN, RED, BLACK];
    for ((name, pts), color) in points.groups().into_iter().zip(colors) {
        chart
            .draw_series(
                pts.iter()
                    .map(|p| Circle::new((p[0], p[1]), 1, color.filled())),
            )?
            .label(name)
            .legend(move |(x, y)| Circle::new((x + 10, y), 3, color.filled()));
    }
    chart.draw_series(std::iter::once(Polygon::new(
        outline.iter().map(|p| (p[0], p[1])).collect::<Vec<_>>(),
        BLACK.mix(0.3).filled(),
    )))?;

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ProblemOverrides;

    #[test]
    fn writes_outline_points_and_plot() {
        let mut config = ProblemConfig::default();
        config.sampling.inner_points = 60;
        config.sampling.outer_points = 60;
        config.sampling.farfield_points = 40;
        config.airfoil.geometry_points = 50;
        config.airfoil.anchor_points = 20;

        let output = std::env::temp_dir().join(format!("naca_pinn_layout_{}", std::process::id()));
        let args = GeometryArgs {
            problem: ProblemOverrides::default(),
            output: output.clone(),
        };
        run(&config, &args).unwrap();

        let airfoil = std::fs::read_to_string(output.join("airfoil.csv")).unwrap();
        let collocation = std::fs::read_to_string(output.join("collocation.csv")).unwrap();
        let plot_written = output.join("collocation.png").is_file();
        let _ = std::fs::remove_dir_all(&output);

        assert_eq!(airfoil.lines().next(), Some("x,y"));
        assert_eq!(airfoil.lines().count(), 2 * 50 + 1 + 1);

        // 60 + 60 + 40 + (2 * 20 + 1)
        assert_eq!(collocation.lines().next(), Some("x,y,group"));
        assert_eq!(collocation.lines().count(), 201 + 1);
        let groups: Vec<f64> = collocation
            .lines()
            .skip(1)
            .map(|l| l.rsplit(',').next().unwrap().parse().unwrap())
            .collect();
        assert_eq!(groups.iter().filter(|&&g| g == 3.0).count(), 41);
        assert!(plot_written);
    }

    #[test]
    fn plot_height_follows_aspect_within_limits() {
        let wide = Rectangle::new([0.0, 0.0], [1.0, 0.5]).unwrap();
        assert_eq!(plot_height(&wide), 600);
        let flat = Rectangle::new([0.0, 0.0], [1.0, 0.01]).unwrap();
        assert_eq!(plot_height(&flat), 200);
        let tall = Rectangle::new([0.0, 0.0], [0.01, 100.0]).unwrap();
        assert_eq!(plot_height(&tall), 2400);
    }
}
