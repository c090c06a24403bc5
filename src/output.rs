use crate::airfoil::Point;
use crate::error::{PinnError, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// 列ごとのデータをヘッダ付きCSVに書き出します。
pub fn write_csv<P: AsRef<Path>>(path: P, headers: &[&str], columns: &[Vec<f64>]) -> Result<()> {
    if headers.len() != columns.len() {
        return Err(PinnError::ShapeMismatch {
            what: "CSVの列数",
            expected: headers.len(),
            actual: columns.len(),
        });
    }
    let n_rows = columns.first().map_or(0, Vec::len);
    if let Some(bad) = columns.iter().find(|col| col.len() != n_rows) {
        return Err(PinnError::ShapeMismatch {
            what: "CSVの行数",
            expected: n_rows,
            actual: bad.len(),
        });
    }

    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "{}", headers.join(","))?;
    for i in 0..n_rows {
        let row: Vec<String> = columns.iter().map(|col| format!("{:.15e}", col[i])).collect();
        writeln!(file, "{}", row.join(","))?;
    }
    file.flush()?;
    Ok(())
}

/// 点列を `x,y` の2列で書き出します。
pub fn write_points<P: AsRef<Path>>(path: P, points: &[Point]) -> Result<()> {
    let xs = points.iter().map(|p| p[0]).collect();
    let ys = points.iter().map(|p| p[1]).collect();
    write_csv(path, &["x", "y"], &[xs, ys])
}
