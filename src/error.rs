//! クレート共通のエラー型。

use thiserror::Error;

/// クレート共通の結果型
pub type Result<T> = std::result::Result<T, PinnError>;

/// 翼型生成・残差評価・入出力で発生するエラー。
#[derive(Error, Debug)]
pub enum PinnError {
    /// 翼型パラメータが不正
    #[error("翼型パラメータが不正です: {parameter} = {value} ({reason})")]
    InvalidShape {
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// NACA 4桁番号が不正
    #[error("NACA 4桁番号が不正です: '{0}'")]
    InvalidDesignation(String),

    /// テンソル形状の不一致
    #[error("形状が一致しません: {what} は {expected} を期待しましたが {actual} でした")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// 設定値が不正
    #[error("設定が不正です: {0}")]
    InvalidConfig(String),

    #[error("入出力エラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSONエラー: {0}")]
    Json(#[from] serde_json::Error),

    /// テンソルデータの変換に失敗
    #[error("テンソルデータの変換に失敗しました: {0}")]
    Data(String),

    /// モデルファイルの読み込みに失敗
    #[error("モデルの読み込みに失敗しました: {0}")]
    Record(String),

    /// グラフ描画に失敗
    #[error("グラフの描画に失敗しました: {0}")]
    Plot(String),
}

impl PinnError {
    pub(crate) fn shape(parameter: &'static str, value: f64, reason: &'static str) -> Self {
        PinnError::InvalidShape {
            parameter,
            value,
            reason,
        }
    }
}
