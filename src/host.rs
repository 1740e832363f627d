//! ホスト（画像ドキュメント操作）の抽象化
//!
//! キャンバス作成・レイヤー読み込み・移動・回転・切り抜き・表示更新を
//! トレイトとして定義する。配置ロジックはこのトレイトだけに依存し、
//! テスト時には MockHost を注入する。本番では RasterHost を使用する。

pub mod raster;

pub use raster::RasterHost;

use crate::error::Result;
use crate::layout::{BBox, Point};
use std::fmt;
use std::path::{Path, PathBuf};

/// キャンバス（1シート分のドキュメント）のハンドル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanvasId(pub usize);

/// レイヤーのハンドル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub usize);

impl fmt::Display for CanvasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "canvas#{}", self.0)
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// キャンバス上のレイヤー位置とサイズ（ピクセル）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayerBounds {
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// ホストが提供する操作
pub trait Host {
    /// 透明な背景レイヤーを持つキャンバスを作成
    fn create_canvas(&mut self, name: &str, width: u32, height: u32) -> Result<CanvasId>;

    /// 画像ファイルをレイヤーとして読み込み、キャンバスに挿入
    ///
    /// - 読み込み直後のオフセットは (0, 0)
    /// - ファイルが無ければ `ImageNotFound`
    fn load_layer(&mut self, canvas: CanvasId, path: &Path) -> Result<LayerId>;

    /// キャンバスのサイズ
    fn canvas_size(&self, canvas: CanvasId) -> Result<(u32, u32)>;

    /// レイヤーの位置とサイズ
    fn layer_bounds(&self, layer: LayerId) -> Result<LayerBounds>;

    /// レイヤーを平行移動
    fn translate_layer(&mut self, layer: LayerId, dx: f64, dy: f64) -> Result<()>;

    /// レイヤーを自身の中心まわりに回転（度、時計回り）
    ///
    /// - レイヤーは回転後の画像が収まるサイズに拡張される
    /// - 中心位置は変わらない
    fn rotate_layer(&mut self, layer: LayerId, degrees: f64) -> Result<()>;

    /// 透明な余白を取り除く
    ///
    /// - 中身が完全に透明なら何もしない
    fn crop_layer_to_content(&mut self, layer: LayerId) -> Result<()>;

    /// 背景レイヤーに矩形の枠線を描く（ピクセル座標）
    fn stroke_rect(&mut self, canvas: CanvasId, rect: &BBox) -> Result<()>;

    /// 表示を更新する。作成したドキュメントを書き出し、そのパスを返す
    fn flush(&mut self) -> Result<Vec<PathBuf>>;
}

/// 回転後の画像が収まるサイズ
///
/// 90度の倍数で浮動小数点誤差により 1px 大きくならないよう丸める。
pub fn rotated_size(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (w, h) = (width as f64, height as f64);
    let new_w = w * cos.abs() + h * sin.abs();
    let new_h = w * sin.abs() + h * cos.abs();
    let fit = |v: f64| ((v - 1e-6).ceil().max(1.0)) as u32;
    (fit(new_w), fit(new_h))
}

#[cfg(test)]
pub mod mock;

#[cfg(test)]
#[path = "host_test.rs"]
mod tests;
