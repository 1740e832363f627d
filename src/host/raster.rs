//! `image` クレートによるラスター実装
//!
//! レイヤーは RGBA 画像と浮動小数点オフセットで保持し、
//! `flush` でキャンバスごとに合成して PNG として書き出す。

use super::{rotated_size, CanvasId, Host, LayerBounds, LayerId};
use crate::error::{ArrangeError, Result};
use crate::layout::{BBox, MAX_CANVAS_PIXELS};
use image::{imageops, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

/// 枠線の太さ（ピクセル）
const OUTLINE_WIDTH: u32 = 2;

/// 枠線の色
const OUTLINE_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

struct Canvas {
    name: String,
    /// 背景レイヤー（枠線もここに描く）
    background: RgbaImage,
}

struct Layer {
    canvas: CanvasId,
    image: RgbaImage,
    x: f64,
    y: f64,
}

/// ラスター合成ホスト
pub struct RasterHost {
    output_dir: PathBuf,
    background: Rgba<u8>,
    canvases: Vec<Canvas>,
    layers: Vec<Layer>,
}

impl RasterHost {
    /// 出力先ディレクトリと背景色を指定して作成
    pub fn new(output_dir: impl Into<PathBuf>, background: Rgba<u8>) -> Self {
        Self {
            output_dir: output_dir.into(),
            background,
            canvases: Vec::new(),
            layers: Vec::new(),
        }
    }

    fn canvas(&self, id: CanvasId) -> Result<&Canvas> {
        self.canvases
            .get(id.0)
            .ok_or(ArrangeError::UnknownCanvas(id.0))
    }

    fn layer(&self, id: LayerId) -> Result<&Layer> {
        self.layers.get(id.0).ok_or(ArrangeError::UnknownLayer(id.0))
    }

    fn layer_mut(&mut self, id: LayerId) -> Result<&mut Layer> {
        self.layers
            .get_mut(id.0)
            .ok_or(ArrangeError::UnknownLayer(id.0))
    }

    /// キャンバスを合成した画像
    pub fn compose(&self, id: CanvasId) -> Result<RgbaImage> {
        let canvas = self.canvas(id)?;
        let mut composed = canvas.background.clone();
        for layer in self.layers.iter().filter(|l| l.canvas == id) {
            imageops::overlay(
                &mut composed,
                &layer.image,
                layer.x.round() as i64,
                layer.y.round() as i64,
            );
        }
        Ok(composed)
    }
}

impl Host for RasterHost {
    fn create_canvas(&mut self, name: &str, width: u32, height: u32) -> Result<CanvasId> {
        let id = CanvasId(self.canvases.len());
        if u64::from(width) * u64::from(height) > MAX_CANVAS_PIXELS {
            return Err(ArrangeError::CanvasTooLarge {
                sheet: id.0,
                width: width as f64,
                height: height as f64,
            });
        }
        self.canvases.push(Canvas {
            name: name.to_string(),
            background: RgbaImage::from_pixel(width, height, self.background),
        });
        log::debug!("Created {id} '{name}' ({width}x{height})");
        Ok(id)
    }

    fn load_layer(&mut self, canvas: CanvasId, path: &Path) -> Result<LayerId> {
        self.canvas(canvas)?;
        if !path.is_file() {
            return Err(ArrangeError::ImageNotFound(path.to_path_buf()));
        }
        let image = image::open(path)?.to_rgba8();
        let id = LayerId(self.layers.len());
        log::debug!(
            "Loaded {id} from {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        self.layers.push(Layer {
            canvas,
            image,
            x: 0.0,
            y: 0.0,
        });
        Ok(id)
    }

    fn canvas_size(&self, canvas: CanvasId) -> Result<(u32, u32)> {
        Ok(self.canvas(canvas)?.background.dimensions())
    }

    fn layer_bounds(&self, layer: LayerId) -> Result<LayerBounds> {
        let layer = self.layer(layer)?;
        Ok(LayerBounds {
            x: layer.x,
            y: layer.y,
            width: layer.image.width() as f64,
            height: layer.image.height() as f64,
        })
    }

    fn translate_layer(&mut self, layer: LayerId, dx: f64, dy: f64) -> Result<()> {
        let layer = self.layer_mut(layer)?;
        layer.x += dx;
        layer.y += dy;
        Ok(())
    }

    fn rotate_layer(&mut self, layer: LayerId, degrees: f64) -> Result<()> {
        let layer = self.layer_mut(layer)?;
        if degrees.rem_euclid(360.0) == 0.0 {
            return Ok(());
        }
        let (old_w, old_h) = layer.image.dimensions();
        layer.image = rotate_about_center(&layer.image, degrees);
        let (new_w, new_h) = layer.image.dimensions();
        layer.x += (old_w as f64 - new_w as f64) / 2.0;
        layer.y += (old_h as f64 - new_h as f64) / 2.0;
        Ok(())
    }

    fn crop_layer_to_content(&mut self, layer: LayerId) -> Result<()> {
        let layer = self.layer_mut(layer)?;
        if let Some((x, y, w, h)) = content_bounds(&layer.image) {
            layer.image = imageops::crop_imm(&layer.image, x, y, w, h).to_image();
            layer.x += x as f64;
            layer.y += y as f64;
        }
        Ok(())
    }

    fn stroke_rect(&mut self, canvas: CanvasId, rect: &BBox) -> Result<()> {
        let canvas = self
            .canvases
            .get_mut(canvas.0)
            .ok_or(ArrangeError::UnknownCanvas(canvas.0))?;
        draw_outline(&mut canvas.background, rect);
        Ok(())
    }

    fn flush(&mut self) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.output_dir)?;

        let mut written = Vec::with_capacity(self.canvases.len());
        for (index, canvas) in self.canvases.iter().enumerate() {
            let path = self.output_dir.join(format!("{}.png", canvas.name));
            self.compose(CanvasId(index))?.save(&path)?;
            log::info!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

/// 中心まわりに回転した画像（拡張サイズ、双線形補間）
fn rotate_about_center(src: &RgbaImage, degrees: f64) -> RgbaImage {
    let (src_w, src_h) = src.dimensions();
    let (dst_w, dst_h) = rotated_size(src_w, src_h, degrees);
    let (sin, cos) = degrees.to_radians().sin_cos();

    let src_cx = src_w as f64 / 2.0;
    let src_cy = src_h as f64 / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    RgbaImage::from_fn(dst_w, dst_h, |x, y| {
        // 出力画素中心を逆回転して元画像の座標を求める
        let dx = x as f64 + 0.5 - dst_cx;
        let dy = y as f64 + 0.5 - dst_cy;
        let sx = cos * dx + sin * dy + src_cx;
        let sy = -sin * dx + cos * dy + src_cy;
        sample_bilinear(src, sx - 0.5, sy - 0.5)
    })
}

/// 画素中心座標系での双線形サンプリング（範囲外は透明）
///
/// 色は乗算済みアルファで補間する。
fn sample_bilinear(src: &RgbaImage, u: f64, v: f64) -> Rgba<u8> {
    let x0 = u.floor();
    let y0 = v.floor();
    let fx = u - x0;
    let fy = v - y0;

    let fetch = |x: f64, y: f64| -> [f64; 4] {
        if x < 0.0 || y < 0.0 || x >= src.width() as f64 || y >= src.height() as f64 {
            return [0.0; 4];
        }
        let Rgba([r, g, b, a]) = *src.get_pixel(x as u32, y as u32);
        let alpha = a as f64 / 255.0;
        [r as f64 * alpha, g as f64 * alpha, b as f64 * alpha, a as f64]
    };

    let p00 = fetch(x0, y0);
    let p10 = fetch(x0 + 1.0, y0);
    let p01 = fetch(x0, y0 + 1.0);
    let p11 = fetch(x0 + 1.0, y0 + 1.0);

    let out: [f64; 4] = std::array::from_fn(|i| {
        let top = p00[i] * (1.0 - fx) + p10[i] * fx;
        let bottom = p01[i] * (1.0 - fx) + p11[i] * fx;
        top * (1.0 - fy) + bottom * fy
    });

    let alpha = out[3];
    if alpha <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let unpremultiply = |c: f64| (c * 255.0 / alpha).round().clamp(0.0, 255.0) as u8;
    Rgba([
        unpremultiply(out[0]),
        unpremultiply(out[1]),
        unpremultiply(out[2]),
        alpha.round().clamp(0.0, 255.0) as u8,
    ])
}

/// 不透明な画素を含む最小矩形 `(x, y, w, h)`
fn content_bounds(image: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            }
        });
    }
    bounds.map(|(min_x, min_y, max_x, max_y)| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// 矩形の枠線を描く（キャンバス外はクリップ）
fn draw_outline(image: &mut RgbaImage, rect: &BBox) {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let clamp_x = |v: f64| v.round().clamp(0.0, (w - 1) as f64) as u32;
    let clamp_y = |v: f64| v.round().clamp(0.0, (h - 1) as f64) as u32;

    let (x0, x1) = (clamp_x(rect.min_x), clamp_x(rect.max_x));
    let (y0, y1) = (clamp_y(rect.min_y), clamp_y(rect.max_y));

    for t in 0..OUTLINE_WIDTH {
        for x in x0..=x1 {
            image.put_pixel(x, (y0 + t).min(h - 1), OUTLINE_COLOR);
            image.put_pixel(x, y1.saturating_sub(t), OUTLINE_COLOR);
        }
        for y in y0..=y1 {
            image.put_pixel((x0 + t).min(w - 1), y, OUTLINE_COLOR);
            image.put_pixel(x1.saturating_sub(t), y, OUTLINE_COLOR);
        }
    }
}

#[cfg(test)]
#[path = "raster_test.rs"]
mod tests;
