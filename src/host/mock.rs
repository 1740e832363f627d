//! テスト用モックホスト
//!
//! 画像を読み込まずに、呼び出し履歴とレイヤーの位置・サイズだけを追跡する。

use super::*;
use crate::error::ArrangeError;
use std::collections::HashMap;

/// 記録されたホスト呼び出し
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    CreateCanvas {
        name: String,
        width: u32,
        height: u32,
    },
    LoadLayer {
        canvas: CanvasId,
        path: PathBuf,
    },
    Translate {
        layer: LayerId,
        dx: f64,
        dy: f64,
    },
    Rotate {
        layer: LayerId,
        degrees: f64,
    },
    Crop {
        layer: LayerId,
    },
    StrokeRect {
        canvas: CanvasId,
        rect: BBox,
    },
    Flush,
}

struct MockLayer {
    canvas: CanvasId,
    bounds: LayerBounds,
}

/// テスト用モックホスト
pub struct MockHost {
    images: HashMap<PathBuf, (u32, u32)>,
    canvases: Vec<(String, u32, u32)>,
    layers: Vec<MockLayer>,
    calls: Vec<HostCall>,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            images: HashMap::new(),
            canvases: Vec::new(),
            layers: Vec::new(),
            calls: Vec::new(),
        }
    }

    /// 読み込み可能な画像を登録
    pub fn with_image(mut self, path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        self.images.insert(path.into(), (width, height));
        self
    }

    /// 呼び出し履歴
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// 作成されたキャンバス名
    pub fn canvas_names(&self) -> Vec<&str> {
        self.canvases.iter().map(|(name, _, _)| name.as_str()).collect()
    }

    /// キャンバス上のレイヤー
    pub fn layers_on(&self, canvas: CanvasId) -> Vec<LayerBounds> {
        self.layers
            .iter()
            .filter(|l| l.canvas == canvas)
            .map(|l| l.bounds)
            .collect()
    }

    fn layer_mut(&mut self, id: LayerId) -> Result<&mut MockLayer> {
        self.layers
            .get_mut(id.0)
            .ok_or(ArrangeError::UnknownLayer(id.0))
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for MockHost {
    fn create_canvas(&mut self, name: &str, width: u32, height: u32) -> Result<CanvasId> {
        self.calls.push(HostCall::CreateCanvas {
            name: name.to_string(),
            width,
            height,
        });
        self.canvases.push((name.to_string(), width, height));
        Ok(CanvasId(self.canvases.len() - 1))
    }

    fn load_layer(&mut self, canvas: CanvasId, path: &Path) -> Result<LayerId> {
        self.canvas_size(canvas)?;
        let (width, height) = *self
            .images
            .get(path)
            .ok_or_else(|| ArrangeError::ImageNotFound(path.to_path_buf()))?;

        self.calls.push(HostCall::LoadLayer {
            canvas,
            path: path.to_path_buf(),
        });
        self.layers.push(MockLayer {
            canvas,
            bounds: LayerBounds {
                x: 0.0,
                y: 0.0,
                width: width as f64,
                height: height as f64,
            },
        });
        Ok(LayerId(self.layers.len() - 1))
    }

    fn canvas_size(&self, canvas: CanvasId) -> Result<(u32, u32)> {
        self.canvases
            .get(canvas.0)
            .map(|(_, w, h)| (*w, *h))
            .ok_or(ArrangeError::UnknownCanvas(canvas.0))
    }

    fn layer_bounds(&self, layer: LayerId) -> Result<LayerBounds> {
        self.layers
            .get(layer.0)
            .map(|l| l.bounds)
            .ok_or(ArrangeError::UnknownLayer(layer.0))
    }

    fn translate_layer(&mut self, layer: LayerId, dx: f64, dy: f64) -> Result<()> {
        let bounds = &mut self.layer_mut(layer)?.bounds;
        bounds.x += dx;
        bounds.y += dy;
        self.calls.push(HostCall::Translate { layer, dx, dy });
        Ok(())
    }

    fn rotate_layer(&mut self, layer: LayerId, degrees: f64) -> Result<()> {
        let bounds = &mut self.layer_mut(layer)?.bounds;
        let center = bounds.center();
        let (w, h) = rotated_size(bounds.width as u32, bounds.height as u32, degrees);
        bounds.width = w as f64;
        bounds.height = h as f64;
        bounds.x = center.x - bounds.width / 2.0;
        bounds.y = center.y - bounds.height / 2.0;
        self.calls.push(HostCall::Rotate { layer, degrees });
        Ok(())
    }

    fn crop_layer_to_content(&mut self, layer: LayerId) -> Result<()> {
        self.layer_mut(layer)?;
        self.calls.push(HostCall::Crop { layer });
        Ok(())
    }

    fn stroke_rect(&mut self, canvas: CanvasId, rect: &BBox) -> Result<()> {
        self.canvas_size(canvas)?;
        self.calls.push(HostCall::StrokeRect {
            canvas,
            rect: *rect,
        });
        Ok(())
    }

    fn flush(&mut self) -> Result<Vec<PathBuf>> {
        self.calls.push(HostCall::Flush);
        Ok(self
            .canvases
            .iter()
            .map(|(name, _, _)| PathBuf::from(format!("{name}.png")))
            .collect())
    }
}
