//! レイアウト座標からピクセル配置への変換
//!
//! 作者単位（viewBox 座標）で表されたパーツ中心を、
//! 単位スケールと解像度を使ってシートキャンバス上のピクセル位置に写す。
//! すべて純粋関数。シートの縦オフセットは引数として明示的に受け渡す。

use super::document::{LayoutDocument, PlacedPart, Sheet};
use super::geometry::{BBox, Point};
use crate::error::{ArrangeError, Result};
use crate::units::{Length, MM_PER_INCH};
use serde::Serialize;

/// 単位スケールと解像度
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnitScale {
    /// 宣言幅 ÷ viewBox 幅（宣言単位 / 作者単位）
    pub scale: f64,
    /// 宣言単位あたりのピクセル
    pub pixels_per_unit: f64,
}

impl UnitScale {
    pub fn new(declared_width: Length, view_box_width: f64, ppi: f64) -> Self {
        Self {
            scale: scale_factor(declared_width, view_box_width),
            pixels_per_unit: pixels_per_unit(ppi, declared_width),
        }
    }

    /// 作者単位 → ピクセルの倍率
    pub fn author_to_pixels(&self) -> f64 {
        self.scale * self.pixels_per_unit
    }
}

/// 宣言幅 ÷ viewBox 幅
pub fn scale_factor(declared_width: Length, view_box_width: f64) -> f64 {
    declared_width.value / view_box_width
}

/// 宣言幅の単位1つあたりのピクセル数
///
/// ミリメートルなら `ppi / 25.4`、インチなら `ppi`。
pub fn pixels_per_unit(ppi: f64, declared_width: Length) -> f64 {
    ppi / MM_PER_INCH * declared_width.unit.mm_per_unit()
}

/// バウンディングボックスの中心
pub fn part_center(bbox: &BBox) -> Point {
    bbox.center()
}

/// パーツ中心のピクセル位置
///
/// `(cx * s * ppu, (cy - sheet_offset) * s * ppu)`
pub fn placement_offset(
    center: Point,
    sheet_offset: f64,
    scale: f64,
    pixels_per_unit: f64,
) -> Point {
    Point::new(
        center.x * scale * pixels_per_unit,
        (center.y - sheet_offset) * scale * pixels_per_unit,
    )
}

/// シートを処理した後の縦オフセット
pub fn next_sheet_offset(sheet_offset: f64, sheet: &Sheet) -> f64 {
    sheet_offset + sheet.height
}

/// 各シートの処理開始時点の縦オフセット（先頭は 0）
pub fn sheet_offsets(sheets: &[Sheet]) -> Vec<f64> {
    sheets
        .iter()
        .scan(0.0, |offset, sheet| {
            let current = *offset;
            *offset = next_sheet_offset(current, sheet);
            Some(current)
        })
        .collect()
}

/// 1キャンバスの画素数の上限（RGBA で 4 GiB）
pub const MAX_CANVAS_PIXELS: u64 = 1 << 30;

/// シートキャンバスのピクセルサイズ（切り上げ、最小 1）
///
/// 各辺が `u32` に収まらないとき、または画素数が `MAX_CANVAS_PIXELS` を
/// 超えるときは `CanvasTooLarge`。
pub fn canvas_size(sheet: &Sheet, unit_scale: &UnitScale) -> Result<(u32, u32)> {
    let factor = unit_scale.author_to_pixels();
    let width = (sheet.width * factor).ceil();
    let height = (sheet.height * factor).ceil();
    let too_large = || ArrangeError::CanvasTooLarge {
        sheet: sheet.index,
        width,
        height,
    };

    let fits = |v: f64| v.is_finite() && v <= u32::MAX as f64;
    if !fits(width) || !fits(height) {
        return Err(too_large());
    }
    let (w, h) = (width.max(1.0) as u32, height.max(1.0) as u32);
    if u64::from(w) * u64::from(h) > MAX_CANVAS_PIXELS {
        return Err(too_large());
    }
    Ok((w, h))
}

/// 1パーツの配置結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartPlacement {
    pub id: String,
    pub image_name: String,
    pub rotation: f64,
    /// 作者単位での中心
    pub center: Point,
    /// キャンバス上の中心（ピクセル）
    pub offset: Point,
    /// 作者単位でのバウンディングボックス
    pub bbox: BBox,
}

/// 1シートの配置計画
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetPlan {
    pub index: usize,
    pub width_px: u32,
    pub height_px: u32,
    /// このシートより前のシート高さの合計（作者単位）
    pub sheet_offset: f64,
    pub parts: Vec<PartPlacement>,
}

/// レイアウト全体の配置計画
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutPlan {
    pub unit_scale: UnitScale,
    pub sheets: Vec<SheetPlan>,
    /// 全シート処理後の縦オフセット
    pub total_offset: f64,
}

impl LayoutPlan {
    pub fn part_count(&self) -> usize {
        self.sheets.iter().map(|s| s.parts.len()).sum()
    }
}

/// 1パーツを配置
pub fn place_part(part: &PlacedPart, sheet_offset: f64, unit_scale: &UnitScale) -> PartPlacement {
    let center = part_center(&part.bbox);
    let offset = placement_offset(
        center,
        sheet_offset,
        unit_scale.scale,
        unit_scale.pixels_per_unit,
    );
    PartPlacement {
        id: part.id.clone(),
        image_name: part.image_name.clone(),
        rotation: part.rotation,
        center,
        offset,
        bbox: part.bbox,
    }
}

/// 1シートを配置
pub fn plan_sheet(sheet: &Sheet, sheet_offset: f64, unit_scale: &UnitScale) -> Result<SheetPlan> {
    let (width_px, height_px) = canvas_size(sheet, unit_scale)?;
    Ok(SheetPlan {
        index: sheet.index,
        width_px,
        height_px,
        sheet_offset,
        parts: sheet
            .parts
            .iter()
            .map(|part| place_part(part, sheet_offset, unit_scale))
            .collect(),
    })
}

/// レイアウト全体を配置
///
/// シートは文書順に処理し、縦オフセットはファイルごとに 0 から積み上げる。
pub fn plan_layout(doc: &LayoutDocument, ppi: f64) -> Result<LayoutPlan> {
    let unit_scale = UnitScale::new(doc.declared_width, doc.view_box.width, ppi);

    let sheets = doc
        .sheets
        .iter()
        .zip(sheet_offsets(&doc.sheets))
        .map(|(sheet, offset)| plan_sheet(sheet, offset, &unit_scale))
        .collect::<Result<Vec<_>>>()?;
    let total_offset = doc.sheets.iter().fold(0.0, next_sheet_offset);

    Ok(LayoutPlan {
        unit_scale,
        sheets,
        total_offset,
    })
}

#[cfg(test)]
#[path = "mapper_test.rs"]
mod tests;
