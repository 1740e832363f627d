//! パーツ画像の配置
//!
//! 配置計画（`LayoutPlan`）に従ってホストを操作し、シートごとに
//! キャンバスを作ってパーツ画像を並べる。ホストへの表示更新は最後に1回だけ行う。

use crate::error::{ErrorContext, Result};
use crate::host::{CanvasId, Host, LayerId};
use crate::layout::{plan_layout, BBox, LayoutDocument, LayoutPlan, PartPlacement, UnitScale};
use crate::settings::Settings;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 配置処理の入力
pub struct ArrangeJob<'a> {
    /// パーツ画像があるディレクトリ
    pub image_dir: &'a Path,
    pub settings: &'a Settings,
    /// プログレスバーを表示する
    pub progress: bool,
}

/// 配置結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrangeReport {
    pub sheets: usize,
    pub parts: usize,
    /// 全シート処理後の縦オフセット（作者単位）
    pub total_offset: f64,
    /// ホストが書き出したファイル
    pub written: Vec<PathBuf>,
}

/// シートのキャンバス名 `<stem>-sheet-<n>`（n は 1 始まり）
pub fn canvas_name(stem: &str, sheet_index: usize) -> String {
    format!("{stem}-sheet-{}", sheet_index + 1)
}

/// パーツのバウンディングボックスをキャンバスのピクセル座標に写す
pub fn outline_rect(placement: &PartPlacement, sheet_offset: f64, unit_scale: &UnitScale) -> BBox {
    let k = unit_scale.author_to_pixels();
    let b = &placement.bbox;
    BBox {
        min_x: b.min_x * k,
        min_y: (b.min_y - sheet_offset) * k,
        max_x: b.max_x * k,
        max_y: (b.max_y - sheet_offset) * k,
    }
}

/// 1パーツの画像をキャンバスに配置する
///
/// 1. 画像をレイヤーとして読み込む
/// 2. キャンバス中央へ移動
/// 3. レイヤー中心まわりに回転
/// 4. 透明な余白を切り抜く
/// 5. レイヤー中心を原点へ移動
/// 6. 配置オフセットだけ移動
///
/// 終了時、レイヤーの中心は `placement.offset` と一致する。
pub fn place_part<H: Host>(
    host: &mut H,
    canvas: CanvasId,
    image_path: &Path,
    placement: &PartPlacement,
) -> Result<LayerId> {
    let layer = host.load_layer(canvas, image_path)?;

    let (canvas_w, canvas_h) = host.canvas_size(canvas)?;
    let loaded = host.layer_bounds(layer)?;
    host.translate_layer(
        layer,
        canvas_w as f64 / 2.0 - loaded.width / 2.0,
        canvas_h as f64 / 2.0 - loaded.height / 2.0,
    )?;

    host.rotate_layer(layer, placement.rotation)?;
    host.crop_layer_to_content(layer)?;

    let cropped = host.layer_bounds(layer)?;
    host.translate_layer(
        layer,
        -(cropped.x + cropped.width / 2.0),
        -(cropped.y + cropped.height / 2.0),
    )?;
    host.translate_layer(layer, placement.offset.x, placement.offset.y)?;

    Ok(layer)
}

/// 配置計画に従って全シートを配置する
pub fn arrange<H: Host>(
    plan: &LayoutPlan,
    job: &ArrangeJob<'_>,
    host: &mut H,
) -> Result<ArrangeReport> {
    let progress = job.progress.then(|| progress_bar(plan.part_count() as u64));
    let result = arrange_sheets(plan, job, host, progress.as_ref());
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    result
}

fn arrange_sheets<H: Host>(
    plan: &LayoutPlan,
    job: &ArrangeJob<'_>,
    host: &mut H,
    progress: Option<&ProgressBar>,
) -> Result<ArrangeReport> {
    let stem = job.settings.layout_stem();

    for sheet in &plan.sheets {
        let at_sheet = || ErrorContext::new().with_sheet(sheet.index + 1);
        let name = canvas_name(&stem, sheet.index);
        let canvas = host
            .create_canvas(&name, sheet.width_px, sheet.height_px)
            .map_err(|e| e.at(at_sheet()))?;
        log::info!(
            "Sheet {} -> '{}' ({}x{} px, {} part(s))",
            sheet.index + 1,
            name,
            sheet.width_px,
            sheet.height_px,
            sheet.parts.len()
        );

        for placement in &sheet.parts {
            let at_part = || at_sheet().with_part(&placement.id);
            if job.settings.outline {
                let rect = outline_rect(placement, sheet.sheet_offset, &plan.unit_scale);
                host.stroke_rect(canvas, &rect).map_err(|e| e.at(at_part()))?;
            }

            let image_path = job.settings.image_path(job.image_dir, &placement.image_name);
            if let Some(pb) = progress {
                pb.set_message(placement.image_name.clone());
            }
            place_part(host, canvas, &image_path, placement).map_err(|e| e.at(at_part()))?;
            log::debug!(
                "Placed '{}' x={:.2} y={:.2} rot={}",
                placement.image_name,
                placement.offset.x,
                placement.offset.y,
                placement.rotation
            );

            if let Some(pb) = progress {
                pb.inc(1);
            }
        }
    }

    let written = host.flush()?;

    Ok(ArrangeReport {
        sheets: plan.sheets.len(),
        parts: plan.part_count(),
        total_offset: plan.total_offset,
        written,
    })
}

/// レイアウトファイルを読み込み、計画して配置するまでを一括で行う
pub fn arrange_dir<H: Host>(
    dir: &Path,
    settings: &Settings,
    host: &mut H,
    progress: bool,
) -> Result<ArrangeReport> {
    let doc = LayoutDocument::load(&settings.layout_path(dir), &settings.ext)?;
    let plan = plan_layout(&doc, settings.ppi)?;
    let job = ArrangeJob {
        image_dir: dir,
        settings,
        progress,
    };
    arrange(&plan, &job, host)
}

fn progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

#[cfg(test)]
#[path = "arrange_test.rs"]
mod tests;
