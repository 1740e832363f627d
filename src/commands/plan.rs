//! nest-arrange plan コマンド
//!
//! 画像を読み込まずに、シートのキャンバスサイズとパーツの配置位置を表示する。

use super::LayoutArgs;
use crate::error::Result;
use crate::layout::{plan_layout, LayoutDocument, LayoutPlan};
use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Table};

#[derive(Debug, Parser)]
#[command(after_help = "OUTPUT FORMATS:\n  table (default)  One row per part\n  --json           The full placement plan")]
pub struct Args {
    #[command(flatten)]
    pub layout: LayoutArgs,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: Args) -> Result<()> {
    let settings = args.layout.load_settings()?.validate()?;
    let doc = LayoutDocument::load(&settings.layout_path(&args.layout.dir), &settings.ext)?;
    let plan = plan_layout(&doc, settings.ppi)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!("Layout: {}", declared_size(&doc));
        print_plan(&plan);
    }
    Ok(())
}

fn print_plan(plan: &LayoutPlan) {
    if plan.sheets.is_empty() {
        println!("Layout contains no sheets");
        return;
    }

    println!(
        "Scale: {}  Pixels per unit: {:.4}",
        plan.unit_scale.scale, plan.unit_scale.pixels_per_unit
    );
    for sheet in &plan.sheets {
        println!(
            "Sheet {}: {}x{} px (offset {})",
            sheet.index + 1,
            sheet.width_px,
            sheet.height_px,
            sheet.sheet_offset
        );
    }
    println!("{}", build_table(plan));
    println!(
        "{} part(s) on {} sheet(s)",
        plan.part_count(),
        plan.sheets.len()
    );
}

/// ルートが宣言する用紙サイズ（高さは省略されることがある）
pub fn declared_size(doc: &LayoutDocument) -> String {
    match doc.declared_height {
        Some(height) => format!("{} x {}", doc.declared_width, height),
        None => format!("{} wide", doc.declared_width),
    }
}

/// パーツごとの配置表
pub fn build_table(plan: &LayoutPlan) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Sheet", "Part", "Image", "X (px)", "Y (px)", "Rotation"]);

    for sheet in &plan.sheets {
        for part in &sheet.parts {
            table.add_row(vec![
                (sheet.index + 1).to_string(),
                part.id.clone(),
                part.image_name.clone(),
                format!("{:.1}", part.offset.x),
                format!("{:.1}", part.offset.y),
                format!("{}", part.rotation),
            ]);
        }
    }
    table
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
