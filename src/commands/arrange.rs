//! nest-arrange arrange コマンド
//!
//! レイアウトに従ってパーツ画像を配置し、シートごとの PNG を書き出す。

use super::LayoutArgs;
use crate::arrange::arrange_dir;
use crate::error::Result;
use crate::host::RasterHost;
use crate::output::CommandSummary;
use crate::settings::Settings;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(after_help = "OUTPUT:\n  One PNG per sheet is written as <OUTPUT>/<layout-stem>-sheet-<n>.png")]
pub struct Args {
    #[command(flatten)]
    pub layout: LayoutArgs,

    /// Output directory [default: <DIR>/arranged]
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Draw each part's bounding box on the sheet background
    #[arg(long)]
    pub outline: bool,

    /// Canvas background colour as RRGGBB or RRGGBBAA [default: transparent]
    #[arg(long, value_name = "COLOR")]
    pub background: Option<String>,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// 設定ファイル + CLI フラグを検証済みの設定にまとめる
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = self.layout.load_settings()?;
        if let Some(output) = &self.output {
            settings.output_dir = Some(output.clone());
        }
        if self.outline {
            settings.outline = true;
        }
        if let Some(background) = &self.background {
            settings.background = Some(background.clone());
        }
        settings.validate()
    }
}

pub fn run(args: Args) -> Result<()> {
    let settings = args.settings()?;
    let dir = &args.layout.dir;

    let mut host = RasterHost::new(settings.output_dir_for(dir), settings.background_color()?);
    let report = arrange_dir(dir, &settings, &mut host, !args.quiet)?;

    println!("{}", CommandSummary::arranged(report.parts, report.sheets));
    for path in &report.written {
        println!("  {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
#[path = "arrange_test.rs"]
mod tests;
