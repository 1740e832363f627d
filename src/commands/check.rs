//! nest-arrange check コマンド
//!
//! レイアウトが参照するパーツ画像がディレクトリに揃っているかを確認する。

use super::LayoutArgs;
use crate::error::{ArrangeError, Result};
use crate::layout::LayoutDocument;
use crate::output::CommandSummary;
use crate::settings::Settings;
use clap::Parser;
use owo_colors::OwoColorize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
pub struct Args {
    #[command(flatten)]
    pub layout: LayoutArgs,
}

/// 画像ファイルの確認結果
#[derive(Debug, Default, PartialEq)]
pub struct ImageCheck {
    /// 参照されていて存在する画像
    pub found: Vec<PathBuf>,
    /// 参照されているが存在しない画像
    pub missing: Vec<PathBuf>,
    /// ディレクトリにあるがどのパーツからも参照されない画像
    pub unreferenced: Vec<PathBuf>,
}

/// レイアウトが参照する画像とディレクトリの中身を突き合わせる
///
/// 同じ画像を複数のパーツが参照していても1件として数える。
pub fn check_images(doc: &LayoutDocument, dir: &Path, settings: &Settings) -> Result<ImageCheck> {
    let referenced: BTreeSet<PathBuf> = doc
        .sheets
        .iter()
        .flat_map(|sheet| &sheet.parts)
        .map(|part| settings.image_path(dir, &part.image_name))
        .collect();

    let (found, missing): (Vec<PathBuf>, Vec<PathBuf>) =
        referenced.iter().cloned().partition(|path| path.is_file());

    let unreferenced = list_images(dir, &settings.ext)?
        .into_iter()
        .filter(|path| !referenced.contains(path))
        .collect();

    Ok(ImageCheck {
        found,
        missing,
        unreferenced,
    })
}

/// ディレクトリ直下の `*.<ext>` ファイル（ソート済み）
fn list_images(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let dir_pattern = glob::Pattern::escape(&dir.to_string_lossy());
    let pattern = format!("{dir_pattern}/*.{}", glob::Pattern::escape(ext));

    let entries = glob::glob(&pattern)
        .map_err(|e| ArrangeError::InvalidConfig(format!("invalid image pattern '{pattern}': {e}")))?;

    let mut images = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ArrangeError::Io(e.into_error()))?;
        if path.is_file() {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

pub fn run(args: Args) -> Result<()> {
    let settings = args.layout.load_settings()?.validate()?;
    let dir = &args.layout.dir;
    let doc = LayoutDocument::load(&settings.layout_path(dir), &settings.ext)?;

    let result = check_images(&doc, dir, &settings)?;

    for path in &result.missing {
        println!("  {} {}", "missing".red(), path.display());
    }
    for path in &result.unreferenced {
        println!("  {} {}", "unused".yellow(), path.display());
    }
    println!(
        "{}",
        CommandSummary::checked(result.found.len(), result.missing.len())
    );

    match result.missing.into_iter().next() {
        Some(first) => Err(ArrangeError::ImageNotFound(first)),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "check_test.rs"]
mod tests;
