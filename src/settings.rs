//! 実行設定
//!
//! TOML の設定ファイル（`--config` または `$NEST_ARRANGE_CONFIG`）から読み込み、
//! CLI フラグで上書きする。値の検証は配置処理の前に `validate` で行う。

use crate::env::EnvVar;
use crate::error::{ArrangeError, Result};
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// 設定ファイルの場所を指定する環境変数
pub const CONFIG_ENV: &str = "NEST_ARRANGE_CONFIG";

/// `config init` が書き出す既定のファイル名
pub const DEFAULT_CONFIG_FILE: &str = "nest-arrange.toml";

pub const DEFAULT_EXT: &str = "png";
pub const DEFAULT_PPI: f64 = 600.0;
pub const DEFAULT_LAYOUT_FILE: &str = "output.svg";

/// 出力ディレクトリ未指定時の、入力ディレクトリ直下のサブディレクトリ名
pub const DEFAULT_OUTPUT_SUBDIR: &str = "arranged";

/// 解像度の許容範囲（ppi）
pub const PPI_RANGE: RangeInclusive<f64> = 0.1..=9999.0;

/// 実行設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// パーツ画像の拡張子（ドットなし）
    pub ext: String,
    /// 解像度（pixels per inch）
    pub ppi: f64,
    /// 入力ディレクトリ内のレイアウトファイル名
    pub layout_file: String,
    /// 出力先。未指定なら `<dir>/arranged`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// パーツのバウンディングボックスを枠線で描く
    pub outline: bool,
    /// キャンバス背景色 `RRGGBB` / `RRGGBBAA`。未指定なら透明
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ext: DEFAULT_EXT.to_string(),
            ppi: DEFAULT_PPI,
            layout_file: DEFAULT_LAYOUT_FILE.to_string(),
            output_dir: None,
            outline: false,
            background: None,
        }
    }
}

impl Settings {
    /// 読み込む設定ファイルのパス
    ///
    /// 優先順位: 明示的な指定 > 環境変数
    pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| EnvVar::get_path(CONFIG_ENV))
    }

    /// 設定を読み込む。設定ファイルが無ければ既定値
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match Self::config_path(explicit) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// 指定ファイルから読み込む
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ArrangeError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(toml::from_str(&content)?)
    }

    /// TOML として保存（親ディレクトリも作成）
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 値を正規化して検証する
    ///
    /// - 拡張子の先頭のドットを取り除く
    /// - ppi は有限かつ `PPI_RANGE` 内
    /// - 背景色は16進表記
    pub fn validate(mut self) -> Result<Self> {
        self.ext = normalize_ext(&self.ext);
        if self.ext.is_empty() {
            return Err(ArrangeError::InvalidConfig(
                "image extension must not be empty".to_string(),
            ));
        }

        if !self.ppi.is_finite() || !PPI_RANGE.contains(&self.ppi) {
            return Err(ArrangeError::InvalidConfig(format!(
                "ppi must be between {} and {}, got {}",
                PPI_RANGE.start(),
                PPI_RANGE.end(),
                self.ppi
            )));
        }

        if self.layout_file.trim().is_empty() {
            return Err(ArrangeError::InvalidConfig(
                "layout file name must not be empty".to_string(),
            ));
        }

        self.background_color()?;
        Ok(self)
    }

    /// キャンバス背景色（未指定なら透明）
    pub fn background_color(&self) -> Result<Rgba<u8>> {
        match &self.background {
            Some(value) => parse_hex_color(value),
            None => Ok(Rgba([0, 0, 0, 0])),
        }
    }

    /// レイアウトファイルのパス
    pub fn layout_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.layout_file)
    }

    /// パーツ画像のパス `<dir>/<name>.<ext>`
    pub fn image_path(&self, dir: &Path, image_name: &str) -> PathBuf {
        dir.join(format!("{image_name}.{}", self.ext))
    }

    /// 出力ディレクトリ
    pub fn output_dir_for(&self, dir: &Path) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| dir.join(DEFAULT_OUTPUT_SUBDIR))
    }

    /// キャンバス名の接頭辞（レイアウトファイル名の拡張子を除いた部分）
    pub fn layout_stem(&self) -> String {
        Path::new(&self.layout_file)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "layout".to_string())
    }
}

/// `.png` / `png` / `..png` → `png`
pub fn normalize_ext(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_string()
}

/// `RRGGBB` / `RRGGBBAA`（先頭の `#` は任意）をパース
pub fn parse_hex_color(value: &str) -> Result<Rgba<u8>> {
    let invalid = || {
        ArrangeError::InvalidConfig(format!(
            "invalid background colour '{value}'. Expected RRGGBB or RRGGBBAA"
        ))
    };

    let hex = value.trim().trim_start_matches('#');
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return Err(invalid());
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
