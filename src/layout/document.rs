//! レイアウト SVG の読み込み
//!
//! ネスティングツールが出力した SVG を `roxmltree` でパースし、
//! シート・パーツ・バウンディングボックスを持つ型付きの構造に変換する。
//!
//! ## 入力形式
//!
//! ```text
//! <svg width="1200mm" viewBox="0 0 1200 600">
//!   <g>                                  シート
//!     <rect width="1200" height="600"/>  シートサイズ（先頭の子）
//!     <g id="p1" transform="translate(..) rotate(..)">   パーツ
//!       <image id="gear.png" .../>       画像名を持つ子
//!     </g>
//!   </g>
//! </svg>
//! ```

use super::geometry::BBox;
use super::shape::element_bbox;
use super::transform::{extract_rotation, parse_number_list, Transform};
use crate::error::{ArrangeError, ErrorContext, Result};
use crate::units::{parse_positive, Length};
use roxmltree::Node;
use serde::Serialize;
use std::path::Path;

/// ルート直下でシートとして扱わない要素
const NON_SHEET_TAGS: &[&str] = &["defs", "title", "desc", "metadata", "style"];

/// viewBox 属性
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    /// `"min-x min-y width height"` をパース（空白・カンマ区切り）
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || ArrangeError::InvalidViewBox(value.to_string());
        match parse_number_list(value).ok_or_else(invalid)?.as_slice() {
            [min_x, min_y, width, height] if width.is_finite() && *width > 0.0 => Ok(Self {
                min_x: *min_x,
                min_y: *min_y,
                width: *width,
                height: *height,
            }),
            _ => Err(invalid()),
        }
    }
}

/// 配置済みパーツ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedPart {
    /// transform を持つ要素の id
    pub id: String,
    /// 画像ファイル名（拡張子なし）
    pub image_name: String,
    /// transform 属性の生文字列
    pub transform: String,
    /// 回転角（度）
    pub rotation: f64,
    /// ルート座標系でのバウンディングボックス
    pub bbox: BBox,
}

/// 1枚のシート
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    /// 0 始まりの文書内順序
    pub index: usize,
    pub width: f64,
    pub height: f64,
    pub parts: Vec<PlacedPart>,
}

/// レイアウトファイル全体
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutDocument {
    pub declared_width: Length,
    /// ルートの `height`（省略可）
    pub declared_height: Option<Length>,
    pub view_box: ViewBox,
    pub sheets: Vec<Sheet>,
}

impl LayoutDocument {
    /// ファイルから読み込む
    pub fn load(path: &Path, ext: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ArrangeError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Parsing layout file {}", path.display());
        Self::parse(&text, ext).map_err(|e| e.at(ErrorContext::new().with_file_path(path)))
    }

    /// SVG テキストをパース
    ///
    /// `ext` は画像名から取り除く拡張子（ドットなし）。
    pub fn parse(text: &str, ext: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(text)?;
        let root = doc.root_element();

        let declared_width: Length = required_attr(root, "width")?.parse()?;
        let declared_height = root
            .attribute("height")
            .map(str::parse::<Length>)
            .transpose()?;
        let view_box = ViewBox::parse(required_attr(root, "viewBox")?)?;

        let root_ctm = match root.attribute("transform") {
            Some(value) => Transform::parse(value)?,
            None => Transform::identity(),
        };

        let sheets = root
            .children()
            .filter(|n| n.is_element() && !NON_SHEET_TAGS.contains(&n.tag_name().name()))
            .enumerate()
            .map(|(index, node)| {
                parse_sheet(index, node, &root_ctm, ext)
                    .map_err(|e| e.at(ErrorContext::new().with_sheet(index + 1)))
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "Layout: width={} height={} viewBox.width={} sheets={}",
            declared_width,
            declared_height.map_or_else(|| "-".to_string(), |h| h.to_string()),
            view_box.width,
            sheets.len()
        );

        Ok(Self {
            declared_width,
            declared_height,
            view_box,
            sheets,
        })
    }

    /// 全パーツ数
    pub fn part_count(&self) -> usize {
        self.sheets.iter().map(|s| s.parts.len()).sum()
    }
}

fn parse_sheet(
    index: usize,
    node: Node<'_, '_>,
    root_ctm: &Transform,
    ext: &str,
) -> Result<Sheet> {
    let size_box = node
        .children()
        .find(|n| n.is_element())
        .ok_or(ArrangeError::EmptySheet(index))?;
    let width = parse_positive(required_attr(size_box, "width")?, "sheet width")?;
    let height = parse_positive(required_attr(size_box, "height")?, "sheet height")?;

    // パーツの bbox にはシート自身の transform も効く
    let sheet_ctm = match node.attribute("transform") {
        Some(value) => root_ctm.then_apply_after(Transform::parse(value)?),
        None => *root_ctm,
    };

    let parts = node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() != "rect")
        .map(|part| {
            parse_part(part, &sheet_ctm, ext).map_err(|e| match part.attribute("id") {
                Some(id) => e.at(ErrorContext::new().with_part(id)),
                None => e,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Sheet {
        index,
        width,
        height,
        parts,
    })
}

fn parse_part(node: Node<'_, '_>, sheet_ctm: &Transform, ext: &str) -> Result<PlacedPart> {
    let id = required_attr(node, "id")?.to_string();
    let transform = required_attr(node, "transform")?.to_string();

    let child = node
        .children()
        .find(|n| n.is_element())
        .ok_or_else(|| ArrangeError::MissingChild {
            element: describe(node),
        })?;
    let child_id = required_attr(child, "id")?;
    let image_name = strip_extension(child_id, ext).to_string();

    let bbox = element_bbox(node, sheet_ctm)?.ok_or_else(|| ArrangeError::NoGeometry(id.clone()))?;
    let rotation = extract_rotation(&transform);

    Ok(PlacedPart {
        id,
        image_name,
        transform,
        rotation,
        bbox,
    })
}

/// `name.ext` から `.ext` を取り除く（無ければそのまま）
pub fn strip_extension<'a>(name: &'a str, ext: &str) -> &'a str {
    if ext.is_empty() {
        return name;
    }
    name.strip_suffix(ext)
        .and_then(|rest| rest.strip_suffix('.'))
        .unwrap_or(name)
}

fn required_attr<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str> {
    node.attribute(name)
        .ok_or_else(|| ArrangeError::MissingAttribute {
            element: describe(node),
            attribute: name.to_string(),
        })
}

/// エラーメッセージ用の要素表記（`g#part-1` など）
fn describe(node: Node<'_, '_>) -> String {
    match node.attribute("id") {
        Some(id) => format!("{}#{}", node.tag_name().name(), id),
        None => node.tag_name().name().to_string(),
    }
}

#[cfg(test)]
#[path = "document_test.rs"]
mod tests;
