//! エラー型
//!
//! 実行を中断する失敗はすべて `ArrangeError` に集約する。
//! CLI への表示は `RichError` + `ErrorFormatter` が担当する。

pub mod code;
pub mod formatter;
pub mod rich;

pub use code::ErrorCode;
pub use formatter::ErrorFormatter;
pub use rich::{ErrorContext, RichError};

use std::path::PathBuf;
use thiserror::Error;

/// nest-arrange 統一エラー型
#[derive(Debug, Error)]
pub enum ArrangeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed layout XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Element <{element}> is missing attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    #[error("Element <{element}> has no child element")]
    MissingChild { element: String },

    #[error("Invalid number '{value}' in {context}")]
    InvalidNumber { value: String, context: String },

    #[error("Unknown unit '{unit}' in length '{value}'")]
    UnknownUnit { value: String, unit: String },

    #[error("Invalid viewBox '{0}'. Expected 'min-x min-y width height' with width > 0")]
    InvalidViewBox(String),

    #[error("Invalid transform '{0}'")]
    InvalidTransform(String),

    #[error("Invalid path data: {0}")]
    InvalidPath(String),

    #[error("Sheet {0} has no size element")]
    EmptySheet(usize),

    #[error("Part '{0}' has no measurable geometry")]
    NoGeometry(String),

    #[error("Part image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("JSON serialize error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown canvas: {0}")]
    UnknownCanvas(usize),

    #[error("Unknown layer: {0}")]
    UnknownLayer(usize),

    #[error("Sheet {sheet} needs a {width}x{height} px canvas, which is too large. Lower --ppi")]
    CanvasTooLarge {
        sheet: usize,
        width: f64,
        height: f64,
    },

    /// 発生場所を添えたエラー（表示は元のエラーのまま）
    #[error("{inner}")]
    Located {
        location: ErrorContext,
        inner: Box<ArrangeError>,
    },
}

pub type Result<T> = std::result::Result<T, ArrangeError>;

impl ArrangeError {
    /// 対応するエラーコード
    pub fn code(&self) -> ErrorCode {
        match self {
            ArrangeError::Located { inner, .. } => inner.code(),
            ArrangeError::Io(e) | ArrangeError::ReadFile { source: e, .. } => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::Io001,
                std::io::ErrorKind::PermissionDenied => ErrorCode::Io002,
                _ => ErrorCode::Io003,
            },
            ArrangeError::Xml(_) => ErrorCode::Lay001,
            ArrangeError::MissingAttribute { .. } | ArrangeError::MissingChild { .. } => {
                ErrorCode::Lay002
            }
            ArrangeError::InvalidNumber { .. }
            | ArrangeError::InvalidViewBox(_)
            | ArrangeError::InvalidTransform(_)
            | ArrangeError::InvalidPath(_) => ErrorCode::Lay003,
            ArrangeError::EmptySheet(_) | ArrangeError::NoGeometry(_) => ErrorCode::Lay004,
            ArrangeError::CanvasTooLarge { .. } => ErrorCode::Lay005,
            ArrangeError::UnknownUnit { .. } => ErrorCode::Unt001,
            ArrangeError::ImageNotFound(_) => ErrorCode::Img001,
            ArrangeError::Image(_) => ErrorCode::Img002,
            ArrangeError::InvalidConfig(_) => ErrorCode::Cfg001,
            ArrangeError::ConfigParse(_) | ArrangeError::ConfigSerialize(_) => ErrorCode::Cfg002,
            ArrangeError::UnknownCanvas(_) | ArrangeError::UnknownLayer(_) => ErrorCode::Hst001,
            ArrangeError::Json(_) => ErrorCode::Int001,
        }
    }

    /// エラーが起きた場所
    pub fn context(&self) -> ErrorContext {
        let context = ErrorContext::new();
        match self {
            ArrangeError::ReadFile { path, .. } | ArrangeError::ImageNotFound(path) => {
                context.with_file_path(path.clone())
            }
            ArrangeError::MissingAttribute { element, .. } | ArrangeError::MissingChild { element } => {
                context.with_element(element.clone())
            }
            ArrangeError::NoGeometry(part) => context.with_part(part.clone()),
            ArrangeError::EmptySheet(index) | ArrangeError::CanvasTooLarge { sheet: index, .. } => {
                context.with_sheet(index + 1)
            }
            ArrangeError::Located { location, inner } => inner.context().or(location.clone()),
            _ => context,
        }
    }

    /// 発生場所を添える。既に場所があれば、空いている項目だけを埋める
    pub fn at(self, location: ErrorContext) -> Self {
        match self {
            ArrangeError::Located {
                location: known,
                inner,
            } => ArrangeError::Located {
                location: known.or(location),
                inner,
            },
            other => ArrangeError::Located {
                location,
                inner: Box::new(other),
            },
        }
    }

    /// 場所の包みを外した元のエラー
    pub fn innermost(&self) -> &ArrangeError {
        match self {
            ArrangeError::Located { inner, .. } => inner.innermost(),
            other => other,
        }
    }

    /// CLI 表示用の RichError に変換
    pub fn into_rich(self) -> RichError {
        RichError::from(self)
    }
}
