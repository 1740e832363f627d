//! 表示用のエラー
//!
//! `ArrangeError` にエラーコードと「どこで起きたか」（ファイル・シート・パーツ・要素）
//! を添えたもの。整形は `ErrorFormatter` が行う。

use std::path::PathBuf;

use super::code::ErrorCode;
use super::ArrangeError;

/// エラーが起きた場所
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorContext {
    pub file_path: Option<PathBuf>,
    /// 1 始まりのシート番号
    pub sheet: Option<usize>,
    pub part: Option<String>,
    /// レイアウト要素の表記（`g#part-1` など）
    pub element: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn with_sheet(mut self, sheet: usize) -> Self {
        self.sheet = Some(sheet);
        self
    }

    pub fn with_part(mut self, name: impl Into<String>) -> Self {
        self.part = Some(name.into());
        self
    }

    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// 空いている項目を `fallback` で埋める
    pub fn or(self, fallback: ErrorContext) -> Self {
        Self {
            file_path: self.file_path.or(fallback.file_path),
            sheet: self.sheet.or(fallback.sheet),
            part: self.part.or(fallback.part),
            element: self.element.or(fallback.element),
        }
    }

    /// 表示行（ファイル → シート → パーツ → 要素の順）
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(path) = &self.file_path {
            lines.push(format!("  --> {}", path.display()));
        }
        if let Some(sheet) = self.sheet {
            lines.push(format!("  --> sheet: {sheet}"));
        }
        if let Some(part) = &self.part {
            lines.push(format!("  --> part: {part}"));
        }
        if let Some(element) = &self.element {
            lines.push(format!("  --> element: <{element}>"));
        }
        lines
    }
}

/// コード・メッセージ・場所を持つエラー
#[derive(Debug)]
pub struct RichError {
    code: ErrorCode,
    message: String,
    context: ErrorContext,
    source: Option<ArrangeError>,
}

impl RichError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = context;
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &ErrorContext {
        &self.context
    }
}

impl From<ArrangeError> for RichError {
    fn from(err: ArrangeError) -> Self {
        let rich = RichError::new(err.code(), err.to_string()).with_context(err.context());
        Self {
            source: Some(err),
            ..rich
        }
    }
}

impl std::fmt::Display for RichError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error[{}]: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for RichError {
    /// メッセージは `ArrangeError` と同じなので、その下の原因から辿る
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .and_then(|e| std::error::Error::source(e.innermost()))
    }
}
