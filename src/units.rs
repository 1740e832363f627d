//! 物理長さのパース
//!
//! `"210mm"` や `"8.5in"` のような長さ文字列を `(数値, 単位)` に分解する。
//! 未知の単位サフィックスは明示的なエラーにする。

use crate::error::{ArrangeError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// 1インチあたりのミリメートル
pub const MM_PER_INCH: f64 = 25.4;

/// CSS 参照ピクセル密度（px / in）
pub const CSS_PX_PER_INCH: f64 = 96.0;

static LENGTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)\s*([A-Za-z%]*)\s*$")
        .expect("length pattern is valid")
});

/// 長さの単位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// 単位なし。ネスティングツールの慣習に合わせてミリメートルとみなす
    UserUnit,
    Px,
    Mm,
    Cm,
    In,
    Pt,
    Pc,
}

impl Unit {
    /// サフィックス文字列を返す
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::UserUnit => "",
            Unit::Px => "px",
            Unit::Mm => "mm",
            Unit::Cm => "cm",
            Unit::In => "in",
            Unit::Pt => "pt",
            Unit::Pc => "pc",
        }
    }

    /// 1単位あたりのミリメートル
    pub fn mm_per_unit(&self) -> f64 {
        match self {
            Unit::Px => MM_PER_INCH / CSS_PX_PER_INCH,
            Unit::UserUnit | Unit::Mm => 1.0,
            Unit::Cm => 10.0,
            Unit::In => MM_PER_INCH,
            Unit::Pt => MM_PER_INCH / 72.0,
            Unit::Pc => MM_PER_INCH / 6.0,
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.to_ascii_lowercase().as_str() {
            "" => Some(Unit::UserUnit),
            "px" => Some(Unit::Px),
            "mm" => Some(Unit::Mm),
            "cm" => Some(Unit::Cm),
            "in" => Some(Unit::In),
            "pt" => Some(Unit::Pt),
            "pc" => Some(Unit::Pc),
            _ => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 単位付きの長さ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f64,
    pub unit: Unit,
}

impl Length {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// ミリメートルに換算
    pub fn to_mm(&self) -> f64 {
        self.value * self.unit.mm_per_unit()
    }
}

impl FromStr for Length {
    type Err = ArrangeError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = LENGTH_RE
            .captures(s)
            .ok_or_else(|| ArrangeError::InvalidNumber {
                value: s.to_string(),
                context: "length".to_string(),
            })?;

        let number = &caps[1];
        let suffix = &caps[2];

        let unit = Unit::from_suffix(suffix).ok_or_else(|| ArrangeError::UnknownUnit {
            value: s.to_string(),
            unit: suffix.to_string(),
        })?;

        // 幅として使うので、0 以下や桁あふれ（inf）は受け付けない
        let value = number
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
            .ok_or_else(|| ArrangeError::InvalidNumber {
                value: s.to_string(),
                context: "positive length".to_string(),
            })?;

        Ok(Length { value, unit })
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

/// 単位なしの数値属性をパース
///
/// `context` はエラーメッセージに使う（例: `"sheet width"`）。
pub fn parse_number(value: &str, context: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ArrangeError::InvalidNumber {
            value: value.to_string(),
            context: context.to_string(),
        })
}

/// 正の有限値だけを受け付ける `parse_number`
pub fn parse_positive(value: &str, context: &str) -> Result<f64> {
    parse_number(value, context).and_then(|v| {
        if v > 0.0 {
            Ok(v)
        } else {
            Err(ArrangeError::InvalidNumber {
                value: value.to_string(),
                context: context.to_string(),
            })
        }
    })
}

#[cfg(test)]
#[path = "units_test.rs"]
mod tests;
