//! SVG transform 属性
//!
//! `transform="translate(10 20) rotate(30)"` を 2D アフィン行列に変換する。
//! 回転角の抽出（`extract_rotation`）は行列とは独立に、
//! 文字列中の `rotate(...)` トークンだけを見る。

use super::geometry::{BBox, Point};
use crate::error::{ArrangeError, Result};
use regex::Regex;
use std::sync::LazyLock;

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("number pattern is valid")
});

static FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z]+)\s*\(([^)]*)\)").expect("transform pattern is valid")
});

static ROTATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"rotate\(\s*([+-]?\d*\.?\d+(?:[eE][+-]?\d+)?)(?:[\s,]+[^)]*)?\s*\)")
        .expect("rotate pattern is valid")
});

/// `rotate(angle)` トークンから回転角（度）を取り出す
///
/// トークンが無ければ 0.0。`rotate(angle cx cy)` の中心指定は無視する。
/// 複数ある場合は最初のトークンを使う。
pub fn extract_rotation(transform: &str) -> f64 {
    ROTATE_RE
        .captures(transform)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// 区切り（空白・カンマ）付き数値列をパース
///
/// `"10-5"` のような区切りなしの符号も SVG の規則通りに分割する。
pub(crate) fn parse_number_list(input: &str) -> Option<Vec<f64>> {
    let mut numbers = Vec::new();
    let mut last_end = 0;

    for m in NUMBER_RE.find_iter(input) {
        if !is_separator(&input[last_end..m.start()]) {
            return None;
        }
        numbers.push(m.as_str().parse::<f64>().ok()?);
        last_end = m.end();
    }

    if !is_separator(&input[last_end..]) {
        return None;
    }
    Some(numbers)
}

fn is_separator(s: &str) -> bool {
    s.chars().all(|c| c.is_whitespace() || c == ',')
}

/// 2D アフィン変換（SVG の `matrix(a b c d e f)` と同じ並び）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// 原点まわりの回転（度、y 軸下向きで時計回り）
    pub fn rotate(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// 指定点まわりの回転
    pub fn rotate_about(degrees: f64, cx: f64, cy: f64) -> Self {
        Self::translate(cx, cy)
            .then_apply_after(Self::rotate(degrees))
            .then_apply_after(Self::translate(-cx, -cy))
    }

    pub fn skew_x(degrees: f64) -> Self {
        Self::new(1.0, 0.0, degrees.to_radians().tan(), 1.0, 0.0, 0.0)
    }

    pub fn skew_y(degrees: f64) -> Self {
        Self::new(1.0, degrees.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
    }

    /// `self * inner`: 先に `inner`、次に `self` を適用する合成
    pub fn then_apply_after(self, inner: Transform) -> Self {
        Self {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            e: self.a * inner.e + self.c * inner.f + self.e,
            f: self.b * inner.e + self.d * inner.f + self.f,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// ボックスの4隅を変換し、それを包むボックスを返す
    pub fn apply_bbox(&self, bbox: &BBox) -> BBox {
        let [p0, p1, p2, p3] = bbox.corners().map(|p| self.apply(p));
        BBox::from_point(p0).include(p1).include(p2).include(p3)
    }

    /// transform 属性をパース
    ///
    /// 関数は左から順に合成される（SVG の規則: 右端が最初に点へ作用する）。
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || ArrangeError::InvalidTransform(input.to_string());

        let mut result = Transform::identity();
        let mut last_end = 0;

        for caps in FUNCTION_RE.captures_iter(input) {
            let whole = caps.get(0).ok_or_else(invalid)?;
            if !is_separator(&input[last_end..whole.start()]) {
                return Err(invalid());
            }
            last_end = whole.end();

            let args = parse_number_list(&caps[2]).ok_or_else(invalid)?;
            let step = match (&caps[1], args.as_slice()) {
                ("matrix", [a, b, c, d, e, f]) => Transform::new(*a, *b, *c, *d, *e, *f),
                ("translate", [tx]) => Transform::translate(*tx, 0.0),
                ("translate", [tx, ty]) => Transform::translate(*tx, *ty),
                ("scale", [s]) => Transform::scale(*s, *s),
                ("scale", [sx, sy]) => Transform::scale(*sx, *sy),
                ("rotate", [angle]) => Transform::rotate(*angle),
                ("rotate", [angle, cx, cy]) => Transform::rotate_about(*angle, *cx, *cy),
                ("skewX", [angle]) => Transform::skew_x(*angle),
                ("skewY", [angle]) => Transform::skew_y(*angle),
                _ => return Err(invalid()),
            };
            result = result.then_apply_after(step);
        }

        if !is_separator(&input[last_end..]) {
            return Err(invalid());
        }
        Ok(result)
    }
}

#[cfg(test)]
#[path = "transform_test.rs"]
mod tests;
