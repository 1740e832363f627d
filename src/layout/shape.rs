//! 図形要素のバウンディングボックス
//!
//! パーツ要素以下の図形（rect, image, circle, path など）を
//! 祖先の transform をすべて適用した座標系で包むボックスを求める。

use super::geometry::{BBox, Point};
use super::transform::{parse_number_list, Transform};
use crate::error::{ArrangeError, Result};
use crate::units::parse_number;
use roxmltree::Node;

/// 円弧を折れ線近似するときの分割数
const ARC_SEGMENTS: usize = 32;

/// 要素（とその子孫）のバウンディングボックス
///
/// `ctm` は親までの累積変換。要素自身の `transform` はここで合成する。
/// 図形を1つも含まなければ `Ok(None)`。
pub fn element_bbox(node: Node<'_, '_>, ctm: &Transform) -> Result<Option<BBox>> {
    let ctm = match node.attribute("transform") {
        Some(value) => ctm.then_apply_after(Transform::parse(value)?),
        None => *ctm,
    };

    let mut bbox = own_geometry_bbox(node, &ctm)?;

    for child in node.children().filter(|n| n.is_element()) {
        if let Some(child_box) = element_bbox(child, &ctm)? {
            bbox = Some(match bbox {
                Some(b) => b.union(child_box),
                None => child_box,
            });
        }
    }

    Ok(bbox)
}

/// 要素自身が描く図形のボックス（子は含まない）
fn own_geometry_bbox(node: Node<'_, '_>, ctm: &Transform) -> Result<Option<BBox>> {
    let bbox = match node.tag_name().name() {
        "rect" | "image" | "use" => {
            let width = number_attr(node, "width")?;
            let height = number_attr(node, "height")?;
            if width == 0.0 && height == 0.0 {
                None
            } else {
                let rect = BBox::from_rect(
                    number_attr(node, "x")?,
                    number_attr(node, "y")?,
                    width,
                    height,
                );
                Some(ctm.apply_bbox(&rect))
            }
        }
        "circle" => {
            let r = number_attr(node, "r")?;
            Some(ellipse_bbox(
                ctm,
                Point::new(number_attr(node, "cx")?, number_attr(node, "cy")?),
                r,
                r,
            ))
        }
        "ellipse" => Some(ellipse_bbox(
            ctm,
            Point::new(number_attr(node, "cx")?, number_attr(node, "cy")?),
            number_attr(node, "rx")?,
            number_attr(node, "ry")?,
        )),
        "line" => {
            let p1 = Point::new(number_attr(node, "x1")?, number_attr(node, "y1")?);
            let p2 = Point::new(number_attr(node, "x2")?, number_attr(node, "y2")?);
            Some(BBox::from_point(ctm.apply(p1)).include(ctm.apply(p2)))
        }
        "polygon" | "polyline" => {
            let raw = node.attribute("points").unwrap_or("");
            let numbers = parse_number_list(raw)
                .ok_or_else(|| ArrangeError::InvalidPath(raw.to_string()))?;
            BBox::from_points(
                numbers
                    .chunks_exact(2)
                    .map(|xy| ctm.apply(Point::new(xy[0], xy[1]))),
            )
        }
        "path" => {
            let data = node.attribute("d").unwrap_or("");
            path_bbox(data, ctm)?
        }
        _ => None,
    };
    Ok(bbox)
}

/// 数値属性（無ければ 0）
fn number_attr(node: Node<'_, '_>, name: &str) -> Result<f64> {
    match node.attribute(name) {
        Some(value) => {
            let context = format!("<{}> {}", node.tag_name().name(), name);
            parse_number(value, &context)
        }
        None => Ok(0.0),
    }
}

/// アフィン変換後の楕円を包むボックス（厳密解）
fn ellipse_bbox(ctm: &Transform, center: Point, rx: f64, ry: f64) -> BBox {
    let c = ctm.apply(center);
    let half_w = ((ctm.a * rx).powi(2) + (ctm.c * ry).powi(2)).sqrt();
    let half_h = ((ctm.b * rx).powi(2) + (ctm.d * ry).powi(2)).sqrt();
    BBox {
        min_x: c.x - half_w,
        min_y: c.y - half_h,
        max_x: c.x + half_w,
        max_y: c.y + half_h,
    }
}

/// パスの線分
#[derive(Debug, Clone, Copy, PartialEq)]
enum Segment {
    Line(Point, Point),
    Quad(Point, Point, Point),
    Cubic(Point, Point, Point, Point),
}

impl Segment {
    fn transformed(&self, t: &Transform) -> Segment {
        match *self {
            Segment::Line(p0, p1) => Segment::Line(t.apply(p0), t.apply(p1)),
            Segment::Quad(p0, c, p1) => Segment::Quad(t.apply(p0), t.apply(c), t.apply(p1)),
            Segment::Cubic(p0, c1, c2, p1) => {
                Segment::Cubic(t.apply(p0), t.apply(c1), t.apply(c2), t.apply(p1))
            }
        }
    }

    fn bbox(&self) -> BBox {
        match *self {
            Segment::Line(p0, p1) => BBox::from_point(p0).include(p1),
            Segment::Quad(p0, c, p1) => {
                let mut b = BBox::from_point(p0).include(p1);
                for t in [
                    quad_extremum(p0.x, c.x, p1.x),
                    quad_extremum(p0.y, c.y, p1.y),
                ]
                .into_iter()
                .flatten()
                {
                    b = b.include(quad_point(p0, c, p1, t));
                }
                b
            }
            Segment::Cubic(p0, c1, c2, p1) => {
                let mut b = BBox::from_point(p0).include(p1);
                let roots = cubic_extrema(p0.x, c1.x, c2.x, p1.x)
                    .into_iter()
                    .chain(cubic_extrema(p0.y, c1.y, c2.y, p1.y));
                for t in roots {
                    b = b.include(cubic_point(p0, c1, c2, p1, t));
                }
                b
            }
        }
    }
}

fn quad_extremum(p0: f64, c: f64, p1: f64) -> Option<f64> {
    let denom = p0 - 2.0 * c + p1;
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let t = (p0 - c) / denom;
    (t > 0.0 && t < 1.0).then_some(t)
}

fn quad_point(p0: Point, c: Point, p1: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    Point::new(
        mt * mt * p0.x + 2.0 * mt * t * c.x + t * t * p1.x,
        mt * mt * p0.y + 2.0 * mt * t * c.y + t * t * p1.y,
    )
}

/// 3次ベジェの導関数が 0 になる t（0 < t < 1）
fn cubic_extrema(p0: f64, c1: f64, c2: f64, p1: f64) -> Vec<f64> {
    let a = p1 - 3.0 * c2 + 3.0 * c1 - p0;
    let b = 2.0 * (c2 - 2.0 * c1 + p0);
    let c = c1 - p0;

    let roots = if a.abs() < 1e-12 {
        if b.abs() < 1e-12 {
            vec![]
        } else {
            vec![-c / b]
        }
    } else {
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            vec![]
        } else {
            let sq = disc.sqrt();
            vec![(-b + sq) / (2.0 * a), (-b - sq) / (2.0 * a)]
        }
    };

    roots.into_iter().filter(|t| *t > 0.0 && *t < 1.0).collect()
}

fn cubic_point(p0: Point, c1: Point, c2: Point, p1: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let w0 = mt * mt * mt;
    let w1 = 3.0 * mt * mt * t;
    let w2 = 3.0 * mt * t * t;
    let w3 = t * t * t;
    Point::new(
        w0 * p0.x + w1 * c1.x + w2 * c2.x + w3 * p1.x,
        w0 * p0.y + w1 * c1.y + w2 * c2.y + w3 * p1.y,
    )
}

/// パスデータ `d` のバウンディングボックス
fn path_bbox(data: &str, ctm: &Transform) -> Result<Option<BBox>> {
    let segments = parse_path(data)?;
    Ok(segments
        .iter()
        .map(|s| s.transformed(ctm).bbox())
        .reduce(BBox::union))
}

/// パスデータの字句カーソル
struct PathCursor<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> PathCursor<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn skip_separators(&mut self) {
        while self.pos < self.bytes.len()
            && (self.bytes[self.pos].is_ascii_whitespace() || self.bytes[self.pos] == b',')
        {
            self.pos += 1;
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_separators();
        self.pos >= self.bytes.len()
    }

    /// 次がコマンド文字ならそれを消費して返す
    fn command(&mut self) -> Option<u8> {
        self.skip_separators();
        let b = *self.bytes.get(self.pos)?;
        if b.is_ascii_alphabetic() && b != b'e' && b != b'E' {
            self.pos += 1;
            Some(b)
        } else {
            None
        }
    }

    fn number(&mut self) -> Result<f64> {
        self.skip_separators();
        let start = self.pos;
        let bytes = self.bytes;
        let mut i = start;

        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let mut seen_dot = false;
        let mut seen_digit = false;
        while let Some(&b) = bytes.get(i) {
            if b.is_ascii_digit() {
                seen_digit = true;
            } else if b == b'.' && !seen_dot {
                seen_dot = true;
            } else {
                break;
            }
            i += 1;
        }
        if seen_digit && matches!(bytes.get(i), Some(b'e' | b'E')) {
            let mut j = i + 1;
            if matches!(bytes.get(j), Some(b'+' | b'-')) {
                j += 1;
            }
            if matches!(bytes.get(j), Some(b) if b.is_ascii_digit()) {
                while matches!(bytes.get(j), Some(b) if b.is_ascii_digit()) {
                    j += 1;
                }
                i = j;
            }
        }

        if !seen_digit {
            return Err(self.error());
        }
        self.pos = i;
        self.src[start..i].parse::<f64>().map_err(|_| self.error())
    }

    /// 円弧フラグ（区切りなしの "0"/"1" を許す）
    fn flag(&mut self) -> Result<bool> {
        self.skip_separators();
        match self.bytes.get(self.pos) {
            Some(b'0') => {
                self.pos += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(true)
            }
            _ => Err(self.error()),
        }
    }

    fn point(&mut self) -> Result<Point> {
        Ok(Point::new(self.number()?, self.number()?))
    }

    fn error(&self) -> ArrangeError {
        ArrangeError::InvalidPath(format!("{} (at offset {})", self.src, self.pos))
    }
}

/// パスデータを絶対座標の線分列に変換
fn parse_path(data: &str) -> Result<Vec<Segment>> {
    let mut cursor = PathCursor::new(data);
    let mut segments = Vec::new();

    let mut current = Point::new(0.0, 0.0);
    let mut subpath_start = current;
    // S/T の反射用に直前の制御点を保持
    let mut last_cubic_ctrl: Option<Point> = None;
    let mut last_quad_ctrl: Option<Point> = None;
    let mut command: Option<u8> = None;

    while !cursor.at_end() {
        let cmd = match cursor.command() {
            Some(c) => c,
            None => match command {
                // 暗黙の繰り返し。M の後は L として扱う
                Some(b'M') => b'L',
                Some(b'm') => b'l',
                Some(c) if !matches!(c, b'Z' | b'z') => c,
                _ => return Err(cursor.error()),
            },
        };
        command = Some(cmd);
        let relative = cmd.is_ascii_lowercase();
        let origin = if relative { current } else { Point::new(0.0, 0.0) };
        let offset = |p: Point| Point::new(p.x + origin.x, p.y + origin.y);

        let mut next_cubic_ctrl = None;
        let mut next_quad_ctrl = None;

        match cmd.to_ascii_uppercase() {
            b'M' => {
                current = offset(cursor.point()?);
                subpath_start = current;
            }
            b'L' => {
                let p = offset(cursor.point()?);
                segments.push(Segment::Line(current, p));
                current = p;
            }
            b'H' => {
                let x = cursor.number()? + origin.x;
                let p = Point::new(x, current.y);
                segments.push(Segment::Line(current, p));
                current = p;
            }
            b'V' => {
                let y = cursor.number()? + origin.y;
                let p = Point::new(current.x, y);
                segments.push(Segment::Line(current, p));
                current = p;
            }
            b'C' => {
                let c1 = offset(cursor.point()?);
                let c2 = offset(cursor.point()?);
                let p = offset(cursor.point()?);
                segments.push(Segment::Cubic(current, c1, c2, p));
                next_cubic_ctrl = Some(c2);
                current = p;
            }
            b'S' => {
                let c1 = reflect(last_cubic_ctrl, current);
                let c2 = offset(cursor.point()?);
                let p = offset(cursor.point()?);
                segments.push(Segment::Cubic(current, c1, c2, p));
                next_cubic_ctrl = Some(c2);
                current = p;
            }
            b'Q' => {
                let c = offset(cursor.point()?);
                let p = offset(cursor.point()?);
                segments.push(Segment::Quad(current, c, p));
                next_quad_ctrl = Some(c);
                current = p;
            }
            b'T' => {
                let c = reflect(last_quad_ctrl, current);
                let p = offset(cursor.point()?);
                segments.push(Segment::Quad(current, c, p));
                next_quad_ctrl = Some(c);
                current = p;
            }
            b'A' => {
                let rx = cursor.number()?;
                let ry = cursor.number()?;
                let rotation = cursor.number()?;
                let large_arc = cursor.flag()?;
                let sweep = cursor.flag()?;
                let p = offset(cursor.point()?);
                let arc = ArcParams {
                    rx,
                    ry,
                    rotation,
                    large_arc,
                    sweep,
                };
                segments.extend(arc_to_lines(current, p, arc));
                current = p;
            }
            b'Z' => {
                if current != subpath_start {
                    segments.push(Segment::Line(current, subpath_start));
                }
                current = subpath_start;
            }
            _ => return Err(cursor.error()),
        }

        last_cubic_ctrl = next_cubic_ctrl;
        last_quad_ctrl = next_quad_ctrl;
    }

    Ok(segments)
}

fn reflect(ctrl: Option<Point>, about: Point) -> Point {
    match ctrl {
        Some(c) => Point::new(2.0 * about.x - c.x, 2.0 * about.y - c.y),
        None => about,
    }
}

#[derive(Debug, Clone, Copy)]
struct ArcParams {
    rx: f64,
    ry: f64,
    rotation: f64,
    large_arc: bool,
    sweep: bool,
}

/// 端点表現の楕円弧を中心表現に直し、折れ線で近似する
fn arc_to_lines(p0: Point, p1: Point, arc: ArcParams) -> Vec<Segment> {
    let mut rx = arc.rx.abs();
    let mut ry = arc.ry.abs();
    if rx == 0.0 || ry == 0.0 || p0 == p1 {
        return vec![Segment::Line(p0, p1)];
    }

    let (sin_phi, cos_phi) = arc.rotation.to_radians().sin_cos();
    let dx = (p0.x - p1.x) / 2.0;
    let dy = (p0.y - p1.y) / 2.0;
    let x1p = cos_phi * dx + sin_phi * dy;
    let y1p = -sin_phi * dx + cos_phi * dy;

    // 半径が足りなければ拡大する
    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    let num = rx * rx * ry * ry - rx * rx * y1p * y1p - ry * ry * x1p * x1p;
    let den = rx * rx * y1p * y1p + ry * ry * x1p * x1p;
    let mut coef = (num / den).max(0.0).sqrt();
    if arc.large_arc == arc.sweep {
        coef = -coef;
    }
    let cxp = coef * rx * y1p / ry;
    let cyp = -coef * ry * x1p / rx;

    let cx = cos_phi * cxp - sin_phi * cyp + (p0.x + p1.x) / 2.0;
    let cy = sin_phi * cxp + cos_phi * cyp + (p0.y + p1.y) / 2.0;

    let angle = |ux: f64, uy: f64, vx: f64, vy: f64| (ux * vy - uy * vx).atan2(ux * vx + uy * vy);
    let theta1 = angle(1.0, 0.0, (x1p - cxp) / rx, (y1p - cyp) / ry);
    let mut delta = angle(
        (x1p - cxp) / rx,
        (y1p - cyp) / ry,
        (-x1p - cxp) / rx,
        (-y1p - cyp) / ry,
    );
    if !arc.sweep && delta > 0.0 {
        delta -= std::f64::consts::TAU;
    } else if arc.sweep && delta < 0.0 {
        delta += std::f64::consts::TAU;
    }

    let point_at = |theta: f64| {
        let (s, c) = theta.sin_cos();
        Point::new(
            cx + rx * c * cos_phi - ry * s * sin_phi,
            cy + rx * c * sin_phi + ry * s * cos_phi,
        )
    };

    let mut lines = Vec::with_capacity(ARC_SEGMENTS);
    let mut prev = p0;
    for i in 1..=ARC_SEGMENTS {
        let next = if i == ARC_SEGMENTS {
            p1
        } else {
            point_at(theta1 + delta * (i as f64) / (ARC_SEGMENTS as f64))
        };
        lines.push(Segment::Line(prev, next));
        prev = next;
    }
    lines
}

#[cfg(test)]
#[path = "shape_test.rs"]
mod tests;
