//! 2D 幾何プリミティブ

use serde::Serialize;

/// 2D 点
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 軸平行バウンディングボックス
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BBox {
    /// 1点だけを含むボックス
    pub fn from_point(p: Point) -> Self {
        Self {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }

    /// 左上と幅・高さから作成
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            min_x: x.min(x + width),
            min_y: y.min(y + height),
            max_x: x.max(x + width),
            max_y: y.max(y + height),
        }
    }

    /// 点列を包むボックス（空なら None）
    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Option<Self> {
        points.into_iter().fold(None, |acc: Option<BBox>, p| match acc {
            Some(b) => Some(b.include(p)),
            None => Some(BBox::from_point(p)),
        })
    }

    /// 点を含むように拡張
    pub fn include(self, p: Point) -> Self {
        Self {
            min_x: self.min_x.min(p.x),
            min_y: self.min_y.min(p.y),
            max_x: self.max_x.max(p.x),
            max_y: self.max_y.max(p.y),
        }
    }

    pub fn union(self, other: BBox) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// 中心点
    pub fn center(&self) -> Point {
        Point::new(
            self.min_x + self.width() / 2.0,
            self.min_y + self.height() / 2.0,
        )
    }

    /// 4隅
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_is_midpoint() {
        let b = BBox::from_rect(10.0, 20.0, 30.0, 40.0);
        assert_eq!(b.center(), Point::new(25.0, 40.0));
    }

    #[test]
    fn test_from_rect_normalizes_negative_size() {
        let b = BBox::from_rect(10.0, 10.0, -4.0, -6.0);
        assert_eq!(b.min_x, 6.0);
        assert_eq!(b.min_y, 4.0);
        assert_eq!(b.width(), 4.0);
        assert_eq!(b.height(), 6.0);
    }

    #[test]
    fn test_from_points_empty_is_none() {
        assert!(BBox::from_points(Vec::new()).is_none());
    }

    #[test]
    fn test_union() {
        let a = BBox::from_rect(0.0, 0.0, 1.0, 1.0);
        let b = BBox::from_rect(5.0, -2.0, 1.0, 1.0);
        let u = a.union(b);
        assert_eq!((u.min_x, u.min_y, u.max_x, u.max_y), (0.0, -2.0, 6.0, 1.0));
    }
}
