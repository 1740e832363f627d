//! ネスティングレイアウト
//!
//! レイアウト SVG の読み込みと、パーツ配置のピクセル座標計算。

pub mod document;
pub mod geometry;
pub mod mapper;
pub mod shape;
pub mod transform;

pub use document::{LayoutDocument, PlacedPart, Sheet, ViewBox};
pub use geometry::{BBox, Point};
pub use mapper::{plan_layout, LayoutPlan, PartPlacement, SheetPlan, UnitScale, MAX_CANVAS_PIXELS};
pub use transform::{extract_rotation, Transform};
