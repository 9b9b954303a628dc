use serde::{Deserialize, Serialize};

//常用结构体与区域运算

/// 尺寸
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

/// 点坐标
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// 区域
///
/// 左上角坐标为 `start`，右下角坐标为 `end` (不含)
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: Point,
    pub end: Point,
}

impl Region {
    /// 区域宽度
    pub fn width(&self) -> i32 {
        self.end.x - self.start.x
    }

    /// 区域高度
    pub fn height(&self) -> i32 {
        self.end.y - self.start.y
    }
}

/// 将点从 `from` 坐标系等比缩放到 `to` 坐标系
///
/// # 参数
///
/// - `point` - 点坐标
/// - `from` - 原坐标系尺寸
/// - `to` - 目标坐标系尺寸
pub fn point_scale(point: &Point, from: &Size, to: &Size) -> Point {
    Point {
        x: point.x * to.width / from.width,
        y: point.y * to.height / from.height,
    }
}

/// 将区域从 `from` 坐标系等比缩放到 `to` 坐标系
///
/// # 参数
///
/// - `region` - 区域
/// - `from` - 原坐标系尺寸
/// - `to` - 目标坐标系尺寸
pub fn region_scale(region: &Region, from: &Size, to: &Size) -> Region {
    Region {
        start: point_scale(&region.start, from, to),
        end: point_scale(&region.end, from, to),
    }
}

/// 为区域增加外扩边距, 并限制在给定边界内
///
/// # 参数
///
/// - `region` - 区域
/// - `margin` - 外扩边距
/// - `bounds` - 边界尺寸
pub fn region_dilate(region: &Region, margin: i32, bounds: &Size) -> Region {
    Region {
        start: Point {
            x: (region.start.x - margin).max(0),
            y: (region.start.y - margin).max(0),
        },
        end: Point {
            x: (region.end.x + margin).min(bounds.width),
            y: (region.end.y + margin).min(bounds.height),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_width_height() {
        let region = Region {
            start: Point { x: 10, y: 20 },
            end: Point { x: 40, y: 35 },
        };
        assert_eq!(region.width(), 30);
        assert_eq!(region.height(), 15);
    }

    #[test]
    fn test_region_scale() {
        let from = Size {
            width: 960,
            height: 544,
        };
        let to = Size {
            width: 1920,
            height: 1088,
        };
        let region = Region {
            start: Point { x: 100, y: 50 },
            end: Point { x: 200, y: 100 },
        };
        assert_eq!(
            region_scale(&region, &from, &to),
            Region {
                start: Point { x: 200, y: 100 },
                end: Point { x: 400, y: 200 },
            }
        );
    }

    #[test]
    fn test_region_dilate() {
        let bounds = Size {
            width: 100,
            height: 100,
        };
        let region = Region {
            start: Point { x: 2, y: 10 },
            end: Point { x: 98, y: 20 },
        };
        assert_eq!(
            region_dilate(&region, 4, &bounds),
            Region {
                start: Point { x: 0, y: 6 },
                end: Point { x: 100, y: 24 },
            }
        );
    }
}
