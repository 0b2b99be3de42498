//! # Input 模块
//!
//! 定义 Host 向 Runtime 传递的输入事件。
//!
//! ## 设计说明
//!
//! - Runtime 不直接处理 DOM 事件，只处理语义化的输入
//! - 指针事件携带坐标，暂停判断基于坐标与滚动区域矩形的命中测试，
//!   而不是事件冒泡：区域内的收藏、加购按钮不会打断悬停暂停
//! - 命中测试通过 [`PointerBounds`] 注入，测试时不需要真实界面

use serde::{Deserialize, Serialize};

/// 轮播输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RotationInput {
    /// 上一张
    Previous,
    /// 下一张
    Next,
    /// 跳转到指定索引，越界时按列表长度取模（支持负数）
    JumpTo { index: i64 },
    /// 关闭横幅
    Dismiss,
    /// 点击当前条目的行动按钮
    ActivateCta,
}

impl RotationInput {
    pub fn jump_to(index: i64) -> Self {
        Self::JumpTo { index }
    }
}

/// 屏幕坐标
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 矩形区域
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// 指针命中测试
pub trait PointerBounds {
    /// 指针是否位于区域内
    fn contains(&self, point: Point) -> bool;
}

impl PointerBounds for Rect {
    fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

impl<F: Fn(Point) -> bool> PointerBounds for F {
    fn contains(&self, point: Point) -> bool {
        self(point)
    }
}

/// 滚动区域输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScrollInput {
    /// 指针进入区域（或区域内的子元素）
    PointerEnter { at: Point },
    /// 指针移动
    PointerMove { at: Point },
    /// 指针离开区域（或区域内的子元素）
    PointerLeave { at: Point },
    /// 触摸开始
    TouchStart,
    /// 触摸结束或取消
    TouchEnd,
    /// 滚轮，`delta_y` 为垂直方向的滚动量
    Wheel { at: Point, delta_y: f64 },
}

/// 事件处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventDisposition {
    /// 不拦截，保留浏览器默认行为
    PassThrough,
    /// 已处理，宿主应阻止默认的页面滚动
    Consumed,
}
