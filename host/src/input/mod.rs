//! # Input 模块
//!
//! 宿主输入事件与脚本化场景。
//!
//! ## 设计说明
//!
//! - `HostEvent` 是页面层面的语义事件，由宿主分发到对应控制器
//! - headless 模拟从 JSON 场景文件读取按时间排列的事件
//! - `Scenario` 按虚拟时间依次吐出到期事件

use std::fs;
use std::path::Path;
use std::time::Duration;

use promo_runtime::{ItemId, Point, RotationInput, ScrollInput};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 页面事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// 指针移动到坐标处
    PointerMove { x: f64, y: f64 },
    /// 指针进入货架（或其子元素）
    PointerEnter { x: f64, y: f64 },
    /// 指针离开货架（或其子元素）
    PointerLeave { x: f64, y: f64 },
    TouchStart,
    TouchEnd,
    /// 滚轮
    Wheel { x: f64, y: f64, delta_y: f64 },
    /// 横幅上一张
    Previous,
    /// 横幅下一张
    Next,
    /// 横幅跳转到指定索引
    JumpTo { index: i64 },
    /// 关闭横幅
    Dismiss,
    /// 点击横幅行动按钮
    ActivateCta,
    /// 点击货架卡片
    ActivateCard { id: ItemId },
    /// 切换收藏
    ToggleFavorite { id: ItemId },
    /// 切换门店位置，触发重新拉取
    ChangeLocation { location: Option<String> },
    /// 重新拉取
    Refresh,
}

/// 事件的目标
#[derive(Debug, Clone, PartialEq)]
pub enum RoutedInput {
    Rotation(RotationInput),
    Scroll(ScrollInput),
    /// 由宿主自己处理
    Host,
}

impl HostEvent {
    /// 转换为控制器输入
    pub fn route(&self) -> RoutedInput {
        match self {
            Self::PointerMove { x, y } => RoutedInput::Scroll(ScrollInput::PointerMove {
                at: Point::new(*x, *y),
            }),
            Self::PointerEnter { x, y } => RoutedInput::Scroll(ScrollInput::PointerEnter {
                at: Point::new(*x, *y),
            }),
            Self::PointerLeave { x, y } => RoutedInput::Scroll(ScrollInput::PointerLeave {
                at: Point::new(*x, *y),
            }),
            Self::TouchStart => RoutedInput::Scroll(ScrollInput::TouchStart),
            Self::TouchEnd => RoutedInput::Scroll(ScrollInput::TouchEnd),
            Self::Wheel { x, y, delta_y } => RoutedInput::Scroll(ScrollInput::Wheel {
                at: Point::new(*x, *y),
                delta_y: *delta_y,
            }),
            Self::Previous => RoutedInput::Rotation(RotationInput::Previous),
            Self::Next => RoutedInput::Rotation(RotationInput::Next),
            Self::JumpTo { index } => RoutedInput::Rotation(RotationInput::jump_to(*index)),
            Self::Dismiss => RoutedInput::Rotation(RotationInput::Dismiss),
            Self::ActivateCta => RoutedInput::Rotation(RotationInput::ActivateCta),
            Self::ActivateCard { .. }
            | Self::ToggleFavorite { .. }
            | Self::ChangeLocation { .. }
            | Self::Refresh => RoutedInput::Host,
        }
    }
}

/// 带时间戳的事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    /// 相对模拟开始的毫秒数
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: HostEvent,
}

/// 场景加载错误
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("读取场景文件失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("场景文件解析失败: {0}")]
    Parse(#[from] serde_json::Error),
}

/// 按时间排列的事件序列
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    events: Vec<TimedEvent>,
    cursor: usize,
}

impl Scenario {
    /// 创建场景，事件按时间稳定排序
    pub fn new(mut events: Vec<TimedEvent>) -> Self {
        events.sort_by_key(|event| event.at_ms);
        Self { events, cursor: 0 }
    }

    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        let events: Vec<TimedEvent> = serde_json::from_str(json)?;
        Ok(Self::new(events))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// 剩余事件数
    pub fn remaining(&self) -> usize {
        self.events.len() - self.cursor
    }

    /// 取出所有不晚于 `now` 的事件
    pub fn drain_due(&mut self, now: Duration) -> Vec<HostEvent> {
        let now_ms = now.as_millis();
        let mut due = Vec::new();

        while let Some(next) = self.events.get(self.cursor)
            && u128::from(next.at_ms) <= now_ms
        {
            due.push(next.event.clone());
            self.cursor += 1;
        }

        due
    }
}
