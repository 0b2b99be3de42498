//! # Command 模块
//!
//! 定义 Runtime 向 Host 发出的所有指令。
//! Command 是 Runtime 与 Host 之间的**唯一通信方式**。
//!
//! ## 设计原则
//!
//! - **声明式**：Command 描述"显示什么"，不描述"怎么画"
//! - **无副作用**：追踪请求和跳转都由 Host 执行
//! - **渲染无关**：只携带已解析的路径和索引，不含任何界面类型

use serde::{Deserialize, Serialize};

use crate::item::{ItemId, TransitionStyle};
use crate::media::ResolvedMedia;

/// Runtime 向 Host 发出的指令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// 显示加载占位
    ShowLoading,

    /// 没有条目，显示静态兜底横幅
    ShowFallback,

    /// 显示轮播中的某个条目
    ShowSlide {
        index: usize,
        item_id: ItemId,
        /// 已解析的媒体，`None` 表示使用无媒体布局
        media: Option<ResolvedMedia>,
        style: TransitionStyle,
    },

    /// 开始离场动画
    ///
    /// `style` 是当前条目的过渡效果，渲染层据此选择动画。
    BeginTransition {
        from: usize,
        to: usize,
        style: TransitionStyle,
    },

    /// 过渡结束
    EndTransition { index: usize },

    /// 用户关闭了横幅
    HideBanner,

    /// 尽力而为的点击追踪，失败不影响跳转
    TrackClick { item_id: ItemId },

    /// 跳转到行动按钮目标
    Navigate { target: String },

    /// 设置滚动区域的水平偏移
    ScrollTo { offset_px: f64 },
}

impl Command {
    /// 是否属于横幅轮播
    pub fn is_banner(&self) -> bool {
        !matches!(self, Self::ScrollTo { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = Command::BeginTransition {
            from: 0,
            to: 1,
            style: TransitionStyle::Slide,
        };

        let json = serde_json::to_string(&cmd).unwrap();
        let deserialized: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(cmd, deserialized);
    }

    #[test]
    fn test_is_banner() {
        assert!(Command::HideBanner.is_banner());
        assert!(!Command::ScrollTo { offset_px: 1.0 }.is_banner());
    }
}
