//! # State 模块
//!
//! 定义控制器对外可观察的状态。
//!
//! ## 设计原则
//!
//! - 所有状态必须**显式建模**，不允许隐式全局状态
//! - 状态只由所属控制器修改，宿主只读
//! - 所有状态可序列化，便于调试输出和快照比对

use serde::{Deserialize, Serialize};

/// 轮播阶段
///
/// # 状态转换
///
/// ```text
/// Loading   -> Active | Empty   数据到达
/// Active    -> Active           自动或手动切换
/// Active    -> Dismissed        用户关闭
/// Dismissed                     本会话终态，只有重新拉取才开始新会话
/// *         -> Loading          重新拉取
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationPhase {
    /// 等待数据
    Loading,
    /// 正在轮播
    Active,
    /// 没有可展示的条目，显示静态兜底内容
    Empty,
    /// 用户已关闭
    Dismissed,
}

/// 轮播状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationState {
    /// 当前阶段
    pub phase: RotationPhase,
    /// 当前条目索引（从 0 开始）
    pub current_index: usize,
    /// 是否处于过渡动画中
    pub is_transitioning: bool,
    /// 用户是否已关闭，本会话内不会自动清除
    pub is_dismissed: bool,
    /// 会话序号，每次重新拉取加一
    pub session: u64,
}

impl RotationState {
    /// 新会话的初始状态
    pub fn loading(session: u64) -> Self {
        Self {
            phase: RotationPhase::Loading,
            current_index: 0,
            is_transitioning: false,
            is_dismissed: false,
            session,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == RotationPhase::Loading
    }

    pub fn is_active(&self) -> bool {
        self.phase == RotationPhase::Active
    }
}

/// 帧循环句柄
///
/// 每次启动帧循环都会分配新的句柄，持有旧句柄的回调会被拒绝。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationHandle(pub(crate) u64);

impl AnimationHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// 滚动状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollState {
    /// 当前水平滚动位置（像素）
    pub scroll_position_px: f64,
    /// 指针或触摸位于滚动区域上方时为 true
    pub is_paused: bool,
    /// 正在运行的帧循环
    pub animation_handle: Option<AnimationHandle>,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            scroll_position_px: 0.0,
            is_paused: false,
            animation_handle: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_state_new_session() {
        let state = RotationState::loading(3);
        assert!(state.is_loading());
        assert!(!state.is_active());
        assert_eq!(state.current_index, 0);
        assert!(!state.is_dismissed);
        assert_eq!(state.session, 3);
    }

    #[test]
    fn test_state_serialization() {
        let state = ScrollState {
            scroll_position_px: 12.5,
            is_paused: true,
            animation_handle: Some(AnimationHandle(7)),
        };

        let json = serde_json::to_string(&state).unwrap();
        let deserialized: ScrollState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
