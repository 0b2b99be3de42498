//! # Scroll 模块
//!
//! 特价货架的无限横向滚动。
//!
//! 条目列表复制一份首尾相接，滚动位置到达总宽度的一半时回绕，
//! 视觉上没有接缝。宿主每帧调用 [`ContinuousScrollController::on_frame`]，
//! 控制器返回新的偏移量。
//!
//! 暂停判断使用指针坐标与滚动区域的命中测试：区域内的收藏、加购按钮
//! 触发的进入/离开事件不会误恢复滚动。

use std::fmt;

use crate::command::Command;
use crate::error::RuntimeError;
use crate::input::{EventDisposition, Point, PointerBounds, ScrollInput};
use crate::item::{CarouselItem, ItemId, prepare_items};
use crate::media::{MediaHint, MediaResolver, ResolvedMedia};
use crate::state::{AnimationHandle, ScrollState};

/// 默认每帧滚动像素
pub const DEFAULT_SPEED_PX_PER_FRAME: f64 = 0.5;

/// 滚动配置
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollConfig {
    pub speed_px_per_frame: f64,
    pub media_hint: Option<MediaHint>,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            speed_px_per_frame: DEFAULT_SPEED_PX_PER_FRAME,
            media_hint: Some(MediaHint::Product),
        }
    }
}

/// 单帧处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// 继续调度下一帧；位置变化时携带 `ScrollTo`
    Continue(Option<Command>),
    /// 句柄已失效，宿主应停止调度
    Stopped,
}

/// 渲染用的卡片
#[derive(Debug, Clone, PartialEq)]
pub struct CarouselCard {
    /// 在复制后序列中的位置
    pub slot: usize,
    pub item: CarouselItem,
    pub media: Option<ResolvedMedia>,
}

/// 无限滚动控制器
pub struct ContinuousScrollController {
    items: Vec<CarouselItem>,
    resolver: MediaResolver,
    config: ScrollConfig,
    state: ScrollState,
    /// 复制后序列的总宽度，由宿主测量
    scroll_width: f64,
    pointer_inside: bool,
    touch_active: bool,
    bounds: Box<dyn PointerBounds>,
    next_handle: u64,
}

impl fmt::Debug for ContinuousScrollController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContinuousScrollController")
            .field("items", &self.items.len())
            .field("config", &self.config)
            .field("state", &self.state)
            .field("scroll_width", &self.scroll_width)
            .field("pointer_inside", &self.pointer_inside)
            .field("touch_active", &self.touch_active)
            .finish_non_exhaustive()
    }
}

impl ContinuousScrollController {
    pub fn new(items: Vec<CarouselItem>, bounds: impl PointerBounds + 'static) -> Self {
        Self::with_config(items, bounds, ScrollConfig::default(), MediaResolver::default())
    }

    pub fn with_config(
        items: Vec<CarouselItem>,
        bounds: impl PointerBounds + 'static,
        config: ScrollConfig,
        resolver: MediaResolver,
    ) -> Self {
        Self {
            items: prepare_items(items),
            resolver,
            config,
            state: ScrollState::default(),
            scroll_width: 0.0,
            pointer_inside: false,
            touch_active: false,
            bounds: Box::new(bounds),
            next_handle: 1,
        }
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    /// 去重排序后的条目
    pub fn items(&self) -> &[CarouselItem] {
        &self.items
    }

    /// 复制一次后的渲染序列
    pub fn working_sequence(&self) -> impl Iterator<Item = &CarouselItem> + '_ {
        self.items.iter().chain(self.items.iter())
    }

    /// 渲染序列对应的卡片，媒体已解析
    pub fn cards(&self) -> Vec<CarouselCard> {
        self.working_sequence()
            .enumerate()
            .map(|(slot, item)| CarouselCard {
                slot,
                item: item.clone(),
                media: self.resolver.resolve_media(
                    item.media_ref.as_ref(),
                    item.media_kind,
                    self.config.media_hint,
                ),
            })
            .collect()
    }

    /// 替换条目
    ///
    /// 宿主需要在重新布局后调用 [`Self::set_scroll_width`]。
    pub fn replace_items(&mut self, items: Vec<CarouselItem>) {
        self.items = prepare_items(items);
    }

    /// 更新测量到的总宽度，当前位置超出新的回绕点时取模
    pub fn set_scroll_width(&mut self, width: f64) {
        self.scroll_width = if width.is_finite() { width.max(0.0) } else { 0.0 };

        let loop_width = self.loop_width();
        if loop_width > 0.0 && self.state.scroll_position_px >= loop_width {
            self.state.scroll_position_px %= loop_width;
        }
    }

    /// 回绕点：总宽度的一半
    pub fn loop_width(&self) -> f64 {
        self.scroll_width / 2.0
    }

    /// 启动帧循环，旧句柄随之失效
    pub fn start(&mut self) -> AnimationHandle {
        let handle = AnimationHandle(self.next_handle);
        self.next_handle += 1;
        self.state.animation_handle = Some(handle);
        handle
    }

    /// 停止帧循环，返回被取消的句柄
    pub fn stop(&mut self) -> Option<AnimationHandle> {
        self.state.animation_handle.take()
    }

    pub fn is_running(&self) -> bool {
        self.state.animation_handle.is_some()
    }

    /// 帧回调
    ///
    /// 暂停时循环仍在运行，只是不移动位置。
    pub fn on_frame(&mut self, handle: AnimationHandle) -> FrameOutcome {
        if self.state.animation_handle != Some(handle) {
            return FrameOutcome::Stopped;
        }

        let loop_width = self.loop_width();
        if self.state.is_paused || loop_width <= 0.0 {
            return FrameOutcome::Continue(None);
        }

        let mut position = self.state.scroll_position_px + self.config.speed_px_per_frame;
        if position >= loop_width {
            position %= loop_width;
        }
        self.state.scroll_position_px = position;

        FrameOutcome::Continue(Some(Command::ScrollTo {
            offset_px: position,
        }))
    }

    /// 处理指针、触摸与滚轮输入
    pub fn handle_input(&mut self, input: ScrollInput) -> (Vec<Command>, EventDisposition) {
        match input {
            ScrollInput::PointerEnter { at }
            | ScrollInput::PointerMove { at }
            | ScrollInput::PointerLeave { at } => {
                self.pointer_inside = self.bounds.contains(at);
            }
            ScrollInput::TouchStart => self.touch_active = true,
            ScrollInput::TouchEnd => self.touch_active = false,
            ScrollInput::Wheel { at, delta_y } => return self.wheel(at, delta_y),
        }

        self.state.is_paused = self.pointer_inside || self.touch_active;
        (Vec::new(), EventDisposition::PassThrough)
    }

    /// 点击卡片
    pub fn activate(&self, id: &ItemId) -> Result<Vec<Command>, RuntimeError> {
        let item = self
            .items
            .iter()
            .find(|item| &item.id == id)
            .ok_or_else(|| RuntimeError::UnknownItem { id: id.clone() })?;

        Ok(item
            .cta_target
            .iter()
            .filter(|target| !target.trim().is_empty())
            .map(|target| Command::Navigate {
                target: target.clone(),
            })
            .collect())
    }

    /// 滚轮：指针在区域内时把垂直滚动量转为水平偏移
    fn wheel(&mut self, at: Point, delta_y: f64) -> (Vec<Command>, EventDisposition) {
        if !self.bounds.contains(at) || !delta_y.is_finite() {
            return (Vec::new(), EventDisposition::PassThrough);
        }

        let loop_width = self.loop_width();
        let position = self.state.scroll_position_px + delta_y;
        self.state.scroll_position_px = if loop_width > 0.0 {
            position.rem_euclid(loop_width)
        } else {
            position.max(0.0)
        };

        (
            vec![Command::ScrollTo {
                offset_px: self.state.scroll_position_px,
            }],
            EventDisposition::Consumed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Rect;

    fn surface() -> Rect {
        Rect::new(0.0, 0.0, 300.0, 100.0)
    }

    fn inside() -> Point {
        Point::new(150.0, 50.0)
    }

    fn outside() -> Point {
        Point::new(150.0, 400.0)
    }

    fn carousel(count: u64) -> Vec<CarouselItem> {
        (0..count)
            .map(|i| CarouselItem::new(i, format!("deal {i}")))
            .collect()
    }

    fn running(width: f64) -> (ContinuousScrollController, AnimationHandle) {
        let mut scroll = ContinuousScrollController::new(carousel(3), surface());
        scroll.set_scroll_width(width);
        let handle = scroll.start();
        (scroll, handle)
    }

    fn position(scroll: &ContinuousScrollController) -> f64 {
        scroll.state().scroll_position_px
    }

    #[test]
    fn test_frames_advance_position() {
        let (mut scroll, handle) = running(200.0);

        for _ in 0..4 {
            assert!(matches!(
                scroll.on_frame(handle),
                FrameOutcome::Continue(Some(Command::ScrollTo { .. }))
            ));
        }
        assert_eq!(position(&scroll), 2.0);
    }

    #[test]
    fn test_wraps_at_half_width() {
        let (mut scroll, handle) = running(10.0);

        for _ in 0..9 {
            scroll.on_frame(handle);
        }
        assert_eq!(position(&scroll), 4.5);

        let outcome = scroll.on_frame(handle);
        assert_eq!(position(&scroll), 0.0);
        assert_eq!(
            outcome,
            FrameOutcome::Continue(Some(Command::ScrollTo { offset_px: 0.0 }))
        );
    }

    #[test]
    fn test_wrap_keeps_remainder() {
        let config = ScrollConfig {
            speed_px_per_frame: 3.0,
            ..ScrollConfig::default()
        };
        let mut scroll = ContinuousScrollController::with_config(
            carousel(2),
            surface(),
            config,
            MediaResolver::default(),
        );
        scroll.set_scroll_width(10.0);
        let handle = scroll.start();

        scroll.on_frame(handle);
        scroll.on_frame(handle);
        assert_eq!(position(&scroll), 1.0);
    }

    #[test]
    fn test_pointer_pauses_and_resumes() {
        let (mut scroll, handle) = running(200.0);
        scroll.on_frame(handle);

        let (_, disposition) = scroll.handle_input(ScrollInput::PointerEnter { at: inside() });
        assert_eq!(disposition, EventDisposition::PassThrough);
        assert!(scroll.state().is_paused);

        for _ in 0..10 {
            assert_eq!(scroll.on_frame(handle), FrameOutcome::Continue(None));
        }
        assert_eq!(position(&scroll), 0.5);

        scroll.handle_input(ScrollInput::PointerLeave { at: outside() });
        assert!(!scroll.state().is_paused);
        scroll.on_frame(handle);
        assert_eq!(position(&scroll), 1.0);
    }

    #[test]
    fn test_nested_leave_keeps_pause() {
        let (mut scroll, _) = running(200.0);

        scroll.handle_input(ScrollInput::PointerEnter { at: inside() });
        // 从收藏按钮移回卡片：离开事件的坐标仍在区域内
        scroll.handle_input(ScrollInput::PointerLeave {
            at: Point::new(20.0, 20.0),
        });
        assert!(scroll.state().is_paused);
    }

    #[test]
    fn test_touch_pauses_and_resumes() {
        let (mut scroll, handle) = running(200.0);

        scroll.handle_input(ScrollInput::TouchStart);
        assert!(scroll.state().is_paused);
        scroll.on_frame(handle);
        assert_eq!(position(&scroll), 0.0);

        scroll.handle_input(ScrollInput::TouchEnd);
        assert!(!scroll.state().is_paused);
    }

    #[test]
    fn test_wheel_remaps_only_over_surface() {
        let (mut scroll, _) = running(200.0);

        let (commands, disposition) = scroll.handle_input(ScrollInput::Wheel {
            at: inside(),
            delta_y: 30.0,
        });
        assert_eq!(disposition, EventDisposition::Consumed);
        assert_eq!(commands, vec![Command::ScrollTo { offset_px: 30.0 }]);

        let (commands, disposition) = scroll.handle_input(ScrollInput::Wheel {
            at: outside(),
            delta_y: 30.0,
        });
        assert_eq!(disposition, EventDisposition::PassThrough);
        assert!(commands.is_empty());
        assert_eq!(position(&scroll), 30.0);
    }

    #[test]
    fn test_wheel_wraps_into_loop() {
        let (mut scroll, _) = running(200.0);

        scroll.handle_input(ScrollInput::Wheel {
            at: inside(),
            delta_y: -25.0,
        });
        assert_eq!(position(&scroll), 75.0);

        scroll.handle_input(ScrollInput::Wheel {
            at: inside(),
            delta_y: 40.0,
        });
        assert_eq!(position(&scroll), 15.0);
    }

    #[test]
    fn test_stale_handle_is_stopped() {
        let (mut scroll, first) = running(200.0);
        let second = scroll.start();

        assert_eq!(scroll.on_frame(first), FrameOutcome::Stopped);
        assert!(matches!(scroll.on_frame(second), FrameOutcome::Continue(_)));
        assert_eq!(position(&scroll), 0.5);
    }

    #[test]
    fn test_stop_ends_loop() {
        let (mut scroll, handle) = running(200.0);

        assert_eq!(scroll.stop(), Some(handle));
        assert!(!scroll.is_running());
        assert_eq!(scroll.on_frame(handle), FrameOutcome::Stopped);
        assert_eq!(position(&scroll), 0.0);
    }

    #[test]
    fn test_unmeasured_width_does_not_move() {
        let (mut scroll, handle) = running(0.0);
        assert_eq!(scroll.on_frame(handle), FrameOutcome::Continue(None));
        assert_eq!(position(&scroll), 0.0);
    }

    #[test]
    fn test_shrinking_width_wraps_position() {
        let (mut scroll, _) = running(200.0);
        scroll.handle_input(ScrollInput::Wheel {
            at: inside(),
            delta_y: 70.0,
        });

        scroll.set_scroll_width(100.0);
        assert_eq!(position(&scroll), 20.0);
    }

    #[test]
    fn test_working_sequence_is_duplicated() {
        let scroll = ContinuousScrollController::new(
            vec![
                CarouselItem::new("a", "").with_media("a.jpg"),
                CarouselItem::new("b", "").with_priority(3),
                CarouselItem::new("a", "dup"),
            ],
            surface(),
        );

        let ids: Vec<&str> = scroll.working_sequence().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "b", "a"]);

        let cards = scroll.cards();
        assert_eq!(cards.len(), 4);
        assert_eq!(cards[3].slot, 3);
        assert_eq!(cards[0].media, None);
        assert_eq!(
            cards[1].media.as_ref().map(|m| m.path.as_str()),
            Some("/api/v1/uploads/products/a.jpg")
        );
    }

    #[test]
    fn test_activate_card() {
        let scroll = ContinuousScrollController::new(
            vec![
                CarouselItem::new("a", "").with_target("/products/a"),
                CarouselItem::new("b", ""),
            ],
            surface(),
        );

        assert_eq!(
            scroll.activate(&ItemId::new("a")).unwrap(),
            vec![Command::Navigate {
                target: "/products/a".to_string()
            }]
        );
        assert!(scroll.activate(&ItemId::new("b")).unwrap().is_empty());
        assert_eq!(
            scroll.activate(&ItemId::new("zzz")),
            Err(RuntimeError::UnknownItem {
                id: ItemId::new("zzz")
            })
        );
    }
}
