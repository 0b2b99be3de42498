//! # Rotation 模块
//!
//! 首页横幅轮播状态机。
//!
//! ## 执行模型
//!
//! ```text
//! load(items)        -> Loading => Active | Empty
//! handle_input(input)-> 手动切换 / 关闭 / 点击行动按钮
//! advance(dt)        -> 推进虚拟时钟，触发到期的定时器
//! ```
//!
//! ## 定时器
//!
//! 处于 `Active` 时为当前条目布置两个定时器：
//!
//! - 主定时器：展示时长到期后切换到下一条
//! - 提前过渡定时器：主定时器前 500ms 置起 `is_transitioning`，让渲染层开始离场动画
//!
//! 切换后 50ms 清除 `is_transitioning`。手动切换立即置起 `is_transitioning`，
//! 250ms 动画窗口后提交新索引。
//!
//! 任何原因导致的索引变化都会先取消全部定时器再重新布置，
//! 过期的回调不可能作用在新索引上。

use std::time::Duration;

use crate::command::Command;
use crate::error::RuntimeError;
use crate::input::RotationInput;
use crate::item::{PromotionalItem, TransitionStyle, prepare_items};
use crate::media::{MediaHint, MediaResolver, ResolvedMedia};
use crate::state::{RotationPhase, RotationState};
use crate::timer::TimerQueue;

/// 提前过渡时长
pub const TRANSITION_LEAD: Duration = Duration::from_millis(500);

/// 自动切换后的稳定时长
pub const SETTLE_DELAY: Duration = Duration::from_millis(50);

/// 手动切换的动画窗口
pub const NAVIGATION_WINDOW: Duration = Duration::from_millis(250);

/// 轮播时序配置
#[derive(Debug, Clone, PartialEq)]
pub struct RotationConfig {
    pub transition_lead: Duration,
    pub settle_delay: Duration,
    pub navigation_window: Duration,
    /// 解析横幅媒体时使用的类型提示
    pub media_hint: Option<MediaHint>,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            transition_lead: TRANSITION_LEAD,
            settle_delay: SETTLE_DELAY,
            navigation_window: NAVIGATION_WINDOW,
            media_hint: Some(MediaHint::Ad),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RotationTimer {
    TransitionLead,
    Advance,
    Settle,
    CommitNavigation { target: usize },
}

/// 当前展示的条目
#[derive(Debug, Clone, PartialEq)]
pub struct Slide<'a> {
    pub index: usize,
    pub item: &'a PromotionalItem,
    pub media: Option<ResolvedMedia>,
}

/// 横幅轮播控制器
#[derive(Debug)]
pub struct RotationController {
    /// 去重排序后的条目，本会话内不可变
    items: Vec<PromotionalItem>,
    state: RotationState,
    timers: TimerQueue<RotationTimer>,
    resolver: MediaResolver,
    config: RotationConfig,
    /// 手动切换动画窗口内的目标索引
    pending_target: Option<usize>,
}

impl Default for RotationController {
    fn default() -> Self {
        Self::new()
    }
}

impl RotationController {
    /// 创建控制器，初始处于 `Loading`
    pub fn new() -> Self {
        Self::with_config(RotationConfig::default(), MediaResolver::default())
    }

    pub fn with_config(config: RotationConfig, resolver: MediaResolver) -> Self {
        Self {
            items: Vec::new(),
            state: RotationState::loading(1),
            timers: TimerQueue::new(),
            resolver,
            config,
            pending_target: None,
        }
    }

    pub fn state(&self) -> &RotationState {
        &self.state
    }

    pub fn items(&self) -> &[PromotionalItem] {
        &self.items
    }

    /// 当前条目，仅在 `Active` 时存在
    pub fn current_item(&self) -> Option<&PromotionalItem> {
        if self.state.is_active() {
            self.items.get(self.state.current_index)
        } else {
            None
        }
    }

    /// 当前条目及其已解析的媒体
    pub fn current_slide(&self) -> Option<Slide<'_>> {
        let item = self.current_item()?;
        Some(Slide {
            index: self.state.current_index,
            item,
            media: self.resolve_media(item),
        })
    }

    /// 待触发的定时器数量
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// 当前虚拟时间
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// 下一个定时器的截止时间
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// 开始重新拉取
    ///
    /// 取消全部定时器，进入新会话的 `Loading`，关闭状态被清除。
    pub fn refresh(&mut self) -> Vec<Command> {
        self.timers.cancel_all();
        self.pending_target = None;
        self.items.clear();
        self.state = RotationState::loading(self.state.session + 1);
        vec![Command::ShowLoading]
    }

    /// 数据到达
    ///
    /// 条目先去重再按优先级排序。空列表进入 `Empty`。
    /// 已展示过数据时再次到达视为重新拉取，从索引 0 开始新会话。
    pub fn load(&mut self, items: Vec<PromotionalItem>) -> Vec<Command> {
        let mut commands = Vec::new();

        match self.state.phase {
            RotationPhase::Loading => {}
            RotationPhase::Dismissed => {
                // 本会话已关闭：保留数据，但不恢复展示
                self.items = prepare_items(items);
                return commands;
            }
            RotationPhase::Active | RotationPhase::Empty => commands.extend(self.refresh()),
        }

        self.items = prepare_items(items);
        if self.items.is_empty() {
            self.state.phase = RotationPhase::Empty;
            commands.push(Command::ShowFallback);
        } else {
            self.state.phase = RotationPhase::Active;
            commands.push(self.show_command(0));
            self.arm_auto_advance();
        }

        commands
    }

    /// 拉取失败，与空列表同样处理
    pub fn load_failed(&mut self) -> Vec<Command> {
        self.load(Vec::new())
    }

    /// 处理用户输入
    pub fn handle_input(&mut self, input: RotationInput) -> Result<Vec<Command>, RuntimeError> {
        match input {
            RotationInput::Dismiss => Ok(self.dismiss()),
            RotationInput::ActivateCta => self.activate_cta(),
            RotationInput::Next => self.navigate(|base, len| (base + 1) % len),
            RotationInput::Previous => self.navigate(|base, len| (base + len - 1) % len),
            RotationInput::JumpTo { index } => {
                self.navigate(|_, len| index.rem_euclid(len as i64) as usize)
            }
        }
    }

    /// 推进虚拟时钟，按截止时间顺序触发所有到期的定时器
    pub fn advance(&mut self, dt: Duration) -> Vec<Command> {
        let mut commands = Vec::new();
        let until = self.timers.now().saturating_add(dt);

        while let Some((_, timer)) = self.timers.pop_due(until) {
            self.fire(timer, &mut commands);
        }
        self.timers.advance_to(until);

        commands
    }

    /// 先处理输入再推进时钟
    pub fn tick(
        &mut self,
        input: Option<RotationInput>,
        dt: Duration,
    ) -> Result<Vec<Command>, RuntimeError> {
        let mut commands = match input {
            Some(input) => self.handle_input(input)?,
            None => Vec::new(),
        };
        commands.extend(self.advance(dt));
        Ok(commands)
    }

    /// 卸载，返回被取消的定时器数量
    pub fn teardown(mut self) -> usize {
        self.timers.cancel_all()
    }

    fn fire(&mut self, timer: RotationTimer, commands: &mut Vec<Command>) {
        let len = self.items.len();
        if len == 0 {
            return;
        }

        match timer {
            RotationTimer::TransitionLead => {
                let from = self.state.current_index;
                self.state.is_transitioning = true;
                commands.push(Command::BeginTransition {
                    from,
                    to: (from + 1) % len,
                    style: self.style_at(from),
                });
            }
            RotationTimer::Advance => {
                let next = (self.state.current_index + 1) % len;
                self.commit(next, commands);
                self.timers
                    .schedule(self.config.settle_delay, RotationTimer::Settle);
            }
            RotationTimer::Settle => {
                self.state.is_transitioning = false;
                commands.push(Command::EndTransition {
                    index: self.state.current_index,
                });
            }
            RotationTimer::CommitNavigation { target } => {
                self.pending_target = None;
                self.commit(target, commands);
                self.state.is_transitioning = false;
                commands.push(Command::EndTransition { index: target });
            }
        }
    }

    /// 提交新索引：先取消全部定时器，再切换并为新条目重新计时
    fn commit(&mut self, index: usize, commands: &mut Vec<Command>) {
        self.timers.cancel_all();
        self.state.current_index = index;
        commands.push(self.show_command(index));
        self.arm_auto_advance();
    }

    /// 为当前条目布置提前过渡与主定时器
    fn arm_auto_advance(&mut self) {
        if !self.state.is_active() || self.items.len() < 2 {
            return;
        }

        let Some(item) = self.items.get(self.state.current_index) else {
            return;
        };
        let display = item.display_duration();
        let lead_at = display.saturating_sub(self.config.transition_lead);

        self.timers
            .schedule(lead_at, RotationTimer::TransitionLead);
        self.timers.schedule(display, RotationTimer::Advance);
    }

    fn navigate(
        &mut self,
        target_of: impl FnOnce(usize, usize) -> usize,
    ) -> Result<Vec<Command>, RuntimeError> {
        self.ensure_active()?;

        let len = self.items.len();
        if len < 2 {
            return Ok(Vec::new());
        }

        let current = self.state.current_index;
        // 动画窗口内连续操作以待提交的目标为基准
        let base = self.pending_target.unwrap_or(current);
        let target = target_of(base, len);

        if self.pending_target.is_none() && target == current {
            return Ok(Vec::new());
        }

        self.timers.cancel_all();
        self.pending_target = Some(target);
        self.state.is_transitioning = true;
        self.timers.schedule(
            self.config.navigation_window,
            RotationTimer::CommitNavigation { target },
        );

        Ok(vec![Command::BeginTransition {
            from: current,
            to: target,
            style: self.style_at(current),
        }])
    }

    fn dismiss(&mut self) -> Vec<Command> {
        if self.state.is_dismissed {
            return Vec::new();
        }

        self.timers.cancel_all();
        self.pending_target = None;
        self.state.phase = RotationPhase::Dismissed;
        self.state.is_dismissed = true;
        self.state.is_transitioning = false;

        vec![Command::HideBanner]
    }

    fn activate_cta(&mut self) -> Result<Vec<Command>, RuntimeError> {
        self.ensure_active()?;

        let Some(item) = self.items.get(self.state.current_index) else {
            return Ok(Vec::new());
        };

        // 先追踪再跳转，追踪结果不影响跳转
        let mut commands = vec![Command::TrackClick {
            item_id: item.id.clone(),
        }];
        if let Some(target) = item.cta_target.as_deref().filter(|t| !t.trim().is_empty()) {
            commands.push(Command::Navigate {
                target: target.to_string(),
            });
        }

        Ok(commands)
    }

    fn ensure_active(&self) -> Result<(), RuntimeError> {
        if self.state.is_active() {
            Ok(())
        } else {
            Err(RuntimeError::NotActive {
                phase: self.state.phase,
            })
        }
    }

    fn style_at(&self, index: usize) -> TransitionStyle {
        self.items
            .get(index)
            .map(|item| item.transition_style)
            .unwrap_or_default()
    }

    fn resolve_media(&self, item: &PromotionalItem) -> Option<ResolvedMedia> {
        self.resolver
            .resolve_media(item.media_ref.as_ref(), item.media_kind, self.config.media_hint)
    }

    fn show_command(&self, index: usize) -> Command {
        match self.items.get(index) {
            Some(item) => Command::ShowSlide {
                index,
                item_id: item.id.clone(),
                media: self.resolve_media(item),
                style: item.transition_style,
            },
            None => Command::ShowFallback,
        }
    }
}
