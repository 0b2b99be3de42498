//! # Storefront 模块
//!
//! 店铺首页的推广区域：横幅轮播与特价货架。
//!
//! ## 生命周期
//!
//! ```text
//! mount()              拉取数据，启动轮播与帧循环
//! update(dt)           每帧推进轮播时钟并驱动货架滚动
//! dispatch(event)      分发页面事件
//! change_location(loc) 重新拉取，轮播从索引 0 开始新会话
//! unmount()            取消所有定时器与帧循环
//! ```

use std::time::Duration;

use promo_runtime::store::KeyValueStore;
use promo_runtime::{
    AnimationHandle, Command, ContinuousScrollController, EventDisposition, Favorites,
    FrameOutcome, ItemId, RotationController, RuntimeError,
};
use tracing::{debug, info, warn};

use crate::command_executor::CommandExecutor;
use crate::config::AppConfig;
use crate::feed::FeedSource;
use crate::input::{HostEvent, RoutedInput};
use crate::render_state::RenderState;
use crate::tracking::ClickTracker;

/// 推广区域宿主
pub struct Storefront {
    config: AppConfig,
    feed: Box<dyn FeedSource>,
    tracker: Box<dyn ClickTracker>,
    favorites: Favorites<Box<dyn KeyValueStore>>,
    rotation: RotationController,
    scroll: Option<ContinuousScrollController>,
    frame: Option<AnimationHandle>,
    executor: CommandExecutor,
    render_state: RenderState,
    location: Option<String>,
}

impl Storefront {
    pub fn new(
        config: AppConfig,
        feed: Box<dyn FeedSource>,
        tracker: Box<dyn ClickTracker>,
        store: Box<dyn KeyValueStore>,
    ) -> Self {
        let rotation = RotationController::with_config(config.rotation_config(), config.media_resolver());
        let location = config.location.clone();
        let mut render_state = RenderState::new();
        render_state.location = location.clone();

        Self {
            config,
            feed,
            tracker,
            favorites: Favorites::new(store),
            rotation,
            scroll: None,
            frame: None,
            executor: CommandExecutor::new(),
            render_state,
            location,
        }
    }

    pub fn render_state(&self) -> &RenderState {
        &self.render_state
    }

    pub fn rotation(&self) -> &RotationController {
        &self.rotation
    }

    pub fn scroll(&self) -> Option<&ContinuousScrollController> {
        self.scroll.as_ref()
    }

    pub fn favorites(&self) -> &Favorites<Box<dyn KeyValueStore>> {
        &self.favorites
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// 挂载：拉取数据并启动
    pub fn mount(&mut self) {
        info!(location = ?self.location, "挂载推广区域");
        self.load_promotions();
        self.load_carousel();
    }

    /// 推进一帧
    pub fn update(&mut self, dt: Duration) {
        let commands = self.rotation.advance(dt);
        self.execute(&commands);

        let (Some(scroll), Some(handle)) = (self.scroll.as_mut(), self.frame) else {
            return;
        };
        match scroll.on_frame(handle) {
            FrameOutcome::Continue(Some(command)) => self.execute(&[command]),
            FrameOutcome::Continue(None) => {}
            FrameOutcome::Stopped => {
                debug!(handle = handle.id(), "帧循环句柄失效，停止调度");
                self.frame = None;
            }
        }
    }

    /// 分发页面事件，返回宿主是否应阻止默认行为
    pub fn dispatch(&mut self, event: HostEvent) -> EventDisposition {
        match event.route() {
            RoutedInput::Rotation(input) => {
                match self.rotation.handle_input(input) {
                    Ok(commands) => self.execute(&commands),
                    Err(e) => debug!(error = %e, "横幅输入被忽略"),
                }
                EventDisposition::PassThrough
            }
            RoutedInput::Scroll(input) => {
                let Some(scroll) = self.scroll.as_mut() else {
                    return EventDisposition::PassThrough;
                };
                let (commands, disposition) = scroll.handle_input(input);
                self.execute(&commands);
                disposition
            }
            RoutedInput::Host => {
                self.handle_host_event(event);
                EventDisposition::PassThrough
            }
        }
    }

    /// 切换门店位置并重新拉取
    pub fn change_location(&mut self, location: Option<String>) {
        info!(from = ?self.location, to = ?location, "切换门店位置");
        self.location = location;
        self.render_state.location = self.location.clone();
        self.refresh();
    }

    /// 重新拉取横幅与货架
    pub fn refresh(&mut self) {
        let commands = self.rotation.refresh();
        self.execute(&commands);
        self.load_promotions();
        self.load_carousel();
    }

    /// 卸载，返回最终渲染状态
    pub fn unmount(mut self) -> RenderState {
        if let Some(scroll) = self.scroll.as_mut() {
            scroll.stop();
        }
        self.frame = None;

        let cancelled = self.rotation.teardown();
        info!(cancelled_timers = cancelled, "推广区域已卸载");
        self.render_state
    }

    fn handle_host_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::ActivateCard { id } => self.activate_card(&id),
            HostEvent::ToggleFavorite { id } => match self.favorites.toggle(&id) {
                Ok(favorited) => info!(item = %id, favorited, "收藏状态已切换"),
                Err(e) => warn!(item = %id, error = %e, "收藏状态保存失败"),
            },
            HostEvent::ChangeLocation { location } => self.change_location(location),
            HostEvent::Refresh => self.refresh(),
            _ => {}
        }
    }

    fn activate_card(&mut self, id: &ItemId) {
        let Some(scroll) = self.scroll.as_ref() else {
            return;
        };
        match scroll.activate(id) {
            Ok(commands) => self.execute(&commands),
            Err(RuntimeError::UnknownItem { id }) => warn!(item = %id, "货架中没有该条目"),
            Err(e) => warn!(error = %e, "货架点击失败"),
        }
    }

    fn load_promotions(&mut self) {
        let commands = match self.feed.fetch_promotions(self.location.as_deref()) {
            Ok(items) => {
                info!(count = items.len(), "横幅数据加载完成");
                self.rotation.load(items)
            }
            Err(e) => {
                warn!(error = %e, "横幅数据加载失败，显示兜底内容");
                self.rotation.load_failed()
            }
        };
        self.execute(&commands);
    }

    fn load_carousel(&mut self) {
        let items = match self.feed.fetch_carousel(self.location.as_deref()) {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "货架数据加载失败");
                Vec::new()
            }
        };

        let scroll = self.scroll.get_or_insert_with(|| {
            ContinuousScrollController::with_config(
                Vec::new(),
                self.config.scroll.viewport,
                self.config.scroll_config(),
                self.config.media_resolver(),
            )
        });
        scroll.replace_items(items);

        let cards = scroll.cards();
        scroll.set_scroll_width(cards.len() as f64 * self.config.scroll.card_width_px);
        info!(count = scroll.items().len(), "货架数据加载完成");
        self.render_state.set_cards(cards);

        if self.frame.is_none() {
            self.frame = Some(scroll.start());
        }
    }

    /// 执行命令并处理追踪与跳转
    fn execute(&mut self, commands: &[Command]) {
        if commands.is_empty() {
            return;
        }

        let output = self.executor.execute_batch(commands, &mut self.render_state);
        for id in &output.tracked {
            // 追踪失败不影响跳转
            if let Err(e) = self.tracker.track(id) {
                warn!(item = %id, error = %e, "点击追踪失败");
            }
        }
        for target in &output.navigations {
            info!(target = %target, "页面跳转");
        }
    }
}
