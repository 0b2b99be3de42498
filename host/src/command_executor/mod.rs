//! # Command Executor 模块
//!
//! Command 执行器，负责将 Runtime 发出的 Command 转换为实际操作。
//!
//! ## 设计说明
//!
//! - `CommandExecutor` 接收 `Command`，只更新 `RenderState`
//! - 追踪和跳转以 [`ExecuteResult`] 返回给宿主，由宿主调用协作者完成

mod types;

pub use types::*;

use promo_runtime::Command;

use crate::render_state::{BannerView, RenderState, TransitionView};

/// Command 执行器
#[derive(Debug, Default)]
pub struct CommandExecutor {
    /// 最近一次批量执行的输出
    pub last_output: CommandOutput,
}

impl CommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 执行单个 Command
    pub fn execute(&mut self, command: &Command, render_state: &mut RenderState) -> ExecuteResult {
        match command {
            Command::ShowLoading => {
                render_state.banner = BannerView::Loading;
                render_state.transition = None;
            }
            Command::ShowFallback => {
                render_state.banner = BannerView::Fallback;
                render_state.transition = None;
            }
            Command::ShowSlide {
                index,
                item_id,
                media,
                style,
            } => {
                if matches!(render_state.banner, BannerView::Slide { .. }) {
                    render_state.slide_changes += 1;
                }
                render_state.banner = BannerView::Slide {
                    index: *index,
                    item_id: item_id.clone(),
                    media: media.clone(),
                    style: *style,
                };
            }
            Command::BeginTransition { from, to, style } => {
                render_state.transition = Some(TransitionView {
                    from: *from,
                    to: *to,
                    style: *style,
                });
            }
            Command::EndTransition { .. } => render_state.transition = None,
            Command::HideBanner => {
                render_state.banner = BannerView::Dismissed;
                render_state.transition = None;
            }
            Command::TrackClick { item_id } => return ExecuteResult::Track(item_id.clone()),
            Command::Navigate { target } => {
                render_state.navigations.push(target.clone());
                return ExecuteResult::Navigate(target.clone());
            }
            Command::ScrollTo { offset_px } => render_state.shelf.offset_px = *offset_px,
        }

        ExecuteResult::Ok
    }

    /// 批量执行 Commands，汇总需要宿主处理的副作用
    pub fn execute_batch(
        &mut self,
        commands: &[Command],
        render_state: &mut RenderState,
    ) -> &CommandOutput {
        let mut output = CommandOutput::default();

        for command in commands {
            if matches!(command, Command::ShowSlide { .. }) {
                output.slide_changed = true;
            }
            match self.execute(command, render_state) {
                ExecuteResult::Ok => {}
                ExecuteResult::Track(id) => output.tracked.push(id),
                ExecuteResult::Navigate(target) => output.navigations.push(target),
            }
        }

        self.last_output = output;
        &self.last_output
    }
}
