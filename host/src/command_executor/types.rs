//! Command Executor 类型定义

use promo_runtime::ItemId;

/// Command 执行结果
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ExecuteResult {
    /// 执行成功，只更新了渲染状态
    #[default]
    Ok,
    /// 需要宿主发出追踪请求
    Track(ItemId),
    /// 需要宿主跳转页面
    Navigate(String),
}

/// 批量执行的副作用汇总
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    /// 需要追踪的点击，按发生顺序
    pub tracked: Vec<ItemId>,
    /// 需要执行的跳转，按发生顺序
    pub navigations: Vec<String>,
    /// 本批次中横幅是否换了条目
    pub slide_changed: bool,
}

impl CommandOutput {
    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty() && self.navigations.is_empty() && !self.slide_changed
    }
}
