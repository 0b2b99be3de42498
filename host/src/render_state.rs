//! # RenderState 模块
//!
//! 定义渲染状态，记录当前页面上推广区域应显示的内容。
//! headless 宿主没有真实界面，渲染状态即最终输出。

use promo_runtime::{CarouselCard, ItemId, ResolvedMedia, TransitionStyle};
use serde::Serialize;

/// 横幅显示状态
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BannerView {
    /// 尚未挂载
    #[default]
    Hidden,
    /// 加载占位
    Loading,
    /// 静态兜底横幅
    Fallback,
    /// 正在展示的条目
    Slide {
        index: usize,
        item_id: ItemId,
        media: Option<ResolvedMedia>,
        style: TransitionStyle,
    },
    /// 用户已关闭
    Dismissed,
}

/// 过渡动画
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransitionView {
    pub from: usize,
    pub to: usize,
    pub style: TransitionStyle,
}

/// 货架显示状态
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShelfView {
    /// 复制后的卡片序列
    #[serde(skip)]
    pub cards: Vec<CarouselCard>,
    pub card_count: usize,
    pub offset_px: f64,
}

/// 渲染状态
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderState {
    pub banner: BannerView,
    /// 进行中的横幅过渡
    pub transition: Option<TransitionView>,
    pub shelf: ShelfView,
    /// 已发生的页面跳转
    pub navigations: Vec<String>,
    /// 当前门店位置
    pub location: Option<String>,
    /// 横幅切换次数（不含首次展示）
    pub slide_changes: usize,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前展示的横幅条目
    pub fn current_slide(&self) -> Option<&ItemId> {
        match &self.banner {
            BannerView::Slide { item_id, .. } => Some(item_id),
            _ => None,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// 替换货架卡片
    pub fn set_cards(&mut self, cards: Vec<CarouselCard>) {
        self.shelf.card_count = cards.len();
        self.shelf.cards = cards;
    }

    /// 清空所有推广内容
    pub fn clear(&mut self) {
        let location = self.location.take();
        *self = Self {
            location,
            ..Self::default()
        };
    }
}
