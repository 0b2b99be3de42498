//! # Promo Runtime
//!
//! 店铺前台推广内容的核心运行时库：首页横幅轮播、无限滚动的特价货架，
//! 以及两者共用的媒体路径解析。
//!
//! ## 架构概述
//!
//! `promo-runtime` 是纯逻辑核心，不依赖任何 IO、时钟或渲染引擎。
//! 它通过 **命令驱动模式** 与宿主层（Host）通信：
//!
//! ```text
//! Host                                   Runtime
//!   │                                       │
//!   │──── load(items) / refresh() ────────►│
//!   │──── RotationInput / ScrollInput ────►│
//!   │──── advance(dt) / on_frame(handle) ─►│
//!   │                                       │
//!   │◄─────────── Vec<Command> ─────────────│
//!   │                                       │
//! ```
//!
//! 时间只以 `advance(dt)` 的形式进入 Runtime，所有定时器都在虚拟时钟上调度，
//! 测试可以确定性地推进时间，不依赖真实等待。
//!
//! ## 核心类型
//!
//! - [`RotationController`]：横幅轮播状态机
//! - [`ContinuousScrollController`]：无限滚动货架
//! - [`MediaResolver`]：媒体路径规范化
//! - [`Command`]：Runtime 向 Host 发出的指令
//!
//! ## 使用示例
//!
//! ```ignore
//! use promo_runtime::{RotationController, RotationInput};
//!
//! let mut rotation = RotationController::new();
//! let commands = rotation.load(items);
//! host.execute(&commands);
//!
//! // 主循环
//! loop {
//!     let commands = rotation.advance(frame_interval);
//!     host.execute(&commands);
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`command`]：Command 定义
//! - [`controller`]：轮播与滚动控制器
//! - [`error`]：错误类型定义
//! - [`input`]：输入事件与命中测试
//! - [`item`]：数据模型与去重排序
//! - [`media`]：媒体路径解析
//! - [`state`]：可观察的控制器状态
//! - [`store`]：键值存储能力与收藏夹
//! - [`timer`]：虚拟时钟定时器队列

pub mod command;
pub mod controller;
pub mod error;
pub mod input;
pub mod item;
pub mod media;
pub mod state;
pub mod store;
pub mod timer;

// 重导出核心类型
pub use command::Command;
pub use controller::{
    CarouselCard, ContinuousScrollController, FrameOutcome, RotationConfig, RotationController,
    ScrollConfig, Slide,
};
pub use error::{PromoError, PromoResult, RuntimeError, StoreError};
pub use input::{EventDisposition, Point, PointerBounds, Rect, RotationInput, ScrollInput};
pub use item::{
    CarouselItem, FeedPayload, ItemId, MediaKind, MediaRef, PromotionalItem, TransitionStyle,
    parse_feed, prepare_items,
};
pub use media::{DEFAULT_API_PREFIX, MediaCategory, MediaHint, MediaResolver, ResolvedMedia};
pub use state::{AnimationHandle, RotationPhase, RotationState, ScrollState};
pub use store::{FAVORITES_KEY, Favorites, KeyValueStore, MemoryStore, SubscriptionId};
pub use timer::{TimerId, TimerQueue};
