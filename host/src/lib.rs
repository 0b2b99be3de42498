//! # Host 层
//!
//! 店铺前台推广区域的宿主层实现。
//!
//! ## 架构说明
//!
//! Host 层负责：
//! - 配置加载
//! - 推广数据获取
//! - 点击追踪与收藏持久化
//! - 将 Runtime 的 Command 转换为渲染状态
//!
//! Host 层不包含轮播与滚动逻辑，只负责执行 Runtime 发出的 Command。

pub mod command_executor;
pub mod config;
pub mod feed;
pub mod input;
pub mod render_state;
pub mod simulation;
pub mod storefront;
pub mod store;
pub mod tracking;

pub use command_executor::{CommandExecutor, CommandOutput, ExecuteResult};
pub use config::{AppConfig, ConfigError, DebugConfig, RotationSettings, ScrollSettings, TrackingConfig};
pub use feed::{FeedError, FeedSource, FsFeedSource, StaticFeedSource};
pub use input::{HostEvent, Scenario, ScenarioError, TimedEvent};
pub use render_state::{BannerView, RenderState, ShelfView, TransitionView};
pub use simulation::{SimulationReport, run_simulation};
pub use store::JsonFileStore;
pub use storefront::Storefront;
pub use tracking::{ClickTracker, JsonlTracker, LogTracker, RecordingTracker, TrackingError};
