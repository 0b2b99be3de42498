//! # Controller 模块
//!
//! 推广内容的两个控制器。
//!
//! ## 模块结构
//!
//! - [`rotation`]：首页横幅轮播状态机
//! - [`scroll`]：特价货架无限滚动

pub mod rotation;
pub mod scroll;

pub use rotation::{RotationConfig, RotationController, Slide};
pub use scroll::{CarouselCard, ContinuousScrollController, FrameOutcome, ScrollConfig};
