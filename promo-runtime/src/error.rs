//! # Error 模块
//!
//! 定义 promo-runtime 中使用的错误类型。
//!
//! 媒体解析与空列表都不是错误：解析失败会降级为原样返回，
//! 空列表进入 `Empty` 状态。这里只保留调用方需要知道的失败。

use thiserror::Error;

use crate::item::ItemId;
use crate::state::RotationPhase;

/// 运行时错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// 控制器不在可交互状态
    #[error("当前状态不允许此操作：{phase:?}")]
    NotActive { phase: RotationPhase },

    /// 条目不存在
    #[error("条目 '{id}' 不存在")]
    UnknownItem { id: ItemId },
}

/// 键值存储错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// 值序列化失败
    #[error("存储值序列化失败: {0}")]
    Serialization(String),

    /// 底层存储写入失败
    #[error("存储写入失败: {0}")]
    Backend(String),
}

/// promo-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PromoError {
    /// 运行时错误
    #[error("运行时错误: {0}")]
    Runtime(#[from] RuntimeError),

    /// 存储错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),

    /// 数据源内容无法解析
    #[error("数据解析错误: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for PromoError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Result 类型别名
pub type PromoResult<T> = Result<T, PromoError>;
