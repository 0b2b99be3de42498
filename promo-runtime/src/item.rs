//! # Item 模块
//!
//! 推广条目的数据模型，以及数据到达后的去重与排序。
//!
//! ## 设计原则
//!
//! - 后端字段可能缺失或为 `null`，一律回落到文档约定的默认值，不做额外校验
//! - `id` 可能是字符串也可能是数字，统一成不透明的字符串键
//! - 一次会话内的条目列表不可变，重新拉取时整体替换

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::PromoResult;

/// 默认展示时长（秒）
pub const DEFAULT_DISPLAY_SECONDS: f64 = 5.0;

/// 最短展示时长（秒），保证提前过渡定时器落在展示窗口内
pub const MIN_DISPLAY_SECONDS: f64 = 1.0;

/// 最长展示时长（秒）
pub const MAX_DISPLAY_SECONDS: f64 = 86_400.0;

/// 条目标识符
///
/// 对 Runtime 而言是不透明的键，只用于去重、追踪和收藏。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// 创建标识符
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 获取字符串形式
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Signed(n) => Self(n.to_string()),
            RawId::Unsigned(n) => Self(n.to_string()),
        })
    }
}

/// 媒体类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

/// 横幅过渡效果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionStyle {
    /// 淡入淡出
    #[default]
    Fade,
    /// 滑动
    Slide,
    /// 无过渡，立即切换
    None,
}

/// 未解析的媒体引用
///
/// 后端返回的可能是字符串，也可能是 `{ "url": ... }` 对象。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaRef {
    /// 直接给出的路径或 URL
    Path(String),
    /// 带 `url` 字段的对象，字段缺失等同于空字符串
    Object {
        #[serde(default)]
        url: Option<String>,
    },
}

impl MediaRef {
    /// 提取原始字符串
    pub fn as_str(&self) -> &str {
        match self {
            Self::Path(path) => path,
            Self::Object { url } => url.as_deref().unwrap_or(""),
        }
    }
}

impl From<&str> for MediaRef {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

/// 横幅轮播条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionalItem {
    pub id: ItemId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub media_ref: Option<MediaRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub media_kind: MediaKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cta_label: String,
    #[serde(default)]
    pub cta_target: Option<String>,
    /// 优先级，越大越靠前
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: i64,
    #[serde(
        default = "default_display_seconds",
        deserialize_with = "display_seconds_or_default"
    )]
    pub display_duration_seconds: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub transition_style: TransitionStyle,
}

impl PromotionalItem {
    /// 创建只有标识和标题的条目，其余字段取默认值
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            media_ref: None,
            media_kind: MediaKind::Image,
            cta_label: String::new(),
            cta_target: None,
            priority: 0,
            display_duration_seconds: DEFAULT_DISPLAY_SECONDS,
            transition_style: TransitionStyle::Fade,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_media(mut self, media: impl Into<MediaRef>, kind: MediaKind) -> Self {
        self.media_ref = Some(media.into());
        self.media_kind = kind;
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.display_duration_seconds = seconds;
        self
    }

    pub fn with_style(mut self, style: TransitionStyle) -> Self {
        self.transition_style = style;
        self
    }

    pub fn with_cta(mut self, label: impl Into<String>, target: impl Into<String>) -> Self {
        self.cta_label = label.into();
        self.cta_target = Some(target.into());
        self
    }

    /// 实际展示时长
    ///
    /// 非正数或非有限值回落到 5 秒，低于 1 秒的值提升到 1 秒，
    /// 超过一天的值截断到一天。
    pub fn display_duration(&self) -> Duration {
        let seconds = self.display_duration_seconds;
        let seconds = if seconds.is_finite() && seconds > 0.0 {
            seconds.clamp(MIN_DISPLAY_SECONDS, MAX_DISPLAY_SECONDS)
        } else {
            DEFAULT_DISPLAY_SECONDS
        };
        Duration::from_secs_f64(seconds)
    }
}

/// 滚动货架条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselItem {
    pub id: ItemId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub media_ref: Option<MediaRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub media_kind: MediaKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cta_label: String,
    #[serde(default)]
    pub cta_target: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: i64,
    /// 角标文字（由上游计算，可为空）
    #[serde(default)]
    pub badge_text: Option<String>,
}

impl CarouselItem {
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            media_ref: None,
            media_kind: MediaKind::Image,
            cta_label: String::new(),
            cta_target: None,
            priority: 0,
            badge_text: None,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_media(mut self, media: impl Into<MediaRef>) -> Self {
        self.media_ref = Some(media.into());
        self
    }

    pub fn with_badge(mut self, badge: impl Into<String>) -> Self {
        self.badge_text = Some(badge.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.cta_target = Some(target.into());
        self
    }
}

/// 可去重排序的条目
pub trait Ranked {
    fn id(&self) -> &ItemId;
    fn priority(&self) -> i64;
}

impl Ranked for PromotionalItem {
    fn id(&self) -> &ItemId {
        &self.id
    }

    fn priority(&self) -> i64 {
        self.priority
    }
}

impl Ranked for CarouselItem {
    fn id(&self) -> &ItemId {
        &self.id
    }

    fn priority(&self) -> i64 {
        self.priority
    }
}

/// 按 `id` 去重（首次出现者保留），再按优先级降序稳定排序
pub fn prepare_items<T: Ranked>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut unique: Vec<T> = items
        .into_iter()
        .filter(|item| seen.insert(item.id().clone()))
        .collect();

    // sort_by 是稳定排序，同优先级保持原始相对顺序
    unique.sort_by(|a, b| b.priority().cmp(&a.priority()));
    unique
}

/// 数据源响应体
///
/// 客户端接口有时直接返回数组，有时包一层 `{ "data": [...] }`。
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FeedPayload<T> {
    List(Vec<T>),
    Envelope {
        #[serde(default = "Vec::new")]
        data: Vec<T>,
    },
}

impl<T> FeedPayload<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::List(items) => items,
            Self::Envelope { data } => data,
        }
    }
}

/// 解析数据源 JSON
pub fn parse_feed<T: for<'de> Deserialize<'de>>(json: &str) -> PromoResult<Vec<T>> {
    let payload: FeedPayload<T> = serde_json::from_str(json)?;
    Ok(payload.into_items())
}

fn default_display_seconds() -> f64 {
    DEFAULT_DISPLAY_SECONDS
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn display_seconds_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(DEFAULT_DISPLAY_SECONDS))
}
