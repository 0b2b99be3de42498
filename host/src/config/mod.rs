//! # Config 模块
//!
//! 宿主配置管理，集中管理所有配置项。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use promo_runtime::{
    DEFAULT_API_PREFIX, MediaHint, MediaResolver, Rect, RotationConfig, ScrollConfig,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// 应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 数据源目录
    #[serde(default = "default_feed_dir")]
    pub feed_dir: PathBuf,

    /// 门店位置，为空时读取不带位置的数据源
    #[serde(default)]
    pub location: Option<String>,

    /// 媒体资源的 API 前缀
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// 模拟帧率
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// 轮播配置
    #[serde(default)]
    pub rotation: RotationSettings,

    /// 滚动货架配置
    #[serde(default)]
    pub scroll: ScrollSettings,

    /// 点击追踪配置
    #[serde(default)]
    pub tracking: TrackingConfig,

    /// 收藏夹文件，为空时只保存在内存中
    #[serde(default)]
    pub favorites_path: Option<PathBuf>,

    /// 调试配置
    #[serde(default)]
    pub debug: DebugConfig,
}

/// 轮播时序（毫秒）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationSettings {
    #[serde(default = "default_transition_lead_ms")]
    pub transition_lead_ms: u64,

    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    #[serde(default = "default_navigation_window_ms")]
    pub navigation_window_ms: u64,
}

/// 滚动货架配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollSettings {
    /// 每帧滚动像素
    #[serde(default = "default_speed_px_per_frame")]
    pub speed_px_per_frame: f64,

    /// 单张卡片宽度（含间距），用于估算总宽度
    #[serde(default = "default_card_width_px")]
    pub card_width_px: f64,

    /// 滚动区域在页面中的位置
    #[serde(default = "default_viewport")]
    pub viewport: Rect,
}

/// 点击追踪输出
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "sink")]
pub enum TrackingConfig {
    /// 只写日志
    #[default]
    Log,
    /// 追加到 JSONL 文件
    Jsonl { path: PathBuf },
}

/// 调试配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// 日志级别，`RUST_LOG` 优先
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// 默认值函数
fn default_feed_dir() -> PathBuf {
    PathBuf::from("demo/feed")
}

fn default_api_prefix() -> String {
    DEFAULT_API_PREFIX.to_string()
}

fn default_fps() -> u32 {
    60
}

fn default_transition_lead_ms() -> u64 {
    500
}

fn default_settle_delay_ms() -> u64 {
    50
}

fn default_navigation_window_ms() -> u64 {
    250
}

fn default_speed_px_per_frame() -> f64 {
    0.5
}

fn default_card_width_px() -> f64 {
    240.0
}

fn default_viewport() -> Rect {
    Rect::new(0.0, 480.0, 1280.0, 360.0)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_dir: default_feed_dir(),
            location: None,
            api_prefix: default_api_prefix(),
            fps: default_fps(),
            rotation: RotationSettings::default(),
            scroll: ScrollSettings::default(),
            tracking: TrackingConfig::default(),
            favorites_path: None,
            debug: DebugConfig::default(),
        }
    }
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            transition_lead_ms: default_transition_lead_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            navigation_window_ms: default_navigation_window_ms(),
        }
    }
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            speed_px_per_frame: default_speed_px_per_frame(),
            card_width_px: default_card_width_px(),
            viewport: default_viewport(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并输出警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = ?path, "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!(path = ?path, "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(path = ?path, error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = ?path, error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api_prefix.starts_with('/') || self.api_prefix.ends_with('/') {
            return Err(ConfigError::ValidationFailed(format!(
                "api_prefix 必须以 / 开头且不以 / 结尾: {}",
                self.api_prefix
            )));
        }

        if !(1..=240).contains(&self.fps) {
            return Err(ConfigError::ValidationFailed(format!(
                "fps 必须在 1 - 240 之间: {}",
                self.fps
            )));
        }

        let speed = self.scroll.speed_px_per_frame;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(ConfigError::ValidationFailed(format!(
                "scroll.speed_px_per_frame 必须大于 0: {speed}"
            )));
        }

        if !self.scroll.card_width_px.is_finite() || self.scroll.card_width_px <= 0.0 {
            return Err(ConfigError::ValidationFailed(
                "scroll.card_width_px 必须大于 0".to_string(),
            ));
        }

        Ok(())
    }

    /// 单帧时长
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }

    pub fn media_resolver(&self) -> MediaResolver {
        MediaResolver::new(self.api_prefix.as_str())
    }

    pub fn rotation_config(&self) -> RotationConfig {
        RotationConfig {
            transition_lead: Duration::from_millis(self.rotation.transition_lead_ms),
            settle_delay: Duration::from_millis(self.rotation.settle_delay_ms),
            navigation_window: Duration::from_millis(self.rotation.navigation_window_ms),
            media_hint: Some(MediaHint::Ad),
        }
    }

    pub fn scroll_config(&self) -> ScrollConfig {
        ScrollConfig {
            speed_px_per_frame: self.scroll.speed_px_per_frame,
            media_hint: Some(MediaHint::Product),
        }
    }
}

/// 配置错误
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    IoError(String),
    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}
