//! # 媒体路径解析模块
//!
//! 把后端返回的各种媒体引用统一成一个可直接请求的路径。
//!
//! ## 设计原则
//!
//! - 输出要么为空（表示无媒体），要么是以 API 前缀开头的根相对路径
//! - 绝对 URL 会被还原成根相对路径，开发期代理与线上部署都能命中
//! - 解析永不失败：无法识别的输入降级为默认分类或原样返回
//! - 解析是幂等的：`resolve(resolve(x)) == resolve(x)`
//! - API 前缀只在 [`DEFAULT_API_PREFIX`] 一处定义，宿主可通过配置覆盖
//!
//! ## 示例
//!
//! ```text
//! https://cdn.example.com/uploads/products/a.jpg -> /api/v1/uploads/products/a.jpg
//! /uploads/ads/b.png                             -> /api/v1/uploads/ads/b.png
//! c.jpg (chef)                                   -> /api/v1/uploads/chefs/c.jpg
//! products/d.jpg                                 -> /api/v1/uploads/products/d.jpg
//! ```

use serde::{Deserialize, Serialize};
use url::Url;

use crate::item::{MediaKind, MediaRef};

/// 默认 API 前缀
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// 调用方提供的语义类型提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaHint {
    Recipe,
    Product,
    Chef,
    Ad,
}

/// 上传目录分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCategory {
    Products,
    Recipes,
    Chefs,
    Ads,
}

impl MediaCategory {
    /// 分类对应的目录名
    pub fn dir(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Recipes => "recipes",
            Self::Chefs => "chefs",
            Self::Ads => "ads",
        }
    }

    /// 文件名开头可能重复出现的分类段
    fn redundant_segments(self) -> &'static [&'static str] {
        match self {
            Self::Products => &["products"],
            Self::Recipes => &["recipes"],
            Self::Chefs => &["chefs"],
            Self::Ads => &["ads", "ad"],
        }
    }
}

/// 已解析的媒体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMedia {
    pub kind: MediaKind,
    pub path: String,
}

/// 媒体路径解析器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaResolver {
    /// 以 `/` 开头、不以 `/` 结尾的 API 前缀
    api_prefix: String,
}

impl Default for MediaResolver {
    fn default() -> Self {
        Self::new(DEFAULT_API_PREFIX)
    }
}

impl MediaResolver {
    /// 创建解析器
    ///
    /// 前缀会被规范化为 `/segment` 形式（补齐开头的 `/`，去掉结尾的 `/`）。
    pub fn new(api_prefix: impl Into<String>) -> Self {
        let prefix = api_prefix.into();
        let trimmed = prefix.trim().trim_matches('/');
        Self {
            api_prefix: format!("/{trimmed}"),
        }
    }

    /// 当前 API 前缀
    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    /// 解析媒体引用
    ///
    /// `None` 或空字符串返回空字符串，调用方应视为"无媒体"。
    pub fn resolve(&self, raw: Option<&MediaRef>, hint: Option<MediaHint>) -> String {
        match raw {
            Some(raw) => self.resolve_str(raw.as_str(), hint),
            None => String::new(),
        }
    }

    /// 解析字符串形式的媒体引用
    pub fn resolve_str(&self, raw: &str, hint: Option<MediaHint>) -> String {
        let raw = raw.trim();
        if raw.is_empty() {
            return String::new();
        }

        if is_absolute_url(raw) {
            return self.resolve_absolute(raw, raw);
        }

        // 协议相对地址按绝对 URL 处理
        if raw.starts_with("//") {
            return self.resolve_absolute(&format!("https:{raw}"), raw);
        }

        if raw.starts_with('/') {
            return self.with_prefix(raw);
        }

        self.resolve_bare(raw, hint)
    }

    /// 解析条目媒体，空路径返回 `None`
    pub fn resolve_media(
        &self,
        raw: Option<&MediaRef>,
        kind: MediaKind,
        hint: Option<MediaHint>,
    ) -> Option<ResolvedMedia> {
        let path = self.resolve(raw, hint);
        (!path.is_empty()).then_some(ResolvedMedia { kind, path })
    }

    /// 绝对 URL：只保留路径部分，并补上 API 前缀
    fn resolve_absolute(&self, target: &str, original: &str) -> String {
        match Url::parse(target) {
            Ok(url) => self.with_prefix(url.path()),
            // 解析失败时在原始字符串中寻找 API 前缀段，找不到就原样返回
            Err(_) => match self.find_prefix(original) {
                Some(index) => original[index..].to_string(),
                None => original.to_string(),
            },
        }
    }

    /// 没有开头 `/` 的裸文件名或相对路径
    fn resolve_bare(&self, raw: &str, hint: Option<MediaHint>) -> String {
        let path = raw.trim_start_matches("./");

        // 已带前缀但缺少开头的 `/`
        let bare_prefix = self.api_prefix.trim_start_matches('/');
        if starts_with_segment(path, bare_prefix) {
            return format!("/{path}");
        }

        if path.starts_with("uploads/") {
            return format!("{}/{}", self.api_prefix, path);
        }

        let category = classify(path, hint);
        let file = strip_redundant_segments(path, category);
        format!("{}/uploads/{}/{}", self.api_prefix, category.dir(), file)
    }

    /// 根相对路径：已有前缀则不变，否则插入前缀
    fn with_prefix(&self, path: &str) -> String {
        if starts_with_segment(path, &self.api_prefix) {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.api_prefix, path)
        } else {
            format!("{}/{}", self.api_prefix, path)
        }
    }

    /// 查找作为完整路径段出现的 API 前缀
    fn find_prefix(&self, s: &str) -> Option<usize> {
        s.match_indices(self.api_prefix.as_str())
            .map(|(index, _)| index)
            .find(|&index| {
                let rest = &s[index + self.api_prefix.len()..];
                rest.is_empty() || rest.starts_with('/') || rest.starts_with('?')
            })
    }
}

/// 使用默认前缀解析
pub fn resolve_media_url(raw: Option<&MediaRef>, hint: Option<MediaHint>) -> String {
    MediaResolver::default().resolve(raw, hint)
}

fn is_absolute_url(s: &str) -> bool {
    has_scheme(s, "http://") || has_scheme(s, "https://")
}

fn has_scheme(s: &str, scheme: &str) -> bool {
    s.get(..scheme.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
}

/// `path` 是否以 `prefix` 作为完整路径段开头
fn starts_with_segment(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// 根据路径内容和类型提示决定分类
fn classify(path: &str, hint: Option<MediaHint>) -> MediaCategory {
    // 显式的厨师/广告提示优先
    match hint {
        Some(MediaHint::Chef) => return MediaCategory::Chefs,
        Some(MediaHint::Ad) => return MediaCategory::Ads,
        _ => {}
    }

    let lower = path.to_ascii_lowercase();
    if looks_like_ad(&lower) {
        MediaCategory::Ads
    } else if has_dir_segment(&lower, "recipes") || hint == Some(MediaHint::Recipe) {
        MediaCategory::Recipes
    } else if has_dir_segment(&lower, "products") || hint == Some(MediaHint::Product) {
        MediaCategory::Products
    } else if has_dir_segment(&lower, "chefs") {
        MediaCategory::Chefs
    } else {
        MediaCategory::Products
    }
}

/// 广告识别按路径段判断，避免 `bread.jpg` 之类的误判
fn looks_like_ad(lower: &str) -> bool {
    let mut segments: Vec<&str> = lower.split('/').collect();
    let file = segments.pop().unwrap_or_default();

    segments
        .iter()
        .any(|dir| matches!(*dir, "ad" | "ads" | "banner" | "banners"))
        || file.starts_with("ad_")
        || file.starts_with("ad-")
        || file.starts_with("banner")
}

fn has_dir_segment(lower: &str, dir: &str) -> bool {
    let mut segments: Vec<&str> = lower.split('/').collect();
    segments.pop();
    segments.contains(&dir)
}

/// 去掉开头与分类重复的目录段
fn strip_redundant_segments(path: &str, category: MediaCategory) -> &str {
    let mut rest = path;
    'outer: loop {
        let Some((head, tail)) = rest.split_once('/') else {
            return rest;
        };
        if category
            .redundant_segments()
            .iter()
            .any(|segment| head.eq_ignore_ascii_case(segment))
        {
            rest = tail;
            continue 'outer;
        }
        return rest;
    }
}
