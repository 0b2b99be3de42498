//! # Feed 模块
//!
//! 推广数据的获取。
//!
//! 数据源是黑盒协作者：控制器只关心拿到的列表，失败一律降级为空列表。
//! 本地开发与 headless 模拟使用 [`FsFeedSource`] 从目录读取 JSON 文件。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use promo_runtime::{CarouselItem, PromoError, PromotionalItem, parse_feed};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

/// 数据源错误
#[derive(Debug, Error)]
pub enum FeedError {
    /// 数据源文件不存在
    #[error("数据源不存在: {path:?}")]
    NotFound { path: PathBuf },

    /// 读取失败
    #[error("读取数据源失败: {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 内容无法解析
    #[error("数据源解析失败: {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: PromoError,
    },

    /// 其他数据源故障
    #[error("数据源不可用: {0}")]
    Unavailable(String),
}

/// 推广数据源
pub trait FeedSource {
    /// 获取横幅条目
    fn fetch_promotions(&self, location: Option<&str>) -> Result<Vec<PromotionalItem>, FeedError>;

    /// 获取货架条目
    fn fetch_carousel(&self, location: Option<&str>) -> Result<Vec<CarouselItem>, FeedError>;
}

impl<F: FeedSource + ?Sized> FeedSource for Box<F> {
    fn fetch_promotions(&self, location: Option<&str>) -> Result<Vec<PromotionalItem>, FeedError> {
        (**self).fetch_promotions(location)
    }

    fn fetch_carousel(&self, location: Option<&str>) -> Result<Vec<CarouselItem>, FeedError> {
        (**self).fetch_carousel(location)
    }
}

/// 文件系统数据源
///
/// 目录结构：
///
/// ```text
/// feed/
/// ├── promotions.json
/// ├── promotions.downtown.json   # 指定位置时优先读取
/// ├── carousel.json
/// └── carousel.downtown.json
/// ```
#[derive(Debug, Clone)]
pub struct FsFeedSource {
    root: PathBuf,
}

impl FsFeedSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 查找数据文件：优先带位置的文件，不存在时回落到通用文件
    pub fn locate(&self, stem: &str, location: Option<&str>) -> Option<PathBuf> {
        let scoped = location
            .map(str::trim)
            .filter(|loc| !loc.is_empty())
            .map(|loc| self.root.join(format!("{stem}.{loc}.json")));

        scoped
            .into_iter()
            .chain(std::iter::once(self.root.join(format!("{stem}.json"))))
            .find(|path| path.is_file())
    }

    fn read<T: DeserializeOwned>(&self, stem: &str, location: Option<&str>) -> Result<Vec<T>, FeedError> {
        let path = self.locate(stem, location).ok_or_else(|| FeedError::NotFound {
            path: self.root.join(format!("{stem}.json")),
        })?;

        let content = fs::read_to_string(&path).map_err(|source| FeedError::Io {
            path: path.clone(),
            source,
        })?;

        let items = parse_feed(&content).map_err(|source| FeedError::Parse {
            path: path.clone(),
            source,
        })?;

        debug!(path = ?path, count = items.len(), "数据源读取完成");
        Ok(items)
    }
}

impl FeedSource for FsFeedSource {
    fn fetch_promotions(&self, location: Option<&str>) -> Result<Vec<PromotionalItem>, FeedError> {
        self.read("promotions", location)
    }

    fn fetch_carousel(&self, location: Option<&str>) -> Result<Vec<CarouselItem>, FeedError> {
        self.read("carousel", location)
    }
}

/// 内存数据源，测试和嵌入场景使用
#[derive(Debug, Clone, Default)]
pub struct StaticFeedSource {
    pub promotions: Vec<PromotionalItem>,
    pub carousel: Vec<CarouselItem>,
    /// 为 true 时所有请求都失败
    pub unavailable: bool,
}

impl StaticFeedSource {
    pub fn new(promotions: Vec<PromotionalItem>, carousel: Vec<CarouselItem>) -> Self {
        Self {
            promotions,
            carousel,
            unavailable: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), FeedError> {
        if self.unavailable {
            Err(FeedError::Unavailable("静态数据源被标记为不可用".to_string()))
        } else {
            Ok(())
        }
    }
}

impl FeedSource for StaticFeedSource {
    fn fetch_promotions(&self, _location: Option<&str>) -> Result<Vec<PromotionalItem>, FeedError> {
        self.check()?;
        Ok(self.promotions.clone())
    }

    fn fetch_carousel(&self, _location: Option<&str>) -> Result<Vec<CarouselItem>, FeedError> {
        self.check()?;
        Ok(self.carousel.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_reads_list_and_envelope() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "promotions.json",
            r#"[{ "id": 1, "title": "Spring", "priority": 3 }]"#,
        );
        write(
            dir.path(),
            "carousel.json",
            r#"{ "data": [{ "id": "c1", "title": "Eggs", "badgeText": "New" }] }"#,
        );

        let source = FsFeedSource::new(dir.path());
        let promotions = source.fetch_promotions(None).unwrap();
        assert_eq!(promotions.len(), 1);
        assert_eq!(promotions[0].id.as_str(), "1");
        assert_eq!(promotions[0].priority, 3);

        let carousel = source.fetch_carousel(None).unwrap();
        assert_eq!(carousel[0].badge_text.as_deref(), Some("New"));
    }

    #[test]
    fn test_location_scoped_file_preferred() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "promotions.json", r#"[{ "id": "all" }]"#);
        write(dir.path(), "promotions.downtown.json", r#"[{ "id": "dt" }]"#);

        let source = FsFeedSource::new(dir.path());
        let scoped = source.fetch_promotions(Some("downtown")).unwrap();
        assert_eq!(scoped[0].id.as_str(), "dt");

        // 没有对应位置的文件时回落到通用文件
        let fallback = source.fetch_promotions(Some("uptown")).unwrap();
        assert_eq!(fallback[0].id.as_str(), "all");
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsFeedSource::new(dir.path());
        assert!(matches!(
            source.fetch_carousel(None),
            Err(FeedError::NotFound { .. })
        ));

        write(dir.path(), "carousel.json", "{ broken");
        assert!(matches!(
            source.fetch_carousel(None),
            Err(FeedError::Parse { .. })
        ));
    }

    #[test]
    fn test_static_source() {
        let source = StaticFeedSource::new(vec![PromotionalItem::new("a", "A")], Vec::new());
        assert_eq!(source.fetch_promotions(None).unwrap().len(), 1);
        assert!(source.fetch_carousel(Some("x")).unwrap().is_empty());

        assert!(StaticFeedSource::unavailable().fetch_promotions(None).is_err());
    }
}
