//! # Tracking 模块
//!
//! 行动按钮的点击追踪。
//!
//! 追踪是尽力而为的：失败只记录日志，不影响跳转。

use std::cell::RefCell;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::{SecondsFormat, Utc};
use promo_runtime::ItemId;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

/// 追踪错误
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("追踪记录写入失败: {0}")]
    Io(#[from] io::Error),

    #[error("追踪记录序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("追踪服务不可用")]
    Unavailable,
}

/// 点击追踪
pub trait ClickTracker {
    fn track(&mut self, id: &ItemId) -> Result<(), TrackingError>;
}

impl<T: ClickTracker + ?Sized> ClickTracker for Box<T> {
    fn track(&mut self, id: &ItemId) -> Result<(), TrackingError> {
        (**self).track(id)
    }
}

/// 只输出日志
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTracker;

impl ClickTracker for LogTracker {
    fn track(&mut self, id: &ItemId) -> Result<(), TrackingError> {
        info!(item = %id, "推广点击");
        Ok(())
    }
}

/// 单条追踪记录
#[derive(Debug, Serialize)]
struct TrackRecord<'a> {
    id: &'a str,
    tracked_at: String,
}

/// 追加写入 JSONL 文件
#[derive(Debug, Clone)]
pub struct JsonlTracker {
    path: PathBuf,
}

impl JsonlTracker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ClickTracker for JsonlTracker {
    fn track(&mut self, id: &ItemId) -> Result<(), TrackingError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let record = TrackRecord {
            id: id.as_str(),
            tracked_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let line = serde_json::to_string(&record)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

/// 记录点击，测试使用
///
/// 克隆共享同一份记录，交给宿主后仍可在外部读取。
#[derive(Debug, Clone, Default)]
pub struct RecordingTracker {
    clicks: Rc<RefCell<Vec<ItemId>>>,
    failing: bool,
}

impl RecordingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次追踪都失败，但仍记录调用
    pub fn failing() -> Self {
        Self {
            clicks: Rc::default(),
            failing: true,
        }
    }

    pub fn clicks(&self) -> Vec<ItemId> {
        self.clicks.borrow().clone()
    }
}

impl ClickTracker for RecordingTracker {
    fn track(&mut self, id: &ItemId) -> Result<(), TrackingError> {
        self.clicks.borrow_mut().push(id.clone());
        if self.failing {
            Err(TrackingError::Unavailable)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jsonl_tracker_appends_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("clicks.jsonl");
        let mut tracker = JsonlTracker::new(&path);

        tracker.track(&ItemId::new("a")).unwrap();
        tracker.track(&ItemId::new("b")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let records: Vec<serde_json::Value> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["id"], "a");
        assert_eq!(records[1]["id"], "b");

        let stamp = records[0]["tracked_at"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
    }

    #[test]
    fn test_recording_tracker_shares_clicks() {
        let tracker = RecordingTracker::new();
        let mut handle = tracker.clone();
        handle.track(&ItemId::new("x")).unwrap();
        assert_eq!(tracker.clicks(), vec![ItemId::new("x")]);

        let mut failing = RecordingTracker::failing();
        assert!(failing.track(&ItemId::new("y")).is_err());
        assert_eq!(failing.clicks().len(), 1);
    }
}
