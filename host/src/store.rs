//! # Store 模块
//!
//! 持久化到 JSON 文件的键值存储，收藏夹跨进程保留。

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use promo_runtime::StoreError;
use promo_runtime::store::{KeyValueStore, Listener, Listeners, SubscriptionId};
use tracing::warn;

/// JSON 文件存储
///
/// 整个文件是一个字符串到字符串的对象，每次写入都整体重写。
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
    listeners: Listeners,
}

impl JsonFileStore {
    /// 打开存储文件
    ///
    /// 文件不存在时从空存储开始；内容损坏时输出警告并从空存储开始。
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = ?path, error = %e, "存储文件解析失败，使用空存储");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };

        Self {
            path,
            values,
            listeners: Listeners::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.values)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        fs::write(&self.path, json).map_err(|e| StoreError::Backend(e.to_string()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let previous = self.values.insert(key.to_string(), value.clone());
        if let Err(e) = self.flush() {
            // 写入失败时回滚内存状态
            match previous {
                Some(previous) => self.values.insert(key.to_string(), previous),
                None => self.values.remove(key),
            };
            return Err(e);
        }

        self.listeners.notify(key, Some(&value));
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let Some(previous) = self.values.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.flush() {
            self.values.insert(key.to_string(), previous);
            return Err(e);
        }

        self.listeners.notify(key, None);
        Ok(())
    }

    fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        self.listeners.add(listener)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use promo_runtime::{FAVORITES_KEY, Favorites, ItemId};

    use super::*;

    #[test]
    fn test_values_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("store.json");

        let mut store = JsonFileStore::open(&path);
        store.set("theme", "dark".to_string()).unwrap();
        drop(store);

        let store = JsonFileStore::open(&path);
        assert_eq!(store.get("theme"), Some("dark".to_string()));
    }

    #[test]
    fn test_favorites_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");

        let mut favorites = Favorites::new(JsonFileStore::open(&path));
        favorites.toggle(&ItemId::new("7")).unwrap();

        let favorites = Favorites::new(JsonFileStore::open(&path));
        assert!(favorites.contains(&ItemId::new("7")));
        assert!(favorites.store().get(FAVORITES_KEY).is_some());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "[1, 2").unwrap();

        let store = JsonFileStore::open(&path);
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn test_remove_notifies_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::open(dir.path().join("store.json"));

        let removals = Rc::new(Cell::new(0));
        let counter = Rc::clone(&removals);
        store.subscribe(Box::new(move |_, value| {
            if value.is_none() {
                counter.set(counter.get() + 1);
            }
        }));

        store.set("k", "v".to_string()).unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(removals.get(), 1);
    }
}
