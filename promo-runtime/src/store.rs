//! # Store 模块
//!
//! 进程级键值存储能力与收藏夹。
//!
//! 收藏状态需要在货架卡片、详情页等多处共享，统一通过注入的
//! [`KeyValueStore`] 读写，宿主决定落在内存还是文件里。

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::StoreError;
use crate::item::ItemId;

/// 收藏夹在存储中的键
pub const FAVORITES_KEY: &str = "favorites";

/// 订阅 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// 变更监听器，参数为键和新值（删除时为 `None`）
pub type Listener = Box<dyn Fn(&str, Option<&str>)>;

/// 键值存储能力
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// 订阅所有键的变更
    fn subscribe(&mut self, listener: Listener) -> SubscriptionId;

    /// 取消订阅，返回订阅是否存在
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }

    fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        (**self).subscribe(listener)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        (**self).unsubscribe(id)
    }
}

/// 监听器列表，供各存储实现复用
#[derive(Default)]
pub struct Listeners {
    entries: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl Listeners {
    pub fn add(&mut self, listener: Listener) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push((id, listener));
        id
    }

    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn notify(&self, key: &str, value: Option<&str>) {
        for (_, listener) in &self.entries {
            listener(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 内存存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
    listeners: Listeners,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.clone());
        self.listeners.notify(key, Some(&value));
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.values.remove(key).is_some() {
            self.listeners.notify(key, None);
        }
        Ok(())
    }

    fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        self.listeners.add(listener)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }
}

/// 收藏夹
///
/// 以 JSON 数组形式保存在 [`FAVORITES_KEY`] 下。
/// 存储中的值无法解析时视为空收藏夹。
#[derive(Debug)]
pub struct Favorites<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> Favorites<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 当前收藏的条目，按 ID 排序
    pub fn ids(&self) -> BTreeSet<ItemId> {
        self.store
            .get(FAVORITES_KEY)
            .and_then(|raw| serde_json::from_str::<Vec<ItemId>>(&raw).ok())
            .map(|ids| ids.into_iter().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.ids().contains(id)
    }

    /// 切换收藏状态，返回切换后是否已收藏
    pub fn toggle(&mut self, id: &ItemId) -> Result<bool, StoreError> {
        let mut ids = self.ids();
        let favorited = if ids.remove(id) {
            false
        } else {
            ids.insert(id.clone());
            true
        };

        let ids: Vec<&ItemId> = ids.iter().collect();
        let raw =
            serde_json::to_string(&ids).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.store.set(FAVORITES_KEY, raw)?;

        Ok(favorited)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}
