//! # Timer 模块
//!
//! 虚拟时钟上的定时器队列。
//!
//! Runtime 不读取真实时间：宿主通过 `advance(dt)` 推进时钟，
//! 控制器从队列中按截止时间依次取出到期的定时器并处理。
//! 同一截止时间的定时器按调度顺序触发。

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 定时器 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Entry<K> {
    id: TimerId,
    deadline: Duration,
    kind: K,
}

/// 定时器队列
#[derive(Debug, Clone)]
pub struct TimerQueue<K> {
    /// 当前虚拟时间
    now: Duration,
    entries: Vec<Entry<K>>,
    next_id: u64,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TimerQueue<K> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// 当前虚拟时间
    pub fn now(&self) -> Duration {
        self.now
    }

    /// 在 `delay` 之后触发
    pub fn schedule(&mut self, delay: Duration, kind: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            deadline: self.now.saturating_add(delay),
            kind,
        });
        id
    }

    /// 取消定时器，返回是否确实取消了一个待触发的定时器
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    /// 取消全部定时器，返回取消的数量
    pub fn cancel_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// 待触发的定时器数量
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// 最早的截止时间
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|entry| entry.deadline).min()
    }

    /// 取出截止时间不晚于 `until` 的最早定时器
    ///
    /// 时钟被推进到该定时器的截止时间，处理函数里新调度的定时器以此为起点。
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, K)> {
        let position = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.deadline <= until)
            .min_by_key(|(_, entry)| (entry.deadline, entry.id))
            .map(|(index, _)| index)?;

        let entry = self.entries.remove(position);
        self.now = self.now.max(entry.deadline);
        Some((entry.id, entry.kind))
    }

    /// 把时钟推进到 `until`（不会倒退）
    pub fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_in_deadline_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(Duration::from_millis(300), "late");
        queue.schedule(Duration::from_millis(100), "early");
        queue.schedule(Duration::from_millis(100), "early-second");

        let until = Duration::from_millis(500);
        assert_eq!(queue.pop_due(until).map(|(_, k)| k), Some("early"));
        assert_eq!(queue.now(), Duration::from_millis(100));
        assert_eq!(queue.pop_due(until).map(|(_, k)| k), Some("early-second"));
        assert_eq!(queue.pop_due(until).map(|(_, k)| k), Some("late"));
        assert_eq!(queue.pop_due(until), None);

        queue.advance_to(until);
        assert_eq!(queue.now(), until);
    }

    #[test]
    fn test_not_due_stays_pending() {
        let mut queue = TimerQueue::new();
        queue.schedule(Duration::from_secs(5), ());

        assert!(queue.pop_due(Duration::from_secs(4)).is_none());
        assert_eq!(queue.pending(), 1);
        assert_eq!(queue.next_deadline(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_cancel() {
        let mut queue = TimerQueue::new();
        let a = queue.schedule(Duration::from_secs(1), 'a');
        queue.schedule(Duration::from_secs(2), 'b');

        assert!(queue.cancel(a));
        assert!(!queue.cancel(a));
        assert!(!queue.is_pending(a));
        assert_eq!(queue.pending(), 1);

        assert_eq!(queue.cancel_all(), 1);
        assert_eq!(queue.pending(), 0);
        assert!(queue.pop_due(Duration::from_secs(10)).is_none());
    }

    #[test]
    fn test_schedule_relative_to_now() {
        let mut queue = TimerQueue::new();
        queue.advance_to(Duration::from_secs(10));
        queue.schedule(Duration::from_secs(1), ());

        assert_eq!(queue.next_deadline(), Some(Duration::from_secs(11)));
    }

    #[test]
    fn test_schedule_saturates_at_max() {
        let mut queue = TimerQueue::new();
        queue.advance_to(Duration::from_secs(10));
        queue.schedule(Duration::MAX, ());

        assert_eq!(queue.next_deadline(), Some(Duration::MAX));
        assert!(queue.pop_due(Duration::from_secs(3600)).is_none());
    }
}
