//! 已处理提交集合
//!
//! 替代给 DOM 元素打标记的做法：观察器自己持有一份已处理的提交标识

use std::collections::{HashSet, VecDeque};
use std::fmt;

/// 默认最多记住的提交数
pub const DEFAULT_CAPACITY: usize = 256;

/// 提交标识
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubmissionKey {
    /// 站点给出的提交 ID
    Id(String),
    /// 拿不到 ID 时退化为"题目 + 监视会话序号"
    Session { slug: String, seq: u64 },
}

impl fmt::Display for SubmissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionKey::Id(id) => write!(f, "提交#{}", id),
            SubmissionKey::Session { slug, seq } => write!(f, "{}@会话{}", slug, seq),
        }
    }
}

/// 已处理提交集合，超出容量时淘汰最早的记录
#[derive(Debug)]
pub struct ProcessedSubmissions {
    seen: HashSet<SubmissionKey>,
    order: VecDeque<SubmissionKey>,
    capacity: usize,
}

impl ProcessedSubmissions {
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: HashSet::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// 认领一个提交，之前没见过返回 true
    pub fn claim(&mut self, key: SubmissionKey) -> bool {
        if self.seen.contains(&key) {
            return false;
        }
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.seen.insert(key.clone());
        self.order.push_back(key);
        true
    }

    pub fn contains(&self, key: &SubmissionKey) -> bool {
        self.seen.contains(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for ProcessedSubmissions {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
