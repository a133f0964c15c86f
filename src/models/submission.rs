use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 题目难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    Unknown,
}

impl Difficulty {
    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Unknown => "Unknown",
        }
    }

    /// 从难度标签解析（忽略大小写，精确匹配）
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "easy" | "简单" => Some(Difficulty::Easy),
            "medium" | "中等" => Some(Difficulty::Medium),
            "hard" | "困难" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn is_known(self) -> bool {
        self != Difficulty::Unknown
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 一次通过的提交
///
/// 只在确认 Accepted 之后构造，处理完即丢弃，不做持久化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    /// 题目名称（非空）
    pub title: String,
    /// 去掉查询参数后的题目地址
    pub url: String,
    /// 规范化后的语言标识，例如 `python`、`cpp`
    pub language: String,
    /// 提交的完整源代码
    pub code: String,
    pub difficulty: Difficulty,
    /// 题目标签，保持页面上的顺序，最多 5 个
    pub tags: Vec<String>,
    /// 抓取时间
    pub timestamp: DateTime<Utc>,
    /// URL 中的题目 slug，例如 `two-sum`
    pub slug: Option<String>,
    /// 页面展示的题号
    pub frontend_id: Option<u32>,
}

impl fmt::Display for SubmissionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frontend_id {
            Some(id) => write!(f, "[#{} {} | {}]", id, self.title, self.language),
            None => write!(f, "[{} | {}]", self.title, self.language),
        }
    }
}
