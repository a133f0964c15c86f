//! 内容格式化服务
//!
//! 纯函数：同样的提交记录总是得到同样的路径和正文，重复同步时 diff 保持干净

use crate::models::language::extension_for;
use crate::models::SubmissionRecord;

/// 既没有标签也不知道难度时使用的目录
pub const DEFAULT_BUCKET: &str = "algorithms";

/// 格式化后的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedSolution {
    pub path: String,
    pub body: String,
}

/// 提交信息（新建 / 更新各一条）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    pub create: String,
    pub update: String,
}

impl CommitMessage {
    pub fn for_solution(title: &str) -> Self {
        Self {
            create: format!("Add solution: {}", title),
            update: format!("Update solution: {}", title),
        }
    }
}

impl From<&str> for CommitMessage {
    fn from(message: &str) -> Self {
        Self {
            create: message.to_string(),
            update: message.to_string(),
        }
    }
}

/// 小写，只保留 ASCII 字母数字和空白，空白压成一个下划线
pub fn sanitize_segment(raw: &str) -> String {
    raw.to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// 文件名：`two_sum.py`
pub fn file_name(record: &SubmissionRecord) -> String {
    let mut stem = sanitize_segment(&record.title);
    if stem.is_empty() {
        stem = record
            .slug
            .as_deref()
            .map(|slug| sanitize_segment(&slug.replace('-', " ")))
            .unwrap_or_default();
    }
    if stem.is_empty() {
        stem = "solution".to_string();
    }
    format!("{}.{}", stem, extension_for(&record.language))
}

/// 目录：第一个标签 → 难度 → 默认目录
pub fn directory(record: &SubmissionRecord) -> String {
    record
        .tags
        .first()
        .map(|tag| sanitize_segment(tag))
        .filter(|dir| !dir.is_empty())
        .or_else(|| {
            record
                .difficulty
                .is_known()
                .then(|| record.difficulty.name().to_lowercase())
        })
        .unwrap_or_else(|| DEFAULT_BUCKET.to_string())
}

pub fn file_path(record: &SubmissionRecord) -> String {
    format!("{}/{}", directory(record), file_name(record))
}

/// 围栏至少三个反引号，且比代码里最长的连续反引号多一个
fn fence_for(code: &str) -> String {
    let longest = code
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat((longest + 1).max(3))
}

/// 渲染正文
pub fn render_body(record: &SubmissionRecord) -> String {
    let tags = if record.tags.is_empty() {
        "None".to_string()
    } else {
        record.tags.join(", ")
    };
    let fence = fence_for(&record.code);
    let newline = if record.code.ends_with('\n') { "" } else { "\n" };

    format!(
        "# {title}\n\
         \n\
         - **Language:** {language}\n\
         - **Date:** {date}\n\
         - **Link:** {url}\n\
         - **Difficulty:** {difficulty}\n\
         - **Tags:** {tags}\n\
         \n\
         ## Solution\n\
         \n\
         {fence}{language}\n\
         {code}{newline}\
         {fence}\n\
         \n\
         ---\n\
         *Auto-synced by LeetSync*\n",
        title = record.title,
        language = record.language,
        date = record.timestamp.format("%Y-%m-%d"),
        url = record.url,
        difficulty = record.difficulty,
        tags = tags,
        fence = fence,
        code = record.code,
        newline = newline,
    )
}

/// 提交记录 → (路径, 正文)
pub fn format_submission(record: &SubmissionRecord) -> FormattedSolution {
    FormattedSolution {
        path: file_path(record),
        body: render_body(record),
    }
}
