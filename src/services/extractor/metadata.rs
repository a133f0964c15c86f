//! 题目元数据提取：标题、地址、难度、标签、语言

use url::Url;

use crate::models::language::{detect_from_code, normalize_language, DEFAULT_LANGUAGE};
use crate::models::snapshot::problem_slug;
use crate::models::{Difficulty, PageSnapshot};

/// 最多保留的标签数
pub const MAX_TAGS: usize = 5;

/// 标题以及从标题里拆出来的题号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleInfo {
    pub title: String,
    pub frontend_id: Option<u32>,
}

/// `1. Two Sum` → (`Two Sum`, 1)
fn split_number(raw: &str) -> TitleInfo {
    let raw = raw.trim();
    if let Some((number, rest)) = raw.split_once(". ") {
        if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) && !rest.trim().is_empty() {
            return TitleInfo {
                title: rest.trim().to_string(),
                frontend_id: number.parse().ok(),
            };
        }
    }
    TitleInfo {
        title: raw.to_string(),
        frontend_id: None,
    }
}

/// 标题：页面标题元素 → document.title → URL slug
pub fn extract_title(snapshot: &PageSnapshot) -> Option<TitleInfo> {
    if let Some(heading) = snapshot.headings.iter().find(|h| !h.trim().is_empty()) {
        return Some(split_number(heading));
    }

    let doc_title = snapshot
        .document_title
        .trim()
        .trim_end_matches("- LeetCode")
        .trim_end_matches("- 力扣（LeetCode）")
        .trim();
    if !doc_title.is_empty() && !doc_title.eq_ignore_ascii_case("leetcode") {
        return Some(split_number(doc_title));
    }

    snapshot.problem_slug().map(|slug| TitleInfo {
        title: humanize_slug(slug),
        frontend_id: None,
    })
}

/// `two-sum` → `Two Sum`
pub fn humanize_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 规范化题目地址：去掉查询参数和锚点，`/problems/<slug>/...` 收敛到 `/problems/<slug>/`
pub fn canonical_url(href: &str) -> String {
    let Ok(mut url) = Url::parse(href) else {
        return href.split(['?', '#']).next().unwrap_or(href).to_string();
    };
    url.set_query(None);
    url.set_fragment(None);
    if let Some(slug) = problem_slug(url.path()).map(str::to_string) {
        url.set_path(&format!("/problems/{}/", slug));
    }
    url.to_string()
}

/// 难度：难度标签 → 页面文本里单独成行的难度词 → Unknown
///
/// 有难度标签但解析不出来时直接返回 Unknown，不再猜
pub fn extract_difficulty(snapshot: &PageSnapshot) -> Difficulty {
    if !snapshot.difficulty_labels.is_empty() {
        return snapshot
            .difficulty_labels
            .iter()
            .find_map(|label| Difficulty::from_label(label))
            .unwrap_or_default();
    }

    // 正文里的 "easy" 之类不算，只认整行就是难度词的第一行
    snapshot
        .body_text
        .lines()
        .find_map(Difficulty::from_label)
        .unwrap_or_default()
}

/// 标签：去掉首尾空白，长度 2..30，保持顺序，最多 5 个
pub fn extract_tags(snapshot: &PageSnapshot) -> Vec<String> {
    snapshot
        .tag_texts
        .iter()
        .map(|t| t.trim())
        .filter(|t| {
            let len = t.chars().count();
            len > 1 && len < 30
        })
        .take(MAX_TAGS)
        .map(str::to_string)
        .collect()
}

/// 语言：编辑器语言 → 语言选择器 → 代码关键字 → 默认
pub fn detect_language(editor_hint: Option<&str>, selector: Option<&str>, code: &str) -> String {
    editor_hint
        .and_then(normalize_language)
        .or_else(|| selector.and_then(normalize_language))
        .or_else(|| detect_from_code(code))
        .map(|info| info.id)
        .unwrap_or(DEFAULT_LANGUAGE)
        .to_string()
}
