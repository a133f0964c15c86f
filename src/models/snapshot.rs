//! 页面快照
//!
//! 一次脚本调用把提取需要的页面状态全部取回来，之后的判断都在 Rust 里做

use serde::Deserialize;

use crate::error::AppResult;
use crate::infrastructure::js_executor::{eval_as, ScriptHost};

/// 编辑器里的一个文档模型
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorModel {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub language_id: Option<String>,
    /// 是否挂在某个编辑器实例上（测试用例输入框的 model 也在 `getModels()` 里）
    #[serde(default)]
    pub attached: bool,
}

/// 题目页面快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageSnapshot {
    pub href: String,
    pub document_title: String,
    /// 按选择器优先级排列的标题候选
    pub headings: Vec<String>,
    /// `monaco.editor.getModels()` 的内容
    pub editor_models: Vec<EditorModel>,
    /// 渲染出来的 `.view-line` 行
    pub view_lines: Vec<String>,
    /// 其它代码块（`pre code` 等）
    pub code_blocks: Vec<String>,
    /// 语言选择器上的文字
    pub language_selector: Option<String>,
    pub difficulty_labels: Vec<String>,
    pub tag_texts: Vec<String>,
    pub body_text: String,
}

/// 抓取快照的脚本
pub const CAPTURE_SCRIPT: &str = r#"/* leet-sync:snapshot */
(() => {
    const texts = (selector) => Array.from(document.querySelectorAll(selector))
        .map((el) => (el.textContent || '').trim())
        .filter((t) => t.length > 0);
    const first = (selectors) => {
        for (const s of selectors) {
            const el = document.querySelector(s);
            if (el && (el.textContent || '').trim()) return el.textContent.trim();
        }
        return null;
    };

    let editorModels = [];
    try {
        if (window.monaco && window.monaco.editor) {
            const attached = new Set();
            if (typeof window.monaco.editor.getEditors === 'function') {
                for (const ed of window.monaco.editor.getEditors()) {
                    const m = ed.getModel && ed.getModel();
                    if (m) attached.add(m);
                }
            }
            editorModels = window.monaco.editor.getModels().map((m) => ({
                value: m.getValue(),
                languageId: typeof m.getLanguageId === 'function'
                    ? m.getLanguageId()
                    : (m.getModeId ? m.getModeId() : null),
                attached: attached.has(m),
            }));
        }
    } catch (e) {
        editorModels = [];
    }

    const headings = [];
    for (const s of ['h1', '[data-cy="question-title"]', '.text-title-large', '.question-title', 'a[href^="/problems/"].no-underline']) {
        headings.push(...texts(s));
    }

    return {
        href: window.location.href,
        documentTitle: document.title || '',
        headings,
        editorModels,
        viewLines: Array.from(document.querySelectorAll('.monaco-editor .view-lines .view-line'))
            .sort((a, b) => (parseFloat(a.style.top) || 0) - (parseFloat(b.style.top) || 0))
            .map((el) => el.textContent || ''),
        codeBlocks: Array.from(document.querySelectorAll('pre code, .highlight pre, [class*="code-block"] pre'))
            .map((el) => el.textContent || ''),
        languageSelector: first(['[data-cy="lang-select"] .ant-select-selection-item', 'button[id^="headlessui-popover-button"] .text-sm', '.ant-select-selection-item']),
        difficultyLabels: texts('[class*="text-difficulty-"], [diff], .difficulty-label'),
        tagTexts: texts('a[href^="/tag/"], [data-cy="topic-tag"], .topic-tag'),
        bodyText: document.body ? (document.body.innerText || document.body.textContent || '') : '',
    };
})()
"#;

impl PageSnapshot {
    /// 从页面抓取快照
    pub async fn capture(host: &dyn ScriptHost) -> AppResult<Self> {
        eval_as(host, CAPTURE_SCRIPT).await
    }

    /// URL 中 `/problems/<slug>` 的 slug
    pub fn problem_slug(&self) -> Option<&str> {
        problem_slug(&self.href)
    }
}

/// 提取 `/problems/<slug>` 中的 slug
pub fn problem_slug(href: &str) -> Option<&str> {
    let rest = href.split("/problems/").nth(1)?;
    let slug = rest
        .split(|c| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or("");
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}
