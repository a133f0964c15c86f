//! 代码提取策略
//!
//! 可靠程度依次降低：编辑器 API → 渲染行 → 页面文本正则

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{EditorModel, PageSnapshot};

/// 某个策略取到的代码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedCode {
    pub code: String,
    /// 编辑器报告的语言（只有编辑器 API 能给出）
    pub language_hint: Option<String>,
}

/// 代码提取策略
pub trait CodeStrategy: Send + Sync {
    /// 策略名称（用于日志）
    fn name(&self) -> &'static str;

    /// 尝试提取，取不到或代码太短返回 None
    fn extract(&self, snapshot: &PageSnapshot, min_len: usize) -> Option<CapturedCode>;
}

fn long_enough(code: &str, min_len: usize) -> bool {
    code.trim().chars().count() >= min_len
}

/// 结构化的编辑器 API（monaco models）
pub struct EditorApi;

impl CodeStrategy for EditorApi {
    fn name(&self) -> &'static str {
        "editor-api"
    }

    fn extract(&self, snapshot: &PageSnapshot, min_len: usize) -> Option<CapturedCode> {
        // 页面上可能有多个 model（测试用例输入框等）：
        // 编辑器上的、带编程语言的优先，同等条件下取靠前的
        snapshot
            .editor_models
            .iter()
            .filter(|m| long_enough(&m.value, min_len))
            .min_by_key(|m| model_rank(m))
            .map(|m| CapturedCode {
                code: m.value.clone(),
                language_hint: m.language_id.clone(),
            })
    }
}

/// 没有语言或是纯文本的 model 通常是测试用例
fn has_code_language(model: &EditorModel) -> bool {
    model
        .language_id
        .as_deref()
        .map(str::trim)
        .is_some_and(|id| !id.is_empty() && !id.eq_ignore_ascii_case("plaintext"))
}

fn model_rank(model: &EditorModel) -> u8 {
    match (model.attached, has_code_language(model)) {
        (true, true) => 0,
        (false, true) => 1,
        (true, false) => 2,
        (false, false) => 3,
    }
}

/// 渲染出来的行元素，其次是普通代码块
pub struct RenderedLines;

impl CodeStrategy for RenderedLines {
    fn name(&self) -> &'static str {
        "rendered-lines"
    }

    fn extract(&self, snapshot: &PageSnapshot, min_len: usize) -> Option<CapturedCode> {
        if !snapshot.view_lines.is_empty() {
            let code = snapshot
                .view_lines
                .iter()
                .map(|line| normalize_rendered_line(line))
                .collect::<Vec<_>>()
                .join("\n");
            if long_enough(&code, min_len) {
                return Some(CapturedCode {
                    code,
                    language_hint: None,
                });
            }
        }

        snapshot
            .code_blocks
            .iter()
            .map(|block| normalize_rendered_line(block))
            .find(|block| long_enough(block, min_len))
            .map(|code| CapturedCode {
                code,
                language_hint: None,
            })
    }
}

/// 编辑器渲染时用不换行空格占位
fn normalize_rendered_line(line: &str) -> String {
    line.replace('\u{a0}', " ").trim_end().to_string()
}

/// 正则扫描页面文本，最后的兜底
pub struct PageText;

/// 页面文本兜底要求的最小长度
const PAGE_TEXT_MIN_LEN: usize = 20;

fn code_anchors() -> &'static [Regex] {
    static ANCHORS: OnceLock<Vec<Regex>> = OnceLock::new();
    ANCHORS.get_or_init(|| {
        [
            r"class Solution",
            r"def \w+",
            r"function \w+",
            r"public ",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

impl CodeStrategy for PageText {
    fn name(&self) -> &'static str {
        "page-text"
    }

    fn extract(&self, snapshot: &PageSnapshot, min_len: usize) -> Option<CapturedCode> {
        let text = &snapshot.body_text;
        let min_len = min_len.max(PAGE_TEXT_MIN_LEN);

        code_anchors().iter().find_map(|anchor| {
            let start = anchor.find(text)?.start();
            let code = take_until_blank_line(&text[start..]).trim().to_string();
            if code.chars().count() > min_len {
                Some(CapturedCode {
                    code,
                    language_hint: None,
                })
            } else {
                None
            }
        })
    }
}

/// 截取到第一个空行为止
fn take_until_blank_line(text: &str) -> &str {
    let mut end = text.len();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if offset > 0 && line.trim().is_empty() {
            end = offset;
            break;
        }
        offset += line.len();
    }
    &text[..end]
}

/// 默认的策略顺序
pub fn default_strategies() -> Vec<Box<dyn CodeStrategy>> {
    vec![Box::new(EditorApi), Box::new(RenderedLines), Box::new(PageText)]
}
