//! 提交内容提取服务 - 业务能力层
//!
//! 只负责"从页面快照构造提交记录"，不关心何时触发、如何同步

pub mod metadata;
pub mod strategies;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::models::{PageSnapshot, SubmissionRecord};
use crate::utils::logging::truncate_text;
use strategies::{default_strategies, CodeStrategy};

pub use strategies::CapturedCode;

/// 提交内容提取器
///
/// 按顺序尝试各个代码策略，第一个成功的胜出
pub struct SolutionExtractor {
    strategies: Vec<Box<dyn CodeStrategy>>,
    min_code_len: usize,
}

impl SolutionExtractor {
    pub fn new(min_code_len: usize) -> Self {
        Self::with_strategies(default_strategies(), min_code_len)
    }

    pub fn with_strategies(strategies: Vec<Box<dyn CodeStrategy>>, min_code_len: usize) -> Self {
        Self {
            strategies,
            min_code_len,
        }
    }

    /// 取代码，所有策略都失败返回 None
    pub fn capture_code(&self, snapshot: &PageSnapshot) -> Option<CapturedCode> {
        self.strategies.iter().find_map(|strategy| {
            let captured = strategy.extract(snapshot, self.min_code_len);
            match &captured {
                Some(c) => debug!("✓ 策略 {} 取到 {} 个字符", strategy.name(), c.code.len()),
                None => debug!("策略 {} 未取到代码", strategy.name()),
            }
            captured
        })
    }

    /// 构造提交记录
    ///
    /// 代码太短或找不到标题时返回 None，调用方负责提示用户
    pub fn extract(&self, snapshot: &PageSnapshot, captured_at: DateTime<Utc>) -> Option<SubmissionRecord> {
        let Some(captured) = self.capture_code(snapshot) else {
            warn!("⚠️ 所有提取策略都失败了: {}", snapshot.href);
            return None;
        };

        let Some(title) = metadata::extract_title(snapshot) else {
            warn!("⚠️ 找不到题目标题: {}", snapshot.href);
            return None;
        };

        let language = metadata::detect_language(
            captured.language_hint.as_deref(),
            snapshot.language_selector.as_deref(),
            &captured.code,
        );

        let record = SubmissionRecord {
            title: title.title,
            url: metadata::canonical_url(&snapshot.href),
            language,
            code: captured.code,
            difficulty: metadata::extract_difficulty(snapshot),
            tags: metadata::extract_tags(snapshot),
            timestamp: captured_at,
            slug: snapshot.problem_slug().map(str::to_string),
            frontend_id: title.frontend_id,
        };

        debug!(
            "📝 提取结果: {} 代码预览: {}",
            record,
            truncate_text(&record.code, 60)
        );
        Some(record)
    }
}
