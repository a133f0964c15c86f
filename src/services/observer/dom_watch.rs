//! 被动 DOM 监视：在页面文本里找判题通过的标记

use serde::Deserialize;

use crate::error::AppResult;
use crate::infrastructure::js_executor::{eval_as, ScriptHost};
use crate::services::observer::interception::digits_after;

/// 读取判题状态区域的脚本
pub const STATUS_SCRIPT: &str = r#"/* leet-sync:status */
(() => ({
    href: window.location.href,
    statusTexts: Array.from(document.querySelectorAll('[data-e2e-locator="submission-result"], .text-green-s, [class*="text-green"]'))
        .map((el) => (el.textContent || '').trim())
        .filter((t) => t.length > 0 && t.length < 40),
    acceptedLocator: !!document.querySelector('[data-e2e-locator*="accepted"]'),
    bodyText: document.body ? (document.body.innerText || document.body.textContent || '') : '',
}))()
"#;

/// 判题状态探针
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusProbe {
    pub href: String,
    pub status_texts: Vec<String>,
    pub accepted_locator: bool,
    pub body_text: String,
}

/// 判定用的文字（随站点语言配置）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptanceTokens {
    pub accepted: String,
    pub runtime: String,
}

impl Default for AcceptanceTokens {
    fn default() -> Self {
        Self {
            accepted: "Accepted".to_string(),
            runtime: "Runtime".to_string(),
        }
    }
}

impl StatusProbe {
    pub async fn capture(host: &dyn ScriptHost) -> AppResult<Self> {
        eval_as(host, STATUS_SCRIPT).await
    }

    /// 状态文字精确命中，并且页面上有运行时间标签佐证
    pub fn is_accepted(&self, tokens: &AcceptanceTokens) -> bool {
        let status_hit = self.accepted_locator
            || self
                .status_texts
                .iter()
                .any(|t| t.trim() == tokens.accepted)
            || self
                .body_text
                .contains(&format!("Status: {}", tokens.accepted));
        status_hit && self.body_text.contains(&tokens.runtime)
    }

    /// 提交详情页 URL 里的提交 ID
    pub fn submission_id(&self) -> Option<String> {
        digits_after(&self.href, "/submissions/")
    }
}
