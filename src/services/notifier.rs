//! 页面通知服务
//!
//! 在页面右上角弹出短暂提示，失败只记日志，永远不向上抛错

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::infrastructure::ScriptHost;

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    fn color(self) -> &'static str {
        match self {
            Severity::Info => "#3b82f6",
            Severity::Success => "#10b981",
            Severity::Error => "#ef4444",
        }
    }
}

/// 通知能力
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str, severity: Severity);
}

fn log_notification(message: &str, severity: Severity) {
    match severity {
        Severity::Info => info!("🔔 {}", message),
        Severity::Success => info!("✅ {}", message),
        Severity::Error => error!("❌ {}", message),
    }
}

/// 页面通知器
pub struct PageNotifier {
    host: Arc<dyn ScriptHost>,
    dismiss_after: Duration,
}

impl PageNotifier {
    pub fn new(host: Arc<dyn ScriptHost>, dismiss_after: Duration) -> Self {
        Self {
            host,
            dismiss_after,
        }
    }
}

/// 构建弹出提示的脚本
pub fn toast_script(message: &str, severity: Severity, dismiss_after: Duration) -> String {
    // serde_json 负责转义，消息里有引号或换行也安全
    let message = serde_json::to_string(message).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        r#"/* leet-sync:toast */
(() => {{
    document.querySelectorAll('.leetsync-notification').forEach((el) => el.remove());
    const el = document.createElement('div');
    el.className = 'leetsync-notification';
    el.textContent = {message};
    el.style.cssText = 'position:fixed;top:20px;right:20px;background:{color};color:white;'
        + 'padding:12px 16px;border-radius:8px;z-index:999999;font-family:system-ui;'
        + 'font-size:14px;font-weight:500;box-shadow:0 4px 12px rgba(0,0,0,0.15);'
        + 'max-width:350px;word-wrap:break-word;';
    document.body.appendChild(el);
    setTimeout(() => {{ if (el.parentNode) el.remove(); }}, {dismiss});
    return true;
}})()
"#,
        message = message,
        color = severity.color(),
        dismiss = dismiss_after.as_millis(),
    )
}

#[async_trait]
impl Notifier for PageNotifier {
    async fn notify(&self, message: &str, severity: Severity) {
        log_notification(message, severity);
        let script = toast_script(message, severity, self.dismiss_after);
        if let Err(e) = self.host.eval(&script).await {
            warn!("⚠️ 页面通知失败: {}", e);
        }
    }
}
