//! 提交同步流程 - 流程层
//!
//! 核心职责：定义"一次通过的提交"的完整处理流程
//!
//! 流程顺序：
//! 1. 抓取页面快照 → 提取提交记录
//! 2. 读取同步设置（缺失则在任何网络请求之前终止）
//! 3. 格式化路径和正文
//! 4. 新建或更新远端文件
//! 5. 页面通知结果

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::SyncError;
use crate::infrastructure::ScriptHost;
use crate::models::PageSnapshot;
use crate::services::observer::dedup::SubmissionKey;
use crate::services::observer::AcceptanceEvent;
use crate::services::{
    format_submission, CommitMessage, GitHubClient, Notifier, SettingsSource, Severity,
    SolutionExtractor, SyncTarget, UpsertOutcome,
};

/// 流程处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// 已同步
    Synced { path: String, outcome: UpsertOutcome },
    /// 提取失败，未同步
    ExtractionFailed,
    /// 配置缺失，未发起任何请求
    ConfigMissing(&'static str),
    /// 写入失败
    WriteFailed(SyncError),
}

impl FlowOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, FlowOutcome::Synced { .. })
    }
}

/// 提交同步流程
///
/// - 编排 提取 → 格式化 → 同步 → 通知
/// - 不持有页面（page），只借用 ScriptHost
/// - 任何失败都降级为通知，不向宿主页面抛错
pub struct SubmissionFlow {
    extractor: SolutionExtractor,
    client: GitHubClient,
    settings: Arc<dyn SettingsSource>,
    notifier: Arc<dyn Notifier>,
}

impl SubmissionFlow {
    /// 创建新的同步流程
    pub fn new(
        extractor: SolutionExtractor,
        client: GitHubClient,
        settings: Arc<dyn SettingsSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            extractor,
            client,
            settings,
            notifier,
        }
    }

    pub async fn run(
        &self,
        host: &dyn ScriptHost,
        event: &AcceptanceEvent,
        captured_at: DateTime<Utc>,
    ) -> FlowOutcome {
        info!("[{}] 🔄 开始处理通过的提交", event.key);

        // ========== 1. 提取 ==========
        let snapshot = match PageSnapshot::capture(host).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                return self.extraction_failed(&event.key, format!("抓取页面快照失败: {}", e)).await;
            }
        };

        let Some(record) = self.extractor.extract(&snapshot, captured_at) else {
            return self
                .extraction_failed(&event.key, format!("页面上没有可用的代码或标题: {}", snapshot.href))
                .await;
        };
        info!("[{}] 📝 已提取 {}", event.key, record);

        // ========== 2. 设置 ==========
        let target = match SyncTarget::try_from(self.settings.get_settings().await) {
            Ok(target) => target,
            Err(SyncError::ConfigMissing { field }) => {
                warn!("[{}] ⚠️ 缺少配置项 {}，跳过同步", event.key, field);
                self.notifier
                    .notify(
                        &format!("⚠️ 未配置 {}，请先填写同步设置", field),
                        Severity::Error,
                    )
                    .await;
                return FlowOutcome::ConfigMissing(field);
            }
            Err(other) => {
                // SyncTarget::try_from 只会产生 ConfigMissing
                warn!("[{}] ⚠️ 设置无效: {}", event.key, other);
                return FlowOutcome::ConfigMissing("settings");
            }
        };

        // ========== 3. 格式化 + 4. 同步 ==========
        let formatted = format_submission(&record);
        let message = CommitMessage::for_solution(&record.title);
        info!(
            "[{}] 📤 正在同步到 {}/{}: {}",
            event.key, target.owner_login, target.repo_name, formatted.path
        );

        match self
            .client
            .upsert(&target, &formatted.path, &formatted.body, &message)
            .await
        {
            Ok(outcome) => {
                self.notifier
                    .notify(&format!("✅ {} 已同步到仓库", record.title), Severity::Success)
                    .await;
                FlowOutcome::Synced {
                    path: formatted.path,
                    outcome,
                }
            }
            Err(e) => {
                error!("[{}] 同步失败: {}", event.key, e);
                self.notifier
                    .notify(&format!("⚠️ 同步失败: {}", e), Severity::Error)
                    .await;
                FlowOutcome::WriteFailed(e)
            }
        }
    }

    async fn extraction_failed(&self, key: &SubmissionKey, reason: String) -> FlowOutcome {
        error!("[{}] {}", key, SyncError::ExtractionFailed { reason });
        self.notifier
            .notify("❌ 无法从页面提取代码，未进行同步", Severity::Error)
            .await;
        FlowOutcome::ExtractionFailed
    }
}
