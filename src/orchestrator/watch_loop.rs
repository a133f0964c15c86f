//! 监视循环 - 编排层
//!
//! 单线程协作式：检测 → 提取 → 同步 对每个提交严格串行

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::infrastructure::ScriptHost;
use crate::services::{Notifier, Severity, SubmissionObserver, WatchOutcome};
use crate::workflow::{FlowOutcome, SubmissionFlow};

/// 运行期统计（不落盘）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncStats {
    pub synced: usize,
    pub failed: usize,
    pub skipped: usize,
    pub last_sync: Option<DateTime<Utc>>,
}

impl SyncStats {
    fn record(&mut self, outcome: &FlowOutcome) {
        match outcome {
            FlowOutcome::Synced { .. } => {
                self.synced += 1;
                self.last_sync = Some(Utc::now());
            }
            FlowOutcome::ConfigMissing(_) => self.skipped += 1,
            FlowOutcome::ExtractionFailed | FlowOutcome::WriteFailed(_) => self.failed += 1,
        }
    }
}

/// 监视循环
pub struct WatchLoop {
    observer: SubmissionObserver,
    flow: SubmissionFlow,
    notifier: Arc<dyn Notifier>,
    page_match: String,
    idle_poll: Duration,
    stats: SyncStats,
}

impl WatchLoop {
    pub fn new(
        observer: SubmissionObserver,
        flow: SubmissionFlow,
        notifier: Arc<dyn Notifier>,
        page_match: impl Into<String>,
        idle_poll: Duration,
    ) -> Self {
        Self {
            observer,
            flow,
            notifier,
            page_match: page_match.into(),
            idle_poll,
            stats: SyncStats::default(),
        }
    }

    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// 一次空闲检查，有提交时处理完再返回
    pub async fn tick(&mut self, host: &dyn ScriptHost) -> AppResult<Option<FlowOutcome>> {
        self.observer.ensure_hooks(host).await?;
        let activity = self.observer.drain(host).await?;

        if !activity.href.contains(&self.page_match) {
            debug!("当前页面不是题目页面: {}", activity.href);
            return Ok(None);
        }

        let after_click = activity.submits > 0;
        if !after_click && !self.observer.has_pending() {
            return Ok(None);
        }

        if after_click {
            info!("🚀 检测到提交点击，等待判题结果...");
            self.notifier
                .notify("🔄 正在等待判题结果...", Severity::Info)
                .await;
        }

        match self.observer.watch(host, after_click).await? {
            WatchOutcome::Accepted(event) => {
                let outcome = self.flow.run(host, &event, Utc::now()).await;
                self.stats.record(&outcome);
                Ok(Some(outcome))
            }
            WatchOutcome::Rejected(status) => {
                self.stats.skipped += 1;
                self.notifier
                    .notify(&format!("❌ 提交未通过 ({})，不进行同步", status), Severity::Error)
                    .await;
                Ok(None)
            }
            WatchOutcome::Duplicate(key) => {
                debug!("{} 已同步过，跳过", key);
                Ok(None)
            }
            WatchOutcome::TimedOut => {
                if after_click {
                    self.stats.skipped += 1;
                    self.notifier
                        .notify("❌ 未检测到通过结果，不进行同步", Severity::Error)
                        .await;
                }
                Ok(None)
            }
        }
    }

    /// 循环直到 `shutdown` 完成
    pub async fn run_until<F>(&mut self, host: &dyn ScriptHost, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("收到退出信号，停止监视");
                    break;
                }
                _ = sleep(self.idle_poll) => {}
            }

            // 页面刷新或跳转时脚本可能失败，下一轮重新安装钩子即可
            if let Err(e) = self.tick(host).await {
                warn!("⚠️ 页面检查失败: {}", e);
            }
        }
    }
}
