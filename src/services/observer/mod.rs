//! 提交观察服务 - 业务能力层
//!
//! 两种检测方式（网络拦截、DOM 监视）统一汇入 `dispatch`，先到先得，
//! 已处理集合保证同一个提交最多触发一次提取

pub mod dedup;
pub mod dom_watch;
pub mod interception;

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::js_executor::{eval_as, ScriptHost};
use crate::models::snapshot::problem_slug;
use dedup::{ProcessedSubmissions, SubmissionKey};
use dom_watch::{AcceptanceTokens, StatusProbe};
use interception::{parse_check_response, CheckVerdict, InterceptedResponse, PageActivity, DRAIN_SCRIPT, HOOK_SCRIPT};

/// 信号来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSource {
    Interception,
    DomWatch,
}

/// 确认通过的提交
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptanceEvent {
    pub key: SubmissionKey,
    pub source: SignalSource,
    pub detected_at: DateTime<Utc>,
}

/// 一次监视会话的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// 新的通过提交
    Accepted(AcceptanceEvent),
    /// 判题结果不是通过
    Rejected(String),
    /// 只看到已经处理过的提交
    Duplicate(SubmissionKey),
    /// 预算用完仍没有信号
    TimedOut,
}

/// 观察器参数
#[derive(Debug, Clone)]
pub struct ObserverConfig {
    pub poll_interval: Duration,
    pub max_attempts: u32,
    pub settle_delay: Duration,
    pub tokens: AcceptanceTokens,
    /// 退化键提交后，多久内到达的同题拦截结果视为同一个提交
    pub alias_window: Duration,
}

impl ObserverConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            max_attempts: config.max_watch_attempts(),
            settle_delay: config.settle_delay(),
            tokens: AcceptanceTokens {
                accepted: config.accepted_token.clone(),
                runtime: config.runtime_token.clone(),
            },
            alias_window: config.watch_budget(),
        }
    }
}

/// 以 `Session` 键认领、还没有对上提交 ID 的事件
#[derive(Debug, Clone)]
struct UnboundClaim {
    key: SubmissionKey,
    slug: String,
    claimed_at: Instant,
}

/// 提交观察器
///
/// 职责：
/// - 安装页面钩子、收取页面事件
/// - 在有限的轮询预算内等待判题结果
/// - 持有已处理提交集合
pub struct SubmissionObserver {
    config: ObserverConfig,
    processed: ProcessedSubmissions,
    pending: VecDeque<InterceptedResponse>,
    session_seq: u64,
    unbound: Option<UnboundClaim>,
}

impl SubmissionObserver {
    pub fn new(config: ObserverConfig) -> Self {
        Self {
            config,
            processed: ProcessedSubmissions::default(),
            pending: VecDeque::new(),
            session_seq: 0,
            unbound: None,
        }
    }

    /// 安装拦截钩子，返回是否为新安装
    pub async fn ensure_hooks(&self, host: &dyn ScriptHost) -> AppResult<bool> {
        let installed = host.eval(HOOK_SCRIPT).await?.as_bool().unwrap_or(false);
        if installed {
            debug!("已在页面安装拦截钩子");
        }
        Ok(installed)
    }

    /// 收取页面累计的点击和拦截结果
    pub async fn drain(&mut self, host: &dyn ScriptHost) -> AppResult<PageActivity> {
        let mut activity: PageActivity = eval_as(host, DRAIN_SCRIPT).await?;
        if !activity.results.is_empty() {
            debug!("收到 {} 条判题响应", activity.results.len());
        }
        self.pending.extend(activity.results.drain(..));
        Ok(activity)
    }

    /// 是否有尚未消费的拦截结果
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn processed(&self) -> &ProcessedSubmissions {
        &self.processed
    }

    /// 统一的事件出口：认领成功才产出事件
    ///
    /// 认领在检测当下同步完成，慢的提取不会让第二个信号钻空子
    pub fn dispatch(&mut self, key: SubmissionKey, source: SignalSource) -> Option<AcceptanceEvent> {
        if !self.processed.claim(key.clone()) {
            debug!("{} 已处理过，忽略 ({:?})", key, source);
            return None;
        }
        info!("✅ 检测到通过的提交 {} (来源: {:?})", key, source);
        Some(AcceptanceEvent {
            key,
            source,
            detected_at: Utc::now(),
        })
    }

    /// 运行一次监视会话
    ///
    /// `after_click` 为 true 时先等判题出结果；轮询次数用完即返回，不留任何定时器
    pub async fn watch(&mut self, host: &dyn ScriptHost, after_click: bool) -> AppResult<WatchOutcome> {
        self.session_seq += 1;
        let seq = self.session_seq;
        let mut duplicate: Option<SubmissionKey> = None;

        if after_click && !self.config.settle_delay.is_zero() {
            sleep(self.config.settle_delay).await;
        }

        for attempt in 1..=self.config.max_attempts {
            debug!("监视会话 {} 第 {}/{} 次检查", seq, attempt, self.config.max_attempts);
            let activity = self.drain(host).await?;

            // 拦截结果是结构化的，优先看
            while let Some(response) = self.pending.pop_front() {
                match parse_check_response(&response) {
                    Some(CheckVerdict::Accepted { submission_id }) => {
                        let key = match submission_id {
                            Some(id) => SubmissionKey::Id(id),
                            None => session_key(&activity.href, seq),
                        };
                        if self.bind_alias(&key, &activity.href) {
                            duplicate = Some(key);
                            continue;
                        }
                        match self.dispatch(key.clone(), SignalSource::Interception) {
                            Some(event) => return Ok(WatchOutcome::Accepted(event)),
                            None => duplicate = Some(key),
                        }
                    }
                    Some(CheckVerdict::Rejected { status, .. }) => {
                        info!("⏭️ 判题结果: {}", status);
                        return Ok(WatchOutcome::Rejected(status));
                    }
                    None => {}
                }
            }

            // 由拦截结果触发的会话不看 DOM：页面上留着的旧结果没有提交 ID，会被当成新提交
            if after_click {
                let probe = StatusProbe::capture(host).await?;
                if probe.is_accepted(&self.config.tokens) {
                    let key = match probe.submission_id() {
                        Some(id) => SubmissionKey::Id(id),
                        None => session_key(&probe.href, seq),
                    };
                    match self.dispatch(key.clone(), SignalSource::DomWatch) {
                        Some(event) => {
                            if let SubmissionKey::Session { slug, .. } = &key {
                                self.remember_unbound(key.clone(), slug.clone());
                                self.absorb_late_interception(host).await?;
                            }
                            return Ok(WatchOutcome::Accepted(event));
                        }
                        // 页面上可能还留着上一次的结果，继续等
                        None => duplicate = Some(key),
                    }
                }
            }

            if attempt < self.config.max_attempts {
                sleep(self.config.poll_interval).await;
            }
        }

        Ok(match duplicate {
            Some(key) => WatchOutcome::Duplicate(key),
            None => WatchOutcome::TimedOut,
        })
    }
}

impl SubmissionObserver {
    fn remember_unbound(&mut self, key: SubmissionKey, slug: String) {
        self.unbound = Some(UnboundClaim {
            key,
            slug,
            claimed_at: Instant::now(),
        });
    }

    /// 拦截到的 ID 对上了最近一次以 `Session` 键认领的同题提交时，记为别名，返回 true
    fn bind_alias(&mut self, key: &SubmissionKey, href: &str) -> bool {
        let SubmissionKey::Id(_) = key else {
            return false;
        };
        if self.processed.contains(key) {
            return false;
        }
        let Some(claim) = self.unbound.as_ref() else {
            return false;
        };
        if claim.claimed_at.elapsed() > self.config.alias_window {
            self.unbound = None;
            return false;
        }
        if problem_slug(href) != Some(claim.slug.as_str()) {
            return false;
        }

        info!("🔗 {} 与 {} 是同一个提交，不再重复处理", key, claim.key);
        self.processed.claim(key.clone());
        self.unbound = None;
        true
    }

    /// DOM 先于拦截命中时再收一次，把随后到达的判题响应并入同一个事件
    async fn absorb_late_interception(&mut self, host: &dyn ScriptHost) -> AppResult<()> {
        let activity = self.drain(host).await?;
        let mut remaining = VecDeque::with_capacity(self.pending.len());
        while let Some(response) = self.pending.pop_front() {
            let bound = match parse_check_response(&response) {
                Some(CheckVerdict::Accepted {
                    submission_id: Some(id),
                }) => self.bind_alias(&SubmissionKey::Id(id), &activity.href),
                _ => false,
            };
            if !bound {
                remaining.push_back(response);
            }
        }
        self.pending = remaining;
        Ok(())
    }
}

fn session_key(href: &str, seq: u64) -> SubmissionKey {
    SubmissionKey::Session {
        slug: problem_slug(href).unwrap_or("unknown").to_string(),
        seq,
    }
}
