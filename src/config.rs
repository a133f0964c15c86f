use std::time::Duration;

/// 程序配置
///
/// 同步目标（仓库、令牌）不在这里，由 [`crate::services::settings`] 提供
#[derive(Clone, Debug)]
pub struct Config {
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    /// 找不到题目页面时新开标签页的地址
    pub target_url: String,
    /// 题目页面 URL 需要包含的片段
    pub page_match: String,
    /// 同步设置文件路径
    pub settings_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 托管 API ---
    pub api_base_url: String,
    pub user_agent: String,
    // --- 提交检测 ---
    /// 判定通过的状态文字（随站点语言变化）
    pub accepted_token: String,
    /// 用于佐证的运行时间标签
    pub runtime_token: String,
    /// 监视轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 单次监视的时间预算（秒）
    pub watch_budget_secs: u64,
    /// 点击提交后等待判题的时间（毫秒）
    pub settle_delay_ms: u64,
    /// 空闲时检查页面的间隔（毫秒）
    pub idle_poll_ms: u64,
    // --- 提取 / 通知 ---
    pub min_code_len: usize,
    pub notify_dismiss_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 9222,
            target_url: "https://leetcode.com/problemset/".to_string(),
            page_match: "leetcode.com/problems/".to_string(),
            settings_file: "leet_sync.toml".to_string(),
            verbose_logging: false,
            api_base_url: "https://api.github.com".to_string(),
            user_agent: "leet-sync".to_string(),
            accepted_token: "Accepted".to_string(),
            runtime_token: "Runtime".to_string(),
            poll_interval_ms: 1500,
            watch_budget_secs: 30,
            settle_delay_ms: 3000,
            idle_poll_ms: 2000,
            min_code_len: 10,
            notify_dismiss_ms: 5000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.browser_debug_port),
            target_url: std::env::var("TARGET_URL").unwrap_or(default.target_url),
            page_match: std::env::var("PAGE_MATCH").unwrap_or(default.page_match),
            settings_file: std::env::var("SETTINGS_FILE").unwrap_or(default.settings_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            api_base_url: std::env::var("API_BASE_URL").unwrap_or(default.api_base_url),
            user_agent: std::env::var("SYNC_USER_AGENT").unwrap_or(default.user_agent),
            accepted_token: std::env::var("ACCEPTED_TOKEN").unwrap_or(default.accepted_token),
            runtime_token: std::env::var("RUNTIME_TOKEN").unwrap_or(default.runtime_token),
            poll_interval_ms: std::env::var("POLL_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.poll_interval_ms),
            watch_budget_secs: std::env::var("WATCH_BUDGET_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.watch_budget_secs),
            settle_delay_ms: std::env::var("SETTLE_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.settle_delay_ms),
            idle_poll_ms: std::env::var("IDLE_POLL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.idle_poll_ms),
            min_code_len: std::env::var("MIN_CODE_LEN").ok().and_then(|v| v.parse().ok()).unwrap_or(default.min_code_len),
            notify_dismiss_ms: std::env::var("NOTIFY_DISMISS_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.notify_dismiss_ms),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn watch_budget(&self) -> Duration {
        Duration::from_secs(self.watch_budget_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms.max(1))
    }

    pub fn notify_dismiss(&self) -> Duration {
        Duration::from_millis(self.notify_dismiss_ms)
    }

    /// 单次监视最多轮询的次数
    pub fn max_watch_attempts(&self) -> u32 {
        let attempts = self.watch_budget().as_millis() / self.poll_interval().as_millis();
        attempts.clamp(1, u32::MAX as u128) as u32
    }
}
