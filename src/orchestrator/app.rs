//! 应用 - 编排层
//!
//! 唯一持有 Browser 的模块

use anyhow::{Context, Result};
use chromiumoxide::Browser;
use std::sync::Arc;
use tracing::{info, warn};

use crate::browser;
use crate::config::Config;
use crate::infrastructure::{JsExecutor, ScriptHost};
use crate::orchestrator::watch_loop::WatchLoop;
use crate::services::{
    FileSettings, GitHubClient, Notifier, ObserverConfig, PageNotifier, SettingsSource,
    SolutionExtractor, SubmissionObserver, SyncTarget,
};
use crate::utils::logging::{log_startup, print_final_stats};
use crate::workflow::SubmissionFlow;

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    executor: Arc<JsExecutor>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        // 连接浏览器
        let (browser, page) = browser::connect_to_browser_and_page(
            config.browser_debug_port,
            &config.target_url,
            &config.page_match,
        )
        .await
        .context("无法连接浏览器，请用 --remote-debugging-port 启动浏览器")?;

        Ok(Self {
            config,
            _browser: browser,
            executor: Arc::new(JsExecutor::new(page)),
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let settings: Arc<dyn SettingsSource> = Arc::new(FileSettings::new(&self.config.settings_file));
        let host: Arc<dyn ScriptHost> = self.executor.clone();
        let notifier: Arc<dyn Notifier> =
            Arc::new(PageNotifier::new(host.clone(), self.config.notify_dismiss()));

        let client = GitHubClient::new(&self.config).context("无法创建 HTTP 客户端")?;
        self.verify_target(&client, settings.as_ref()).await;

        let flow = SubmissionFlow::new(
            SolutionExtractor::new(self.config.min_code_len),
            client,
            settings,
            notifier.clone(),
        );
        let observer = SubmissionObserver::new(ObserverConfig::from_config(&self.config));
        let mut watch_loop = WatchLoop::new(
            observer,
            flow,
            notifier,
            self.config.page_match.clone(),
            self.config.idle_poll(),
        );

        info!("👀 正在监视提交，按 Ctrl-C 退出");
        watch_loop
            .run_until(host.as_ref(), async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("无法监听退出信号: {}", e);
                    std::future::pending::<()>().await;
                }
            })
            .await;

        print_final_stats(watch_loop.stats());
        Ok(())
    }

    /// 启动时检查一次令牌和仓库，只记日志
    async fn verify_target(&self, client: &GitHubClient, settings: &dyn SettingsSource) {
        match SyncTarget::try_from(settings.get_settings().await) {
            Ok(target) => match client.verify_target(&target).await {
                Ok(()) => info!("✓ 同步目标可用: {}/{} ({})", target.owner_login, target.repo_name, target.branch),
                Err(e) => warn!("⚠️ 同步目标不可用: {}", e),
            },
            Err(e) => warn!("⚠️ {}，同步前请补全 {}", e, self.config.settings_file),
        }
    }
}
