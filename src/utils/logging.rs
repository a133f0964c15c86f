/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::orchestrator::SyncStats;

/// 初始化日志
///
/// `RUST_LOG` 优先，否则按 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "leet_sync=debug" } else { "leet_sync=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // 测试里可能被多次调用，重复初始化直接忽略
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 提交同步模式");
    info!("🌐 浏览器调试端口: {}", config.browser_debug_port);
    info!("📄 题目页面匹配: {}", config.page_match);
    info!("⚙️ 同步设置文件: {}", config.settings_file);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(stats: &SyncStats) {
    info!("\n{}", "=".repeat(60));
    info!("📊 同步统计");
    info!(
        "结束时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已同步: {}", stats.synced);
    info!("❌ 失败: {}", stats.failed);
    info!("⏭️ 跳过: {}", stats.skipped);
    if let Some(last) = stats.last_sync {
        info!(
            "🕒 最近一次同步: {}",
            last.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S")
        );
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
