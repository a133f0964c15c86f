//! # Leet Sync
//!
//! 监视刷题网站上通过的提交，把代码和题目信息同步到代码托管仓库
//!
//! ## 架构设计
//!
//! 本系统沿用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `ScriptHost` / `JsExecutor` - 唯一的 page owner，提供 eval() 能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个提交
//! - `SubmissionObserver` - 网络拦截 + DOM 监视，检测通过的提交
//! - `SolutionExtractor` - 从页面快照提取代码和题目信息
//! - `formatter` - 计算文件路径、渲染正文
//! - `GitHubClient` - 新建或更新远端文件
//! - `Notifier` - 页面提示
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次提交"的完整处理流程
//! - `SubmissionFlow` - 提取 → 格式化 → 同步 → 通知
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 应用生命周期，管理浏览器资源
//! - `orchestrator/watch_loop` - 空闲轮询与监视会话
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::connect_to_browser_and_page;
pub use config::Config;
pub use error::{AppError, AppResult, SyncError};
pub use infrastructure::{JsExecutor, ScriptHost};
pub use models::{Difficulty, SubmissionRecord};
pub use orchestrator::App;
pub use workflow::{FlowOutcome, SubmissionFlow};
