//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责资源和调度，是整个系统的"指挥中心"。
//!
//! ### `app` - 应用生命周期
//! - 连接浏览器、创建 JsExecutor
//! - 启动时检查同步目标
//! - 运行监视循环直到 Ctrl-C，输出统计
//!
//! ### `watch_loop` - 监视循环
//! - 空闲时轮询页面（安装钩子、收取点击和拦截结果）
//! - 有提交时启动一次监视会话
//! - 把通过的提交交给 workflow::SubmissionFlow
//!
//! ## 层次关系
//!
//! ```text
//! app (持有 Browser / JsExecutor)
//!     ↓
//! watch_loop (一次处理一个提交)
//!     ↓
//! workflow::SubmissionFlow (处理单个提交)
//!     ↓
//! services (能力层：observer / extractor / formatter / sync / notifier)
//!     ↓
//! infrastructure (基础设施：ScriptHost)
//! ```

pub mod app;
pub mod watch_loop;

pub use app::App;
pub use watch_loop::{SyncStats, WatchLoop};
