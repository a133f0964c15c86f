//! 同步设置
//!
//! 设置来源是外部协作方，这里只约定"读"：TOML 文件 + 环境变量覆盖

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::error::SyncError;

/// 默认分支
pub const DEFAULT_BRANCH: &str = "main";

/// 原始设置，字段都可能缺失
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SyncSettings {
    #[serde(default, alias = "repo_owner")]
    pub owner_login: Option<String>,
    #[serde(default)]
    pub repo_name: Option<String>,
    #[serde(default, alias = "github_token")]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
}

/// 同步目标，三个必填项齐全才能构造
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    pub owner_login: String,
    pub repo_name: String,
    pub auth_token: String,
    pub branch: String,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, SyncError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(SyncError::ConfigMissing { field })
}

impl TryFrom<SyncSettings> for SyncTarget {
    type Error = SyncError;

    fn try_from(settings: SyncSettings) -> Result<Self, Self::Error> {
        Ok(Self {
            owner_login: required(settings.owner_login, "repo_owner")?,
            repo_name: required(settings.repo_name, "repo_name")?,
            auth_token: required(settings.auth_token, "github_token")?,
            branch: settings
                .branch
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty())
                .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
        })
    }
}

/// 设置来源
#[async_trait]
pub trait SettingsSource: Send + Sync {
    async fn get_settings(&self) -> SyncSettings;
}

/// 从 TOML 文件读取设置，环境变量优先
pub struct FileSettings {
    path: PathBuf,
    use_env: bool,
}

impl FileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            use_env: true,
        }
    }

    /// 只读文件，不看环境变量
    pub fn without_env(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            use_env: false,
        }
    }

    async fn read_file(&self) -> SyncSettings {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("设置文件不存在: {}", self.path.display());
                return SyncSettings::default();
            }
            Err(e) => {
                warn!("⚠️ 无法读取设置文件 {}: {}", self.path.display(), e);
                return SyncSettings::default();
            }
        };

        toml::from_str(&content).unwrap_or_else(|e| {
            warn!("⚠️ 设置文件格式错误 {}: {}", self.path.display(), e);
            SyncSettings::default()
        })
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[async_trait]
impl SettingsSource for FileSettings {
    async fn get_settings(&self) -> SyncSettings {
        let mut settings = self.read_file().await;
        if self.use_env {
            if let Some(v) = env_value("LEETSYNC_GITHUB_TOKEN") {
                settings.auth_token = Some(v);
            }
            if let Some(v) = env_value("LEETSYNC_REPO_OWNER") {
                settings.owner_login = Some(v);
            }
            if let Some(v) = env_value("LEETSYNC_REPO_NAME") {
                settings.repo_name = Some(v);
            }
            if let Some(v) = env_value("LEETSYNC_BRANCH") {
                settings.branch = Some(v);
            }
        }
        settings
    }
}

/// 固定设置（测试或嵌入使用）
pub struct StaticSettings(pub SyncSettings);

#[async_trait]
impl SettingsSource for StaticSettings {
    async fn get_settings(&self) -> SyncSettings {
        self.0.clone()
    }
}
