//! 仓库同步客户端
//!
//! 封装"按路径新建或更新一个文件"的两步调用：先查 sha，再 PUT

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppResult, SyncError};
use crate::services::formatter::CommitMessage;
use crate::services::settings::SyncTarget;

/// 远端文件
///
/// `revision_token` 存在表示文件已存在，写入时走更新
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub path: String,
    pub content: String,
    pub revision_token: Option<String>,
}

/// 写入结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[derive(Deserialize)]
struct ContentMeta {
    sha: String,
}

#[derive(Deserialize)]
struct HostError {
    message: Option<String>,
}

#[derive(Serialize)]
struct WriteRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

/// 仓库 API 客户端
pub struct GitHubClient {
    http: Client,
    api_base_url: String,
}

impl GitHubClient {
    /// 创建新的同步客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = Client::builder().user_agent(config.user_agent.clone()).build()?;
        Ok(Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn contents_url(&self, target: &SyncTarget, path: &str) -> String {
        let encoded = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base_url, target.owner_login, target.repo_name, encoded
        )
    }

    fn request(&self, method: reqwest::Method, url: &str, target: &SyncTarget) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&target.auth_token)
            .header("Accept", "application/vnd.github+json")
    }

    /// 查询路径上现有文件的 sha
    ///
    /// 404 返回 Ok(None)，其它失败返回 LookupFailed
    pub async fn lookup(&self, target: &SyncTarget, path: &str) -> Result<Option<String>, SyncError> {
        let url = self.contents_url(target, path);
        debug!("查询远端文件: {}", url);

        let lookup_failed = |status: Option<u16>, message: String| SyncError::LookupFailed {
            path: path.to_string(),
            status,
            message,
        };

        let response = self
            .request(reqwest::Method::GET, &url, target)
            .query(&[("ref", target.branch.as_str())])
            .send()
            .await
            .map_err(|e| lookup_failed(None, e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("远端文件不存在: {}", path);
            return Ok(None);
        }
        if !status.is_success() {
            let message = host_message(response).await.unwrap_or_else(|| status.to_string());
            return Err(lookup_failed(Some(status.as_u16()), message));
        }

        let meta: ContentMeta = response
            .json()
            .await
            .map_err(|e| lookup_failed(Some(status.as_u16()), e.to_string()))?;
        debug!("远端文件已存在: {} (sha: {})", path, meta.sha);
        Ok(Some(meta.sha))
    }

    /// 写入文件，`revision_token` 为 None 时新建
    pub async fn write(
        &self,
        target: &SyncTarget,
        file: &RemoteFile,
        commit_message: &CommitMessage,
    ) -> Result<UpsertOutcome, SyncError> {
        let url = self.contents_url(target, &file.path);
        let message = match file.revision_token {
            Some(_) => commit_message.update.as_str(),
            None => commit_message.create.as_str(),
        };
        let payload = WriteRequest {
            message,
            content: STANDARD.encode(file.content.as_bytes()),
            branch: &target.branch,
            sha: file.revision_token.as_deref(),
        };

        let response = self
            .request(reqwest::Method::PUT, &url, target)
            .json(&payload)
            .send()
            .await
            .map_err(SyncError::write_transport)?;

        let status = response.status();
        if !status.is_success() {
            let host = host_message(response).await;
            warn!("⚠️ 写入失败 HTTP {}: {:?}", status.as_u16(), host);
            return Err(SyncError::write_failed(status.as_u16(), host));
        }

        Ok(if status == StatusCode::CREATED {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        })
    }

    /// 新建或更新文件
    ///
    /// 查询失败不会中断同步，按新建处理；写入只发一次，不重试
    pub async fn upsert(
        &self,
        target: &SyncTarget,
        path: &str,
        body: &str,
        commit_message: &CommitMessage,
    ) -> Result<UpsertOutcome, SyncError> {
        let revision_token = match self.lookup(target, path).await {
            Ok(token) => token,
            Err(e) => {
                warn!("⚠️ {}，按新建处理", e);
                None
            }
        };

        let file = RemoteFile {
            path: path.to_string(),
            content: body.to_string(),
            revision_token,
        };
        let outcome = self.write(target, &file, commit_message).await?;
        info!("✓ 已同步 {} ({:?})", path, outcome);
        Ok(outcome)
    }

    /// 检查令牌和仓库是否可用
    pub async fn verify_target(&self, target: &SyncTarget) -> Result<(), SyncError> {
        let url = format!(
            "{}/repos/{}/{}",
            self.api_base_url, target.owner_login, target.repo_name
        );
        let response = self
            .request(reqwest::Method::GET, &url, target)
            .send()
            .await
            .map_err(|e| SyncError::LookupFailed {
                path: url.clone(),
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let message = match status {
            StatusCode::UNAUTHORIZED => "访问令牌无效".to_string(),
            StatusCode::NOT_FOUND => "仓库不存在或没有访问权限".to_string(),
            other => format!("托管 API 错误: {}", other.as_u16()),
        };
        Err(SyncError::LookupFailed {
            path: format!("{}/{}", target.owner_login, target.repo_name),
            status: Some(status.as_u16()),
            message,
        })
    }
}

/// 读出错误响应里的 `message`
async fn host_message(response: reqwest::Response) -> Option<String> {
    response
        .json::<HostError>()
        .await
        .ok()
        .and_then(|e| e.message)
}
