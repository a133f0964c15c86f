use thiserror::Error;

/// 同步流水线错误
///
/// 对应一次提交处理中可能出现的四类失败，均不会影响宿主页面
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// 页面上找不到可用的代码或标题
    #[error("提取提交内容失败: {reason}")]
    ExtractionFailed { reason: String },

    /// 缺少必填的同步配置
    #[error("同步配置缺失: {field}")]
    ConfigMissing { field: &'static str },

    /// 查询远端文件是否存在时出错（调用方按"新建"处理）
    #[error("查询远端文件失败 ({path}): {message}")]
    LookupFailed {
        path: String,
        status: Option<u16>,
        message: String,
    },

    /// 写入远端文件失败
    #[error("写入远端文件失败{}: {message}", status_suffix(.status))]
    WriteFailed {
        status: Option<u16>,
        message: String,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {})", code),
        None => String::new(),
    }
}

impl SyncError {
    /// 根据状态码与托管方返回的信息构造写入错误
    ///
    /// 401 总是带上授权提示，其余状态优先使用托管方返回的 message
    pub fn write_failed(status: u16, host_message: Option<String>) -> Self {
        let host_message = host_message.filter(|m| !m.trim().is_empty());
        let message = match (status, host_message) {
            (401, Some(m)) => format!("authorization failed, 请检查访问令牌: {}", m),
            (401, None) => "authorization failed, 请检查访问令牌".to_string(),
            (_, Some(m)) => m,
            (code, None) => generic_status_message(code),
        };
        SyncError::WriteFailed {
            status: Some(status),
            message,
        }
    }

    /// 网络层错误（没有拿到 HTTP 状态码）
    pub fn write_transport(source: impl std::fmt::Display) -> Self {
        SyncError::WriteFailed {
            status: None,
            message: source.to_string(),
        }
    }
}

fn generic_status_message(status: u16) -> String {
    match status {
        403 => "forbidden: 令牌没有该仓库的写权限".to_string(),
        404 => "仓库或分支不存在".to_string(),
        409 => "conflict: 远端版本已变化".to_string(),
        422 => "请求参数无效".to_string(),
        500..=599 => format!("托管服务内部错误 (HTTP {})", status),
        _ => format!("HTTP 状态 {}", status),
    }
}

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),

    /// 同步流水线错误
    #[error("同步错误: {0}")]
    Sync(#[from] SyncError),

    /// 配置文件错误
    #[error("配置错误 ({path}): {message}")]
    Settings { path: String, message: String },

    /// 文件读写错误
    #[error("文件错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 解析错误
    #[error("JSON解析失败: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP 客户端错误
    #[error("HTTP错误: {0}")]
    Http(#[from] reqwest::Error),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: chromiumoxide::error::CdpError,
    },

    /// 执行脚本失败
    #[error("执行脚本失败: {source}")]
    ScriptExecutionFailed {
        #[source]
        source: chromiumoxide::error::CdpError,
    },

    /// 脚本返回值无法解析
    #[error("脚本返回值无法解析: {0}")]
    BadScriptResult(String),
}

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ScriptExecutionFailed { source: err })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Settings {
            path: String::new(),
            message: err.to_string(),
        }
    }
}

impl AppError {
    /// 创建浏览器连接错误
    pub fn browser_connection_failed(port: u16, source: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed { port, source })
    }

    /// 创建脚本结果解析错误
    pub fn bad_script_result(detail: impl Into<String>) -> Self {
        AppError::Browser(BrowserError::BadScriptResult(detail.into()))
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
