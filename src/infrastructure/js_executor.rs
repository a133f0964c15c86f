//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"的能力

use async_trait::async_trait;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::{AppError, AppResult};

/// 脚本执行能力
///
/// 观察器、提取器、通知器都只依赖这个 trait，测试里可以换成假的页面
#[async_trait]
pub trait ScriptHost: Send + Sync {
    /// 执行 JS 代码并返回 JSON 结果
    async fn eval(&self, js_code: &str) -> AppResult<JsonValue>;
}

/// 执行 JS 代码并反序列化为指定类型
pub async fn eval_as<T: DeserializeOwned>(host: &dyn ScriptHost, js_code: &str) -> AppResult<T> {
    let json_value = host.eval(js_code).await?;
    serde_json::from_value(json_value).map_err(|e| AppError::bad_script_result(e.to_string()))
}

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval() 能力
/// - 不认识提交记录 / 同步目标
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }
}

#[async_trait]
impl ScriptHost for JsExecutor {
    async fn eval(&self, js_code: &str) -> AppResult<JsonValue> {
        let result = self.page.evaluate(js_code.to_string()).await?;
        // 脚本没有返回值时 into_value 会失败，统一按 null 处理
        Ok(result.into_value().unwrap_or(JsonValue::Null))
    }
}
