//! 主动拦截：包装页面的 fetch / XHR，记录判题结果接口的响应

use serde::Deserialize;
use serde_json::Value as JsonValue;

/// 安装拦截钩子的脚本，同一个文档上重复执行不会重复安装
pub const HOOK_SCRIPT: &str = r##"/* leet-sync:hook */
(() => {
    if (window.__leetSync && window.__leetSync.installed) return false;
    const state = window.__leetSync = { installed: true, submits: 0, results: [] };
    const CHECK = /\/submissions\/detail\/\d+\/check\/?/;

    const record = (url, body) => {
        try {
            const data = typeof body === 'string' ? JSON.parse(body) : body;
            if (data && data.state === 'SUCCESS') state.results.push({ url: String(url), body: data });
        } catch (e) {}
    };

    const originalFetch = window.fetch;
    if (typeof originalFetch === 'function') {
        window.fetch = async function (...args) {
            const response = await originalFetch.apply(this, args);
            try {
                const url = typeof args[0] === 'string' ? args[0] : ((args[0] && args[0].url) || '');
                if (CHECK.test(url)) {
                    response.clone().json().then((d) => record(url, d)).catch(() => {});
                }
            } catch (e) {}
            return response;
        };
    }

    const open = XMLHttpRequest.prototype.open;
    const send = XMLHttpRequest.prototype.send;
    XMLHttpRequest.prototype.open = function (method, url, ...rest) {
        this.__leetSyncUrl = String(url);
        return open.call(this, method, url, ...rest);
    };
    XMLHttpRequest.prototype.send = function (...args) {
        if (this.__leetSyncUrl && CHECK.test(this.__leetSyncUrl)) {
            this.addEventListener('load', () => record(this.__leetSyncUrl, this.responseText));
        }
        return send.apply(this, args);
    };

    const classOf = (el) => {
        try {
            if (typeof el.className === 'string') return el.className.toLowerCase();
            if (el.className && el.className.baseVal !== undefined) return String(el.className.baseVal).toLowerCase();
        } catch (e) {}
        return '';
    };
    const isSubmit = (el) => {
        if (!el || el.nodeType !== 1) return false;
        const locator = (el.getAttribute && el.getAttribute('data-e2e-locator')) || '';
        if (locator === 'console-submit-button') return true;
        const text = (el.textContent || '').trim().toLowerCase();
        const id = (el.id || '').toLowerCase();
        return classOf(el).includes('submit') || id.includes('submit') || el.type === 'submit'
            || (el.tagName === 'BUTTON' && (text === 'submit' || text === '提交'));
    };
    document.addEventListener('click', (event) => {
        let el = event.target;
        for (let depth = 0; el && depth < 4; depth += 1, el = el.parentElement) {
            if (isSubmit(el)) {
                state.submits += 1;
                return;
            }
        }
    }, true);

    return true;
})()
"##;

/// 取出页面累计的事件并清空
pub const DRAIN_SCRIPT: &str = r#"/* leet-sync:drain */
(() => {
    const state = window.__leetSync;
    if (!state) return { installed: false, submits: 0, results: [], href: window.location.href };
    const out = { installed: true, submits: state.submits, results: state.results.splice(0), href: window.location.href };
    state.submits = 0;
    return out;
})()
"#;

/// 拦截到的一条判题响应
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InterceptedResponse {
    pub url: String,
    #[serde(default)]
    pub body: JsonValue,
}

/// 一次 drain 的结果
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageActivity {
    pub installed: bool,
    pub submits: u64,
    pub results: Vec<InterceptedResponse>,
    pub href: String,
}

/// 判题结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckVerdict {
    Accepted { submission_id: Option<String> },
    Rejected { submission_id: Option<String>, status: String },
}

/// 通过的状态码
const ACCEPTED_STATUS_CODE: u64 = 10;

/// 取 `marker` 后面紧跟的一串数字
pub fn digits_after(haystack: &str, marker: &str) -> Option<String> {
    let rest = haystack.split(marker).nth(1)?;
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// 解析判题响应，还没出最终结果返回 None
pub fn parse_check_response(response: &InterceptedResponse) -> Option<CheckVerdict> {
    let body = &response.body;
    if body.get("state").and_then(JsonValue::as_str) != Some("SUCCESS") {
        return None;
    }

    let submission_id = digits_after(&response.url, "/submissions/detail/").or_else(|| {
        match body.get("submission_id") {
            Some(JsonValue::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(JsonValue::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    });

    let status_msg = body.get("status_msg").and_then(JsonValue::as_str);
    let status_code = body.get("status_code").and_then(JsonValue::as_u64);

    if status_msg == Some("Accepted") || status_code == Some(ACCEPTED_STATUS_CODE) {
        Some(CheckVerdict::Accepted { submission_id })
    } else {
        let status = status_msg
            .map(str::to_string)
            .or_else(|| status_code.map(|c| format!("状态码 {}", c)))
            .unwrap_or_else(|| "未知状态".to_string());
        Some(CheckVerdict::Rejected {
            submission_id,
            status,
        })
    }
}
