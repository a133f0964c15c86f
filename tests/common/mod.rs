#![allow(dead_code)]

use async_trait::async_trait;
use leet_sync::error::AppResult;
use leet_sync::services::{Notifier, Severity};
use leet_sync::ScriptHost;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

pub const PROBLEM_URL: &str = "https://leetcode.com/problems/two-sum/description/";

/// 假页面：按脚本开头的标记返回预设结果
pub struct FakePage {
    pub href: Mutex<String>,
    pub snapshot: Mutex<Value>,
    pub status: Mutex<Value>,
    pub drains: Mutex<VecDeque<Value>>,
    pub toasts: Mutex<Vec<String>>,
    pub hook_calls: Mutex<usize>,
}

impl FakePage {
    pub fn new() -> Self {
        Self {
            href: Mutex::new(PROBLEM_URL.to_string()),
            snapshot: Mutex::new(two_sum_snapshot()),
            status: Mutex::new(json!({"href": PROBLEM_URL, "statusTexts": [], "bodyText": ""})),
            drains: Mutex::new(VecDeque::new()),
            toasts: Mutex::new(Vec::new()),
            hook_calls: Mutex::new(0),
        }
    }

    pub fn with_snapshot(self, snapshot: Value) -> Self {
        *self.snapshot.lock().unwrap() = snapshot;
        self
    }

    pub fn push_drain(&self, drain: Value) {
        self.drains.lock().unwrap().push_back(drain);
    }

    /// 模拟一次点击提交并收到判题响应
    pub fn push_accepted(&self, submission_id: &str, submits: u64) {
        self.push_drain(json!({
            "installed": true,
            "submits": submits,
            "href": PROBLEM_URL,
            "results": [{
                "url": format!("https://leetcode.com/submissions/detail/{}/check/", submission_id),
                "body": {"state": "SUCCESS", "status_msg": "Accepted", "status_code": 10}
            }]
        }));
    }

    pub fn set_status(&self, status: Value) {
        *self.status.lock().unwrap() = status;
    }

    fn idle_drain(&self) -> Value {
        json!({
            "installed": true,
            "submits": 0,
            "results": [],
            "href": *self.href.lock().unwrap(),
        })
    }
}

#[async_trait]
impl ScriptHost for FakePage {
    async fn eval(&self, js_code: &str) -> AppResult<Value> {
        let marker = js_code.lines().next().unwrap_or_default();
        let value = if marker.contains("leet-sync:hook") {
            let mut calls = self.hook_calls.lock().unwrap();
            *calls += 1;
            json!(*calls == 1)
        } else if marker.contains("leet-sync:drain") {
            let next = self.drains.lock().unwrap().pop_front();
            next.unwrap_or_else(|| self.idle_drain())
        } else if marker.contains("leet-sync:status") {
            self.status.lock().unwrap().clone()
        } else if marker.contains("leet-sync:snapshot") {
            self.snapshot.lock().unwrap().clone()
        } else if marker.contains("leet-sync:toast") {
            self.toasts.lock().unwrap().push(js_code.to_string());
            json!(true)
        } else {
            Value::Null
        };
        Ok(value)
    }
}

/// 通过的 Two Sum 页面
pub fn two_sum_snapshot() -> Value {
    json!({
        "href": "https://leetcode.com/problems/two-sum/submissions/1188/",
        "documentTitle": "Two Sum - LeetCode",
        "headings": ["1. Two Sum"],
        "editorModels": [{"value": "def f(): pass", "languageId": "python"}],
        "viewLines": [],
        "codeBlocks": [],
        "languageSelector": "Python3",
        "difficultyLabels": ["Easy"],
        "tagTexts": ["Array", "Hash Table"],
        "bodyText": "Accepted Runtime 0 ms"
    })
}

/// 记录所有通知
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<(String, Severity)>>,
}

impl RecordingNotifier {
    pub fn severities(&self) -> Vec<Severity> {
        self.messages.lock().unwrap().iter().map(|(_, s)| *s).collect()
    }

    pub fn last(&self) -> Option<(String, Severity)> {
        self.messages.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str, severity: Severity) {
        self.messages
            .lock()
            .unwrap()
            .push((message.to_string(), severity));
    }
}
