mod common;

use chrono::{TimeZone, Utc};
use common::{FakePage, RecordingNotifier, PROBLEM_URL};
use httpmock::prelude::*;
use leet_sync::browser::connect_to_browser_and_page;
use leet_sync::config::Config;
use leet_sync::orchestrator::WatchLoop;
use leet_sync::services::observer::dedup::SubmissionKey;
use leet_sync::services::observer::dom_watch::AcceptanceTokens;
use leet_sync::services::{
    AcceptanceEvent, CommitMessage, GitHubClient, ObserverConfig, Severity, SignalSource,
    SolutionExtractor, StaticSettings, SubmissionObserver, SyncSettings, SyncTarget,
    UpsertOutcome, WatchOutcome,
};
use leet_sync::{FlowOutcome, SubmissionFlow, SyncError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const CONTENTS_PATH: &str = "/repos/octo/solutions/contents/array/two_sum.py";

fn config_for(server: &MockServer) -> Config {
    Config {
        api_base_url: server.base_url(),
        ..Config::default()
    }
}

fn target() -> SyncTarget {
    SyncTarget {
        owner_login: "octo".to_string(),
        repo_name: "solutions".to_string(),
        auth_token: "t0ken".to_string(),
        branch: "main".to_string(),
    }
}

fn complete_settings() -> SyncSettings {
    SyncSettings {
        owner_login: Some("octo".to_string()),
        repo_name: Some("solutions".to_string()),
        auth_token: Some("t0ken".to_string()),
        branch: None,
    }
}

fn observer_config() -> ObserverConfig {
    ObserverConfig {
        poll_interval: Duration::from_millis(1),
        max_attempts: 3,
        settle_delay: Duration::ZERO,
        tokens: AcceptanceTokens::default(),
        alias_window: Duration::from_secs(30),
    }
}

fn flow(server: &MockServer, settings: SyncSettings, notifier: Arc<RecordingNotifier>) -> SubmissionFlow {
    let client = GitHubClient::new(&config_for(server)).expect("创建客户端失败");
    SubmissionFlow::new(
        SolutionExtractor::new(10),
        client,
        Arc::new(StaticSettings(settings)),
        notifier,
    )
}

fn event(id: &str) -> AcceptanceEvent {
    AcceptanceEvent {
        key: SubmissionKey::Id(id.to_string()),
        source: SignalSource::Interception,
        detected_at: Utc::now(),
    }
}

#[tokio::test]
async fn upsert_creates_without_sha_when_lookup_404() {
    let server = MockServer::start_async().await;
    let lookup = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(CONTENTS_PATH)
                .query_param("ref", "main")
                .header("authorization", "Bearer t0ken");
            then.status(404).json_body(json!({"message": "Not Found"}));
        })
        .await;
    let write = server
        .mock_async(|when, then| {
            when.method(PUT).path(CONTENTS_PATH).json_body(json!({
                "message": "Add solution: Two Sum",
                "content": "aGVsbG8=",
                "branch": "main"
            }));
            then.status(201).json_body(json!({"content": {"path": "array/two_sum.py"}}));
        })
        .await;

    let client = GitHubClient::new(&config_for(&server)).unwrap();
    let outcome = client
        .upsert(
            &target(),
            "array/two_sum.py",
            "hello",
            &CommitMessage::for_solution("Two Sum"),
        )
        .await
        .unwrap();

    assert_eq!(outcome, UpsertOutcome::Created);
    lookup.assert_async().await;
    write.assert_async().await;
}

#[tokio::test]
async fn upsert_updates_with_existing_sha() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(CONTENTS_PATH);
            then.status(200).json_body(json!({"sha": "abc", "path": "array/two_sum.py"}));
        })
        .await;
    let write = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(CONTENTS_PATH)
                .json_body_partial(r#"{"sha": "abc", "message": "Update solution: Two Sum"}"#);
            then.status(200).json_body(json!({"content": {}}));
        })
        .await;

    let client = GitHubClient::new(&config_for(&server)).unwrap();
    let outcome = client
        .upsert(
            &target(),
            "array/two_sum.py",
            "hello",
            &CommitMessage::for_solution("Two Sum"),
        )
        .await
        .unwrap();

    assert_eq!(outcome, UpsertOutcome::Updated);
    write.assert_hits_async(1).await;
}

#[tokio::test]
async fn lookup_failure_falls_back_to_create() {
    let server = MockServer::start_async().await;
    let lookup = server
        .mock_async(|when, then| {
            when.method(GET).path(CONTENTS_PATH);
            then.status(500).json_body(json!({"message": "Server Error"}));
        })
        .await;
    let write = server
        .mock_async(|when, then| {
            when.method(PUT).path(CONTENTS_PATH).json_body(json!({
                "message": "Add solution: Two Sum",
                "content": "aGVsbG8=",
                "branch": "main"
            }));
            then.status(201);
        })
        .await;

    let client = GitHubClient::new(&config_for(&server)).unwrap();
    let result = client
        .upsert(
            &target(),
            "array/two_sum.py",
            "hello",
            &CommitMessage::for_solution("Two Sum"),
        )
        .await;

    assert_eq!(result, Ok(UpsertOutcome::Created));
    lookup.assert_async().await;
    write.assert_async().await;
}

#[tokio::test]
async fn flow_syncs_accepted_two_sum() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(CONTENTS_PATH);
            then.status(404);
        })
        .await;
    let write = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(CONTENTS_PATH)
                .json_body_partial(r#"{"message": "Add solution: Two Sum", "branch": "main"}"#);
            then.status(201);
        })
        .await;

    let notifier = Arc::new(RecordingNotifier::default());
    let flow = flow(&server, complete_settings(), notifier.clone());
    let page = FakePage::new();
    let captured_at = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();

    let outcome = flow.run(&page, &event("1188"), captured_at).await;

    assert_eq!(
        outcome,
        FlowOutcome::Synced {
            path: "array/two_sum.py".to_string(),
            outcome: UpsertOutcome::Created,
        }
    );
    write.assert_async().await;
    assert_eq!(notifier.severities(), vec![Severity::Success]);
}

#[tokio::test]
async fn unauthorized_write_reports_authorization() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(CONTENTS_PATH);
            then.status(404);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path(CONTENTS_PATH);
            then.status(401).json_body(json!({"message": "Bad credentials"}));
        })
        .await;

    let notifier = Arc::new(RecordingNotifier::default());
    let flow = flow(&server, complete_settings(), notifier.clone());
    let outcome = flow.run(&FakePage::new(), &event("1188"), Utc::now()).await;

    match outcome {
        FlowOutcome::WriteFailed(SyncError::WriteFailed { status, message }) => {
            assert_eq!(status, Some(401));
            assert!(message.contains("authorization"), "message: {}", message);
        }
        other => panic!("应该写入失败: {:?}", other),
    }

    let (message, severity) = notifier.last().unwrap();
    assert_eq!(severity, Severity::Error);
    assert!(message.contains("authorization"));
}

#[tokio::test]
async fn missing_config_makes_no_request() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.path_contains("/repos/");
            then.status(200);
        })
        .await;

    let notifier = Arc::new(RecordingNotifier::default());
    let settings = SyncSettings {
        auth_token: None,
        ..complete_settings()
    };
    let flow = flow(&server, settings, notifier.clone());
    let outcome = flow.run(&FakePage::new(), &event("1188"), Utc::now()).await;

    assert_eq!(outcome, FlowOutcome::ConfigMissing("github_token"));
    any.assert_hits_async(0).await;
    assert_eq!(notifier.severities(), vec![Severity::Error]);
}

#[tokio::test]
async fn short_code_is_not_synced() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.path_contains("/repos/");
            then.status(200);
        })
        .await;

    let mut snapshot = common::two_sum_snapshot();
    snapshot["editorModels"] = json!([{"value": "x=1", "languageId": "python"}]);
    snapshot["bodyText"] = json!("");
    let page = FakePage::new().with_snapshot(snapshot);

    let notifier = Arc::new(RecordingNotifier::default());
    let flow = flow(&server, complete_settings(), notifier.clone());
    let outcome = flow.run(&page, &event("1188"), Utc::now()).await;

    assert_eq!(outcome, FlowOutcome::ExtractionFailed);
    any.assert_hits_async(0).await;
    assert_eq!(notifier.severities(), vec![Severity::Error]);
}

#[tokio::test]
async fn same_submission_is_written_once() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(CONTENTS_PATH);
            then.status(404);
        })
        .await;
    let write = server
        .mock_async(|when, then| {
            when.method(PUT).path(CONTENTS_PATH);
            then.status(201);
        })
        .await;

    let notifier = Arc::new(RecordingNotifier::default());
    let mut watch_loop = WatchLoop::new(
        SubmissionObserver::new(observer_config()),
        flow(&server, complete_settings(), notifier.clone()),
        notifier.clone(),
        "leetcode.com/problems/",
        Duration::from_millis(1),
    );

    let page = FakePage::new();
    // 拦截到的判题响应
    page.push_accepted("1188", 1);
    let first = watch_loop.tick(&page).await.unwrap();
    assert!(first.as_ref().is_some_and(FlowOutcome::is_synced));

    // 同一个提交再次被拦截到，同时 DOM 上也显示通过
    page.push_accepted("1188", 1);
    page.set_status(json!({
        "href": "https://leetcode.com/problems/two-sum/submissions/1188/",
        "statusTexts": ["Accepted"],
        "bodyText": "Accepted\nRuntime\n0 ms"
    }));
    let second = watch_loop.tick(&page).await.unwrap();
    assert_eq!(second, None);

    write.assert_hits_async(1).await;
    assert_eq!(watch_loop.stats().synced, 1);
}

fn status_accepted_without_id(page: &FakePage) {
    page.set_status(json!({
        "href": PROBLEM_URL,
        "statusTexts": ["Accepted"],
        "bodyText": "Accepted\nRuntime"
    }));
}

/// 远端文件不存在的托管 API
async fn missing_file_server() -> MockServer {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(CONTENTS_PATH);
            then.status(404);
        })
        .await;
    server
}

fn watch_loop_for(server: &MockServer, notifier: Arc<RecordingNotifier>) -> WatchLoop {
    WatchLoop::new(
        SubmissionObserver::new(observer_config()),
        flow(server, complete_settings(), notifier.clone()),
        notifier,
        "leetcode.com/problems/",
        Duration::from_millis(1),
    )
}

#[tokio::test]
async fn late_interception_after_dom_hit_is_same_submission() {
    let server = missing_file_server().await;
    let write = server
        .mock_async(|when, then| {
            when.method(PUT).path(CONTENTS_PATH);
            then.status(201);
        })
        .await;

    let notifier = Arc::new(RecordingNotifier::default());
    let mut watch_loop = watch_loop_for(&server, notifier);
    let page = FakePage::new();

    // 点击后 DOM 先显示通过，页面地址里没有提交 ID
    page.push_drain(json!({"installed": true, "submits": 1, "results": [], "href": PROBLEM_URL}));
    status_accepted_without_id(&page);
    let first = watch_loop.tick(&page).await.unwrap();
    assert!(first.as_ref().is_some_and(FlowOutcome::is_synced));

    // 同一个提交的判题响应下一轮才被收到
    page.push_accepted("1188", 0);
    let second = watch_loop.tick(&page).await.unwrap();
    assert_eq!(second, None);

    write.assert_hits_async(1).await;
    assert_eq!(watch_loop.stats().synced, 1);
}

#[tokio::test]
async fn interception_arriving_right_after_dom_hit_is_absorbed() {
    let server = missing_file_server().await;
    let write = server
        .mock_async(|when, then| {
            when.method(PUT).path(CONTENTS_PATH);
            then.status(201);
        })
        .await;

    let notifier = Arc::new(RecordingNotifier::default());
    let mut watch_loop = watch_loop_for(&server, notifier);
    let page = FakePage::new();

    page.push_drain(json!({"installed": true, "submits": 1, "results": [], "href": PROBLEM_URL}));
    page.push_drain(json!({"installed": true, "submits": 0, "results": [], "href": PROBLEM_URL}));
    // 会话结束前的最后一次收取
    page.push_accepted("1188", 0);
    status_accepted_without_id(&page);

    let first = watch_loop.tick(&page).await.unwrap();
    assert!(first.as_ref().is_some_and(FlowOutcome::is_synced));
    assert!(page.drains.lock().unwrap().is_empty());

    // 同一个响应再次出现也不会重复同步
    page.push_accepted("1188", 0);
    assert_eq!(watch_loop.tick(&page).await.unwrap(), None);
    assert_eq!(watch_loop.tick(&page).await.unwrap(), None);

    write.assert_hits_async(1).await;
}

#[tokio::test]
async fn dom_watch_detects_acceptance_without_interception() {
    let page = FakePage::new();
    page.set_status(json!({
        "href": "https://leetcode.com/problems/two-sum/submissions/2024/",
        "statusTexts": ["Accepted"],
        "bodyText": "Accepted\nRuntime\n4 ms\nMemory"
    }));

    let mut observer = SubmissionObserver::new(observer_config());
    observer.ensure_hooks(&page).await.unwrap();
    let outcome = observer.watch(&page, true).await.unwrap();

    match outcome {
        WatchOutcome::Accepted(event) => {
            assert_eq!(event.key, SubmissionKey::Id("2024".to_string()));
            assert_eq!(event.source, SignalSource::DomWatch);
        }
        other => panic!("应该检测到通过: {:?}", other),
    }

    // 页面上留着的旧结果不会再次触发
    let again = observer.watch(&page, true).await.unwrap();
    assert_eq!(again, WatchOutcome::Duplicate(SubmissionKey::Id("2024".to_string())));
}

#[tokio::test]
async fn watch_times_out_cleanly() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.path_contains("/repos/");
            then.status(200);
        })
        .await;

    let notifier = Arc::new(RecordingNotifier::default());
    let mut watch_loop = WatchLoop::new(
        SubmissionObserver::new(observer_config()),
        flow(&server, complete_settings(), notifier.clone()),
        notifier.clone(),
        "leetcode.com/problems/",
        Duration::from_millis(1),
    );

    let page = FakePage::new();
    page.push_drain(json!({"installed": true, "submits": 1, "results": [], "href": PROBLEM_URL}));
    let outcome = watch_loop.tick(&page).await.unwrap();

    assert_eq!(outcome, None);
    assert_eq!(watch_loop.stats().skipped, 1);
    assert_eq!(notifier.severities(), vec![Severity::Info, Severity::Error]);
    any.assert_hits_async(0).await;

    // 预算用完后没有残留的轮询
    let idle = watch_loop.tick(&page).await.unwrap();
    assert_eq!(idle, None);
    assert_eq!(notifier.severities().len(), 2);
}

#[tokio::test]
async fn rejected_submission_is_not_synced() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.path_contains("/repos/");
            then.status(200);
        })
        .await;

    let notifier = Arc::new(RecordingNotifier::default());
    let mut watch_loop = WatchLoop::new(
        SubmissionObserver::new(observer_config()),
        flow(&server, complete_settings(), notifier.clone()),
        notifier.clone(),
        "leetcode.com/problems/",
        Duration::from_millis(1),
    );

    let page = FakePage::new();
    page.push_drain(json!({
        "installed": true,
        "submits": 1,
        "href": PROBLEM_URL,
        "results": [{
            "url": "https://leetcode.com/submissions/detail/1190/check/",
            "body": {"state": "SUCCESS", "status_msg": "Wrong Answer", "status_code": 11}
        }]
    }));
    let outcome = watch_loop.tick(&page).await.unwrap();

    assert_eq!(outcome, None);
    let (message, severity) = notifier.last().unwrap();
    assert_eq!(severity, Severity::Error);
    assert!(message.contains("Wrong Answer"));
    any.assert_hits_async(0).await;
}

#[tokio::test]
async fn non_problem_page_is_ignored() {
    let page = FakePage::new();
    page.push_drain(json!({
        "installed": true,
        "submits": 1,
        "results": [],
        "href": "https://leetcode.com/problemset/"
    }));

    let server = MockServer::start_async().await;
    let notifier = Arc::new(RecordingNotifier::default());
    let mut watch_loop = WatchLoop::new(
        SubmissionObserver::new(observer_config()),
        flow(&server, complete_settings(), notifier.clone()),
        notifier.clone(),
        "leetcode.com/problems/",
        Duration::from_millis(1),
    );

    assert_eq!(watch_loop.tick(&page).await.unwrap(), None);
    assert!(notifier.severities().is_empty());
}

#[tokio::test]
async fn verify_target_reports_bad_token() {
    let server = MockServer::start_async().await;
    let repo = server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/octo/solutions");
            then.status(401).json_body(json!({"message": "Bad credentials"}));
        })
        .await;

    let client = GitHubClient::new(&config_for(&server)).unwrap();
    match client.verify_target(&target()).await {
        Err(SyncError::LookupFailed { status, message, .. }) => {
            assert_eq!(status, Some(401));
            assert!(message.contains("令牌"));
        }
        other => panic!("应该报告令牌无效: {:?}", other),
    }
    repo.assert_async().await;
}

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_browser_connection() {
    leet_sync::utils::logging::init(true);

    let config = Config::from_env();

    let result = connect_to_browser_and_page(
        config.browser_debug_port,
        &config.target_url,
        &config.page_match,
    )
    .await;

    assert!(result.is_ok(), "应该能够成功连接浏览器");
}
