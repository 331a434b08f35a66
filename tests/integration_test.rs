use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use lab_console::models::timestamp::parse_local;
use lab_console::orchestrator::{LabDetailsView, LabsView, TimerField, ViewOptions};
use lab_console::services::AssumeYes;
use lab_console::utils::logging;
use lab_console::{Config, ExamStatus, LabApiClient};
use serde_json::json;

fn client_for(server: &MockServer) -> LabApiClient {
    let config = Config {
        api_base_url: server.base_url(),
        ..Config::default()
    };
    LabApiClient::new(&config).expect("client")
}

/// 列表页 → 详情页 → 开启自动模式 → 状态刷新 → 关闭自动模式
#[tokio::test]
async fn test_lab_flow_with_auto_mode() {
    logging::init(false);

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/lab/labs");
        then.status(200).json_body(json!([
            { "_id": "lab-1", "name": "Computer Lab", "description": "Programming", "status": "Available" }
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/exams").query_param("labId", "lab-1");
        then.status(200).json_body(json!([
            { "_id": "e1", "name": "Midterm", "url": "https://m.example", "status": "Stopped",
              "autoMode": false, "autoOnTime": "", "autoOffTime": "" }
        ]));
    });
    let enable = server.mock(|when, then| {
        when.method(PUT).path("/exams/e1").json_body(json!({
            "autoMode": true,
            "autoOnTime": "2025-01-01T10:00",
            "autoOffTime": "2025-01-01T11:00"
        }));
        then.status(200).json_body(json!({
            "_id": "e1",
            "autoMode": true,
            "autoOnTime": "2025-01-01T10:00",
            "autoOffTime": "2025-01-01T11:00"
        }));
    });
    let disable = server.mock(|when, then| {
        when.method(PUT).path("/exams/e1").json_body(json!({
            "autoMode": false,
            "autoOnTime": "",
            "autoOffTime": ""
        }));
        then.status(200).json_body(json!({
            "_id": "e1",
            "autoMode": false,
            "autoOnTime": "",
            "autoOffTime": ""
        }));
    });

    let client = client_for(&server);
    let mut labs = LabsView::new(client.clone());
    labs.load().await.expect("labs");
    let lab = labs.find("lab-1").cloned().expect("lab-1");

    let now = parse_local("2025-01-01T10:30").unwrap();
    let options = ViewOptions {
        tick_interval: Duration::from_millis(20),
        clock: Arc::new(move || now),
    };
    let mut view = LabDetailsView::open(client, lab, Arc::new(AssumeYes), options).await;
    let mut transitions = view.subscribe_transitions().expect("ticker");

    view.update_timer("e1", TimerField::AutoOn, "2025-01-01T10:00")
        .await
        .expect("on");
    view.update_timer("e1", TimerField::AutoOff, "2025-01-01T11:00")
        .await
        .expect("off");
    view.save_auto_mode("e1").await.expect("save auto mode");
    enable.assert();

    let transition = tokio::time::timeout(Duration::from_secs(2), transitions.recv())
        .await
        .expect("transition in time")
        .expect("channel open");
    assert_eq!(transition.exam_id, "e1");
    assert_eq!(transition.to, ExamStatus::Ongoing);

    let exam = view.toggle_auto_mode("e1").await.expect("disable");
    disable.assert();
    assert!(!exam.auto_mode);
    assert_eq!(exam.auto_on_time, "");

    // 关闭自动模式后不再有状态变化
    let status_after_disable = view.exam("e1").await.unwrap().status;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(view.exam("e1").await.unwrap().status, status_after_disable);

    view.close().await;
    assert!(!view.is_ticking());
}

#[tokio::test]
async fn test_unreachable_backend_surfaces_static_message() {
    logging::init(false);

    // 没有任何服务监听的端口
    let config = Config {
        api_base_url: "http://127.0.0.1:9".to_string(),
        request_timeout_ms: 500,
        ..Config::default()
    };
    let mut labs = LabsView::new(LabApiClient::new(&config).expect("client"));

    let err = labs.load().await.expect_err("no backend");
    assert_eq!(err.user_message(), "Failed to load labs. Please try again.");
    assert_eq!(labs.load_error(), Some("Failed to load labs. Please try again."));
}
