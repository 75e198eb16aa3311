//! Integration test: start the gateway on a free port, GET /, assert the probe prompt was answered.
//! Uses a stub generator; does not reach Gemini or LINE.

mod common;

use common::{StubGenerator, StubReplier};
use relay::gateway::HEALTH_PROBE;

#[tokio::test]
async fn health_returns_generated_probe_reply() {
    let gw = common::start(StubGenerator::default(), StubReplier::default()).await;

    let resp = reqwest::get(format!("{}/", gw.base_url))
        .await
        .expect("GET /");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    assert!(content_type.starts_with("text/plain"), "content-type: {}", content_type);
    assert_eq!(resp.text().await.unwrap(), "generated: who are you?");

    assert_eq!(*gw.generator.prompts.lock().unwrap(), vec![HEALTH_PROBE.to_string()]);
    assert!(gw.replier.replies.lock().unwrap().is_empty());
}

#[tokio::test]
async fn health_reports_generation_failure_as_500() {
    let generator = StubGenerator {
        fail: true,
        ..Default::default()
    };
    let gw = common::start(generator, StubReplier::default()).await;

    let resp = reqwest::get(format!("{}/", gw.base_url))
        .await
        .expect("GET /");
    assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
}
