//! Mock 추론 서버 통합 테스트.
//!
//! mockito HTTP 서버 + GeminiClient + SuggestionService 연동.

mod common;

use std::sync::Arc;

use common::{checker_frame, ManualClock, MockCamera};
use lensmate_core::config::AppConfig;
use lensmate_core::models::device::{DeviceState, FlashMode};
use lensmate_core::models::suggestion::QuickActionKind;
use lensmate_core::ports::camera_control::CameraControl;
use lensmate_core::ports::face_detector::NoFaceDetector;
use lensmate_network::GeminiClient;
use lensmate_suggestion::SuggestionService;
use lensmate_vision::SceneAnalyzer;
use mockito::Matcher;

const GEN_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn config_for(server: &mockito::ServerGuard) -> AppConfig {
    let mut config = AppConfig::default_config();
    config.reasoning.endpoint = format!("{}/v1beta/models", server.url());
    config.reasoning.api_key = "integration-key".to_string();
    config
}

/// generateContent 응답 본문 (text는 JSON 문자열로 이스케이프)
fn candidate_body(text: &str) -> String {
    serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    })
    .to_string()
}

fn service_for(config: &AppConfig, camera: Arc<MockCamera>) -> SuggestionService {
    let client = GeminiClient::new(&config.reasoning).unwrap();
    SuggestionService::new(Arc::new(client), config)
        .with_clock(Arc::new(ManualClock::new()))
        .with_preview_source(camera)
}

#[tokio::test]
async fn multimodal_request_round_trip() {
    let mut server = mockito::Server::new_async().await;
    let reply = "```json\n{\"suggestions\":[{\"title\":\"Go Portrait\",\"description\":\"blur the background\",\"action\":\"ENABLE_PORTRAIT\",\"icon\":\"👤\",\"priority\":1}]}\n```";
    let mock = server
        .mock("POST", GEN_PATH)
        .match_query(Matcher::UrlEncoded("key".into(), "integration-key".into()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("inline_data".into()),
            Matcher::Regex("image/jpeg".into()),
            Matcher::PartialJson(serde_json::json!({
                "generationConfig": { "maxOutputTokens": 500 }
            })),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(candidate_body(reply))
        .create_async()
        .await;

    let config = config_for(&server);
    let camera = Arc::new(MockCamera::new(DeviceState::default()).with_preview(checker_frame(320, 240)));
    let svc = service_for(&config, camera.clone());
    let analyzer = SceneAnalyzer::new(Arc::new(NoFaceDetector), &config.analysis);

    let frame = camera.capture_preview().await.unwrap();
    let analysis = analyzer.analyze(frame.as_ref()).await;
    let out = svc
        .get_suggestions(&camera.snapshot().await.unwrap(), Some(&analysis))
        .await;

    mock.assert_async().await;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].title, "Go Portrait");
    assert_eq!(out[0].action, QuickActionKind::EnablePortrait);
}

#[tokio::test]
async fn server_outage_falls_back_to_rules() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", GEN_PATH)
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("overloaded")
        .create_async()
        .await;

    let config = config_for(&server);
    let dark = DeviceState {
        flash_mode: FlashMode::Off,
        low_light: true,
        ..DeviceState::default()
    };
    let svc = service_for(&config, Arc::new(MockCamera::new(dark.clone())));

    let out = svc.get_suggestions(&dark, None).await;

    mock.assert_async().await;
    assert_eq!(out[0].action, QuickActionKind::FlashOn);
    assert_eq!(out[0].title, "Turn on Flash");
}

#[tokio::test]
async fn prose_reply_falls_back_to_rules() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", GEN_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(candidate_body("Try turning on your grid lines!"))
        .create_async()
        .await;

    let config = config_for(&server);
    let svc = service_for(&config, Arc::new(MockCamera::new(DeviceState::default())));

    let out = svc.get_suggestions(&DeviceState::default(), None).await;
    assert_eq!(out[0].action, QuickActionKind::EnableGrid);
    assert_eq!(svc.remaining_quota(), config.suggestion.max_daily_calls - 1);
}

#[tokio::test]
async fn unreachable_server_falls_back_to_rules() {
    let mut config = AppConfig::default_config();
    config.reasoning.endpoint = "http://127.0.0.1:9/v1beta/models".to_string();
    config.reasoning.api_key = "integration-key".to_string();
    config.reasoning.connect_timeout_secs = 2;

    let svc = service_for(&config, Arc::new(MockCamera::new(DeviceState::default())));
    let out = svc.get_suggestions(&DeviceState::default(), None).await;

    assert!(!out.is_empty());
    assert!(out.len() <= config.suggestion.max_fallback);
}
