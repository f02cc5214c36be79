//! 설정 및 DI 와이어링 통합 테스트.
//!
//! 설정 파일 → AppConfig → 어댑터 생성 검증.

use std::sync::Arc;

use lensmate_core::config::AppConfig;
use lensmate_core::config_manager::ConfigManager;
use lensmate_core::error::CoreError;
use lensmate_core::ports::face_detector::NoFaceDetector;
use lensmate_network::GeminiClient;
use lensmate_suggestion::SuggestionService;
use lensmate_vision::{PreviewEncoder, SceneAnalyzer};

#[test]
fn config_defaults_are_valid() {
    let config = AppConfig::default_config();

    // 제안 서비스
    assert_eq!(config.suggestion.throttle_ms, 3_000);
    assert_eq!(config.suggestion.max_daily_calls, 40);
    assert_eq!(config.suggestion.history_capacity, 20);
    assert_eq!(config.suggestion.max_suggestions, 4);
    assert_eq!(config.suggestion.max_fallback, 3);

    // 추론 백엔드
    assert!(!config.reasoning.endpoint.is_empty());
    assert!(!config.reasoning.has_api_key());
    assert!(config.reasoning.request_timeout() > config.reasoning.connect_timeout());

    // 프리뷰/교육/적용
    assert!(config.preview.max_width >= config.preview.max_height);
    assert_eq!(config.education.interval().as_millis(), 8_000);
    assert!((config.applier.zoom_step - 1.2).abs() < f32::EPSILON);
}

#[test]
fn missing_file_is_created_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let manager = ConfigManager::with_path(path.clone()).unwrap();

    assert!(path.exists());
    assert_eq!(manager.config_path(), path.as_path());
    assert_eq!(manager.get().suggestion.max_daily_calls, 40);
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"suggestion":{"max_daily_calls":5},"reasoning":{"api_key":"k-123"}}"#,
    )
    .unwrap();

    let config = ConfigManager::with_path(path).unwrap().get();

    assert_eq!(config.suggestion.max_daily_calls, 5);
    assert_eq!(config.suggestion.throttle_ms, 3_000);
    assert!(config.reasoning.has_api_key());
    assert_eq!(config.education.interval_ms, 8_000);
}

#[test]
fn malformed_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = ConfigManager::with_path(path).unwrap_err();
    assert!(matches!(err, CoreError::Config(_)));
}

#[test]
fn update_persists_and_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let manager = ConfigManager::with_path(path.clone()).unwrap();

    manager
        .update_with(|c| c.education.interval_ms = 2_000)
        .unwrap();

    let reopened = ConfigManager::with_path(path).unwrap();
    assert_eq!(reopened.get().education.interval_ms, 2_000);
}

#[test]
fn backend_requires_api_key() {
    let config = AppConfig::default_config();
    let err = GeminiClient::new(&config.reasoning).unwrap_err();
    assert!(matches!(err, CoreError::Config(_)));
}

#[test]
fn all_adapters_instantiate_from_config() {
    let mut config = AppConfig::default_config();
    config.reasoning.api_key = "test-key".to_string();

    let backend = Arc::new(GeminiClient::new(&config.reasoning).unwrap());
    let service = SuggestionService::new(backend, &config);
    assert!(service.is_online());
    assert_eq!(service.remaining_quota(), config.suggestion.max_daily_calls);

    let offline = SuggestionService::offline(&config);
    assert!(!offline.is_online());

    let _analyzer = SceneAnalyzer::new(Arc::new(NoFaceDetector), &config.analysis);
    let _encoder = PreviewEncoder::from_config(&config.preview);
    assert_eq!(config.applier.settle_delay().as_millis(), 300);
}
