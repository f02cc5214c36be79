//! 애플리케이션 설정 구조체.
//!
//! 추론 백엔드 연결, 제안 서비스 제한(스로틀/쿼터/히스토리),
//! 장면 분석 임계값, 프리뷰 인코딩, 교육 모드 주기, 액션 적용 파라미터를 정의한다.
//! 모든 필드는 `#[serde(default)]`로 누락 시 기본값을 사용한다.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::ports::reasoning::GenerationParams;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 추론 백엔드 설정
    #[serde(default)]
    pub reasoning: ReasoningConfig,
    /// 제안 서비스 설정
    #[serde(default)]
    pub suggestion: SuggestionConfig,
    /// 장면 분석 설정
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// 프리뷰 인코딩 설정
    #[serde(default)]
    pub preview: PreviewConfig,
    /// 교육 모드 설정
    #[serde(default)]
    pub education: EducationConfig,
    /// 액션 적용 설정
    #[serde(default)]
    pub applier: ApplierConfig,
}

impl AppConfig {
    /// 기본 설정 생성
    pub fn default_config() -> Self {
        Self::default()
    }
}

// ============================================================
// 추론 백엔드 설정
// ============================================================

/// 원격 추론 백엔드 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// 모델 엔드포인트 기본 URL (모델 경로 제외)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// 모델 이름
    #[serde(default = "default_model")]
    pub model: String,
    /// API 키 (파일에 저장하지 않으려면 `LENSMATE_API_KEY` 환경변수 사용)
    #[serde(default)]
    pub api_key: String,
    /// 연결 타임아웃 (초)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// 요청 전체 타임아웃 (초)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// 이미지 첨부 요청의 생성 파라미터
    #[serde(default = "default_image_generation")]
    pub image_generation: GenerationParams,
    /// 텍스트 전용 요청의 생성 파라미터
    #[serde(default = "default_text_generation")]
    pub text_generation: GenerationParams,
}

impl ReasoningConfig {
    /// 연결 타임아웃
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// 요청 타임아웃
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// API 키 설정 여부
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: String::new(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            image_generation: default_image_generation(),
            text_generation: default_text_generation(),
        }
    }
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_image_generation() -> GenerationParams {
    GenerationParams {
        temperature: 0.4,
        max_output_tokens: 500,
        top_p: 0.8,
    }
}

fn default_text_generation() -> GenerationParams {
    GenerationParams {
        temperature: 0.3,
        max_output_tokens: 1000,
        top_p: 0.8,
    }
}

// ============================================================
// 제안 서비스 설정
// ============================================================

/// 제안 서비스 제한 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionConfig {
    /// 요청 간 최소 간격 (밀리초)
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    /// 일일 원격 호출 한도
    #[serde(default = "default_max_daily_calls")]
    pub max_daily_calls: u32,
    /// 중복 제거 히스토리 크기 (도달 시 전체 초기화)
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// 반환 제안 최대 개수
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    /// 폴백 제안 최대 개수
    #[serde(default = "default_max_fallback")]
    pub max_fallback: usize,
    /// 원격 호출 전체 제한 시간 (초)
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

impl SuggestionConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            throttle_ms: default_throttle_ms(),
            max_daily_calls: default_max_daily_calls(),
            history_capacity: default_history_capacity(),
            max_suggestions: default_max_suggestions(),
            max_fallback: default_max_fallback(),
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

fn default_throttle_ms() -> u64 {
    3_000
}

fn default_max_daily_calls() -> u32 {
    40
}

fn default_history_capacity() -> usize {
    20
}

fn default_max_suggestions() -> usize {
    4
}

fn default_max_fallback() -> usize {
    3
}

fn default_call_timeout_secs() -> u64 {
    60
}

// ============================================================
// 장면 분석 설정
// ============================================================

/// 장면 분석 판정 임계값
///
/// 경험적으로 조정된 값이므로 재계산하지 않고 그대로 노출한다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisThresholds {
    /// 역광 판정: 상단 밝기 - 중앙 밝기 차이
    #[serde(default = "default_backlight_delta")]
    pub backlight_delta: f64,
    /// 과노출 판정: 255 구간 비율
    #[serde(default = "default_overexposed_ratio")]
    pub overexposed_ratio: f64,
    /// 저노출 판정: 0 구간 비율
    #[serde(default = "default_underexposed_ratio")]
    pub underexposed_ratio: f64,
    /// 흔들림 판정: 라플라시안 분산 하한
    #[serde(default = "default_motion_blur_variance")]
    pub motion_blur_variance: f64,
    /// 배경 BUSY 판정 엣지 비율
    #[serde(default = "default_busy_edge_ratio")]
    pub busy_edge_ratio: f64,
    /// 배경 CLUTTERED 판정 엣지 비율
    #[serde(default = "default_cluttered_edge_ratio")]
    pub cluttered_edge_ratio: f64,
}

impl Default for AnalysisThresholds {
    fn default() -> Self {
        Self {
            backlight_delta: default_backlight_delta(),
            overexposed_ratio: default_overexposed_ratio(),
            underexposed_ratio: default_underexposed_ratio(),
            motion_blur_variance: default_motion_blur_variance(),
            busy_edge_ratio: default_busy_edge_ratio(),
            cluttered_edge_ratio: default_cluttered_edge_ratio(),
        }
    }
}

fn default_backlight_delta() -> f64 {
    60.0
}

fn default_overexposed_ratio() -> f64 {
    0.01
}

fn default_underexposed_ratio() -> f64 {
    0.10
}

fn default_motion_blur_variance() -> f64 {
    150.0
}

fn default_busy_edge_ratio() -> f64 {
    0.08
}

fn default_cluttered_edge_ratio() -> f64 {
    0.15
}

/// 장면 분석 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// 판정 임계값
    #[serde(default)]
    pub thresholds: AnalysisThresholds,
    /// 얼굴 검출 타임아웃 (밀리초). 초과 시 0명
    #[serde(default = "default_face_detection_timeout_ms")]
    pub face_detection_timeout_ms: u64,
    /// 얼굴 검출 입력 최대 변 길이 (픽셀). 다른 지표는 원본 해상도 사용
    #[serde(
        default = "default_face_detection_max_dimension",
        alias = "analysis_max_dimension"
    )]
    pub face_detection_max_dimension: u32,
    /// SCRFD 모델 파일 (ONNX 또는 OpenVINO IR). 없으면 얼굴 검출 안 함
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_model_path: Option<PathBuf>,
    /// 얼굴 판정 최소 점수
    #[serde(default = "default_face_confidence")]
    pub face_confidence: f32,
    /// OpenVINO 추론 장치 (CPU, GPU 등)
    #[serde(default = "default_face_device")]
    pub face_device: String,
}

impl AnalysisConfig {
    pub fn face_detection_timeout(&self) -> Duration {
        Duration::from_millis(self.face_detection_timeout_ms)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            thresholds: AnalysisThresholds::default(),
            face_detection_timeout_ms: default_face_detection_timeout_ms(),
            face_detection_max_dimension: default_face_detection_max_dimension(),
            face_model_path: None,
            face_confidence: default_face_confidence(),
            face_device: default_face_device(),
        }
    }
}

fn default_face_detection_timeout_ms() -> u64 {
    2_000
}

fn default_face_detection_max_dimension() -> u32 {
    640
}

fn default_face_confidence() -> f32 {
    0.5
}

fn default_face_device() -> String {
    "CPU".to_string()
}

// ============================================================
// 프리뷰 / 교육 모드 / 액션 적용
// ============================================================

/// 백엔드 첨부용 프리뷰 인코딩 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// 최대 너비 (픽셀)
    #[serde(default = "default_preview_max_width")]
    pub max_width: u32,
    /// 최대 높이 (픽셀)
    #[serde(default = "default_preview_max_height")]
    pub max_height: u32,
    /// JPEG 품질 (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_width: default_preview_max_width(),
            max_height: default_preview_max_height(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

fn default_preview_max_width() -> u32 {
    640
}

fn default_preview_max_height() -> u32 {
    480
}

fn default_jpeg_quality() -> u8 {
    60
}

/// 교육 모드 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationConfig {
    /// 팁 전달 주기 (밀리초)
    #[serde(default = "default_education_interval_ms")]
    pub interval_ms: u64,
}

impl EducationConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for EducationConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_education_interval_ms(),
        }
    }
}

fn default_education_interval_ms() -> u64 {
    8_000
}

/// 액션 적용 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplierConfig {
    /// 모드 전환 후 검증 전 대기 (밀리초)
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// 줌 인/아웃 배율 단계
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f32,
}

impl ApplierConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Default for ApplierConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            zoom_step: default_zoom_step(),
        }
    }
}

fn default_settle_delay_ms() -> u64 {
    300
}

fn default_zoom_step() -> f32 {
    1.2
}
