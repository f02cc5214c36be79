//! Gemini 추론 백엔드 클라이언트.
//!
//! `POST {endpoint}/{model}:generateContent?key=...` 형식의 생성 API를 호출한다.
//! 프롬프트 텍스트와 선택적 인라인 JPEG 이미지를 보내고,
//! `candidates[0].content.parts[0].text`를 그대로 반환한다.
//!
//! **에러 매핑**:
//! - 연결 실패 → `CoreError::Network`
//! - 타임아웃 → `CoreError::Timeout`
//! - 5xx / 빈 본문 → `CoreError::ServiceUnavailable`
//! - 그 외 비정상 상태 → `CoreError::Network`
//! - 응답 구조 불일치 → `CoreError::Parse`
//!
//! API 키는 쿼리 파라미터로만 전달되며 로그/에러 메시지에 포함하지 않는다.

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use lensmate_core::config::ReasoningConfig;
use lensmate_core::error::CoreError;
use lensmate_core::ports::reasoning::{ReasoningBackend, ReasoningRequest};

/// 로그/에러에 남기는 본문 최대 길이
const BODY_PREVIEW_CHARS: usize = 200;

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

// ============================================================
// GeminiClient
// ============================================================

/// Gemini generateContent 클라이언트
#[derive(Debug)]
pub struct GeminiClient {
    /// HTTP 클라이언트
    http_client: reqwest::Client,
    /// 생성 엔드포인트 (키 쿼리 포함)
    url: Url,
    /// 모델 이름 (로그용)
    model: String,
    /// 요청 타임아웃 (밀리초, 에러 보고용)
    timeout_ms: u64,
}

impl GeminiClient {
    /// 설정으로 클라이언트 생성
    pub fn new(config: &ReasoningConfig) -> Result<Self, CoreError> {
        if !config.has_api_key() {
            return Err(CoreError::Config(
                "추론 백엔드 API 키 미설정. config.json 또는 LENSMATE_API_KEY를 확인하세요.".into(),
            ));
        }

        let base = format!(
            "{}/{}:generateContent",
            config.endpoint.trim_end_matches('/'),
            config.model
        );
        let url = Url::parse_with_params(&base, &[("key", config.api_key.as_str())])
            .map_err(|e| CoreError::Config(format!("추론 엔드포인트 URL 오류: {e}")))?;

        let http_client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        debug!(
            endpoint = %config.endpoint,
            model = %config.model,
            connect_timeout = config.connect_timeout_secs,
            request_timeout = config.request_timeout_secs,
            "GeminiClient 초기화"
        );

        Ok(Self {
            http_client,
            url,
            model: config.model.clone(),
            timeout_ms: config.request_timeout().as_millis() as u64,
        })
    }

    /// 요청 본문 구성
    fn build_body(request: &ReasoningRequest) -> serde_json::Value {
        let mut parts = vec![serde_json::json!({ "text": request.prompt })];
        if let Some(image) = &request.image {
            parts.push(serde_json::json!({
                "inline_data": {
                    "mime_type": image.mime_type,
                    "data": image.data
                }
            }));
        }

        serde_json::json!({
            "contents": [{ "parts": parts }],
            "generationConfig": {
                "temperature": request.generation.temperature,
                "maxOutputTokens": request.generation.max_output_tokens,
                "topP": request.generation.top_p
            }
        })
    }

    /// 응답 본문에서 첫 후보 텍스트 추출
    fn extract_text(body: &str) -> Result<String, CoreError> {
        if body.trim().is_empty() {
            return Err(CoreError::ServiceUnavailable("추론 백엔드 빈 응답".to_string()));
        }

        let response: serde_json::Value = serde_json::from_str(body).map_err(|e| {
            CoreError::Parse(format!("응답 JSON 파싱 실패: {} (raw: {})", e, preview(body)))
        })?;

        let candidates = response
            .get("candidates")
            .and_then(|c| c.as_array())
            .filter(|arr| !arr.is_empty())
            .ok_or_else(|| CoreError::Parse("응답에 candidates 없음".to_string()))?;

        candidates[0]
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .and_then(|arr| arr.first())
            .and_then(|part| part.get("text"))
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(|| CoreError::Parse("응답 후보에서 텍스트를 찾을 수 없음".to_string()))
    }

    fn map_send_error(&self, e: reqwest::Error) -> CoreError {
        if e.is_timeout() {
            CoreError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            // URL에 API 키가 있으므로 제거
            CoreError::Network(format!("추론 API 호출 실패: {}", e.without_url()))
        }
    }
}

#[async_trait]
impl ReasoningBackend for GeminiClient {
    async fn generate(&self, request: &ReasoningRequest) -> Result<String, CoreError> {
        let body = Self::build_body(request);

        debug!(
            model = %self.model,
            with_image = request.image.is_some(),
            prompt_chars = request.prompt.len(),
            "추론 API 호출"
        );

        let response = self
            .http_client
            .post(self.url.clone())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            warn!(status = %status, "추론 API 오류 응답");
            let message = format!("추론 API 오류 ({}): {}", status, preview(&text));
            return Err(if status.is_server_error() {
                CoreError::ServiceUnavailable(message)
            } else {
                CoreError::Network(message)
            });
        }

        let output = Self::extract_text(&text)?;
        debug!(chars = output.len(), "추론 응답 수신");
        Ok(output)
    }

    fn backend_name(&self) -> &str {
        &self.model
    }
}

// ============================================================
// 테스트
// ============================================================
