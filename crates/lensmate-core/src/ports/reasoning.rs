//! 원격 추론 백엔드 포트.
//!
//! 구현: `lensmate-network::GeminiClient`
//!
//! 반환 텍스트는 신뢰할 수 없는 자유 형식이며,
//! JSON 추출/파싱은 제안 서비스가 방어적으로 수행한다.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// 요청에 첨부하는 인라인 이미지
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineImage {
    /// MIME 타입 (예: "image/jpeg")
    pub mime_type: String,
    /// base64 인코딩 데이터
    pub data: String,
}

/// 생성 파라미터
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
}

/// 추론 요청
#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningRequest {
    /// 프롬프트 텍스트
    pub prompt: String,
    /// 멀티모달 이미지 (없으면 텍스트 전용)
    pub image: Option<InlineImage>,
    /// 생성 파라미터
    pub generation: GenerationParams,
}

/// 추론 백엔드
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// 요청을 보내고 첫 번째 후보의 텍스트를 반환
    ///
    /// 네트워크/비정상 상태/빈 응답은 모두 `CoreError`로 반환한다.
    async fn generate(&self, request: &ReasoningRequest) -> Result<String, CoreError>;

    /// 백엔드 이름 (로그용)
    fn backend_name(&self) -> &str;
}
