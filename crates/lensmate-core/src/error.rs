//! LENSMATE 핵심 에러 타입.
//!
//! 모든 어댑터 crate는 이 타입을 그대로 반환하거나 `#[from]`으로 래핑한다.
//! 파이프라인 경계(분석기, 제안 서비스, 액션 적용기)는 이 에러를
//! 호출자에게 올리지 않고 각자의 복구 값으로 변환한다.

use thiserror::Error;

/// 파이프라인 공용 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    // --- 추론 백엔드 ---
    /// 연결 실패 또는 비정상 상태 코드
    #[error("추론 백엔드 연결 실패: {0}")]
    Network(String),

    /// 5xx, 빈 후보 등 일시 장애
    #[error("추론 백엔드 일시 불가: {0}")]
    ServiceUnavailable(String),

    #[error("추론 호출 {timeout_ms}ms 안에 응답 없음")]
    Timeout { timeout_ms: u64 },

    /// 모델 텍스트에서 제안 JSON을 못 찾음
    #[error("제안 응답 해석 실패: {0}")]
    Parse(String),

    #[error("JSON 처리 실패: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- 카메라/프레임 ---
    #[error("프레임 처리 실패: {0}")]
    Image(String),

    /// 카메라 제어 호출 실패
    #[error("카메라 제어 실패: {0}")]
    Device(String),

    /// 적용기가 지원하지 않는 액션
    #[error("미구현 액션: {0}")]
    NotImplemented(String),

    // --- 설정/기타 ---
    #[error("설정 오류: {0}")]
    Config(String),

    /// 설정값 범위 위반. `field`는 `섹션.필드` 경로
    #[error("유효성 검증 실패: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("파일 입출력 실패: {0}")]
    Io(#[from] std::io::Error),

    #[error("내부 오류: {0}")]
    Internal(String),
}

impl CoreError {
    /// 백엔드 불가로 취급해야 하는 에러인지 (폴백 대상)
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(
            self,
            CoreError::Network(_)
                | CoreError::ServiceUnavailable(_)
                | CoreError::Timeout { .. }
                | CoreError::Parse(_)
                | CoreError::Serialization(_)
        )
    }
}
