//! 얼굴 검출 포트.
//!
//! 검출기는 느리거나 멈출 수 있으므로 호출 측(`SceneAnalyzer`)이
//! 타임아웃을 걸고, 실패/타임아웃은 0명으로 취급한다.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::frame::Frame;

/// 얼굴 검출기
#[async_trait]
pub trait FaceDetector: Send + Sync {
    /// 프레임 내 얼굴 수
    async fn count_faces(&self, frame: &Frame) -> Result<u32, CoreError>;
}

/// 항상 0명을 반환하는 검출기 (검출 리소스가 없는 환경용)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFaceDetector;

#[async_trait]
impl FaceDetector for NoFaceDetector {
    async fn count_faces(&self, _frame: &Frame) -> Result<u32, CoreError> {
        Ok(0)
    }
}
