//! 카메라 제어 포트.
//!
//! 실제 하드웨어 바인딩은 플랫폼 측 책임이다.
//! 코어는 상태를 조회하고 변경을 요청할 뿐, 카메라 상태를 소유하지 않는다.
//! 구현체는 호출이 반환된 뒤 조회 메서드가 새 상태를 보고해야 한다
//! (모드 전환처럼 시간이 걸리는 변경은 settle 지연 후).

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::device::{AspectRatio, CaptureMode, DeviceState, FilterKind, FlashMode, ZoomRange};
use crate::models::frame::Frame;

/// 카메라 제어 인터페이스
#[async_trait]
pub trait CameraControl: Send + Sync {
    // ── 줌 ──

    /// 현재 줌 배율
    async fn zoom_ratio(&self) -> Result<f32, CoreError>;

    /// 지원 줌 범위
    async fn zoom_range(&self) -> Result<ZoomRange, CoreError>;

    /// 줌 배율 설정 요청
    async fn set_zoom_ratio(&self, ratio: f32) -> Result<(), CoreError>;

    // ── 플래시 ──

    async fn flash_mode(&self) -> Result<FlashMode, CoreError>;

    async fn set_flash_mode(&self, mode: FlashMode) -> Result<(), CoreError>;

    /// 플래시 유닛 존재 여부
    async fn has_flash(&self) -> Result<bool, CoreError> {
        Ok(true)
    }

    // ── 촬영 모드 ──

    async fn capture_mode(&self) -> Result<CaptureMode, CoreError>;

    /// 모드 전환 요청 (완료까지 settle 시간이 필요할 수 있음)
    async fn set_capture_mode(&self, mode: CaptureMode) -> Result<(), CoreError>;

    // ── 토글 ──

    async fn grid_enabled(&self) -> Result<bool, CoreError>;

    async fn set_grid_enabled(&self, enabled: bool) -> Result<(), CoreError>;

    async fn stabilization_enabled(&self) -> Result<bool, CoreError>;

    async fn set_stabilization_enabled(&self, enabled: bool) -> Result<(), CoreError>;

    // ── 렌즈/비율/필터 ──

    async fn is_front_camera(&self) -> Result<bool, CoreError>;

    /// 전면/후면 전환
    async fn flip_camera(&self) -> Result<(), CoreError>;

    async fn aspect_ratio(&self) -> Result<AspectRatio, CoreError>;

    async fn set_aspect_ratio(&self, ratio: AspectRatio) -> Result<(), CoreError>;

    /// 필터 적용 요청 (픽셀 변환은 구현체 몫)
    async fn apply_filter(&self, filter: FilterKind) -> Result<(), CoreError>;

    /// 현재 적용된 필터 (없으면 None)
    async fn current_filter(&self) -> Result<Option<FilterKind>, CoreError>;

    // ── 프리뷰/센서 ──

    /// 현재 프리뷰 한 장 캡처 (프리뷰 미준비 시 None)
    async fn capture_preview(&self) -> Result<Option<Frame>, CoreError>;

    /// 저조도 여부
    async fn is_low_light(&self) -> Result<bool, CoreError>;

    /// 현재 상태 스냅샷 조회
    async fn snapshot(&self) -> Result<DeviceState, CoreError> {
        Ok(DeviceState {
            zoom_ratio: self.zoom_ratio().await?,
            zoom_range: self.zoom_range().await?,
            flash_mode: self.flash_mode().await?,
            capture_mode: self.capture_mode().await?,
            grid_enabled: self.grid_enabled().await?,
            front_camera: self.is_front_camera().await?,
            aspect_ratio: self.aspect_ratio().await?,
            low_light: self.is_low_light().await?,
            has_flash: self.has_flash().await?,
        })
    }
}
