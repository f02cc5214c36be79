//! 이미지 파일 기반 시뮬레이션 카메라.
//!
//! 실제 카메라 하드웨어 없이 파이프라인을 돌리기 위한 `CameraControl` 구현.
//! 프리뷰는 고정 프레임을 돌려주고, 설정 변경은 메모리 상태에 즉시 반영된다.

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use lensmate_core::error::CoreError;
use lensmate_core::models::device::{
    AspectRatio, CaptureMode, DeviceState, FilterKind, FlashMode, ZoomRange,
};
use lensmate_core::models::frame::Frame;
use lensmate_core::ports::camera_control::CameraControl;

#[derive(Debug)]
struct SimState {
    device: DeviceState,
    stabilization: bool,
    filter: Option<FilterKind>,
}

/// 시뮬레이션 카메라
#[derive(Debug)]
pub struct SimulatedCamera {
    preview: Option<Frame>,
    state: Mutex<SimState>,
}

impl SimulatedCamera {
    pub fn new(preview: Option<Frame>, initial: DeviceState) -> Self {
        Self {
            preview,
            state: Mutex::new(SimState {
                device: initial,
                stabilization: false,
                filter: None,
            }),
        }
    }

    /// 현재 필터 (출력용)
    pub fn filter(&self) -> Option<FilterKind> {
        self.state.lock().filter
    }
}

#[async_trait]
impl CameraControl for SimulatedCamera {
    async fn zoom_ratio(&self) -> Result<f32, CoreError> {
        Ok(self.state.lock().device.zoom_ratio)
    }

    async fn zoom_range(&self) -> Result<ZoomRange, CoreError> {
        Ok(self.state.lock().device.zoom_range)
    }

    async fn set_zoom_ratio(&self, ratio: f32) -> Result<(), CoreError> {
        let mut state = self.state.lock();
        let clamped = state.device.zoom_range.clamp(ratio);
        debug!(ratio = clamped, "시뮬레이션 줌 변경");
        state.device.zoom_ratio = clamped;
        Ok(())
    }

    async fn flash_mode(&self) -> Result<FlashMode, CoreError> {
        Ok(self.state.lock().device.flash_mode)
    }

    async fn set_flash_mode(&self, mode: FlashMode) -> Result<(), CoreError> {
        let mut state = self.state.lock();
        if !state.device.has_flash && mode != FlashMode::Off {
            return Err(CoreError::Device("플래시 없음".to_string()));
        }
        state.device.flash_mode = mode;
        Ok(())
    }

    async fn has_flash(&self) -> Result<bool, CoreError> {
        Ok(self.state.lock().device.has_flash)
    }

    async fn capture_mode(&self) -> Result<CaptureMode, CoreError> {
        Ok(self.state.lock().device.capture_mode)
    }

    async fn set_capture_mode(&self, mode: CaptureMode) -> Result<(), CoreError> {
        self.state.lock().device.capture_mode = mode;
        Ok(())
    }

    async fn grid_enabled(&self) -> Result<bool, CoreError> {
        Ok(self.state.lock().device.grid_enabled)
    }

    async fn set_grid_enabled(&self, enabled: bool) -> Result<(), CoreError> {
        self.state.lock().device.grid_enabled = enabled;
        Ok(())
    }

    async fn stabilization_enabled(&self) -> Result<bool, CoreError> {
        Ok(self.state.lock().stabilization)
    }

    async fn set_stabilization_enabled(&self, enabled: bool) -> Result<(), CoreError> {
        self.state.lock().stabilization = enabled;
        Ok(())
    }

    async fn is_front_camera(&self) -> Result<bool, CoreError> {
        Ok(self.state.lock().device.front_camera)
    }

    async fn flip_camera(&self) -> Result<(), CoreError> {
        let mut state = self.state.lock();
        state.device.front_camera = !state.device.front_camera;
        Ok(())
    }

    async fn aspect_ratio(&self) -> Result<AspectRatio, CoreError> {
        Ok(self.state.lock().device.aspect_ratio)
    }

    async fn set_aspect_ratio(&self, ratio: AspectRatio) -> Result<(), CoreError> {
        self.state.lock().device.aspect_ratio = ratio;
        Ok(())
    }

    async fn apply_filter(&self, filter: FilterKind) -> Result<(), CoreError> {
        self.state.lock().filter = Some(filter);
        Ok(())
    }

    async fn current_filter(&self) -> Result<Option<FilterKind>, CoreError> {
        Ok(self.state.lock().filter)
    }

    async fn capture_preview(&self) -> Result<Option<Frame>, CoreError> {
        Ok(self.preview.clone())
    }

    async fn is_low_light(&self) -> Result<bool, CoreError> {
        Ok(self.state.lock().device.low_light)
    }
}
