//! 통합 테스트 공용 목(mock).

#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;

use lensmate_core::error::CoreError;
use lensmate_core::models::device::{
    AspectRatio, CaptureMode, DeviceState, FilterKind, FlashMode, ZoomRange,
};
use lensmate_core::models::frame::Frame;
use lensmate_core::ports::camera_control::CameraControl;
use lensmate_core::ports::clock::Clock;
use lensmate_core::ports::reasoning::{ReasoningBackend, ReasoningRequest};

// ============================================================
// 카메라
// ============================================================

#[derive(Debug)]
struct CameraState {
    device: DeviceState,
    stabilization: bool,
    filter: Option<FilterKind>,
}

/// 메모리 상태만 바꾸는 카메라
#[derive(Debug)]
pub struct MockCamera {
    preview: Mutex<Option<Frame>>,
    state: Mutex<CameraState>,
}

impl MockCamera {
    pub fn new(device: DeviceState) -> Self {
        Self {
            preview: Mutex::new(None),
            state: Mutex::new(CameraState {
                device,
                stabilization: false,
                filter: None,
            }),
        }
    }

    pub fn with_preview(self, frame: Frame) -> Self {
        *self.preview.lock() = Some(frame);
        self
    }

    pub fn device(&self) -> DeviceState {
        self.state.lock().device.clone()
    }

    pub fn filter(&self) -> Option<FilterKind> {
        self.state.lock().filter
    }
}

#[async_trait]
impl CameraControl for MockCamera {
    async fn zoom_ratio(&self) -> Result<f32, CoreError> {
        Ok(self.state.lock().device.zoom_ratio)
    }

    async fn zoom_range(&self) -> Result<ZoomRange, CoreError> {
        Ok(self.state.lock().device.zoom_range)
    }

    async fn set_zoom_ratio(&self, ratio: f32) -> Result<(), CoreError> {
        self.state.lock().device.zoom_ratio = ratio;
        Ok(())
    }

    async fn flash_mode(&self) -> Result<FlashMode, CoreError> {
        Ok(self.state.lock().device.flash_mode)
    }

    async fn set_flash_mode(&self, mode: FlashMode) -> Result<(), CoreError> {
        self.state.lock().device.flash_mode = mode;
        Ok(())
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
        Ok(self.preview.lock().clone())
    }

    async fn is_low_light(&self) -> Result<bool, CoreError> {
        Ok(self.state.lock().device.low_light)
    }
}

// ============================================================
// 시계
// ============================================================

/// 수동 시계
pub struct ManualClock {
    now_ms: AtomicI64,
    day: Mutex<NaiveDate>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now_ms: AtomicI64::new(5_000_000),
            day: Mutex::new(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()),
        }
    }

    pub fn advance(&self, ms: i64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn next_day(&self) {
        let mut day = self.day.lock();
        *day = day.succ_opt().unwrap();
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn today(&self) -> NaiveDate {
        *self.day.lock()
    }
}

// ============================================================
// 추론 백엔드
// ============================================================

/// 고정 응답 백엔드. `None`이면 사용 불가 에러
pub struct ScriptedBackend {
    reply: Option<String>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ReasoningRequest>>,
}

impl ScriptedBackend {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Some(text.into()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ReasoningRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl ReasoningBackend for ScriptedBackend {
    async fn generate(&self, request: &ReasoningRequest) -> Result<String, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());
        self.reply
            .clone()
            .ok_or_else(|| CoreError::ServiceUnavailable("scripted outage".to_string()))
    }

    fn backend_name(&self) -> &str {
        "scripted"
    }
}

/// 제안 응답 JSON (action, title 쌍)
pub fn suggestions_json(items: &[(&str, &str)]) -> String {
    let body: Vec<String> = items
        .iter()
        .enumerate()
        .map(|(i, (action, title))| {
            format!(
                r#"{{"title":"{title}","description":"from backend","action":"{action}","icon":"✨","priority":{}}}"#,
                i + 1
            )
        })
        .collect();
    format!(r#"{{"suggestions":[{}]}}"#, body.join(","))
}

/// 8px 체커보드 프레임 (가장자리가 많아 선명하게 분석됨)
pub fn checker_frame(width: u32, height: u32) -> Frame {
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let v = if (x / 8 + y / 8) % 2 == 0 { 200 } else { 60 };
            rgba.extend_from_slice(&[v, v, v, 255]);
        }
    }
    Frame::from_rgba(width, height, rgba).unwrap()
}
