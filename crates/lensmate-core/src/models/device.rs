//! 카메라 디바이스 상태 스냅샷.
//!
//! 코어는 카메라 하드웨어 상태를 소유하지 않는다.
//! 요청마다 `CameraControl`로부터 읽어온 읽기 전용 스냅샷만 다룬다.

use serde::{Deserialize, Serialize};

/// 플래시 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlashMode {
    #[default]
    Off,
    On,
    Auto,
}

impl FlashMode {
    /// 프롬프트 표시용 라벨
    pub fn label(&self) -> &'static str {
        match self {
            FlashMode::Off => "OFF",
            FlashMode::On => "ON",
            FlashMode::Auto => "AUTO",
        }
    }
}

/// 촬영 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaptureMode {
    #[default]
    Photo,
    Video,
    Portrait,
    Night,
}

impl CaptureMode {
    pub fn label(&self) -> &'static str {
        match self {
            CaptureMode::Photo => "PHOTO",
            CaptureMode::Video => "VIDEO",
            CaptureMode::Portrait => "PORTRAIT",
            CaptureMode::Night => "NIGHT",
        }
    }
}

/// 화면 비율
///
/// 라벨은 세로 방향 기준 (`Ratio16x9` → "9:16").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AspectRatio {
    #[serde(rename = "RATIO_16_9")]
    Ratio16x9,
    #[default]
    #[serde(rename = "RATIO_4_3")]
    Ratio4x3,
    #[serde(rename = "RATIO_1_1")]
    Ratio1x1,
    Full,
}

impl AspectRatio {
    /// 표시 라벨
    pub fn label(&self) -> &'static str {
        match self {
            AspectRatio::Ratio16x9 => "9:16",
            AspectRatio::Ratio4x3 => "3:4",
            AspectRatio::Ratio1x1 => "1:1",
            AspectRatio::Full => "FULL",
        }
    }

    /// 라벨 → 비율 (알 수 없는 라벨은 None)
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "9:16" | "16:9" => Some(AspectRatio::Ratio16x9),
            "3:4" | "4:3" => Some(AspectRatio::Ratio4x3),
            "1:1" => Some(AspectRatio::Ratio1x1),
            "FULL" => Some(AspectRatio::Full),
            _ => None,
        }
    }
}

/// 필터 종류 (픽셀 변환 자체는 카메라 측 책임)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterKind {
    Warm,
    Cool,
    Vivid,
    BlackWhite,
}

impl FilterKind {
    pub fn label(&self) -> &'static str {
        match self {
            FilterKind::Warm => "Warm",
            FilterKind::Cool => "Cool",
            FilterKind::Vivid => "Vivid",
            FilterKind::BlackWhite => "B&W",
        }
    }
}

/// 줌 범위
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRange {
    /// 최소 줌 배율
    pub min: f32,
    /// 최대 줌 배율
    pub max: f32,
}

impl ZoomRange {
    /// 범위 내로 클램프
    pub fn clamp(&self, ratio: f32) -> f32 {
        ratio.max(self.min).min(self.max)
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self { min: 1.0, max: 10.0 }
    }
}

/// 현재 카메라 설정 스냅샷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    /// 현재 줌 배율
    pub zoom_ratio: f32,
    /// 줌 범위
    pub zoom_range: ZoomRange,
    /// 플래시 모드
    pub flash_mode: FlashMode,
    /// 촬영 모드
    pub capture_mode: CaptureMode,
    /// 격자 표시 여부
    pub grid_enabled: bool,
    /// 전면 카메라 사용 여부
    pub front_camera: bool,
    /// 화면 비율
    pub aspect_ratio: AspectRatio,
    /// 저조도 여부 (노출 보정값에서 유도)
    pub low_light: bool,
    /// 플래시 유닛 존재 여부
    pub has_flash: bool,
}

impl DeviceState {
    /// 노출 보정 인덱스로 저조도 판정
    pub fn low_light_from_exposure(exposure_index: i32) -> bool {
        exposure_index < -2
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            zoom_ratio: 1.0,
            zoom_range: ZoomRange::default(),
            flash_mode: FlashMode::Off,
            capture_mode: CaptureMode::Photo,
            grid_enabled: false,
            front_camera: false,
            aspect_ratio: AspectRatio::Ratio4x3,
            low_light: false,
            has_flash: true,
        }
    }
}
