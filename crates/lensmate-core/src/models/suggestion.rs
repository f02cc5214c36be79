//! 실행 가능한 제안 모델.
//!
//! 모든 제안은 정확히 하나의 `QuickActionKind`를 가진다.
//! 백엔드 텍스트에서 온 액션 문자열은 전사 함수로 매핑되며,
//! 알 수 없는 값은 버리지 않고 `HoldSteady`로 강등한다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::device::{AspectRatio, FilterKind};

/// 원탭 실행 액션 종류 (닫힌 열거형)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuickActionKind {
    FlashOn,
    FlashOff,
    ZoomIn,
    ZoomOut,
    SwitchCamera,
    EnableNight,
    DisableNight,
    HoldSteady,
    MoveCloser,
    MoveBack,
    EnableGrid,
    EnablePortrait,
    EnableStabilization,
    ApplyWarmFilter,
    ApplyCoolFilter,
    ApplyVividFilter,
    ApplyBwFilter,
    #[serde(rename = "RATIO_16_9")]
    Ratio16x9,
    #[serde(rename = "RATIO_4_3")]
    Ratio4x3,
    #[serde(rename = "RATIO_1_1")]
    Ratio1x1,
    RatioFull,
}

impl QuickActionKind {
    /// 백엔드 액션 문자열 → 액션 종류 (대소문자 무시, 기본값 `HoldSteady`)
    pub fn from_action_str(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "FLASH_ON" => Self::FlashOn,
            "FLASH_OFF" => Self::FlashOff,
            "ZOOM_IN" => Self::ZoomIn,
            "ZOOM_OUT" => Self::ZoomOut,
            "SWITCH_CAMERA" => Self::SwitchCamera,
            "ENABLE_NIGHT" | "NIGHT_MODE" => Self::EnableNight,
            "DISABLE_NIGHT" => Self::DisableNight,
            "MOVE_CLOSER" => Self::MoveCloser,
            "MOVE_BACK" => Self::MoveBack,
            "ENABLE_GRID" | "GRID_ON" => Self::EnableGrid,
            "ENABLE_PORTRAIT" | "PORTRAIT_MODE" => Self::EnablePortrait,
            "ENABLE_STABILIZATION" | "STABILIZATION_ON" => Self::EnableStabilization,
            "APPLY_WARM_FILTER" | "FILTER_WARM" => Self::ApplyWarmFilter,
            "APPLY_COOL_FILTER" | "FILTER_COOL" => Self::ApplyCoolFilter,
            "APPLY_VIVID_FILTER" | "FILTER_VIVID" => Self::ApplyVividFilter,
            "APPLY_BW_FILTER" | "FILTER_BW" => Self::ApplyBwFilter,
            "RATIO_16_9" => Self::Ratio16x9,
            "RATIO_4_3" => Self::Ratio4x3,
            "RATIO_1_1" => Self::Ratio1x1,
            "RATIO_FULL" => Self::RatioFull,
            _ => Self::HoldSteady,
        }
    }

    /// 와이어 표현 (`FLASH_ON` 등)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FlashOn => "FLASH_ON",
            Self::FlashOff => "FLASH_OFF",
            Self::ZoomIn => "ZOOM_IN",
            Self::ZoomOut => "ZOOM_OUT",
            Self::SwitchCamera => "SWITCH_CAMERA",
            Self::EnableNight => "ENABLE_NIGHT",
            Self::DisableNight => "DISABLE_NIGHT",
            Self::HoldSteady => "HOLD_STEADY",
            Self::MoveCloser => "MOVE_CLOSER",
            Self::MoveBack => "MOVE_BACK",
            Self::EnableGrid => "ENABLE_GRID",
            Self::EnablePortrait => "ENABLE_PORTRAIT",
            Self::EnableStabilization => "ENABLE_STABILIZATION",
            Self::ApplyWarmFilter => "APPLY_WARM_FILTER",
            Self::ApplyCoolFilter => "APPLY_COOL_FILTER",
            Self::ApplyVividFilter => "APPLY_VIVID_FILTER",
            Self::ApplyBwFilter => "APPLY_BW_FILTER",
            Self::Ratio16x9 => "RATIO_16_9",
            Self::Ratio4x3 => "RATIO_4_3",
            Self::Ratio1x1 => "RATIO_1_1",
            Self::RatioFull => "RATIO_FULL",
        }
    }

    /// 사람이 읽는 짧은 라벨 (제목 누락 시 대체 제목으로 사용)
    pub fn label(&self) -> &'static str {
        match self {
            Self::FlashOn => "Turn Flash On",
            Self::FlashOff => "Turn Flash Off",
            Self::ZoomIn => "Zoom In",
            Self::ZoomOut => "Zoom Out",
            Self::SwitchCamera => "Switch Camera",
            Self::EnableNight => "Try Night Mode",
            Self::DisableNight => "Turn Off Night Mode",
            Self::HoldSteady => "Hold Steady",
            Self::MoveCloser => "Move Closer",
            Self::MoveBack => "Step Back",
            Self::EnableGrid => "Enable Grid",
            Self::EnablePortrait => "Portrait Mode",
            Self::EnableStabilization => "Enable Stabilization",
            Self::ApplyWarmFilter => "Warm Filter",
            Self::ApplyCoolFilter => "Cool Filter",
            Self::ApplyVividFilter => "Vivid Filter",
            Self::ApplyBwFilter => "B&W Filter",
            Self::Ratio16x9 => "Try 9:16 Ratio",
            Self::Ratio4x3 => "Try 3:4 Ratio",
            Self::Ratio1x1 => "Try 1:1 Ratio",
            Self::RatioFull => "Full Screen Ratio",
        }
    }

    /// 비율 변경 액션이면 대상 비율
    pub fn target_aspect(&self) -> Option<AspectRatio> {
        match self {
            Self::Ratio16x9 => Some(AspectRatio::Ratio16x9),
            Self::Ratio4x3 => Some(AspectRatio::Ratio4x3),
            Self::Ratio1x1 => Some(AspectRatio::Ratio1x1),
            Self::RatioFull => Some(AspectRatio::Full),
            _ => None,
        }
    }

    /// 필터 적용 액션이면 대상 필터
    pub fn target_filter(&self) -> Option<FilterKind> {
        match self {
            Self::ApplyWarmFilter => Some(FilterKind::Warm),
            Self::ApplyCoolFilter => Some(FilterKind::Cool),
            Self::ApplyVividFilter => Some(FilterKind::Vivid),
            Self::ApplyBwFilter => Some(FilterKind::BlackWhite),
            _ => None,
        }
    }
}

impl std::fmt::Display for QuickActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 제안 아이콘. 표시 시점에만 해석된다
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SuggestionIcon {
    /// 텍스트 글리프 (이모지 등)
    Glyph(String),
    /// 벡터 리소스 식별자
    Vector(String),
}

impl SuggestionIcon {
    /// 글리프 아이콘
    pub fn glyph(text: impl Into<String>) -> Self {
        SuggestionIcon::Glyph(text.into())
    }
}

impl Default for SuggestionIcon {
    fn default() -> Self {
        SuggestionIcon::Glyph("💡".to_string())
    }
}

/// 실행 가능한 제안
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionableSuggestion {
    /// 제목 (중복 제거 키)
    pub title: String,
    /// 설명
    pub description: String,
    /// 실행 액션
    pub action: QuickActionKind,
    /// 아이콘
    pub icon: SuggestionIcon,
    /// 우선순위 (1 = 가장 높음)
    pub priority: u8,
    /// 목표 값 (예: "1.5x", "9:16")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_value: Option<String>,
    /// 현재 값
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<String>,
}

impl ActionableSuggestion {
    /// 글리프 아이콘으로 제안 생성
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        action: QuickActionKind,
        glyph: &str,
        priority: u8,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            action,
            icon: SuggestionIcon::glyph(glyph),
            priority,
            target_value: None,
            current_value: None,
        }
    }

    /// 목표 값 지정
    pub fn with_target(mut self, value: impl Into<String>) -> Self {
        self.target_value = Some(value.into());
        self
    }

    /// 현재 값 지정
    pub fn with_current(mut self, value: impl Into<String>) -> Self {
        self.current_value = Some(value.into());
        self
    }
}

/// 교육 모드에서 리스너로 전달되는 팁
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationTip {
    /// 제목
    pub title: String,
    /// 본문
    pub message: String,
    /// 생성 시각
    pub timestamp: DateTime<Utc>,
}

impl EducationTip {
    /// 파이프라인이 아무것도 못 줄 때의 정적 팁
    pub fn static_tip() -> Self {
        Self {
            title: "📚 Photography Tip".to_string(),
            message: "Focus on good lighting and composition for better photos".to_string(),
            timestamp: Utc::now(),
        }
    }

    /// 실행 가능한 제안에서 팁 생성
    pub fn from_suggestion(suggestion: &ActionableSuggestion) -> Self {
        Self {
            title: format!("🤖 {}", suggestion.title),
            message: suggestion.description.clone(),
            timestamp: Utc::now(),
        }
    }
}
