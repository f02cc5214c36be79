//! 규칙 기반 폴백 제안.
//!
//! 원격 경로가 쓸 수 없을 때(할당량 소진, 네트워크/파싱 실패, 전부 중복) 사용한다.
//! 디바이스 상태와 (성공한) 프레임 분석만으로 결정적으로 계산되며 결과는 절대 비지 않는다.
//!
//! 1. 분석 기반 규칙: 분석이 성공했을 때만. 발견 순서대로 우선순위 1, 2, 3...
//! 2. 상황 기반 규칙: 첫 번째 일치 규칙 하나 + 보조 제안 하나
//!
//! 두 목록을 합친 뒤 액션 종류로 중복 제거, 우선순위 안정 정렬, `limit`개로 자른다.

use std::collections::HashSet;

use lensmate_core::models::analysis::FrameAnalysis;
use lensmate_core::models::device::{CaptureMode, DeviceState, FlashMode};
use lensmate_core::models::suggestion::{ActionableSuggestion, QuickActionKind};

/// 상황 기반 고줌 경고 기준
const HIGH_ZOOM: f32 = 2.5;
/// 분석 기반 고줌 경고 기준
const VERY_HIGH_ZOOM: f32 = 3.0;
/// 인물 클로즈업 제안 기준 줌
const CLOSE_UP_ZOOM: f32 = 1.2;
/// 매우 어두운 장면 밝기
const VERY_DARK_BRIGHTNESS: f64 = 50.0;
/// 구도 점수 하한
const POOR_COMPOSITION: f64 = 0.3;
/// 수평 기울기 허용치 (도)
const TILT_TOLERANCE_DEG: f64 = 2.0;

/// 폴백 제안 생성 (1개 이상, 최대 `limit`개)
pub fn fallback_suggestions(
    state: &DeviceState,
    analysis: Option<&FrameAnalysis>,
    limit: usize,
) -> Vec<ActionableSuggestion> {
    let mut candidates = match FrameAnalysis::usable(analysis) {
        Some(a) => analysis_rules(state, a),
        None => Vec::new(),
    };
    candidates.extend(contextual_rules(state));

    let mut seen = HashSet::new();
    let mut result: Vec<ActionableSuggestion> = candidates
        .into_iter()
        .filter(|s| seen.insert(s.action))
        .collect();

    result.sort_by_key(|s| s.priority);
    result.truncate(limit.max(1));
    result
}

/// 디바이스 상태만 보는 규칙 (항상 2개)
pub fn contextual_rules(state: &DeviceState) -> Vec<ActionableSuggestion> {
    let flash_off = state.flash_mode == FlashMode::Off;

    let primary = if state.low_light && flash_off {
        ActionableSuggestion::new(
            "Turn on Flash",
            "Dark scene - flash will brighten your photo",
            QuickActionKind::FlashOn,
            "⚡",
            1,
        )
    } else if state.zoom_ratio > HIGH_ZOOM {
        ActionableSuggestion::new(
            "Zoom Out",
            format!("High zoom ({:.1}x) may cause blur", state.zoom_ratio),
            QuickActionKind::ZoomOut,
            "🔍",
            1,
        )
        .with_current(format!("{:.1}x", state.zoom_ratio))
    } else if state.front_camera && state.low_light {
        ActionableSuggestion::new(
            "Switch to Back Camera",
            "Main camera performs better in low light",
            QuickActionKind::SwitchCamera,
            "🔄",
            1,
        )
    } else if !state.grid_enabled {
        ActionableSuggestion::new(
            "Enable Grid",
            "Grid lines help with better composition",
            QuickActionKind::EnableGrid,
            "⊞",
            2,
        )
    } else {
        ActionableSuggestion::new(
            "Hold Steady",
            "Keep phone stable with both hands",
            QuickActionKind::HoldSteady,
            "📱",
            2,
        )
    };

    let secondary = if state.capture_mode != CaptureMode::Night && state.low_light {
        ActionableSuggestion::new(
            "Try Night Mode",
            "Night mode brightens dark scenes",
            QuickActionKind::EnableNight,
            "🌙",
            2,
        )
    } else {
        ActionableSuggestion::new(
            "Focus on Subject",
            "Tap your main subject to focus before shooting",
            QuickActionKind::HoldSteady,
            "🎯",
            2,
        )
    };

    vec![primary, secondary]
}

/// 성공한 분석 수치를 보는 규칙
pub fn analysis_rules(state: &DeviceState, analysis: &FrameAnalysis) -> Vec<ActionableSuggestion> {
    let mut out = Vec::new();
    let mut priority: u8 = 1;
    let mut next = || {
        let p = priority;
        priority = priority.saturating_add(1);
        p
    };
    let flash_off = state.flash_mode == FlashMode::Off;

    if analysis.has_motion_blur {
        out.push(ActionableSuggestion::new(
            "Hold Steady",
            "Motion blur detected - brace your phone",
            QuickActionKind::HoldSteady,
            "📱",
            next(),
        ));
    }

    if analysis.brightness < VERY_DARK_BRIGHTNESS && flash_off {
        out.push(ActionableSuggestion::new(
            "Turn Flash On",
            format!("Too dark ({}/255) - need flash", analysis.brightness as i64),
            QuickActionKind::FlashOn,
            "⚡",
            next(),
        ));
    }

    if analysis.is_underexposed && flash_off {
        out.push(ActionableSuggestion::new(
            "Enable Flash",
            "Image too dark - flash will help",
            QuickActionKind::FlashOn,
            "⚡",
            next(),
        ));
    }

    if analysis.is_overexposed && !flash_off {
        out.push(ActionableSuggestion::new(
            "Reduce Exposure",
            "Image too bright - turn off flash",
            QuickActionKind::FlashOff,
            "☀️",
            next(),
        ));
    }

    if analysis.composition_score < POOR_COMPOSITION && !state.grid_enabled {
        out.push(ActionableSuggestion::new(
            "Move Subject",
            "Place subject on grid lines for better composition",
            QuickActionKind::EnableGrid,
            "📐",
            next(),
        ));
    }

    if analysis.face_count > 0 {
        if analysis.is_backlit {
            out.push(ActionableSuggestion::new(
                "Fix Backlight",
                format!("{} face(s) backlit - move or use flash", analysis.face_count),
                QuickActionKind::FlashOn,
                "👤",
                next(),
            ));
        } else if state.zoom_ratio < CLOSE_UP_ZOOM && analysis.face_count <= 2 {
            out.push(
                ActionableSuggestion::new(
                    "Zoom to 1.5x",
                    format!("Closer framing for {} person(s)", analysis.face_count),
                    QuickActionKind::ZoomIn,
                    "🔍",
                    next(),
                )
                .with_target("1.5x")
                .with_current(format!("{:.1}x", state.zoom_ratio)),
            );
        }
    }

    if state.zoom_ratio > VERY_HIGH_ZOOM {
        out.push(
            ActionableSuggestion::new(
                "Zoom to 2x",
                format!("Current {:.1}x too high - may blur", state.zoom_ratio),
                QuickActionKind::ZoomOut,
                "🔍",
                next(),
            )
            .with_target("2.0x")
            .with_current(format!("{:.1}x", state.zoom_ratio)),
        );
    }

    if analysis.horizon_tilt.abs() > TILT_TOLERANCE_DEG {
        let direction = if analysis.horizon_tilt > 0.0 {
            "right"
        } else {
            "left"
        };
        out.push(ActionableSuggestion::new(
            "Level Horizon",
            format!(
                "Tilt phone {} {}°",
                direction,
                analysis.horizon_tilt.abs() as i64
            ),
            QuickActionKind::HoldSteady,
            "📐",
            next(),
        ));
    }

    out
}
