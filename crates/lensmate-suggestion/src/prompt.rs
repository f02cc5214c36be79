//! 추론 백엔드 프롬프트 구성.
//!
//! 현재 카메라 설정, 원탭으로 실행 가능한 기능 목록, 프레임 분석 수치를 담고
//! `{"suggestions": [...]}` 형식의 JSON 응답을 요청한다.

use lensmate_core::models::analysis::FrameAnalysis;
use lensmate_core::models::device::DeviceState;

/// 프롬프트에 싣는 장면 유형
///
/// 분석이 없거나 실패했으면 밝기/얼굴 기반 판정을 하지 않고 GENERAL.
pub fn scene_type(state: &DeviceState, analysis: Option<&FrameAnalysis>) -> &'static str {
    if state.front_camera {
        return "SELFIE";
    }
    let Some(a) = FrameAnalysis::usable(analysis) else {
        return "GENERAL";
    };

    match a.face_count {
        n if n > 1 => "GROUP PHOTO",
        1 => "PORTRAIT",
        _ if a.brightness < 60.0 => "LOW LIGHT",
        _ if a.brightness > 160.0 => "OUTDOOR/BRIGHT",
        _ => "GENERAL",
    }
}

/// 노출 상태 설명
pub fn exposure_context(analysis: Option<&FrameAnalysis>) -> &'static str {
    match FrameAnalysis::usable(analysis) {
        Some(a) if a.is_overexposed => "OVEREXPOSED (too bright)",
        Some(a) if a.is_underexposed => "UNDEREXPOSED (too dark)",
        Some(_) => "BALANCED",
        None => "UNKNOWN",
    }
}

/// 실행 가능한 제안 요청 프롬프트
///
/// 분석이 없거나 실패한 경우 수치 대신 "Unknown"을 싣는다.
pub fn build_prompt(state: &DeviceState, analysis: Option<&FrameAnalysis>) -> String {
    let analysis = FrameAnalysis::usable(analysis);

    let camera = if state.front_camera {
        "Front (selfie)"
    } else {
        "Main camera"
    };
    let grid = if state.grid_enabled { "ON" } else { "OFF" };
    let unknown = || "Unknown".to_string();
    let brightness = analysis
        .map(|a| format!("{}/255", a.brightness as i64))
        .unwrap_or_else(unknown);
    let faces = analysis
        .map(|a| a.face_count.to_string())
        .unwrap_or_else(unknown);
    let sharpness = match analysis {
        Some(a) if a.has_motion_blur => "Blurry",
        Some(_) => "Sharp",
        None => "Unknown",
    };

    format!(
        r#"You're a friendly photography buddy helping someone take better photos. Look at this image and give casual, encouraging advice like you're standing right next to them.

CURRENT CAMERA SETTINGS:
- Camera: {camera}
- Zoom: {zoom:.1}x
- Flash: {flash}
- Mode: {mode}
- Grid: {grid}
- Aspect ratio: {aspect}
AVAILABLE ONE-TAP FEATURES:
- Flash (ON/OFF/AUTO)
- Zoom (IN/OUT to specific levels)
- Night Mode (ENABLE/DISABLE)
- Portrait Mode (ENABLE/DISABLE)
- Grid Lines (ENABLE/DISABLE)
- Camera Switch (FRONT/BACK)

MANDATORY: You MUST include at least 2 phone-controlled suggestions from the available features above, plus 1-2 user movement suggestions.

TECHNICAL ANALYSIS:
- Scene: {scene}
- Exposure: {exposure}
- Brightness: {brightness}
- Faces: {faces}
- Sharpness: {sharpness}

Act like you're standing next to someone teaching them photography. Use natural language like:
- "Try tilting your phone slightly to the left"
- "The lighting looks harsh - step into some shade"
- "Great! Now zoom out a bit for better framing"
- "Hold the phone steadier - I can see some shake"

Focus on what you actually SEE in the image, not just the technical data.

Return ONLY this JSON format:
{{
  "suggestions": [
    {{
      "title": "Natural instruction (like 'Move closer to your subject')",
      "description": "Friendly explanation why (like 'This will make them the focus of the shot')",
      "action": "SPECIFIC_ACTION",
      "action_value": "target_value",
      "priority": 1,
      "icon": "📱"
    }},
    {{
      "title": "Enable Grid Lines",
      "description": "Grid helps align your subject better",
      "action": "GRID_ON",
      "action_value": "ON",
      "priority": 2,
      "icon": "⊞"
    }},
    {{
      "title": "Move 2 Steps Back",
      "description": "Get more of the scene in frame",
      "action": "MOVE_BACK",
      "action_value": "2_steps",
      "priority": 3,
      "icon": "🚶"
    }}
  ]
}}
IMPORTANT: Always suggest at least 2 actions from this list: FLASH_ON, FLASH_OFF, ZOOM_IN, ZOOM_OUT, ENABLE_NIGHT, ENABLE_PORTRAIT, GRID_ON, SWITCH_CAMERA, RATIO_16_9
Give me 3-4 suggestions based on what you see in the actual image.
"#,
        camera = camera,
        zoom = state.zoom_ratio,
        flash = state.flash_mode.label(),
        mode = state.capture_mode.label(),
        grid = grid,
        aspect = state.aspect_ratio.label(),
        scene = scene_type(state, analysis),
        exposure = exposure_context(analysis),
        brightness = brightness,
        faces = faces,
        sharpness = sharpness,
    )
}
