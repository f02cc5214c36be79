//! 콘솔 출력.
//!
//! 아이콘 종류(글리프/벡터)는 여기서만 해석한다.

use std::collections::HashMap;

use lensmate_core::models::analysis::FrameAnalysis;
use lensmate_core::models::suggestion::{
    ActionableSuggestion, EducationTip, QuickActionKind, SuggestionIcon,
};
use lensmate_core::ports::listener::SuggestionListener;

/// 아이콘 표시 문자열
pub fn icon_text(icon: &SuggestionIcon) -> String {
    match icon {
        SuggestionIcon::Glyph(glyph) => glyph.clone(),
        SuggestionIcon::Vector(id) => format!("[{id}]"),
    }
}

/// 제안 한 줄 표시
pub fn format_suggestion(index: usize, s: &ActionableSuggestion) -> String {
    let mut line = format!(
        "{}. {} {} - {} [{}, P{}]",
        index + 1,
        icon_text(&s.icon),
        s.title,
        s.description,
        s.action,
        s.priority
    );
    if let Some(target) = &s.target_value {
        line.push_str(&format!(" → {target}"));
    }
    line
}

/// 분석 요약 출력
pub fn print_analysis(analysis: &FrameAnalysis) {
    if !analysis.analysis_success {
        println!("장면 분석: 사용 가능한 데이터 없음");
        return;
    }
    println!("장면 분석:");
    println!(
        "  밝기 {:.0}/255, 선명도 {:.0}{}",
        analysis.brightness,
        analysis.blur_level,
        if analysis.has_motion_blur {
            " (흔들림)"
        } else {
            ""
        }
    );
    println!(
        "  얼굴 {}, 역광 {}, 노출 과다 {}, 노출 부족 {}",
        analysis.face_count, analysis.is_backlit, analysis.is_overexposed, analysis.is_underexposed
    );
    println!(
        "  구도 {:.2}, 3분할 {:.2}, 수평 {:.1}°, 피사체 ({:.2}, {:.2})",
        analysis.composition_score,
        analysis.rule_of_thirds_score,
        analysis.horizon_tilt,
        analysis.subject_position_x,
        analysis.subject_position_y
    );
    println!(
        "  색상 {:?}, 배경 {:?}, 대비 {:?}, 노이즈 {:.1}, 장면 {:?}",
        analysis.color_balance,
        analysis.background_type,
        analysis.contrast_level,
        analysis.noise_level,
        analysis.scene_context
    );
}

/// 제안 목록 출력
pub fn print_suggestions(suggestions: &[ActionableSuggestion]) {
    if suggestions.is_empty() {
        println!("제안 없음 (잠시 후 다시 시도)");
        return;
    }
    println!("제안:");
    for (i, s) in suggestions.iter().enumerate() {
        println!("  {}", format_suggestion(i, s));
    }
}

/// 콘솔 리스너
pub struct ConsoleListener;

impl SuggestionListener for ConsoleListener {
    fn on_suggestion(&self, tip: EducationTip) {
        println!(
            "[{}] {}: {}",
            tip.timestamp.format("%H:%M:%S"),
            tip.title,
            tip.message
        );
    }

    fn on_batch_applied(&self, message: &str, outcomes: &HashMap<QuickActionKind, bool>) {
        let ok = outcomes.values().filter(|v| **v).count();
        println!("적용 결과 ({}/{}): {}", ok, outcomes.len(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_icons_are_bracketed() {
        assert_eq!(icon_text(&SuggestionIcon::glyph("⚡")), "⚡");
        assert_eq!(
            icon_text(&SuggestionIcon::Vector("ic_grid".into())),
            "[ic_grid]"
        );
    }

    #[test]
    fn suggestion_line_includes_action_and_target() {
        let s = ActionableSuggestion::new("Zoom to 1.5x", "closer", QuickActionKind::ZoomIn, "🔍", 2)
            .with_target("1.5x");
        assert_eq!(
            format_suggestion(0, &s),
            "1. 🔍 Zoom to 1.5x - closer [ZOOM_IN, P2] → 1.5x"
        );
    }
}
