//! 장면 분석 결과 모델.
//!
//! 프레임 한 장당 한 번 생성되는 불변 값 객체.
//! `analysis_success == false`인 결과는 "사용 가능한 장면 데이터 없음"으로 취급해야 하며,
//! 실제로 어둡거나 흐린 프레임으로 해석해서는 안 된다.

use serde::{Deserialize, Serialize};

/// 색 균형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorBalance {
    Warm,
    Cool,
    Balanced,
    #[default]
    Neutral,
}

/// 배경 복잡도 (엣지 픽셀 비율 기반)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackgroundType {
    #[default]
    Clean,
    Busy,
    Cluttered,
}

/// 대비 수준
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContrastLevel {
    Low,
    #[default]
    Normal,
    High,
}

/// 밝기/얼굴 수로 추정한 장면 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SceneContext {
    OutdoorLandscape,
    OutdoorPortrait,
    IndoorPortrait,
    LowLightScene,
    GroupPhoto,
    #[default]
    GeneralPhoto,
}

impl SceneContext {
    /// 밝기와 얼굴 수로 장면 유형 분류 (첫 번째 일치 규칙 우선)
    pub fn classify(brightness: f64, face_count: u32) -> Self {
        match () {
            _ if brightness > 160.0 && face_count == 0 => Self::OutdoorLandscape,
            _ if brightness > 140.0 && face_count > 0 => Self::OutdoorPortrait,
            _ if brightness < 80.0 && face_count > 0 => Self::IndoorPortrait,
            _ if brightness < 60.0 => Self::LowLightScene,
            _ if face_count > 2 => Self::GroupPhoto,
            _ => Self::GeneralPhoto,
        }
    }
}

/// 프레임 장면 분석 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    /// 그레이스케일 평균 밝기 (0 ~ 255)
    pub brightness: f64,
    /// 라플라시안 분산 (높을수록 선명)
    pub blur_level: f64,
    /// 검출된 얼굴 수
    pub face_count: u32,
    /// 역광 여부 (상단 배경이 중앙보다 임계값 이상 밝음)
    pub is_backlit: bool,
    /// 흔들림 여부 (`blur_level` < 임계값)
    pub has_motion_blur: bool,
    /// 3분할 교차점 주변 엣지 밀도 (0 ~ 1)
    pub composition_score: f64,
    /// 수평선 기울기 (도), 검출 실패 시 0
    pub horizon_tilt: f64,
    /// 중앙 영역에 피사체가 있는지
    pub subject_centered: bool,
    /// 히스토그램 255 구간 비율 초과
    pub is_overexposed: bool,
    /// 히스토그램 0 구간 비율 초과
    pub is_underexposed: bool,
    /// 엣지 맵 모멘트 중심 X (0 ~ 1)
    pub subject_position_x: f64,
    /// 엣지 맵 모멘트 중심 Y (0 ~ 1)
    pub subject_position_y: f64,
    /// 히스토그램 평균
    pub dynamic_range: f64,
    /// 색 균형
    pub color_balance: ColorBalance,
    /// 배경 복잡도
    pub background_type: BackgroundType,
    /// 3분할 점수 (0 ~ 1)
    pub rule_of_thirds_score: f64,
    /// 대비 수준
    pub contrast_level: ContrastLevel,
    /// 노이즈 수준 (가우시안 블러와의 평균 절대 차이)
    pub noise_level: f64,
    /// 장면 유형
    pub scene_context: SceneContext,
    /// 분석 성공 여부. false면 나머지 필드는 의미 없음
    pub analysis_success: bool,
}

impl FrameAnalysis {
    /// 분석 실패 결과 (밝기 0, 블러 0. 중립값 아님)
    pub fn failed() -> Self {
        Self {
            brightness: 0.0,
            blur_level: 0.0,
            face_count: 0,
            is_backlit: false,
            has_motion_blur: false,
            composition_score: 0.0,
            horizon_tilt: 0.0,
            subject_centered: false,
            is_overexposed: false,
            is_underexposed: false,
            subject_position_x: 0.5,
            subject_position_y: 0.5,
            dynamic_range: 0.0,
            color_balance: ColorBalance::Neutral,
            background_type: BackgroundType::Clean,
            rule_of_thirds_score: 0.0,
            contrast_level: ContrastLevel::Normal,
            noise_level: 0.0,
            scene_context: SceneContext::GeneralPhoto,
            analysis_success: false,
        }
    }

    /// 신뢰 가능한 분석만 통과시킨다
    pub fn usable(analysis: Option<&FrameAnalysis>) -> Option<&FrameAnalysis> {
        analysis.filter(|a| a.analysis_success)
    }
}

impl Default for FrameAnalysis {
    fn default() -> Self {
        Self::failed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_analysis_uses_zero_defaults() {
        let a = FrameAnalysis::failed();
        assert!(!a.analysis_success);
        assert_eq!(a.brightness, 0.0);
        assert_eq!(a.blur_level, 0.0);
        assert_eq!(a.face_count, 0);
    }

    #[test]
    fn usable_filters_failed_analysis() {
        let failed = FrameAnalysis::failed();
        assert!(FrameAnalysis::usable(Some(&failed)).is_none());

        let ok = FrameAnalysis {
            analysis_success: true,
            ..FrameAnalysis::failed()
        };
        assert!(FrameAnalysis::usable(Some(&ok)).is_some());
        assert!(FrameAnalysis::usable(None).is_none());
    }

    #[test]
    fn scene_context_rules() {
        assert_eq!(SceneContext::classify(200.0, 0), SceneContext::OutdoorLandscape);
        assert_eq!(SceneContext::classify(150.0, 1), SceneContext::OutdoorPortrait);
        assert_eq!(SceneContext::classify(70.0, 2), SceneContext::IndoorPortrait);
        assert_eq!(SceneContext::classify(40.0, 0), SceneContext::LowLightScene);
        assert_eq!(SceneContext::classify(100.0, 4), SceneContext::GroupPhoto);
        assert_eq!(SceneContext::classify(100.0, 0), SceneContext::GeneralPhoto);
    }

    #[test]
    fn enums_serialize_screaming_case() {
        let json = serde_json::to_string(&ColorBalance::Warm).unwrap();
        assert_eq!(json, "\"WARM\"");
        let json = serde_json::to_string(&SceneContext::LowLightScene).unwrap();
        assert_eq!(json, "\"LOW_LIGHT_SCENE\"");
    }
}
