//! 장면 분석기 (FeatureExtractor).
//!
//! 프리뷰 프레임 한 장에서 `FrameAnalysis`를 만든다. 호출자에게 에러를 올리지 않는다.
//!
//! - 프레임 없음/디코딩 실패/작업 패닉 → `FrameAnalysis::failed()`
//! - 개별 지표 실패 → 해당 지표만 내부 대체값으로 채우고 나머지는 계속
//! - 얼굴 검출은 타임아웃을 걸고 지표 계산과 병렬로 수행, 실패/타임아웃 시 0명
//!
//! 지표는 원본 해상도에서 계산한다. 블러 임계값(라플라시안 분산 150)은
//! 스케일에 민감하므로 축소본은 얼굴 검출 입력에만 쓴다.

use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use lensmate_core::config::{AnalysisConfig, AnalysisThresholds};
use lensmate_core::error::CoreError;
use lensmate_core::models::analysis::{
    BackgroundType, ColorBalance, ContrastLevel, FrameAnalysis, SceneContext,
};
use lensmate_core::models::frame::Frame;
use lensmate_core::ports::face_detector::FaceDetector;
use tracing::{debug, warn};

use crate::metrics::{self, EdgeMaps, Exposure};
use crate::resize;

/// 얼굴 수를 제외한 동기 지표 묶음
#[derive(Debug, Clone)]
struct MetricSet {
    brightness: f64,
    blur_level: f64,
    is_backlit: bool,
    composition_score: f64,
    horizon_tilt: f64,
    subject_centered: bool,
    exposure: Exposure,
    subject_position: (f64, f64),
    color_balance: ColorBalance,
    background_type: BackgroundType,
    rule_of_thirds_score: f64,
    contrast_level: ContrastLevel,
    noise_level: f64,
}

/// 지표 실패 시 대체값 적용 + 경고 로그
fn or_fallback<T>(metric: &str, result: Result<T, CoreError>, fallback: T) -> T {
    result.unwrap_or_else(|e| {
        warn!(metric, "지표 계산 실패, 대체값 사용: {e}");
        fallback
    })
}

/// 엣지 맵 계산 실패를 지표별 에러로 전달
fn edge_input<'a>(
    edges: &'a Result<EdgeMaps, CoreError>,
    metric: &str,
) -> Result<&'a EdgeMaps, CoreError> {
    edges
        .as_ref()
        .map_err(|e| CoreError::Image(format!("{metric}: {e}")))
}

fn compute_metrics(rgba: &RgbaImage, thresholds: &AnalysisThresholds) -> MetricSet {
    let gray = image::imageops::grayscale(rgba);
    let edges = EdgeMaps::compute(&gray);
    let edge_metric = |metric: &str| edge_input(&edges, metric);

    MetricSet {
        brightness: or_fallback("brightness", metrics::brightness(&gray), 128.0),
        blur_level: or_fallback("blur", metrics::laplacian_variance(&gray), 200.0),
        is_backlit: or_fallback(
            "backlight",
            metrics::backlit(&gray, thresholds.backlight_delta),
            false,
        ),
        composition_score: or_fallback(
            "composition",
            edge_metric("composition").map(metrics::composition_score),
            0.3,
        ),
        horizon_tilt: or_fallback(
            "horizon",
            edge_metric("horizon").map(metrics::horizon_tilt),
            0.0,
        ),
        subject_centered: or_fallback("centering", metrics::subject_centered(&gray), false),
        exposure: or_fallback(
            "exposure",
            metrics::exposure(&gray, thresholds),
            Exposure {
                overexposed: false,
                underexposed: false,
                dynamic_range: 0.0,
            },
        ),
        subject_position: or_fallback(
            "subject_position",
            edge_metric("subject_position").map(metrics::subject_position),
            (0.5, 0.5),
        ),
        color_balance: or_fallback(
            "color_balance",
            metrics::color_balance(rgba),
            ColorBalance::Neutral,
        ),
        background_type: or_fallback(
            "background",
            edge_metric("background").map(|e| metrics::background_type(&e.soft, thresholds)),
            BackgroundType::Clean,
        ),
        rule_of_thirds_score: or_fallback(
            "rule_of_thirds",
            edge_metric("rule_of_thirds").map(metrics::rule_of_thirds_score),
            0.3,
        ),
        contrast_level: or_fallback("contrast", metrics::contrast(&gray), ContrastLevel::Normal),
        noise_level: or_fallback("noise", metrics::noise_level(&gray), 10.0),
    }
}

/// 장면 분석기
pub struct SceneAnalyzer {
    /// 얼굴 검출기
    face_detector: Arc<dyn FaceDetector>,
    /// 판정 임계값
    thresholds: AnalysisThresholds,
    /// 얼굴 검출 타임아웃
    face_timeout: Duration,
    /// 얼굴 검출 입력 최대 변 길이
    face_max_dimension: u32,
}

impl SceneAnalyzer {
    pub fn new(face_detector: Arc<dyn FaceDetector>, config: &AnalysisConfig) -> Self {
        Self {
            face_detector,
            thresholds: config.thresholds,
            face_timeout: config.face_detection_timeout(),
            face_max_dimension: config.face_detection_max_dimension.max(1),
        }
    }

    /// 프레임 분석 (실패 시 `analysis_success == false`)
    pub async fn analyze(&self, frame: Option<&Frame>) -> FrameAnalysis {
        let Some(frame) = frame else {
            debug!("프레임 없음, 분석 건너뜀");
            return FrameAnalysis::failed();
        };

        match resize::frame_to_rgba(frame) {
            Ok(rgba) => self.analyze_image(rgba).await,
            Err(e) => {
                warn!("프레임 변환 실패: {e}");
                FrameAnalysis::failed()
            }
        }
    }

    /// 인코딩된 프리뷰(JPEG/PNG) 분석
    pub async fn analyze_bytes(&self, bytes: &[u8]) -> FrameAnalysis {
        match image::load_from_memory(bytes) {
            Ok(decoded) => self.analyze_image(decoded.to_rgba8()).await,
            Err(e) => {
                warn!("프리뷰 디코딩 실패: {e}");
                FrameAnalysis::failed()
            }
        }
    }

    async fn analyze_image(&self, rgba: RgbaImage) -> FrameAnalysis {
        let face_frame = self.face_input(&rgba);

        let metrics_task = {
            let thresholds = self.thresholds;
            tokio::task::spawn_blocking(move || compute_metrics(&rgba, &thresholds))
        };

        let (face_count, metric_set) =
            tokio::join!(self.count_faces(&face_frame), metrics_task);

        let m = match metric_set {
            Ok(m) => m,
            Err(e) => {
                warn!("지표 계산 작업 실패: {e}");
                return FrameAnalysis::failed();
            }
        };

        let analysis = FrameAnalysis {
            brightness: m.brightness,
            blur_level: m.blur_level,
            face_count,
            is_backlit: m.is_backlit,
            has_motion_blur: m.blur_level < self.thresholds.motion_blur_variance,
            composition_score: m.composition_score,
            horizon_tilt: m.horizon_tilt,
            subject_centered: m.subject_centered,
            is_overexposed: m.exposure.overexposed,
            is_underexposed: m.exposure.underexposed,
            subject_position_x: m.subject_position.0,
            subject_position_y: m.subject_position.1,
            dynamic_range: m.exposure.dynamic_range,
            color_balance: m.color_balance,
            background_type: m.background_type,
            rule_of_thirds_score: m.rule_of_thirds_score,
            contrast_level: m.contrast_level,
            noise_level: m.noise_level,
            scene_context: SceneContext::classify(m.brightness, face_count),
            analysis_success: true,
        };

        debug!(
            brightness = analysis.brightness as i64,
            blur = analysis.blur_level,
            faces = analysis.face_count,
            "장면 분석 완료"
        );
        analysis
    }

    /// 얼굴 검출용 축소본. 축소 실패 시 원본 사용
    fn face_input(&self, rgba: &RgbaImage) -> Frame {
        let max = self.face_max_dimension;
        match resize::downscale_within(rgba.clone(), max, max) {
            Ok(small) => resize::rgba_to_frame(small),
            Err(e) => {
                warn!("얼굴 검출용 축소 실패, 원본 사용: {e}");
                resize::rgba_to_frame(rgba.clone())
            }
        }
    }

    /// 타임아웃이 걸린 얼굴 검출 (실패/타임아웃 → 0)
    async fn count_faces(&self, frame: &Frame) -> u32 {
        match tokio::time::timeout(self.face_timeout, self.face_detector.count_faces(frame)).await {
            Ok(Ok(count)) => count,
            Ok(Err(e)) => {
                warn!("얼굴 검출 실패, 0명 처리: {e}");
                0
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.face_timeout.as_millis() as u64,
                    "얼굴 검출 타임아웃, 0명 처리"
                );
                0
            }
        }
    }
}
