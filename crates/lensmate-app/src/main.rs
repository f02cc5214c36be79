//! # lensmate-app
//!
//! LENSMATE CLI 진입점.
//! 설정 로드, 어댑터 생성(DI), 장면 분석 → 제안 → 적용 파이프라인 실행.
//! 카메라 하드웨어 대신 이미지 파일을 프리뷰로 쓰는 시뮬레이션 카메라를 사용한다.

mod console;
mod sim_camera;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lensmate_automation::ActionApplier;
use lensmate_core::config::{AnalysisConfig, AppConfig};
use lensmate_core::config_manager::ConfigManager;
use lensmate_core::models::device::{CaptureMode, DeviceState, FlashMode};
use lensmate_core::models::frame::Frame;
use lensmate_core::ports::camera_control::CameraControl;
use lensmate_core::ports::face_detector::{FaceDetector, NoFaceDetector};
use lensmate_core::ports::reasoning::ReasoningBackend;
use lensmate_network::GeminiClient;
use lensmate_suggestion::{CameraSuggestionSource, EducationLoop, SuggestionService};
use lensmate_vision::resize::rgba_to_frame;
use lensmate_vision::SceneAnalyzer;

use crate::console::ConsoleListener;
use crate::sim_camera::SimulatedCamera;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FlashArg {
    Off,
    On,
    Auto,
}

impl From<FlashArg> for FlashMode {
    fn from(value: FlashArg) -> Self {
        match value {
            FlashArg::Off => FlashMode::Off,
            FlashArg::On => FlashMode::On,
            FlashArg::Auto => FlashMode::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Photo,
    Video,
    Portrait,
    Night,
}

impl From<ModeArg> for CaptureMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Photo => CaptureMode::Photo,
            ModeArg::Video => CaptureMode::Video,
            ModeArg::Portrait => CaptureMode::Portrait,
            ModeArg::Night => CaptureMode::Night,
        }
    }
}

/// LENSMATE 촬영 가이드
///
/// 프리뷰 이미지를 분석해 실행 가능한 촬영 제안을 만들고, 선택적으로 적용한다.
#[derive(Parser, Debug)]
#[command(name = "lensmate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 프리뷰로 사용할 이미지 파일 (JPEG/PNG). 없으면 장면 데이터 없이 실행
    image: Option<PathBuf>,

    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,

    /// 원격 추론 없이 규칙 기반 제안만 사용
    #[arg(long, short = 'o')]
    offline: bool,

    /// 받은 제안을 시뮬레이션 카메라에 모두 적용
    #[arg(long, short = 'a')]
    apply: bool,

    /// 교육 모드로 지정한 시간(초) 동안 실행
    #[arg(long)]
    educate: Option<u64>,

    /// 제안을 JSON으로 출력
    #[arg(long)]
    json: bool,

    /// 초기 플래시 모드
    #[arg(long, value_enum, default_value = "off")]
    flash: FlashArg,

    /// 초기 촬영 모드
    #[arg(long, value_enum, default_value = "photo")]
    mode: ModeArg,

    /// 초기 줌 배율
    #[arg(long, default_value_t = 1.0)]
    zoom: f32,

    /// 전면 카메라 사용
    #[arg(long)]
    front: bool,

    /// 그리드 표시
    #[arg(long)]
    grid: bool,

    /// 노출 보정 인덱스 (-2 미만이면 저조도)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    exposure: i32,

    /// SCRFD 얼굴 검출 모델 (설정의 analysis.face_model_path보다 우선, `scrfd` 기능 필요)
    #[arg(long)]
    face_model: Option<PathBuf>,
}

impl Args {
    fn initial_state(&self) -> DeviceState {
        DeviceState {
            zoom_ratio: self.zoom,
            flash_mode: self.flash.into(),
            capture_mode: self.mode.into(),
            grid_enabled: self.grid,
            front_camera: self.front,
            low_light: DeviceState::low_light_from_exposure(self.exposure),
            ..DeviceState::default()
        }
    }
}

/// 이미지 파일 → 프레임
fn load_frame(path: &Path) -> Result<Frame> {
    let image = image::open(path)
        .with_context(|| format!("이미지 로드 실패: {}", path.display()))?;
    Ok(rgba_to_frame(image.to_rgba8()))
}

/// 얼굴 검출기 생성. 모델이 없거나 로드에 실패하면 항상 0명인 검출기
fn build_face_detector(config: &AnalysisConfig) -> Arc<dyn FaceDetector> {
    match config.face_model_path.as_deref() {
        Some(path) => load_face_model(path, config).unwrap_or_else(|| Arc::new(NoFaceDetector)),
        None => {
            info!("얼굴 검출 모델 미설정: 얼굴 수 0으로 분석");
            Arc::new(NoFaceDetector)
        }
    }
}

#[cfg(feature = "scrfd")]
fn load_face_model(path: &Path, config: &AnalysisConfig) -> Option<Arc<dyn FaceDetector>> {
    use lensmate_vision::face::ScrfdFaceDetector;

    match ScrfdFaceDetector::load(path, &config.face_device, config.face_confidence) {
        Ok(detector) => Some(Arc::new(detector)),
        Err(e) => {
            warn!("얼굴 검출 모델 로드 실패, 얼굴 수 0으로 분석: {e}");
            None
        }
    }
}

#[cfg(not(feature = "scrfd"))]
fn load_face_model(path: &Path, _config: &AnalysisConfig) -> Option<Arc<dyn FaceDetector>> {
    warn!(model = %path.display(), "scrfd 기능 없이 빌드됨: 얼굴 검출 비활성");
    None
}

/// 추론 백엔드 생성. 오프라인이거나 키가 없으면 None
fn build_backend(config: &AppConfig, offline: bool) -> Result<Option<Arc<dyn ReasoningBackend>>> {
    if offline {
        info!("오프라인 모드: 규칙 기반 제안만 사용");
        return Ok(None);
    }
    if !config.reasoning.has_api_key() {
        warn!("API 키 미설정: 규칙 기반 제안만 사용");
        return Ok(None);
    }
    let client = GeminiClient::new(&config.reasoning)?;
    Ok(Some(Arc::new(client)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = format!(
        "lensmate={0},lensmate_core={0},lensmate_vision={0},lensmate_network={0},lensmate_suggestion={0},lensmate_automation={0}",
        args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    // 설정
    let config_manager = match &args.config {
        Some(path) => ConfigManager::with_path(path.clone())?,
        None => ConfigManager::new()?,
    };
    info!("설정 파일: {}", config_manager.config_path().display());
    let mut config = config_manager.effective();
    if let Some(path) = &args.face_model {
        config.analysis.face_model_path = Some(path.clone());
    }

    // 어댑터
    let preview = args.image.as_deref().map(load_frame).transpose()?;
    let camera = Arc::new(SimulatedCamera::new(preview, args.initial_state()));
    let analyzer = Arc::new(SceneAnalyzer::new(
        build_face_detector(&config.analysis),
        &config.analysis,
    ));
    let service = match build_backend(&config, args.offline)? {
        Some(backend) => SuggestionService::new(backend, &config),
        None => SuggestionService::offline(&config),
    };
    let service = Arc::new(service.with_preview_source(camera.clone()));
    let listener = Arc::new(ConsoleListener);

    if let Some(secs) = args.educate {
        let source = CameraSuggestionSource::new(camera.clone(), analyzer, service);
        let education = EducationLoop::new(
            Arc::new(source),
            listener,
            config.education.interval(),
        );
        education.start();
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
            _ = tokio::signal::ctrl_c() => info!("중단 신호 수신"),
        }
        education.stop().await;
        return Ok(());
    }

    // 분석 → 제안
    let frame = camera.capture_preview().await?;
    let analysis = analyzer.analyze(frame.as_ref()).await;
    let state = camera.snapshot().await?;
    let suggestions = service.get_suggestions(&state, Some(&analysis)).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
    } else {
        console::print_analysis(&analysis);
        console::print_suggestions(&suggestions);
    }

    // 적용
    if args.apply && !suggestions.is_empty() {
        let applier = ActionApplier::new(camera.clone(), config.applier.clone())
            .with_listener(listener);
        applier.apply(&suggestions).await;

        let after = camera.snapshot().await?;
        println!(
            "카메라 상태: 줌 {:.1}x, 플래시 {}, 모드 {}, 그리드 {}, {}, 비율 {}, 필터 {}",
            after.zoom_ratio,
            after.flash_mode.label(),
            after.capture_mode.label(),
            if after.grid_enabled { "ON" } else { "OFF" },
            if after.front_camera { "전면" } else { "후면" },
            after.aspect_ratio.label(),
            camera.filter().map(|f| f.label()).unwrap_or("없음"),
        );
    }

    Ok(())
}
