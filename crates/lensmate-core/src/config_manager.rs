//! 설정 파일 관리.
//!
//! `config.json` 하나를 플랫폼 설정 디렉토리(또는 지정 경로)에 둔다.
//! 파일이 없으면 기본값으로 만들고, 읽거나 쓸 때마다 값 범위를 검증한다.
//! 저장은 임시 파일에 쓴 뒤 rename 하므로 중간에 끊겨도 기존 파일이 깨지지 않는다.
//!
//! API 키 등 민감 값은 파일 대신 환경변수로 줄 수 있다 ([`ConfigManager::effective`]).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use directories::ProjectDirs;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::CoreError;

const CONFIG_FILE_NAME: &str = "config.json";

/// API 키 환경변수
pub const API_KEY_ENV: &str = "LENSMATE_API_KEY";
/// 추론 엔드포인트 환경변수
pub const ENDPOINT_ENV: &str = "LENSMATE_ENDPOINT";
/// 모델 이름 환경변수
pub const MODEL_ENV: &str = "LENSMATE_MODEL";

// ============================================================
// 검증
// ============================================================

fn invalid(field: &str, message: impl Into<String>) -> CoreError {
    CoreError::Validation {
        field: field.to_string(),
        message: message.into(),
    }
}

/// 파이프라인이 동작할 수 없는 값 거절
pub fn validate(config: &AppConfig) -> Result<(), CoreError> {
    let r = &config.reasoning;
    if !(r.endpoint.starts_with("http://") || r.endpoint.starts_with("https://")) {
        return Err(invalid("reasoning.endpoint", "http(s) URL이어야 함"));
    }
    if r.model.trim().is_empty() {
        return Err(invalid("reasoning.model", "비어 있음"));
    }

    let s = &config.suggestion;
    if s.max_suggestions == 0 || s.max_fallback == 0 {
        return Err(invalid("suggestion.max_suggestions", "1 이상이어야 함"));
    }
    if s.history_capacity == 0 {
        return Err(invalid("suggestion.history_capacity", "1 이상이어야 함"));
    }
    if s.call_timeout_secs == 0 {
        return Err(invalid("suggestion.call_timeout_secs", "1 이상이어야 함"));
    }

    let p = &config.preview;
    if p.max_width == 0 || p.max_height == 0 {
        return Err(invalid("preview.max_width", "프리뷰 크기는 0일 수 없음"));
    }
    if !(1..=100).contains(&p.jpeg_quality) {
        return Err(invalid("preview.jpeg_quality", "1-100 범위"));
    }

    if config.education.interval_ms == 0 {
        return Err(invalid("education.interval_ms", "1 이상이어야 함"));
    }
    if !(config.applier.zoom_step > 1.0 && config.applier.zoom_step.is_finite()) {
        return Err(invalid("applier.zoom_step", "1보다 커야 함"));
    }

    let a = &config.analysis;
    if !(a.face_confidence > 0.0 && a.face_confidence < 1.0) {
        return Err(invalid("analysis.face_confidence", "0과 1 사이"));
    }
    if a.face_detection_max_dimension == 0 {
        return Err(invalid("analysis.face_detection_max_dimension", "1 이상이어야 함"));
    }

    let t = &a.thresholds;
    for (field, ratio) in [
        ("analysis.thresholds.overexposed_ratio", t.overexposed_ratio),
        ("analysis.thresholds.underexposed_ratio", t.underexposed_ratio),
    ] {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(invalid(field, "0-1 범위"));
        }
    }
    if t.busy_edge_ratio > t.cluttered_edge_ratio {
        return Err(invalid(
            "analysis.thresholds.busy_edge_ratio",
            "cluttered_edge_ratio 이하여야 함",
        ));
    }
    Ok(())
}

// ============================================================
// 파일 입출력
// ============================================================

fn read_config(path: &Path) -> Result<AppConfig, CoreError> {
    let raw = fs::read_to_string(path).map_err(|e| {
        CoreError::Config(format!("설정 파일 읽기 실패: {}: {e}", path.display()))
    })?;
    let config: AppConfig = serde_json::from_str(&raw).map_err(|e| {
        CoreError::Config(format!("설정 파일 파싱 실패: {}: {e}", path.display()))
    })?;
    validate(&config)?;
    Ok(config)
}

fn write_config(path: &Path, config: &AppConfig) -> Result<(), CoreError> {
    let body = serde_json::to_string_pretty(config)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, body)
        .and_then(|_| fs::rename(&tmp, path))
        .map_err(|e| {
            CoreError::Config(format!("설정 파일 저장 실패: {}: {e}", path.display()))
        })
}

fn ensure_parent(path: &Path) -> Result<(), CoreError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            fs::create_dir_all(dir).map_err(|e| {
                CoreError::Config(format!("설정 디렉토리 생성 실패: {}: {e}", dir.display()))
            })?;
            info!("설정 디렉토리 생성: {}", dir.display());
            Ok(())
        }
        _ => Ok(()),
    }
}

// ============================================================
// ConfigManager
// ============================================================

/// 설정 관리자 (복제 시 같은 설정을 공유)
#[derive(Debug, Clone)]
pub struct ConfigManager {
    current: Arc<RwLock<AppConfig>>,
    path: PathBuf,
}

impl ConfigManager {
    /// 플랫폼 설정 디렉토리의 `config.json` 사용
    pub fn new() -> Result<Self, CoreError> {
        Self::with_path(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// 지정 경로 사용. 파일이 없으면 기본 설정으로 생성
    pub fn with_path(path: PathBuf) -> Result<Self, CoreError> {
        ensure_parent(&path)?;

        let config = if path.exists() {
            let config = read_config(&path)?;
            debug!("설정 로드: {}", path.display());
            config
        } else {
            let config = AppConfig::default_config();
            write_config(&path, &config)?;
            info!("기본 설정 파일 생성: {}", path.display());
            config
        };

        Ok(Self {
            current: Arc::new(RwLock::new(config)),
            path,
        })
    }

    /// 현재 설정 (파일 값 그대로)
    pub fn get(&self) -> AppConfig {
        self.current.read().clone()
    }

    /// 환경변수 오버라이드를 얹은 실행용 설정. 파일에는 반영하지 않는다
    pub fn effective(&self) -> AppConfig {
        let mut config = self.get();
        let env = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(key) = env(API_KEY_ENV) {
            debug!("{API_KEY_ENV} 적용");
            config.reasoning.api_key = key;
        }
        if let Some(endpoint) = env(ENDPOINT_ENV) {
            debug!(endpoint = %endpoint, "{ENDPOINT_ENV} 적용");
            config.reasoning.endpoint = endpoint;
        }
        if let Some(model) = env(MODEL_ENV) {
            debug!(model = %model, "{MODEL_ENV} 적용");
            config.reasoning.model = model;
        }
        config
    }

    /// 검증 후 교체 및 저장
    pub fn update(&self, config: AppConfig) -> Result<(), CoreError> {
        validate(&config)?;
        write_config(&self.path, &config)?;
        *self.current.write() = config;
        debug!("설정 저장: {}", self.path.display());
        Ok(())
    }

    /// 일부 필드만 수정. 검증에 실패하면 아무것도 바뀌지 않는다
    pub fn update_with<F>(&self, edit: F) -> Result<AppConfig, CoreError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.get();
        edit(&mut config);
        self.update(config.clone())?;
        Ok(config)
    }

    pub fn config_path(&self) -> &Path {
        &self.path
    }

    /// 파일에서 다시 읽기. 실패하면 기존 설정 유지
    pub fn reload(&self) -> Result<(), CoreError> {
        match read_config(&self.path) {
            Ok(config) => {
                *self.current.write() = config;
                info!("설정 다시 로드");
                Ok(())
            }
            Err(e) => {
                warn!("설정 다시 로드 실패, 기존 설정 유지: {e}");
                Err(e)
            }
        }
    }

    /// 플랫폼별 설정 디렉토리
    pub fn config_dir() -> Result<PathBuf, CoreError> {
        ProjectDirs::from("com", "lensmate", "lensmate")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| CoreError::Config("홈 디렉토리를 찾을 수 없습니다".to_string()))
    }
}
