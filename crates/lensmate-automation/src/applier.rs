//! 액션 적용기.
//!
//! 각 액션은 대응하는 카메라 제어 호출 후 사후 조건을 확인한다.
//! 호출이 에러 없이 끝나도 상태가 바뀌지 않았다면 실패로 기록한다.
//!
//! - 줌: 새 배율이 이전보다 커졌는지/작아졌는지
//! - 모드 전환: 안정화 대기 후 보고된 모드가 목표와 같은지
//! - 카메라 전환: 전면/후면 플래그가 뒤집혔는지
//! - 이미 켜진 기능(그리드/손떨림 보정/모드): 다시 토글하지 않고 "already ON" 성공
//!
//! 일괄 적용은 한 액션이 실패해도 나머지를 계속 시도한다.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use lensmate_core::config::ApplierConfig;
use lensmate_core::error::CoreError;
use lensmate_core::models::device::{AspectRatio, CaptureMode, FilterKind, FlashMode};
use lensmate_core::models::suggestion::{ActionableSuggestion, QuickActionKind};
use lensmate_core::ports::camera_control::CameraControl;
use lensmate_core::ports::listener::SuggestionListener;

// ============================================================
// 결과 타입
// ============================================================

/// 단일 액션 적용 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// 적용한 액션
    pub action: QuickActionKind,
    /// 검증까지 통과했는지
    pub success: bool,
    /// 사람이 읽는 결과 ("Flash ON", "Zoom In failed" 등)
    pub description: String,
}

/// 일괄 적용 결과
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// 성공한 항목 설명
    pub applied: Vec<String>,
    /// 실패한 항목 설명
    pub failed: Vec<String>,
    /// 적용 순서대로의 액션별 결과
    pub results: Vec<ActionOutcome>,
}

impl BatchOutcome {
    fn push(&mut self, outcome: ActionOutcome) {
        if outcome.success {
            self.applied.push(outcome.description.clone());
        } else {
            self.failed.push(outcome.description.clone());
        }
        self.results.push(outcome);
    }

    /// 모든 액션이 성공했는지 (빈 일괄은 false)
    pub fn all_applied(&self) -> bool {
        !self.applied.is_empty() && self.failed.is_empty()
    }

    /// 성공/실패를 합친 사용자 메시지
    pub fn message(&self) -> String {
        match (self.applied.is_empty(), self.failed.is_empty()) {
            (false, true) => self.applied.join(", "),
            (false, false) => format!(
                "Applied: {} | Failed: {}",
                self.applied.join(", "),
                self.failed.join(", ")
            ),
            (true, false) => format!("Failed: {}", self.failed.join(", ")),
            (true, true) => "No actions".to_string(),
        }
    }

    /// 액션별 성공 여부 (같은 액션이 여러 번이면 마지막 결과)
    pub fn outcome_map(&self) -> HashMap<QuickActionKind, bool> {
        self.results
            .iter()
            .map(|r| (r.action, r.success))
            .collect()
    }
}

/// 검증 판정
enum Verdict {
    Applied(String),
    Failed(String),
}

// ============================================================
// ActionApplier
// ============================================================

/// 카메라 제어 표면에 액션을 적용하는 적용기
pub struct ActionApplier {
    camera: Arc<dyn CameraControl>,
    config: ApplierConfig,
    /// 같은 카메라에 대한 동시 적용 방지
    serial: Mutex<()>,
    listener: Option<Arc<dyn SuggestionListener>>,
}

impl ActionApplier {
    pub fn new(camera: Arc<dyn CameraControl>, config: ApplierConfig) -> Self {
        Self {
            camera,
            config,
            serial: Mutex::new(()),
            listener: None,
        }
    }

    /// 일괄 적용 결과를 받을 리스너 지정
    pub fn with_listener(mut self, listener: Arc<dyn SuggestionListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// 단일 액션 적용
    pub async fn apply_action(&self, action: QuickActionKind) -> ActionOutcome {
        let _guard = self.serial.lock().await;
        self.run(action, None).await
    }

    /// 제안 하나 적용 (목표 값이 있으면 사용)
    pub async fn apply_suggestion(&self, suggestion: &ActionableSuggestion) -> ActionOutcome {
        let _guard = self.serial.lock().await;
        self.run(suggestion.action, suggestion.target_value.as_deref())
            .await
    }

    /// 제안 목록 순차 적용
    pub async fn apply(&self, suggestions: &[ActionableSuggestion]) -> BatchOutcome {
        let items: Vec<_> = suggestions
            .iter()
            .map(|s| (s.action, s.target_value.as_deref()))
            .collect();
        self.apply_batch(&items).await
    }

    /// 액션 목록 순차 적용
    pub async fn apply_kinds(&self, actions: &[QuickActionKind]) -> BatchOutcome {
        let items: Vec<_> = actions.iter().map(|a| (*a, None)).collect();
        self.apply_batch(&items).await
    }

    async fn apply_batch(&self, items: &[(QuickActionKind, Option<&str>)]) -> BatchOutcome {
        let _guard = self.serial.lock().await;
        debug!(count = items.len(), "액션 일괄 적용 시작");

        let mut batch = BatchOutcome::default();
        for (action, target) in items {
            batch.push(self.run(*action, *target).await);
        }

        let message = batch.message();
        info!(
            applied = batch.applied.len(),
            failed = batch.failed.len(),
            "일괄 적용 결과: {message}"
        );
        if let Some(listener) = &self.listener {
            listener.on_batch_applied(&message, &batch.outcome_map());
        }
        batch
    }

    /// 직렬화 잠금을 잡은 상태에서 호출
    async fn run(&self, action: QuickActionKind, target: Option<&str>) -> ActionOutcome {
        debug!(%action, "액션 적용");
        let (success, description) = match self.execute(action, target).await {
            Ok(Verdict::Applied(desc)) => {
                debug!(%action, "적용 성공: {desc}");
                (true, desc)
            }
            Ok(Verdict::Failed(desc)) => {
                warn!(%action, "적용 검증 실패: {desc}");
                (false, desc)
            }
            Err(e) => {
                warn!(%action, "액션 적용 오류: {e}");
                (false, format!("{} error", error_label(action)))
            }
        };
        ActionOutcome {
            action,
            success,
            description,
        }
    }

    async fn execute(
        &self,
        action: QuickActionKind,
        target: Option<&str>,
    ) -> Result<Verdict, CoreError> {
        use QuickActionKind as K;

        match action {
            K::FlashOn => self.set_flash(FlashMode::On, "Flash ON").await,
            K::FlashOff => self.set_flash(FlashMode::Off, "Flash OFF").await,
            K::ZoomIn => self.zoom(true, target).await,
            K::ZoomOut => self.zoom(false, target).await,
            K::SwitchCamera => self.switch_camera().await,
            K::EnableGrid => self.enable_grid().await,
            K::EnableStabilization => self.enable_stabilization().await,
            K::EnablePortrait => {
                self.switch_mode(CaptureMode::Portrait, "Portrait Mode", "Portrait mode")
                    .await
            }
            K::EnableNight => {
                self.switch_mode(CaptureMode::Night, "Night Mode", "Night mode")
                    .await
            }
            K::DisableNight => self.disable_night().await,
            K::ApplyWarmFilter | K::ApplyCoolFilter | K::ApplyVividFilter | K::ApplyBwFilter => {
                match action.target_filter() {
                    Some(filter) => self.apply_filter(filter).await,
                    None => Ok(not_implemented(action)),
                }
            }
            K::Ratio16x9 | K::Ratio4x3 | K::Ratio1x1 | K::RatioFull => {
                match action.target_aspect() {
                    Some(ratio) => self.set_aspect(ratio).await,
                    None => Ok(not_implemented(action)),
                }
            }
            K::HoldSteady | K::MoveCloser | K::MoveBack => Ok(not_implemented(action)),
        }
    }

    async fn settle(&self) {
        let delay = self.config.settle_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    async fn set_flash(&self, mode: FlashMode, label: &str) -> Result<Verdict, CoreError> {
        if mode == FlashMode::On && !self.camera.has_flash().await? {
            return Ok(Verdict::Failed(format!("{label} failed (no flash unit)")));
        }
        self.camera.set_flash_mode(mode).await?;
        Ok(if self.camera.flash_mode().await? == mode {
            Verdict::Applied(label.to_string())
        } else {
            Verdict::Failed(format!("{label} failed"))
        })
    }

    async fn zoom(&self, zoom_in: bool, target: Option<&str>) -> Result<Verdict, CoreError> {
        let old = self.camera.zoom_ratio().await?;
        let range = self.camera.zoom_range().await?;

        let stepped = if zoom_in {
            old * self.config.zoom_step
        } else {
            old / self.config.zoom_step
        };
        // 방향이 맞는 목표 값만 사용
        let desired = parse_zoom_target(target)
            .filter(|t| if zoom_in { *t > old } else { *t < old })
            .unwrap_or(stepped);

        self.camera.set_zoom_ratio(range.clamp(desired)).await?;
        let new = self.camera.zoom_ratio().await?;
        debug!(old, new, "줌 변경");

        let moved = if zoom_in { new > old } else { new < old };
        Ok(if moved {
            Verdict::Applied(format!("Zoomed to {:.1}x", new))
        } else if zoom_in {
            Verdict::Failed("Zoom In failed".to_string())
        } else {
            Verdict::Failed("Zoom Out failed".to_string())
        })
    }

    async fn switch_camera(&self) -> Result<Verdict, CoreError> {
        let was_front = self.camera.is_front_camera().await?;
        self.camera.flip_camera().await?;
        self.settle().await;
        let now_front = self.camera.is_front_camera().await?;

        Ok(if now_front != was_front {
            let side = if now_front { "front" } else { "back" };
            Verdict::Applied(format!("Camera switched to {side}"))
        } else {
            Verdict::Failed("Camera switch failed".to_string())
        })
    }

    async fn enable_grid(&self) -> Result<Verdict, CoreError> {
        if self.camera.grid_enabled().await? {
            return Ok(Verdict::Applied("Grid already ON".to_string()));
        }
        self.camera.set_grid_enabled(true).await?;
        Ok(if self.camera.grid_enabled().await? {
            Verdict::Applied("Grid ON".to_string())
        } else {
            Verdict::Failed("Grid failed".to_string())
        })
    }

    async fn enable_stabilization(&self) -> Result<Verdict, CoreError> {
        if self.camera.stabilization_enabled().await? {
            return Ok(Verdict::Applied("Stabilization already ON".to_string()));
        }
        self.camera.set_stabilization_enabled(true).await?;
        Ok(if self.camera.stabilization_enabled().await? {
            Verdict::Applied("Stabilization ON".to_string())
        } else {
            Verdict::Failed("Stabilization failed".to_string())
        })
    }

    async fn switch_mode(
        &self,
        mode: CaptureMode,
        applied: &str,
        failed: &str,
    ) -> Result<Verdict, CoreError> {
        let old = self.camera.capture_mode().await?;
        if old == mode {
            return Ok(Verdict::Applied(format!("{applied} already ON")));
        }

        self.camera.set_capture_mode(mode).await?;
        self.settle().await;
        let new = self.camera.capture_mode().await?;

        Ok(if new == mode {
            Verdict::Applied(applied.to_string())
        } else {
            warn!(from = old.label(), to = new.label(), "모드 전환 불일치");
            Verdict::Failed(format!("{failed} failed"))
        })
    }

    async fn disable_night(&self) -> Result<Verdict, CoreError> {
        if self.camera.capture_mode().await? != CaptureMode::Night {
            return Ok(Verdict::Applied("Night Mode already OFF".to_string()));
        }
        self.camera.set_capture_mode(CaptureMode::Photo).await?;
        self.settle().await;

        Ok(if self.camera.capture_mode().await? == CaptureMode::Photo {
            Verdict::Applied("Night Mode OFF".to_string())
        } else {
            Verdict::Failed("Night mode off failed".to_string())
        })
    }

    async fn set_aspect(&self, ratio: AspectRatio) -> Result<Verdict, CoreError> {
        self.camera.set_aspect_ratio(ratio).await?;
        Ok(if self.camera.aspect_ratio().await? == ratio {
            Verdict::Applied(format!("Aspect ratio: {}", ratio.label()))
        } else {
            Verdict::Failed(format!("{} ratio failed", ratio.label()))
        })
    }

    async fn apply_filter(&self, filter: FilterKind) -> Result<Verdict, CoreError> {
        self.camera.apply_filter(filter).await?;
        Ok(if self.camera.current_filter().await? == Some(filter) {
            Verdict::Applied(format!("{} filter", filter.label()))
        } else {
            Verdict::Failed(format!("{} filter failed", filter.label()))
        })
    }
}

fn not_implemented(action: QuickActionKind) -> Verdict {
    Verdict::Failed(format!("{} not implemented", action.as_str()))
}

/// "1.5x", "2", "2.0X" → 배율
fn parse_zoom_target(target: Option<&str>) -> Option<f32> {
    let raw = target?.trim().trim_end_matches(['x', 'X']);
    raw.parse::<f32>().ok().filter(|v| v.is_finite() && *v > 0.0)
}

/// 에러 메시지 접두어
fn error_label(action: QuickActionKind) -> String {
    use QuickActionKind as K;

    match action {
        K::FlashOn => "Flash ON".to_string(),
        K::FlashOff => "Flash OFF".to_string(),
        K::ZoomIn => "Zoom In".to_string(),
        K::ZoomOut => "Zoom Out".to_string(),
        K::SwitchCamera => "Camera switch".to_string(),
        K::EnableGrid => "Grid".to_string(),
        K::EnableStabilization => "Stabilization".to_string(),
        K::EnablePortrait => "Portrait".to_string(),
        K::EnableNight => "Night".to_string(),
        K::DisableNight => "Night off".to_string(),
        _ => match (action.target_aspect(), action.target_filter()) {
            (Some(ratio), _) => format!("{} ratio", ratio.label()),
            (_, Some(filter)) => format!("{} filter", filter.label()),
            _ => action.as_str().to_string(),
        },
    }
}

// ============================================================
// 테스트
// ============================================================
