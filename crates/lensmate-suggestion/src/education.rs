//! 교육 모드 루프.
//!
//! 활성 상태에서 일정 주기마다 제안 하나를 받아 리스너에 팁으로 전달한다.
//! 상태는 INACTIVE ↔ ACTIVE 두 가지뿐이며, 이미 활성일 때 `start`는 아무것도 하지 않는다.
//! `stop`이 반환된 뒤에는 진행 중이던 제안이 있더라도 리스너가 호출되지 않는다.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use lensmate_core::error::CoreError;
use lensmate_core::models::suggestion::{ActionableSuggestion, EducationTip};
use lensmate_core::ports::camera_control::CameraControl;
use lensmate_core::ports::listener::SuggestionListener;
use lensmate_vision::SceneAnalyzer;

use crate::service::SuggestionService;

// ============================================================
// 제안 공급원
// ============================================================

/// 교육 루프가 주기마다 호출하는 제안 공급원
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// 다음 제안 하나 (없으면 None)
    async fn next_suggestion(&self) -> Result<Option<ActionableSuggestion>, CoreError>;
}

/// 실제 카메라 상태를 읽어 제안 파이프라인을 거치는 공급원
pub struct CameraSuggestionSource {
    camera: Arc<dyn CameraControl>,
    analyzer: Arc<SceneAnalyzer>,
    service: Arc<SuggestionService>,
}

impl CameraSuggestionSource {
    pub fn new(
        camera: Arc<dyn CameraControl>,
        analyzer: Arc<SceneAnalyzer>,
        service: Arc<SuggestionService>,
    ) -> Self {
        Self {
            camera,
            analyzer,
            service,
        }
    }
}

#[async_trait]
impl SuggestionSource for CameraSuggestionSource {
    async fn next_suggestion(&self) -> Result<Option<ActionableSuggestion>, CoreError> {
        let state = self.camera.snapshot().await?;
        let frame = self.camera.capture_preview().await.unwrap_or_else(|e| {
            warn!("교육 모드 프리뷰 캡처 실패: {e}");
            None
        });
        let analysis = match frame {
            Some(frame) => Some(self.analyzer.analyze(Some(&frame)).await),
            None => None,
        };

        let suggestions = self
            .service
            .get_suggestions(&state, analysis.as_ref())
            .await;
        Ok(suggestions.into_iter().next())
    }
}

// ============================================================
// EducationLoop
// ============================================================

struct RunningLoop {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// 주기적 팁 전달 루프
pub struct EducationLoop {
    source: Arc<dyn SuggestionSource>,
    listener: Arc<dyn SuggestionListener>,
    interval: Duration,
    running: Mutex<Option<RunningLoop>>,
}

impl EducationLoop {
    pub fn new(
        source: Arc<dyn SuggestionSource>,
        listener: Arc<dyn SuggestionListener>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            listener,
            interval,
            running: Mutex::new(None),
        }
    }

    /// 활성 상태인지
    pub fn is_active(&self) -> bool {
        self.running.lock().is_some()
    }

    /// 루프 시작. 이미 활성이면 false
    ///
    /// tokio 런타임 안에서 호출해야 한다.
    pub fn start(&self) -> bool {
        let mut running = self.running.lock();
        if running.is_some() {
            debug!("교육 모드 이미 활성");
            return false;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_loop(
            self.source.clone(),
            self.listener.clone(),
            self.interval,
            shutdown_rx,
        ));

        *running = Some(RunningLoop {
            shutdown_tx,
            handle,
        });
        info!(interval_ms = self.interval.as_millis() as u64, "교육 모드 시작");
        true
    }

    /// 루프 중지. 반환 시점 이후 리스너 호출 없음. 비활성이었으면 false
    pub async fn stop(&self) -> bool {
        let Some(running) = self.running.lock().take() else {
            return false;
        };

        let _ = running.shutdown_tx.send(true);
        if let Err(e) = running.handle.await {
            warn!("교육 모드 태스크 종료 오류: {e}");
        }
        info!("교육 모드 중지");
        true
    }
}

impl Drop for EducationLoop {
    fn drop(&mut self) {
        if let Some(running) = self.running.get_mut().take() {
            let _ = running.shutdown_tx.send(true);
            running.handle.abort();
        }
    }
}

/// 공급원에서 팁 하나 생성. 실패하거나 비어 있으면 정적 팁
async fn next_tip(source: &dyn SuggestionSource) -> EducationTip {
    match source.next_suggestion().await {
        Ok(Some(suggestion)) => EducationTip::from_suggestion(&suggestion),
        Ok(None) => EducationTip::static_tip(),
        Err(e) => {
            warn!("교육 팁 생성 실패, 정적 팁 사용: {e}");
            EducationTip::static_tip()
        }
    }
}

async fn run_loop(
    source: Arc<dyn SuggestionSource>,
    listener: Arc<dyn SuggestionListener>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown_rx.changed() => break,
        }

        let tip = tokio::select! {
            biased;
            _ = shutdown_rx.changed() => break,
            tip = next_tip(source.as_ref()) => tip,
        };

        if *shutdown_rx.borrow() {
            break;
        }
        debug!(title = %tip.title, "교육 팁 전달");
        listener.on_suggestion(tip);
    }
    debug!("교육 모드 루프 종료");
}

#[cfg(test)]
mod tests {
    use super::*;
    use lensmate_core::models::suggestion::QuickActionKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CollectingListener {
        tips: Mutex<Vec<EducationTip>>,
    }

    impl CollectingListener {
        fn titles(&self) -> Vec<String> {
            self.tips.lock().iter().map(|t| t.title.clone()).collect()
        }
    }

    impl SuggestionListener for CollectingListener {
        fn on_suggestion(&self, tip: EducationTip) {
            self.tips.lock().push(tip);
        }
    }

    /// 미리 정한 결과를 돌려주는 공급원
    struct ScriptedSource {
        calls: AtomicUsize,
        outcome: fn(usize) -> Result<Option<ActionableSuggestion>, CoreError>,
    }

    #[async_trait]
    impl SuggestionSource for ScriptedSource {
        async fn next_suggestion(&self) -> Result<Option<ActionableSuggestion>, CoreError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)(n)
        }
    }

    /// 끝나지 않는 공급원 (원격 호출이 걸린 상황)
    struct HangingSource;

    #[async_trait]
    impl SuggestionSource for HangingSource {
        async fn next_suggestion(&self) -> Result<Option<ActionableSuggestion>, CoreError> {
            std::future::pending().await
        }
    }

    fn steady() -> ActionableSuggestion {
        ActionableSuggestion::new("Hold Steady", "brace", QuickActionKind::HoldSteady, "📱", 2)
    }

    fn scripted(
        outcome: fn(usize) -> Result<Option<ActionableSuggestion>, CoreError>,
    ) -> Arc<ScriptedSource> {
        Arc::new(ScriptedSource {
            calls: AtomicUsize::new(0),
            outcome,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn delivers_one_tip_per_interval() {
        let listener = Arc::new(CollectingListener::default());
        let edu = EducationLoop::new(
            scripted(|_| Ok(Some(steady()))),
            listener.clone(),
            Duration::from_secs(8),
        );

        assert!(edu.start());
        tokio::time::sleep(Duration::from_millis(7_900)).await;
        assert!(listener.titles().is_empty());

        tokio::time::sleep(Duration::from_millis(16_200)).await;
        assert_eq!(listener.titles(), vec!["🤖 Hold Steady"; 3]);

        assert!(edu.stop().await);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_and_empty_results_degrade_to_static_tip() {
        let listener = Arc::new(CollectingListener::default());
        let edu = EducationLoop::new(
            scripted(|n| match n {
                0 => Err(CoreError::ServiceUnavailable("down".into())),
                _ => Ok(None),
            }),
            listener.clone(),
            Duration::from_secs(1),
        );

        edu.start();
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        edu.stop().await;

        assert_eq!(
            listener.titles(),
            vec!["📚 Photography Tip", "📚 Photography Tip"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_is_noop() {
        let listener = Arc::new(CollectingListener::default());
        let edu = EducationLoop::new(
            scripted(|_| Ok(Some(steady()))),
            listener.clone(),
            Duration::from_secs(1),
        );

        assert!(edu.start());
        assert!(!edu.start());
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        edu.stop().await;
        assert_eq!(listener.titles().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_in_flight_suggestion() {
        let listener = Arc::new(CollectingListener::default());
        let edu = EducationLoop::new(
            Arc::new(HangingSource),
            listener.clone(),
            Duration::from_secs(1),
        );

        edu.start();
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert!(edu.stop().await);
        assert!(!edu.is_active());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(listener.titles().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_delivered_after_stop() {
        let listener = Arc::new(CollectingListener::default());
        let edu = EducationLoop::new(
            scripted(|_| Ok(Some(steady()))),
            listener.clone(),
            Duration::from_secs(1),
        );

        edu.start();
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        edu.stop().await;
        let delivered = listener.titles().len();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(listener.titles().len(), delivered);
        assert!(!edu.stop().await);

        // 재시작 가능
        assert!(edu.start());
        edu.stop().await;
    }
}
