//! 실행 가능한 제안 서비스.
//!
//! 한 번의 `get_suggestions` 호출은 다음 순서로만 진행된다.
//!
//! 1. 호출 간격 게이트: 간격 미달이면 빈 목록 (재시도 신호)
//! 2. 일일 할당량 게이트: 소진 시 폴백
//! 3. 요청 구성: 프롬프트 + (분석이 있고 프리뷰를 얻을 수 있으면) 축소 JPEG
//! 4. 원격 호출: 타임아웃 포함. 모든 실패는 "백엔드 사용 불가"로 보고 폴백
//! 5. 응답 파싱: 실패 시 폴백
//! 6. 중복 제거: 최근 제목 창과 겹치는 제안 제외. 전부 겹치면 폴백
//!
//! 어떤 경우에도 호출자에게 에러를 돌려주지 않는다.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use lensmate_core::config::{AppConfig, ReasoningConfig, SuggestionConfig};
use lensmate_core::error::CoreError;
use lensmate_core::models::analysis::FrameAnalysis;
use lensmate_core::models::device::DeviceState;
use lensmate_core::models::suggestion::ActionableSuggestion;
use lensmate_core::ports::camera_control::CameraControl;
use lensmate_core::ports::clock::{Clock, SystemClock};
use lensmate_core::ports::reasoning::{InlineImage, ReasoningBackend, ReasoningRequest};
use lensmate_vision::PreviewEncoder;

use crate::fallback::fallback_suggestions;
use crate::history::HistoryWindow;
use crate::parser::parse_suggestions;
use crate::prompt::build_prompt;
use crate::quota::QuotaTracker;
use crate::throttle::Throttle;

/// 로그에 남기는 원문 최대 길이
const RAW_PREVIEW_CHARS: usize = 200;

/// 호출 간 유지되는 상태 (간격/할당량/이력)
#[derive(Debug)]
struct GateState {
    throttle: Throttle,
    quota: QuotaTracker,
    history: HistoryWindow,
}

/// 게이트 통과 결과
enum Gate {
    /// 간격 미달
    Throttled,
    /// 할당량 소진 또는 백엔드 없음
    Fallback,
    /// 원격 호출 진행
    Remote,
}

/// 제안 서비스
pub struct SuggestionService {
    /// 원격 추론 백엔드 (None이면 항상 폴백)
    backend: Option<Arc<dyn ReasoningBackend>>,
    /// 프리뷰 이미지를 얻을 카메라
    preview_source: Option<Arc<dyn CameraControl>>,
    encoder: PreviewEncoder,
    clock: Arc<dyn Clock>,
    config: SuggestionConfig,
    reasoning: ReasoningConfig,
    state: Mutex<GateState>,
}

impl SuggestionService {
    /// 원격 백엔드를 사용하는 서비스
    pub fn new(backend: Arc<dyn ReasoningBackend>, config: &AppConfig) -> Self {
        Self::build(Some(backend), config)
    }

    /// 원격 백엔드 없이 폴백만 내는 서비스 (API 키 미설정 등)
    pub fn offline(config: &AppConfig) -> Self {
        Self::build(None, config)
    }

    fn build(backend: Option<Arc<dyn ReasoningBackend>>, config: &AppConfig) -> Self {
        let suggestion = config.suggestion.clone();
        Self {
            backend,
            preview_source: None,
            encoder: PreviewEncoder::from_config(&config.preview),
            clock: Arc::new(SystemClock),
            state: Mutex::new(GateState {
                throttle: Throttle::new(suggestion.throttle_ms),
                quota: QuotaTracker::new(suggestion.max_daily_calls),
                history: HistoryWindow::new(suggestion.history_capacity),
            }),
            config: suggestion,
            reasoning: config.reasoning.clone(),
        }
    }

    /// 시계 교체 (테스트용 수동 시계 등)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// 멀티모달 요청에 첨부할 프리뷰 공급원 지정
    pub fn with_preview_source(mut self, camera: Arc<dyn CameraControl>) -> Self {
        self.preview_source = Some(camera);
        self
    }

    /// 원격 백엔드 사용 여부
    pub fn is_online(&self) -> bool {
        self.backend.is_some()
    }

    /// 오늘 남은 원격 호출 수
    pub fn remaining_quota(&self) -> u32 {
        let today = self.clock.today();
        self.state.lock().quota.remaining(today)
    }

    /// 규칙 기반 폴백 제안
    pub fn fallback(
        &self,
        state: &DeviceState,
        analysis: Option<&FrameAnalysis>,
    ) -> Vec<ActionableSuggestion> {
        fallback_suggestions(state, analysis, self.config.max_fallback)
    }

    /// 제안 조회 (최대 `max_suggestions`개, 우선순위 오름차순)
    ///
    /// 간격 미달이면 빈 목록을 돌려준다.
    pub async fn get_suggestions(
        &self,
        state: &DeviceState,
        analysis: Option<&FrameAnalysis>,
    ) -> Vec<ActionableSuggestion> {
        let backend = match self.pass_gates() {
            Gate::Throttled => return Vec::new(),
            Gate::Fallback => return self.fallback(state, analysis),
            Gate::Remote => match &self.backend {
                Some(backend) => backend.clone(),
                None => return self.fallback(state, analysis),
            },
        };

        let request = self.build_request(state, analysis).await;

        let raw = match self.invoke(backend.as_ref(), &request).await {
            Ok(text) => text,
            Err(e) => {
                warn!(backend = backend.backend_name(), "추론 백엔드 사용 불가, 폴백 사용: {e}");
                return self.fallback(state, analysis);
            }
        };

        let parsed = match parse_suggestions(&raw, self.config.max_suggestions) {
            Ok(parsed) => parsed,
            Err(e) => {
                let preview: String = raw.chars().take(RAW_PREVIEW_CHARS).collect();
                warn!(raw = %preview, "제안 응답 파싱 실패, 폴백 사용: {e}");
                return self.fallback(state, analysis);
            }
        };

        let mut fresh = self.filter_seen(parsed);
        if fresh.is_empty() {
            debug!("새 제안 없음 (전부 중복 또는 빈 배열), 폴백 사용");
            return self.fallback(state, analysis);
        }

        fresh.sort_by_key(|s| s.priority);
        fresh.truncate(self.config.max_suggestions);
        info!(count = fresh.len(), "원격 제안 수신");
        fresh
    }

    fn pass_gates(&self) -> Gate {
        let now = self.clock.now_millis();
        let today = self.clock.today();
        let mut gate = self.state.lock();

        if !gate.throttle.try_acquire(now) {
            debug!(
                remaining_ms = gate.throttle.remaining_ms(now),
                "호출 간격 미달, 요청 거절"
            );
            return Gate::Throttled;
        }

        if self.backend.is_none() {
            return Gate::Fallback;
        }

        if !gate.quota.try_consume(today) {
            warn!(
                max_daily_calls = self.config.max_daily_calls,
                "일일 호출 할당량 소진, 폴백 사용"
            );
            return Gate::Fallback;
        }

        debug!(used = gate.quota.used(), "원격 호출 할당량 소모");
        Gate::Remote
    }

    async fn build_request(
        &self,
        state: &DeviceState,
        analysis: Option<&FrameAnalysis>,
    ) -> ReasoningRequest {
        let usable = FrameAnalysis::usable(analysis);
        let prompt = build_prompt(state, usable);

        let image = match usable {
            Some(_) => self.capture_preview().await,
            None => None,
        };

        let generation = if image.is_some() {
            self.reasoning.image_generation
        } else {
            self.reasoning.text_generation
        };

        ReasoningRequest {
            prompt,
            image,
            generation,
        }
    }

    /// 프리뷰 캡처 + 인코딩. 실패하면 텍스트 전용 요청으로 진행
    async fn capture_preview(&self) -> Option<InlineImage> {
        let camera = self.preview_source.as_ref()?;

        let frame = match camera.capture_preview().await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                debug!("프리뷰 없음, 텍스트 전용 요청");
                return None;
            }
            Err(e) => {
                warn!("프리뷰 캡처 실패, 텍스트 전용 요청: {e}");
                return None;
            }
        };

        match self.encoder.encode(&frame) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("프리뷰 인코딩 실패, 텍스트 전용 요청: {e}");
                None
            }
        }
    }

    async fn invoke(
        &self,
        backend: &dyn ReasoningBackend,
        request: &ReasoningRequest,
    ) -> Result<String, CoreError> {
        let timeout = self.config.call_timeout();
        match tokio::time::timeout(timeout, backend.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(CoreError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    /// 최근 제목 창에 없는 제안만 남기고 창에 기록
    fn filter_seen(&self, parsed: Vec<ActionableSuggestion>) -> Vec<ActionableSuggestion> {
        let mut gate = self.state.lock();
        parsed
            .into_iter()
            .filter(|s| {
                if gate.history.contains(&s.title) {
                    debug!(title = %s.title, "최근 제안과 중복, 제외");
                    false
                } else {
                    gate.history.record(&s.title);
                    true
                }
            })
            .collect()
    }
}

// ============================================================
// 테스트
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use lensmate_core::models::device::FlashMode;
    use lensmate_core::models::suggestion::QuickActionKind;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    /// 수동으로 움직이는 시계
    struct ManualClock {
        now_ms: AtomicI64,
        day: Mutex<NaiveDate>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                now_ms: AtomicI64::new(1_000_000),
                day: Mutex::new(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()),
            }
        }

        fn advance(&self, ms: i64) {
            self.now_ms.fetch_add(ms, Ordering::SeqCst);
        }

        fn next_day(&self) {
            let mut day = self.day.lock();
            *day = day.succ_opt().unwrap();
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> i64 {
            self.now_ms.load(Ordering::SeqCst)
        }

        fn today(&self) -> NaiveDate {
            *self.day.lock()
        }
    }

    /// 호출 횟수를 세며 미리 정한 응답(들)을 돌려주는 백엔드
    struct CountingBackend {
        calls: AtomicUsize,
        responses: Mutex<Vec<Result<String, String>>>,
        last_request: Mutex<Option<ReasoningRequest>>,
    }

    impl CountingBackend {
        fn replying(text: &str) -> Self {
            Self::sequence(vec![Ok(text.to_string())])
        }

        fn failing() -> Self {
            Self::sequence(vec![Err("down".to_string())])
        }

        /// 응답을 순서대로 소비, 마지막 응답은 계속 반복
        fn sequence(responses: Vec<Result<String, String>>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                responses: Mutex::new(responses),
                last_request: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReasoningBackend for CountingBackend {
        async fn generate(&self, request: &ReasoningRequest) -> Result<String, CoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock() = Some(request.clone());
            let mut responses = self.responses.lock();
            let next = if responses.len() > 1 {
                responses.remove(0)
            } else {
                responses[0].clone()
            };
            next.map_err(CoreError::ServiceUnavailable)
        }

        fn backend_name(&self) -> &str {
            "counting"
        }
    }

    fn suggestions_json(titles: &[&str]) -> String {
        let items: Vec<String> = titles
            .iter()
            .map(|t| format!(r#"{{"title":"{t}","description":"d","action":"FLASH_ON","icon":"⚡","priority":1}}"#))
            .collect();
        format!(r#"{{"suggestions":[{}]}}"#, items.join(","))
    }

    fn service(backend: Arc<CountingBackend>, clock: Arc<ManualClock>) -> SuggestionService {
        SuggestionService::new(backend, &AppConfig::default()).with_clock(clock)
    }

    fn dark_state() -> DeviceState {
        DeviceState {
            flash_mode: FlashMode::Off,
            low_light: true,
            ..DeviceState::default()
        }
    }

    #[tokio::test]
    async fn parses_remote_suggestions() {
        let backend = Arc::new(CountingBackend::replying(&format!(
            "Here you go: {} Thanks",
            suggestions_json(&["Turn Flash On"])
        )));
        let svc = service(backend.clone(), Arc::new(ManualClock::new()));

        let out = svc.get_suggestions(&DeviceState::default(), None).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].action, QuickActionKind::FlashOn);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn second_call_within_throttle_is_empty() {
        let backend = Arc::new(CountingBackend::replying(&suggestions_json(&["a"])));
        let clock = Arc::new(ManualClock::new());
        let svc = service(backend.clone(), clock.clone());

        assert!(!svc.get_suggestions(&DeviceState::default(), None).await.is_empty());
        clock.advance(2999);
        assert!(svc.get_suggestions(&DeviceState::default(), None).await.is_empty());
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn quota_exhaustion_falls_back_without_network() {
        let backend = Arc::new(CountingBackend::failing());
        let clock = Arc::new(ManualClock::new());
        let svc = service(backend.clone(), clock.clone());

        for _ in 0..40 {
            svc.get_suggestions(&dark_state(), None).await;
            clock.advance(3000);
        }
        assert_eq!(backend.calls(), 40);
        assert_eq!(svc.remaining_quota(), 0);

        let out = svc.get_suggestions(&dark_state(), None).await;
        assert_eq!(backend.calls(), 40);
        assert_eq!(out[0].action, QuickActionKind::FlashOn);

        clock.next_day();
        clock.advance(3000);
        svc.get_suggestions(&dark_state(), None).await;
        assert_eq!(backend.calls(), 41);
    }

    #[tokio::test]
    async fn backend_failure_uses_fallback() {
        let backend = Arc::new(CountingBackend::failing());
        let svc = service(backend, Arc::new(ManualClock::new()));

        let out = svc.get_suggestions(&dark_state(), None).await;
        assert!(!out.is_empty());
        assert_eq!(out[0].action, QuickActionKind::FlashOn);
    }

    #[tokio::test]
    async fn unparseable_reply_uses_fallback() {
        let backend = Arc::new(CountingBackend::replying("Just turn on your flash, buddy"));
        let svc = service(backend, Arc::new(ManualClock::new()));

        let out = svc.get_suggestions(&dark_state(), None).await;
        assert_eq!(out[0].title, "Turn on Flash");
    }

    #[tokio::test]
    async fn duplicate_titles_are_filtered() {
        let backend = Arc::new(CountingBackend::sequence(vec![
            Ok(suggestions_json(&["A", "B"])),
            Ok(suggestions_json(&["A", "C"])),
        ]));
        let clock = Arc::new(ManualClock::new());
        let svc = service(backend, clock.clone());

        let first = svc.get_suggestions(&DeviceState::default(), None).await;
        assert_eq!(first.len(), 2);

        clock.advance(3000);
        let second = svc.get_suggestions(&DeviceState::default(), None).await;
        let titles: Vec<_> = second.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["C"]);
    }

    #[tokio::test]
    async fn all_duplicates_fall_back() {
        let backend = Arc::new(CountingBackend::replying(&suggestions_json(&["A"])));
        let clock = Arc::new(ManualClock::new());
        let svc = service(backend, clock.clone());

        svc.get_suggestions(&DeviceState::default(), None).await;
        clock.advance(3000);
        let out = svc.get_suggestions(&DeviceState::default(), None).await;
        assert_eq!(out[0].title, "Enable Grid");
    }

    #[tokio::test]
    async fn history_clears_after_capacity() {
        let titles: Vec<String> = (0..20).map(|i| format!("T{i}")).collect();
        let mut responses: Vec<Result<String, String>> = titles
            .chunks(4)
            .map(|chunk| {
                let refs: Vec<&str> = chunk.iter().map(String::as_str).collect();
                Ok(suggestions_json(&refs))
            })
            .collect();
        responses.push(Ok(suggestions_json(&["T0"])));
        let backend = Arc::new(CountingBackend::sequence(responses));
        let clock = Arc::new(ManualClock::new());
        let svc = service(backend, clock.clone());

        for _ in 0..5 {
            assert_eq!(svc.get_suggestions(&DeviceState::default(), None).await.len(), 4);
            clock.advance(3000);
        }
        let again = svc.get_suggestions(&DeviceState::default(), None).await;
        assert_eq!(again[0].title, "T0");
    }

    #[tokio::test]
    async fn results_are_sorted_and_capped() {
        let reply = r#"{"suggestions":[
            {"title":"low","action":"GRID_ON","priority":3},
            {"title":"high","action":"FLASH_ON","priority":1},
            {"title":"mid","action":"ZOOM_IN","priority":2}
        ]}"#;
        let backend = Arc::new(CountingBackend::replying(reply));
        let svc = service(backend, Arc::new(ManualClock::new()));

        let out = svc.get_suggestions(&DeviceState::default(), None).await;
        let titles: Vec<_> = out.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["high", "mid", "low"]);
    }

    #[tokio::test]
    async fn text_only_request_uses_text_generation() {
        let backend = Arc::new(CountingBackend::replying(&suggestions_json(&["A"])));
        let svc = service(backend.clone(), Arc::new(ManualClock::new()));

        let analysis = FrameAnalysis {
            brightness: 120.0,
            analysis_success: true,
            ..FrameAnalysis::failed()
        };
        svc.get_suggestions(&DeviceState::default(), Some(&analysis)).await;

        let request = backend.last_request.lock().clone().unwrap();
        assert!(request.image.is_none());
        assert_eq!(request.generation.max_output_tokens, 1000);
        assert!(request.prompt.contains("- Brightness: 120/255"));
    }

    #[tokio::test]
    async fn offline_service_only_falls_back() {
        let svc = SuggestionService::offline(&AppConfig::default())
            .with_clock(Arc::new(ManualClock::new()));
        assert!(!svc.is_online());

        let out = svc.get_suggestions(&dark_state(), None).await;
        assert_eq!(out[0].action, QuickActionKind::FlashOn);
        assert!(svc.get_suggestions(&dark_state(), None).await.is_empty());
    }
}
