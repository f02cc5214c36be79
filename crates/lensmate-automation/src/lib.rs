//! # lensmate-automation
//!
//! 제안 액션을 카메라 제어 호출로 바꿔 적용하고,
//! 디바이스 상태가 실제로 바뀌었는지 검증한 뒤 액션별 결과를 집계한다.
//! 같은 카메라에 대한 적용은 항상 순차로 실행된다.

pub mod applier;

pub use applier::{ActionApplier, ActionOutcome, BatchOutcome};
