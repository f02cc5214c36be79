//! # lensmate-suggestion
//!
//! 제안 파이프라인.
//! 디바이스 상태와 프레임 분석을 원격 추론 백엔드로 보내 실행 가능한 제안을 받고,
//! 호출 간격/일일 할당량을 관리하며, 실패 시 규칙 기반 폴백 제안을 만든다.
//! 교육 모드에서는 주기적으로 제안을 리스너에 전달한다.

pub mod education;
pub mod fallback;
pub mod history;
pub mod parser;
pub mod prompt;
pub mod quota;
pub mod service;
pub mod throttle;

pub use education::{CameraSuggestionSource, EducationLoop, SuggestionSource};
pub use service::SuggestionService;
