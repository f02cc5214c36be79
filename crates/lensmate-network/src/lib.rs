//! # lensmate-network
//!
//! 원격 추론 백엔드 어댑터.
//! `ReasoningBackend` 포트를 구현하는 HTTPS 클라이언트를 제공한다.

pub mod gemini_client;

pub use gemini_client::GeminiClient;
