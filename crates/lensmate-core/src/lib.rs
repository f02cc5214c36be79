//! # lensmate-core
//!
//! LENSMATE 도메인 모델, 포트(trait) 정의, 에러 타입.
//! 장면 분석 → 제안 생성 → 액션 적용 파이프라인의 모든 crate가 공유하는
//! 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`]: 프레임, 분석 결과, 디바이스 상태, 제안
//! - [`ports`]: Hexagonal Architecture 포트 인터페이스 (async_trait)
//! - [`error`]: 핵심 에러 타입 (thiserror)
//! - [`config`]: 애플리케이션 설정 구조체
//! - [`config_manager`]: 설정 파일 관리 (로드/저장)

pub mod config;
pub mod config_manager;
pub mod error;
pub mod models;
pub mod ports;
