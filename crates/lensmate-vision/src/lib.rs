//! # lensmate-vision
//!
//! 장면 분석 크레이트.
//! 프리뷰 프레임에서 밝기, 선명도, 노출, 구도, 수평선, 색 균형 등
//! 장면 지표를 추출하고, 백엔드 첨부용 프리뷰를 축소/인코딩한다.
//! `scrfd` 기능을 켜면 OpenVINO SCRFD 얼굴 검출기를 함께 제공한다.

pub mod analyzer;
pub mod face;
pub mod metrics;
pub mod preview;
pub mod resize;

pub use analyzer::SceneAnalyzer;
pub use preview::PreviewEncoder;
