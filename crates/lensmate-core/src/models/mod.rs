//! LENSMATE 도메인 모델.
//!
//! 파이프라인 단계 사이를 오가는 값 객체를 정의한다.
//! `Frame`을 제외한 모든 모델은 `serde` Serialize/Deserialize를 구현한다.

pub mod analysis;
pub mod device;
pub mod frame;
pub mod suggestion;
