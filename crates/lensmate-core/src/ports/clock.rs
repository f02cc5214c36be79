//! 시계 포트.
//!
//! 스로틀(밀리초 간격)과 일일 쿼터(날짜 변경) 판정에 쓰인다.
//! 테스트에서는 수동 시계로 교체한다.

use chrono::{Local, NaiveDate};

/// 벽시계
pub trait Clock: Send + Sync {
    /// 현재 시각 (epoch 밀리초)
    fn now_millis(&self) -> i64;

    /// 오늘 날짜 (로컬)
    fn today(&self) -> NaiveDate;
}

/// 시스템 시계
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Local::now().timestamp_millis()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
