//! 일일 원격 호출 할당량.
//!
//! 날짜가 바뀌면 카운터를 0으로 되돌린다.
//! 카운터는 호출 시도 직전에 증가하므로 실패한 호출도 할당량을 소모한다.

use chrono::NaiveDate;

/// 일일 호출 할당량 추적기
#[derive(Debug, Clone)]
pub struct QuotaTracker {
    /// 하루 최대 호출 수
    max_daily_calls: u32,
    /// 오늘 호출 수
    daily_call_count: u32,
    /// 마지막 리셋 날짜
    last_reset_date: Option<NaiveDate>,
}

impl QuotaTracker {
    pub fn new(max_daily_calls: u32) -> Self {
        Self {
            max_daily_calls,
            daily_call_count: 0,
            last_reset_date: None,
        }
    }

    fn roll_over(&mut self, today: NaiveDate) {
        if self.last_reset_date != Some(today) {
            self.daily_call_count = 0;
            self.last_reset_date = Some(today);
        }
    }

    /// 할당량이 남아있으면 1 소모하고 true
    pub fn try_consume(&mut self, today: NaiveDate) -> bool {
        self.roll_over(today);
        if self.daily_call_count >= self.max_daily_calls {
            return false;
        }
        self.daily_call_count += 1;
        true
    }

    /// 오늘 남은 호출 수
    pub fn remaining(&mut self, today: NaiveDate) -> u32 {
        self.roll_over(today);
        self.max_daily_calls.saturating_sub(self.daily_call_count)
    }

    /// 오늘 사용한 호출 수 (리셋 적용 전 값)
    pub fn used(&self) -> u32 {
        self.daily_call_count
    }
}
