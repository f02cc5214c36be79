//! 호출 간격 제한.
//!
//! 마지막으로 수락된 요청 이후 최소 간격이 지나지 않으면 거절한다.
//! 거절은 에러가 아니라 "잠시 후 다시 시도" 신호다.

/// 최소 호출 간격 게이트
#[derive(Debug, Clone)]
pub struct Throttle {
    /// 최소 간격 (밀리초)
    interval_ms: i64,
    /// 마지막 수락 시각 (epoch 밀리초)
    last_accepted_ms: Option<i64>,
}

impl Throttle {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms as i64,
            last_accepted_ms: None,
        }
    }

    /// 현재 시각에 요청을 수락할 수 있으면 시각을 기록하고 true
    pub fn try_acquire(&mut self, now_ms: i64) -> bool {
        if let Some(last) = self.last_accepted_ms {
            if now_ms - last < self.interval_ms {
                return false;
            }
        }
        self.last_accepted_ms = Some(now_ms);
        true
    }

    /// 다음 수락까지 남은 시간 (밀리초)
    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        match self.last_accepted_ms {
            Some(last) => (self.interval_ms - (now_ms - last)).max(0),
            None => 0,
        }
    }
}
