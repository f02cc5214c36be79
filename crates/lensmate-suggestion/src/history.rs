//! 최근 제안 제목 창.
//!
//! 같은 제목이 연달아 나오지 않도록 최근 발행한 제목을 기억한다.
//! 용량에 도달하면 통째로 비운다 (영구 기록 아님).

use std::collections::HashSet;

/// 제목 기반 중복 제거 창
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    titles: HashSet<String>,
    capacity: usize,
}

impl HistoryWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            titles: HashSet::new(),
            capacity: capacity.max(1),
        }
    }

    /// 이미 발행한 제목인지
    pub fn contains(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    /// 제목 기록. 용량에 도달하면 창을 비운다
    pub fn record(&mut self, title: &str) {
        self.titles.insert(title.to_string());
        if self.titles.len() >= self.capacity {
            self.titles.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembers_recorded_titles() {
        let mut history = HistoryWindow::new(20);
        history.record("Turn Flash On");
        assert!(history.contains("Turn Flash On"));
        assert!(!history.contains("turn flash on"));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn clears_when_capacity_reached() {
        let mut history = HistoryWindow::new(20);
        for i in 0..19 {
            history.record(&format!("tip {i}"));
        }
        assert!(history.contains("tip 0"));
        assert_eq!(history.len(), 19);

        history.record("tip 19");
        assert!(history.is_empty());
        assert!(!history.contains("tip 0"));
    }

    #[test]
    fn duplicate_record_does_not_grow() {
        let mut history = HistoryWindow::new(3);
        history.record("a");
        history.record("a");
        assert_eq!(history.len(), 1);
    }
}
