//! 외부로 노출되는 리스너 포트.
//!
//! 교육 모드 팁은 한 번에 하나씩, 일괄 적용 결과는
//! 사람이 읽는 메시지와 액션별 성공 여부 맵으로 전달된다.

use std::collections::HashMap;

use crate::models::suggestion::{EducationTip, QuickActionKind};

/// 제안/적용 결과 수신자
pub trait SuggestionListener: Send + Sync {
    /// 교육 모드 팁 하나 수신
    fn on_suggestion(&self, tip: EducationTip);

    /// 일괄 적용 결과 수신
    fn on_batch_applied(&self, _message: &str, _outcomes: &HashMap<QuickActionKind, bool>) {}
}
