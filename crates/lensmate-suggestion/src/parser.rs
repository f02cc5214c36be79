//! 백엔드 응답 파싱.
//!
//! 응답 텍스트는 신뢰할 수 없는 자유 형식이다.
//! 첫 `{`부터 마지막 `}`까지 잘라 JSON으로 해석하고,
//! `suggestions` 배열의 각 원소를 필드별 기본값과 함께 `ActionableSuggestion`으로 변환한다.

use lensmate_core::error::CoreError;
use lensmate_core::models::suggestion::{ActionableSuggestion, QuickActionKind, SuggestionIcon};
use serde_json::Value;

/// 우선순위 허용 범위
const MIN_PRIORITY: u8 = 1;
const MAX_PRIORITY: u8 = 5;

/// 기본 우선순위 (필드 누락 시)
const DEFAULT_PRIORITY: u8 = 1;

/// 텍스트에서 JSON 객체 구간 추출
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// 응답 텍스트 → 제안 목록 (앞에서부터 최대 `limit`개)
///
/// 중괄호가 없거나 JSON이 아니거나 `suggestions` 배열이 없으면 `CoreError::Parse`.
pub fn parse_suggestions(text: &str, limit: usize) -> Result<Vec<ActionableSuggestion>, CoreError> {
    let json = extract_json_object(text)
        .ok_or_else(|| CoreError::Parse("응답에 JSON 객체 없음".to_string()))?;

    let root: Value = serde_json::from_str(json)
        .map_err(|e| CoreError::Parse(format!("제안 JSON 파싱 실패: {e}")))?;

    let items = root
        .get("suggestions")
        .and_then(Value::as_array)
        .ok_or_else(|| CoreError::Parse("suggestions 배열 없음".to_string()))?;

    Ok(items
        .iter()
        .take(limit)
        .filter_map(Value::as_object)
        .map(parse_item)
        .collect())
}

fn string_field<'a>(item: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a str> {
    item.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn priority_field(item: &serde_json::Map<String, Value>) -> u8 {
    let raw = match item.get("priority") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    raw.map(|p| p.clamp(MIN_PRIORITY as i64, MAX_PRIORITY as i64) as u8)
        .unwrap_or(DEFAULT_PRIORITY)
}

fn parse_item(item: &serde_json::Map<String, Value>) -> ActionableSuggestion {
    let action = string_field(item, "action")
        .map(QuickActionKind::from_action_str)
        .unwrap_or(QuickActionKind::HoldSteady);

    let title = string_field(item, "title")
        .map(str::to_string)
        .unwrap_or_else(|| action.label().to_string());

    let icon = string_field(item, "icon")
        .map(SuggestionIcon::glyph)
        .unwrap_or_default();

    ActionableSuggestion {
        title,
        description: string_field(item, "description")
            .unwrap_or_default()
            .to_string(),
        action,
        icon,
        priority: priority_field(item),
        target_value: string_field(item, "action_value").map(str::to_string),
        current_value: None,
    }
}
