//! 本地时间戳解析
//!
//! 考试的自动开关时间来自 `datetime-local` 输入框，形如 `2025-01-01T10:00`，
//! 不带时区，按本地时间理解。

use chrono::{DateTime, Local, NaiveDateTime};

/// `datetime-local` 输入框使用的格式（精确到分钟）
pub const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

const ACCEPTED_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", DATETIME_LOCAL_FORMAT];

/// 解析本地时间，无法解析时返回 `None`
///
/// 带时区偏移的 RFC 3339 字符串会先转换到本地时区。
pub fn parse_local(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// 格式化为 `datetime-local` 字符串
pub fn format_local(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_LOCAL_FORMAT).to_string()
}
