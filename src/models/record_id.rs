use serde::{Deserialize, Deserializer};

/// 后端返回的记录 ID，可能是字符串也可能是数字
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// 取记录 ID：`_id` 优先，其次 `id`，空字符串视为缺失
pub(crate) fn pick_id(mongo_id: Option<RawId>, id: Option<RawId>) -> Option<String> {
    mongo_id
        .map(RawId::into_string)
        .filter(|v| !v.is_empty())
        .or_else(|| id.map(RawId::into_string).filter(|v| !v.is_empty()))
}

/// 字符串字段：`null` 和缺失都按空字符串处理
pub(crate) fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
