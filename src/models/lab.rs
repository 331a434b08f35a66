use serde::{Deserialize, Serialize};

use super::record_id::{pick_id, string_or_empty, RawId};

/// 实验室记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "LabRecord")]
pub struct Lab {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub lab_type: Option<String>,
}

impl Lab {
    /// 列表中找不到时的占位实验室
    pub fn unknown(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: "Unknown Lab".to_string(),
            description: String::new(),
            status: String::new(),
            lab_type: None,
        }
    }
}

#[derive(Deserialize)]
struct LabRecord {
    #[serde(rename = "_id")]
    mongo_id: Option<RawId>,
    id: Option<RawId>,
    #[serde(default, deserialize_with = "string_or_empty")]
    name: String,
    description: Option<String>,
    status: Option<String>,
    #[serde(rename = "type")]
    lab_type: Option<String>,
}

impl TryFrom<LabRecord> for Lab {
    type Error = String;

    fn try_from(record: LabRecord) -> Result<Self, Self::Error> {
        let id = pick_id(record.mongo_id, record.id)
            .ok_or_else(|| format!("实验室记录缺少 _id/id 字段 (名称: {})", record.name))?;

        Ok(Self {
            id,
            name: record.name,
            description: record.description.unwrap_or_default(),
            status: record.status.unwrap_or_default(),
            lab_type: record.lab_type,
        })
    }
}

/// 创建 / 编辑实验室的请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabDraft {
    pub name: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_lab() {
        let lab: Lab = serde_json::from_value(json!({
            "_id": "lab-1",
            "name": "Physics Lab",
            "description": "Motion and forces",
            "status": "Available",
            "type": "Physics"
        }))
        .unwrap();

        assert_eq!(lab.id, "lab-1");
        assert_eq!(lab.lab_type.as_deref(), Some("Physics"));
    }

    #[test]
    fn test_deserialize_lab_without_optional_fields() {
        let lab: Lab = serde_json::from_value(json!({ "id": 3, "name": "Room 3" })).unwrap();
        assert_eq!(lab.id, "3");
        assert_eq!(lab.description, "");
        assert_eq!(lab.status, "");
    }

    #[test]
    fn test_null_fields_do_not_break_lab_list() {
        let labs: Vec<Lab> = serde_json::from_value(json!([
            { "_id": "lab-1", "name": "Physics Lab", "status": "Available" },
            { "_id": "lab-2", "name": null, "description": null, "status": null, "type": null }
        ]))
        .unwrap();

        assert_eq!(labs.len(), 2);
        assert_eq!(labs[1].id, "lab-2");
        assert_eq!(labs[1].name, "");
        assert_eq!(labs[1].status, "");
    }
}
