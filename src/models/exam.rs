use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::record_id::{pick_id, string_or_empty, RawId};
use super::timestamp::parse_local;

/// 考试状态
///
/// `Stopped` / `Running` 由用户手动切换，`Ongoing` 只由自动模式的时间窗口产生。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>")]
pub enum ExamStatus {
    #[default]
    Stopped,
    Running,
    Ongoing,
}

impl ExamStatus {
    pub fn name(self) -> &'static str {
        match self {
            ExamStatus::Stopped => "Stopped",
            ExamStatus::Running => "Running",
            ExamStatus::Ongoing => "Ongoing",
        }
    }

    /// 正在进行（手动启动或处于自动窗口内）
    pub fn is_active(self) -> bool {
        matches!(self, ExamStatus::Running | ExamStatus::Ongoing)
    }

    /// 手动切换后的状态
    pub fn toggled(self) -> Self {
        if self.is_active() {
            ExamStatus::Stopped
        } else {
            ExamStatus::Running
        }
    }
}

/// 后端返回未知状态时按 `Stopped` 处理，避免整个列表解析失败
impl From<Option<String>> for ExamStatus {
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("Running") => ExamStatus::Running,
            Some("Ongoing") => ExamStatus::Ongoing,
            _ => ExamStatus::Stopped,
        }
    }
}

impl std::fmt::Display for ExamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 考试记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ExamRecord")]
pub struct Exam {
    pub id: String,
    pub name: String,
    pub url: String,
    pub status: ExamStatus,
    pub auto_mode: bool,
    /// 自动开启时间，空字符串表示未设置
    pub auto_on_time: String,
    /// 自动关闭时间，空字符串表示未设置
    pub auto_off_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lab_id: Option<String>,
}

impl Exam {
    /// 自动模式的时间窗口，两个时间都能解析时才返回
    pub fn auto_window(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let start = parse_local(&self.auto_on_time)?;
        let end = parse_local(&self.auto_off_time)?;
        Some((start, end))
    }

    /// 自动模式开启且两个时间都已填写（不检查能否解析）
    pub fn has_auto_schedule(&self) -> bool {
        self.auto_mode && !self.auto_on_time.is_empty() && !self.auto_off_time.is_empty()
    }

    pub fn clear_timers(&mut self) {
        self.auto_on_time.clear();
        self.auto_off_time.clear();
    }

    /// 把服务端返回（或本地发送）的部分字段合并进来，缺失的字段保持不变
    pub fn apply(&mut self, patch: &ExamPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(url) = &patch.url {
            self.url = url.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(auto_mode) = patch.auto_mode {
            self.auto_mode = auto_mode;
        }
        if let Some(on) = &patch.auto_on_time {
            self.auto_on_time = on.clone();
        }
        if let Some(off) = &patch.auto_off_time {
            self.auto_off_time = off.clone();
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExamRecord {
    #[serde(rename = "_id")]
    mongo_id: Option<RawId>,
    id: Option<RawId>,
    #[serde(default, deserialize_with = "string_or_empty")]
    name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    url: String,
    #[serde(default)]
    status: ExamStatus,
    auto_mode: Option<bool>,
    auto_on_time: Option<String>,
    auto_off_time: Option<String>,
    lab_id: Option<RawId>,
}

impl TryFrom<ExamRecord> for Exam {
    type Error = String;

    fn try_from(record: ExamRecord) -> Result<Self, Self::Error> {
        let id = pick_id(record.mongo_id, record.id)
            .ok_or_else(|| format!("考试记录缺少 _id/id 字段 (名称: {})", record.name))?;

        Ok(Self {
            id,
            name: record.name,
            url: record.url,
            status: record.status,
            auto_mode: record.auto_mode.unwrap_or(false),
            auto_on_time: record.auto_on_time.unwrap_or_default(),
            auto_off_time: record.auto_off_time.unwrap_or_default(),
            lab_id: pick_id(None, record.lab_id),
        })
    }
}

/// 创建考试的请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExam {
    pub name: String,
    pub url: String,
    pub status: ExamStatus,
    pub auto_mode: bool,
    pub auto_on_time: String,
    pub auto_off_time: String,
    pub lab_id: String,
}

impl NewExam {
    /// 新建考试默认停止、不开启自动模式
    pub fn new(lab_id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            status: ExamStatus::Stopped,
            auto_mode: false,
            auto_on_time: String::new(),
            auto_off_time: String::new(),
            lab_id: lab_id.into(),
        }
    }
}

/// 考试的部分更新
///
/// 既用作 `PUT /exams/:id` 的请求体，也用来解析它的响应，
/// 响应中没有的字段为 `None`，合并时保持本地值。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ExamStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_on_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_off_time: Option<String>,
}

impl ExamPatch {
    pub fn status(status: ExamStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn details(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn auto_mode(
        enabled: bool,
        on_time: impl Into<String>,
        off_time: impl Into<String>,
    ) -> Self {
        Self {
            auto_mode: Some(enabled),
            auto_on_time: Some(on_time.into()),
            auto_off_time: Some(off_time.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_server_exam() {
        let exam: Exam = serde_json::from_value(json!({
            "_id": "65f0a1",
            "name": "Midterm",
            "url": "https://exam.example/mid",
            "status": "Running",
            "autoMode": true,
            "autoOnTime": "2025-01-01T10:00",
            "autoOffTime": "2025-01-01T11:00",
            "labId": "lab-1",
            "__v": 0
        }))
        .unwrap();

        assert_eq!(exam.id, "65f0a1");
        assert_eq!(exam.status, ExamStatus::Running);
        assert!(exam.has_auto_schedule());
        assert_eq!(exam.lab_id.as_deref(), Some("lab-1"));
    }

    #[test]
    fn test_deserialize_sparse_exam() {
        let exam: Exam = serde_json::from_value(json!({
            "id": "e1",
            "name": "Quiz",
            "status": "Paused",
            "autoOnTime": null
        }))
        .unwrap();

        assert_eq!(exam.id, "e1");
        assert_eq!(exam.status, ExamStatus::Stopped);
        assert!(!exam.auto_mode);
        assert_eq!(exam.auto_on_time, "");
        assert_eq!(exam.url, "");
    }

    #[test]
    fn test_null_fields_do_not_break_exam_list() {
        let exams: Vec<Exam> = serde_json::from_value(json!([
            { "_id": "e1", "name": "Midterm", "url": "https://m.example", "status": "Stopped" },
            { "_id": "e2", "name": null, "url": null, "status": null, "autoMode": null,
              "autoOnTime": null, "autoOffTime": null, "labId": null }
        ]))
        .unwrap();

        assert_eq!(exams.len(), 2);
        assert_eq!(exams[1].id, "e2");
        assert_eq!(exams[1].name, "");
        assert_eq!(exams[1].url, "");
        assert_eq!(exams[1].status, ExamStatus::Stopped);
        assert!(!exams[1].has_auto_schedule());
    }

    #[test]
    fn test_exam_without_id_is_rejected() {
        let result = serde_json::from_value::<Exam>(json!({ "name": "Ghost" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_toggled_status() {
        assert_eq!(ExamStatus::Stopped.toggled(), ExamStatus::Running);
        assert_eq!(ExamStatus::Running.toggled(), ExamStatus::Stopped);
        assert_eq!(ExamStatus::Ongoing.toggled(), ExamStatus::Stopped);
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let body = serde_json::to_value(ExamPatch::status(ExamStatus::Running)).unwrap();
        assert_eq!(body, json!({ "status": "Running" }));

        let body = serde_json::to_value(ExamPatch::auto_mode(false, "", "")).unwrap();
        assert_eq!(body, json!({ "autoMode": false, "autoOnTime": "", "autoOffTime": "" }));
    }

    #[test]
    fn test_apply_keeps_missing_fields() {
        let mut exam: Exam = serde_json::from_value(json!({
            "_id": "e1",
            "name": "Quiz",
            "url": "https://q.example",
            "status": "Stopped"
        }))
        .unwrap();

        let response: ExamPatch = serde_json::from_value(json!({
            "_id": "e1",
            "status": "Running"
        }))
        .unwrap();
        exam.apply(&response);

        assert_eq!(exam.status, ExamStatus::Running);
        assert_eq!(exam.name, "Quiz");
        assert_eq!(exam.url, "https://q.example");
    }

    #[test]
    fn test_new_exam_payload_shape() {
        let exam = NewExam::new("lab-1", "Final", "https://f.example");
        let body = serde_json::to_value(exam).unwrap();
        assert_eq!(
            body,
            json!({
                "name": "Final",
                "url": "https://f.example",
                "status": "Stopped",
                "autoMode": false,
                "autoOnTime": "",
                "autoOffTime": "",
                "labId": "lab-1"
            })
        );
    }
}
