/// 实验室后端 API 客户端
///
/// 封装所有与 `/lab`、`/exams`、`/agent` 接口的交互，不做重试。
use crate::config::Config;
use crate::error::{ApiError, AppResult, ConfigError};
use crate::models::{Device, Exam, ExamPatch, Lab, LabDraft, NewExam};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::debug;

/// 实验室 API 客户端
#[derive(Clone)]
pub struct LabApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl LabApiClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let base_url = config.api_base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "api_base_url",
                value: config.api_base_url.clone(),
                reason: "不能为空",
            }
            .into());
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("lab-console"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self { http, base_url })
    }

    /// 获取所有实验室
    pub async fn list_labs(&self) -> Result<Vec<Lab>, ApiError> {
        let endpoint = "/lab/labs";
        self.send_json(endpoint, self.http.get(self.url(endpoint))).await
    }

    /// 创建实验室，返回带服务端 ID 的记录
    pub async fn create_lab(&self, draft: &LabDraft) -> Result<Lab, ApiError> {
        let endpoint = "/lab/addlabs";
        debug!("创建实验室 Payload: {:?}", draft);
        self.send_json(endpoint, self.http.post(self.url(endpoint)).json(draft))
            .await
    }

    /// 修改实验室名称和描述（响应体不使用）
    pub async fn update_lab(&self, lab_id: &str, draft: &LabDraft) -> Result<(), ApiError> {
        let endpoint = format!("/lab/labs/{}", lab_id);
        self.send_ack(&endpoint, self.http.put(self.url(&endpoint)).json(draft))
            .await
    }

    /// 获取实验室下的考试
    pub async fn list_exams(&self, lab_id: &str) -> Result<Vec<Exam>, ApiError> {
        let endpoint = "/exams";
        let request = self
            .http
            .get(self.url(endpoint))
            .query(&[("labId", lab_id)]);
        self.send_json(endpoint, request).await
    }

    /// 创建考试
    pub async fn create_exam(&self, exam: &NewExam) -> Result<Exam, ApiError> {
        let endpoint = "/exams";
        debug!("创建考试 Payload: {:?}", exam);
        self.send_json(endpoint, self.http.post(self.url(endpoint)).json(exam))
            .await
    }

    /// 部分更新考试，返回服务端确认后的字段
    pub async fn update_exam(
        &self,
        exam_id: &str,
        patch: &ExamPatch,
    ) -> Result<ExamPatch, ApiError> {
        let endpoint = format!("/exams/{}", exam_id);
        debug!("更新考试 {} Payload: {:?}", exam_id, patch);
        self.send_json(&endpoint, self.http.put(self.url(&endpoint)).json(patch))
            .await
    }

    /// 删除考试
    pub async fn delete_exam(&self, exam_id: &str) -> Result<(), ApiError> {
        let endpoint = format!("/exams/{}", exam_id);
        self.send_ack(&endpoint, self.http.delete(self.url(&endpoint)))
            .await
    }

    /// 获取实验室下的设备
    pub async fn list_devices(&self, lab_id: &str) -> Result<Vec<Device>, ApiError> {
        let endpoint = format!("/agent/agents/lab/{}", lab_id);
        self.send_json(&endpoint, self.http.get(self.url(&endpoint)))
            .await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// 发送请求并把 2xx 响应体解析为 `T`
    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send(endpoint, request).await?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    /// 发送请求，只关心是否成功
    async fn send_ack(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<(), ApiError> {
        self.send(endpoint, request).await.map(|_| ())
    }

    async fn send(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<String, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|source| ApiError::RequestFailed {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ApiError::RequestFailed {
                endpoint: endpoint.to_string(),
                source,
            })?;

        if !status.is_success() {
            return Err(ApiError::BadStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: crate::utils::truncate_text(&body, 200),
            });
        }

        debug!(
            "{} 响应 {}: {}",
            endpoint,
            status.as_u16(),
            crate::utils::truncate_text(&body, 200)
        );
        Ok(body)
    }
}
