use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 某个页面操作失败，携带面向用户的固定提示
    #[error("{}", .op.failure_message())]
    Failed {
        op: Operation,
        #[source]
        source: ApiError,
    },
    /// 提交前的客户端校验失败
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 本地状态中找不到对应记录
    #[error("{kind} 不存在: {id}")]
    NotFound { kind: &'static str, id: String },
    /// 用户在确认提示中选择了取消
    #[error("操作已取消")]
    Cancelled,
}

impl AppError {
    /// 返回给用户看的提示文本
    pub fn user_message(&self) -> String {
        match self {
            AppError::Failed { op, .. } => op.failure_message().to_string(),
            AppError::Validation(e) => e.to_string(),
            AppError::NotFound { kind, id } => format!("{} not found: {}", kind, id),
            AppError::Cancelled => "Cancelled.".to_string(),
            AppError::Config(e) => e.to_string(),
        }
    }

    /// 是否是用户主动取消
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Cancelled)
    }
}

/// 页面上会发起网络请求的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    LoadLabs,
    CreateLab,
    SaveLab,
    LoadExams,
    AddExam,
    SaveExam,
    DeleteExam,
    ToggleStatus,
    ToggleAutoMode,
    SaveAutoMode,
    LoadDevices,
}

impl Operation {
    /// 失败时展示的固定提示
    pub fn failure_message(self) -> &'static str {
        match self {
            Operation::LoadLabs => "Failed to load labs. Please try again.",
            Operation::CreateLab => "Failed to create lab.",
            Operation::SaveLab => "Failed to save lab changes.",
            Operation::LoadExams => "Failed to fetch exams.",
            Operation::AddExam => "Failed to add exam.",
            Operation::SaveExam => "Failed to save exam changes.",
            Operation::DeleteExam => "Failed to delete exam.",
            Operation::ToggleStatus => "Failed to change exam status.",
            Operation::ToggleAutoMode => "Failed to change auto mode.",
            Operation::SaveAutoMode => "Failed to save auto mode.",
            Operation::LoadDevices => "Failed to load devices. Please try again.",
        }
    }
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败（连接、超时等）
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// API 返回非 2xx 响应
    #[error("API返回错误响应 ({endpoint}): status={status}, body={body}")]
    BadStatus {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn endpoint(&self) -> &str {
        match self {
            ApiError::RequestFailed { endpoint, .. }
            | ApiError::BadStatus { endpoint, .. }
            | ApiError::Decode { endpoint, .. } => endpoint,
        }
    }
}

/// 客户端校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 必填字段为空
    #[error("{field} cannot be empty.")]
    EmptyField { field: &'static str },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置项取值非法
    #[error("配置项 {key} 的值 '{value}' 无效: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
    /// HTTP 客户端创建失败
    #[error("无法创建 HTTP 客户端: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_operation_shows_static_message() {
        let err = AppError::Failed {
            op: Operation::LoadDevices,
            source: ApiError::BadStatus {
                endpoint: "/agent/agents/lab/1".to_string(),
                status: 500,
                body: "boom".to_string(),
            },
        };

        assert_eq!(err.to_string(), "Failed to load devices. Please try again.");
        assert_eq!(err.user_message(), "Failed to load devices. Please try again.");
    }

    #[test]
    fn test_validation_message_names_field() {
        let err = AppError::from(ValidationError::EmptyField { field: "Exam URL" });
        assert_eq!(err.user_message(), "Exam URL cannot be empty.");
        assert!(!err.is_cancelled());
    }
}
