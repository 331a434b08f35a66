//! 实验室列表页
//!
//! 加载失败时保存固定提示，`retry` 重新发起同一个请求。

use tracing::{error, info};

use crate::clients::LabApiClient;
use crate::error::{AppError, AppResult, Operation};
use crate::models::{Lab, LabDraft};
use crate::services::validation::required;

/// 实验室列表页状态
pub struct LabsView {
    client: LabApiClient,
    labs: Vec<Lab>,
    load_error: Option<String>,
}

impl LabsView {
    pub fn new(client: LabApiClient) -> Self {
        Self {
            client,
            labs: Vec::new(),
            load_error: None,
        }
    }

    pub fn labs(&self) -> &[Lab] {
        &self.labs
    }

    /// 最近一次加载失败的提示
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn find(&self, lab_id: &str) -> Option<&Lab> {
        self.labs.iter().find(|lab| lab.id == lab_id)
    }

    /// 拉取实验室列表
    pub async fn load(&mut self) -> AppResult<&[Lab]> {
        self.load_error = None;

        match self.client.list_labs().await {
            Ok(labs) => {
                info!("✓ 加载到 {} 个实验室", labs.len());
                self.labs = labs;
                Ok(&self.labs)
            }
            Err(e) => {
                error!("加载实验室失败: {}", e);
                let err = AppError::Failed {
                    op: Operation::LoadLabs,
                    source: e,
                };
                self.load_error = Some(err.user_message());
                Err(err)
            }
        }
    }

    pub async fn retry(&mut self) -> AppResult<&[Lab]> {
        self.load().await
    }

    /// 创建实验室，名称为空时不发请求
    ///
    /// `&mut self` 保证同一时间只有一个提交在进行。
    pub async fn create_lab(&mut self, name: &str, description: &str) -> AppResult<&Lab> {
        let draft = LabDraft {
            name: required("Lab name", name)?,
            description: description.trim().to_string(),
        };

        let lab = self.client.create_lab(&draft).await.map_err(|e| {
            error!("创建实验室失败: {}", e);
            AppError::Failed {
                op: Operation::CreateLab,
                source: e,
            }
        })?;

        info!("✓ 已创建实验室 {} ({})", lab.name, lab.id);
        self.labs.push(lab);
        Ok(&self.labs[self.labs.len() - 1])
    }
}
