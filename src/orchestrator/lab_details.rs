//! 实验室详情页 - 编排层
//!
//! ## 职责
//!
//! - 持有实验室记录、当前标签页、考试列表、设备列表
//! - 打开时拉取考试并启动状态刷新任务，关闭时取消
//! - 考试的增删改、状态切换、自动模式切换
//! - 设备标签页的加载 / 失败提示 / 重试
//!
//! 所有修改都在请求成功之后才写入本地状态，失败时本地状态保持不变。

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info, warn};

use crate::clients::LabApiClient;
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult, Operation};
use crate::models::timestamp::format_local;
use crate::models::{Device, Exam, ExamPatch, ExamStatus, Lab, LabDraft, NewExam};
use crate::orchestrator::status_ticker::{system_clock, Clock, SharedExams, StatusTicker};
use crate::services::status_resolver::{resolve_statuses, Transition};
use crate::services::validation::required;
use crate::services::Confirm;

/// 详情页标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Exams,
    Devices,
}

/// 自动模式的两个时间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerField {
    AutoOn,
    AutoOff,
}

/// 详情页的运行参数
#[derive(Clone)]
pub struct ViewOptions {
    pub tick_interval: Duration,
    pub clock: Clock,
}

impl ViewOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tick_interval: config.tick_interval(),
            clock: system_clock(),
        }
    }
}

/// 实验室详情页状态
pub struct LabDetailsView {
    client: LabApiClient,
    confirm: Arc<dyn Confirm>,
    clock: Clock,
    lab: Lab,
    active_tab: Tab,
    exams: SharedExams,
    devices: Vec<Device>,
    loading_devices: bool,
    devices_error: Option<String>,
    ticker: Option<StatusTicker>,
}

impl LabDetailsView {
    /// 打开详情页：拉取考试列表并启动状态刷新
    ///
    /// 考试拉取失败只记录日志，列表保持为空。
    pub async fn open(
        client: LabApiClient,
        lab: Lab,
        confirm: Arc<dyn Confirm>,
        options: ViewOptions,
    ) -> Self {
        let mut view = Self {
            client,
            confirm,
            clock: options.clock,
            lab,
            active_tab: Tab::Exams,
            exams: Arc::new(Mutex::new(Vec::new())),
            devices: Vec::new(),
            loading_devices: false,
            devices_error: None,
            ticker: None,
        };

        view.load_exams().await;
        view.ticker = Some(StatusTicker::start(
            view.exams.clone(),
            options.tick_interval,
            view.clock.clone(),
        ));
        view
    }

    /// 关闭详情页，停止状态刷新
    pub async fn close(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.stop().await;
            info!("实验室 {} 详情页已关闭", self.lab.id);
        }
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(StatusTicker::is_running)
    }

    /// 订阅自动模式产生的状态变化
    pub fn subscribe_transitions(&self) -> Option<broadcast::Receiver<Transition>> {
        self.ticker.as_ref().map(StatusTicker::subscribe)
    }

    pub fn lab(&self) -> &Lab {
        &self.lab
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    /// 当前考试列表的快照
    pub async fn exams(&self) -> Vec<Exam> {
        self.exams.lock().await.clone()
    }

    /// 按当前时间推导过状态的快照，不等下一次刷新
    ///
    /// 只作用于返回的副本，共享列表仍由状态刷新任务写入。
    pub async fn current_exams(&self) -> Vec<Exam> {
        let mut exams = self.exams().await;
        resolve_statuses(&mut exams, (self.clock)());
        exams
    }

    pub async fn exam(&self, exam_id: &str) -> AppResult<Exam> {
        self.exams
            .lock()
            .await
            .iter()
            .find(|e| e.id == exam_id)
            .cloned()
            .ok_or_else(|| exam_not_found(exam_id))
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn is_loading_devices(&self) -> bool {
        self.loading_devices
    }

    pub fn devices_error(&self) -> Option<&str> {
        self.devices_error.as_deref()
    }

    // ========== 标签页 / 设备 ==========

    /// 切换标签页，切到设备页时加载设备
    pub async fn switch_tab(&mut self, tab: Tab) -> AppResult<()> {
        self.active_tab = tab;
        match tab {
            Tab::Devices => self.load_devices().await,
            Tab::Exams => Ok(()),
        }
    }

    pub async fn load_devices(&mut self) -> AppResult<()> {
        self.loading_devices = true;
        self.devices_error = None;

        let result = self.client.list_devices(&self.lab.id).await;
        self.loading_devices = false;

        match result {
            Ok(devices) => {
                info!("✓ 实验室 {} 共有 {} 台设备", self.lab.id, devices.len());
                self.devices = devices;
                Ok(())
            }
            Err(e) => {
                let err = self.failed(Operation::LoadDevices, e);
                self.devices_error = Some(err.user_message());
                Err(err)
            }
        }
    }

    pub async fn retry_devices(&mut self) -> AppResult<()> {
        self.load_devices().await
    }

    // ========== 实验室编辑 ==========

    /// 保存实验室名称和描述
    pub async fn save_lab_edits(&mut self, name: &str, description: &str) -> AppResult<&Lab> {
        let draft = LabDraft {
            name: required("Lab name", name)?,
            description: description.trim().to_string(),
        };

        self.client
            .update_lab(&self.lab.id, &draft)
            .await
            .map_err(|e| self.failed(Operation::SaveLab, e))?;

        self.lab.name = draft.name;
        self.lab.description = draft.description;
        info!("✓ 已保存实验室 {}", self.lab.id);
        Ok(&self.lab)
    }

    // ========== 考试增删改 ==========

    /// 创建考试，名称或地址为空时不发请求
    pub async fn add_exam(&mut self, name: &str, url: &str) -> AppResult<Exam> {
        let name = required("Exam name", name)?;
        let url = required("Exam URL", url)?;

        let payload = NewExam::new(self.lab.id.clone(), name, url);
        let exam = self
            .client
            .create_exam(&payload)
            .await
            .map_err(|e| self.failed(Operation::AddExam, e))?;

        info!("✓ 已创建考试 {} ({})", exam.name, exam.id);
        self.exams.lock().await.push(exam.clone());
        Ok(exam)
    }

    /// 修改考试名称和地址
    pub async fn save_exam_edits(
        &mut self,
        exam_id: &str,
        name: &str,
        url: &str,
    ) -> AppResult<Exam> {
        let name = required("Exam name", name)?;
        let url = required("Exam URL", url)?;
        self.exam(exam_id).await?;

        let response = self
            .client
            .update_exam(exam_id, &ExamPatch::details(name, url))
            .await
            .map_err(|e| self.failed(Operation::SaveExam, e))?;

        self.merge(exam_id, &[&response]).await
    }

    /// 删除考试（需要确认）
    pub async fn remove_exam(&mut self, exam_id: &str) -> AppResult<()> {
        self.exam(exam_id).await?;
        self.ask("Are you sure you want to delete this exam?")?;

        self.client
            .delete_exam(exam_id)
            .await
            .map_err(|e| self.failed(Operation::DeleteExam, e))?;

        self.exams.lock().await.retain(|e| e.id != exam_id);
        info!("✓ 已删除考试 {}", exam_id);
        Ok(())
    }

    // ========== 状态 / 自动模式 ==========

    /// 手动启动或停止考试（需要确认）
    ///
    /// 自动模式开启时同样允许手动切换，下一次刷新会重新按时间窗口推导。
    pub async fn toggle_status(&mut self, exam_id: &str) -> AppResult<Exam> {
        let exam = self.exam(exam_id).await?;
        let next = exam.status.toggled();

        let prompt = if next == ExamStatus::Running {
            "Are you sure you want to start this exam?"
        } else {
            "Are you sure you want to stop this exam?"
        };
        self.ask(prompt)?;

        let response = self
            .client
            .update_exam(exam_id, &ExamPatch::status(next))
            .await
            .map_err(|e| self.failed(Operation::ToggleStatus, e))?;

        self.merge(exam_id, &[&response]).await
    }

    /// 开启或关闭自动模式（需要确认）
    ///
    /// 关闭时清空两个时间，重新开启时从空窗口开始。
    pub async fn toggle_auto_mode(&mut self, exam_id: &str) -> AppResult<Exam> {
        let exam = self.exam(exam_id).await?;
        let enable = !exam.auto_mode;

        let prompt = if enable {
            "Are you sure you want to enable Auto Mode?"
        } else {
            "Are you sure you want to disable Auto Mode?"
        };
        self.ask(prompt)?;

        let patch = if enable {
            ExamPatch::auto_mode(true, exam.auto_on_time, exam.auto_off_time)
        } else {
            ExamPatch::auto_mode(false, "", "")
        };

        let response = self
            .client
            .update_exam(exam_id, &patch)
            .await
            .map_err(|e| self.failed(Operation::ToggleAutoMode, e))?;

        let mut guard = self.exams.lock().await;
        let exam = guard
            .iter_mut()
            .find(|e| e.id == exam_id)
            .ok_or_else(|| exam_not_found(exam_id))?;
        exam.apply(&patch);
        exam.apply(&response);
        if !enable {
            exam.clear_timers();
        }
        info!("✓ 考试 {} 自动模式: {}", exam_id, if enable { "ON" } else { "OFF" });
        Ok(exam.clone())
    }

    /// 本地修改某个自动时间（不发请求，需要 `save_auto_mode` 保存）
    pub async fn update_timer(
        &mut self,
        exam_id: &str,
        field: TimerField,
        value: &str,
    ) -> AppResult<Exam> {
        let mut guard = self.exams.lock().await;
        let exam = guard
            .iter_mut()
            .find(|e| e.id == exam_id)
            .ok_or_else(|| exam_not_found(exam_id))?;

        match field {
            TimerField::AutoOn => exam.auto_on_time = value.to_string(),
            TimerField::AutoOff => exam.auto_off_time = value.to_string(),
        }
        Ok(exam.clone())
    }

    /// 本地开启自动模式：从现在开始，持续一小时
    pub async fn enable_auto_start_now(&mut self, exam_id: &str) -> AppResult<Exam> {
        let now = (self.clock)();
        let on = format_local(now);
        let off = format_local(now + ChronoDuration::hours(1));

        let mut guard = self.exams.lock().await;
        let exam = guard
            .iter_mut()
            .find(|e| e.id == exam_id)
            .ok_or_else(|| exam_not_found(exam_id))?;
        exam.auto_mode = true;
        exam.auto_on_time = on;
        exam.auto_off_time = off;
        Ok(exam.clone())
    }

    /// 把本地的自动模式时间保存到服务端
    pub async fn save_auto_mode(&mut self, exam_id: &str) -> AppResult<Exam> {
        let exam = self.exam(exam_id).await?;
        let patch = ExamPatch::auto_mode(true, exam.auto_on_time, exam.auto_off_time);

        let response = self
            .client
            .update_exam(exam_id, &patch)
            .await
            .map_err(|e| self.failed(Operation::SaveAutoMode, e))?;

        self.merge(exam_id, &[&response]).await
    }

    // ========== 内部辅助 ==========

    async fn load_exams(&self) {
        match self.client.list_exams(&self.lab.id).await {
            Ok(exams) => {
                info!("✓ 实验室 {} 共有 {} 场考试", self.lab.name, exams.len());
                *self.exams.lock().await = exams;
            }
            Err(e) => {
                self.failed(Operation::LoadExams, e);
            }
        }
    }

    fn ask(&self, prompt: &str) -> AppResult<()> {
        if self.confirm.confirm(prompt) {
            Ok(())
        } else {
            info!("用户取消: {}", prompt);
            Err(AppError::Cancelled)
        }
    }

    fn failed(&self, op: Operation, source: ApiError) -> AppError {
        error!("[实验室 {}] {}: {}", self.lab.id, op.failure_message(), source);
        AppError::Failed { op, source }
    }

    async fn merge(&self, exam_id: &str, patches: &[&ExamPatch]) -> AppResult<Exam> {
        let mut guard = self.exams.lock().await;
        let exam = guard
            .iter_mut()
            .find(|e| e.id == exam_id)
            .ok_or_else(|| exam_not_found(exam_id))?;
        for patch in patches {
            exam.apply(patch);
        }
        Ok(exam.clone())
    }
}

impl Drop for LabDetailsView {
    fn drop(&mut self) {
        if self.ticker.is_some() {
            warn!("实验室 {} 详情页未关闭即被释放，状态刷新已取消", self.lab.id);
        }
    }
}

fn exam_not_found(exam_id: &str) -> AppError {
    AppError::NotFound {
        kind: "Exam",
        id: exam_id.to_string(),
    }
}
