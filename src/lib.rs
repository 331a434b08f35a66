//! # Lab Console
//!
//! 管理实验室、实验室中的考试以及注册到实验室的设备的命令行控制台
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 只负责和后端 REST API 通信
//! - `LabApiClient` - `/lab`、`/exams`、`/agent` 接口
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 不持有状态的能力
//! - `status_resolver` - 自动模式下根据时间窗口推导考试状态
//! - `validation` - 提交前的必填校验
//! - `confirm` - 确认提示
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/` - 页面状态和定时任务
//! - `LabsView` - 实验室列表页
//! - `LabDetailsView` - 实验室详情页（考试 / 设备）
//! - `StatusTicker` - 每秒一次的状态刷新任务，生命周期跟随详情页
//!
//! ### ④ 入口（App）
//! - `app` - 命令行解析和文本输出
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::LabApiClient;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Device, Exam, ExamStatus, Lab};
pub use orchestrator::{LabDetailsView, LabsView, StatusTicker};
pub use services::status_resolver::resolve_statuses;
