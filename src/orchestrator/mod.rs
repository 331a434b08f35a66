//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 持有页面状态，决定何时发请求、何时写回本地状态、何时启动/取消定时任务。
//!
//! ## 模块划分
//!
//! ### `labs_view` - 实验室列表页
//! - 加载 / 重试实验室列表
//! - 创建实验室
//!
//! ### `lab_details` - 实验室详情页
//! - 实验室编辑
//! - 考试增删改、状态切换、自动模式
//! - 设备标签页
//! - 持有 `StatusTicker`，生命周期和页面一致
//!
//! ### `status_ticker` - 状态刷新任务
//! - 每个周期对考试列表执行一次状态推导
//! - 通过 `CancellationToken` 取消
//!
//! ## 层次关系
//!
//! ```text
//! app (CLI)
//!     ↓
//! labs_view / lab_details (页面状态)
//!     ↓
//! status_ticker ──→ services::status_resolver
//!     ↓
//! clients::LabApiClient (REST)
//! ```

pub mod lab_details;
pub mod labs_view;
pub mod status_ticker;

pub use lab_details::{LabDetailsView, Tab, TimerField, ViewOptions};
pub use labs_view::LabsView;
pub use status_ticker::{system_clock, Clock, SharedExams, StatusTicker};
