//! 考试状态定时刷新
//!
//! 每个打开的实验室详情页持有一个 `StatusTicker`：打开时启动，关闭或析构时取消，
//! 不会在页面关闭后继续修改状态。

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::models::Exam;
use crate::services::status_resolver::{resolve_statuses, Transition};

/// 页面和定时任务共享的考试列表
pub type SharedExams = Arc<Mutex<Vec<Exam>>>;

/// 当前本地时间的来源（测试中可替换）
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| Local::now().naive_local())
}

const TRANSITION_CHANNEL_CAPACITY: usize = 64;

/// 状态刷新任务的句柄
pub struct StatusTicker {
    handle: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
    transitions: broadcast::Sender<Transition>,
}

impl StatusTicker {
    /// 启动定时任务，第一次刷新在一个周期之后
    pub fn start(exams: SharedExams, period: Duration, clock: Clock) -> Self {
        let cancel_token = CancellationToken::new();
        let (transitions, _) = broadcast::channel(TRANSITION_CHANNEL_CAPACITY);

        let handle = tokio::spawn(ticker_loop(
            exams,
            period,
            clock,
            transitions.clone(),
            cancel_token.clone(),
        ));

        Self {
            handle: Some(handle),
            cancel_token,
            transitions,
        }
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> broadcast::Receiver<Transition> {
        self.transitions.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// 取消任务并等待其退出
    pub async fn stop(&mut self) {
        self.cancel_token.cancel();

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("状态刷新任务退出异常: {}", e);
            }
        }
    }
}

impl Drop for StatusTicker {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn ticker_loop(
    exams: SharedExams,
    period: Duration,
    clock: Clock,
    transitions: broadcast::Sender<Transition>,
    cancel_token: CancellationToken,
) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    debug!("状态刷新任务启动，间隔 {:?}", period);

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                debug!("状态刷新任务停止");
                break;
            }
            _ = ticker.tick() => {
                let now = clock();
                let changed = {
                    let mut guard = exams.lock().await;
                    resolve_statuses(&mut guard, now)
                };

                for transition in changed {
                    info!("⏱️ 考试状态变化: {}", transition);
                    // 没有订阅者时发送失败，忽略即可
                    let _ = transitions.send(transition);
                }
            }
        }
    }
}
