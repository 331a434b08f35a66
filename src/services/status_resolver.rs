//! 考试状态推导 - 业务能力层
//!
//! 自动模式下，考试状态由当前时间和开关时间窗口决定：
//!
//! - 窗口内（两端都包含）→ `Ongoing`
//! - 窗口外且当前为 `Ongoing` → `Stopped`
//! - 其余情况保持原状态（手动设置的 `Running` / `Stopped` 不会被覆盖）
//!
//! 未开启自动模式或缺少任一时间的考试不受影响。时间无法解析时视为不在窗口内。
//! 这里只修改本地快照，和服务端的状态可能暂时不一致，直到下次重新拉取。

use chrono::NaiveDateTime;

use crate::models::{Exam, ExamStatus};

/// 一次状态变化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub exam_id: String,
    pub exam_name: String,
    pub from: ExamStatus,
    pub to: ExamStatus,
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}): {} → {}",
            self.exam_name, self.exam_id, self.from, self.to
        )
    }
}

/// 推导单个考试的状态，发生变化时返回变化记录
pub fn resolve_exam(exam: &mut Exam, now: NaiveDateTime) -> Option<Transition> {
    if !exam.has_auto_schedule() {
        return None;
    }

    let in_window = exam
        .auto_window()
        .is_some_and(|(start, end)| start <= now && now <= end);

    let next = if in_window {
        ExamStatus::Ongoing
    } else if exam.status == ExamStatus::Ongoing {
        ExamStatus::Stopped
    } else {
        return None;
    };

    if next == exam.status {
        return None;
    }

    let from = exam.status;
    exam.status = next;
    Some(Transition {
        exam_id: exam.id.clone(),
        exam_name: exam.name.clone(),
        from,
        to: next,
    })
}

/// 对整个考试列表推导一次状态，只修改 `status` 字段
pub fn resolve_statuses(exams: &mut [Exam], now: NaiveDateTime) -> Vec<Transition> {
    exams
        .iter_mut()
        .filter_map(|exam| resolve_exam(exam, now))
        .collect()
}
