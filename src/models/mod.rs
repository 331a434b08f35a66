pub mod device;
pub mod exam;
pub mod lab;
mod record_id;
pub mod timestamp;

pub use device::Device;
pub use exam::{Exam, ExamPatch, ExamStatus, NewExam};
pub use lab::{Lab, LabDraft};
