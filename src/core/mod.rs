pub mod dashboard;
pub mod form;
pub mod report;

pub use crate::domain::model::{
    AcademicYear, AttendanceQuery, AttendanceRecord, CaptchaChallenge, Semester,
    StudentProfile, SubjectAttendance, UiState,
};
pub use crate::domain::ports::{AttendanceApi, ConfigProvider, Storage};
pub use crate::utils::error::Result;
