use crate::utils::error::{AppError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub roll_number: String,
    pub password: String,
}

/// 後端發出的驗證碼挑戰，下一次取得時即被取代
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptchaChallenge {
    pub session_id: String,
    /// `data:image/png;base64,...` 格式的圖片
    pub image_data: String,
}

impl CaptchaChallenge {
    pub fn new(session_id: String, image_data: String) -> Self {
        Self {
            session_id,
            image_data,
        }
    }

    /// 解碼圖片內容；接受 data URL 或純 base64 字串
    pub fn image_bytes(&self) -> Result<Vec<u8>> {
        let encoded = match self.image_data.split_once(',') {
            Some((header, payload)) if header.starts_with("data:") => payload,
            _ => self.image_data.as_str(),
        };

        BASE64
            .decode(encoded.trim())
            .map_err(|e| AppError::DataError {
                message: format!("CAPTCHA image is not valid base64: {}", e),
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AcademicYear(u8);

impl AcademicYear {
    pub const LABELS: [&'static str; 4] = ["2024-25 (Current Year)", "2023-24", "2022-23", "2021-22"];

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        Self::LABELS[self.0 as usize]
    }
}

impl TryFrom<u8> for AcademicYear {
    type Error = AppError;

    fn try_from(index: u8) -> Result<Self> {
        crate::utils::validation::validate_range("year", index, 0, Self::LABELS.len() as u8 - 1)?;
        Ok(Self(index))
    }
}

impl From<AcademicYear> for u8 {
    fn from(year: AcademicYear) -> Self {
        year.0
    }
}

impl fmt::Display for AcademicYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Semester(u8);

impl Semester {
    pub const COUNT: u8 = 8;

    pub fn index(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Semester {
    type Error = AppError;

    fn try_from(index: u8) -> Result<Self> {
        crate::utils::validation::validate_range("semester", index, 0, Self::COUNT - 1)?;
        Ok(Self(index))
    }
}

impl From<Semester> for u8 {
    fn from(semester: Semester) -> Self {
        semester.0
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Semester {}", self.0 + 1)
    }
}

/// 送出表單時組成的查詢，欄位名稱對應後端 JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceQuery {
    pub session_id: Option<String>,
    #[serde(rename = "roll_no")]
    pub roll_number: String,
    pub password: String,
    #[serde(rename = "captcha")]
    pub captcha_text: String,
    pub year: AcademicYear,
    pub semester: Semester,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CaptchaResponse {
    pub success: bool,
    pub captcha_base64: Option<String>,
    pub session_id: Option<String>,
    pub roll_no: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AttendanceResponse {
    pub success: bool,
    pub data: Option<Vec<SubjectAttendance>>,
    pub total_subjects: Option<usize>,
    pub error: Option<String>,
}

/// 後端回傳的單一科目出席資料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectAttendance {
    #[serde(rename = "Subject Code")]
    pub code: String,
    #[serde(rename = "Subject Name")]
    pub name: String,
    #[serde(rename = "Classes Present")]
    pub present: u32,
    #[serde(rename = "Classes Absent")]
    pub absent: u32,
    #[serde(rename = "Total Classes")]
    pub total: u32,
    #[serde(rename = "Attendance %")]
    pub percentage: f64,
}

impl From<&SubjectAttendance> for AttendanceRecord {
    fn from(row: &SubjectAttendance) -> Self {
        AttendanceRecord::new(&row.name, row.total, row.present)
    }
}

/// `attended <= held` 不強制檢查
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub subject: String,
    pub held: u32,
    pub attended: u32,
}

impl AttendanceRecord {
    pub fn new(subject: &str, held: u32, attended: u32) -> Self {
        Self {
            subject: subject.to_string(),
            held,
            attended,
        }
    }

    pub fn percentage(&self) -> f64 {
        if self.held > 0 {
            f64::from(self.attended) / f64::from(self.held) * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentProfile {
    pub name: String,
    pub enrollment: String,
}

impl StudentProfile {
    pub fn new(name: &str, enrollment: &str) -> Self {
        Self {
            name: name.to_string(),
            enrollment: enrollment.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub loading: bool,
    pub error: Option<String>,
}

impl UiState {
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub sessions: usize,
}
