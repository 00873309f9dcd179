use crate::core::{AttendanceRecord, Storage, SubjectAttendance};
use crate::utils::error::{AppError, Result};
use chrono::{DateTime, Local};

pub const EXPORT_FORMATS: [&str; 2] = ["csv", "json"];

/// 登入成功後交給呼叫端的出席報表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceReport {
    subjects: Vec<SubjectAttendance>,
}

impl AttendanceReport {
    pub fn new(subjects: Vec<SubjectAttendance>) -> Self {
        Self { subjects }
    }

    pub fn subjects(&self) -> &[SubjectAttendance] {
        &self.subjects
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn to_records(&self) -> Vec<AttendanceRecord> {
        self.subjects.iter().map(AttendanceRecord::from).collect()
    }

    /// 欄位名稱沿用後端的 JSON key
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        if self.subjects.is_empty() {
            writer.write_record([
                "Subject Code",
                "Subject Name",
                "Classes Present",
                "Classes Absent",
                "Total Classes",
                "Attendance %",
            ])?;
        }
        for subject in &self.subjects {
            writer.serialize(subject)?;
        }

        let bytes = writer.into_inner().map_err(|e| AppError::DataError {
            message: format!("Failed to flush CSV writer: {}", e),
        })?;

        String::from_utf8(bytes).map_err(|e| AppError::DataError {
            message: format!("CSV output is not UTF-8: {}", e),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.subjects)?)
    }

    pub fn render(&self, format: &str) -> Result<String> {
        match format {
            "csv" => self.to_csv(),
            "json" => self.to_json(),
            other => Err(AppError::InvalidConfigValueError {
                field: "export".to_string(),
                value: other.to_string(),
                reason: format!("Unsupported format. Valid formats: {}", EXPORT_FORMATS.join(", ")),
            }),
        }
    }

    /// 依序輸出每種格式，回傳寫入的路徑
    pub async fn export<S: Storage>(
        &self,
        storage: &S,
        roll_number: &str,
        formats: &[String],
        generated_at: DateTime<Local>,
    ) -> Result<Vec<String>> {
        let stem = export_stem(roll_number, generated_at);
        let mut written = Vec::with_capacity(formats.len());

        for format in formats {
            let content = self.render(format)?;
            let filename = format!("{}.{}", stem, format);
            tracing::debug!("Writing {} ({} bytes)", filename, content.len());
            written.push(storage.write_file(&filename, content.as_bytes()).await?);
        }

        Ok(written)
    }
}

fn export_stem(roll_number: &str, generated_at: DateTime<Local>) -> String {
    let safe_roll: String = roll_number
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("attendance_{}_{}", safe_roll, generated_at.format("%Y%m%d_%H%M%S"))
}
