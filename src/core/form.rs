use crate::core::report::AttendanceReport;
use crate::core::{AcademicYear, AttendanceApi, AttendanceQuery, CaptchaChallenge, Semester, UiState};
use crate::domain::model::Credentials;
use crate::utils::error::{AppError, Result};
use std::ops::{Deref, DerefMut};

pub const ROLL_NUMBER_REQUIRED: &str = "Please enter your roll number first";
pub const FIELDS_REQUIRED: &str = "Please fill all fields";
pub const CAPTCHA_FALLBACK: &str = "Failed to fetch CAPTCHA";
pub const CAPTCHA_NETWORK_ERROR: &str = "Network error. Is the backend running?";
pub const ATTENDANCE_FALLBACK: &str = "Failed to fetch attendance";
pub const ATTENDANCE_NETWORK_ERROR: &str = "Network error. Check backend and try again.";

/// 表單送出事件；控制器一律呼叫 `prevent_default`
#[derive(Debug, Default)]
pub struct FormEvent {
    default_prevented: bool,
}

impl FormEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// 每個動作的結果，對應三種錯誤來源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Succeeded,
    /// 欄位驗證失敗，沒有發出請求
    Invalid,
    /// 後端回傳 `success = false`
    Rejected,
    /// 傳輸層失敗
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginFields {
    pub roll_number: String,
    pub password: String,
    pub captcha_text: String,
    pub year: AcademicYear,
    pub semester: Semester,
}

impl LoginFields {
    pub fn validate_for_captcha(&self) -> Result<()> {
        if self.roll_number.is_empty() {
            return Err(AppError::ValidationError {
                message: ROLL_NUMBER_REQUIRED.to_string(),
            });
        }
        Ok(())
    }

    pub fn validate_for_submit(&self) -> Result<()> {
        if self.roll_number.is_empty() || self.password.is_empty() || self.captcha_text.is_empty() {
            return Err(AppError::ValidationError {
                message: FIELDS_REQUIRED.to_string(),
            });
        }
        Ok(())
    }
}

/// 進入時設定 loading，離開作用域（包括 future 被丟棄）時清除
struct LoadingGuard<'a> {
    ui: &'a mut UiState,
}

impl<'a> LoadingGuard<'a> {
    fn begin(ui: &'a mut UiState) -> Self {
        ui.loading = true;
        ui.clear_error();
        Self { ui }
    }
}

impl Deref for LoadingGuard<'_> {
    type Target = UiState;

    fn deref(&self) -> &UiState {
        &*self.ui
    }
}

impl DerefMut for LoadingGuard<'_> {
    fn deref_mut(&mut self) -> &mut UiState {
        &mut *self.ui
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.ui.loading = false;
    }
}

pub struct FormController<A: AttendanceApi, F: FnMut(AttendanceReport)> {
    api: A,
    on_login_success: F,
    fields: LoginFields,
    captcha: Option<CaptchaChallenge>,
    ui: UiState,
}

impl<A: AttendanceApi, F: FnMut(AttendanceReport)> FormController<A, F> {
    pub fn new(api: A, on_login_success: F) -> Self {
        Self {
            api,
            on_login_success,
            fields: LoginFields::default(),
            captcha: None,
            ui: UiState::default(),
        }
    }

    pub fn fields(&self) -> &LoginFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut LoginFields {
        &mut self.fields
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            roll_number: self.fields.roll_number.clone(),
            password: self.fields.password.clone(),
        }
    }

    pub fn captcha(&self) -> Option<&CaptchaChallenge> {
        self.captcha.as_ref()
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn is_loading(&self) -> bool {
        self.ui.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.ui.error.as_deref()
    }

    pub fn can_request_captcha(&self) -> bool {
        !self.ui.loading && !self.fields.roll_number.is_empty()
    }

    /// 只是畫面上的限制，`submit` 本身不檢查驗證碼是否存在
    pub fn can_submit(&self) -> bool {
        !self.ui.loading && self.captcha.is_some()
    }

    pub async fn request_captcha(&mut self) -> ActionOutcome {
        if let Err(e) = self.fields.validate_for_captcha() {
            self.ui.set_error(e.user_friendly_message());
            return ActionOutcome::Invalid;
        }

        let mut ui = LoadingGuard::begin(&mut self.ui);
        tracing::debug!("Requesting CAPTCHA for roll number {}", mask(&self.fields.roll_number));

        match self.api.fetch_captcha(&self.fields.roll_number).await {
            Ok(response) if response.success => {
                match (response.captcha_base64, response.session_id) {
                    (Some(image_data), Some(session_id)) => {
                        tracing::debug!("CAPTCHA received for session {}", short_id(&session_id));
                        self.captcha = Some(CaptchaChallenge::new(session_id, image_data));
                        ui.clear_error();
                        ActionOutcome::Succeeded
                    }
                    _ => {
                        tracing::warn!("Backend reported success without CAPTCHA payload");
                        ui.set_error(CAPTCHA_FALLBACK);
                        ActionOutcome::Rejected
                    }
                }
            }
            Ok(response) => {
                ui.set_error(server_message(response.error, CAPTCHA_FALLBACK));
                ActionOutcome::Rejected
            }
            Err(e) => {
                tracing::warn!("CAPTCHA request failed: {}", e);
                ui.set_error(CAPTCHA_NETWORK_ERROR);
                ActionOutcome::Failed
            }
        }
    }

    pub async fn submit(&mut self, event: &mut FormEvent) -> ActionOutcome {
        event.prevent_default();

        if let Err(e) = self.fields.validate_for_submit() {
            self.ui.set_error(e.user_friendly_message());
            return ActionOutcome::Invalid;
        }

        let query = self.query();
        let mut ui = LoadingGuard::begin(&mut self.ui);
        tracing::debug!(
            "Submitting attendance query ({}, {})",
            query.year,
            query.semester
        );

        match self.api.fetch_attendance(&query).await {
            Ok(response) if response.success => {
                let report = AttendanceReport::new(response.data.unwrap_or_default());
                tracing::debug!("Attendance received for {} subjects", report.len());
                (self.on_login_success)(report);
                ActionOutcome::Succeeded
            }
            Ok(response) => {
                ui.set_error(server_message(response.error, ATTENDANCE_FALLBACK));
                ActionOutcome::Rejected
            }
            Err(e) => {
                tracing::warn!("Attendance request failed: {}", e);
                ui.set_error(ATTENDANCE_NETWORK_ERROR);
                ActionOutcome::Failed
            }
        }
    }

    fn query(&self) -> AttendanceQuery {
        AttendanceQuery {
            session_id: self.captcha.as_ref().map(|c| c.session_id.clone()),
            roll_number: self.fields.roll_number.clone(),
            password: self.fields.password.clone(),
            captcha_text: self.fields.captcha_text.clone(),
            year: self.fields.year,
            semester: self.fields.semester,
        }
    }
}

fn server_message(error: Option<String>, fallback: &str) -> String {
    error
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

pub(crate) fn mask(roll_number: &str) -> String {
    let prefix: String = roll_number.chars().take(3).collect();
    format!("{}***", prefix)
}

fn short_id(session_id: &str) -> &str {
    session_id.get(..8).unwrap_or(session_id)
}
