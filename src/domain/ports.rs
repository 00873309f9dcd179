use crate::domain::model::{AttendanceQuery, AttendanceResponse, CaptchaResponse};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn output_path(&self) -> &str;
    fn request_timeout_secs(&self) -> u64;
}

/// 後端的兩個端點。`Ok` 表示收到回應（包含 `success = false`），
/// `Err` 只代表傳輸層失敗。
#[async_trait]
pub trait AttendanceApi: Send + Sync {
    async fn fetch_captcha(&self, roll_number: &str) -> Result<CaptchaResponse>;
    async fn fetch_attendance(&self, query: &AttendanceQuery) -> Result<AttendanceResponse>;
}
