use crate::core::{AttendanceApi, AttendanceQuery, ConfigProvider};
use crate::domain::model::{AttendanceResponse, CaptchaResponse, HealthStatus};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// 呼叫後端 `/api/captcha`、`/api/attendance` 的 HTTP 客戶端
#[derive(Debug, Clone)]
pub struct HttpAttendanceApi {
    client: Client,
    base_url: String,
}

impl HttpAttendanceApi {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs()))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint("/api/health");
        tracing::debug!("Making API request to: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::ServerError {
                message: format!("Health check returned HTTP {}", response.status()),
            });
        }

        Ok(response.json().await?)
    }
}

/// 後端的失敗回應（400/500）仍是同樣的 JSON 格式，所以不論狀態碼都嘗試解析
async fn decode_envelope<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    tracing::debug!("API response status: {}", status);

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| AppError::TransportError {
        message: format!("Unexpected response body (HTTP {}): {}", status, e),
    })
}

#[async_trait]
impl AttendanceApi for HttpAttendanceApi {
    async fn fetch_captcha(&self, roll_number: &str) -> Result<CaptchaResponse> {
        let url = self.endpoint("/api/captcha");
        tracing::debug!("Making API request to: {}", url);

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "roll_no": roll_number }))
            .send()
            .await?;

        decode_envelope(response).await
    }

    async fn fetch_attendance(&self, query: &AttendanceQuery) -> Result<AttendanceResponse> {
        let url = self.endpoint("/api/attendance");
        tracing::debug!("Making API request to: {}", url);

        let response = self.client.post(&url).json(query).send().await?;

        decode_envelope(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AcademicYear, Semester};
    use httpmock::prelude::*;

    struct MockConfig {
        api_base_url: String,
    }

    impl ConfigProvider for MockConfig {
        fn api_base_url(&self) -> &str {
            &self.api_base_url
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn request_timeout_secs(&self) -> u64 {
            5
        }
    }

    fn api_for(server: &MockServer) -> HttpAttendanceApi {
        HttpAttendanceApi::new(&MockConfig {
            api_base_url: format!("{}/", server.base_url()),
        })
        .unwrap()
    }

    fn sample_query() -> AttendanceQuery {
        AttendanceQuery {
            session_id: Some("5f0c2a9e".to_string()),
            roll_number: "2023UCS1234".to_string(),
            password: "hunter2".to_string(),
            captcha_text: "x7k2".to_string(),
            year: AcademicYear::try_from(0).unwrap(),
            semester: Semester::try_from(5).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_fetch_captcha_posts_roll_number() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/captcha")
                .json_body(serde_json::json!({ "roll_no": "2023UCS1234" }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "success": true,
                    "captcha_base64": "data:image/png;base64,iVBORw0KGgo=",
                    "session_id": "5f0c2a9e-1111",
                    "roll_no": "2023UCS1234"
                }));
        });

        let response = api_for(&server).fetch_captcha("2023UCS1234").await.unwrap();

        api_mock.assert();
        assert!(response.success);
        assert_eq!(response.session_id.as_deref(), Some("5f0c2a9e-1111"));
        assert_eq!(response.error, None);
    }

    #[tokio::test]
    async fn test_fetch_captcha_decodes_error_envelope_on_400() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/api/captcha");
            then.status(400)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({ "success": false, "error": "roll_no required" }));
        });

        let response = api_for(&server).fetch_captcha("").await.unwrap();

        api_mock.assert();
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("roll_no required"));
    }

    #[tokio::test]
    async fn test_fetch_attendance_sends_backend_fields() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/attendance")
                .json_body(serde_json::json!({
                    "session_id": "5f0c2a9e",
                    "roll_no": "2023UCS1234",
                    "password": "hunter2",
                    "captcha": "x7k2",
                    "year": 0,
                    "semester": 5
                }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "success": true,
                    "data": [{
                        "Subject Code": "ITITC601",
                        "Subject Name": "Compiler Design",
                        "Classes Present": 27,
                        "Classes Absent": 8,
                        "Total Classes": 35,
                        "Attendance %": 77.14
                    }],
                    "total_subjects": 1
                }));
        });

        let response = api_for(&server)
            .fetch_attendance(&sample_query())
            .await
            .unwrap();

        api_mock.assert();
        assert!(response.success);
        assert_eq!(response.total_subjects, Some(1));
        let data = response.data.unwrap();
        assert_eq!(data[0].code, "ITITC601");
        assert_eq!(data[0].total, 35);
    }

    #[tokio::test]
    async fn test_fetch_attendance_decodes_error_envelope_on_500() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/attendance");
            then.status(500)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({ "success": false, "error": "Login failed - wrong page" }));
        });

        let response = api_for(&server)
            .fetch_attendance(&sample_query())
            .await
            .unwrap();

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("Login failed - wrong page"));
    }

    #[tokio::test]
    async fn test_non_json_body_is_transport_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/captcha");
            then.status(502).body("<html>Bad Gateway</html>");
        });

        let err = api_for(&server).fetch_captcha("2023UCS1234").await.unwrap_err();

        assert!(matches!(err, AppError::TransportError { .. }));
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/api/health");
            then.status(200)
                .json_body(serde_json::json!({ "status": "ok", "sessions": 2 }));
        });

        let status = api_for(&server).health().await.unwrap();

        api_mock.assert();
        assert_eq!(status.status, "ok");
        assert_eq!(status.sessions, 2);
    }
}
