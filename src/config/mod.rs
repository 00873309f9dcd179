pub mod cli;
pub mod toml_config;

use crate::core::report::EXPORT_FORMATS;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fmt;
use toml_config::TomlConfig;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5001";
pub const DEFAULT_OUTPUT_PATH: &str = "./output";
/// 後端會開瀏覽器登入，單次請求可能超過一分鐘
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "attendance-dash")]
#[command(about = "View subject attendance through the CAPTCHA login backend")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Path to a TOML config file")]
    pub config: Option<String>,

    #[arg(long, global = true)]
    pub api_base_url: Option<String>,

    #[arg(long, global = true)]
    pub output_path: Option<String>,

    #[arg(long, global = true)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Log in through the backend and show the attendance dashboard
    Login(LoginArgs),
    /// Show the dashboard with built-in sample data
    Demo {
        #[arg(long, default_value = "")]
        username: String,
    },
    /// Check that the backend is reachable
    Health,
}

#[derive(Clone, Default, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub roll_no: Option<String>,

    #[arg(
        long,
        env = "ATTENDANCE_PASSWORD",
        hide_env_values = true,
        help = "Account password. If omitted you are prompted for it and the typed input is echoed"
    )]
    pub password: Option<String>,

    #[arg(long, help = "Academic year index (0 = current year)")]
    pub year: Option<u8>,

    #[arg(long, help = "Semester index (0 = Semester 1)")]
    pub semester: Option<u8>,

    #[arg(long, value_delimiter = ',', help = "Export formats: csv, json")]
    pub export: Vec<String>,
}

// 密碼不進 debug 輸出
fn redact(password: &Option<String>) -> Option<&'static str> {
    password.as_ref().map(|_| "<redacted>")
}

impl fmt::Debug for LoginArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginArgs")
            .field("roll_no", &self.roll_no)
            .field("password", &redact(&self.password))
            .field("year", &self.year)
            .field("semester", &self.semester)
            .field("export", &self.export)
            .finish()
    }
}

/// 合併後的設定：命令列 > 設定檔 > 預設值
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub output_path: String,
    pub timeout_seconds: u64,
    pub roll_number: Option<String>,
    pub password: Option<String>,
    pub year: u8,
    pub semester: u8,
    pub export_formats: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            roll_number: None,
            password: None,
            year: 0,
            semester: 0,
            export_formats: Vec::new(),
        }
    }
}

impl Settings {
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => {
                tracing::debug!("Loading config file {}", path);
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };
        Ok(Self::merge(cli, &file))
    }

    pub fn merge(cli: &CliConfig, file: &TomlConfig) -> Self {
        let defaults = Settings::default();
        let login = match &cli.command {
            Command::Login(args) => args.clone(),
            _ => LoginArgs::default(),
        };

        Self {
            api_base_url: cli
                .api_base_url
                .clone()
                .or_else(|| file.base_url().map(str::to_string))
                .unwrap_or(defaults.api_base_url),
            output_path: cli
                .output_path
                .clone()
                .or_else(|| file.output_path().map(str::to_string))
                .unwrap_or(defaults.output_path),
            timeout_seconds: cli
                .timeout_seconds
                .or(file.timeout_seconds())
                .unwrap_or(defaults.timeout_seconds),
            roll_number: login.roll_no.or_else(|| file.roll_no().map(str::to_string)),
            password: login.password,
            year: login.year.or(file.year()).unwrap_or(defaults.year),
            semester: login.semester.or(file.semester()).unwrap_or(defaults.semester),
            export_formats: if login.export.is_empty() {
                file.export_formats().map(<[String]>::to_vec).unwrap_or_default()
            } else {
                login.export
            },
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_base_url", &self.api_base_url)
            .field("output_path", &self.output_path)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("roll_number", &self.roll_number)
            .field("password", &redact(&self.password))
            .field("year", &self.year)
            .field("semester", &self.semester)
            .field("export_formats", &self.export_formats)
            .finish()
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_base_url", &self.api_base_url)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
        validation::validate_range("year", self.year, 0, 3)?;
        validation::validate_range("semester", self.semester, 0, 7)?;
        validation::validate_choices("export", &self.export_formats, &EXPORT_FORMATS)?;
        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn request_timeout_secs(&self) -> u64 {
        self.timeout_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliConfig {
        CliConfig::try_parse_from(std::iter::once("attendance-dash").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["health"]);
        let settings = Settings::merge(&cli, &TomlConfig::default());

        assert_eq!(settings, Settings::default());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = TomlConfig::from_toml_str(
            r#"
[backend]
base_url = "http://backend.internal:5001"
timeout_seconds = 60

[login]
roll_no = "2022UEC0042"
year = 2
semester = 3

[output]
export_formats = ["json"]
"#,
        )
        .unwrap();
        let cli = parse(&[
            "--timeout-seconds",
            "30",
            "login",
            "--roll-no",
            "2023UCS1234",
            "--semester",
            "6",
            "--export",
            "csv,json",
        ]);

        let settings = Settings::merge(&cli, &file);

        assert_eq!(settings.api_base_url, "http://backend.internal:5001");
        assert_eq!(settings.timeout_seconds, 30);
        assert_eq!(settings.roll_number.as_deref(), Some("2023UCS1234"));
        assert_eq!(settings.year, 2);
        assert_eq!(settings.semester, 6);
        assert_eq!(settings.export_formats, vec!["csv", "json"]);
    }

    #[test]
    fn test_file_export_formats_used_when_cli_has_none() {
        let file = TomlConfig::from_toml_str("[output]\nexport_formats = [\"csv\"]").unwrap();
        let cli = parse(&["login"]);

        assert_eq!(Settings::merge(&cli, &file).export_formats, vec!["csv"]);
    }

    #[test]
    fn test_debug_output_hides_password() {
        let cli = parse(&["login", "--roll-no", "2023UCS1234", "--password", "hunter2"]);

        let logged = format!("{:?}", cli.command);
        assert!(!logged.contains("hunter2"));
        assert!(logged.contains("<redacted>"));
        assert!(logged.contains("2023UCS1234"));

        let settings = Settings::merge(&cli, &TomlConfig::default());
        assert_eq!(settings.password.as_deref(), Some("hunter2"));
        let logged = format!("{:?}", settings);
        assert!(!logged.contains("hunter2"));
        assert!(logged.contains("<redacted>"));
    }

    #[test]
    fn test_password_help_warns_about_echo() {
        use clap::CommandFactory;

        let mut command = CliConfig::command();
        let login = command
            .find_subcommand_mut("login")
            .expect("login subcommand");
        let password = login
            .get_arguments()
            .find(|arg| arg.get_id() == "password")
            .expect("password argument");
        let help = password.get_help().expect("password help").to_string();

        assert!(help.contains("echoed"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut settings = Settings::default();
        settings.timeout_seconds = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.year = 4;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.semester = 8;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.export_formats = vec!["pdf".to_string()];
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.api_base_url = "localhost:5001".to_string();
        assert!(settings.validate().is_err());
    }
}
