use attendance_dash::app::{login, terminal};
use attendance_dash::config::{Command, LogFormat};
use attendance_dash::utils::error::{AppError, ErrorSeverity};
use attendance_dash::utils::{logger, validation::Validate};
use attendance_dash::{CliConfig, Dashboard, HttpAttendanceApi, LocalStorage, Settings};
use clap::Parser;

async fn run(config: &CliConfig, settings: &Settings) -> attendance_dash::Result<()> {
    match &config.command {
        Command::Login(_) => {
            let api = HttpAttendanceApi::new(settings)?;
            let storage = LocalStorage::new(settings.output_path.clone());
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            let mut output = std::io::stdout();

            match login::run_login(settings, api, &storage, &mut input, &mut output).await? {
                Some(report) => tracing::info!("✅ Attendance loaded for {} subjects", report.len()),
                None => tracing::info!("Login abandoned"),
            }
        }
        Command::Demo { username } => {
            let mut dashboard = Dashboard::demo();
            dashboard.form_mut().username = username.clone();
            let view = dashboard.login();
            print!("{}", terminal::render_text(view));
            dashboard.logout();
            tracing::debug!("Dashboard view after logout: {:?}", dashboard.view());
        }
        Command::Health => {
            let api = HttpAttendanceApi::new(settings)?;
            let status = api.health().await?;
            println!("✅ Backend {}: {} ({} active sessions)", settings.api_base_url, status.status, status.sessions);
        }
    }
    Ok(())
}

fn exit_code(e: &AppError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    match config.log_format {
        LogFormat::Compact => logger::init_cli_logger(config.verbose),
        LogFormat::Json => logger::init_json_logger(config.verbose),
    }

    tracing::info!("Starting attendance-dash");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config.command);
    }

    // 合併並驗證配置
    let settings = match Settings::resolve(&config).and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&config, &settings).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let code = exit_code(&e);
        if code > 0 {
            std::process::exit(code);
        }
    }

    Ok(())
}
