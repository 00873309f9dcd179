use crate::app::terminal;
use crate::config::Settings;
use crate::core::dashboard::render_dashboard;
use crate::core::form::{ActionOutcome, FormController, FormEvent};
use crate::core::report::AttendanceReport;
use crate::core::{AcademicYear, AttendanceApi, Semester, Storage, StudentProfile};
use crate::utils::error::Result;
use std::io::{BufRead, Write};

pub const CAPTCHA_FILENAME: &str = "captcha.png";

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<String> {
    write!(output, "{}", label)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("input closed while waiting for '{}'", label.trim()),
        )
        .into());
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<bool> {
    let answer = match prompt(input, output, label) {
        Ok(answer) => answer,
        Err(crate::utils::error::AppError::IoError(e))
            if e.kind() == std::io::ErrorKind::UnexpectedEof =>
        {
            return Ok(false)
        }
        Err(e) => return Err(e),
    };
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn report_profile(roll_number: &str, year: AcademicYear, semester: Semester) -> StudentProfile {
    StudentProfile {
        name: roll_number.to_string(),
        enrollment: format!("{}, {}", year, semester),
    }
}

/// 互動式登入：取得驗證碼、存檔、輸入、送出，成功後顯示並匯出報表。
/// 使用者放棄重試時回傳 `Ok(None)`。
pub async fn run_login<A, S, R, W>(
    settings: &Settings,
    api: A,
    storage: &S,
    input: &mut R,
    output: &mut W,
) -> Result<Option<AttendanceReport>>
where
    A: AttendanceApi,
    S: Storage,
    R: BufRead,
    W: Write,
{
    let year = AcademicYear::try_from(settings.year)?;
    let semester = Semester::try_from(settings.semester)?;
    let mut delivered: Option<AttendanceReport> = None;

    let roll_number = {
        let mut form = FormController::new(api, |report| delivered = Some(report));

        form.fields_mut().roll_number = match &settings.roll_number {
            Some(roll) => roll.clone(),
            None => prompt(input, output, "Roll Number: ")?,
        };
        form.fields_mut().password = match &settings.password {
            Some(password) => password.clone(),
            None => prompt(input, output, "Password: ")?,
        };
        form.fields_mut().year = year;
        form.fields_mut().semester = semester;

        loop {
            tracing::info!("🔄 Requesting CAPTCHA...");
            if form.request_captcha().await != ActionOutcome::Succeeded {
                writeln!(output, "⚠️ {}", form.error().unwrap_or_default())?;
                if confirm(input, output, "Try again? [y/N] ")? {
                    continue;
                }
                return Ok(None);
            }

            if let Some(challenge) = form.captcha() {
                let bytes = challenge.image_bytes()?;
                let path = storage.write_file(CAPTCHA_FILENAME, &bytes).await?;
                tracing::info!("📸 CAPTCHA saved to {}", path);
                writeln!(output, "CAPTCHA saved to {}", path)?;
            }

            // 欄位空白時沿用同一張驗證碼重新輸入
            let outcome = loop {
                form.fields_mut().captcha_text = prompt(input, output, "Enter CAPTCHA: ")?;

                tracing::info!("📊 Fetching attendance ({}, {})...", year, semester);
                match form.submit(&mut FormEvent::new()).await {
                    ActionOutcome::Invalid => {
                        writeln!(output, "⚠️ {}", form.error().unwrap_or_default())?;
                        if form.fields().password.is_empty() {
                            form.fields_mut().password = prompt(input, output, "Password: ")?;
                        }
                    }
                    outcome => break outcome,
                }
            };
            if outcome == ActionOutcome::Succeeded {
                break;
            }

            writeln!(output, "⚠️ {}", form.error().unwrap_or_default())?;
            if !confirm(input, output, "Try again with a new CAPTCHA? [y/N] ")? {
                return Ok(None);
            }
        }

        form.credentials().roll_number
    };

    let Some(report) = delivered else {
        return Ok(None);
    };

    let profile = report_profile(&roll_number, year, semester);
    let view = render_dashboard(&profile, &report.to_records());
    write!(output, "{}", terminal::render_text(&view))?;

    if !settings.export_formats.is_empty() {
        let written = report
            .export(storage, &roll_number, &settings.export_formats, chrono::Local::now())
            .await?;
        for path in written {
            tracing::info!("📁 Report saved to: {}", path);
            writeln!(output, "📁 Report saved to: {}", path)?;
        }
    }

    Ok(Some(report))
}
