use crate::core::{AttendanceRecord, StudentProfile};

/// 出席率門檻（含）
pub const PASS_THRESHOLD: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    Good,
    Bad,
}

impl Standing {
    pub fn css_class(self) -> &'static str {
        match self {
            Standing::Good => "subject-good",
            Standing::Bad => "subject-bad",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectCard {
    pub subject: String,
    /// 兩位小數，例如 `"89.47"`
    pub percentage: String,
    pub standing: Standing,
    pub meta: String,
    /// 進度條寬度（百分比），不做上限截斷
    pub bar_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub welcome: String,
    pub cards: Vec<SubjectCard>,
}

/// 以 0.01% 為單位的出席率，整數運算並且 .5 一律進位
fn percentage_hundredths(record: &AttendanceRecord) -> u64 {
    if record.held == 0 {
        return 0;
    }
    let held = u64::from(record.held);
    let scaled = u64::from(record.attended) * 10_000;
    (scaled * 2 + held) / (held * 2)
}

pub fn format_percentage(record: &AttendanceRecord) -> String {
    let hundredths = percentage_hundredths(record);
    format!("{}.{:02}", hundredths / 100, hundredths % 100)
}

/// 分類依據四捨五入後的數值，所以 74.996 算作 75.00
pub fn build_card(record: &AttendanceRecord) -> SubjectCard {
    let hundredths = percentage_hundredths(record);
    let rounded = hundredths as f64 / 100.0;
    let standing = if rounded < PASS_THRESHOLD {
        Standing::Bad
    } else {
        Standing::Good
    };

    SubjectCard {
        subject: record.subject.clone(),
        percentage: format_percentage(record),
        standing,
        meta: format!("Classes attended: {} / {}", record.attended, record.held),
        bar_width: rounded,
    }
}

pub fn render_dashboard(profile: &StudentProfile, records: &[AttendanceRecord]) -> DashboardView {
    DashboardView {
        welcome: format!("Welcome, {} ({})", profile.name, profile.enrollment),
        cards: records.iter().map(build_card).collect(),
    }
}

pub fn demo_profile() -> StudentProfile {
    StudentProfile::new("Student Name", "2023UXX****")
}

pub fn demo_records() -> Vec<AttendanceRecord> {
    vec![
        AttendanceRecord::new("Mathematics", 40, 32),
        AttendanceRecord::new("Data Structures", 38, 34),
        AttendanceRecord::new("Operating Systems", 35, 27),
        AttendanceRecord::new("Theory of Computation", 30, 21),
        AttendanceRecord::new("Computer Networks", 32, 30),
    ]
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoLoginForm {
    pub username: String,
    pub password: String,
}

/// 假資料版的儀表板：任何帳密都能登入，永遠顯示固定的學生資料
#[derive(Debug, Clone)]
pub struct Dashboard {
    profile: StudentProfile,
    records: Vec<AttendanceRecord>,
    view: View,
    form: DemoLoginForm,
    login_error: Option<String>,
    rendered: Option<DashboardView>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::demo()
    }
}

impl Dashboard {
    pub fn new(profile: StudentProfile, records: Vec<AttendanceRecord>) -> Self {
        Self {
            profile,
            records,
            view: View::Login,
            form: DemoLoginForm::default(),
            login_error: None,
            rendered: None,
        }
    }

    pub fn demo() -> Self {
        Self::new(demo_profile(), demo_records())
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn form(&self) -> &DemoLoginForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut DemoLoginForm {
        &mut self.form
    }

    pub fn login_error(&self) -> Option<&str> {
        self.login_error.as_deref()
    }

    pub fn set_login_error(&mut self, message: impl Into<String>) {
        self.login_error = Some(message.into());
    }

    pub fn rendered(&self) -> Option<&DashboardView> {
        self.rendered.as_ref()
    }

    /// 不驗證帳密；使用者名稱空白時以 `student` 代替
    pub fn login(&mut self) -> &DashboardView {
        let username = match self.form.username.trim() {
            "" => "student".to_string(),
            name => name.to_string(),
        };
        self.login_error = None;
        self.render(&username)
    }

    pub fn render(&mut self, username: &str) -> &DashboardView {
        tracing::debug!("Rendering dashboard for {}", username);

        self.view = View::Dashboard;
        self.rendered
            .insert(render_dashboard(&self.profile, &self.records))
    }

    pub fn logout(&mut self) {
        self.view = View::Login;
        self.form = DemoLoginForm::default();
        self.login_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(subject: &str, held: u32, attended: u32) -> SubjectCard {
        build_card(&AttendanceRecord::new(subject, held, attended))
    }

    #[test]
    fn test_demo_percentages() {
        let view = render_dashboard(&demo_profile(), &demo_records());
        let summary: Vec<(&str, Standing)> = view
            .cards
            .iter()
            .map(|c| (c.percentage.as_str(), c.standing))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("80.00", Standing::Good),
                ("89.47", Standing::Good),
                ("77.14", Standing::Good),
                ("70.00", Standing::Bad),
                ("93.75", Standing::Good),
            ]
        );
    }

    #[test]
    fn test_zero_held_is_zero_percent() {
        let zero = card("Seminar", 0, 0);
        assert_eq!(zero.percentage, "0.00");
        assert_eq!(zero.standing, Standing::Bad);
        assert_eq!(zero.bar_width, 0.0);
    }

    #[test]
    fn test_threshold_boundary() {
        assert_eq!(card("Exact", 4, 3).percentage, "75.00");
        assert_eq!(card("Exact", 4, 3).standing, Standing::Good);
        assert_eq!(card("Just below", 10_000, 7_499).standing, Standing::Bad);
        // 74.996% 四捨五入為 75.00
        assert_eq!(card("Rounds up", 25_000, 18_749).percentage, "75.00");
        assert_eq!(card("Rounds up", 25_000, 18_749).standing, Standing::Good);
    }

    #[test]
    fn test_exact_halves_round_up() {
        // 25/32 = 78.125%，5/32 = 15.625%
        let networks = card("Networks", 32, 25);
        assert_eq!(networks.percentage, "78.13");
        assert_eq!(networks.bar_width, 78.13);
        assert_eq!(card("Lab", 32, 5).percentage, "15.63");
        assert_eq!(card("Elective", 8, 1).percentage, "12.50");
        assert_eq!(card("Seminar", 800, 1).percentage, "0.13");
        assert_eq!(format_percentage(&AttendanceRecord::new("Empty", 0, 3)), "0.00");
    }

    #[test]
    fn test_card_text_and_bar() {
        let c = card("Data Structures", 38, 34);
        assert_eq!(c.meta, "Classes attended: 34 / 38");
        assert_eq!(c.bar_width, 89.47);
        assert_eq!(c.standing.css_class(), "subject-good");

        let over = card("Extra classes", 10, 12);
        assert_eq!(over.percentage, "120.00");
        assert_eq!(over.bar_width, 120.0);
    }

    #[test]
    fn test_welcome_uses_fixed_profile() {
        let mut dashboard = Dashboard::demo();
        dashboard.form_mut().username = "2023UCS1234".to_string();

        let view = dashboard.login().clone();

        assert_eq!(view.welcome, "Welcome, Student Name (2023UXX****)");
        assert_eq!(view.cards.len(), 5);
        assert_eq!(dashboard.view(), View::Dashboard);
    }

    #[test]
    fn test_render_replaces_previous_cards() {
        let mut dashboard = Dashboard::demo();
        dashboard.render("first");
        dashboard.render("second");

        assert_eq!(dashboard.rendered().unwrap().cards.len(), 5);
    }

    #[test]
    fn test_logout_resets_view_form_and_error() {
        let mut dashboard = Dashboard::demo();
        dashboard.form_mut().username = "someone".to_string();
        dashboard.form_mut().password = "secret".to_string();
        dashboard.login();
        dashboard.set_login_error("stale");

        dashboard.logout();

        assert_eq!(dashboard.view(), View::Login);
        assert_eq!(dashboard.login_error(), None);
        assert_eq!(dashboard.form(), &DemoLoginForm::default());

        // 未登入時登出也一樣
        let mut fresh = Dashboard::demo();
        fresh.set_login_error("bad");
        fresh.logout();
        assert_eq!(fresh.view(), View::Login);
        assert_eq!(fresh.login_error(), None);
    }

    #[test]
    fn test_login_clears_error() {
        let mut dashboard = Dashboard::demo();
        dashboard.set_login_error("old error");

        dashboard.login();

        assert_eq!(dashboard.login_error(), None);
    }
}
