use crate::core::dashboard::{DashboardView, Standing, SubjectCard};
use std::fmt::Write as _;

pub const BAR_WIDTH: usize = 30;

pub fn progress_bar(width_percent: f64) -> String {
    let clamped = width_percent.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn tag(standing: Standing) -> &'static str {
    match standing {
        Standing::Good => "[GOOD]",
        Standing::Bad => "[LOW]",
    }
}

fn write_card(out: &mut String, card: &SubjectCard) {
    let _ = writeln!(
        out,
        "{:<36} {:>8} %  {}",
        card.subject,
        card.percentage,
        tag(card.standing)
    );
    let _ = writeln!(out, "  {}", card.meta);
    let _ = writeln!(out, "  {}", progress_bar(card.bar_width));
}

pub fn render_text(view: &DashboardView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.welcome);
    let _ = writeln!(out);

    if view.cards.is_empty() {
        let _ = writeln!(out, "No attendance records.");
        return out;
    }

    for card in &view.cards {
        write_card(&mut out, card);
        let _ = writeln!(out);
    }
    out
}
