//! Plain-text rendering of the display view.

use chrono::NaiveDate;
use crossterm::style::{Color, Stylize};
use engine::{
    DisplayView, Project, ProjectRow, StatusBand, ViewQuery, pipeline,
    status::{self, describe_days},
};

/// `#rrggbb` to a terminal color.
fn hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    Some(Color::Rgb {
        r: channel(0..2)?,
        g: channel(2..4)?,
        b: channel(4..6)?,
    })
}

fn badge(band: StatusBand, color: bool) -> String {
    let label = format!("[{band}]");
    match hex_color(band.color()) {
        Some(fg) if color => label.with(fg).to_string(),
        _ => label,
    }
}

/// One-line description used after a mutation.
pub fn summary(project: &Project, today: NaiveDate) -> String {
    format!(
        "{}{} {} ({})",
        if project.is_important { "* " } else { "" },
        project.name,
        project.deadline_text(),
        describe_days(status::days_left(project.deadline, today))
    )
}

fn row(row: &ProjectRow, color: bool) -> String {
    format!(
        "{:>4}  {} {:<30} {}  {:<20} {}",
        format!("[{}]", row.index),
        if row.project.is_important { "*" } else { " " },
        row.project.name,
        row.project.deadline_text(),
        describe_days(row.days_left),
        badge(row.status, color)
    )
    .trim_end()
    .to_string()
}

/// Render `view`: running projects first, then expired ones. An empty running
/// group is replaced by the empty message for `query`.
pub fn view(view: &DisplayView, query: &ViewQuery, color: bool) -> String {
    let mut lines = Vec::with_capacity(view.len() + 2);
    if view.active.is_empty() {
        lines.push(pipeline::empty_message(query));
    } else {
        lines.push("Active".to_string());
        lines.extend(view.active.iter().map(|r| row(r, color)));
    }
    if !view.expired.is_empty() {
        lines.push("Expired".to_string());
        lines.extend(view.expired.iter().map(|r| row(r, color)));
    }
    lines.join("\n")
}
