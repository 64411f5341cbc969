pub mod problems;
pub mod summary;
pub mod tasks;

use ratatui::style::{Color, Modifier, Style};

use crate::models::Difficulty;

fn header_style() -> Style {
    Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::BOLD)
}

fn difficulty_color(difficulty: Difficulty) -> Color {
    match difficulty {
        Difficulty::Easy => Color::Green,
        Difficulty::Medium => Color::Yellow,
        Difficulty::Hard => Color::Red,
    }
}

fn progress_bar(done: usize, total: usize, width: usize) -> String {
    let filled = if total == 0 { 0 } else { (done * width / total).min(width) };
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
