use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{difficulty_color, progress_bar};
use crate::models::Difficulty;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    draw_tasks(f, app, chunks[0]);
    draw_problems(f, app, chunks[1]);
}

fn stat_line(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::Gray)),
        Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ])
}

fn draw_tasks(f: &mut Frame, app: &App, area: Rect) {
    let stats = &app.stats;
    let open = stats.tasks_total - stats.tasks_done;

    let text = vec![
        stat_line("Tasks", stats.tasks_total.to_string(), Color::White),
        stat_line("Done", stats.tasks_done.to_string(), Color::Green),
        stat_line(
            "Open",
            open.to_string(),
            if open > 0 { Color::Yellow } else { Color::White },
        ),
        Line::from(""),
        Line::from(Span::styled(
            progress_bar(stats.tasks_done, stats.tasks_total, 20),
            Style::default().fg(Color::Green),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" To-do ")
        .title_style(Style::default().fg(Color::Cyan));

    f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_problems(f: &mut Frame, app: &App, area: Rect) {
    let stats = &app.stats;

    let mut text = vec![
        stat_line(
            "Completed",
            format!(
                "{} / {} ({:.0}%)",
                stats.problems_completed,
                stats.problems_total,
                stats.completion_rate()
            ),
            Color::White,
        ),
        Line::from(Span::styled(
            progress_bar(stats.problems_completed, stats.problems_total, 20),
            Style::default().fg(Color::Green),
        )),
        Line::from(""),
    ];

    for (difficulty, count) in [
        (Difficulty::Easy, stats.easy_completed),
        (Difficulty::Medium, stats.medium_completed),
        (Difficulty::Hard, stats.hard_completed),
    ] {
        text.push(stat_line(
            difficulty.as_str(),
            count.to_string(),
            difficulty_color(difficulty),
        ));
    }

    if app.problem_summary.stale_progress > 0 {
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(
            format!(
                "{} completed id(s) are not in the catalog",
                app.problem_summary.stale_progress
            ),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Problems ")
        .title_style(Style::default().fg(Color::Cyan));

    f.render_widget(Paragraph::new(text).block(block), area);
}
