use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use super::widgets::{problems, summary, tasks};
use super::{App, InputMode, View};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Help bar
        ])
        .split(f.area());

    draw_tabs(f, app, chunks[0]);
    draw_content(f, app, chunks[1]);
    draw_status(f, app, chunks[2]);
    draw_help_bar(f, app, chunks[3]);
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let tab_titles = vec!["Tasks", "Problems", "Summary"];
    let selected = match app.view {
        View::Tasks => 0,
        View::Problems => 1,
        View::Summary => 2,
    };

    let tabs = Tabs::new(tab_titles)
        .block(Block::default().borders(Borders::ALL).title(" Tracker "))
        .select(selected)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(tabs, area);
}

fn draw_content(f: &mut Frame, app: &App, area: Rect) {
    match app.view {
        View::Tasks => tasks::draw(f, app, area),
        View::Problems => problems::draw(f, app, area),
        View::Summary => summary::draw(f, app, area),
    }
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let line = match &app.status {
        Some(msg) if msg.starts_with("Error:") || msg.starts_with("No problems") => {
            Line::from(Span::styled(msg.as_str(), Style::default().fg(Color::Red)))
        }
        Some(msg) => Line::from(Span::styled(msg.as_str(), Style::default().fg(Color::Green))),
        None => Line::default(),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn key(label: &str) -> Span<'_> {
    Span::styled(label, Style::default().fg(Color::Cyan))
}

fn draw_help_bar(f: &mut Frame, app: &App, area: Rect) {
    let prompt = match app.mode {
        InputMode::Search => Some("/"),
        InputMode::Add => Some("add: "),
        InputMode::Edit(_) => Some("edit: "),
        InputMode::Normal | InputMode::ConfirmClear => None,
    };

    let help_text = if let Some(prompt) = prompt {
        vec![
            Span::styled(prompt, Style::default().fg(Color::Yellow)),
            Span::raw(&app.input),
            Span::styled("█", Style::default().fg(Color::Yellow)),
            Span::raw(" | "),
            key("<CR>"),
            Span::raw(" Apply  "),
            key("<Esc>"),
            Span::raw(" Cancel"),
        ]
    } else if app.mode == InputMode::ConfirmClear {
        let what = match app.view {
            View::Problems => "Clear all progress?",
            _ => "Delete every task?",
        };
        vec![
            Span::styled(what, Style::default().fg(Color::Red)),
            Span::raw(" "),
            key("y"),
            Span::raw(" Yes  "),
            key("any"),
            Span::raw(" No"),
        ]
    } else {
        let mut spans = vec![key("h/l"), Span::raw(" Views  ")];

        match app.view {
            View::Tasks => {
                spans.extend(vec![
                    key("j/k"),
                    Span::raw(" Nav  "),
                    key("a"),
                    Span::raw(" Add  "),
                    key("e"),
                    Span::raw(" Edit  "),
                    key("x"),
                    Span::raw(" Toggle  "),
                    key("d"),
                    Span::raw(" Delete  "),
                    key("C"),
                    Span::raw(" Clear  "),
                    key("/"),
                    Span::raw(" Search  "),
                ]);
            }
            View::Problems => {
                spans.extend(vec![
                    key("j/k"),
                    Span::raw(" Nav  "),
                    key("x"),
                    Span::raw(" Done  "),
                    key("c"),
                    Span::raw(" Category  "),
                    key("n"),
                    Span::raw(" Next  "),
                    key("o"),
                    Span::raw(" Link  "),
                    key("C"),
                    Span::raw(" Reset  "),
                    key("/"),
                    Span::raw(" Search  "),
                ]);
            }
            View::Summary => {
                spans.extend(vec![key("^r"), Span::raw(" Reload  ")]);
            }
        }

        spans.extend(vec![key("q"), Span::raw(" Quit")]);
        spans
    };

    let help = Paragraph::new(Line::from(help_text)).style(Style::default().bg(Color::DarkGray));

    f.render_widget(help, area);
}
