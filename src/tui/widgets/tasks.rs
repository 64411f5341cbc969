use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::header_style;
use crate::truncate;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let summary = &app.task_summary;
    let title = match &summary.search {
        Some(term) => format!(
            " Tasks (search: {}) {}/{} done ",
            term, summary.done, summary.total
        ),
        None => format!(" Tasks {}/{} done ", summary.done, summary.total),
    };

    let width = area.width.saturating_sub(16) as usize;
    let items: Vec<ListItem> = app
        .tasks
        .items
        .iter()
        .map(|item| {
            let (mark, style) = if item.done {
                (
                    "[x] ",
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::CROSSED_OUT),
                )
            } else {
                ("[ ] ", Style::default().fg(Color::White))
            };

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<5}", item.id),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(mark, Style::default().fg(Color::Green)),
                Span::styled(truncate(&item.text, width), style),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().fg(Color::Cyan));

    if items.is_empty() {
        let hint = if summary.total == 0 {
            "No tasks yet. Press a to add one."
        } else {
            "No tasks match the search. Press Esc to clear it."
        };
        let empty = Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray)))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let header = Line::from(vec![
        Span::styled(format!("{:<5}", "ID"), header_style()),
        Span::styled("    Task", header_style()),
    ]);

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.tasks.selected);

    let inner = block.inner(area);
    f.render_widget(block, area);

    let header_area = Rect {
        x: inner.x + 2,
        width: inner.width.saturating_sub(2),
        height: 1,
        ..inner
    };
    f.render_widget(Paragraph::new(header), header_area);

    let list_area = Rect {
        y: inner.y + 1,
        height: inner.height.saturating_sub(1),
        ..inner
    };
    f.render_stateful_widget(list, list_area, &mut state);
}
