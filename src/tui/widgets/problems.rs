use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::{difficulty_color, header_style};
use crate::truncate;
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let summary = &app.problem_summary;
    let mut title = format!(
        " Problems [{}] {} shown, {}/{} done ",
        app.selected_category(),
        summary.shown,
        summary.completed,
        summary.total
    );
    if let Some(term) = &summary.search {
        title.push_str(&format!("(search: {}) ", term));
    }

    let items: Vec<ListItem> = app
        .problems
        .items
        .iter()
        .map(|row| {
            let problem = &row.problem;
            let (mark, title_style) = if row.completed {
                ("[x] ", Style::default().fg(Color::DarkGray))
            } else {
                ("[ ] ", Style::default().fg(Color::White))
            };

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<5}", problem.id),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(mark, Style::default().fg(Color::Green)),
                Span::styled(format!("{:<40}", truncate(&problem.title, 38)), title_style),
                Span::styled(
                    format!("{:<20}", truncate(&problem.category, 18)),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(
                    problem.difficulty.as_str(),
                    Style::default().fg(difficulty_color(problem.difficulty)),
                ),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_style(Style::default().fg(Color::Cyan));

    if items.is_empty() {
        let hint = match &summary.warning {
            Some(warning) => warning.clone(),
            None if summary.total == 0 => "The catalog is empty.".to_string(),
            None => "No problems match. Press c for another category or Esc to clear the search."
                .to_string(),
        };
        let empty = Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray)))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let header = Line::from(vec![
        Span::styled(format!("{:<5}", "ID"), header_style()),
        Span::styled(format!("    {:<40}", "Title"), header_style()),
        Span::styled(format!("{:<20}", "Category"), header_style()),
        Span::styled("Difficulty", header_style()),
    ]);

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.problems.selected);

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
