mod ui;
mod widgets;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use crate::error::TrackerError;
use crate::models::{Item, ProblemRow, ProblemView, Stats, TaskView};
use crate::reconciler::{
    ProgressIntent, ProgressOutcome, Query, TaskIntent, TaskOutcome, ALL_CATEGORIES,
};
use crate::tracker::Tracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Tasks,
    Problems,
    Summary,
}

impl View {
    fn next(&self) -> Self {
        match self {
            View::Tasks => View::Problems,
            View::Problems => View::Summary,
            View::Summary => View::Tasks,
        }
    }

    fn prev(&self) -> Self {
        match self {
            View::Tasks => View::Summary,
            View::Problems => View::Tasks,
            View::Summary => View::Problems,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Add,
    Edit(u64),
    ConfirmClear,
}

pub struct StatefulList<T> {
    pub items: Vec<T>,
    pub selected: Option<usize>,
}

impl<T> StatefulList<T> {
    fn with_items(items: Vec<T>) -> Self {
        let selected = if items.is_empty() { None } else { Some(0) };
        Self { items, selected }
    }

    /// Swap in fresh items, keeping the cursor in range.
    fn set_items(&mut self, items: Vec<T>) {
        self.selected = match (self.selected, items.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
        self.items = items;
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) => {
                if i >= self.items.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.selected = Some(i);
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) => {
                if i == 0 {
                    self.items.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.selected = Some(i);
    }

    fn first(&mut self) {
        if !self.items.is_empty() {
            self.selected = Some(0);
        }
    }

    fn last(&mut self) {
        if !self.items.is_empty() {
            self.selected = Some(self.items.len() - 1);
        }
    }

    fn selected_item(&self) -> Option<&T> {
        self.selected.and_then(|i| self.items.get(i))
    }
}

pub struct App {
    tracker: Tracker,
    pub view: View,
    pub mode: InputMode,
    pub input: String,
    pub tasks: StatefulList<Item>,
    /// Counts and search for the task list; its items live in `tasks`.
    pub task_summary: TaskView,
    pub problems: StatefulList<ProblemRow>,
    /// Counts, categories and warning for the catalog; rows live in `problems`.
    pub problem_summary: ProblemView,
    /// Selected category by name, so a reload cannot shift it.
    pub category: String,
    pub task_search: String,
    pub problem_search: String,
    pub stats: Stats,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(tracker: Tracker) -> Self {
        let mut app = Self {
            tracker,
            view: View::Tasks,
            mode: InputMode::Normal,
            input: String::new(),
            tasks: StatefulList::with_items(Vec::new()),
            task_summary: TaskView::default(),
            problems: StatefulList::with_items(Vec::new()),
            problem_summary: ProblemView::default(),
            category: ALL_CATEGORIES.to_string(),
            task_search: String::new(),
            problem_search: String::new(),
            stats: Stats::default(),
            status: None,
            should_quit: false,
        };
        app.refresh_data();
        app
    }

    pub fn refresh_data(&mut self) {
        self.refresh_tasks();
        self.refresh_problems();
        self.refresh_stats();
    }

    fn refresh_tasks(&mut self) {
        match self.tracker.task_view(Some(self.task_search.as_str())) {
            Ok(mut view) => {
                self.tasks.set_items(std::mem::take(&mut view.items));
                self.task_summary = view;
            }
            Err(e) => {
                self.tasks.set_items(Vec::new());
                self.report(e);
            }
        }
    }

    fn refresh_problems(&mut self) {
        let query = self.problem_query();
        match self.tracker.problem_view(&query) {
            Ok(mut view) => {
                if !view.categories.contains(&self.category) {
                    // The category left the catalog; "All" is always listed.
                    self.category = ALL_CATEGORIES.to_string();
                    return self.refresh_problems();
                }
                if let Some(warning) = &view.warning {
                    self.status = Some(warning.clone());
                }
                self.problems.set_items(std::mem::take(&mut view.rows));
                self.problem_summary = view;
            }
            Err(e) => {
                self.problems.set_items(Vec::new());
                self.report(e);
            }
        }
    }

    fn refresh_stats(&mut self) {
        match self.tracker.stats() {
            Ok(stats) => self.stats = stats,
            Err(e) => self.report(e),
        }
    }

    pub fn selected_category(&self) -> &str {
        &self.category
    }

    fn problem_query(&self) -> Query {
        Query::new(Some(self.selected_category()), Some(self.problem_search.as_str()))
    }

    fn report(&mut self, e: TrackerError) {
        warn!(error = %e, "action failed");
        self.status = Some(format!("Error: {}", e));
    }

    fn apply_task(&mut self, intent: TaskIntent) {
        match self.tracker.apply_task(intent) {
            Ok(outcome) => {
                self.status = Some(describe_task(&outcome));
                self.refresh_tasks();
                if let TaskOutcome::Added(item) = &outcome {
                    if let Some(pos) = self.tasks.items.iter().position(|i| i.id == item.id) {
                        self.tasks.selected = Some(pos);
                    }
                }
                self.refresh_stats();
            }
            Err(e) => self.report(e),
        }
    }

    fn apply_progress(&mut self, intent: ProgressIntent) {
        match self.tracker.apply_progress(intent) {
            Ok(outcome) => {
                self.status = Some(describe_progress(&outcome));
                self.refresh_problems();
                self.refresh_stats();
            }
            Err(e) => self.report(e),
        }
    }

    fn cycle_category(&mut self) {
        let categories = &self.problem_summary.categories;
        let next = categories
            .iter()
            .position(|c| *c == self.category)
            .map_or(0, |i| (i + 1) % categories.len());
        self.category = categories
            .get(next)
            .cloned()
            .unwrap_or_else(|| ALL_CATEGORIES.to_string());
        self.problems.selected = None;
        self.refresh_problems();
        self.status = Some(format!("Category: {}", self.selected_category()));
    }

    fn suggest_next(&mut self) {
        let query = Query::new(Some(self.selected_category()), None);
        match self.tracker.next_unsolved(&query, &mut rand::thread_rng()) {
            Ok(Some(problem)) => {
                // The pick may sit outside the current search; clear it so it shows.
                if !self.problems.items.iter().any(|r| r.problem.id == problem.id) {
                    self.problem_search.clear();
                    self.refresh_problems();
                }
                self.problems.selected = self
                    .problems
                    .items
                    .iter()
                    .position(|r| r.problem.id == problem.id);
                self.status = Some(format!("Try next: {} ({})", problem.title, problem.id));
            }
            Ok(None) => self.status = Some("Nothing left to solve here".to_string()),
            Err(e) => self.report(e),
        }
    }

    fn commit_input(&mut self) {
        let text = std::mem::take(&mut self.input);
        match self.mode {
            InputMode::Search => match self.view {
                View::Tasks => {
                    self.task_search = text;
                    self.tasks.selected = None;
                    self.refresh_tasks();
                }
                View::Problems => {
                    self.problem_search = text;
                    self.problems.selected = None;
                    self.refresh_problems();
                }
                View::Summary => {}
            },
            InputMode::Add => self.apply_task(TaskIntent::Add(text)),
            InputMode::Edit(id) => self.apply_task(TaskIntent::Edit { id, text }),
            InputMode::Normal | InputMode::ConfirmClear => {}
        }
        self.mode = InputMode::Normal;
    }

    fn confirm_clear(&mut self, confirmed: bool) {
        self.mode = InputMode::Normal;
        if !confirmed {
            self.status = Some("Cancelled".to_string());
            return;
        }
        match self.view {
            View::Tasks => self.apply_task(TaskIntent::ClearAll),
            View::Problems => self.apply_progress(ProgressIntent::ClearProgress),
            View::Summary => {}
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        match self.mode {
            InputMode::Search | InputMode::Add | InputMode::Edit(_) => {
                match key {
                    KeyCode::Esc => {
                        self.mode = InputMode::Normal;
                        self.input.clear();
                    }
                    KeyCode::Enter => self.commit_input(),
                    KeyCode::Backspace => {
                        self.input.pop();
                    }
                    KeyCode::Char(c) => self.input.push(c),
                    _ => {}
                }
                return;
            }
            InputMode::ConfirmClear => {
                self.confirm_clear(matches!(key, KeyCode::Char('y') | KeyCode::Char('Y')));
                return;
            }
            InputMode::Normal => {}
        }

        match key {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.refresh_data();
                self.status = Some("Reloaded".to_string());
            }

            // Views
            KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => self.switch_view(self.view.prev()),
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => self.switch_view(self.view.next()),

            // List navigation
            KeyCode::Char('j') | KeyCode::Down => match self.view {
                View::Tasks => self.tasks.next(),
                View::Problems => self.problems.next(),
                View::Summary => {}
            },
            KeyCode::Char('k') | KeyCode::Up => match self.view {
                View::Tasks => self.tasks.previous(),
                View::Problems => self.problems.previous(),
                View::Summary => {}
            },
            KeyCode::Char('g') => match self.view {
                View::Tasks => self.tasks.first(),
                View::Problems => self.problems.first(),
                View::Summary => {}
            },
            KeyCode::Char('G') => match self.view {
                View::Tasks => self.tasks.last(),
                View::Problems => self.problems.last(),
                View::Summary => {}
            },

            KeyCode::Char('/') if self.view != View::Summary => {
                self.input = match self.view {
                    View::Tasks => self.task_search.clone(),
                    _ => self.problem_search.clone(),
                };
                self.mode = InputMode::Search;
            }

            KeyCode::Esc => match self.view {
                View::Tasks if !self.task_search.is_empty() => {
                    self.task_search.clear();
                    self.refresh_tasks();
                }
                View::Problems if !self.problem_search.is_empty() => {
                    self.problem_search.clear();
                    self.refresh_problems();
                }
                _ => self.status = None,
            },

            KeyCode::Char('C') if self.view != View::Summary => {
                self.mode = InputMode::ConfirmClear;
            }

            _ => match self.view {
                View::Tasks => self.handle_task_key(key),
                View::Problems => self.handle_problem_key(key),
                View::Summary => {}
            },
        }
    }

    fn handle_task_key(&mut self, key: KeyCode) {
        let selected = self.tasks.selected_item().map(|i| (i.id, i.text.clone()));
        match key {
            KeyCode::Char('a') => {
                self.input.clear();
                self.mode = InputMode::Add;
            }
            KeyCode::Char('e') => {
                if let Some((id, text)) = selected {
                    self.input = text;
                    self.mode = InputMode::Edit(id);
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('x') | KeyCode::Enter => {
                if let Some((id, _)) = selected {
                    self.apply_task(TaskIntent::Toggle(id));
                }
            }
            KeyCode::Char('d') => {
                if let Some((id, _)) = selected {
                    self.apply_task(TaskIntent::Delete(id));
                }
            }
            _ => {}
        }
    }

    fn handle_problem_key(&mut self, key: KeyCode) {
        let selected = self
            .problems
            .selected_item()
            .map(|r| (r.problem.id, r.problem.link.clone()));
        match key {
            KeyCode::Char(' ') | KeyCode::Char('x') | KeyCode::Enter => {
                if let Some((id, _)) = selected {
                    self.apply_progress(ProgressIntent::Toggle(id));
                }
            }
            KeyCode::Char('c') => self.cycle_category(),
            KeyCode::Char('o') => {
                if let Some((_, link)) = selected {
                    self.status = Some(if link.is_empty() {
                        "No link for this problem".to_string()
                    } else {
                        link
                    });
                }
            }
            KeyCode::Char('n') => self.suggest_next(),
            _ => {}
        }
    }

    fn switch_view(&mut self, view: View) {
        self.view = view;
        if view == View::Summary {
            self.refresh_stats();
        }
    }
}

fn describe_task(outcome: &TaskOutcome) -> String {
    match outcome {
        TaskOutcome::Added(item) => format!("Added '{}'", item.text),
        TaskOutcome::Toggled(item) if item.done => format!("Done: {}", item.text),
        TaskOutcome::Toggled(item) => format!("Not done: {}", item.text),
        TaskOutcome::Edited(item) => format!("Updated '{}'", item.text),
        TaskOutcome::Deleted(item) => format!("Deleted '{}'", item.text),
        TaskOutcome::Cleared(count) => format!("Cleared {} task(s)", count),
        TaskOutcome::Ignored => "Task text is empty; nothing changed".to_string(),
    }
}

fn describe_progress(outcome: &ProgressOutcome) -> String {
    match outcome {
        ProgressOutcome::Completed(id) => format!("Problem {} done", id),
        ProgressOutcome::Reopened(id) => format!("Problem {} reopened", id),
        ProgressOutcome::Cleared(count) => format!("Cleared progress for {} problem(s)", count),
        ProgressOutcome::Unchanged(id) => format!("Problem {} unchanged", id),
    }
}

pub fn run(tracker: Tracker) -> Result<(), Box<dyn std::error::Error>> {
    info!(dir = %tracker.config().data_dir.display(), "starting terminal UI");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(tracker);

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key.code, key.modifiers);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
