//! Applies user intents to in-memory collections and derives view models.
//!
//! Nothing here touches the filesystem. Callers load state, hand it in,
//! persist it when the returned outcome says so, and render the view.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::catalog;
use crate::error::{Result, TrackerError};
use crate::models::{
    Difficulty, Item, ProblemRecord, ProblemRow, ProblemView, ProgressSet, Stats, TaskList,
    TaskView,
};

pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskIntent {
    Add(String),
    Toggle(u64),
    Edit { id: u64, text: String },
    Delete(u64),
    ClearAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressIntent {
    MarkDone(i64),
    Undo(i64),
    Toggle(i64),
    ClearProgress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "item", rename_all = "snake_case")]
pub enum TaskOutcome {
    Added(Item),
    Toggled(Item),
    Edited(Item),
    Deleted(Item),
    Cleared(usize),
    /// Blank input; nothing changed.
    Ignored,
}

impl TaskOutcome {
    pub fn needs_save(&self) -> bool {
        !matches!(self, TaskOutcome::Ignored)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "id", rename_all = "snake_case")]
pub enum ProgressOutcome {
    Completed(i64),
    Reopened(i64),
    Cleared(usize),
    /// The problem was already in the requested state.
    Unchanged(i64),
}

impl ProgressOutcome {
    pub fn needs_save(&self) -> bool {
        !matches!(self, ProgressOutcome::Unchanged(_))
    }
}

/// Apply one intent to the to-do list.
///
/// Unknown ids are reported as `NotFound` and leave the list as it was.
pub fn apply_task(list: &mut TaskList, intent: TaskIntent) -> Result<TaskOutcome> {
    let outcome = match intent {
        TaskIntent::Add(text) => {
            let text = text.trim();
            if text.is_empty() {
                TaskOutcome::Ignored
            } else {
                let item = Item {
                    id: list.next_id(),
                    text: text.to_string(),
                    done: false,
                };
                list.items.push(item.clone());
                TaskOutcome::Added(item)
            }
        }
        TaskIntent::Toggle(id) => {
            let item = list.get_mut(id).ok_or_else(|| TrackerError::task_not_found(id))?;
            item.done = !item.done;
            TaskOutcome::Toggled(item.clone())
        }
        TaskIntent::Edit { id, text } => {
            let item = list.get_mut(id).ok_or_else(|| TrackerError::task_not_found(id))?;
            let text = text.trim();
            if text.is_empty() {
                TaskOutcome::Ignored
            } else {
                item.text = text.to_string();
                TaskOutcome::Edited(item.clone())
            }
        }
        TaskIntent::Delete(id) => {
            let index = list
                .items
                .iter()
                .position(|i| i.id == id)
                .ok_or_else(|| TrackerError::task_not_found(id))?;
            TaskOutcome::Deleted(list.items.remove(index))
        }
        TaskIntent::ClearAll => {
            let count = list.len();
            list.items.clear();
            TaskOutcome::Cleared(count)
        }
    };

    if !outcome.needs_save() {
        debug!("ignored task intent with blank text");
    }
    Ok(outcome)
}

/// Apply one intent to the progress set. Ids must exist in `catalog`.
pub fn apply_progress(
    progress: &mut ProgressSet,
    catalog: &[ProblemRecord],
    intent: ProgressIntent,
) -> Result<ProgressOutcome> {
    let require = |id: i64| -> Result<i64> {
        if catalog.iter().any(|p| p.id == id) {
            Ok(id)
        } else {
            Err(TrackerError::problem_not_found(id))
        }
    };

    let outcome = match intent {
        ProgressIntent::MarkDone(id) => {
            if progress.insert(require(id)?) {
                ProgressOutcome::Completed(id)
            } else {
                ProgressOutcome::Unchanged(id)
            }
        }
        ProgressIntent::Undo(id) => {
            if progress.remove(require(id)?) {
                ProgressOutcome::Reopened(id)
            } else {
                ProgressOutcome::Unchanged(id)
            }
        }
        ProgressIntent::Toggle(id) => {
            let id = require(id)?;
            if progress.remove(id) {
                ProgressOutcome::Reopened(id)
            } else {
                progress.insert(id);
                ProgressOutcome::Completed(id)
            }
        }
        ProgressIntent::ClearProgress => {
            let count = progress.len();
            progress.clear();
            ProgressOutcome::Cleared(count)
        }
    };
    Ok(outcome)
}

/// View-only narrowing of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl Query {
    pub fn new(category: Option<&str>, search: Option<&str>) -> Self {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
            .map(str::to_string);
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        Self { category, search }
    }

    pub fn matches_text(&self, text: &str) -> bool {
        match &self.search {
            Some(term) => text.to_lowercase().contains(term),
            None => true,
        }
    }

    pub fn matches_category(&self, category: &str) -> bool {
        match &self.category {
            Some(selected) => selected == category,
            None => true,
        }
    }

    pub fn selected_category(&self) -> &str {
        self.category.as_deref().unwrap_or(ALL_CATEGORIES)
    }
}

pub fn task_view(list: &TaskList, search: Option<&str>) -> TaskView {
    let query = Query::new(None, search);
    TaskView {
        items: list
            .items
            .iter()
            .filter(|i| query.matches_text(&i.text))
            .cloned()
            .collect(),
        search: query.search.clone(),
        total: list.len(),
        done: list.done_count(),
    }
}

pub fn problem_view(
    problems: &[ProblemRecord],
    progress: &ProgressSet,
    query: &Query,
) -> ProblemView {
    let rows: Vec<ProblemRow> = problems
        .iter()
        .filter(|p| query.matches_category(&p.category) && query.matches_text(&p.title))
        .map(|p| ProblemRow {
            problem: p.clone(),
            completed: progress.contains(p.id),
        })
        .collect();

    let known: HashSet<i64> = problems.iter().map(|p| p.id).collect();
    let completed = progress.iter().filter(|id| known.contains(id)).count();

    let mut categories = vec![ALL_CATEGORIES.to_string()];
    categories.extend(catalog::categories(problems));

    ProblemView {
        shown: rows.len(),
        rows,
        categories,
        selected_category: query.selected_category().to_string(),
        search: query.search.clone(),
        completed,
        total: problems.len(),
        stale_progress: progress.len() - completed,
        warning: None,
    }
}

pub fn stats(list: &TaskList, problems: &[ProblemRecord], progress: &ProgressSet) -> Stats {
    let mut stats = Stats {
        tasks_total: list.len(),
        tasks_done: list.done_count(),
        problems_total: problems.len(),
        ..Stats::default()
    };

    for problem in problems.iter().filter(|p| progress.contains(p.id)) {
        stats.problems_completed += 1;
        match problem.difficulty {
            Difficulty::Easy => stats.easy_completed += 1,
            Difficulty::Medium => stats.medium_completed += 1,
            Difficulty::Hard => stats.hard_completed += 1,
        }
    }
    stats
}

/// Pick a random problem that matches `query` and is not yet completed.
pub fn pick_unsolved<R: Rng + ?Sized>(
    problems: &[ProblemRecord],
    progress: &ProgressSet,
    query: &Query,
    rng: &mut R,
) -> Option<ProblemRecord> {
    let candidates: Vec<&ProblemRecord> = problems
        .iter()
        .filter(|p| !progress.contains(p.id))
        .filter(|p| query.matches_category(&p.category) && query.matches_text(&p.title))
        .collect();
    candidates.choose(rng).map(|p| (*p).clone())
}
