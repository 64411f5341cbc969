use rand::Rng;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Result, TrackerError};
use crate::models::{ProblemRecord, ProblemView, ProgressSet, Stats, TaskList, TaskView};
use crate::reconciler::{
    self, ProgressIntent, ProgressOutcome, Query, TaskIntent, TaskOutcome,
};
use crate::store::{CatalogStore, ProgressStore, TaskStore};

/// The catalog as seen by one cycle. A catalog that failed to load is empty
/// and carries the reason.
#[derive(Debug)]
pub struct Catalog {
    pub problems: Vec<ProblemRecord>,
    pub issue: Option<TrackerError>,
}

impl Catalog {
    pub fn warning(&self) -> Option<String> {
        self.issue
            .as_ref()
            .map(|e| format!("No problems available: {}", e))
    }
}

/// Runs load, apply, save cycles against the files named by a [`Config`].
pub struct Tracker {
    config: Config,
    tasks: TaskStore,
    progress: ProgressStore,
    catalog: CatalogStore,
}

impl Tracker {
    pub fn open(config: Config) -> Self {
        let tasks = TaskStore::new(&config.tasks_path);
        let progress = ProgressStore::new(&config.progress_path);
        let catalog = CatalogStore::new(&config.catalog_path, config.catalog_format());
        Self {
            config,
            tasks,
            progress,
            catalog,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // To-do operations
    pub fn tasks(&self) -> Result<TaskList> {
        self.tasks.load()
    }

    pub fn task_view(&self, search: Option<&str>) -> Result<TaskView> {
        Ok(reconciler::task_view(&self.tasks()?, search))
    }

    pub fn apply_task(&self, intent: TaskIntent) -> Result<TaskOutcome> {
        let mut list = self.tasks()?;
        let outcome = reconciler::apply_task(&mut list, intent)?;
        if outcome.needs_save() {
            self.tasks.save(&list)?;
            info!(?outcome, "task list updated");
        }
        Ok(outcome)
    }

    // Catalog and progress operations
    pub fn catalog(&self) -> Catalog {
        match self.catalog.load() {
            Ok(problems) => Catalog {
                problems,
                issue: None,
            },
            Err(e) => {
                warn!(path = %self.catalog.path().display(), error = %e, "catalog unavailable");
                Catalog {
                    problems: Vec::new(),
                    issue: Some(e),
                }
            }
        }
    }

    pub fn progress(&self) -> Result<ProgressSet> {
        self.progress.load()
    }

    pub fn apply_progress(&self, intent: ProgressIntent) -> Result<ProgressOutcome> {
        let mut progress = self.progress()?;
        let catalog = self.catalog();
        let outcome = reconciler::apply_progress(&mut progress, &catalog.problems, intent)?;
        if outcome.needs_save() {
            self.progress.save(&progress)?;
            info!(?outcome, "progress updated");
        }
        Ok(outcome)
    }

    pub fn problem_view(&self, query: &Query) -> Result<ProblemView> {
        let progress = self.progress()?;
        let catalog = self.catalog();
        let mut view = reconciler::problem_view(&catalog.problems, &progress, query);
        view.warning = catalog.warning();
        Ok(view)
    }

    pub fn stats(&self) -> Result<Stats> {
        let list = self.tasks()?;
        let progress = self.progress()?;
        let catalog = self.catalog();
        Ok(reconciler::stats(&list, &catalog.problems, &progress))
    }

    pub fn next_unsolved<R: Rng + ?Sized>(
        &self,
        query: &Query,
        rng: &mut R,
    ) -> Result<Option<ProblemRecord>> {
        let progress = self.progress()?;
        let catalog = self.catalog();
        Ok(reconciler::pick_unsolved(
            &catalog.problems,
            &progress,
            query,
            rng,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PROBLEMS_FILE, PROBLEMS_SOURCE_FILE};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::fs;
    use tempfile::TempDir;

    const CATALOG: &str = r#"[
        {"id": 1, "title": "Two Sum", "link": "https://a", "category": "Arrays", "difficulty": "Easy"},
        {"id": 2, "title": "Merge Intervals", "link": "https://b", "category": "Arrays", "difficulty": "Medium"},
        {"id": 3, "title": "Invert Binary Tree", "link": "https://c", "category": "Trees", "difficulty": "Easy"}
    ]"#;

    fn setup() -> (TempDir, Tracker) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(dir.path().join(PROBLEMS_FILE), CATALOG).unwrap();
        let tracker = Tracker::open(Config::new(dir.path(), None));
        (dir, tracker)
    }

    mod task_tests {
        use super::*;

        #[test]
        fn add_toggle_reload_scenario() {
            let (dir, tracker) = setup();
            fs::write(dir.path().join("tasks.json"), "").unwrap();

            let id = match tracker.apply_task(TaskIntent::Add("Buy milk".into())).unwrap() {
                TaskOutcome::Added(item) => {
                    assert!(!item.done);
                    item.id
                }
                other => panic!("Expected Added, got {:?}", other),
            };
            assert_eq!(tracker.tasks().unwrap().len(), 1);

            tracker.apply_task(TaskIntent::Toggle(id)).unwrap();

            let reopened = Tracker::open(Config::new(dir.path(), None));
            let list = reopened.tasks().unwrap();
            assert!(list.get(id).unwrap().done);

            let raw: serde_json::Value =
                serde_json::from_str(&fs::read_to_string(dir.path().join("tasks.json")).unwrap())
                    .unwrap();
            assert_eq!(raw[0]["task"], "Buy milk");
            assert_eq!(raw[0]["done"], true);
        }

        #[test]
        fn blank_add_writes_nothing() {
            let (dir, tracker) = setup();
            let outcome = tracker.apply_task(TaskIntent::Add("   ".into())).unwrap();
            assert_eq!(outcome, TaskOutcome::Ignored);
            assert!(!dir.path().join("tasks.json").exists());
        }

        #[test]
        fn delete_unknown_writes_nothing() {
            let (dir, tracker) = setup();
            let err = tracker.apply_task(TaskIntent::Delete(9)).unwrap_err();
            assert!(err.is_not_found());
            assert!(!dir.path().join("tasks.json").exists());
        }

        #[test]
        fn malformed_tasks_file_is_never_overwritten() {
            let (dir, tracker) = setup();
            let path = dir.path().join("tasks.json");
            fs::write(&path, "{ not json").unwrap();

            let err = tracker
                .apply_task(TaskIntent::Add("new".into()))
                .unwrap_err();
            assert!(matches!(err, TrackerError::Parse { .. }));
            assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
        }

        #[test]
        fn add_delete_sequence_round_trips() {
            let (dir, tracker) = setup();
            for text in ["a", "b", "c", "d"] {
                tracker.apply_task(TaskIntent::Add(text.into())).unwrap();
            }
            tracker.apply_task(TaskIntent::Delete(2)).unwrap();
            tracker.apply_task(TaskIntent::Add("e".into())).unwrap();
            tracker.apply_task(TaskIntent::Delete(4)).unwrap();

            let in_memory = tracker.tasks().unwrap();
            let reloaded = Tracker::open(Config::new(dir.path(), None))
                .tasks()
                .unwrap();
            assert_eq!(in_memory, reloaded);

            let texts: Vec<&str> = reloaded.items.iter().map(|i| i.text.as_str()).collect();
            assert_eq!(texts, vec!["a", "c", "e"]);
        }

        #[test]
        fn clear_all_persists_empty_array() {
            let (dir, tracker) = setup();
            tracker.apply_task(TaskIntent::Add("a".into())).unwrap();
            tracker.apply_task(TaskIntent::ClearAll).unwrap();

            let raw = fs::read_to_string(dir.path().join("tasks.json")).unwrap();
            assert_eq!(raw.trim(), "[]");
        }

        #[test]
        fn task_view_counts() {
            let (_dir, tracker) = setup();
            tracker.apply_task(TaskIntent::Add("write tests".into())).unwrap();
            tracker.apply_task(TaskIntent::Add("ship".into())).unwrap();
            tracker.apply_task(TaskIntent::Toggle(1)).unwrap();

            let view = tracker.task_view(Some("TEST")).unwrap();
            assert_eq!(view.items.len(), 1);
            assert_eq!(view.total, 2);
            assert_eq!(view.done, 1);
        }
    }

    mod progress_tests {
        use super::*;

        #[test]
        fn mark_done_persists() {
            let (dir, tracker) = setup();
            tracker.apply_progress(ProgressIntent::MarkDone(2)).unwrap();

            let raw = fs::read_to_string(dir.path().join("user_progress.json")).unwrap();
            let ids: Vec<i64> = serde_json::from_str(&raw).unwrap();
            assert_eq!(ids, vec![2]);
        }

        #[test]
        fn unchanged_does_not_write() {
            let (dir, tracker) = setup();
            let outcome = tracker.apply_progress(ProgressIntent::Undo(1)).unwrap();
            assert_eq!(outcome, ProgressOutcome::Unchanged(1));
            assert!(!dir.path().join("user_progress.json").exists());
        }

        #[test]
        fn stale_progress_is_retained_but_hidden() {
            let dir = TempDir::new().unwrap();
            fs::write(
                dir.path().join(PROBLEMS_FILE),
                r#"[{"id": 2, "title": "Only", "category": "Arrays"}]"#,
            )
            .unwrap();
            fs::write(dir.path().join("user_progress.json"), "[1, 2]").unwrap();
            let tracker = Tracker::open(Config::new(dir.path(), None));

            let view = tracker.problem_view(&Query::default()).unwrap();
            assert_eq!(view.rows.len(), 1);
            assert_eq!(view.rows[0].problem.id, 2);
            assert!(view.rows[0].completed);
            assert_eq!(view.stale_progress, 1);

            // A later mutation keeps the stale id.
            tracker.apply_progress(ProgressIntent::Undo(2)).unwrap();
            assert_eq!(
                tracker.progress().unwrap(),
                [1].into_iter().collect::<ProgressSet>()
            );
        }

        #[test]
        fn clear_progress() {
            let (_dir, tracker) = setup();
            tracker.apply_progress(ProgressIntent::MarkDone(1)).unwrap();
            tracker.apply_progress(ProgressIntent::MarkDone(3)).unwrap();
            let outcome = tracker
                .apply_progress(ProgressIntent::ClearProgress)
                .unwrap();
            assert_eq!(outcome, ProgressOutcome::Cleared(2));
            assert!(tracker.progress().unwrap().is_empty());
        }

        #[test]
        fn stats_reflect_progress() {
            let (_dir, tracker) = setup();
            tracker.apply_progress(ProgressIntent::MarkDone(2)).unwrap();
            tracker.apply_task(TaskIntent::Add("a".into())).unwrap();

            let stats = tracker.stats().unwrap();
            assert_eq!(stats.problems_total, 3);
            assert_eq!(stats.problems_completed, 1);
            assert_eq!(stats.medium_completed, 1);
            assert_eq!(stats.tasks_total, 1);
        }

        #[test]
        fn next_unsolved_skips_completed() {
            let (_dir, tracker) = setup();
            tracker.apply_progress(ProgressIntent::MarkDone(1)).unwrap();
            let mut rng = StdRng::seed_from_u64(3);

            let picked = tracker
                .next_unsolved(&Query::new(Some("Arrays"), None), &mut rng)
                .unwrap()
                .unwrap();
            assert_eq!(picked.id, 2);
        }
    }

    mod catalog_tests {
        use super::*;

        #[test]
        fn broken_catalog_degrades_to_empty_with_warning() {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join(PROBLEMS_FILE), "[{\"id\": 1,").unwrap();
            let tracker = Tracker::open(Config::new(dir.path(), None));

            let view = tracker.problem_view(&Query::default()).unwrap();
            assert!(view.rows.is_empty());
            assert_eq!(view.total, 0);
            assert!(view.warning.unwrap().contains("No problems available"));
        }

        #[test]
        fn source_without_brackets_is_format_issue() {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join(PROBLEMS_SOURCE_FILE), "nothing to see").unwrap();
            let tracker = Tracker::open(Config::new(dir.path(), None));

            let catalog = tracker.catalog();
            assert!(catalog.problems.is_empty());
            assert!(matches!(catalog.issue, Some(TrackerError::Format(_))));
        }

        #[test]
        fn relaxed_source_drives_progress() {
            let dir = TempDir::new().unwrap();
            fs::write(
                dir.path().join(PROBLEMS_SOURCE_FILE),
                "const problems = [{title: 'A', category: 'Arrays'}, {title: 'B', category: 'Graphs', difficulty: 'Hard'},];",
            )
            .unwrap();
            let tracker = Tracker::open(Config::new(dir.path(), None));

            tracker.apply_progress(ProgressIntent::MarkDone(2)).unwrap();
            let view = tracker
                .problem_view(&Query::new(Some("Graphs"), None))
                .unwrap();
            assert_eq!(view.shown, 1);
            assert!(view.rows[0].completed);
            assert!(view.warning.is_none());
        }

        #[test]
        fn progress_against_missing_catalog_is_not_found() {
            let dir = TempDir::new().unwrap();
            let tracker = Tracker::open(Config::new(dir.path(), None));
            let err = tracker
                .apply_progress(ProgressIntent::MarkDone(1))
                .unwrap_err();
            assert!(err.is_not_found());
        }
    }
}
