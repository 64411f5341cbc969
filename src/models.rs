use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A single to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    pub text: String,
    pub done: bool,
}

// On-disk shape of a to-do entry in tasks.json. The text lives under `task`,
// and `id` is absent in files written by older versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

impl From<&Item> for TaskRecord {
    fn from(item: &Item) -> Self {
        TaskRecord {
            task: item.text.clone(),
            done: item.done,
            id: Some(item.id),
        }
    }
}

/// The to-do collection. Ids are unique within the list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    pub items: Vec<Item>,
}

impl TaskList {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Rebuild a list from stored records, giving id-less records fresh ids
    /// in file order. Duplicate ids are reassigned as well.
    pub fn from_records(records: Vec<TaskRecord>) -> Self {
        let mut seen = BTreeSet::new();
        let mut pending = Vec::new();
        let mut slots: Vec<Option<Item>> = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            match record.id {
                Some(id) if seen.insert(id) => slots.push(Some(Item {
                    id,
                    text: record.task,
                    done: record.done,
                })),
                _ => {
                    pending.push((index, record));
                    slots.push(None);
                }
            }
        }

        let mut next = seen.iter().next_back().map_or(1, |max| max + 1);
        for (index, record) in pending {
            slots[index] = Some(Item {
                id: next,
                text: record.task,
                done: record.done,
            });
            next += 1;
        }

        Self::new(slots.into_iter().flatten().collect())
    }

    pub fn to_records(&self) -> Vec<TaskRecord> {
        self.items.iter().map(TaskRecord::from).collect()
    }

    pub fn next_id(&self) -> u64 {
        self.items.iter().map(|i| i.id).max().map_or(1, |max| max + 1)
    }

    #[cfg(test)]
    pub fn get(&self, id: u64) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn done_count(&self) -> usize {
        self.items.iter().filter(|i| i.done).count()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "e" => Some(Difficulty::Easy),
            "medium" | "m" => Some(Difficulty::Medium),
            "hard" | "h" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    // Missing or unrecognized difficulties count as Easy.
    pub fn from_str_or_default(s: Option<&str>) -> Self {
        s.and_then(Self::from_str).unwrap_or_default()
    }
}

/// A practice problem from the read-only catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemRecord {
    pub id: i64,
    pub title: String,
    pub link: String,
    pub category: String,
    pub difficulty: Difficulty,
}

/// Ids of completed problems. Serialized as a sorted JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressSet(BTreeSet<i64>);

impl ProgressSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    pub fn insert(&mut self, id: i64) -> bool {
        self.0.insert(id)
    }

    pub fn remove(&mut self, id: i64) -> bool {
        self.0.remove(&id)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<i64> for ProgressSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A catalog problem together with its completion state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProblemRow {
    #[serde(flatten)]
    pub problem: ProblemRecord,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskView {
    pub items: Vec<Item>,
    pub search: Option<String>,
    pub total: usize,
    pub done: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProblemView {
    pub rows: Vec<ProblemRow>,
    /// Filter choices, starting with "All".
    pub categories: Vec<String>,
    pub selected_category: String,
    pub search: Option<String>,
    pub shown: usize,
    pub completed: usize,
    pub total: usize,
    /// Completed ids that no longer exist in the catalog.
    pub stale_progress: usize,
    /// Set when the catalog could not be read and the view fell back to empty.
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub tasks_total: usize,
    pub tasks_done: usize,
    pub problems_total: usize,
    pub problems_completed: usize,
    pub easy_completed: usize,
    pub medium_completed: usize,
    pub hard_completed: usize,
}

impl Stats {
    pub fn completion_rate(&self) -> f64 {
        if self.problems_total == 0 {
            0.0
        } else {
            (self.problems_completed as f64 / self.problems_total as f64) * 100.0
        }
    }
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
