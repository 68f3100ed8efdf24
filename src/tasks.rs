use crate::models::Task;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filter {
  All,
  Active,
  Completed,
}

impl Filter {
  pub fn parse(value: &str) -> Option<Filter> {
    match value {
      "all" => Some(Filter::All),
      "active" => Some(Filter::Active),
      "completed" | "done" => Some(Filter::Completed),
      _ => None,
    }
  }
}

// The in-memory list is the single source of truth for rendering; every
// mutation reconciles it either from the server body or optimistically
// when the server answered with no content.
#[derive(Default)]
pub struct TaskList {
  tasks: Vec<Task>,
  toggling: Option<i64>,
  deleting: Option<i64>,
  saving: Option<i64>,
}

impl TaskList {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn replace_all(&mut self, tasks: Vec<Task>) {
    self.tasks = tasks;
  }

  pub fn push(&mut self, task: Task) {
    self.tasks.push(task);
  }

  pub fn find(&self, id: i64) -> Option<&Task> {
    self.tasks.iter().find(|t| t.id == id)
  }

  pub fn remove(&mut self, id: i64) {
    self.tasks.retain(|t| t.id != id);
  }

  // A 204 toggle flips the flag locally; a body replaces the entry.
  pub fn apply_toggle(&mut self, id: i64, server: Option<Task>) {
    for task in &mut self.tasks {
      if task.id == id {
        match &server {
          Some(updated) => *task = updated.clone(),
          None => task.completed = !task.completed,
        }
        return;
      }
    }
  }

  // An update with no body keeps the locally edited fields.
  pub fn apply_update(
    &mut self,
    id: i64,
    server: Option<Task>,
    title: &str,
    description: Option<&str>,
  ) {
    for task in &mut self.tasks {
      if task.id == id {
        match &server {
          Some(updated) => *task = updated.clone(),
          None => {
            task.title = title.to_string();
            task.description = description.map(|d| d.to_string());
          }
        }
        return;
      }
    }
  }

  pub fn counts(&self) -> (usize, usize, usize) {
    let total = self.tasks.len();
    let completed = self.tasks.iter().filter(|t| t.completed).count();
    (total, total - completed, completed)
  }

  pub fn filtered(&self, filter: Filter) -> Vec<&Task> {
    self
      .tasks
      .iter()
      .filter(|t| match filter {
        Filter::All => true,
        Filter::Active => !t.completed,
        Filter::Completed => t.completed,
      })
      .collect()
  }

  pub fn search(&self, term: &str) -> Vec<&Task> {
    let needle = term.to_lowercase();
    self
      .tasks
      .iter()
      .filter(|t| {
        t.title.to_lowercase().contains(&needle)
          || t
            .description
            .as_deref()
            .map(|d| d.to_lowercase().contains(&needle))
            .unwrap_or(false)
      })
      .collect()
  }

  // Advisory per-item latches; an operation on a different id while one is
  // outstanding is allowed.
  pub fn begin_toggle(&mut self, id: i64) -> bool {
    if self.toggling == Some(id) {
      return false;
    }
    self.toggling = Some(id);
    true
  }

  pub fn end_toggle(&mut self) {
    self.toggling = None;
  }

  pub fn begin_delete(&mut self, id: i64) -> bool {
    if self.deleting == Some(id) {
      return false;
    }
    self.deleting = Some(id);
    true
  }

  pub fn end_delete(&mut self) {
    self.deleting = None;
  }

  pub fn begin_save(&mut self, id: i64) -> bool {
    if self.saving == Some(id) {
      return false;
    }
    self.saving = Some(id);
    true
  }

  pub fn end_save(&mut self) {
    self.saving = None;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn task(id: i64, title: &str, completed: bool) -> Task {
    Task {
      id,
      title: title.to_string(),
      description: None,
      completed,
      user_id: 1,
      created_at: String::new(),
      updated_at: String::new(),
    }
  }

  #[test]
  fn empty_list_counts_zero() {
    let list = TaskList::new();
    assert_eq!(list.counts(), (0, 0, 0));
  }

  #[test]
  fn counts_split_active_and_completed() {
    let mut list = TaskList::new();
    list.replace_all(vec![task(1, "a", false), task(2, "b", true), task(3, "c", true)]);
    assert_eq!(list.counts(), (3, 1, 2));
  }

  #[test]
  fn string_id_from_wire_is_found_numerically() {
    let wire: Vec<Task> = serde_json::from_str(
      r#"[{"id": "3", "title": "buy milk", "completed": false, "user_id": 1}]"#,
    )
    .expect("wire list should parse");
    let mut list = TaskList::new();
    list.replace_all(wire);
    assert!(list.find(3).is_some());
  }

  #[test]
  fn toggle_without_body_flips_completed() {
    let mut list = TaskList::new();
    list.replace_all(vec![task(5, "a", false)]);
    list.apply_toggle(5, None);
    assert!(list.find(5).expect("task should exist").completed);
    list.apply_toggle(5, None);
    assert!(!list.find(5).expect("task should exist").completed);
  }

  #[test]
  fn toggle_with_body_replaces_entry() {
    let mut list = TaskList::new();
    list.replace_all(vec![task(5, "a", false)]);
    list.apply_toggle(5, Some(task(5, "a (done)", true)));
    let found = list.find(5).expect("task should exist");
    assert!(found.completed);
    assert_eq!(found.title, "a (done)");
  }

  #[test]
  fn update_without_body_keeps_local_edits() {
    let mut list = TaskList::new();
    list.replace_all(vec![task(2, "old", false)]);
    list.apply_update(2, None, "new title", Some("notes"));
    let found = list.find(2).expect("task should exist");
    assert_eq!(found.title, "new title");
    assert_eq!(found.description.as_deref(), Some("notes"));
  }

  #[test]
  fn remove_drops_only_the_matching_task() {
    let mut list = TaskList::new();
    list.replace_all(vec![task(1, "a", false), task(2, "b", false)]);
    list.remove(1);
    assert!(list.find(1).is_none());
    assert!(list.find(2).is_some());
  }

  #[test]
  fn filters_partition_the_list() {
    let mut list = TaskList::new();
    list.replace_all(vec![task(1, "a", false), task(2, "b", true)]);
    assert_eq!(list.filtered(Filter::All).len(), 2);
    assert_eq!(list.filtered(Filter::Active).len(), 1);
    assert_eq!(list.filtered(Filter::Completed).len(), 1);
  }

  #[test]
  fn search_matches_title_and_description_case_insensitive() {
    let mut list = TaskList::new();
    let mut with_desc = task(1, "Buy milk", false);
    with_desc.description = Some("From the corner shop".to_string());
    list.replace_all(vec![with_desc, task(2, "Walk dog", false)]);
    assert_eq!(list.search("MILK").len(), 1);
    assert_eq!(list.search("corner").len(), 1);
    assert_eq!(list.search("cat").len(), 0);
  }

  #[test]
  fn same_item_latch_refuses_reentry_but_other_items_proceed() {
    let mut list = TaskList::new();
    assert!(list.begin_delete(1));
    assert!(!list.begin_delete(1));
    assert!(list.begin_toggle(2));
    list.end_delete();
    assert!(list.begin_delete(1));
  }
}
