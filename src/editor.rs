use crate::task::{Filter, Task};

/// One variant per state transition. The UI translates key events into
/// actions and dispatches them through [`TaskListEditor::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetDraft(String),
    SubmitDraft,
    EditTask { id: u64, value: String },
    ToggleChecked(u64),
    ToggleRemoved(u64),
    EmptyTrash,
    SetFilter(Filter),
}

/// All task list state: the draft input, the tasks themselves (newest
/// first), and the active filter. Every transition goes through `apply`;
/// unknown ids and empty submits are silent no-ops.
#[derive(Debug)]
pub struct TaskListEditor {
    pub draft: String,
    pub tasks: Vec<Task>,
    pub filter: Filter,
    next_id: u64,
}

impl TaskListEditor {
    pub fn new() -> Self {
        Self {
            draft: String::new(),
            tasks: Vec::new(),
            filter: Filter::All,
            next_id: 1,
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::SetDraft(text) => self.draft = text,
            Action::SubmitDraft => self.submit_draft(),
            Action::EditTask { id, value } => self.edit_task(id, value),
            Action::ToggleChecked(id) => self.toggle_checked(id),
            Action::ToggleRemoved(id) => self.toggle_removed(id),
            Action::EmptyTrash => self.empty_trash(),
            Action::SetFilter(filter) => self.filter = filter,
        }
    }

    fn submit_draft(&mut self) {
        if self.draft.is_empty() {
            return;
        }
        let task = Task {
            id: self.next_id,
            value: std::mem::take(&mut self.draft),
            checked: false,
            removed: false,
        };
        self.next_id += 1;
        self.tasks.insert(0, task);
    }

    fn edit_task(&mut self, id: u64, value: String) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.value = value;
        }
    }

    fn toggle_checked(&mut self, id: u64) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.checked = !task.checked;
        }
    }

    fn toggle_removed(&mut self, id: u64) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.removed = !task.removed;
        }
    }

    fn empty_trash(&mut self) {
        self.tasks.retain(|t| !t.removed);
    }

    /// Projection of the collection under the active filter, in collection
    /// order. Derived on every call, never stored.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| self.filter.admits(t))
            .collect()
    }

    pub fn trash_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.removed).count()
    }
}

impl Default for TaskListEditor {
    fn default() -> Self {
        Self::new()
    }
}
