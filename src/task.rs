/// A single task list entry. Soft-deleted entries keep their place in the
/// collection until the trash is emptied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: u64,
    pub value: String,
    pub checked: bool,
    pub removed: bool,
}

/// Which subset of tasks is visible. UI state only, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Checked,
    Unchecked,
    Removed,
}

impl Filter {
    pub const ALL: [Filter; 4] = [
        Filter::All,
        Filter::Checked,
        Filter::Unchecked,
        Filter::Removed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Checked => "Checked",
            Filter::Unchecked => "Unchecked",
            Filter::Removed => "Trash",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Filter::All => 0,
            Filter::Checked => 1,
            Filter::Unchecked => 2,
            Filter::Removed => 3,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Visibility predicate for this filter. Removed tasks only show up in
    /// the trash view; everything else excludes them.
    pub fn admits(self, task: &Task) -> bool {
        match self {
            Filter::All => !task.removed,
            Filter::Checked => task.checked && !task.removed,
            Filter::Unchecked => !task.checked && !task.removed,
            Filter::Removed => task.removed,
        }
    }
}
