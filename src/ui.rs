use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs},
    Frame, Terminal,
};
use std::io;

use crate::editor::{Action, TaskListEditor};
use crate::task::Filter;

/// Where keystrokes go: the list, the draft input, or an in-row edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum InputMode {
    #[default]
    Normal,
    Draft,
    Edit(u64),
}

pub struct App {
    editor: TaskListEditor,
    input: InputMode,
    selected: usize,
    list_state: ListState,
    should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            editor: TaskListEditor::new(),
            input: InputMode::Normal,
            selected: 0,
            list_state: ListState::default(),
            should_quit: false,
        }
    }

    fn selected_task_id(&self) -> Option<u64> {
        self.editor.visible_tasks().get(self.selected).map(|t| t.id)
    }

    /// Keep the selection on a real row after the visible set changes.
    fn clamp_selection(&mut self) {
        let len = self.editor.visible_tasks().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.input {
            InputMode::Normal => self.handle_normal_key(key.code),
            InputMode::Draft => self.handle_draft_key(key.code),
            InputMode::Edit(id) => self.handle_edit_key(id, key.code),
        }
        self.clamp_selection();
    }

    fn handle_normal_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => {
                self.editor.apply(Action::SetFilter(self.editor.filter.next()));
            }
            KeyCode::BackTab => {
                self.editor.apply(Action::SetFilter(self.editor.filter.prev()));
            }
            KeyCode::Char(c @ '1'..='4') => {
                let filter = Filter::ALL[c as usize - '1' as usize];
                self.editor.apply(Action::SetFilter(filter));
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                let len = self.editor.visible_tasks().len();
                if self.selected + 1 < len {
                    self.selected += 1;
                }
            }
            KeyCode::Char(' ') => {
                // Soft-deleted rows cannot be checked.
                if let Some(task) = self.editor.visible_tasks().get(self.selected).copied() {
                    if !task.removed {
                        let id = task.id;
                        self.editor.apply(Action::ToggleChecked(id));
                    }
                }
            }
            KeyCode::Char('d') => {
                // Remove stays available on checked rows even though edit
                // does not, matching the form this mirrors.
                if let Some(id) = self.selected_task_id() {
                    self.editor.apply(Action::ToggleRemoved(id));
                }
            }
            KeyCode::Char('e') => {
                if let Some(task) = self.editor.visible_tasks().get(self.selected).copied() {
                    if !task.checked && !task.removed {
                        self.input = InputMode::Edit(task.id);
                    }
                }
            }
            KeyCode::Char('a') => {
                // The add form is hidden in the trash view and disabled in
                // the checked view.
                if !matches!(self.editor.filter, Filter::Checked | Filter::Removed) {
                    self.input = InputMode::Draft;
                }
            }
            KeyCode::Char('x') => {
                if self.editor.filter == Filter::Removed && self.editor.trash_count() > 0 {
                    self.editor.apply(Action::EmptyTrash);
                }
            }
            _ => {}
        }
    }

    fn handle_draft_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.input = InputMode::Normal,
            KeyCode::Enter => self.editor.apply(Action::SubmitDraft),
            KeyCode::Backspace => {
                let mut draft = self.editor.draft.clone();
                draft.pop();
                self.editor.apply(Action::SetDraft(draft));
            }
            KeyCode::Char(c) => {
                let mut draft = self.editor.draft.clone();
                draft.push(c);
                self.editor.apply(Action::SetDraft(draft));
            }
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, id: u64, code: KeyCode) {
        let Some(value) = self
            .editor
            .tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.value.clone())
        else {
            self.input = InputMode::Normal;
            return;
        };
        match code {
            KeyCode::Esc | KeyCode::Enter => self.input = InputMode::Normal,
            KeyCode::Backspace => {
                let mut value = value;
                value.pop();
                self.editor.apply(Action::EditTask { id, value });
            }
            KeyCode::Char(c) => {
                let mut value = value;
                value.push(c);
                self.editor.apply(Action::EditTask { id, value });
            }
            _ => {}
        }
    }

    fn draw(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.draw_filter_bar(f, chunks[0]);
        if self.editor.filter == Filter::Removed {
            self.draw_trash_bar(f, chunks[1]);
        } else {
            self.draw_draft_input(f, chunks[1]);
        }
        self.draw_task_list(f, chunks[2]);
        self.draw_help_line(f, chunks[3]);
    }

    fn draw_filter_bar(&self, f: &mut Frame, area: Rect) {
        let tabs = Tabs::new(Filter::ALL.map(Filter::label))
            .select(self.editor.filter.index())
            .block(Block::default().title("Filter").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        f.render_widget(tabs, area);
    }

    fn draw_draft_input(&self, f: &mut Frame, area: Rect) {
        let focused = self.input == InputMode::Draft;
        let disabled = self.editor.filter == Filter::Checked;
        let body = if disabled {
            Line::styled("(adding is off in this view)", Style::default().fg(Color::DarkGray))
        } else {
            Line::raw(self.editor.draft.as_str())
        };
        let input = Paragraph::new(body).block(
            Block::default()
                .title("New task")
                .borders(Borders::ALL)
                .border_style(if focused {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                }),
        );
        f.render_widget(input, area);
        if focused && !disabled {
            let x = area.x + 1 + self.editor.draft.chars().count() as u16;
            let x = x.min(area.x + area.width.saturating_sub(2));
            f.set_cursor_position(Position::new(x, area.y + 1));
        }
    }

    fn draw_trash_bar(&self, f: &mut Frame, area: Rect) {
        let count = self.editor.trash_count();
        let body = if count == 0 {
            Line::styled("trash is empty", Style::default().fg(Color::DarkGray))
        } else {
            Line::from(vec![
                Span::styled("x", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
                Span::raw(format!(": empty trash ({} task(s))", count)),
            ])
        };
        let bar = Paragraph::new(body)
            .block(Block::default().title("Trash").borders(Borders::ALL));
        f.render_widget(bar, area);
    }

    fn draw_task_list(&mut self, f: &mut Frame, area: Rect) {
        let editing = match self.input {
            InputMode::Edit(id) => Some(id),
            _ => None,
        };
        let visible = self.editor.visible_tasks();
        let items: Vec<ListItem> = visible
            .iter()
            .map(|t| {
                let marker = if t.checked { "[x] " } else { "[ ] " };
                let mut value_style = Style::default().fg(Color::White);
                if t.checked {
                    value_style = value_style.add_modifier(Modifier::CROSSED_OUT);
                }
                if t.removed {
                    value_style = Style::default().fg(Color::DarkGray);
                }
                let mut spans = vec![Span::raw(marker), Span::styled(&t.value, value_style)];
                if editing == Some(t.id) {
                    spans.push(Span::styled("_", Style::default().fg(Color::Cyan)));
                }
                if t.removed {
                    spans.push(Span::styled(" (trash)", Style::default().fg(Color::DarkGray)));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        self.list_state.select(if visible.is_empty() {
            None
        } else {
            Some(self.selected)
        });

        let list = List::new(items)
            .block(
                Block::default()
                    .title("Tasks")
                    .borders(Borders::ALL)
                    .border_style(if editing.is_some() {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default()
                    }),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD))
            .highlight_symbol(">> ");

        f.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn draw_help_line(&self, f: &mut Frame, area: Rect) {
        let help = match self.input {
            InputMode::Normal if self.editor.filter == Filter::Removed => {
                "q quit | tab filter | up/down select | d restore | x empty trash"
            }
            InputMode::Normal => {
                "q quit | tab filter | up/down select | a add | space check | e edit | d remove"
            }
            InputMode::Draft => "enter add | esc back",
            InputMode::Edit(_) => "enter/esc done",
        };
        f.render_widget(
            Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
            area,
        );
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.draw(f))?;
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key);
            }
        }
        if app.should_quit {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn app_with_tasks(values: &[&str]) -> App {
        let mut app = App::new();
        for value in values {
            app.handle_key(key(KeyCode::Char('a')));
            type_str(&mut app, value);
            app.handle_key(key(KeyCode::Enter));
            app.handle_key(key(KeyCode::Esc));
        }
        app
    }

    #[test]
    fn typing_in_draft_mode_builds_and_submits_a_task() {
        let mut app = App::new();
        app.handle_key(key(KeyCode::Char('a')));
        type_str(&mut app, "buy milk");
        assert_eq!(app.editor.draft, "buy milk");

        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.editor.draft, "buy mil");

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.editor.tasks.len(), 1);
        assert_eq!(app.editor.tasks[0].value, "buy mil");
        // The input keeps focus for the next entry.
        assert_eq!(app.input, InputMode::Draft);
        assert!(app.editor.draft.is_empty());
    }

    #[test]
    fn enter_on_empty_draft_adds_nothing() {
        let mut app = App::new();
        app.handle_key(key(KeyCode::Char('a')));
        app.handle_key(key(KeyCode::Enter));
        assert!(app.editor.tasks.is_empty());
    }

    #[test]
    fn add_is_unavailable_in_checked_and_trash_views() {
        let mut app = App::new();
        app.handle_key(key(KeyCode::Char('2')));
        app.handle_key(key(KeyCode::Char('a')));
        assert_eq!(app.input, InputMode::Normal);

        app.handle_key(key(KeyCode::Char('4')));
        app.handle_key(key(KeyCode::Char('a')));
        assert_eq!(app.input, InputMode::Normal);

        app.handle_key(key(KeyCode::Char('3')));
        app.handle_key(key(KeyCode::Char('a')));
        assert_eq!(app.input, InputMode::Draft);
    }

    #[test]
    fn tab_and_digits_change_the_filter() {
        let mut app = App::new();
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.editor.filter, Filter::Checked);
        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.editor.filter, Filter::All);
        app.handle_key(key(KeyCode::Char('4')));
        assert_eq!(app.editor.filter, Filter::Removed);
    }

    #[test]
    fn space_checks_the_selected_row() {
        let mut app = app_with_tasks(&["a", "b"]);
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Char(' ')));
        assert!(!app.editor.tasks[0].checked);
        assert!(app.editor.tasks[1].checked);
    }

    #[test]
    fn removed_rows_cannot_be_checked() {
        let mut app = app_with_tasks(&["a"]);
        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Char('4')));
        app.handle_key(key(KeyCode::Char(' ')));
        assert!(!app.editor.tasks[0].checked);
        assert!(app.editor.tasks[0].removed);
    }

    #[test]
    fn checked_rows_cannot_be_edited_but_can_be_removed() {
        let mut app = app_with_tasks(&["a"]);
        app.handle_key(key(KeyCode::Char(' ')));

        app.handle_key(key(KeyCode::Char('e')));
        assert_eq!(app.input, InputMode::Normal);

        app.handle_key(key(KeyCode::Char('d')));
        assert!(app.editor.tasks[0].removed);
    }

    #[test]
    fn edit_mode_rewrites_the_selected_task() {
        let mut app = app_with_tasks(&["abc"]);
        let id = app.editor.tasks[0].id;
        app.handle_key(key(KeyCode::Char('e')));
        assert_eq!(app.input, InputMode::Edit(id));

        app.handle_key(key(KeyCode::Backspace));
        type_str(&mut app, "de");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.input, InputMode::Normal);
        assert_eq!(app.editor.tasks[0].value, "abde");
    }

    #[test]
    fn empty_trash_only_works_in_trash_view() {
        let mut app = app_with_tasks(&["a", "b"]);
        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Char('x')));
        assert_eq!(app.editor.tasks.len(), 2);

        app.handle_key(key(KeyCode::Char('4')));
        app.handle_key(key(KeyCode::Char('x')));
        assert_eq!(app.editor.tasks.len(), 1);
        assert_eq!(app.editor.trash_count(), 0);
    }

    #[test]
    fn selection_clamps_when_the_visible_set_shrinks() {
        let mut app = app_with_tasks(&["a", "b", "c"]);
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected, 2);
        app.handle_key(key(KeyCode::Char('d')));
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn restore_from_trash_view() {
        let mut app = app_with_tasks(&["a"]);
        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Char('4')));
        app.handle_key(key(KeyCode::Char('d')));
        assert!(!app.editor.tasks[0].removed);
    }

    #[test]
    fn draw_succeeds_for_each_filter_and_mode() {
        let mut terminal = Terminal::new(TestBackend::new(60, 16)).expect("test terminal");
        let mut app = app_with_tasks(&["one", "two"]);
        app.handle_key(key(KeyCode::Char('d')));

        for digit in ['1', '2', '3', '4'] {
            app.handle_key(key(KeyCode::Char(digit)));
            terminal.draw(|f| app.draw(f)).expect("draw");
        }

        app.handle_key(key(KeyCode::Char('1')));
        app.handle_key(key(KeyCode::Char('a')));
        terminal.draw(|f| app.draw(f)).expect("draw draft mode");
        app.handle_key(key(KeyCode::Esc));
        app.handle_key(key(KeyCode::Char('e')));
        terminal.draw(|f| app.draw(f)).expect("draw edit mode");
    }
}
