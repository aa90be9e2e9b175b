use ratatui::widgets::TableState;

use crate::clock::SystemClock;
use crate::commands::{cmd_fieldwork_remove, cmd_permit_remove, cmd_task_remove, cmd_task_set_status, permits_by_expiry};
use crate::models::{Fieldwork, Permit, Task, TaskStatus};
use crate::priority::{focus, sort_by_urgency};
use crate::storage::Store;

/// Open tasks shown in focus mode.
pub const FOCUS_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Tasks,
    Permits,
    Fieldwork,
}

impl ViewMode {
    fn next(self) -> Self {
        match self {
            Self::Tasks => Self::Permits,
            Self::Permits => Self::Fieldwork,
            Self::Fieldwork => Self::Tasks,
        }
    }
}

pub struct App {
    pub store: Store,
    pub clock: SystemClock,
    pub tasks: Vec<Task>,
    pub permits: Vec<Permit>,
    pub fieldwork: Vec<Fieldwork>,
    pub task_state: TableState,
    pub permit_state: TableState,
    pub fieldwork_state: TableState,
    pub view_mode: ViewMode,
    pub show_completed: bool,
    pub focus_mode: bool,
    /// Last error from a store operation, shown in the help bar.
    pub message: Option<String>,
}

impl App {
    /// Creates a new App instance and loads initial data.
    pub fn new(store: Store) -> App {
        let mut app = App {
            store,
            clock: SystemClock,
            tasks: Vec::new(),
            permits: Vec::new(),
            fieldwork: Vec::new(),
            task_state: TableState::default(),
            permit_state: TableState::default(),
            fieldwork_state: TableState::default(),
            view_mode: ViewMode::Tasks,
            show_completed: false,
            focus_mode: false,
            message: None,
        };
        app.reload();
        app
    }

    fn current(&mut self) -> (&mut TableState, usize) {
        match self.view_mode {
            ViewMode::Tasks => (&mut self.task_state, self.tasks.len()),
            ViewMode::Permits => (&mut self.permit_state, self.permits.len()),
            ViewMode::Fieldwork => (&mut self.fieldwork_state, self.fieldwork.len()),
        }
    }

    /// Selects the next row, wrapping at the end.
    pub fn next(&mut self) {
        let (state, len) = self.current();
        if len == 0 { return; }
        let i = match state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        state.select(Some(i));
    }

    /// Selects the previous row, wrapping at the start.
    pub fn previous(&mut self) {
        let (state, len) = self.current();
        if len == 0 { return; }
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
    }

    fn selected_task_id(&self) -> Option<u64> {
        self.task_state
            .selected()
            .and_then(|i| self.tasks.get(i))
            .map(|t| t.id)
    }

    fn report(&mut self, res: anyhow::Result<()>) {
        if let Err(e) = res {
            tracing::warn!(error = %e, "dashboard action failed");
            self.message = Some(e.to_string());
        }
    }

    /// Sets the status of the selected task.
    pub fn set_selected_status(&mut self, status: TaskStatus) {
        if self.view_mode != ViewMode::Tasks { return; }
        if let Some(id) = self.selected_task_id() {
            let res = cmd_task_set_status(&self.store, id, status, true);
            self.report(res);
            self.reload();
        }
    }

    /// Deletes the selected record in the current view.
    pub fn delete_selected(&mut self) {
        let res = match self.view_mode {
            ViewMode::Tasks => match self.selected_task_id() {
                Some(id) => cmd_task_remove(&self.store, id, true),
                None => return,
            },
            ViewMode::Permits => match self.permit_state.selected().and_then(|i| self.permits.get(i)) {
                Some(p) => cmd_permit_remove(&self.store, p.id, true),
                None => return,
            },
            ViewMode::Fieldwork => match self.fieldwork_state.selected().and_then(|i| self.fieldwork.get(i)) {
                Some(f) => cmd_fieldwork_remove(&self.store, f.id, true),
                None => return,
            },
        };
        self.report(res);
        self.reload();
    }

    /// Reloads everything from storage and re-sorts it.
    pub fn reload(&mut self) {
        if let Err(e) = self.load() {
            tracing::warn!(error = %e, "dashboard reload failed");
            self.message = Some(e.to_string());
        }
        let lens = [self.tasks.len(), self.permits.len(), self.fieldwork.len()];
        let states = [&mut self.task_state, &mut self.permit_state, &mut self.fieldwork_state];
        for (state, len) in states.into_iter().zip(lens) {
            clamp_selection(state, len);
        }
    }

    fn load(&mut self) -> crate::Result<()> {
        let mut tasks = self.store.load_tasks()?;
        self.tasks = if self.focus_mode {
            focus(&tasks, FOCUS_LIMIT, &self.clock).into_iter().cloned().collect()
        } else {
            if !self.show_completed {
                tasks.retain(|t| t.status != TaskStatus::Done);
            }
            sort_by_urgency(&mut tasks, &self.clock);
            tasks
        };
        self.permits = permits_by_expiry(self.store.load_permits()?);
        let mut trips = self.store.load_fieldwork()?;
        trips.sort_by_key(|f| (f.start_date.is_none(), f.start_date));
        self.fieldwork = trips;
        Ok(())
    }

    /// Toggles the visibility of done tasks.
    pub fn toggle_completed(&mut self) {
        self.show_completed = !self.show_completed;
        self.reload();
    }

    /// Toggles showing only the most urgent open tasks.
    pub fn toggle_focus(&mut self) {
        self.focus_mode = !self.focus_mode;
        self.reload();
    }

    /// Cycles Tasks -> Permits -> Fieldwork.
    pub fn toggle_view(&mut self) {
        self.view_mode = self.view_mode.next();
    }
}

fn clamp_selection(state: &mut TableState, len: usize) {
    match state.selected() {
        _ if len == 0 => state.select(None),
        Some(i) if i >= len => state.select(Some(len - 1)),
        None => state.select(Some(0)),
        _ => {}
    }
}
