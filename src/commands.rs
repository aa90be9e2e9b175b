use anyhow::{bail, Context, Result};
use chrono::Local;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::clock::Clock;
use crate::dates::parse_optional_day;
use crate::duration::inclusive_day_count;
use crate::error::Error;
use crate::models::{Fieldwork, FieldworkStatus, Permit, Task, TaskStatus};
use crate::priority::{focus, sort_by_urgency, Priority};
use crate::storage::{next_id, Store};
use crate::urgency::Urgency;

/// Field changes for [`cmd_task_edit`]. `None` leaves a field alone.
#[derive(Debug, Default, Clone)]
pub struct TaskEdit {
    pub name: Option<String>,
    pub priority: Option<Priority>,
    pub due: Option<String>,
    pub clear_due: bool,
    pub project: Option<String>,
    pub category: Option<String>,
}

/// Human-readable distance to a due day.
pub fn time_left(days: Option<i64>) -> String {
    match days {
        None => "-".to_string(),
        Some(d) if d < 0 => format!("{}d overdue", d.abs()),
        Some(0) => "Today".to_string(),
        Some(d) => format!("{}d", d),
    }
}

fn urgency_color(urgency: Option<Urgency>) -> Color {
    match urgency {
        Some(Urgency::Expired) | Some(Urgency::Critical) => Color::Red,
        Some(Urgency::Warning) => Color::Yellow,
        Some(Urgency::Ok) => Color::Green,
        None => Color::Grey,
    }
}

fn header(cells: &[&str]) -> Vec<Cell> {
    cells
        .iter()
        .map(|c| Cell::new(c).add_attribute(Attribute::Bold))
        .collect()
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Adds a new task and returns its id.
///
/// # Errors
/// Fails on an unparseable due date or if the task file cannot be written.
pub fn cmd_task_add(
    store: &Store,
    name: String,
    priority: Priority,
    due: Option<&str>,
    project: Option<String>,
    category: Option<String>,
    silent: bool,
) -> Result<u64> {
    let due = parse_optional_day(due)?;
    let mut tasks = store.load_tasks()?;
    let id = next_id(tasks.iter().map(|t| t.id));
    tasks.push(Task {
        id,
        name,
        project,
        category,
        priority,
        due,
        status: TaskStatus::Todo,
        created_at: Local::now().to_rfc3339(),
        completed_at: None,
    });
    store.save_tasks(&tasks)?;
    tracing::info!(id, %priority, ?due, "task added");
    if !silent {
        println!("Task added (id = {})", id);
    }
    Ok(id)
}

/// Moves a task to `status`, stamping or clearing `completed_at`.
///
/// # Errors
/// Fails if the task does not exist or the file cannot be written.
pub fn cmd_task_set_status(store: &Store, id: u64, status: TaskStatus, silent: bool) -> Result<()> {
    let mut tasks = store.load_tasks()?;
    let task = tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or(Error::NotFound { kind: "task", id })?;
    task.completed_at = match status {
        TaskStatus::Done => task
            .completed_at
            .take()
            .or_else(|| Some(Local::now().to_rfc3339())),
        _ => None,
    };
    task.status = status;
    store.save_tasks(&tasks)?;
    tracing::info!(id, %status, "task status changed");
    if !silent {
        println!("Task {} marked {}.", id, status);
    }
    Ok(())
}

/// Removes a task from the database by ID.
///
/// # Errors
/// Fails if the task does not exist or the file cannot be written.
pub fn cmd_task_remove(store: &Store, id: u64, silent: bool) -> Result<()> {
    let mut tasks = store.load_tasks()?;
    let len_before = tasks.len();
    tasks.retain(|t| t.id != id);
    if tasks.len() == len_before {
        return Err(Error::NotFound { kind: "task", id }.into());
    }
    store.save_tasks(&tasks)?;
    tracing::info!(id, "task removed");
    if !silent {
        println!("Task {} removed.", id);
    }
    Ok(())
}

/// Edits an existing task's details.
///
/// # Errors
/// Fails on an unparseable due date, a missing task, or a write failure.
/// Nothing is saved if the new due date is invalid.
pub fn cmd_task_edit(store: &Store, id: u64, edit: TaskEdit, silent: bool) -> Result<()> {
    let new_due = parse_optional_day(edit.due.as_deref())?;
    let mut tasks = store.load_tasks()?;
    let task = tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or(Error::NotFound { kind: "task", id })?;
    if let Some(n) = edit.name { task.name = n; }
    if let Some(p) = edit.priority { task.priority = p; }
    if let Some(p) = edit.project { task.project = Some(p); }
    if let Some(c) = edit.category { task.category = Some(c); }
    if edit.clear_due {
        task.due = None;
    } else if new_due.is_some() {
        task.due = new_due;
    }
    store.save_tasks(&tasks)?;
    tracing::info!(id, "task updated");
    if !silent {
        println!("Task {} updated.", id);
    }
    Ok(())
}

/// Lists tasks in a formatted table, most urgent first.
///
/// Hides done tasks unless `all` is set. With `focus_limit`, shows only that
/// many open tasks.
pub fn cmd_task_list(store: &Store, clock: &impl Clock, all: bool, focus_limit: Option<usize>) -> Result<()> {
    let mut tasks = store.load_tasks()?;
    let tasks: Vec<Task> = match focus_limit {
        Some(limit) => focus(&tasks, limit, clock).into_iter().cloned().collect(),
        None => {
            if !all {
                tasks.retain(|t| t.status != TaskStatus::Done);
            }
            sort_by_urgency(&mut tasks, clock);
            tasks
        }
    };
    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    let mut table = new_table();
    table.set_header(header(&["ID", "Name", "Project", "Pri", "Due", "Time Left", "Status"]));

    for t in tasks {
        let days_left = t.days_left(clock);
        let done = t.status == TaskStatus::Done;
        let due_color = match days_left {
            _ if done => Color::Grey,
            Some(d) if d < 0 => Color::Red,
            Some(0) => Color::Yellow,
            _ => Color::Reset,
        };
        let priority_color = match t.priority {
            Priority::P1 => Color::Red,
            Priority::P2 => Color::Yellow,
            _ => Color::Reset,
        };
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.name),
            Cell::new(t.project.clone().unwrap_or_default()),
            Cell::new(t.priority).fg(priority_color),
            Cell::new(t.due.map(|d| d.to_string()).unwrap_or_else(|| "-".into())),
            Cell::new(time_left(days_left)).fg(due_color),
            Cell::new(t.status).fg(if done { Color::Green } else { Color::Yellow }),
        ]);
    }

    println!("{table}");
    Ok(())
}

/// Adds a permit and returns its id.
///
/// # Errors
/// Fails on an unparseable expiry date or a write failure.
pub fn cmd_permit_add(
    store: &Store,
    title: String,
    kind: Option<String>,
    permit_number: Option<String>,
    project: Option<String>,
    expires: Option<&str>,
    reminder_days: Option<i64>,
    silent: bool,
) -> Result<u64> {
    if let Some(days) = reminder_days {
        if days < 0 {
            bail!("reminder window must not be negative (got {days})");
        }
    }
    let expiration_date = parse_optional_day(expires)?;
    let mut permits = store.load_permits()?;
    let id = next_id(permits.iter().map(|p| p.id));
    permits.push(Permit {
        id,
        title,
        kind,
        permit_number,
        project,
        expiration_date,
        renewal_reminder_days: reminder_days,
        notes: None,
    });
    store.save_permits(&permits)?;
    tracing::info!(id, ?expiration_date, "permit added");
    if !silent {
        println!("Permit added (id = {})", id);
    }
    Ok(id)
}

/// Permits ordered by days until expiry; undated ones last.
pub fn permits_by_expiry(mut permits: Vec<Permit>) -> Vec<Permit> {
    permits.sort_by_key(|p| (p.expiration_date.is_none(), p.expiration_date));
    permits
}

/// Lists permits with their expiry urgency.
///
/// `warning_days` replaces every permit's own reminder window when given.
pub fn cmd_permit_list(store: &Store, clock: &impl Clock, warning_days: Option<i64>) -> Result<()> {
    let permits = permits_by_expiry(store.load_permits()?);
    if permits.is_empty() {
        println!("No permits found.");
        return Ok(());
    }

    let mut table = new_table();
    table.set_header(header(&["ID", "Title", "Type", "Number", "Project", "Expires", "Time Left", "Urgency"]));

    for mut p in permits {
        if warning_days.is_some() {
            p.renewal_reminder_days = warning_days;
        }
        let urgency = p.urgency(clock);
        table.add_row(vec![
            Cell::new(p.id),
            Cell::new(&p.title),
            Cell::new(p.kind.clone().unwrap_or_default()),
            Cell::new(p.permit_number.clone().unwrap_or_default()),
            Cell::new(p.project.clone().unwrap_or_default()),
            Cell::new(p.expiration_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into())),
            Cell::new(time_left(p.days_until_expiry(clock))),
            Cell::new(urgency.map(|u| u.to_string()).unwrap_or_else(|| "-".into()))
                .fg(urgency_color(urgency)),
        ]);
    }

    println!("{table}");
    Ok(())
}

pub fn cmd_permit_remove(store: &Store, id: u64, silent: bool) -> Result<()> {
    let mut permits = store.load_permits()?;
    let len_before = permits.len();
    permits.retain(|p| p.id != id);
    if permits.len() == len_before {
        return Err(Error::NotFound { kind: "permit", id }.into());
    }
    store.save_permits(&permits)?;
    tracing::info!(id, "permit removed");
    if !silent {
        println!("Permit {} removed.", id);
    }
    Ok(())
}

/// Schedules a fieldwork trip and returns its id.
///
/// # Errors
/// Fails on unparseable dates, an end before the start, or a write failure.
pub fn cmd_fieldwork_add(
    store: &Store,
    title: String,
    site: Option<String>,
    project: Option<String>,
    start: Option<&str>,
    end: Option<&str>,
    silent: bool,
) -> Result<u64> {
    let start_date = parse_optional_day(start)?;
    let end_date = parse_optional_day(end)?;
    inclusive_day_count(start_date, end_date).context("invalid fieldwork dates")?;

    let mut trips = store.load_fieldwork()?;
    let id = next_id(trips.iter().map(|f| f.id));
    trips.push(Fieldwork {
        id,
        title,
        site,
        project,
        start_date,
        end_date,
        status: FieldworkStatus::Planned,
    });
    store.save_fieldwork(&trips)?;
    tracing::info!(id, ?start_date, ?end_date, "fieldwork scheduled");
    if !silent {
        println!("Fieldwork added (id = {})", id);
    }
    Ok(id)
}

/// Lists fieldwork by start date, optionally only trips starting within
/// `upcoming` days.
pub fn cmd_fieldwork_list(store: &Store, clock: &impl Clock, upcoming: Option<i64>) -> Result<()> {
    let mut trips = store.load_fieldwork()?;
    if let Some(days) = upcoming {
        trips.retain(|f| f.is_upcoming(days, clock));
    }
    trips.sort_by_key(|f| (f.start_date.is_none(), f.start_date));
    if trips.is_empty() {
        println!("No fieldwork found.");
        return Ok(());
    }

    let window = upcoming.unwrap_or(crate::urgency::DEFAULT_UPCOMING_DAYS);
    let mut table = new_table();
    table.set_header(header(&["ID", "Title", "Site", "Start", "End", "Days", "Starts In", "Status"]));

    for f in trips {
        // A hand-edited file can hold a reversed range; show it rather than fail the listing.
        let days = match f.duration_days() {
            Ok(Some(d)) => d.to_string(),
            Ok(None) => "-".to_string(),
            Err(e) => {
                tracing::warn!(id = f.id, error = %e, "fieldwork has invalid dates");
                "?".to_string()
            }
        };
        let starts_in = f.days_until_start(clock);
        let color = if f.is_upcoming(window, clock) { Color::Cyan } else { Color::Reset };
        table.add_row(vec![
            Cell::new(f.id),
            Cell::new(&f.title),
            Cell::new(f.site.clone().unwrap_or_default()),
            Cell::new(f.start_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into())),
            Cell::new(f.end_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into())),
            Cell::new(days),
            Cell::new(time_left(starts_in)).fg(color),
            Cell::new(f.status),
        ]);
    }

    println!("{table}");
    Ok(())
}

pub fn cmd_fieldwork_status(store: &Store, id: u64, status: FieldworkStatus, silent: bool) -> Result<()> {
    let mut trips = store.load_fieldwork()?;
    let trip = trips
        .iter_mut()
        .find(|f| f.id == id)
        .ok_or(Error::NotFound { kind: "fieldwork", id })?;
    trip.status = status;
    store.save_fieldwork(&trips)?;
    tracing::info!(id, %status, "fieldwork status changed");
    if !silent {
        println!("Fieldwork {} marked {}.", id, status);
    }
    Ok(())
}

pub fn cmd_fieldwork_remove(store: &Store, id: u64, silent: bool) -> Result<()> {
    let mut trips = store.load_fieldwork()?;
    let len_before = trips.len();
    trips.retain(|f| f.id != id);
    if trips.len() == len_before {
        return Err(Error::NotFound { kind: "fieldwork", id }.into());
    }
    store.save_fieldwork(&trips)?;
    tracing::info!(id, "fieldwork removed");
    if !silent {
        println!("Fieldwork {} removed.", id);
    }
    Ok(())
}

/// Counts behind the `status` overview.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub open_tasks: usize,
    pub overdue_tasks: usize,
    pub due_today: usize,
    pub expired_permits: usize,
    pub critical_permits: usize,
    pub warning_permits: usize,
    pub upcoming_fieldwork: usize,
}

impl Summary {
    /// Tallies the store as of `clock`'s today. Fieldwork counts if it starts
    /// within `days_ahead` days.
    pub fn collect(store: &Store, clock: &impl Clock, days_ahead: i64) -> Result<Self> {
        let mut s = Self::default();
        for t in store.load_tasks()? {
            if t.status == TaskStatus::Done {
                continue;
            }
            s.open_tasks += 1;
            match t.days_left(clock) {
                Some(d) if d < 0 => s.overdue_tasks += 1,
                Some(0) => s.due_today += 1,
                _ => {}
            }
        }
        for p in store.load_permits()? {
            match p.urgency(clock) {
                Some(Urgency::Expired) => s.expired_permits += 1,
                Some(Urgency::Critical) => s.critical_permits += 1,
                Some(Urgency::Warning) => s.warning_permits += 1,
                _ => {}
            }
        }
        s.upcoming_fieldwork = store
            .load_fieldwork()?
            .iter()
            .filter(|f| f.is_upcoming(days_ahead, clock))
            .count();
        Ok(s)
    }
}

/// Prints a one-screen overview of what needs attention.
pub fn cmd_status(store: &Store, clock: &impl Clock, days_ahead: i64) -> Result<()> {
    let s = Summary::collect(store, clock, days_ahead)?;
    let mut table = new_table();
    table.set_header(header(&["", "Count"]));
    let rows = [
        ("Open tasks", s.open_tasks, Color::Reset),
        ("Overdue tasks", s.overdue_tasks, Color::Red),
        ("Due today", s.due_today, Color::Yellow),
        ("Expired permits", s.expired_permits, Color::Red),
        ("Critical permits", s.critical_permits, Color::Red),
        ("Permits to renew", s.warning_permits, Color::Yellow),
        ("Fieldwork upcoming", s.upcoming_fieldwork, Color::Cyan),
    ];
    for (label, count, color) in rows {
        let color = if count == 0 { Color::Reset } else { color };
        table.add_row(vec![Cell::new(label), Cell::new(count).fg(color)]);
    }
    println!("Status as of {} (fieldwork window {}d)", clock.today(), days_ahead);
    println!("{table}");
    Ok(())
}
