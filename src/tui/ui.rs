use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use super::app::{App, ViewMode};
use crate::commands::time_left;
use crate::models::TaskStatus;
use crate::urgency::Urgency;

fn header_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

fn highlight_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray)
}

fn urgency_style(urgency: Option<Urgency>) -> Style {
    match urgency {
        Some(Urgency::Expired) | Some(Urgency::Critical) => Style::default().fg(Color::Red),
        Some(Urgency::Warning) => Style::default().fg(Color::Yellow),
        Some(Urgency::Ok) => Style::default().fg(Color::Green),
        None => Style::default().fg(Color::Gray),
    }
}

fn date_cell(date: Option<chrono::NaiveDate>) -> Cell<'static> {
    Cell::from(date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()))
}

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Table
            Constraint::Length(3)  // Help
        ].as_ref())
        .split(f.area());

    match app.view_mode {
        ViewMode::Tasks => {
            let rows: Vec<Row> = app
                .tasks
                .iter()
                .map(|t| {
                    let days_left = t.days_left(&app.clock);
                    let style = match days_left {
                        _ if t.status == TaskStatus::Done => Style::default().fg(Color::Gray),
                        Some(d) if d < 0 => Style::default().fg(Color::Red),
                        Some(0) => Style::default().fg(Color::Yellow),
                        _ => Style::default().fg(Color::Green),
                    };
                    Row::new(vec![
                        Cell::from(t.id.to_string()),
                        Cell::from(t.name.clone()),
                        Cell::from(t.project.clone().unwrap_or_default()),
                        Cell::from(t.priority.to_string()),
                        date_cell(t.due),
                        Cell::from(time_left(days_left)),
                        Cell::from(t.status.to_string()),
                    ]).style(style)
                })
                .collect();

            let widths = [
                Constraint::Length(4),
                Constraint::Min(20),
                Constraint::Length(14),
                Constraint::Length(4),
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Length(9),
            ];

            let title = if app.focus_mode { "Lab Tracker - Focus" } else { "Lab Tracker - Tasks" };
            let table = Table::new(rows, widths)
                .header(Row::new(vec!["ID", "Name", "Project", "Pri", "Due", "Time Left", "Status"])
                    .style(header_style())
                    .bottom_margin(1))
                .block(Block::default().borders(Borders::ALL).title(title))
                .row_highlight_style(highlight_style())
                .highlight_symbol(">> ");

            f.render_stateful_widget(table, chunks[0], &mut app.task_state);
        }
        ViewMode::Permits => {
            let rows: Vec<Row> = app
                .permits
                .iter()
                .map(|p| {
                    let urgency = p.urgency(&app.clock);
                    Row::new(vec![
                        Cell::from(p.id.to_string()),
                        Cell::from(p.title.clone()),
                        Cell::from(p.kind.clone().unwrap_or_default()),
                        date_cell(p.expiration_date),
                        Cell::from(time_left(p.days_until_expiry(&app.clock))),
                        Cell::from(urgency.map(|u| u.to_string()).unwrap_or_else(|| "-".into())),
                    ]).style(urgency_style(urgency))
                })
                .collect();

            let widths = [
                Constraint::Length(4),
                Constraint::Min(20),
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Length(9),
            ];

            let table = Table::new(rows, widths)
                .header(Row::new(vec!["ID", "Title", "Type", "Expires", "Time Left", "Urgency"])
                    .style(header_style())
                    .bottom_margin(1))
                .block(Block::default().borders(Borders::ALL).title("Lab Tracker - Permits"))
                .row_highlight_style(highlight_style())
                .highlight_symbol(">> ");

            f.render_stateful_widget(table, chunks[0], &mut app.permit_state);
        }
        ViewMode::Fieldwork => {
            let rows: Vec<Row> = app
                .fieldwork
                .iter()
                .map(|w| {
                    let days = match w.duration_days() {
                        Ok(Some(d)) => d.to_string(),
                        Ok(None) => "-".to_string(),
                        Err(_) => "?".to_string(),
                    };
                    let style = if w.is_upcoming(crate::urgency::DEFAULT_UPCOMING_DAYS, &app.clock) {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default()
                    };
                    Row::new(vec![
                        Cell::from(w.id.to_string()),
                        Cell::from(w.title.clone()),
                        Cell::from(w.site.clone().unwrap_or_default()),
                        date_cell(w.start_date),
                        date_cell(w.end_date),
                        Cell::from(days),
                        Cell::from(w.status.to_string()),
                    ]).style(style)
                })
                .collect();

            let widths = [
                Constraint::Length(4),
                Constraint::Min(20),
                Constraint::Length(14),
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Length(5),
                Constraint::Length(10),
            ];

            let table = Table::new(rows, widths)
                .header(Row::new(vec!["ID", "Title", "Site", "Start", "End", "Days", "Status"])
                    .style(header_style())
                    .bottom_margin(1))
                .block(Block::default().borders(Borders::ALL).title("Lab Tracker - Fieldwork"))
                .row_highlight_style(highlight_style())
                .highlight_symbol(">> ");

            f.render_stateful_widget(table, chunks[0], &mut app.fieldwork_state);
        }
    }

    let help_text = match &app.message {
        Some(msg) => format!("Error: {msg}"),
        None => match app.view_mode {
            ViewMode::Tasks => "q: Quit | Space: Done | s: Start | d: Del | c: Toggle Done | f: Focus | v: Next View".to_string(),
            ViewMode::Permits | ViewMode::Fieldwork => "q: Quit | d: Del | v: Next View".to_string(),
        },
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(if app.message.is_some() { Color::Red } else { Color::Gray }))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[1]);
}
