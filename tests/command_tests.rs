use chrono::NaiveDate;
use labtrack::commands::*;
use labtrack::models::{FieldworkStatus, TaskStatus};
use labtrack::storage::Store;
use labtrack::{Error, FixedClock, Priority, Urgency};
use tempfile::TempDir;

fn with_test_db<F>(f: F)
where
    F: FnOnce(&Store),
{
    let dir = TempDir::new().unwrap();
    let store = Store::at(dir.path().join("data"));
    f(&store);
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_add_and_list() {
    with_test_db(|store| {
        let id = cmd_task_add(store, "Grade midterms".into(), Priority::P2, Some("2025-12-01"), Some("Teaching".into()), Some("teaching".into()), true).unwrap();
        assert_eq!(id, 1);

        let tasks = store.load_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "Grade midterms");
        assert_eq!(tasks[0].project, Some("Teaching".into()));
        assert_eq!(tasks[0].priority, Priority::P2);
        assert_eq!(tasks[0].due, Some(day(2025, 12, 1)));
        assert_eq!(tasks[0].status, TaskStatus::Todo);

        let clock = FixedClock(day(2025, 11, 1));
        cmd_task_list(store, &clock, false, None).unwrap();
        cmd_task_list(store, &clock, true, Some(3)).unwrap();
    });
}

#[test]
fn test_add_rejects_bad_due_date() {
    with_test_db(|store| {
        let err = cmd_task_add(store, "Bad".into(), Priority::P3, Some("12/01/2025"), None, None, true).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidDate { .. })));
        assert!(store.load_tasks().unwrap().is_empty());
    });
}

#[test]
fn test_ids_increment() {
    with_test_db(|store| {
        let a = cmd_task_add(store, "A".into(), Priority::P3, None, None, None, true).unwrap();
        let b = cmd_task_add(store, "B".into(), Priority::P3, None, None, None, true).unwrap();
        cmd_task_remove(store, a, true).unwrap();
        let c = cmd_task_add(store, "C".into(), Priority::P3, None, None, None, true).unwrap();
        assert_eq!((a, b, c), (1, 2, 3));
    });
}

#[test]
fn test_complete_task() {
    with_test_db(|store| {
        let id = cmd_task_add(store, "Submit IRB amendment".into(), Priority::P1, Some("2025-12-01"), None, None, true).unwrap();

        cmd_task_set_status(store, id, TaskStatus::Done, true).unwrap();
        let task = store.load_task(id).unwrap();
        assert_eq!(task.status, TaskStatus::Done);
        assert!(task.completed_at.is_some());

        cmd_task_set_status(store, id, TaskStatus::Progress, true).unwrap();
        let task = store.load_task(id).unwrap();
        assert_eq!(task.status, TaskStatus::Progress);
        assert!(task.completed_at.is_none());
    });
}

#[test]
fn test_missing_task_is_not_found() {
    with_test_db(|store| {
        let err = cmd_task_set_status(store, 42, TaskStatus::Done, true).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NotFound { kind: "task", id: 42 })));
        assert!(cmd_task_remove(store, 42, true).is_err());
        assert!(cmd_task_edit(store, 42, TaskEdit::default(), true).is_err());
    });
}

#[test]
fn test_edit_task() {
    with_test_db(|store| {
        let id = cmd_task_add(store, "Draft".into(), Priority::P3, Some("2025-12-01"), None, None, true).unwrap();

        let edit = TaskEdit {
            name: Some("Draft chapter 2".into()),
            priority: Some(Priority::P1),
            due: Some("2025-11-20".into()),
            ..TaskEdit::default()
        };
        cmd_task_edit(store, id, edit, true).unwrap();
        let task = store.load_task(id).unwrap();
        assert_eq!(task.name, "Draft chapter 2");
        assert_eq!(task.priority, Priority::P1);
        assert_eq!(task.due, Some(day(2025, 11, 20)));

        let bad = TaskEdit { due: Some("next week".into()), name: Some("ignored".into()), ..TaskEdit::default() };
        assert!(cmd_task_edit(store, id, bad, true).is_err());
        assert_eq!(store.load_task(id).unwrap().name, "Draft chapter 2");

        cmd_task_edit(store, id, TaskEdit { clear_due: true, ..TaskEdit::default() }, true).unwrap();
        assert_eq!(store.load_task(id).unwrap().due, None);
    });
}

#[test]
fn test_permit_add_and_urgency() {
    with_test_db(|store| {
        let clock = FixedClock(day(2025, 6, 1));
        cmd_permit_add(store, "Collection licence".into(), Some("collection".into()), Some("SC-123".into()), None, Some("2025-08-15"), Some(90), true).unwrap();
        cmd_permit_add(store, "IRB protocol".into(), Some("IRB".into()), None, None, Some("2025-08-15"), None, true).unwrap();
        cmd_permit_add(store, "Pending".into(), None, None, None, None, None, true).unwrap();

        let permits = store.load_permits().unwrap();
        assert_eq!(permits.len(), 3);
        // 75 days out: inside the custom 90 day window, outside the default 60.
        assert_eq!(permits[0].urgency(&clock), Some(Urgency::Warning));
        assert_eq!(permits[1].urgency(&clock), Some(Urgency::Ok));
        assert_eq!(permits[2].urgency(&clock), None);

        let ordered: Vec<u64> = permits_by_expiry(permits).iter().map(|p| p.id).collect();
        assert_eq!(ordered, vec![1, 2, 3]);

        cmd_permit_list(store, &clock, Some(30)).unwrap();
        cmd_permit_remove(store, 2, true).unwrap();
        assert_eq!(store.load_permits().unwrap().len(), 2);
    });
}

#[test]
fn test_permit_rejects_negative_reminder() {
    with_test_db(|store| {
        assert!(cmd_permit_add(store, "X".into(), None, None, None, None, Some(-5), true).is_err());
        assert!(store.load_permits().unwrap().is_empty());
    });
}

#[test]
fn test_fieldwork_add_and_status() {
    with_test_db(|store| {
        let id = cmd_fieldwork_add(store, "Reef transects".into(), Some("Site B".into()), None, Some("2025-06-15"), Some("2025-06-20"), true).unwrap();
        let trips = store.load_fieldwork().unwrap();
        assert_eq!(trips[0].duration_days().unwrap(), Some(6));
        assert_eq!(trips[0].status, FieldworkStatus::Planned);

        cmd_fieldwork_status(store, id, FieldworkStatus::Active, true).unwrap();
        assert_eq!(store.load_fieldwork().unwrap()[0].status, FieldworkStatus::Active);

        let clock = FixedClock(day(2025, 6, 1));
        cmd_fieldwork_list(store, &clock, Some(30)).unwrap();
        cmd_fieldwork_remove(store, id, true).unwrap();
        assert!(store.load_fieldwork().unwrap().is_empty());
    });
}

#[test]
fn test_fieldwork_rejects_reversed_range() {
    with_test_db(|store| {
        let err = cmd_fieldwork_add(store, "Backwards".into(), None, None, Some("2025-06-20"), Some("2025-06-15"), true).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::ReversedRange { .. })));
        assert!(store.load_fieldwork().unwrap().is_empty());
    });
}

#[test]
fn test_status_summary() {
    with_test_db(|store| {
        let clock = FixedClock(day(2025, 6, 15));
        cmd_task_add(store, "Overdue".into(), Priority::P2, Some("2025-06-10"), None, None, true).unwrap();
        cmd_task_add(store, "Today".into(), Priority::P3, Some("2025-06-15"), None, None, true).unwrap();
        cmd_task_add(store, "Later".into(), Priority::P1, Some("2025-07-15"), None, None, true).unwrap();
        let done = cmd_task_add(store, "Finished".into(), Priority::P1, Some("2025-06-01"), None, None, true).unwrap();
        cmd_task_set_status(store, done, TaskStatus::Done, true).unwrap();

        cmd_permit_add(store, "Lapsed".into(), None, None, None, Some("2025-06-01"), None, true).unwrap();
        cmd_permit_add(store, "Soon".into(), None, None, None, Some("2025-06-25"), None, true).unwrap();
        cmd_permit_add(store, "Renew".into(), None, None, None, Some("2025-07-30"), None, true).unwrap();
        cmd_permit_add(store, "Fine".into(), None, None, None, Some("2026-06-01"), None, true).unwrap();

        cmd_fieldwork_add(store, "Next week".into(), None, None, Some("2025-06-22"), Some("2025-06-24"), true).unwrap();
        cmd_fieldwork_add(store, "Autumn".into(), None, None, Some("2025-10-01"), None, true).unwrap();

        let summary = Summary::collect(store, &clock, 30).unwrap();
        assert_eq!(summary, Summary {
            open_tasks: 3,
            overdue_tasks: 1,
            due_today: 1,
            expired_permits: 1,
            critical_permits: 1,
            warning_permits: 1,
            upcoming_fieldwork: 1,
        });
        cmd_status(store, &clock, 30).unwrap();
    });
}

#[test]
fn test_time_left_labels() {
    assert_eq!(time_left(None), "-");
    assert_eq!(time_left(Some(-3)), "3d overdue");
    assert_eq!(time_left(Some(0)), "Today");
    assert_eq!(time_left(Some(4)), "4d");
}
